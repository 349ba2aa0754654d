//! Concurrent aggregation of the stock categories.
//!
//! All category fetches are outstanding at once on the current task. With the
//! default [`AggregationPolicy::FailFast`] the first failure aborts the whole
//! aggregation and drops whatever already arrived.

use crate::error::FetchError;
use crate::fetch::{Endpoint, Fetcher};
use crate::stock::models::{AggregatedStock, Category};
use futures::future::{join_all, try_join_all};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// What to do when some categories fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AggregationPolicy {
    /// Fail on the first error, discarding results that already arrived.
    #[default]
    FailFast,
    /// Keep the categories that succeeded; fail only if every one failed.
    Partial,
}

/// Upstream endpoint for one category.
pub fn category_endpoint(category: Category) -> Endpoint {
    Endpoint::new(
        category.query_tag(),
        format!("/stock/refresh_stock.php?type={}", category.query_tag()),
    )
}

/// Fetch every category in `categories` concurrently.
pub async fn fetch_all<F>(
    fetcher: &F,
    categories: &[Category],
    policy: AggregationPolicy,
) -> Result<AggregatedStock, FetchError>
where
    F: Fetcher + ?Sized,
{
    info!(
        "Fetching {} stock categories ({:?})",
        categories.len(),
        policy
    );

    let requests = categories.iter().map(|&category| async move {
        let response = fetcher.fetch(&category_endpoint(category)).await;
        (category, response)
    });

    match policy {
        AggregationPolicy::FailFast => {
            let requests = requests.map(|request| async move {
                let (category, response) = request.await;
                response.map(|value| (category, value))
            });
            let responses = try_join_all(requests).await?;
            debug!("All {} categories fetched", responses.len());
            Ok(responses.into_iter().collect())
        }
        AggregationPolicy::Partial => {
            let mut stock = AggregatedStock::new();
            let mut last_error = None;

            for (category, response) in join_all(requests).await {
                match response {
                    Ok(value) => stock.insert(category, value),
                    Err(e) => {
                        warn!("Skipping {}: {}", category, e);
                        last_error = Some(e);
                    }
                }
            }

            match last_error {
                Some(e) if stock.is_empty() => Err(e),
                _ => {
                    debug!(
                        "{} of {} categories fetched: {:?}",
                        stock.len(),
                        categories.len(),
                        stock.categories()
                    );
                    Ok(stock)
                }
            }
        }
    }
}
