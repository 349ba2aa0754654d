//! Weather pipeline: fetch the current weather document and normalize it.

pub mod normalize;

use crate::error::FetchError;
use crate::fetch::{Endpoint, Fetcher};
use serde_json::Value;
use tracing::debug;

pub use normalize::{normalize, normalize_with, NormalizeOptions};

pub const WEATHER_PATH: &str = "/api/v1/weather/gag";

pub fn weather_endpoint() -> Endpoint {
    Endpoint::new("weather", WEATHER_PATH)
}

/// Fetch the weather document and rewrite its timestamped records.
pub async fn fetch_weather<F>(fetcher: &F, options: NormalizeOptions) -> Result<Value, FetchError>
where
    F: Fetcher + ?Sized,
{
    let mut weather = fetcher.fetch(&weather_endpoint()).await?;
    if options.traverse_arrays {
        normalize_with(&mut weather, options);
        debug!("Weather document normalized, arrays included");
    } else {
        normalize(&mut weather);
        debug!("Weather document normalized");
    }
    Ok(weather)
}
