//! Chat delivery for the stock command.
//!
//! The chat platform itself is external; this module only depends on the
//! [`ChatApi`] surface it offers (send a reply, unsend a message).

pub mod console;

use crate::fetch::Fetcher;
use crate::stock::{self, AggregationPolicy, Category};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use console::ConsoleChat;

/// Failure reported by the chat platform.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Failed to send message: {0}")]
    Send(String),
    #[error("Failed to unsend message {message_id}: {reason}")]
    Unsend { message_id: String, reason: String },
}

/// The triggering chat message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    pub thread_id: String,
    pub message_id: String,
}

/// Receipt for a sent message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub message_id: String,
}

/// Chat platform operations consumed by commands.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(
        &self,
        text: &str,
        thread_id: &str,
        reply_to: Option<&str>,
    ) -> Result<MessageInfo, ChatError>;

    async fn unsend_message(&self, message_id: &str) -> Result<(), ChatError>;
}

/// Static description a command dispatcher shows in its help listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
}

impl std::fmt::Display for CommandInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} v{}: {} (usage: {})",
            self.name, self.version, self.description, self.usage
        )
    }
}

/// Default delay before a stock report removes itself.
pub const DEFAULT_UNSEND_DELAY: Duration = Duration::from_secs(40);

/// The `stock` chat command.
pub struct StockCommand {
    fetcher: Arc<dyn Fetcher>,
    policy: AggregationPolicy,
    unsend_delay: Duration,
}

impl StockCommand {
    pub const INFO: CommandInfo = CommandInfo {
        name: "stock",
        version: "2.0.0",
        description: "Show GrowAGarden stock list (gears, seeds, etc)",
        usage: "-stock",
    };

    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            policy: AggregationPolicy::default(),
            unsend_delay: DEFAULT_UNSEND_DELAY,
        }
    }

    pub fn with_policy(mut self, policy: AggregationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_unsend_delay(mut self, delay: Duration) -> Self {
        self.unsend_delay = delay;
        self
    }

    /// Fetch, render and reply to `event`.
    ///
    /// On success the report is scheduled for removal after the unsend delay;
    /// the returned handle belongs to that detached task and may be dropped.
    /// Fetch failures are reported in the thread, not returned.
    pub async fn run(
        &self,
        api: Arc<dyn ChatApi>,
        event: &ChatEvent,
    ) -> Result<Option<JoinHandle<()>>, ChatError> {
        info!("stock requested in thread {}", event.thread_id);

        let fetched = stock::fetch_all(self.fetcher.as_ref(), &Category::ALL, self.policy).await;
        let aggregated = match fetched {
            Ok(aggregated) => aggregated,
            Err(e) => {
                error!(transport = e.is_transport(), "Stock fetch failed: {}", e);
                let text = format!("❌ Failed to fetch stock data.\nError: {}", e);
                api.send_message(&text, &event.thread_id, Some(&event.message_id))
                    .await?;
                return Ok(None);
            }
        };

        let report = stock::render(&aggregated);
        let sent = api
            .send_message(&report, &event.thread_id, Some(&event.message_id))
            .await
            .map_err(|e| {
                warn!("Could not deliver stock report: {}", e);
                e
            })?;

        Ok(Some(schedule_unsend(api, sent.message_id, self.unsend_delay)))
    }
}

/// Remove `message_id` after `delay` on a detached task. Failures are dropped.
pub fn schedule_unsend(api: Arc<dyn ChatApi>, message_id: String, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        match api.unsend_message(&message_id).await {
            Ok(()) => debug!("Unsent message {}", message_id),
            Err(e) => debug!("Ignoring unsend failure: {}", e),
        }
    })
}
