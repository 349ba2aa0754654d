//! Terminal stand-in for a chat platform, used by the `stock` subcommand.

use super::{ChatApi, ChatError, MessageInfo};
use async_trait::async_trait;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Prints messages to stdout and numbers them like a chat thread would.
#[derive(Debug, Default)]
pub struct ConsoleChat {
    next_id: AtomicU64,
}

impl ConsoleChat {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatApi for ConsoleChat {
    async fn send_message(
        &self,
        text: &str,
        thread_id: &str,
        reply_to: Option<&str>,
    ) -> Result<MessageInfo, ChatError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let message_id = format!("console.{}", id);

        writeln!(std::io::stdout().lock(), "{}", text)
            .map_err(|e| ChatError::Send(e.to_string()))?;

        info!(
            "Sent {} to {} (reply to {})",
            message_id,
            thread_id,
            reply_to.unwrap_or("-")
        );
        Ok(MessageInfo { message_id })
    }

    async fn unsend_message(&self, message_id: &str) -> Result<(), ChatError> {
        let issued = self.next_id.load(Ordering::Relaxed);
        let known = message_id
            .strip_prefix("console.")
            .and_then(|n| n.parse::<u64>().ok())
            .is_some_and(|n| n >= 1 && n <= issued);

        if !known {
            return Err(ChatError::Unsend {
                message_id: message_id.to_string(),
                reason: "not sent from this console".to_string(),
            });
        }

        info!("Message {} expired", message_id);
        Ok(())
    }
}
