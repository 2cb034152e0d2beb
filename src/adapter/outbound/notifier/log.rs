//! Notifier that writes every message to the log.

use async_trait::async_trait;
use tracing::info;

use crate::error::NotifyError;
use crate::port::Notifier;

/// Sink used when no chat is configured. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        info!(target: "liqwatch::notification", text = %text, "Liquidation");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn always_delivers() {
        let notifier = LogNotifier;
        assert!(notifier.send("Liquidated long on XBTUSD").await.is_ok());
        assert_eq!(notifier.name(), "log");
    }
}
