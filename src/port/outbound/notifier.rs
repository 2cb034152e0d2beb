//! Notifier port for outbound liquidation alerts.
//!
//! A notifier delivers one rendered text message to a channel. Delivery
//! is attempted exactly once; callers log failures and move on.

use async_trait::async_trait;

use crate::error::NotifyError;

/// Sink for rendered notification text.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `send` must not retry internally
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a message.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;

    /// Sink name for logging.
    fn name(&self) -> &'static str;
}

/// Registry of notifiers (composite pattern).
///
/// Sends every message to all registered notifiers. One failing sink does
/// not stop delivery to the others.
pub struct NotifierRegistry {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { notifiers: vec![] }
    }

    /// Register a notifier.
    pub fn register(&mut self, notifier: Box<dyn Notifier>) {
        self.notifiers.push(notifier);
    }

    /// Number of registered notifiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.notifiers.len()
    }

    /// Check if registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notifiers.is_empty()
    }

    /// Names of the registered sinks, in registration order.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        self.notifiers.iter().map(|n| n.name()).collect()
    }
}

impl Default for NotifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for NotifierRegistry {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let mut failures = Vec::new();
        for notifier in &self.notifiers {
            if let Err(e) = notifier.send(text).await {
                failures.push(e.to_string());
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(NotifyError::Delivery {
                sink: self.name(),
                reason: failures.join("; "),
            })
        }
    }

    fn name(&self) -> &'static str {
        "registry"
    }
}

/// A no-op notifier for testing or when notifications are disabled.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn send(&self, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "null"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingNotifier {
        sent: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for CountingNotifier {
        async fn send(&self, _text: &str) -> Result<(), NotifyError> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(NotifyError::Delivery {
                    sink: "counting",
                    reason: "down".into(),
                })
            } else {
                Ok(())
            }
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    #[tokio::test]
    async fn registry_sends_to_every_notifier_despite_failures() {
        let sent = Arc::new(AtomicUsize::new(0));
        let mut registry = NotifierRegistry::new();
        registry.register(Box::new(CountingNotifier {
            sent: sent.clone(),
            fail: true,
        }));
        registry.register(Box::new(CountingNotifier {
            sent: sent.clone(),
            fail: false,
        }));

        let result = registry.send("hello").await;

        assert_eq!(sent.load(Ordering::SeqCst), 2);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("counting delivery failed: down"));
    }

    #[tokio::test]
    async fn empty_registry_succeeds() {
        let registry = NotifierRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.send("hello").await.is_ok());
    }

    #[tokio::test]
    async fn null_notifier_accepts_everything() {
        assert!(NullNotifier.send("anything").await.is_ok());
        assert_eq!(NullNotifier.name(), "null");
    }
}
