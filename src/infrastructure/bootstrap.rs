//! Composition root for runtime wiring.

use std::sync::Arc;

use tracing::info;

use crate::adapter::outbound::json::JsonFileStatsRepository;
use crate::adapter::outbound::memory::MemoryStatsRepository;
use crate::adapter::outbound::notifier::LogNotifier;
use crate::application::{DedupWindow, Pipeline, Reconciler};
use crate::error::Result;
use crate::infrastructure::config::telegram::TelegramCredentials;
use crate::infrastructure::config::Config;
use crate::port::{NotifierRegistry, StatsRepository};

#[cfg(feature = "telegram")]
use crate::adapter::outbound::notifier::telegram::{TelegramConfig, TelegramNotifier};

/// Build the statistics repository selected by `[statistics]`.
#[must_use]
pub fn build_repository(config: &Config) -> Arc<dyn StatsRepository> {
    if config.statistics.persist {
        Arc::new(JsonFileStatsRepository::new(&config.statistics.path))
    } else {
        info!("Statistics persistence disabled, keeping store in memory");
        Arc::new(MemoryStatsRepository::new())
    }
}

/// Build the notifier registry from configuration.
///
/// Always includes the log notifier. Adds Telegram when `[telegram]` is
/// enabled.
///
/// # Errors
///
/// Fails when Telegram is enabled but its credentials cannot be resolved,
/// or when the binary was built without the `telegram` feature.
pub fn build_notifier_registry(config: &Config) -> Result<NotifierRegistry> {
    let mut registry = NotifierRegistry::new();
    registry.register(Box::new(LogNotifier));

    if let Some(credentials) = config.telegram.resolve()? {
        register_telegram(&mut registry, credentials)?;
    }

    info!(sinks = ?registry.names(), "Notifiers configured");
    Ok(registry)
}

#[cfg(feature = "telegram")]
#[allow(clippy::unnecessary_wraps)]
fn register_telegram(registry: &mut NotifierRegistry, credentials: TelegramCredentials) -> Result<()> {
    registry.register(Box::new(TelegramNotifier::new(TelegramConfig {
        bot_token: credentials.bot_token,
        chat_id: credentials.chat_id,
    })));
    Ok(())
}

#[cfg(not(feature = "telegram"))]
fn register_telegram(_registry: &mut NotifierRegistry, _credentials: TelegramCredentials) -> Result<()> {
    Err(crate::error::ConfigError::InvalidValue {
        field: "telegram.enabled",
        reason: "built without the telegram feature".to_string(),
    }
    .into())
}

/// Load the store and assemble the pipeline.
///
/// # Errors
///
/// Fails when the persisted store exists but cannot be read.
pub fn build_pipeline(
    config: &Config,
    repository: Arc<dyn StatsRepository>,
    notifier: Arc<dyn crate::port::Notifier>,
) -> Result<Pipeline> {
    let store = repository.load()?;
    info!(
        location = %repository.describe(),
        symbols = store.len(),
        liquidations = store.total_count(),
        "Statistics ready"
    );

    let reconciler = Reconciler::new(DedupWindow::new(config.dedup.window()), store);
    Ok(Pipeline::new(reconciler, repository, notifier))
}
