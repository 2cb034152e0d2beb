//! Handler for `check config`.

use std::path::Path;

use super::output;
use crate::adapter::outbound::json::JsonFileStatsRepository;
use crate::error::Result;
use crate::infrastructure::config::Config;

/// Validate the configuration file and environment without connecting.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    let config = Config::load(path)?;

    output::section("Configuration Check");
    output::field("Config", path.display());
    output::success("Configuration file is valid");

    output::section("Summary");
    output::field("Feed", config.feed.url()?);
    output::field("Topics", config.feed.topics.join(", "));
    output::field(
        "Keep-alive",
        format!(
            "ping {}s, read timeout {}s",
            config.feed.ping_interval_secs, config.feed.read_timeout_secs
        ),
    );
    output::field("Dedup window", format!("{}s", config.dedup.window_secs));
    output::field("Log level", &config.logging.level);

    if config.statistics.persist {
        let repository = JsonFileStatsRepository::new(&config.statistics.path);
        match repository.read() {
            Ok(Some(file)) => output::success(&format!(
                "Statistics file readable ({} symbols)",
                file.symbols.len()
            )),
            Ok(None) => output::field("Statistics", "no file yet, will be created"),
            Err(e) => output::warning(&format!("Statistics file unusable: {e}")),
        }
    } else {
        output::field("Statistics", "memory only");
    }

    if config.telegram.enabled {
        match config.telegram.resolve() {
            Ok(Some(credentials)) => output::success(&format!(
                "Telegram configured for chat {}",
                credentials.chat_id
            )),
            Ok(None) => output::field("Telegram", "disabled"),
            Err(e) => output::warning(&format!("Telegram enabled but {e}")),
        }
        if !cfg!(feature = "telegram") {
            output::warning("Telegram enabled but this build lacks the telegram feature");
        }
    } else {
        output::field("Telegram", "disabled");
    }

    output::field(
        "Reconnect",
        if config.reconnection.enabled {
            format!(
                "{}ms..{}ms x{}, breaker after {} failures",
                config.reconnection.initial_delay_ms,
                config.reconnection.max_delay_ms,
                config.reconnection.backoff_multiplier,
                config.reconnection.max_consecutive_failures
            )
        } else {
            "disabled".to_string()
        },
    );

    output::success("Configuration check complete");
    Ok(())
}
