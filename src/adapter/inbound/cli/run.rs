//! Handler for the `run` command.

use tokio::signal;
use tracing::info;

use super::command::ConfigPathArg;
use super::output;
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::infrastructure::runtime;

/// Execute the run command.
///
/// Runs until a fatal error or Ctrl-C. Ctrl-C is a clean exit.
pub async fn execute(args: &ConfigPathArg) -> Result<()> {
    let mut config = Config::load(&args.config)?;
    if let Some(level) = verbosity_level(output::verbosity()) {
        config.logging.level = level.to_string();
    }
    config.init_logging();

    print_startup(&args.config.display().to_string(), &config);
    info!(version = env!("CARGO_PKG_VERSION"), "liqwatch starting");

    let result = tokio::select! {
        result = runtime::run(config) => result,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
            Ok(())
        }
    };

    info!("liqwatch stopped");
    result
}

/// Log level implied by `-v` flags, if any.
fn verbosity_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        _ => Some("trace"),
    }
}

fn print_startup(config_path: &str, config: &Config) {
    if output::is_quiet() {
        return;
    }

    output::header(env!("CARGO_PKG_VERSION"));
    output::field("Config", config_path);
    output::field("Feed", format!("{}://{}", config.feed.scheme, config.feed.host));
    output::field("Topics", config.feed.topics.join(", "));
    output::field("Dedup window", format!("{}s", config.dedup.window_secs));
    output::field(
        "Statistics",
        if config.statistics.persist {
            config.statistics.path.display().to_string()
        } else {
            "memory".to_string()
        },
    );
    output::field(
        "Telegram",
        if config.telegram.enabled {
            "enabled"
        } else {
            "disabled"
        },
    );
    output::field(
        "Reconnect",
        if config.reconnection.enabled {
            output::highlight("enabled")
        } else {
            output::muted("disabled")
        },
    );
}
