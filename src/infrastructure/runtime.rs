//! Feed session loop.
//!
//! Connects the feed, subscribes, and drives the [`Pipeline`] until the
//! session ends. With reconnection enabled the feed is wrapped in a
//! [`ReconnectingFeed`], so only a protocol error ends the session; without
//! it the first disconnect does.

use std::sync::Arc;

use tracing::{error, info};

use super::bootstrap::{build_notifier_registry, build_pipeline, build_repository};
use super::config::Config;
use super::exchange::ReconnectingFeed;
use crate::adapter::outbound::bitmex::BitmexFeedStream;
use crate::application::Pipeline;
use crate::error::{Error, Result};
use crate::port::FeedStream;

/// Build every component from `config` and run until a fatal error.
///
/// # Errors
///
/// Returns the error that ended the run: a startup failure, the initial
/// connection failing, a protocol error, or a disconnect when reconnection
/// is disabled.
pub async fn run(config: Config) -> Result<()> {
    let repository = build_repository(&config);
    let notifier = Arc::new(build_notifier_registry(&config)?);
    let mut pipeline = build_pipeline(&config, repository, notifier)?;

    let feed = BitmexFeedStream::new(config.feed.clone());
    if config.reconnection.enabled {
        let mut feed = ReconnectingFeed::new(feed, config.reconnection.clone());
        run_session(&mut pipeline, &mut feed, &config.feed.topics).await
    } else {
        let mut feed = feed;
        run_session(&mut pipeline, &mut feed, &config.feed.topics).await
    }
}

/// Connect, subscribe, then feed every event through `pipeline`.
///
/// Always ends in an error; the reconciler counters are logged on the way
/// out.
///
/// # Errors
///
/// Returns why the session ended.
pub async fn run_session<S>(pipeline: &mut Pipeline, feed: &mut S, topics: &[String]) -> Result<()>
where
    S: FeedStream + ?Sized,
{
    feed.connect().await?;
    feed.subscribe(topics).await?;
    info!(feed = feed.feed_name(), topics = ?topics, "Listening for liquidations");

    let reason = pipeline.run(feed).await;
    log_summary(pipeline, &reason);
    Err(reason)
}

fn log_summary(pipeline: &Pipeline, reason: &Error) {
    let stats = pipeline.reconciler().stats();
    error!(
        error = %reason,
        fatal = reason.is_fatal(),
        messages = stats.messages,
        emitted = stats.emitted,
        suppressed = stats.suppressed,
        closed = stats.closed,
        malformed_rows = stats.malformed_rows,
        malformed_messages = stats.malformed_messages,
        ignored = stats.ignored,
        "Feed session ended"
    );
}
