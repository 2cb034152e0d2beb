//! Application layer: the reconciliation core.
//!
//! - [`dedup`] - time-bounded set of recently closed order ids
//! - [`decorator`] - annotate a liquidation and advance the statistics
//! - [`reconciler`] - per-message state machine over feed actions
//! - [`pipeline`] - reconcile, flush, render, notify

pub mod decorator;
pub mod dedup;
pub mod pipeline;
pub mod reconciler;

pub use decorator::decorate;
pub use dedup::{DedupWindow, DEFAULT_SUPPRESSION_WINDOW};
pub use pipeline::{Outcome, Pipeline};
pub use reconciler::{Reconciler, ReconcilerStats};
