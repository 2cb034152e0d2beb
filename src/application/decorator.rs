//! Decoration of confirmed liquidations.

use tracing::trace;

use crate::domain::{AnnotatedLiquidation, LiquidationEvent, StatisticsStore};

/// Annotate `event` from the store's current state, then fold it in.
///
/// Deterministic given the store and the event. The exclusive borrow makes
/// the read-then-update a single step: no other decoration can observe the
/// store in between.
pub fn decorate(event: LiquidationEvent, store: &mut StatisticsStore) -> AnnotatedLiquidation {
    let stats = store.entry(event.symbol());
    let annotation = stats.annotate(&event);
    stats.apply(&event);

    trace!(
        symbol = %event.symbol(),
        ordinal = annotation.ordinal,
        rank = annotation.rank,
        record = annotation.record,
        "Decorated liquidation"
    );

    AnnotatedLiquidation::new(event, annotation)
}
