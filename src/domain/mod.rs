//! Exchange-agnostic domain types.
//!
//! Liquidation events as the rest of the crate sees them, the annotation
//! attached to each confirmed one, and the per-symbol rolling statistics
//! that produce that annotation.

pub mod error;
pub mod id;
pub mod liquidation;
pub mod stats;

pub use error::DomainError;
pub use id::{OrderId, Symbol};
pub use liquidation::{AnnotatedLiquidation, Annotation, LiquidationEvent, Side};
pub use stats::{StatisticsStore, SymbolStats, RECENT_WINDOW};
