//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams between the reconciliation core and the outside
//! world. Adapters implement them; the application layer only ever sees
//! the traits.
//!
//! ```text
//!  ┌────────────┐      ┌──────────────────────┐      ┌────────────┐
//!  │ FeedStream │ ───▶ │ Reconciler/Pipeline  │ ───▶ │  Notifier  │
//!  └────────────┘      └──────────┬───────────┘      └────────────┘
//!                                 │
//!                                 ▼
//!                        ┌─────────────────┐
//!                        │ StatsRepository │
//!                        └─────────────────┘
//! ```

pub mod outbound;

pub use outbound::feed::{
    Action, Decoded, FeedEvent, FeedMessage, FeedStream, LiquidationRow, OrderKey, TableMessage,
    LIQUIDATION_TABLE,
};
pub use outbound::notifier::{Notifier, NotifierRegistry, NullNotifier};
pub use outbound::stats::StatsRepository;
