//! Rolling per-symbol liquidation statistics.
//!
//! The store is a plain value: it is mutated only through `&mut` borrows,
//! so a decoration (annotate then apply) can never interleave with another.
//! Persistence is handled by the `StatsRepository` port.

use std::collections::{BTreeMap, VecDeque};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::Symbol;
use super::liquidation::{Annotation, LiquidationEvent};

/// Number of recent liquidation sizes kept per symbol for ranking.
pub const RECENT_WINDOW: usize = 100;

/// Aggregate state for one symbol.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolStats {
    /// Confirmed liquidations seen.
    pub count: u64,
    /// Sum of liquidated quantities (saturating).
    pub total_quantity: u64,
    /// Sum of price times quantity (saturating).
    pub total_notional: Decimal,
    /// Largest single liquidated quantity.
    pub largest_quantity: u64,
    /// Quantities of the most recent liquidations, oldest first.
    #[serde(default)]
    pub recent: VecDeque<u64>,
}

impl SymbolStats {
    /// Compute the annotation for `event` against the current state.
    ///
    /// Does not modify the aggregate; pair with [`apply`](Self::apply).
    #[must_use]
    pub fn annotate(&self, event: &LiquidationEvent) -> Annotation {
        let quantity = event.quantity();
        let larger = self.recent.iter().filter(|&&q| q > quantity).count();

        Annotation {
            ordinal: self.count + 1,
            prior_total_quantity: self.total_quantity,
            prior_total_notional: self.total_notional,
            record: self.count == 0 || quantity > self.largest_quantity,
            rank: larger + 1,
            window_len: self.recent.len(),
        }
    }

    /// Fold one confirmed liquidation into the aggregate.
    pub fn apply(&mut self, event: &LiquidationEvent) {
        let quantity = event.quantity();

        self.count += 1;
        self.total_quantity = self.total_quantity.saturating_add(quantity);
        self.total_notional = self.total_notional.saturating_add(event.notional());
        self.largest_quantity = self.largest_quantity.max(quantity);

        self.recent.push_back(quantity);
        while self.recent.len() > RECENT_WINDOW {
            self.recent.pop_front();
        }
    }
}

/// Statistics for every symbol seen so far.
///
/// Symbols are created on first reference and never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatisticsStore {
    symbols: BTreeMap<Symbol, SymbolStats>,
}

impl StatisticsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Statistics for a symbol, if it has been seen.
    #[must_use]
    pub fn get(&self, symbol: &Symbol) -> Option<&SymbolStats> {
        self.symbols.get(symbol)
    }

    /// Mutable statistics for a symbol, created empty on first reference.
    pub fn entry(&mut self, symbol: &Symbol) -> &mut SymbolStats {
        self.symbols.entry(symbol.clone()).or_default()
    }

    /// Iterate symbols in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &SymbolStats)> {
        self.symbols.iter()
    }

    /// Number of symbols tracked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Confirmed liquidations across all symbols.
    #[must_use]
    pub fn total_count(&self) -> u64 {
        self.symbols.values().map(|s| s.count).sum()
    }
}
