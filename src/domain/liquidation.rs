//! Liquidation events and their annotated form.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{OrderId, Symbol};

/// Side of the forced order the exchange placed.
///
/// A `Sell` liquidation closes a long position, a `Buy` closes a short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    /// Forced buy (short position liquidated).
    Buy,
    /// Forced sell (long position liquidated).
    Sell,
}

impl Side {
    /// The kind of position this liquidation order closes.
    #[must_use]
    pub const fn liquidated_position(self) -> &'static str {
        match self {
            Self::Buy => "short",
            Self::Sell => "long",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => f.write_str("Buy"),
            Self::Sell => f.write_str("Sell"),
        }
    }
}

/// A single liquidation as reported by the feed.
///
/// Immutable once constructed; all construction goes through [`try_new`](Self::try_new).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidationEvent {
    order_id: OrderId,
    symbol: Symbol,
    side: Side,
    price: Decimal,
    quantity: u64,
}

impl LiquidationEvent {
    /// Create a validated liquidation event.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] if the price is not positive, the quantity
    /// is zero, the notional does not fit in a [`Decimal`], or the order id
    /// or symbol is empty.
    pub fn try_new(
        order_id: OrderId,
        symbol: Symbol,
        side: Side,
        price: Decimal,
        quantity: u64,
    ) -> Result<Self, DomainError> {
        if order_id.as_str().is_empty() {
            return Err(DomainError::EmptyOrderId);
        }
        if symbol.as_str().is_empty() {
            return Err(DomainError::EmptySymbol);
        }
        if price <= Decimal::ZERO {
            return Err(DomainError::NonPositivePrice { price });
        }
        if quantity == 0 {
            return Err(DomainError::ZeroQuantity);
        }
        if price.checked_mul(Decimal::from(quantity)).is_none() {
            return Err(DomainError::NotionalOverflow { price, quantity });
        }

        Ok(Self {
            order_id,
            symbol,
            side,
            price,
            quantity,
        })
    }

    #[must_use]
    pub const fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    #[must_use]
    pub const fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn price(&self) -> Decimal {
        self.price
    }

    /// Remaining (leaves) quantity at the time of the report.
    #[must_use]
    pub const fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Price times quantity.
    #[must_use]
    pub fn notional(&self) -> Decimal {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }
}

/// Statistical context attached to a confirmed liquidation.
///
/// Computed from the symbol's statistics *before* the event was folded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Position of this liquidation in the symbol's history (1-based).
    pub ordinal: u64,
    /// Sum of quantities of all earlier liquidations on the symbol.
    pub prior_total_quantity: u64,
    /// Sum of notionals of all earlier liquidations on the symbol.
    pub prior_total_notional: Decimal,
    /// Strictly larger than every earlier liquidation on the symbol.
    pub record: bool,
    /// 1-based rank by quantity among the recent liquidations plus this one.
    pub rank: usize,
    /// Number of recent liquidations the rank was computed against.
    pub window_len: usize,
}

impl Annotation {
    /// Size of the set the rank refers to (recent history plus this event).
    #[must_use]
    pub const fn rank_of(&self) -> usize {
        self.window_len + 1
    }
}

/// A liquidation decorated with its statistical context.
///
/// Carries everything needed to render the outbound notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedLiquidation {
    event: LiquidationEvent,
    annotation: Annotation,
}

impl AnnotatedLiquidation {
    #[must_use]
    pub const fn new(event: LiquidationEvent, annotation: Annotation) -> Self {
        Self { event, annotation }
    }

    #[must_use]
    pub const fn event(&self) -> &LiquidationEvent {
        &self.event
    }

    #[must_use]
    pub const fn annotation(&self) -> &Annotation {
        &self.annotation
    }

    /// Cumulative quantity on the symbol including this liquidation.
    #[must_use]
    pub const fn total_quantity(&self) -> u64 {
        self.annotation
            .prior_total_quantity
            .saturating_add(self.event.quantity)
    }
}

impl fmt::Display for AnnotatedLiquidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = &self.event;
        let annotation = &self.annotation;

        if annotation.record {
            f.write_str("New record! ")?;
        }
        write!(
            f,
            "Liquidated {} on {}: {} {} @ {} (#{}, rank {} of {} recent, {} total)",
            event.side.liquidated_position(),
            event.symbol,
            event.side,
            group_thousands(event.quantity),
            event.price.normalize(),
            annotation.ordinal,
            annotation.rank,
            annotation.rank_of(),
            group_thousands(self.total_quantity()),
        )
    }
}

/// Render an integer with `,` thousands separators.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
