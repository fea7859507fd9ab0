//! Position lifecycle decisions: reconciliation, target latching, exits,
//! entry planning and protective stops.
//!
//! Everything here is pure. The trade jobs feed in broker observations and
//! turn the returned decisions into broker calls.

use std::collections::BTreeSet;

use crate::domain::error::SwingtraderError;
use crate::domain::order::{OrderFill, OrderIntent, OrderKind, OrderSide, OrderStatus};
use crate::domain::position::{HeldPosition, HeldPositions};
use crate::domain::signal::{self, IndicatorView, Signal};
use crate::domain::sizing;
use crate::domain::tracked_asset::TrackedAsset;

/// Symbols that must not be entered again this cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExclusionList {
    symbols: BTreeSet<String>,
}

impl ExclusionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the symbol was already excluded.
    pub fn add(&mut self, symbol: &str) -> bool {
        self.symbols.insert(symbol.to_string())
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// Drop every locally held symbol the broker no longer reports. Each
/// dropped symbol is excluded from re-entry; the dropped symbols are
/// returned in order.
pub fn reconcile(
    held: &mut HeldPositions,
    broker_symbols: &BTreeSet<String>,
    exclusions: &mut ExclusionList,
) -> Vec<String> {
    let exited: Vec<String> = held
        .symbols()
        .into_iter()
        .filter(|s| !broker_symbols.contains(s))
        .collect();
    for symbol in &exited {
        held.remove(symbol);
        exclusions.add(symbol);
    }
    exited
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionReview {
    /// The target latch flipped during this review.
    pub target_reached: bool,
    /// The position should be closed.
    pub exit: bool,
}

/// Check one held position against its latest record. The target latch is
/// only evaluated while unset and needs the broker's average entry price;
/// the exit only fires once the target has been met.
pub fn review_position(
    position: &mut HeldPosition,
    asset: &TrackedAsset,
    entry_price: Option<f64>,
    target_percent: f64,
) -> Result<PositionReview, SwingtraderError> {
    let mut review = PositionReview::default();

    if !position.target_met {
        let entry_price = entry_price.ok_or_else(|| SwingtraderError::InvariantViolation {
            reason: format!(
                "missing average entry price for {}, cannot determine target",
                position.symbol
            ),
        })?;
        if sizing::target_reached(entry_price, asset.close, target_percent, position.is_long) {
            review.target_reached = position.mark_target_met();
        }
    }

    if position.target_met {
        let view = IndicatorView {
            macd: asset.macd,
            macd_signal: asset.macd_signal,
            rsi_window: &[],
            trend_window: &[],
        };
        review.exit = matches!(
            signal::evaluate_exit(&view, position.is_long),
            Signal::LongExit | Signal::ShortExit
        );
    }

    Ok(review)
}

#[derive(Debug, Clone, PartialEq)]
pub struct EntryCandidate {
    pub symbol: String,
    pub close: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntryRejection {
    PriceAboveAllocation { price: f64, allocation: f64 },
    NotShortable,
    MaxPositionsReached,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryPlan {
    pub orders: Vec<OrderIntent>,
    pub rejected: Vec<(String, EntryRejection)>,
    pub allocation: f64,
}

/// Size and order entries for one direction.
///
/// The per-slot allocation is fixed from `cash` and the open count before
/// the first order. When there are more candidates than free slots they
/// are taken cheapest close first. `eligible` is asked only for candidates
/// that would otherwise be ordered; a `false` answer does not use a slot.
pub fn plan_entries<F>(
    mut candidates: Vec<EntryCandidate>,
    is_long: bool,
    cash: f64,
    max_positions: usize,
    open_positions: usize,
    mut eligible: F,
) -> Result<EntryPlan, SwingtraderError>
where
    F: FnMut(&str) -> Result<bool, SwingtraderError>,
{
    let mut plan = EntryPlan::default();
    let Some(allocation) = sizing::slot_allocation(cash, max_positions, open_positions) else {
        plan.rejected = candidates
            .into_iter()
            .map(|c| (c.symbol, EntryRejection::MaxPositionsReached))
            .collect();
        return Ok(plan);
    };
    plan.allocation = allocation;

    if open_positions + candidates.len() > max_positions {
        candidates.sort_by(|a, b| a.close.total_cmp(&b.close));
    }

    let mut open = open_positions;
    for candidate in candidates {
        if open >= max_positions {
            plan.rejected
                .push((candidate.symbol, EntryRejection::MaxPositionsReached));
            continue;
        }
        let Some(quantity) = sizing::entry_quantity(allocation, candidate.close) else {
            plan.rejected.push((
                candidate.symbol,
                EntryRejection::PriceAboveAllocation {
                    price: candidate.close,
                    allocation,
                },
            ));
            continue;
        };
        if !eligible(&candidate.symbol)? {
            plan.rejected
                .push((candidate.symbol, EntryRejection::NotShortable));
            continue;
        }
        plan.orders.push(OrderIntent {
            symbol: candidate.symbol,
            side: OrderSide::opening(is_long),
            quantity,
            kind: OrderKind::Market,
        });
        open += 1;
    }

    Ok(plan)
}

/// Protective stop for a position whose entry order must now be filled.
pub fn plan_stop(
    position: &HeldPosition,
    fill: &OrderFill,
    stop_loss_percent: f64,
) -> Result<OrderIntent, SwingtraderError> {
    if fill.status != OrderStatus::Filled {
        return Err(SwingtraderError::OrderNotFilled {
            symbol: position.symbol.clone(),
            status: fill.status.to_string(),
        });
    }
    let fill_price = fill
        .filled_average_price
        .ok_or_else(|| SwingtraderError::InvariantViolation {
            reason: format!("filled entry for {} has no average price", position.symbol),
        })?;

    Ok(OrderIntent {
        symbol: position.symbol.clone(),
        side: OrderSide::closing(position.is_long),
        quantity: fill.filled_quantity,
        kind: OrderKind::Stop {
            stop_price: sizing::stop_price(fill_price, stop_loss_percent, position.is_long),
        },
    })
}
