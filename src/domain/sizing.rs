//! Entry sizing, target thresholds and protective stop prices.

pub const DEFAULT_MAX_POSITIONS: usize = 10;
pub const DEFAULT_TARGET_PERCENT: f64 = 10.0;
pub const DEFAULT_STOP_LOSS_PERCENT: f64 = 10.0;

/// Cash available to each free slot: `cash / (max_positions - open)`.
/// `None` when every slot is taken.
pub fn slot_allocation(cash: f64, max_positions: usize, open_positions: usize) -> Option<f64> {
    if open_positions >= max_positions {
        return None;
    }
    Some(cash / (max_positions - open_positions) as f64)
}

/// Whole-share quantity for one slot, or `None` when a single share costs
/// more than the allocation.
pub fn entry_quantity(allocation: f64, price: f64) -> Option<u64> {
    if price <= 0.0 || price > allocation {
        return None;
    }
    let quantity = (allocation / price).floor() as u64;
    (quantity > 0).then_some(quantity)
}

/// Price at which a position counts as having reached its target.
pub fn target_price(entry_price: f64, target_percent: f64, is_long: bool) -> f64 {
    if is_long {
        entry_price * (100.0 + target_percent) / 100.0
    } else {
        entry_price * (100.0 - target_percent) / 100.0
    }
}

pub fn target_reached(entry_price: f64, close: f64, target_percent: f64, is_long: bool) -> bool {
    let threshold = target_price(entry_price, target_percent, is_long);
    if is_long {
        close >= threshold
    } else {
        close <= threshold
    }
}

/// Price at which a position is stopped out: below the entry for longs,
/// above it for shorts.
pub fn stop_level(entry_price: f64, stop_loss_percent: f64, is_long: bool) -> f64 {
    if is_long {
        entry_price * (100.0 - stop_loss_percent) / 100.0
    } else {
        entry_price * (100.0 + stop_loss_percent) / 100.0
    }
}

/// Protective stop price for a confirmed fill, rounded to cents.
pub fn stop_price(fill_price: f64, stop_loss_percent: f64, is_long: bool) -> f64 {
    round_cents(stop_level(fill_price, stop_loss_percent, is_long))
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
