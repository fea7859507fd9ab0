//! Held positions and their lifecycle phase.

use std::collections::BTreeMap;

/// Where a held position is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionPhase {
    /// Entry order submitted; the protective stop is placed once the fill
    /// is confirmed.
    AwaitingStop,
    Entered,
    TargetMet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeldPosition {
    pub symbol: String,
    pub order_id: String,
    pub is_long: bool,
    pub target_met: bool,
    pub stop_order_id: Option<String>,
}

impl HeldPosition {
    /// A position whose entry order was just submitted.
    pub fn pending(symbol: &str, order_id: &str, is_long: bool) -> Self {
        HeldPosition {
            symbol: symbol.to_string(),
            order_id: order_id.to_string(),
            is_long,
            target_met: false,
            stop_order_id: None,
        }
    }

    pub fn phase(&self) -> PositionPhase {
        if self.stop_order_id.is_none() {
            PositionPhase::AwaitingStop
        } else if self.target_met {
            PositionPhase::TargetMet
        } else {
            PositionPhase::Entered
        }
    }

    /// Latch the target. Returns true only on the false -> true transition.
    pub fn mark_target_met(&mut self) -> bool {
        let changed = !self.target_met;
        self.target_met = true;
        changed
    }
}

/// Symbol-keyed held positions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeldPositions {
    positions: BTreeMap<String, HeldPosition>,
}

impl HeldPositions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_positions(positions: Vec<HeldPosition>) -> Self {
        HeldPositions {
            positions: positions
                .into_iter()
                .map(|p| (p.symbol.clone(), p))
                .collect(),
        }
    }

    pub fn insert(&mut self, position: HeldPosition) {
        self.positions.insert(position.symbol.clone(), position);
    }

    pub fn get(&self, symbol: &str) -> Option<&HeldPosition> {
        self.positions.get(symbol)
    }

    pub fn get_mut(&mut self, symbol: &str) -> Option<&mut HeldPosition> {
        self.positions.get_mut(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.positions.contains_key(symbol)
    }

    pub fn remove(&mut self, symbol: &str) -> Option<HeldPosition> {
        self.positions.remove(symbol)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn symbols(&self) -> Vec<String> {
        self.positions.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeldPosition> {
        self.positions.values()
    }

    pub fn into_vec(self) -> Vec<HeldPosition> {
        self.positions.into_values().collect()
    }
}
