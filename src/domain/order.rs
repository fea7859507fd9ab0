//! Broker-agnostic order vocabulary.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Side that opens a position in the given direction.
    pub fn opening(is_long: bool) -> Self {
        if is_long { OrderSide::Buy } else { OrderSide::Sell }
    }

    /// Side that closes a position in the given direction.
    pub fn closing(is_long: bool) -> Self {
        Self::opening(!is_long)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "buy",
            OrderSide::Sell => "sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OrderKind {
    /// Market order valid for the day.
    Market,
    /// Good-till-cancelled stop.
    Stop { stop_price: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderIntent {
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u64,
    pub kind: OrderKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderStatus {
    New,
    PartiallyFilled,
    Filled,
    Canceled,
    Rejected,
    Other(String),
}

impl OrderStatus {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "new" | "accepted" | "pending_new" => OrderStatus::New,
            "partially_filled" => OrderStatus::PartiallyFilled,
            "filled" => OrderStatus::Filled,
            "canceled" | "cancelled" => OrderStatus::Canceled,
            "rejected" => OrderStatus::Rejected,
            other => OrderStatus::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => f.write_str("new"),
            OrderStatus::PartiallyFilled => f.write_str("partially_filled"),
            OrderStatus::Filled => f.write_str("filled"),
            OrderStatus::Canceled => f.write_str("canceled"),
            OrderStatus::Rejected => f.write_str("rejected"),
            OrderStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Broker-reported state of one order.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderFill {
    pub status: OrderStatus,
    pub filled_quantity: u64,
    pub filled_average_price: Option<f64>,
}
