//! Domain error types and their cycle-handling classification.

use chrono::NaiveDate;

/// Why a symbol's bar series failed the liquidity check.
#[derive(Debug, Clone, PartialEq)]
pub enum VolumeIssue {
    BelowFloor { average: f64, floor: f64 },
    ZeroVolumeBar { date: NaiveDate },
}

impl std::fmt::Display for VolumeIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VolumeIssue::BelowFloor { average, floor } => {
                write!(f, "average volume {average:.0} below floor {floor:.0}")
            }
            VolumeIssue::ZeroVolumeBar { date } => write!(f, "zero traded volume on {date}"),
        }
    }
}

/// How a failed cycle should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A data source or broker call failed. Retried by the next scheduled run.
    TransientExternal,
    /// Stored state disagrees with itself or with the outside world.
    DataConsistency,
    /// A live position or record is missing something it must have.
    InvariantViolation,
    /// A symbol was rejected by an admission check. Never aborts a cycle.
    Admission,
    Configuration,
}

/// Top-level error type for swingtrader.
#[derive(Debug, thiserror::Error)]
pub enum SwingtraderError {
    #[error("database error: {reason}")]
    Database { reason: String },

    #[error("database query error: {reason}")]
    DatabaseQuery { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {symbol}")]
    NoData { symbol: String },

    #[error("rate limited by {provider}")]
    RateLimited { provider: String },

    #[error("data source error: {reason}")]
    DataSource { reason: String },

    #[error("broker error during {operation}: {reason}")]
    Broker { operation: String, reason: String },

    #[error("insufficient history for {symbol}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        symbol: String,
        bars: usize,
        minimum: usize,
    },

    #[error("suspicious volume for {symbol}: {issue}")]
    SuspiciousVolume { symbol: String, issue: VolumeIssue },

    #[error("non-monotonic date for {symbol}: state at {current}, tick at {attempted}")]
    NonMonotonicDate {
        symbol: String,
        current: NaiveDate,
        attempted: NaiveDate,
    },

    #[error("date skew for {symbol}: expected {expected}, found {found:?}")]
    DateSkew {
        symbol: String,
        expected: NaiveDate,
        found: Option<NaiveDate>,
    },

    #[error("market status out of sync: stored day {stored_day}, expected day {expected_day}")]
    MarketOutOfSync { stored_day: u32, expected_day: u32 },

    #[error("expected exactly one bar for {symbol}, got {count}")]
    UnexpectedBarCount { symbol: String, count: usize },

    #[error("unexpected bar date for {symbol}: expected {expected}, got {found}")]
    UnexpectedBarDate {
        symbol: String,
        expected: NaiveDate,
        found: NaiveDate,
    },

    #[error("duplicate record for {symbol} on {date}")]
    DuplicateRecord { symbol: String, date: NaiveDate },

    #[error("unexpected number of open orders for {symbol}: {count}")]
    UnexpectedOpenOrders { symbol: String, count: usize },

    #[error("entry order for {symbol} not filled (status: {status})")]
    OrderNotFilled { symbol: String, status: String },

    #[error("unsupported corporate action for {symbol}: {action}")]
    UnsupportedCorporateAction { symbol: String, action: String },

    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SwingtraderError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwingtraderError::Database { .. }
            | SwingtraderError::DatabaseQuery { .. }
            | SwingtraderError::NoData { .. }
            | SwingtraderError::RateLimited { .. }
            | SwingtraderError::DataSource { .. }
            | SwingtraderError::Broker { .. }
            | SwingtraderError::UnexpectedBarCount { .. } => ErrorKind::TransientExternal,
            SwingtraderError::NonMonotonicDate { .. }
            | SwingtraderError::DateSkew { .. }
            | SwingtraderError::MarketOutOfSync { .. }
            | SwingtraderError::UnexpectedBarDate { .. }
            | SwingtraderError::DuplicateRecord { .. }
            | SwingtraderError::UnexpectedOpenOrders { .. }
            | SwingtraderError::OrderNotFilled { .. } => ErrorKind::DataConsistency,
            SwingtraderError::InvariantViolation { .. }
            | SwingtraderError::UnsupportedCorporateAction { .. } => {
                ErrorKind::InvariantViolation
            }
            SwingtraderError::InsufficientHistory { .. }
            | SwingtraderError::SuspiciousVolume { .. } => ErrorKind::Admission,
            SwingtraderError::ConfigParse { .. }
            | SwingtraderError::ConfigMissing { .. }
            | SwingtraderError::ConfigInvalid { .. }
            | SwingtraderError::Io(_) => ErrorKind::Configuration,
        }
    }

    pub fn broker(operation: &str, reason: impl std::fmt::Display) -> Self {
        SwingtraderError::Broker {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<&SwingtraderError> for std::process::ExitCode {
    fn from(err: &SwingtraderError) -> Self {
        let code: u8 = match err.kind() {
            ErrorKind::Configuration => 2,
            ErrorKind::TransientExternal => 3,
            ErrorKind::DataConsistency => 4,
            ErrorKind::InvariantViolation => 5,
            ErrorKind::Admission => 6,
        };
        std::process::ExitCode::from(code)
    }
}
