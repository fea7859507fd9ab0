//! Typed bot configuration and its validation.
//!
//! Every key has a default; `validate_bot_config` rejects combinations the
//! indicator engine or the lifecycle cannot work with.

use crate::domain::admission::{self, DEFAULT_EXCLUDED, DEFAULT_MIN_AVERAGE_VOLUME};
use crate::domain::error::SwingtraderError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::signal::{RsiWindowPolicy, SignalConfig, DEFAULT_TARGET_RSI};
use crate::domain::simulation::{SimulationConfig, DEFAULT_BUY_AMOUNT, DEFAULT_STARTING_FUNDS};
use crate::domain::sizing::{
    DEFAULT_MAX_POSITIONS, DEFAULT_STOP_LOSS_PERCENT, DEFAULT_TARGET_PERCENT,
};
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_HISTORY_POINTS: usize = 300;
pub const DEFAULT_REQUEST_DELAY_MS: u64 = 300;
pub const DEFAULT_CANCEL_SETTLE_MS: u64 = 2_000;

#[derive(Debug, Clone, PartialEq)]
pub struct UniverseConfig {
    /// Bars requested per symbol when seeding.
    pub history_points: usize,
    pub min_average_volume: f64,
    pub excluded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradingConfig {
    pub max_positions: usize,
    pub target_percent: f64,
    pub stop_loss_percent: f64,
    pub signal: SignalConfig,
    pub allow_shorting: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    pub request_delay_ms: u64,
    pub cancel_settle_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BotConfig {
    pub indicators: IndicatorParams,
    pub universe: UniverseConfig,
    pub trading: TradingConfig,
    pub api: ApiConfig,
    pub simulation: SimulationConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        let trading = TradingConfig {
            max_positions: DEFAULT_MAX_POSITIONS,
            target_percent: DEFAULT_TARGET_PERCENT,
            stop_loss_percent: DEFAULT_STOP_LOSS_PERCENT,
            signal: SignalConfig::default(),
            allow_shorting: false,
        };
        BotConfig {
            indicators: IndicatorParams::default(),
            universe: UniverseConfig {
                history_points: DEFAULT_HISTORY_POINTS,
                min_average_volume: DEFAULT_MIN_AVERAGE_VOLUME,
                excluded: DEFAULT_EXCLUDED.split(',').map(String::from).collect(),
            },
            api: ApiConfig {
                request_delay_ms: DEFAULT_REQUEST_DELAY_MS,
                cancel_settle_ms: DEFAULT_CANCEL_SETTLE_MS,
            },
            simulation: SimulationConfig {
                starting_funds: DEFAULT_STARTING_FUNDS,
                buy_amount: DEFAULT_BUY_AMOUNT,
                stop_loss_percent: trading.stop_loss_percent,
                target_percent: trading.target_percent,
                signal: trading.signal.clone(),
            },
            trading,
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> SwingtraderError {
    SwingtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn get_count(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: usize,
) -> Result<usize, SwingtraderError> {
    let value = config.get_int(section, key, default as i64);
    usize::try_from(value).map_err(|_| invalid(section, key, format!("{key} must not be negative")))
}

impl BotConfig {
    pub fn from_config(config: &dyn ConfigPort) -> Result<Self, SwingtraderError> {
        let defaults = IndicatorParams::default();
        let indicators = IndicatorParams {
            short_period: get_count(config, "indicators", "short_period", defaults.short_period)?,
            long_period: get_count(config, "indicators", "long_period", defaults.long_period)?,
            signal_period: get_count(config, "indicators", "signal_period", defaults.signal_period)?,
            rsi_period: get_count(config, "indicators", "rsi_period", defaults.rsi_period)?,
            trend_period: get_count(config, "indicators", "trend_period", defaults.trend_period)?,
            rsi_window: get_count(config, "indicators", "rsi_window", defaults.rsi_window)?,
            trend_window: get_count(config, "indicators", "trend_window", defaults.trend_window)?,
            min_seed_bars: get_count(config, "indicators", "min_seed_bars", defaults.min_seed_bars)?,
            retained_history: get_count(
                config,
                "indicators",
                "retained_history",
                defaults.retained_history,
            )?,
        };

        let excluded_raw = config
            .get_string("universe", "excluded")
            .unwrap_or_else(|| DEFAULT_EXCLUDED.to_string());
        let excluded = admission::parse_symbols(&excluded_raw)
            .map_err(|e| invalid("universe", "excluded", e.to_string()))?;
        let universe = UniverseConfig {
            history_points: get_count(config, "universe", "history_points", DEFAULT_HISTORY_POINTS)?,
            min_average_volume: config.get_double(
                "universe",
                "min_average_volume",
                DEFAULT_MIN_AVERAGE_VOLUME,
            ),
            excluded,
        };

        let rsi_policy = match config.get_string("trading", "rsi_policy") {
            None => RsiWindowPolicy::default(),
            Some(raw) => RsiWindowPolicy::parse(&raw)
                .ok_or_else(|| invalid("trading", "rsi_policy", "expected 'any' or 'latest'"))?,
        };
        let trading = TradingConfig {
            max_positions: get_count(config, "trading", "max_positions", DEFAULT_MAX_POSITIONS)?,
            target_percent: config.get_double("trading", "target_percent", DEFAULT_TARGET_PERCENT),
            stop_loss_percent: config.get_double(
                "trading",
                "stop_loss_percent",
                DEFAULT_STOP_LOSS_PERCENT,
            ),
            signal: SignalConfig {
                target_rsi: config.get_double("trading", "target_rsi", DEFAULT_TARGET_RSI),
                rsi_policy,
            },
            allow_shorting: config.get_bool("trading", "allow_shorting", false),
        };

        let api = ApiConfig {
            request_delay_ms: get_count(
                config,
                "api",
                "request_delay_ms",
                DEFAULT_REQUEST_DELAY_MS as usize,
            )? as u64,
            cancel_settle_ms: get_count(
                config,
                "api",
                "cancel_settle_ms",
                DEFAULT_CANCEL_SETTLE_MS as usize,
            )? as u64,
        };

        let simulation = SimulationConfig {
            starting_funds: config.get_double("simulation", "starting_funds", DEFAULT_STARTING_FUNDS),
            buy_amount: config.get_double("simulation", "buy_amount", DEFAULT_BUY_AMOUNT),
            stop_loss_percent: trading.stop_loss_percent,
            target_percent: trading.target_percent,
            signal: trading.signal.clone(),
        };

        Ok(BotConfig {
            indicators,
            universe,
            trading,
            api,
            simulation,
        })
    }
}

pub fn validate_bot_config(config: &BotConfig) -> Result<(), SwingtraderError> {
    validate_indicators(&config.indicators)?;
    validate_trading(&config.trading)?;
    validate_simulation(&config.simulation)?;
    if config.universe.min_average_volume < 0.0 {
        return Err(invalid(
            "universe",
            "min_average_volume",
            "min_average_volume must be non-negative",
        ));
    }
    Ok(())
}

fn validate_indicators(params: &IndicatorParams) -> Result<(), SwingtraderError> {
    let periods = [
        ("short_period", params.short_period),
        ("long_period", params.long_period),
        ("signal_period", params.signal_period),
        ("rsi_period", params.rsi_period),
        ("trend_period", params.trend_period),
        ("rsi_window", params.rsi_window),
        ("trend_window", params.trend_window),
    ];
    for (key, value) in periods {
        if value == 0 {
            return Err(invalid("indicators", key, format!("{key} must be at least 1")));
        }
    }

    if params.short_period >= params.long_period {
        return Err(invalid(
            "indicators",
            "short_period",
            "short_period must be less than long_period",
        ));
    }

    let needed = params.trend_period + params.trend_window;
    if params.min_seed_bars < needed {
        return Err(invalid(
            "indicators",
            "min_seed_bars",
            format!("min_seed_bars must be at least trend_period + trend_window ({needed})"),
        ));
    }

    // The bootstrap point must also carry a MACD signal and an RSI value.
    let bootstrap = params.trend_period;
    if bootstrap < params.long_period + params.signal_period || bootstrap < params.rsi_period + 1 {
        return Err(invalid(
            "indicators",
            "trend_period",
            "trend_period must cover long_period + signal_period and rsi_period + 1",
        ));
    }

    Ok(())
}

fn validate_percent(key: &str, value: f64) -> Result<(), SwingtraderError> {
    if value <= 0.0 || value >= 100.0 {
        return Err(invalid("trading", key, format!("{key} must be between 0 and 100")));
    }
    Ok(())
}

fn validate_trading(trading: &TradingConfig) -> Result<(), SwingtraderError> {
    if trading.max_positions < 1 {
        return Err(invalid(
            "trading",
            "max_positions",
            "max_positions must be at least 1",
        ));
    }
    validate_percent("target_percent", trading.target_percent)?;
    validate_percent("stop_loss_percent", trading.stop_loss_percent)?;

    let target_rsi = trading.signal.target_rsi;
    if target_rsi <= 0.0 || target_rsi >= 50.0 {
        return Err(invalid(
            "trading",
            "target_rsi",
            "target_rsi must be between 0 and 50",
        ));
    }
    Ok(())
}

fn validate_simulation(simulation: &SimulationConfig) -> Result<(), SwingtraderError> {
    if simulation.starting_funds <= 0.0 {
        return Err(invalid(
            "simulation",
            "starting_funds",
            "starting_funds must be positive",
        ));
    }
    if simulation.buy_amount <= 0.0 {
        return Err(invalid(
            "simulation",
            "buy_amount",
            "buy_amount must be positive",
        ));
    }
    Ok(())
}
