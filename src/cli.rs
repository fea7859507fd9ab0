//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::domain::config::{validate_bot_config, BotConfig};
use crate::domain::error::SwingtraderError;
use crate::domain::simulation::SimulationReport;
use crate::jobs::context::JobContext;
use crate::jobs::{check_market, initial_load, maintenance, run_job, update_indicators};
use crate::logging::{init_tracing, LogFormat};
use crate::ports::config_port::ConfigPort;

#[derive(Parser, Debug)]
#[command(name = "swingtrader", about = "Daily swing-trading indicator engine")]
pub struct Cli {
    #[arg(short, long, global = true, default_value = "swingtrader.ini")]
    pub config: PathBuf,

    /// Run as if today were this date (YYYY-MM-DD)
    #[arg(long, global = true)]
    pub date: Option<NaiveDate>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Seed every admissible symbol from its history
    Seed,
    /// Record whether today is a trading session
    CheckMarket,
    /// Apply yesterday's bar to every tracked symbol
    Update,
    /// List entry signals at the latest date
    Signals,
    /// Print the latest record for a symbol
    Show { symbol: String },
    /// Check that every symbol has a record at the latest date
    Verify,
    /// Delete the latest date's records and step back one date
    Rollback,
    /// Paper-trade the stored history
    Simulate,
    /// Validate the configuration file
    Validate,
}

pub fn run(cli: Cli) -> ExitCode {
    let adapter = match load_config(&cli.config) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let format = match log_format(&adapter) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    init_tracing(format);

    let bot_config = match BotConfig::from_config(&adapter)
        .and_then(|c| validate_bot_config(&c).map(|()| c))
    {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    if let Command::Validate = cli.command {
        println!("configuration OK");
        return ExitCode::SUCCESS;
    }

    let today = cli
        .date
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    match dispatch(&adapter, bot_config, &cli.command, today) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = SwingtraderError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn log_format(config: &dyn ConfigPort) -> Result<LogFormat, SwingtraderError> {
    match config.get_string("logging", "format") {
        None => Ok(LogFormat::default()),
        Some(value) => LogFormat::parse(&value).ok_or_else(|| SwingtraderError::ConfigInvalid {
            section: "logging".into(),
            key: "format".into(),
            reason: format!("unknown format '{value}' (expected pretty or json)"),
        }),
    }
}

pub fn market_data_from_config(config: &dyn ConfigPort) -> Result<CsvAdapter, SwingtraderError> {
    let dir = config
        .get_string("data", "csv_dir")
        .ok_or_else(|| SwingtraderError::ConfigMissing {
            section: "data".into(),
            key: "csv_dir".into(),
        })?;
    Ok(CsvAdapter::new(PathBuf::from(dir)))
}

#[cfg(feature = "sqlite")]
fn dispatch(
    adapter: &FileConfigAdapter,
    bot_config: BotConfig,
    command: &Command,
    today: NaiveDate,
) -> Result<(), SwingtraderError> {
    use crate::adapters::sqlite_adapter::SqliteAdapter;

    let store = SqliteAdapter::from_config(adapter)?;
    store.initialize_schema()?;
    let market_data = market_data_from_config(adapter)?;
    let notifier = LogNotifier;
    let ctx = JobContext::new(&store, &market_data, &notifier, bot_config);

    execute(&ctx, command, today)
}

#[cfg(not(feature = "sqlite"))]
fn dispatch(
    _adapter: &FileConfigAdapter,
    _bot_config: BotConfig,
    _command: &Command,
    _today: NaiveDate,
) -> Result<(), SwingtraderError> {
    Err(SwingtraderError::ConfigInvalid {
        section: "sqlite".into(),
        key: "path".into(),
        reason: "built without the sqlite feature".into(),
    })
}

/// Run one command against an assembled context.
pub fn execute(
    ctx: &JobContext<'_>,
    command: &Command,
    today: NaiveDate,
) -> Result<(), SwingtraderError> {
    match command {
        Command::Seed => {
            let report = run_job(ctx, "initial load", |c| initial_load::initial_load(c, today))?;
            println!(
                "seeded {} symbols through {} ({} skipped, {} already tracked)",
                report.seeded.len(),
                report.latest_date,
                report.skipped.len(),
                report.already_tracked
            );
            for skipped in &report.skipped {
                println!("  skipped {}: {:?}", skipped.symbol, skipped.reason);
            }
        }
        Command::CheckMarket => {
            let status = run_job(ctx, "market check", |c| check_market::check_market(c, today))?;
            println!(
                "market {} on {today}",
                if status.market_is_open { "open" } else { "closed" }
            );
        }
        Command::Update => {
            let report = run_job(ctx, "indicator update", |c| {
                update_indicators::update_indicators(c, today)
            })?;
            if !report.market_was_open {
                println!("market was closed; nothing to update");
            } else {
                println!(
                    "advanced {}, resumed {}, re-seeded {}, dropped {}",
                    report.advanced.len(),
                    report.resumed.len(),
                    report.reseeded.len(),
                    report.dropped.len()
                );
            }
        }
        Command::Signals => {
            for (symbol, signal, close) in maintenance::show_entries(ctx)? {
                println!("{symbol:<8} {signal:?} close {close:.2}");
            }
        }
        Command::Show { symbol } => match maintenance::show_asset(ctx, symbol)? {
            Some(asset) => {
                println!("{} {}", asset.symbol, asset.date);
                println!("  close        {:.2}", asset.close);
                println!("  macd         {:.4} (signal {:.4})", asset.macd, asset.macd_signal);
                println!("  rsi window   {:?}", asset.rsi_window.to_vec());
                println!("  trend window {:?}", asset.trend_window.to_vec());
            }
            None => println!("{symbol} is not tracked"),
        },
        Command::Verify => {
            let report = maintenance::verify_latest(ctx)?;
            if report.is_consistent() {
                println!("{} symbols at {}", report.tracked, report.latest_date);
            } else {
                println!("missing at {}: {:?}", report.latest_date, report.missing);
                return Err(SwingtraderError::DateSkew {
                    symbol: report.missing.join(","),
                    expected: report.latest_date,
                    found: None,
                });
            }
        }
        Command::Rollback => {
            let report = maintenance::rollback_latest(ctx)?;
            println!(
                "removed {} records at {}; latest date is now {}",
                report.deleted, report.removed_date, report.restored_date
            );
        }
        Command::Simulate => print_simulation(&maintenance::run_simulation(ctx)?),
        Command::Validate => println!("configuration OK"),
    }
    Ok(())
}

fn print_simulation(report: &SimulationReport) {
    for trade in &report.trades {
        println!(
            "{:<8} {} -> {} {:>6} @ {:.2} -> {:.2} ({:?}) pnl {:.2}",
            trade.symbol,
            trade.entry_date,
            trade.exit_date,
            trade.quantity,
            trade.entry_price,
            trade.exit_price,
            trade.reason,
            trade.pnl()
        );
    }
    println!(
        "funds {:.2} -> {:.2} ({:+.2}%) over {} days, {} entries skipped",
        report.starting_funds,
        report.final_funds,
        report.roi_percent(),
        report.days_covered(),
        report.skipped_entries
    );
}
