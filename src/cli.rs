//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::advisor_gate::{AutoApproveGate, RsiAdvisorGate};
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig, BacktestResult};
use crate::domain::bar::PriceBar;
use crate::domain::config_validation::{
    validate_backtest_config, GateMode, GateParams, StrategyParams,
};
use crate::domain::engine::{generate_signals, AuxSeries};
use crate::domain::error::EmacrossError;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::signal::Signal;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::PriceDataPort;
use crate::ports::gate_port::ConfirmationGate;

#[derive(Parser, Debug)]
#[command(name = "emacross", about = "Dual-EMA crossover signal engine and backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest over a bar series
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Override [data] csv_path
        #[arg(long)]
        csv: Option<PathBuf>,
        /// Write the trade ledger to a CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List crossover signals without running a backtest
    Signals {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Show bar count and data range for a CSV file
    Info {
        #[arg(long)]
        csv: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            csv,
            output,
        } => run_backtest(&config, csv.as_ref(), output.as_ref()),
        Command::Signals { config, csv } => run_signals(&config, csv.as_ref()),
        Command::Validate { config } => run_validate(&config),
        Command::Info { csv } => run_info(&csv),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EmacrossError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

pub fn build_strategy_params(adapter: &dyn ConfigPort) -> Result<StrategyParams, EmacrossError> {
    StrategyParams::new(
        adapter.get_int("strategy", "fast_period", 8),
        adapter.get_int("strategy", "slow_period", 21),
        adapter.get_double("strategy", "position_size", 1.0),
    )
}

pub fn build_gate_params(adapter: &dyn ConfigPort) -> Result<GateParams, EmacrossError> {
    let mode: GateMode = adapter
        .get_string("gate", "mode")
        .unwrap_or_else(|| "off".to_string())
        .parse()?;
    GateParams::new(
        mode,
        adapter.get_double("gate", "overbought", 70.0),
        adapter.get_double("gate", "oversold", 30.0),
    )
}

pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    strategy: &StrategyParams,
) -> Result<BacktestConfig, EmacrossError> {
    validate_backtest_config(
        adapter.get_double("backtest", "initial_equity", 10_000.0),
        strategy.position_size,
        adapter.get_double("backtest", "risk_free_rate", 0.0),
    )
}

pub fn build_gate(params: &GateParams) -> Option<Box<dyn ConfirmationGate>> {
    match params.mode {
        GateMode::Off => None,
        GateMode::Auto => Some(Box::new(AutoApproveGate)),
        GateMode::Rsi => Some(Box::new(RsiAdvisorGate::new(
            params.overbought,
            params.oversold,
        ))),
    }
}

fn resolve_csv_path(
    adapter: &dyn ConfigPort,
    csv_override: Option<&PathBuf>,
) -> Result<PathBuf, EmacrossError> {
    match csv_override {
        Some(path) => Ok(path.clone()),
        None => adapter
            .get_string("data", "csv_path")
            .map(PathBuf::from)
            .ok_or_else(|| EmacrossError::ConfigMissing {
                section: "data".into(),
                key: "csv_path".into(),
            }),
    }
}

struct LoadedSeries {
    bars: Vec<PriceBar>,
    signals: Vec<Signal>,
}

/// Stages shared by `backtest` and `signals`: load bars, compute the EMA
/// pair and the auxiliary panel, run the crossover engine.
fn load_and_generate(
    config_path: &PathBuf,
    csv_override: Option<&PathBuf>,
) -> Result<(FileConfigAdapter, StrategyParams, LoadedSeries), ExitCode> {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = load_config(config_path)?;

    // Stage 2: Validate parameters
    let strategy = build_strategy_params(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    let gate_params = build_gate_params(&adapter).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;

    // Stage 3: Fetch bars
    let csv_path = resolve_csv_path(&adapter, csv_override).map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;
    eprintln!("Loading bars from {}", csv_path.display());
    let data_port = CsvAdapter::new(csv_path);
    let bars = data_port.fetch_bars().map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;

    if bars.len() < strategy.minimum_bars() {
        let err = EmacrossError::InsufficientData {
            bars: bars.len(),
            minimum: strategy.minimum_bars(),
        };
        eprintln!("error: {err}");
        return Err(ExitCode::from(&err));
    }

    // Stage 4: Indicators and signals
    eprintln!(
        "Computing EMA({}) / EMA({}) over {} bars",
        strategy.fast_period,
        strategy.slow_period,
        bars.len()
    );
    let fast = calculate_ema(&bars, strategy.fast_period);
    let slow = calculate_ema(&bars, strategy.slow_period);
    let aux = AuxSeries::compute(&bars);
    let gate = build_gate(&gate_params);

    let signals = generate_signals(
        &bars,
        &fast,
        &slow,
        &aux,
        gate.as_deref(),
        strategy.position_size,
    )
    .map_err(|e| {
        eprintln!("error: {e}");
        ExitCode::from(&e)
    })?;

    eprintln!("Generated {} signals", signals.len());
    Ok((adapter, strategy, LoadedSeries { bars, signals }))
}

fn run_backtest(
    config_path: &PathBuf,
    csv_override: Option<&PathBuf>,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    let (adapter, strategy, series) = match load_and_generate(config_path, csv_override) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    let bt_config = match build_backtest_config(&adapter, &strategy) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    eprintln!(
        "Running backtest: {} to {}",
        series.bars.first().map(|b| b.timestamp.to_string()).unwrap_or_default(),
        series.bars.last().map(|b| b.timestamp.to_string()).unwrap_or_default(),
    );

    let result = match backtest_engine::run_backtest(&series.bars, &series.signals, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    print_summary(&result);

    if let Some(path) = output_path {
        if let Err(e) = export_trades(&result, path) {
            eprintln!("error: failed to write trade ledger: {e}");
            return (&e).into();
        }
        eprintln!("\nTrade ledger written to: {}", path.display());
    }

    ExitCode::SUCCESS
}

fn print_summary(result: &BacktestResult) {
    let m = &result.metrics;
    eprintln!("\n=== Backtest Results ===");
    eprintln!("Total Return:     {:.2}%", m.total_return * 100.0);
    eprintln!("Sharpe Ratio:     {:.2}", m.sharpe_ratio);
    eprintln!("Max Drawdown:     -{:.1}%", m.max_drawdown * 100.0);
    eprintln!("Total Trades:     {}", result.trades.len());
    match m.win_rate {
        Some(rate) => eprintln!("Win Rate:         {:.1}%", rate * 100.0),
        None => eprintln!("Win Rate:         n/a"),
    }
    match m.profit_factor {
        Some(pf) => eprintln!("Profit Factor:    {:.2}", pf),
        None => eprintln!("Profit Factor:    n/a"),
    }
    eprintln!(
        "Won/Lost/Flat:    {}/{}/{}",
        m.trades_won, m.trades_lost, m.trades_breakeven
    );
    if m.trades_won > 0 {
        eprintln!("Largest Win:      {:.2}", m.largest_win);
    }
    if m.trades_lost > 0 {
        eprintln!("Largest Loss:     {:.2}", m.largest_loss);
    }
}

fn export_trades(result: &BacktestResult, path: &PathBuf) -> Result<(), EmacrossError> {
    let mut wtr = csv::Writer::from_path(path)
        .map_err(|e| EmacrossError::Data {
            reason: format!("cannot open {}: {}", path.display(), e),
        })?;

    wtr.write_record([
        "side",
        "size",
        "entry_timestamp",
        "entry_price",
        "exit_timestamp",
        "exit_price",
        "pnl",
        "exit_reason",
    ])
    .map_err(|e| EmacrossError::Data {
        reason: format!("CSV write error: {}", e),
    })?;

    for trade in &result.trades {
        wtr.write_record([
            trade.side.to_string(),
            format!("{}", trade.size),
            trade.entry_timestamp.to_string(),
            format!("{}", trade.entry_price),
            trade.exit_timestamp.to_string(),
            format!("{}", trade.exit_price),
            format!("{}", trade.pnl),
            trade.exit_reason.to_string(),
        ])
        .map_err(|e| EmacrossError::Data {
            reason: format!("CSV write error: {}", e),
        })?;
    }

    wtr.flush().map_err(EmacrossError::from)?;
    Ok(())
}

fn run_signals(config_path: &PathBuf, csv_override: Option<&PathBuf>) -> ExitCode {
    let (_, _, series) = match load_and_generate(config_path, csv_override) {
        Ok(loaded) => loaded,
        Err(code) => return code,
    };

    if series.signals.is_empty() {
        eprintln!("\nNo crossover signals in this series");
        return ExitCode::SUCCESS;
    }

    eprintln!("\n=== Signals ===");
    for signal in &series.signals {
        let confirmation = match signal.confirmation {
            Some(decision) => format!("  [{decision:?}]"),
            None => String::new(),
        };
        println!(
            "{}  {:<12} @ {:.4}{}",
            signal.timestamp, signal.kind.to_string(), signal.price, confirmation
        );
    }
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let strategy = match build_strategy_params(&adapter) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    if let Err(e) = build_gate_params(&adapter) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = build_backtest_config(&adapter, &strategy) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    if let Err(e) = resolve_csv_path(&adapter, None) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!("Config validated successfully");
    eprintln!(
        "  strategy: EMA({}) / EMA({}), size {}",
        strategy.fast_period, strategy.slow_period, strategy.position_size
    );
    ExitCode::SUCCESS
}

fn run_info(csv_path: &PathBuf) -> ExitCode {
    let data_port = CsvAdapter::new(csv_path.clone());
    match data_port.data_range() {
        Ok(Some((first, last, count))) => {
            println!("{}: {} bars, {} to {}", csv_path.display(), count, first, last);
            ExitCode::SUCCESS
        }
        Ok(None) => {
            println!("{}: no bars", csv_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}
