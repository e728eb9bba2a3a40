//! DMR Lab CLI — dual momentum rotation backtests from CSV price files.
//!
//! Commands:
//! - `backtest`: train the risk model, optimize windows, compare DMR / DMR-ML /
//!   buy-and-hold and save artifacts
//! - `optimize`: print the parameter grid and its best cell
//! - `signal`: print today's rotation signal
//! - `sensitivity`: sweep each window around a base value

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dmrlab_core::data::AlignedPair;
use dmrlab_core::signal::Signal;
use dmrlab_core::walk_forward::{RiskForecast, RiskSeries};
use dmrlab_runner::sensitivity::{DEFAULT_MA_DELTA, DEFAULT_MOMENTUM_DELTA};
use dmrlab_runner::{
    analyze_sensitivity, compare_strategies, daily_signal, load_pair, save_artifacts, save_grid,
    save_json, train_risk_model, CellStatus, DmrConfig, OptimizationResult, Optimizer,
    SensitivityPoint,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "dmrlab",
    about = "DMR Lab — dual momentum rotation backtester with an ML risk gate"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// CSV for asset A (date,close,pct_chg,volume).
    #[arg(long)]
    asset_a: PathBuf,

    /// CSV for asset B (date,close,pct_chg,volume).
    #[arg(long)]
    asset_b: PathBuf,

    /// TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Train, optimize, compare strategies and save artifacts.
    Backtest {
        #[command(flatten)]
        data: DataArgs,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Grid-search the momentum and MA windows.
    Optimize {
        #[command(flatten)]
        data: DataArgs,

        /// Also write grid.csv here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Print today's signal at the configured default windows.
    Signal {
        #[command(flatten)]
        data: DataArgs,

        /// Skip the risk model; the gate never trips.
        #[arg(long, default_value_t = false)]
        no_ml: bool,

        /// Print the signal as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Sweep each window around a base value.
    Sensitivity {
        #[command(flatten)]
        data: DataArgs,

        /// Base momentum window.
        #[arg(long)]
        momentum: usize,

        /// Base MA window.
        #[arg(long)]
        ma: usize,

        #[arg(long, default_value_t = DEFAULT_MOMENTUM_DELTA)]
        momentum_delta: usize,

        #[arg(long, default_value_t = DEFAULT_MA_DELTA)]
        ma_delta: usize,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Backtest { data, output_dir } => run_backtest_cmd(&data, &output_dir),
        Commands::Optimize { data, output_dir } => run_optimize(&data, output_dir.as_deref()),
        Commands::Signal { data, no_ml, json } => run_signal(&data, no_ml, json),
        Commands::Sensitivity {
            data,
            momentum,
            ma,
            momentum_delta,
            ma_delta,
        } => run_sensitivity(&data, momentum, ma, momentum_delta, ma_delta),
    }
}

fn load_inputs(data: &DataArgs) -> Result<(DmrConfig, AlignedPair)> {
    let config = match &data.config {
        Some(path) => DmrConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => DmrConfig::default(),
    };
    let pair = load_pair(&data.asset_a, &data.asset_b).context("loading price data")?;
    if pair.is_empty() {
        anyhow::bail!(
            "{} and {} share no dates",
            data.asset_a.display(),
            data.asset_b.display()
        );
    }
    Ok((config, pair))
}

fn run_backtest_cmd(data: &DataArgs, output_dir: &Path) -> Result<()> {
    let (config, pair) = load_inputs(data)?;

    let forecast = train_risk_model(&pair, &config).context("training risk model")?;
    print_forecast_summary(&forecast);
    let risk = forecast.series();

    let optimizer = Optimizer::from_config(&config)?;
    let grid = optimizer.optimize(
        &pair,
        &config.strategy.momentum_range.values(),
        &config.strategy.ma_range.values(),
    )
    .context("running grid search")?;
    let (momentum, ma) = match &grid.best {
        Some(best) => (best.parameters.momentum_window, best.parameters.ma_window),
        None => {
            tracing::warn!("no grid cell passed, falling back to default windows");
            (
                config.strategy.default_momentum_window,
                config.strategy.default_ma_window,
            )
        }
    };
    println!("windows: momentum={momentum} ma={ma}\n");

    let simulator = config.simulator()?;
    let comparison = compare_strategies(&pair, &simulator, momentum, ma, &risk)
        .context("running strategy comparison")?;
    print!("{}", comparison.summary_table());

    let run_dir = output_dir.join(&config.run_id()[..16]);
    for result in comparison.iter() {
        save_artifacts(result, &run_dir)?;
    }
    save_grid(&grid.rows, &run_dir)?;
    save_json(&config, &run_dir.join("config.json"))?;
    let signal = daily_signal(&pair, &config, Some(&risk))?;
    save_json(&signal, &run_dir.join("signal.json"))?;

    println!("\nartifacts: {}", run_dir.display());
    Ok(())
}

fn run_optimize(data: &DataArgs, output_dir: Option<&Path>) -> Result<()> {
    let (config, pair) = load_inputs(data)?;
    let optimizer = Optimizer::from_config(&config)?;
    let grid = optimizer.optimize(
        &pair,
        &config.strategy.momentum_range.values(),
        &config.strategy.ma_range.values(),
    )
    .context("running grid search")?;
    print_grid(&grid);
    if let Some(dir) = output_dir {
        let path = save_grid(&grid.rows, dir)?;
        println!("\ngrid: {}", path.display());
    }
    Ok(())
}

fn run_signal(data: &DataArgs, no_ml: bool, json: bool) -> Result<()> {
    let (config, pair) = load_inputs(data)?;
    let risk: Option<RiskSeries> = if no_ml {
        None
    } else {
        Some(train_risk_model(&pair, &config)?.series())
    };
    let signal = daily_signal(&pair, &config, risk.as_ref())?;
    if json {
        println!("{}", serde_json::to_string_pretty(&signal)?);
    } else {
        print_signal(&signal, &config);
    }
    Ok(())
}

fn run_sensitivity(
    data: &DataArgs,
    momentum: usize,
    ma: usize,
    momentum_delta: usize,
    ma_delta: usize,
) -> Result<()> {
    let (config, pair) = load_inputs(data)?;
    let simulator = config.simulator()?;
    let report = analyze_sensitivity(&pair, &simulator, momentum, ma, momentum_delta, ma_delta)
        .context("running sensitivity sweep")?;
    print_sensitivity(&format!("momentum (ma={ma})"), &report.momentum);
    println!();
    print_sensitivity(&format!("ma (momentum={momentum})"), &report.ma);
    Ok(())
}

// ─── Output ─────────────────────────────────────────────────────────

fn print_forecast_summary(forecast: &RiskForecast) {
    println!(
        "risk model: {} retrains, {} skipped",
        forecast.retrains.len(),
        forecast.skipped.len()
    );
    for (name, importance) in &forecast.feature_importance {
        println!("  {name:<14} {importance:.3}");
    }
    if let Some(p) = forecast.smoothed.last() {
        println!("  latest risk probability {:.1}%", p * 100.0);
    }
    println!();
}

fn print_grid(grid: &OptimizationResult) {
    println!(
        "benchmark return {:.2}%, drawdown limit {:.0}%, ranking by {}",
        grid.benchmark_return * 100.0,
        grid.max_drawdown_limit * 100.0,
        grid.metric.label()
    );
    println!(
        "{:>8} {:>6} {:>8} {:>10} {:>10} {:>8} {:>7}",
        "momentum", "ma", "status", "return", "max_dd", "sharpe", "trades"
    );
    for row in &grid.rows {
        let status = match row.status {
            CellStatus::Pass => "pass",
            CellStatus::Fail => "fail",
            CellStatus::NoData => "no data",
        };
        let pct = |v: Option<f64>| v.map_or("-".to_string(), |x| format!("{:.2}%", x * 100.0));
        println!(
            "{:>8} {:>6} {:>8} {:>10} {:>10} {:>8} {:>7}",
            row.momentum_window,
            row.ma_window,
            status,
            pct(row.total_return),
            pct(row.max_drawdown),
            row.sharpe.map_or("-".to_string(), |s| format!("{s:.3}")),
            row.trades.map_or("-".to_string(), |t| t.to_string()),
        );
    }
    match &grid.best {
        Some(best) => println!(
            "\nbest: momentum={} ma={} {}={:.3}",
            best.parameters.momentum_window,
            best.parameters.ma_window,
            grid.metric.label(),
            best.score
        ),
        None => println!("\nno cell passed"),
    }
}

fn print_signal(signal: &Signal, config: &DmrConfig) {
    println!("signal for {}", signal.date);
    for (asset, reading) in [
        (&config.assets.a, &signal.asset_a),
        (&config.assets.b, &signal.asset_b),
    ] {
        println!(
            "  {} ({}): price {:.2} momentum {:.2}% ma {:.2} bias {:.2}% {}",
            asset.name,
            asset.code,
            reading.price,
            reading.momentum * 100.0,
            reading.ma,
            reading.bias * 100.0,
            if reading.passes { "pass" } else { "fail" }
        );
    }
    println!(
        "  risk probability {:.1}% (trigger {:.0}%, release {:.0}%){}",
        signal.risk_probability * 100.0,
        signal.trigger * 100.0,
        signal.release * 100.0,
        if signal.risk_off { ", risk-off" } else { "" }
    );
    println!("  rule: {} ({})", signal.rule_target, signal.rule_reason);
    println!("  target: {}: {}", signal.target, signal.reason);
}

fn print_sensitivity(title: &str, points: &[SensitivityPoint]) {
    println!("{title}");
    println!("{:>8} {:>8} {:>10} {:>10}", "value", "sharpe", "return", "max_dd");
    for p in points {
        println!(
            "{:>8} {:>8.3} {:>9.2}% {:>9.2}%",
            p.value,
            p.sharpe,
            p.total_return * 100.0,
            p.max_drawdown * 100.0
        );
    }
}
