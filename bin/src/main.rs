//! Veleta CLI binary.
//!
//! Provides a command-line interface for the veleta backtesting engine.

mod data;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use veleta_core::Frame;
use veleta_engine::{BacktestEngine, BacktestResult, EngineConfig};
use veleta_prices::{PriceQuery, PricesClient};
use veleta_strategies::{MomentumConfig, MomentumStrategy};

#[derive(Parser)]
#[command(name = "veleta")]
#[command(about = "Signal-to-position portfolio backtesting", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a momentum backtest on prices fetched from the price API
    Backtest {
        /// Exchange identifier
        #[arg(short, long)]
        exchange: String,

        /// Bar timeframe
        #[arg(short, long, default_value = "1d")]
        timeframe: String,

        /// Symbols to include (comma separated; all symbols when omitted)
        #[arg(short, long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<String>,

        /// Momentum lookback in periods
        #[arg(short, long, default_value = "60")]
        lookback: usize,

        /// Number of assets held long
        #[arg(long, default_value = "5")]
        top_n: usize,

        /// Number of assets held short
        #[arg(long, default_value = "0")]
        bottom_n: usize,

        /// Periods between observing a signal and acting on it
        #[arg(long, default_value = "1")]
        delay: usize,

        /// Cost per unit turnover
        #[arg(long, default_value = "0.0")]
        cost: f64,

        /// Starting capital
        #[arg(long, default_value = "1.0")]
        capital: f64,

        /// Maximum simultaneous positions per side
        #[arg(long)]
        max_positions: Option<usize>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Run the momentum pipeline on a synthetic price panel
    Demo {
        /// Number of rows in the synthetic panel
        #[arg(long, default_value = "120")]
        rows: usize,

        /// Momentum lookback in periods
        #[arg(short, long, default_value = "20")]
        lookback: usize,

        /// Cost per unit turnover
        #[arg(long, default_value = "0.0")]
        cost: f64,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Backtest {
            exchange,
            timeframe,
            symbols,
            start,
            end,
            lookback,
            top_n,
            bottom_n,
            delay,
            cost,
            capital,
            max_positions,
            format,
        } => {
            let config = MomentumConfig {
                lookback,
                top_n,
                bottom_n,
                signal_delay: delay,
                transaction_cost: cost,
                ..Default::default()
            };
            run_api_backtest(
                &exchange,
                &timeframe,
                &symbols,
                start.as_deref(),
                end.as_deref(),
                config,
                capital,
                max_positions,
                &format,
            )
            .await?;
        }
        Commands::Demo {
            rows,
            lookback,
            cost,
            format,
        } => {
            run_demo(rows, lookback, cost, &format)?;
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run_api_backtest(
    exchange: &str,
    timeframe: &str,
    symbols: &[String],
    start: Option<&str>,
    end: Option<&str>,
    config: MomentumConfig,
    capital: f64,
    max_positions: Option<usize>,
    format: &str,
) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                   Momentum Backtest                          ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Exchange:  {}", exchange);
    println!("Timeframe: {}", timeframe);
    if symbols.is_empty() {
        println!("Symbols:   all available");
    } else {
        println!("Symbols:   {}", symbols.join(", "));
    }
    println!(
        "Momentum:  lookback {}, top {}, bottom {}, delay {}",
        config.lookback, config.top_n, config.bottom_n, config.signal_delay
    );
    if let Some(limit) = max_positions {
        println!("Capacity:  {} per side", limit);
    }
    println!();

    let query = PriceQuery {
        exchange: exchange.to_string(),
        timeframe: timeframe.to_string(),
        symbols: if symbols.is_empty() {
            None
        } else {
            Some(symbols.to_vec())
        },
        start: start.map(data::parse_date).transpose()?,
        end: end.map(data::parse_date).transpose()?,
    };

    println!("Fetching close prices...");
    let client = PricesClient::from_env();
    let (prices, meta) = client.close_prices(&query).await?;
    println!(
        "Loaded {} rows for {} symbols",
        prices.n_rows(),
        meta.symbols.len()
    );
    println!();

    let strategy = MomentumStrategy::new(config)?;
    let result = run_strategy(&strategy, &prices, capital, max_positions)?;
    print_result(&result, format)?;

    Ok(())
}

fn run_demo(rows: usize, lookback: usize, cost: f64, format: &str) -> Result<()> {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                    Momentum Demo                             ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let prices = data::synthetic_panel(rows)?;
    println!(
        "Synthetic panel: {} rows, {} assets ({})",
        prices.n_rows(),
        prices.n_cols(),
        prices.columns().join(", ")
    );
    println!();

    let strategy = MomentumStrategy::new(MomentumConfig {
        lookback,
        top_n: 1,
        bottom_n: 1,
        signal_delay: 1,
        transaction_cost: cost,
        ..Default::default()
    })?;
    let result = strategy.backtest(&prices, 1.0)?;
    print_result(&result, format)?;

    Ok(())
}

fn run_strategy(
    strategy: &MomentumStrategy,
    prices: &Frame,
    capital: f64,
    max_positions: Option<usize>,
) -> Result<BacktestResult> {
    // Without a capacity limit the strategy drives the whole pipeline; with
    // one, positions go through the engine so the per-side cap applies.
    match max_positions {
        None => Ok(strategy.backtest(prices, capital)?),
        Some(limit) => {
            let positions = strategy.generate_positions(prices)?;
            let engine = BacktestEngine::new(EngineConfig {
                initial_capital: capital,
                transaction_cost: strategy.config().transaction_cost,
                max_active_positions: Some(limit),
                ..Default::default()
            })?;
            Ok(engine.run(prices, None, Some(&positions), None)?)
        }
    }
}

fn print_result(result: &BacktestResult, format: &str) -> Result<()> {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("BACKTEST RESULTS");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    if result.equity_curve.is_empty() {
        println!("No periods to simulate (not enough price history).\n");
        return Ok(());
    }

    if format == "json" {
        let payload = serde_json::json!({
            "stats": result.stats,
            "final_equity": result.equity_curve.last(),
            "periods": result.equity_curve.len(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        println!();
        return Ok(());
    }

    println!("Periods:      {:>10}", result.equity_curve.len());
    if let Some(final_equity) = result.equity_curve.last() {
        println!("Final Equity: {:>10.4}", final_equity);
    }
    println!();

    if let Some(stats) = &result.stats {
        println!("Performance Metrics:");
        println!("  Annualized Return: {:>10.2}%", stats.ann_return * 100.0);
        println!("  Annualized Vol:    {:>10.2}%", stats.ann_vol * 100.0);
        println!("  Sharpe Ratio:      {:>10.2}", stats.sharpe);
        println!(
            "  Cumulative Return: {:>10.2}%",
            stats.cumulative_return * 100.0
        );
        println!("  Max Drawdown:      {:>10.2}%", stats.max_drawdown * 100.0);
        println!();
    }

    let avg_turnover = if result.turnover.is_empty() {
        0.0
    } else {
        result.turnover.values().iter().sum::<f64>() / result.turnover.len() as f64
    };
    println!("Trading Metrics:");
    println!("  Avg Turnover:      {:>10.2}%", avg_turnover * 100.0);
    println!();

    Ok(())
}
