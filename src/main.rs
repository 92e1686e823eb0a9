use augur::config::Config;
use augur::services::{SignalMonitor, SignalScanner};
use augur::sources::{BinanceFeed, PriceFeed};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "augur=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();
    info!(
        "Starting Augur: {} symbols, {} timeframe, {:?} mode",
        config.symbols.len(),
        config.timeframe,
        config.analysis_mode
    );

    let price_timeout = Duration::from_millis(config.price_timeout_ms);
    let feed: Arc<dyn PriceFeed> =
        Arc::new(BinanceFeed::with_timeout(&config.binance_api_url, price_timeout));

    // One generation pass
    let scanner = SignalScanner::from_config(feed.clone(), &config);
    let signals = scanner.scan(&config.symbols).await;
    if signals.is_empty() {
        warn!("No signals met the confidence floor of {}", config.min_confidence);
    }

    let monitor = SignalMonitor::with_price_timeout(feed, price_timeout);
    for signal in signals {
        info!(
            "{} {} @ {:.4} -> target {:.4}, stop {:.4} ({}%): {}",
            signal.direction.label(),
            signal.symbol,
            signal.entry_price,
            signal.target_price,
            signal.stop_loss,
            signal.confidence,
            signal.reason
        );
        monitor.track(signal);
    }

    // Watch tracked signals until Ctrl-C
    let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    let runner = monitor.clone();
    let interval = Duration::from_millis(config.monitor_interval_ms.max(1));
    let handle = tokio::spawn(async move {
        runner.run(interval, shutdown_rx).await;
    });

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    let _ = shutdown_tx.send(());
    handle.await?;

    let stats = monitor.performance();
    info!(
        "Session: {} signals, {} wins, {} losses, win rate {:.1}%, profit {:.2}%",
        stats.total_signals, stats.wins, stats.losses, stats.win_rate, stats.total_profit
    );

    Ok(())
}
