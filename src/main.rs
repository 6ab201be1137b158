use clap::Parser;
use colored::Colorize;
use tokio_stream::StreamExt;

use market_follower::config::Config;
use market_follower::{Exchange, OrderBook, Pair, Provider, Trade, init_logging, new_market_follower};

/// Follows BTCEUR on the configured venue and prints book updates and
/// trades to the terminal as they arrive. This is the only symbol
/// `new_market_follower` accepts — there is no pair selector.
#[derive(Debug, Parser)]
#[command(name = "market-follower", version, about)]
struct Cli {
    /// Path to a TOML config file (venue URLs, log level). A missing file
    /// falls back to defaults.
    #[arg(long, default_value = "market-follower.toml")]
    config_file: String,

    /// Override the configured log level.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_default(&cli.config_file);
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    init_logging(log_level)?;

    let pair = Pair::BtcEur;
    let exchange = Exchange::new(Provider::Binance, pair);
    tracing::info!(%exchange, "market-follower starting");

    let (book_stream, trade_stream, handle) = new_market_follower(&config, pair)?;

    let mut books = book_stream.0;
    let mut trades = trade_stream.0;

    println!("{} following {exchange} — press Ctrl-C to stop", "▶".green());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            println!("\n{} shutdown requested", "■".yellow());
            handle.shutdown();
        }
        () = async {
            loop {
                tokio::select! {
                    Some(book) = books.next() => print_book(&exchange, &book),
                    Some(trade) = trades.next() => print_trade(&exchange, &trade),
                    else => break,
                }
            }
        } => {
            println!("{} follower terminated, streams closed", "✗".red());
        }
    }

    Ok(())
}

fn print_book(exchange: &Exchange, book: &OrderBook) {
    let bid = book
        .best_bid()
        .map(|o| format!("{}@{}", o.volume, o.price))
        .unwrap_or_else(|| "-".to_string());
    let ask = book
        .best_ask()
        .map(|o| format!("{}@{}", o.volume, o.price))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{} {exchange} book  bid {}  ask {}  ({} bids, {} asks)",
        "•".blue(),
        bid.green(),
        ask.red(),
        book.bids.len(),
        book.asks.len(),
    );
}

fn print_trade(exchange: &Exchange, trade: &Trade) {
    println!(
        "{} {exchange} trade  {} {} @ {}",
        "*".magenta(),
        trade.volume,
        trade.price,
        format!("{:?}", trade.maker_side).dimmed(),
    );
}
