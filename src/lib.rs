//! Market Follower
//!
//! A reconnect-safe live order-book follower for a single trading venue:
//! fetches an initial REST snapshot, then reconciles a continuous
//! WebSocket diff stream against it under a strict sequence-number
//! invariant, emitting a stream of consistent book states and a stream
//! of executed trades.

pub mod book;
pub mod config;
pub mod decoder;
pub mod driver;
pub mod error;
pub mod exchange;
pub mod reconciler;
pub mod snapshot;

use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

pub use book::OrderBook;
pub use decoder::Trade;
pub use error::{FollowerError, FollowerResult};
pub use exchange::{Exchange, Pair, Provider};

use config::Config;
use driver::{Driver, DriverConfig, OUTPUT_CHANNEL_CAPACITY};

/// Stream of consistent book states, one per applied diff.
pub struct BookStream(pub ReceiverStream<OrderBook>);

/// Stream of executed trades as reported by the venue.
pub struct TradeStream(pub ReceiverStream<Trade>);

/// Handle to a running follower task. Dropping this, or calling
/// [`FollowerHandle::shutdown`], requests cooperative cancellation; the
/// Driver closes both output streams once it has unwound.
pub struct FollowerHandle {
    cancellation: CancellationToken,
}

impl FollowerHandle {
    /// Requests the follower to stop. Safe to call more than once.
    pub fn shutdown(&self) {
        self.cancellation.cancel();
    }
}

/// Starts following one `pair` on the configured venue.
///
/// This follower supports exactly one symbol, `Pair::BtcEur`. Returns
/// synchronously with `Err(FollowerError::UnsupportedPair)` for any other
/// `pair` — no task is spawned in that case. Otherwise spawns the Driver
/// task and returns immediately with the two output streams and a handle
/// for shutdown.
pub fn new_market_follower(
    config: &Config,
    pair: Pair,
) -> FollowerResult<(BookStream, TradeStream, FollowerHandle)> {
    match pair {
        Pair::BtcEur => {}
        other => return Err(FollowerError::UnsupportedPair(other.to_string())),
    }

    let (book_tx, book_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
    let (trade_tx, trade_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);
    let (completion_tx, mut completion_rx) = mpsc::channel(1);
    let cancellation = CancellationToken::new();

    let driver = Driver::new(
        pair,
        DriverConfig {
            rest_base_url: config.venue.rest_url.clone(),
            stream_url: config.venue.stream_url.clone(),
        },
        cancellation.clone(),
        book_tx,
        trade_tx,
        completion_tx,
    );

    tokio::spawn(driver.run());
    tokio::spawn(async move {
        let _ = completion_rx.recv().await;
        tracing::debug!(%pair, "follower task completed");
    });

    Ok((
        BookStream(ReceiverStream::new(book_rx)),
        TradeStream(ReceiverStream::new(trade_rx)),
        FollowerHandle { cancellation },
    ))
}

/// Initialises the global `tracing` subscriber from an `EnvFilter`,
/// falling back to `market_follower=<level>` when `RUST_LOG` is unset.
pub fn init_logging(level: &str) -> anyhow::Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("market_follower={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_market_follower_spawns_and_can_be_shut_down() {
        let config = Config::default();
        let (book_stream, trade_stream, handle) =
            new_market_follower(&config, Pair::BtcEur).expect("btceur is supported");

        handle.shutdown();
        drop(book_stream);
        drop(trade_stream);
    }

    #[test]
    fn new_market_follower_rejects_unsupported_pair() {
        let config = Config::default();
        let err = new_market_follower(&config, Pair::LtcBtc).unwrap_err();
        assert!(matches!(err, FollowerError::UnsupportedPair(_)));
    }
}
