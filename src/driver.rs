//! Follower Driver: owns the streaming connection lifecycle (dial,
//! rotate, close), dispatches messages to the Decoder + Reconciler, and
//! emits on the two output sequences (SPEC_FULL.md §4.5).

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::book::OrderBook;
use crate::decoder::{self, Channel, Trade};
use crate::exchange::Pair;
use crate::reconciler::Reconciler;
use crate::snapshot::SnapshotFetcher;

/// Safety margin below the venue's hard 60-minute connection cut
/// (SPEC_FULL.md §6, §9).
pub const CONNECTION_LIFETIME: Duration = Duration::from_secs(55 * 60);

/// Capacity of both output channels (SPEC_FULL.md §6). Downstream
/// consumers that fall behind slow the reader; the Driver never drops a
/// message.
pub const OUTPUT_CHANNEL_CAPACITY: usize = 1;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration for one follower instance.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub rest_base_url: String,
    pub stream_url: String,
}

/// Owns the connection and pumps messages for one follower instance.
pub struct Driver {
    pair: Pair,
    config: DriverConfig,
    cancellation: CancellationToken,
    book_tx: mpsc::Sender<OrderBook>,
    trade_tx: mpsc::Sender<Trade>,
    completion_tx: mpsc::Sender<()>,
}

impl Driver {
    pub fn new(
        pair: Pair,
        config: DriverConfig,
        cancellation: CancellationToken,
        book_tx: mpsc::Sender<OrderBook>,
        trade_tx: mpsc::Sender<Trade>,
        completion_tx: mpsc::Sender<()>,
    ) -> Self {
        Self {
            pair,
            config,
            cancellation,
            book_tx,
            trade_tx,
            completion_tx,
        }
    }

    /// Runs the Driver's main loop to completion. On any terminal
    /// condition (snapshot failure, read error, decode/reconcile error,
    /// cancellation) both output channels are dropped — closing them for
    /// the consumer — and the supervisor is notified.
    pub async fn run(mut self) {
        let fetcher = SnapshotFetcher::new(self.config.rest_base_url.clone());

        let internal_book = match fetcher.fetch_snapshot(self.pair).await {
            Ok(book) => book,
            Err(err) => {
                error!(pair = %self.pair, error = %err, "failed to fetch initial snapshot");
                self.terminate().await;
                return;
            }
        };

        let mut reconciler = Reconciler::new(internal_book);

        let mut ws = match self.dial().await {
            Ok(ws) => ws,
            Err(err) => {
                error!(pair = %self.pair, error = %err, "failed to dial stream");
                self.terminate().await;
                return;
            }
        };
        let mut connection_opened_at = Instant::now();

        loop {
            if connection_opened_at.elapsed() >= CONNECTION_LIFETIME {
                info!(pair = %self.pair, "rotating connection before venue-imposed cut");
                let _ = ws.close(None).await;
                ws = match self.dial().await {
                    Ok(ws) => ws,
                    Err(err) => {
                        error!(pair = %self.pair, error = %err, "failed to redial stream");
                        self.terminate().await;
                        return;
                    }
                };
                connection_opened_at = Instant::now();
            }

            tokio::select! {
                biased;

                _ = self.cancellation.cancelled() => {
                    info!(pair = %self.pair, "cancellation requested, shutting down");
                    let _ = ws.close(None).await;
                    self.terminate().await;
                    return;
                }

                message = ws.next() => {
                    let Some(message) = message else {
                        warn!(pair = %self.pair, "stream closed by venue");
                        self.terminate().await;
                        return;
                    };

                    let text = match message {
                        Ok(Message::Text(text)) => text,
                        Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                        Ok(Message::Close(_)) => {
                            warn!(pair = %self.pair, "stream sent close frame");
                            self.terminate().await;
                            return;
                        }
                        Ok(_) => continue,
                        Err(err) => {
                            error!(pair = %self.pair, error = %err, "stream read error");
                            self.terminate().await;
                            return;
                        }
                    };

                    if !self.dispatch(&text, &mut reconciler).await {
                        self.terminate().await;
                        return;
                    }
                }
            }
        }
    }

    /// Decodes one raw message and dispatches it to the Reconciler (depth)
    /// or straight to the trade output (trade). Returns `false` on any
    /// error that should terminate the Driver.
    async fn dispatch(&self, text: &str, reconciler: &mut Reconciler) -> bool {
        let envelope = match decoder::decode_envelope(text) {
            Ok(envelope) => envelope,
            Err(err) => {
                error!(pair = %self.pair, error = %err, "failed to decode envelope");
                return false;
            }
        };

        match envelope.channel() {
            Some(Channel::Depth) => match decoder::decode_depth_diff(envelope.data) {
                Ok(diff) => match reconciler.apply_diff(diff) {
                    Ok(()) => {
                        let snapshot = reconciler.book().book.clone();
                        if self.book_tx.send(snapshot).await.is_err() {
                            debug!(pair = %self.pair, "book consumer dropped, terminating");
                            return false;
                        }
                        true
                    }
                    Err(err) => {
                        error!(pair = %self.pair, error = %err, "reconciler rejected diff");
                        false
                    }
                },
                Err(err) => {
                    error!(pair = %self.pair, error = %err, "failed to decode depth diff");
                    false
                }
            },
            Some(Channel::Trade) => match decoder::decode_trade(envelope.data) {
                Ok(trade) => {
                    if self.trade_tx.send(trade).await.is_err() {
                        debug!(pair = %self.pair, "trade consumer dropped, terminating");
                        return false;
                    }
                    true
                }
                Err(err) => {
                    error!(pair = %self.pair, error = %err, "failed to decode trade");
                    false
                }
            },
            None => {
                debug!(pair = %self.pair, stream = %envelope.stream, "ignoring unrecognised stream tag");
                true
            }
        }
    }

    async fn dial(&self) -> Result<WsStream, crate::error::FollowerError> {
        let url = stream_subscription_url(&self.config.stream_url, self.pair);
        let (ws, _response) = connect_async(&url).await?;
        Ok(ws)
    }

    /// Drops both output channels (closing them for the consumer) and
    /// notifies the supervisor.
    async fn terminate(self) {
        drop(self.book_tx);
        drop(self.trade_tx);
        let _ = self.completion_tx.send(()).await;
    }
}

/// Builds the multiplexed `?streams=<symbol>@depth/<symbol>@trade` URL for
/// one pair, factored out of `dial` so it can be exercised without a real
/// connection.
fn stream_subscription_url(base: &str, pair: Pair) -> String {
    format!("{base}?streams={pair}@depth/{pair}@trade")
}
