//! Snapshot Fetcher: a single REST request for the initial book state
//! (SPEC_FULL.md §4.1). No retry at this layer — retry is the Driver's
//! concern (§4.5).

use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::book::{InternalBook, Order, OrderBook};
use crate::error::{FollowerError, FollowerResult};
use crate::exchange::Pair;

/// Depth-limit requested from the venue per level (SPEC_FULL.md §6).
pub const SNAPSHOT_DEPTH_LIMIT: u32 = 1000;

#[derive(Debug, Deserialize)]
struct RawDepthSnapshot {
    #[serde(rename = "lastUpdateId")]
    last_update_id: u64,
    bids: Vec<Vec<String>>,
    asks: Vec<Vec<String>>,
}

/// Parses one `[price_string, volume_string]` level. Requires exactly 2
/// elements, otherwise fails with `BadPayload`.
fn parse_order(raw: &[String]) -> FollowerResult<Order> {
    if raw.len() != 2 {
        return Err(FollowerError::BadPayload(format!(
            "expected 2-element [price, volume] pair, got {}",
            raw.len()
        )));
    }
    let price = Decimal::from_str(&raw[0])
        .map_err(|e| FollowerError::BadPayload(format!("bad snapshot price {:?}: {e}", raw[0])))?;
    let volume = Decimal::from_str(&raw[1])
        .map_err(|e| FollowerError::BadPayload(format!("bad snapshot volume {:?}: {e}", raw[1])))?;
    Ok(Order::new(price, volume))
}

/// Fetches the initial book state for `pair` over a REST depth endpoint.
pub struct SnapshotFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl SnapshotFetcher {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    /// Issues `GET {base_url}/api/v3/depth?symbol=<SYMBOL>&limit=1000` and
    /// parses the response into a fully sorted `InternalBook`.
    pub async fn fetch_snapshot(&self, pair: Pair) -> FollowerResult<InternalBook> {
        let url = format!(
            "{}/api/v3/depth?symbol={}&limit={}",
            self.base_url,
            pair.as_symbol(),
            SNAPSHOT_DEPTH_LIMIT
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FollowerError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FollowerError::Network(format!(
                "depth snapshot request failed with status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FollowerError::Network(e.to_string()))?;

        let raw: RawDepthSnapshot = serde_json::from_str(&body)
            .map_err(|e| FollowerError::BadPayload(format!("bad depth snapshot: {e}")))?;

        let mut bids = raw
            .bids
            .iter()
            .map(|level| parse_order(level))
            .collect::<FollowerResult<Vec<_>>>()?;
        let mut asks = raw
            .asks
            .iter()
            .map(|level| parse_order(level))
            .collect::<FollowerResult<Vec<_>>>()?;

        bids.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap());
        asks.sort_by(|a, b| a.price.partial_cmp(&b.price).unwrap());

        let book = OrderBook {
            bids,
            asks,
            timestamp: chrono::Utc::now(),
        };

        Ok(InternalBook::new(book, raw.last_update_id))
    }
}
