//! Update Decoder: parses one message off the streaming transport
//! (SPEC_FULL.md §4.2). Pure decode — no mutation of book state. Fails
//! with `FollowerError::BadPayload` if required fields are absent or
//! unparseable.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

use crate::error::{FollowerError, FollowerResult};

/// The multiplexed envelope wrapping every streamed message:
/// `{"stream": "<symbol>@<channel>", "data": {...}}`.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    pub stream: String,
    pub data: serde_json::Value,
}

/// A raw `[price_string, volume_string]` level update as it appears on
/// the wire.
type RawLevel = [String; 2];

/// One incremental depth diff (`e: "depthUpdate"`).
#[derive(Debug, Deserialize)]
struct RawDepthDiff {
    #[serde(rename = "U")]
    first_update_id: u64,
    #[serde(rename = "u")]
    last_update_id: u64,
    #[serde(rename = "b")]
    bid_updates: Vec<RawLevel>,
    #[serde(rename = "a")]
    ask_updates: Vec<RawLevel>,
    #[serde(rename = "E")]
    event_time: i64,
}

/// A decoded depth diff, prices and volumes parsed to `Decimal`.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthDiff {
    pub first_update_id: u64,
    pub last_update_id: u64,
    pub bid_updates: Vec<(Decimal, Decimal)>,
    pub ask_updates: Vec<(Decimal, Decimal)>,
    pub event_time: DateTime<Utc>,
}

/// One executed trade (`e: "trade"`).
#[derive(Debug, Deserialize)]
struct RawTrade {
    #[serde(rename = "p")]
    price: String,
    #[serde(rename = "q")]
    volume: String,
    #[serde(rename = "m")]
    buyer_is_maker: bool,
    #[serde(rename = "E")]
    event_time: i64,
}

/// Which side of the trade was resting on the book before the aggressor
/// arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MakerSide {
    Buy,
    Sell,
    Unknown,
}

/// A decoded executed trade, immutable once produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub maker_side: MakerSide,
    pub price: Decimal,
    pub volume: Decimal,
    pub timestamp: DateTime<Utc>,
}

fn parse_level(raw: &RawLevel) -> FollowerResult<(Decimal, Decimal)> {
    let price = Decimal::from_str(&raw[0])
        .map_err(|e| FollowerError::BadPayload(format!("bad price {:?}: {e}", raw[0])))?;
    let volume = Decimal::from_str(&raw[1])
        .map_err(|e| FollowerError::BadPayload(format!("bad volume {:?}: {e}", raw[1])))?;
    Ok((price, volume))
}

fn millis_to_utc(millis: i64) -> FollowerResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| FollowerError::BadPayload(format!("invalid event_time {millis}")))
}

/// Parses the `{stream, data}` envelope common to every streamed message.
pub fn decode_envelope(text: &str) -> FollowerResult<Envelope> {
    serde_json::from_str(text)
        .map_err(|e| FollowerError::BadPayload(format!("bad envelope: {e}")))
}

/// Decodes a depth diff payload from an envelope's `data` field.
pub fn decode_depth_diff(data: serde_json::Value) -> FollowerResult<DepthDiff> {
    let raw: RawDepthDiff = serde_json::from_value(data)
        .map_err(|e| FollowerError::BadPayload(format!("bad depth diff: {e}")))?;

    let bid_updates = raw
        .bid_updates
        .iter()
        .map(parse_level)
        .collect::<FollowerResult<Vec<_>>>()?;
    let ask_updates = raw
        .ask_updates
        .iter()
        .map(parse_level)
        .collect::<FollowerResult<Vec<_>>>()?;

    Ok(DepthDiff {
        first_update_id: raw.first_update_id,
        last_update_id: raw.last_update_id,
        bid_updates,
        ask_updates,
        event_time: millis_to_utc(raw.event_time)?,
    })
}

/// Decodes an executed-trade payload from an envelope's `data` field.
pub fn decode_trade(data: serde_json::Value) -> FollowerResult<Trade> {
    let raw: RawTrade = serde_json::from_value(data)
        .map_err(|e| FollowerError::BadPayload(format!("bad trade: {e}")))?;

    let price = Decimal::from_str(&raw.price)
        .map_err(|e| FollowerError::BadPayload(format!("bad trade price: {e}")))?;
    let volume = Decimal::from_str(&raw.volume)
        .map_err(|e| FollowerError::BadPayload(format!("bad trade volume: {e}")))?;

    let maker_side = if raw.buyer_is_maker {
        MakerSide::Buy
    } else {
        MakerSide::Sell
    };

    Ok(Trade {
        maker_side,
        price,
        volume,
        timestamp: millis_to_utc(raw.event_time)?,
    })
}

/// Which channel a decoded envelope carries, dispatched on the `stream`
/// tag's suffix (`@depth` / `@trade`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Depth,
    Trade,
}

impl Envelope {
    pub fn channel(&self) -> Option<Channel> {
        if self.stream.ends_with("@depth") {
            Some(Channel::Depth)
        } else if self.stream.ends_with("@trade") {
            Some(Channel::Trade)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Scenario 5 — trade decoding, `m: true` means the buyer was the
    /// maker (resting order was a buy).
    #[test]
    fn scenario_trade_decoding_buyer_is_maker() {
        let envelope: Envelope = decode_envelope(
            r#"{"stream":"btceur@trade","data":{"p":"10.50","q":"0.25","m":true,"E":1700000000000}}"#,
        )
        .unwrap();
        assert_eq!(envelope.channel(), Some(Channel::Trade));

        let trade = decode_trade(envelope.data).unwrap();
        assert_eq!(trade.maker_side, MakerSide::Buy);
        assert_eq!(trade.price, dec!(10.50));
        assert_eq!(trade.volume, dec!(0.25));
        assert_eq!(trade.timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn trade_with_seller_maker() {
        let data: serde_json::Value = serde_json::from_str(
            r#"{"p":"10.50","q":"0.25","m":false,"E":1700000000000}"#,
        )
        .unwrap();
        let trade = decode_trade(data).unwrap();
        assert_eq!(trade.maker_side, MakerSide::Sell);
    }

    #[test]
    fn depth_diff_decodes_levels() {
        let data: serde_json::Value = serde_json::from_str(
            r#"{"U":101,"u":101,"b":[["9.00","0"]],"a":[["12.00","3"]],"E":1700000000000}"#,
        )
        .unwrap();
        let diff = decode_depth_diff(data).unwrap();
        assert_eq!(diff.first_update_id, 101);
        assert_eq!(diff.last_update_id, 101);
        assert_eq!(diff.bid_updates, vec![(dec!(9.00), dec!(0))]);
        assert_eq!(diff.ask_updates, vec![(dec!(12.00), dec!(3))]);
    }

    #[test]
    fn missing_field_is_bad_payload() {
        let data: serde_json::Value =
            serde_json::from_str(r#"{"U":101,"b":[],"a":[],"E":1}"#).unwrap();
        let err = decode_depth_diff(data).unwrap_err();
        assert!(matches!(err, FollowerError::BadPayload(_)));
    }

    #[test]
    fn unparseable_number_is_bad_payload() {
        let data: serde_json::Value = serde_json::from_str(
            r#"{"U":1,"u":1,"b":[["not-a-number","1"]],"a":[],"E":1}"#,
        )
        .unwrap();
        let err = decode_depth_diff(data).unwrap_err();
        assert!(matches!(err, FollowerError::BadPayload(_)));
    }
}
