//! Book State: the current bids and asks as two sorted sequences with
//! price-keyed merge semantics (SPEC_FULL.md §4.3).
//!
//! Deliberately `Vec<Order>` rather than a `BTreeMap` keyed on price: the
//! spec's merge discipline is scan-then-patch, swap-remove zero-volume
//! entries, and a single trailing sort — not a per-insert tree rebalance.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::cmp::Ordering;

/// Price precision: two price levels within this distance are the same
/// level. Tolerance is `price_precision / 2` either side (SPEC_FULL.md §3).
pub const PRICE_PRECISION: Decimal = dec!(0.01);

/// Volume precision: a level with `|volume| < volume_precision / 2` is
/// treated as empty and removed.
pub const VOLUME_PRECISION: Decimal = dec!(0.00000001);

fn half(precision: Decimal) -> Decimal {
    precision / Decimal::from(2)
}

/// Returns true if two prices are equal within `price_precision / 2`
/// (strict `<`, per P6 — at exactly the tolerance they are distinct).
pub fn prices_equal(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < half(PRICE_PRECISION)
}

/// Returns true if a volume is effectively zero within
/// `volume_precision / 2`.
pub fn is_zero_volume(volume: Decimal) -> bool {
    volume.abs() < half(VOLUME_PRECISION)
}

/// A single price level: a resting order aggregate at one price.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Order {
    pub price: Decimal,
    pub volume: Decimal,
}

impl Order {
    pub fn new(price: Decimal, volume: Decimal) -> Self {
        Self { price, volume }
    }
}

/// Which side of the book a sequence of `Order`s represents, determining
/// sort direction: bids descending by price, asks ascending.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

impl Side {
    fn sort(&self, levels: &mut [Order]) {
        match self {
            Side::Bid => levels.sort_by(|a, b| {
                b.price
                    .partial_cmp(&a.price)
                    .unwrap_or(Ordering::Equal)
            }),
            Side::Ask => levels.sort_by(|a, b| {
                a.price
                    .partial_cmp(&b.price)
                    .unwrap_or(Ordering::Equal)
            }),
        }
    }
}

/// Applies a batch of `(price, volume)` updates to one side of the book.
///
/// For each update: scan for an existing level within `prices_equal`
/// tolerance. If found, overwrite its volume, removing the level (via
/// swap-with-last + truncate) if the new volume is zero. If not found and
/// the update is non-zero, append it. A zero-volume update for an absent
/// price is silently ignored. The side is re-sorted once after the whole
/// batch — O(U + N log N), not a per-insert resort.
pub fn apply_updates(levels: &mut Vec<Order>, side: Side, updates: &[(Decimal, Decimal)]) {
    for &(price, volume) in updates {
        match levels.iter().position(|e| prices_equal(e.price, price)) {
            Some(idx) => {
                if is_zero_volume(volume) {
                    levels.swap_remove(idx);
                } else {
                    levels[idx].volume = volume;
                }
            }
            None => {
                if !is_zero_volume(volume) {
                    levels.push(Order::new(price, volume));
                }
            }
        }
    }
    side.sort(levels);
}

/// The current bids and asks for one symbol, plus the wall-clock instant
/// of the last applied update.
///
/// Invariants I1 (ordering), I2 (no duplicate prices), I5 (no zero-volume
/// levels) hold on every value reachable from the follower's outputs.
/// I3 (non-crossing) is explicitly *not* guaranteed transiently.
#[derive(Clone, Debug, PartialEq)]
pub struct OrderBook {
    pub bids: Vec<Order>,
    pub asks: Vec<Order>,
    pub timestamp: DateTime<Utc>,
}

impl OrderBook {
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            bids: Vec::new(),
            asks: Vec::new(),
            timestamp,
        }
    }

    pub fn best_bid(&self) -> Option<Order> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<Order> {
        self.asks.first().copied()
    }
}

/// The Reconciler's private wrapper around an `OrderBook`:
/// `last_update_id` is never decreased once initialised from the
/// snapshot (I4).
#[derive(Clone, Debug, PartialEq)]
pub struct InternalBook {
    pub book: OrderBook,
    pub last_update_id: u64,
}

impl InternalBook {
    pub fn new(book: OrderBook, last_update_id: u64) -> Self {
        Self { book, last_update_id }
    }
}
