//! Sequencer / Reconciler: the heart of the protocol (SPEC_FULL.md §4.4).
//!
//! Holds the synchronisation invariant between the one-shot snapshot and
//! the continuous diff stream. Stateless other than `InternalBook`'s
//! `last_update_id` — it never buffers out-of-order diffs; the contract is
//! simply "fetch the snapshot first, then start reading the stream" (§9).

use crate::book::{apply_updates, InternalBook, Side};
use crate::decoder::DepthDiff;
use crate::error::{FollowerError, FollowerResult};

/// Holds the live book and applies the venue's sequencing rules to each
/// incoming diff.
pub struct Reconciler {
    book: InternalBook,
}

impl Reconciler {
    pub fn new(book: InternalBook) -> Self {
        Self { book }
    }

    pub fn book(&self) -> &InternalBook {
        &self.book
    }

    /// Applies one diff to the book per the three rules:
    ///
    /// 1. Stale: `d.u <= last_update_id` discards silently (not an error).
    /// 2. Gap: `d.u < last_update_id + 1 && d.U != last_update_id + 1`
    ///    fails with `OutOfOrder` — this only gates the *first*
    ///    post-snapshot diff, since `d.u < last_update_id + 1` can only be
    ///    true on a diff the stale check above didn't already discard,
    ///    which happens exactly once: right after the snapshot. Later
    ///    diffs are trusted to be contiguous by venue contract (§9's open
    ///    question, resolved as intentional).
    /// 3. Otherwise: apply bid updates then ask updates, re-sort both
    ///    sides, advance `last_update_id` and the book's timestamp.
    pub fn apply_diff(&mut self, diff: DepthDiff) -> FollowerResult<()> {
        if diff.last_update_id <= self.book.last_update_id {
            return Ok(());
        }

        if diff.last_update_id < self.book.last_update_id + 1
            && diff.first_update_id != self.book.last_update_id + 1
        {
            return Err(FollowerError::OutOfOrder {
                expected: self.book.last_update_id + 1,
                actual: diff.first_update_id,
            });
        }

        apply_updates(&mut self.book.book.bids, Side::Bid, &diff.bid_updates);
        apply_updates(&mut self.book.book.asks, Side::Ask, &diff.ask_updates);
        self.book.last_update_id = diff.last_update_id;
        self.book.book.timestamp = diff.event_time;

        Ok(())
    }
}
