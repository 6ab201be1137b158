//! Closed enumerations identifying a venue (`Provider`) and trading symbol
//! (`Pair`), plus the `Exchange` newtype pairing them for config-level
//! identification. Out of scope for the follower core itself (SPEC_FULL.md
//! §1), but specified here because the core's tests cover their JSON
//! round-trip (§8, P5, scenario 6).
//!
//! Re-expresses the source's stringly-typed identifiers as closed tagged
//! variants, following `barter-data`'s `ExchangeId` pattern: unknown tokens
//! on decode are a decoding error, never a silent default.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// A supported market data provider.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provider {
    Binance,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Binance => "binance",
        }
    }
}

impl Display for Provider {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A trading symbol supported by this follower.
///
/// Each follower instance is parameterised by exactly one `Pair`
/// (SPEC_FULL.md §1); the enumeration stays closed so an unrecognised
/// symbol fails fast instead of silently following the wrong market.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Pair {
    BtcEur,
    LtcBtc,
}

impl Pair {
    /// The uppercase venue symbol, e.g. `BTCEUR`, as used on the wire.
    pub fn as_symbol(&self) -> &'static str {
        match self {
            Pair::BtcEur => "BTCEUR",
            Pair::LtcBtc => "LTCBTC",
        }
    }

    fn as_lowercase(&self) -> &'static str {
        match self {
            Pair::BtcEur => "btceur",
            Pair::LtcBtc => "ltcbtc",
        }
    }
}

impl Display for Pair {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_lowercase())
    }
}

/// A `{provider, pair}` identifier, usable as a deterministic, stable
/// mapping key (SPEC_FULL.md §6, §9). Rather than relying on ad-hoc
/// structural-key support, the canonical string form is
/// `"{provider}:{pair}"`.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Deserialize, Serialize)]
pub struct Exchange {
    pub provider: Provider,
    pub pair: Pair,
}

impl Exchange {
    pub fn new(provider: Provider, pair: Pair) -> Self {
        Self { provider, pair }
    }

    /// The canonical `"{provider}:{pair}"` string form, stable and
    /// deterministic for use as a mapping key.
    pub fn canonical_key(&self) -> String {
        format!("{}:{}", self.provider, self.pair)
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical_key())
    }
}
