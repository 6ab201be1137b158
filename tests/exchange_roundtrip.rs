//! Integration-level coverage of the `{provider, pair}` config identifier's
//! JSON round-trip (spec's P5 and the literal config-JSON scenario),
//! exercised through the crate's public API rather than its unit tests.

use market_follower::{Exchange, Pair, Provider};

#[test]
fn literal_config_json_decodes_to_expected_exchange() {
    let json = r#"{"provider":"binance","pair":"ltcbtc"}"#;
    let decoded: Exchange = serde_json::from_str(json).unwrap();
    assert_eq!(decoded, Exchange::new(Provider::Binance, Pair::LtcBtc));
}

#[test]
fn re_encoding_yields_the_same_object_regardless_of_field_order() {
    let exchange = Exchange::new(Provider::Binance, Pair::BtcEur);
    let encoded = serde_json::to_value(&exchange).unwrap();
    let expected: serde_json::Value =
        serde_json::from_str(r#"{"pair":"btceur","provider":"binance"}"#).unwrap();
    assert_eq!(encoded, expected);
}

/// P5 — for both pairs this follower supports, JSON encode -> decode is
/// the identity.
#[test]
fn round_trip_is_identity_for_every_known_pair() {
    for pair in [Pair::BtcEur, Pair::LtcBtc] {
        let original = Exchange::new(Provider::Binance, pair);
        let encoded = serde_json::to_string(&original).unwrap();
        let decoded: Exchange = serde_json::from_str(&encoded).unwrap();
        assert_eq!(original, decoded);
    }
}

#[test]
fn unsupported_pair_token_fails_to_decode() {
    let json = r#"{"provider":"binance","pair":"ethusdt"}"#;
    let result: Result<Exchange, _> = serde_json::from_str(json);
    assert!(result.is_err());
}
