//! Loading configuration through serde (requires the `serde` feature).

#![cfg(feature = "serde")]

use std::time::Duration;

use keynav_core::config::{ConfigError, HintAlphabet, NavConfig};

#[test]
fn partial_json_fills_defaults() {
    let config: NavConfig =
        serde_json::from_str(r#"{ "sequence_timeout": 750, "axis": { "tap_amount": 80.0 } }"#)
            .expect("valid json");
    assert_eq!(config.sequence_timeout, Duration::from_millis(750));
    assert_eq!(config.axis.tap_amount, 80.0);
    assert_eq!(config.axis.hold_velocity, 800.0);
    assert_eq!(config.hint_alphabet, HintAlphabet::default());
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn alphabet_is_a_plain_string() {
    let config = NavConfig::default().with_hint_alphabet(HintAlphabet::new("asdf").expect("valid"));
    let json = serde_json::to_value(&config).expect("serializes");
    assert_eq!(json["hint_alphabet"], "asdf");
    assert_eq!(json["first_frame_delta"], 16);
}

#[test]
fn invalid_alphabet_is_rejected_on_load() {
    let result: Result<NavConfig, _> = serde_json::from_str(r#"{ "hint_alphabet": "aa" }"#);
    let err = result.expect_err("duplicate character");
    assert!(
        err.to_string().contains(&ConfigError::DuplicateHintChar('a').to_string()),
        "unexpected error: {err}"
    );
}

#[test]
fn out_of_range_values_fail_validation() {
    let config: NavConfig =
        serde_json::from_str(r#"{ "axis": { "lerp_factor": 1.5 } }"#).expect("valid json");
    assert!(config.validate().is_err());
}
