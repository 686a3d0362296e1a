//! Integration tests for `edgebulk_common::error`.
//!
//! These suites validate classification and module error composition so that
//! retry policies and callers see consistent failure semantics.

use std::time::Duration;

use edgebulk_common::error::{CommonError, CommonResult, ErrorClassification, ErrorSeverity};
use thiserror::Error;

/// Validates that `CommonError` classification surfaces the expected retryable,
/// severity, and criticality combinations for each variant.
#[test]
fn classification_matrix_matches_expected_contract() {
    let cases = vec![
        (CommonError::config("missing api token"), false, ErrorSeverity::Error, false),
        (CommonError::serialization("bad envelope"), false, ErrorSeverity::Error, false),
        (CommonError::rate_limit(Some(Duration::from_secs(2))), true, ErrorSeverity::Warning, false),
        (CommonError::timeout("fetch_page", Duration::from_secs(30)), true, ErrorSeverity::Warning, false),
        (CommonError::backend("zones", "502 Bad Gateway", true), true, ErrorSeverity::Error, false),
        (CommonError::backend("zones", "400 Bad Request", false), false, ErrorSeverity::Error, false),
        (CommonError::validation("batch_size", "must be >= 1"), false, ErrorSeverity::Error, false),
        (CommonError::not_found_with_id("zone", "example.com"), false, ErrorSeverity::Info, false),
        (CommonError::unauthorized("purge_cache"), false, ErrorSeverity::Warning, false),
        (CommonError::internal("aggregator lost a chunk"), false, ErrorSeverity::Critical, true),
    ];

    for (err, retryable, severity, critical) in cases {
        assert_eq!(err.is_retryable(), retryable, "retryable mismatch for {err}");
        assert_eq!(err.severity(), severity, "severity mismatch for {err}");
        assert_eq!(err.is_critical(), critical, "critical mismatch for {err}");
    }
}

#[derive(Debug, Error)]
enum PurgeError {
    #[error("zone has nothing to purge: {0}")]
    Empty(String),

    #[error(transparent)]
    Common(#[from] CommonError),
}

fn purge(zone: &str) -> Result<(), PurgeError> {
    if zone.is_empty() {
        return Err(CommonError::validation("zone", "must not be empty").into());
    }
    Err(PurgeError::Empty(zone.to_string()))
}

/// Module errors compose with `CommonError` through `#[from]` and keep the
/// common message intact.
#[test]
fn module_errors_compose_with_common_error() {
    let err = purge("").unwrap_err();
    assert!(matches!(err, PurgeError::Common(CommonError::Validation { .. })));
    assert_eq!(err.to_string(), "Validation failed for 'zone': must not be empty");

    let err = purge("example.com").unwrap_err();
    assert_eq!(err.to_string(), "zone has nothing to purge: example.com");
}

/// Serde and TOML failures convert into serialization errors that name the
/// format they came from.
#[test]
fn parser_errors_convert_with_format() -> CommonResult<()> {
    let json_err: CommonError = serde_json::from_str::<u32>("\"nope\"").unwrap_err().into();
    assert!(matches!(
        &json_err,
        CommonError::Serialization { format: Some(format), .. } if format == "JSON"
    ));

    let toml_err: CommonError = toml::from_str::<toml::Value>("= broken").unwrap_err().into();
    assert!(toml_err.to_string().starts_with("Serialization error (TOML)"));

    let ok: u32 = serde_json::from_str("7")?;
    assert_eq!(ok, 7);
    Ok(())
}

#[test]
fn error_type_names_are_stable() {
    assert_eq!(CommonError::rate_limit(None).error_type_name(), "rate_limit_exceeded");
    assert_eq!(CommonError::unauthorized("x").error_type_name(), "unauthorized");
    assert_eq!(
        CommonError::internal_with_context("boom", "fanout").to_string(),
        "Internal error in 'fanout': boom"
    );
}
