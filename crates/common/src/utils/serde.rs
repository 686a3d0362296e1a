//! Serialization utilities for common data types
//!
//! Durations in edgebulk configuration files are written as plain integers of
//! milliseconds so JSON and TOML configs stay readable.

use std::time::Duration;

use serde::{Deserialize, Deserializer, Serializer};

/// Serde result type shared by the helpers below
type SerializeResult<S> = Result<<S as Serializer>::Ok, <S as Serializer>::Error>;

/// Custom serialization module for Duration as milliseconds
///
/// # Usage
/// ```rust
/// use std::time::Duration;
///
/// use edgebulk_common::duration_millis;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Example {
///     #[serde(with = "duration_millis")]
///     timeout: Duration,
/// }
/// ```
pub mod duration_millis {
    use super::*;

    /// Serialize a Duration as milliseconds (u64)
    pub fn serialize<S>(duration: &Duration, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        serializer.serialize_u64(u64::try_from(duration.as_millis()).unwrap_or(u64::MAX))
    }

    /// Deserialize milliseconds (u64) into a Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

/// Same as [`duration_millis`] for `Option<Duration>`; `null`/absent maps to
/// `None`.
pub mod option_duration_millis {
    use super::*;

    /// Serialize an optional Duration as milliseconds or `null`
    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> SerializeResult<S>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
            None => serializer.serialize_none(),
        }
    }

    /// Deserialize optional milliseconds into an optional Duration
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    use super::*;

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct TestStruct {
        #[serde(with = "duration_millis")]
        backoff: Duration,
        #[serde(default, with = "option_duration_millis")]
        timeout: Option<Duration>,
    }

    /// Tests that milliseconds deserialize to Duration
    #[test]
    fn test_duration_millis_deserialize() {
        let json = r#"{"backoff":2500,"timeout":null}"#;
        let data: TestStruct = serde_json::from_str(json).expect("Should deserialize valid JSON");

        assert_eq!(data.backoff, Duration::from_millis(2500));
        assert_eq!(data.timeout, None);
    }

    #[test]
    fn test_duration_millis_serialize() {
        let data = TestStruct {
            backoff: Duration::from_secs(1),
            timeout: Some(Duration::from_secs(60)),
        };

        let json = serde_json::to_string(&data).expect("Should serialize valid struct");
        assert_eq!(json, r#"{"backoff":1000,"timeout":60000}"#);
    }

    #[test]
    fn test_optional_duration_absent_field() {
        let data: TestStruct = serde_json::from_str(r#"{"backoff":0}"#).unwrap();
        assert_eq!(data.backoff, Duration::ZERO);
        assert!(data.timeout.is_none());
    }

    #[test]
    fn test_duration_millis_deserialize_invalid_json() {
        let invalid_json = r#"{"backoff":"not_a_number"}"#;
        let result: Result<TestStruct, _> = serde_json::from_str(invalid_json);
        assert!(result.is_err());
    }
}
