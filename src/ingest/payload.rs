//! Decoding of the JSON payload column.
//!
//! Expected shape:
//! `{"test": {"source": {"file": ..}, "name": ..}, "error": {"message": ..}}`

use serde::Deserialize;
use serde_json::Value;

use crate::core::{Result, TrackerError};

const UNKNOWN: &str = "unknown";

/// How a payload missing required fields is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SchemaPolicy {
    /// Reject the row.
    #[default]
    Strict,
    /// Default file and test name to `"unknown"` and the message to `""`.
    Lenient,
}

impl SchemaPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaPolicy::Strict => "strict",
            SchemaPolicy::Lenient => "lenient",
        }
    }
}

impl std::str::FromStr for SchemaPolicy {
    type Err = TrackerError;

    fn from_str(raw: &str) -> Result<Self> {
        match raw.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" | "loose" => Ok(Self::Lenient),
            other => Err(TrackerError::Config(format!(
                "schema policy must be one of: strict, lenient (got '{}')",
                other
            ))),
        }
    }
}

/// Fields extracted from one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailurePayload {
    pub source_file: String,
    pub test_name: String,
    pub message: String,
}

#[derive(Deserialize)]
struct StrictPayload {
    test: StrictTest,
    error: StrictError,
}

#[derive(Deserialize)]
struct StrictTest {
    source: StrictSource,
    name: String,
}

#[derive(Deserialize)]
struct StrictSource {
    file: String,
}

#[derive(Deserialize)]
struct StrictError {
    message: String,
}

pub fn decode_payload(raw: &str, policy: SchemaPolicy) -> Result<FailurePayload> {
    match policy {
        SchemaPolicy::Strict => decode_strict(raw),
        SchemaPolicy::Lenient => decode_lenient(raw),
    }
}

fn decode_strict(raw: &str) -> Result<FailurePayload> {
    let value = parse_object(raw)?;
    let payload: StrictPayload =
        serde_json::from_value(value).map_err(|e| TrackerError::Payload(e.to_string()))?;
    Ok(FailurePayload {
        source_file: payload.test.source.file,
        test_name: payload.test.name,
        message: payload.error.message,
    })
}

fn decode_lenient(raw: &str) -> Result<FailurePayload> {
    let value = parse_object(raw)?;
    let text_at = |pointer: &str| value.pointer(pointer).and_then(Value::as_str);

    Ok(FailurePayload {
        source_file: text_at("/test/source/file").unwrap_or(UNKNOWN).to_string(),
        test_name: text_at("/test/name").unwrap_or(UNKNOWN).to_string(),
        message: text_at("/error/message").unwrap_or_default().to_string(),
    })
}

fn parse_object(raw: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| TrackerError::Payload(e.to_string()))?;
    if !value.is_object() {
        return Err(TrackerError::Payload("payload is not a JSON object".to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{"test": {"source": {"file": "tests/a.py"}, "name": "test_x"}, "error": {"message": "Err1\nline2"}}"#;
    const NO_FILE: &str = r#"{"test": {"name": "test_x"}, "error": {"message": "Err1"}}"#;

    #[test]
    fn test_strict_accepts_full_payload() {
        let payload = decode_payload(FULL, SchemaPolicy::Strict).unwrap();
        assert_eq!(payload.source_file, "tests/a.py");
        assert_eq!(payload.test_name, "test_x");
        assert_eq!(payload.message, "Err1\nline2");
    }

    #[test]
    fn test_strict_rejects_missing_field() {
        assert!(matches!(
            decode_payload(NO_FILE, SchemaPolicy::Strict),
            Err(TrackerError::Payload(_))
        ));
    }

    #[test]
    fn test_strict_rejects_wrong_type() {
        let raw = r#"{"test": {"source": {"file": 7}, "name": "t"}, "error": {"message": ""}}"#;
        assert!(decode_payload(raw, SchemaPolicy::Strict).is_err());
    }

    #[test]
    fn test_lenient_defaults_missing_fields() {
        let payload = decode_payload(NO_FILE, SchemaPolicy::Lenient).unwrap();
        assert_eq!(payload.source_file, "unknown");
        assert_eq!(payload.test_name, "test_x");

        let payload = decode_payload("{}", SchemaPolicy::Lenient).unwrap();
        assert_eq!(payload.source_file, "unknown");
        assert_eq!(payload.test_name, "unknown");
        assert_eq!(payload.message, "");
    }

    #[test]
    fn test_both_policies_reject_malformed_json() {
        for policy in [SchemaPolicy::Strict, SchemaPolicy::Lenient] {
            assert!(decode_payload("{\"test\": ", policy).is_err());
        }
    }

    #[test]
    fn test_non_object_rejected() {
        for policy in [SchemaPolicy::Strict, SchemaPolicy::Lenient] {
            assert!(decode_payload("[1, 2]", policy).is_err());
            assert!(decode_payload("\"text\"", policy).is_err());
        }
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("STRICT".parse::<SchemaPolicy>().unwrap(), SchemaPolicy::Strict);
        assert_eq!("lenient".parse::<SchemaPolicy>().unwrap(), SchemaPolicy::Lenient);
        assert!("other".parse::<SchemaPolicy>().is_err());
    }
}
