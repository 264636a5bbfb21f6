use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary used when a failure carries an empty message.
pub const NO_MESSAGE_SUMMARY: &str = "No error message";

/// One logical test failure, keyed by `identity`.
///
/// The catalog holds exactly one record per identity. `addressed` is a cached
/// copy of the persisted flag and is rewritten on every toggle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub identity: String,
    pub source_file: String,
    pub test_name: String,
    pub summary: String,
    pub full_message: String,
    pub observed_at: DateTime<Utc>,
    pub addressed: bool,
}

impl FailureRecord {
    pub fn new(
        source_file: impl Into<String>,
        test_name: impl Into<String>,
        full_message: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        let source_file = source_file.into();
        let test_name = test_name.into();
        let full_message = full_message.into();

        Self {
            identity: derive_identity(&source_file, &test_name),
            summary: summarize(&full_message),
            source_file,
            test_name,
            full_message,
            observed_at,
            addressed: false,
        }
    }

    pub fn with_addressed(mut self, addressed: bool) -> Self {
        self.addressed = addressed;
        self
    }

    /// Case-insensitive match against file, test name, summary and message.
    /// `needle` must already be lowercased.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        [
            &self.source_file,
            &self.test_name,
            &self.summary,
            &self.full_message,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// `<source_file>::<test_name>`
pub fn derive_identity(source_file: &str, test_name: &str) -> String {
    format!("{}::{}", source_file, test_name)
}

/// First line of the message, or [`NO_MESSAGE_SUMMARY`] when empty.
pub fn summarize(message: &str) -> String {
    if message.is_empty() {
        return NO_MESSAGE_SUMMARY.to_string();
    }
    message.split('\n').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_identity_joins_file_and_name() {
        let record = FailureRecord::new("tests/a.py", "test_x", "boom", ts());
        assert_eq!(record.identity, "tests/a.py::test_x");
        assert!(!record.addressed);
    }

    #[test]
    fn test_summary_is_first_line() {
        assert_eq!(summarize("AssertionError: 1 != 2\n  at line 3"), "AssertionError: 1 != 2");
        assert_eq!(summarize("single line"), "single line");
    }

    #[test]
    fn test_summary_placeholder_for_empty_message() {
        assert_eq!(summarize(""), NO_MESSAGE_SUMMARY);
    }

    #[test]
    fn test_summary_of_leading_newline_is_empty() {
        assert_eq!(summarize("\ntrace"), "");
    }

    #[test]
    fn test_matches_lowercase_searches_all_text_fields() {
        let record = FailureRecord::new("tests/api.py", "test_login", "KeyError: 'token'\ndetail", ts());
        assert!(record.matches_lowercase("api.py"));
        assert!(record.matches_lowercase("login"));
        assert!(record.matches_lowercase("keyerror"));
        assert!(record.matches_lowercase("detail"));
        assert!(!record.matches_lowercase("missing"));
    }
}
