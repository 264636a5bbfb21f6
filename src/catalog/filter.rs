use serde::{Deserialize, Serialize};

use crate::core::FailureRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    All,
    Addressed,
    Unaddressed,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Addressed => "addressed",
            StatusFilter::Unaddressed => "unaddressed",
        }
    }

    fn admits(&self, addressed: bool) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Addressed => addressed,
            StatusFilter::Unaddressed => !addressed,
        }
    }
}

/// Text query plus status restriction applied before pagination.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    query: Option<String>,
    needle: Option<String>,
    pub status: StatusFilter,
}

impl RecordFilter {
    pub fn new(query: Option<&str>, status: StatusFilter) -> Self {
        let query = query
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        let needle = query.as_deref().map(str::to_lowercase);
        Self {
            query,
            needle,
            status,
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    /// The trimmed query as the user typed it, if any. Matching ignores case.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_none() && self.status == StatusFilter::All
    }

    pub fn matches(&self, record: &FailureRecord) -> bool {
        if !self.status.admits(record.addressed) {
            return false;
        }
        match &self.needle {
            Some(needle) => record.matches_lowercase(needle),
            None => true,
        }
    }
}
