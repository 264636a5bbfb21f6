pub mod error;
pub mod record;

pub use error::{Result, TrackerError};
pub use record::{FailureRecord, NO_MESSAGE_SUMMARY, derive_identity, summarize};
