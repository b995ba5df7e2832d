//! Topic Weight common library.
//!
//! Wire types, the error taxonomy, and the two pure pieces of the analysis
//! pipeline (citation numbering and hours aggregation). Nothing in this crate
//! performs I/O.

pub mod citation;
pub mod error;
pub mod hours;
pub mod types;

pub use citation::CitationRegistry;
pub use error::{
    AnalysisError, ANALYSIS_FAILED_MESSAGE, CHAT_FAILED_MESSAGE, CHAT_INVALID_MESSAGE,
    DAYS_INVALID_MESSAGE, DAYS_TOO_LARGE_MESSAGE, INVALID_BODY_MESSAGE, TOPIC_REQUIRED_MESSAGE,
};
pub use hours::{aggregate_hours, HoursEstimate, MAX_DAYS_PER_YEAR};
pub use types::*;

/// Default daemon address used by the CLI
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:3000";
