use serde::{Deserialize, Serialize};

/// One contact-form submission. Stored append-only and never read back by
/// the pilot itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub name: String,
    pub email: String,
    pub message: String,
    /// RFC 3339 timestamp of submission.
    pub date: String,
}
