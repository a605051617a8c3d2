use chrono::SecondsFormat;
use pilot_core::model::Feedback;
use storage::FeedbackLog;
use tracing::info;

use crate::Clock;
use crate::error::FeedbackError;

/// Records contact-form messages.
#[derive(Clone)]
pub struct FeedbackService {
    clock: Clock,
    log: FeedbackLog,
}

impl FeedbackService {
    #[must_use]
    pub fn new(clock: Clock, log: FeedbackLog) -> Self {
        Self { clock, log }
    }

    /// Trim and store one message, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `FeedbackError::MissingField` if any field is blank, or
    /// `FeedbackError::Storage` if the list cannot be written.
    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<Feedback, FeedbackError> {
        let feedback = Feedback {
            name: required(name, "name")?,
            email: required(email, "email")?,
            message: required(message, "message")?,
            date: self
                .clock
                .now()
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        };
        let count = self.log.append(feedback.clone()).await?;
        info!(count, "stored contact message");
        Ok(feedback)
    }
}

fn required(value: &str, field: &'static str) -> Result<String, FeedbackError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FeedbackError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
