use chrono::{DateTime, NaiveDate, Utc};

/// Source of "now" for services that stamp certificates and feedback.
///
/// `Fixed` keeps tests deterministic; `System` reads the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Calendar date (UTC) used on printed certificates.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// 2023-11-14T22:13:20Z, the instant behind [`fixed_now`] in tests.
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_the_same_instant() {
        let clock = fixed_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2023, 11, 14).unwrap());
    }

    #[test]
    fn fixed_timestamp_matches_its_documented_instant() {
        assert_eq!(fixed_now().to_rfc3339(), "2023-11-14T22:13:20+00:00");
    }
}
