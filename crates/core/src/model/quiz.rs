/// Minimum score (percent) that counts as a pass.
pub const PASS_THRESHOLD: u32 = 70;

/// Outcome of grading one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    score: u32,
    passed: bool,
}

impl QuizResult {
    /// Score a quiz from the number of correct answers.
    ///
    /// The score is `correct / total * 100` rounded half up. `correct` is
    /// capped at `total`; an empty quiz scores 0 and does not pass.
    #[must_use]
    pub fn from_counts(correct: u32, total: u32) -> Self {
        if total == 0 {
            return Self {
                score: 0,
                passed: false,
            };
        }
        let correct = u64::from(correct.min(total));
        let total = u64::from(total);
        let score = u32::try_from((correct * 100 + total / 2) / total).unwrap_or(100);
        Self {
            score,
            passed: score >= PASS_THRESHOLD,
        }
    }

    /// Percentage in `0..=100`.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }
}
