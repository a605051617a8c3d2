use serde::{Deserialize, Serialize};

/// Progress credited for recording a quiz attempt.
pub const QUIZ_PROGRESS_STEP: u32 = 40;
/// Progress credited for submitting the worksheet.
pub const WORKSHEET_PROGRESS_STEP: u32 = 60;
pub const MAX_PROGRESS: u32 = 100;

/// One learner's standing in one course.
///
/// `completed` mirrors `quiz_passed && worksheet_submitted` and is only ever
/// written by [`Enrolment::recompute`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrolment {
    progress: u32,
    completed: bool,
    quiz_passed: bool,
    worksheet_submitted: bool,
}

impl Enrolment {
    /// Fresh enrolment: no progress, nothing submitted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn progress(&self) -> u32 {
        self.progress
    }

    #[must_use]
    pub fn completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn quiz_passed(&self) -> bool {
        self.quiz_passed
    }

    #[must_use]
    pub fn worksheet_submitted(&self) -> bool {
        self.worksheet_submitted
    }

    #[must_use]
    pub fn is_certificate_eligible(&self) -> bool {
        self.quiz_passed && self.worksheet_submitted
    }

    /// Record a graded quiz attempt.
    ///
    /// The pass flag is overwritten by the latest attempt while progress is
    /// credited on every call, so retakes keep adding the quiz step.
    pub fn record_quiz(&mut self, passed: bool) {
        self.quiz_passed = passed;
        self.add_progress(QUIZ_PROGRESS_STEP);
        self.recompute();
    }

    pub fn record_worksheet(&mut self) {
        self.worksheet_submitted = true;
        self.add_progress(WORKSHEET_PROGRESS_STEP);
        self.recompute();
    }

    /// Re-establish the record invariants: progress within `0..=100` and
    /// `completed` derived from the two flags.
    pub fn recompute(&mut self) {
        self.progress = self.progress.min(MAX_PROGRESS);
        self.completed = self.quiz_passed && self.worksheet_submitted;
    }

    fn add_progress(&mut self, step: u32) {
        self.progress = self.progress.saturating_add(step).min(MAX_PROGRESS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_enrolment_is_blank() {
        let enrolment = Enrolment::new();
        assert_eq!(enrolment.progress(), 0);
        assert!(!enrolment.completed());
        assert!(!enrolment.quiz_passed());
        assert!(!enrolment.worksheet_submitted());
    }

    #[test]
    fn quiz_then_worksheet_completes() {
        let mut enrolment = Enrolment::new();
        enrolment.record_quiz(true);
        assert_eq!(enrolment.progress(), 40);
        assert!(!enrolment.completed());

        enrolment.record_worksheet();
        assert_eq!(enrolment.progress(), 100);
        assert!(enrolment.completed());
        assert!(enrolment.is_certificate_eligible());
    }

    #[test]
    fn worksheet_then_quiz_also_completes() {
        let mut enrolment = Enrolment::new();
        enrolment.record_worksheet();
        assert!(!enrolment.completed());
        enrolment.record_quiz(true);
        assert!(enrolment.completed());
        assert_eq!(enrolment.progress(), 100);
    }

    #[test]
    fn failed_retake_clears_pass_and_completion() {
        let mut enrolment = Enrolment::new();
        enrolment.record_quiz(true);
        enrolment.record_worksheet();
        enrolment.record_quiz(false);
        assert!(!enrolment.quiz_passed());
        assert!(!enrolment.completed());
        assert_eq!(enrolment.progress(), 100);
    }

    #[test]
    fn repeated_quizzes_accumulate_progress_up_to_cap() {
        let mut enrolment = Enrolment::new();
        enrolment.record_quiz(false);
        enrolment.record_quiz(false);
        assert_eq!(enrolment.progress(), 80);
        enrolment.record_quiz(true);
        assert_eq!(enrolment.progress(), 100);
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let json = serde_json::to_value(Enrolment::new()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "progress": 0,
                "completed": false,
                "quizPassed": false,
                "worksheetSubmitted": false
            })
        );
    }

    #[test]
    fn recompute_repairs_inconsistent_records() {
        let mut enrolment: Enrolment = serde_json::from_value(serde_json::json!({
            "progress": 250,
            "completed": true,
            "quizPassed": false,
            "worksheetSubmitted": true
        }))
        .unwrap();
        enrolment.recompute();
        assert_eq!(enrolment.progress(), 100);
        assert!(!enrolment.completed());
    }
}
