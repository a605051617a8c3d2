use chrono::NaiveDate;

use crate::model::ids::CourseId;

pub const CERTIFICATE_ISSUER: &str = "Mzansi Money Academy — Pilot";

/// Certificate of completion for one learner and one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    pub learner_name: String,
    pub course_id: CourseId,
    pub course_title: String,
    pub issued_on: NaiveDate,
    pub issuer: &'static str,
}

impl Certificate {
    #[must_use]
    pub fn new(
        learner_name: impl Into<String>,
        course_id: CourseId,
        course_title: impl Into<String>,
        issued_on: NaiveDate,
    ) -> Self {
        Self {
            learner_name: learner_name.into(),
            course_id,
            course_title: course_title.into(),
            issued_on,
            issuer: CERTIFICATE_ISSUER,
        }
    }
}
