use std::sync::Arc;

use pilot_core::model::{Certificate, CourseId};
use tracing::info;

use crate::Clock;
use crate::enrolment_service::EnrolmentService;
use crate::error::CertificateError;

/// Issues completion certificates for the signed-in learner.
#[derive(Clone)]
pub struct CertificateService {
    clock: Clock,
    enrolments: Arc<EnrolmentService>,
}

impl CertificateService {
    #[must_use]
    pub fn new(clock: Clock, enrolments: Arc<EnrolmentService>) -> Self {
        Self { clock, enrolments }
    }

    /// Build a certificate dated today.
    ///
    /// # Errors
    ///
    /// Returns `CertificateError` when the course is unknown, nobody is signed
    /// in, the learner is not enrolled, or the course is not yet complete.
    pub async fn issue(&self, course_id: &CourseId) -> Result<Certificate, CertificateError> {
        let catalog = self.enrolments.catalog();
        let course = catalog
            .get(course_id)
            .ok_or_else(|| CertificateError::UnknownCourse(course_id.clone()))?;
        let user = self
            .enrolments
            .current_user()
            .await
            .ok_or(CertificateError::NoSession)?;
        let enrolment = user
            .enrolment(course_id)
            .ok_or_else(|| CertificateError::NotEnrolled(course_id.clone()))?;
        if !enrolment.is_certificate_eligible() {
            return Err(CertificateError::Incomplete(course_id.clone()));
        }

        info!(learner = %user.email, %course_id, "issued certificate");
        Ok(Certificate::new(
            user.name.clone(),
            course_id.clone(),
            course.title.clone(),
            self.clock.today(),
        ))
    }
}
