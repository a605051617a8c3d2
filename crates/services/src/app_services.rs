use std::sync::Arc;

use pilot_core::Catalog;
use storage::Storage;
use tracing::info;

use crate::Clock;
use crate::certificate_service::CertificateService;
use crate::enrolment_service::EnrolmentService;
use crate::error::AppServicesError;
use crate::feedback_service::FeedbackService;

/// Assembles the services a front end needs over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    enrolments: Arc<EnrolmentService>,
    certificates: Arc<CertificateService>,
    feedback: Arc<FeedbackService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails or the
    /// catalog is inconsistent.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::from_storage(storage, clock).await
    }

    /// Build services over a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the catalog is inconsistent.
    pub async fn in_memory(clock: Clock) -> Result<Self, AppServicesError> {
        Self::from_storage(Storage::in_memory(), clock).await
    }

    /// # Errors
    ///
    /// Returns `AppServicesError::Catalog` if the pilot catalog fails validation.
    pub async fn from_storage(storage: Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let catalog = Catalog::pilot();
        catalog.validate()?;
        info!(courses = catalog.courses().len(), "catalog loaded");

        let enrolments = Arc::new(EnrolmentService::open(storage.state, Arc::new(catalog)).await);
        let certificates = Arc::new(CertificateService::new(clock, Arc::clone(&enrolments)));
        let feedback = Arc::new(FeedbackService::new(clock, storage.feedback));

        Ok(Self {
            enrolments,
            certificates,
            feedback,
        })
    }

    #[must_use]
    pub fn enrolments(&self) -> Arc<EnrolmentService> {
        Arc::clone(&self.enrolments)
    }

    #[must_use]
    pub fn certificates(&self) -> Arc<CertificateService> {
        Arc::clone(&self.certificates)
    }

    #[must_use]
    pub fn feedback(&self) -> Arc<FeedbackService> {
        Arc::clone(&self.feedback)
    }
}
