//! Shared error types for the services crate.

use thiserror::Error;

use pilot_core::CatalogError;
use pilot_core::model::CourseId;
use storage::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `EnrolmentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnrolmentError {
    #[error("please enrol and sign in first")]
    NoSession,
    #[error("you are not enrolled in course {0}")]
    NotEnrolled(CourseId),
    #[error("unknown course: {0}")]
    UnknownCourse(CourseId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CertificateService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CertificateError {
    #[error("no certificate available: nobody is signed in")]
    NoSession,
    #[error("no certificate available: not enrolled in course {0}")]
    NotEnrolled(CourseId),
    #[error("complete the quiz and submit the worksheet for course {0} to get a certificate")]
    Incomplete(CourseId),
    #[error("unknown course: {0}")]
    UnknownCourse(CourseId),
}

/// Errors emitted by `FeedbackService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FeedbackError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
