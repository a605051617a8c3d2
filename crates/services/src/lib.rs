#![forbid(unsafe_code)]

pub mod app_services;
pub mod certificate_service;
pub mod enrolment_service;
pub mod error;
pub mod feedback_service;

pub use pilot_core::Clock;

pub use app_services::AppServices;
pub use certificate_service::CertificateService;
pub use enrolment_service::{DashboardEntry, EnrolmentService};
pub use error::{AppServicesError, CertificateError, EnrolmentError, FeedbackError};
pub use feedback_service::FeedbackService;
