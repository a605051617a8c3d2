mod certificate;
mod course;
mod enrolment;
mod feedback;
mod ids;
mod quiz;
mod state;
mod user;

pub use certificate::{CERTIFICATE_ISSUER, Certificate};
pub use course::{Course, Lesson, Level, ParseLevelError, Question, Quiz, Worksheet};
pub use enrolment::{Enrolment, MAX_PROGRESS, QUIZ_PROGRESS_STEP, WORKSHEET_PROGRESS_STEP};
pub use feedback::Feedback;
pub use ids::{CourseId, Email, ParseIdError};
pub use quiz::{PASS_THRESHOLD, QuizResult};
pub use state::PilotState;
pub use user::User;
