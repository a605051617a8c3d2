use std::collections::BTreeMap;
use std::sync::Arc;

use pilot_core::Catalog;
use pilot_core::model::{CourseId, Email, Enrolment, PilotState, QuizResult, User};
use storage::StateStore;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::EnrolmentError;

/// One row of the learner dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardEntry {
    pub course_id: CourseId,
    /// Catalog title, or the raw id when the course is no longer listed.
    pub course_title: String,
    pub enrolment: Enrolment,
}

impl DashboardEntry {
    #[must_use]
    pub fn certificate_eligible(&self) -> bool {
        self.enrolment.is_certificate_eligible()
    }
}

/// Owns the learner state and performs every transition on it.
///
/// Each mutation runs on a copy of the state, persists the copy, and only then
/// publishes it, so a failed save leaves both memory and storage unchanged.
#[derive(Clone)]
pub struct EnrolmentService {
    store: StateStore,
    catalog: Arc<Catalog>,
    state: Arc<Mutex<PilotState>>,
}

impl EnrolmentService {
    /// Load persisted state and build the service around it.
    pub async fn open(store: StateStore, catalog: Arc<Catalog>) -> Self {
        let state = store.load().await;
        info!(
            users = state.users.len(),
            signed_in = state.current_user.is_some(),
            "enrolment state ready"
        );
        Self {
            store,
            catalog,
            state: Arc::new(Mutex::new(state)),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Make `email` the signed-in learner, creating the profile if needed.
    ///
    /// Returns `Ok(None)` for blank input. An existing profile keeps its name;
    /// only the session pointer moves.
    ///
    /// # Errors
    ///
    /// Returns `EnrolmentError::Storage` if the state cannot be saved.
    pub async fn ensure_user(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<Option<User>, EnrolmentError> {
        let Some(email) = Email::parse(email) else {
            return Ok(None);
        };
        let user = self
            .mutate(|state| Ok(sign_in(state, &email, name).clone()))
            .await?;
        Ok(Some(user))
    }

    /// Enrol `email` in `course_id`, signing the learner in.
    ///
    /// Enrolling twice keeps the existing record untouched. Returns `false`
    /// only when the email is blank.
    ///
    /// # Errors
    ///
    /// Returns `EnrolmentError::UnknownCourse` if the catalog has no such
    /// course, or `EnrolmentError::Storage` if the state cannot be saved.
    pub async fn enrol(&self, email: &str, course_id: &CourseId) -> Result<bool, EnrolmentError> {
        let Some(email) = Email::parse(email) else {
            return Ok(false);
        };
        if !self.catalog.contains(course_id) {
            return Err(EnrolmentError::UnknownCourse(course_id.clone()));
        }

        self.mutate(|state| {
            let user = sign_in(state, &email, None);
            if user.enrol(course_id) {
                debug!(%email, %course_id, "created enrolment");
            }
            Ok(())
        })
        .await?;
        Ok(true)
    }

    /// Sign `email` in and, if `course_id` is given, enrol them in it.
    ///
    /// The course is checked against the catalog before anything changes, and
    /// both steps are saved together. Returns `Ok(None)` for blank input.
    ///
    /// # Errors
    ///
    /// Returns `EnrolmentError::UnknownCourse` if the catalog has no such
    /// course, or `EnrolmentError::Storage` if the state cannot be saved.
    pub async fn join(
        &self,
        email: &str,
        name: Option<&str>,
        course_id: Option<&CourseId>,
    ) -> Result<Option<User>, EnrolmentError> {
        let Some(email) = Email::parse(email) else {
            return Ok(None);
        };
        if let Some(course_id) = course_id.filter(|id| !self.catalog.contains(id)) {
            return Err(EnrolmentError::UnknownCourse(course_id.clone()));
        }

        let user = self
            .mutate(|state| {
                let user = sign_in(state, &email, name);
                if let Some(course_id) = course_id {
                    if user.enrol(course_id) {
                        debug!(%email, %course_id, "created enrolment");
                    }
                }
                Ok(user.clone())
            })
            .await?;
        Ok(Some(user))
    }

    /// Score a quiz from raw counts and credit the signed-in learner.
    ///
    /// The result is returned whether or not anyone is signed in or enrolled;
    /// only progress tracking needs an enrolment.
    ///
    /// # Errors
    ///
    /// Returns `EnrolmentError::Storage` if the state cannot be saved.
    pub async fn record_quiz_result(
        &self,
        course_id: &CourseId,
        correct: u32,
        total: u32,
    ) -> Result<QuizResult, EnrolmentError> {
        let result = QuizResult::from_counts(correct, total);
        self.apply_quiz_result(course_id, result).await?;
        Ok(result)
    }

    /// Grade `answers` against the catalog quiz and record the result.
    ///
    /// # Errors
    ///
    /// Returns `EnrolmentError::UnknownCourse` for ids missing from the
    /// catalog, or `EnrolmentError::Storage` if the state cannot be saved.
    pub async fn submit_quiz(
        &self,
        course_id: &CourseId,
        answers: &[Option<usize>],
    ) -> Result<QuizResult, EnrolmentError> {
        let course = self
            .catalog
            .get(course_id)
            .ok_or_else(|| EnrolmentError::UnknownCourse(course_id.clone()))?;
        let result = course.quiz.grade(answers);
        self.apply_quiz_result(course_id, result).await?;
        Ok(result)
    }

    /// Mark the worksheet as submitted for the signed-in learner.
    ///
    /// # Errors
    ///
    /// Returns `EnrolmentError::NoSession` when nobody is signed in,
    /// `EnrolmentError::NotEnrolled` when the learner has no enrolment for the
    /// course, or `EnrolmentError::Storage` if the state cannot be saved.
    pub async fn submit_worksheet(&self, course_id: &CourseId) -> Result<Enrolment, EnrolmentError> {
        self.mutate(|state| {
            let user = state.current_mut().ok_or(EnrolmentError::NoSession)?;
            let enrolment = user
                .enrolment_mut(course_id)
                .ok_or_else(|| EnrolmentError::NotEnrolled(course_id.clone()))?;
            enrolment.record_worksheet();
            debug!(
                %course_id,
                progress = enrolment.progress(),
                completed = enrolment.completed(),
                "worksheet submitted"
            );
            Ok(enrolment.clone())
        })
        .await
    }

    /// True when the signed-in learner passed the quiz and submitted the
    /// worksheet for `course_id`.
    pub async fn is_certificate_eligible(&self, course_id: &CourseId) -> bool {
        self.state.lock().await.is_certificate_eligible(course_id)
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.lock().await.current().cloned()
    }

    /// The signed-in learner's enrolments keyed by course.
    pub async fn current_enrolments(&self) -> Option<BTreeMap<CourseId, Enrolment>> {
        self.state
            .lock()
            .await
            .current()
            .map(|user| user.enrolments.clone())
    }

    /// Dashboard rows for the signed-in learner, ordered by course id.
    pub async fn dashboard(&self) -> Vec<DashboardEntry> {
        let Some(enrolments) = self.current_enrolments().await else {
            return Vec::new();
        };
        enrolments
            .into_iter()
            .map(|(course_id, enrolment)| {
                let course_title = self
                    .catalog
                    .get(&course_id)
                    .map_or_else(|| course_id.to_string(), |course| course.title.clone());
                DashboardEntry {
                    course_id,
                    course_title,
                    enrolment,
                }
            })
            .collect()
    }

    /// Clear the session pointer without touching any profile.
    ///
    /// # Errors
    ///
    /// Returns `EnrolmentError::Storage` if the state cannot be saved.
    pub async fn sign_out(&self) -> Result<(), EnrolmentError> {
        self.mutate(|state| {
            state.current_user = None;
            Ok(())
        })
        .await
    }

    /// A copy of the whole state.
    pub async fn snapshot(&self) -> PilotState {
        self.state.lock().await.clone()
    }

    async fn apply_quiz_result(
        &self,
        course_id: &CourseId,
        result: QuizResult,
    ) -> Result<(), EnrolmentError> {
        self.mutate(|state| {
            let Some(enrolment) = state
                .current_mut()
                .and_then(|user| user.enrolment_mut(course_id))
            else {
                debug!(%course_id, score = result.score(), "quiz result not tracked");
                return Ok(());
            };
            enrolment.record_quiz(result.passed());
            debug!(
                %course_id,
                score = result.score(),
                passed = result.passed(),
                progress = enrolment.progress(),
                "quiz result recorded"
            );
            Ok(())
        })
        .await
    }

    async fn mutate<T>(
        &self,
        apply: impl FnOnce(&mut PilotState) -> Result<T, EnrolmentError>,
    ) -> Result<T, EnrolmentError> {
        let mut guard = self.state.lock().await;
        let mut next = guard.clone();
        let output = apply(&mut next)?;
        if next != *guard {
            self.store.save(&next).await?;
            *guard = next;
        }
        Ok(output)
    }
}

fn sign_in<'a>(state: &'a mut PilotState, email: &Email, name: Option<&str>) -> &'a mut User {
    state.current_user = Some(email.clone());
    state
        .users
        .entry(email.clone())
        .or_insert_with(|| User::new(email.clone(), name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{InMemoryKeyValueStore, KeyValueStore, STATE_KEY};

    async fn service() -> (InMemoryKeyValueStore, StateStore, EnrolmentService) {
        let kv = InMemoryKeyValueStore::new();
        let store = StateStore::new(Arc::new(kv.clone()));
        let service = EnrolmentService::open(store.clone(), Arc::new(Catalog::pilot())).await;
        (kv, store, service)
    }

    fn m1() -> CourseId {
        CourseId::new("m1")
    }

    #[tokio::test]
    async fn ensure_user_creates_profile_and_session() {
        let (_, store, service) = service().await;
        let user = service
            .ensure_user(" A@X.com ", Some("A"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.email.as_str(), "a@x.com");
        assert_eq!(user.name, "A");

        let persisted = store.load().await;
        assert_eq!(persisted.users.len(), 1);
        assert_eq!(persisted.current_user, Some(user.email));
    }

    #[tokio::test]
    async fn ensure_user_is_idempotent_and_keeps_name() {
        let (_, _, service) = service().await;
        service.ensure_user("a@x.com", Some("A")).await.unwrap();
        service.ensure_user("b@x.com", None).await.unwrap();
        let again = service
            .ensure_user("a@x.com", Some("Renamed"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(again.name, "A");
        let state = service.snapshot().await;
        assert_eq!(state.users.len(), 2);
        assert_eq!(state.current_user, Email::parse("a@x.com"));
    }

    #[tokio::test]
    async fn blank_email_is_a_no_op() {
        let (_, _, service) = service().await;
        assert!(service.ensure_user("   ", Some("A")).await.unwrap().is_none());
        assert!(!service.enrol("", &m1()).await.unwrap());
        assert_eq!(service.snapshot().await, PilotState::default());
    }

    #[tokio::test]
    async fn enrol_creates_blank_record() {
        let (_, _, service) = service().await;
        service.ensure_user("a@x.com", Some("A")).await.unwrap();
        assert!(service.enrol("a@x.com", &m1()).await.unwrap());

        let enrolments = service.current_enrolments().await.unwrap();
        assert_eq!(enrolments.get(&m1()), Some(&Enrolment::new()));
    }

    #[tokio::test]
    async fn enrol_without_prior_profile_defaults_name() {
        let (_, _, service) = service().await;
        assert!(service.enrol("zola@x.com", &m1()).await.unwrap());
        let user = service.current_user().await.unwrap();
        assert_eq!(user.name, "zola");
    }

    #[tokio::test]
    async fn second_enrol_keeps_progress() {
        let (_, _, service) = service().await;
        service.enrol("a@x.com", &m1()).await.unwrap();
        service.record_quiz_result(&m1(), 2, 2).await.unwrap();
        service.enrol("a@x.com", &m1()).await.unwrap();

        let enrolment = service.current_enrolments().await.unwrap()[&m1()].clone();
        assert_eq!(enrolment.progress(), 40);
        assert!(enrolment.quiz_passed());
    }

    #[tokio::test]
    async fn unknown_course_is_rejected() {
        let (_, _, service) = service().await;
        let err = service
            .enrol("a@x.com", &CourseId::new("m42"))
            .await
            .unwrap_err();
        assert!(matches!(err, EnrolmentError::UnknownCourse(_)));
        assert!(service.snapshot().await.users.is_empty());
    }

    #[tokio::test]
    async fn join_with_unknown_course_changes_nothing() {
        let (kv, _, service) = service().await;
        service.ensure_user("a@x.com", Some("A")).await.unwrap();
        let before = service.snapshot().await;
        let raw_before = kv.get(STATE_KEY).await.unwrap();

        let err = service
            .join("b@x.com", Some("B"), Some(&CourseId::new("m42")))
            .await
            .unwrap_err();
        assert!(matches!(err, EnrolmentError::UnknownCourse(_)));
        assert_eq!(service.snapshot().await, before);
        assert_eq!(kv.get(STATE_KEY).await.unwrap(), raw_before);
    }

    #[tokio::test]
    async fn join_signs_in_and_enrols_together() {
        let (_, store, service) = service().await;
        let user = service
            .join("A@X.com", Some("A"), Some(&m1()))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.enrolment(&m1()), Some(&Enrolment::new()));

        let persisted = store.load().await;
        assert_eq!(persisted.current_user, Email::parse("a@x.com"));
        assert!(persisted.current().unwrap().enrolment(&m1()).is_some());

        assert!(service.join(" ", None, Some(&m1())).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mixed_case_stored_learner_keeps_progress() {
        let kv = InMemoryKeyValueStore::new();
        kv.set(
            STATE_KEY,
            r#"{"users":{"A@X.com":{"name":"A","email":"A@X.com","enrolments":{"m1":{"progress":40,"completed":false,"quizPassed":true,"worksheetSubmitted":false}}}},"currentUser":"A@X.com"}"#,
        )
        .await
        .unwrap();
        let store = StateStore::new(Arc::new(kv.clone()));
        let service = EnrolmentService::open(store, Arc::new(Catalog::pilot())).await;

        let user = service
            .ensure_user("A@X.com", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.name, "A");
        assert_eq!(user.enrolment(&m1()).unwrap().progress(), 40);
        assert_eq!(service.snapshot().await.users.len(), 1);
    }

    #[tokio::test]
    async fn quiz_without_enrolment_scores_but_does_not_track() {
        let (_, _, service) = service().await;
        service.ensure_user("a@x.com", None).await.unwrap();
        let before = service.snapshot().await;

        let result = service.record_quiz_result(&m1(), 2, 2).await.unwrap();
        assert_eq!(result.score(), 100);
        assert!(result.passed());
        assert_eq!(service.snapshot().await, before);
    }

    #[tokio::test]
    async fn quiz_without_session_scores_but_does_not_track() {
        let (_, _, service) = service().await;
        let result = service.record_quiz_result(&m1(), 1, 2).await.unwrap();
        assert_eq!(result.score(), 50);
        assert!(!result.passed());
        assert_eq!(service.snapshot().await, PilotState::default());
    }

    #[tokio::test]
    async fn submit_quiz_grades_against_catalog() {
        let (_, _, service) = service().await;
        service.enrol("a@x.com", &m1()).await.unwrap();

        let result = service
            .submit_quiz(&m1(), &[Some(0), Some(1)])
            .await
            .unwrap();
        assert_eq!(result.score(), 100);
        assert!(service.current_enrolments().await.unwrap()[&m1()].quiz_passed());

        let err = service
            .submit_quiz(&CourseId::new("nope"), &[Some(0)])
            .await
            .unwrap_err();
        assert!(matches!(err, EnrolmentError::UnknownCourse(_)));
    }

    #[tokio::test]
    async fn failed_quiz_still_credits_progress() {
        let (_, _, service) = service().await;
        service.enrol("a@x.com", &m1()).await.unwrap();
        service.record_quiz_result(&m1(), 0, 2).await.unwrap();

        let enrolment = service.current_enrolments().await.unwrap()[&m1()].clone();
        assert_eq!(enrolment.progress(), 40);
        assert!(!enrolment.quiz_passed());
    }

    #[tokio::test]
    async fn quiz_then_worksheet_makes_certificate_eligible() {
        let (_, store, service) = service().await;
        service.ensure_user("a@x.com", Some("A")).await.unwrap();
        service.enrol("a@x.com", &m1()).await.unwrap();

        service.record_quiz_result(&m1(), 2, 2).await.unwrap();
        assert!(!service.is_certificate_eligible(&m1()).await);

        let enrolment = service.submit_worksheet(&m1()).await.unwrap();
        assert_eq!(enrolment.progress(), 100);
        assert!(enrolment.completed());
        assert!(service.is_certificate_eligible(&m1()).await);

        let persisted = store.load().await;
        assert!(persisted.is_certificate_eligible(&m1()));
    }

    #[tokio::test]
    async fn worksheet_requires_enrolment() {
        let (_, _, service) = service().await;
        service.ensure_user("a@x.com", None).await.unwrap();
        let before = service.snapshot().await;

        let err = service.submit_worksheet(&m1()).await.unwrap_err();
        assert!(matches!(err, EnrolmentError::NotEnrolled(id) if id == m1()));
        assert_eq!(service.snapshot().await, before);
    }

    #[tokio::test]
    async fn worksheet_requires_session() {
        let (_, _, service) = service().await;
        service.enrol("a@x.com", &m1()).await.unwrap();
        service.sign_out().await.unwrap();

        let err = service.submit_worksheet(&m1()).await.unwrap_err();
        assert!(matches!(err, EnrolmentError::NoSession));
        assert!(service.current_user().await.is_none());
        assert_eq!(service.snapshot().await.users.len(), 1);
    }

    #[tokio::test]
    async fn failed_save_leaves_state_unchanged() {
        let (kv, store, service) = service().await;
        service.enrol("a@x.com", &m1()).await.unwrap();
        let before = service.snapshot().await;

        kv.set_reject_writes(true);
        let err = service.submit_worksheet(&m1()).await.unwrap_err();
        assert!(matches!(err, EnrolmentError::Storage(_)));
        assert_eq!(service.snapshot().await, before);

        kv.set_reject_writes(false);
        assert_eq!(store.load().await, before);
    }

    #[tokio::test]
    async fn dashboard_lists_current_learner_courses() {
        let (_, _, service) = service().await;
        assert!(service.dashboard().await.is_empty());

        service.enrol("a@x.com", &CourseId::new("m3")).await.unwrap();
        service.enrol("a@x.com", &m1()).await.unwrap();
        let rows = service.dashboard().await;
        let titles: Vec<_> = rows.iter().map(|row| row.course_title.as_str()).collect();
        assert_eq!(titles, ["Budgeting & Cashflow", "Savings & Basic Investing"]);
        assert!(rows.iter().all(|row| !row.certificate_eligible()));
    }

    #[tokio::test]
    async fn reopening_restores_session() {
        let (_, store, service) = service().await;
        service.enrol("a@x.com", &m1()).await.unwrap();
        service.record_quiz_result(&m1(), 2, 2).await.unwrap();

        let reopened = EnrolmentService::open(store, Arc::new(Catalog::pilot())).await;
        assert_eq!(reopened.snapshot().await, service.snapshot().await);
        assert_eq!(reopened.current_user().await.unwrap().name, "a");
    }
}
