use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::ids::{CourseId, Email};
use crate::model::user::User;

/// Everything the pilot persists: learner profiles plus the session pointer.
///
/// Maps are ordered so that serializing the same state always produces the
/// same bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PilotState {
    #[serde(default)]
    pub users: BTreeMap<Email, User>,
    #[serde(default)]
    pub current_user: Option<Email>,
}

impl PilotState {
    #[must_use]
    pub fn user(&self, email: &Email) -> Option<&User> {
        self.users.get(email)
    }

    pub fn user_mut(&mut self, email: &Email) -> Option<&mut User> {
        self.users.get_mut(email)
    }

    /// The learner the session points at, if any.
    #[must_use]
    pub fn current(&self) -> Option<&User> {
        self.current_user
            .as_ref()
            .and_then(|email| self.users.get(email))
    }

    pub fn current_mut(&mut self) -> Option<&mut User> {
        let email = self.current_user.clone()?;
        self.users.get_mut(&email)
    }

    #[must_use]
    pub fn is_certificate_eligible(&self, course_id: &CourseId) -> bool {
        self.current()
            .and_then(|user| user.enrolment(course_id))
            .is_some_and(|enrolment| enrolment.is_certificate_eligible())
    }

    /// Repair state read from an external source.
    ///
    /// Drops a session pointer that names no stored user, re-keys profiles
    /// whose key and `email` field disagree, and re-derives every enrolment's
    /// clamped progress and `completed` flag. Returns `true` if anything changed.
    pub fn normalize(&mut self) -> bool {
        let mut changed = false;

        let mismatched: Vec<Email> = self
            .users
            .iter()
            .filter(|(key, user)| **key != user.email)
            .map(|(key, _)| key.clone())
            .collect();
        for key in mismatched {
            if let Some(mut user) = self.users.remove(&key) {
                user.email = key.clone();
                self.users.insert(key, user);
                changed = true;
            }
        }

        for user in self.users.values_mut() {
            for enrolment in user.enrolments.values_mut() {
                let before = enrolment.clone();
                enrolment.recompute();
                changed |= *enrolment != before;
            }
        }

        let dangling = self
            .current_user
            .as_ref()
            .is_some_and(|email| !self.users.contains_key(email));
        if dangling {
            self.current_user = None;
            changed = true;
        }

        changed
    }
}
