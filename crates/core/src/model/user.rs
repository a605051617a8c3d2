use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::model::enrolment::Enrolment;
use crate::model::ids::{CourseId, Email};

/// A learner profile keyed by normalized email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub enrolments: BTreeMap<CourseId, Enrolment>,
}

impl User {
    /// Build a profile with no enrolments. A blank `name` falls back to the
    /// email's local part.
    #[must_use]
    pub fn new(email: Email, name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| email.local_part())
            .to_string();
        Self {
            name,
            email,
            enrolments: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn enrolment(&self, course_id: &CourseId) -> Option<&Enrolment> {
        self.enrolments.get(course_id)
    }

    pub fn enrolment_mut(&mut self, course_id: &CourseId) -> Option<&mut Enrolment> {
        self.enrolments.get_mut(course_id)
    }

    /// Insert a blank enrolment unless one already exists.
    ///
    /// Returns `true` when a new record was created.
    pub fn enrol(&mut self, course_id: &CourseId) -> bool {
        if self.enrolments.contains_key(course_id) {
            return false;
        }
        self.enrolments.insert(course_id.clone(), Enrolment::new());
        true
    }
}
