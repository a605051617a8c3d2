//! The static course catalog.
//!
//! Courses are defined once when the catalog is built and are read-only for
//! the lifetime of the process.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Course, CourseId, Lesson, Level, Question, Quiz, Worksheet};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("duplicate course id: {0}")]
    DuplicateCourse(CourseId),

    #[error("course {course} question {question} has no choices")]
    EmptyChoices { course: CourseId, question: usize },

    #[error("course {course} question {question} answer index is out of range")]
    AnswerOutOfRange { course: CourseId, question: usize },
}

/// Narrowing applied to the catalog listing. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseFilter {
    pub level: Option<Level>,
    pub language: Option<String>,
    pub query: Option<String>,
}

impl CourseFilter {
    #[must_use]
    pub fn matches(&self, course: &Course) -> bool {
        if self.level.is_some_and(|level| level != course.level) {
            return false;
        }
        if let Some(language) = self.language.as_deref() {
            if !language.eq_ignore_ascii_case(&course.language) {
                return false;
            }
        }
        match self.query.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => course.matches_query(query),
            _ => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Catalog {
    courses: Vec<Course>,
}

impl Catalog {
    /// Build a catalog from explicit courses, checking its invariants.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` on duplicate ids or malformed quiz questions.
    pub fn new(courses: Vec<Course>) -> Result<Self, CatalogError> {
        let catalog = Self { courses };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The three pilot courses.
    #[must_use]
    pub fn pilot() -> Self {
        Self {
            courses: pilot_courses(),
        }
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    #[must_use]
    pub fn get(&self, id: &CourseId) -> Option<&Course> {
        self.courses.iter().find(|course| &course.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &CourseId) -> bool {
        self.get(id).is_some()
    }

    /// Courses matching `filter`, in catalog order.
    #[must_use]
    pub fn filter(&self, filter: &CourseFilter) -> Vec<&Course> {
        self.courses
            .iter()
            .filter(|course| filter.matches(course))
            .collect()
    }

    /// Check id uniqueness and that every answer index points at a choice.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for course in &self.courses {
            if !seen.insert(&course.id) {
                return Err(CatalogError::DuplicateCourse(course.id.clone()));
            }
            for (index, question) in course.quiz.questions.iter().enumerate() {
                if question.choices.is_empty() {
                    return Err(CatalogError::EmptyChoices {
                        course: course.id.clone(),
                        question: index,
                    });
                }
                if !question.is_well_formed() {
                    return Err(CatalogError::AnswerOutOfRange {
                        course: course.id.clone(),
                        question: index,
                    });
                }
            }
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::pilot()
    }
}

fn lesson(id: &str, title: &str, length: &str) -> Lesson {
    Lesson {
        id: id.into(),
        title: title.into(),
        length: length.into(),
    }
}

fn question(prompt: &str, choices: [&str; 3], answer: usize) -> Question {
    Question {
        prompt: prompt.into(),
        choices: choices.iter().map(|choice| (*choice).to_string()).collect(),
        answer,
    }
}

fn worksheet(id: &str, title: &str, instructions: &str) -> Worksheet {
    Worksheet {
        id: id.into(),
        title: title.into(),
        instructions: instructions.into(),
    }
}

#[allow(clippy::too_many_lines)]
fn pilot_courses() -> Vec<Course> {
    vec![
        Course {
            id: CourseId::new("m1"),
            title: "Budgeting & Cashflow".into(),
            level: Level::Beginner,
            language: "en".into(),
            duration: "2 weeks".into(),
            summary: "Create a realistic monthly budget, set financial goals and build an emergency fund."
                .into(),
            lessons: vec![
                lesson("m1-l1", "Why budgets matter", "6:12"),
                lesson("m1-l2", "Zero-based budgeting", "7:05"),
                lesson("m1-l3", "Cutting expenses without pain", "5:30"),
                lesson("m1-l4", "Emergency funds and priorities", "6:40"),
            ],
            quiz: Quiz {
                questions: vec![
                    question(
                        "What is a zero-based budget?",
                        ["Every rand assigned a purpose", "Spend everything", "Only track income"],
                        0,
                    ),
                    question(
                        "Recommended emergency fund length",
                        ["1 week", "3 months", "2 years"],
                        1,
                    ),
                ],
            },
            worksheet: worksheet(
                "m1-w1",
                "One-page budget plan",
                "Map your monthly income and list fixed vs variable expenses. Identify 3 expense cuts.",
            ),
        },
        Course {
            id: CourseId::new("m2"),
            title: "Credit & Debt Management".into(),
            level: Level::Beginner,
            language: "en".into(),
            duration: "2 weeks".into(),
            summary: "Understand credit scores, loan types and practical strategies to reduce debt costs."
                .into(),
            lessons: vec![
                lesson("m2-l1", "How credit works", "6:00"),
                lesson("m2-l2", "Managing loan repayments", "7:20"),
                lesson("m2-l3", "Negotiating with lenders", "5:50"),
            ],
            quiz: Quiz {
                questions: vec![
                    question(
                        "Which factor affects your credit score most?",
                        ["Payment history", "Age", "Favourite bank"],
                        0,
                    ),
                    question(
                        "A good first step to reduce debt",
                        ["Ignore it", "Make a repayment plan", "Take another loan"],
                        1,
                    ),
                ],
            },
            worksheet: worksheet(
                "m2-w1",
                "Debt reduction plan",
                "List debts, interest rates and propose a monthly repayment plan to reduce interest costs.",
            ),
        },
        Course {
            id: CourseId::new("m3"),
            title: "Savings & Basic Investing".into(),
            level: Level::Beginner,
            language: "en".into(),
            duration: "2 weeks".into(),
            summary: "Short-term saving strategies and an introduction to unit trusts and ETFs in South Africa."
                .into(),
            lessons: vec![
                lesson("m3-l1", "Why save first", "5:40"),
                lesson("m3-l2", "Intro to unit trusts and ETFs", "8:10"),
                lesson("m3-l3", "Simple savings plans", "6:00"),
            ],
            quiz: Quiz {
                questions: vec![
                    question(
                        "What is diversification?",
                        [
                            "Putting all money in one stock",
                            "Spreading risk across assets",
                            "Saving under a mattress",
                        ],
                        1,
                    ),
                    question(
                        "ETFs are",
                        ["A type of bank account", "Exchange traded funds", "Insurance"],
                        1,
                    ),
                ],
            },
            worksheet: worksheet(
                "m3-w1",
                "Savings plan",
                "Set a short-term and medium-term savings goal and a monthly contribution plan.",
            ),
        },
    ]
}
