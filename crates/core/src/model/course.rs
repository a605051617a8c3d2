use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::ids::CourseId;
use crate::model::quiz::QuizResult;

/// Target audience of a course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown level: {0}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Level::Beginner),
            "intermediate" => Ok(Level::Intermediate),
            "advanced" => Ok(Level::Advanced),
            other => Err(ParseLevelError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    /// Video length label, e.g. `6:12`.
    pub length: String,
}

/// Multiple-choice question; `answer` indexes into `choices`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub prompt: String,
    pub choices: Vec<String>,
    pub answer: usize,
}

impl Question {
    #[must_use]
    pub fn is_correct(&self, choice: usize) -> bool {
        choice == self.answer
    }

    /// True when the correct index points at an existing choice.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.answer < self.choices.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

impl Quiz {
    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Grade one attempt. `answers[i]` is the chosen index for question `i`;
    /// unanswered or missing entries count as wrong.
    #[must_use]
    pub fn grade(&self, answers: &[Option<usize>]) -> QuizResult {
        let correct = self
            .questions
            .iter()
            .zip(answers.iter().chain(std::iter::repeat(&None)))
            .filter(|(question, answer)| answer.is_some_and(|choice| question.is_correct(choice)))
            .count();
        QuizResult::from_counts(count_to_u32(correct), count_to_u32(self.questions.len()))
    }
}

fn count_to_u32(count: usize) -> u32 {
    u32::try_from(count).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Worksheet {
    pub id: String,
    pub title: String,
    pub instructions: String,
}

/// A catalog entry. Courses are built once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub level: Level,
    /// Static language tag such as `en`.
    pub language: String,
    /// Duration label such as `2 weeks`.
    pub duration: String,
    pub summary: String,
    pub lessons: Vec<Lesson>,
    pub quiz: Quiz,
    pub worksheet: Worksheet,
}

impl Course {
    /// Case-insensitive substring match on title or summary.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.to_lowercase();
        self.title.to_lowercase().contains(&needle) || self.summary.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answer: usize) -> Question {
        Question {
            prompt: "?".into(),
            choices: vec!["a".into(), "b".into(), "c".into()],
            answer,
        }
    }

    #[test]
    fn grade_counts_matching_answers() {
        let quiz = Quiz {
            questions: vec![question(0), question(1)],
        };
        assert_eq!(quiz.grade(&[Some(0), Some(1)]).score(), 100);
        assert_eq!(quiz.grade(&[Some(0), Some(2)]).score(), 50);
    }

    #[test]
    fn missing_answers_count_as_wrong() {
        let quiz = Quiz {
            questions: vec![question(0), question(1)],
        };
        let result = quiz.grade(&[Some(0)]);
        assert_eq!(result.score(), 50);
        assert!(!result.passed());
        assert_eq!(quiz.grade(&[None, None]).score(), 0);
    }

    #[test]
    fn extra_answers_are_ignored() {
        let quiz = Quiz {
            questions: vec![question(2)],
        };
        assert_eq!(quiz.grade(&[Some(2), Some(0), Some(1)]).score(), 100);
    }

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("Beginner".parse::<Level>().unwrap(), Level::Beginner);
        assert!("expert".parse::<Level>().is_err());
    }

    #[test]
    fn out_of_range_answer_is_not_well_formed() {
        assert!(question(2).is_well_formed());
        assert!(!question(3).is_well_formed());
    }
}
