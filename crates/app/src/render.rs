//! Plain-text rendering of catalog, dashboard and certificate views.

use std::fmt::Write as _;

use pilot_core::model::{Certificate, Course, QuizResult};
use services::DashboardEntry;

pub fn course_list(courses: &[&Course]) -> String {
    if courses.is_empty() {
        return "No courses match the current filters.\n".to_string();
    }
    let mut out = String::new();
    for course in courses {
        let _ = writeln!(out, "[{}] {}", course.id, course.title);
        let _ = writeln!(out, "    {}", course.summary);
        let _ = writeln!(
            out,
            "    Duration {} • Level {} • Language {}",
            course.duration, course.level, course.language
        );
    }
    out
}

pub fn course_detail(course: &Course) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", course.title);
    let _ = writeln!(out, "{}", course.summary);
    let _ = writeln!(out, "\nLessons");
    for lesson in &course.lessons {
        let _ = writeln!(out, "  - {} ({})", lesson.title, lesson.length);
    }
    let _ = writeln!(out, "\nWorksheet");
    let _ = writeln!(
        out,
        "  {} — {}",
        course.worksheet.title, course.worksheet.instructions
    );
    let _ = writeln!(out, "\nQuiz");
    for (index, question) in course.quiz.questions.iter().enumerate() {
        let _ = writeln!(out, "  {}. {}", index + 1, question.prompt);
        for (choice, text) in question.choices.iter().enumerate() {
            let _ = writeln!(out, "     {choice}) {text}");
        }
    }
    out
}

pub fn quiz_result(result: QuizResult) -> String {
    let verdict = if result.passed() {
        "Well done — you passed the quiz."
    } else {
        "You did not pass. Review the lessons and try again."
    };
    format!("Score: {}%\n{verdict}\n", result.score())
}

pub fn dashboard(learner: Option<&str>, rows: &[DashboardEntry]) -> String {
    let Some(learner) = learner else {
        return "You are not signed in. Enrol in a course to create a learner profile.\n"
            .to_string();
    };
    if rows.is_empty() {
        return format!(
            "{learner}: no enrolments yet. Browse courses and enrol to start learning.\n"
        );
    }

    let mut out = format!("Dashboard for {learner}\n");
    for row in rows {
        let enrolment = &row.enrolment;
        let _ = writeln!(out, "\n[{}] {}", row.course_id, row.course_title);
        let _ = writeln!(out, "    {}", progress_bar(enrolment.progress()));
        let _ = writeln!(
            out,
            "    Progress: {}% • Quiz: {} • Worksheet: {}",
            enrolment.progress(),
            if enrolment.quiz_passed() { "Passed" } else { "Not passed" },
            if enrolment.worksheet_submitted() {
                "Submitted"
            } else {
                "Not submitted"
            },
        );
        if row.certificate_eligible() {
            let _ = writeln!(out, "    Certificate available: run `pilot certificate {}`", row.course_id);
        }
    }
    out
}

fn progress_bar(progress: u32) -> String {
    let filled = usize::try_from(progress.min(100) / 5).unwrap_or(20);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(20 - filled))
}

pub fn certificate(certificate: &Certificate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "==============================================");
    let _ = writeln!(out, "          Certificate of Completion");
    let _ = writeln!(out, "==============================================");
    let _ = writeln!(out, "This certifies that");
    let _ = writeln!(out, "    {}", certificate.learner_name);
    let _ = writeln!(out, "has completed the course");
    let _ = writeln!(out, "    {}", certificate.course_title);
    let _ = writeln!(out, "Date: {}", certificate.issued_on.format("%Y-%m-%d"));
    let _ = writeln!(out, "{}", certificate.issuer);
    out
}
