use std::fmt;

use pilot_core::model::{CourseId, Email};
use services::{AppServices, Clock};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod args;
mod render;

use args::{ArgsError, Command, Config};

#[derive(Debug)]
struct CourseNotFound(CourseId);

impl fmt::Display for CourseNotFound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown course: {}", self.0)
    }
}

impl std::error::Error for CourseNotFound {}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    let (config, command) = args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        args::print_usage();
        e
    })?;

    if command == Command::Help {
        args::print_usage();
        return Ok(());
    }

    init_tracing(&config);

    // Open + migrate SQLite here so the library crates never touch the filesystem layout.
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(&config.db_url, Clock::system()).await?;
    let enrolments = services.enrolments();
    debug!(db_url = %config.db_url, ?command, "dispatching");

    match command {
        Command::Help => {}
        Command::Courses(filter) => {
            let catalog = enrolments.catalog();
            print!("{}", render::course_list(&catalog.filter(&filter)));
        }
        Command::Course(course_id) => {
            let catalog = enrolments.catalog();
            let course = catalog
                .get(&course_id)
                .ok_or_else(|| CourseNotFound(course_id.clone()))?;
            print!("{}", render::course_detail(course));
        }
        Command::Enrol {
            email,
            name,
            course,
        } => {
            let user = enrolments
                .join(&email, name.as_deref(), course.as_ref())
                .await?
                .ok_or(ArgsError::MissingArgument { what: "--email" })?;
            println!("Enrolled as {}. Check the dashboard to continue.", user.name);
        }
        Command::Quiz { course, answers } => {
            let result = enrolments.submit_quiz(&course, &answers).await?;
            print!("{}", render::quiz_result(result));
        }
        Command::Worksheet(course_id) => {
            enrolments.submit_worksheet(&course_id).await?;
            println!(
                "Worksheet submitted. If you passed the quiz and submitted the worksheet, \
                 you will be eligible for a certificate."
            );
        }
        Command::Dashboard => {
            let learner = enrolments.current_user().await;
            let rows = enrolments.dashboard().await;
            print!(
                "{}",
                render::dashboard(learner.as_ref().map(|user| user.name.as_str()), &rows)
            );
        }
        Command::Certificate(course_id) => {
            let certificate = services.certificates().issue(&course_id).await?;
            print!("{}", render::certificate(&certificate));
        }
        Command::Contact {
            name,
            email,
            message,
        } => {
            let email = Email::parse(&email).map_or(email, |email| email.to_string());
            services.feedback().submit(&name, &email, &message).await?;
            println!("Thanks for your message. We'll review it as part of the pilot.");
        }
        Command::SignOut => {
            enrolments.sign_out().await?;
            println!("Signed out.");
        }
    }

    Ok(())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if args::is_memory_url(db_url) {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .or_else(|| db_url.strip_prefix("sqlite:file:"))
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_urls_need_no_file() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("sqlite:file:pilot_prepare?mode=memory&cache=shared").is_ok());
        assert!(!std::path::Path::new("pilot_prepare").exists());
    }

    #[test]
    fn file_url_creates_missing_database() {
        let dir = std::env::temp_dir().join(format!("pilot-prepare-{}", std::process::id()));
        let path = dir.join("nested").join("pilot.sqlite3");
        let _ = std::fs::remove_dir_all(&dir);

        prepare_sqlite_file(&format!("sqlite:file:{}", path.display())).unwrap();
        assert!(path.exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn non_sqlite_url_is_rejected() {
        assert!(prepare_sqlite_file("postgres://localhost/pilot").is_err());
    }
}
