use std::fmt;

use pilot_core::CourseFilter;
use pilot_core::model::{CourseId, Level};

#[derive(Debug)]
pub enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    InvalidDbUrl { raw: String },
    InvalidLevel { raw: String },
    InvalidAnswer { raw: String },
    InvalidCourse { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown subcommand: {cmd}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::InvalidAnswer { raw } => {
                write!(f, "invalid answer {raw:?} (expected a choice number or -)")
            }
            ArgsError::InvalidCourse { raw } => write!(f, "invalid course id: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

/// Process-wide settings: environment first, flags override.
#[derive(Debug, Clone)]
pub struct Config {
    pub db_url: String,
    pub log_filter: String,
}

impl Config {
    fn from_env() -> Self {
        Self {
            db_url: std::env::var("PILOT_DB_URL")
                .ok()
                .map_or_else(|| "sqlite://pilot.sqlite3".into(), normalize_sqlite_url),
            log_filter: std::env::var("PILOT_LOG").unwrap_or_else(|_| "warn".into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Courses(CourseFilter),
    Course(CourseId),
    Enrol {
        email: String,
        name: Option<String>,
        course: Option<CourseId>,
    },
    Quiz {
        course: CourseId,
        answers: Vec<Option<usize>>,
    },
    Worksheet(CourseId),
    Dashboard,
    Certificate(CourseId),
    Contact {
        name: String,
        email: String,
        message: String,
    },
    SignOut,
    Help,
}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_course(raw: Option<String>) -> Result<CourseId, ArgsError> {
    let raw = raw.ok_or(ArgsError::MissingArgument { what: "course id" })?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidCourse { raw: raw.clone() })
}

/// `all` (any case) or blank means "no constraint".
fn optional_filter(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Split global flags (`--db`, `--log`) from the subcommand and its arguments.
///
/// # Errors
///
/// Returns `ArgsError` for unknown subcommands, missing values, or malformed
/// arguments.
pub fn parse(argv: Vec<String>) -> Result<(Config, Command), ArgsError> {
    let mut config = Config::from_env();
    let mut rest = Vec::with_capacity(argv.len());

    let mut iter = argv.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--db" => {
                let value = require_value(&mut iter, "--db")?;
                if value.trim().is_empty() {
                    return Err(ArgsError::InvalidDbUrl { raw: value });
                }
                config.db_url = normalize_sqlite_url(value);
            }
            "--log" => config.log_filter = require_value(&mut iter, "--log")?,
            _ => rest.push(arg),
        }
    }

    let mut rest = rest.into_iter();
    let command = match rest.next().as_deref() {
        None | Some("--help" | "-h" | "help") => Command::Help,
        Some("courses") => parse_courses(&mut rest)?,
        Some("course") => Command::Course(parse_course(rest.next())?),
        Some("enrol") => parse_enrol(&mut rest)?,
        Some("quiz") => parse_quiz(&mut rest)?,
        Some("worksheet") => Command::Worksheet(parse_course(rest.next())?),
        Some("dashboard") => Command::Dashboard,
        Some("certificate") => Command::Certificate(parse_course(rest.next())?),
        Some("contact") => parse_contact(&mut rest)?,
        Some("sign-out") => Command::SignOut,
        Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
    };

    if let Some(extra) = rest.next() {
        return Err(ArgsError::UnknownArg(extra));
    }
    Ok((config, command))
}

fn parse_courses(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut filter = CourseFilter::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--level" => {
                let value = require_value(args, "--level")?;
                filter.level = match optional_filter(value.clone()) {
                    Some(raw) => Some(
                        raw.parse::<Level>()
                            .map_err(|_| ArgsError::InvalidLevel { raw: value })?,
                    ),
                    None => None,
                };
            }
            "--language" => filter.language = optional_filter(require_value(args, "--language")?),
            "--query" | "-q" => filter.query = optional_filter(require_value(args, "--query")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Courses(filter))
}

fn parse_enrol(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut email = None;
    let mut name = None;
    let mut course = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--email" => email = Some(require_value(args, "--email")?),
            "--name" => name = Some(require_value(args, "--name")?),
            "--course" => course = Some(parse_course(Some(require_value(args, "--course")?))?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    let email = email.ok_or(ArgsError::MissingArgument { what: "--email" })?;
    Ok(Command::Enrol {
        email,
        name,
        course,
    })
}

fn parse_quiz(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let course = parse_course(args.next())?;
    let mut answers = Vec::new();
    for raw in args.by_ref() {
        if raw == "-" {
            answers.push(None);
            continue;
        }
        let choice = raw
            .parse::<usize>()
            .map_err(|_| ArgsError::InvalidAnswer { raw: raw.clone() })?;
        answers.push(Some(choice));
    }
    Ok(Command::Quiz { course, answers })
}

fn parse_contact(args: &mut impl Iterator<Item = String>) -> Result<Command, ArgsError> {
    let mut name = None;
    let mut email = None;
    let mut message = None;
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--name" => name = Some(require_value(args, "--name")?),
            "--email" => email = Some(require_value(args, "--email")?),
            "--message" => message = Some(require_value(args, "--message")?),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }
    Ok(Command::Contact {
        name: name.ok_or(ArgsError::MissingArgument { what: "--name" })?,
        email: email.ok_or(ArgsError::MissingArgument { what: "--email" })?,
        message: message.ok_or(ArgsError::MissingArgument { what: "--message" })?,
    })
}

/// In-memory databases, including named shared-cache ones
/// (`sqlite:file:name?mode=memory&cache=shared`), have no file to create.
pub fn is_memory_url(url: &str) -> bool {
    url.starts_with("sqlite::memory:") || (url.starts_with("sqlite:") && url.contains("mode=memory"))
}

/// Turn a bare or relative database path into an absolute `sqlite://` URL.
///
/// Full URLs (`sqlite://`, `sqlite:file:` and in-memory ones) pass through.
pub fn normalize_sqlite_url(raw: String) -> String {
    if is_memory_url(&raw) || raw.starts_with("sqlite://") || raw.starts_with("sqlite:file:") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  pilot [--db <sqlite_url>] [--log <filter>] <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  courses [--level <level|all>] [--language <tag|all>] [--query <text>]");
    eprintln!("  course <id>");
    eprintln!("  enrol --email <email> [--name <name>] [--course <id>]");
    eprintln!("  quiz <id> <answer>...        answers are choice numbers from 0, or - to skip");
    eprintln!("  worksheet <id>");
    eprintln!("  dashboard");
    eprintln!("  certificate <id>");
    eprintln!("  contact --name <name> --email <email> --message <text>");
    eprintln!("  sign-out");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PILOT_DB_URL (default sqlite://pilot.sqlite3), PILOT_LOG (default warn)");
}
