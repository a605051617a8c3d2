use std::fmt;

use pilot_core::model::{Email, User};
use storage::Storage;
use tracing_subscriber::EnvFilter;

const DEMO_EMAIL: &str = "pilot@example.com";
const DEMO_NAME: &str = "Pilot Learner";

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    email: String,
    name: String,
    reset: bool,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidEmail { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidEmail { raw } => write!(f, "invalid --email value: {raw:?}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("PILOT_DB_URL").unwrap_or_else(|_| "sqlite:pilot.sqlite3?mode=rwc".into());
        let mut email = DEMO_EMAIL.to_string();
        let mut name = DEMO_NAME.to_string();
        let mut reset = false;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--email" => {
                    let value = require_value(&mut args, "--email")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidEmail { raw: value });
                    }
                    email = value;
                }
                "--name" => name = require_value(&mut args, "--name")?,
                "--reset" => reset = true,
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            email,
            name,
            reset,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>   SQLite URL (default: sqlite:pilot.sqlite3?mode=rwc)");
    eprintln!("  --email <email>     Demo learner email (default: {DEMO_EMAIL})");
    eprintln!("  --name <name>       Demo learner name (default: {DEMO_NAME})");
    eprintln!("  --reset             Clear stored state before seeding");
    eprintln!("  -h, --help          Show this help");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PILOT_DB_URL, RUST_LOG");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let email = Email::parse(&args.email).ok_or_else(|| ArgsError::InvalidEmail {
        raw: args.email.clone(),
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    if args.reset {
        storage.state.clear().await?;
    }

    let mut state = storage.state.load().await;
    if state.user(&email).is_some() {
        println!("{email} already present in {}", args.db_url);
        return Ok(());
    }

    state
        .users
        .insert(email.clone(), User::new(email.clone(), Some(args.name.as_str())));
    if state.current_user.is_none() {
        state.current_user = Some(email.clone());
    }
    storage.state.save(&state).await?;

    println!(
        "Seeded learner {email} ({} learner(s) total) into {}",
        state.users.len(),
        args.db_url
    );
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
