mod telemetry;
mod terminal;

use std::fmt;
use std::io;

use quiz_core::model::StudyProfile;
use quiz_core::scoring::TokenOverlapScorer;
use services::{AppServices, Clock, Navigation, RoundError};
use tracing::info;

use crate::terminal::{Reply, Terminal};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- study   [--db <sqlite_url>]");
    eprintln!("  cargo run -p app -- plan    [--db <sqlite_url>]");
    eprintln!(
        "  cargo run -p app -- onboard --course <name> --goal <goal> --concept <c> [--concept <c>...] [--institution <name>] [--db <sqlite_url>]"
    );
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite://quiz.sqlite3");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_ROUND_SIZE");
    eprintln!("  QUIZ_CONTENT_BASE_URL, QUIZ_CONTENT_API_KEY, QUIZ_CONTENT_TIMEOUT_SECS");
    eprintln!("  QUIZ_LOG, QUIZ_LOG_FORMAT");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Study,
    Plan,
    Onboard,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "study" => Some(Self::Study),
            "plan" => Some(Self::Plan),
            "onboard" => Some(Self::Onboard),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct OnboardArgs {
    institution: Option<String>,
    course: Option<String>,
    goal: Option<String>,
    concepts: Vec<String>,
}

struct Args {
    db_url: String,
    onboard: OnboardArgs,
}

impl Args {
    fn parse(cmd: Command, args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("QUIZ_DB_URL")
            .ok()
            .map_or_else(|| "sqlite://quiz.sqlite3".into(), normalize_sqlite_url);
        let mut onboard = OnboardArgs::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--course" if cmd == Command::Onboard => {
                    onboard.course = Some(require_value(args, "--course")?);
                }
                "--goal" if cmd == Command::Onboard => {
                    onboard.goal = Some(require_value(args, "--goal")?);
                }
                "--concept" if cmd == Command::Onboard => {
                    onboard.concepts.push(require_value(args, "--concept")?);
                }
                "--institution" if cmd == Command::Onboard => {
                    onboard.institution = Some(require_value(args, "--institution")?);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        if cmd == Command::Onboard {
            if onboard.course.is_none() {
                return Err(ArgsError::MissingFlag { flag: "--course" });
            }
            if onboard.goal.is_none() {
                return Err(ArgsError::MissingFlag { flag: "--goal" });
            }
            if onboard.concepts.is_empty() {
                return Err(ArgsError::MissingFlag { flag: "--concept" });
            }
        }

        Ok(Self { db_url, onboard })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
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

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    // No subcommand means "study".
    let (cmd, rest) = match argv.first().map(String::as_str) {
        None => (Command::Study, argv.as_slice()),
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => (Command::Study, argv.as_slice()),
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                eprintln!("unknown subcommand: {first}");
                print_usage();
                io::Error::new(io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            (cmd, &argv[1..])
        }
    };

    let mut iter = rest.iter().cloned();
    let parsed = Args::parse(cmd, &mut iter).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite in the binary glue so services stay storage-agnostic.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    info!(db = %parsed.db_url, command = ?cmd, "storage ready");

    let stdin = io::stdin();
    let mut term = Terminal::new(stdin.lock(), io::stdout());

    match cmd {
        Command::Onboard => {
            let OnboardArgs {
                institution,
                course,
                goal,
                concepts,
            } = parsed.onboard;
            let profile = StudyProfile::new(
                institution,
                course.unwrap_or_default(),
                goal.unwrap_or_default(),
                concepts,
            )?;
            services.plan().onboard(&profile).await?;
            show_plan(&services, &mut term).await
        }
        Command::Plan => show_plan(&services, &mut term).await,
        Command::Study => study(&services, &mut term).await,
    }
}

async fn show_plan<R: io::BufRead, W: io::Write>(
    services: &AppServices,
    term: &mut Terminal<R, W>,
) -> Result<(), Box<dyn std::error::Error>> {
    match services.plan().plan_view().await? {
        Some(plan) => term.show_plan(&plan)?,
        None => term.say("No study plan yet. Run `onboard` to create one.")?,
    }
    Ok(())
}

async fn study<R: io::BufRead, W: io::Write>(
    services: &AppServices,
    term: &mut Terminal<R, W>,
) -> Result<(), Box<dyn std::error::Error>> {
    let rounds = services.rounds();
    let mut bank = services.load_bank().await?;
    let mut session = match rounds.start_round(&mut bank).await {
        Ok(session) => session,
        Err(RoundError::PoolExhausted) => {
            term.say("Every question is mastered. Nothing left to study.")?;
            return show_plan(services, term).await;
        }
        Err(err) => return Err(err.into()),
    };
    term.say(&format!(
        "Round {}: {} questions",
        session.round_number(),
        session.selected().len()
    ))?;

    let scorer = TokenOverlapScorer::default();
    loop {
        if !session.try_begin_advance() {
            break;
        }
        let Some(shown) = rounds.next_question(&mut session, &mut bank).await? else {
            break;
        };
        let outcome = match term.ask(&shown, &session, &bank, &scorer)? {
            Reply::Answered(outcome) => outcome,
            Reply::Quit => {
                term.say("Progress saved.")?;
                return Ok(());
            }
        };
        let result = rounds
            .record_answer(&mut session, &mut bank, shown.id, outcome)
            .await?;
        term.feedback(&shown, &result)?;
        session.finish_advance();
        if result.navigation == Navigation::PlanView {
            break;
        }
    }

    show_plan(services, term).await
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
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
    telemetry::init_tracing();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
