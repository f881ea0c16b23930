use std::fmt;
use std::sync::Arc;

use quiz_core::SessionSettings;
use quiz_core::model::UserEmail;
use services::{AppServices, Clock, HttpMediaGateway, MediaGateway, SessionParams};
use storage::sqlite::{ensure_database_file, normalize_sqlite_url};

mod play;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUser { raw: String },
    InvalidNumber { name: &'static str, raw: String },
    ConflictingModes,
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUser { raw } => write!(f, "invalid user email: {raw}"),
            ArgsError::InvalidNumber { name, raw } => write!(f, "invalid {name} value: {raw}"),
            ArgsError::ConflictingModes => {
                write!(f, "--exam, --category and --bookmarks are mutually exclusive")
            }
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
    eprintln!("  quiz play     [--db <sqlite_url>] [--user <email>] [mode] [--json]");
    eprintln!("  quiz history  [--db <sqlite_url>] [--user <email>] [--limit <n>]");
    eprintln!("  quiz progress [--db <sqlite_url>] [--user <email>]");
    eprintln!();
    eprintln!("Modes for play (default: free quiz over the whole catalog):");
    eprintln!("  --exam <groups>      exam over comma-separated groups, e.g. GW,B");
    eprintln!("  --category <key>     review one category, e.g. \"GW 2.2\"");
    eprintln!("  --bookmarks          review bookmarked questions");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db sqlite:quiz.sqlite3");
    eprintln!("  --user learner@localhost");
    eprintln!("  --limit 10");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_DB_URL, QUIZ_USER, QUIZ_EXAM_TARGET, QUIZ_EXAM_SECONDS,");
    eprintln!("  QUIZ_REVEAL_ALL, QUIZ_MEDIA_BASE_URL, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Play,
    History,
    Progress,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "play" => Some(Self::Play),
            "history" => Some(Self::History),
            "progress" => Some(Self::Progress),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    FreeQuiz,
    Exam(Vec<String>),
    Category(String),
    Bookmarks,
}

#[derive(Debug)]
struct Args {
    db_url: String,
    user: UserEmail,
    mode: Mode,
    json: bool,
    limit: u32,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("QUIZ_DB_URL").unwrap_or_else(|_| "sqlite:quiz.sqlite3".into());
        let mut user_raw =
            std::env::var("QUIZ_USER").unwrap_or_else(|_| "learner@localhost".into());
        let mut mode = Mode::FreeQuiz;
        let mut json = false;
        let mut limit = 10;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => user_raw = require_value(args, "--user")?,
                "--exam" => {
                    let value = require_value(args, "--exam")?;
                    let groups = value
                        .split(',')
                        .map(str::trim)
                        .filter(|g| !g.is_empty())
                        .map(str::to_string)
                        .collect();
                    set_mode(&mut mode, Mode::Exam(groups))?;
                }
                "--category" => {
                    let value = require_value(args, "--category")?;
                    set_mode(&mut mode, Mode::Category(value))?;
                }
                "--bookmarks" => set_mode(&mut mode, Mode::Bookmarks)?,
                "--json" => json = true,
                "--limit" => {
                    let value = require_value(args, "--limit")?;
                    limit = value.parse().map_err(|_| ArgsError::InvalidNumber {
                        name: "--limit",
                        raw: value.clone(),
                    })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        let user = UserEmail::new(user_raw.as_str())
            .map_err(|_| ArgsError::InvalidUser { raw: user_raw })?;
        Ok(Self {
            db_url: normalize_sqlite_url(&db_url),
            user,
            mode,
            json,
            limit,
        })
    }
}

fn set_mode(current: &mut Mode, next: Mode) -> Result<(), ArgsError> {
    if *current != Mode::FreeQuiz {
        return Err(ArgsError::ConflictingModes);
    }
    *current = next;
    Ok(())
}

fn env_number<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ArgsError> {
    match std::env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ArgsError::InvalidNumber { name, raw }),
        _ => Ok(None),
    }
}

/// Session tunables from the environment, on top of the exam defaults.
fn settings_from_env() -> Result<SessionSettings, Box<dyn std::error::Error>> {
    let defaults = SessionSettings::default();
    let target = env_number::<u32>("QUIZ_EXAM_TARGET")?
        .unwrap_or_else(|| u32::try_from(defaults.exam_target_size()).unwrap_or(30));
    let seconds =
        env_number::<u32>("QUIZ_EXAM_SECONDS")?.unwrap_or_else(|| defaults.exam_duration_secs());
    let reveal = std::env::var("QUIZ_REVEAL_ALL")
        .is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"));
    let tick_ms = u64::try_from(defaults.tick_interval().as_millis()).unwrap_or(1000);
    let debounce_ms = u64::try_from(defaults.prefetch_debounce().as_millis()).unwrap_or(100);

    let settings = SessionSettings::new(target, seconds, tick_ms, debounce_ms, reveal)
        .map_err(quiz_core::Error::from)?;
    Ok(settings)
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Play,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Play,
        Some(first) => Command::from_arg(first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };
    if !argv.is_empty() && !argv[0].starts_with("--") {
        argv.remove(0);
    }

    let parsed = Args::parse(&mut argv.into_iter()).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    let settings = settings_from_env()?;

    ensure_database_file(&parsed.db_url)?;
    let media: Arc<dyn MediaGateway> = Arc::new(HttpMediaGateway::from_env());
    let app =
        AppServices::new_sqlite(&parsed.db_url, Clock::default_clock(), settings, media).await?;
    log::debug!("using database {}", parsed.db_url);

    match cmd {
        Command::Play => {
            let sessions = app.sessions();
            let session = match parsed.mode {
                Mode::FreeQuiz => sessions.start(parsed.user, SessionParams::default()).await,
                Mode::Exam(groups) => {
                    sessions
                        .start(parsed.user, SessionParams::exam(groups))
                        .await
                }
                Mode::Category(key) => {
                    sessions
                        .start(parsed.user, SessionParams::category(key))
                        .await
                }
                Mode::Bookmarks => sessions.start_bookmark_review(parsed.user).await,
            };
            play::run_session(session, parsed.json).await
        }
        Command::History => {
            let items = app
                .session_summaries()
                .list_recent(&parsed.user, parsed.limit)
                .await?;
            if items.is_empty() {
                println!("No finished sessions yet.");
            }
            for item in items {
                let score = item
                    .score_percent
                    .map_or_else(|| "-".to_string(), |p| format!("{p:.2}%"));
                let category = item
                    .category
                    .as_ref()
                    .map_or(String::new(), |c| format!(" {c}"));
                println!(
                    "#{} {} {}{}: {}/{} correct ({score}){}",
                    item.id,
                    item.completed_at.format("%Y-%m-%d %H:%M"),
                    item.kind.as_str(),
                    category,
                    item.correct,
                    item.total,
                    if item.timed_out { ", timed out" } else { "" }
                );
            }
            Ok(())
        }
        Command::Progress => {
            let completion = app.progress().category_completion(&parsed.user).await?;
            for entry in completion {
                println!(
                    "{:<12} {:>4}/{:<4} attempted, {:>4} mastered ({:.2}%)",
                    entry.category.as_str(),
                    entry.attempted,
                    entry.total_questions,
                    entry.mastered,
                    entry.percent()
                );
            }
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    pretty_env_logger::init();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
