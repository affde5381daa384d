use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use quiz_core::model::{QuizMode, Subject};
use services::{Clock, GraderConfig, QuizLoopService, grader_for};
use storage::JsonQuestionBank;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod terminal;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidSubject { raw: String },
    InvalidPart { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidSubject { raw } => write!(f, "invalid --subject value: {raw}"),
            ArgsError::InvalidPart { raw } => write!(f, "invalid --part value: {raw}"),
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
    eprintln!("  cargo run -p app -- [practice|exam] [--subject <name>] [--part <n>] [--bank-dir <dir>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  practice, --subject philosophy, all parts, --bank-dir banks");
    eprintln!();
    eprintln!("Subjects:");
    for subject in Subject::ALL {
        eprintln!(
            "  {:<15} {} parts",
            subject.as_str(),
            subject.parts().part_count()
        );
    }
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_BANK_DIR, QUIZ_SUBJECT, RUST_LOG");
    eprintln!("  QUIZ_AI_API_KEY, QUIZ_AI_BASE_URL, QUIZ_AI_MODEL  # AI grading");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Practice,
    Exam,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "practice" => Some(Self::Practice),
            "exam" => Some(Self::Exam),
            _ => None,
        }
    }

    fn mode(self) -> QuizMode {
        match self {
            Self::Practice => QuizMode::Practice,
            Self::Exam => QuizMode::Exam,
        }
    }
}

#[derive(Debug)]
struct Args {
    bank_dir: PathBuf,
    subject: Subject,
    /// Zero-based.
    part: Option<usize>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut bank_dir = std::env::var("QUIZ_BANK_DIR")
            .ok()
            .filter(|dir| !dir.trim().is_empty())
            .map_or_else(|| PathBuf::from("banks"), PathBuf::from);
        let mut subject = match std::env::var("QUIZ_SUBJECT") {
            Ok(raw) => parse_subject(raw)?,
            Err(_) => Subject::Philosophy,
        };
        let mut part = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--bank-dir" => {
                    bank_dir = PathBuf::from(require_value(args, "--bank-dir")?);
                }
                "--subject" => {
                    subject = parse_subject(require_value(args, "--subject")?)?;
                }
                "--part" => {
                    let value = require_value(args, "--part")?;
                    // Parts are numbered from 1 on the command line.
                    let parsed = value
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .ok_or(ArgsError::InvalidPart { raw: value })?;
                    part = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            bank_dir,
            subject,
            part,
        })
    }
}

fn parse_subject(raw: String) -> Result<Subject, ArgsError> {
    raw.parse().map_err(|_| ArgsError::InvalidSubject { raw })
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv: Vec<String> = std::env::args().skip(1).collect();

    let cmd = match argv.first().map(String::as_str) {
        None => Command::Practice,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Practice,
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

    let grader_config = GraderConfig::from_env();
    info!(
        bank_dir = %parsed.bank_dir.display(),
        subject = %parsed.subject,
        ai = grader_config.is_some(),
        "starting quiz app"
    );

    let bank = Arc::new(JsonQuestionBank::new(parsed.bank_dir));
    let service = QuizLoopService::new(Clock::default(), bank, grader_for(grader_config));

    terminal::run(service, cmd.mode(), parsed.subject, parsed.part).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_logging();
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
