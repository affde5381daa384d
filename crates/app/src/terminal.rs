//! Line-oriented terminal driver over an `ActiveQuiz`.

use std::error::Error;

use quiz_core::model::{Analysis, QuizMode, Subject};
use services::{
    ActiveQuiz, ExamTimer, GradingError, QuizLoopService, QuizView, RestartOutcome, ResultsView,
    format_elapsed,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::task::{JoinError, JoinHandle};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
    /// Zero-based option index.
    Select(usize),
    Check,
    Next,
    Previous,
    Finish,
    Restart,
    Switch(Subject),
    Quit,
}

fn parse_input(line: &str) -> Option<Input> {
    let line = line.trim();
    if let Ok(n) = line.parse::<usize>() {
        return n.checked_sub(1).map(Input::Select);
    }
    let (head, rest) = line.split_once(' ').unwrap_or((line, ""));
    match head {
        "c" => Some(Input::Check),
        "n" => Some(Input::Next),
        "p" => Some(Input::Previous),
        "f" => Some(Input::Finish),
        "r" => Some(Input::Restart),
        "s" => rest.parse().ok().map(Input::Switch),
        "q" => Some(Input::Quit),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuChoice {
    Start(QuizMode),
    Quit,
}

fn parse_menu(line: &str) -> Option<MenuChoice> {
    match line.trim() {
        "p" | "practice" => Some(MenuChoice::Start(QuizMode::Practice)),
        "e" | "exam" => Some(MenuChoice::Start(QuizMode::Exam)),
        "q" => Some(MenuChoice::Quit),
        _ => None,
    }
}

type GradingTask = JoinHandle<Result<Option<Analysis>, GradingError>>;

struct Screen {
    quiz: ActiveQuiz,
    timer: Option<ExamTimer>,
    /// Grader call running in the background; input stays live meanwhile.
    grading: Option<GradingTask>,
}

impl Screen {
    fn new(quiz: ActiveQuiz) -> Self {
        let timer = quiz
            .mode()
            .is_exam()
            .then(|| ExamTimer::spawn(quiz.clone(), services::Clock::default()));
        Self {
            quiz,
            timer,
            grading: None,
        }
    }

    fn check(&mut self) {
        if self.grading.is_some() {
            println!("Still checking the previous answer.");
            return;
        }
        let quiz = self.quiz.clone();
        self.grading = Some(tokio::spawn(async move { quiz.request_grading().await }));
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        if let Some(task) = &self.grading {
            task.abort();
        }
    }
}

enum Event {
    Line(Option<String>),
    Graded(Result<Result<Option<Analysis>, GradingError>, JoinError>),
}

pub(crate) async fn run(
    service: QuizLoopService,
    mode: QuizMode,
    subject: Subject,
    part: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let quiz = service.start(mode, subject, part).await?;
    let lines = BufReader::new(tokio::io::stdin()).lines();
    drive(&service, quiz, lines).await?;
    Ok(())
}

/// Runs the intent loop until quit or end of input and returns the last quiz.
async fn drive<R>(
    service: &QuizLoopService,
    quiz: ActiveQuiz,
    mut lines: Lines<R>,
) -> Result<ActiveQuiz, Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut screen = Screen::new(quiz);

    loop {
        if screen.quiz.is_finished() {
            if let Some(results) = screen.quiz.results() {
                print_results(&results);
            }
            let Some(mode) = read_menu(&mut lines).await? else {
                return Ok(screen.quiz.clone());
            };
            match service.start(mode, screen.quiz.subject(), None).await {
                Ok(quiz) => screen = Screen::new(quiz),
                Err(err) => {
                    eprintln!("could not start quiz: {err}");
                    return Ok(screen.quiz.clone());
                }
            }
            continue;
        }

        print_question(&screen.quiz.view(), screen.timer.as_ref());
        let event = match screen.grading.as_mut() {
            Some(task) => tokio::select! {
                outcome = task => Event::Graded(outcome),
                line = lines.next_line() => Event::Line(line?),
            },
            None => Event::Line(lines.next_line().await?),
        };
        let line = match event {
            Event::Graded(outcome) => {
                screen.grading = None;
                report_grading(outcome);
                continue;
            }
            Event::Line(None) => return Ok(screen.quiz.clone()),
            Event::Line(Some(line)) => line,
        };
        let Some(input) = parse_input(&line) else {
            print_help();
            continue;
        };

        match input {
            Input::Select(option) => {
                if !screen.quiz.select_option(option) {
                    println!("Selection not accepted.");
                }
            }
            Input::Check => screen.check(),
            Input::Next => {
                screen.quiz.next();
            }
            Input::Previous => {
                screen.quiz.previous();
            }
            Input::Finish => {
                screen.quiz.finish();
            }
            Input::Restart => {
                let subject = screen.quiz.subject();
                restart(service, &mut screen, subject).await;
            }
            Input::Switch(subject) => restart(service, &mut screen, subject).await,
            Input::Quit => return Ok(screen.quiz.clone()),
        }
    }
}

fn report_grading(outcome: Result<Result<Option<Analysis>, GradingError>, JoinError>) {
    match outcome {
        Ok(Ok(Some(_))) => {}
        Ok(Ok(None)) => println!("No verdict for the current question."),
        Ok(Err(err)) => println!("Grading failed ({err}). Try again."),
        Err(err) => warn!(error = %err, "grading task ended abnormally"),
    }
}

async fn restart(service: &QuizLoopService, screen: &mut Screen, subject: Subject) {
    match service.restart(&screen.quiz, subject, None).await {
        Ok(RestartOutcome::Restarted(quiz)) => *screen = Screen::new(quiz),
        Ok(RestartOutcome::ReturnToMenu) => {}
        Err(err) => {
            warn!(%subject, error = %err, "restart failed");
            println!("Could not load {}: {err}", subject.display_name());
        }
    }
}

async fn read_menu<R>(lines: &mut Lines<R>) -> Result<Option<QuizMode>, std::io::Error>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        println!("Start [p]ractice, [e]xam, or [q]uit?");
        let Some(line) = lines.next_line().await? else {
            return Ok(None);
        };
        match parse_menu(&line) {
            Some(MenuChoice::Start(mode)) => return Ok(Some(mode)),
            Some(MenuChoice::Quit) => return Ok(None),
            None => {}
        }
    }
}

fn print_help() {
    println!("Commands: <number> select, c check, n next, p previous, f finish,");
    println!("          r restart, s <subject> switch subject, q quit");
}

fn print_question(view: &QuizView, timer: Option<&ExamTimer>) {
    println!();
    if view.is_empty() {
        println!("No questions available for {}. Press f to finish.", view.subject.display_name());
        return;
    }

    let mut header = format!(
        "{} | {} | {}/{} ({}%)",
        view.subject.display_name(),
        view.mode,
        view.position + 1,
        view.total,
        view.progress_percent
    );
    if let Some(timer) = timer {
        header.push_str(&format!(" | {}", format_elapsed(timer.elapsed())));
    }
    if let Some(stats) = view.practice_stats {
        header.push_str(&format!(
            " | ok {} / wrong {} / left {}",
            stats.correct, stats.incorrect, stats.remaining
        ));
    }
    println!("{header}");
    if let Some((step, total)) = view.review_step() {
        println!("Reviewing mistake {step} of {total}");
    }

    println!("{}", view.text);
    for (i, option) in view.options.iter().enumerate() {
        let marker = if view.selected == Some(i) { '*' } else { ' ' };
        println!(" {marker} {}) {option}", i + 1);
    }

    if let Some(analysis) = &view.analysis {
        let verdict = if view.selected == Some(analysis.correct_option) {
            "Correct"
        } else {
            "Incorrect"
        };
        println!(
            "{verdict}. Answer: {}. {}",
            analysis.correct_option + 1,
            analysis.explanation
        );
    }

    if view.can_advance {
        println!("[n] {}", view.next_action.label());
    } else if view.mode == QuizMode::Practice {
        println!("Check your answer to proceed.");
    }
}

fn print_results(results: &ResultsView) {
    println!();
    match results.mode {
        QuizMode::Exam => println!("Exam completed: {}", results.subject.display_name()),
        QuizMode::Practice => println!("Quiz completed: {}", results.subject.display_name()),
    }
    if let Some(score) = results.score {
        println!("Score: {score}/100");
    }
    if let (Some(correct), Some(incorrect)) = (results.correct, results.incorrect) {
        println!("Correct: {correct}  Incorrect: {incorrect}");
    } else {
        println!("Answered: {}  Skipped: {}", results.answered, results.skipped);
    }
    if let Some(duration) = results.duration_label() {
        println!("Time: {duration}");
    }
}
