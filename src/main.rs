use clap::{Parser, Subcommand};
use secrecy::SecretString;
use tokio::{
    io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin},
    sync::watch,
};

use quizhub_client::{
    app_state::AppState,
    auth::normalize_access_key,
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{AttemptResult, Quiz},
        dto::{
            request::{RegisterRequest, UpdateProfileRequest},
            response::QuizAccess,
        },
    },
    session::{QuizSession, SelectedOption},
};

#[derive(Parser, Debug)]
#[command(name = "quizhub", version, about = "Browse quizzes and take timed attempts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in; the password is read from stdin
    Login {
        #[arg(long)]
        username: String,
    },
    /// Create an account; the password is read from stdin
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
    },
    Logout,
    /// Show who is logged in
    Whoami,
    Categories,
    /// List quizzes with their top score
    Quizzes {
        #[arg(long)]
        category: Option<i64>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show a quiz, or whether it still needs an access key
    Quiz { id: i64 },
    /// Unlock a private quiz with its 5-character access key
    Unlock { id: i64, key: String },
    /// Resume or start an attempt and answer interactively
    Take {
        id: i64,
        #[arg(long)]
        access_key: Option<String>,
    },
    Leaderboard { id: i64 },
    Profile,
    ProfileUpdate {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Change password; both passwords are read from stdin
    Password,
    /// Past attempt results, newest first
    History,
}

/// Line-oriented stdin shared by password prompts and the attempt loop.
struct Prompt {
    lines: Lines<BufReader<Stdin>>,
}

impl Prompt {
    fn new() -> Self {
        Self {
            lines: BufReader::new(io::stdin()).lines(),
        }
    }

    async fn ask(&mut self, label: &str) -> AppResult<String> {
        let mut stdout = io::stdout();
        stdout.write_all(label.as_bytes()).await?;
        stdout.flush().await?;
        match self.lines.next_line().await? {
            Some(line) => Ok(line.trim().to_string()),
            None => Err(AppError::ValidationError(format!(
                "No input for '{}'",
                label.trim_end_matches([':', ' '])
            ))),
        }
    }

    async fn ask_secret(&mut self, label: &str) -> AppResult<SecretString> {
        Ok(SecretString::from(self.ask(label).await?))
    }
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli.command).await {
        log::error!("{}", e);
        eprintln!("error [{}]: {}", e.error_code(), e);
        std::process::exit(1);
    }
}

async fn run(command: Command) -> AppResult<()> {
    let state = AppState::new(Config::from_env())?;
    let mut prompt = Prompt::new();

    match command {
        Command::Login { username } => {
            let password = prompt.ask_secret("Password: ").await?;
            let claims = state.auth_service.login(&username, &password).await?;
            println!(
                "Logged in as {}",
                claims.username.as_deref().unwrap_or(&username)
            );
        }
        Command::Register {
            username,
            email,
            first_name,
            last_name,
        } => {
            let password = prompt.ask("Password: ").await?;
            let request = RegisterRequest {
                username,
                email,
                password,
                first_name,
                last_name,
            };
            let claims = state.auth_service.register(request).await?;
            println!("Welcome, {}", claims.username.as_deref().unwrap_or(&claims.sub));
        }
        Command::Logout => {
            state.auth_service.logout()?;
            println!("Logged out");
        }
        Command::Whoami => match state.auth_service.current_user()? {
            Some(claims) => println!(
                "{} (id {})",
                claims.username.as_deref().unwrap_or("unknown"),
                claims.sub
            ),
            None => println!("Not logged in (playing as guest)"),
        },
        Command::Categories => {
            for category in state.catalog_service.categories().await? {
                println!("{:>4}  {}", category.id, category.name);
            }
        }
        Command::Quizzes { category, search } => {
            let cards = state
                .catalog_service
                .quiz_cards(category, search.as_deref())
                .await?;
            if cards.is_empty() {
                println!("No quizzes found");
            }
            for card in cards {
                let top = card
                    .top_score
                    .map(|s| format!("top {:.1}", s))
                    .unwrap_or_else(|| "no scores yet".to_string());
                let lock = if card.quiz.is_public { "" } else { " [private]" };
                println!("{:>4}  {}{}  ({})", card.quiz.id, card.quiz.title, lock, top);
            }
        }
        Command::Quiz { id } => {
            let token = state.auth_service.session_token()?;
            match state.access_service.open(id, token.as_ref()).await? {
                QuizAccess::Open(quiz) => print_quiz(&quiz),
                QuizAccess::Locked { quiz_id, title } => println!(
                    "\"{}\" is private. Unlock it with: quizhub unlock {} <KEY>",
                    title, quiz_id
                ),
            }
        }
        Command::Unlock { id, key } => {
            let quiz = state.access_service.unlock(id, &key).await?;
            println!("Unlocked \"{}\"", quiz.title);
        }
        Command::Take { id, access_key } => take(&state, id, access_key, &mut prompt).await?,
        Command::Leaderboard { id } => {
            let token = state.auth_service.session_token()?;
            let view = state.leaderboard_service.for_quiz(id, token.as_ref()).await?;
            if view.entries.is_empty() {
                println!("No results yet");
            }
            for (i, entry) in view.entries.iter().enumerate() {
                let rank = entry.rank.unwrap_or(i as i64 + 1);
                let marker = if view.own_rank == Some(rank) { "  <- you" } else { "" };
                println!("{:>3}. {:<20} {:>6.1}{}", rank, entry.username, entry.best_score, marker);
            }
        }
        Command::Profile => {
            let token = require_token(&state)?;
            let profile = state.profile_service.profile(&token).await?;
            println!("{} <{}>", profile.display_name(), profile.email);
            println!("username: {}", profile.username);
        }
        Command::ProfileUpdate {
            first_name,
            last_name,
            email,
        } => {
            let token = require_token(&state)?;
            let request = UpdateProfileRequest {
                first_name,
                last_name,
                email,
            };
            let profile = state.profile_service.update_profile(&token, request).await?;
            println!("Saved: {} <{}>", profile.display_name(), profile.email);
        }
        Command::Password => {
            let token = require_token(&state)?;
            let current = prompt.ask_secret("Current password: ").await?;
            let new = prompt.ask_secret("New password: ").await?;
            state
                .profile_service
                .change_password(&token, &current, &new)
                .await?;
            println!("Password changed");
        }
        Command::History => {
            let token = require_token(&state)?;
            let history = state.profile_service.history(&token).await?;
            if history.is_empty() {
                println!("No attempts yet");
            }
            for result in history {
                let when = result
                    .completed_at
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {:<30} {}/{} ({:.0}%)",
                    when,
                    result.quiz_title.as_deref().unwrap_or("?"),
                    result.correct_answers,
                    result.total_questions,
                    result.percentage()
                );
            }
        }
    }
    Ok(())
}

fn require_token(state: &AppState) -> AppResult<SecretString> {
    state
        .auth_service
        .session_token()?
        .ok_or_else(|| AppError::Unauthorized("Please log in first".to_string()))
}

const TAKE_HELP: &str = "commands: n(ext) p(rev) g <n> a <option ids...> s(tatus) f(inish) q(uit)";

async fn take(
    state: &AppState,
    quiz_id: i64,
    access_key: Option<String>,
    prompt: &mut Prompt,
) -> AppResult<()> {
    let access_key = match access_key {
        Some(raw) => Some(normalize_access_key(&raw)?),
        None => state.access_service.access_key(quiz_id)?,
    };

    let mut session = state.quiz_session();
    let token = state.auth_service.session_token()?;
    if session.restore(token, quiz_id, access_key.as_deref()).await {
        println!("Resuming your attempt");
    } else {
        let token = state.auth_service.session_token()?;
        session.start(token, quiz_id, access_key.as_deref()).await?;
    }

    if let Some(content) = session.content() {
        println!("{} ({} questions)", content.quiz.title, content.question_count());
    }
    println!("{}", TAKE_HELP);
    print_current(&session);

    let mut timer = session.subscribe_timer();
    if session.is_expired() {
        println!("Time is up");
        return finish(&mut session).await;
    }

    loop {
        tokio::select! {
            line = prompt.lines.next_line() => {
                let Some(line) = line? else {
                    session.cleanup();
                    println!("Progress saved");
                    return Ok(());
                };
                match handle_line(&mut session, line.trim()) {
                    Step::Continue => {}
                    Step::Finish => return finish(&mut session).await,
                    Step::Quit => {
                        session.cleanup();
                        println!("Progress saved, run `quizhub take {}` to resume", quiz_id);
                        return Ok(());
                    }
                }
            }
            _ = wait_for_expiry(&mut timer) => {
                println!("\nTime is up");
                return finish(&mut session).await;
            }
        }
    }
}

enum Step {
    Continue,
    Finish,
    Quit,
}

fn handle_line(session: &mut QuizSession, line: &str) -> Step {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("n") => {
            if session.go_to_next() {
                print_current(session);
            } else {
                println!("This is the last question");
            }
        }
        Some("p") => {
            if session.go_to_previous() {
                print_current(session);
            } else {
                println!("This is the first question");
            }
        }
        Some("g") => {
            // Questions are numbered from 1 on screen.
            let moved = words
                .next()
                .and_then(|n| n.parse::<i64>().ok())
                .map(|n| session.go_to_question(n - 1))
                .unwrap_or(false);
            if moved {
                print_current(session);
            } else {
                println!("No such question");
            }
        }
        Some("a") => {
            let current = session.current_question().map(|q| q.id);
            match current {
                Some(question_id) => {
                    let selected: Vec<SelectedOption> = words
                        .map(|w| match w.parse::<i64>() {
                            Ok(id) => SelectedOption::Id(id),
                            Err(_) => SelectedOption::from(w),
                        })
                        .collect();
                    session.save_answer(question_id, selected);
                    println!("Saved");
                }
                None => println!("No question selected"),
            }
        }
        Some("s") => print_status(session),
        Some("f") => return Step::Finish,
        Some("q") => return Step::Quit,
        _ => println!("{}", TAKE_HELP),
    }
    Step::Continue
}

async fn wait_for_expiry(timer: &mut Option<watch::Receiver<Option<u64>>>) {
    let Some(rx) = timer.as_mut() else {
        return std::future::pending().await;
    };
    loop {
        if *rx.borrow_and_update() == Some(0) {
            return;
        }
        if rx.changed().await.is_err() {
            if *rx.borrow() == Some(0) {
                return;
            }
            // Timer was stopped early.
            return std::future::pending().await;
        }
    }
}

async fn finish(session: &mut QuizSession) -> AppResult<()> {
    match session.finish().await? {
        Some(result) => print_result(&result),
        None => println!("No attempt in progress"),
    }
    Ok(())
}

fn print_quiz(quiz: &Quiz) {
    println!("{}", quiz.title);
    if let Some(description) = &quiz.description {
        println!("{}", description);
    }
    match quiz.time_limit_seconds() {
        Some(limit) => println!("Time limit: {}", format_seconds(limit)),
        None => println!("No time limit"),
    }
    if let Some(count) = quiz.question_count {
        println!("{} questions", count);
    }
}

fn print_current(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        println!("This quiz has no questions");
        return;
    };
    let progress = session.progress();
    println!("\n[{}/{}] {}", progress.current, progress.total, question.text);
    if question.multiple_choice {
        println!("(select all that apply)");
    }
    let chosen: Vec<i64> = session
        .current_answer()
        .map(|a| a.iter().filter_map(SelectedOption::as_id).collect())
        .unwrap_or_default();
    for option in &question.options {
        let mark = if chosen.contains(&option.id) { "x" } else { " " };
        println!("  [{}] {:>5}  {}", mark, option.id, option.text);
    }
}

fn print_status(session: &QuizSession) {
    let progress = session.progress();
    println!(
        "Question {} of {} ({:.0}%), {} answered",
        progress.current,
        progress.total,
        progress.percentage,
        session.answered_count()
    );
    if let Some(left) = session.time_left() {
        println!("Time left: {}", format_seconds(left));
    }
}

fn print_result(result: &AttemptResult) {
    println!(
        "Score: {:.1} ({}/{} correct, {:.0}%)",
        result.score,
        result.correct_answers,
        result.total_questions,
        result.percentage()
    );
    match result.passed {
        Some(true) => println!("Passed"),
        Some(false) => println!("Not passed"),
        None => {}
    }
}

fn format_seconds(total: u64) -> String {
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}
