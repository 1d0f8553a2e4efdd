use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tokio::sync::watch;

use crate::{
    api::{AttemptApi, QuizApi},
    clock::Clock,
    errors::{AppError, AppResult},
    models::domain::{Attempt, AttemptResult, AttemptSession, Question, QuizContent},
    session::{
        answers::{AnswerLedger, SelectedOption},
        navigation::{NavigationState, Progress},
        persistence::AttemptStore,
        timer::{remaining_seconds, CountdownTimer},
    },
    storage::{GuestCookieJar, KeyValueStore},
};

/// Drives one user through a timed quiz attempt.
///
/// Idle until `start` or a successful `restore`; back to idle after a
/// successful `finish` or a failed `restore`. Every answer and navigation
/// change is written through to the key-value store so the attempt can be
/// resumed after a restart. Expiry of the countdown is observable through
/// `time_left`/`is_expired` but never submits the attempt by itself.
pub struct QuizSession {
    attempts: Arc<dyn AttemptApi>,
    quizzes: Arc<dyn QuizApi>,
    store: AttemptStore,
    cookies: GuestCookieJar,
    clock: Clock,
    token: Option<SecretString>,
    session: Option<AttemptSession>,
    content: Option<QuizContent>,
    answers: AnswerLedger,
    navigation: NavigationState,
    timer: Option<CountdownTimer>,
    error: Option<String>,
}

impl QuizSession {
    pub fn new(
        attempts: Arc<dyn AttemptApi>,
        quizzes: Arc<dyn QuizApi>,
        kv: Arc<dyn KeyValueStore>,
        clock: Clock,
        guest_ttl_hours: i64,
    ) -> Self {
        Self {
            attempts,
            quizzes,
            store: AttemptStore::new(kv.clone()),
            cookies: GuestCookieJar::new(kv, clock, guest_ttl_hours),
            clock,
            token: None,
            session: None,
            content: None,
            answers: AnswerLedger::default(),
            navigation: NavigationState::default(),
            timer: None,
            error: None,
        }
    }

    /// Begins a new attempt, discarding any previous local progress.
    ///
    /// On failure the tracker is left idle with `error` set.
    pub async fn start(
        &mut self,
        auth_token: Option<SecretString>,
        quiz_id: i64,
        access_key: Option<&str>,
    ) -> AppResult<()> {
        self.stop_timer();
        self.error = None;

        let token = auth_token.as_ref().map(|t| t.expose_secret());
        let created = self.attempts.create_attempt(token, quiz_id, access_key).await;
        let attempt = match created {
            Ok(attempt) => attempt,
            Err(e) => return Err(self.fail_start("create attempt", e)),
        };

        let session = AttemptSession::from_attempt(&attempt, self.clock.now());
        self.write_through("attempt descriptor", |s| s.save_session(&session));
        self.write_through("answers", |s| s.save_answers(&AnswerLedger::default()));
        self.write_through("question index", |s| s.save_current_index(0));
        if let Some(guest) = attempt.guest_session_id.as_deref() {
            if let Err(e) = self.cookies.set(guest) {
                log::warn!("Failed to store guest session cookie: {}", e);
            }
        }

        let fetched = self.fetch_content(quiz_id, token, access_key).await;
        let content = match fetched {
            Ok(content) => content,
            Err(e) => return Err(self.fail_start("load quiz", e)),
        };

        log::info!(
            "Started attempt {} for quiz {} ({} questions)",
            attempt.id,
            quiz_id,
            content.question_count()
        );
        self.timer = Self::launch_timer(&content, &attempt, &self.clock);
        self.answers = AnswerLedger::default();
        self.navigation = NavigationState::default();
        self.session = Some(session);
        self.content = Some(content);
        self.token = auth_token;
        Ok(())
    }

    /// Resumes the persisted attempt for `quiz_id`.
    ///
    /// Returns `false` without side effects when the stored attempt belongs to
    /// another quiz. Remote failures are not raised: local progress is cleared
    /// and `false` returned. `auth_token` is kept for the eventual `finish`.
    pub async fn restore(
        &mut self,
        auth_token: Option<SecretString>,
        quiz_id: i64,
        access_key: Option<&str>,
    ) -> bool {
        let stored = match self.store.load_session() {
            Ok(Some(stored)) => stored,
            Ok(None) => return false,
            Err(e) => {
                log::warn!("Could not read persisted attempt: {}", e);
                return false;
            }
        };
        if stored.quiz_id != quiz_id {
            log::info!(
                "Persisted attempt {} belongs to quiz {}, not {}",
                stored.id,
                stored.quiz_id,
                quiz_id
            );
            return false;
        }

        self.stop_timer();
        let token_ref = auth_token.as_ref().map(|t| t.expose_secret());

        let fetched = self
            .fetch_attempt_and_content(stored.id, quiz_id, token_ref, access_key)
            .await;
        let (attempt, content) = match fetched {
            Ok(fetched) => fetched,
            Err(e) => {
                log::warn!("Could not restore attempt {}: {}", stored.id, e);
                self.write_through("attempt state", |s| s.clear_all());
                self.reset_state();
                return false;
            }
        };

        let answers = self.store.load_answers().unwrap_or_else(|e| {
            log::warn!("Could not read persisted answers: {}", e);
            AnswerLedger::default()
        });
        let index = match self.store.load_current_index() {
            Ok(Some(index)) if index < content.question_count() => index,
            Ok(_) => 0,
            Err(e) => {
                log::warn!("Could not read persisted question index: {}", e);
                0
            }
        };

        log::info!(
            "Restored attempt {} for quiz {} at question {}",
            stored.id,
            quiz_id,
            index + 1
        );
        self.timer = Self::launch_timer(&content, &attempt, &self.clock);
        self.answers = answers;
        self.navigation = NavigationState::at(index);
        self.session = Some(AttemptSession {
            completed_at: attempt.completed_at.or(stored.completed_at),
            guest_session_id: attempt.guest_session_id.clone().or(stored.guest_session_id),
            ..stored
        });
        self.content = Some(content);
        self.token = auth_token;
        self.error = None;
        true
    }

    /// Submits every question's selection and returns the server's result.
    ///
    /// `Ok(None)` when idle. On failure all state is kept so the user can retry.
    pub async fn finish(&mut self) -> AppResult<Option<AttemptResult>> {
        let (Some(session), Some(content)) = (self.session.as_ref(), self.content.as_ref()) else {
            return Ok(None);
        };
        let attempt_id = session.id;
        let payload = self.answers.to_submission(&content.questions);
        let token = self.token.as_ref().map(|t| t.expose_secret());

        let outcome = self.attempts.finish_attempt(token, attempt_id, &payload).await;
        match outcome {
            Ok(result) => {
                log::info!(
                    "Finished attempt {} with {} answered of {}",
                    attempt_id,
                    self.answers.answered_count(),
                    payload.len()
                );
                self.write_through("attempt state", |s| s.clear_all());
                self.reset_state();
                Ok(Some(result))
            }
            Err(e) => Err(self.record_error("finish attempt", e)),
        }
    }

    pub fn go_to_next(&mut self) -> bool {
        let Some(content) = self.content.as_ref() else {
            return false;
        };
        let moved = self.navigation.go_to_next(&content.questions);
        if moved {
            self.persist_index();
        }
        moved
    }

    pub fn go_to_previous(&mut self) -> bool {
        let Some(content) = self.content.as_ref() else {
            return false;
        };
        let moved = self.navigation.go_to_previous(&content.questions);
        if moved {
            self.persist_index();
        }
        moved
    }

    pub fn go_to_question(&mut self, index: i64) -> bool {
        let Some(content) = self.content.as_ref() else {
            return false;
        };
        let moved = self.navigation.go_to_question(index, &content.questions);
        if moved {
            self.persist_index();
        }
        moved
    }

    /// Replaces the selection for `question_id`. Ignored while idle.
    pub fn save_answer(&mut self, question_id: i64, selected: Vec<SelectedOption>) {
        if !self.is_active() {
            log::debug!("Ignoring answer for question {} with no active attempt", question_id);
            return;
        }
        self.answers.save(question_id, selected);
        let answers = self.answers.clone();
        self.write_through("answers", |s| s.save_answers(&answers));
    }

    /// Stops the countdown without touching any other state.
    pub fn cleanup(&mut self) {
        self.stop_timer();
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&AttemptSession> {
        self.session.as_ref()
    }

    pub fn content(&self) -> Option<&QuizContent> {
        self.content.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn answers(&self) -> &AnswerLedger {
        &self.answers
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn current_index(&self) -> usize {
        self.navigation.current_index()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.content
            .as_ref()
            .and_then(|c| c.question_at(self.navigation.current_index()))
    }

    pub fn current_answer(&self) -> Option<&[SelectedOption]> {
        self.current_question().and_then(|q| self.answers.get(q.id))
    }

    pub fn answered_count(&self) -> usize {
        self.answers.answered_count()
    }

    pub fn progress(&self) -> Progress {
        let total = self.content.as_ref().map(|c| c.question_count()).unwrap_or(0);
        self.navigation.progress(total)
    }

    /// `None` when the quiz has no (valid) time limit.
    pub fn time_left(&self) -> Option<u64> {
        self.timer.as_ref().and_then(|t| t.time_left())
    }

    pub fn is_expired(&self) -> bool {
        self.time_left() == Some(0)
    }

    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().map(|t| t.is_running()).unwrap_or(false)
    }

    pub fn subscribe_timer(&self) -> Option<watch::Receiver<Option<u64>>> {
        self.timer.as_ref().map(|t| t.subscribe())
    }

    async fn fetch_content(
        &self,
        quiz_id: i64,
        token: Option<&str>,
        access_key: Option<&str>,
    ) -> AppResult<QuizContent> {
        let quiz = self.quizzes.get_quiz(quiz_id, token, access_key).await?;
        let questions = self.quizzes.get_questions(quiz_id, access_key).await?;
        Ok(QuizContent::new(quiz, questions))
    }

    async fn fetch_attempt_and_content(
        &self,
        attempt_id: i64,
        quiz_id: i64,
        token: Option<&str>,
        access_key: Option<&str>,
    ) -> AppResult<(Attempt, QuizContent)> {
        let attempt = self.attempts.get_attempt(attempt_id, token).await?;
        let content = self.fetch_content(quiz_id, token, access_key).await?;
        Ok((attempt, content))
    }

    fn launch_timer(content: &QuizContent, attempt: &Attempt, clock: &Clock) -> Option<CountdownTimer> {
        let limit = content.time_limit_seconds().filter(|&limit| limit > 0)?;
        let left = remaining_seconds(limit, attempt.completed_at, clock.now());
        log::debug!("Attempt {} has {}s of {}s left", attempt.id, left, limit);
        Some(CountdownTimer::start(left))
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.as_mut() {
            timer.stop();
        }
    }

    fn persist_index(&self) {
        let index = self.navigation.current_index();
        self.write_through("question index", |s| s.save_current_index(index));
    }

    /// Local persistence never fails an interaction; problems are only logged.
    fn write_through<F>(&self, what: &str, write: F)
    where
        F: FnOnce(&AttemptStore) -> AppResult<()>,
    {
        if let Err(e) = write(&self.store) {
            log::warn!("Failed to persist {}: {}", what, e);
        }
    }

    fn record_error(&mut self, action: &str, err: AppError) -> AppError {
        log::error!("Failed to {}: {}", action, err);
        self.error = Some(err.to_string());
        err
    }

    /// The new descriptor may already be persisted, so nothing of the
    /// previous attempt is kept in memory.
    fn fail_start(&mut self, action: &str, err: AppError) -> AppError {
        self.reset_state();
        self.record_error(action, err)
    }

    fn reset_state(&mut self) {
        self.stop_timer();
        self.timer = None;
        self.token = None;
        self.session = None;
        self.content = None;
        self.answers = AnswerLedger::default();
        self.navigation = NavigationState::default();
        self.error = None;
    }
}
