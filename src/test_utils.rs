#[cfg(test)]
pub mod fixtures {
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::{DateTime, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    use crate::{
        api::{AttemptApi, QuizApi, UserApi},
        auth::Claims,
        clock::Clock,
        errors::{AppError, AppResult},
        models::{
            domain::{
                AnswerSubmission, Attempt, AttemptResult, Category, LeaderboardEntry, Question,
                QuestionOption, Quiz, UserProfile,
            },
            dto::{
                request::{
                    ChangePasswordRequest, LoginRequest, RegisterRequest, UpdateProfileRequest,
                },
                response::AuthResponse,
            },
        },
    };

    /// Fixed instant every time-sensitive test is measured from
    pub fn fixed_now() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    pub fn fixed_clock() -> Clock {
        Clock::fixed(fixed_now())
    }

    /// Creates `count` single-choice questions with ids 101, 102, ... and three
    /// options each (ids `question_id * 10 + 1..=3`)
    pub fn sample_questions(count: usize) -> Vec<Question> {
        (0..count as i64)
            .map(|i| {
                let id = 101 + i;
                Question {
                    id,
                    text: format!("Question {}", i + 1),
                    options: (1..=3)
                        .map(|o| QuestionOption {
                            id: id * 10 + o,
                            text: format!("Option {}", o),
                        })
                        .collect(),
                    multiple_choice: false,
                }
            })
            .collect()
    }

    pub fn sample_quiz(id: i64, time_limit: Option<&str>) -> Quiz {
        Quiz {
            id,
            title: format!("Quiz {}", id),
            description: None,
            category_id: Some(1),
            author_id: Some(1),
            is_public: true,
            time_limit: time_limit.map(|t| t.to_string()),
            question_count: None,
            created_at: None,
        }
    }

    pub fn sample_profile(id: i64, username: &str) -> UserProfile {
        UserProfile {
            id,
            username: username.to_string(),
            email: format!("{}@example.com", username),
            first_name: None,
            last_name: None,
            created_at: None,
        }
    }

    pub fn sample_result(attempt_id: i64, quiz_id: i64, completed_at: DateTime<Utc>) -> AttemptResult {
        AttemptResult {
            attempt_id,
            quiz_id,
            quiz_title: Some(format!("Quiz {}", quiz_id)),
            score: 50.0,
            correct_answers: 1,
            total_questions: 2,
            passed: None,
            completed_at: Some(completed_at),
            answers: vec![],
        }
    }

    pub fn leaderboard_entry(username: &str, user_id: Option<i64>, best_score: f64) -> LeaderboardEntry {
        LeaderboardEntry {
            rank: None,
            user_id,
            username: username.to_string(),
            best_score,
            guest_session_id: None,
            completed_at: None,
        }
    }

    /// Encodes a JWT for `user_id`; the client never checks the signature.
    pub fn signed_token(user_id: i64, exp: Option<i64>) -> String {
        let claims = Claims {
            sub: user_id.to_string(),
            username: Some(format!("user{}", user_id)),
            role: None,
            exp,
            iat: Some(fixed_now().timestamp()),
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[derive(Default)]
    struct BackendState {
        quizzes: HashMap<i64, Quiz>,
        questions: HashMap<i64, Vec<Question>>,
        access_keys: HashMap<i64, String>,
        categories: Vec<Category>,
        leaderboards: HashMap<i64, Vec<LeaderboardEntry>>,
        broken_leaderboards: HashSet<i64>,
        attempts: HashMap<i64, Attempt>,
        next_attempt_id: i64,
        guest_session_id: Option<String>,
        anchor: Option<DateTime<Utc>>,
        fail_questions: Option<AppError>,
        fail_finish: Option<AppError>,
        fail_get_attempt: Option<AppError>,
        finished: Vec<(Option<String>, i64, Vec<AnswerSubmission>)>,
        leaderboard_calls: Vec<(Option<String>, Option<String>)>,
        users: Vec<(UserProfile, String)>,
        token: String,
        history: Vec<AttemptResult>,
        remote_calls: usize,
    }

    /// In-memory stand-in for every remote API trait.
    ///
    /// Private quizzes (registered with `with_access_key`) hand out metadata to
    /// anyone but reject questions and attempts without the right key. One-shot
    /// failures are consumed by the next matching call.
    pub struct FakeBackend {
        state: Mutex<BackendState>,
    }

    impl FakeBackend {
        pub fn new() -> Self {
            Self {
                state: Mutex::new(BackendState {
                    next_attempt_id: 1,
                    ..BackendState::default()
                }),
            }
        }

        /// Backend serving one quiz with `question_count` sample questions
        pub fn with_quiz(quiz_id: i64, question_count: usize, time_limit: Option<&str>) -> Self {
            Self::new().add_quiz(sample_quiz(quiz_id, time_limit), sample_questions(question_count))
        }

        pub fn add_quiz(self, quiz: Quiz, questions: Vec<Question>) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.questions.insert(quiz.id, questions);
                state.quizzes.insert(quiz.id, quiz);
            }
            self
        }

        /// Makes the quiz private, unlocked by `key`
        pub fn with_access_key(self, quiz_id: i64, key: &str) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                if let Some(quiz) = state.quizzes.get_mut(&quiz_id) {
                    quiz.is_public = false;
                }
                state.access_keys.insert(quiz_id, key.to_string());
            }
            self
        }

        pub fn with_guest_session(self, guest_session_id: &str) -> Self {
            self.state.lock().unwrap().guest_session_id = Some(guest_session_id.to_string());
            self
        }

        /// Server-side time anchor reported as `completedAt` on new attempts
        pub fn with_anchor(self, anchor: DateTime<Utc>) -> Self {
            self.state.lock().unwrap().anchor = Some(anchor);
            self
        }

        pub fn with_categories(self, categories: Vec<Category>) -> Self {
            self.state.lock().unwrap().categories = categories;
            self
        }

        pub fn with_leaderboard(self, quiz_id: i64, entries: Vec<LeaderboardEntry>) -> Self {
            self.state.lock().unwrap().leaderboards.insert(quiz_id, entries);
            self
        }

        pub fn with_broken_leaderboard(self, quiz_id: i64) -> Self {
            self.state.lock().unwrap().broken_leaderboards.insert(quiz_id);
            self
        }

        /// Registers a user; `login` with `password` answers with `token`
        pub fn with_user(self, profile: UserProfile, password: &str, token: &str) -> Self {
            {
                let mut state = self.state.lock().unwrap();
                state.users.push((profile, password.to_string()));
                state.token = token.to_string();
            }
            self
        }

        pub fn with_history(self, history: Vec<AttemptResult>) -> Self {
            self.state.lock().unwrap().history = history;
            self
        }

        pub fn fail_questions(&self, err: AppError) {
            self.state.lock().unwrap().fail_questions = Some(err);
        }

        pub fn fail_finish(&self, err: AppError) {
            self.state.lock().unwrap().fail_finish = Some(err);
        }

        pub fn fail_get_attempt(&self, err: AppError) {
            self.state.lock().unwrap().fail_get_attempt = Some(err);
        }

        pub fn last_submission(&self) -> Option<Vec<AnswerSubmission>> {
            let state = self.state.lock().unwrap();
            state.finished.last().map(|(_, _, answers)| answers.clone())
        }

        pub fn last_finish_token(&self) -> Option<String> {
            let state = self.state.lock().unwrap();
            state.finished.last().and_then(|(token, _, _)| token.clone())
        }

        pub fn finish_calls(&self) -> usize {
            self.state.lock().unwrap().finished.len()
        }

        /// `(token, guest_session_id)` of the most recent leaderboard request
        pub fn last_leaderboard_call(&self) -> Option<(Option<String>, Option<String>)> {
            self.state.lock().unwrap().leaderboard_calls.last().cloned()
        }

        pub fn remote_calls(&self) -> usize {
            self.state.lock().unwrap().remote_calls
        }

        fn check_key(state: &BackendState, quiz_id: i64, access_key: Option<&str>) -> AppResult<()> {
            match state.access_keys.get(&quiz_id) {
                Some(expected) if access_key != Some(expected.as_str()) => {
                    Err(AppError::Forbidden("Invalid access key".to_string()))
                }
                _ => Ok(()),
            }
        }

        fn check_token(state: &BackendState, token: &str) -> AppResult<usize> {
            if state.token.is_empty() || token != state.token {
                return Err(AppError::Unauthorized("Invalid token".to_string()));
            }
            // The fake issues one token, always for the first user.
            Ok(0)
        }
    }

    #[async_trait]
    impl QuizApi for FakeBackend {
        async fn list_categories(&self) -> AppResult<Vec<Category>> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            Ok(state.categories.clone())
        }

        async fn list_quizzes(
            &self,
            category_id: Option<i64>,
            search: Option<&str>,
        ) -> AppResult<Vec<Quiz>> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            let needle = search.map(|s| s.to_lowercase());
            let mut quizzes: Vec<Quiz> = state
                .quizzes
                .values()
                .filter(|q| category_id.is_none() || q.category_id == category_id)
                .filter(|q| {
                    needle
                        .as_deref()
                        .map(|n| q.title.to_lowercase().contains(n))
                        .unwrap_or(true)
                })
                .cloned()
                .collect();
            quizzes.sort_by_key(|q| q.id);
            Ok(quizzes)
        }

        async fn get_quiz(
            &self,
            quiz_id: i64,
            _token: Option<&str>,
            _access_key: Option<&str>,
        ) -> AppResult<Quiz> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            state
                .quizzes
                .get(&quiz_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Quiz {} not found", quiz_id)))
        }

        async fn get_questions(
            &self,
            quiz_id: i64,
            access_key: Option<&str>,
        ) -> AppResult<Vec<Question>> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            if let Some(err) = state.fail_questions.take() {
                return Err(err);
            }
            Self::check_key(&state, quiz_id, access_key)?;
            state
                .questions
                .get(&quiz_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Quiz {} not found", quiz_id)))
        }

        async fn get_leaderboard(
            &self,
            quiz_id: i64,
            token: Option<&str>,
            guest_session_id: Option<&str>,
        ) -> AppResult<Vec<LeaderboardEntry>> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            state.leaderboard_calls.push((
                token.map(|t| t.to_string()),
                guest_session_id.map(|g| g.to_string()),
            ));
            if state.broken_leaderboards.contains(&quiz_id) {
                return Err(AppError::Remote {
                    status: 500,
                    message: "Leaderboard unavailable".to_string(),
                });
            }
            Ok(state.leaderboards.get(&quiz_id).cloned().unwrap_or_default())
        }
    }

    #[async_trait]
    impl AttemptApi for FakeBackend {
        async fn create_attempt(
            &self,
            _token: Option<&str>,
            quiz_id: i64,
            access_key: Option<&str>,
        ) -> AppResult<Attempt> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            if !state.quizzes.contains_key(&quiz_id) {
                return Err(AppError::NotFound(format!("Quiz {} not found", quiz_id)));
            }
            Self::check_key(&state, quiz_id, access_key)?;

            let attempt = Attempt {
                id: state.next_attempt_id,
                quiz_id,
                started_at: Some(fixed_now()),
                completed_at: state.anchor,
                guest_session_id: state.guest_session_id.clone(),
            };
            state.next_attempt_id += 1;
            state.attempts.insert(attempt.id, attempt.clone());
            Ok(attempt)
        }

        async fn get_attempt(&self, attempt_id: i64, _token: Option<&str>) -> AppResult<Attempt> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            if let Some(err) = state.fail_get_attempt.take() {
                return Err(err);
            }
            state
                .attempts
                .get(&attempt_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", attempt_id)))
        }

        async fn finish_attempt(
            &self,
            token: Option<&str>,
            attempt_id: i64,
            answers: &[AnswerSubmission],
        ) -> AppResult<AttemptResult> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            if let Some(err) = state.fail_finish.take() {
                return Err(err);
            }
            let attempt = state
                .attempts
                .get(&attempt_id)
                .cloned()
                .ok_or_else(|| AppError::NotFound(format!("Attempt {} not found", attempt_id)))?;
            state
                .finished
                .push((token.map(|t| t.to_string()), attempt_id, answers.to_vec()));

            let answered = answers
                .iter()
                .filter(|a| !a.selected_option_ids.is_empty())
                .count() as i64;
            let total = answers.len() as i64;
            Ok(AttemptResult {
                attempt_id,
                quiz_id: attempt.quiz_id,
                quiz_title: state.quizzes.get(&attempt.quiz_id).map(|q| q.title.clone()),
                score: if total > 0 { 100.0 * answered as f64 / total as f64 } else { 0.0 },
                correct_answers: answered,
                total_questions: total,
                passed: None,
                completed_at: Some(fixed_now()),
                answers: vec![],
            })
        }

        async fn list_my_attempts(&self, token: &str) -> AppResult<Vec<AttemptResult>> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            Self::check_token(&state, token)?;
            Ok(state.history.clone())
        }
    }

    #[async_trait]
    impl UserApi for FakeBackend {
        async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            let user = state
                .users
                .iter()
                .find(|(u, p)| u.username == request.username && *p == request.password)
                .map(|(u, _)| u.clone())
                .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;
            Ok(AuthResponse {
                token: state.token.clone(),
                user: Some(user),
            })
        }

        async fn register(&self, request: &RegisterRequest) -> AppResult<AuthResponse> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            if state.users.iter().any(|(u, _)| u.username == request.username) {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
            let profile = UserProfile {
                id: state.users.len() as i64 + 1,
                username: request.username.clone(),
                email: request.email.clone(),
                first_name: request.first_name.clone(),
                last_name: request.last_name.clone(),
                created_at: Some(fixed_now()),
            };
            state.users.push((profile.clone(), request.password.clone()));
            if state.token.is_empty() {
                state.token = signed_token(profile.id, None);
            }
            Ok(AuthResponse {
                token: state.token.clone(),
                user: Some(profile),
            })
        }

        async fn get_profile(&self, token: &str) -> AppResult<UserProfile> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            let idx = Self::check_token(&state, token)?;
            state
                .users
                .get(idx)
                .map(|(u, _)| u.clone())
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))
        }

        async fn update_profile(
            &self,
            token: &str,
            request: &UpdateProfileRequest,
        ) -> AppResult<UserProfile> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            let idx = Self::check_token(&state, token)?;
            let (user, _) = state
                .users
                .get_mut(idx)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if let Some(first) = &request.first_name {
                user.first_name = Some(first.clone());
            }
            if let Some(last) = &request.last_name {
                user.last_name = Some(last.clone());
            }
            if let Some(email) = &request.email {
                user.email = email.clone();
            }
            Ok(user.clone())
        }

        async fn change_password(
            &self,
            token: &str,
            request: &ChangePasswordRequest,
        ) -> AppResult<()> {
            let mut state = self.state.lock().unwrap();
            state.remote_calls += 1;
            let idx = Self::check_token(&state, token)?;
            let (_, password) = state
                .users
                .get_mut(idx)
                .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
            if *password != request.current_password {
                return Err(AppError::ValidationError(
                    "Current password is incorrect".to_string(),
                ));
            }
            *password = request.new_password.clone();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn test_sample_questions_have_distinct_ids() {
        let questions = sample_questions(3);
        assert_eq!(
            questions.iter().map(|q| q.id).collect::<Vec<_>>(),
            vec![101, 102, 103]
        );
        assert!(questions[1].has_option(1022));
    }

    #[test]
    fn test_signed_token_round_trips_through_decoder() {
        let token = signed_token(42, None);
        let claims = crate::auth::TokenDecoder::new().decode(&token).unwrap();
        assert_eq!(claims.user_id(), Some(42));
    }
}
