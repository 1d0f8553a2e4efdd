use std::sync::Arc;

use futures::future::join_all;

use crate::{
    api::QuizApi,
    errors::AppResult,
    models::{
        domain::{Category, Quiz},
        dto::response::QuizCard,
    },
};

pub struct CatalogService {
    quizzes: Arc<dyn QuizApi>,
}

impl CatalogService {
    pub fn new(quizzes: Arc<dyn QuizApi>) -> Self {
        Self { quizzes }
    }

    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        self.quizzes.list_categories().await
    }

    pub async fn quizzes(&self, category_id: Option<i64>, search: Option<&str>) -> AppResult<Vec<Quiz>> {
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.quizzes.list_quizzes(category_id, search).await
    }

    /// Quizzes with their leaderboard top score, fetched concurrently.
    ///
    /// A leaderboard that cannot be loaded leaves the card without a score.
    pub async fn quiz_cards(
        &self,
        category_id: Option<i64>,
        search: Option<&str>,
    ) -> AppResult<Vec<QuizCard>> {
        let quizzes = self.quizzes(category_id, search).await?;
        let scores = join_all(quizzes.iter().map(|quiz| self.top_score(quiz.id))).await;

        Ok(quizzes
            .into_iter()
            .zip(scores)
            .map(|(quiz, top_score)| QuizCard { quiz, top_score })
            .collect())
    }

    async fn top_score(&self, quiz_id: i64) -> Option<f64> {
        match self.quizzes.get_leaderboard(quiz_id, None, None).await {
            Ok(entries) => entries.iter().map(|e| e.best_score).reduce(f64::max),
            Err(e) => {
                log::warn!("Leaderboard for quiz {} unavailable: {}", quiz_id, e);
                None
            }
        }
    }
}
