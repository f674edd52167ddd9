use std::{collections::HashMap, sync::Arc};

use crate::{
    auth::{can_view_attempt, RequestContext},
    errors::{AppError, AppResult},
    models::{
        domain::attempt::display_percentage,
        dto::response::{AnswerReview, AttemptResult, AttemptSummary, QuizSummary},
    },
    repositories::{AttemptRepository, QuizRepository},
};

pub struct ResultsService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl ResultsService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { quizzes, attempts }
    }

    /// Per-question review of a submitted attempt, in question position order.
    pub async fn attempt_result(
        &self,
        ctx: &RequestContext,
        attempt_id: &str,
    ) -> AppResult<AttemptResult> {
        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))?;

        let quiz = self
            .quizzes
            .find_by_id(&attempt.quiz_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Quiz with id '{}' not found", attempt.quiz_id))
            })?;

        can_view_attempt(ctx, &attempt, &quiz)?;

        if !attempt.is_submitted() {
            return Err(AppError::ValidationError(
                "This attempt has not been submitted".to_string(),
            ));
        }

        let questions = self.quizzes.find_questions(&quiz.id).await?;
        let answers: HashMap<String, _> = self
            .attempts
            .find_answers(&attempt.id)
            .await?
            .into_iter()
            .map(|a| (a.question_id.clone(), a))
            .collect();

        let reviews = questions
            .into_iter()
            .map(|question| {
                let answer = answers.get(&question.id);
                AnswerReview {
                    question_id: question.id,
                    question_text: question.text,
                    question_type: question.question_type,
                    options: question.options,
                    submitted_answer: answer.map(|a| a.answer_text.clone()).unwrap_or_default(),
                    correct_answer: question.correct_answer,
                    is_correct: answer.is_some_and(|a| a.is_correct),
                    points_earned: answer.map(|a| a.points_earned).unwrap_or(0),
                    points: question.points,
                }
            })
            .collect();

        Ok(AttemptResult {
            percentage: display_percentage(attempt.score, attempt.total_points),
            quiz: QuizSummary::from(&quiz),
            attempt,
            answers: reviews,
        })
    }

    /// The caller's attempts, newest first. Attempts on deleted quizzes are skipped.
    pub async fn my_attempts(&self, ctx: &RequestContext) -> AppResult<Vec<AttemptSummary>> {
        let attempts = self.attempts.list_by_student(&ctx.user_id).await?;

        let mut titles: HashMap<String, String> = HashMap::new();
        let mut summaries = Vec::with_capacity(attempts.len());
        for attempt in &attempts {
            if !titles.contains_key(&attempt.quiz_id) {
                match self.quizzes.find_by_id(&attempt.quiz_id).await? {
                    Some(quiz) => {
                        titles.insert(quiz.id.clone(), quiz.title);
                    }
                    None => continue,
                }
            }
            if let Some(title) = titles.get(&attempt.quiz_id) {
                summaries.push(AttemptSummary::new(attempt, title));
            }
        }

        Ok(summaries)
    }
}
