use std::sync::Arc;

use crate::{
    auth::{require_admin, require_quiz_owner, RequestContext},
    errors::{AppError, AppResult},
    models::{
        domain::Quiz,
        dto::response::{QuizSummary, QuizWithQuestions},
    },
    repositories::{AttemptRepository, QuizRepository},
};

pub struct QuizService {
    repository: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl QuizService {
    pub fn new(repository: Arc<dyn QuizRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self {
            repository,
            attempts,
        }
    }

    pub async fn get_quiz(&self, id: &str) -> AppResult<Quiz> {
        let quiz = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))?;

        Ok(quiz)
    }

    /// Active quizzes of the student's class, or the admin's own quizzes.
    pub async fn list_for(&self, ctx: &RequestContext) -> AppResult<Vec<QuizSummary>> {
        let quizzes = if ctx.is_admin() {
            self.repository.list_by_owner(&ctx.user_id).await?
        } else {
            self.repository
                .list_active_by_class(&ctx.class_label)
                .await?
        };

        Ok(quizzes.iter().map(QuizSummary::from).collect())
    }

    pub async fn list_owned(&self, ctx: &RequestContext) -> AppResult<Vec<Quiz>> {
        require_admin(ctx)?;
        self.repository.list_by_owner(&ctx.user_id).await
    }

    pub async fn quiz_with_answers(
        &self,
        ctx: &RequestContext,
        quiz_id: &str,
    ) -> AppResult<QuizWithQuestions> {
        let quiz = self.get_quiz(quiz_id).await?;
        require_quiz_owner(ctx, &quiz)?;

        let questions = self.repository.find_questions(&quiz.id).await?;
        Ok(QuizWithQuestions { quiz, questions })
    }

    pub async fn set_active(
        &self,
        ctx: &RequestContext,
        quiz_id: &str,
        is_active: bool,
    ) -> AppResult<Quiz> {
        let quiz = self.get_quiz(quiz_id).await?;
        require_quiz_owner(ctx, &quiz)?;

        let quiz = self.repository.set_active(&quiz.id, is_active).await?;
        log::info!(
            "Quiz {} {} by {}",
            quiz.id,
            if is_active { "activated" } else { "deactivated" },
            ctx.user_id
        );
        Ok(quiz)
    }

    /// Removes the quiz and its questions. Quizzes with submitted attempts are
    /// kept so results stay readable.
    pub async fn delete(&self, ctx: &RequestContext, quiz_id: &str) -> AppResult<()> {
        let quiz = self.get_quiz(quiz_id).await?;
        require_quiz_owner(ctx, &quiz)?;

        let submitted = self.attempts.list_submitted_by_quiz(&quiz.id).await?;
        if !submitted.is_empty() {
            log::warn!(
                "Refusing to delete quiz {} with {} submitted attempts",
                quiz.id,
                submitted.len()
            );
            return Err(AppError::Conflict(format!(
                "Quiz '{}' already has {} submitted attempts; deactivate it instead",
                quiz.title,
                submitted.len()
            )));
        }

        self.repository.delete(&quiz.id).await.map_err(|e| {
            log::error!("Failed to delete quiz {}: {}", quiz.id, e);
            e
        })?;
        log::info!("Quiz {} deleted by {}", quiz.id, ctx.user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::Attempt,
        repositories::{MockAttemptRepository, MockQuizRepository},
    };

    fn quiz() -> Quiz {
        Quiz {
            id: "quiz-1".to_string(),
            title: "Cells".to_string(),
            subject: "Biology".to_string(),
            description: String::new(),
            duration_minutes: 20,
            instructions: String::new(),
            is_active: true,
            randomize_questions: false,
            randomize_options: false,
            created_by: "admin-1".to_string(),
            class_label: "9B".to_string(),
            created_at: None,
        }
    }

    fn quiz_repo() -> MockQuizRepository {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(Some(quiz())));
        repo
    }

    #[tokio::test]
    async fn test_get_quiz_not_found() {
        let mut repo = MockQuizRepository::new();
        repo.expect_find_by_id().returning(|_| Ok(None));

        let service = QuizService::new(Arc::new(repo), Arc::new(MockAttemptRepository::new()));
        let result = service.get_quiz("missing").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_students_list_their_class() {
        let mut repo = MockQuizRepository::new();
        repo.expect_list_active_by_class().returning(|class_label| {
            assert_eq!(class_label, "9B");
            Ok(vec![quiz()])
        });
        repo.expect_list_by_owner().never();

        let service = QuizService::new(Arc::new(repo), Arc::new(MockAttemptRepository::new()));
        let quizzes = service
            .list_for(&RequestContext::student("student-1", "9B"))
            .await
            .unwrap();

        assert_eq!(quizzes.len(), 1);
    }

    #[tokio::test]
    async fn test_other_admin_cannot_view_answers() {
        let mut repo = quiz_repo();
        repo.expect_find_questions().never();

        let service = QuizService::new(Arc::new(repo), Arc::new(MockAttemptRepository::new()));
        let result = service
            .quiz_with_answers(&RequestContext::admin("admin-2"), "quiz-1")
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_set_active_by_owner() {
        let mut repo = quiz_repo();
        repo.expect_set_active().returning(|_, is_active| {
            let mut quiz = quiz();
            quiz.is_active = is_active;
            Ok(quiz)
        });

        let service = QuizService::new(Arc::new(repo), Arc::new(MockAttemptRepository::new()));
        let quiz = service
            .set_active(&RequestContext::admin("admin-1"), "quiz-1", false)
            .await
            .unwrap();

        assert!(!quiz.is_active);
    }

    #[tokio::test]
    async fn test_delete_refused_with_submitted_attempts() {
        let mut repo = quiz_repo();
        repo.expect_delete().never();

        let mut attempts = MockAttemptRepository::new();
        attempts
            .expect_list_submitted_by_quiz()
            .returning(|_| Ok(vec![Attempt::start("quiz-1", "student-1")]));

        let service = QuizService::new(Arc::new(repo), Arc::new(attempts));
        let result = service
            .delete(&RequestContext::admin("admin-1"), "quiz-1")
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_delete_unused_quiz() {
        let mut repo = quiz_repo();
        repo.expect_delete().times(1).returning(|_| Ok(()));

        let mut attempts = MockAttemptRepository::new();
        attempts
            .expect_list_submitted_by_quiz()
            .returning(|_| Ok(vec![]));

        let service = QuizService::new(Arc::new(repo), Arc::new(attempts));
        service
            .delete(&RequestContext::admin("admin-1"), "quiz-1")
            .await
            .unwrap();
    }
}
