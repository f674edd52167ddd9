use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, to_bson, Bson},
    options::IndexOptions,
    ClientSession, Collection, IndexModel,
};

use crate::{
    db::{Database, ANSWERS_COLLECTION, ATTEMPTS_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::{Attempt, AttemptSubmission, StudentAnswer},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AttemptRepository: Send + Sync {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>>;
    async fn find_answers(&self, attempt_id: &str) -> AppResult<Vec<StudentAnswer>>;
    /// Stores the graded answers and the attempt's submission fields atomically.
    /// Fails with `Conflict` when the attempt was already submitted.
    async fn finalize(
        &self,
        attempt_id: &str,
        submission: AttemptSubmission,
        answers: Vec<StudentAnswer>,
    ) -> AppResult<Attempt>;
    /// Newest first.
    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<Attempt>>;
    async fn list_submitted_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Attempt>>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoAttemptRepository {
    db: Database,
    attempts: Collection<Attempt>,
    answers: Collection<StudentAnswer>,
}

impl MongoAttemptRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            attempts: db.get_collection(ATTEMPTS_COLLECTION),
            answers: db.get_collection(ANSWERS_COLLECTION),
        }
    }

    async fn write_submission(
        &self,
        session: &mut ClientSession,
        attempt_id: &str,
        submission: &AttemptSubmission,
        answers: &[StudentAnswer],
    ) -> AppResult<()> {
        if !answers.is_empty() {
            self.answers
                .insert_many(answers)
                .session(&mut *session)
                .await?;
        }

        let update = doc! {
            "$set": {
                "submitted_at": to_bson(&submission.submitted_at)?,
                "score": submission.score,
                "total_points": submission.total_points,
                "elapsed_seconds": submission.elapsed_seconds,
                "submit_reason": to_bson(&submission.reason)?,
            }
        };

        let result = self
            .attempts
            .update_one(doc! { "id": attempt_id, "submitted_at": Bson::Null }, update)
            .session(&mut *session)
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::Conflict(format!(
                "Attempt '{}' does not exist or was already submitted",
                attempt_id
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for MongoAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        self.attempts.insert_one(&attempt).await?;
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        let attempt = self.attempts.find_one(doc! { "id": id }).await?;
        Ok(attempt)
    }

    async fn find_answers(&self, attempt_id: &str) -> AppResult<Vec<StudentAnswer>> {
        let answers = self
            .answers
            .find(doc! { "attempt_id": attempt_id })
            .await?
            .try_collect()
            .await?;
        Ok(answers)
    }

    async fn finalize(
        &self,
        attempt_id: &str,
        submission: AttemptSubmission,
        answers: Vec<StudentAnswer>,
    ) -> AppResult<Attempt> {
        let mut session = self.db.start_session().await?;
        session.start_transaction().await?;

        if let Err(err) = self
            .write_submission(&mut session, attempt_id, &submission, &answers)
            .await
        {
            if let Err(abort_err) = session.abort_transaction().await {
                log::error!("Failed to abort submission of attempt {}: {}", attempt_id, abort_err);
            }
            return Err(err);
        }

        session.commit_transaction().await?;

        self.find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))
    }

    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<Attempt>> {
        let attempts = self
            .attempts
            .find(doc! { "student_id": student_id })
            .sort(doc! { "started_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn list_submitted_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Attempt>> {
        let attempts = self
            .attempts
            .find(doc! { "quiz_id": quiz_id, "submitted_at": { "$ne": Bson::Null } })
            .sort(doc! { "submitted_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(attempts)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for attempts and answers collections");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        // Several open attempts per student and quiz are allowed; only the
        // start time separates them.
        let student_quiz_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "student_id": 1, "started_at": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("quiz_student_started".to_string())
                    .build(),
            )
            .build();

        let student_index = IndexModel::builder()
            .keys(doc! { "student_id": 1 })
            .options(IndexOptions::builder().name("student_id".to_string()).build())
            .build();

        let answer_index = IndexModel::builder()
            .keys(doc! { "attempt_id": 1, "question_id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("attempt_question".to_string())
                    .build(),
            )
            .build();

        self.attempts.create_index(id_index).await?;
        self.attempts.create_index(student_quiz_index).await?;
        self.attempts.create_index(student_index).await?;
        self.answers.create_index(answer_index).await?;

        log::info!("Successfully created indexes for attempts and answers collections");
        Ok(())
    }
}
