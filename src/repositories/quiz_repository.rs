use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{IndexOptions, ReturnDocument},
    ClientSession, Collection, IndexModel,
};

use crate::{
    db::{Database, QUESTIONS_COLLECTION, QUIZZES_COLLECTION},
    errors::{AppError, AppResult},
    models::domain::{Question, Quiz},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>>;
    async fn list_active_by_class(&self, class_label: &str) -> AppResult<Vec<Quiz>>;
    async fn list_by_owner(&self, owner_id: &str) -> AppResult<Vec<Quiz>>;
    /// Questions of a quiz in insertion (position) order.
    async fn find_questions(&self, quiz_id: &str) -> AppResult<Vec<Question>>;
    /// Writes the quiz and all of its questions as one unit.
    async fn publish(&self, quiz: Quiz, questions: Vec<Question>) -> AppResult<Quiz>;
    async fn set_active(&self, id: &str, is_active: bool) -> AppResult<Quiz>;
    /// Removes the quiz and its questions.
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

pub struct MongoQuizRepository {
    db: Database,
    quizzes: Collection<Quiz>,
    questions: Collection<Question>,
}

impl MongoQuizRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            db: db.clone(),
            quizzes: db.get_collection(QUIZZES_COLLECTION),
            questions: db.get_collection(QUESTIONS_COLLECTION),
        }
    }

    async fn write_quiz(
        &self,
        session: &mut ClientSession,
        quiz: &Quiz,
        questions: &[Question],
    ) -> AppResult<()> {
        self.quizzes.insert_one(quiz).session(&mut *session).await?;
        if !questions.is_empty() {
            self.questions
                .insert_many(questions)
                .session(&mut *session)
                .await?;
        }
        Ok(())
    }

    async fn remove_quiz(&self, session: &mut ClientSession, id: &str) -> AppResult<()> {
        self.questions
            .delete_many(doc! { "quiz_id": id })
            .session(&mut *session)
            .await?;

        let result = self
            .quizzes
            .delete_one(doc! { "id": id })
            .session(&mut *session)
            .await?;

        if result.deleted_count == 0 {
            return Err(AppError::NotFound(format!("Quiz with id '{}' not found", id)));
        }
        Ok(())
    }
}

async fn abort(session: &mut ClientSession) {
    if let Err(err) = session.abort_transaction().await {
        log::error!("Failed to abort transaction: {}", err);
    }
}

#[async_trait]
impl QuizRepository for MongoQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        let quiz = self.quizzes.find_one(doc! { "id": id }).await?;
        Ok(quiz)
    }

    async fn list_active_by_class(&self, class_label: &str) -> AppResult<Vec<Quiz>> {
        let quizzes = self
            .quizzes
            .find(doc! { "class_label": class_label, "is_active": true })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(quizzes)
    }

    async fn list_by_owner(&self, owner_id: &str) -> AppResult<Vec<Quiz>> {
        let quizzes = self
            .quizzes
            .find(doc! { "created_by": owner_id })
            .sort(doc! { "created_at": -1 })
            .await?
            .try_collect()
            .await?;
        Ok(quizzes)
    }

    async fn find_questions(&self, quiz_id: &str) -> AppResult<Vec<Question>> {
        let questions = self
            .questions
            .find(doc! { "quiz_id": quiz_id })
            .sort(doc! { "position": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(questions)
    }

    async fn publish(&self, quiz: Quiz, questions: Vec<Question>) -> AppResult<Quiz> {
        let mut session = self.db.start_session().await?;
        session.start_transaction().await?;

        if let Err(err) = self.write_quiz(&mut session, &quiz, &questions).await {
            abort(&mut session).await;
            return Err(err);
        }

        session.commit_transaction().await?;
        Ok(quiz)
    }

    async fn set_active(&self, id: &str, is_active: bool) -> AppResult<Quiz> {
        self.quizzes
            .find_one_and_update(
                doc! { "id": id },
                doc! { "$set": { "is_active": is_active } },
            )
            .return_document(ReturnDocument::After)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut session = self.db.start_session().await?;
        session.start_transaction().await?;

        if let Err(err) = self.remove_quiz(&mut session, id).await {
            abort(&mut session).await;
            return Err(err);
        }

        session.commit_transaction().await?;
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for quizzes and questions collections");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let class_index = IndexModel::builder()
            .keys(doc! { "class_label": 1, "is_active": 1 })
            .options(IndexOptions::builder().name("class_active".to_string()).build())
            .build();

        let owner_index = IndexModel::builder()
            .keys(doc! { "created_by": 1 })
            .options(IndexOptions::builder().name("created_by".to_string()).build())
            .build();

        let question_id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();

        let question_order_index = IndexModel::builder()
            .keys(doc! { "quiz_id": 1, "position": 1 })
            .options(IndexOptions::builder().name("quiz_position".to_string()).build())
            .build();

        self.quizzes.create_index(id_index).await?;
        self.quizzes.create_index(class_index).await?;
        self.quizzes.create_index(owner_index).await?;
        self.questions.create_index(question_id_index).await?;
        self.questions.create_index(question_order_index).await?;

        log::info!("Successfully created indexes for quizzes and questions collections");
        Ok(())
    }
}
