#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::RwLock;

use cbt_server::{
    app_state::AppState,
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{Attempt, AttemptSubmission, Profile, Question, Quiz, StudentAnswer},
        dto::request::{CreateQuizInput, QuestionInput},
    },
    repositories::{AttemptRepository, ProfileRepository, QuizRepository},
};

#[derive(Default)]
pub struct InMemoryProfileRepository {
    profiles: Arc<RwLock<HashMap<String, Profile>>>,
}

#[async_trait]
impl ProfileRepository for InMemoryProfileRepository {
    async fn create(&self, profile: Profile) -> AppResult<Profile> {
        let mut profiles = self.profiles.write().await;
        if profiles.values().any(|p| p.email == profile.email) {
            return Err(AppError::AlreadyExists(format!(
                "Profile with email '{}' already exists",
                profile.email
            )));
        }
        profiles.insert(profile.id.clone(), profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Profile>> {
        Ok(self.profiles.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Profile>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .profiles
            .read()
            .await
            .values()
            .find(|p| p.email == email)
            .cloned())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryQuizRepository {
    quizzes: Arc<RwLock<HashMap<String, Quiz>>>,
    questions: Arc<RwLock<HashMap<String, Vec<Question>>>>,
}

#[async_trait]
impl QuizRepository for InMemoryQuizRepository {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Quiz>> {
        Ok(self.quizzes.read().await.get(id).cloned())
    }

    async fn list_active_by_class(&self, class_label: &str) -> AppResult<Vec<Quiz>> {
        let mut items: Vec<Quiz> = self
            .quizzes
            .read()
            .await
            .values()
            .filter(|q| q.is_active && q.class_label == class_label)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn list_by_owner(&self, owner_id: &str) -> AppResult<Vec<Quiz>> {
        let mut items: Vec<Quiz> = self
            .quizzes
            .read()
            .await
            .values()
            .filter(|q| q.created_by == owner_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn find_questions(&self, quiz_id: &str) -> AppResult<Vec<Question>> {
        let mut items = self
            .questions
            .read()
            .await
            .get(quiz_id)
            .cloned()
            .unwrap_or_default();
        items.sort_by_key(|q| q.position);
        Ok(items)
    }

    async fn publish(&self, quiz: Quiz, questions: Vec<Question>) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        if quizzes.contains_key(&quiz.id) {
            return Err(AppError::AlreadyExists(format!(
                "Quiz with id '{}' already exists",
                quiz.id
            )));
        }
        quizzes.insert(quiz.id.clone(), quiz.clone());
        self.questions
            .write()
            .await
            .insert(quiz.id.clone(), questions);
        Ok(quiz)
    }

    async fn set_active(&self, id: &str, is_active: bool) -> AppResult<Quiz> {
        let mut quizzes = self.quizzes.write().await;
        let quiz = quizzes
            .get_mut(id)
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", id)))?;
        quiz.is_active = is_active;
        Ok(quiz.clone())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        if self.quizzes.write().await.remove(id).is_none() {
            return Err(AppError::NotFound(format!("Quiz with id '{}' not found", id)));
        }
        self.questions.write().await.remove(id);
        Ok(())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAttemptRepository {
    attempts: Arc<RwLock<HashMap<String, Attempt>>>,
    answers: Arc<RwLock<Vec<StudentAnswer>>>,
    finalize_calls: AtomicUsize,
}

impl InMemoryAttemptRepository {
    pub fn finalize_calls(&self) -> usize {
        self.finalize_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AttemptRepository for InMemoryAttemptRepository {
    async fn create(&self, attempt: Attempt) -> AppResult<Attempt> {
        self.attempts
            .write()
            .await
            .insert(attempt.id.clone(), attempt.clone());
        Ok(attempt)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Attempt>> {
        Ok(self.attempts.read().await.get(id).cloned())
    }

    async fn find_answers(&self, attempt_id: &str) -> AppResult<Vec<StudentAnswer>> {
        Ok(self
            .answers
            .read()
            .await
            .iter()
            .filter(|a| a.attempt_id == attempt_id)
            .cloned()
            .collect())
    }

    async fn finalize(
        &self,
        attempt_id: &str,
        submission: AttemptSubmission,
        answers: Vec<StudentAnswer>,
    ) -> AppResult<Attempt> {
        self.finalize_calls.fetch_add(1, Ordering::SeqCst);

        let mut attempts = self.attempts.write().await;
        let attempt = attempts
            .get_mut(attempt_id)
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))?;

        if attempt.is_submitted() {
            return Err(AppError::Conflict(format!(
                "Attempt '{}' was already submitted",
                attempt_id
            )));
        }

        attempt.apply_submission(&submission);
        self.answers.write().await.extend(answers);
        Ok(attempt.clone())
    }

    async fn list_by_student(&self, student_id: &str) -> AppResult<Vec<Attempt>> {
        let mut items: Vec<Attempt> = self
            .attempts
            .read()
            .await
            .values()
            .filter(|a| a.student_id == student_id)
            .cloned()
            .collect();
        items.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(items)
    }

    async fn list_submitted_by_quiz(&self, quiz_id: &str) -> AppResult<Vec<Attempt>> {
        Ok(self
            .attempts
            .read()
            .await
            .values()
            .filter(|a| a.quiz_id == quiz_id && a.is_submitted())
            .cloned()
            .collect())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct Repositories {
    pub profiles: Arc<InMemoryProfileRepository>,
    pub quizzes: Arc<InMemoryQuizRepository>,
    pub attempts: Arc<InMemoryAttemptRepository>,
}

impl Repositories {
    pub fn new() -> Self {
        Self {
            profiles: Arc::new(InMemoryProfileRepository::default()),
            quizzes: Arc::new(InMemoryQuizRepository::default()),
            attempts: Arc::new(InMemoryAttemptRepository::default()),
        }
    }
}

pub fn test_config() -> Config {
    Config {
        mongo_conn_string: "mongodb://localhost:27017".to_string(),
        mongo_db_name: "cbt-test".to_string(),
        web_server_host: "127.0.0.1".to_string(),
        web_server_port: 8080,
        cors_allowed_origin: "http://localhost:3000".to_string(),
        jwt_secret: SecretString::from("integration_test_secret_key_0123456789".to_string()),
        jwt_expiration_hours: 1,
        admin_name: "Head Teacher".to_string(),
        admin_email: Some("head@example.com".to_string()),
        admin_password: Some(SecretString::from("head-teacher-password".to_string())),
        admin_class_label: "staff".to_string(),
    }
}

pub fn app_state(repos: &Repositories) -> AppState {
    AppState::from_repositories(
        test_config(),
        repos.profiles.clone(),
        repos.quizzes.clone(),
        repos.attempts.clone(),
    )
}

pub fn question_input(
    question_type: cbt_server::models::domain::QuestionType,
    options: &[&str],
    correct_answer: &str,
    points: i32,
) -> QuestionInput {
    QuestionInput {
        text: format!("Pick {}", correct_answer),
        question_type,
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer: correct_answer.to_string(),
        points,
    }
}

pub fn quiz_input(
    class_label: &str,
    duration_minutes: i32,
    questions: Vec<QuestionInput>,
) -> CreateQuizInput {
    CreateQuizInput {
        title: "Weekly check".to_string(),
        subject: "General".to_string(),
        description: "Short revision quiz".to_string(),
        duration_minutes,
        instructions: "Answer every question".to_string(),
        is_active: true,
        randomize_questions: false,
        randomize_options: false,
        class_label: class_label.to_string(),
        questions,
    }
}
