use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::{require_admin, RequestContext},
    errors::{AppError, AppResult},
    models::{
        domain::{question::TRUE_FALSE_OPTIONS, Question, QuestionType, Quiz},
        dto::{
            request::{CreateQuizInput, QuestionInput},
            response::QuizWithQuestions,
        },
    },
    repositories::QuizRepository,
    services::grading::answers_match,
};

/// A question that passed authoring checks, with options normalized for its type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub points: i32,
}

impl QuestionDraft {
    pub fn new(input: QuestionInput) -> AppResult<Self> {
        input.validate()?;

        let text = input.text.trim().to_string();
        let correct_answer = input.correct_answer.trim().to_string();

        if text.is_empty() {
            return Err(AppError::ValidationError(
                "Question text is required".to_string(),
            ));
        }
        if correct_answer.is_empty() {
            return Err(AppError::ValidationError(
                "A correct answer is required".to_string(),
            ));
        }

        let options = match input.question_type {
            QuestionType::MultipleChoice => {
                let options: Vec<String> =
                    input.options.iter().map(|o| o.trim().to_string()).collect();
                if options.len() < 2 {
                    return Err(AppError::ValidationError(
                        "Multiple choice questions need at least two options".to_string(),
                    ));
                }
                if options.iter().any(String::is_empty) {
                    return Err(AppError::ValidationError(
                        "Every option must be filled in".to_string(),
                    ));
                }
                options
            }
            QuestionType::TrueFalse => TRUE_FALSE_OPTIONS.iter().map(|o| o.to_string()).collect(),
            QuestionType::ShortAnswer => Vec::new(),
        };

        if input.question_type.has_options()
            && !options.iter().any(|o| answers_match(o, &correct_answer))
        {
            return Err(AppError::ValidationError(
                "The correct answer must be one of the options".to_string(),
            ));
        }

        Ok(Self {
            text,
            question_type: input.question_type,
            options,
            correct_answer,
            points: input.points,
        })
    }
}

/// Quiz metadata plus the questions accepted so far, in authoring order.
#[derive(Debug, Clone)]
pub struct QuizDraft {
    input: CreateQuizInput,
    questions: Vec<QuestionDraft>,
}

impl QuizDraft {
    /// Validates the metadata only; questions are added one by one.
    pub fn new(mut input: CreateQuizInput) -> AppResult<Self> {
        input.questions = Vec::new();
        input.title = input.title.trim().to_string();
        input.subject = input.subject.trim().to_string();
        input.class_label = input.class_label.trim().to_string();
        input.validate()?;

        Ok(Self {
            input,
            questions: Vec::new(),
        })
    }

    pub fn add_question(&mut self, input: QuestionInput) -> AppResult<()> {
        let draft = QuestionDraft::new(input)?;
        self.questions.push(draft);
        Ok(())
    }

    /// Assigns ids and positions. Fails when no question was added.
    pub fn build(self, created_by: &str) -> AppResult<(Quiz, Vec<Question>)> {
        if self.questions.is_empty() {
            return Err(AppError::ValidationError(
                "A quiz needs at least one question".to_string(),
            ));
        }

        let now = Utc::now();
        let quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            title: self.input.title,
            subject: self.input.subject,
            description: self.input.description.trim().to_string(),
            duration_minutes: self.input.duration_minutes,
            instructions: self.input.instructions.trim().to_string(),
            is_active: self.input.is_active,
            randomize_questions: self.input.randomize_questions,
            randomize_options: self.input.randomize_options,
            created_by: created_by.to_string(),
            class_label: self.input.class_label,
            created_at: Some(now),
        };

        let questions = self
            .questions
            .into_iter()
            .enumerate()
            .map(|(position, draft)| Question {
                id: Uuid::new_v4().to_string(),
                quiz_id: quiz.id.clone(),
                text: draft.text,
                question_type: draft.question_type,
                options: draft.options,
                correct_answer: draft.correct_answer,
                points: draft.points,
                position: position as i32,
                created_at: Some(now),
            })
            .collect();

        Ok((quiz, questions))
    }
}

pub struct AuthoringService {
    repository: Arc<dyn QuizRepository>,
}

impl AuthoringService {
    pub fn new(repository: Arc<dyn QuizRepository>) -> Self {
        Self { repository }
    }

    /// Validates the whole quiz before anything is written, then stores quiz
    /// and questions together.
    pub async fn publish(
        &self,
        ctx: &RequestContext,
        mut input: CreateQuizInput,
    ) -> AppResult<QuizWithQuestions> {
        require_admin(ctx).map_err(|e| {
            log::warn!("User {} attempted to publish a quiz", ctx.user_id);
            e
        })?;

        let question_inputs = std::mem::take(&mut input.questions);
        let mut draft = QuizDraft::new(input)?;
        for (index, question) in question_inputs.into_iter().enumerate() {
            draft.add_question(question).map_err(|e| match e {
                AppError::ValidationError(msg) => {
                    AppError::ValidationError(format!("Question {}: {}", index + 1, msg))
                }
                other => other,
            })?;
        }

        let (quiz, questions) = draft.build(&ctx.user_id)?;
        let quiz = self
            .repository
            .publish(quiz, questions.clone())
            .await
            .map_err(|e| {
                log::error!("Failed to publish quiz: {}", e);
                e
            })?;

        log::info!(
            "Quiz {} published by {} with {} questions",
            quiz.id,
            ctx.user_id,
            questions.len()
        );

        Ok(QuizWithQuestions { quiz, questions })
    }
}
