use async_graphql::InputObject;
use once_cell::sync::Lazy;
use serde::Deserialize;
use validator::Validate;

use crate::models::domain::QuestionType;

static CLASS_LABEL_REGEX: Lazy<regex::Regex> = Lazy::new(|| {
    regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 _-]*$")
        .expect("CLASS_LABEL_REGEX is a valid regex pattern")
});

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50))]
    #[validate(regex(
        path = *CLASS_LABEL_REGEX,
        message = "Class label may only contain letters, digits, spaces, '-' and '_'"
    ))]
    pub class_label: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct QuestionInput {
    pub text: String,
    pub question_type: QuestionType,
    #[graphql(default)]
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[validate(range(min = 1, max = 100))]
    #[graphql(default = 1)]
    pub points: i32,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct CreateQuizInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 100))]
    pub subject: String,

    #[validate(length(max = 2000))]
    #[graphql(default)]
    #[serde(default)]
    pub description: String,

    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: i32,

    #[validate(length(max = 4000))]
    #[graphql(default)]
    #[serde(default)]
    pub instructions: String,

    #[graphql(default = true)]
    pub is_active: bool,

    #[graphql(default)]
    #[serde(default)]
    pub randomize_questions: bool,

    #[graphql(default)]
    #[serde(default)]
    pub randomize_options: bool,

    #[validate(length(min = 1, max = 50))]
    #[validate(regex(path = *CLASS_LABEL_REGEX))]
    pub class_label: String,

    #[validate(nested)]
    pub questions: Vec<QuestionInput>,
}

#[derive(Debug, Clone, Deserialize, Validate, InputObject)]
pub struct RecordAnswerInput {
    pub attempt_id: String,
    pub question_id: String,
    pub answer: String,
}
