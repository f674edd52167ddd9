use async_graphql::SimpleObject;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    attempt::display_percentage, Attempt, DeliveryState, Profile, Question, QuestionType, Quiz,
    SubmitReason, UserRole,
};

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct ProfileDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub class_label: String,
    #[graphql(skip)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        ProfileDto {
            id: profile.id,
            name: profile.name,
            email: profile.email,
            role: profile.role,
            class_label: profile.class_label,
            created_at: profile.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_in_hours: i64,
    pub profile: ProfileDto,
}

#[derive(Debug, Serialize, SimpleObject)]
pub struct MessageResponse {
    pub message: String,
}

/// Quiz metadata shown to students; never carries answers.
#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub instructions: String,
    pub duration_minutes: i32,
    pub is_active: bool,
    pub class_label: String,
}

impl From<&Quiz> for QuizSummary {
    fn from(quiz: &Quiz) -> Self {
        QuizSummary {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            subject: quiz.subject.clone(),
            description: quiz.description.clone(),
            instructions: quiz.instructions.clone(),
            duration_minutes: quiz.duration_minutes,
            is_active: quiz.is_active,
            class_label: quiz.class_label.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct QuizWithQuestions {
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

/// A question as served during an attempt, without its correct answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
pub struct DeliveredQuestion {
    pub id: String,
    pub text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub points: i32,
}

impl From<&Question> for DeliveredQuestion {
    fn from(question: &Question) -> Self {
        DeliveredQuestion {
            id: question.id.clone(),
            text: question.text.clone(),
            question_type: question.question_type,
            options: question.options.clone(),
            points: question.points,
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct LoadedQuiz {
    pub attempt_id: String,
    pub quiz: QuizSummary,
    pub questions: Vec<DeliveredQuestion>,
    pub duration_seconds: i32,
    pub remaining_seconds: i32,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct DeliveryStatus {
    pub attempt_id: String,
    pub state: DeliveryState,
    pub remaining_seconds: i32,
    pub answered_count: i32,
    pub reason: Option<SubmitReason>,
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct SubmissionOutcome {
    pub attempt_id: String,
    pub quiz_id: String,
    pub reason: SubmitReason,
    pub score: i32,
    pub total_points: i32,
    pub percentage: f64,
    pub elapsed_seconds: i32,
    pub notice: String,
}

impl SubmissionOutcome {
    pub fn new(attempt: &Attempt, reason: SubmitReason) -> Self {
        SubmissionOutcome {
            attempt_id: attempt.id.clone(),
            quiz_id: attempt.quiz_id.clone(),
            reason,
            score: attempt.score,
            total_points: attempt.total_points,
            percentage: display_percentage(attempt.score, attempt.total_points),
            elapsed_seconds: attempt.elapsed_seconds,
            notice: reason.notice().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AnswerReview {
    pub question_id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub submitted_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
    pub points_earned: i32,
    pub points: i32,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AttemptResult {
    pub attempt: Attempt,
    pub quiz: QuizSummary,
    pub answers: Vec<AnswerReview>,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AttemptSummary {
    pub attempt_id: String,
    pub quiz_id: String,
    pub quiz_title: String,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub total_points: i32,
    pub percentage: f64,
}

impl AttemptSummary {
    pub fn new(attempt: &Attempt, quiz_title: &str) -> Self {
        AttemptSummary {
            attempt_id: attempt.id.clone(),
            quiz_id: attempt.quiz_id.clone(),
            quiz_title: quiz_title.to_string(),
            started_at: attempt.started_at,
            submitted_at: attempt.submitted_at,
            score: attempt.score,
            total_points: attempt.total_points,
            percentage: display_percentage(attempt.score, attempt.total_points),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, SimpleObject)]
pub struct QuizStats {
    pub quiz_id: String,
    pub title: String,
    pub attempt_count: i32,
    pub average_percentage: f64,
    pub max_percentage: f64,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct AdminDashboard {
    pub quiz_count: i32,
    pub active_quiz_count: i32,
    pub submitted_attempt_count: i32,
    pub quizzes: Vec<QuizStats>,
}

#[derive(Debug, Clone, Serialize, SimpleObject)]
pub struct StudentDashboard {
    pub available_quiz_count: i32,
    pub completed_attempt_count: i32,
    pub average_percentage: f64,
    pub best_percentage: f64,
    pub recent_attempts: Vec<AttemptSummary>,
}
