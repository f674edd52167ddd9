use async_graphql::{Enum, SimpleObject};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One student's timed session against one quiz.
///
/// Created when the quiz is loaded and filled in exactly once at submission.
/// An attempt that never receives a `submitted_at` was abandoned.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Attempt {
    pub id: String,
    pub quiz_id: String,
    pub student_id: String,
    pub started_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub score: i32,
    pub total_points: i32,
    pub elapsed_seconds: i32,
    pub submit_reason: Option<SubmitReason>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize, Enum)]
#[serde(rename_all = "lowercase")]
pub enum SubmitReason {
    Manual,
    Timeout,
}

impl SubmitReason {
    pub fn notice(&self) -> &'static str {
        match self {
            SubmitReason::Manual => "Quiz submitted successfully!",
            SubmitReason::Timeout => "Time's up! Your quiz has been submitted automatically.",
        }
    }
}

/// Lifecycle of one attempt while it is being taken.
///
/// `Loading → InProgress → Submitting → {Submitted, Failed}`. `Failed` may go
/// back to `Submitting` on a manual resubmission. `Abandoned` is reported for
/// stored attempts that were never submitted and have no live session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Enum)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Loading,
    InProgress,
    Submitting,
    Submitted,
    Failed,
    Abandoned,
}

/// Values written onto an attempt when it is submitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptSubmission {
    pub submitted_at: DateTime<Utc>,
    pub score: i32,
    pub total_points: i32,
    pub elapsed_seconds: i32,
    pub reason: SubmitReason,
}

impl Attempt {
    pub fn start(quiz_id: &str, student_id: &str) -> Self {
        Attempt {
            id: Uuid::new_v4().to_string(),
            quiz_id: quiz_id.to_string(),
            student_id: student_id.to_string(),
            started_at: Utc::now(),
            submitted_at: None,
            score: 0,
            total_points: 0,
            elapsed_seconds: 0,
            submit_reason: None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    pub fn apply_submission(&mut self, submission: &AttemptSubmission) {
        self.submitted_at = Some(submission.submitted_at);
        self.score = submission.score;
        self.total_points = submission.total_points;
        self.elapsed_seconds = submission.elapsed_seconds;
        self.submit_reason = Some(submission.reason);
    }

    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.total_points)
    }
}

/// 100 × score / total, zero when the quiz carries no points.
pub fn percentage(score: i32, total_points: i32) -> f64 {
    if total_points <= 0 {
        return 0.0;
    }
    100.0 * score as f64 / total_points as f64
}

/// Percentage rounded to one decimal place, as shown on result screens.
pub fn display_percentage(score: i32, total_points: i32) -> f64 {
    (percentage(score, total_points) * 10.0).round() / 10.0
}
