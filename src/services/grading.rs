use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::domain::{Question, StudentAnswer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grade {
    pub is_correct: bool,
    pub points_earned: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: String,
    pub answer_text: String,
    pub grade: Grade,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradedAttempt {
    pub answers: Vec<GradedAnswer>,
    pub score: i32,
    pub total_points: i32,
}

/// Trimmed, case-insensitive exact equality. A blank submission never matches.
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    let submitted = submitted.trim();
    !submitted.is_empty() && submitted.to_lowercase() == correct.trim().to_lowercase()
}

/// Full points for a matching answer, nothing otherwise. The same rule applies
/// to every question type, short answers included.
pub fn grade(question: &Question, submitted: &str) -> Grade {
    let is_correct = answers_match(submitted, &question.correct_answer);
    Grade {
        is_correct,
        points_earned: if is_correct { question.points } else { 0 },
    }
}

/// Grades every served question; questions without a recorded answer are
/// graded against the empty string.
pub fn grade_attempt(questions: &[Question], answers: &HashMap<String, String>) -> GradedAttempt {
    let mut score = 0;
    let mut total_points = 0;

    let graded = questions
        .iter()
        .map(|question| {
            let answer_text = answers.get(&question.id).cloned().unwrap_or_default();
            let grade = grade(question, &answer_text);

            score += grade.points_earned;
            total_points += question.points;

            GradedAnswer {
                question_id: question.id.clone(),
                answer_text,
                grade,
            }
        })
        .collect();

    GradedAttempt {
        answers: graded,
        score,
        total_points,
    }
}

impl GradedAttempt {
    pub fn to_student_answers(
        &self,
        attempt_id: &str,
        answered_at: DateTime<Utc>,
    ) -> Vec<StudentAnswer> {
        self.answers
            .iter()
            .map(|answer| StudentAnswer {
                id: Uuid::new_v4().to_string(),
                attempt_id: attempt_id.to_string(),
                question_id: answer.question_id.clone(),
                answer_text: answer.answer_text.clone(),
                is_correct: answer.grade.is_correct,
                points_earned: answer.grade.points_earned,
                answered_at,
            })
            .collect()
    }
}
