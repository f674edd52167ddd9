use std::{collections::HashMap, sync::Arc};

use crate::{
    auth::{require_admin, require_quiz_owner, RequestContext},
    errors::{AppError, AppResult},
    models::{
        domain::{Attempt, Quiz},
        dto::response::{AdminDashboard, AttemptSummary, QuizStats, StudentDashboard},
    },
    repositories::{AttemptRepository, QuizRepository},
};

const RECENT_ATTEMPTS: usize = 5;

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Count, mean and max percentage over the submitted attempts of one quiz.
pub fn quiz_stats(quiz: &Quiz, attempts: &[Attempt]) -> QuizStats {
    let percentages: Vec<f64> = attempts
        .iter()
        .filter(|a| a.quiz_id == quiz.id && a.is_submitted())
        .map(Attempt::percentage)
        .collect();

    let (average, max) = if percentages.is_empty() {
        (0.0, 0.0)
    } else {
        let sum: f64 = percentages.iter().sum();
        let max = percentages.iter().cloned().fold(f64::MIN, f64::max);
        (sum / percentages.len() as f64, max)
    };

    QuizStats {
        quiz_id: quiz.id.clone(),
        title: quiz.title.clone(),
        attempt_count: percentages.len() as i32,
        average_percentage: round1(average),
        max_percentage: round1(max),
    }
}

pub struct StatsService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
}

impl StatsService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self { quizzes, attempts }
    }

    pub async fn stats_for_quiz(&self, ctx: &RequestContext, quiz_id: &str) -> AppResult<QuizStats> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;
        require_quiz_owner(ctx, &quiz)?;

        let attempts = self.attempts.list_submitted_by_quiz(&quiz.id).await?;
        Ok(quiz_stats(&quiz, &attempts))
    }

    pub async fn admin_dashboard(&self, ctx: &RequestContext) -> AppResult<AdminDashboard> {
        require_admin(ctx)?;

        let quizzes = self.quizzes.list_by_owner(&ctx.user_id).await?;
        let mut stats = Vec::with_capacity(quizzes.len());
        for quiz in &quizzes {
            let attempts = self.attempts.list_submitted_by_quiz(&quiz.id).await?;
            stats.push(quiz_stats(quiz, &attempts));
        }

        Ok(AdminDashboard {
            quiz_count: quizzes.len() as i32,
            active_quiz_count: quizzes.iter().filter(|q| q.is_active).count() as i32,
            submitted_attempt_count: stats.iter().map(|s| s.attempt_count).sum(),
            quizzes: stats,
        })
    }

    pub async fn student_dashboard(&self, ctx: &RequestContext) -> AppResult<StudentDashboard> {
        let available = self
            .quizzes
            .list_active_by_class(&ctx.class_label)
            .await?;
        let attempts = self.attempts.list_by_student(&ctx.user_id).await?;
        let submitted: Vec<&Attempt> = attempts.iter().filter(|a| a.is_submitted()).collect();

        let percentages: Vec<f64> = submitted.iter().map(|a| a.percentage()).collect();
        let average = if percentages.is_empty() {
            0.0
        } else {
            percentages.iter().sum::<f64>() / percentages.len() as f64
        };
        let best = percentages.iter().cloned().fold(0.0, f64::max);

        let titles: HashMap<&str, &str> = available
            .iter()
            .map(|q| (q.id.as_str(), q.title.as_str()))
            .collect();

        let mut recent_attempts = Vec::new();
        for attempt in submitted.iter().take(RECENT_ATTEMPTS) {
            let title = match titles.get(attempt.quiz_id.as_str()) {
                Some(title) => title.to_string(),
                None => self
                    .quizzes
                    .find_by_id(&attempt.quiz_id)
                    .await?
                    .map(|q| q.title)
                    .unwrap_or_default(),
            };
            recent_attempts.push(AttemptSummary::new(attempt, &title));
        }

        Ok(StudentDashboard {
            available_quiz_count: available.len() as i32,
            completed_attempt_count: submitted.len() as i32,
            average_percentage: round1(average),
            best_percentage: round1(best),
            recent_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::domain::{AttemptSubmission, SubmitReason},
        repositories::{MockAttemptRepository, MockQuizRepository},
    };
    use chrono::Utc;

    fn quiz(id: &str, is_active: bool) -> Quiz {
        Quiz {
            id: id.to_string(),
            title: format!("Quiz {}", id),
            subject: "History".to_string(),
            description: String::new(),
            duration_minutes: 10,
            instructions: String::new(),
            is_active,
            randomize_questions: false,
            randomize_options: false,
            created_by: "admin-1".to_string(),
            class_label: "7A".to_string(),
            created_at: None,
        }
    }

    fn submitted(quiz_id: &str, score: i32, total_points: i32) -> Attempt {
        let mut attempt = Attempt::start(quiz_id, "student-1");
        attempt.apply_submission(&AttemptSubmission {
            submitted_at: Utc::now(),
            score,
            total_points,
            elapsed_seconds: 60,
            reason: SubmitReason::Manual,
        });
        attempt
    }

    #[test]
    fn test_stats_ignore_unsubmitted_attempts() {
        let attempts = vec![
            submitted("q", 2, 3),
            submitted("q", 3, 3),
            Attempt::start("q", "student-2"),
        ];

        let stats = quiz_stats(&quiz("q", true), &attempts);

        assert_eq!(stats.attempt_count, 2);
        assert_eq!(stats.average_percentage, 83.3);
        assert_eq!(stats.max_percentage, 100.0);
    }

    #[test]
    fn test_stats_without_attempts() {
        let stats = quiz_stats(&quiz("q", true), &[]);
        assert_eq!(stats.attempt_count, 0);
        assert_eq!(stats.average_percentage, 0.0);
        assert_eq!(stats.max_percentage, 0.0);
    }

    #[test]
    fn test_zero_point_quiz_counts_as_zero_percent() {
        let stats = quiz_stats(&quiz("q", true), &[submitted("q", 0, 0)]);
        assert_eq!(stats.attempt_count, 1);
        assert_eq!(stats.max_percentage, 0.0);
    }

    #[tokio::test]
    async fn test_admin_dashboard_totals() {
        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_list_by_owner()
            .returning(|_| Ok(vec![quiz("a", true), quiz("b", false)]));

        let mut attempts = MockAttemptRepository::new();
        attempts.expect_list_submitted_by_quiz().returning(|quiz_id| {
            Ok(match quiz_id {
                "a" => vec![submitted("a", 1, 2), submitted("a", 2, 2)],
                _ => vec![],
            })
        });

        let service = StatsService::new(Arc::new(quizzes), Arc::new(attempts));
        let dashboard = service
            .admin_dashboard(&RequestContext::admin("admin-1"))
            .await
            .unwrap();

        assert_eq!(dashboard.quiz_count, 2);
        assert_eq!(dashboard.active_quiz_count, 1);
        assert_eq!(dashboard.submitted_attempt_count, 2);
        assert_eq!(dashboard.quizzes[0].average_percentage, 75.0);
    }

    #[tokio::test]
    async fn test_student_cannot_open_admin_dashboard() {
        let service = StatsService::new(
            Arc::new(MockQuizRepository::new()),
            Arc::new(MockAttemptRepository::new()),
        );
        let result = service
            .admin_dashboard(&RequestContext::student("student-1", "7A"))
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_student_dashboard() {
        let mut quizzes = MockQuizRepository::new();
        quizzes
            .expect_list_active_by_class()
            .returning(|_| Ok(vec![quiz("a", true), quiz("b", true)]));

        let mut attempts = MockAttemptRepository::new();
        attempts.expect_list_by_student().returning(|_| {
            Ok(vec![
                submitted("a", 2, 3),
                Attempt::start("b", "student-1"),
                submitted("b", 1, 1),
            ])
        });

        let service = StatsService::new(Arc::new(quizzes), Arc::new(attempts));
        let dashboard = service
            .student_dashboard(&RequestContext::student("student-1", "7A"))
            .await
            .unwrap();

        assert_eq!(dashboard.available_quiz_count, 2);
        assert_eq!(dashboard.completed_attempt_count, 2);
        assert_eq!(dashboard.average_percentage, 83.3);
        assert_eq!(dashboard.best_percentage, 100.0);
        assert_eq!(dashboard.recent_attempts[0].quiz_title, "Quiz a");
    }
}
