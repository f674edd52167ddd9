use std::{collections::HashMap, sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{sync::RwLock, task::JoinHandle};

use crate::{
    auth::{require_quiz_visible, RequestContext},
    errors::{AppError, AppResult},
    models::{
        domain::{Attempt, AttemptSubmission, DeliveryState, Question, Quiz, SubmitReason},
        dto::response::{
            DeliveredQuestion, DeliveryStatus, LoadedQuiz, QuizSummary, SubmissionOutcome,
        },
    },
    repositories::{AttemptRepository, QuizRepository},
    services::{
        countdown::{Countdown, TICK},
        grading::grade_attempt,
        shuffle,
    },
};

/// How long a session whose submission failed waits for a manual retry before
/// it is dropped. The stored attempt keeps no submit time.
pub const FAILED_SESSION_GRACE: Duration = Duration::from_secs(15 * 60);

struct DeliverySession {
    attempt: Attempt,
    quiz: Quiz,
    questions: Vec<Question>,
    answers: HashMap<String, String>,
    countdown: Countdown,
    state: DeliveryState,
    reason: Option<SubmitReason>,
    failures: u32,
    timer: Option<JoinHandle<()>>,
}

impl DeliverySession {
    fn new(attempt: Attempt, quiz: Quiz, questions: Vec<Question>) -> Self {
        let countdown = Countdown::new(quiz.duration_seconds());
        Self {
            attempt,
            quiz,
            questions,
            answers: HashMap::new(),
            countdown,
            state: DeliveryState::Loading,
            reason: None,
            failures: 0,
            timer: None,
        }
    }

    fn require_student(&self, ctx: &RequestContext) -> AppResult<()> {
        if self.attempt.student_id != ctx.user_id {
            return Err(AppError::Forbidden(
                "This attempt belongs to another student".to_string(),
            ));
        }
        Ok(())
    }

    fn loaded(&self) -> LoadedQuiz {
        LoadedQuiz {
            attempt_id: self.attempt.id.clone(),
            quiz: QuizSummary::from(&self.quiz),
            questions: self.questions.iter().map(DeliveredQuestion::from).collect(),
            duration_seconds: self.countdown.duration_seconds(),
            remaining_seconds: self.countdown.remaining_seconds(),
        }
    }

    fn status(&self) -> DeliveryStatus {
        DeliveryStatus {
            attempt_id: self.attempt.id.clone(),
            state: self.state,
            remaining_seconds: self.countdown.remaining_seconds(),
            answered_count: self.answers.len() as i32,
            reason: self.reason,
            notice: None,
        }
    }
}

/// Serves quizzes to students: builds the question sequence, runs the
/// countdown, captures answers and grades the attempt on submission.
#[derive(Clone)]
pub struct DeliveryService {
    quizzes: Arc<dyn QuizRepository>,
    attempts: Arc<dyn AttemptRepository>,
    sessions: Arc<RwLock<HashMap<String, DeliverySession>>>,
}

impl DeliveryService {
    pub fn new(quizzes: Arc<dyn QuizRepository>, attempts: Arc<dyn AttemptRepository>) -> Self {
        Self {
            quizzes,
            attempts,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Loads the quiz, creates the attempt row and starts the countdown.
    pub async fn load_quiz(&self, ctx: &RequestContext, quiz_id: &str) -> AppResult<LoadedQuiz> {
        let quiz = self
            .quizzes
            .find_by_id(quiz_id)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch quiz {}: {}", quiz_id, e);
                e
            })?
            .ok_or_else(|| AppError::NotFound(format!("Quiz with id '{}' not found", quiz_id)))?;

        require_quiz_visible(ctx, &quiz)?;

        let questions = self.quizzes.find_questions(&quiz.id).await.map_err(|e| {
            log::error!("Failed to fetch questions for quiz {}: {}", quiz.id, e);
            e
        })?;

        if questions.is_empty() {
            return Err(AppError::ValidationError(
                "Quiz has no questions".to_string(),
            ));
        }

        let questions = {
            let mut rng = rand::thread_rng();
            shuffle::materialize(&quiz, questions, &mut rng)
        };

        let attempt = self
            .attempts
            .create(Attempt::start(&quiz.id, &ctx.user_id))
            .await
            .map_err(|e| {
                log::error!("Failed to create attempt for quiz {}: {}", quiz.id, e);
                e
            })?;

        let attempt_id = attempt.id.clone();
        let mut session = DeliverySession::new(attempt, quiz, questions);
        session.state = DeliveryState::InProgress;
        let loaded = session.loaded();

        self.sessions
            .write()
            .await
            .insert(attempt_id.clone(), session);

        let timer = self.spawn_countdown(attempt_id.clone());
        if let Some(session) = self.sessions.write().await.get_mut(&attempt_id) {
            session.timer = Some(timer);
        }

        log::info!(
            "Attempt {} started on quiz {} by {} ({} questions, {}s)",
            attempt_id,
            loaded.quiz.id,
            ctx.user_id,
            loaded.questions.len(),
            loaded.duration_seconds
        );

        Ok(loaded)
    }

    /// Stores or overwrites the answer for one question. Nothing is persisted
    /// until submission.
    pub async fn record_answer(
        &self,
        ctx: &RequestContext,
        attempt_id: &str,
        question_id: &str,
        answer: &str,
    ) -> AppResult<DeliveryStatus> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(attempt_id)
            .ok_or_else(|| no_session(attempt_id))?;

        session.require_student(ctx)?;

        if session.state != DeliveryState::InProgress {
            return Err(AppError::Conflict(
                "This attempt is no longer accepting answers".to_string(),
            ));
        }

        if !session.questions.iter().any(|q| q.id == question_id) {
            return Err(AppError::NotFound(format!(
                "Question '{}' is not part of this attempt",
                question_id
            )));
        }

        session
            .answers
            .insert(question_id.to_string(), answer.to_string());

        Ok(session.status())
    }

    /// Grades and persists the attempt.
    ///
    /// A `Timeout` reason is only accepted once the countdown has run out.
    pub async fn submit(
        &self,
        ctx: &RequestContext,
        attempt_id: &str,
        reason: SubmitReason,
    ) -> AppResult<SubmissionOutcome> {
        self.submit_attempt(attempt_id, Some(ctx), reason)
            .await
            .map_err(|e| {
                if matches!(e, AppError::Conflict(_) | AppError::BadRequest(_)) {
                    log::warn!("Rejected submission of attempt {}: {}", attempt_id, e);
                }
                e
            })
    }

    pub async fn delivery_status(
        &self,
        ctx: &RequestContext,
        attempt_id: &str,
    ) -> AppResult<DeliveryStatus> {
        if let Some(session) = self.sessions.read().await.get(attempt_id) {
            session.require_student(ctx)?;
            return Ok(session.status());
        }

        let attempt = self
            .attempts
            .find_by_id(attempt_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Attempt '{}' not found", attempt_id)))?;

        if attempt.student_id != ctx.user_id {
            return Err(AppError::Forbidden(
                "This attempt belongs to another student".to_string(),
            ));
        }

        let state = if attempt.is_submitted() {
            DeliveryState::Submitted
        } else {
            DeliveryState::Abandoned
        };

        Ok(DeliveryStatus {
            attempt_id: attempt.id,
            state,
            remaining_seconds: 0,
            answered_count: 0,
            reason: attempt.submit_reason,
            notice: attempt.submit_reason.map(|r| r.notice().to_string()),
        })
    }

    /// Tears the session down without submitting. The stored attempt keeps no
    /// submit time.
    pub async fn abandon(&self, ctx: &RequestContext, attempt_id: &str) -> AppResult<()> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get(attempt_id)
            .ok_or_else(|| no_session(attempt_id))?;

        session.require_student(ctx)?;

        if session.state == DeliveryState::Submitting {
            return Err(AppError::Conflict(
                "The attempt is being submitted".to_string(),
            ));
        }

        if let Some(mut session) = sessions.remove(attempt_id) {
            if let Some(timer) = session.timer.take() {
                timer.abort();
            }
        }

        log::info!("Attempt {} abandoned by {}", attempt_id, ctx.user_id);
        Ok(())
    }

    pub async fn active_session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn spawn_countdown(&self, attempt_id: String) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move { service.run_countdown(attempt_id).await })
    }

    async fn run_countdown(&self, attempt_id: String) {
        let mut interval = tokio::time::interval(TICK);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;

            let expired = {
                let mut sessions = self.sessions.write().await;
                let Some(session) = sessions.get_mut(&attempt_id) else {
                    return;
                };
                if session.state != DeliveryState::InProgress {
                    return;
                }
                session.countdown.tick()
            };

            if expired {
                log::info!("Time is up for attempt {}", attempt_id);
                if let Err(err) = self
                    .submit_attempt(&attempt_id, None, SubmitReason::Timeout)
                    .await
                {
                    log::error!("Automatic submission of attempt {} failed: {}", attempt_id, err);
                }
                return;
            }
        }
    }

    fn spawn_failed_expiry(&self, attempt_id: String, failure: u32) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move { service.expire_failed_session(attempt_id, failure).await })
    }

    /// Drops the session if it is still in the same failed state once the grace
    /// period has passed.
    async fn expire_failed_session(&self, attempt_id: String, failure: u32) {
        tokio::time::sleep(FAILED_SESSION_GRACE).await;

        let mut sessions = self.sessions.write().await;
        let lapsed = sessions
            .get(&attempt_id)
            .is_some_and(|s| s.state == DeliveryState::Failed && s.failures == failure);

        if lapsed {
            sessions.remove(&attempt_id);
            log::warn!(
                "Dropped attempt {} after its submission failed and was not retried",
                attempt_id
            );
        }
    }

    async fn submit_attempt(
        &self,
        attempt_id: &str,
        caller: Option<&RequestContext>,
        reason: SubmitReason,
    ) -> AppResult<SubmissionOutcome> {
        let (questions, answers, elapsed_seconds) = {
            let mut sessions = self.sessions.write().await;
            let session = sessions
                .get_mut(attempt_id)
                .ok_or_else(|| no_session(attempt_id))?;

            if let Some(ctx) = caller {
                session.require_student(ctx)?;
            }

            match session.state {
                DeliveryState::InProgress | DeliveryState::Failed => {}
                DeliveryState::Submitting => {
                    return Err(AppError::Conflict(
                        "A submission for this attempt is already in progress".to_string(),
                    ))
                }
                DeliveryState::Submitted => {
                    return Err(AppError::Conflict(
                        "This attempt was already submitted".to_string(),
                    ))
                }
                DeliveryState::Loading | DeliveryState::Abandoned => {
                    return Err(AppError::Conflict(
                        "This attempt is not in progress".to_string(),
                    ))
                }
            }

            if reason == SubmitReason::Timeout && !session.countdown.is_expired() {
                return Err(AppError::BadRequest(
                    "Time has not run out for this attempt".to_string(),
                ));
            }

            session.state = DeliveryState::Submitting;
            session.reason = Some(reason);

            // The countdown task only exits at its next tick; stop it now
            // unless it is the caller.
            if reason == SubmitReason::Manual {
                if let Some(timer) = session.timer.take() {
                    timer.abort();
                }
            }

            (
                session.questions.clone(),
                session.answers.clone(),
                session.countdown.elapsed_seconds(),
            )
        };

        let graded = grade_attempt(&questions, &answers);
        let submitted_at = Utc::now();
        let rows = graded.to_student_answers(attempt_id, submitted_at);
        let submission = AttemptSubmission {
            submitted_at,
            score: graded.score,
            total_points: graded.total_points,
            elapsed_seconds,
            reason,
        };

        match self.attempts.finalize(attempt_id, submission, rows).await {
            Ok(attempt) => {
                self.sessions.write().await.remove(attempt_id);
                log::info!(
                    "Attempt {} submitted ({:?}): {}/{}",
                    attempt_id,
                    reason,
                    attempt.score,
                    attempt.total_points
                );
                Ok(SubmissionOutcome::new(&attempt, reason))
            }
            Err(err) => {
                log::error!("Failed to submit attempt {}: {}", attempt_id, err);
                if let Some(session) = self.sessions.write().await.get_mut(attempt_id) {
                    session.state = DeliveryState::Failed;
                    session.failures += 1;
                    // Replaces the countdown handle, which has finished or been aborted.
                    session.timer =
                        Some(self.spawn_failed_expiry(attempt_id.to_string(), session.failures));
                }
                Err(err)
            }
        }
    }
}

fn no_session(attempt_id: &str) -> AppError {
    AppError::NotFound(format!("No quiz in progress for attempt '{}'", attempt_id))
}
