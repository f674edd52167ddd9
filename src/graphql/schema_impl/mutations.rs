use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::{
    app_state::AppState,
    auth::extract_request_context,
    models::{
        domain::{Quiz, SubmitReason},
        dto::{
            request::{CreateQuizInput, RecordAnswerInput},
            response::{
                DeliveryStatus, LoadedQuiz, MessageResponse, QuizWithQuestions, SubmissionOutcome,
            },
        },
    },
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn publish_quiz(
        &self,
        ctx: &Context<'_>,
        input: CreateQuizInput,
    ) -> Result<QuizWithQuestions> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.authoring_service.publish(&caller, input).await.extend()
    }

    async fn set_quiz_active(
        &self,
        ctx: &Context<'_>,
        quiz_id: ID,
        is_active: bool,
    ) -> Result<Quiz> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state
            .quiz_service
            .set_active(&caller, &quiz_id, is_active)
            .await
            .extend()
    }

    async fn delete_quiz(&self, ctx: &Context<'_>, quiz_id: ID) -> Result<MessageResponse> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.quiz_service.delete(&caller, &quiz_id).await.extend()?;

        Ok(MessageResponse {
            message: format!("Quiz '{}' deleted", quiz_id.as_str()),
        })
    }

    /// Starts a new attempt and returns the questions in delivery order.
    async fn start_quiz(&self, ctx: &Context<'_>, quiz_id: ID) -> Result<LoadedQuiz> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state
            .delivery_service
            .load_quiz(&caller, &quiz_id)
            .await
            .extend()
    }

    async fn record_answer(
        &self,
        ctx: &Context<'_>,
        input: RecordAnswerInput,
    ) -> Result<DeliveryStatus> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state
            .delivery_service
            .record_answer(&caller, &input.attempt_id, &input.question_id, &input.answer)
            .await
            .extend()
    }

    async fn submit_attempt(
        &self,
        ctx: &Context<'_>,
        attempt_id: ID,
        #[graphql(default_with = "SubmitReason::Manual")] reason: SubmitReason,
    ) -> Result<SubmissionOutcome> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state
            .delivery_service
            .submit(&caller, &attempt_id, reason)
            .await
            .extend()
    }

    async fn abandon_attempt(&self, ctx: &Context<'_>, attempt_id: ID) -> Result<MessageResponse> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state
            .delivery_service
            .abandon(&caller, &attempt_id)
            .await
            .extend()?;

        Ok(MessageResponse {
            message: "Attempt abandoned".to_string(),
        })
    }
}
