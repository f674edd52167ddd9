use async_graphql::{Context, Object, Result, ResultExt, ID};

use crate::{
    app_state::AppState,
    auth::extract_request_context,
    models::{
        domain::Quiz,
        dto::response::{
            AdminDashboard, AttemptResult, AttemptSummary, DeliveryStatus, ProfileDto,
            QuizStats, QuizSummary, QuizWithQuestions, StudentDashboard,
        },
    },
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> Result<ProfileDto> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.profile_service.me(&caller).await.extend()
    }

    /// Quizzes the caller may see: active quizzes of a student's class, or an
    /// admin's own quizzes.
    async fn quizzes(&self, ctx: &Context<'_>) -> Result<Vec<QuizSummary>> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.quiz_service.list_for(&caller).await.extend()
    }

    async fn my_quizzes(&self, ctx: &Context<'_>) -> Result<Vec<Quiz>> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.quiz_service.list_owned(&caller).await.extend()
    }

    async fn quiz_with_answers(&self, ctx: &Context<'_>, id: ID) -> Result<QuizWithQuestions> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.quiz_service.quiz_with_answers(&caller, &id).await.extend()
    }

    async fn delivery_status(&self, ctx: &Context<'_>, attempt_id: ID) -> Result<DeliveryStatus> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state
            .delivery_service
            .delivery_status(&caller, &attempt_id)
            .await
            .extend()
    }

    async fn attempt_result(&self, ctx: &Context<'_>, attempt_id: ID) -> Result<AttemptResult> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state
            .results_service
            .attempt_result(&caller, &attempt_id)
            .await
            .extend()
    }

    async fn my_attempts(&self, ctx: &Context<'_>) -> Result<Vec<AttemptSummary>> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.results_service.my_attempts(&caller).await.extend()
    }

    async fn quiz_stats(&self, ctx: &Context<'_>, quiz_id: ID) -> Result<QuizStats> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.stats_service.stats_for_quiz(&caller, &quiz_id).await.extend()
    }

    async fn admin_dashboard(&self, ctx: &Context<'_>) -> Result<AdminDashboard> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.stats_service.admin_dashboard(&caller).await.extend()
    }

    async fn student_dashboard(&self, ctx: &Context<'_>) -> Result<StudentDashboard> {
        let state = ctx.data::<AppState>()?;
        let caller = extract_request_context(ctx).extend()?;

        state.stats_service.student_dashboard(&caller).await.extend()
    }
}
