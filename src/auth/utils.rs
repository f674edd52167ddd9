use async_graphql::Context;

use crate::{
    auth::RequestContext,
    errors::{AppError, AppResult},
    models::domain::{Attempt, Quiz},
};

pub fn require_admin(ctx: &RequestContext) -> AppResult<()> {
    if !ctx.is_admin() {
        return Err(AppError::Forbidden(
            "Only admins can perform this action".to_string(),
        ));
    }
    Ok(())
}

pub fn require_quiz_owner(ctx: &RequestContext, quiz: &Quiz) -> AppResult<()> {
    require_admin(ctx)?;
    if quiz.created_by != ctx.user_id {
        return Err(AppError::Forbidden(
            "You can only manage quizzes you created".to_string(),
        ));
    }
    Ok(())
}

/// Owners always see their quizzes; students see active quizzes of their class.
pub fn can_view_quiz(ctx: &RequestContext, quiz: &Quiz) -> bool {
    if ctx.is_admin() {
        return quiz.created_by == ctx.user_id;
    }
    quiz.is_active && quiz.class_label == ctx.class_label
}

pub fn require_quiz_visible(ctx: &RequestContext, quiz: &Quiz) -> AppResult<()> {
    if !can_view_quiz(ctx, quiz) {
        return Err(AppError::Forbidden(
            "This quiz is not available to you".to_string(),
        ));
    }
    Ok(())
}

/// Attempts are visible to the student who made them and the quiz owner.
pub fn can_view_attempt(ctx: &RequestContext, attempt: &Attempt, quiz: &Quiz) -> AppResult<()> {
    let is_student_owner = attempt.student_id == ctx.user_id;
    let is_quiz_owner = ctx.is_admin() && quiz.created_by == ctx.user_id;

    if !is_student_owner && !is_quiz_owner {
        return Err(AppError::Forbidden(
            "You can only view your own attempts".to_string(),
        ));
    }
    Ok(())
}

pub fn extract_request_context(ctx: &Context<'_>) -> AppResult<RequestContext> {
    ctx.data::<RequestContext>()
        .cloned()
        .map_err(|_| AppError::Unauthorized("Authentication required".to_string()))
}
