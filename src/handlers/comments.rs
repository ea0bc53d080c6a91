/// Comment handlers - HTTP endpoints for comment editing
use crate::error::{AppError, Result};
use crate::middleware::CurrentUser;
use crate::services::CommentService;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;

/// Request body for editing a comment
#[derive(Debug, Deserialize)]
pub struct EditCommentRequest {
    pub content: String,
}

/// Edit a comment.
///
/// The handler fetches the existing row and enforces ownership against the
/// session user before invoking the mutation.
pub async fn edit_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<i64>,
    user: CurrentUser,
    req: web::Json<EditCommentRequest>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());

    let existing = service
        .get_comment(*comment_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {comment_id} not found")))?;

    if existing.username != user.username {
        return Err(AppError::Unauthorized(
            "you are not allowed to edit other users' comments".to_string(),
        ));
    }

    let comment = service.edit_comment(*comment_id, &req.content).await?;
    tracing::info!(comment_id = comment.id, username = %user.username, "comment edited");

    Ok(HttpResponse::Ok().json(comment))
}

/// Get a single comment
pub async fn get_comment(
    pool: web::Data<PgPool>,
    comment_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = CommentService::new((**pool).clone());
    match service.get_comment(*comment_id).await? {
        Some(comment) => Ok(HttpResponse::Ok().json(comment)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}
