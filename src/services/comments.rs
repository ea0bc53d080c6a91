/// Comment mutation service - fetch-then-mutate editing of a single
/// comment field. Ownership is enforced by the calling handler against the
/// fetched row before `edit_comment` runs.
use crate::db::comment_repo;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::Comment;
use sqlx::PgPool;

pub struct CommentService {
    pool: PgPool,
}

impl CommentService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a comment by ID
    pub async fn get_comment(&self, comment_id: i64) -> Result<Option<Comment>> {
        let comment = comment_repo::find_comment_by_id(&self.pool, comment_id).await?;
        Ok(comment)
    }

    /// Replace the comment content, stamping the edited flag and timestamp.
    ///
    /// No diffing: the update fires even when the content is unchanged. All
    /// three fields are written by a single statement, so there is no
    /// partial-update state.
    pub async fn edit_comment(&self, comment_id: i64, content: &str) -> Result<Comment> {
        let updated = comment_repo::update_comment_content(&self.pool, comment_id, content).await?;
        if !updated {
            return Err(AppError::NotFound(format!("comment {comment_id} not found")));
        }

        metrics::record_comment_edited();

        let comment = comment_repo::find_comment_by_id(&self.pool, comment_id)
            .await?
            .ok_or_else(|| AppError::Internal("comment vanished during edit".to_string()))?;

        Ok(comment)
    }
}
