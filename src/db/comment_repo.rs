use crate::models::Comment;
use sqlx::PgPool;

const COMMENT_COLUMNS: &str =
    "id, post_id, username, content, created_at, edited, time_edited, likes, dislikes";

/// Find a comment by ID
pub async fn find_comment_by_id(
    pool: &PgPool,
    comment_id: i64,
) -> Result<Option<Comment>, sqlx::Error> {
    let comment = sqlx::query_as::<_, Comment>(&format!(
        r#"
        SELECT {COMMENT_COLUMNS}
        FROM comments
        WHERE id = $1
        "#
    ))
    .bind(comment_id)
    .fetch_optional(pool)
    .await?;

    Ok(comment)
}

/// Replace the comment content, stamping `edited`/`time_edited` together in
/// the same statement. Fires even when the content is unchanged.
pub async fn update_comment_content(
    pool: &PgPool,
    comment_id: i64,
    content: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE comments
        SET content = $1, edited = TRUE, time_edited = NOW()
        WHERE id = $2
        "#,
    )
    .bind(content)
    .bind(comment_id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
