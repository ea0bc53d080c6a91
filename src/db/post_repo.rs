use crate::models::Post;
use sqlx::{PgPool, Postgres, Transaction};
use std::collections::HashSet;

const POST_COLUMNS: &str = "id, username, title, description, image_filename, video_filename, \
                            created_at, edited, time_edited, likes, dislikes, approved";

/// Insert a new post row. Runs inside the caller's transaction so the tag
/// associations inserted afterwards commit atomically with the row.
pub async fn insert_post(
    tx: &mut Transaction<'_, Postgres>,
    username: &str,
    title: &str,
    description: &str,
    image_filename: Option<&str>,
    video_filename: Option<&str>,
    approved: bool,
) -> Result<Post, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        INSERT INTO posts (username, title, description, image_filename, video_filename, approved)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING {POST_COLUMNS}
        "#
    ))
    .bind(username)
    .bind(title)
    .bind(description)
    .bind(image_filename)
    .bind(video_filename)
    .bind(approved)
    .fetch_one(&mut **tx)
    .await?;

    Ok(post)
}

/// Find a post by ID
pub async fn find_post_by_id(pool: &PgPool, post_id: i64) -> Result<Option<Post>, sqlx::Error> {
    let post = sqlx::query_as::<_, Post>(&format!(
        r#"
        SELECT {POST_COLUMNS}
        FROM posts
        WHERE id = $1
        "#
    ))
    .bind(post_id)
    .fetch_optional(pool)
    .await?;

    Ok(post)
}

/// Update title and description, stamping `edited`/`time_edited` together.
///
/// The ownership predicate on the UPDATE itself re-checks the owner at the
/// statement level; zero rows affected means the caller must not mutate.
pub async fn update_post_content(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    username: &str,
    title: &str,
    description: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE posts
        SET title = $1, description = $2, edited = TRUE, time_edited = NOW()
        WHERE id = $3 AND username = $4
        "#,
    )
    .bind(title)
    .bind(description)
    .bind(post_id)
    .bind(username)
    .execute(&mut **tx)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Overwrite the stored image filename. The previous file stays on disk
/// until the orphan sweep reclaims it.
pub async fn update_post_image(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    image_filename: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE posts
        SET image_filename = $1
        WHERE id = $2
        "#,
    )
    .bind(image_filename)
    .bind(post_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Overwrite the stored video filename.
pub async fn update_post_video(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    video_filename: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE posts
        SET video_filename = $1
        WHERE id = $2
        "#,
    )
    .bind(video_filename)
    .bind(post_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// Every media filename referenced by any post row. Used by the orphan
/// sweep to decide which stored files are still live.
pub async fn referenced_media_filenames(pool: &PgPool) -> Result<HashSet<String>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (Option<String>, Option<String>)>(
        r#"
        SELECT image_filename, video_filename
        FROM posts
        WHERE image_filename IS NOT NULL OR video_filename IS NOT NULL
        "#,
    )
    .fetch_all(pool)
    .await?;

    let mut filenames = HashSet::new();
    for (image, video) in rows {
        if let Some(name) = image {
            filenames.insert(name);
        }
        if let Some(name) = video {
            filenames.insert(name);
        }
    }

    Ok(filenames)
}
