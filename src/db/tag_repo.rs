use crate::models::Tag;
use sqlx::{PgPool, Postgres, Transaction};

/// Load the full tag catalog, ordered by ID for stable presentation.
pub async fn load_tags(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
    let tags = sqlx::query_as::<_, Tag>(
        r#"
        SELECT id, label
        FROM tags
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(tags)
}

/// Tag IDs currently associated with a post.
pub async fn get_post_tag_ids(pool: &PgPool, post_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (i64,)>(
        r#"
        SELECT tag_id
        FROM post_tags
        WHERE post_id = $1
        ORDER BY tag_id
        "#,
    )
    .bind(post_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|(id,)| id).collect())
}

/// Insert one association row per tag ID. The primary key on
/// (post_id, tag_id) gives the association set semantics; repeated IDs in a
/// submission collapse via ON CONFLICT.
pub async fn insert_post_tags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
    tag_ids: &[i64],
) -> Result<(), sqlx::Error> {
    for tag_id in tag_ids {
        sqlx::query(
            r#"
            INSERT INTO post_tags (post_id, tag_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

/// Delete every association for a post (the replace-all path).
pub async fn delete_post_tags(
    tx: &mut Transaction<'_, Postgres>,
    post_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        DELETE FROM post_tags
        WHERE post_id = $1
        "#,
    )
    .bind(post_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}
