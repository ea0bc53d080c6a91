/// Data models for the forum content service
///
/// - `Post`: top-level authored content with optional media and a tag set
/// - `Comment`: reply content attached to a post
/// - `Tag`: catalog entry; posts associate with tags many-to-many
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Post {
    pub id: i64,
    /// Owning user; immutable after creation.
    pub username: String,
    pub title: String,
    pub description: String,
    pub image_filename: Option<String>,
    pub video_filename: Option<String>,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub time_edited: Option<DateTime<Utc>>,
    pub likes: i32,
    pub dislikes: i32,
    pub approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub username: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub edited: bool,
    pub time_edited: Option<DateTime<Utc>>,
    pub likes: i32,
    pub dislikes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Tag {
    pub id: i64,
    pub label: String,
}

/// Post detail as returned to clients: the row plus its tag associations.
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    pub tag_ids: Vec<i64>,
}

/// Ephemeral view-model returned when an authoring submission is rejected
/// with recoverable input. Echoes the submitted field values so the client
/// can re-render the form without losing user effort. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormRejection {
    pub error: bool,
    pub message: String,
    pub title: String,
    pub description: String,
    pub tag_ids: Vec<i64>,
    /// Original filename of a rejected upload, when the failure class echoes
    /// it (oversized media and storage failures do; unsupported formats do
    /// not).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// The post being edited, when the rejection arose on the edit path.
    /// Lets the client re-render the edit view without a second fetch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

impl FormRejection {
    pub fn with_fields(
        message: impl Into<String>,
        title: &str,
        description: &str,
        tag_ids: &[i64],
    ) -> Self {
        Self {
            error: true,
            message: message.into(),
            title: title.to_string(),
            description: description.to_string(),
            tag_ids: tag_ids.to_vec(),
            filename: None,
            post: None,
        }
    }
}
