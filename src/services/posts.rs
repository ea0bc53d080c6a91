/// Post mutation service - orchestrates validation, media intake,
/// moderation gating, and persistence for post creation and edit.
use crate::db::{post_repo, tag_repo};
use crate::error::AppError;
use crate::handlers::forms::SubmittedContent;
use crate::media::{MediaClass, MediaError, MediaStore};
use crate::metrics;
use crate::models::{FormRejection, Post, PostDetail};
use crate::services::tags::{reconcile, TagDecision};
use sqlx::PgPool;

/// Moderation gating, injected at construction from configuration.
#[derive(Debug, Clone, Copy)]
pub struct ModerationPolicy {
    approval_required: bool,
}

impl ModerationPolicy {
    pub fn new(approval_required: bool) -> Self {
        Self { approval_required }
    }

    /// Whether a new post from a user with the given privilege level is
    /// approved on insert. Elevated users bypass gating entirely.
    pub fn approves(&self, privilege_level: i32) -> bool {
        if privilege_level > 0 {
            true
        } else {
            !self.approval_required
        }
    }
}

/// Failure surface of post mutations: either a recoverable rejection that
/// echoes the submitted input, or a terse application error.
#[derive(Debug)]
pub enum PostMutationError {
    Rejected(Box<FormRejection>),
    App(AppError),
}

impl From<AppError> for PostMutationError {
    fn from(err: AppError) -> Self {
        PostMutationError::App(err)
    }
}

impl From<sqlx::Error> for PostMutationError {
    fn from(err: sqlx::Error) -> Self {
        PostMutationError::App(err.into())
    }
}

pub struct PostService {
    pool: PgPool,
    store: MediaStore,
    moderation: ModerationPolicy,
}

impl PostService {
    pub fn new(pool: PgPool, store: MediaStore, moderation: ModerationPolicy) -> Self {
        Self {
            pool,
            store,
            moderation,
        }
    }

    /// Get a post with its tag associations.
    pub async fn get_post(&self, post_id: i64) -> crate::error::Result<Option<PostDetail>> {
        let Some(post) = post_repo::find_post_by_id(&self.pool, post_id).await? else {
            return Ok(None);
        };
        let tag_ids = tag_repo::get_post_tag_ids(&self.pool, post_id).await?;

        Ok(Some(PostDetail { post, tag_ids }))
    }

    /// Create a new post.
    ///
    /// Field validation runs first, then image and video intake; each
    /// failure aborts before any row is written, echoing the submitted
    /// fields. The row and its tag associations commit in one transaction;
    /// if that fails, the media files written moments earlier are removed
    /// best-effort (the orphan sweep covers the crash window).
    pub async fn create_post(
        &self,
        username: &str,
        privilege_level: i32,
        content: SubmittedContent,
    ) -> Result<PostDetail, PostMutationError> {
        content
            .validate_required()
            .map_err(|r| PostMutationError::Rejected(Box::new(r)))?;

        let image_filename = self.intake(&content, MediaClass::Image)?;
        let video_filename = match self.intake(&content, MediaClass::Video) {
            Ok(name) => name,
            Err(err) => {
                self.remove_stored(MediaClass::Image, image_filename.as_deref());
                return Err(err);
            }
        };

        let approved = self.moderation.approves(privilege_level);

        let result = self
            .persist_create(
                username,
                &content,
                image_filename.as_deref(),
                video_filename.as_deref(),
                approved,
            )
            .await;

        match result {
            Ok(detail) => {
                metrics::record_post_created(approved);
                Ok(detail)
            }
            Err(err) => {
                self.remove_stored(MediaClass::Image, image_filename.as_deref());
                self.remove_stored(MediaClass::Video, video_filename.as_deref());
                Err(err.into())
            }
        }
    }

    async fn persist_create(
        &self,
        username: &str,
        content: &SubmittedContent,
        image_filename: Option<&str>,
        video_filename: Option<&str>,
        approved: bool,
    ) -> Result<PostDetail, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let post = post_repo::insert_post(
            &mut tx,
            username,
            &content.title,
            &content.description,
            image_filename,
            video_filename,
            approved,
        )
        .await?;

        tag_repo::insert_post_tags(&mut tx, post.id, &content.tag_ids).await?;

        tx.commit().await?;

        Ok(PostDetail {
            tag_ids: content.tag_ids.clone(),
            post,
        })
    }

    /// Edit an existing post.
    ///
    /// Ownership is checked against the fetched row before any write, and
    /// re-checked by the UPDATE's own predicate. Title, description and the
    /// edited stamp are always written; media filename columns only when a
    /// new file was stored; tag associations only when the reconciler says
    /// the sets differ. All statements share one transaction.
    pub async fn edit_post(
        &self,
        username: &str,
        post_id: i64,
        content: SubmittedContent,
    ) -> Result<PostDetail, PostMutationError> {
        content
            .validate_required()
            .map_err(|r| PostMutationError::Rejected(Box::new(r)))?;

        let existing = post_repo::find_post_by_id(&self.pool, post_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("post {post_id} not found")))?;

        if existing.username != username {
            return Err(AppError::Unauthorized(
                "you are not allowed to edit other users' posts".to_string(),
            )
            .into());
        }

        // Media rejections on the edit path carry the fetched post so the
        // client can re-render the edit view without a second fetch.
        let image_filename = match self.intake(&content, MediaClass::Image) {
            Ok(name) => name,
            Err(err) => return Err(Self::with_post_context(err, &existing)),
        };
        let video_filename = match self.intake(&content, MediaClass::Video) {
            Ok(name) => name,
            Err(err) => {
                self.remove_stored(MediaClass::Image, image_filename.as_deref());
                return Err(Self::with_post_context(err, &existing));
            }
        };

        let existing_tags = tag_repo::get_post_tag_ids(&self.pool, post_id)
            .await
            .map_err(AppError::from)?;

        let result = self
            .persist_edit(
                username,
                post_id,
                &content,
                image_filename.as_deref(),
                video_filename.as_deref(),
                &existing_tags,
            )
            .await;

        match result {
            Ok(()) => {}
            Err(err) => {
                self.remove_stored(MediaClass::Image, image_filename.as_deref());
                self.remove_stored(MediaClass::Video, video_filename.as_deref());
                return Err(err);
            }
        }

        metrics::record_post_edited();

        let detail = self
            .get_post(post_id)
            .await?
            .ok_or_else(|| AppError::Internal("post vanished during edit".to_string()))?;

        Ok(detail)
    }

    async fn persist_edit(
        &self,
        username: &str,
        post_id: i64,
        content: &SubmittedContent,
        image_filename: Option<&str>,
        video_filename: Option<&str>,
        existing_tags: &[i64],
    ) -> Result<(), PostMutationError> {
        let mut tx = self.pool.begin().await.map_err(AppError::from)?;

        let updated = post_repo::update_post_content(
            &mut tx,
            post_id,
            username,
            &content.title,
            &content.description,
        )
        .await
        .map_err(AppError::from)?;

        if !updated {
            // Row changed hands (or disappeared) between the read and this
            // statement; the predicate saw a different owner.
            tx.rollback().await.map_err(AppError::from)?;
            return Err(AppError::Unauthorized(
                "you are not allowed to edit other users' posts".to_string(),
            )
            .into());
        }

        if let Some(name) = image_filename {
            post_repo::update_post_image(&mut tx, post_id, name)
                .await
                .map_err(AppError::from)?;
        }
        if let Some(name) = video_filename {
            post_repo::update_post_video(&mut tx, post_id, name)
                .await
                .map_err(AppError::from)?;
        }

        if reconcile(existing_tags, &content.tag_ids) == TagDecision::ReplaceAll {
            tag_repo::delete_post_tags(&mut tx, post_id)
                .await
                .map_err(AppError::from)?;
            tag_repo::insert_post_tags(&mut tx, post_id, &content.tag_ids)
                .await
                .map_err(AppError::from)?;
        }

        tx.commit().await.map_err(AppError::from)?;
        Ok(())
    }

    /// Run media intake for one class, mapping a rejection into the echoed
    /// form context.
    fn intake(
        &self,
        content: &SubmittedContent,
        class: MediaClass,
    ) -> Result<Option<String>, PostMutationError> {
        let part = match class {
            MediaClass::Image => content.image.as_ref(),
            MediaClass::Video => content.video.as_ref(),
        };

        self.store.validate_and_store(part, class).map_err(|err| {
            metrics::record_media_rejected(class, &err);
            let mut rejection = FormRejection::with_fields(
                err.to_string(),
                &content.title,
                &content.description,
                &content.tag_ids,
            );
            rejection.filename = err.echoed_filename().map(str::to_owned);
            PostMutationError::Rejected(Box::new(rejection))
        })
    }

    /// Attach the post being edited to a recoverable rejection; terse
    /// errors pass through untouched.
    fn with_post_context(err: PostMutationError, post: &Post) -> PostMutationError {
        match err {
            PostMutationError::Rejected(mut rejection) => {
                rejection.post = Some(post.clone());
                PostMutationError::Rejected(rejection)
            }
            other => other,
        }
    }

    /// Best-effort removal of a file stored earlier in a failed sequence.
    fn remove_stored(&self, class: MediaClass, filename: Option<&str>) {
        if let Some(name) = filename {
            let path = self.store.class_dir(class).join(name);
            if let Err(err) = std::fs::remove_file(&path) {
                tracing::warn!(file = %path.display(), error = %err, "orphaned media cleanup failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordinary_user_is_gated_by_the_toggle() {
        assert!(!ModerationPolicy::new(true).approves(0));
        assert!(ModerationPolicy::new(false).approves(0));
    }

    #[test]
    fn elevated_user_bypasses_gating() {
        assert!(ModerationPolicy::new(true).approves(1));
        assert!(ModerationPolicy::new(true).approves(5));
        assert!(ModerationPolicy::new(false).approves(1));
    }

    fn existing_post() -> Post {
        Post {
            id: 7,
            username: "ann".to_string(),
            title: "old title".to_string(),
            description: "old body".to_string(),
            image_filename: None,
            video_filename: None,
            created_at: chrono::Utc::now(),
            edited: false,
            time_edited: None,
            likes: 0,
            dislikes: 0,
            approved: true,
        }
    }

    #[test]
    fn edit_rejections_carry_the_post_being_edited() {
        let err = PostMutationError::Rejected(Box::new(FormRejection::with_fields(
            "image size exceeds the 20 MiB limit",
            "new title",
            "new body",
            &[1, 2],
        )));

        let PostMutationError::Rejected(rejection) =
            PostService::with_post_context(err, &existing_post())
        else {
            panic!("expected a rejection");
        };

        let json = serde_json::to_value(&*rejection).unwrap();
        assert_eq!(json["post"]["id"], 7);
        assert_eq!(json["post"]["title"], "old title");
        assert_eq!(json["title"], "new title");
    }

    #[test]
    fn terse_errors_pass_through_without_post_context() {
        let err = PostMutationError::App(AppError::NotFound("post 7 not found".to_string()));
        assert!(matches!(
            PostService::with_post_context(err, &existing_post()),
            PostMutationError::App(AppError::NotFound(_))
        ));
    }
}
