/// Post handlers - HTTP endpoints for post authoring and mutation
use crate::config::Config;
use crate::error::Result;
use crate::handlers::forms::PostSubmission;
use crate::media::MediaStore;
use crate::middleware::CurrentUser;
use crate::services::{ModerationPolicy, PostMutationError, PostService};
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

fn post_service(pool: &PgPool, store: &MediaStore, config: &Config) -> PostService {
    PostService::new(
        pool.clone(),
        store.clone(),
        ModerationPolicy::new(config.moderation.approval_required),
    )
}

/// Create a new post from a multipart submission
pub async fn create_post(
    pool: web::Data<PgPool>,
    store: web::Data<MediaStore>,
    config: web::Data<Config>,
    user: CurrentUser,
    form: MultipartForm<PostSubmission>,
) -> Result<HttpResponse> {
    let service = post_service(&pool, &store, &config);

    match service
        .create_post(&user.username, user.privilege_level, form.into_inner().into())
        .await
    {
        Ok(detail) => {
            tracing::info!(post_id = detail.post.id, username = %user.username, "post created");
            Ok(HttpResponse::Created()
                .append_header(("Location", format!("/api/v1/posts/{}", detail.post.id)))
                .json(detail))
        }
        Err(PostMutationError::Rejected(rejection)) => {
            Ok(HttpResponse::UnprocessableEntity().json(rejection))
        }
        Err(PostMutationError::App(err)) => Err(err),
    }
}

/// Edit an existing post
pub async fn edit_post(
    pool: web::Data<PgPool>,
    store: web::Data<MediaStore>,
    config: web::Data<Config>,
    post_id: web::Path<i64>,
    user: CurrentUser,
    form: MultipartForm<PostSubmission>,
) -> Result<HttpResponse> {
    let service = post_service(&pool, &store, &config);

    match service
        .edit_post(&user.username, *post_id, form.into_inner().into())
        .await
    {
        Ok(detail) => {
            tracing::info!(post_id = detail.post.id, username = %user.username, "post edited");
            Ok(HttpResponse::Ok().json(detail))
        }
        Err(PostMutationError::Rejected(rejection)) => {
            Ok(HttpResponse::UnprocessableEntity().json(rejection))
        }
        Err(PostMutationError::App(err)) => Err(err),
    }
}

/// Get a post by ID (with its tag associations)
pub async fn get_post(
    pool: web::Data<PgPool>,
    store: web::Data<MediaStore>,
    config: web::Data<Config>,
    post_id: web::Path<i64>,
) -> Result<HttpResponse> {
    let service = post_service(&pool, &store, &config);

    match service.get_post(*post_id).await? {
        Some(detail) => Ok(HttpResponse::Ok().json(detail)),
        None => Ok(HttpResponse::NotFound().finish()),
    }
}
