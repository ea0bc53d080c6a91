/// Forum Content Library
///
/// Handles the post and comment authoring pipeline for the community board:
/// multipart submissions are validated, media attachments are written to
/// durable storage, tag associations are reconciled, and edits are applied
/// against existing rows.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers and multipart form parsing
/// - `models`: Data structures for posts, comments, tags
/// - `services`: Business logic layer (mutation orchestration)
/// - `db`: Database access layer and repositories
/// - `media`: Media intake validation and file storage
/// - `jobs`: Background maintenance (orphaned media sweep)
/// - `middleware`: Session authentication
/// - `error`: Error types and handling
/// - `config`: Configuration management
/// - `metrics`: Observability and metrics collection
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod jobs;
pub mod media;
pub mod metrics;
pub mod middleware;
pub mod models;
pub mod services;

pub use config::Config;
pub use error::{AppError, Result};
