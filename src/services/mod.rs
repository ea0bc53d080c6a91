/// Business logic layer
pub mod comments;
pub mod posts;
pub mod tags;

pub use comments::CommentService;
pub use posts::{ModerationPolicy, PostMutationError, PostService};
pub use tags::{reconcile, TagCatalog, TagDecision};
