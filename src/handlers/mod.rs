/// HTTP request handlers
pub mod comments;
pub mod forms;
pub mod posts;
pub mod tags;

pub use comments::{edit_comment, get_comment};
pub use posts::{create_post, edit_post, get_post};
pub use tags::get_tags;
