pub mod auth_service;
pub mod blog_service;
pub mod comment_service;
#[cfg(test)]
pub mod testutil;

pub use auth_service::AuthService;
pub use blog_service::BlogService;
pub use comment_service::CommentService;
