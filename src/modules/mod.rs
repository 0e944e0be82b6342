pub mod auth;
pub mod comment;
pub mod upload;
pub mod user;
pub mod video;
