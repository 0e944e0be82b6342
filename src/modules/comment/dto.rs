use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostCommentRequest {
    #[validate(length(min = 1, max = 2000, message = "Comment must be 1-2000 characters"))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct PostReplyRequest {
    #[validate(length(min = 1, max = 2000, message = "Reply must be 1-2000 characters"))]
    pub reply: String,
}
