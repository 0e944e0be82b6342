use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Text fields of the multipart upload form.
#[derive(Debug, Default, Validate)]
pub struct UploadForm {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)"))]
    pub title: String,
    #[validate(length(max = 5000, message = "Description is too long"))]
    pub description: Option<String>,
    #[validate(length(min = 1, max = 128, message = "Session id must be 1-128 characters"))]
    pub session_id: Option<String>,
}

/// Shape of the multipart body, for the API docs only.
#[allow(dead_code)]
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub title: String,
    pub description: Option<String>,
    pub session_id: Option<String>,
}
