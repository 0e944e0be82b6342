use axum::extract::Multipart;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

use super::dto::UploadForm;
use super::model::UploadJob;
use crate::common::error::{AppError, AppResult};
use crate::common::upload::{stream_to_disk, StagedFile};
use crate::infrastructure::storage::local::{remove_quietly, MediaStorage};
use crate::modules::video::model::Video;
use crate::state::AppState;

pub struct UploadService;

impl UploadService {
    /// Stages the file, builds the job and waits for it to be published.
    pub async fn upload(state: AppState, creator_id: Uuid, multipart: Multipart) -> AppResult<Video> {
        let job = Self::intake(&state.storage, creator_id, multipart).await?;
        info!(session_id = %job.session_id, creator_id = %creator_id, "Upload accepted");
        state.transcoder.submit(job).await
    }

    /// Reads the multipart form into a pending job. The staged file is removed
    /// again if the form turns out to be invalid.
    pub async fn intake(
        storage: &MediaStorage,
        creator_id: Uuid,
        mut multipart: Multipart,
    ) -> AppResult<UploadJob> {
        let mut staged: Option<StagedFile> = None;

        let form = match Self::read_form(storage, &mut multipart, &mut staged).await {
            Ok(form) => form,
            Err(e) => {
                if let Some(file) = staged {
                    remove_quietly(&file.path).await;
                }
                return Err(e);
            }
        };

        let Some(file) = staged else {
            return Err(AppError::Validation("No file uploaded".to_string()));
        };

        if let Err(e) = form.validate() {
            remove_quietly(&file.path).await;
            return Err(e.into());
        }

        let session_id = form
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        debug!(session_id = %session_id, original = %file.original_name, bytes = file.size, "Upload staged");
        let output_name = MediaStorage::output_file_name(&file.path);

        Ok(UploadJob::new(
            file.path,
            storage.media_path(&output_name),
            form.title,
            form.description,
            creator_id,
            session_id,
        ))
    }

    async fn read_form(
        storage: &MediaStorage,
        multipart: &mut Multipart,
        staged: &mut Option<StagedFile>,
    ) -> AppResult<UploadForm> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();
            match name.as_str() {
                "file" => {
                    if staged.is_some() {
                        return Err(AppError::Validation("Only one file per upload".to_string()));
                    }
                    *staged = Some(stream_to_disk(storage, field).await?);
                }
                "title" => form.title = text_of(field).await?.trim().to_string(),
                "description" => form.description = non_empty(text_of(field).await?),
                "sessionId" => form.session_id = non_empty(text_of(field).await?),
                other => debug!("Ignoring multipart field '{}'", other),
            }
        }

        Ok(form)
    }
}

async fn text_of(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(e.body_text()))
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
