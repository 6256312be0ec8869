use axum::{
    extract::{
        multipart::{Field, MultipartError, MultipartRejection},
        rejection::{JsonRejection, PathRejection},
        Multipart, Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::ProblemView;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::problem_service::{CreateProblemInput, ImageUpload};
use crate::services::ServiceError;

#[derive(Debug, Serialize)]
pub struct ProblemEnvelope {
    pub problem: ProblemView,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StatusBody {
    pub status: Option<serde_json::Value>,
}

/// POST /api/problems - Report a problem (multipart: title, description, location, image?)
pub async fn problem_create(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<ProblemEnvelope> {
    let mut multipart = multipart?;
    let mut input = CreateProblemInput::default();
    let mut image = None;
    let mut image_seen = false;

    let upload_error = |e: MultipartError| -> ApiError {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            state.problems.file_too_large().into()
        } else {
            e.into()
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => input.title = field.text().await.map_err(upload_error)?,
            Some("description") => input.description = field.text().await.map_err(upload_error)?,
            Some("location") => input.location = field.text().await.map_err(upload_error)?,
            Some("image") => {
                if image_seen {
                    return Err(ServiceError::invalid("image", "Only one image may be attached.").into());
                }
                image_seen = true;
                image = read_image(field).await.map_err(upload_error)?;
            }
            _ => {}
        }
    }

    let created = state.problems.create(&auth.principal(), input, image).await?;

    Ok(ApiResponse::created(ProblemEnvelope {
        problem: ProblemView::from(created),
    })
    .message("Problem created successfully."))
}

/// An empty file part means no image was chosen
async fn read_image(field: Field<'_>) -> Result<Option<ImageUpload>, MultipartError> {
    let file_name = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;

    if file_name.is_empty() && bytes.is_empty() {
        return Ok(None);
    }

    Ok(Some(ImageUpload {
        file_name,
        content_type,
        bytes: bytes.to_vec(),
    }))
}

/// PUT /api/problems/:id/status - Owner or admin moves a problem between states
pub async fn problem_status_put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<StatusBody>, JsonRejection>,
) -> ApiResult<ProblemEnvelope> {
    let Path(id) = id?;
    // A body without a status string is reported as an invalid status
    let body = payload.map(|Json(body)| body).unwrap_or_default();
    let status = body.status.as_ref().and_then(serde_json::Value::as_str);

    let updated = state.problems.update_status(&auth.principal(), id, status).await?;

    Ok(ApiResponse::success(ProblemEnvelope {
        problem: ProblemView::from(updated),
    })
    .message("Problem status updated successfully."))
}

/// DELETE /api/problems/:id - Owner or admin removes a problem and its image
pub async fn problem_delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.problems.delete(&auth.principal(), id).await?;

    Ok(ApiResponse::success(()).message("Problem deleted successfully."))
}
