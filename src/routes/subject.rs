use axum::{extract::State, response::IntoResponse, Json};

use crate::{error::Result, AppState};

#[utoipa::path(
    get,
    path = "/api/subjects",
    responses(
        (status = 200, description = "List of subjects")
    )
)]
#[axum::debug_handler]
pub async fn list_subjects(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let subjects = state.subject_service.list().await?;
    Ok(Json(subjects))
}
