use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::common::{BulkIdsPayload, RenamePayload},
    dto::exam_dto::{
        CreateExamPayload, ExamListQuery, ExamListResponse, ExamResponse, PublishPayload,
        UpdateExamPayload,
    },
    error::Result,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/exams",
    request_body = CreateExamPayload,
    responses(
        (status = 201, description = "Exam created successfully", body = Json<ExamResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_exam(
    State(state): State<AppState>,
    Json(payload): Json<CreateExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let exam = state.exam_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(ExamResponse::from(exam))))
}

#[utoipa::path(
    get,
    path = "/api/exams",
    params(
        ("search" = Option<String>, Query, description = "Substring filter over name and description"),
        ("subject" = Option<String>, Query, description = "Filter by subject code"),
        ("deleted" = Option<bool>, Query, description = "Select the deleted view"),
        ("sort" = Option<String>, Query, description = "Sort field: name or created_at"),
        ("order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "List of exams", body = Json<ExamListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_exams(
    State(state): State<AppState>,
    Query(query): Query<ExamListQuery>,
) -> Result<impl IntoResponse> {
    let exams = state.exam_service.list(query).await?;
    let total = exams.len() as i64;
    let items: Vec<ExamResponse> = exams.into_iter().map(Into::into).collect();
    Ok(Json(ExamListResponse { items, total }))
}

#[utoipa::path(
    get,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam found", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn get_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.get_by_id(id).await?;
    Ok(Json(ExamResponse::from(exam)))
}

#[utoipa::path(
    patch,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = UpdateExamPayload,
    responses(
        (status = 200, description = "Exam updated", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn update_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExamPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let exam = state.exam_service.update(id, payload).await?;
    Ok(Json(ExamResponse::from(exam)))
}

#[utoipa::path(
    post,
    path = "/api/exams/{id}/rename",
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = RenamePayload,
    responses(
        (status = 200, description = "Exam renamed", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn rename_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenamePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let exam = state.exam_service.rename(id, payload.name).await?;
    Ok(Json(ExamResponse::from(exam)))
}

#[utoipa::path(
    delete,
    path = "/api/exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam soft-deleted", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.soft_delete(id).await?;
    Ok(Json(ExamResponse::from(exam)))
}

#[utoipa::path(
    post,
    path = "/api/exams/{id}/restore",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam restored", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn restore_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.restore(id).await?;
    Ok(Json(ExamResponse::from(exam)))
}

#[utoipa::path(
    delete,
    path = "/api/exams/{id}/purge",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 204, description = "Exam removed permanently"),
        (status = 400, description = "Exam is not in the deleted view"),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn purge_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    state.exam_service.purge(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/exams/{id}/publish",
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = PublishPayload,
    responses(
        (status = 200, description = "Publish flag updated", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn publish_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PublishPayload>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.set_public(id, payload.is_public).await?;
    Ok(Json(ExamResponse::from(exam)))
}

#[utoipa::path(
    post,
    path = "/api/exams/{id}/copy",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 201, description = "Exam duplicated", body = Json<ExamResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn copy_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.copy(id).await?;
    Ok((StatusCode::CREATED, Json(ExamResponse::from(exam))))
}

#[utoipa::path(
    post,
    path = "/api/exams/delete-bulk",
    request_body = BulkIdsPayload,
    responses(
        (status = 200, description = "Exams soft-deleted")
    )
)]
#[axum::debug_handler]
pub async fn delete_exams_bulk(
    State(state): State<AppState>,
    Json(payload): Json<BulkIdsPayload>,
) -> Result<impl IntoResponse> {
    let deleted = state.exam_service.bulk_soft_delete(&payload.ids).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
