use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    dto::question_dto::QuestionListQuery, error::Result,
    services::export_service::ExportService, AppState,
};

#[derive(Debug, Deserialize)]
pub struct BulkExportRequest {
    pub ids: Option<Vec<Uuid>>,
}

fn json_download(filename: String, document: serde_json::Value) -> Result<impl IntoResponse> {
    let body = serde_json::to_vec_pretty(&document)?;
    let disposition = format!("attachment; filename=\"{}\"", filename);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Export a single question as a JSON download.
#[utoipa::path(
    get,
    path = "/api/questions/{id}/export",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "JSON document download"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn export_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_by_id(id).await?;
    let filename = ExportService::download_filename(&question.name);
    let document = ExportService::questions_document(vec![question]);
    json_download(filename, document)
}

/// Export selected questions, or every question when no ids are given.
#[utoipa::path(
    post,
    path = "/api/questions/export",
    request_body = BulkExportRequest,
    responses(
        (status = 200, description = "JSON document download")
    )
)]
#[axum::debug_handler]
pub async fn export_questions_bulk(
    State(state): State<AppState>,
    Json(payload): Json<BulkExportRequest>,
) -> Result<impl IntoResponse> {
    let questions = match payload.ids {
        Some(ids) if !ids.is_empty() => state.question_service.get_many(&ids).await?,
        _ => {
            state
                .question_service
                .list(QuestionListQuery::default())
                .await?
        }
    };
    let filename = ExportService::download_filename("questions");
    let document = ExportService::questions_document(questions);
    json_download(filename, document)
}

/// Export an exam together with its questions.
#[utoipa::path(
    get,
    path = "/api/exams/{id}/export",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "JSON document download"),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn export_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let exam = state.exam_service.get_by_id(id).await?;
    let questions = state
        .question_service
        .list(QuestionListQuery {
            exam: Some(id.to_string()),
            ..Default::default()
        })
        .await?;
    let filename = ExportService::download_filename(&exam.name);
    let document = ExportService::exam_document(exam, questions);
    json_download(filename, document)
}
