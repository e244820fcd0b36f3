use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::common::{BulkIdsPayload, RenamePayload},
    dto::question_dto::{
        AddTagPayload, AssignExamPayload, ChangeTypePayload, CreateQuestionPayload,
        NeighborsResponse, QuestionListQuery, QuestionListResponse, QuestionResponse,
        RemoveAttachmentPayload, SaveQuestionPayload,
    },
    error::{Error, Result},
    models::question::AttachmentKind,
    AppState,
};

#[utoipa::path(
    post,
    path = "/api/questions",
    request_body = CreateQuestionPayload,
    responses(
        (status = 201, description = "Question created", body = Json<QuestionResponse>),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_question(
    State(state): State<AppState>,
    Json(payload): Json<CreateQuestionPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

#[utoipa::path(
    get,
    path = "/api/questions",
    params(
        ("exam" = Option<String>, Query, description = "Exam id or 'unassigned'"),
        ("search" = Option<String>, Query, description = "Substring filter"),
        ("tag" = Option<String>, Query, description = "Exact tag label or 'untagged'"),
        ("sort" = Option<String>, Query, description = "name or created_at"),
        ("order" = Option<String>, Query, description = "asc or desc")
    ),
    responses(
        (status = 200, description = "List of questions", body = Json<QuestionListResponse>)
    )
)]
#[axum::debug_handler]
pub async fn list_questions(
    State(state): State<AppState>,
    Query(query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    let questions = state.question_service.list(query).await?;
    let total = questions.len() as i64;
    let items: Vec<QuestionResponse> = questions.into_iter().map(Into::into).collect();
    Ok(Json(QuestionListResponse { items, total }))
}

/// Questions of one exam, for the per-exam dashboard.
#[utoipa::path(
    get,
    path = "/api/exams/{id}/questions",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Questions of the exam", body = Json<QuestionListResponse>),
        (status = 404, description = "Exam not found")
    )
)]
#[axum::debug_handler]
pub async fn list_exam_questions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(mut query): Query<QuestionListQuery>,
) -> Result<impl IntoResponse> {
    state.exam_service.get_by_id(id).await?;
    query.exam = Some(id.to_string());
    let questions = state.question_service.list(query).await?;
    let total = questions.len() as i64;
    let items: Vec<QuestionResponse> = questions.into_iter().map(Into::into).collect();
    Ok(Json(QuestionListResponse { items, total }))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Full record for the editor", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn get_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.get_by_id(id).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    patch,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = SaveQuestionPayload,
    responses(
        (status = 200, description = "Question saved", body = Json<QuestionResponse>),
        (status = 400, description = "Answer references unknown options"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn save_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SaveQuestionPayload>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.save(id, payload).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 204, description = "Question deleted"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn delete_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    if !state.question_service.delete(id).await? {
        return Err(Error::NotFound("Question not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/questions/{id}/rename",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = RenamePayload,
    responses(
        (status = 200, description = "Question renamed", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn rename_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RenamePayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.rename(id, payload.name).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    post,
    path = "/api/questions/{id}/copy",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 201, description = "Question duplicated", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn copy_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.copy(id).await?;
    Ok((StatusCode::CREATED, Json(QuestionResponse::from(question))))
}

#[utoipa::path(
    post,
    path = "/api/questions/{id}/assign",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = AssignExamPayload,
    responses(
        (status = 200, description = "Question reassigned", body = Json<QuestionResponse>),
        (status = 404, description = "Question or exam not found")
    )
)]
#[axum::debug_handler]
pub async fn assign_question(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignExamPayload>,
) -> Result<impl IntoResponse> {
    if let Some(exam_id) = payload.exam_id {
        state.exam_service.get_by_id(exam_id).await?;
    }
    let question = state
        .question_service
        .assign_to_exam(id, payload.exam_id)
        .await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    post,
    path = "/api/questions/{id}/type",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = ChangeTypePayload,
    responses(
        (status = 200, description = "Type switched", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn change_question_type(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeTypePayload>,
) -> Result<impl IntoResponse> {
    let question = state
        .question_service
        .change_type(id, payload.question_type)
        .await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    post,
    path = "/api/questions/{id}/tags",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = AddTagPayload,
    responses(
        (status = 200, description = "Tag added (no-op when present)", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn add_tag(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddTagPayload>,
) -> Result<impl IntoResponse> {
    payload.validate()?;
    let question = state.question_service.add_tag(id, &payload.tag).await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    delete,
    path = "/api/questions/{id}/tags/{tag}",
    params(
        ("id" = Uuid, Path, description = "Question ID"),
        ("tag" = String, Path, description = "Tag label")
    ),
    responses(
        (status = 200, description = "Tag removed (no-op when absent)", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn remove_tag(
    State(state): State<AppState>,
    Path((id, tag)): Path<(Uuid, String)>,
) -> Result<impl IntoResponse> {
    let question = state.question_service.remove_tag(id, &tag).await?;
    Ok(Json(QuestionResponse::from(question)))
}

/// Multipart upload: a `type` field (image/video/file) and a `file` field.
/// The object is stored first, then the descriptor persists on the question
/// right away.
#[utoipa::path(
    post,
    path = "/api/questions/{id}/attachments",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Attachment stored and linked", body = Json<QuestionResponse>),
        (status = 400, description = "Missing file or unsupported type"),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn upload_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse> {
    state.question_service.get_by_id(id).await?;

    let mut kind = AttachmentKind::File;
    let mut file_name = None;
    let mut data = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or_default().to_string();
        match field_name.as_str() {
            "type" => {
                let raw = field.text().await.unwrap_or_default();
                kind = AttachmentKind::from_slug(&raw).ok_or_else(|| {
                    Error::BadRequest(format!("Unknown attachment type: {}", raw))
                })?;
            }
            "file" => {
                file_name = field.file_name().map(str::to_string);
                data = Some(field.bytes().await?);
            }
            _ => {}
        }
    }

    let file_name =
        file_name.ok_or_else(|| Error::BadRequest("Missing file field".to_string()))?;
    let data = data.ok_or_else(|| Error::BadRequest("Missing file field".to_string()))?;

    let attachment = state.storage_service.store(kind, &file_name, &data).await?;
    let question = state.question_service.add_attachment(id, attachment).await?;
    Ok(Json(QuestionResponse::from(question)))
}

/// Unlinks the descriptor. The uploaded object stays in storage.
#[utoipa::path(
    delete,
    path = "/api/questions/{id}/attachments",
    params(("id" = Uuid, Path, description = "Question ID")),
    request_body = RemoveAttachmentPayload,
    responses(
        (status = 200, description = "Attachment unlinked", body = Json<QuestionResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn remove_attachment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RemoveAttachmentPayload>,
) -> Result<impl IntoResponse> {
    let question = state
        .question_service
        .remove_attachment(id, &payload.url)
        .await?;
    Ok(Json(QuestionResponse::from(question)))
}

#[utoipa::path(
    get,
    path = "/api/questions/{id}/neighbors",
    params(("id" = Uuid, Path, description = "Question ID")),
    responses(
        (status = 200, description = "Previous/next question ids", body = Json<NeighborsResponse>),
        (status = 404, description = "Question not found")
    )
)]
#[axum::debug_handler]
pub async fn question_neighbors(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse> {
    let (prev, next) = state.question_service.neighbors(id).await?;
    Ok(Json(NeighborsResponse { prev, next }))
}

#[utoipa::path(
    post,
    path = "/api/questions/delete-bulk",
    request_body = BulkIdsPayload,
    responses(
        (status = 200, description = "Questions deleted")
    )
)]
#[axum::debug_handler]
pub async fn delete_questions_bulk(
    State(state): State<AppState>,
    Json(payload): Json<BulkIdsPayload>,
) -> Result<impl IntoResponse> {
    let deleted = state.question_service.bulk_delete(&payload.ids).await?;
    Ok(Json(serde_json::json!({ "deleted": deleted })))
}
