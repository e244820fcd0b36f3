use std::env;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

fn test_router(state: examstudio_backend::AppState) -> Router {
    Router::new()
        .route(
            "/api/exams",
            get(examstudio_backend::routes::exam::list_exams)
                .post(examstudio_backend::routes::exam::create_exam),
        )
        .route(
            "/api/exams/:id",
            get(examstudio_backend::routes::exam::get_exam)
                .delete(examstudio_backend::routes::exam::delete_exam),
        )
        .route(
            "/api/exams/:id/restore",
            post(examstudio_backend::routes::exam::restore_exam),
        )
        .route(
            "/api/questions",
            get(examstudio_backend::routes::question::list_questions)
                .post(examstudio_backend::routes::question::create_question),
        )
        .route(
            "/api/questions/:id",
            get(examstudio_backend::routes::question::get_question)
                .patch(examstudio_backend::routes::question::save_question),
        )
        .route(
            "/api/questions/:id/copy",
            post(examstudio_backend::routes::question::copy_question),
        )
        .route(
            "/api/questions/:id/tags",
            post(examstudio_backend::routes::question::add_tag),
        )
        .route(
            "/api/questions/:id/tags/:tag",
            axum::routing::delete(examstudio_backend::routes::question::remove_tag),
        )
        .route(
            "/api/questions/:id/neighbors",
            get(examstudio_backend::routes::question::question_neighbors),
        )
        .with_state(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<JsonValue>) -> (StatusCode, JsonValue) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn authoring_end_to_end() {
    dotenvy::dotenv().ok();
    if env::var("DATABASE_URL").is_err() {
        eprintln!("skipping authoring_end_to_end: DATABASE_URL not set");
        return;
    }
    env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    env::set_var("SESSION_SECRET", "test_secret_key");
    env::set_var("API_RPS", "100");
    let _ = examstudio_backend::config::init_config();

    let pool = examstudio_backend::database::pool::create_pool()
        .await
        .expect("pool");
    sqlx::migrate!("./migrations").run(&pool).await.expect("migrations");

    let app = test_router(examstudio_backend::AppState::new(pool.clone()));

    // Create the exam and a question bound to it.
    let (status, exam) = send(
        &app,
        "POST",
        "/api/exams",
        Some(json!({ "name": "Midterm", "description": "", "subject_id": "IKT210" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(exam["subject_id"], "ikt210");
    let exam_id = exam["id"].as_str().unwrap().to_string();

    let (status, question) = send(
        &app,
        "POST",
        "/api/questions",
        Some(json!({
            "name": "Q1",
            "type": "multiple-choice-single",
            "tags": [],
            "exam_id": exam_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let question_id = question["id"].as_str().unwrap().to_string();
    assert_eq!(question["type"], "multiple-choice-single");
    assert_eq!(question["points"], 0);

    // Editor save: two options, "Paris" keyed correct, five points.
    let paris = Uuid::new_v4();
    let london = Uuid::new_v4();
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/questions/{}", question_id),
        Some(json!({
            "display_name": "Capital of France",
            "body": "<p>Pick the capital of France.</p>",
            "options": [
                { "id": paris, "text": "Paris" },
                { "id": london, "text": "London" }
            ],
            "correct_answer": [ { "id": paris, "answer": "Paris" } ],
            "points": 5,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Reload shows exactly what was saved.
    let (status, reloaded) = send(
        &app,
        "GET",
        &format!("/api/questions/{}", question_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reloaded["points"], 5);
    assert_eq!(reloaded["options"].as_array().unwrap().len(), 2);
    assert_eq!(reloaded["options"][0]["text"], "Paris");
    assert_eq!(reloaded["correct_answer"].as_array().unwrap().len(), 1);
    assert_eq!(reloaded["correct_answer"][0]["id"], paris.to_string());
    assert_eq!(reloaded["correct_answer"][0]["answer"], "Paris");

    // A save keying an unknown option is rejected.
    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/questions/{}", question_id),
        Some(json!({
            "options": [ { "id": paris, "text": "Paris" } ],
            "correct_answer": [ { "id": Uuid::new_v4(), "answer": "ghost" } ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Tags commit eagerly and are idempotent.
    let (_, tagged) = send(
        &app,
        "POST",
        &format!("/api/questions/{}/tags", question_id),
        Some(json!({ "tag": "geography" })),
    )
    .await;
    assert_eq!(tagged["tags"], json!(["geography"]));
    let (_, tagged_again) = send(
        &app,
        "POST",
        &format!("/api/questions/{}/tags", question_id),
        Some(json!({ "tag": "geography" })),
    )
    .await;
    assert_eq!(tagged_again["tags"], json!(["geography"]));
    let (_, untagged) = send(
        &app,
        "DELETE",
        &format!("/api/questions/{}/tags/absent", question_id),
        None,
    )
    .await;
    assert_eq!(untagged["tags"], json!(["geography"]));

    // Copy keeps tags and parent, renames, fresh identity.
    let (status, copy) = send(
        &app,
        "POST",
        &format!("/api/questions/{}/copy", question_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(copy["name"], "Q1 (Copy)");
    assert_eq!(copy["tags"], json!(["geography"]));
    assert_eq!(copy["exam_id"], exam_id.as_str());
    assert_ne!(copy["id"], question_id.as_str());

    // Neighbors step within the exam scope; boundaries are open.
    let (_, neighbors) = send(
        &app,
        "GET",
        &format!("/api/questions/{}/neighbors", copy["id"].as_str().unwrap()),
        None,
    )
    .await;
    assert_eq!(neighbors["next"], question_id.as_str());

    // Soft delete then restore round-trips the markers.
    let (_, deleted) = send(&app, "DELETE", &format!("/api/exams/{}", exam_id), None).await;
    assert_eq!(deleted["is_deleted"], true);
    assert!(deleted["deleted_at"].is_string());
    let (_, restored) = send(
        &app,
        "POST",
        &format!("/api/exams/{}/restore", exam_id),
        None,
    )
    .await;
    assert_eq!(restored["is_deleted"], false);
    assert!(restored["deleted_at"].is_null());
    assert_eq!(restored["name"], "Midterm");
    assert_eq!(restored["subject_id"], "ikt210");

    // Cleanup.
    let exam_uuid = Uuid::parse_str(&exam_id).unwrap();
    sqlx::query("DELETE FROM questions WHERE exam_id = $1")
        .bind(exam_uuid)
        .execute(&pool)
        .await
        .ok();
    sqlx::query("DELETE FROM exams WHERE id = $1")
        .bind(exam_uuid)
        .execute(&pool)
        .await
        .ok();
}
