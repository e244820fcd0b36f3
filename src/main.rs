use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use examstudio_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware::{cors::permissive_cors, rate_limit},
    routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let api = Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/subjects", get(routes::subject::list_subjects))
        .route(
            "/api/exams",
            get(routes::exam::list_exams).post(routes::exam::create_exam),
        )
        .route(
            "/api/exams/:id",
            get(routes::exam::get_exam)
                .patch(routes::exam::update_exam)
                .delete(routes::exam::delete_exam),
        )
        .route("/api/exams/:id/rename", post(routes::exam::rename_exam))
        .route("/api/exams/:id/restore", post(routes::exam::restore_exam))
        .route(
            "/api/exams/:id/purge",
            axum::routing::delete(routes::exam::purge_exam),
        )
        .route("/api/exams/:id/publish", post(routes::exam::publish_exam))
        .route("/api/exams/:id/copy", post(routes::exam::copy_exam))
        .route(
            "/api/exams/delete-bulk",
            post(routes::exam::delete_exams_bulk),
        )
        .route(
            "/api/exams/:id/questions",
            get(routes::question::list_exam_questions),
        )
        .route("/api/exams/:id/export", get(routes::export::export_exam))
        .route(
            "/api/questions",
            get(routes::question::list_questions).post(routes::question::create_question),
        )
        .route(
            "/api/questions/:id",
            get(routes::question::get_question)
                .patch(routes::question::save_question)
                .delete(routes::question::delete_question),
        )
        .route(
            "/api/questions/:id/rename",
            post(routes::question::rename_question),
        )
        .route("/api/questions/:id/copy", post(routes::question::copy_question))
        .route(
            "/api/questions/:id/assign",
            post(routes::question::assign_question),
        )
        .route(
            "/api/questions/:id/type",
            post(routes::question::change_question_type),
        )
        .route("/api/questions/:id/tags", post(routes::question::add_tag))
        .route(
            "/api/questions/:id/tags/:tag",
            axum::routing::delete(routes::question::remove_tag),
        )
        .route(
            "/api/questions/:id/attachments",
            post(routes::question::upload_attachment)
                .delete(routes::question::remove_attachment),
        )
        .route(
            "/api/questions/:id/neighbors",
            get(routes::question::question_neighbors),
        )
        .route(
            "/api/questions/delete-bulk",
            post(routes::question::delete_questions_bulk),
        )
        .route(
            "/api/questions/export",
            post(routes::export::export_questions_bulk),
        )
        .route(
            "/api/questions/:id/export",
            get(routes::export::export_question),
        )
        .layer(axum::middleware::from_fn_with_state(
            rate_limit::ApiRateLimit::new(config.api_rps),
            rate_limit::rate_limit_middleware,
        ));

    info!("Serving uploads from: {}", config.uploads_dir);

    let app = base_routes
        .merge(api)
        .nest_service(
            "/uploads",
            tower_http::services::ServeDir::new(&config.uploads_dir),
        )
        .with_state(app_state)
        .layer(permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(50 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
