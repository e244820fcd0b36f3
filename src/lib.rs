pub mod config;
pub mod database;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod utils;

use crate::services::{
    exam_service::ExamService, question_service::QuestionService,
    storage_service::StorageService, subject_service::SubjectService,
};
use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub exam_service: ExamService,
    pub question_service: QuestionService,
    pub subject_service: SubjectService,
    pub storage_service: StorageService,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        let config = crate::config::get_config();

        let exam_service = ExamService::new(pool.clone());
        let question_service = QuestionService::new(pool.clone());
        let subject_service = SubjectService::new(pool.clone());
        let storage_service =
            StorageService::new(config.uploads_dir.clone(), config.public_base_url.clone());

        Self {
            pool,
            exam_service,
            question_service,
            subject_service,
            storage_service,
        }
    }
}
