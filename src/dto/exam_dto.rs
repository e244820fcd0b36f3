use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::exam::Exam;
use crate::utils::listing::{SortField, SortOrder};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateExamPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub subject_id: Option<String>,
    pub is_public: Option<bool>,
}

/// Name changes go through the rename endpoint, not here.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateExamPayload {
    pub description: Option<String>,
    /// An empty string clears the subject assignment.
    pub subject_id: Option<String>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishPayload {
    pub is_public: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ExamListQuery {
    pub search: Option<String>,
    pub subject: Option<String>,
    /// true selects the deleted view; the default is the active view.
    pub deleted: Option<bool>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub subject_id: Option<String>,
    pub is_public: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamListResponse {
    pub items: Vec<ExamResponse>,
    pub total: i64,
}

impl From<Exam> for ExamResponse {
    fn from(value: Exam) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            subject_id: value.subject_id,
            is_public: value.is_public,
            is_deleted: value.is_deleted,
            deleted_at: value.deleted_at,
            created_at: value.created_at,
        }
    }
}
