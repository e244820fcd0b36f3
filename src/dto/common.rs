use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Payload of the shared rename dialog, used for both exams and questions.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RenamePayload {
    #[validate(length(min = 1))]
    pub name: String,
}

/// Multi-select bulk operations ship a list of row ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkIdsPayload {
    pub ids: Vec<Uuid>,
}
