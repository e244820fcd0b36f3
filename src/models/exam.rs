use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Exam {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub subject_id: Option<String>,
    pub is_public: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Subject codes are stored in lowercase canonical form.
pub fn normalize_subject_code(code: &str) -> String {
    code.trim().to_lowercase()
}

/// Row duplication names the copy after the source.
pub fn copy_name(source: &str) -> String {
    format!("{} (Copy)", source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_codes_lowercase() {
        assert_eq!(normalize_subject_code(" IKT210 "), "ikt210");
    }

    #[test]
    fn copies_carry_suffix() {
        assert_eq!(copy_name("Midterm"), "Midterm (Copy)");
    }
}
