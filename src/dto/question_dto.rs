use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;
use validator::Validate;

use crate::models::question::{
    AnswerOption, Attachment, Question, QuestionType, Tags,
};
use crate::utils::listing::{SortField, SortOrder};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateQuestionPayload {
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub exam_id: Option<Uuid>,
    #[serde(default)]
    pub tags: Tags,
}

/// Editor save. Everything here is the uncommitted local state of the editor;
/// tags and attachments are absent on purpose, they commit through their own
/// eager endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SaveQuestionPayload {
    pub display_name: Option<String>,
    pub body: Option<String>,
    pub options: Option<Vec<AnswerOption>>,
    /// Legacy array shape (`[{"id": …, "answer": "…"}]`), decoded against the
    /// question's current type.
    pub correct_answer: Option<JsonValue>,
    #[serde(deserialize_with = "lenient_points")]
    pub points: Option<i32>,
}

/// The points field arrives from a free-form input; non-numeric values
/// coerce to 0 rather than failing the whole save.
fn lenient_points<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.map(|v| match v {
        JsonValue::Number(n) => n
            .as_i64()
            .map(|x| x.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
            .or_else(|| n.as_f64().map(|f| f as i32))
            .unwrap_or(0),
        JsonValue::String(s) => s.trim().parse::<i32>().unwrap_or(0),
        _ => 0,
    }))
}

/// Moves a question between exams; `null` sends it back to My Questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignExamPayload {
    pub exam_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeTypePayload {
    #[serde(rename = "type")]
    pub question_type: QuestionType,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AddTagPayload {
    #[validate(length(min = 1))]
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveAttachmentPayload {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct QuestionListQuery {
    /// An exam id, or the literal `unassigned` for the My Questions view.
    pub exam: Option<String>,
    pub search: Option<String>,
    /// An exact tag label, or the literal `untagged`.
    pub tag: Option<String>,
    pub sort: Option<SortField>,
    pub order: Option<SortOrder>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResponse {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub body: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub tags: Vec<String>,
    pub options: Vec<AnswerOption>,
    /// Legacy array shape, same as the stored column.
    pub correct_answer: JsonValue,
    pub attachments: Vec<Attachment>,
    pub points: i32,
    pub exam_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionListResponse {
    pub items: Vec<QuestionResponse>,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NeighborsResponse {
    pub prev: Option<Uuid>,
    pub next: Option<Uuid>,
}

impl From<Question> for QuestionResponse {
    fn from(value: Question) -> Self {
        let correct_answer = value.answer.to_stored(&value.options);
        Self {
            id: value.id,
            name: value.name,
            display_name: value.display_name,
            body: value.body,
            question_type: value.question_type,
            tags: value.tags.as_slice().to_vec(),
            options: value.options,
            correct_answer,
            attachments: value.attachments,
            points: value.points,
            exam_id: value.exam_id,
            created_at: value.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn points_accept_numbers_and_numeric_strings() {
        let p: SaveQuestionPayload = serde_json::from_str(r#"{"points": 7}"#).unwrap();
        assert_eq!(p.points, Some(7));

        let p: SaveQuestionPayload = serde_json::from_str(r#"{"points": "12"}"#).unwrap();
        assert_eq!(p.points, Some(12));
    }

    #[test]
    fn non_numeric_points_coerce_to_zero() {
        let p: SaveQuestionPayload = serde_json::from_str(r#"{"points": "abc"}"#).unwrap();
        assert_eq!(p.points, Some(0));

        let p: SaveQuestionPayload = serde_json::from_str(r#"{"points": null}"#).unwrap();
        assert_eq!(p.points, None);
    }
}
