use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use uuid::Uuid;

use crate::error::{Error, Result};

pub const MAX_POINTS: i32 = 999;

/// Score weight is kept in [0, MAX_POINTS]; anything the client sends outside
/// that window is clamped, not rejected.
pub fn clamp_points(points: i32) -> i32 {
    points.clamp(0, MAX_POINTS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "true-false")]
    TrueFalse,
    #[serde(rename = "multiple-choice-single")]
    MultipleChoiceSingle,
    #[serde(rename = "multiple-choice-multiple")]
    MultipleChoiceMultiple,
    #[serde(rename = "equation")]
    Equation,
}

impl QuestionType {
    /// The slug is the externally visible form of the type: route segments,
    /// JSON payloads and the stored column all use it.
    pub fn as_slug(&self) -> &'static str {
        match self {
            QuestionType::Text => "text",
            QuestionType::TrueFalse => "true-false",
            QuestionType::MultipleChoiceSingle => "multiple-choice-single",
            QuestionType::MultipleChoiceMultiple => "multiple-choice-multiple",
            QuestionType::Equation => "equation",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "text" => Some(QuestionType::Text),
            "true-false" => Some(QuestionType::TrueFalse),
            "multiple-choice-single" => Some(QuestionType::MultipleChoiceSingle),
            "multiple-choice-multiple" => Some(QuestionType::MultipleChoiceMultiple),
            "equation" => Some(QuestionType::Equation),
            _ => None,
        }
    }

    pub fn has_options(&self) -> bool {
        matches!(
            self,
            QuestionType::MultipleChoiceSingle | QuestionType::MultipleChoiceMultiple
        )
    }
}

impl std::str::FromStr for QuestionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        QuestionType::from_slug(s)
            .ok_or_else(|| Error::BadRequest(format!("Unknown question type: {}", s)))
    }
}

/// Free-form labels, insertion order preserved, no duplicates. Add/remove are
/// idempotent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tags = Self::new();
        for label in labels {
            tags.insert(&label.into());
        }
        tags
    }

    /// Returns true when the tag was actually added.
    pub fn insert(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Returns true when the tag was actually removed.
    pub fn remove(&mut self, tag: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|t| t != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Stored rows are a JSONB array of strings, but legacy rows sometimes
    /// carry a JSON-encoded string or a bare label. Anything else decodes to
    /// empty.
    pub fn from_stored(value: &JsonValue) -> Self {
        match value {
            JsonValue::Array(items) => Self::from_labels(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string)),
            ),
            JsonValue::String(raw) => {
                if let Ok(JsonValue::Array(items)) = serde_json::from_str::<JsonValue>(raw) {
                    Self::from_labels(
                        items
                            .iter()
                            .filter_map(|v| v.as_str().map(str::to_string)),
                    )
                } else if raw.trim().is_empty() {
                    Self::new()
                } else {
                    Self::from_labels([raw.clone()])
                }
            }
            _ => Self::new(),
        }
    }

    pub fn to_stored(&self) -> JsonValue {
        JsonValue::Array(self.0.iter().cloned().map(JsonValue::String).collect())
    }
}

impl<'de> Deserialize<'de> for Tags {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let labels = Vec::<String>::deserialize(deserializer)?;
        Ok(Tags::from_labels(labels))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub id: Uuid,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Image,
    Video,
    File,
}

impl AttachmentKind {
    /// Storage partition for uploaded objects: `images/`, `videos/`, `files/`.
    pub fn dir_segment(&self) -> &'static str {
        match self {
            AttachmentKind::Image => "images",
            AttachmentKind::Video => "videos",
            AttachmentKind::File => "files",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "image" => Some(AttachmentKind::Image),
            "video" => Some(AttachmentKind::Video),
            "file" => Some(AttachmentKind::File),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(rename = "type")]
    pub kind: AttachmentKind,
    pub url: String,
    pub name: String,
}

/// The graded payload of a question, one shape per question type.
///
/// The stored column keeps the legacy array-of-objects encoding
/// (`[{"answer": true}]`, `[{"id": …, "answer": "…"}]`), so existing rows and
/// clients keep working; the enum is the only shape the rest of the code
/// sees. Encoding and decoding happen here and nowhere else.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerKey {
    /// Free-text response, ungraded.
    Text,
    TrueFalse(Option<bool>),
    SingleChoice(Option<Uuid>),
    MultiChoice(Vec<Uuid>),
    Equation(Option<String>),
}

impl AnswerKey {
    pub fn question_type(&self) -> QuestionType {
        match self {
            AnswerKey::Text => QuestionType::Text,
            AnswerKey::TrueFalse(_) => QuestionType::TrueFalse,
            AnswerKey::SingleChoice(_) => QuestionType::MultipleChoiceSingle,
            AnswerKey::MultiChoice(_) => QuestionType::MultipleChoiceMultiple,
            AnswerKey::Equation(_) => QuestionType::Equation,
        }
    }

    pub fn empty_for(question_type: QuestionType) -> Self {
        match question_type {
            QuestionType::Text => AnswerKey::Text,
            QuestionType::TrueFalse => AnswerKey::TrueFalse(None),
            QuestionType::MultipleChoiceSingle => AnswerKey::SingleChoice(None),
            QuestionType::MultipleChoiceMultiple => AnswerKey::MultiChoice(Vec::new()),
            QuestionType::Equation => AnswerKey::Equation(None),
        }
    }

    /// Every option id referenced by the key must exist in `options`, and a
    /// multi-choice key must not reference the same option twice.
    pub fn validate_against(&self, options: &[AnswerOption]) -> Result<()> {
        let exists = |id: &Uuid| options.iter().any(|o| o.id == *id);
        match self {
            AnswerKey::SingleChoice(Some(id)) if !exists(id) => Err(Error::BadRequest(format!(
                "Correct answer references unknown option {}",
                id
            ))),
            AnswerKey::MultiChoice(ids) => {
                for (idx, id) in ids.iter().enumerate() {
                    if !exists(id) {
                        return Err(Error::BadRequest(format!(
                            "Correct answer references unknown option {}",
                            id
                        )));
                    }
                    if ids[..idx].contains(id) {
                        return Err(Error::BadRequest(format!(
                            "Correct answer references option {} twice",
                            id
                        )));
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Encode into the stored array shape. Choice entries carry the current
    /// option text in `answer` next to the id.
    pub fn to_stored(&self, options: &[AnswerOption]) -> JsonValue {
        let text_of = |id: &Uuid| {
            options
                .iter()
                .find(|o| o.id == *id)
                .map(|o| o.text.clone())
                .unwrap_or_default()
        };
        let entries: Vec<JsonValue> = match self {
            AnswerKey::Text => Vec::new(),
            AnswerKey::TrueFalse(None) => Vec::new(),
            AnswerKey::TrueFalse(Some(answer)) => {
                vec![serde_json::json!({ "answer": answer })]
            }
            AnswerKey::SingleChoice(None) => Vec::new(),
            AnswerKey::SingleChoice(Some(id)) => {
                vec![serde_json::json!({ "id": id, "answer": text_of(id) })]
            }
            AnswerKey::MultiChoice(ids) => ids
                .iter()
                .map(|id| serde_json::json!({ "id": id, "answer": text_of(id) }))
                .collect(),
            AnswerKey::Equation(None) => Vec::new(),
            AnswerKey::Equation(Some(answer)) => {
                vec![serde_json::json!({ "answer": answer })]
            }
        };
        JsonValue::Array(entries)
    }

    /// Decode a stored value for the given type. Malformed entries fall back
    /// to the empty key for that type.
    pub fn from_stored(question_type: QuestionType, value: &JsonValue) -> Self {
        let entries = match value.as_array() {
            Some(entries) => entries,
            None => return Self::empty_for(question_type),
        };
        match question_type {
            QuestionType::Text => AnswerKey::Text,
            QuestionType::TrueFalse => {
                AnswerKey::TrueFalse(entries.first().and_then(|e| e.get("answer")?.as_bool()))
            }
            QuestionType::MultipleChoiceSingle => AnswerKey::SingleChoice(
                entries
                    .first()
                    .and_then(|e| e.get("id"))
                    .and_then(|id| serde_json::from_value(id.clone()).ok()),
            ),
            QuestionType::MultipleChoiceMultiple => AnswerKey::MultiChoice(
                entries
                    .iter()
                    .filter_map(|e| e.get("id"))
                    .filter_map(|id| serde_json::from_value(id.clone()).ok())
                    .collect(),
            ),
            QuestionType::Equation => AnswerKey::Equation(
                entries
                    .first()
                    .and_then(|e| e.get("answer")?.as_str().map(str::to_string)),
            ),
        }
    }
}

/// A fully-typed question record. Raw rows are normalized into this shape
/// exactly once, when they leave the store.
#[derive(Debug, Clone)]
pub struct Question {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub body: String,
    pub question_type: QuestionType,
    pub tags: Tags,
    pub options: Vec<AnswerOption>,
    pub answer: AnswerKey,
    pub attachments: Vec<Attachment>,
    pub points: i32,
    pub exam_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Raw row shape as it comes back from Postgres; JSONB columns are decoded by
/// `Question::from_row_data`.
#[derive(Debug, Clone, FromRow)]
pub struct QuestionRow {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub body: String,
    pub question_type: String,
    pub tags: JsonValue,
    pub options: JsonValue,
    pub correct_answer: JsonValue,
    pub attachments: JsonValue,
    pub points: i32,
    pub exam_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Question {
    pub fn from_row_data(row: QuestionRow) -> Self {
        let question_type = normalize_stored_type(&row.question_type);
        let options: Vec<AnswerOption> =
            serde_json::from_value(row.options.clone()).unwrap_or_default();
        let answer = AnswerKey::from_stored(question_type, &row.correct_answer);
        let attachments: Vec<Attachment> =
            serde_json::from_value(row.attachments.clone()).unwrap_or_default();

        Self {
            id: row.id,
            name: row.name,
            display_name: row.display_name,
            body: row.body,
            question_type,
            tags: Tags::from_stored(&row.tags),
            options,
            answer,
            attachments,
            points: clamp_points(row.points),
            exam_id: row.exam_id,
            created_at: row.created_at,
        }
    }
}

impl From<QuestionRow> for Question {
    fn from(row: QuestionRow) -> Self {
        Question::from_row_data(row)
    }
}

/// The column holds a plain slug, but rows written by the old client may hold
/// a JSON-encoded single-element array. Unknown values fall back to `text`.
fn normalize_stored_type(raw: &str) -> QuestionType {
    if let Some(t) = QuestionType::from_slug(raw) {
        return t;
    }
    if let Ok(JsonValue::Array(items)) = serde_json::from_str::<JsonValue>(raw) {
        if let Some(slug) = items.first().and_then(|v| v.as_str()) {
            if let Some(t) = QuestionType::from_slug(slug) {
                return t;
            }
        }
    }
    tracing::warn!(raw, "unrecognized stored question type, treating as text");
    QuestionType::Text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_mapping_round_trips_every_variant() {
        for t in [
            QuestionType::Text,
            QuestionType::TrueFalse,
            QuestionType::MultipleChoiceSingle,
            QuestionType::MultipleChoiceMultiple,
            QuestionType::Equation,
        ] {
            assert_eq!(QuestionType::from_slug(t.as_slug()), Some(t));
        }
        assert_eq!(QuestionType::from_slug("essay"), None);
    }

    #[test]
    fn tag_insert_is_idempotent() {
        let mut tags = Tags::new();
        assert!(tags.insert("algebra"));
        assert!(!tags.insert("algebra"));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn tag_remove_of_absent_is_noop() {
        let mut tags = Tags::from_labels(["algebra"]);
        assert!(!tags.remove("geometry"));
        assert!(tags.remove("algebra"));
        assert!(tags.is_empty());
    }

    #[test]
    fn tags_preserve_insertion_order_and_dedup() {
        let tags = Tags::from_labels(["b", "a", "b", "c", "a"]);
        assert_eq!(tags.as_slice(), &["b", "a", "c"]);
    }

    #[test]
    fn tags_from_stored_accepts_legacy_shapes() {
        let canonical = serde_json::json!(["a", "b"]);
        assert_eq!(Tags::from_stored(&canonical).as_slice(), &["a", "b"]);

        let encoded = serde_json::json!("[\"x\",\"y\"]");
        assert_eq!(Tags::from_stored(&encoded).as_slice(), &["x", "y"]);

        let bare = serde_json::json!("loose-label");
        assert_eq!(Tags::from_stored(&bare).as_slice(), &["loose-label"]);

        let garbage = serde_json::json!(42);
        assert!(Tags::from_stored(&garbage).is_empty());
    }

    #[test]
    fn points_clamp_to_window() {
        assert_eq!(clamp_points(-3), 0);
        assert_eq!(clamp_points(5), 5);
        assert_eq!(clamp_points(4000), 999);
    }

    fn options_pair() -> Vec<AnswerOption> {
        vec![
            AnswerOption {
                id: Uuid::new_v4(),
                text: "Paris".to_string(),
            },
            AnswerOption {
                id: Uuid::new_v4(),
                text: "London".to_string(),
            },
        ]
    }

    #[test]
    fn single_choice_round_trips_through_stored_shape() {
        let options = options_pair();
        let key = AnswerKey::SingleChoice(Some(options[0].id));
        let stored = key.to_stored(&options);
        assert_eq!(stored[0]["answer"], "Paris");
        let back = AnswerKey::from_stored(QuestionType::MultipleChoiceSingle, &stored);
        assert_eq!(back, key);
    }

    #[test]
    fn multi_choice_stored_ids_match_key() {
        let options = options_pair();
        let key = AnswerKey::MultiChoice(vec![options[0].id, options[1].id]);
        let stored = key.to_stored(&options);
        assert_eq!(stored.as_array().unwrap().len(), 2);
        let back = AnswerKey::from_stored(QuestionType::MultipleChoiceMultiple, &stored);
        assert_eq!(back, key);
    }

    #[test]
    fn true_false_and_equation_encode_single_entry() {
        let stored = AnswerKey::TrueFalse(Some(true)).to_stored(&[]);
        assert_eq!(stored, serde_json::json!([{ "answer": true }]));
        assert_eq!(AnswerKey::TrueFalse(None).to_stored(&[]), serde_json::json!([]));

        let stored = AnswerKey::Equation(Some("x = 2".to_string())).to_stored(&[]);
        assert_eq!(stored, serde_json::json!([{ "answer": "x = 2" }]));
    }

    #[test]
    fn answer_must_reference_known_options() {
        let options = options_pair();
        let stray = Uuid::new_v4();

        assert!(AnswerKey::SingleChoice(Some(stray))
            .validate_against(&options)
            .is_err());
        assert!(AnswerKey::MultiChoice(vec![options[0].id, stray])
            .validate_against(&options)
            .is_err());
        assert!(AnswerKey::MultiChoice(vec![options[0].id, options[0].id])
            .validate_against(&options)
            .is_err());
        assert!(AnswerKey::MultiChoice(vec![options[0].id, options[1].id])
            .validate_against(&options)
            .is_ok());
        assert!(AnswerKey::SingleChoice(None).validate_against(&options).is_ok());
    }

    #[test]
    fn malformed_stored_answer_falls_back_to_empty() {
        let back = AnswerKey::from_stored(QuestionType::TrueFalse, &serde_json::json!("bogus"));
        assert_eq!(back, AnswerKey::TrueFalse(None));
        let back = AnswerKey::from_stored(
            QuestionType::MultipleChoiceSingle,
            &serde_json::json!([{ "answer": "no id here" }]),
        );
        assert_eq!(back, AnswerKey::SingleChoice(None));
    }

    #[test]
    fn legacy_array_encoded_type_normalizes() {
        assert_eq!(
            normalize_stored_type("[\"true-false\"]"),
            QuestionType::TrueFalse
        );
        assert_eq!(normalize_stored_type("equation"), QuestionType::Equation);
        assert_eq!(normalize_stored_type("???"), QuestionType::Text);
    }
}
