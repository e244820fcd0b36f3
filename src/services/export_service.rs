use crate::dto::exam_dto::ExamResponse;
use crate::dto::question_dto::QuestionResponse;
use crate::models::exam::Exam;
use crate::models::question::Question;
use serde_json::{json, Value as JsonValue};

/// Builds the downloadable export documents. The UI historically labelled
/// these QTI 2.x/3.x; the document is plain JSON of the records.
pub struct ExportService;

impl ExportService {
    pub fn questions_document(questions: Vec<Question>) -> JsonValue {
        let items: Vec<QuestionResponse> =
            questions.into_iter().map(QuestionResponse::from).collect();
        json!({
            "format": "examstudio-json",
            "version": 1,
            "exported_at": chrono::Utc::now().to_rfc3339(),
            "questions": items,
        })
    }

    pub fn exam_document(exam: Exam, questions: Vec<Question>) -> JsonValue {
        let items: Vec<QuestionResponse> =
            questions.into_iter().map(QuestionResponse::from).collect();
        json!({
            "format": "examstudio-json",
            "version": 1,
            "exported_at": chrono::Utc::now().to_rfc3339(),
            "exam": ExamResponse::from(exam),
            "questions": items,
        })
    }

    pub fn download_filename(stem: &str) -> String {
        let safe: String = stem
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        format!(
            "{}_{}.json",
            safe,
            chrono::Utc::now().format("%Y%m%d")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerKey, QuestionType, Tags};
    use uuid::Uuid;

    fn sample_question() -> Question {
        Question {
            id: Uuid::new_v4(),
            name: "Q1".to_string(),
            display_name: "Question one".to_string(),
            body: "<p>What is 2+2?</p>".to_string(),
            question_type: QuestionType::Equation,
            tags: Tags::from_labels(["arithmetic"]),
            options: Vec::new(),
            answer: AnswerKey::Equation(Some("4".to_string())),
            attachments: Vec::new(),
            points: 2,
            exam_id: None,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn question_document_carries_records_and_metadata() {
        let doc = ExportService::questions_document(vec![sample_question()]);
        assert_eq!(doc["format"], "examstudio-json");
        assert_eq!(doc["questions"].as_array().unwrap().len(), 1);
        assert_eq!(doc["questions"][0]["type"], "equation");
        assert_eq!(doc["questions"][0]["correct_answer"][0]["answer"], "4");
    }

    #[test]
    fn filenames_are_sanitized() {
        let name = ExportService::download_filename("Midterm / v2");
        assert!(name.starts_with("Midterm___v2_"));
        assert!(name.ends_with(".json"));
        assert!(!name.contains('/'));
    }
}
