use crate::dto::question_dto::{CreateQuestionPayload, QuestionListQuery, SaveQuestionPayload};
use crate::error::{Error, Result};
use crate::models::exam::copy_name;
use crate::models::question::{
    clamp_points, AnswerKey, Attachment, Question, QuestionRow, QuestionType, Tags,
};
use crate::utils::listing::{filter_search, filter_tags, sort_entries, SortField, SortOrder, TagSelector};
use sqlx::PgPool;
use uuid::Uuid;

const QUESTION_COLUMNS: &str = "id, name, display_name, body, question_type, tags, options, \
     correct_answer, attachments, points, exam_id, created_at";

/// Scope of a question listing: one exam's dashboard, or the unassigned
/// "My Questions" view, or everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamScope {
    All,
    Unassigned,
    Exam(Uuid),
}

impl ExamScope {
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None | Some("") => Ok(ExamScope::All),
            Some("unassigned") => Ok(ExamScope::Unassigned),
            Some(other) => other
                .parse::<Uuid>()
                .map(ExamScope::Exam)
                .map_err(|_| Error::BadRequest(format!("Invalid exam filter: {}", other))),
        }
    }

    pub fn for_question(question: &Question) -> Self {
        match question.exam_id {
            Some(id) => ExamScope::Exam(id),
            None => ExamScope::Unassigned,
        }
    }
}

#[derive(Clone)]
pub struct QuestionService {
    pool: PgPool,
}

impl QuestionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateQuestionPayload) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "INSERT INTO questions (name, display_name, question_type, tags, exam_id)
             VALUES ($1, $1, $2, $3, $4)
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(payload.name)
        .bind(payload.question_type.as_slug())
        .bind(payload.tags.to_stored())
        .bind(payload.exam_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Editor save: one write carrying the whole uncommitted local state.
    /// The answer key is decoded against the question's current type and must
    /// stay consistent with the option list being saved.
    pub async fn save(&self, id: Uuid, payload: SaveQuestionPayload) -> Result<Question> {
        let current = self.get_by_id(id).await?;

        let display_name = payload.display_name.unwrap_or(current.display_name);
        let body = payload.body.unwrap_or(current.body);
        let options = payload.options.unwrap_or(current.options);
        let answer = match payload.correct_answer {
            Some(raw) => AnswerKey::from_stored(current.question_type, &raw),
            None => current.answer,
        };
        answer.validate_against(&options)?;
        let points = clamp_points(payload.points.unwrap_or(current.points));

        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "UPDATE questions
             SET display_name = $2, body = $3, options = $4, correct_answer = $5, points = $6
             WHERE id = $1
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id)
        .bind(display_name)
        .bind(body)
        .bind(serde_json::to_value(&options)?)
        .bind(answer.to_stored(&options))
        .bind(points)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn rename(&self, id: Uuid, name: String) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "UPDATE questions SET name = $2 WHERE id = $1 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Type switch only rewrites the type column. The old `options` and
    /// `correct_answer` payload stays behind, exactly as the editors leave
    /// it when re-routing to another variant.
    pub async fn change_type(&self, id: Uuid, question_type: QuestionType) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "UPDATE questions SET question_type = $2 WHERE id = $1 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id)
        .bind(question_type.as_slug())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Direct single-field update; the caller refetches its collection.
    pub async fn assign_to_exam(&self, id: Uuid, exam_id: Option<Uuid>) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "UPDATE questions SET exam_id = $2 WHERE id = $1 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id)
        .bind(exam_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM questions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn bulk_delete(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM questions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Duplicate of the full record: same tags, parent and payload, fresh
    /// identity and timestamp, name suffixed with " (Copy)".
    pub async fn copy(&self, id: Uuid) -> Result<Question> {
        let source = self.get_by_id(id).await?;

        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "INSERT INTO questions
                 (name, display_name, body, question_type, tags, options, correct_answer,
                  attachments, points, exam_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(copy_name(&source.name))
        .bind(source.display_name)
        .bind(source.body)
        .bind(source.question_type.as_slug())
        .bind(source.tags.to_stored())
        .bind(serde_json::to_value(&source.options)?)
        .bind(source.answer.to_stored(&source.options))
        .bind(serde_json::to_value(&source.attachments)?)
        .bind(source.points)
        .bind(source.exam_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Tag changes write through immediately, unlike the rest of the editor
    /// state which only commits on save. Adding a present tag is a no-op.
    pub async fn add_tag(&self, id: Uuid, tag: &str) -> Result<Question> {
        let mut question = self.get_by_id(id).await?;
        if !question.tags.insert(tag) {
            return Ok(question);
        }
        self.write_tags(id, &question.tags).await
    }

    /// Removing an absent tag is a no-op.
    pub async fn remove_tag(&self, id: Uuid, tag: &str) -> Result<Question> {
        let mut question = self.get_by_id(id).await?;
        if !question.tags.remove(tag) {
            return Ok(question);
        }
        self.write_tags(id, &question.tags).await
    }

    async fn write_tags(&self, id: Uuid, tags: &Tags) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "UPDATE questions SET tags = $2 WHERE id = $1 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id)
        .bind(tags.to_stored())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Upload descriptors persist as soon as the object is stored.
    pub async fn add_attachment(&self, id: Uuid, attachment: Attachment) -> Result<Question> {
        let mut question = self.get_by_id(id).await?;
        question.attachments.push(attachment);
        self.write_attachments(id, &question.attachments).await
    }

    /// Drops the descriptor only; the stored object itself is left in place.
    pub async fn remove_attachment(&self, id: Uuid, url: &str) -> Result<Question> {
        let mut question = self.get_by_id(id).await?;
        question.attachments.retain(|a| a.url != url);
        self.write_attachments(id, &question.attachments).await
    }

    async fn write_attachments(&self, id: Uuid, attachments: &[Attachment]) -> Result<Question> {
        let row = sqlx::query_as::<_, QuestionRow>(&format!(
            "UPDATE questions SET attachments = $2 WHERE id = $1 RETURNING {QUESTION_COLUMNS}"
        ))
        .bind(id)
        .bind(serde_json::to_value(attachments)?)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    /// Exam scoping happens in SQL, in fetch order (newest first); search,
    /// tag filter and sort run over the fetched list.
    pub async fn list(&self, query: QuestionListQuery) -> Result<Vec<Question>> {
        let scope = ExamScope::parse(query.exam.as_deref())?;
        let mut questions = self.fetch_scope(scope).await?;

        if let Some(needle) = query.search.as_deref() {
            questions = filter_search(questions, needle);
        }
        questions = filter_tags(questions, &TagSelector::parse(query.tag.as_deref()));
        sort_entries(
            &mut questions,
            query.sort.unwrap_or(SortField::CreatedAt),
            query.order.unwrap_or(SortOrder::Desc),
        );

        Ok(questions)
    }

    async fn fetch_scope(&self, scope: ExamScope) -> Result<Vec<Question>> {
        let statement = match scope {
            ExamScope::All => format!(
                "SELECT {QUESTION_COLUMNS} FROM questions ORDER BY created_at DESC"
            ),
            ExamScope::Unassigned => format!(
                "SELECT {QUESTION_COLUMNS} FROM questions WHERE exam_id IS NULL
                 ORDER BY created_at DESC"
            ),
            ExamScope::Exam(_) => format!(
                "SELECT {QUESTION_COLUMNS} FROM questions WHERE exam_id = $1
                 ORDER BY created_at DESC"
            ),
        };

        let mut fetch = sqlx::query_as::<_, QuestionRow>(&statement);
        if let ExamScope::Exam(exam_id) = scope {
            fetch = fetch.bind(exam_id);
        }
        let rows = fetch.fetch_all(&self.pool).await?;

        Ok(rows.into_iter().map(Question::from).collect())
    }

    /// Previous/next within the question's own scope, in fetch order.
    /// Boundaries report no neighbor.
    pub async fn neighbors(&self, id: Uuid) -> Result<(Option<Uuid>, Option<Uuid>)> {
        let question = self.get_by_id(id).await?;
        let siblings = self
            .fetch_scope(ExamScope::for_question(&question))
            .await?;

        let position = siblings.iter().position(|q| q.id == id).ok_or_else(|| {
            Error::Internal("Question missing from its own sibling list".to_string())
        })?;
        let prev = position.checked_sub(1).map(|i| siblings[i].id);
        let next = siblings.get(position + 1).map(|q| q.id);

        Ok((prev, next))
    }

    pub async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, QuestionRow>(&format!(
            "SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ANY($1)
             ORDER BY created_at DESC"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Question::from).collect())
    }
}
