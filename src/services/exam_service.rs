use crate::dto::exam_dto::{CreateExamPayload, ExamListQuery, UpdateExamPayload};
use crate::error::{Error, Result};
use crate::models::exam::{copy_name, normalize_subject_code, Exam};
use crate::utils::listing::{filter_search, sort_entries, SortField, SortOrder};
use sqlx::PgPool;
use uuid::Uuid;

const EXAM_COLUMNS: &str =
    "id, name, description, subject_id, is_public, is_deleted, deleted_at, created_at";

#[derive(Clone)]
pub struct ExamService {
    pool: PgPool,
}

impl ExamService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, payload: CreateExamPayload) -> Result<Exam> {
        let subject_id = normalize_subject(payload.subject_id);
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "INSERT INTO exams (name, description, subject_id, is_public)
             VALUES ($1, $2, $3, $4)
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(payload.name)
        .bind(payload.description)
        .bind(subject_id)
        .bind(payload.is_public.unwrap_or(false))
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    pub async fn update(&self, id: Uuid, payload: UpdateExamPayload) -> Result<Exam> {
        let current = self.get_by_id(id).await?;

        let description = payload.description.unwrap_or(current.description);
        let subject_id = match payload.subject_id {
            Some(code) => normalize_subject(Some(code)),
            None => current.subject_id,
        };
        let is_public = payload.is_public.unwrap_or(current.is_public);

        let exam = sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams SET description = $2, subject_id = $3, is_public = $4
             WHERE id = $1
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(id)
        .bind(description)
        .bind(subject_id)
        .bind(is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    pub async fn rename(&self, id: Uuid, name: String) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams SET name = $2 WHERE id = $1 RETURNING {EXAM_COLUMNS}"
        ))
        .bind(id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    /// Scoping (active vs. deleted view, subject) happens in SQL; search and
    /// sort run over the fetched list, the way the dashboard did it.
    pub async fn list(&self, query: ExamListQuery) -> Result<Vec<Exam>> {
        let deleted_view = query.deleted.unwrap_or(false);
        let subject = query.subject.map(|s| normalize_subject_code(&s));

        let mut exams = sqlx::query_as::<_, Exam>(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams
             WHERE is_deleted = $1
               AND ($2::text IS NULL OR subject_id = $2)
             ORDER BY created_at DESC"
        ))
        .bind(deleted_view)
        .bind(subject)
        .fetch_all(&self.pool)
        .await?;

        if let Some(needle) = query.search.as_deref() {
            exams = filter_search(exams, needle);
        }
        sort_entries(
            &mut exams,
            query.sort.unwrap_or(SortField::CreatedAt),
            query.order.unwrap_or(SortOrder::Desc),
        );

        Ok(exams)
    }

    pub async fn soft_delete(&self, id: Uuid) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams SET is_deleted = TRUE, deleted_at = NOW()
             WHERE id = $1
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    /// Clears the soft-delete marker and nothing else.
    pub async fn restore(&self, id: Uuid) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams SET is_deleted = FALSE, deleted_at = NULL
             WHERE id = $1
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    /// Hard delete is only reachable from the deleted view.
    pub async fn purge(&self, id: Uuid) -> Result<()> {
        let exam = self.get_by_id(id).await?;
        if !exam.is_deleted {
            return Err(Error::BadRequest(
                "Exam must be deleted before it can be removed permanently".to_string(),
            ));
        }

        sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn set_public(&self, id: Uuid, is_public: bool) -> Result<Exam> {
        let exam = sqlx::query_as::<_, Exam>(&format!(
            "UPDATE exams SET is_public = $2 WHERE id = $1 RETURNING {EXAM_COLUMNS}"
        ))
        .bind(id)
        .bind(is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    /// Duplicate with a fresh identity and timestamp; the soft-delete state
    /// is not carried over.
    pub async fn copy(&self, id: Uuid) -> Result<Exam> {
        let source = self.get_by_id(id).await?;

        let exam = sqlx::query_as::<_, Exam>(&format!(
            "INSERT INTO exams (name, description, subject_id, is_public)
             VALUES ($1, $2, $3, $4)
             RETURNING {EXAM_COLUMNS}"
        ))
        .bind(copy_name(&source.name))
        .bind(source.description)
        .bind(source.subject_id)
        .bind(source.is_public)
        .fetch_one(&self.pool)
        .await?;

        Ok(exam)
    }

    pub async fn bulk_soft_delete(&self, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query(
            "UPDATE exams SET is_deleted = TRUE, deleted_at = NOW() WHERE id = ANY($1)",
        )
        .bind(ids)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

fn normalize_subject(subject_id: Option<String>) -> Option<String> {
    subject_id
        .map(|code| normalize_subject_code(&code))
        .filter(|code| !code.is_empty())
}
