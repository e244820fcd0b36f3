use crate::error::Result;
use crate::models::subject::Subject;
use sqlx::PgPool;

#[derive(Clone)]
pub struct SubjectService {
    pool: PgPool,
}

impl SubjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Subjects come from the lookup table; when the table is empty or the
    /// query fails the hardcoded list is served instead, so exam creation
    /// keeps working.
    pub async fn list(&self) -> Result<Vec<Subject>> {
        let fetched = sqlx::query_as::<_, Subject>(
            "SELECT code, name FROM subjects ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await;

        match fetched {
            Ok(subjects) if !subjects.is_empty() => Ok(subjects),
            Ok(_) => Ok(fallback_subjects()),
            Err(e) => {
                tracing::warn!(error = ?e, "subject lookup failed, serving fallback list");
                Ok(fallback_subjects())
            }
        }
    }
}

pub fn fallback_subjects() -> Vec<Subject> {
    [
        ("ikt103", "Web Technologies"),
        ("ikt201", "Databases"),
        ("ikt210", "Information Security"),
        ("ikt218", "Operating Systems"),
        ("ma178", "Discrete Mathematics"),
    ]
    .into_iter()
    .map(|(code, name)| Subject {
        code: code.to_string(),
        name: name.to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_codes_are_lowercase() {
        for subject in fallback_subjects() {
            assert_eq!(subject.code, subject.code.to_lowercase());
        }
    }
}
