//! In-memory list operations for the dashboard views: case-insensitive
//! substring search, tag filtering, and field sorting. The collections are
//! small (one exam's worth of rows, or one author's), so these run over the
//! scoped fetch rather than in SQL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::exam::Exam;
use crate::models::question::Question;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

pub trait ListEntry {
    fn label(&self) -> &str;
    fn summary(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
}

impl ListEntry for Exam {
    fn label(&self) -> &str {
        &self.name
    }
    fn summary(&self) -> &str {
        &self.description
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl ListEntry for Question {
    fn label(&self) -> &str {
        &self.name
    }
    fn summary(&self) -> &str {
        &self.body
    }
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Empty needle matches everything.
pub fn matches_search<T: ListEntry>(entry: &T, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let needle = needle.to_lowercase();
    entry.label().to_lowercase().contains(&needle)
        || entry.summary().to_lowercase().contains(&needle)
}

pub fn filter_search<T: ListEntry>(items: Vec<T>, needle: &str) -> Vec<T> {
    items
        .into_iter()
        .filter(|item| matches_search(item, needle))
        .collect()
}

/// Tag filter: a concrete label (exact match) or the "untagged" pseudo-tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelector {
    Any,
    Untagged,
    Label(String),
}

impl TagSelector {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None => TagSelector::Any,
            Some("") => TagSelector::Any,
            Some("untagged") => TagSelector::Untagged,
            Some(label) => TagSelector::Label(label.to_string()),
        }
    }
}

pub fn filter_tags(questions: Vec<Question>, selector: &TagSelector) -> Vec<Question> {
    questions
        .into_iter()
        .filter(|q| match selector {
            TagSelector::Any => true,
            TagSelector::Untagged => q.tags.is_empty(),
            TagSelector::Label(label) => q.tags.contains(label),
        })
        .collect()
}

pub fn sort_entries<T: ListEntry>(items: &mut [T], field: SortField, order: SortOrder) {
    items.sort_by(|a, b| {
        let ordering = match field {
            SortField::Name => a.label().to_lowercase().cmp(&b.label().to_lowercase()),
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{AnswerKey, QuestionType, Tags};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn question(name: &str, body: &str, tags: &[&str], minute: u32) -> Question {
        Question {
            id: Uuid::new_v4(),
            name: name.to_string(),
            display_name: String::new(),
            body: body.to_string(),
            question_type: QuestionType::Text,
            tags: Tags::from_labels(tags.iter().copied()),
            options: Vec::new(),
            answer: AnswerKey::Text,
            attachments: Vec::new(),
            points: 0,
            exam_id: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 10, minute, 0).unwrap(),
        }
    }

    #[test]
    fn empty_needle_returns_full_input() {
        let items = vec![question("a", "", &[], 0), question("b", "", &[], 1)];
        assert_eq!(filter_search(items, "").len(), 2);
    }

    #[test]
    fn absent_needle_returns_empty() {
        let items = vec![
            question("Derivatives", "chain rule", &[], 0),
            question("Integrals", "", &[], 1),
        ];
        assert!(filter_search(items, "statistics").is_empty());
    }

    #[test]
    fn search_is_case_insensitive_over_name_and_body() {
        let items = vec![
            question("Derivatives", "", &[], 0),
            question("q2", "the CHAIN rule", &[], 1),
            question("q3", "", &[], 2),
        ];
        let hits = filter_search(items, "chain");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "q2");
    }

    #[test]
    fn tag_filter_exact_and_untagged() {
        let items = vec![
            question("a", "", &["algebra"], 0),
            question("b", "", &["algebra", "hard"], 1),
            question("c", "", &[], 2),
        ];
        let algebra = filter_tags(items.clone(), &TagSelector::Label("algebra".into()));
        assert_eq!(algebra.len(), 2);

        let untagged = filter_tags(items.clone(), &TagSelector::Untagged);
        assert_eq!(untagged.len(), 1);
        assert_eq!(untagged[0].name, "c");

        // prefix of a tag is not a match
        let partial = filter_tags(items, &TagSelector::Label("alge".into()));
        assert!(partial.is_empty());
    }

    #[test]
    fn sort_desc_is_exact_reverse_of_asc() {
        let mut asc = vec![
            question("delta", "", &[], 3),
            question("alpha", "", &[], 1),
            question("charlie", "", &[], 4),
            question("bravo", "", &[], 2),
        ];
        let mut desc = asc.clone();

        sort_entries(&mut asc, SortField::Name, SortOrder::Asc);
        sort_entries(&mut desc, SortField::Name, SortOrder::Desc);
        let reversed: Vec<&str> = desc.iter().rev().map(|q| q.name.as_str()).collect();
        let forward: Vec<&str> = asc.iter().map(|q| q.name.as_str()).collect();
        assert_eq!(forward, reversed);

        sort_entries(&mut asc, SortField::CreatedAt, SortOrder::Desc);
        assert_eq!(asc[0].name, "charlie");
    }
}
