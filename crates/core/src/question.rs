//! Wire types for the questions API and their canonical view models
//!
//! The backend is inconsistent about counter names (`view_count` vs
//! `views_count`, `like_count` vs `likes_count`) and about which optional
//! sections it includes. Everything here resolves those differences once, at
//! the boundary, so rendering code only ever sees the canonical shapes.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Error raised when a response is missing a required section
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("Invalid response from server: missing {0}")]
    MissingField(&'static str),
}

/// Question as returned by the API
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct RawQuestion {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub views_count: Option<u64>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub likes_count: Option<u64>,
}

/// Comment as returned by the API
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RawComment {
    pub id: u64,
    pub question_id: u64,
    pub content: String,
    pub created_at: String,
}

/// Pagination block of the list response
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RawPagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// Body of `GET /questions`
///
/// Every section is optional here so that a partial payload can be mapped
/// (or rejected) explicitly instead of failing inside the JSON decoder.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawQuestionsResponse {
    #[serde(default)]
    pub questions: Option<Vec<RawQuestion>>,
    #[serde(default)]
    pub question_tags: Option<HashMap<String, Value>>,
    #[serde(default)]
    pub pagination: Option<RawPagination>,
}

/// Body of `GET /questions/{id}`
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawQuestionDetailResponse {
    #[serde(default)]
    pub question: Option<RawQuestion>,
    #[serde(default)]
    pub tags: Option<Value>,
    #[serde(default)]
    pub comments: Option<Value>,
}

/// Body of `POST /questions/{id}/like`
///
/// Older backends only send a message; newer ones include the new count
/// under either name.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawLikeResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub like_count: Option<u64>,
    #[serde(default)]
    pub likes_count: Option<u64>,
}

impl RawLikeResponse {
    /// The new like count, if the server reported one
    pub fn like_count(&self) -> Option<u64> {
        first_present(self.like_count, self.likes_count)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: u64,
    pub name: String,
}

/// Canonical question
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Question {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
    pub view_count: u64,
    pub like_count: u64,
}

/// Canonical comment
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: u64,
    pub question_id: u64,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Pagination metadata for list output
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

/// One page of questions with their tags
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct QuestionList {
    pub questions: Vec<Question>,
    pub tags_by_question_id: BTreeMap<u64, Vec<Tag>>,
    pub pagination: Option<PaginationMeta>,
}

impl QuestionList {
    /// Tags of a question, empty when the server sent none for it
    pub fn tags_for(&self, question_id: u64) -> &[Tag] {
        self.tags_by_question_id
            .get(&question_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// A question with everything the detail view shows
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct QuestionDetail {
    pub question: Question,
    pub tags: Vec<Tag>,
    pub comments: Vec<Comment>,
}

impl QuestionDetail {
    /// Patch the canonical like counter after a successful like
    pub fn apply_like_count(&mut self, like_count: u64) {
        self.question.like_count = like_count;
    }
}

fn first_present(primary: Option<u64>, alternate: Option<u64>) -> Option<u64> {
    primary.or(alternate)
}

/// Resolve a counter the server may send under two names
///
/// The primary name wins when present; `null` counts as absent.
pub fn resolve_counter(primary: Option<u64>, alternate: Option<u64>) -> u64 {
    first_present(primary, alternate).unwrap_or(0)
}

pub fn map_question(raw: RawQuestion) -> Question {
    Question {
        view_count: resolve_counter(raw.view_count, raw.views_count),
        like_count: resolve_counter(raw.like_count, raw.likes_count),
        id: raw.id,
        title: raw.title,
        content: raw.content,
        created_at: raw.created_at,
        updated_at: raw.updated_at,
    }
}

/// Comments have no edit history, so `updated_at` mirrors `created_at`
pub fn map_comment(raw: RawComment) -> Comment {
    Comment {
        updated_at: raw.created_at.clone(),
        id: raw.id,
        question_id: raw.question_id,
        content: raw.content,
        created_at: raw.created_at,
    }
}

pub fn map_pagination(raw: RawPagination) -> PaginationMeta {
    PaginationMeta {
        current_page: raw.page,
        total_pages: raw.total_pages,
        total_items: raw.total,
        items_per_page: raw.limit,
    }
}

/// Decode a JSON array leniently: anything but an array is empty, and
/// elements that don't decode are skipped.
fn lenient_array<T: DeserializeOwned>(value: Option<Value>) -> Vec<T> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    }
}

/// Map the `question_tags` section of a list response
///
/// Keys that aren't question ids are dropped; entries that aren't arrays map
/// to an empty tag list.
pub fn map_tag_index(raw: Option<HashMap<String, Value>>) -> BTreeMap<u64, Vec<Tag>> {
    raw.unwrap_or_default()
        .into_iter()
        .filter_map(|(key, tags)| {
            let id = key.trim().parse::<u64>().ok()?;
            Some((id, lenient_array(Some(tags))))
        })
        .collect()
}

/// Transform a list response into the list view model
pub fn transform_questions_response(raw: RawQuestionsResponse) -> Result<QuestionList, MapError> {
    let questions = raw
        .questions
        .ok_or(MapError::MissingField("questions"))?
        .into_iter()
        .map(map_question)
        .collect();

    Ok(QuestionList {
        questions,
        tags_by_question_id: map_tag_index(raw.question_tags),
        pagination: raw.pagination.map(map_pagination),
    })
}

/// Transform a detail response into the detail view model
pub fn transform_question_detail(
    raw: RawQuestionDetailResponse,
) -> Result<QuestionDetail, MapError> {
    let question = raw.question.ok_or(MapError::MissingField("question"))?;

    Ok(QuestionDetail {
        question: map_question(question),
        tags: lenient_array(raw.tags),
        comments: lenient_array::<RawComment>(raw.comments)
            .into_iter()
            .map(map_comment)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_question(id: u64) -> RawQuestion {
        RawQuestion {
            id,
            title: format!("Question {id}"),
            content: "How do I do the thing?".to_string(),
            created_at: "2024-03-01T10:00:00Z".to_string(),
            updated_at: "2024-03-01T10:00:00Z".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_counter_defaults_to_zero() {
        assert_eq!(resolve_counter(None, None), 0);
    }

    #[test]
    fn test_resolve_counter_prefers_primary() {
        assert_eq!(resolve_counter(Some(3), Some(7)), 3);
        assert_eq!(resolve_counter(Some(0), Some(7)), 0);
    }

    #[test]
    fn test_resolve_counter_falls_back_to_alternate() {
        assert_eq!(resolve_counter(None, Some(7)), 7);
    }

    #[test]
    fn test_map_question_missing_counters() {
        let question = map_question(raw_question(1));
        assert_eq!(question.view_count, 0);
        assert_eq!(question.like_count, 0);
    }

    #[test]
    fn test_map_question_both_names_present() {
        let mut raw = raw_question(1);
        raw.view_count = Some(10);
        raw.views_count = Some(99);
        raw.like_count = Some(2);
        raw.likes_count = Some(98);

        let question = map_question(raw);
        assert_eq!(question.view_count, 10);
        assert_eq!(question.like_count, 2);
    }

    #[test]
    fn test_raw_question_null_counter_is_absent() {
        let raw: RawQuestion = serde_json::from_value(json!({
            "id": 4,
            "title": "t",
            "content": "c",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:00:00Z",
            "view_count": null,
            "views_count": 12
        }))
        .unwrap();

        assert_eq!(map_question(raw).view_count, 12);
    }

    #[test]
    fn test_map_comment_mirrors_created_at() {
        let comment = map_comment(RawComment {
            id: 3,
            question_id: 1,
            content: "Try `cargo clean`".to_string(),
            created_at: "2024-03-02T08:30:00Z".to_string(),
        });

        assert_eq!(comment.updated_at, "2024-03-02T08:30:00Z");
        assert_eq!(comment.created_at, comment.updated_at);
    }

    #[test]
    fn test_map_tag_index_malformed_entries() {
        let mut raw = HashMap::new();
        raw.insert("1".to_string(), json!([{"id": 9, "name": "go"}]));
        raw.insert("2".to_string(), json!("not-an-array"));
        raw.insert("3".to_string(), json!(null));
        raw.insert("abc".to_string(), json!([{"id": 1, "name": "rust"}]));

        let index = map_tag_index(Some(raw));

        assert_eq!(index.len(), 3);
        assert_eq!(
            index[&1],
            vec![Tag {
                id: 9,
                name: "go".to_string()
            }]
        );
        assert!(index[&2].is_empty());
        assert!(index[&3].is_empty());
    }

    #[test]
    fn test_map_tag_index_absent() {
        assert!(map_tag_index(None).is_empty());
    }

    #[test]
    fn test_transform_questions_response_end_to_end() {
        let raw: RawQuestionsResponse = serde_json::from_value(json!({
            "questions": [{
                "id": 1,
                "title": "How to read a file?",
                "content": "I need to read a file line by line.",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-01T10:00:00Z",
                "views_count": 5
            }],
            "question_tags": {"1": [{"id": 9, "name": "go"}]},
            "pagination": {"total": 1, "page": 1, "limit": 10, "total_pages": 1}
        }))
        .unwrap();

        let list = transform_questions_response(raw).unwrap();

        assert_eq!(list.questions.len(), 1);
        assert_eq!(list.questions[0].view_count, 5);
        assert_eq!(list.questions[0].like_count, 0);
        assert_eq!(
            list.tags_for(1),
            &[Tag {
                id: 9,
                name: "go".to_string()
            }]
        );
        assert_eq!(
            list.pagination,
            Some(PaginationMeta {
                current_page: 1,
                total_pages: 1,
                total_items: 1,
                items_per_page: 10,
            })
        );
    }

    #[test]
    fn test_transform_questions_response_without_tags_or_pagination() {
        let raw = RawQuestionsResponse {
            questions: Some(vec![raw_question(1)]),
            question_tags: None,
            pagination: None,
        };

        let list = transform_questions_response(raw).unwrap();

        assert!(list.tags_for(1).is_empty());
        assert!(list.pagination.is_none());
    }

    #[test]
    fn test_transform_questions_response_missing_questions() {
        let result = transform_questions_response(RawQuestionsResponse::default());
        assert_eq!(result, Err(MapError::MissingField("questions")));
    }

    #[test]
    fn test_transform_question_detail() {
        let raw: RawQuestionDetailResponse = serde_json::from_value(json!({
            "question": {
                "id": 1,
                "title": "How to read a file?",
                "content": "body",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-01T11:00:00Z",
                "like_count": 4,
                "likes_count": 4,
                "view_count": 20,
                "views_count": 20
            },
            "tags": [{"id": 1, "name": "io"}],
            "comments": [
                {"id": 5, "question_id": 1, "content": "Use BufReader", "created_at": "2024-03-01T12:00:00Z"},
                {"bogus": true}
            ],
            "likes": 4
        }))
        .unwrap();

        let detail = transform_question_detail(raw).unwrap();

        assert_eq!(detail.question.like_count, 4);
        assert_eq!(detail.question.view_count, 20);
        assert_eq!(detail.tags.len(), 1);
        assert_eq!(detail.comments.len(), 1);
        assert_eq!(detail.comments[0].updated_at, "2024-03-01T12:00:00Z");
    }

    #[test]
    fn test_transform_question_detail_malformed_sections() {
        let raw: RawQuestionDetailResponse = serde_json::from_value(json!({
            "question": {
                "id": 1,
                "title": "t",
                "content": "c",
                "created_at": "2024-03-01T10:00:00Z",
                "updated_at": "2024-03-01T10:00:00Z"
            },
            "tags": {"unexpected": "object"},
            "comments": null
        }))
        .unwrap();

        let detail = transform_question_detail(raw).unwrap();

        assert!(detail.tags.is_empty());
        assert!(detail.comments.is_empty());
    }

    #[test]
    fn test_transform_question_detail_missing_question() {
        let result = transform_question_detail(RawQuestionDetailResponse::default());
        assert_eq!(result, Err(MapError::MissingField("question")));
    }

    #[test]
    fn test_apply_like_count() {
        let mut detail = QuestionDetail {
            question: map_question(raw_question(1)),
            tags: vec![],
            comments: vec![],
        };

        detail.apply_like_count(8);
        assert_eq!(detail.question.like_count, 8);
    }

    #[test]
    fn test_like_response_count() {
        let raw: RawLikeResponse =
            serde_json::from_value(json!({"message": "Question liked successfully"})).unwrap();
        assert_eq!(raw.like_count(), None);

        let raw: RawLikeResponse = serde_json::from_value(json!({"likes_count": 6})).unwrap();
        assert_eq!(raw.like_count(), Some(6));
    }
}
