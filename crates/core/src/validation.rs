//! Local validation performed before anything reaches the network

use std::fmt;

use regex::Regex;
use serde::Serialize;

pub const TITLE_MIN_CHARS: usize = 10;
pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MIN_CHARS: usize = 30;
pub const MAX_TAGS: usize = 5;

/// A single invalid form field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid question ID: {0}")]
    InvalidQuestionId(String),

    #[error("Comment cannot be empty")]
    EmptyComment,

    #[error("Invalid question: {}", join_fields(.0))]
    InvalidForm(Vec<FieldError>),
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Question ids are positive integers
pub fn validate_question_id(id: u64) -> Result<u64, ValidationError> {
    if id == 0 {
        return Err(ValidationError::InvalidQuestionId(id.to_string()));
    }
    Ok(id)
}

/// Parse a question id from a bare number or a URL ending in `/questions/{id}`
pub fn parse_question_id(input: &str) -> Result<u64, ValidationError> {
    let input = input.trim();
    let invalid = || ValidationError::InvalidQuestionId(input.to_string());

    if let Ok(id) = input.parse::<u64>() {
        return validate_question_id(id).map_err(|_| invalid());
    }

    let re = Regex::new(r"/questions/(\d+)/?(?:[?#].*)?$").map_err(|_| invalid())?;
    let id = re
        .captures(input)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u64>().ok())
        .ok_or_else(invalid)?;

    validate_question_id(id).map_err(|_| invalid())
}

/// Trim a comment, rejecting whitespace-only content
pub fn validate_comment(content: &str) -> Result<&str, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(trimmed)
}

/// Payload of `POST /questions`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewQuestion {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

/// Tags are compared and stored lower-cased
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Add a tag to a tag list the way the create form does
///
/// Blank tags are ignored.
pub fn add_tag(tags: &mut Vec<String>, tag: &str) -> Result<(), FieldError> {
    let tag = normalize_tag(tag);
    if tag.is_empty() {
        return Ok(());
    }

    if tags.contains(&tag) {
        return Err(FieldError {
            field: "tags",
            message: "This tag is already added".to_string(),
        });
    }

    if tags.len() >= MAX_TAGS {
        return Err(FieldError {
            field: "tags",
            message: format!("You can add at most {MAX_TAGS} tags"),
        });
    }

    tags.push(tag);
    Ok(())
}

fn title_error(title: &str) -> Option<String> {
    let len = title.chars().count();
    if title.is_empty() {
        Some("Title is required".to_string())
    } else if len < TITLE_MIN_CHARS {
        Some(format!("Title must be at least {TITLE_MIN_CHARS} characters"))
    } else if len > TITLE_MAX_CHARS {
        Some(format!("Title must be at most {TITLE_MAX_CHARS} characters"))
    } else {
        None
    }
}

fn content_error(content: &str) -> Option<String> {
    if content.is_empty() {
        Some("Question content is required".to_string())
    } else if content.chars().count() < CONTENT_MIN_CHARS {
        Some(format!(
            "Question content must be at least {CONTENT_MIN_CHARS} characters"
        ))
    } else {
        None
    }
}

impl NewQuestion {
    /// Build a validated question from raw form input
    ///
    /// Title and content are trimmed, tags normalized. All field errors are
    /// reported together.
    pub fn new(title: &str, content: &str, tags: &[String]) -> Result<Self, ValidationError> {
        let title = title.trim();
        let content = content.trim();
        let mut errors = Vec::new();

        if let Some(message) = title_error(title) {
            errors.push(FieldError {
                field: "title",
                message,
            });
        }

        if let Some(message) = content_error(content) {
            errors.push(FieldError {
                field: "content",
                message,
            });
        }

        let mut normalized = Vec::new();
        for tag in tags {
            if let Err(err) = add_tag(&mut normalized, tag) {
                errors.push(err);
                break;
            }
        }

        if !errors.is_empty() {
            return Err(ValidationError::InvalidForm(errors));
        }

        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            tags: normalized,
        })
    }
}
