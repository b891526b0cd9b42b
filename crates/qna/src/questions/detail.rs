use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use qna_core::format::format_timestamp;
use qna_core::question::{
    transform_question_detail, QuestionDetail, RawLikeResponse, RawQuestionDetailResponse,
};
use qna_core::validation::{parse_question_id, validate_comment, validate_question_id};
use serde::{Deserialize, Serialize};

use super::format_tags;
use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::ApiResult;

#[derive(Debug, clap::Args, Clone)]
pub struct ShowOptions {
    /// Question ID or URL (e.g., "12" or "http://localhost:3001/questions/12")
    pub question: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, clap::Args, Clone)]
pub struct CommentOptions {
    /// Question ID or URL
    pub question: String,

    /// Comment text (Markdown)
    pub content: String,
}

#[derive(Debug, clap::Args, Clone)]
pub struct LikeOptions {
    /// Question ID or URL
    pub question: String,
}

#[derive(Debug, Serialize)]
struct CommentRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

/// Result of a like request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    /// The like was recorded; `like_count` is the new canonical count, or
    /// `None` when the server sent no count and the refetch failed
    Liked { like_count: Option<u64> },
    /// A like for the same question was already in flight
    Suppressed,
}

/// Marks a question as having a like in flight until dropped
struct LikeGuard {
    liking: Arc<Mutex<HashSet<u64>>>,
    question_id: u64,
}

impl LikeGuard {
    fn acquire(liking: &Arc<Mutex<HashSet<u64>>>, question_id: u64) -> Option<Self> {
        let inserted = liking
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(question_id);

        inserted.then(|| Self {
            liking: Arc::clone(liking),
            question_id,
        })
    }
}

impl Drop for LikeGuard {
    fn drop(&mut self) {
        self.liking
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.question_id);
    }
}

/// Reads and mutates a single question
#[derive(Debug, Clone)]
pub struct DetailController {
    client: ApiClient,
    liking: Arc<Mutex<HashSet<u64>>>,
}

impl DetailController {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            liking: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Fetch a question with its tags and comments
    pub async fn fetch_question_detail(&self, question_id: u64) -> ApiResult<QuestionDetail> {
        let id = validate_question_id(question_id)?;
        let raw: RawQuestionDetailResponse =
            self.client.get(&format!("/questions/{id}"), &[]).await?;

        Ok(transform_question_detail(raw)?)
    }

    /// Post a comment
    ///
    /// Whitespace-only content is rejected before any request is made. The
    /// server assigns the comment's id and timestamp, so callers refetch the
    /// detail to show it.
    pub async fn add_comment(&self, question_id: u64, content: &str) -> ApiResult<()> {
        let id = validate_question_id(question_id)?;
        let content = validate_comment(content)?;

        let response: MessageResponse = self
            .client
            .post(&format!("/questions/{id}/comments"), &CommentRequest { content })
            .await?;
        log::debug!("Comment added to question {}: {:?}", id, response.message);

        Ok(())
    }

    /// Like a question
    ///
    /// At most one like per question is in flight; overlapping calls return
    /// [`LikeOutcome::Suppressed`] without sending anything. The new count
    /// comes from the response when the server includes it and from a
    /// refetch otherwise. Once the like is accepted the outcome is `Liked`,
    /// even when that refetch fails.
    pub async fn like_question(&self, question_id: u64) -> ApiResult<LikeOutcome> {
        let id = validate_question_id(question_id)?;

        let Some(_guard) = LikeGuard::acquire(&self.liking, id) else {
            log::debug!("Like for question {} already in flight", id);
            return Ok(LikeOutcome::Suppressed);
        };

        let response: RawLikeResponse = self
            .client
            .post_empty(&format!("/questions/{id}/like"))
            .await?;

        let like_count = match response.like_count() {
            Some(count) => Some(count),
            None => match self.fetch_question_detail(id).await {
                Ok(detail) => Some(detail.question.like_count),
                Err(err) => {
                    log::warn!("Liked question {} but could not refresh its count: {}", id, err);
                    None
                }
            },
        };

        Ok(LikeOutcome::Liked { like_count })
    }

    /// Whether a like for this question is in flight
    #[cfg(test)]
    pub fn is_liking(&self, question_id: u64) -> bool {
        self.liking
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&question_id)
    }
}

fn controller(global: &crate::Global) -> Result<DetailController> {
    let client = ApiClient::new(&ApiConfig::from_global(global)?)?;
    Ok(DetailController::new(client))
}

pub async fn run_show(options: ShowOptions, global: crate::Global) -> Result<()> {
    let id = parse_question_id(&options.question)?;

    if global.verbose {
        eprintln!("Fetching question ID: {}", id);
    }

    let detail = controller(&global)?.fetch_question_detail(id).await?;

    if options.json {
        let json = serde_json::to_string_pretty(&detail)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{}", json);
    } else {
        print!("{}", format_detail_text(&detail));
    }

    Ok(())
}

pub async fn run_comment(options: CommentOptions, global: crate::Global) -> Result<()> {
    let id = parse_question_id(&options.question)?;
    let controller = controller(&global)?;

    controller.add_comment(id, &options.content).await?;
    println!("{}", "Comment added.".green());

    let detail = controller.fetch_question_detail(id).await?;
    print!("{}", format_comments_text(&detail));

    Ok(())
}

pub async fn run_like(options: LikeOptions, global: crate::Global) -> Result<()> {
    let id = parse_question_id(&options.question)?;

    match controller(&global)?.like_question(id).await? {
        LikeOutcome::Liked {
            like_count: Some(like_count),
        } => println!(
            "{} {}: {}",
            f!("Liked question {id}.").green(),
            "Likes".bright_white(),
            like_count.to_string().bright_magenta()
        ),
        LikeOutcome::Liked { like_count: None } => println!(
            "{} {}",
            f!("Liked question {id}.").green(),
            "The new count could not be loaded.".bright_black()
        ),
        LikeOutcome::Suppressed => println!("{}", "A like is already in progress.".yellow()),
    }

    Ok(())
}

/// Convert a question detail to formatted text with colors
pub fn format_detail_text(detail: &QuestionDetail) -> String {
    let question = &detail.question;
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!(
        "{} {}\n",
        format!("[{}]", question.id).yellow().bold(),
        question.title.white().bold()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    let mut table = new_table();
    table.add_row(prettytable::row!["Views", question.view_count]);
    table.add_row(prettytable::row!["Likes", question.like_count]);
    table.add_row(prettytable::row![
        "Asked",
        format_timestamp(&question.created_at)
    ]);
    if question.updated_at != question.created_at {
        table.add_row(prettytable::row![
            "Updated",
            format_timestamp(&question.updated_at)
        ]);
    }
    if !detail.tags.is_empty() {
        table.add_row(prettytable::row!["Tags", format_tags(&detail.tags)]);
    }
    result.push_str(&table.to_string());

    result.push_str(&format!("\n{}\n", question.content));
    result.push_str(&format_comments_text(detail));
    result
}

fn format_comments_text(detail: &QuestionDetail) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "-".repeat(80).bright_yellow()));
    result.push_str(&format!(
        "{}\n",
        format!("COMMENTS ({})", detail.comments.len())
            .bright_yellow()
            .bold()
    ));
    result.push_str(&format!("{}\n", "-".repeat(80).bright_yellow()));

    if detail.comments.is_empty() {
        result.push_str(&format!("\n{}\n", "No comments yet.".yellow()));
    }

    for comment in &detail.comments {
        result.push_str(&format!(
            "\n{} {}\n",
            format!("[#{}]", comment.id).yellow(),
            format_timestamp(&comment.created_at).bright_black()
        ));
        for line in comment.content.lines() {
            result.push_str(&format!("  {}\n", line));
        }
    }

    result.push('\n');
    result
}
