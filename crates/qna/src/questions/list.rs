use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use qna_core::format::{content_preview, format_timestamp};
use qna_core::pagination::pagination_links;
use qna_core::query::{health_check_params, QueryState, SortKey, SortOrder};
use qna_core::question::{transform_questions_response, QuestionList, RawQuestionsResponse};

use super::{format_page_links, format_tags};
use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::ApiResult;

const PREVIEW_CHARS: usize = 160;

#[derive(Debug, clap::Args, Clone)]
pub struct ListOptions {
    /// Page number (1-indexed)
    #[arg(short, long, default_value = "1", value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Sort key: created_at, like_count, view_count
    #[arg(short, long, default_value = "created_at")]
    pub sort: SortKey,

    /// Sort order: asc, desc
    #[arg(short, long, default_value = "desc")]
    pub order: SortOrder,

    /// Only show questions with this tag
    #[arg(short, long)]
    pub tag: Option<String>,

    /// Only show questions whose title or content contains this text
    #[arg(long)]
    pub search: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ListOptions {
    pub fn query_state(&self) -> QueryState {
        QueryState {
            page: self.page,
            sort: self.sort,
            order: self.order,
            tag: self.tag.clone(),
            search: self.search.clone(),
        }
    }
}

pub async fn run(options: ListOptions, global: crate::Global) -> Result<()> {
    let client = ApiClient::new(&ApiConfig::from_global(&global)?)?;
    let query = options.query_state();

    if global.verbose {
        eprintln!("Fetching questions with params: {:?}", query.to_params());
    }

    let list = fetch_questions(&client, &query).await?;

    if options.json {
        println!("{}", format_list_json(&list)?);
    } else {
        print!("{}", format_list_text(&list, &query));
    }

    Ok(())
}

/// Fetch one page of questions and map it into the list view model
pub async fn fetch_questions(client: &ApiClient, query: &QueryState) -> ApiResult<QuestionList> {
    let raw: RawQuestionsResponse = client.get("/questions", &query.to_params()).await?;
    Ok(transform_questions_response(raw)?)
}

/// Whether the backend answers a minimal list request
pub async fn check_health(client: &ApiClient) -> bool {
    client
        .get::<serde::de::IgnoredAny>("/questions", &health_check_params())
        .await
        .is_ok()
}

/// Outcome of a [`QuestionFeed::refresh`]
#[derive(Debug, Clone, PartialEq)]
pub enum FeedUpdate {
    /// The response was the latest issued and is now the feed's state
    Applied(QuestionList),
    /// A newer refresh was issued while this one was in flight
    Stale,
}

/// The list a view is showing, kept consistent with the latest query
///
/// Every refresh takes a ticket when it is issued. When a response arrives
/// after a newer refresh was issued it is discarded, so the state always
/// reflects the most recently issued query.
#[derive(Debug)]
pub struct QuestionFeed {
    client: ApiClient,
    issued: AtomicU64,
    current: Mutex<Option<QuestionList>>,
}

impl QuestionFeed {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            issued: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn refresh(&self, query: &QueryState) -> ApiResult<FeedUpdate> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let result = fetch_questions(&self.client, query).await;

        if self.issued.load(Ordering::SeqCst) != ticket {
            log::debug!("Discarding stale response for {:?}", query.to_params());
            return Ok(FeedUpdate::Stale);
        }

        let list = result?;
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(list.clone());
        Ok(FeedUpdate::Applied(list))
    }

    /// Last applied list, if any
    #[cfg(test)]
    pub fn snapshot(&self) -> Option<QuestionList> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn format_list_json(list: &QuestionList) -> Result<String> {
    serde_json::to_string_pretty(list).map_err(|e| eyre!("JSON serialization failed: {}", e))
}

/// Convert a list to formatted text with colors
pub fn format_list_text(list: &QuestionList, query: &QueryState) -> String {
    let mut result = String::new();

    result.push_str(&format!("\n{}\n", "=".repeat(80).bright_cyan()));
    result.push_str(&format!("{}\n", query.heading().bright_cyan().bold()));
    result.push_str(&format!(
        "{}\n",
        format!("Sorted by {} ({})", query.sort, query.order).bright_black()
    ));
    result.push_str(&format!("{}\n", "=".repeat(80).bright_cyan()));

    if list.questions.is_empty() {
        result.push_str(&format!("\n{}\n", "No questions found.".yellow()));
    }

    for question in &list.questions {
        result.push_str(&format!(
            "\n{} {}\n",
            format!("[{}]", question.id).yellow().bold(),
            question.title.white().bold()
        ));

        let preview = content_preview(&question.content, PREVIEW_CHARS);
        if !preview.is_empty() {
            result.push_str(&format!("    {}\n", preview));
        }

        result.push_str(&format!(
            "    {}: {} | {}: {} | {}: {}\n",
            "Views".green(),
            question.view_count.to_string().bright_yellow(),
            "Likes".green(),
            question.like_count.to_string().bright_magenta(),
            "Asked".green(),
            format_timestamp(&question.created_at).bright_black()
        ));

        let tags = list.tags_for(question.id);
        if !tags.is_empty() {
            result.push_str(&format!("    {}: {}\n", "Tags".green(), format_tags(tags)));
        }
    }

    if let Some(meta) = &list.pagination {
        result.push_str(&format!(
            "\n{} {} {} {} ({} {})\n",
            "Showing page".bright_white(),
            meta.current_page.to_string().bright_cyan().bold(),
            "of".bright_white(),
            meta.total_pages.to_string().bright_cyan().bold(),
            meta.total_items.to_string().bright_cyan().bold(),
            "questions".bright_white()
        ));

        let links = pagination_links(Some(meta));
        if !links.is_empty() {
            result.push_str(&format!("{}\n", format_page_links(&links)));
        }
    }

    result.push('\n');
    result
}
