use std::time::Duration;

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use qna_core::query::{parse_nav_command, NavCommand, QueryState};
use qna_core::question::QuestionDetail;
use qna_core::validation::parse_question_id;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::watch;

use super::detail::{format_detail_text, DetailController, LikeOutcome};
use super::health::{BackendStatus, HealthMonitor, DEFAULT_POLL_SECS};
use super::list::{format_list_text, FeedUpdate, QuestionFeed};
use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::{ApiResult, Error};

const HELP: &str = "\
Commands:
  n, next            next page
  p, prev            previous page
  page N             jump to page N
  sort KEY           created_at | like_count | view_count
  order DIR          asc | desc
  tag NAME           filter by tag
  search TEXT        filter by text
  clear              drop tag and search filters
  r, refresh         reload the current page
  open ID            show a question with its comments
  like ID            like a question
  status             backend reachability
  help               this message
  q, quit            leave";

#[derive(Debug, clap::Args, Clone)]
pub struct BrowseOptions {
    /// Start filtered by this tag
    #[arg(long)]
    pub tag: Option<String>,

    /// Start filtered by this text
    #[arg(long)]
    pub search: Option<String>,

    /// Seconds between backend reachability checks
    #[arg(long, default_value_t = DEFAULT_POLL_SECS, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,
}

/// What the session wants the terminal to do after a command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Output(String),
    Quit,
}

/// Interactive question browser state
///
/// Owns the query state; every navigation command derives the next state and
/// only commits it once the list for it has been applied.
///
/// The backend status starts from the health monitor and is then updated by
/// both monitor changes and the outcome of every request the session makes.
/// While disconnected, navigation shows reachability guidance instead of
/// fetching; `refresh` always tries.
pub struct BrowseSession {
    query: QueryState,
    feed: QuestionFeed,
    detail: DetailController,
    monitor: watch::Receiver<BackendStatus>,
    status: BackendStatus,
    opened: Option<QuestionDetail>,
}

impl BrowseSession {
    pub fn new(
        client: ApiClient,
        query: QueryState,
        monitor: watch::Receiver<BackendStatus>,
    ) -> Self {
        let status = *monitor.borrow();
        Self {
            query,
            feed: QuestionFeed::new(client.clone()),
            detail: DetailController::new(client),
            monitor,
            status,
            opened: None,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    /// Run one command line
    pub async fn execute(&mut self, line: &str) -> ApiResult<Reply> {
        self.sync_status();
        let line = line.trim();

        if let Some(command) = parse_nav_command(line) {
            return match command {
                Ok(command) => self.navigate(&command).await,
                Err(message) => Ok(Reply::Output(message)),
            };
        }

        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" => Ok(Reply::Output(String::new())),
            "q" | "quit" | "exit" => Ok(Reply::Quit),
            "help" | "?" => Ok(Reply::Output(HELP.to_string())),
            "status" => Ok(Reply::Output(self.status_line())),
            "r" | "refresh" => {
                let query = self.query.clone();
                self.load_list(query).await
            }
            "open" => {
                let id = parse_question_id(rest)?;
                if let Some(guidance) = self.offline_guidance() {
                    return Ok(Reply::Output(guidance));
                }
                self.open(id).await
            }
            "like" => {
                let id = parse_question_id(rest)?;
                if let Some(guidance) = self.offline_guidance() {
                    return Ok(Reply::Output(guidance));
                }
                self.like(id).await
            }
            other => Ok(Reply::Output(format!(
                "Unknown command: {other}. Type `help` for the list of commands."
            ))),
        }
    }

    async fn navigate(&mut self, command: &NavCommand) -> ApiResult<Reply> {
        if let Some(guidance) = self.offline_guidance() {
            return Ok(Reply::Output(guidance));
        }
        let next = self.query.apply(command);
        self.load_list(next).await
    }

    async fn load_list(&mut self, query: QueryState) -> ApiResult<Reply> {
        let result = self.feed.refresh(&query).await;
        self.observe(&result);

        match result? {
            FeedUpdate::Applied(list) => {
                let text = format_list_text(&list, &query);
                self.query = query;
                Ok(Reply::Output(text))
            }
            FeedUpdate::Stale => Ok(Reply::Output(String::new())),
        }
    }

    async fn open(&mut self, id: u64) -> ApiResult<Reply> {
        let result = self.detail.fetch_question_detail(id).await;
        self.observe(&result);

        let detail = result?;
        let text = format_detail_text(&detail);
        self.opened = Some(detail);
        Ok(Reply::Output(text))
    }

    async fn like(&mut self, id: u64) -> ApiResult<Reply> {
        let result = self.detail.like_question(id).await;
        self.observe(&result);

        let like_count = match result? {
            LikeOutcome::Liked { like_count } => like_count,
            LikeOutcome::Suppressed => {
                return Ok(Reply::Output(format!(
                    "A like for question {id} is already in progress"
                )))
            }
        };

        let mut text = match like_count {
            Some(count) => format!("Liked question {id} ({count} likes)"),
            None => format!("Liked question {id}"),
        };

        // Patch the open question in place rather than fetching it again
        if let (Some(detail), Some(count)) = (self.opened.as_mut(), like_count) {
            if detail.question.id == id {
                detail.apply_like_count(count);
                text.push('\n');
                text.push_str(&format_detail_text(detail));
            }
        }

        Ok(Reply::Output(text))
    }

    fn sync_status(&mut self) {
        if self.monitor.has_changed().unwrap_or(false) {
            self.status = *self.monitor.borrow_and_update();
        }
    }

    /// Update the backend status from a request outcome
    fn observe<T>(&mut self, result: &ApiResult<T>) {
        self.status = match result {
            Err(Error::Validation(_)) => return,
            Err(err) if err.is_connectivity() => BackendStatus::Disconnected,
            // Any response, even an error one, means the server is reachable
            _ => BackendStatus::Connected,
        };
    }

    fn offline_guidance(&self) -> Option<String> {
        match self.status {
            BackendStatus::Disconnected => Some(format!(
                "Cannot connect to the backend server at {}. Please check if it is running, then `refresh` to retry.",
                self.feed.client().base_url()
            )),
            _ => None,
        }
    }

    fn status_line(&self) -> String {
        format!(
            "Backend at {} is {}",
            self.feed.client().base_url(),
            self.status
        )
    }
}

pub async fn run(options: BrowseOptions, global: crate::Global) -> Result<()> {
    let client = ApiClient::new(&ApiConfig::from_global(&global)?)?;
    let query = QueryState {
        tag: options.tag.map(|tag| tag.trim().to_lowercase()),
        search: options.search,
        ..Default::default()
    };

    let monitor = HealthMonitor::spawn(client.clone(), Duration::from_secs(options.interval));
    let mut session = BrowseSession::new(client, query, monitor.subscribe());

    if global.verbose {
        eprintln!("Browsing {}", session.feed.client().base_url());
    }

    let mut stdout = tokio::io::stdout();
    let mut reader = BufReader::new(tokio::io::stdin());
    let mut line = String::from("refresh");

    loop {
        match session.execute(&line).await {
            Ok(Reply::Quit) => break,
            Ok(Reply::Output(text)) if text.is_empty() => {}
            Ok(Reply::Output(text)) => println!("{}", text),
            Err(err) if err.is_connectivity() => println!("{}", err.to_string().yellow()),
            Err(err) => println!("{}", err.to_string().red()),
        }

        let prompt = format!("qna [page {}]> ", session.query().page);
        stdout.write_all(prompt.as_bytes()).await?;
        stdout.flush().await?;

        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            break; // EOF
        }
    }

    monitor.stop();
    Ok(())
}
