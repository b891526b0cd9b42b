use std::path::PathBuf;

use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use qna_core::validation::NewQuestion;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::config::ApiConfig;
use crate::error::ApiResult;

#[derive(Debug, clap::Args, Clone)]
pub struct AskOptions {
    /// Question title (10-100 characters)
    #[arg(long)]
    pub title: String,

    /// Question body (Markdown, at least 30 characters)
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub content: Option<String>,

    /// Read the question body from a file
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Tag to attach (repeatable, at most 5)
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Server acknowledgement of a new question
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct CreatedQuestion {
    pub id: u64,
    #[serde(default)]
    pub message: String,
}

/// Submit a validated question
pub async fn create_question(
    client: &ApiClient,
    question: &NewQuestion,
) -> ApiResult<CreatedQuestion> {
    client.post("/questions", question).await
}

pub async fn run(options: AskOptions, global: crate::Global) -> Result<()> {
    let content = match (&options.content, &options.file) {
        (Some(content), _) => content.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read question body from {}", path.display()))?,
        (None, None) => return Err(eyre!("Either --content or --file is required")),
    };

    // Invalid forms never reach the network
    let question = NewQuestion::new(&options.title, &content, &options.tags)?;
    let client = ApiClient::new(&ApiConfig::from_global(&global)?)?;

    if global.verbose {
        eprintln!("Creating question with tags: {:?}", question.tags);
    }

    let created = create_question(&client, &question).await?;

    if options.json {
        let json = serde_json::to_string_pretty(&created)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{}", json);
    } else {
        println!(
            "{} {}",
            f!("Created question {}.", created.id).green(),
            created.message.bright_black()
        );
        println!(
            "  {}: {}",
            "Read".green(),
            f!("qna show {}", created.id).cyan()
        );
    }

    Ok(())
}
