use crate::prelude::*;
use clap::Parser;

mod client;
mod config;
mod error;
mod prelude;
mod questions;

#[cfg(test)]
mod test_support;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Browse, ask, comment on and like questions on a Q&A backend"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Base URL of the questions API
    #[clap(
        long,
        env = "QNA_API_URL",
        global = true,
        default_value = config::ApiConfig::DEFAULT_BASE_URL
    )]
    api_url: String,

    /// Request timeout in seconds
    #[clap(
        long,
        env = "QNA_TIMEOUT",
        global = true,
        default_value_t = config::ApiConfig::DEFAULT_TIMEOUT_SECS
    )]
    timeout: u64,

    /// Whether to display additional information.
    #[clap(long, env = "QNA_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// List questions with paging, sorting and filters
    List(crate::questions::list::ListOptions),

    /// Show a question with its tags and comments
    Show(crate::questions::detail::ShowOptions),

    /// Ask a new question
    Ask(crate::questions::create::AskOptions),

    /// Comment on a question
    Comment(crate::questions::detail::CommentOptions),

    /// Like a question
    Like(crate::questions::detail::LikeOptions),

    /// Check whether the backend is reachable
    Health(crate::questions::health::HealthOptions),

    /// Browse questions interactively
    Browse(crate::questions::browse::BrowseOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::List(options) => crate::questions::list::run(options, app.global).await,
        SubCommands::Show(options) => crate::questions::detail::run_show(options, app.global).await,
        SubCommands::Ask(options) => crate::questions::create::run(options, app.global).await,
        SubCommands::Comment(options) => {
            crate::questions::detail::run_comment(options, app.global).await
        }
        SubCommands::Like(options) => crate::questions::detail::run_like(options, app.global).await,
        SubCommands::Health(options) => crate::questions::health::run(options, app.global).await,
        SubCommands::Browse(options) => crate::questions::browse::run(options, app.global).await,
    }
}
