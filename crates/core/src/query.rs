//! List query state and request parameter derivation
//!
//! The query state belongs to whoever drives navigation (CLI flags, the
//! browse session). This module only turns it into request parameters and
//! applies navigation commands to produce the next state.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Questions per page on list requests
pub const PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    LikeCount,
    ViewCount,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::LikeCount => "like_count",
            SortKey::ViewCount => "view_count",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created_at" | "created" | "newest" => Ok(SortKey::CreatedAt),
            "like_count" | "likes" => Ok(SortKey::LikeCount),
            "view_count" | "views" => Ok(SortKey::ViewCount),
            other => Err(format!(
                "Invalid sort key: {other}. Valid keys: created_at, like_count, view_count"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(format!("Invalid sort order: {other}. Valid orders: asc, desc")),
        }
    }
}

/// What the list view is currently showing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryState {
    pub page: u64,
    pub sort: SortKey,
    pub order: SortOrder,
    pub tag: Option<String>,
    pub search: Option<String>,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            page: 1,
            sort: SortKey::default(),
            order: SortOrder::default(),
            tag: None,
            search: None,
        }
    }
}

/// Parameters of the smallest possible list request, used for reachability
/// checks
pub fn health_check_params() -> Vec<(&'static str, String)> {
    vec![("page", "1".to_string()), ("limit", "1".to_string())]
}

/// `Some(trimmed)` for a non-blank filter, `None` otherwise
fn filter_value(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl QueryState {
    /// Request parameters for `GET /questions`
    ///
    /// `tag` and `search` are left out entirely when unset or blank, so the
    /// backend applies no filter.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.max(1).to_string()),
            ("limit", PAGE_SIZE.to_string()),
            ("sort", self.sort.as_str().to_string()),
            ("order", self.order.as_str().to_string()),
        ];

        if let Some(tag) = filter_value(&self.tag) {
            params.push(("tag", tag));
        }
        if let Some(search) = filter_value(&self.search) {
            params.push(("search", search));
        }

        params
    }

    /// Heading for the list, mirroring the active filter
    pub fn heading(&self) -> String {
        if let Some(tag) = filter_value(&self.tag) {
            format!("Questions tagged \"{tag}\"")
        } else if let Some(search) = filter_value(&self.search) {
            format!("Search results for \"{search}\"")
        } else {
            "Recent Questions".to_string()
        }
    }

    /// Next state after a navigation command
    ///
    /// Changing the sort or a filter goes back to the first page.
    pub fn apply(&self, command: &NavCommand) -> QueryState {
        let mut next = self.clone();
        match command {
            NavCommand::NextPage => next.page = self.page.saturating_add(1),
            NavCommand::PrevPage => next.page = self.page.saturating_sub(1).max(1),
            NavCommand::Page(page) => next.page = (*page).max(1),
            NavCommand::Sort(sort) => {
                next.sort = *sort;
                next.page = 1;
            }
            NavCommand::Order(order) => {
                next.order = *order;
                next.page = 1;
            }
            NavCommand::Tag(tag) => {
                next.tag = Some(tag.clone());
                next.page = 1;
            }
            NavCommand::Search(search) => {
                next.search = Some(search.clone());
                next.page = 1;
            }
            NavCommand::Clear => {
                next.tag = None;
                next.search = None;
                next.page = 1;
            }
        }
        next
    }
}

/// Navigation commands understood by the browse session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavCommand {
    NextPage,
    PrevPage,
    Page(u64),
    Sort(SortKey),
    Order(SortOrder),
    Tag(String),
    Search(String),
    Clear,
}

/// Parse a navigation command line
///
/// Returns `None` for lines that aren't navigation commands.
pub fn parse_nav_command(line: &str) -> Option<Result<NavCommand, String>> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "n" | "next" => Ok(NavCommand::NextPage),
        "p" | "prev" => Ok(NavCommand::PrevPage),
        "page" => rest
            .parse::<u64>()
            .ok()
            .filter(|page| *page > 0)
            .map(NavCommand::Page)
            .ok_or_else(|| format!("Invalid page number: {rest}")),
        "sort" => rest.parse().map(NavCommand::Sort),
        "order" => rest.parse().map(NavCommand::Order),
        "tag" if !rest.is_empty() => Ok(NavCommand::Tag(rest.to_lowercase())),
        "tag" => Err("Usage: tag <name>".to_string()),
        "search" if !rest.is_empty() => Ok(NavCommand::Search(rest.to_string())),
        "search" => Err("Usage: search <text>".to_string()),
        "clear" => Ok(NavCommand::Clear),
        _ => return None,
    };

    Some(command)
}
