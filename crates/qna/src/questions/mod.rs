use colored::Colorize;
use qna_core::pagination::PageLink;
use qna_core::question::Tag;

pub mod browse;
pub mod create;
pub mod detail;
pub mod health;
pub mod list;

/// Render tags as `#name` labels
pub fn format_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag.name).cyan().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render page controls on one line, e.g. `« Previous 3 [4] 5 Next »`
pub fn format_page_links(links: &[PageLink]) -> String {
    links
        .iter()
        .map(|link| match link {
            PageLink::Previous { .. } => "« Previous".green().to_string(),
            PageLink::Page {
                number,
                current: true,
            } => format!("[{number}]").bright_cyan().bold().to_string(),
            PageLink::Page { number, .. } => number.to_string(),
            PageLink::Next { .. } => "Next »".green().to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}
