use chrono::{DateTime, NaiveDateTime, Utc};

/// Format an API timestamp for display
///
/// Accepts RFC 3339 (what the backend emits) and plain `YYYY-MM-DD HH:MM:SS`.
/// Anything else is shown as-is.
pub fn format_timestamp(timestamp: &str) -> String {
    let parsed = DateTime::parse_from_rfc3339(timestamp)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%d %H:%M:%S").map(|dt| dt.and_utc())
        });

    match parsed {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M UTC").to_string(),
        Err(_) => timestamp.to_string(),
    }
}

/// Truncate to `max_chars` characters, appending `...` when cut
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}

/// Single-line preview of Markdown content for list views
pub fn content_preview(content: &str, max_chars: usize) -> String {
    let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_text(&collapsed, max_chars)
}
