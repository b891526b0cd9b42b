//! Page control generation for paginated lists
//!
//! Pure functions that turn pagination metadata into the ordered set of
//! controls a list view shows: an optional "previous" control, a bounded
//! window of numbered pages around the current one, and an optional "next"
//! control.

use serde::Serialize;

use crate::question::PaginationMeta;

/// Pages shown on each side of the current page
pub const PAGE_WINDOW: u64 = 2;

/// One page control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageLink {
    Previous { page: u64 },
    Page { number: u64, current: bool },
    Next { page: u64 },
}

impl PageLink {
    /// Page this control navigates to
    pub fn target(&self) -> u64 {
        match self {
            PageLink::Previous { page } | PageLink::Next { page } => *page,
            PageLink::Page { number, .. } => *number,
        }
    }
}

/// Generate page controls for `current_page` of `total_pages`
pub fn page_links(current_page: u64, total_pages: u64) -> Vec<PageLink> {
    let mut links = Vec::new();

    if current_page > 1 {
        links.push(PageLink::Previous {
            page: current_page - 1,
        });
    }

    let first = current_page.saturating_sub(PAGE_WINDOW).max(1);
    let last = current_page.saturating_add(PAGE_WINDOW).min(total_pages);
    for number in first..=last {
        links.push(PageLink::Page {
            number,
            current: number == current_page,
        });
    }

    if current_page < total_pages {
        links.push(PageLink::Next {
            page: current_page + 1,
        });
    }

    links
}

/// Page controls for a list; nothing when the server sent no pagination
pub fn pagination_links(pagination: Option<&PaginationMeta>) -> Vec<PageLink> {
    pagination
        .map(|meta| page_links(meta.current_page, meta.total_pages))
        .unwrap_or_default()
}
