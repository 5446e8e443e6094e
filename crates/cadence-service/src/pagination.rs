//! Page requests and paginated responses for list endpoints.

use serde::{Deserialize, Serialize};

use cadence_core::config::ScheduleConfig;

/// Requested page, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// ## Summary
    /// Builds a page from optional query values, applying the configured
    /// default and cap on page size.
    #[must_use]
    pub fn from_query(page: Option<u32>, per_page: Option<u32>, settings: &ScheduleConfig) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page
                .unwrap_or(settings.default_per_page)
                .clamp(1, settings.max_per_page),
        }
    }

    /// Slices one page out of an already ordered list.
    #[must_use]
    pub fn apply<T>(self, items: Vec<T>) -> Paginated<T> {
        let total = items.len();
        let per_page = usize::try_from(self.per_page.max(1)).unwrap_or(usize::MAX);
        let page_index = usize::try_from(self.page.saturating_sub(1)).unwrap_or(usize::MAX);
        let skip = page_index.saturating_mul(per_page);
        let items: Vec<T> = items.into_iter().skip(skip).take(per_page).collect();
        Paginated {
            items,
            meta: PageMeta {
                total,
                page: self.page,
                per_page: self.per_page,
                last_page: u32::try_from(total.div_ceil(per_page).max(1)).unwrap_or(u32::MAX),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMeta {
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub last_page: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}
