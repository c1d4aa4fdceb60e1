use serde::{Deserialize, Serialize};

use crate::config::PaginationConfig;

/// `page`/`per_page` query parameters accepted by every list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub per_page: Option<u32>,
}

impl PageRequest {
    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page),
            per_page: Some(per_page),
        }
    }

    /// Resolve the requested window against configured defaults and caps.
    pub fn resolve(&self, config: &PaginationConfig) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self
            .per_page
            .unwrap_or(config.default_per_page)
            .clamp(1, config.max_per_page.max(1));
        (page, per_page)
    }
}

/// Length-aware page of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: usize,
    pub last_page: u32,
    pub from: Option<usize>,
    pub to: Option<usize>,
}

impl<T> Page<T> {
    /// Slice an already filtered and ordered result set.
    pub fn paginate(items: Vec<T>, request: &PageRequest, config: &PaginationConfig) -> Self {
        let (current_page, per_page) = request.resolve(config);
        let total = items.len();
        let size = per_page as usize;
        let last_page = total.div_ceil(size).max(1) as u32;
        let offset = (current_page as usize - 1).saturating_mul(size);

        let data: Vec<T> = items.into_iter().skip(offset).take(size).collect();
        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            (Some(offset + 1), Some(offset + data.len()))
        };

        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            data: self.data.into_iter().map(f).collect(),
            current_page: self.current_page,
            per_page: self.per_page,
            total: self.total,
            last_page: self.last_page,
            from: self.from,
            to: self.to,
        }
    }
}
