//! Page/per-page resolution against the content policy

use blog_common::ContentPolicy;

use crate::dto::PageParams;

/// A resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: u32,
    pub per_page: u32,
}

impl Page {
    /// Page numbers start at 1; `per_page` falls back to the default and is capped
    pub fn resolve(policy: &ContentPolicy, params: &PageParams) -> Self {
        Self {
            page: params.page.unwrap_or(1).max(1),
            per_page: policy.page_size(params.per_page),
        }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.per_page)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.per_page)
    }
}
