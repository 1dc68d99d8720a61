//! Page arithmetic and hypermedia links for paged collections.

use model::pagination::page::PageRequest;
use serde::{Deserialize, Serialize};

pub const PARTIAL_COLLECTION_VIEW: &str = "hydra:PartialCollectionView";

/// Hydra navigation block of a paged collection.
///
/// `first`/`previous` are only present past the first page, `next`/`last`
/// only before the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HydraView {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationPlan {
    pub page: u64,
    pub limit: u64,
    #[serde(rename = "totalItems")]
    pub total_items: u64,
    pub total_pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
    pub view: HydraView,
}

/// Builds the plan for one page of a collection of `total_items` items.
///
/// A page past the end is accepted; its flags and links stay consistent
/// with `total_pages`.
pub fn plan(request: &PageRequest, total_items: u64, base_url: &str) -> PaginationPlan {
    let page = request.page();
    let limit = request.limit();
    let total_pages = if total_items == 0 {
        1
    } else {
        total_items.div_ceil(limit)
    };

    let has_prev = page > 1;
    let has_next = page < total_pages;
    let link = |n: u64| page_link(base_url, n, limit);

    PaginationPlan {
        page,
        limit,
        total_items,
        total_pages,
        has_next,
        has_prev,
        view: HydraView {
            id: link(page),
            kind: PARTIAL_COLLECTION_VIEW.to_string(),
            first: has_prev.then(|| link(1)),
            previous: has_prev.then(|| link(page - 1)),
            next: has_next.then(|| link(page + 1)),
            last: has_next.then(|| link(total_pages)),
        },
    }
}

/// `{base}?page=N&limit=L`, or `{base}&page=N&limit=L` when the base already
/// carries a query string.
pub fn page_link(base_url: &str, page: u64, limit: u64) -> String {
    let sep = if base_url.contains('?') { '&' } else { '?' };
    format!("{base_url}{sep}page={page}&limit={limit}")
}
