use crate::jsonld::JsonLdContext;
use planner::pagination::PaginationPlan;
use serde::Serialize;

/// A JSON-LD `ItemList`: one page of items, the collection size, and the
/// paging block when the list is paged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView<T> {
    #[serde(rename = "@context")]
    pub context: JsonLdContext,
    #[serde(rename = "@type")]
    pub kind: &'static str,
    #[serde(rename = "numberOfItems")]
    pub number_of_items: usize,
    #[serde(rename = "totalItems")]
    pub total_items: u64,
    #[serde(rename = "itemListElement")]
    pub item_list_element: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationPlan>,
}

/// Wraps one page of items with its pagination plan.
pub fn build<T>(items: Vec<T>, total_items: u64, plan: PaginationPlan) -> CollectionView<T> {
    CollectionView {
        context: JsonLdContext::Collection,
        kind: "ItemList",
        number_of_items: items.len(),
        total_items,
        item_list_element: items,
        pagination: Some(plan),
    }
}

/// An unpaged list whose total is its own length.
pub fn unpaged<T>(items: Vec<T>) -> CollectionView<T> {
    let total = items.len() as u64;
    CollectionView {
        context: JsonLdContext::Collection,
        kind: "ItemList",
        number_of_items: items.len(),
        total_items: total,
        item_list_element: items,
        pagination: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::pagination::page::PageRequest;
    use planner::pagination::plan;

    #[test]
    fn test_build_counts_page_items() {
        let req = PageRequest::new(3, 20).unwrap();
        let view = build(vec!["a"; 5], 45, plan(&req, 45, "http://x/items"));

        assert_eq!(view.number_of_items, 5);
        assert_eq!(view.total_items, 45);

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["@type"], "ItemList");
        assert_eq!(json["pagination"]["total_pages"], 3);
        assert_eq!(json["pagination"]["view"]["first"], "http://x/items?page=1&limit=20");
        assert!(json["pagination"]["view"].get("next").is_none());
    }

    #[test]
    fn test_page_past_the_end_is_empty_but_well_formed() {
        let req = PageRequest::new(5, 20).unwrap();
        let view = build(Vec::<String>::new(), 30, plan(&req, 30, "http://x/items"));
        let p = view.pagination.as_ref().unwrap();

        assert_eq!(view.number_of_items, 0);
        assert_eq!(p.total_pages, 2);
        assert!(!p.has_next);
        assert!(p.has_prev);
    }

    #[test]
    fn test_unpaged_has_no_pagination_block() {
        let json = serde_json::to_value(unpaged(vec![1, 2, 3])).unwrap();
        assert_eq!(json["totalItems"], 3);
        assert!(json.get("pagination").is_none());
    }
}
