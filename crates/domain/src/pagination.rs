//! Cursor-based pagination types.
//!
//! Wire types follow the Relay connection convention (`edges { node }`,
//! `pageInfo`, `totalCount`). `Page` is the normalized form the rest of
//! the client works with.

use serde::{Deserialize, Serialize};

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Arguments for fetching one page (`first`/`after`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Number of items to fetch.
    pub first: u32,
    /// Cursor to resume after. `None` means the first page.
    pub after: Option<String>,
}

impl PageRequest {
    /// Request for the first page.
    #[must_use]
    pub const fn first_page(first: u32) -> Self {
        Self { first, after: None }
    }

    /// Request for the page after `cursor`.
    #[must_use]
    pub fn after(first: u32, cursor: impl Into<String>) -> Self {
        Self {
            first,
            after: Some(cursor.into()),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first_page(DEFAULT_PAGE_SIZE)
    }
}

/// One page of items.
///
/// `end_cursor` is absent iff `has_next_page` is false or the page is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items in fetch order.
    pub items: Vec<T>,
    /// Whether the server has more items after this page.
    pub has_next_page: bool,
    /// Cursor to resume after.
    pub end_cursor: Option<String>,
    /// Total number of items across all pages, if the server reports it.
    pub total_count: Option<u32>,
}

impl<T> Page<T> {
    /// Builds a page, normalizing the cursor to uphold the page invariant.
    #[must_use]
    pub fn new(
        items: Vec<T>,
        has_next_page: bool,
        end_cursor: Option<String>,
        total_count: Option<u32>,
    ) -> Self {
        let end_cursor = if has_next_page && !items.is_empty() {
            end_cursor
        } else {
            None
        };
        // Without a cursor there is no way to continue.
        let has_next_page = has_next_page && end_cursor.is_some();

        Self {
            items,
            has_next_page,
            end_cursor,
            total_count,
        }
    }

    /// A final page with the given items.
    #[must_use]
    pub fn last(items: Vec<T>) -> Self {
        Self::new(items, false, None, None)
    }

    /// An empty final page.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            has_next_page: false,
            end_cursor: None,
            total_count: Some(0),
        }
    }

    /// Returns true if the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Maps every item, keeping pagination metadata.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
            end_cursor: self.end_cursor,
            total_count: self.total_count,
        }
    }
}

/// Relay `pageInfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// Whether there are more items after this page.
    pub has_next_page: bool,
    /// Cursor of the last item in this page.
    #[serde(default)]
    pub end_cursor: Option<String>,
}

/// A single item in a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge<N> {
    /// The actual item.
    pub node: N,
    /// Per-edge cursor, when the query selects it.
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Relay connection as returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    /// Edges in order.
    pub edges: Vec<Edge<N>>,
    /// Page metadata.
    pub page_info: PageInfo,
    /// Total count across all pages.
    #[serde(default)]
    pub total_count: Option<u32>,
}

impl<N> Connection<N> {
    /// Converts the connection into a normalized page.
    pub fn into_page<T, F>(self, mut map: F) -> Page<T>
    where
        F: FnMut(N) -> T,
    {
        let items = self.edges.into_iter().map(|edge| map(edge.node)).collect();
        Page::new(
            items,
            self.page_info.has_next_page,
            self.page_info.end_cursor,
            self.total_count,
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_connection_into_page() {
        let connection: Connection<String> = serde_json::from_value(json!({
            "edges": [{"node": "a"}, {"node": "b", "cursor": "cb"}],
            "pageInfo": {"hasNextPage": true, "endCursor": "cb"},
            "totalCount": 5
        }))
        .unwrap();

        let page = connection.into_page(|s| s.to_uppercase());
        assert_eq!(page.items, vec!["A".to_string(), "B".to_string()]);
        assert!(page.has_next_page);
        assert_eq!(page.end_cursor.as_deref(), Some("cb"));
        assert_eq!(page.total_count, Some(5));
    }

    #[test]
    fn test_last_page_drops_cursor() {
        let page = Page::new(vec![1, 2], false, Some("c9".to_string()), None);
        assert!(page.end_cursor.is_none());
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_empty_page_has_no_cursor() {
        let page: Page<u8> = Page::new(Vec::new(), true, Some("c1".to_string()), Some(0));
        assert!(page.end_cursor.is_none());
        assert!(!page.has_next_page);
        assert!(page.is_empty());
    }

    #[test]
    fn test_missing_cursor_ends_pagination() {
        let page = Page::new(vec![1], true, None, None);
        assert!(!page.has_next_page);
    }

    #[test]
    fn test_page_request_constructors() {
        assert_eq!(PageRequest::default().first, DEFAULT_PAGE_SIZE);
        assert!(PageRequest::default().after.is_none());
        assert_eq!(PageRequest::after(5, "c1").after.as_deref(), Some("c1"));
    }
}
