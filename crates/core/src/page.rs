//! Canonical list results.
//!
//! List endpoints answer either with a bare JSON array or with a paginated
//! envelope `{count, next, previous, results}`. Both deserialize into
//! [`Page`], so nothing past the service boundary needs to care which one
//! the backend sent.

use serde::{Deserialize, Deserializer, Serialize};

/// One page of a list endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Total number of items across all pages.
    pub count: usize,
    /// URL of the next page, if any.
    pub next: Option<String>,
    /// URL of the previous page, if any.
    pub previous: Option<String>,
    /// 1-based page number this page was requested as.
    pub page: u32,
}

impl<T> Page<T> {
    /// A single page holding every item.
    #[must_use]
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            count: items.len(),
            items,
            next: None,
            previous: None,
            page: 1,
        }
    }

    /// Record which page number this result answers.
    #[must_use]
    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Whether another page can be requested.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Page number to request next, if any.
    #[must_use]
    pub const fn next_page(&self) -> Option<u32> {
        if self.has_next() {
            self.page.checked_add(1)
        } else {
            None
        }
    }

    /// Whether the page holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform the items, keeping pagination metadata.
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            count: self.count,
            next: self.next,
            previous: self.previous,
            page: self.page,
        }
    }
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self::complete(Vec::new())
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPage<T> {
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        next: Option<String>,
        #[serde(default)]
        previous: Option<String>,
    },
    List(Vec<T>),
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawPage::<T>::deserialize(deserializer)? {
            RawPage::Paginated {
                results,
                count,
                next,
                previous,
            } => Self {
                count: count.unwrap_or(results.len()),
                items: results,
                next,
                previous,
                page: 1,
            },
            RawPage::List(items) => Self::complete(items),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array_and_envelope_normalize_identically() {
        let bare: Page<u32> = serde_json::from_value(json!([1, 2, 3])).unwrap();
        let wrapped: Page<u32> =
            serde_json::from_value(json!({"count": 3, "next": null, "results": [1, 2, 3]}))
                .unwrap();

        assert_eq!(bare.items, wrapped.items);
        assert_eq!(bare.count, 3);
        assert_eq!(wrapped.count, 3);
        assert!(!bare.has_next());
    }

    #[test]
    fn test_envelope_with_next_page() {
        let page: Page<u32> = serde_json::from_value(json!({
            "count": 45,
            "next": "https://api/products/?page=3",
            "previous": "https://api/products/?page=1",
            "results": [21, 22]
        }))
        .unwrap();
        let page = page.with_page(2);

        assert_eq!(page.count, 45);
        assert_eq!(page.next_page(), Some(3));
    }

    #[test]
    fn test_next_page_stops_at_last_page_number() {
        let page = Page {
            next: Some("https://api/products/?page=next".to_owned()),
            ..Page::complete(vec![1_u32])
        }
        .with_page(u32::MAX);

        assert!(page.has_next());
        assert_eq!(page.next_page(), None);
    }

    #[test]
    fn test_envelope_without_count_uses_result_len() {
        let page: Page<u32> = serde_json::from_value(json!({"results": [5]})).unwrap();
        assert_eq!(page.count, 1);
    }

    #[test]
    fn test_map_keeps_metadata() {
        let page = Page::complete(vec![1, 2]).with_page(4).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.page, 4);
    }
}
