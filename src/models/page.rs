use serde::{Deserialize, Serialize};

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 50;

/// `?page=&pageSize=&search=` on the directory listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub search: Option<String>,
}

impl PageQuery {
    /// One-based page number, at least 1.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    /// Clamped to `1..=50`, default 10.
    pub fn page_size(&self) -> usize {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Lower-cased trimmed search term, absent when blank.
    pub fn term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

/// Case-insensitive substring match against any of `fields`.
pub fn matches_term<'a>(term: &str, fields: impl IntoIterator<Item = Option<&'a str>>) -> bool {
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(term))
}

/// One page of an offset-paginated listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Cut the requested page out of an already filtered and ordered list.
    pub fn slice(items: Vec<T>, query: &PageQuery) -> Self {
        let page = query.page();
        let page_size = query.page_size();
        let total = items.len();
        let data = items
            .into_iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .collect();
        Self {
            data,
            page,
            page_size,
            total,
            total_pages: total.div_ceil(page_size),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<usize>, page_size: Option<usize>) -> PageQuery {
        PageQuery {
            page,
            page_size,
            search: None,
        }
    }

    #[test]
    fn test_page_bounds() {
        assert_eq!(query(None, None).page(), 1);
        assert_eq!(query(Some(0), None).page(), 1);
        assert_eq!(query(None, None).page_size(), 10);
        assert_eq!(query(None, Some(0)).page_size(), 1);
        assert_eq!(query(None, Some(500)).page_size(), 50);
    }

    #[test]
    fn test_slice_reports_totals() {
        let page = Page::slice((1..=23).collect::<Vec<_>>(), &query(Some(3), Some(10)));
        assert_eq!(page.data, vec![21, 22, 23]);
        assert_eq!(page.total, 23);
        assert_eq!(page.total_pages, 3);

        let past_end = Page::slice(vec![1, 2], &query(Some(4), None));
        assert!(past_end.data.is_empty());
        assert_eq!(past_end.total_pages, 1);
    }

    #[test]
    fn test_term_matching() {
        let q = PageQuery {
            search: Some("  ADA ".into()),
            ..Default::default()
        };
        let term = q.term().unwrap();
        assert!(matches_term(&term, [Some("Ada Lovelace"), None]));
        assert!(!matches_term(&term, [Some("Grace"), Some("grace@school.io")]));
        assert_eq!(PageQuery::default().term(), None);
    }
}
