use serde::Deserialize;

use crate::entities::{category, movie};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MovieFilter {
    pub search: Option<String>,
}

impl MovieFilter {
    pub fn search(term: Option<&str>) -> Self {
        let search = term.map(str::trim).filter(|t| !t.is_empty()).map(str::to_string);
        Self { search }
    }
}

#[derive(Clone, Debug)]
pub struct MovieWithCategory {
    pub movie: movie::Model,
    pub category: Option<category::Model>,
}

impl MovieWithCategory {
    pub fn category_name(&self) -> &str {
        self.category.as_ref().map(|c| c.name.as_str()).unwrap_or("-")
    }
}

#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.last_page
    }

    pub fn first_index(&self) -> u64 {
        self.page.saturating_sub(1).saturating_mul(self.per_page).saturating_add(1)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    /// Anything that is not a positive integer falls back to the first page.
    pub fn page(&self) -> u64 {
        self.page.as_deref().and_then(|p| p.trim().parse::<u64>().ok()).unwrap_or(1).max(1)
    }

    pub fn filter(&self) -> MovieFilter {
        MovieFilter::search(self.search.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_search_is_no_filter() {
        assert_eq!(MovieFilter::search(Some("   ")), MovieFilter::default());
        assert_eq!(MovieFilter::search(None), MovieFilter::default());
        assert_eq!(MovieFilter::search(Some(" dream ")).search.as_deref(), Some("dream"));
    }

    #[test]
    fn unusable_page_numbers_mean_first_page() {
        for raw in ["0", "-1", "abc", "", "18446744073709551616"] {
            let q = ListQuery { search: None, page: Some(raw.to_string()) };
            assert_eq!(q.page(), 1, "page={raw:?}");
        }
        assert_eq!(ListQuery::default().page(), 1);

        let q = ListQuery { search: None, page: Some(" 3 ".to_string()) };
        assert_eq!(q.page(), 3);
    }

    #[test]
    fn page_navigation_bounds() {
        let page: Page<()> = Page { items: vec![], page: 2, per_page: 6, total: 13, last_page: 3 };
        assert!(page.has_previous());
        assert!(page.has_next());
        assert_eq!(page.first_index(), 7);
    }

    #[test]
    fn first_index_saturates_on_huge_pages() {
        let page: Page<()> = Page { items: vec![], page: u64::MAX, per_page: 10, total: 3, last_page: 1 };
        assert_eq!(page.first_index(), u64::MAX);
        assert!(!page.has_next());
    }
}
