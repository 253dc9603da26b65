use std::fmt::Debug;

/// Closed set of orderings (or single-choice filters) a list view can be in.
pub trait SortMode: Clone + PartialEq + Debug + Send + Sync + 'static {}

impl<T: Clone + PartialEq + Debug + Send + Sync + 'static> SortMode for T {}

/// User-controlled part of a list view. Only `debounced_term` ever reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery<S> {
    pub search_term: String,
    pub debounced_term: String,
    /// Selected tags, in the order they were picked.
    pub selected_filters: Vec<String>,
    pub sort: S,
}

impl<S: SortMode> ListQuery<S> {
    pub fn new(sort: S) -> Self {
        Self { search_term: String::new(), debounced_term: String::new(), selected_filters: Vec::new(), sort }
    }

    /// Select an unselected tag or deselect a selected one. Returns whether the
    /// tag is selected afterwards.
    pub fn toggle_filter(&mut self, tag: &str) -> bool {
        if let Some(pos) = self.selected_filters.iter().position(|t| t == tag) {
            self.selected_filters.remove(pos);
            false
        } else {
            self.selected_filters.push(tag.to_string());
            true
        }
    }

    /// Promote the raw term once input went quiet. True when the term that gets
    /// sent actually changed.
    pub fn settle(&mut self) -> bool {
        let next = self.search_term.trim();
        if next == self.debounced_term {
            return false;
        }
        self.debounced_term = next.to_string();
        true
    }
}

/// Backend-reported position in the result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub total_pages: u32,
    pub has_reached_end: bool,
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, total_pages: 0, has_reached_end: false } }
}

impl Pagination {
    pub fn apply(&mut self, page: u32, total_pages: u32) {
        self.page = page;
        self.total_pages = total_pages;
        self.has_reached_end = page >= total_pages;
    }

    pub fn rewind(&mut self) {
        *self = Self::default();
    }

    pub fn next_page(&self) -> u32 { self.page + 1 }
}
