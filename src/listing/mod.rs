//! Client-side list synchronization shared by every paginated view: debounced
//! search, tag filters, sort mode, "load more", and row updates after confirmed
//! remote writes.

mod query;
mod controller;
mod sources;

pub use query::{ListQuery, Pagination, SortMode};
pub use controller::{ListController, ListHandle, ListSnapshot, ListSource, PageSlice};
pub use sources::{blogs_view, users_view, BlogsSource, UsersSource};
