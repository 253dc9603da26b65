use futures_util::future::BoxFuture;
use futures_util::FutureExt;

use super::controller::{ListController, ListHandle, ListSource, PageSlice};
use super::query::ListQuery;
use crate::api::admin::{AdminApi, BlogSort, DEFAULT_USERS_LIMIT};
use crate::api::models::{BlogItem, UserProfile};
use crate::error::AppResult;
use crate::identity::Role;

/// Users view: free-text search plus a single role filter (the role doubles as
/// the view's mode).
pub struct UsersSource {
    api: AdminApi,
    limit: u32,
}

impl UsersSource {
    pub fn new(api: AdminApi) -> Self { Self { api, limit: DEFAULT_USERS_LIMIT } }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    async fn page(&self, query: &ListQuery<Role>, page: u32) -> AppResult<PageSlice<UserProfile>> {
        let out = self.api.users(&query.debounced_term, query.sort, page, self.limit).await?;
        Ok(PageSlice { items: out.users, page: out.page, total_pages: out.total_pages, available_filters: None })
    }
}

impl ListSource for UsersSource {
    type Item = UserProfile;
    type Sort = Role;

    fn key(item: &UserProfile) -> &str { &item.id }

    fn fetch<'a>(&'a self, query: &'a ListQuery<Role>, page: u32) -> BoxFuture<'a, AppResult<PageSlice<UserProfile>>> {
        self.page(query, page).boxed()
    }
}

/// Blogs view: search, tag filters and recent/popular ordering.
pub struct BlogsSource {
    api: AdminApi,
}

impl BlogsSource {
    pub fn new(api: AdminApi) -> Self { Self { api } }

    async fn page(&self, query: &ListQuery<BlogSort>, page: u32) -> AppResult<PageSlice<BlogItem>> {
        let out = self.api.blogs(query.sort, &query.debounced_term, &query.selected_filters, page).await?;
        Ok(PageSlice { items: out.data, page: out.page, total_pages: out.total_pages, available_filters: Some(out.top_tags) })
    }
}

impl ListSource for BlogsSource {
    type Item = BlogItem;
    type Sort = BlogSort;

    fn key(item: &BlogItem) -> &str { &item.id }

    fn fetch<'a>(&'a self, query: &'a ListQuery<BlogSort>, page: u32) -> BoxFuture<'a, AppResult<PageSlice<BlogItem>>> {
        self.page(query, page).boxed()
    }
}

/// Users view starting on the `USER` role with the configured quiet interval.
pub fn users_view(api: AdminApi) -> ListHandle<UsersSource> {
    let debounce = api.fetcher().config().users_debounce;
    ListController::spawn(UsersSource::new(api), Role::User, debounce)
}

/// Blogs view starting on the most recent posts.
pub fn blogs_view(api: AdminApi) -> ListHandle<BlogsSource> {
    let debounce = api.fetcher().config().blogs_debounce;
    ListController::spawn(BlogsSource::new(api), BlogSort::Recent, debounce)
}
