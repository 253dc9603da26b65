use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

use super::query::{ListQuery, Pagination, SortMode};
use crate::error::{AppError, AppResult};

/// One page of results as the controller needs it.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    /// Filters the backend suggests for the current query (blog top tags).
    pub available_filters: Option<Vec<String>>,
}

/// Per-entity half of a list view: how to fetch a page and how to identify a row.
pub trait ListSource: Send + Sync + 'static {
    type Item: Clone + Debug + Send + Sync + 'static;
    type Sort: SortMode;

    fn key(item: &Self::Item) -> &str;

    fn fetch<'a>(&'a self, query: &'a ListQuery<Self::Sort>, page: u32) -> BoxFuture<'a, AppResult<PageSlice<Self::Item>>>;
}

/// Everything a view renders from.
#[derive(Debug, Clone)]
pub struct ListSnapshot<T, S> {
    pub items: Vec<T>,
    pub query: ListQuery<S>,
    pub pagination: Pagination,
    pub available_filters: Vec<String>,
    /// A page-1 fetch is in flight.
    pub loading: bool,
    /// A "load more" fetch is in flight.
    pub loading_more: bool,
    /// Bumped whenever search, filters or sort change.
    pub generation: u64,
    /// Most recent fetch failure, cleared by the next success.
    pub last_error: Option<AppError>,
}

enum Command<S, T> {
    Search(String),
    ToggleFilter(String),
    SetSort(S),
    LoadMore,
    Refresh,
    Remove(String),
    Replace(T),
}

struct Fetched<T> {
    generation: u64,
    append: bool,
    result: AppResult<PageSlice<T>>,
}

type Snapshot<S> = ListSnapshot<<S as ListSource>::Item, <S as ListSource>::Sort>;

/// Task owning one list view's state. Commands and fetch completions are handled
/// one at a time; fetches themselves run detached and report back tagged with the
/// generation they were issued under.
pub struct ListController<S: ListSource> {
    source: Arc<S>,
    debounce: Duration,
    state: Snapshot<S>,
    publish: watch::Sender<Snapshot<S>>,
    commands: mpsc::UnboundedReceiver<Command<S::Sort, S::Item>>,
    done_tx: mpsc::UnboundedSender<Fetched<S::Item>>,
    done_rx: mpsc::UnboundedReceiver<Fetched<S::Item>>,
    deadline: Option<Instant>,
}

impl<S: ListSource> ListController<S> {
    /// Start the view and issue its initial fetch. Must be called from within a
    /// tokio runtime.
    pub fn spawn(source: S, sort: S::Sort, debounce: Duration) -> ListHandle<S> {
        let state = ListSnapshot {
            items: Vec::new(),
            query: ListQuery::new(sort),
            pagination: Pagination::default(),
            available_filters: Vec::new(),
            loading: false,
            loading_more: false,
            generation: 0,
            last_error: None,
        };
        let (publish, snapshots) = watch::channel(state.clone());
        let (cmd_tx, commands) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = mpsc::unbounded_channel();
        let mut ctl = ListController {
            source: Arc::new(source),
            debounce,
            state,
            publish,
            commands,
            done_tx,
            done_rx,
            deadline: None,
        };
        ctl.reset();
        ctl.publish();
        let task = tokio::spawn(ctl.run());
        ListHandle { commands: cmd_tx, snapshots, task }
    }

    async fn run(mut self) {
        loop {
            let deadline = self.deadline;
            tokio::select! {
                cmd = self.commands.recv() => match cmd {
                    Some(cmd) => self.on_command(cmd),
                    None => break,
                },
                Some(done) = self.done_rx.recv() => self.on_fetched(done),
                _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    self.deadline = None;
                    if self.state.query.settle() {
                        debug!(target: "listing", term = %self.state.query.debounced_term, "search settled");
                        self.reset();
                    }
                }
            }
            self.publish();
        }
        debug!(target: "listing", "list view closed");
    }

    fn on_command(&mut self, cmd: Command<S::Sort, S::Item>) {
        match cmd {
            Command::Search(term) => {
                self.state.query.search_term = term;
                self.deadline = Some(Instant::now() + self.debounce);
            }
            Command::ToggleFilter(tag) => {
                self.state.query.toggle_filter(&tag);
                self.reset();
            }
            Command::SetSort(sort) => {
                if sort != self.state.query.sort {
                    self.state.query.sort = sort;
                    self.reset();
                }
            }
            Command::LoadMore => self.load_more(),
            Command::Refresh => self.reset(),
            Command::Remove(key) => self.state.items.retain(|item| S::key(item) != key),
            Command::Replace(next) => {
                let key = S::key(&next).to_string();
                if let Some(slot) = self.state.items.iter_mut().find(|item| S::key(item) == key) {
                    *slot = next;
                }
            }
        }
    }

    /// New query: back to page 1, response replaces the list.
    fn reset(&mut self) {
        self.state.generation += 1;
        self.state.pagination.rewind();
        self.state.loading = true;
        self.state.loading_more = false;
        self.issue(1, false);
    }

    fn load_more(&mut self) {
        let s = &self.state;
        if s.pagination.has_reached_end || s.loading || s.loading_more {
            debug!(target: "listing", end = s.pagination.has_reached_end, "load more ignored");
            return;
        }
        if s.items.is_empty() && s.last_error.is_some() {
            // First page never landed; retry it instead of skipping ahead.
            debug!(target: "listing", "load more after a failed reset, refetching page 1");
            self.reset();
            return;
        }
        self.state.loading_more = true;
        let next = self.state.pagination.next_page();
        self.issue(next, true);
    }

    fn issue(&self, page: u32, append: bool) {
        let source = self.source.clone();
        let query = self.state.query.clone();
        let generation = self.state.generation;
        let done = self.done_tx.clone();
        debug!(target: "listing", generation, page, append, term = %query.debounced_term, "fetch");
        tokio::spawn(async move {
            let result = source.fetch(&query, page).await;
            let _ = done.send(Fetched { generation, append, result });
        });
    }

    fn on_fetched(&mut self, done: Fetched<S::Item>) {
        if done.generation != self.state.generation {
            debug!(target: "listing", stale = done.generation, current = self.state.generation, "discarding superseded response");
            return;
        }
        if done.append { self.state.loading_more = false; } else { self.state.loading = false; }
        match done.result {
            Ok(slice) => {
                if done.append {
                    self.state.items.extend(slice.items);
                } else {
                    self.state.items = slice.items;
                    if let Some(filters) = slice.available_filters {
                        self.state.available_filters = filters;
                    }
                }
                self.state.pagination.apply(slice.page, slice.total_pages);
                self.state.last_error = None;
            }
            Err(e) => {
                warn!(target: "listing", append = done.append, error = %e, "Error loading list");
                if !done.append {
                    self.state.items.clear();
                }
                self.state.last_error = Some(e);
            }
        }
    }

    fn publish(&self) {
        self.publish.send_replace(self.state.clone());
    }
}

/// Owner-side handle of a running list view. Dropping it stops the view.
pub struct ListHandle<S: ListSource> {
    commands: mpsc::UnboundedSender<Command<S::Sort, S::Item>>,
    snapshots: watch::Receiver<Snapshot<S>>,
    task: JoinHandle<()>,
}

impl<S: ListSource> ListHandle<S> {
    fn send(&self, cmd: Command<S::Sort, S::Item>) {
        if self.commands.send(cmd).is_err() {
            warn!(target: "listing", "list view is no longer running");
        }
    }

    /// Raw keystroke input; debounced before anything is fetched.
    pub fn set_search<T: Into<String>>(&self, term: T) { self.send(Command::Search(term.into())); }

    pub fn toggle_filter<T: Into<String>>(&self, tag: T) { self.send(Command::ToggleFilter(tag.into())); }

    pub fn set_sort(&self, sort: S::Sort) { self.send(Command::SetSort(sort)); }

    pub fn load_more(&self) { self.send(Command::LoadMore); }

    pub fn refresh(&self) { self.send(Command::Refresh); }

    pub fn snapshot(&self) -> Snapshot<S> { self.snapshots.borrow().clone() }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<S>> { self.snapshots.clone() }

    /// Wait until the view reaches a state matching `pred`.
    pub async fn wait_for<F>(&self, pred: F) -> AppResult<Snapshot<S>>
    where
        F: FnMut(&Snapshot<S>) -> bool,
    {
        let mut rx = self.snapshots.clone();
        let snap = rx
            .wait_for(pred)
            .await
            .map_err(|_| AppError::Internal("list view stopped".into()))?;
        Ok(snap.clone())
    }

    /// Wait until no fetch is in flight.
    pub async fn settled(&self) -> AppResult<Snapshot<S>> {
        self.wait_for(|s| !s.loading && !s.loading_more).await
    }

    /// Run the remote delete and drop the row only once it succeeded.
    pub async fn remove_confirmed<R, F>(&self, key: &str, write: F) -> AppResult<R>
    where
        F: Future<Output = AppResult<R>>,
    {
        let out = write.await?;
        self.send(Command::Remove(key.to_string()));
        Ok(out)
    }

    /// Run the remote edit and swap in the row the backend returned.
    pub async fn replace_confirmed<F>(&self, write: F) -> AppResult<S::Item>
    where
        F: Future<Output = AppResult<S::Item>>,
    {
        let updated = write.await?;
        self.send(Command::Replace(updated.clone()));
        Ok(updated)
    }
}

impl<S: ListSource> Drop for ListHandle<S> {
    fn drop(&mut self) {
        self.task.abort();
    }
}
