//! Paginated collection accumulator.
//!
//! One `Accumulator` backs one list on one screen. It fetches pages
//! through a `PageSource`, appends them in fetch order, and publishes
//! every state change on a watch channel for the UI to render.
//!
//! ```text
//! Idle -[load]-> Loading -[ok]-> Success(has_more) -[load_more]-> Success(is_loading_more)
//!                        -[err]-> Error                            -[ok]-> Success(items ++ page)
//! any -[refresh]-> Loading
//! ```

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use gather_domain::{OperationError, OperationResult, Page, PageRequest};
use tokio::sync::watch;

use crate::cancellation::Cancelled;
use crate::executor::ExecutionResult;

/// Boxed future returned by a page source.
pub type PageFuture<'a, T> = Pin<Box<dyn Future<Output = ExecutionResult<Page<T>>> + Send + 'a>>;

/// Fetches one page of a cursor-paginated list.
pub trait PageSource<T>: Send + Sync {
    /// Fetches the page described by `request`.
    fn fetch_page(&self, request: PageRequest) -> PageFuture<'_, T>;
}

impl<T, F> PageSource<T> for F
where
    F: Fn(PageRequest) -> PageFuture<'static, T> + Send + Sync,
{
    fn fetch_page(&self, request: PageRequest) -> PageFuture<'_, T> {
        self(request)
    }
}

/// Items accumulated across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accumulated<T> {
    /// All items fetched so far, in fetch order.
    pub items: Vec<T>,
    /// Cursor to resume after.
    pub cursor: Option<String>,
    /// Whether the server has more items.
    pub has_more: bool,
    /// Whether a load-more fetch is in flight.
    pub is_loading_more: bool,
    /// Total count reported by the server, adjusted by local removals.
    pub total_count: Option<u32>,
    /// Failure of the last load-more, if it failed.
    pub load_more_error: Option<OperationError>,
}

impl<T> Accumulated<T> {
    /// Starts an accumulation from the first page.
    #[must_use]
    pub fn from_page(page: Page<T>) -> Self {
        Self {
            items: page.items,
            cursor: page.end_cursor,
            has_more: page.has_next_page,
            is_loading_more: false,
            total_count: page.total_count,
            load_more_error: None,
        }
    }

    /// Appends the next page.
    pub fn append(&mut self, page: Page<T>) {
        self.items.extend(page.items);
        self.cursor = page.end_cursor;
        self.has_more = page.has_next_page;
        if page.total_count.is_some() {
            self.total_count = page.total_count;
        }
        self.load_more_error = None;
    }

    /// Removes every item matching `predicate`, adjusting the total count.
    /// Returns how many items were removed.
    pub fn remove_where<P>(&mut self, mut predicate: P) -> usize
    where
        P: FnMut(&T) -> bool,
    {
        let before = self.items.len();
        self.items.retain(|item| !predicate(item));
        let removed = before - self.items.len();
        if let Some(total) = self.total_count.as_mut() {
            *total = total.saturating_sub(u32::try_from(removed).unwrap_or(u32::MAX));
        }
        removed
    }

    /// Inserts an item at the front, adjusting the total count.
    pub fn prepend(&mut self, item: T) {
        self.items.insert(0, item);
        if let Some(total) = self.total_count.as_mut() {
            *total = total.saturating_add(1);
        }
    }

    /// Returns true if nothing has been fetched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of accumulated items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether `load_more` would issue a fetch.
    #[must_use]
    pub const fn can_load_more(&self) -> bool {
        self.has_more && !self.is_loading_more && self.cursor.is_some()
    }
}

/// Observable state of a paginated list.
pub type CollectionState<T> = OperationResult<Accumulated<T>>;

/// Holds the cursor-paginated list bound to one UI surface.
pub struct Accumulator<T> {
    name: &'static str,
    source: Box<dyn PageSource<T>>,
    page_size: u32,
    state: watch::Sender<CollectionState<T>>,
    generation: AtomicU64,
}

impl<T> Accumulator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates an idle accumulator.
    pub fn new(name: &'static str, page_size: u32, source: impl PageSource<T> + 'static) -> Self {
        let (state, _) = watch::channel(OperationResult::Idle);
        Self {
            name,
            source: Box::new(source),
            page_size: page_size.max(1),
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> CollectionState<T> {
        self.state.borrow().clone()
    }

    /// Subscribes to state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.state.subscribe()
    }

    /// Loads the first page, discarding any accumulated items.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled; the previous state
    /// is restored in that case.
    pub async fn load(&self) -> Result<(), Cancelled> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = self.state.send_replace(OperationResult::Loading);
        tracing::debug!(list = self.name, "loading first page");

        let result = self
            .source
            .fetch_page(PageRequest::first_page(self.page_size))
            .await;

        let current = || self.generation.load(Ordering::SeqCst) == generation;
        match result {
            Err(Cancelled) => {
                if current() {
                    let mut previous = previous;
                    // Any load-more that was in flight has been superseded.
                    if let Some(accumulated) = previous.value_mut() {
                        accumulated.is_loading_more = false;
                    }
                    self.state.send_replace(previous);
                }
                Err(Cancelled)
            }
            Ok(_) if !current() => {
                tracing::debug!(list = self.name, "discarding superseded first page");
                Ok(())
            }
            Ok(page) => {
                let next = match page {
                    OperationResult::Success(page) => {
                        tracing::debug!(list = self.name, items = page.items.len(), has_more = page.has_next_page, "first page loaded");
                        OperationResult::Success(Accumulated::from_page(page))
                    }
                    OperationResult::Error(error) => OperationResult::Error(error),
                    OperationResult::Idle | OperationResult::Loading => OperationResult::Idle,
                };
                self.state.send_replace(next);
                Ok(())
            }
        }
    }

    /// Same as `load`; allowed from any state.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn refresh(&self) -> Result<(), Cancelled> {
        self.load().await
    }

    /// Fetches and appends the next page.
    ///
    /// A no-op unless the list is loaded, has more items, and no other
    /// load-more is in flight. Returns whether a fetch was issued.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the fetch was cancelled.
    pub async fn load_more(&self) -> Result<bool, Cancelled> {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut cursor = None;
        self.state.send_if_modified(|state| {
            let Some(accumulated) = state.value_mut() else {
                return false;
            };
            if !accumulated.can_load_more() {
                return false;
            }
            accumulated.is_loading_more = true;
            cursor.clone_from(&accumulated.cursor);
            true
        });

        let Some(cursor) = cursor else {
            tracing::trace!(list = self.name, "load more skipped");
            return Ok(false);
        };

        tracing::debug!(list = self.name, cursor = %cursor, "loading next page");
        let result = self
            .source
            .fetch_page(PageRequest::after(self.page_size, cursor))
            .await;

        let cancelled = matches!(result, Err(Cancelled));
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            let Some(accumulated) = state.value_mut() else {
                return false;
            };
            accumulated.is_loading_more = false;
            match result {
                Ok(OperationResult::Success(page)) => accumulated.append(page),
                Ok(OperationResult::Error(error)) => {
                    tracing::warn!(list = self.name, error = %error, "load more failed, keeping items");
                    accumulated.load_more_error = Some(error);
                }
                Ok(OperationResult::Idle | OperationResult::Loading) | Err(Cancelled) => {}
            }
            true
        });

        if cancelled { Err(Cancelled) } else { Ok(true) }
    }

    /// Applies `mutation` immediately, then awaits `operation`.
    ///
    /// Unless the operation succeeds, the items and total captured before
    /// the mutation are put back. Pages appended by a load-more that
    /// finished in the meantime are kept after them, and the load-more
    /// flag and cursor are left alone. If the list was reloaded while the
    /// operation ran there is nothing to roll back.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled, after rolling back.
    pub async fn mutate_optimistically<R, M, F>(&self, mutation: M, operation: F) -> ExecutionResult<R>
    where
        M: FnOnce(&mut Accumulated<T>),
        F: Future<Output = ExecutionResult<R>>,
    {
        let generation = self.generation.load(Ordering::SeqCst);
        let mut rollback = None;
        self.state.send_if_modified(|state| {
            let Some(accumulated) = state.value_mut() else {
                return false;
            };
            let items = accumulated.items.clone();
            let total_count = accumulated.total_count;
            mutation(accumulated);
            rollback = Some(Rollback {
                items,
                total_count,
                mutated_len: accumulated.items.len(),
                mutated_total: accumulated.total_count,
            });
            true
        });

        let outcome = operation.await;
        if matches!(outcome, Ok(OperationResult::Success(_))) {
            return outcome;
        }
        let Some(rollback) = rollback else {
            return outcome;
        };
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(list = self.name, "list reloaded during optimistic change, skipping rollback");
            return outcome;
        }

        tracing::info!(list = self.name, "optimistic change rolled back");
        self.state.send_if_modified(|state| {
            state.value_mut().is_some_and(|accumulated| {
                rollback.restore(accumulated);
                true
            })
        });
        outcome
    }

    /// Optimistically removes the items matching `predicate` while
    /// `operation` runs.
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the operation was cancelled, after rolling back.
    pub async fn remove_optimistically<R, P, F>(&self, predicate: P, operation: F) -> ExecutionResult<R>
    where
        P: FnMut(&T) -> bool,
        F: Future<Output = ExecutionResult<R>>,
    {
        self.mutate_optimistically(
            |accumulated| {
                accumulated.remove_where(predicate);
            },
            operation,
        )
        .await
    }

    /// Edits the loaded list in place without a network round trip.
    /// Does nothing unless the list is loaded.
    pub fn modify<M>(&self, mutation: M)
    where
        M: FnOnce(&mut Accumulated<T>),
    {
        self.state.send_if_modified(|state| {
            state.value_mut().is_some_and(|accumulated| {
                mutation(accumulated);
                true
            })
        });
    }
}

/// What an optimistic mutation changed, for undoing it.
struct Rollback<T> {
    items: Vec<T>,
    total_count: Option<u32>,
    mutated_len: usize,
    mutated_total: Option<u32>,
}

impl<T> Rollback<T> {
    fn restore(self, accumulated: &mut Accumulated<T>) {
        let split = self.mutated_len.min(accumulated.items.len());
        let appended = accumulated.items.split_off(split);
        accumulated.items = self.items;
        accumulated.items.extend(appended);
        // A load-more page carries a fresher total from the server.
        if accumulated.total_count == self.mutated_total {
            accumulated.total_count = self.total_count;
        }
    }
}

impl<T> std::fmt::Debug for Accumulator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Accumulator")
            .field("name", &self.name)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
