//! Cursor paginator.
//!
//! [`Paginator`] is a sequencing primitive: it fetches one page at a time
//! through an injected callback, hands the page to an injected success
//! callback, and only then advances its cursor.
//!
//! # Guarantees
//!
//! - At most one fetch is in flight. A call made while busy returns
//!   [`LoadOutcome::Busy`] immediately instead of queueing.
//! - A failed fetch never advances the cursor and is reported through
//!   `on_error`. The busy flag is released on every path.
//! - `reset()` during a fetch wins: the page is still delivered to
//!   `on_success`, but the cursor stays at its initial key.
//!
//! # Example
//!
//! ```ignore
//! let config = PaginatorConfig::new(
//!     0u32,
//!     20,
//!     |page| async move { api.history(page).await },
//!     |page, _items| page + 1,
//!     |items, _next| async move { cache.merge(items).await },
//!     |err| tracing::warn!("history fetch failed: {err}"),
//! );
//! let paginator = Paginator::new(config);
//! paginator.load_next_items().await?;
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use wallfeed_core::PageCursor;
use wallfeed_types::{FetchError, IntegrityError};

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Fetches the page at a key.
pub type FetchFn<K, T> =
    Box<dyn Fn(K) -> BoxFuture<'static, Result<Vec<T>, FetchError>> + Send + Sync>;

/// Computes the key after a page.
pub type NextKeyFn<K, T> = Box<dyn Fn(&K, &[T]) -> K + Send + Sync>;

/// Consumes a fetched page.
pub type SuccessFn<K, T> =
    Box<dyn Fn(Vec<T>, K) -> BoxFuture<'static, Result<(), SinkError>> + Send + Sync>;

/// Observes a recoverable failure.
pub type ErrorFn = Box<dyn Fn(&FetchError) + Send + Sync>;

/// Failure reported by the success callback.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The page contradicts the local cache; propagated to the caller.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// Consuming the page failed in a retryable way (e.g. persistence).
    #[error(transparent)]
    Recoverable(#[from] FetchError),
}

/// Everything a [`Paginator`] needs to run.
pub struct PaginatorConfig<K, T> {
    /// Key of the first page, restored by `reset()`.
    pub initial_key: K,
    /// Page size requested; a shorter page means end-of-data. Zero is
    /// treated as one.
    pub page_size: usize,
    /// Loads the page at a key. Must not mutate any cache.
    pub fetch: FetchFn<K, T>,
    /// Derives the next key from the key just used and the page it returned.
    pub next_key: NextKeyFn<K, T>,
    /// Receives `(items, next_key)` before the cursor advances. Returning
    /// an error keeps the cursor in place.
    pub on_success: SuccessFn<K, T>,
    /// Called for fetch failures and recoverable success-callback failures.
    pub on_error: ErrorFn,
}

impl<K, T> PaginatorConfig<K, T> {
    /// Build a configuration from plain closures.
    pub fn new<F, Fut, N, S, SFut, E>(
        initial_key: K,
        page_size: usize,
        fetch: F,
        next_key: N,
        on_success: S,
        on_error: E,
    ) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, FetchError>> + Send + 'static,
        N: Fn(&K, &[T]) -> K + Send + Sync + 'static,
        S: Fn(Vec<T>, K) -> SFut + Send + Sync + 'static,
        SFut: Future<Output = Result<(), SinkError>> + Send + 'static,
        E: Fn(&FetchError) + Send + Sync + 'static,
    {
        Self {
            initial_key,
            page_size,
            fetch: Box::new(move |key| Box::pin(fetch(key))),
            next_key: Box::new(next_key),
            on_success: Box::new(move |items, key| Box::pin(on_success(items, key))),
            on_error: Box::new(on_error),
        }
    }
}

impl<K: fmt::Debug, T> fmt::Debug for PaginatorConfig<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaginatorConfig")
            .field("initial_key", &self.initial_key)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}

/// Result of one `load_next_items()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A page was fetched and consumed.
    Loaded {
        /// Number of items in the page.
        count: usize,
        /// Whether the page was short.
        end_reached: bool,
    },
    /// Another fetch was in flight; nothing was done.
    Busy,
    /// End-of-data was reached earlier; reset to load again.
    Exhausted,
    /// The fetch (or consuming the page) failed; the cursor did not move.
    Failed(FetchError),
}

/// Releases the busy flag when dropped.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Sequential page loader over an opaque cursor type.
pub struct Paginator<K, T> {
    fetch: FetchFn<K, T>,
    next_key: NextKeyFn<K, T>,
    on_success: SuccessFn<K, T>,
    on_error: ErrorFn,
    page_size: usize,
    cursor: Mutex<PageCursor<K>>,
    busy: AtomicBool,
}

impl<K, T> Paginator<K, T>
where
    K: Clone + fmt::Debug + Send,
    T: Send,
{
    /// Create a paginator positioned at `config.initial_key`.
    pub fn new(config: PaginatorConfig<K, T>) -> Self {
        if config.page_size == 0 {
            tracing::warn!("page size 0 would never signal end-of-data, using 1");
        }
        Self {
            fetch: config.fetch,
            next_key: config.next_key,
            on_success: config.on_success,
            on_error: config.on_error,
            page_size: config.page_size.max(1),
            cursor: Mutex::new(PageCursor::new(config.initial_key)),
            busy: AtomicBool::new(false),
        }
    }

    fn cursor(&self) -> MutexGuard<'_, PageCursor<K>> {
        self.cursor.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch and consume the next page.
    ///
    /// Fetch failures and recoverable consumer failures are reported via
    /// `on_error` and returned as [`LoadOutcome::Failed`]. Integrity errors
    /// from the consumer are returned as `Err`.
    pub async fn load_next_items(&self) -> Result<LoadOutcome, IntegrityError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("fetch already in flight, dropping load request");
            return Ok(LoadOutcome::Busy);
        }
        let _busy = BusyGuard(&self.busy);

        let ticket = {
            let cursor = self.cursor();
            if cursor.is_end_reached() {
                return Ok(LoadOutcome::Exhausted);
            }
            cursor.checkout()
        };

        tracing::debug!(key = ?ticket.key, page_size = self.page_size, "fetching page");
        let items = match (self.fetch)(ticket.key.clone()).await {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(key = ?ticket.key, "page fetch failed: {}", e);
                (self.on_error)(&e);
                return Ok(LoadOutcome::Failed(e));
            }
        };

        let count = items.len();
        let end_reached = count < self.page_size;
        let next = (self.next_key)(&ticket.key, &items);

        match (self.on_success)(items, next.clone()).await {
            Ok(()) => {}
            Err(SinkError::Recoverable(e)) => {
                tracing::warn!(key = ?ticket.key, "consuming page failed: {}", e);
                (self.on_error)(&e);
                return Ok(LoadOutcome::Failed(e));
            }
            Err(SinkError::Integrity(e)) => {
                tracing::error!(key = ?ticket.key, "page rejected: {}", e);
                return Err(e);
            }
        }

        if !self.cursor().commit(&ticket, next, end_reached) {
            tracing::debug!(key = ?ticket.key, "reset during fetch, keeping initial cursor");
            return Ok(LoadOutcome::Loaded {
                count,
                end_reached: false,
            });
        }

        tracing::debug!(count, end_reached, "page loaded");
        Ok(LoadOutcome::Loaded { count, end_reached })
    }

    /// Restore the initial key. Does not clear any cache.
    pub fn reset(&self) {
        self.cursor().reset();
        tracing::debug!("paginator reset");
    }

    /// Key the next fetch will use.
    pub fn current_key(&self) -> K {
        self.cursor().current().clone()
    }

    /// Whether end-of-data was reached.
    pub fn is_end_reached(&self) -> bool {
        self.cursor().is_end_reached()
    }

    /// Whether a fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Requested page size.
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
