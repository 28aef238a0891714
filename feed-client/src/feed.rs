//! Feed wiring: paginator + cache + store + clock.
//!
//! A [`Feed`] owns one paginated list. Fetched pages are merged into a
//! [`FeedCache`] through the paginator's success callback, and every change
//! the merge reports is mirrored into the [`LocalStore`] before the cache
//! commits. Local edits (optimistic sends, reactions, status reports,
//! friendship updates) go through the same stage, persist, commit order.
//!
//! The cache sits behind a `tokio::sync::Mutex` held across the store
//! write, so the store and the cache never disagree about a committed
//! change.
//!
//! The cache's cursor bookkeeping follows the paginator: it is recorded only
//! after the paginator commits a page, and never for a page whose cursor a
//! reset discarded.

use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use thiserror::Error;
use tokio::sync::Mutex;
use wallfeed_core::{
    reaction, status, FeedCache, FeedEntity, FriendUpdate, MergeReport, StatusChange,
};
use wallfeed_types::{
    DeliveryStatus, FetchError, FriendEntry, IntegrityError, Message, MessageId, Reaction, UserId,
};

use crate::clock::Clock;
use crate::config::PageConfig;
use crate::paginator::{LoadOutcome, Paginator, PaginatorConfig, SinkError};
use crate::store::{LocalStore, StoreError};

/// Errors from local feed operations.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Persisting the change failed; nothing was committed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// The change contradicts the cache.
    #[error("integrity error: {0}")]
    Integrity(#[from] IntegrityError),

    /// No cached entity has this id.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),
}

/// Message history feed.
pub type MessageFeed<K> = Feed<Message, K>;

/// Friend list or friend request feed.
pub type FriendFeed<K> = Feed<FriendEntry, K>;

type SharedCache<T, K> = Arc<Mutex<FeedCache<T, K>>>;

/// One paginated, locally cached list.
pub struct Feed<T: FeedEntity, K> {
    paginator: Paginator<K, T>,
    cache: SharedCache<T, K>,
    store: Arc<dyn LocalStore<T>>,
    clock: Arc<dyn Clock>,
    last_error: Arc<StdMutex<Option<FetchError>>>,
    /// Bumped under the cache lock by every reset.
    resets: AtomicU64,
}

impl<T, K> Feed<T, K>
where
    T: FeedEntity,
    K: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Build a feed.
    ///
    /// `fetch` loads the page at a key and must not touch any cache;
    /// `next_key` derives the following key from the key just used and
    /// the page it returned.
    pub fn new<F, Fut, N>(
        pages: &PageConfig,
        initial_key: K,
        fetch: F,
        next_key: N,
        store: Arc<dyn LocalStore<T>>,
        clock: Arc<dyn Clock>,
    ) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, FetchError>> + Send + 'static,
        N: Fn(&K, &[T]) -> K + Send + Sync + 'static,
    {
        let cache: SharedCache<T, K> = Arc::new(Mutex::new(FeedCache::new()));
        let last_error = Arc::new(StdMutex::new(None));
        let page_size = pages.page_size;

        let sink_cache = cache.clone();
        let sink_store = store.clone();
        // Cursor bookkeeping is recorded by `load_next` after the commit
        let on_success = move |items: Vec<T>, _next: K| {
            let cache = sink_cache.clone();
            let store = sink_store.clone();
            async move {
                let mut guard = cache.lock().await;
                let mut staged = guard.clone();
                let report = staged.merge_items(items)?;
                persist(store.as_ref(), &staged, &report)
                    .await
                    .map_err(FetchError::from)?;
                tracing::debug!(
                    inserted = report.inserted.len(),
                    updated = report.updated.len(),
                    replaced = report.replaced.len(),
                    "page merged"
                );
                *guard = staged;
                Ok::<(), SinkError>(())
            }
        };

        let error_slot = last_error.clone();
        let on_error = move |err: &FetchError| {
            *error_slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(err.clone());
        };

        let paginator = Paginator::new(PaginatorConfig::new(
            initial_key,
            page_size,
            fetch,
            next_key,
            on_success,
            on_error,
        ));

        Self {
            paginator,
            cache,
            store,
            clock,
            last_error,
            resets: AtomicU64::new(0),
        }
    }

    /// Fetch and merge the next page.
    pub async fn load_next(&self) -> Result<LoadOutcome, IntegrityError> {
        let resets = self.resets.load(Ordering::Acquire);
        let outcome = self.paginator.load_next_items().await?;
        if let LoadOutcome::Loaded { .. } = outcome {
            *self.error_slot() = None;

            let mut cache = self.cache.lock().await;
            if self.resets.load(Ordering::Acquire) == resets {
                cache.record_page(
                    self.paginator.current_key(),
                    self.paginator.is_end_reached(),
                );
            } else {
                tracing::debug!("reset during load, cursor not recorded");
            }
        }
        Ok(outcome)
    }

    /// Start paging from the first key again. Cached entries are kept.
    ///
    /// The paginator reset and the cache rewind happen under the cache lock,
    /// so no page can record its cursor between them.
    pub async fn reset(&self) {
        let mut cache = self.cache.lock().await;
        self.paginator.reset();
        self.resets.fetch_add(1, Ordering::AcqRel);
        cache.rewind();
    }

    /// Drop every cached entry and start paging from the first key.
    ///
    /// The store is untouched; [`Feed::hydrate`] restores from it.
    pub async fn clear_cache(&self) {
        let mut cache = self.cache.lock().await;
        self.paginator.reset();
        self.resets.fetch_add(1, Ordering::AcqRel);
        cache.clear();
        tracing::debug!("feed cache cleared");
    }

    /// Replace the cached entries with the store's contents.
    ///
    /// Returns the number of entries loaded.
    pub async fn hydrate(&self) -> Result<usize, FeedError> {
        let stored = self.store.list_ordered().await?;
        let mut hydrated: FeedCache<T, K> = FeedCache::new();
        for entity in stored {
            hydrated.insert_local(entity)?;
        }
        let count = hydrated.len();

        *self.cache.lock().await = hydrated;
        tracing::debug!(count, "feed hydrated from store");
        Ok(count)
    }

    /// Copy of the cached entries in feed order.
    pub async fn snapshot(&self) -> Vec<T> {
        self.cache.lock().await.entries().to_vec()
    }

    /// Look up one cached entity.
    pub async fn get(&self, id: &T::Id) -> Option<T> {
        self.cache.lock().await.get(id).cloned()
    }

    /// Remove an entity by explicit user action.
    ///
    /// Returns `true` if it was cached.
    pub async fn delete(&self, id: &T::Id) -> Result<bool, FeedError> {
        let mut cache = self.cache.lock().await;
        if !cache.contains(id) {
            return Ok(false);
        }
        self.store.delete(id).await?;
        cache.remove(id);
        tracing::debug!(%id, "entity deleted");
        Ok(true)
    }

    /// Whether a page fetch is in flight.
    pub fn is_loading(&self) -> bool {
        self.paginator.is_loading()
    }

    /// Whether the last page was short.
    pub fn is_end_reached(&self) -> bool {
        self.paginator.is_end_reached()
    }

    /// Key the next fetch will use.
    pub fn current_key(&self) -> K {
        self.paginator.current_key()
    }

    /// The most recent fetch failure, cleared by the next successful page.
    pub fn last_error(&self) -> Option<FetchError> {
        self.error_slot().clone()
    }

    fn error_slot(&self) -> std::sync::MutexGuard<'_, Option<FetchError>> {
        self.last_error.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K> Feed<Message, K>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Insert an optimistic message under a fresh temporary id.
    ///
    /// Its timestamp is the clock's reading, bumped past the sender's
    /// latest cached message so local order matches send order.
    pub async fn send_local(
        &self,
        sender: UserId,
        recipient: UserId,
        image_ref: impl Into<String>,
        caption: Option<String>,
    ) -> Result<Message, FeedError> {
        let mut cache = self.cache.lock().await;
        let now = self.clock.now_millis();
        let timestamp = match cache.last_sent_by(sender) {
            Some(last) => now.max(last + 1),
            None => now,
        };

        let message = Message::new(
            MessageId::temp(),
            sender,
            recipient,
            image_ref,
            caption,
            timestamp,
        );
        self.store.upsert(&message).await?;
        cache.insert_local(message.clone())?;

        tracing::debug!(id = %message.id, timestamp, "optimistic message inserted");
        Ok(message)
    }

    /// Set `user`'s reaction on a message; [`Reaction::None`] clears it.
    ///
    /// Returns `true` if the visible reaction changed.
    pub async fn react(
        &self,
        id: &MessageId,
        user: UserId,
        value: Reaction,
    ) -> Result<bool, FeedError> {
        let mut cache = self.cache.lock().await;
        let mut updated = cache
            .get(id)
            .cloned()
            .ok_or_else(|| FeedError::UnknownEntity(id.to_string()))?;
        let at = self.clock.now_millis();
        let changed = reaction::write(&mut updated, user, value, at);

        self.store.upsert(&updated).await?;
        cache.write_reaction(id, user, value, at);

        tracing::debug!(%id, %user, reaction = value.as_str(), changed, "reaction written");
        Ok(changed)
    }

    /// Apply a delivery status report. Older statuses are ignored.
    pub async fn record_status(
        &self,
        id: &MessageId,
        incoming: DeliveryStatus,
    ) -> Result<StatusChange, FeedError> {
        let mut cache = self.cache.lock().await;
        let mut updated = cache
            .get(id)
            .cloned()
            .ok_or_else(|| FeedError::UnknownEntity(id.to_string()))?;

        let change = status::advance(&mut updated, incoming);
        if change.is_advanced() {
            self.store.upsert(&updated).await?;
            cache.advance_status(id, incoming);
            tracing::debug!(%id, status = %incoming, "status advanced");
        }
        Ok(change)
    }
}

impl<K> Feed<FriendEntry, K>
where
    K: Clone + fmt::Debug + Send + Sync + 'static,
{
    /// Fold a synced friendship view into this list.
    ///
    /// Returns `true` if the list changed.
    pub async fn apply_view(&self, update: FriendUpdate) -> Result<bool, FeedError> {
        let mut cache = self.cache.lock().await;
        let mut staged = cache.clone();
        if !staged.apply_update(update.clone())? {
            return Ok(false);
        }

        match &update {
            FriendUpdate::Upsert(entry) => {
                if let Some(merged) = staged.get(&entry.relationship_id) {
                    self.store.upsert(merged).await?;
                }
            }
            FriendUpdate::Remove(id) => {
                self.store.delete(id).await?;
            }
        }

        *cache = staged;
        tracing::debug!(?update, "friend list updated");
        Ok(true)
    }
}

/// Mirror a merge report into the store.
async fn persist<T: FeedEntity, K: Sync>(
    store: &dyn LocalStore<T>,
    cache: &FeedCache<T, K>,
    report: &MergeReport<T::Id>,
) -> Result<(), StoreError> {
    for id in report.changed() {
        if let Some(entity) = cache.get(id) {
            store.upsert(entity).await?;
        }
    }
    for id in report.retired() {
        store.delete(id).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use wallfeed_core::RelationshipRegistry;
    use wallfeed_types::{FriendAction, FriendStatus, PeerProfile};

    const ALICE: UserId = UserId::new(1);
    const BOB: UserId = UserId::new(2);

    /// Server-side message list, served newest-last in pages keyed by offset.
    #[derive(Clone, Default)]
    struct Server {
        messages: Arc<StdMutex<Vec<Message>>>,
        fetches: Arc<AtomicUsize>,
        fail_next: Arc<StdMutex<Option<FetchError>>>,
    }

    impl Server {
        fn with(messages: Vec<Message>) -> Self {
            let server = Self::default();
            *server.messages.lock().unwrap() = messages;
            server
        }

        fn page(&self, offset: usize, size: usize) -> Result<Vec<Message>, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_next.lock().unwrap().take() {
                return Err(err);
            }
            let all = self.messages.lock().unwrap();
            Ok(all.iter().skip(offset).take(size).cloned().collect())
        }
    }

    fn server_msg(id: u64, ts: u64) -> Message {
        Message::new(
            MessageId::Server(id),
            ALICE,
            BOB,
            format!("img/{id}.jpg"),
            None,
            ts,
        )
    }

    struct Harness {
        feed: MessageFeed<usize>,
        store: MemoryStore<Message>,
        clock: Arc<ManualClock>,
        server: Server,
    }

    fn harness(server: Server, page_size: usize) -> Harness {
        let store = MemoryStore::new();
        let clock = Arc::new(ManualClock::new(1_000));
        let fetch_server = server.clone();
        let feed = MessageFeed::new(
            &PageConfig { page_size },
            0usize,
            move |offset: usize| {
                let server = fetch_server.clone();
                async move { server.page(offset, page_size) }
            },
            |offset: &usize, items: &[Message]| offset + items.len(),
            Arc::new(store.clone()),
            clock.clone(),
        );
        Harness {
            feed,
            store,
            clock,
            server,
        }
    }

    #[tokio::test]
    async fn pages_are_merged_and_persisted() {
        let server = Server::with((1..=5).map(|i| server_msg(i, i * 10)).collect());
        let h = harness(server, 3);

        let first = h.feed.load_next().await.unwrap();
        assert_eq!(
            first,
            LoadOutcome::Loaded {
                count: 3,
                end_reached: false
            }
        );
        let second = h.feed.load_next().await.unwrap();
        assert_eq!(
            second,
            LoadOutcome::Loaded {
                count: 2,
                end_reached: true
            }
        );
        assert_eq!(h.feed.load_next().await.unwrap(), LoadOutcome::Exhausted);

        assert_eq!(h.feed.snapshot().await.len(), 5);
        assert_eq!(h.store.len(), 5);
        assert!(h.feed.is_end_reached());
    }

    #[tokio::test]
    async fn twenty_then_five_reaches_end() {
        let server = Server::with((1..=25).map(|i| server_msg(i, i)).collect());
        let h = harness(server, 20);

        h.feed.load_next().await.unwrap();
        assert!(!h.feed.is_end_reached());
        h.feed.load_next().await.unwrap();
        assert!(h.feed.is_end_reached());
        assert_eq!(h.feed.snapshot().await.len(), 25);
        assert_eq!(h.server.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn optimistic_send_is_replaced_by_server_copy() {
        let server = Server::default();
        let h = harness(server.clone(), 20);

        let sent = h
            .feed
            .send_local(ALICE, BOB, "img/sunset.jpg", Some("hi".into()))
            .await
            .unwrap();
        assert!(sent.id.is_temporary());
        assert!(h.store.contains(&sent.id));

        let confirmed = Message::new(
            MessageId::Server(42),
            ALICE,
            BOB,
            "img/sunset.jpg",
            Some("hi".into()),
            sent.timestamp_sent,
        )
        .with_status(DeliveryStatus::Delivered);
        server.messages.lock().unwrap().push(confirmed);

        h.feed.load_next().await.unwrap();

        let snapshot = h.feed.snapshot().await;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, MessageId::Server(42));
        assert_eq!(snapshot[0].status, DeliveryStatus::Delivered);
        assert!(!h.store.contains(&sent.id));
        assert!(h.store.contains(&MessageId::Server(42)));
    }

    #[tokio::test]
    async fn optimistic_timestamps_are_monotonic_per_sender() {
        let h = harness(Server::default(), 20);

        let a = h.feed.send_local(ALICE, BOB, "img/a.jpg", None).await.unwrap();
        let b = h.feed.send_local(ALICE, BOB, "img/b.jpg", None).await.unwrap();
        assert_eq!(a.timestamp_sent, 1_000);
        assert_eq!(b.timestamp_sent, 1_001);

        h.clock.advance(100);
        let c = h.feed.send_local(ALICE, BOB, "img/c.jpg", None).await.unwrap();
        assert_eq!(c.timestamp_sent, 1_100);
    }

    #[tokio::test]
    async fn reaction_is_last_write_wins() {
        let server = Server::with(vec![server_msg(7, 10)]);
        let h = harness(server, 20);
        h.feed.load_next().await.unwrap();
        let id = MessageId::Server(7);

        assert!(h.feed.react(&id, BOB, Reaction::Like).await.unwrap());
        h.clock.advance(1);
        assert!(h.feed.react(&id, BOB, Reaction::Love).await.unwrap());

        let msg = h.feed.get(&id).await.unwrap();
        assert_eq!(msg.reaction_by(BOB), Some(Reaction::Love));
        assert_eq!(msg.reactions.len(), 1);

        let stored = h.store.read(&id).await.unwrap().unwrap();
        assert_eq!(stored.reaction_by(BOB), Some(Reaction::Love));
    }

    #[tokio::test]
    async fn clearing_a_reaction() {
        let server = Server::with(vec![server_msg(7, 10)]);
        let h = harness(server, 20);
        h.feed.load_next().await.unwrap();
        let id = MessageId::Server(7);

        h.feed.react(&id, BOB, Reaction::Wow).await.unwrap();
        h.clock.advance(1);
        assert!(h.feed.react(&id, BOB, Reaction::None).await.unwrap());
        assert_eq!(h.feed.get(&id).await.unwrap().reaction_by(BOB), None);
    }

    #[tokio::test]
    async fn react_on_unknown_message_fails() {
        let h = harness(Server::default(), 20);
        let err = h
            .feed
            .react(&MessageId::Server(1), BOB, Reaction::Like)
            .await
            .unwrap_err();
        assert!(matches!(err, FeedError::UnknownEntity(_)));
    }

    #[tokio::test]
    async fn status_never_regresses() {
        let server = Server::with(vec![server_msg(3, 10)]);
        let h = harness(server, 20);
        h.feed.load_next().await.unwrap();
        let id = MessageId::Server(3);

        let change = h.feed.record_status(&id, DeliveryStatus::Read).await.unwrap();
        assert!(change.is_advanced());
        let change = h
            .feed
            .record_status(&id, DeliveryStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(change, StatusChange::Unchanged);

        assert_eq!(h.feed.get(&id).await.unwrap().status, DeliveryStatus::Read);
        let stored = h.store.read(&id).await.unwrap().unwrap();
        assert_eq!(stored.status, DeliveryStatus::Read);
    }

    #[tokio::test]
    async fn stale_page_does_not_downgrade_status() {
        let server = Server::with(vec![server_msg(3, 10)]);
        let h = harness(server, 20);
        h.feed.load_next().await.unwrap();
        let id = MessageId::Server(3);
        h.feed.record_status(&id, DeliveryStatus::Read).await.unwrap();

        h.feed.reset().await;
        h.feed.load_next().await.unwrap();
        assert_eq!(h.feed.get(&id).await.unwrap().status, DeliveryStatus::Read);
    }

    #[tokio::test]
    async fn store_failure_keeps_cache_and_cursor() {
        let server = Server::with(vec![server_msg(1, 10)]);
        let h = harness(server, 20);
        h.store.fail_next_write("disk full");

        let outcome = h.feed.load_next().await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Failed(FetchError::Storage(_))));
        assert!(h.feed.snapshot().await.is_empty());
        assert_eq!(h.feed.current_key(), 0);
        assert!(h.feed.last_error().is_some());

        h.feed.load_next().await.unwrap();
        assert_eq!(h.feed.snapshot().await.len(), 1);
        assert!(h.feed.last_error().is_none());
    }

    #[tokio::test]
    async fn fetch_failure_is_recorded() {
        let server = Server::with(vec![server_msg(1, 10)]);
        *server.fail_next.lock().unwrap() = Some(FetchError::Timeout);
        let h = harness(server, 20);

        let outcome = h.feed.load_next().await.unwrap();
        assert_eq!(outcome, LoadOutcome::Failed(FetchError::Timeout));
        assert_eq!(h.feed.last_error(), Some(FetchError::Timeout));
        assert!(!h.feed.is_loading());
    }

    #[tokio::test]
    async fn conflicting_page_is_an_integrity_error() {
        let server = Server::with(vec![server_msg(1, 10)]);
        let h = harness(server.clone(), 20);
        h.feed.load_next().await.unwrap();

        server.messages.lock().unwrap()[0].sender_id = UserId::new(99);
        h.feed.reset().await;

        let err = h.feed.load_next().await.unwrap_err();
        assert!(matches!(err, IntegrityError::ImmutableFieldMismatch { .. }));
        assert_eq!(h.feed.snapshot().await[0].sender_id, ALICE);
    }

    #[tokio::test]
    async fn cache_records_committed_cursor() {
        let server = Server::with((1..=3).map(|i| server_msg(i, i)).collect());
        let h = harness(server, 2);

        h.feed.load_next().await.unwrap();
        {
            let cache = h.feed.cache.lock().await;
            assert_eq!(cache.last_cursor(), Some(&2));
            assert!(!cache.is_end_reached());
        }

        h.feed.load_next().await.unwrap();
        let cache = h.feed.cache.lock().await;
        assert_eq!(cache.last_cursor(), Some(&3));
        assert!(cache.is_end_reached());
    }

    #[tokio::test]
    async fn reset_during_fetch_keeps_cache_cursor_rewound() {
        let gate = Arc::new(Notify::new());
        let fetch_gate = gate.clone();
        let feed = MessageFeed::new(
            &PageConfig { page_size: 20 },
            0usize,
            move |_offset: usize| {
                let gate = fetch_gate.clone();
                async move {
                    gate.notified().await;
                    Ok::<_, FetchError>(vec![server_msg(1, 10)])
                }
            },
            |offset: &usize, items: &[Message]| offset + items.len(),
            Arc::new(MemoryStore::new()),
            Arc::new(ManualClock::new(0)),
        );

        let (outcome, _) = tokio::join!(feed.load_next(), async {
            tokio::task::yield_now().await;
            feed.reset().await;
            gate.notify_one();
        });

        assert!(matches!(outcome.unwrap(), LoadOutcome::Loaded { .. }));
        assert_eq!(feed.snapshot().await.len(), 1);
        assert_eq!(feed.current_key(), 0);
        assert!(!feed.is_end_reached());

        let cache = feed.cache.lock().await;
        assert_eq!(cache.last_cursor(), None);
        assert!(!cache.is_end_reached());
    }

    #[tokio::test]
    async fn hydrate_failure_keeps_cache() {
        let server = Server::with((1..=2).map(|i| server_msg(i, i)).collect());
        let h = harness(server, 20);
        h.feed.load_next().await.unwrap();
        h.store.fail_next_list("storage offline");

        let err = h.feed.hydrate().await.unwrap_err();
        assert!(matches!(err, FeedError::Store(StoreError::Unavailable(_))));
        assert_eq!(h.feed.snapshot().await.len(), 2);

        let cache = h.feed.cache.lock().await;
        assert_eq!(cache.last_cursor(), Some(&2));
        assert!(cache.is_end_reached());
    }

    #[tokio::test]
    async fn hydrate_restores_from_store() {
        let server = Server::with((1..=3).map(|i| server_msg(i, i)).collect());
        let h = harness(server, 20);
        h.feed.load_next().await.unwrap();

        h.feed.clear_cache().await;
        assert!(h.feed.snapshot().await.is_empty());
        assert_eq!(h.feed.current_key(), 0);

        assert_eq!(h.feed.hydrate().await.unwrap(), 3);
        let ids: Vec<_> = h.feed.snapshot().await.into_iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec![MessageId::Server(1), MessageId::Server(2), MessageId::Server(3)]
        );
    }

    #[tokio::test]
    async fn delete_removes_from_cache_and_store() {
        let server = Server::with(vec![server_msg(1, 10)]);
        let h = harness(server, 20);
        h.feed.load_next().await.unwrap();
        let id = MessageId::Server(1);

        assert!(h.feed.delete(&id).await.unwrap());
        assert!(h.feed.get(&id).await.is_none());
        assert!(!h.store.contains(&id));
        assert!(!h.feed.delete(&id).await.unwrap());
    }

    fn friend_feed() -> (FriendFeed<usize>, MemoryStore<FriendEntry>) {
        let store = MemoryStore::new();
        let feed = FriendFeed::new(
            &PageConfig::default(),
            0usize,
            |_offset: usize| async { Ok::<_, FetchError>(Vec::new()) },
            |offset: &usize, items: &[FriendEntry]| offset + items.len(),
            Arc::new(store.clone()),
            Arc::new(ManualClock::new(0)),
        );
        (feed, store)
    }

    #[tokio::test]
    async fn block_removes_entry_from_blocked_users_list() {
        let mut registry = RelationshipRegistry::new();
        let (alice_list, _) = friend_feed();
        let (bob_list, bob_store) = friend_feed();
        let alice = PeerProfile::new(ALICE, "alice");
        let bob = PeerProfile::new(BOB, "bob");

        for (actor, peer, action) in [
            (ALICE, BOB, FriendAction::SendRequest),
            (BOB, ALICE, FriendAction::Accept),
            (ALICE, BOB, FriendAction::Block),
        ] {
            let transition = registry.apply(actor, peer, action).unwrap();
            alice_list
                .apply_view(transition.update_for(ALICE, bob.clone()))
                .await
                .unwrap();
            bob_list
                .apply_view(transition.update_for(BOB, alice.clone()))
                .await
                .unwrap();
        }

        let alice_view = alice_list.snapshot().await;
        assert_eq!(alice_view.len(), 1);
        assert_eq!(alice_view[0].status, FriendStatus::Blocked);
        assert!(bob_list.snapshot().await.is_empty());
        assert!(bob_store.is_empty());
    }

    #[tokio::test]
    async fn repeated_view_is_not_a_change() {
        let mut registry = RelationshipRegistry::new();
        let (list, store) = friend_feed();
        let transition = registry.apply(ALICE, BOB, FriendAction::SendRequest).unwrap();
        let update = transition.update_for(BOB, PeerProfile::new(ALICE, "alice"));

        assert!(list.apply_view(update.clone()).await.unwrap());
        assert!(!list.apply_view(update).await.unwrap());
        assert_eq!(list.snapshot().await[0].status, FriendStatus::PendingIncoming);
        assert_eq!(store.write_count(), 1);
    }
}
