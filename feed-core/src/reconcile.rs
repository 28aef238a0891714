//! Reconciliation of fetched pages into a local feed cache.
//!
//! [`FeedCache`] keeps an ordered list of entities with these invariants:
//! - No two entries share an id
//! - Entries stay sorted by [`FeedEntity::sort_key`]; merging only inserts
//!   or patches fields in place, it never reorders confirmed entries
//! - Identity fields never change; a remote copy that disagrees is an
//!   [`IntegrityError`], never a silent overwrite
//! - A merge is all-or-nothing: on error the cache is left untouched
//!
//! Per-field precedence is delegated to the entity: messages merge status
//! monotonically and reactions last-write-wins, friend entries take the
//! server's view.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use wallfeed_types::{
    ContentHash, DeliveryStatus, FriendEntry, IntegrityError, Message, MessageId, Reaction,
    RelationshipId, Timestamp, UserId,
};

use crate::friendship::FriendUpdate;
use crate::reaction;
use crate::status::{self, StatusChange};

/// An entity that can live in a [`FeedCache`].
pub trait FeedEntity: Clone + Send + Sync + 'static {
    /// Unique id type.
    type Id: Clone + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;
    /// Ordering key; must be derived from identity fields only.
    type SortKey: Ord;
    /// Secondary key matching an optimistic entity to its server copy.
    type ProvisionalKey: Eq;

    /// The entity's id.
    fn id(&self) -> &Self::Id;

    /// Position of the entity in the feed.
    fn sort_key(&self) -> Self::SortKey;

    /// Whether this is a locally created entity awaiting a server id.
    fn is_provisional(&self) -> bool {
        false
    }

    /// Secondary key used to recognise the server copy of a provisional entity.
    fn provisional_key(&self) -> Option<Self::ProvisionalKey> {
        None
    }

    /// Verify that `remote` describes the same entity.
    fn check_identity(&self, remote: &Self) -> Result<(), IntegrityError>;

    /// Fold mutable fields from `remote` into `self`. Returns `true` on change.
    fn merge_remote(&mut self, remote: &Self) -> bool;
}

fn mismatch(
    id: &impl fmt::Display,
    field: &'static str,
    local: impl fmt::Display,
    remote: impl fmt::Display,
) -> IntegrityError {
    IntegrityError::ImmutableFieldMismatch {
        id: id.to_string(),
        field,
        local: local.to_string(),
        remote: remote.to_string(),
    }
}

impl FeedEntity for Message {
    type Id = MessageId;
    type SortKey = (Timestamp, MessageId);
    type ProvisionalKey = (UserId, Timestamp, ContentHash);

    fn id(&self) -> &MessageId {
        &self.id
    }

    fn sort_key(&self) -> Self::SortKey {
        (self.timestamp_sent, self.id.clone())
    }

    fn is_provisional(&self) -> bool {
        self.id.is_temporary()
    }

    fn provisional_key(&self) -> Option<Self::ProvisionalKey> {
        Some((self.sender_id, self.timestamp_sent, self.content_hash()))
    }

    fn check_identity(&self, remote: &Self) -> Result<(), IntegrityError> {
        if self.sender_id != remote.sender_id {
            return Err(mismatch(&self.id, "sender_id", self.sender_id, remote.sender_id));
        }
        if self.recipient_id != remote.recipient_id {
            return Err(mismatch(
                &self.id,
                "recipient_id",
                self.recipient_id,
                remote.recipient_id,
            ));
        }
        if self.timestamp_sent != remote.timestamp_sent {
            return Err(mismatch(
                &self.id,
                "timestamp_sent",
                self.timestamp_sent,
                remote.timestamp_sent,
            ));
        }
        Ok(())
    }

    fn merge_remote(&mut self, remote: &Self) -> bool {
        let status_changed = status::advance(self, remote.status).is_advanced();
        let reactions_changed = reaction::merge(&mut self.reactions, &remote.reactions);
        status_changed || reactions_changed
    }
}

impl FeedEntity for FriendEntry {
    type Id = RelationshipId;
    type SortKey = RelationshipId;
    type ProvisionalKey = ();

    fn id(&self) -> &RelationshipId {
        &self.relationship_id
    }

    fn sort_key(&self) -> RelationshipId {
        self.relationship_id
    }

    fn check_identity(&self, remote: &Self) -> Result<(), IntegrityError> {
        if self.peer.user_id != remote.peer.user_id {
            return Err(mismatch(
                &self.relationship_id,
                "peer.user_id",
                self.peer.user_id,
                remote.peer.user_id,
            ));
        }
        Ok(())
    }

    fn merge_remote(&mut self, remote: &Self) -> bool {
        // The server computes each side's view; it is authoritative.
        if self == remote {
            return false;
        }
        self.status = remote.status;
        self.requester_id = remote.requester_id;
        self.peer = remote.peer.clone();
        true
    }
}

/// What a merge did, so callers can mirror it into persistence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport<Id> {
    /// Ids inserted for the first time.
    pub inserted: Vec<Id>,
    /// Ids whose mutable fields changed.
    pub updated: Vec<Id>,
    /// Provisional ids replaced by server ids, as `(temporary, authoritative)`.
    pub replaced: Vec<(Id, Id)>,
}

impl<Id> Default for MergeReport<Id> {
    fn default() -> Self {
        Self {
            inserted: Vec::new(),
            updated: Vec::new(),
            replaced: Vec::new(),
        }
    }
}

impl<Id> MergeReport<Id> {
    /// Whether the merge changed nothing.
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.updated.is_empty() && self.replaced.is_empty()
    }

    /// Ids whose current value should be written to storage.
    pub fn changed(&self) -> impl Iterator<Item = &Id> {
        self.inserted
            .iter()
            .chain(self.updated.iter())
            .chain(self.replaced.iter().map(|(_, server)| server))
    }

    /// Ids that no longer exist and should be deleted from storage.
    pub fn retired(&self) -> impl Iterator<Item = &Id> {
        self.replaced.iter().map(|(temp, _)| temp)
    }
}

/// Ordered local copy of a feed.
#[derive(Debug, Clone)]
pub struct FeedCache<T: FeedEntity, K> {
    entries: Vec<T>,
    last_cursor: Option<K>,
    end_reached: bool,
}

impl<T: FeedEntity, K> Default for FeedCache<T, K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            last_cursor: None,
            end_reached: false,
        }
    }
}

impl<T: FeedEntity, K> FeedCache<T, K> {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries in feed order.
    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an entry by id.
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.entries.iter().find(|entry| entry.id() == id)
    }

    /// Whether an entry with `id` exists.
    pub fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }

    /// Cursor of the last page merged.
    pub fn last_cursor(&self) -> Option<&K> {
        self.last_cursor.as_ref()
    }

    /// Whether the last page merged was short.
    pub fn is_end_reached(&self) -> bool {
        self.end_reached
    }

    /// Insert a locally created entity (optimistic insert or hydration).
    pub fn insert_local(&mut self, entity: T) -> Result<(), IntegrityError> {
        if self.contains(entity.id()) {
            return Err(IntegrityError::DuplicateId {
                id: entity.id().to_string(),
            });
        }
        insert_sorted(&mut self.entries, entity);
        Ok(())
    }

    /// Merge a fetched page.
    ///
    /// `requested` is the page size asked for; a shorter page sets the
    /// end-of-data flag. On error nothing changes.
    pub fn merge_page(
        &mut self,
        items: Vec<T>,
        requested: usize,
        cursor: K,
    ) -> Result<MergeReport<T::Id>, IntegrityError> {
        let fetched = items.len();
        let report = self.merge_items(items)?;
        self.record_page(cursor, fetched < requested);
        Ok(report)
    }

    /// Record the cursor after a consumed page and whether it was the last.
    pub fn record_page(&mut self, cursor: K, end_reached: bool) {
        self.last_cursor = Some(cursor);
        self.end_reached = end_reached;
    }

    /// Merge remote entities without touching cursor bookkeeping.
    pub fn merge_items(&mut self, items: Vec<T>) -> Result<MergeReport<T::Id>, IntegrityError> {
        let mut staged = self.entries.clone();
        let mut report = MergeReport::default();

        for remote in items {
            merge_one(&mut staged, remote, &mut report)?;
        }
        check_unique(&staged)?;

        self.entries = staged;
        Ok(report)
    }

    /// Patch one entry in place through `apply`.
    ///
    /// Returns `None` if the id is unknown, else whatever `apply` returned.
    /// `apply` must not change identity fields.
    fn patch<R>(&mut self, id: &T::Id, apply: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.entries
            .iter_mut()
            .find(|entry| entry.id() == id)
            .map(apply)
    }

    /// Remove an entry by explicit user action.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let pos = self.entries.iter().position(|entry| entry.id() == id)?;
        Some(self.entries.remove(pos))
    }

    /// Forget cursor bookkeeping but keep entries.
    pub fn rewind(&mut self) {
        self.last_cursor = None;
        self.end_reached = false;
    }

    /// Drop all entries and cursor bookkeeping.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.rewind();
    }
}

impl<K> FeedCache<Message, K> {
    /// Apply a status report to a cached message.
    pub fn advance_status(
        &mut self,
        id: &MessageId,
        incoming: DeliveryStatus,
    ) -> Option<StatusChange> {
        self.patch(id, |msg| status::advance(msg, incoming))
    }

    /// Write `user`'s reaction on a cached message.
    pub fn write_reaction(
        &mut self,
        id: &MessageId,
        user: UserId,
        value: Reaction,
        at: Timestamp,
    ) -> Option<bool> {
        self.patch(id, |msg| reaction::write(msg, user, value, at))
    }

    /// Latest timestamp among messages sent by `sender`.
    pub fn last_sent_by(&self, sender: UserId) -> Option<Timestamp> {
        self.entries
            .iter()
            .filter(|msg| msg.sender_id == sender)
            .map(|msg| msg.timestamp_sent)
            .max()
    }
}

impl<K> FeedCache<FriendEntry, K> {
    /// Fold a friendship transition into this list.
    ///
    /// Returns `true` if the list changed.
    pub fn apply_update(&mut self, update: FriendUpdate) -> Result<bool, IntegrityError> {
        match update {
            FriendUpdate::Upsert(entry) => {
                let report = self.merge_items(vec![entry])?;
                Ok(!report.is_empty())
            }
            FriendUpdate::Remove(id) => Ok(self.remove(&id).is_some()),
        }
    }
}

fn insert_sorted<T: FeedEntity>(entries: &mut Vec<T>, entity: T) {
    let key = entity.sort_key();
    let pos = entries.partition_point(|existing| existing.sort_key() <= key);
    entries.insert(pos, entity);
}

fn merge_one<T: FeedEntity>(
    staged: &mut Vec<T>,
    remote: T,
    report: &mut MergeReport<T::Id>,
) -> Result<(), IntegrityError> {
    // Known id: patch mutable fields in place
    if let Some(local) = staged.iter_mut().find(|entry| entry.id() == remote.id()) {
        local.check_identity(&remote)?;
        if local.merge_remote(&remote) {
            report.updated.push(remote.id().clone());
        }
        return Ok(());
    }

    // Server copy of an optimistic entity: swap the id, keep local edits
    if !remote.is_provisional() {
        if let Some(key) = remote.provisional_key() {
            let matched = staged
                .iter()
                .position(|entry| {
                    entry.is_provisional() && entry.provisional_key().as_ref() == Some(&key)
                });
            if let Some(pos) = matched {
                staged[pos].check_identity(&remote)?;
                let local = staged.remove(pos);
                let mut confirmed = remote;
                confirmed.merge_remote(&local);
                report
                    .replaced
                    .push((local.id().clone(), confirmed.id().clone()));
                insert_sorted(staged, confirmed);
                return Ok(());
            }
        }
    }

    report.inserted.push(remote.id().clone());
    insert_sorted(staged, remote);
    Ok(())
}

fn check_unique<T: FeedEntity>(entries: &[T]) -> Result<(), IntegrityError> {
    let mut seen = HashSet::with_capacity(entries.len());
    for entry in entries {
        if !seen.insert(entry.id()) {
            return Err(IntegrityError::DuplicateId {
                id: entry.id().to_string(),
            });
        }
    }
    Ok(())
}
