//! In-process demo backend.
//!
//! Stands in for the wallfeed server: serves message history and friend
//! lists in offset pages and owns the canonical relationship records.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use wallfeed_core::{RelationshipRegistry, Transition};
use wallfeed_types::{
    DeliveryStatus, FetchError, FriendAction, FriendEntry, InvalidTransitionError, Message,
    MessageId, PeerProfile, RelationshipId, Timestamp, UserId,
};

/// First seeded message timestamp (2023-11-14T22:13:20Z).
const SEED_EPOCH: Timestamp = 1_700_000_000_000;

/// Spacing between seeded messages.
const SEED_STEP: Timestamp = 60_000;

/// Fake server state.
pub struct DemoBackend {
    inner: Mutex<BackendInner>,
}

struct BackendInner {
    messages: Vec<Message>,
    next_message_id: u64,
    registry: RelationshipRegistry,
    profiles: HashMap<UserId, PeerProfile>,
}

impl DemoBackend {
    /// A backend with `count` messages between `me` and `peer` and a small
    /// social graph around `me`.
    pub fn seeded(me: UserId, peer: UserId, count: u64) -> Self {
        let messages = (0..count)
            .map(|i| {
                let (from, to) = if i % 2 == 0 { (me, peer) } else { (peer, me) };
                let status = match count - i {
                    1 => DeliveryStatus::Sent,
                    2..=3 => DeliveryStatus::Delivered,
                    _ => DeliveryStatus::Read,
                };
                Message::new(
                    MessageId::Server(i + 1),
                    from,
                    to,
                    format!("wallpapers/{:04}.jpg", i + 1),
                    (i % 3 == 0).then(|| format!("wallpaper #{}", i + 1)),
                    SEED_EPOCH + i * SEED_STEP,
                )
                .with_status(status)
            })
            .collect();

        let mut backend = BackendInner {
            messages,
            next_message_id: count + 1,
            registry: RelationshipRegistry::new(),
            profiles: HashMap::new(),
        };

        let others = [
            (peer, "bea"),
            (UserId::new(me.value() + 100), "cam"),
            (UserId::new(me.value() + 101), "dia"),
            (UserId::new(me.value() + 102), "eli"),
        ];
        backend.profiles.insert(me, PeerProfile::new(me, "me"));
        for (id, name) in others {
            backend.profiles.insert(id, PeerProfile::new(id, name));
        }

        // peer: friends, cam: asked me, dia: I asked, eli: blocked me
        let seed = [
            (me, peer, FriendAction::SendRequest),
            (peer, me, FriendAction::Accept),
            (others[1].0, me, FriendAction::SendRequest),
            (me, others[2].0, FriendAction::SendRequest),
            (others[3].0, me, FriendAction::Block),
        ];
        for (actor, target, action) in seed {
            if actor == target {
                continue;
            }
            if let Err(e) = backend.registry.apply(actor, target, action) {
                tracing::warn!("seed step skipped: {}", e);
            }
        }

        Self {
            inner: Mutex::new(backend),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BackendInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Messages between `a` and `b`, oldest first, starting at `offset`.
    pub fn history_page(
        &self,
        a: UserId,
        b: UserId,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Message>, FetchError> {
        let conversation = RelationshipId::between(a, b);
        let inner = self.lock();
        Ok(inner
            .messages
            .iter()
            .filter(|msg| msg.conversation() == conversation)
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    /// Accept an optimistic message: assign a server id and mark it
    /// delivered. Returns the stored copy.
    pub fn accept(&self, local: &Message) -> Message {
        let mut inner = self.lock();
        let id = inner.next_message_id;
        inner.next_message_id += 1;

        let mut stored = local.clone();
        stored.id = MessageId::Server(id);
        stored.status = DeliveryStatus::Delivered;
        stored.reactions.clear();
        inner.messages.push(stored.clone());
        stored
    }

    /// Apply a friendship action on the canonical records.
    pub fn apply(
        &self,
        actor: UserId,
        peer: UserId,
        action: FriendAction,
    ) -> Result<Transition, InvalidTransitionError> {
        self.lock().registry.apply(actor, peer, action)
    }

    /// Profile of `user`, or a placeholder for unknown users.
    pub fn profile(&self, user: UserId) -> PeerProfile {
        self.lock()
            .profiles
            .get(&user)
            .cloned()
            .unwrap_or_else(|| PeerProfile::new(user, format!("user-{user}")))
    }

    /// `viewer`'s friend list (`pending == false`) or request list
    /// (`pending == true`), starting at `offset`.
    pub fn friends_page(
        &self,
        viewer: UserId,
        pending: bool,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<FriendEntry>, FetchError> {
        let inner = self.lock();
        Ok(inner
            .registry
            .visible_to(viewer)
            .into_iter()
            .filter(|(_, status)| status.is_pending() == pending)
            .skip(offset)
            .take(limit)
            .map(|(rel, status)| {
                let peer = rel.id.other(viewer).unwrap_or(viewer);
                FriendEntry {
                    relationship_id: rel.id,
                    peer: inner
                        .profiles
                        .get(&peer)
                        .cloned()
                        .unwrap_or_else(|| PeerProfile::new(peer, format!("user-{peer}"))),
                    status,
                    requester_id: rel.requester,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ME: UserId = UserId::new(1);
    const BEA: UserId = UserId::new(2);

    #[test]
    fn history_pages_by_offset() {
        let backend = DemoBackend::seeded(ME, BEA, 5);
        let first = backend.history_page(ME, BEA, 0, 3).unwrap();
        let second = backend.history_page(BEA, ME, 3, 3).unwrap();

        assert_eq!(first.len(), 3);
        assert_eq!(second.len(), 2);
        assert_eq!(second[0].id, MessageId::Server(4));
        assert!(backend.history_page(ME, UserId::new(9), 0, 3).unwrap().is_empty());
    }

    #[test]
    fn newest_seeded_message_is_only_sent() {
        let backend = DemoBackend::seeded(ME, BEA, 4);
        let all = backend.history_page(ME, BEA, 0, 10).unwrap();
        assert_eq!(all[3].status, DeliveryStatus::Sent);
        assert_eq!(all[0].status, DeliveryStatus::Read);
    }

    #[test]
    fn seeded_graph_hides_blocker() {
        let backend = DemoBackend::seeded(ME, BEA, 0);
        let friends = backend.friends_page(ME, false, 0, 10).unwrap();
        let requests = backend.friends_page(ME, true, 0, 10).unwrap();

        assert_eq!(friends.len(), 1);
        assert_eq!(friends[0].peer.user_id, BEA);
        assert_eq!(requests.len(), 2);
        assert!(requests
            .iter()
            .all(|entry| entry.peer.name == "cam" || entry.peer.name == "dia"));
    }

    #[test]
    fn accept_assigns_next_server_id() {
        let backend = DemoBackend::seeded(ME, BEA, 2);
        let local = Message::new(MessageId::temp(), ME, BEA, "wallpapers/new.jpg", None, 5);
        let stored = backend.accept(&local);

        assert_eq!(stored.id, MessageId::Server(3));
        assert_eq!(stored.status, DeliveryStatus::Delivered);
        assert_eq!(backend.history_page(ME, BEA, 0, 10).unwrap().len(), 3);
    }
}
