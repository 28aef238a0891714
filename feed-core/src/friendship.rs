//! Friendship state machine.
//!
//! One canonical [`Relationship`] record exists per unordered user pair. Each
//! participant's status is derived from that record plus the requester:
//!
//! ```text
//!   (absent) --SendRequest--> Pending --Accept--> Accepted
//!       ^                       |  |                 |
//!       +------Reject/Cancel----+  |                 |
//!       +------------------------------Remove--------+
//!   any --Block--> Blocked --Unblock--> (absent)
//! ```
//!
//! Blocking is one-directional: the blocker sees `Blocked`, the blocked user
//! sees `None`, and every answer given to the blocked user (including errors)
//! is the answer they would get if no record existed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wallfeed_types::{
    FriendAction, FriendEntry, FriendStatus, InvalidTransitionError, PeerProfile, RelationshipId,
    UserId,
};

/// Who has blocked whom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockedBy {
    /// Only this user blocked the other.
    One(UserId),
    /// Both participants blocked each other.
    Both,
}

/// Canonical state of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RelationState {
    /// The requester is waiting for an answer.
    Pending,
    /// Friends.
    Accepted,
    /// At least one side blocked the other.
    Blocked(BlockedBy),
}

/// The server-side record shared by both participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Unordered pair id.
    pub id: RelationshipId,
    /// User who initiated the relationship.
    pub requester: UserId,
    /// Current state.
    pub state: RelationState,
}

impl Relationship {
    /// Status of this relationship as seen by `viewer`.
    pub fn view_for(&self, viewer: UserId) -> FriendStatus {
        if !self.id.involves(viewer) {
            return FriendStatus::None;
        }
        match self.state {
            RelationState::Pending if viewer == self.requester => FriendStatus::PendingOutgoing,
            RelationState::Pending => FriendStatus::PendingIncoming,
            RelationState::Accepted => FriendStatus::Accepted,
            RelationState::Blocked(BlockedBy::Both) => FriendStatus::Blocked,
            RelationState::Blocked(BlockedBy::One(blocker)) if blocker == viewer => {
                FriendStatus::Blocked
            }
            RelationState::Blocked(BlockedBy::One(_)) => FriendStatus::None,
        }
    }

    /// Whether `user` is the side that was blocked (and must not learn it).
    fn hides_from(&self, user: UserId) -> bool {
        matches!(self.state, RelationState::Blocked(BlockedBy::One(blocker)) if blocker != user)
    }

    /// Process an action and return the next record (`None` = removed).
    ///
    /// This is a pure function; the registry stores the result.
    pub fn on_action(
        current: Option<Relationship>,
        id: RelationshipId,
        actor: UserId,
        action: FriendAction,
    ) -> Result<Option<Relationship>, InvalidTransitionError> {
        let view = current
            .map(|rel| rel.view_for(actor))
            .unwrap_or(FriendStatus::None);
        let reject = || InvalidTransitionError { from: view, action };

        if !id.involves(actor) || id.low() == id.high() {
            return Err(reject());
        }

        let Some(rel) = current else {
            return match action {
                FriendAction::SendRequest => Ok(Some(Relationship {
                    id,
                    requester: actor,
                    state: RelationState::Pending,
                })),
                FriendAction::Block => Ok(Some(Relationship {
                    id,
                    requester: actor,
                    state: RelationState::Blocked(BlockedBy::One(actor)),
                })),
                _ => Err(reject()),
            };
        };

        // The blocked side behaves as if nothing existed. A request from
        // them is swallowed so the blocker's record stays unchanged.
        if rel.hides_from(actor) {
            return match action {
                FriendAction::SendRequest => Ok(Some(rel)),
                FriendAction::Block => Ok(Some(Relationship {
                    state: RelationState::Blocked(BlockedBy::Both),
                    ..rel
                })),
                _ => Err(reject()),
            };
        }

        match (rel.state, action) {
            // Blocking overrides everything
            (RelationState::Blocked(_), FriendAction::Block) => Ok(Some(rel)),
            (_, FriendAction::Block) => Ok(Some(Relationship {
                state: RelationState::Blocked(BlockedBy::One(actor)),
                ..rel
            })),

            // Only the blocker can lift a block
            (RelationState::Blocked(BlockedBy::One(_)), FriendAction::Unblock) => Ok(None),
            (RelationState::Blocked(BlockedBy::Both), FriendAction::Unblock) => {
                let other = id.other(actor).ok_or_else(reject)?;
                Ok(Some(Relationship {
                    state: RelationState::Blocked(BlockedBy::One(other)),
                    ..rel
                }))
            }

            // Pending
            (RelationState::Pending, FriendAction::SendRequest) if actor == rel.requester => {
                Ok(Some(rel))
            }
            // Both sides asked: the second request accepts the first
            (RelationState::Pending, FriendAction::SendRequest)
            | (RelationState::Pending, FriendAction::Accept)
                if actor != rel.requester =>
            {
                Ok(Some(Relationship {
                    state: RelationState::Accepted,
                    ..rel
                }))
            }
            (RelationState::Pending, FriendAction::Reject) if actor != rel.requester => Ok(None),
            (RelationState::Pending, FriendAction::Cancel) if actor == rel.requester => Ok(None),

            // Accepted
            (RelationState::Accepted, FriendAction::Remove) => Ok(None),

            _ => Err(reject()),
        }
    }
}

/// An update to fold into one user's friend list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FriendUpdate {
    /// Insert or refresh this entry.
    Upsert(FriendEntry),
    /// Drop the relationship from the list.
    Remove(RelationshipId),
}

/// Result of applying an action: the canonical record after the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// The relationship that changed.
    pub relationship_id: RelationshipId,
    /// Record before the action.
    pub before: Option<Relationship>,
    /// Record after the action (`None` = removed).
    pub after: Option<Relationship>,
}

impl Transition {
    /// Whether the record changed.
    pub fn is_change(&self) -> bool {
        self.before != self.after
    }

    /// The status `viewer` sees after the transition.
    pub fn view_for(&self, viewer: UserId) -> FriendStatus {
        self.after
            .map(|rel| rel.view_for(viewer))
            .unwrap_or(FriendStatus::None)
    }

    /// What to sync into `viewer`'s list, given the peer's profile.
    ///
    /// Views of `None` become removals, so a blocked user's list simply
    /// loses the entry.
    pub fn update_for(&self, viewer: UserId, peer: PeerProfile) -> FriendUpdate {
        match self.after {
            Some(rel) if rel.view_for(viewer) != FriendStatus::None => {
                FriendUpdate::Upsert(FriendEntry {
                    relationship_id: self.relationship_id,
                    peer,
                    status: rel.view_for(viewer),
                    requester_id: rel.requester,
                })
            }
            _ => FriendUpdate::Remove(self.relationship_id),
        }
    }
}

/// All relationship records, at most one per unordered pair.
#[derive(Debug, Default, Clone)]
pub struct RelationshipRegistry {
    records: HashMap<RelationshipId, Relationship>,
}

impl RelationshipRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `action` by `actor` towards `peer`.
    pub fn apply(
        &mut self,
        actor: UserId,
        peer: UserId,
        action: FriendAction,
    ) -> Result<Transition, InvalidTransitionError> {
        let id = RelationshipId::between(actor, peer);
        let before = self.records.get(&id).copied();
        let after = Relationship::on_action(before, id, actor, action)?;

        match after {
            Some(rel) => {
                self.records.insert(id, rel);
            }
            None => {
                self.records.remove(&id);
            }
        }

        Ok(Transition {
            relationship_id: id,
            before,
            after,
        })
    }

    /// The canonical record for a pair, if one exists.
    pub fn get(&self, a: UserId, b: UserId) -> Option<&Relationship> {
        self.records.get(&RelationshipId::between(a, b))
    }

    /// `viewer`'s status towards `peer`.
    pub fn view(&self, viewer: UserId, peer: UserId) -> FriendStatus {
        self.get(viewer, peer)
            .map(|rel| rel.view_for(viewer))
            .unwrap_or(FriendStatus::None)
    }

    /// Every relationship visible to `viewer`, ordered by id.
    ///
    /// Relationships that read as `None` for the viewer are omitted.
    pub fn visible_to(&self, viewer: UserId) -> Vec<(Relationship, FriendStatus)> {
        let mut visible: Vec<_> = self
            .records
            .values()
            .filter_map(|rel| match rel.view_for(viewer) {
                FriendStatus::None => None,
                status => Some((*rel, status)),
            })
            .collect();
        visible.sort_by_key(|(rel, _)| rel.id);
        visible
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no relationships exist.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
