//! Friend-list entries and the per-user view of a relationship.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FetchError;
use crate::ids::{RelationshipId, UserId};
use crate::Timestamp;

/// A relationship's status as seen by one participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendStatus {
    /// No relationship visible to this user.
    None,
    /// This user sent a request that is awaiting an answer.
    PendingOutgoing,
    /// The peer sent a request to this user.
    PendingIncoming,
    /// Both users are friends.
    Accepted,
    /// This user blocked the peer.
    Blocked,
}

impl FriendStatus {
    /// Whether the status is one of the pending variants.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::PendingOutgoing | Self::PendingIncoming)
    }
}

impl fmt::Display for FriendStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::PendingOutgoing => "pending_outgoing",
            Self::PendingIncoming => "pending_incoming",
            Self::Accepted => "accepted",
            Self::Blocked => "blocked",
        };
        f.write_str(name)
    }
}

/// An action a user takes on a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FriendAction {
    /// Ask the peer to become friends.
    SendRequest,
    /// Accept the peer's request.
    Accept,
    /// Decline the peer's request.
    Reject,
    /// Withdraw one's own request.
    Cancel,
    /// End an accepted friendship.
    Remove,
    /// Block the peer.
    Block,
    /// Lift a block placed by this user.
    Unblock,
}

impl fmt::Display for FriendAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SendRequest => "send_request",
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
            Self::Remove => "remove",
            Self::Block => "block",
            Self::Unblock => "unblock",
        };
        f.write_str(name)
    }
}

impl FromStr for FriendAction {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "send_request" | "request" => Ok(Self::SendRequest),
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "cancel" => Ok(Self::Cancel),
            "remove" => Ok(Self::Remove),
            "block" => Ok(Self::Block),
            "unblock" => Ok(Self::Unblock),
            other => Err(FetchError::Serialization(format!(
                "unknown friend action: {other:?}"
            ))),
        }
    }
}

/// Snapshot of the other participant's profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerProfile {
    /// The peer's user id.
    pub user_id: UserId,
    /// Display name.
    pub name: String,
    /// Avatar image reference.
    pub avatar: Option<String>,
    /// Last time the peer was seen online.
    pub last_online: Option<Timestamp>,
}

impl PeerProfile {
    /// Create a profile with only a name.
    pub fn new(user_id: UserId, name: impl Into<String>) -> Self {
        Self {
            user_id,
            name: name.into(),
            avatar: None,
            last_online: None,
        }
    }
}

/// One row of a friend list or friend-request inbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FriendEntry {
    /// Relationship id (unordered user pair).
    pub relationship_id: RelationshipId,
    /// The other participant.
    pub peer: PeerProfile,
    /// Status from the list owner's point of view.
    pub status: FriendStatus,
    /// User who initiated the relationship.
    pub requester_id: UserId,
}

impl FriendEntry {
    /// The user whose list this entry belongs to.
    pub fn owner(&self) -> Option<UserId> {
        self.relationship_id.other(self.peer.user_id)
    }
}
