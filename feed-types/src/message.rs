//! Message entities exchanged between users.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::FetchError;
use crate::ids::{ContentHash, MessageId, RelationshipId, UserId};
use crate::Timestamp;

/// Delivery status of a message.
///
/// Ordered `Sent < Delivered < Read`; a message only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    /// Accepted locally or by the server, not yet on the recipient's device.
    Sent,
    /// Stored on the recipient's device.
    Delivered,
    /// Opened by the recipient.
    Read,
}

impl DeliveryStatus {
    /// Wire name of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Delivered => "delivered",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryStatus {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sent" => Ok(Self::Sent),
            "delivered" => Ok(Self::Delivered),
            "read" | "seen" => Ok(Self::Read),
            other => Err(FetchError::Serialization(format!(
                "unknown delivery status: {other:?}"
            ))),
        }
    }
}

/// A reaction to a message. `None` clears a previous reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reaction {
    /// Thumbs up.
    Like,
    /// Heart.
    Love,
    /// Laughing.
    Haha,
    /// Surprised.
    Wow,
    /// Sad.
    Sad,
    /// Angry.
    Angry,
    /// No reaction.
    None,
}

impl Reaction {
    /// Wire name of this reaction.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Haha => "haha",
            Self::Wow => "wow",
            Self::Sad => "sad",
            Self::Angry => "angry",
            Self::None => "none",
        }
    }

    /// Whether this value clears the reaction.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Reaction {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "like" => Ok(Self::Like),
            "love" => Ok(Self::Love),
            "haha" => Ok(Self::Haha),
            "wow" => Ok(Self::Wow),
            "sad" => Ok(Self::Sad),
            "angry" => Ok(Self::Angry),
            "none" | "" => Ok(Self::None),
            other => Err(FetchError::Serialization(format!(
                "unknown reaction: {other:?}"
            ))),
        }
    }
}

/// A reaction together with the wall-clock time it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionStamp {
    /// The reaction value (`None` records a clear).
    pub reaction: Reaction,
    /// When the reaction was written.
    pub at: Timestamp,
}

impl ReactionStamp {
    /// Create a new stamp.
    pub fn new(reaction: Reaction, at: Timestamp) -> Self {
        Self { reaction, at }
    }
}

/// A wallpaper sent from one user to another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server id, or a temporary id before sync.
    pub id: MessageId,
    /// Author of the message.
    pub sender_id: UserId,
    /// Receiver of the message.
    pub recipient_id: UserId,
    /// Reference to the shared image.
    pub image_ref: String,
    /// Optional caption.
    pub caption: Option<String>,
    /// Send time, monotonic per sender.
    pub timestamp_sent: Timestamp,
    /// Delivery status.
    pub status: DeliveryStatus,
    /// At most one reaction per user, keyed by the reacting user.
    #[serde(default)]
    pub reactions: BTreeMap<UserId, ReactionStamp>,
}

impl Message {
    /// Create a message in the `Sent` state with no reactions.
    pub fn new(
        id: MessageId,
        sender_id: UserId,
        recipient_id: UserId,
        image_ref: impl Into<String>,
        caption: Option<String>,
        timestamp_sent: Timestamp,
    ) -> Self {
        Self {
            id,
            sender_id,
            recipient_id,
            image_ref: image_ref.into(),
            caption,
            timestamp_sent,
            status: DeliveryStatus::Sent,
            reactions: BTreeMap::new(),
        }
    }

    /// Set the delivery status.
    pub fn with_status(mut self, status: DeliveryStatus) -> Self {
        self.status = status;
        self
    }

    /// Record a reaction from `user`.
    pub fn with_reaction(mut self, user: UserId, reaction: Reaction, at: Timestamp) -> Self {
        self.reactions.insert(user, ReactionStamp::new(reaction, at));
        self
    }

    /// Hash of the image reference and caption.
    pub fn content_hash(&self) -> ContentHash {
        ContentHash::of(&self.image_ref, self.caption.as_deref())
    }

    /// The conversation (unordered sender/recipient pair) this message belongs to.
    pub fn conversation(&self) -> RelationshipId {
        RelationshipId::between(self.sender_id, self.recipient_id)
    }

    /// The current reaction from `user`, if any. Cleared reactions read as absent.
    pub fn reaction_by(&self, user: UserId) -> Option<Reaction> {
        self.reactions
            .get(&user)
            .map(|stamp| stamp.reaction)
            .filter(|reaction| !reaction.is_none())
    }
}
