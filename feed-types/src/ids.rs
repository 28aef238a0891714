//! Identity types for wallfeed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A server-assigned user identifier.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(u64);

impl UserId {
    /// Create a UserId from its numeric value.
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the numeric value of this UserId.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

/// Identifier of a message.
///
/// Messages created locally carry a `Temp` id until the server confirms them
/// and hands out the authoritative `Server` id. Server ids order before
/// temporary ones.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum MessageId {
    /// Authoritative id assigned by the server.
    Server(u64),
    /// Locally generated placeholder, replaced on reconciliation.
    Temp(String),
}

impl MessageId {
    /// Generate a fresh temporary id (`tmp-<uuid>`).
    pub fn temp() -> Self {
        Self::Temp(format!("tmp-{}", uuid::Uuid::new_v4()))
    }

    /// Whether this id is a local placeholder.
    pub fn is_temporary(&self) -> bool {
        matches!(self, Self::Temp(_))
    }
}

impl From<u64> for MessageId {
    fn from(value: u64) -> Self {
        Self::Server(value)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Server(id) => write!(f, "{}", id),
            Self::Temp(id) => f.write_str(id),
        }
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self)
    }
}

/// Identifier of the relationship between two users.
///
/// Derived from the unordered pair, so both participants compute the same id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RelationshipId {
    low: UserId,
    high: UserId,
}

impl RelationshipId {
    /// The relationship id for a pair of users, in either order.
    pub fn between(a: UserId, b: UserId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// The participant with the smaller id.
    pub fn low(&self) -> UserId {
        self.low
    }

    /// The participant with the larger id.
    pub fn high(&self) -> UserId {
        self.high
    }

    /// Whether `user` is one of the two participants.
    pub fn involves(&self, user: UserId) -> bool {
        self.low == user || self.high == user
    }

    /// The other participant, if `user` is part of this relationship.
    pub fn other(&self, user: UserId) -> Option<UserId> {
        if user == self.low {
            Some(self.high)
        } else if user == self.high {
            Some(self.low)
        } else {
            None
        }
    }
}

impl fmt::Display for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.low, self.high)
    }
}

impl fmt::Debug for RelationshipId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RelationshipId({})", self)
    }
}

/// SHA-256 digest of a message's content.
///
/// Used together with sender and timestamp to recognise the server copy of
/// an optimistically inserted message.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    /// Hash an image reference and optional caption.
    pub fn of(image_ref: &str, caption: Option<&str>) -> Self {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        hasher.update(b"wallfeed-content-v1");
        hasher.update((image_ref.len() as u64).to_le_bytes());
        hasher.update(image_ref.as_bytes());
        match caption {
            Some(caption) => {
                hasher.update([1u8]);
                hasher.update((caption.len() as u64).to_le_bytes());
                hasher.update(caption.as_bytes());
            }
            None => hasher.update([0u8]),
        }
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hasher.finalize());
        Self(bytes)
    }

    /// Get the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", &self.to_string()[..12])
    }
}
