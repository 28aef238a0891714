//! # feed-types
//!
//! Entity, identity and error types shared by the wallfeed crates.
//!
//! This crate provides the foundational types for every list-like feed:
//! - [`UserId`], [`MessageId`], [`RelationshipId`], [`ContentHash`] - Identity types
//! - [`Message`], [`FriendEntry`] - Entities held in local caches
//! - [`DeliveryStatus`], [`Reaction`], [`FriendStatus`] - Closed enums
//! - [`FetchError`], [`IntegrityError`], [`InvalidTransitionError`] - Error taxonomy

#![warn(missing_docs)]
#![warn(clippy::all)]

mod error;
mod friend;
mod ids;
mod message;

pub use error::{FetchError, IntegrityError, InvalidTransitionError};
pub use friend::{FriendAction, FriendEntry, FriendStatus, PeerProfile};
pub use ids::{ContentHash, MessageId, RelationshipId, UserId};
pub use message::{DeliveryStatus, Message, Reaction, ReactionStamp};

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;
