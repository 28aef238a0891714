//! # feed-core
//!
//! Pure logic for wallfeed feeds (no I/O, instant tests).
//!
//! This crate implements the sequencing, state machines and merge rules
//! behind every list-like feed (message history, friend list, friend-request
//! inbox) without any network or disk I/O.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! Fetching, persistence and clocks live in `feed-client`, which drives these
//! types from injected callbacks.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cursor;
pub mod friendship;
pub mod reaction;
pub mod reconcile;
pub mod status;

pub use cursor::{PageCursor, PageTicket};
pub use friendship::{
    BlockedBy, FriendUpdate, RelationState, Relationship, RelationshipRegistry, Transition,
};
pub use reconcile::{FeedCache, FeedEntity, MergeReport};
pub use status::StatusChange;
