//! # wallfeed-client
//!
//! Async pagination and local reconciliation for wallfeed.
//!
//! This is the library applications use to page server lists into a local
//! cache and keep that cache in sync with on-device storage.
//!
//! ## Features
//!
//! - **Sequenced paging**: at most one fetch in flight, reset wins over an
//!   in-flight page
//! - **Storage abstraction**: pluggable persistence (`LocalStore`, memory)
//! - **Optimistic writes**: local sends with temporary ids, replaced when the
//!   server copy arrives
//! - **Pure core**: merge and transition rules live in wallfeed-core
//!
//! ## Example
//!
//! ```ignore
//! use wallfeed_client::{Feed, FeedConfig, MemoryStore, SystemClock};
//!
//! let config = FeedConfig::default();
//! let history = Feed::new(
//!     &config.messages,
//!     0usize,
//!     move |offset| api.history(offset, config.messages.page_size),
//!     |offset, page| offset + page.len(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SystemClock),
//! );
//!
//! history.load_next().await?;
//! let sent = history.send_local(me, friend, "img/sunset.jpg", None).await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod config;
pub mod feed;
pub mod paginator;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, FeedConfig, PageConfig};
pub use feed::{Feed, FeedError, FriendFeed, MessageFeed};
pub use paginator::{BoxFuture, LoadOutcome, Paginator, PaginatorConfig, SinkError};
pub use store::{LocalStore, MemoryStore, StoreError};
