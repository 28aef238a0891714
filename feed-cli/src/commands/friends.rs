//! Show and change friend lists.

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use wallfeed_client::{FeedConfig, FriendFeed, MemoryStore, PageConfig, SystemClock};
use wallfeed_core::FriendUpdate;
use wallfeed_types::{FriendAction, FriendEntry, UserId};

use super::drain;
use crate::backend::DemoBackend;

/// Peer the demo conversation and friendship are seeded with.
const SEED_PEER: UserId = UserId::new(2);

/// One action applied by the local user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// What to do.
    pub action: FriendAction,
    /// Towards whom.
    pub peer: UserId,
}

/// Parse `ACTION:PEER`.
pub fn parse_step(s: &str) -> Result<Step, String> {
    let (action, peer) = s
        .split_once(':')
        .ok_or_else(|| format!("expected ACTION:PEER, got {s:?}"))?;
    let action = action.parse::<FriendAction>().map_err(|e| e.to_string())?;
    let peer = peer
        .trim()
        .parse::<u64>()
        .map_err(|e| format!("invalid peer id {peer:?}: {e}"))?;
    Ok(Step {
        action,
        peer: UserId::new(peer),
    })
}

/// Both lists as printed.
#[derive(Debug, Serialize)]
pub struct FriendLists {
    /// Accepted and blocked relationships.
    pub friends: Vec<FriendEntry>,
    /// Pending requests in either direction.
    pub requests: Vec<FriendEntry>,
}

/// Run the friends command.
pub async fn run(config: &FeedConfig, me: UserId, steps: &[Step], json: bool) -> Result<()> {
    let lists = load(config, me, steps).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    println!("=== friends of {} ===", me);
    print_section("Friends", &lists.friends);
    print_section("Requests", &lists.requests);
    Ok(())
}

fn print_section(title: &str, entries: &[FriendEntry]) {
    println!();
    println!("{} ({}):", title, entries.len());
    for entry in entries {
        println!(
            "  [{}] {} ({})",
            entry.status, entry.peer.name, entry.peer.user_id
        );
    }
}

/// Page both lists, then apply `steps` and fold each transition in.
pub async fn load(config: &FeedConfig, me: UserId, steps: &[Step]) -> Result<FriendLists> {
    let backend = Arc::new(DemoBackend::seeded(me, SEED_PEER, 0));
    let friends = list_feed(&backend, me, &config.friends, false);
    let requests = list_feed(&backend, me, &config.requests, true);

    drain(&friends, None).await?;
    drain(&requests, None).await?;

    for step in steps {
        let transition = backend
            .apply(me, step.peer, step.action)
            .with_context(|| format!("{} {} failed", step.action, step.peer))?;
        tracing::info!(
            action = %step.action,
            peer = %step.peer,
            status = %transition.view_for(me),
            "friendship updated"
        );
        let update = transition.update_for(me, backend.profile(step.peer));
        fold(update, &friends, &requests).await?;
    }

    Ok(FriendLists {
        friends: friends.snapshot().await,
        requests: requests.snapshot().await,
    })
}

fn list_feed(
    backend: &Arc<DemoBackend>,
    me: UserId,
    pages: &PageConfig,
    pending: bool,
) -> FriendFeed<usize> {
    let page_size = pages.page_size;
    let fetch_backend = backend.clone();
    FriendFeed::new(
        pages,
        0usize,
        move |offset: usize| {
            let backend = fetch_backend.clone();
            async move { backend.friends_page(me, pending, offset, page_size) }
        },
        |offset: &usize, page: &[FriendEntry]| offset + page.len(),
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
    )
}

/// Route an update to the list its status belongs in, removing it from
/// the other one.
async fn fold(
    update: FriendUpdate,
    friends: &FriendFeed<usize>,
    requests: &FriendFeed<usize>,
) -> Result<()> {
    match &update {
        FriendUpdate::Upsert(entry) => {
            let (target, other) = if entry.status.is_pending() {
                (requests, friends)
            } else {
                (friends, requests)
            };
            other
                .apply_view(FriendUpdate::Remove(entry.relationship_id))
                .await?;
            target.apply_view(update).await?;
        }
        FriendUpdate::Remove(_) => {
            friends.apply_view(update.clone()).await?;
            requests.apply_view(update).await?;
        }
    }
    Ok(())
}
