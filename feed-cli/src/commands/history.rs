//! Page through a conversation.

use anyhow::Result;
use std::sync::Arc;
use wallfeed_client::{FeedConfig, MemoryStore, MessageFeed, SystemClock};
use wallfeed_types::{Message, UserId};

use super::drain;
use crate::backend::DemoBackend;

/// Arguments for the history command.
#[derive(Debug, Clone)]
pub struct HistoryArgs {
    /// Local user.
    pub me: UserId,
    /// Other participant.
    pub peer: UserId,
    /// Messages the demo backend starts with.
    pub seed: u64,
    /// Page limit for each pass.
    pub pages: Option<usize>,
    /// Image reference to send.
    pub send: Option<String>,
    /// Caption for the sent image.
    pub caption: Option<String>,
}

/// Run the history command.
pub async fn run(config: &FeedConfig, args: &HistoryArgs, json: bool) -> Result<()> {
    let messages = load(config, args).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    println!("=== conversation {} <-> {} ===", args.me, args.peer);
    println!();
    for msg in &messages {
        let direction = if msg.sender_id == args.me { "->" } else { "<-" };
        let caption = msg.caption.as_deref().unwrap_or("");
        println!(
            "  [{:>9}] {} {} {} {}",
            msg.status.as_str(),
            msg.id,
            direction,
            msg.image_ref,
            caption
        );
    }
    println!();
    println!("{} messages", messages.len());

    Ok(())
}

/// Page the whole conversation into a feed and return its contents.
///
/// With `send`, the wallpaper is inserted optimistically, accepted by the
/// backend, and the feed is paged again so the server copy replaces it.
pub async fn load(config: &FeedConfig, args: &HistoryArgs) -> Result<Vec<Message>> {
    let backend = Arc::new(DemoBackend::seeded(args.me, args.peer, args.seed));
    let page_size = config.messages.page_size;
    let (me, peer) = (args.me, args.peer);

    let fetch_backend = backend.clone();
    let feed = MessageFeed::new(
        &config.messages,
        0usize,
        move |offset: usize| {
            let backend = fetch_backend.clone();
            async move { backend.history_page(me, peer, offset, page_size) }
        },
        |offset: &usize, page: &[Message]| offset + page.len(),
        Arc::new(MemoryStore::new()),
        Arc::new(SystemClock),
    );

    let pages = drain(&feed, args.pages).await?;
    tracing::info!(pages, "history loaded");

    if let Some(image_ref) = &args.send {
        let local = feed
            .send_local(me, peer, image_ref.clone(), args.caption.clone())
            .await?;
        tracing::info!(id = %local.id, "wallpaper queued");

        let stored = backend.accept(&local);
        tracing::info!(temp = %local.id, id = %stored.id, "wallpaper accepted");

        feed.reset().await;
        drain(&feed, None).await?;
    }

    Ok(feed.snapshot().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallfeed_client::PageConfig;
    use wallfeed_types::{DeliveryStatus, MessageId};

    fn args(seed: u64) -> HistoryArgs {
        HistoryArgs {
            me: UserId::new(1),
            peer: UserId::new(2),
            seed,
            pages: None,
            send: None,
            caption: None,
        }
    }

    fn config(page_size: usize) -> FeedConfig {
        FeedConfig {
            messages: PageConfig { page_size },
            ..FeedConfig::default()
        }
    }

    #[tokio::test]
    async fn loads_every_page() {
        let messages = load(&config(20), &args(25)).await.unwrap();
        assert_eq!(messages.len(), 25);
        assert!(messages
            .windows(2)
            .all(|pair| pair[0].timestamp_sent <= pair[1].timestamp_sent));
    }

    #[tokio::test]
    async fn page_limit_is_respected() {
        let mut limited = args(25);
        limited.pages = Some(1);
        let messages = load(&config(10), &limited).await.unwrap();
        assert_eq!(messages.len(), 10);
    }

    #[tokio::test]
    async fn sent_wallpaper_is_confirmed_once() {
        let mut sending = args(3);
        sending.send = Some("wallpapers/sunset.jpg".into());
        sending.caption = Some("for you".into());

        let messages = load(&config(20), &sending).await.unwrap();
        assert_eq!(messages.len(), 4);

        let last = messages.last().unwrap();
        assert_eq!(last.id, MessageId::Server(4));
        assert_eq!(last.status, DeliveryStatus::Delivered);
        assert!(messages.iter().all(|msg| !msg.id.is_temporary()));
    }

    #[tokio::test]
    async fn run_prints_json() {
        assert!(run(&config(5), &args(7), true).await.is_ok());
    }
}
