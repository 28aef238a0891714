//! Reaction ledger.
//!
//! Each message holds at most one reaction per user. A local write always
//! overwrites; merging with a remote copy is last-write-wins per user by the
//! stamp's wall-clock time. Writing [`Reaction::None`] records a clear, so a
//! later clear beats an earlier reaction during merge.

use std::collections::BTreeMap;
use wallfeed_types::{Message, Reaction, ReactionStamp, Timestamp, UserId};

/// Write `user`'s reaction on `message`, replacing any previous one.
///
/// Returns `true` if the visible reaction changed.
pub fn write(message: &mut Message, user: UserId, reaction: Reaction, at: Timestamp) -> bool {
    let before = message.reaction_by(user);
    message
        .reactions
        .insert(user, ReactionStamp::new(reaction, at));
    before != message.reaction_by(user)
}

/// Merge `remote` reactions into `local`, last write wins per user.
///
/// Ties keep the local value. Entries only present locally are kept.
/// Returns `true` if anything in `local` changed.
pub fn merge(
    local: &mut BTreeMap<UserId, ReactionStamp>,
    remote: &BTreeMap<UserId, ReactionStamp>,
) -> bool {
    let mut changed = false;
    for (user, incoming) in remote {
        let newer = local
            .get(user)
            .map_or(true, |existing| incoming.at > existing.at);
        if newer {
            local.insert(*user, *incoming);
            changed = true;
        }
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallfeed_types::MessageId;

    fn message() -> Message {
        Message::new(
            MessageId::from(7),
            UserId::new(1),
            UserId::new(2),
            "img/peaks.jpg",
            None,
            100,
        )
    }

    #[test]
    fn later_write_overwrites_earlier() {
        let a = UserId::new(2);
        let mut msg = message();

        write(&mut msg, a, Reaction::Like, 1_000);
        write(&mut msg, a, Reaction::Love, 1_001);

        assert_eq!(msg.reaction_by(a), Some(Reaction::Love));
        assert_eq!(msg.reactions.len(), 1);
    }

    #[test]
    fn writing_none_clears() {
        let a = UserId::new(2);
        let mut msg = message();
        write(&mut msg, a, Reaction::Haha, 1);

        assert!(write(&mut msg, a, Reaction::None, 2));
        assert_eq!(msg.reaction_by(a), None);
    }

    #[test]
    fn rewriting_same_reaction_reports_no_change() {
        let a = UserId::new(2);
        let mut msg = message();
        assert!(write(&mut msg, a, Reaction::Sad, 1));
        assert!(!write(&mut msg, a, Reaction::Sad, 2));
    }

    #[test]
    fn reactions_are_per_user() {
        let mut msg = message();
        write(&mut msg, UserId::new(1), Reaction::Wow, 1);
        write(&mut msg, UserId::new(2), Reaction::Angry, 2);

        assert_eq!(msg.reaction_by(UserId::new(1)), Some(Reaction::Wow));
        assert_eq!(msg.reaction_by(UserId::new(2)), Some(Reaction::Angry));
    }

    #[test]
    fn merge_newer_remote_wins() {
        let a = UserId::new(2);
        let mut local = BTreeMap::from([(a, ReactionStamp::new(Reaction::Like, 10))]);
        let remote = BTreeMap::from([(a, ReactionStamp::new(Reaction::Love, 20))]);

        assert!(merge(&mut local, &remote));
        assert_eq!(local[&a].reaction, Reaction::Love);
    }

    #[test]
    fn merge_older_remote_loses() {
        let a = UserId::new(2);
        let mut local = BTreeMap::from([(a, ReactionStamp::new(Reaction::Love, 20))]);
        let remote = BTreeMap::from([(a, ReactionStamp::new(Reaction::Like, 10))]);

        assert!(!merge(&mut local, &remote));
        assert_eq!(local[&a].reaction, Reaction::Love);
    }

    #[test]
    fn merge_tie_keeps_local() {
        let a = UserId::new(2);
        let mut local = BTreeMap::from([(a, ReactionStamp::new(Reaction::Love, 20))]);
        let remote = BTreeMap::from([(a, ReactionStamp::new(Reaction::Sad, 20))]);

        assert!(!merge(&mut local, &remote));
        assert_eq!(local[&a].reaction, Reaction::Love);
    }

    #[test]
    fn later_remote_clear_beats_local_reaction() {
        let a = UserId::new(2);
        let mut local = BTreeMap::from([(a, ReactionStamp::new(Reaction::Like, 10))]);
        let remote = BTreeMap::from([(a, ReactionStamp::new(Reaction::None, 30))]);

        assert!(merge(&mut local, &remote));
        assert!(local[&a].reaction.is_none());
    }

    #[test]
    fn local_only_entries_survive_merge() {
        let mut local = BTreeMap::from([(UserId::new(1), ReactionStamp::new(Reaction::Wow, 5))]);
        let remote = BTreeMap::from([(UserId::new(2), ReactionStamp::new(Reaction::Like, 6))]);

        merge(&mut local, &remote);
        assert_eq!(local.len(), 2);
    }
}
