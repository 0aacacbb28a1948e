//! Tests for the starboard ledger, mirrors and commands.

mod test_utils;

use nugu_core::StarboardSettings;
use nugu_database::MemoryStore;
use nugu_error::NuguErrorKind;
use nugu_interface::{ChannelMessage, ChatPlatform, StarboardStore};
use nugu_starboard::{StarChange, Starboard, StarboardCommand, StarboardConfig};
use std::sync::Arc;
use std::time::Duration;
use test_utils::{BOT_ID, MockPlatform};

const GUILD: u64 = 1;
const SOURCE: u64 = 10;
const BOARD: u64 = 20;
const AUTHOR: u64 = 7;
const BOT_USER: u64 = 8;
const STAR: &str = "⭐";

struct Fixture {
    store: Arc<MemoryStore>,
    platform: Arc<MockPlatform>,
    starboard: Arc<Starboard>,
}

fn message(id: u64, content: &str) -> ChannelMessage {
    ChannelMessage {
        id,
        channel_id: SOURCE,
        guild_id: Some(GUILD),
        author_id: AUTHOR,
        author_name: "jennie".to_string(),
        content: content.to_string(),
        ..ChannelMessage::default()
    }
}

async fn fixture_with(platform: MockPlatform, minimum: usize) -> Fixture {
    let store = Arc::new(MemoryStore::new());
    store
        .save_settings(
            GUILD,
            &StarboardSettings::new(Some(BOARD), minimum, vec![STAR.into(), "🌟".into()]),
        )
        .await
        .unwrap();

    platform.add_user(1, "alice", false);
    platform.add_user(2, "bob", false);
    platform.add_user(3, "carol", false);
    platform.add_user(AUTHOR, "jennie", false);
    platform.add_user(BOT_USER, "helper", true);
    platform.add_message(message(100, "look https://x/pic.png"));
    platform.add_message(message(101, "second"));

    let platform = Arc::new(platform);
    let starboard = Arc::new(Starboard::new(
        store.clone(),
        platform.clone(),
        StarboardConfig::default(),
    ));
    Fixture {
        store,
        platform,
        starboard,
    }
}

async fn fixture(minimum: usize) -> Fixture {
    fixture_with(MockPlatform::new(), minimum).await
}

async fn star(f: &Fixture, message_id: u64, user_id: u64) -> StarChange {
    f.starboard
        .on_reaction_add(GUILD, SOURCE, message_id, user_id, STAR)
        .await
        .unwrap()
}

async fn unstar(f: &Fixture, message_id: u64, user_id: u64) -> StarChange {
    f.starboard
        .on_reaction_remove(GUILD, SOURCE, message_id, user_id, STAR)
        .await
        .unwrap()
}

fn updated(change: StarChange) -> nugu_core::StarboardEntry {
    match change {
        StarChange::Updated(entry) => entry,
        other => panic!("expected an updated entry, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mirror_follows_minimum() {
    let f = fixture(3).await;

    star(&f, 100, 1).await;
    star(&f, 100, 2).await;
    assert!(f.platform.posted_in(BOARD).is_empty());

    let entry = updated(star(&f, 100, 3).await);
    assert_eq!(entry.stars(), 3);
    let mirror = entry.mirror.unwrap();
    assert_eq!(mirror.channel_id, BOARD);
    let posted = f.platform.posted_in(BOARD);
    assert_eq!(posted.len(), 1);
    assert!(posted[0].1.footer.as_deref().unwrap().starts_with("⭐ 3 | Message #100 |"));
    assert_eq!(posted[0].1.image_url.as_deref(), Some("https://x/pic.png"));

    // Dropping to two stars with a minimum of three removes the mirror.
    let entry = updated(unstar(&f, 100, 2).await);
    assert_eq!(entry.stars(), 2);
    assert!(entry.mirror.is_none());
    assert!(f.platform.is_deleted(mirror.message_id));
    assert!(f.platform.posted_in(BOARD).is_empty());
    let stored = f.store.find_entry(GUILD, 100).await.unwrap().unwrap();
    assert_eq!(stored.stars(), 2);
    assert!(stored.mirror.is_none());

    let entry = updated(star(&f, 100, 2).await);
    assert!(entry.mirror.is_some());
    assert_eq!(f.platform.posted_in(BOARD).len(), 1);

    unstar(&f, 100, 1).await;
    unstar(&f, 100, 2).await;
    assert_eq!(unstar(&f, 100, 3).await, StarChange::Removed);
    assert!(f.store.find_entry(GUILD, 100).await.unwrap().is_none());
    assert!(f.platform.posted_in(BOARD).is_empty());
}

#[tokio::test]
async fn test_duplicate_star_is_noop() {
    let f = fixture(1).await;

    let first = updated(star(&f, 100, 1).await);
    let second = updated(star(&f, 100, 1).await);

    assert_eq!(first.stars(), 1);
    assert_eq!(second.stars(), 1);
    assert_eq!(f.platform.sends(), 1);
    assert_eq!(f.platform.edits(), 0);
}

#[tokio::test]
async fn test_ignored_reactions() {
    let f = fixture(1).await;

    assert_eq!(star(&f, 100, BOT_USER).await, StarChange::Ignored);
    assert_eq!(star(&f, 100, BOT_ID).await, StarChange::Ignored);
    assert_eq!(star(&f, 100, AUTHOR).await, StarChange::Ignored);
    assert_eq!(
        f.starboard
            .on_reaction_add(GUILD, SOURCE, 100, 1, "👍")
            .await
            .unwrap(),
        StarChange::Ignored
    );
    assert_eq!(
        f.starboard
            .on_reaction_add(2, SOURCE, 100, 1, STAR)
            .await
            .unwrap(),
        StarChange::Ignored
    );

    f.platform.add_message(message(102, ""));
    assert_eq!(star(&f, 102, 1).await, StarChange::Ignored);

    assert_eq!(unstar(&f, 101, 1).await, StarChange::Ignored);
    assert!(f.store.entries_for_guild(GUILD).await.unwrap().is_empty());
    assert_eq!(f.platform.sends(), 0);
}

#[tokio::test]
async fn test_mirror_edited_in_place() {
    let f = fixture(1).await;

    let first = updated(star(&f, 100, 1).await);
    let second = updated(star(&f, 100, 2).await);

    assert_eq!(first.mirror, second.mirror);
    assert_eq!(f.platform.sends(), 1);
    assert_eq!(f.platform.edits(), 1);
    let posted = f.platform.posted_in(BOARD);
    assert!(posted[0].1.footer.as_deref().unwrap().starts_with("⭐ 2 |"));
    assert_eq!(posted[0].1.author.as_deref(), Some("@jennie in #channel10:"));
}

#[tokio::test]
async fn test_reconfigured_channel_gets_fresh_mirror() {
    let f = fixture(1).await;
    let old = updated(star(&f, 100, 1).await).mirror.unwrap();

    f.starboard.set_channel(GUILD, Some(30)).await.unwrap();
    let entry = updated(star(&f, 100, 2).await);

    let mirror = entry.mirror.unwrap();
    assert_eq!(mirror.channel_id, 30);
    assert_ne!(mirror.message_id, old.message_id);
    assert_eq!(f.platform.edits(), 0);
    assert_eq!(f.platform.posted_in(30).len(), 1);
    let stale = f.platform.posted_in(BOARD);
    assert!(stale[0].1.footer.as_deref().unwrap().starts_with("⭐ 1 |"));
}

#[tokio::test]
async fn test_message_delete_removes_entry_and_mirror() {
    let f = fixture(1).await;
    let mirror = updated(star(&f, 100, 1).await).mirror.unwrap();
    star(&f, 101, 1).await;

    assert!(f.starboard.on_message_delete(GUILD, 100).await.unwrap());
    assert!(f.platform.is_deleted(mirror.message_id));
    assert!(f.store.find_entry(GUILD, 100).await.unwrap().is_none());
    assert!(!f.starboard.on_message_delete(GUILD, 100).await.unwrap());

    // A mirror someone already removed by hand is not an error.
    let other = f.store.find_entry(GUILD, 101).await.unwrap().unwrap().mirror.unwrap();
    f.platform
        .delete_message(other.channel_id, other.message_id)
        .await
        .unwrap();
    assert!(f.starboard.on_message_delete(GUILD, 101).await.unwrap());
    assert!(f.store.find_entry(GUILD, 101).await.unwrap().is_none());
}

#[tokio::test]
async fn test_snapshot_taken_at_first_star() {
    let f = fixture(5).await;
    star(&f, 100, 1).await;

    f.platform.add_message(message(100, "edited later"));
    let entry = updated(star(&f, 100, 2).await);

    assert_eq!(entry.content, "look https://x/pic.png");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stars_post_one_mirror() {
    let f = fixture_with(MockPlatform::with_send_delay(Duration::from_millis(20)), 1).await;
    let users: Vec<u64> = (200..216).collect();
    for user in &users {
        f.platform.add_user(*user, &format!("fan{}", user), false);
    }

    let tasks: Vec<_> = users
        .iter()
        .map(|user| {
            let starboard = Arc::clone(&f.starboard);
            let user = *user;
            tokio::spawn(async move {
                starboard
                    .on_reaction_add(GUILD, SOURCE, 100, user, STAR)
                    .await
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let entry = f.store.find_entry(GUILD, 100).await.unwrap().unwrap();
    assert_eq!(entry.stars(), users.len());
    assert_eq!(f.platform.sends(), 1);
    let posted = f.platform.posted_in(BOARD);
    assert_eq!(posted.len(), 1);
    assert_eq!(Some(posted[0].0), entry.mirror.map(|m| m.message_id));
    assert!(posted[0].1.footer.as_deref().unwrap().starts_with("⭐ 16 |"));
}

#[tokio::test]
async fn test_top_and_starrers() {
    let f = fixture(1).await;
    star(&f, 101, 1).await;
    for user in [1, 2, 3] {
        star(&f, 100, user).await;
    }

    let top = f.starboard.top(GUILD, 100).await.unwrap();
    assert_eq!(top.iter().map(|e| e.message_id).collect::<Vec<_>>(), vec![100, 101]);

    let pages = f.starboard.top_pages(GUILD).await.unwrap();
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title.as_deref(), Some("Top starred messages on Blink Hub"));
    assert_eq!(
        pages[0].description.as_deref(),
        Some("1. by jennie (3 ⭐): look https://x/pic.png\n2. by jennie (1 ⭐): second")
    );

    let starrers = f.starboard.starrers(GUILD, 100).await.unwrap();
    assert_eq!(
        starrers.description.as_deref(),
        Some("@alice, @bob and @carol (3 ⭐)")
    );
    assert_eq!(
        starrers.title.as_deref(),
        Some("Starrers of message #100 by @jennie in #channel10:")
    );

    let err = f.starboard.starrers(GUILD, 555).await.unwrap_err();
    assert!(matches!(err.kind(), NuguErrorKind::NotFound(_)));
}

async fn run(f: &Fixture, args: &[&str]) -> String {
    let command = StarboardCommand::parse(args).unwrap();
    f.starboard
        .execute(3, command)
        .await
        .unwrap()
        .content
        .unwrap_or_default()
}

#[tokio::test]
async fn test_settings_commands() {
    let f = fixture(1).await;
    assert!(run(&f, &["status"]).await.starts_with("No starboard channel is set."));
    assert_eq!(run(&f, &["set", "<#40>"]).await, "Starboard channel set to <#40>.");
    assert_eq!(
        run(&f, &["status"]).await,
        "Starboard channel: <#40>, minimum stars: 1, emoji: ⭐, 🌟"
    );
    assert_eq!(run(&f, &["minimum", "4"]).await, "Starboard minimum set to 4.");
    assert_eq!(run(&f, &["emoji", "⭐"]).await, "Removed ⭐ from the starboard emoji.");
    assert_eq!(run(&f, &["emoji", "💖"]).await, "Added 💖 to the starboard emoji.");
    assert_eq!(
        run(&f, &["status"]).await,
        "Starboard channel: <#40>, minimum stars: 4, emoji: 🌟, 💖"
    );
    assert_eq!(
        run(&f, &["top"]).await,
        "No messages have been starred on this server yet."
    );
    assert_eq!(run(&f, &["set"]).await, "Starboard channel removed.");
    assert!(run(&f, &["set"]).await.starts_with("No starboard channel is set."));

    let settings = f.store.settings(3).await.unwrap();
    assert_eq!(*settings.minimum(), 4);
    assert!(settings.channel_id().is_none());
}

#[tokio::test]
async fn test_unconfigured_guild_uses_config_defaults() {
    let store = Arc::new(MemoryStore::new());
    let starboard = Starboard::new(
        store.clone(),
        Arc::new(MockPlatform::new()),
        StarboardConfig::default().with_default_minimum(2),
    );

    let settings = starboard.settings(9).await.unwrap();
    assert_eq!(*settings.minimum(), 2);
    assert!(settings.channel_id().is_none());

    starboard.set_channel(9, Some(11)).await.unwrap();
    let stored = store.settings(9).await.unwrap();
    assert_eq!(*stored.minimum(), 2);
    assert_eq!(*stored.channel_id(), Some(11));
}
