//! Tests for the suggestion moderation queue.

mod test_utils;

use async_trait::async_trait;
use chrono::Utc;
use nugu_cache::MemoryCache;
use nugu_core::{Gender, Idol, IdolImage, Suggestion, SuggestionId, SuggestionStatus};
use nugu_database::MemoryStore;
use nugu_error::{
    NotFoundErrorKind, NuguError, NuguErrorKind, NuguResult, StoreError, StoreErrorKind,
    ValidationErrorKind,
};
use nugu_idols::{
    APPROVE_EMOJI, CatalogConfig, DENY_EMOJI, IdolCatalog, REASON_EMOJI, Resolution,
    SuggestionConfig, SuggestionQueue, SuggestionRequest,
};
use nugu_imaging::DifferenceHasher;
use nugu_interface::{ChannelMessage, IdolStore, SuggestionStore};
use nugu_storage::MemoryStorage;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use test_utils::{MockFetcher, MockPlatform, gradient_png, stripes_png};

const MOD_CHANNEL: u64 = 50;
const USER_CHANNEL: u64 = 60;
const GUILD: u64 = 70;
const MODERATOR: u64 = 5;

struct Fixture {
    store: Arc<MemoryStore>,
    objects: Arc<MemoryStorage>,
    platform: Arc<MockPlatform>,
    fetcher: Arc<MockFetcher>,
    catalog: Arc<IdolCatalog>,
    queue: SuggestionQueue,
}

async fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let mut nayeon = Idol::new("Nayeon", "TWICE", Gender::Girl);
    nayeon.images = vec![IdolImage::new("nayeon-1", "0000000000000000")];
    store.upsert_idol(&nayeon).await.unwrap();

    let objects = Arc::new(MemoryStorage::new());
    let platform = Arc::new(MockPlatform::new());
    let fetcher = Arc::new(MockFetcher::new());
    let catalog = Arc::new(IdolCatalog::new(
        store.clone(),
        store.clone(),
        Arc::new(MemoryCache::default()),
        objects.clone(),
        Arc::new(DifferenceHasher),
        CatalogConfig::default(),
    ));
    catalog.load_all(true).await.unwrap();

    let queue = SuggestionQueue::new(
        catalog.clone(),
        store.clone(),
        objects.clone(),
        platform.clone(),
        fetcher.clone(),
        Arc::new(DifferenceHasher),
        SuggestionConfig::default().with_channel_id(MOD_CHANNEL),
    );

    Fixture {
        store,
        objects,
        platform,
        fetcher,
        catalog,
        queue,
    }
}

fn request(user_id: u64, gender: &str, group: &str, name: &str, url: &str) -> SuggestionRequest {
    SuggestionRequest {
        user_id,
        channel_id: USER_CHANNEL,
        guild_id: Some(GUILD),
        gender: gender.to_string(),
        group_name: group.to_string(),
        name: name.to_string(),
        image_url: url.to_string(),
    }
}

fn validation_kind(err: &NuguError) -> ValidationErrorKind {
    match err.kind() {
        NuguErrorKind::Validation(v) => v.kind.clone(),
        other => panic!("expected a validation error, got {:?}", other),
    }
}

/// Let spawned follow-up tasks run.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

async fn submit_two(f: &Fixture) -> (Suggestion, Suggestion) {
    f.fetcher.serve("https://x/yeji.png", "image/png", gradient_png(200, true));
    f.fetcher.serve("https://x/ryujin.png", "image/png", stripes_png(200));
    let yeji = f
        .queue
        .submit(request(1, "girl", "ITZY", "Yeji", "https://x/yeji.png"))
        .await
        .unwrap();
    let ryujin = f
        .queue
        .submit(request(2, "girl", "ITZY", "Ryujin", "https://x/ryujin.png"))
        .await
        .unwrap();
    (yeji, ryujin)
}

#[tokio::test]
async fn test_submit_rejects_picture_already_in_game() {
    let f = fixture().await;
    f.fetcher.serve("https://x/nayeon.png", "image/png", gradient_png(300, false));

    let err = f
        .queue
        .submit(request(1, "girl", "TWICE", "Nayeon", "https://x/nayeon.png"))
        .await
        .unwrap_err();

    assert_eq!(validation_kind(&err), ValidationErrorKind::ImageExists);
    assert!(err.user_message().contains("already exists"));
    assert!(f.queue.pending().await.is_empty());
    assert!(f.objects.is_empty().await);
}

#[tokio::test]
async fn test_submit_rejects_picture_already_queued() {
    let f = fixture().await;
    f.fetcher.serve("https://x/a.png", "image/png", gradient_png(200, true));
    f.fetcher.serve("https://x/b.png", "image/png", gradient_png(400, true));

    f.queue
        .submit(request(1, "girl", "ITZY", "Yeji", "https://x/a.png"))
        .await
        .unwrap();
    let err = f
        .queue
        .submit(request(2, "girl", "ITZY", "Yeji", "https://x/b.png"))
        .await
        .unwrap_err();

    assert_eq!(validation_kind(&err), ValidationErrorKind::ImageAlreadySuggested);
    assert_eq!(f.queue.pending().await.len(), 1);
    assert_eq!(f.objects.len().await, 1);
}

#[tokio::test]
async fn test_submit_validates_input() {
    let f = fixture().await;
    f.fetcher.serve("https://x/ok.png", "image/png", stripes_png(200));
    f.fetcher.serve("https://x/small.png", "image/png", stripes_png(100));
    f.fetcher.serve("https://x/anim.gif", "image/gif", stripes_png(200));

    let err = f
        .queue
        .submit(request(1, "other", "ITZY", "Yeji", "https://x/ok.png"))
        .await
        .unwrap_err();
    assert_eq!(
        validation_kind(&err),
        ValidationErrorKind::InvalidGender("other".to_string())
    );

    let err = f
        .queue
        .submit(request(1, "girl", "ITZY", "Yeji", "https://x/missing.png"))
        .await
        .unwrap_err();
    assert!(matches!(validation_kind(&err), ValidationErrorKind::InvalidUrl(_)));

    let err = f
        .queue
        .submit(request(1, "girl", "ITZY", "Yeji", "https://x/small.png"))
        .await
        .unwrap_err();
    assert_eq!(
        validation_kind(&err),
        ValidationErrorKind::InvalidDimensions(150, 2000, 100)
    );

    let err = f
        .queue
        .submit(request(1, "girl", "ITZY", "Yeji", "https://x/anim.gif"))
        .await
        .unwrap_err();
    assert!(matches!(
        validation_kind(&err),
        ValidationErrorKind::UnsupportedContentType(_)
    ));

    let err = f
        .queue
        .submit(request(1, "girl", "IT_ZY", "Yeji", "https://x/ok.png"))
        .await
        .unwrap_err();
    assert_eq!(validation_kind(&err), ValidationErrorKind::InvalidCharacters);

    assert!(f.queue.pending().await.is_empty());
}

#[tokio::test]
async fn test_first_submission_renders_head() {
    let f = fixture().await;
    f.fetcher.serve("https://x/yeji.png", "image/png", gradient_png(200, true));

    let suggestion = f
        .queue
        .submit(request(1, "girl", "ITZY", "Yeji", "https://x/yeji.png"))
        .await
        .unwrap();

    assert_eq!(suggestion.status, SuggestionStatus::Pending);
    assert_eq!(suggestion.guild_id, Some(GUILD));
    assert!(f.objects.contains(&suggestion.object_name).await);
    assert_eq!(f.store.all_suggestions().await.len(), 1);

    assert!(
        f.platform
            .texts(USER_CHANNEL)
            .contains(&"Thank you for your suggestion <@1>! A moderator will review it soon.".to_string())
    );
    assert!(
        f.platform
            .texts(MOD_CHANNEL)
            .contains(&"Suggestions in queue: 1".to_string())
    );

    let embed_id = f.queue.embed_message_id().await.unwrap();
    let embed = f
        .platform
        .sent()
        .into_iter()
        .find(|m| m.id == embed_id)
        .unwrap();
    assert!(embed.message.attachment.is_some());
    assert_eq!(f.platform.reactions_on(embed_id).len(), 3);
}

#[tokio::test]
async fn test_submission_annotates_loose_matches() {
    let f = fixture().await;
    f.fetcher.serve("https://x/n.png", "image/png", stripes_png(200));

    let suggestion = f
        .queue
        .submit(request(1, "girl", "twice", "nayeon", "https://x/n.png"))
        .await
        .unwrap();

    assert_eq!(suggestion.group_name, "TWICE");
    assert_eq!(suggestion.name, "Nayeon");
    assert!(suggestion.group_match);
    assert!(suggestion.idol_match);
}

#[tokio::test]
async fn test_approve_creates_idol_and_advances_head() {
    let f = fixture().await;
    let (yeji, ryujin) = submit_two(&f).await;

    let resolved = f
        .queue
        .resolve_head(Resolution::Approve, MODERATOR)
        .await
        .unwrap();
    settle().await;

    assert_eq!(resolved.id, yeji.id);
    assert_eq!(resolved.status, SuggestionStatus::Approved);
    assert_eq!(resolved.processed_by, Some(MODERATOR));

    let idol = f
        .catalog
        .match_group_and_name("ITZY", "Yeji", true)
        .await
        .idol
        .unwrap();
    assert_eq!(idol.images.len(), 1);
    assert_eq!(idol.images[0].object_name, yeji.object_name);
    assert!(f.objects.contains(&yeji.object_name).await);

    assert_eq!(f.queue.head().await.unwrap().id, ryujin.id);
    let stored = f.store.find_suggestion(&yeji.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SuggestionStatus::Approved);

    let direct = f.platform.direct_messages();
    assert_eq!(direct.len(), 1);
    assert_eq!(direct[0].0, 1);
    assert!(direct[0].1.contains("Approved"));
}

#[tokio::test]
async fn test_deny_without_notes_leaves_queue_unchanged() {
    let f = fixture().await;
    let (yeji, _) = submit_two(&f).await;

    let err = f
        .queue
        .resolve_head(Resolution::Deny, MODERATOR)
        .await
        .unwrap_err();

    assert_eq!(validation_kind(&err), ValidationErrorKind::MissingDenialNotes);
    assert_eq!(f.queue.pending().await.len(), 2);
    assert_eq!(f.queue.head().await.unwrap().id, yeji.id);
}

#[tokio::test]
async fn test_deny_with_reason_deletes_picture() {
    let f = fixture().await;
    let (yeji, ryujin) = submit_two(&f).await;

    let resolved = f
        .queue
        .resolve_head(Resolution::DenyWithReason(2), MODERATOR)
        .await
        .unwrap();
    settle().await;

    assert_eq!(resolved.status, SuggestionStatus::Denied);
    assert_eq!(resolved.notes, "Please only submit pictures in color.");
    assert!(!f.objects.contains(&yeji.object_name).await);
    assert!(f.objects.contains(&ryujin.object_name).await);
    assert!(f.platform.direct_messages()[0].1.contains("Denied"));

    let err = f
        .queue
        .resolve_head(Resolution::DenyWithReason(9), MODERATOR)
        .await
        .unwrap_err();
    assert_eq!(validation_kind(&err), ValidationErrorKind::UnknownDenialReason(9));
    assert_eq!(f.queue.head().await.unwrap().id, ryujin.id);
}

#[tokio::test]
async fn test_resolve_on_empty_queue_is_not_found() {
    let f = fixture().await;
    let err = f
        .queue
        .resolve_head(Resolution::Approve, MODERATOR)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), NuguErrorKind::NotFound(_)));
}

#[tokio::test]
async fn test_queue_is_first_in_first_out() {
    let f = fixture().await;
    let (yeji, ryujin) = submit_two(&f).await;

    let pending: Vec<SuggestionId> = f.queue.pending().await.into_iter().map(|s| s.id).collect();
    assert_eq!(pending, vec![yeji.id.clone(), ryujin.id.clone()]);

    f.queue.edit_field(MOD_CHANNEL, 1, "notes", "blurry").await.unwrap();
    let first = f.queue.resolve_head(Resolution::Deny, MODERATOR).await.unwrap();
    let second = f
        .queue
        .resolve_head(Resolution::Approve, MODERATOR)
        .await
        .unwrap();

    assert_eq!(first.id, yeji.id);
    assert_eq!(second.id, ryujin.id);
    assert!(f.queue.head().await.is_none());
    assert!(
        f.platform
            .sent()
            .iter()
            .filter_map(|m| m.message.embed.as_ref())
            .any(|e| e.author.as_deref() == Some("No suggestions in queue"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_edit_field_updates_head() {
    let f = fixture().await;
    submit_two(&f).await;

    assert!(f.queue.edit_field(MOD_CHANNEL, 1, "notes", "too dark").await.unwrap());
    assert!(f.queue.edit_field(MOD_CHANNEL, 2, "gender", "boy").await.unwrap());
    assert!(f.queue.edit_field(MOD_CHANNEL, 3, "group", "twice").await.unwrap());
    assert!(!f.queue.edit_field(USER_CHANNEL, 4, "notes", "x").await.unwrap());
    assert!(!f.queue.edit_field(MOD_CHANNEL, 5, "colour", "x").await.unwrap());

    let head = f.queue.head().await.unwrap();
    assert_eq!(head.notes, "too dark");
    assert_eq!(head.gender, Gender::Boy);
    assert_eq!(head.group_name, "TWICE");
    assert!(head.group_match);
    assert!(!head.idol_match);

    let stored = f.store.find_suggestion(&head.id).await.unwrap().unwrap();
    assert_eq!(stored.notes, "too dark");

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(f.platform.is_deleted(1));
}

#[tokio::test(start_paused = true)]
async fn test_denial_reason_times_out() {
    let f = fixture().await;

    let err = f.queue.await_denial_reason().await.unwrap_err();

    assert!(matches!(err.kind(), NuguErrorKind::Timeout(_)));
    let prompt = f
        .platform
        .sent()
        .into_iter()
        .find(|m| m.message.content.as_deref().is_some_and(|c| c.starts_with("Enter the number")))
        .unwrap();
    assert!(f.platform.is_deleted(prompt.id));
}

#[tokio::test]
async fn test_denial_reason_skips_bots_and_zero() {
    let f = fixture().await;
    let message = |id: u64, author_is_bot: bool, content: &str| ChannelMessage {
        id,
        channel_id: MOD_CHANNEL,
        author_id: if author_is_bot { 999 } else { MODERATOR },
        author_is_bot,
        content: content.to_string(),
        ..ChannelMessage::default()
    };
    f.platform.push_incoming(message(1, true, "3"));
    f.platform.push_incoming(message(2, false, "0"));
    f.platform.push_incoming(message(3, false, "reason 4 please"));

    assert_eq!(f.queue.await_denial_reason().await.unwrap(), 4);
    assert!(!f.platform.is_deleted(1));
    assert!(f.platform.is_deleted(2));
    assert!(f.platform.is_deleted(3));
}

#[tokio::test]
async fn test_reactions_resolve_head() {
    let f = fixture().await;
    let (yeji, ryujin) = submit_two(&f).await;
    let embed_id = f.queue.embed_message_id().await.unwrap();

    let ignored = f
        .queue
        .on_reaction(MOD_CHANNEL, embed_id, 999, APPROVE_EMOJI)
        .await
        .unwrap();
    assert!(ignored.is_none());
    let ignored = f
        .queue
        .on_reaction(MOD_CHANNEL, embed_id + 1000, MODERATOR, APPROVE_EMOJI)
        .await
        .unwrap();
    assert!(ignored.is_none());

    let denied = f
        .queue
        .on_reaction(MOD_CHANNEL, embed_id, MODERATOR, DENY_EMOJI)
        .await
        .unwrap();
    assert!(denied.is_none());
    assert_eq!(f.queue.head().await.unwrap().id, yeji.id);
    assert!(
        f.platform
            .removed_reactions()
            .contains(&(embed_id, DENY_EMOJI.to_string(), MODERATOR))
    );
    assert!(
        f.platform
            .texts(MOD_CHANNEL)
            .iter()
            .any(|t| t.starts_with("A note must be set before denying"))
    );

    let approved = f
        .queue
        .on_reaction(MOD_CHANNEL, embed_id, MODERATOR, APPROVE_EMOJI)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(approved.id, yeji.id);
    assert_eq!(f.queue.head().await.unwrap().id, ryujin.id);
    assert_ne!(f.queue.embed_message_id().await, Some(embed_id));
}

#[tokio::test]
async fn test_initialise_loads_pending_suggestions() {
    let f = fixture().await;
    let suggestion = Suggestion {
        id: SuggestionId::generate(),
        user_id: 1,
        channel_id: USER_CHANNEL,
        guild_id: None,
        gender: Gender::Girl,
        group_name: "ITZY".to_string(),
        name: "Lia".to_string(),
        image_url: "https://x/lia.png".to_string(),
        image_hash: "00ff00ff00ff00ff".to_string(),
        object_name: "lia".to_string(),
        group_match: false,
        idol_match: false,
        notes: String::new(),
        status: SuggestionStatus::Pending,
        processed_by: None,
        last_modified: Utc::now(),
    };
    f.store.insert_suggestion(&suggestion).await.unwrap();

    assert_eq!(f.queue.initialise().await.unwrap(), 1);
    assert_eq!(f.queue.head().await.unwrap().name, "Lia");
    assert!(
        f.platform
            .texts(MOD_CHANNEL)
            .iter()
            .any(|t| t.contains("s-edit"))
    );
    assert!(f.queue.embed_message_id().await.is_some());
}

#[tokio::test]
async fn test_reason_reaction_skips_suggestion_resolved_meanwhile() {
    let f = fixture().await;
    let (yeji, ryujin) = submit_two(&f).await;
    let embed_id = f.queue.embed_message_id().await.unwrap();

    let (with_reason, approved) = tokio::join!(
        f.queue
            .on_reaction(MOD_CHANNEL, embed_id, MODERATOR, REASON_EMOJI),
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let approved = f
                .queue
                .on_reaction(MOD_CHANNEL, embed_id, MODERATOR + 1, APPROVE_EMOJI)
                .await;
            f.platform.push_incoming(ChannelMessage {
                id: 1,
                channel_id: MOD_CHANNEL,
                author_id: MODERATOR,
                content: "5".to_string(),
                ..ChannelMessage::default()
            });
            approved
        }
    );
    settle().await;

    assert_eq!(approved.unwrap().unwrap().id, yeji.id);
    assert!(with_reason.unwrap().is_none());

    assert_eq!(f.queue.head().await.unwrap().id, ryujin.id);
    let stored = f.store.find_suggestion(&ryujin.id).await.unwrap().unwrap();
    assert_eq!(stored.status, SuggestionStatus::Pending);
    assert!(f.objects.contains(&ryujin.object_name).await);
    assert_eq!(f.platform.direct_messages().len(), 1);
}

#[tokio::test]
async fn test_resolve_suggestion_requires_it_at_head() {
    let f = fixture().await;
    let (yeji, ryujin) = submit_two(&f).await;

    f.queue
        .resolve_suggestion(&yeji.id, Resolution::Approve, MODERATOR)
        .await
        .unwrap();
    let err = f
        .queue
        .resolve_suggestion(&yeji.id, Resolution::Approve, MODERATOR + 1)
        .await
        .unwrap_err();

    assert!(matches!(
        err.kind(),
        NuguErrorKind::NotFound(e) if e.kind == NotFoundErrorKind::NotAtHead(yeji.id.to_string())
    ));
    assert_eq!(f.queue.head().await.unwrap().id, ryujin.id);
    assert!(
        f.catalog
            .match_group_and_name("ITZY", "Ryujin", false)
            .await
            .idol
            .is_none()
    );
}

/// Suggestion store whose updates fail while `failing` is set.
struct FailingUpdates {
    inner: Arc<MemoryStore>,
    failing: AtomicBool,
}

#[async_trait]
impl SuggestionStore for FailingUpdates {
    async fn pending_suggestions(&self) -> NuguResult<Vec<Suggestion>> {
        self.inner.pending_suggestions().await
    }

    async fn find_suggestion(&self, id: &SuggestionId) -> NuguResult<Option<Suggestion>> {
        self.inner.find_suggestion(id).await
    }

    async fn insert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<SuggestionId> {
        self.inner.insert_suggestion(suggestion).await
    }

    async fn upsert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StoreError::new(StoreErrorKind::Connection(
                "store unavailable".to_string(),
            )))?
        }
        self.inner.upsert_suggestion(suggestion).await
    }
}

#[tokio::test]
async fn test_approve_retry_adds_picture_once() {
    let f = fixture().await;
    let suggestions = Arc::new(FailingUpdates {
        inner: f.store.clone(),
        failing: AtomicBool::new(false),
    });
    let queue = SuggestionQueue::new(
        f.catalog.clone(),
        suggestions.clone(),
        f.objects.clone(),
        f.platform.clone(),
        f.fetcher.clone(),
        Arc::new(DifferenceHasher),
        SuggestionConfig::default().with_channel_id(MOD_CHANNEL),
    );
    f.fetcher.serve("https://x/yeji.png", "image/png", gradient_png(200, true));
    let yeji = queue
        .submit(request(1, "girl", "ITZY", "Yeji", "https://x/yeji.png"))
        .await
        .unwrap();

    suggestions.failing.store(true, Ordering::SeqCst);
    let err = queue
        .resolve_head(Resolution::Approve, MODERATOR)
        .await
        .unwrap_err();
    assert!(matches!(err.kind(), NuguErrorKind::Store(_)));
    assert_eq!(queue.head().await.unwrap().id, yeji.id);

    suggestions.failing.store(false, Ordering::SeqCst);
    let approved = queue
        .resolve_head(Resolution::Approve, MODERATOR)
        .await
        .unwrap();
    assert_eq!(approved.status, SuggestionStatus::Approved);
    assert!(queue.head().await.is_none());

    let idol = f
        .catalog
        .match_group_and_name("ITZY", "Yeji", false)
        .await
        .idol
        .unwrap();
    assert_eq!(idol.images.len(), 1);
    let stored = f.store.find_idol(&idol.id).await.unwrap().unwrap();
    assert_eq!(stored.images.len(), 1);
    assert_eq!(f.store.idol_count().await, 2);
}

#[tokio::test]
async fn test_initialise_persists_canonical_names() {
    let f = fixture().await;
    let suggestion = Suggestion {
        id: SuggestionId::generate(),
        user_id: 1,
        channel_id: USER_CHANNEL,
        guild_id: None,
        gender: Gender::Girl,
        group_name: "twice".to_string(),
        name: "NAYEON".to_string(),
        image_url: "https://x/n.png".to_string(),
        image_hash: "00ff00ff00ff00ff".to_string(),
        object_name: "n".to_string(),
        group_match: false,
        idol_match: false,
        notes: String::new(),
        status: SuggestionStatus::Pending,
        processed_by: None,
        last_modified: Utc::now(),
    };
    let id = f.store.insert_suggestion(&suggestion).await.unwrap();

    f.queue.initialise().await.unwrap();

    let stored = f.store.find_suggestion(&id).await.unwrap().unwrap();
    assert_eq!(stored.group_name, "TWICE");
    assert_eq!(stored.name, "Nayeon");
    assert!(stored.idol_match);
    assert_eq!(stored, f.queue.head().await.unwrap());
}
