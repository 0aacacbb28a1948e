//! Moderation queue for user-submitted idol pictures.
//!
//! Suggestions are validated, hashed, resized and stored on submission, then
//! wait in a FIFO queue until a moderator approves or denies the head. Only
//! the head is ever resolved. Queue state lives behind a single async mutex
//! that is held for the whole submit or resolve critical section.

use crate::catalog::IdolCatalog;
use crate::suggestion_ui::{
    APPROVE_EMOJI, DENY_EMOJI, REASON_EMOJI, SUGGESTION_IMAGE_NAME, empty_queue_embed,
    help_message, queue_count_message, similar_images_embed, suggestion_embed,
};
use chrono::Utc;
use derive_getters::Getters;
use nugu_core::{
    Gender, Suggestion, SuggestionField, SuggestionId, SuggestionStatus, normalize_quotes,
    split_args,
};
use nugu_error::{
    NotFoundError, NotFoundErrorKind, NuguError, NuguErrorKind, NuguResult, TimeoutError,
    ValidationError, ValidationErrorKind,
};
use nugu_imaging::{ImageHasher, ImageRules, check_content_type, decode, encode_png, resize_to_height};
use nugu_interface::{
    ChatPlatform, ImageFetcher, ObjectMetadata, ObjectStorage, OutgoingMessage, SuggestionStore,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::{Arc, LazyLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Predefined denial reasons, selected by their 1-based position.
pub const DENIAL_REASONS: [&str; 5] = [
    "The face is too small, please zoom in more.",
    "Please only submit pictures in color.",
    "The face is too hard to see.",
    "The picture quality is too low.",
    "Bad cropping.",
];

/// Denial reason for a 1-based code.
///
/// ```
/// use nugu_idols::denial_reason;
///
/// assert_eq!(denial_reason(5), Some("Bad cropping."));
/// assert_eq!(denial_reason(0), None);
/// assert_eq!(denial_reason(6), None);
/// ```
pub fn denial_reason(code: usize) -> Option<&'static str> {
    code.checked_sub(1).and_then(|i| DENIAL_REASONS.get(i)).copied()
}

static NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("Valid number regex"));

/// Suggestion queue configuration.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_setters::Setters,
)]
#[setters(prefix = "with_")]
pub struct SuggestionConfig {
    /// Moderation channel
    #[serde(default)]
    channel_id: u64,

    /// Command prefix shown in the help message
    #[serde(default = "default_command_prefix")]
    command_prefix: String,

    /// How long to wait for a denial reason number
    #[serde(default = "default_denial_timeout_secs")]
    denial_timeout_secs: u64,

    /// Height accepted pictures are resized to
    #[serde(default = "default_resize_height")]
    resize_height: u32,

    /// Smallest accepted side length
    #[serde(default = "default_min_side")]
    min_side: u32,

    /// Largest accepted side length
    #[serde(default = "default_max_side")]
    max_side: u32,

    /// Hash distance at or below which a picture counts as a duplicate
    #[serde(default = "default_duplicate_distance")]
    duplicate_distance: u32,

    /// Hash distance at or below which game pictures are shown to moderators
    #[serde(default = "default_similar_distance")]
    similar_distance: u32,
}

fn default_command_prefix() -> String {
    "!".to_string()
}

fn default_denial_timeout_secs() -> u64 {
    45
}

fn default_resize_height() -> u32 {
    150
}

fn default_min_side() -> u32 {
    150
}

fn default_max_side() -> u32 {
    2000
}

fn default_duplicate_distance() -> u32 {
    1
}

fn default_similar_distance() -> u32 {
    3
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            channel_id: 0,
            command_prefix: default_command_prefix(),
            denial_timeout_secs: default_denial_timeout_secs(),
            resize_height: default_resize_height(),
            min_side: default_min_side(),
            max_side: default_max_side(),
            duplicate_distance: default_duplicate_distance(),
            similar_distance: default_similar_distance(),
        }
    }
}

/// A parsed suggest command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    /// Submitting user
    pub user_id: u64,
    /// Channel the command was sent in
    pub channel_id: u64,
    /// Guild of that channel
    pub guild_id: Option<u64>,
    /// Gender as typed
    pub gender: String,
    /// Group name as typed
    pub group_name: String,
    /// Idol name as typed
    pub name: String,
    /// Picture location
    pub image_url: String,
}

impl SuggestionRequest {
    /// Parse `{command} gender group name [url]`.
    ///
    /// The URL comes from the single attachment when there is one, otherwise
    /// from the fourth argument. Curly quotes are straightened first so
    /// quoted names survive mobile keyboards.
    ///
    /// ```
    /// use nugu_idols::SuggestionRequest;
    ///
    /// let request = SuggestionRequest::from_command(
    ///     1, 2, None,
    ///     "!suggest girl “Red Velvet” Irene https://x/irene.png",
    ///     &[],
    /// ).unwrap();
    /// assert_eq!(request.group_name, "Red Velvet");
    /// assert_eq!(request.image_url, "https://x/irene.png");
    ///
    /// let attached = vec!["https://cdn/a.png".to_string()];
    /// assert!(SuggestionRequest::from_command(1, 2, None, "!suggest girl ITZY Yeji", &attached).is_ok());
    /// assert!(SuggestionRequest::from_command(1, 2, None, "!suggest girl ITZY Yeji", &[]).is_err());
    /// ```
    pub fn from_command(
        user_id: u64,
        channel_id: u64,
        guild_id: Option<u64>,
        content: &str,
        attachment_urls: &[String],
    ) -> NuguResult<Self> {
        let args = split_args(&normalize_quotes(content))?;
        let args = args.get(1..).unwrap_or_default();

        let (expected, attachment) = match attachment_urls {
            [url] => (3, Some(url)),
            _ => (4, None),
        };
        if args.len() != expected {
            Err(ValidationError::new(ValidationErrorKind::InvalidArguments(
                "usage: suggest {boy|girl} {group} {name} {image url or attachment}".to_string(),
            )))?
        }

        let image_url = match attachment {
            Some(url) => url.clone(),
            None => args[3].clone(),
        };
        Ok(Self {
            user_id,
            channel_id,
            guild_id,
            gender: args[0].to_lowercase(),
            group_name: args[1].clone(),
            name: args[2].clone(),
            image_url,
        })
    }
}

/// How a moderator resolves the head suggestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Add the picture to the game
    Approve,
    /// Deny with the notes already on the suggestion
    Deny,
    /// Deny with a predefined reason (1-based)
    DenyWithReason(usize),
}

#[derive(Debug, Default)]
struct QueueState {
    queue: Vec<Suggestion>,
    embed_message_id: Option<u64>,
    count_message_id: Option<u64>,
}

/// FIFO moderation queue.
pub struct SuggestionQueue {
    catalog: Arc<IdolCatalog>,
    store: Arc<dyn SuggestionStore>,
    objects: Arc<dyn ObjectStorage>,
    platform: Arc<dyn ChatPlatform>,
    fetcher: Arc<dyn ImageFetcher>,
    hasher: Arc<dyn ImageHasher>,
    config: SuggestionConfig,
    state: Mutex<QueueState>,
}

impl std::fmt::Debug for SuggestionQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestionQueue")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SuggestionQueue {
    /// Create an empty queue. Call [`initialise`](Self::initialise) to load
    /// pending suggestions and draw the channel.
    pub fn new(
        catalog: Arc<IdolCatalog>,
        store: Arc<dyn SuggestionStore>,
        objects: Arc<dyn ObjectStorage>,
        platform: Arc<dyn ChatPlatform>,
        fetcher: Arc<dyn ImageFetcher>,
        hasher: Arc<dyn ImageHasher>,
        config: SuggestionConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            objects,
            platform,
            fetcher,
            hasher,
            config,
            state: Mutex::new(QueueState::default()),
        }
    }

    /// Queue configuration.
    pub fn config(&self) -> &SuggestionConfig {
        &self.config
    }

    /// Pending suggestions, head first.
    pub async fn pending(&self) -> Vec<Suggestion> {
        self.state.lock().await.queue.clone()
    }

    /// Head of the queue.
    pub async fn head(&self) -> Option<Suggestion> {
        self.state.lock().await.queue.first().cloned()
    }

    /// Id of the moderation embed currently shown.
    pub async fn embed_message_id(&self) -> Option<u64> {
        self.state.lock().await.embed_message_id
    }

    /// Load pending suggestions and rebuild the moderation channel.
    ///
    /// Old messages are cleared, then the help text, the queue counter and
    /// the head embed are posted.
    #[instrument(skip(self), fields(channel_id = self.config.channel_id))]
    pub async fn initialise(&self) -> NuguResult<usize> {
        let channel = self.config.channel_id;
        match self.platform.recent_messages(channel, 100).await {
            Ok(messages) if !messages.is_empty() => {
                let ids: Vec<u64> = messages.iter().map(|m| m.id).collect();
                if let Err(e) = self.platform.bulk_delete(channel, &ids).await {
                    warn!(error = %e, "Failed to clear the suggestion channel");
                }
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to read the suggestion channel"),
        }

        if let Err(e) = self
            .platform
            .send(
                channel,
                OutgoingMessage::text(help_message(&self.config.command_prefix)),
            )
            .await
        {
            warn!(error = %e, "Failed to post suggestion help");
        }

        let pending = self.store.pending_suggestions().await?;
        let count = pending.len();

        let mut state = self.state.lock().await;
        state.queue = pending;
        state.embed_message_id = None;
        state.count_message_id = None;
        self.update_count(&mut state).await;
        self.render(&mut state).await;

        info!(count, "Suggestion queue loaded");
        Ok(count)
    }

    /// Validate a submission and append it to the queue.
    ///
    /// # Errors
    ///
    /// Validation errors are user-facing and leave the queue unchanged.
    #[instrument(skip(self, request), fields(user_id = request.user_id, url = %request.image_url))]
    pub async fn submit(&self, request: SuggestionRequest) -> NuguResult<Suggestion> {
        let gender = Gender::from_str(&request.gender).map_err(|_| {
            ValidationError::new(ValidationErrorKind::InvalidGender(request.gender.clone()))
        })?;

        let fetched = self.fetcher.fetch(&request.image_url).await.map_err(|e| {
            debug!(error = %e, "Suggested image could not be fetched");
            ValidationError::new(ValidationErrorKind::InvalidUrl(request.image_url.clone()))
        })?;
        check_content_type(fetched.content_type())?;
        let image = decode(fetched.bytes())?;
        ImageRules {
            min_side: self.config.min_side,
            max_side: self.config.max_side,
        }
        .check(&image)?;

        if format!("{}{}", request.group_name, request.name).contains(['"', '_']) {
            Err(ValidationError::new(ValidationErrorKind::InvalidCharacters))?
        }

        let hash = self.hasher.hash(&image);

        if let Some(idol) = self
            .catalog
            .match_group_and_name(&request.group_name, &request.name, true)
            .await
            .idol
            && self.any_within(&hash, idol.images.iter().map(|i| i.hash_string.as_str()))
        {
            Err(ValidationError::new(ValidationErrorKind::ImageExists))?
        }

        let mut state = self.state.lock().await;
        if self.any_within(&hash, state.queue.iter().map(|s| s.image_hash.as_str())) {
            Err(ValidationError::new(ValidationErrorKind::ImageAlreadySuggested))?
        }

        let resized = resize_to_height(&image, self.config.resize_height);
        let png = encode_png(&resized)?;
        let metadata = ObjectMetadata::default()
            .with_filename(request.image_url.as_str())
            .with_mime_type("image/png")
            .with_channel_id(request.channel_id)
            .with_user_id(request.user_id);
        let object_name = self.objects.put(&png, &metadata).await?;

        let mut suggestion = Suggestion {
            id: SuggestionId::generate(),
            user_id: request.user_id,
            channel_id: request.channel_id,
            guild_id: request.guild_id,
            gender,
            group_name: request.group_name,
            name: request.name,
            image_url: request.image_url,
            image_hash: hash,
            object_name,
            group_match: false,
            idol_match: false,
            notes: String::new(),
            status: SuggestionStatus::Pending,
            processed_by: None,
            last_modified: Utc::now(),
        };
        self.annotate(&mut suggestion).await;
        suggestion.id = self.store.insert_suggestion(&suggestion).await?;

        state.queue.push(suggestion.clone());
        let was_empty = state.queue.len() == 1;
        info!(
            suggestion_id = %suggestion.id,
            queued = state.queue.len(),
            "Suggestion accepted"
        );

        self.reply(
            request.channel_id,
            format!(
                "Thank you for your suggestion <@{}>! A moderator will review it soon.",
                suggestion.user_id
            ),
        )
        .await;
        self.update_count(&mut state).await;

        if was_empty {
            self.render(&mut state).await;
            match self
                .platform
                .send(self.config.channel_id, OutgoingMessage::text("New Suggestion Ping"))
                .await
            {
                Ok(ping) => self.delete_later(self.config.channel_id, ping, Duration::from_secs(2)),
                Err(e) => warn!(error = %e, "Failed to ping the suggestion channel"),
            }
        }

        Ok(suggestion)
    }

    /// Approve or deny the head suggestion.
    ///
    /// # Errors
    ///
    /// Returns a not-found error on an empty queue and a validation error
    /// when denying without notes. Catalog and store failures leave the
    /// suggestion at the head.
    #[instrument(skip(self))]
    pub async fn resolve_head(
        &self,
        resolution: Resolution,
        moderator_id: u64,
    ) -> NuguResult<Suggestion> {
        self.resolve(None, resolution, moderator_id).await
    }

    /// Resolve the head only while it is still `expected`.
    ///
    /// Moderators react to the suggestion they were shown; if another
    /// moderator resolved it in the meantime, nothing happens.
    ///
    /// # Errors
    ///
    /// Returns [`NotFoundErrorKind::NotAtHead`] when the head is no longer
    /// `expected`, otherwise as [`resolve_head`](Self::resolve_head).
    #[instrument(skip(self), fields(expected = %expected))]
    pub async fn resolve_suggestion(
        &self,
        expected: &SuggestionId,
        resolution: Resolution,
        moderator_id: u64,
    ) -> NuguResult<Suggestion> {
        self.resolve(Some(expected), resolution, moderator_id).await
    }

    async fn resolve(
        &self,
        expected: Option<&SuggestionId>,
        resolution: Resolution,
        moderator_id: u64,
    ) -> NuguResult<Suggestion> {
        let mut state = self.state.lock().await;
        let Some(mut suggestion) = state.queue.first().cloned() else {
            return Err(NotFoundError::new(NotFoundErrorKind::EmptyQueue).into());
        };
        if let Some(expected) = expected
            && suggestion.id != *expected
        {
            return Err(
                NotFoundError::new(NotFoundErrorKind::NotAtHead(expected.to_string())).into(),
            );
        }

        match resolution {
            Resolution::Approve => {
                let notice = self
                    .platform
                    .send(self.config.channel_id, OutgoingMessage::text("Uploading image..."))
                    .await;
                let added = self.catalog.add_to_game(&suggestion).await;
                if let Ok(notice) = notice {
                    self.delete_later(self.config.channel_id, notice, Duration::ZERO);
                }
                added?;
                suggestion.status = SuggestionStatus::Approved;
            }
            Resolution::Deny | Resolution::DenyWithReason(_) => {
                if let Resolution::DenyWithReason(code) = resolution {
                    let reason = denial_reason(code).ok_or_else(|| {
                        ValidationError::new(ValidationErrorKind::UnknownDenialReason(code))
                    })?;
                    suggestion.notes = reason.to_string();
                }
                if suggestion.notes.is_empty() {
                    Err(ValidationError::new(ValidationErrorKind::MissingDenialNotes))?
                }
                suggestion.status = SuggestionStatus::Denied;
            }
        }

        suggestion.processed_by = Some(moderator_id);
        suggestion.last_modified = Utc::now();
        self.store.upsert_suggestion(&suggestion).await?;

        if suggestion.status == SuggestionStatus::Denied {
            // Approved pictures keep their object; the game uses it.
            let objects = Arc::clone(&self.objects);
            let object_name = suggestion.object_name.clone();
            tokio::spawn(async move {
                if let Err(e) = objects.delete(&object_name).await {
                    warn!(error = %e, object_name = %object_name, "Failed to delete denied picture");
                }
            });
        }

        let platform = Arc::clone(&self.platform);
        let user_id = suggestion.user_id;
        let message = suggestion.resolution_message();
        tokio::spawn(async move {
            if let Err(e) = platform.send_direct(user_id, &message).await {
                warn!(error = %e, user_id, "Failed to notify submitter");
            }
        });

        state.queue.remove(0);
        info!(
            suggestion_id = %suggestion.id,
            status = %suggestion.status,
            remaining = state.queue.len(),
            "Suggestion resolved"
        );
        self.render(&mut state).await;

        Ok(suggestion)
    }

    /// Prompt for a denial reason number and wait for a moderator to type one.
    ///
    /// Messages from bots are ignored, moderator replies are deleted, and a
    /// bare `0` keeps waiting.
    ///
    /// # Errors
    ///
    /// Times out after the configured wait; a reply without any number is a
    /// validation error.
    #[instrument(skip(self))]
    pub async fn await_denial_reason(&self) -> NuguResult<usize> {
        let channel = self.config.channel_id;
        let prompt = self
            .platform
            .send(
                channel,
                OutgoingMessage::text(
                    "Enter the number for the reason you would like to deny with.",
                ),
            )
            .await?;

        let wait = Duration::from_secs(self.config.denial_timeout_secs);
        let outcome = tokio::time::timeout(wait, self.read_denial_reason(channel)).await;

        if let Err(e) = self.platform.delete_message(channel, prompt).await {
            debug!(error = %e, "Could not delete denial prompt");
        }

        match outcome {
            Ok(result) => result,
            Err(_) => Err(TimeoutError::new(format!(
                "No denial reason entered within {} seconds",
                self.config.denial_timeout_secs
            )))?,
        }
    }

    async fn read_denial_reason(&self, channel: u64) -> NuguResult<usize> {
        loop {
            let message = self.platform.next_message(channel).await?;
            if message.author_is_bot || message.channel_id != channel {
                continue;
            }
            if let Err(e) = self.platform.delete_message(channel, message.id).await {
                debug!(error = %e, "Could not delete denial reason reply");
            }
            let Some(number) = NUMBER.find(&message.content) else {
                return Err(ValidationError::new(ValidationErrorKind::InvalidArguments(
                    "a denial reason number is required".to_string(),
                ))
                .into());
            };
            match number.as_str().parse::<usize>() {
                Ok(0) => continue,
                Ok(code) => return Ok(code),
                Err(_) => {
                    return Err(ValidationError::new(ValidationErrorKind::InvalidArguments(
                        format!("'{}' is not a denial reason", number.as_str()),
                    ))
                    .into());
                }
            }
        }
    }

    /// React to a moderator's reaction on the moderation embed.
    ///
    /// Returns the resolved suggestion, or `None` when the reaction was not
    /// meant for the queue. A deny without notes removes the reaction and
    /// posts a short-lived reminder instead of failing.
    #[instrument(skip(self))]
    pub async fn on_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        user_id: u64,
        emoji: &str,
    ) -> NuguResult<Option<Suggestion>> {
        if user_id == self.platform.bot_user_id() || channel_id != self.config.channel_id {
            return Ok(None);
        }
        let shown = {
            let state = self.state.lock().await;
            match state.queue.first() {
                Some(head) if state.embed_message_id == Some(message_id) => head.id.clone(),
                _ => return Ok(None),
            }
        };

        let resolution = match emoji {
            APPROVE_EMOJI => Resolution::Approve,
            DENY_EMOJI => Resolution::Deny,
            REASON_EMOJI => Resolution::DenyWithReason(self.await_denial_reason().await?),
            _ => return Ok(None),
        };

        match self.resolve_suggestion(&shown, resolution, user_id).await {
            Ok(suggestion) => Ok(Some(suggestion)),
            Err(e) if is_no_longer_shown(&e) => {
                debug!(suggestion_id = %shown, "Reaction was for an already resolved suggestion");
                Ok(None)
            }
            Err(e) if is_missing_notes(&e) => {
                if let Err(e) = self
                    .platform
                    .remove_reaction(channel_id, message_id, emoji, user_id)
                    .await
                {
                    warn!(error = %e, "Failed to remove deny reaction");
                }
                match self
                    .platform
                    .send(channel_id, OutgoingMessage::text(missing_notes_message(&self.config)))
                    .await
                {
                    Ok(reminder) => {
                        self.delete_later(channel_id, reminder, Duration::from_secs(15))
                    }
                    Err(e) => warn!(error = %e, "Failed to post denial reminder"),
                }
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Edit a field of the head suggestion from an `s-edit` command.
    ///
    /// Returns false when nothing changed: the command came from another
    /// channel, the field is unknown or the queue is empty.
    #[instrument(skip(self))]
    pub async fn edit_field(
        &self,
        channel_id: u64,
        command_message_id: u64,
        field: &str,
        value: &str,
    ) -> NuguResult<bool> {
        if channel_id != self.config.channel_id {
            return Ok(false);
        }
        self.delete_later(channel_id, command_message_id, Duration::from_secs(1));

        let Ok(field) = SuggestionField::from_str(field) else {
            debug!(field, "Ignoring unknown suggestion field");
            return Ok(false);
        };

        let mut state = self.state.lock().await;
        let Some(head) = state.queue.first() else {
            return Ok(false);
        };
        let mut suggestion = head.clone();

        match field {
            SuggestionField::Name => suggestion.name = value.to_string(),
            SuggestionField::Group => suggestion.group_name = value.to_string(),
            SuggestionField::Gender => {
                suggestion.gender = Gender::from_str(value).map_err(|_| {
                    ValidationError::new(ValidationErrorKind::InvalidGender(value.to_string()))
                })?
            }
            SuggestionField::Notes => suggestion.notes = value.to_string(),
        }
        if matches!(field, SuggestionField::Name | SuggestionField::Group) {
            suggestion.group_match = false;
            suggestion.idol_match = false;
            self.annotate(&mut suggestion).await;
        }
        suggestion.last_modified = Utc::now();

        self.store.upsert_suggestion(&suggestion).await?;
        state.queue[0] = suggestion;
        self.render(&mut state).await;
        Ok(true)
    }

    /// Replace typed names with canonical ones when they loosely match.
    async fn annotate(&self, suggestion: &mut Suggestion) {
        let matched = self
            .catalog
            .match_group_and_name(&suggestion.group_name, &suggestion.name, false)
            .await;
        if let Some(idol) = matched.idol {
            suggestion.group_name = idol.group_name;
            suggestion.name = idol.name;
            suggestion.group_match = true;
            suggestion.idol_match = true;
        } else if matched.group_found
            && let Some(group) = self
                .catalog
                .match_group(&suggestion.group_name, false)
                .await
        {
            suggestion.group_name = group;
            suggestion.group_match = true;
        }
    }

    fn any_within<'a>(&self, hash: &str, others: impl Iterator<Item = &'a str>) -> bool {
        let limit = self.config.duplicate_distance;
        others
            .filter_map(|other| match self.hasher.distance(hash, other) {
                Ok(distance) => Some(distance),
                Err(e) => {
                    warn!(error = %e, "Comparison error");
                    None
                }
            })
            .any(|distance| distance <= limit)
    }

    async fn reply(&self, channel_id: u64, text: String) {
        if let Err(e) = self
            .platform
            .send(channel_id, OutgoingMessage::text(text))
            .await
        {
            warn!(error = %e, channel_id, "Failed to reply");
        }
    }

    fn delete_later(&self, channel_id: u64, message_id: u64, delay: Duration) {
        let platform = Arc::clone(&self.platform);
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Err(e) = platform.delete_message(channel_id, message_id).await {
                debug!(error = %e, message_id, "Delayed delete failed");
            }
        });
    }

    async fn update_count(&self, state: &mut QueueState) {
        let channel = self.config.channel_id;
        let text = queue_count_message(state.queue.len());
        match state.count_message_id {
            Some(id) => {
                if let Err(e) = self
                    .platform
                    .edit(channel, id, OutgoingMessage::text(text))
                    .await
                {
                    warn!(error = %e, "Failed to update queue counter");
                }
            }
            None => match self.platform.send(channel, OutgoingMessage::text(text)).await {
                Ok(id) => state.count_message_id = Some(id),
                Err(e) => warn!(error = %e, "Failed to post queue counter"),
            },
        }
    }

    /// Redraw the moderation embed for the current head.
    ///
    /// The old embed and anything posted after it are deleted, a new embed
    /// is posted, the counter is refreshed, and for a non-empty queue the
    /// similar game pictures and the moderation reactions are added.
    async fn render(&self, state: &mut QueueState) {
        let channel = self.config.channel_id;

        if let Some(old) = state.embed_message_id.take() {
            if let Err(e) = self.platform.delete_message(channel, old).await {
                debug!(error = %e, "Old suggestion embed already gone");
            }
            match self.platform.recent_messages(channel, 100).await {
                Ok(messages) => {
                    for message in messages
                        .iter()
                        .filter(|m| m.id > old && Some(m.id) != state.count_message_id)
                    {
                        if let Err(e) = self.platform.delete_message(channel, message.id).await {
                            debug!(error = %e, message_id = message.id, "Failed to clear message");
                        }
                    }
                }
                Err(e) => warn!(error = %e, "Failed to read the suggestion channel"),
            }
        }

        if let Some(head) = state.queue.first_mut() {
            let before = head.clone();
            self.annotate(head).await;
            if *head != before {
                head.last_modified = Utc::now();
                if let Err(e) = self.store.upsert_suggestion(head).await {
                    warn!(error = %e, suggestion_id = %head.id, "Failed to persist canonical names");
                }
            }
        }
        let message = match state.queue.first() {
            Some(head) => self.head_message(head).await,
            None => OutgoingMessage::embed(empty_queue_embed()),
        };

        let embed_id = match self.platform.send(channel, message).await {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Failed to post suggestion embed");
                return;
            }
        };
        state.embed_message_id = Some(embed_id);
        self.update_count(state).await;

        if let Err(e) = self.platform.remove_all_reactions(channel, embed_id).await {
            debug!(error = %e, "Failed to clear reactions");
        }

        let Some(head) = state.queue.first() else {
            return;
        };
        let similar = self
            .catalog
            .similar_images(&head.image_hash, self.config.similar_distance)
            .await;
        if !similar.is_empty()
            && let Err(e) = self
                .platform
                .send(channel, OutgoingMessage::embed(similar_images_embed(&similar)))
                .await
        {
            warn!(error = %e, "Failed to post similar images");
        }

        for emoji in [APPROVE_EMOJI, DENY_EMOJI, REASON_EMOJI] {
            if let Err(e) = self.platform.add_reaction(channel, embed_id, emoji).await {
                warn!(error = %e, emoji, "Failed to add moderation reaction");
            }
        }
    }

    async fn head_message(&self, head: &Suggestion) -> OutgoingMessage {
        let submitter = self.platform.user(head.user_id).await.ok();
        let channel_name = self.platform.channel_name(head.channel_id).await.ok();
        let guild_name = match head.guild_id {
            Some(guild_id) => self.platform.guild_name(guild_id).await.ok(),
            None => None,
        };
        let origin = channel_name
            .as_deref()
            .map(|channel| (guild_name.as_deref(), channel));

        let message =
            OutgoingMessage::embed(suggestion_embed(head, submitter.as_ref(), origin));
        match self.objects.get(&head.object_name).await {
            Ok(bytes) => message.with_attachment(SUGGESTION_IMAGE_NAME, bytes),
            Err(e) => {
                warn!(error = %e, object_name = %head.object_name, "Suggested picture unavailable");
                message
            }
        }
    }
}

fn is_missing_notes(error: &NuguError) -> bool {
    matches!(
        error.kind(),
        NuguErrorKind::Validation(v) if v.kind == ValidationErrorKind::MissingDenialNotes
    )
}

fn is_no_longer_shown(error: &NuguError) -> bool {
    matches!(
        error.kind(),
        NuguErrorKind::NotFound(n)
            if matches!(n.kind, NotFoundErrorKind::NotAtHead(_) | NotFoundErrorKind::EmptyQueue)
    )
}

fn missing_notes_message(config: &SuggestionConfig) -> String {
    format!(
        "A note must be set before denying a suggestion. Please use: `{}s-edit notes {{reason for denial...}}`",
        config.command_prefix
    )
}
