//! Star ledger and mirror management.

use crate::config::StarboardConfig;
use crate::locks::GuildLocks;
use crate::render::{mirror_embed, starrers_embed, top_line, top_pages};
use nugu_core::{MirrorPost, StarboardEntry, StarboardSettings};
use nugu_error::{NotFoundError, NotFoundErrorKind, NuguResult};
use nugu_interface::{ChannelMessage, ChatPlatform, Embed, OutgoingMessage, StarboardStore};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Entries considered for the top list.
pub const TOP_LIMIT: usize = 100;

/// What a star reaction did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarChange {
    /// Not a star that counts; nothing changed
    Ignored,
    /// The entry after the change
    Updated(StarboardEntry),
    /// The last star went away and the entry was deleted
    Removed,
}

/// Per-guild starboard.
pub struct Starboard {
    store: Arc<dyn StarboardStore>,
    platform: Arc<dyn ChatPlatform>,
    config: StarboardConfig,
    locks: GuildLocks,
}

impl std::fmt::Debug for Starboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Starboard")
            .field("config", &self.config)
            .field("guilds", &self.locks.len())
            .finish_non_exhaustive()
    }
}

impl Starboard {
    /// Create a starboard.
    pub fn new(
        store: Arc<dyn StarboardStore>,
        platform: Arc<dyn ChatPlatform>,
        config: StarboardConfig,
    ) -> Self {
        Self {
            store,
            platform,
            config,
            locks: GuildLocks::new(),
        }
    }

    /// Settings of a guild with defaults applied.
    pub async fn settings(&self, guild_id: u64) -> NuguResult<StarboardSettings> {
        Ok(self.config.effective(self.store.settings(guild_id).await?))
    }

    /// Handle a reaction being added to a message.
    ///
    /// Fetches the message and records the star when it counts.
    #[instrument(skip(self))]
    pub async fn on_reaction_add(
        &self,
        guild_id: u64,
        channel_id: u64,
        message_id: u64,
        user_id: u64,
        emoji: &str,
    ) -> NuguResult<StarChange> {
        // Cheap checks before fetching the message.
        let settings = self.settings(guild_id).await?;
        if !settings.counts_as_star(emoji) || settings.channel_id().is_none() {
            return Ok(StarChange::Ignored);
        }
        let message = self.platform.message(channel_id, message_id).await?;
        self.add_star(guild_id, &message, user_id, emoji).await
    }

    /// Handle a reaction being removed from a message.
    #[instrument(skip(self))]
    pub async fn on_reaction_remove(
        &self,
        guild_id: u64,
        channel_id: u64,
        message_id: u64,
        user_id: u64,
        emoji: &str,
    ) -> NuguResult<StarChange> {
        let settings = self.settings(guild_id).await?;
        if !settings.counts_as_star(emoji) || settings.channel_id().is_none() {
            return Ok(StarChange::Ignored);
        }
        let message = self.platform.message(channel_id, message_id).await?;
        self.remove_star(guild_id, &message, user_id, emoji).await
    }

    /// Record a star on `message` by `user_id`.
    ///
    /// The entry is created on the first star with a snapshot of the
    /// message; later edits to the message are not picked up. Once the
    /// minimum is met the mirror is posted or refreshed.
    #[instrument(skip(self, message), fields(message_id = message.id))]
    pub async fn add_star(
        &self,
        guild_id: u64,
        message: &ChannelMessage,
        user_id: u64,
        emoji: &str,
    ) -> NuguResult<StarChange> {
        if message.content.is_empty() && message.attachment_urls.is_empty() {
            return Ok(StarChange::Ignored);
        }

        let _guard = self.locks.lock(guild_id).await;
        let settings = self.settings(guild_id).await?;
        if !self.counts(&settings, message, user_id, emoji).await {
            return Ok(StarChange::Ignored);
        }

        let mut entry = match self.store.find_entry(guild_id, message.id).await? {
            Some(entry) => entry,
            None => snapshot(guild_id, message),
        };
        if !entry.add_starrer(user_id) {
            debug!(user_id, "Duplicate star");
            return Ok(StarChange::Updated(entry));
        }
        self.store.upsert_entry(&entry).await?;

        if entry.stars() >= *settings.minimum() {
            self.post_or_update(&settings, &mut entry).await?;
        }
        debug!(stars = entry.stars(), "Star added");
        Ok(StarChange::Updated(entry))
    }

    /// Withdraw a star on `message` by `user_id`.
    ///
    /// Removing the last star deletes the entry and its mirror. Falling
    /// below the minimum deletes the mirror but keeps the entry.
    #[instrument(skip(self, message), fields(message_id = message.id))]
    pub async fn remove_star(
        &self,
        guild_id: u64,
        message: &ChannelMessage,
        user_id: u64,
        emoji: &str,
    ) -> NuguResult<StarChange> {
        let _guard = self.locks.lock(guild_id).await;
        let settings = self.settings(guild_id).await?;
        if !self.counts(&settings, message, user_id, emoji).await {
            return Ok(StarChange::Ignored);
        }

        let Some(mut entry) = self.store.find_entry(guild_id, message.id).await? else {
            return Ok(StarChange::Ignored);
        };
        if !entry.remove_starrer(user_id) {
            return Ok(StarChange::Updated(entry));
        }

        if entry.starrers.is_empty() {
            self.store.delete_entry(guild_id, message.id).await?;
            if let Some(mirror) = entry.mirror {
                self.delete_mirror(mirror).await;
            }
            info!("Last star removed, entry deleted");
            return Ok(StarChange::Removed);
        }

        if entry.stars() >= *settings.minimum() {
            self.store.upsert_entry(&entry).await?;
            self.post_or_update(&settings, &mut entry).await?;
        } else {
            if let Some(mirror) = entry.mirror.take() {
                self.delete_mirror(mirror).await;
            }
            self.store.upsert_entry(&entry).await?;
        }
        debug!(stars = entry.stars(), "Star removed");
        Ok(StarChange::Updated(entry))
    }

    /// Drop the entry and mirror of a deleted message.
    ///
    /// Returns whether an entry existed.
    #[instrument(skip(self))]
    pub async fn on_message_delete(&self, guild_id: u64, message_id: u64) -> NuguResult<bool> {
        let _guard = self.locks.lock(guild_id).await;
        let Some(entry) = self.store.find_entry(guild_id, message_id).await? else {
            return Ok(false);
        };
        self.store.delete_entry(guild_id, message_id).await?;
        if let Some(mirror) = entry.mirror {
            self.delete_mirror(mirror).await;
        }
        info!("Starred message deleted");
        Ok(true)
    }

    /// Most starred entries of a guild, at most `limit`.
    pub async fn top(&self, guild_id: u64, limit: usize) -> NuguResult<Vec<StarboardEntry>> {
        let mut entries = self.store.entries_for_guild(guild_id).await?;
        entries.sort_by(|a, b| b.stars().cmp(&a.stars()));
        entries.truncate(limit);
        Ok(entries)
    }

    /// Rendered top list, [`TOP_LIMIT`] entries in pages of five.
    ///
    /// Empty when nothing in the guild has been starred.
    #[instrument(skip(self))]
    pub async fn top_pages(&self, guild_id: u64) -> NuguResult<Vec<Embed>> {
        let entries = self.top(guild_id, TOP_LIMIT).await?;
        if entries.is_empty() {
            return Ok(Vec::new());
        }
        let settings = self.settings(guild_id).await?;
        let emoji = settings.display_emoji();

        let mut lines = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let author = self.display_name(entry.author_id).await;
            lines.push(top_line(index + 1, &author, entry, emoji));
        }
        let guild_name = self
            .platform
            .guild_name(guild_id)
            .await
            .unwrap_or_else(|_| guild_id.to_string());
        Ok(top_pages(&lines, &guild_name))
    }

    /// Embed listing who starred a message.
    ///
    /// # Errors
    ///
    /// A not-found error when the message has no entry.
    #[instrument(skip(self))]
    pub async fn starrers(&self, guild_id: u64, message_id: u64) -> NuguResult<Embed> {
        let Some(entry) = self.store.find_entry(guild_id, message_id).await? else {
            return Err(NotFoundError::new(NotFoundErrorKind::StarboardEntry(message_id)).into());
        };
        let settings = self.settings(guild_id).await?;

        let mut names = Vec::with_capacity(entry.starrers.len());
        for user_id in &entry.starrers {
            names.push(match self.platform.user(*user_id).await {
                Ok(user) => format!("@{}", user.name),
                Err(_) => "N/A".to_string(),
            });
        }
        let author = self.display_name(entry.author_id).await;
        let channel = self.channel_name(entry.channel_id).await;
        Ok(starrers_embed(
            &entry,
            &author,
            &channel,
            &names,
            settings.display_emoji(),
        ))
    }

    /// Point the starboard at `channel_id`, or turn it off with `None`.
    ///
    /// Returns the previous channel.
    #[instrument(skip(self))]
    pub async fn set_channel(
        &self,
        guild_id: u64,
        channel_id: Option<u64>,
    ) -> NuguResult<Option<u64>> {
        self.update_settings(guild_id, |settings| {
            let previous = *settings.channel_id();
            settings.set_channel(channel_id);
            previous
        })
        .await
    }

    /// Change the star minimum. Values below one are stored as one.
    #[instrument(skip(self))]
    pub async fn set_minimum(&self, guild_id: u64, minimum: usize) -> NuguResult<usize> {
        self.update_settings(guild_id, |settings| {
            settings.set_minimum(minimum);
            *settings.minimum()
        })
        .await
    }

    /// Add or remove a star emoji. Returns whether it is now enabled.
    #[instrument(skip(self))]
    pub async fn toggle_emoji(&self, guild_id: u64, emoji: &str) -> NuguResult<bool> {
        self.update_settings(guild_id, |settings| settings.toggle_emoji(emoji))
            .await
    }

    async fn update_settings<T>(
        &self,
        guild_id: u64,
        change: impl FnOnce(&mut StarboardSettings) -> T,
    ) -> NuguResult<T> {
        let _guard = self.locks.lock(guild_id).await;
        let mut settings = self.settings(guild_id).await?;
        let result = change(&mut settings);
        self.store.save_settings(guild_id, &settings).await?;
        info!(guild_id, ?settings, "Starboard settings changed");
        Ok(result)
    }

    /// Whether a reaction should move the ledger at all.
    async fn counts(
        &self,
        settings: &StarboardSettings,
        message: &ChannelMessage,
        user_id: u64,
        emoji: &str,
    ) -> bool {
        if !settings.counts_as_star(emoji) || settings.channel_id().is_none() {
            return false;
        }
        if user_id == message.author_id || user_id == self.platform.bot_user_id() {
            return false;
        }
        match self.platform.user(user_id).await {
            Ok(user) => !user.is_bot,
            Err(e) => {
                warn!(error = %e, user_id, "Could not look up reacting user");
                false
            }
        }
    }

    /// Edit the mirror in place when it lives in the configured channel,
    /// otherwise post a new one and remember it.
    async fn post_or_update(
        &self,
        settings: &StarboardSettings,
        entry: &mut StarboardEntry,
    ) -> NuguResult<()> {
        let Some(channel_id) = *settings.channel_id() else {
            return Ok(());
        };

        let author = self.platform.user(entry.author_id).await.ok();
        let channel_name = self.channel_name(entry.channel_id).await;
        let embed = mirror_embed(
            entry,
            author.as_ref(),
            &channel_name,
            settings.display_emoji(),
        );

        if let Some(mirror) = entry.mirror
            && mirror.channel_id == channel_id
        {
            match self
                .platform
                .edit(
                    mirror.channel_id,
                    mirror.message_id,
                    OutgoingMessage::embed(embed.clone()),
                )
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) => warn!(error = %e, "Mirror could not be edited, posting a new one"),
            }
        }

        let message_id = self
            .platform
            .send(channel_id, OutgoingMessage::embed(embed))
            .await?;
        entry.mirror = Some(MirrorPost {
            channel_id,
            message_id,
        });
        self.store.upsert_entry(entry).await?;
        info!(mirror_id = message_id, stars = entry.stars(), "Posted starboard mirror");
        Ok(())
    }

    async fn delete_mirror(&self, mirror: MirrorPost) {
        if let Err(e) = self
            .platform
            .delete_message(mirror.channel_id, mirror.message_id)
            .await
        {
            debug!(error = %e, mirror_id = mirror.message_id, "Mirror already gone");
        }
    }

    async fn display_name(&self, user_id: u64) -> String {
        self.platform
            .user(user_id)
            .await
            .map(|u| u.name)
            .unwrap_or_else(|_| "N/A".to_string())
    }

    async fn channel_name(&self, channel_id: u64) -> String {
        self.platform
            .channel_name(channel_id)
            .await
            .unwrap_or_default()
    }
}

/// A fresh entry capturing the message as it is now.
fn snapshot(guild_id: u64, message: &ChannelMessage) -> StarboardEntry {
    let mut entry = StarboardEntry::new(guild_id, message.channel_id, message.id, message.author_id);
    entry.content = message.content.clone();
    entry.attachment_urls = message.attachment_urls.clone();
    entry.embed_image_url = message.embed_image_urls.last().cloned();
    entry
}
