//! Event routing from the chat platform to the bot's components.

use crate::commands::{BotCommand, IdolAdmin, StatsQuery, StatsTarget};
use crate::replies::{
    GUILD_ONLY, MESSAGE_LIMIT, MODERATOR_ONLY, catalog_summary_text, chunk_lines,
    guess_stats_text, missed_text, ranking_embed, user_stats_embed,
};
use nugu_error::{
    NotFoundError, NotFoundErrorKind, NuguError, NuguResult, ValidationError, ValidationErrorKind,
};
use nugu_idols::{IdolCatalog, NuguStats, StatsScope, SuggestionQueue, SuggestionRequest};
use nugu_interface::{ChannelMessage, ChatPlatform, OutgoingMessage};
use nugu_starboard::Starboard;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// Routes messages, reactions and deletions to the catalog, suggestion
/// queue, statistics and starboard.
///
/// Errors never escape the router: user mistakes are answered in the
/// channel, everything else is logged and answered with a generic failure.
pub struct CommandRouter {
    platform: Arc<dyn ChatPlatform>,
    catalog: Arc<IdolCatalog>,
    queue: Arc<SuggestionQueue>,
    stats: Arc<NuguStats>,
    starboard: Arc<Starboard>,
    prefix: String,
}

impl std::fmt::Debug for CommandRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRouter")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl CommandRouter {
    /// Create a router. Commands start with the suggestion queue's prefix.
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        catalog: Arc<IdolCatalog>,
        queue: Arc<SuggestionQueue>,
        stats: Arc<NuguStats>,
        starboard: Arc<Starboard>,
    ) -> Self {
        let prefix = queue.config().command_prefix().clone();
        Self {
            platform,
            catalog,
            queue,
            stats,
            starboard,
            prefix,
        }
    }

    /// Command prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `content` looks like a command, before any parsing.
    pub fn is_command(&self, content: &str) -> bool {
        content.starts_with(&self.prefix)
    }

    /// Handle a new message. Returns whether it was a nugu command.
    #[instrument(skip(self, message), fields(message_id = message.id, channel_id = message.channel_id))]
    pub async fn on_message(&self, message: &ChannelMessage, is_moderator: bool) -> bool {
        if message.author_is_bot || !self.is_command(&message.content) {
            return false;
        }
        let command = match BotCommand::parse(&self.prefix, &message.content) {
            Ok(Some(command)) => command,
            Ok(None) => return false,
            Err(e) => {
                self.report(message.channel_id, &e).await;
                return true;
            }
        };
        debug!(?command, "Routing command");

        if command.requires_moderator() && !is_moderator {
            info!(user_id = message.author_id, "Moderator command refused");
            self.reply(message.channel_id, MODERATOR_ONLY).await;
            return true;
        }
        if let Err(e) = self.dispatch(message, command).await {
            self.report(message.channel_id, &e).await;
        }
        true
    }

    async fn dispatch(&self, message: &ChannelMessage, command: BotCommand) -> NuguResult<()> {
        match command {
            BotCommand::Suggest => {
                let request = SuggestionRequest::from_command(
                    message.author_id,
                    message.channel_id,
                    message.guild_id,
                    &message.content,
                    &message.attachment_urls,
                )?;
                self.queue.submit(request).await?;
            }
            BotCommand::SuggestEdit { field, value } => {
                self.queue
                    .edit_field(message.channel_id, message.id, &field, &value)
                    .await?;
            }
            BotCommand::Idol(admin) => self.idol_admin(message.channel_id, admin).await?,
            BotCommand::Stats(query) => self.stats(message, query).await?,
            BotCommand::Starboard(command) => {
                let Some(guild_id) = message.guild_id else {
                    self.reply(message.channel_id, GUILD_ONLY).await;
                    return Ok(());
                };
                let reply = self.starboard.execute(guild_id, command).await?;
                self.platform.send(message.channel_id, reply).await?;
            }
        }
        Ok(())
    }

    async fn idol_admin(&self, channel_id: u64, admin: IdolAdmin) -> NuguResult<()> {
        let text = match admin {
            IdolAdmin::List => catalog_summary_text(&self.catalog.list_summary().await),
            IdolAdmin::Images { group, name } => {
                let images = self.catalog.images_for(&group, &name).await?;
                let names: Vec<&str> = images.iter().map(|i| i.object_name.as_str()).collect();
                format!("Images of {} {}:\n{}", group, name, names.join("\n"))
            }
            IdolAdmin::UpdateGroup { target, new_group } => {
                let updated = self.catalog.update_group(&target, &new_group).await?;
                format!("Updated {} idols from {} to {}.", updated, target, new_group)
            }
            IdolAdmin::Rename {
                group,
                name,
                new_group,
                new_name,
                gender,
            } => {
                let found = self
                    .catalog
                    .rename(&group, &name, &new_group, &new_name, gender)
                    .await?;
                if found == 0 {
                    Err(NotFoundError::new(NotFoundErrorKind::Idol(format!(
                        "{} {}",
                        group, name
                    ))))?
                }
                format!("Updated {} {} to {} {}.", group, name, new_group, new_name)
            }
            IdolAdmin::DeleteImage(object_name) => {
                self.catalog.delete_image(&object_name).await?;
                format!("Deleted image {}.", object_name)
            }
            IdolAdmin::MoveImage {
                object_name,
                group,
                name,
                gender,
            } => {
                let idol = self
                    .catalog
                    .update_image(&object_name, &group, &name, gender)
                    .await?;
                format!("Moved image {} to {}.", object_name, idol.display_name())
            }
        };
        for chunk in chunk_lines(&text, MESSAGE_LIMIT) {
            self.platform
                .send(channel_id, OutgoingMessage::text(chunk))
                .await?;
        }
        Ok(())
    }

    fn scope(&self, message: &ChannelMessage, target: StatsTarget) -> NuguResult<StatsScope> {
        Ok(match target {
            StatsTarget::Me => StatsScope::User(message.author_id),
            StatsTarget::User(id) => StatsScope::User(id),
            StatsTarget::Server => match message.guild_id {
                Some(guild_id) => StatsScope::Server(guild_id),
                None => Err(ValidationError::new(ValidationErrorKind::InvalidArguments(
                    GUILD_ONLY.to_string(),
                )))?,
            },
            StatsTarget::Global => StatsScope::Global,
        })
    }

    async fn stats(&self, message: &ChannelMessage, query: StatsQuery) -> NuguResult<()> {
        let reply = match query {
            StatsQuery::Player(target) => {
                let scope = self.scope(message, target)?;
                let title = match scope {
                    StatsScope::User(id) => match self.platform.user(id).await {
                        Ok(user) => format!("Nugu stats for {}", user.name),
                        Err(_) => format!("Nugu stats for <@{}>", id),
                    },
                    StatsScope::Server(guild_id) => {
                        let name = self
                            .platform
                            .guild_name(guild_id)
                            .await
                            .unwrap_or_else(|_| guild_id.to_string());
                        format!("Nugu stats for {}", name)
                    }
                    StatsScope::Global => "Global nugu stats".to_string(),
                };
                let stats = self.stats.user_stats(scope).await?;
                OutgoingMessage::embed(user_stats_embed(&title, &stats))
            }
            StatsQuery::Idol { group, name } => {
                let Some(idol) = self
                    .catalog
                    .match_group_and_name(&group, &name, false)
                    .await
                    .idol
                else {
                    return Err(NotFoundError::new(NotFoundErrorKind::Idol(format!(
                        "{} {}",
                        group, name
                    )))
                    .into());
                };
                let stats = self.stats.idol_stats(&idol.id).await?;
                OutgoingMessage::text(guess_stats_text(&idol.display_name(), &stats))
            }
            StatsQuery::Group(group) => {
                let (canonical, stats) = self.stats.group_stats(&group).await?;
                OutgoingMessage::text(guess_stats_text(&canonical, &stats))
            }
            StatsQuery::Missed(target) => {
                let scope = self.scope(message, target)?;
                let missed = self.stats.missed_idols(scope).await?;
                OutgoingMessage::text(missed_text(&missed))
            }
            StatsQuery::Ranking {
                mut query,
                this_server,
            } => {
                if this_server {
                    query.guild_id = message.guild_id;
                }
                let entries = self.stats.ranking(query).await?;
                OutgoingMessage::embed(ranking_embed(&entries, query.by_server))
            }
        };

        if let Some(text) = reply.content.as_deref()
            && text.chars().count() > MESSAGE_LIMIT
        {
            for chunk in chunk_lines(text, MESSAGE_LIMIT) {
                self.platform
                    .send(message.channel_id, OutgoingMessage::text(chunk))
                    .await?;
            }
            return Ok(());
        }
        self.platform.send(message.channel_id, reply).await?;
        Ok(())
    }

    /// Handle a reaction being added.
    ///
    /// Reactions on the moderation embed resolve suggestions; star reactions
    /// in guilds go to the starboard.
    #[instrument(skip(self))]
    pub async fn on_reaction_add(
        &self,
        guild_id: Option<u64>,
        channel_id: u64,
        message_id: u64,
        user_id: u64,
        emoji: &str,
    ) {
        if channel_id == *self.queue.config().channel_id() {
            match self
                .queue
                .on_reaction(channel_id, message_id, user_id, emoji)
                .await
            {
                Ok(Some(suggestion)) => {
                    info!(suggestion_id = %suggestion.id, status = %suggestion.status, "Suggestion resolved")
                }
                Ok(None) => {}
                Err(e) => self.report(channel_id, &e).await,
            }
            return;
        }

        let Some(guild_id) = guild_id else {
            return;
        };
        if let Err(e) = self
            .starboard
            .on_reaction_add(guild_id, channel_id, message_id, user_id, emoji)
            .await
        {
            warn!(error = %e, "Failed to record star");
        }
    }

    /// Handle a reaction being removed.
    #[instrument(skip(self))]
    pub async fn on_reaction_remove(
        &self,
        guild_id: Option<u64>,
        channel_id: u64,
        message_id: u64,
        user_id: u64,
        emoji: &str,
    ) {
        let Some(guild_id) = guild_id else {
            return;
        };
        if let Err(e) = self
            .starboard
            .on_reaction_remove(guild_id, channel_id, message_id, user_id, emoji)
            .await
        {
            warn!(error = %e, "Failed to withdraw star");
        }
    }

    /// Handle a message being deleted.
    #[instrument(skip(self))]
    pub async fn on_message_delete(&self, guild_id: Option<u64>, message_id: u64) {
        let Some(guild_id) = guild_id else {
            return;
        };
        if let Err(e) = self.starboard.on_message_delete(guild_id, message_id).await {
            warn!(error = %e, "Failed to clean up starboard entry");
        }
    }

    async fn reply(&self, channel_id: u64, text: &str) {
        if let Err(e) = self
            .platform
            .send(channel_id, OutgoingMessage::text(text))
            .await
        {
            warn!(error = %e, channel_id, "Failed to reply");
        }
    }

    async fn report(&self, channel_id: u64, err: &NuguError) {
        if err.is_user_facing() {
            debug!(error = %err, "Command rejected");
        } else {
            error!(error = %err, "Command failed");
        }
        self.reply(channel_id, &err.user_message()).await;
    }
}
