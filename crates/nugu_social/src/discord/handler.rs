//! Gateway event handler.

use super::conversions::{channel_message, emoji_name};
use super::platform::DiscordPlatform;
use crate::router::CommandRouter;
use async_trait::async_trait;
use serenity::all::{
    ChannelId, Context, EventHandler, GatewayIntents, GuildId, Message, MessageId, Reaction, Ready,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Forwards gateway events to the [`CommandRouter`].
pub struct NuguHandler {
    platform: Arc<DiscordPlatform>,
    router: Arc<CommandRouter>,
}

impl NuguHandler {
    /// Create a handler.
    pub fn new(platform: Arc<DiscordPlatform>, router: Arc<CommandRouter>) -> Self {
        Self { platform, router }
    }

    /// Gateway intents the bot needs.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::GUILD_MESSAGE_REACTIONS
            | GatewayIntents::DIRECT_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// Whether the author may run moderator commands in the message's guild.
    async fn is_moderator(&self, ctx: &Context, message: &Message) -> bool {
        let Some(guild_id) = message.guild_id else {
            return false;
        };
        let member = match guild_id.member(ctx, message.author.id).await {
            Ok(member) => member,
            Err(e) => {
                warn!(error = %e, "Could not look up member");
                return false;
            }
        };
        let permissions = match ctx.cache.guild(guild_id) {
            Some(guild) => guild.member_permissions(&member),
            None => {
                debug!(guild_id = guild_id.get(), "Guild not cached");
                return false;
            }
        };
        permissions.administrator() || permissions.manage_messages()
    }
}

#[async_trait]
impl EventHandler for NuguHandler {
    async fn ready(&self, _ctx: Context, ready: Ready) {
        info!(
            user = %ready.user.name,
            guilds = ready.guilds.len(),
            "Connected to Discord"
        );
    }

    #[instrument(skip_all, fields(message_id = message.id.get()))]
    async fn message(&self, ctx: Context, message: Message) {
        let converted = channel_message(&message);
        self.platform.publish(converted.clone());

        if converted.author_is_bot || !self.router.is_command(&converted.content) {
            return;
        }
        let is_moderator = self.is_moderator(&ctx, &message).await;
        self.router.on_message(&converted, is_moderator).await;
    }

    async fn reaction_add(&self, _ctx: Context, reaction: Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };
        self.router
            .on_reaction_add(
                reaction.guild_id.map(|g| g.get()),
                reaction.channel_id.get(),
                reaction.message_id.get(),
                user_id.get(),
                &emoji_name(&reaction.emoji),
            )
            .await;
    }

    async fn reaction_remove(&self, _ctx: Context, reaction: Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };
        self.router
            .on_reaction_remove(
                reaction.guild_id.map(|g| g.get()),
                reaction.channel_id.get(),
                reaction.message_id.get(),
                user_id.get(),
                &emoji_name(&reaction.emoji),
            )
            .await;
    }

    async fn message_delete(
        &self,
        _ctx: Context,
        _channel_id: ChannelId,
        deleted_message_id: MessageId,
        guild_id: Option<GuildId>,
    ) {
        self.router
            .on_message_delete(guild_id.map(|g| g.get()), deleted_message_id.get())
            .await;
    }
}
