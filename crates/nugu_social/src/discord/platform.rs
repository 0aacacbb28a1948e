//! [`ChatPlatform`] over serenity's HTTP client.

use super::conversions::{
    api_error, channel_message, create_message, edit_message, reaction_type, user_info,
};
use async_trait::async_trait;
use nugu_error::{NuguResult, PlatformError, PlatformErrorKind};
use nugu_interface::{ChannelMessage, ChatPlatform, OutgoingMessage, UserInfo};
use serenity::builder::{CreateMessage, GetMessages};
use serenity::http::Http;
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

/// Messages kept for slow `next_message` waiters.
const INCOMING_CAPACITY: usize = 256;

/// Discord's bulk delete accepts at most this many ids per call.
const BULK_DELETE_LIMIT: usize = 100;

/// Discord platform.
///
/// Gateway messages are fed in through [`DiscordPlatform::publish`] by the
/// event handler so components can wait for the next message in a channel.
pub struct DiscordPlatform {
    http: Arc<Http>,
    bot_id: u64,
    incoming: broadcast::Sender<ChannelMessage>,
}

impl std::fmt::Debug for DiscordPlatform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordPlatform")
            .field("bot_id", &self.bot_id)
            .finish_non_exhaustive()
    }
}

impl DiscordPlatform {
    /// Log in over HTTP and learn the bot's own id.
    #[instrument(skip(token), fields(token_len = token.len()))]
    pub async fn connect(token: &str) -> NuguResult<Self> {
        let http = Arc::new(Http::new(token));
        let me = http.get_current_user().await.map_err(api_error)?;
        info!(bot_id = me.id.get(), name = %me.name, "Discord HTTP client ready");
        let (incoming, _) = broadcast::channel(INCOMING_CAPACITY);
        Ok(Self {
            http,
            bot_id: me.id.get(),
            incoming,
        })
    }

    /// Hand a gateway message to `next_message` waiters.
    pub fn publish(&self, message: ChannelMessage) {
        // No receivers just means nobody is waiting.
        let _ = self.incoming.send(message);
    }

    fn http(&self) -> &Http {
        self.http.as_ref()
    }
}

#[async_trait]
impl ChatPlatform for DiscordPlatform {
    fn bot_user_id(&self) -> u64 {
        self.bot_id
    }

    #[instrument(skip(self, message))]
    async fn send(&self, channel_id: u64, message: OutgoingMessage) -> NuguResult<u64> {
        let sent = ChannelId::new(channel_id)
            .send_message(self.http(), create_message(message))
            .await
            .map_err(|e| PlatformError::new(PlatformErrorKind::MessageSendFailed(e.to_string())))?;
        Ok(sent.id.get())
    }

    #[instrument(skip(self, message))]
    async fn edit(
        &self,
        channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    ) -> NuguResult<()> {
        ChannelId::new(channel_id)
            .edit_message(self.http(), MessageId::new(message_id), edit_message(message))
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> NuguResult<()> {
        ChannelId::new(channel_id)
            .delete_message(self.http(), MessageId::new(message_id))
            .await
            .map_err(api_error)?;
        Ok(())
    }

    #[instrument(skip(self, message_ids), fields(count = message_ids.len()))]
    async fn bulk_delete(&self, channel_id: u64, message_ids: &[u64]) -> NuguResult<()> {
        let channel = ChannelId::new(channel_id);
        for chunk in message_ids.chunks(BULK_DELETE_LIMIT) {
            match chunk {
                [single] => self.delete_message(channel_id, *single).await?,
                ids => channel
                    .delete_messages(self.http(), ids.iter().map(|id| MessageId::new(*id)))
                    .await
                    .map_err(api_error)?,
            }
        }
        Ok(())
    }

    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &str) -> NuguResult<()> {
        ChannelId::new(channel_id)
            .create_reaction(self.http(), MessageId::new(message_id), reaction_type(emoji))
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn remove_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        user_id: u64,
    ) -> NuguResult<()> {
        ChannelId::new(channel_id)
            .delete_reaction(
                self.http(),
                MessageId::new(message_id),
                Some(UserId::new(user_id)),
                reaction_type(emoji),
            )
            .await
            .map_err(api_error)?;
        Ok(())
    }

    async fn remove_all_reactions(&self, channel_id: u64, message_id: u64) -> NuguResult<()> {
        ChannelId::new(channel_id)
            .delete_reactions(self.http(), MessageId::new(message_id))
            .await
            .map_err(api_error)?;
        Ok(())
    }

    #[instrument(skip(self, content))]
    async fn send_direct(&self, user_id: u64, content: &str) -> NuguResult<()> {
        let dm = UserId::new(user_id)
            .create_dm_channel(self.http())
            .await
            .map_err(|e| {
                debug!(error = %e, "Could not open DM channel");
                PlatformError::new(PlatformErrorKind::DirectMessage(user_id))
            })?;
        dm.id
            .send_message(self.http(), CreateMessage::new().content(content))
            .await
            .map_err(|e| PlatformError::new(PlatformErrorKind::MessageSendFailed(e.to_string())))?;
        Ok(())
    }

    async fn message(&self, channel_id: u64, message_id: u64) -> NuguResult<ChannelMessage> {
        let message = ChannelId::new(channel_id)
            .message(self.http(), MessageId::new(message_id))
            .await
            .map_err(|e| {
                debug!(error = %e, message_id, "Message lookup failed");
                PlatformError::new(PlatformErrorKind::MessageNotFound(message_id))
            })?;
        Ok(channel_message(&message))
    }

    async fn recent_messages(&self, channel_id: u64, limit: u8) -> NuguResult<Vec<ChannelMessage>> {
        let messages = ChannelId::new(channel_id)
            .messages(self.http(), GetMessages::new().limit(limit))
            .await
            .map_err(api_error)?;
        Ok(messages.iter().map(channel_message).collect())
    }

    async fn next_message(&self, channel_id: u64) -> NuguResult<ChannelMessage> {
        let mut receiver = self.incoming.subscribe();
        loop {
            match receiver.recv().await {
                Ok(message) if message.channel_id == channel_id => return Ok(message),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Message waiter fell behind");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(PlatformError::new(PlatformErrorKind::ChannelNotFound(
                        channel_id,
                    ))
                    .into());
                }
            }
        }
    }

    async fn user(&self, user_id: u64) -> NuguResult<UserInfo> {
        let user = UserId::new(user_id)
            .to_user(self.http())
            .await
            .map_err(|e| {
                debug!(error = %e, user_id, "User lookup failed");
                PlatformError::new(PlatformErrorKind::UserNotFound(user_id))
            })?;
        Ok(user_info(&user))
    }

    async fn channel_name(&self, channel_id: u64) -> NuguResult<String> {
        let channel = ChannelId::new(channel_id)
            .to_channel(self.http())
            .await
            .map_err(|_| PlatformError::new(PlatformErrorKind::ChannelNotFound(channel_id)))?;
        match channel.guild() {
            Some(guild_channel) => Ok(guild_channel.name),
            None => Ok(channel_id.to_string()),
        }
    }

    async fn guild_name(&self, guild_id: u64) -> NuguResult<String> {
        let guild = GuildId::new(guild_id)
            .to_partial_guild(self.http())
            .await
            .map_err(api_error)?;
        Ok(guild.name)
    }
}
