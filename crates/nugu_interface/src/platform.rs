//! Chat platform abstraction.
//!
//! Components post, edit and delete messages and manage reactions through
//! [`ChatPlatform`]. Ids are raw snowflakes so the components stay
//! independent of any client library.

use nugu_error::NuguResult;

/// A name/value pair inside an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    /// Field title
    pub name: String,
    /// Field body
    pub value: String,
    /// Render beside neighbouring fields
    pub inline: bool,
}

impl EmbedField {
    /// An inline field.
    pub fn inline(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: true,
        }
    }

    /// A full-width field.
    pub fn block(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline: false,
        }
    }
}

/// Rich message content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embed {
    /// Author line
    pub author: Option<String>,
    /// Icon shown beside the author line
    pub author_icon_url: Option<String>,
    /// Title
    pub title: Option<String>,
    /// Body text
    pub description: Option<String>,
    /// Sidebar colour
    pub color: Option<u32>,
    /// Fields
    pub fields: Vec<EmbedField>,
    /// Large image; `attachment://name` refers to an attached file
    pub image_url: Option<String>,
    /// Small image in the corner
    pub thumbnail_url: Option<String>,
    /// Footer text
    pub footer: Option<String>,
}

/// A file uploaded with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown to users
    pub filename: String,
    /// Contents
    pub bytes: Vec<u8>,
}

/// Everything a single send or edit may carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingMessage {
    /// Plain text
    pub content: Option<String>,
    /// Rich content
    pub embed: Option<Embed>,
    /// Uploaded file
    pub attachment: Option<Attachment>,
}

impl OutgoingMessage {
    /// A plain text message.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// An embed-only message.
    pub fn embed(embed: Embed) -> Self {
        Self {
            embed: Some(embed),
            ..Self::default()
        }
    }

    /// Attach a file to the message.
    pub fn with_attachment(mut self, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.attachment = Some(Attachment {
            filename: filename.into(),
            bytes,
        });
        self
    }
}

/// A message read from a channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelMessage {
    /// Message id
    pub id: u64,
    /// Channel the message is in
    pub channel_id: u64,
    /// Guild the channel belongs to, if any
    pub guild_id: Option<u64>,
    /// Author id
    pub author_id: u64,
    /// Author display name
    pub author_name: String,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Text content
    pub content: String,
    /// Attachment URLs, in upload order
    pub attachment_urls: Vec<String>,
    /// Image URLs found in embeds (video, image, thumbnail per embed)
    pub embed_image_urls: Vec<String>,
}

/// A platform user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserInfo {
    /// User id
    pub id: u64,
    /// User name
    pub name: String,
    /// Whether the account is a bot
    pub is_bot: bool,
    /// Avatar URL
    pub avatar_url: Option<String>,
}

/// Operations the bot performs against the chat platform.
#[async_trait::async_trait]
pub trait ChatPlatform: Send + Sync {
    /// Id of the bot's own account.
    fn bot_user_id(&self) -> u64;

    /// Send a message and return its id.
    async fn send(&self, channel_id: u64, message: OutgoingMessage) -> NuguResult<u64>;

    /// Replace the content of a message the bot sent.
    async fn edit(&self, channel_id: u64, message_id: u64, message: OutgoingMessage)
    -> NuguResult<()>;

    /// Delete a message.
    async fn delete_message(&self, channel_id: u64, message_id: u64) -> NuguResult<()>;

    /// Delete several messages at once.
    async fn bulk_delete(&self, channel_id: u64, message_ids: &[u64]) -> NuguResult<()>;

    /// React to a message as the bot.
    async fn add_reaction(&self, channel_id: u64, message_id: u64, emoji: &str) -> NuguResult<()>;

    /// Remove one user's reaction.
    async fn remove_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
        user_id: u64,
    ) -> NuguResult<()>;

    /// Clear every reaction on a message.
    async fn remove_all_reactions(&self, channel_id: u64, message_id: u64) -> NuguResult<()>;

    /// Open a direct message channel with `user_id` and send `content`.
    async fn send_direct(&self, user_id: u64, content: &str) -> NuguResult<()>;

    /// Fetch a single message.
    async fn message(&self, channel_id: u64, message_id: u64) -> NuguResult<ChannelMessage>;

    /// Most recent messages in a channel, newest first.
    async fn recent_messages(&self, channel_id: u64, limit: u8) -> NuguResult<Vec<ChannelMessage>>;

    /// Wait for the next message posted in `channel_id`.
    ///
    /// Callers bound the wait with their own timeout.
    async fn next_message(&self, channel_id: u64) -> NuguResult<ChannelMessage>;

    /// Look up a user.
    async fn user(&self, user_id: u64) -> NuguResult<UserInfo>;

    /// Name of a channel.
    async fn channel_name(&self, channel_id: u64) -> NuguResult<String>;

    /// Name of a guild.
    async fn guild_name(&self, guild_id: u64) -> NuguResult<String>;
}
