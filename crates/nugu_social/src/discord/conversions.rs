//! Conversions between serenity models and the platform-neutral types.

use nugu_error::{PlatformError, PlatformErrorKind};
use nugu_interface::{ChannelMessage, Embed, OutgoingMessage, UserInfo};
use serenity::builder::{
    CreateAttachment, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage,
    EditMessage,
};
use serenity::model::channel::{Message, ReactionType};
use serenity::model::user::User;

/// Wrap a serenity failure.
#[track_caller]
pub fn api_error(err: serenity::Error) -> PlatformError {
    PlatformError::new(PlatformErrorKind::Api(err.to_string()))
}

/// Text form of a reaction emoji; custom emoji are identified by name.
pub fn emoji_name(reaction: &ReactionType) -> String {
    match reaction {
        ReactionType::Unicode(emoji) => emoji.clone(),
        ReactionType::Custom { name, id, .. } => {
            name.clone().unwrap_or_else(|| id.get().to_string())
        }
        _ => String::new(),
    }
}

/// Reaction to add for an emoji string such as `⭐` or `<:name:id>`.
pub fn reaction_type(emoji: &str) -> ReactionType {
    ReactionType::try_from(emoji).unwrap_or_else(|_| ReactionType::Unicode(emoji.to_string()))
}

pub fn channel_message(message: &Message) -> ChannelMessage {
    let embed_image_urls = message
        .embeds
        .iter()
        .flat_map(|embed| {
            [
                embed.video.as_ref().map(|v| v.url.clone()),
                embed.image.as_ref().map(|i| i.url.clone()),
                embed.thumbnail.as_ref().map(|t| t.url.clone()),
            ]
        })
        .flatten()
        .collect();

    ChannelMessage {
        id: message.id.get(),
        channel_id: message.channel_id.get(),
        guild_id: message.guild_id.map(|g| g.get()),
        author_id: message.author.id.get(),
        author_name: message.author.name.clone(),
        author_is_bot: message.author.bot,
        content: message.content.clone(),
        attachment_urls: message.attachments.iter().map(|a| a.url.clone()).collect(),
        embed_image_urls,
    }
}

pub fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id.get(),
        name: user.name.clone(),
        is_bot: user.bot,
        avatar_url: user.avatar_url(),
    }
}

fn create_embed(embed: Embed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(author) = embed.author {
        let mut author = CreateEmbedAuthor::new(author);
        if let Some(icon) = embed.author_icon_url {
            author = author.icon_url(icon);
        }
        builder = builder.author(author);
    }
    if let Some(title) = embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    for field in embed.fields {
        builder = builder.field(field.name, field.value, field.inline);
    }
    if let Some(image) = embed.image_url {
        builder = builder.image(image);
    }
    if let Some(thumbnail) = embed.thumbnail_url {
        builder = builder.thumbnail(thumbnail);
    }
    if let Some(footer) = embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    builder
}

pub fn create_message(message: OutgoingMessage) -> CreateMessage {
    let mut builder = CreateMessage::new();
    if let Some(content) = message.content {
        builder = builder.content(content);
    }
    if let Some(embed) = message.embed {
        builder = builder.embed(create_embed(embed));
    }
    if let Some(attachment) = message.attachment {
        builder = builder.add_file(CreateAttachment::bytes(
            attachment.bytes,
            attachment.filename,
        ));
    }
    builder
}

/// Edits replace the text and embed; a new attachment replaces the old one.
pub fn edit_message(message: OutgoingMessage) -> EditMessage {
    let mut builder = EditMessage::new().content(message.content.unwrap_or_default());
    builder = match message.embed {
        Some(embed) => builder.embed(create_embed(embed)),
        None => builder.embeds(Vec::new()),
    };
    if let Some(attachment) = message.attachment {
        builder = builder.new_attachment(CreateAttachment::bytes(
            attachment.bytes,
            attachment.filename,
        ));
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emoji_round_trip() {
        assert_eq!(emoji_name(&reaction_type("⭐")), "⭐");
        assert_eq!(emoji_name(&reaction_type("<:heart:123>")), "heart");
    }
}
