//! `starboard` admin and query commands.

use crate::starboard::Starboard;
use nugu_error::{NuguResult, ValidationError, ValidationErrorKind};
use nugu_interface::OutgoingMessage;
use regex::Regex;
use std::sync::LazyLock;
use tracing::instrument;

static CHANNEL_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:<#)?([0-9]+)>?$").expect("Valid channel mention regex"));

static CUSTOM_EMOJI: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<a?:([A-Za-z0-9_]+):[0-9]+>$").expect("Valid emoji regex"));

const USAGE: &str = "usage: starboard {status|set [#channel]|minimum N|emoji E|top [page]|starrers message_id}";

/// A parsed `starboard` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StarboardCommand {
    /// Show the current settings
    Status,
    /// Set the starboard channel, or turn the starboard off
    Set(Option<u64>),
    /// Change the star minimum
    Minimum(usize),
    /// Toggle a star emoji
    Emoji(String),
    /// Show a page (1-based) of the most starred messages
    Top(usize),
    /// List who starred a message
    Starrers(u64),
}

fn invalid(reason: impl Into<String>) -> ValidationError {
    ValidationError::new(ValidationErrorKind::InvalidArguments(reason.into()))
}

impl StarboardCommand {
    /// Parse the arguments after the command word.
    ///
    /// ```
    /// use nugu_starboard::StarboardCommand;
    ///
    /// assert_eq!(StarboardCommand::parse(&["set", "<#42>"]).unwrap(), StarboardCommand::Set(Some(42)));
    /// assert_eq!(StarboardCommand::parse(&["set"]).unwrap(), StarboardCommand::Set(None));
    /// assert_eq!(StarboardCommand::parse(&["emoji", "<:heart:123>"]).unwrap(), StarboardCommand::Emoji("heart".into()));
    /// assert!(StarboardCommand::parse(&["minimum", "0"]).is_err());
    /// ```
    pub fn parse(args: &[&str]) -> NuguResult<Self> {
        let Some((sub, rest)) = args.split_first() else {
            return Err(invalid(USAGE).into());
        };

        let command = match sub.to_ascii_lowercase().as_str() {
            "status" => Self::Status,
            "set" => match rest.first() {
                None => Self::Set(None),
                Some(mention) => {
                    let channel = CHANNEL_MENTION
                        .captures(mention)
                        .and_then(|c| c[1].parse::<u64>().ok())
                        .ok_or_else(|| invalid(format!("'{}' is not a channel", mention)))?;
                    Self::Set(Some(channel))
                }
            },
            "minimum" => {
                let raw = rest.first().ok_or_else(|| invalid(USAGE))?;
                let minimum = raw
                    .parse::<i64>()
                    .map_err(|_| invalid(format!("'{}' is not a number", raw)))?;
                if minimum < 1 {
                    Err(ValidationError::new(ValidationErrorKind::InvalidMinimum(
                        minimum,
                    )))?
                }
                Self::Minimum(minimum as usize)
            }
            "emoji" | "emojis" => {
                let raw = rest.first().ok_or_else(|| invalid(USAGE))?;
                let name = match CUSTOM_EMOJI.captures(raw) {
                    Some(custom) => custom[1].to_string(),
                    None => raw.to_string(),
                };
                Self::Emoji(name)
            }
            "top" => {
                let page = match rest.first() {
                    Some(raw) => raw
                        .parse::<usize>()
                        .ok()
                        .filter(|p| *p > 0)
                        .ok_or_else(|| invalid(format!("'{}' is not a page", raw)))?,
                    None => 1,
                };
                Self::Top(page)
            }
            "starrers" => {
                let raw = rest.first().ok_or_else(|| invalid(USAGE))?;
                let message_id = raw
                    .parse::<u64>()
                    .map_err(|_| invalid(format!("'{}' is not a message id", raw)))?;
                Self::Starrers(message_id)
            }
            _ => Err(invalid(USAGE))?,
        };
        Ok(command)
    }

    /// Whether only moderators may run the command.
    pub fn requires_moderator(&self) -> bool {
        matches!(self, Self::Set(_) | Self::Minimum(_) | Self::Emoji(_))
    }
}

impl Starboard {
    /// Run a command for a guild and build the reply.
    #[instrument(skip(self))]
    pub async fn execute(
        &self,
        guild_id: u64,
        command: StarboardCommand,
    ) -> NuguResult<OutgoingMessage> {
        let reply = match command {
            StarboardCommand::Status => {
                let settings = self.settings(guild_id).await?;
                match settings.channel_id() {
                    Some(channel) => OutgoingMessage::text(format!(
                        "Starboard channel: <#{}>, minimum stars: {}, emoji: {}",
                        channel,
                        settings.minimum(),
                        settings.emoji().join(", ")
                    )),
                    None => OutgoingMessage::text(STATUS_NONE),
                }
            }
            StarboardCommand::Set(Some(channel)) => {
                self.set_channel(guild_id, Some(channel)).await?;
                OutgoingMessage::text(format!("Starboard channel set to <#{}>.", channel))
            }
            StarboardCommand::Set(None) => match self.set_channel(guild_id, None).await? {
                Some(_) => OutgoingMessage::text("Starboard channel removed."),
                None => OutgoingMessage::text(STATUS_NONE),
            },
            StarboardCommand::Minimum(minimum) => {
                let minimum = self.set_minimum(guild_id, minimum).await?;
                OutgoingMessage::text(format!("Starboard minimum set to {}.", minimum))
            }
            StarboardCommand::Emoji(emoji) => {
                if self.toggle_emoji(guild_id, &emoji).await? {
                    OutgoingMessage::text(format!("Added {} to the starboard emoji.", emoji))
                } else {
                    OutgoingMessage::text(format!("Removed {} from the starboard emoji.", emoji))
                }
            }
            StarboardCommand::Top(page) => {
                let pages = self.top_pages(guild_id).await?;
                if pages.is_empty() {
                    OutgoingMessage::text("No messages have been starred on this server yet.")
                } else {
                    let last = pages.len();
                    match pages.into_iter().nth(page - 1) {
                        Some(embed) => OutgoingMessage::embed(embed),
                        None => Err(invalid(format!("there are only {} pages", last)))?,
                    }
                }
            }
            StarboardCommand::Starrers(message_id) => {
                OutgoingMessage::embed(self.starrers(guild_id, message_id).await?)
            }
        };
        Ok(reply)
    }
}

const STATUS_NONE: &str = "No starboard channel is set. Use `starboard set #channel` to set one.";
