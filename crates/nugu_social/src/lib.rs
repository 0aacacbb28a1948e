//! Chat front end of the nugu bot.
//!
//! [`CommandRouter`] turns chat events into calls on the idol catalog,
//! suggestion queue, statistics and starboard, and answers in the channel.
//! It only depends on the platform-neutral
//! [`ChatPlatform`](nugu_interface::ChatPlatform) so it can be driven by any
//! client; the `discord` feature provides the serenity implementation.
//!
//! # Commands
//!
//! - `suggest {boy|girl} {group} {name} {url}` and `s-edit {field} {value}`
//! - `idol list`, `idol images`, and the moderator-only `idol group`,
//!   `idol rename`, `idol image delete` and `idol image move`
//! - `nugu stats`, `nugu idol`, `nugu group`, `nugu missed`, `nugu ranking`
//! - `starboard` / `sb` with `status`, `set`, `minimum`, `emoji`, `top`,
//!   `starrers`

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod commands;
mod replies;
mod router;

#[cfg(feature = "discord")]
mod discord;

pub use commands::{BotCommand, IdolAdmin, StatsQuery, StatsTarget};
pub use replies::{
    GUILD_ONLY, MESSAGE_LIMIT, MODERATOR_ONLY, STATS_COLOR, catalog_summary_text, chunk_lines,
    guess_stats_text, missed_text, ranking_embed, user_stats_embed,
};
pub use router::CommandRouter;

#[cfg(feature = "discord")]
pub use discord::{DiscordPlatform, NuguBot, NuguHandler};
