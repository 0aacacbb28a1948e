//! Discord integration over serenity.
//!
//! [`DiscordPlatform`] implements the platform-neutral chat interface over
//! serenity's HTTP client. [`NuguHandler`] receives gateway events and hands
//! them to the [`CommandRouter`](crate::CommandRouter); [`NuguBot`] owns the
//! gateway connection.

mod client;
mod conversions;
mod handler;
mod platform;

pub use client::NuguBot;
pub use handler::NuguHandler;
pub use platform::DiscordPlatform;
