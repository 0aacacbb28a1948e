//! Discord client setup and lifecycle.

use super::conversions::api_error;
use super::handler::NuguHandler;
use super::platform::DiscordPlatform;
use crate::router::CommandRouter;
use nugu_error::NuguResult;
use serenity::Client;
use std::sync::Arc;
use tracing::{info, instrument};

/// Gateway connection of the nugu bot.
///
/// ```no_run
/// # async fn run(
/// #     platform: std::sync::Arc<nugu_social::DiscordPlatform>,
/// #     router: std::sync::Arc<nugu_social::CommandRouter>,
/// # ) -> nugu_error::NuguResult<()> {
/// use nugu_social::NuguBot;
///
/// let token = std::env::var("DISCORD_TOKEN").unwrap_or_default();
/// let mut bot = NuguBot::new(&token, platform, router).await?;
/// bot.start().await?;
/// # Ok(())
/// # }
/// ```
pub struct NuguBot {
    client: Client,
}

impl NuguBot {
    /// Build the serenity client with the nugu event handler.
    ///
    /// # Errors
    ///
    /// Returns a platform error if the client cannot be built.
    #[instrument(skip_all, fields(token_len = token.len()))]
    pub async fn new(
        token: &str,
        platform: Arc<DiscordPlatform>,
        router: Arc<CommandRouter>,
    ) -> NuguResult<Self> {
        let intents = NuguHandler::intents();
        info!(?intents, "Building Discord client");

        let client = Client::builder(token, intents)
            .event_handler(NuguHandler::new(platform, router))
            .await
            .map_err(api_error)?;
        Ok(Self { client })
    }

    /// Connect to the gateway. Runs until the connection ends.
    ///
    /// # Errors
    ///
    /// Returns a platform error when the gateway connection fails.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> NuguResult<()> {
        info!("Starting Discord bot");
        self.client.start().await.map_err(api_error)?;
        Ok(())
    }
}
