//! Component wiring for the bot commands.

use crate::config::{BotConfig, DatabaseConfig};
use nugu_cache::MemoryCache;
use nugu_database::MemoryStore;
use nugu_error::NuguResult;
use nugu_idols::{
    GameStatsAggregator, HttpImageFetcher, IdolCatalog, NuguStats, SuggestionQueue,
};
use nugu_imaging::{DifferenceHasher, ImageHasher};
use nugu_interface::{
    GameResultStore, IdolStore, ObjectStorage, StarboardStore, SuggestionStore,
};
use nugu_social::{CommandRouter, DiscordPlatform, NuguBot};
use nugu_starboard::Starboard;
use nugu_storage::FileSystemStorage;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

/// Timeout for downloading suggested pictures.
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Handles to every document collection, all served by one backend.
#[derive(Clone)]
pub struct Stores {
    /// Idols
    pub idols: Arc<dyn IdolStore>,
    /// Pending and resolved suggestions
    pub suggestions: Arc<dyn SuggestionStore>,
    /// Starboard entries and guild settings
    pub starboard: Arc<dyn StarboardStore>,
    /// Finished games
    pub games: Arc<dyn GameResultStore>,
}

impl std::fmt::Debug for Stores {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stores").finish_non_exhaustive()
    }
}

impl Stores {
    /// Use one backend for every collection.
    pub fn from_backend<S>(store: Arc<S>) -> Self
    where
        S: IdolStore + SuggestionStore + StarboardStore + GameResultStore + 'static,
    {
        Self {
            idols: store.clone(),
            suggestions: store.clone(),
            starboard: store.clone(),
            games: store,
        }
    }

    /// In-memory collections.
    pub fn memory() -> Self {
        Self::from_backend(Arc::new(MemoryStore::new()))
    }

    /// Open the configured backend.
    ///
    /// # Errors
    ///
    /// Returns a store error if PostgreSQL is configured but unreachable or
    /// its migrations fail.
    #[instrument]
    pub async fn open(config: &DatabaseConfig) -> NuguResult<Self> {
        match config.url() {
            Some(url) => Self::connect(url, *config.pool_size()).await,
            None => {
                warn!("No database configured; data is kept in memory only");
                Ok(Self::memory())
            }
        }
    }

    #[cfg(feature = "postgres")]
    async fn connect(url: &str, pool_size: u32) -> NuguResult<Self> {
        let store = nugu_database::PgStore::connect(url, pool_size)?;
        store.migrate().await?;
        info!("Database migrations applied");
        Ok(Self::from_backend(Arc::new(store)))
    }

    #[cfg(not(feature = "postgres"))]
    async fn connect(_url: &str, _pool_size: u32) -> NuguResult<Self> {
        warn!("Built without the postgres feature; data is kept in memory only");
        Ok(Self::memory())
    }
}

/// Catalog over `stores` and the configured picture directory.
///
/// # Errors
///
/// Returns an error if the storage directory cannot be created or the idols
/// cannot be loaded.
pub async fn open_catalog(
    config: &BotConfig,
    stores: &Stores,
    objects: Arc<dyn ObjectStorage>,
    skip_cache: bool,
) -> NuguResult<Arc<IdolCatalog>> {
    let catalog = Arc::new(IdolCatalog::new(
        stores.idols.clone(),
        stores.games.clone(),
        Arc::new(MemoryCache::default()),
        objects,
        Arc::new(DifferenceHasher),
        config.catalog().clone(),
    ));
    let count = catalog.load_all(skip_cache).await?;
    info!(count, "Idol catalog loaded");
    Ok(catalog)
}

/// Recompute every idol's game counters and return how many were updated.
///
/// # Errors
///
/// Returns an error if the stores cannot be opened or a write fails.
#[instrument(skip(config))]
pub async fn refresh_stats(config: &BotConfig) -> NuguResult<usize> {
    let stores = Stores::open(config.database()).await?;
    recompute_stats(config, &stores).await
}

/// [`refresh_stats`] over already opened stores.
///
/// # Errors
///
/// Returns an error if the picture directory cannot be created or a store
/// operation fails.
pub async fn recompute_stats(config: &BotConfig, stores: &Stores) -> NuguResult<usize> {
    let objects: Arc<dyn ObjectStorage> =
        Arc::new(FileSystemStorage::new(config.storage().base_path().clone())?);
    let catalog = open_catalog(config, stores, objects, true).await?;

    let aggregator = GameStatsAggregator::new(catalog, stores.games.clone());
    let updated = aggregator.recompute_all().await?;
    info!(updated, "Idol statistics recomputed");
    Ok(updated)
}

/// Connect to Discord and serve commands until the gateway connection ends.
///
/// # Errors
///
/// Returns an error if the token is missing, a backend cannot be opened, or
/// the gateway connection fails.
#[instrument(skip(config))]
pub async fn run_bot(config: &BotConfig) -> NuguResult<()> {
    let token = config.discord().require_token()?;
    let stores = Stores::open(config.database()).await?;
    let objects: Arc<dyn ObjectStorage> =
        Arc::new(FileSystemStorage::new(config.storage().base_path().clone())?);
    let hasher: Arc<dyn ImageHasher> = Arc::new(DifferenceHasher);
    let catalog = open_catalog(config, &stores, objects.clone(), false).await?;

    let platform = Arc::new(DiscordPlatform::connect(token).await?);
    let queue = Arc::new(SuggestionQueue::new(
        catalog.clone(),
        stores.suggestions.clone(),
        objects,
        platform.clone(),
        Arc::new(HttpImageFetcher::new(FETCH_TIMEOUT)?),
        hasher,
        config.suggestion_config(),
    ));
    if *config.suggestions().channel_id() == 0 {
        warn!("No suggestion channel configured; moderation is unavailable");
    } else {
        let pending = queue.initialise().await?;
        info!(pending, "Suggestion channel ready");
    }

    let aggregator = Arc::new(GameStatsAggregator::new(
        catalog.clone(),
        stores.games.clone(),
    ));
    let stats = Arc::new(NuguStats::new(
        catalog.clone(),
        stores.games.clone(),
        aggregator,
    ));
    let starboard = Arc::new(Starboard::new(
        stores.starboard.clone(),
        platform.clone(),
        config.starboard().clone(),
    ));
    let router = Arc::new(CommandRouter::new(
        platform.clone(),
        catalog,
        queue,
        stats,
        starboard,
    ));

    let mut bot = NuguBot::new(token, platform, router).await?;
    bot.start().await
}
