//! Idol catalog, suggestion moderation and game statistics.
//!
//! [`IdolCatalog`] owns the in-memory idol set and writes every change
//! through to the store and the snapshot cache. [`SuggestionQueue`] runs the
//! moderation channel where user pictures are approved into the catalog.
//! [`GameStatsAggregator`] and [`NuguStats`] derive counters, player
//! statistics and rankings from recorded games.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod aggregator;
mod catalog;
mod fetcher;
mod nugu_stats;
mod suggestion_ui;
mod suggestions;

pub use aggregator::GameStatsAggregator;
pub use catalog::{
    ALL_IDOLS_CACHE_KEY, CatalogConfig, CatalogSummary, IdolCatalog, IdolMatch, SimilarImage,
};
pub use fetcher::HttpImageFetcher;
pub use nugu_stats::{
    GuessStats, HighScores, MissedIdols, NuguStats, RANKING_SIZE, RankingEntry, RankingQuery,
    StatsScope, UserStats,
};
pub use suggestion_ui::{
    APPROVE_EMOJI, DENY_EMOJI, REASON_EMOJI, SUGGESTION_COLOR, SUGGESTION_IMAGE_NAME,
    empty_queue_embed, help_message, queue_count_message, similar_images_embed, suggestion_embed,
};
pub use suggestions::{
    DENIAL_REASONS, Resolution, SuggestionConfig, SuggestionQueue, SuggestionRequest,
    denial_reason,
};
