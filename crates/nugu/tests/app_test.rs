//! Tests for component wiring.

use nugu::{BotConfig, DatabaseConfig, Stores, StorageConfig, recompute_stats, run_bot};
use nugu_core::{GameResult, Gender, Idol, IdolImage};
use nugu_error::NuguErrorKind;
use nugu_interface::{GameFilter, GameResultStore, IdolStore};
use std::sync::Arc;

fn config_in(dir: &tempfile::TempDir) -> BotConfig {
    BotConfig::default()
        .with_storage(StorageConfig::default().with_base_path(dir.path().join("images")))
}

#[tokio::test]
async fn test_memory_stores_without_url() {
    let stores = Stores::open(&DatabaseConfig::default()).await.unwrap();

    let games = stores.games.find_games(&GameFilter::default()).await.unwrap();
    assert!(games.is_empty());
    assert!(stores.idols.list_idols().await.unwrap().is_empty());
}

#[cfg(not(feature = "postgres"))]
#[tokio::test]
async fn test_database_url_needs_postgres_feature() {
    let config =
        DatabaseConfig::default().with_url(Some("postgres://localhost/nugu".to_string()));

    let stores = Stores::open(&config).await.unwrap();

    assert!(stores.idols.list_idols().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_recompute_stats_from_history() {
    let dir = tempfile::tempdir().unwrap();
    let stores = Stores::memory();

    let mut nayeon = Idol::new("Nayeon", "TWICE", Gender::Girl);
    nayeon.images = vec![IdolImage::new("nayeon-1", "0000000000000000")];
    let mut momo = Idol::new("Momo", "TWICE", Gender::Girl);
    momo.images = vec![IdolImage::new("momo-1", "ffffffffffffffff")];
    stores.idols.upsert_idol(&nayeon).await.unwrap();
    stores.idols.upsert_idol(&momo).await.unwrap();

    let mut game = GameResult::new(5, 1);
    game.game_winner = Some(nayeon.id.clone());
    game.round_winners = vec![nayeon.id.clone()];
    game.correct_idols = vec![nayeon.id.clone()];
    stores.games.insert_game(&game).await.unwrap();

    let updated = recompute_stats(&config_in(&dir), &stores).await.unwrap();
    assert_eq!(updated, 1);

    let stored = stores.idols.find_idol(&nayeon.id).await.unwrap().unwrap();
    assert_eq!(stored.stats.games, 1);
    assert_eq!(stored.stats.game_wins, 1);
    assert_eq!(stored.stats.round_wins, 1);

    // Nothing changed since the last pass
    let again = recompute_stats(&config_in(&dir), &stores).await.unwrap();
    assert_eq!(again, 0);
}

#[tokio::test]
async fn test_shared_backend() {
    let backend = Arc::new(nugu_database::MemoryStore::new());
    let stores = Stores::from_backend(backend.clone());

    let idol = Idol::new("Yeji", "ITZY", Gender::Girl);
    stores.idols.upsert_idol(&idol).await.unwrap();

    assert_eq!(backend.idol_count().await, 1);
}

#[tokio::test]
async fn test_run_without_token_fails_fast() {
    let dir = tempfile::tempdir().unwrap();

    let err = run_bot(&config_in(&dir)).await.unwrap_err();

    assert!(matches!(err.kind(), NuguErrorKind::Config(_)));
}
