//! In-memory implementation of every store trait.

use async_trait::async_trait;
use nugu_core::{
    GameId, GameResult, Idol, IdolId, StarboardEntry, StarboardSettings, Suggestion, SuggestionId,
    SuggestionStatus,
};
use nugu_error::NuguResult;
use nugu_interface::{GameFilter, GameResultStore, IdolStore, StarboardStore, SuggestionStore};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Collections {
    idols: Vec<Idol>,
    suggestions: Vec<Suggestion>,
    starboard: HashMap<(u64, u64), StarboardEntry>,
    settings: HashMap<u64, StarboardSettings>,
    games: Vec<GameResult>,
}

/// In-memory document store.
///
/// Each collection lives behind a single RwLock. Vectors keep insertion
/// order so listings are deterministic. All data is lost when the last
/// clone is dropped.
///
/// Game id rewrites touch one slot per record per call, like a positional
/// array update in a document database, so callers must loop until a pass
/// reports zero changes.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored idols (for testing).
    pub async fn idol_count(&self) -> usize {
        self.inner.read().await.idols.len()
    }

    /// Number of stored games (for testing).
    pub async fn game_count(&self) -> usize {
        self.inner.read().await.games.len()
    }

    /// Every stored suggestion regardless of status (for testing).
    pub async fn all_suggestions(&self) -> Vec<Suggestion> {
        self.inner.read().await.suggestions.clone()
    }
}

#[async_trait]
impl IdolStore for MemoryStore {
    async fn list_idols(&self) -> NuguResult<Vec<Idol>> {
        Ok(self.inner.read().await.idols.clone())
    }

    async fn find_idol(&self, id: &IdolId) -> NuguResult<Option<Idol>> {
        Ok(self
            .inner
            .read()
            .await
            .idols
            .iter()
            .find(|i| &i.id == id)
            .cloned())
    }

    async fn find_idol_by_name(&self, group_name: &str, name: &str) -> NuguResult<Option<Idol>> {
        Ok(self
            .inner
            .read()
            .await
            .idols
            .iter()
            .find(|i| i.group_name == group_name && i.name == name)
            .cloned())
    }

    async fn insert_idol(&self, idol: &Idol) -> NuguResult<IdolId> {
        let id = IdolId::generate();
        let mut stored = idol.clone();
        stored.id = id.clone();
        for image in &mut stored.images {
            image.bytes = None;
        }
        self.inner.write().await.idols.push(stored);
        tracing::debug!(idol_id = %id, "Inserted idol");
        Ok(id)
    }

    async fn upsert_idol(&self, idol: &Idol) -> NuguResult<()> {
        let mut stored = idol.clone();
        for image in &mut stored.images {
            image.bytes = None;
        }
        let mut inner = self.inner.write().await;
        match inner.idols.iter_mut().find(|i| i.id == idol.id) {
            Some(existing) => *existing = stored,
            None => inner.idols.push(stored),
        }
        Ok(())
    }

    async fn delete_idol(&self, id: &IdolId) -> NuguResult<()> {
        self.inner.write().await.idols.retain(|i| &i.id != id);
        Ok(())
    }
}

#[async_trait]
impl SuggestionStore for MemoryStore {
    async fn pending_suggestions(&self) -> NuguResult<Vec<Suggestion>> {
        Ok(self
            .inner
            .read()
            .await
            .suggestions
            .iter()
            .filter(|s| s.status == SuggestionStatus::Pending)
            .cloned()
            .collect())
    }

    async fn find_suggestion(&self, id: &SuggestionId) -> NuguResult<Option<Suggestion>> {
        Ok(self
            .inner
            .read()
            .await
            .suggestions
            .iter()
            .find(|s| &s.id == id)
            .cloned())
    }

    async fn insert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<SuggestionId> {
        let id = SuggestionId::generate();
        let mut stored = suggestion.clone();
        stored.id = id.clone();
        self.inner.write().await.suggestions.push(stored);
        Ok(id)
    }

    async fn upsert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<()> {
        let mut inner = self.inner.write().await;
        match inner.suggestions.iter_mut().find(|s| s.id == suggestion.id) {
            Some(existing) => *existing = suggestion.clone(),
            None => inner.suggestions.push(suggestion.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl StarboardStore for MemoryStore {
    async fn find_entry(
        &self,
        guild_id: u64,
        message_id: u64,
    ) -> NuguResult<Option<StarboardEntry>> {
        Ok(self
            .inner
            .read()
            .await
            .starboard
            .get(&(guild_id, message_id))
            .cloned())
    }

    async fn upsert_entry(&self, entry: &StarboardEntry) -> NuguResult<()> {
        self.inner
            .write()
            .await
            .starboard
            .insert((entry.guild_id, entry.message_id), entry.clone());
        Ok(())
    }

    async fn delete_entry(&self, guild_id: u64, message_id: u64) -> NuguResult<()> {
        self.inner
            .write()
            .await
            .starboard
            .remove(&(guild_id, message_id));
        Ok(())
    }

    async fn entries_for_guild(&self, guild_id: u64) -> NuguResult<Vec<StarboardEntry>> {
        let mut entries: Vec<StarboardEntry> = self
            .inner
            .read()
            .await
            .starboard
            .values()
            .filter(|e| e.guild_id == guild_id)
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.message_id);
        Ok(entries)
    }

    async fn settings(&self, guild_id: u64) -> NuguResult<StarboardSettings> {
        Ok(self
            .inner
            .read()
            .await
            .settings
            .get(&guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_settings(&self, guild_id: u64, settings: &StarboardSettings) -> NuguResult<()> {
        self.inner
            .write()
            .await
            .settings
            .insert(guild_id, settings.clone());
        Ok(())
    }
}

#[async_trait]
impl GameResultStore for MemoryStore {
    async fn insert_game(&self, game: &GameResult) -> NuguResult<GameId> {
        let id = GameId::generate();
        let mut stored = game.clone();
        stored.id = id.clone();
        self.inner.write().await.games.push(stored);
        Ok(id)
    }

    async fn find_games(&self, filter: &GameFilter) -> NuguResult<Vec<GameResult>> {
        Ok(self
            .inner
            .read()
            .await
            .games
            .iter()
            .filter(|g| filter.matches(g))
            .cloned()
            .collect())
    }

    async fn replace_idol_id(&self, from: &IdolId, to: &IdolId) -> NuguResult<u64> {
        let mut inner = self.inner.write().await;
        let changed = inner
            .games
            .iter_mut()
            .map(|g| g.replace_idol_once(from, to))
            .filter(|changed| *changed)
            .count() as u64;
        tracing::debug!(from = %from, to = %to, changed, "Rewrote game references");
        Ok(changed)
    }
}
