//! Derives idol win/loss counters from bias game history.

use crate::catalog::IdolCatalog;
use nugu_core::{GameResult, IdolId, IdolStats};
use nugu_error::NuguResult;
use nugu_interface::{GameFilter, GameResultStore};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};

/// Add one game's contribution to the per-idol counters.
///
/// An idol counts one game however many rounds it played.
fn tally(game: &GameResult, totals: &mut HashMap<IdolId, IdolStats>) {
    let present: BTreeSet<&IdolId> = game
        .game_winner
        .iter()
        .chain(&game.round_winners)
        .chain(&game.round_losers)
        .collect();

    for id in present {
        let stats = totals.entry(id.clone()).or_default();
        stats.games += 1;
        if game.game_winner.as_ref() == Some(id) {
            stats.game_wins += 1;
        }
    }
    for id in &game.round_winners {
        let stats = totals.entry(id.clone()).or_default();
        stats.rounds += 1;
        stats.round_wins += 1;
    }
    for id in &game.round_losers {
        totals.entry(id.clone()).or_default().rounds += 1;
    }
}

/// Keeps [`IdolStats`] in step with recorded games.
pub struct GameStatsAggregator {
    catalog: Arc<IdolCatalog>,
    games: Arc<dyn GameResultStore>,
}

impl std::fmt::Debug for GameStatsAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameStatsAggregator").finish_non_exhaustive()
    }
}

impl GameStatsAggregator {
    /// Create an aggregator writing through `catalog`.
    pub fn new(catalog: Arc<IdolCatalog>, games: Arc<dyn GameResultStore>) -> Self {
        Self { catalog, games }
    }

    /// Recompute one idol's counters from every game referencing it.
    #[instrument(skip(self), fields(idol_id = %id))]
    pub async fn recompute_for_idol(&self, id: &IdolId) -> NuguResult<IdolStats> {
        let games = self
            .games
            .find_games(&GameFilter::default().with_idols(vec![id.clone()]))
            .await?;

        let mut totals = HashMap::new();
        for game in games.iter().filter(|g| g.references_in_rounds(id)) {
            tally(game, &mut totals);
        }
        let stats = totals.remove(id).unwrap_or_default();

        self.catalog
            .update_stats(|idol| (&idol.id == id).then_some(stats))
            .await?;
        Ok(stats)
    }

    /// Recompute every idol in one pass over the history.
    ///
    /// Only idols whose counters changed are written. Returns that count.
    #[instrument(skip(self))]
    pub async fn recompute_all(&self) -> NuguResult<usize> {
        let games = self.games.find_games(&GameFilter::default()).await?;

        let mut totals = HashMap::new();
        for game in &games {
            tally(game, &mut totals);
        }

        let updated = self
            .catalog
            .update_stats(|idol| {
                let stats = totals.get(&idol.id).copied().unwrap_or_default();
                (stats != idol.stats).then_some(stats)
            })
            .await?;
        info!(games = games.len(), updated, "Recomputed idol stats");
        Ok(updated)
    }

    /// Apply a just-finished game incrementally.
    #[instrument(skip(self, game), fields(game_id = %game.id))]
    pub async fn on_game_finished(&self, game: &GameResult) -> NuguResult<usize> {
        let mut deltas = HashMap::new();
        tally(game, &mut deltas);
        if deltas.is_empty() {
            return Ok(0);
        }

        self.catalog
            .update_stats(|idol| {
                deltas.get(&idol.id).map(|delta| IdolStats {
                    games: idol.stats.games + delta.games,
                    game_wins: idol.stats.game_wins + delta.game_wins,
                    rounds: idol.stats.rounds + delta.rounds,
                    round_wins: idol.stats.round_wins + delta.round_wins,
                })
            })
            .await
    }
}
