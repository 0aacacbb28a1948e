//! Guessing game history: recording, player statistics and rankings.

use crate::aggregator::GameStatsAggregator;
use crate::catalog::IdolCatalog;
use nugu_core::{Difficulty, GameGender, GameId, GameResult, GameType, IdolId};
use nugu_error::{NotFoundError, NotFoundErrorKind, NuguResult};
use nugu_interface::{GameFilter, GameResultStore};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Number of entries a ranking holds.
pub const RANKING_SIZE: usize = 50;

/// Whose games a statistic covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsScope {
    /// One player
    User(u64),
    /// Every game played in a guild
    Server(u64),
    /// Every game
    Global,
}

/// Best scores per category. `None` means no qualifying game.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighScores {
    /// Any idol game
    pub overall: Option<usize>,
    /// Idol games on easy
    pub easy: Option<usize>,
    /// Idol games on medium
    pub medium: Option<usize>,
    /// Idol games on hard
    pub hard: Option<usize>,
    /// Idol games on koreaboo
    pub koreaboo: Option<usize>,
    /// Idol games with girls only
    pub girl: Option<usize>,
    /// Idol games with boys only
    pub boy: Option<usize>,
    /// Idol games with both
    pub mixed: Option<usize>,
    /// Idol-name games of any difficulty or gender
    pub idol: Option<usize>,
    /// Group-name games of any difficulty or gender
    pub group: Option<usize>,
    /// Multi-player games
    pub multi: Option<usize>,
}

fn raise(slot: &mut Option<usize>, score: usize) {
    if slot.is_none_or(|best| score > best) {
        *slot = Some(score);
    }
}

impl HighScores {
    fn difficulty_mut(&mut self, difficulty: Difficulty) -> &mut Option<usize> {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
            Difficulty::Koreaboo => &mut self.koreaboo,
        }
    }

    fn gender_mut(&mut self, gender: GameGender) -> &mut Option<usize> {
        match gender {
            GameGender::Girl => &mut self.girl,
            GameGender::Boy => &mut self.boy,
            GameGender::Mixed => &mut self.mixed,
        }
    }

    fn game_type_mut(&mut self, game_type: GameType) -> &mut Option<usize> {
        match game_type {
            GameType::Idol => &mut self.idol,
            GameType::Group => &mut self.group,
        }
    }
}

/// Aggregated statistics of a scope.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserStats {
    /// Solo games played
    pub solo_games: usize,
    /// Multi-player games played
    pub multi_games: usize,
    /// Points scored across all counted games
    pub total_points: usize,
    /// Best scores
    pub high_scores: HighScores,
    /// Mean correct guesses per solo game, rounded
    pub average_score: Option<usize>,
    /// Share of correct solo guesses, 0 to 100
    pub correct_percentage: f64,
    /// Idol missed most often as `(group, name)`
    pub most_missed_idol: Option<(String, String)>,
    /// Group missed most often
    pub most_missed_group: Option<String>,
}

/// Correct and incorrect guesses of an idol or group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GuessStats {
    /// Correct guesses
    pub correct: usize,
    /// Incorrect guesses
    pub incorrect: usize,
}

impl GuessStats {
    /// Games counted.
    pub fn total(&self) -> usize {
        self.correct + self.incorrect
    }

    /// Share of correct guesses, 0 to 100.
    ///
    /// ```
    /// use nugu_idols::GuessStats;
    ///
    /// assert_eq!(GuessStats { correct: 3, incorrect: 1 }.percentage(), 75.0);
    /// assert_eq!(GuessStats::default().percentage(), 0.0);
    /// ```
    pub fn percentage(&self) -> f64 {
        percentage(self.correct, self.total())
    }
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Idols missed the same number of times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissedIdols {
    /// Miss count shared by the idols
    pub misses: usize,
    /// `(group, name)` pairs, sorted
    pub idols: Vec<(String, String)>,
}

/// Filters for a ranking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingQuery {
    /// Rank guilds instead of users
    pub by_server: bool,
    /// Only games of this guild (user rankings)
    pub guild_id: Option<u64>,
    /// Idol pool
    pub gender: Option<GameGender>,
    /// Difficulty
    pub difficulty: Option<Difficulty>,
    /// Solo or multi-player only (server rankings)
    pub is_multigame: Option<bool>,
}

/// One ranking line: the best game of a user or guild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingEntry {
    /// Player of the game
    pub user_id: u64,
    /// Guild of the game
    pub guild_id: u64,
    /// Correct guesses
    pub score: usize,
    /// Difficulty
    pub difficulty: Difficulty,
    /// Idol pool
    pub gender: GameGender,
    /// Whether the game was multi-player
    pub is_multigame: bool,
}

/// Guessing game statistics.
pub struct NuguStats {
    catalog: Arc<IdolCatalog>,
    games: Arc<dyn GameResultStore>,
    aggregator: Arc<GameStatsAggregator>,
}

impl std::fmt::Debug for NuguStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NuguStats").finish_non_exhaustive()
    }
}

impl NuguStats {
    /// Create a statistics service.
    pub fn new(
        catalog: Arc<IdolCatalog>,
        games: Arc<dyn GameResultStore>,
        aggregator: Arc<GameStatsAggregator>,
    ) -> Self {
        Self {
            catalog,
            games,
            aggregator,
        }
    }

    /// Store a finished game.
    ///
    /// Games without a correct guess are dropped. A multi-player game where
    /// only one player scored is stored as that player's solo game.
    #[instrument(skip(self, game), fields(user_id = game.user_id, guild_id = game.guild_id))]
    pub async fn record_game(&self, mut game: GameResult) -> NuguResult<Option<GameId>> {
        if game.correct_idols.is_empty() {
            debug!("Skipping game without correct guesses");
            return Ok(None);
        }

        if game.users_correct_guesses.len() == 1
            && let Some((player, _)) = game.users_correct_guesses.pop_first()
        {
            game.is_multigame = false;
            game.user_id = player;
        }

        let id = self.games.insert_game(&game).await?;
        if let Err(e) = self.aggregator.on_game_finished(&game).await {
            warn!(error = %e, "Failed to update idol stats for finished game");
        }
        info!(game_id = %id, score = game.score(), "Recorded game");
        Ok(Some(id))
    }

    /// Statistics of a player, a guild or everyone.
    ///
    /// For a single player, multi-player games only add the player's own
    /// points and their best multi score; every other figure comes from
    /// solo games.
    #[instrument(skip(self))]
    pub async fn user_stats(&self, scope: StatsScope) -> NuguResult<UserStats> {
        let filter = match scope {
            StatsScope::User(user_id) => GameFilter::default().with_player(user_id),
            StatsScope::Server(guild_id) => GameFilter::default().with_guild_id(guild_id),
            StatsScope::Global => GameFilter::default(),
        };
        let games = self.games.find_games(&filter).await?;

        let mut stats = UserStats::default();
        let mut solo_correct = 0;
        let mut solo_incorrect = 0;
        let mut missed: Vec<&IdolId> = Vec::new();

        for game in &games {
            let score = game.score();
            if game.is_multigame {
                stats.multi_games += 1;
                if let StatsScope::User(user_id) = scope {
                    let points = game
                        .users_correct_guesses
                        .get(&user_id)
                        .map_or(0, Vec::len);
                    stats.total_points += points;
                    raise(&mut stats.high_scores.multi, points);
                    continue;
                }
                raise(&mut stats.high_scores.multi, score);
            } else {
                stats.solo_games += 1;
                solo_correct += game.correct_idols.len();
                solo_incorrect += game.incorrect_idols.len();
            }

            stats.total_points += score;
            if game.game_type == GameType::Idol {
                raise(&mut stats.high_scores.overall, score);
                raise(stats.high_scores.difficulty_mut(game.difficulty), score);
                raise(stats.high_scores.gender_mut(game.gender), score);
            }
            raise(stats.high_scores.game_type_mut(game.game_type), score);
            missed.extend(&game.incorrect_idols);
        }

        stats.correct_percentage = percentage(solo_correct, solo_correct + solo_incorrect);
        if stats.solo_games > 0 {
            stats.average_score =
                Some((solo_correct as f64 / stats.solo_games as f64).round() as usize);
        }

        let mut idol_misses: BTreeMap<(String, String), usize> = BTreeMap::new();
        let mut group_misses: BTreeMap<String, usize> = BTreeMap::new();
        for id in missed {
            if let Some(idol) = self.catalog.find_by_id(id).await {
                *group_misses.entry(idol.group_name.clone()).or_default() += 1;
                *idol_misses.entry((idol.group_name, idol.name)).or_default() += 1;
            }
        }
        stats.most_missed_idol = most_frequent(idol_misses);
        stats.most_missed_group = most_frequent(group_misses);

        debug!(games = games.len(), "Compiled player stats");
        Ok(stats)
    }

    /// Guess counts of one idol.
    ///
    /// A game counts as incorrect once per time the idol was missed,
    /// otherwise as one correct guess.
    #[instrument(skip(self))]
    pub async fn idol_stats(&self, id: &IdolId) -> NuguResult<GuessStats> {
        let games = self
            .games
            .find_games(&GameFilter::default().with_idols(vec![id.clone()]))
            .await?;

        let mut stats = GuessStats::default();
        for game in games
            .iter()
            .filter(|g| g.correct_idols.contains(id) || g.incorrect_idols.contains(id))
        {
            let misses = game.incorrect_idols.iter().filter(|i| *i == id).count();
            if misses > 0 {
                stats.incorrect += misses;
            } else {
                stats.correct += 1;
            }
        }
        Ok(stats)
    }

    /// Guess counts summed over every idol of a group.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when no active group matches.
    #[instrument(skip(self))]
    pub async fn group_stats(&self, group: &str) -> NuguResult<(String, GuessStats)> {
        let Some(canonical) = self.catalog.match_group(group, true).await else {
            return Err(NotFoundError::new(NotFoundErrorKind::Group(group.to_string())).into());
        };
        let members: Vec<IdolId> = self
            .catalog
            .all()
            .await
            .into_iter()
            .filter(|i| i.group_name == canonical)
            .map(|i| i.id)
            .collect();

        let games = self
            .games
            .find_games(&GameFilter::default().with_idols(members.clone()))
            .await?;

        let mut stats = GuessStats::default();
        for id in &members {
            for game in &games {
                if game.incorrect_idols.contains(id) {
                    stats.incorrect += 1;
                    continue;
                }
                stats.correct += game.correct_idols.iter().filter(|i| *i == id).count();
            }
        }
        Ok((canonical, stats))
    }

    /// Missed idols grouped by miss count, most missed first.
    ///
    /// A player's scope covers only their solo games.
    #[instrument(skip(self))]
    pub async fn missed_idols(&self, scope: StatsScope) -> NuguResult<Vec<MissedIdols>> {
        let filter = match scope {
            StatsScope::User(user_id) => GameFilter::default()
                .with_user_id(user_id)
                .with_is_multigame(false),
            StatsScope::Server(guild_id) => GameFilter::default().with_guild_id(guild_id),
            StatsScope::Global => GameFilter::default(),
        };
        let games = self.games.find_games(&filter).await?;

        let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();
        for id in games.iter().flat_map(|g| &g.incorrect_idols) {
            if let Some(idol) = self.catalog.find_by_id(id).await {
                *counts.entry((idol.group_name, idol.name)).or_default() += 1;
            }
        }

        let mut grouped: BTreeMap<usize, Vec<(String, String)>> = BTreeMap::new();
        for (idol, misses) in counts {
            grouped.entry(misses).or_default().push(idol);
        }
        Ok(grouped
            .into_iter()
            .rev()
            .map(|(misses, idols)| MissedIdols { misses, idols })
            .collect())
    }

    /// Best idol-game score of each user or guild, highest first.
    ///
    /// User rankings only count solo games.
    #[instrument(skip(self))]
    pub async fn ranking(&self, query: RankingQuery) -> NuguResult<Vec<RankingEntry>> {
        let mut filter = GameFilter::default().with_game_type(GameType::Idol);
        filter.gender = query.gender;
        filter.difficulty = query.difficulty;
        if query.by_server {
            filter.is_multigame = query.is_multigame;
        } else {
            filter.is_multigame = Some(false);
            filter.guild_id = query.guild_id;
        }

        let mut games = self.games.find_games(&filter).await?;
        games.sort_by(|a, b| b.score().cmp(&a.score()));

        let mut seen = HashSet::new();
        let mut ranking = Vec::new();
        for game in games {
            let key = if query.by_server {
                game.guild_id
            } else {
                game.user_id
            };
            if !seen.insert(key) {
                continue;
            }
            ranking.push(RankingEntry {
                user_id: game.user_id,
                guild_id: game.guild_id,
                score: game.score(),
                difficulty: game.difficulty,
                gender: game.gender,
                is_multigame: game.is_multigame,
            });
            if ranking.len() >= RANKING_SIZE {
                break;
            }
        }
        Ok(ranking)
    }
}

/// Key with the highest count; the first in key order wins ties.
fn most_frequent<K>(counts: BTreeMap<K, usize>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in counts {
        if best.as_ref().is_none_or(|(_, top)| count > *top) {
            best = Some((key, count));
        }
    }
    best.map(|(key, _)| key)
}
