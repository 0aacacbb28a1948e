//! Finished game records.

use crate::{GameId, IdolId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What players had to guess.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameType {
    /// Guess the idol's name
    #[default]
    Idol,
    /// Guess the idol's group
    Group,
}

/// Which idols a game drew from.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum GameGender {
    /// Only female idols
    Girl,
    /// Only male idols
    Boy,
    /// Both
    #[default]
    Mixed,
}

/// Game difficulty.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Easy
    Easy,
    /// Medium
    #[default]
    Medium,
    /// Hard
    Hard,
    /// Hardest
    Koreaboo,
}

/// A completed game.
///
/// Bias games fill the winner and round lists; guessing games fill the
/// correct and incorrect lists. Records are append-only except when an idol
/// merge rewrites ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    /// Store-assigned identifier
    pub id: GameId,
    /// Player (solo games) or starter (multi-player games)
    pub user_id: u64,
    /// Guild the game ran in
    pub guild_id: u64,
    /// Overall winner
    #[serde(default)]
    pub game_winner: Option<IdolId>,
    /// Idols that won a round, one entry per round
    #[serde(default)]
    pub round_winners: Vec<IdolId>,
    /// Idols that lost a round, one entry per round
    #[serde(default)]
    pub round_losers: Vec<IdolId>,
    /// Idols guessed correctly
    #[serde(default)]
    pub correct_idols: Vec<IdolId>,
    /// Idols guessed wrong
    #[serde(default)]
    pub incorrect_idols: Vec<IdolId>,
    /// Per-player correct guesses in multi-player games
    #[serde(default)]
    pub users_correct_guesses: BTreeMap<u64, Vec<IdolId>>,
    /// What was guessed
    #[serde(default)]
    pub game_type: GameType,
    /// Idol pool
    #[serde(default)]
    pub gender: GameGender,
    /// Difficulty
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Whether several players took part
    #[serde(default)]
    pub is_multigame: bool,
    /// When the game finished
    pub finished_at: DateTime<Utc>,
}

impl GameResult {
    /// An empty game for `user_id` in `guild_id`.
    pub fn new(user_id: u64, guild_id: u64) -> Self {
        Self {
            id: GameId::generate(),
            user_id,
            guild_id,
            game_winner: None,
            round_winners: Vec::new(),
            round_losers: Vec::new(),
            correct_idols: Vec::new(),
            incorrect_idols: Vec::new(),
            users_correct_guesses: BTreeMap::new(),
            game_type: GameType::default(),
            gender: GameGender::default(),
            difficulty: Difficulty::default(),
            is_multigame: false,
            finished_at: Utc::now(),
        }
    }

    /// Score of the game, one point per correct guess.
    pub fn score(&self) -> usize {
        self.correct_idols.len()
    }

    /// Whether `id` appears as winner, round winner or round loser.
    pub fn references_in_rounds(&self, id: &IdolId) -> bool {
        self.game_winner.as_ref() == Some(id)
            || self.round_winners.contains(id)
            || self.round_losers.contains(id)
    }

    /// Whether `id` appears anywhere in the record.
    pub fn references(&self, id: &IdolId) -> bool {
        self.references_in_rounds(id)
            || self.correct_idols.contains(id)
            || self.incorrect_idols.contains(id)
            || self.users_correct_guesses.values().any(|v| v.contains(id))
    }

    /// Replace every reference to `from` with `to`, returning how many slots changed.
    ///
    /// ```
    /// use nugu_core::{GameResult, IdolId};
    ///
    /// let old = IdolId::from("old");
    /// let new = IdolId::from("new");
    /// let mut game = GameResult::new(1, 2);
    /// game.round_winners = vec![old.clone(), old.clone()];
    /// game.game_winner = Some(old.clone());
    ///
    /// assert_eq!(game.replace_idol(&old, &new), 3);
    /// assert!(!game.references(&old));
    /// assert_eq!(game.replace_idol(&old, &new), 0);
    /// ```
    pub fn replace_idol(&mut self, from: &IdolId, to: &IdolId) -> usize {
        let mut changed = 0;
        if self.game_winner.as_ref() == Some(from) {
            self.game_winner = Some(to.clone());
            changed += 1;
        }
        let lists = [
            &mut self.round_winners,
            &mut self.round_losers,
            &mut self.correct_idols,
            &mut self.incorrect_idols,
        ];
        for list in lists.into_iter().chain(self.users_correct_guesses.values_mut()) {
            for slot in list.iter_mut().filter(|slot| *slot == from) {
                *slot = to.clone();
                changed += 1;
            }
        }
        changed
    }

    /// Replace the first reference to `from` with `to`, mirroring a
    /// positional update that touches one array slot per statement.
    pub fn replace_idol_once(&mut self, from: &IdolId, to: &IdolId) -> bool {
        if self.game_winner.as_ref() == Some(from) {
            self.game_winner = Some(to.clone());
            return true;
        }
        let lists = [
            &mut self.round_winners,
            &mut self.round_losers,
            &mut self.correct_idols,
            &mut self.incorrect_idols,
        ];
        for list in lists.into_iter().chain(self.users_correct_guesses.values_mut()) {
            if let Some(slot) = list.iter_mut().find(|slot| *slot == from) {
                *slot = to.clone();
                return true;
            }
        }
        false
    }
}
