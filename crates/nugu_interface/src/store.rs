//! Document store traits.
//!
//! One trait per collection. Implementations decide how records are laid
//! out; callers only rely on the operations below.

use nugu_core::{
    Difficulty, GameGender, GameId, GameResult, GameType, Idol, IdolId, StarboardEntry,
    StarboardSettings, Suggestion, SuggestionId,
};
use nugu_error::NuguResult;

/// Durable idol records.
#[async_trait::async_trait]
pub trait IdolStore: Send + Sync {
    /// Every idol, in insertion order.
    async fn list_idols(&self) -> NuguResult<Vec<Idol>>;

    /// Idol by id.
    async fn find_idol(&self, id: &IdolId) -> NuguResult<Option<Idol>>;

    /// Idol whose name and group equal the arguments exactly.
    async fn find_idol_by_name(&self, group_name: &str, name: &str) -> NuguResult<Option<Idol>>;

    /// Insert a new idol and return its id.
    async fn insert_idol(&self, idol: &Idol) -> NuguResult<IdolId>;

    /// Insert or replace the idol with `idol.id`.
    async fn upsert_idol(&self, idol: &Idol) -> NuguResult<()>;

    /// Remove an idol record.
    async fn delete_idol(&self, id: &IdolId) -> NuguResult<()>;
}

/// Durable suggestion records.
#[async_trait::async_trait]
pub trait SuggestionStore: Send + Sync {
    /// Suggestions still pending, oldest first.
    async fn pending_suggestions(&self) -> NuguResult<Vec<Suggestion>>;

    /// Suggestion by id.
    async fn find_suggestion(&self, id: &SuggestionId) -> NuguResult<Option<Suggestion>>;

    /// Insert a new suggestion and return its id.
    async fn insert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<SuggestionId>;

    /// Insert or replace the suggestion with `suggestion.id`.
    async fn upsert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<()>;
}

/// Durable starboard entries and per-guild settings.
#[async_trait::async_trait]
pub trait StarboardStore: Send + Sync {
    /// Entry for a source message.
    async fn find_entry(&self, guild_id: u64, message_id: u64)
    -> NuguResult<Option<StarboardEntry>>;

    /// Insert or replace the entry keyed by guild and message.
    async fn upsert_entry(&self, entry: &StarboardEntry) -> NuguResult<()>;

    /// Remove the entry for a source message.
    async fn delete_entry(&self, guild_id: u64, message_id: u64) -> NuguResult<()>;

    /// Every entry of a guild.
    async fn entries_for_guild(&self, guild_id: u64) -> NuguResult<Vec<StarboardEntry>>;

    /// Settings of a guild, defaults when never saved.
    async fn settings(&self, guild_id: u64) -> NuguResult<StarboardSettings>;

    /// Persist the settings of a guild.
    async fn save_settings(&self, guild_id: u64, settings: &StarboardSettings) -> NuguResult<()>;
}

/// Selects game results. Unset fields match everything.
///
/// ```
/// use nugu_core::{GameResult, GameType};
/// use nugu_interface::GameFilter;
///
/// let mut game = GameResult::new(7, 1);
/// game.game_type = GameType::Group;
///
/// assert!(GameFilter::default().matches(&game));
/// assert!(GameFilter::default().with_player(7).matches(&game));
/// assert!(!GameFilter::default().with_game_type(GameType::Idol).matches(&game));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, derive_setters::Setters)]
#[setters(prefix = "with_", strip_option)]
pub struct GameFilter {
    /// Solo games of this user, or multi-player games they scored in
    pub player: Option<u64>,
    /// Games started by this user
    pub user_id: Option<u64>,
    /// Games played in this guild
    pub guild_id: Option<u64>,
    /// Solo or multi-player only
    pub is_multigame: Option<bool>,
    /// Game type
    pub game_type: Option<GameType>,
    /// Idol pool
    pub gender: Option<GameGender>,
    /// Difficulty
    pub difficulty: Option<Difficulty>,
    /// Games referencing any of these idols
    pub idols: Vec<IdolId>,
}

impl GameFilter {
    /// Whether `game` satisfies every set criterion.
    pub fn matches(&self, game: &GameResult) -> bool {
        if let Some(player) = self.player {
            let solo = !game.is_multigame && game.user_id == player;
            let multi = game.is_multigame && game.users_correct_guesses.contains_key(&player);
            if !solo && !multi {
                return false;
            }
        }
        self.user_id.is_none_or(|u| game.user_id == u)
            && self.guild_id.is_none_or(|g| game.guild_id == g)
            && self.is_multigame.is_none_or(|m| game.is_multigame == m)
            && self.game_type.is_none_or(|t| game.game_type == t)
            && self.gender.is_none_or(|g| game.gender == g)
            && self.difficulty.is_none_or(|d| game.difficulty == d)
            && (self.idols.is_empty() || self.idols.iter().any(|id| game.references(id)))
    }
}

/// Durable game history.
#[async_trait::async_trait]
pub trait GameResultStore: Send + Sync {
    /// Append a finished game and return its id.
    async fn insert_game(&self, game: &GameResult) -> NuguResult<GameId>;

    /// Games matching `filter`, oldest first.
    async fn find_games(&self, filter: &GameFilter) -> NuguResult<Vec<GameResult>>;

    /// Rewrite references to `from` so they point at `to`.
    ///
    /// Returns the number of records changed by this pass. Callers repeat
    /// until a pass reports zero.
    async fn replace_idol_id(&self, from: &IdolId, to: &IdolId) -> NuguResult<u64>;
}
