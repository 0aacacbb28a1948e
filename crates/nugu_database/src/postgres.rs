//! PostgreSQL-backed stores.
//!
//! Each record is one JSONB document plus the key columns needed to look it
//! up. Diesel is synchronous, so every call runs on the blocking pool with a
//! connection borrowed from r2d2.

use crate::schema::{game_results, idols, starboard_entries, starboard_settings, suggestions};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use nugu_core::{
    GameId, GameResult, Idol, IdolId, StarboardEntry, StarboardSettings, Suggestion, SuggestionId,
    SuggestionStatus,
};
use nugu_error::{NuguResult, StoreError, StoreErrorKind};
use nugu_interface::{GameFilter, GameResultStore, IdolStore, StarboardStore, SuggestionStore};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use tracing::{debug, info, instrument};

type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Run pending migrations.
pub fn run_migrations(conn: &mut PgConnection) -> NuguResult<()> {
    use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    conn.run_pending_migrations(MIGRATIONS)
        .map(|_| ())
        .map_err(|e| StoreError::new(StoreErrorKind::Migration(e.to_string())).into())
}

fn to_json<T: Serialize>(value: &T) -> NuguResult<JsonValue> {
    Ok(serde_json::to_value(value).map_err(StoreError::from)?)
}

fn from_json<T: DeserializeOwned>(value: JsonValue) -> NuguResult<T> {
    Ok(serde_json::from_value(value).map_err(StoreError::from)?)
}

fn status_key(status: SuggestionStatus) -> &'static str {
    match status {
        SuggestionStatus::Pending => "",
        SuggestionStatus::Approved => "approved",
        SuggestionStatus::Denied => "denied",
    }
}

/// PostgreSQL implementation of every store trait.
///
/// # Example
///
/// ```no_run
/// use nugu_database::PgStore;
///
/// # async fn run() -> nugu_error::NuguResult<()> {
/// let store = PgStore::connect("postgres://localhost/nugu", 10)?;
/// store.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl std::fmt::Debug for PgStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgStore")
            .field("max_size", &self.pool.max_size())
            .finish()
    }
}

impl PgStore {
    /// Create a connection pool for `database_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot open its first connection.
    pub fn connect(database_url: &str, pool_size: u32) -> NuguResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .build(manager)
            .map_err(|e| {
                StoreError::new(StoreErrorKind::Connection(format!(
                    "Failed to create connection pool: {}",
                    e
                )))
            })?;
        info!(pool_size, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending migrations.
    pub async fn migrate(&self) -> NuguResult<()> {
        self.run(run_migrations).await
    }

    async fn run<T, F>(&self, f: F) -> NuguResult<T>
    where
        F: FnOnce(&mut PgConnection) -> NuguResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool.get().map_err(|e| {
                StoreError::new(StoreErrorKind::Connection(format!(
                    "Failed to get connection from pool: {}",
                    e
                )))
            })?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::new(StoreErrorKind::Query(format!("Task join error: {}", e))))?
    }
}

#[async_trait]
impl IdolStore for PgStore {
    #[instrument(skip(self))]
    async fn list_idols(&self) -> NuguResult<Vec<Idol>> {
        self.run(|conn| {
            let rows: Vec<JsonValue> = idols::table
                .select(idols::data)
                .order(idols::seq.asc())
                .load(conn)
                .map_err(StoreError::from)?;
            debug!(count = rows.len(), "Loaded idols");
            rows.into_iter().map(from_json).collect()
        })
        .await
    }

    async fn find_idol(&self, id: &IdolId) -> NuguResult<Option<Idol>> {
        let id = id.clone();
        self.run(move |conn| {
            idols::table
                .find(id.as_str())
                .select(idols::data)
                .first::<JsonValue>(conn)
                .optional()
                .map_err(StoreError::from)?
                .map(from_json)
                .transpose()
        })
        .await
    }

    async fn find_idol_by_name(&self, group_name: &str, name: &str) -> NuguResult<Option<Idol>> {
        let (group_name, name) = (group_name.to_string(), name.to_string());
        self.run(move |conn| {
            idols::table
                .filter(idols::group_name.eq(&group_name).and(idols::name.eq(&name)))
                .select(idols::data)
                .order(idols::seq.asc())
                .first::<JsonValue>(conn)
                .optional()
                .map_err(StoreError::from)?
                .map(from_json)
                .transpose()
        })
        .await
    }

    #[instrument(skip(self, idol), fields(name = %idol.name, group = %idol.group_name))]
    async fn insert_idol(&self, idol: &Idol) -> NuguResult<IdolId> {
        let mut stored = idol.clone();
        stored.id = IdolId::generate();
        self.run(move |conn| {
            let data = to_json(&stored)?;
            diesel::insert_into(idols::table)
                .values((
                    idols::id.eq(stored.id.as_str()),
                    idols::group_name.eq(&stored.group_name),
                    idols::name.eq(&stored.name),
                    idols::data.eq(&data),
                ))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(stored.id)
        })
        .await
    }

    async fn upsert_idol(&self, idol: &Idol) -> NuguResult<()> {
        let idol = idol.clone();
        self.run(move |conn| {
            let data = to_json(&idol)?;
            diesel::insert_into(idols::table)
                .values((
                    idols::id.eq(idol.id.as_str()),
                    idols::group_name.eq(&idol.group_name),
                    idols::name.eq(&idol.name),
                    idols::data.eq(&data),
                ))
                .on_conflict(idols::id)
                .do_update()
                .set((
                    idols::group_name.eq(&idol.group_name),
                    idols::name.eq(&idol.name),
                    idols::data.eq(&data),
                ))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(())
        })
        .await
    }

    async fn delete_idol(&self, id: &IdolId) -> NuguResult<()> {
        let id = id.clone();
        self.run(move |conn| {
            diesel::delete(idols::table.find(id.as_str()))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl SuggestionStore for PgStore {
    async fn pending_suggestions(&self) -> NuguResult<Vec<Suggestion>> {
        self.run(|conn| {
            let rows: Vec<JsonValue> = suggestions::table
                .filter(suggestions::status.eq(status_key(SuggestionStatus::Pending)))
                .select(suggestions::data)
                .order(suggestions::seq.asc())
                .load(conn)
                .map_err(StoreError::from)?;
            rows.into_iter().map(from_json).collect()
        })
        .await
    }

    async fn find_suggestion(&self, id: &SuggestionId) -> NuguResult<Option<Suggestion>> {
        let id = id.clone();
        self.run(move |conn| {
            suggestions::table
                .find(id.as_str())
                .select(suggestions::data)
                .first::<JsonValue>(conn)
                .optional()
                .map_err(StoreError::from)?
                .map(from_json)
                .transpose()
        })
        .await
    }

    async fn insert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<SuggestionId> {
        let mut stored = suggestion.clone();
        stored.id = SuggestionId::generate();
        self.run(move |conn| {
            let data = to_json(&stored)?;
            diesel::insert_into(suggestions::table)
                .values((
                    suggestions::id.eq(stored.id.as_str()),
                    suggestions::status.eq(status_key(stored.status)),
                    suggestions::data.eq(&data),
                ))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(stored.id)
        })
        .await
    }

    async fn upsert_suggestion(&self, suggestion: &Suggestion) -> NuguResult<()> {
        let suggestion = suggestion.clone();
        self.run(move |conn| {
            let data = to_json(&suggestion)?;
            let status = status_key(suggestion.status);
            diesel::insert_into(suggestions::table)
                .values((
                    suggestions::id.eq(suggestion.id.as_str()),
                    suggestions::status.eq(status),
                    suggestions::data.eq(&data),
                ))
                .on_conflict(suggestions::id)
                .do_update()
                .set((suggestions::status.eq(status), suggestions::data.eq(&data)))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl StarboardStore for PgStore {
    async fn find_entry(
        &self,
        guild_id: u64,
        message_id: u64,
    ) -> NuguResult<Option<StarboardEntry>> {
        self.run(move |conn| {
            starboard_entries::table
                .find((guild_id as i64, message_id as i64))
                .select(starboard_entries::data)
                .first::<JsonValue>(conn)
                .optional()
                .map_err(StoreError::from)?
                .map(from_json)
                .transpose()
        })
        .await
    }

    async fn upsert_entry(&self, entry: &StarboardEntry) -> NuguResult<()> {
        let entry = entry.clone();
        self.run(move |conn| {
            let data = to_json(&entry)?;
            diesel::insert_into(starboard_entries::table)
                .values((
                    starboard_entries::guild_id.eq(entry.guild_id as i64),
                    starboard_entries::message_id.eq(entry.message_id as i64),
                    starboard_entries::data.eq(&data),
                ))
                .on_conflict((starboard_entries::guild_id, starboard_entries::message_id))
                .do_update()
                .set(starboard_entries::data.eq(&data))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(())
        })
        .await
    }

    async fn delete_entry(&self, guild_id: u64, message_id: u64) -> NuguResult<()> {
        self.run(move |conn| {
            diesel::delete(starboard_entries::table.find((guild_id as i64, message_id as i64)))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(())
        })
        .await
    }

    async fn entries_for_guild(&self, guild_id: u64) -> NuguResult<Vec<StarboardEntry>> {
        self.run(move |conn| {
            let rows: Vec<JsonValue> = starboard_entries::table
                .filter(starboard_entries::guild_id.eq(guild_id as i64))
                .select(starboard_entries::data)
                .order(starboard_entries::message_id.asc())
                .load(conn)
                .map_err(StoreError::from)?;
            rows.into_iter().map(from_json).collect()
        })
        .await
    }

    async fn settings(&self, guild_id: u64) -> NuguResult<StarboardSettings> {
        self.run(move |conn| {
            let row = starboard_settings::table
                .find(guild_id as i64)
                .select(starboard_settings::data)
                .first::<JsonValue>(conn)
                .optional()
                .map_err(StoreError::from)?;
            match row {
                Some(data) => from_json(data),
                None => Ok(StarboardSettings::default()),
            }
        })
        .await
    }

    async fn save_settings(&self, guild_id: u64, settings: &StarboardSettings) -> NuguResult<()> {
        let settings = settings.clone();
        self.run(move |conn| {
            let data = to_json(&settings)?;
            diesel::insert_into(starboard_settings::table)
                .values((
                    starboard_settings::guild_id.eq(guild_id as i64),
                    starboard_settings::data.eq(&data),
                ))
                .on_conflict(starboard_settings::guild_id)
                .do_update()
                .set(starboard_settings::data.eq(&data))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl GameResultStore for PgStore {
    #[instrument(skip(self, game), fields(user_id = game.user_id, guild_id = game.guild_id))]
    async fn insert_game(&self, game: &GameResult) -> NuguResult<GameId> {
        let mut stored = game.clone();
        stored.id = GameId::generate();
        self.run(move |conn| {
            let data = to_json(&stored)?;
            diesel::insert_into(game_results::table)
                .values((
                    game_results::id.eq(stored.id.as_str()),
                    game_results::user_id.eq(stored.user_id as i64),
                    game_results::guild_id.eq(stored.guild_id as i64),
                    game_results::is_multigame.eq(stored.is_multigame),
                    game_results::data.eq(&data),
                ))
                .execute(conn)
                .map_err(StoreError::from)?;
            Ok(stored.id)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn find_games(&self, filter: &GameFilter) -> NuguResult<Vec<GameResult>> {
        let filter = filter.clone();
        self.run(move |conn| {
            let mut query = game_results::table
                .select(game_results::data)
                .order(game_results::seq.asc())
                .into_boxed();
            if let Some(guild_id) = filter.guild_id {
                query = query.filter(game_results::guild_id.eq(guild_id as i64));
            }
            if let Some(user_id) = filter.user_id {
                query = query.filter(game_results::user_id.eq(user_id as i64));
            }
            if let Some(is_multigame) = filter.is_multigame {
                query = query.filter(game_results::is_multigame.eq(is_multigame));
            }
            let rows: Vec<JsonValue> = query.load(conn).map_err(StoreError::from)?;

            // JSONB array membership is checked in Rust.
            let mut games = Vec::with_capacity(rows.len());
            for row in rows {
                let game: GameResult = from_json(row)?;
                if filter.matches(&game) {
                    games.push(game);
                }
            }
            debug!(count = games.len(), "Loaded games");
            Ok(games)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn replace_idol_id(&self, from: &IdolId, to: &IdolId) -> NuguResult<u64> {
        let (from, to) = (from.clone(), to.clone());
        self.run(move |conn| {
            use diesel::dsl::sql;
            use diesel::sql_types::{Bool, Text};

            let needle = format!("%\"{}\"%", from);
            let rows: Vec<(String, JsonValue)> = game_results::table
                .select((game_results::id, game_results::data))
                .filter(sql::<Bool>("data::text LIKE ").bind::<Text, _>(needle))
                .load(conn)
                .map_err(StoreError::from)?;

            let mut changed = 0u64;
            for (id, data) in rows {
                let mut game: GameResult = from_json(data)?;
                if !game.replace_idol_once(&from, &to) {
                    continue;
                }
                let data = to_json(&game)?;
                diesel::update(game_results::table.find(&id))
                    .set(game_results::data.eq(&data))
                    .execute(conn)
                    .map_err(StoreError::from)?;
                changed += 1;
            }
            Ok(changed)
        })
        .await
    }
}
