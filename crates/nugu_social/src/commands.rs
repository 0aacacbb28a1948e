//! Prefix command parsing.
//!
//! Chat messages starting with the command prefix are split shell-style and
//! mapped onto [`BotCommand`]. Messages that are not nugu commands parse to
//! `None` so other bots sharing the prefix are left alone.

use nugu_core::{Difficulty, GameGender, Gender, normalize_quotes, split_args};
use nugu_error::{NuguResult, ValidationError, ValidationErrorKind};
use nugu_idols::RankingQuery;
use nugu_starboard::StarboardCommand;
use regex::Regex;
use std::str::FromStr;
use std::sync::LazyLock;

static USER_MENTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<@!?(\d+)>$").expect("Valid user mention regex"));

const SUGGEST_EDIT_USAGE: &str = "usage: s-edit {name|group|gender|notes} {value}";
const IDOL_USAGE: &str = "usage: idol {list|images group name|group old new|rename group name new_group new_name gender|image delete object|image move object group name gender}";
const NUGU_USAGE: &str =
    "usage: nugu {stats [@user|server|global]|idol group name|group name|missed [server|global]|ranking [filters]}";

/// Whose statistics a command asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsTarget {
    /// The author of the command
    Me,
    /// A mentioned user
    User(u64),
    /// The guild the command was sent in
    Server,
    /// Every game
    Global,
}

/// Catalog maintenance commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdolAdmin {
    /// Counts and per-group listing
    List,
    /// Images of one idol
    Images {
        /// Group as typed
        group: String,
        /// Name as typed
        name: String,
    },
    /// Rename a whole group
    UpdateGroup {
        /// Group as typed
        target: String,
        /// New group name
        new_group: String,
    },
    /// Rename or merge one idol
    Rename {
        /// Current group, exact
        group: String,
        /// Current name, exact
        name: String,
        /// New group
        new_group: String,
        /// New name
        new_name: String,
        /// New gender
        gender: Gender,
    },
    /// Remove one image
    DeleteImage(String),
    /// Move one image to another idol
    MoveImage {
        /// Image object name
        object_name: String,
        /// Destination group
        group: String,
        /// Destination name
        name: String,
        /// Destination gender
        gender: Gender,
    },
}

/// Guessing game statistics queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsQuery {
    /// Player statistics
    Player(StatsTarget),
    /// Guess counts of one idol
    Idol {
        /// Group as typed
        group: String,
        /// Name as typed
        name: String,
    },
    /// Guess counts of one group
    Group(String),
    /// Idols missed most often
    Missed(StatsTarget),
    /// Leaderboard
    Ranking {
        /// Filters
        query: RankingQuery,
        /// Restrict a user ranking to the current guild
        this_server: bool,
    },
}

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Submit a picture; the request is parsed from the raw message
    Suggest,
    /// Edit a field of the head suggestion
    SuggestEdit {
        /// Field name as typed
        field: String,
        /// New value
        value: String,
    },
    /// Catalog maintenance
    Idol(IdolAdmin),
    /// Guessing game statistics
    Stats(StatsQuery),
    /// Starboard settings and queries
    Starboard(StarboardCommand),
}

fn invalid(message: impl Into<String>) -> ValidationError {
    ValidationError::new(ValidationErrorKind::InvalidArguments(message.into()))
}

fn gender(raw: &str) -> NuguResult<Gender> {
    Ok(Gender::from_str(raw)
        .map_err(|_| ValidationError::new(ValidationErrorKind::InvalidGender(raw.to_string())))?)
}

fn target(raw: Option<&str>) -> NuguResult<StatsTarget> {
    let Some(raw) = raw else {
        return Ok(StatsTarget::Me);
    };
    if let Some(id) = USER_MENTION
        .captures(raw)
        .and_then(|c| c[1].parse::<u64>().ok())
    {
        return Ok(StatsTarget::User(id));
    }
    match raw.to_ascii_lowercase().as_str() {
        "me" => Ok(StatsTarget::Me),
        "server" | "guild" => Ok(StatsTarget::Server),
        "global" | "all" => Ok(StatsTarget::Global),
        _ => Err(invalid(format!("'{}' is not a user, server or global", raw)).into()),
    }
}

fn ranking(args: &[&str]) -> NuguResult<StatsQuery> {
    let mut query = RankingQuery::default();
    let mut this_server = false;
    for arg in args {
        let lower = arg.to_ascii_lowercase();
        match lower.as_str() {
            "server" | "servers" => query.by_server = true,
            "here" => this_server = true,
            "solo" => query.is_multigame = Some(false),
            "multi" => query.is_multigame = Some(true),
            other => {
                if let Ok(difficulty) = Difficulty::from_str(other) {
                    query.difficulty = Some(difficulty);
                } else if let Ok(gender) = GameGender::from_str(other) {
                    query.gender = Some(gender);
                } else {
                    Err(invalid(format!("unknown ranking filter '{}'", arg)))?
                }
            }
        }
    }
    Ok(StatsQuery::Ranking { query, this_server })
}

impl BotCommand {
    /// Parse a message. Returns `None` when it is not a nugu command.
    ///
    /// ```
    /// use nugu_social::{BotCommand, StatsQuery, StatsTarget};
    ///
    /// assert_eq!(
    ///     BotCommand::parse("!", "!nugu stats server").unwrap(),
    ///     Some(BotCommand::Stats(StatsQuery::Player(StatsTarget::Server)))
    /// );
    /// assert_eq!(BotCommand::parse("!", "!play").unwrap(), None);
    /// assert_eq!(BotCommand::parse("!", "hello").unwrap(), None);
    /// ```
    ///
    /// # Errors
    ///
    /// A validation error when a nugu command has bad arguments.
    pub fn parse(prefix: &str, content: &str) -> NuguResult<Option<Self>> {
        let Some(body) = content.strip_prefix(prefix) else {
            return Ok(None);
        };
        let owned = split_args(&normalize_quotes(body))?;
        let args: Vec<&str> = owned.iter().map(String::as_str).collect();
        let Some((command, rest)) = args.split_first() else {
            return Ok(None);
        };

        let parsed = match command.to_ascii_lowercase().as_str() {
            "suggest" => Self::Suggest,
            "s-edit" => match rest {
                [field, value @ ..] if !value.is_empty() => Self::SuggestEdit {
                    field: field.to_string(),
                    value: value.join(" "),
                },
                _ => Err(invalid(SUGGEST_EDIT_USAGE))?,
            },
            "idol" | "idols" => Self::Idol(Self::idol_admin(rest)?),
            "nugu" => Self::Stats(Self::stats(rest)?),
            "starboard" | "sb" => Self::Starboard(StarboardCommand::parse(rest)?),
            _ => return Ok(None),
        };
        Ok(Some(parsed))
    }

    fn idol_admin(args: &[&str]) -> NuguResult<IdolAdmin> {
        let lowered: Vec<String> = args.iter().take(2).map(|a| a.to_ascii_lowercase()).collect();
        let keys: Vec<&str> = lowered.iter().map(String::as_str).collect();
        let admin = match (keys.as_slice(), args) {
            (["list", ..], [_]) => IdolAdmin::List,
            (["images", ..], [_, group, name]) => IdolAdmin::Images {
                group: group.to_string(),
                name: name.to_string(),
            },
            (["group", ..], [_, target, new_group]) => IdolAdmin::UpdateGroup {
                target: target.to_string(),
                new_group: new_group.to_string(),
            },
            (["rename", ..], [_, group, name, new_group, new_name, g]) => IdolAdmin::Rename {
                group: group.to_string(),
                name: name.to_string(),
                new_group: new_group.to_string(),
                new_name: new_name.to_string(),
                gender: gender(g)?,
            },
            (["image", "delete"], [_, _, object_name]) => {
                IdolAdmin::DeleteImage(object_name.to_string())
            }
            (["image", "move"], [_, _, object_name, group, name, g]) => IdolAdmin::MoveImage {
                object_name: object_name.to_string(),
                group: group.to_string(),
                name: name.to_string(),
                gender: gender(g)?,
            },
            _ => Err(invalid(IDOL_USAGE))?,
        };
        Ok(admin)
    }

    fn stats(args: &[&str]) -> NuguResult<StatsQuery> {
        let Some((sub, rest)) = args.split_first() else {
            return Ok(StatsQuery::Player(StatsTarget::Me));
        };
        let query = match (sub.to_ascii_lowercase().as_str(), rest) {
            ("stats", [] | [_]) => StatsQuery::Player(target(rest.first().copied())?),
            ("idol", [group, name]) => StatsQuery::Idol {
                group: group.to_string(),
                name: name.to_string(),
            },
            ("group", [group]) => StatsQuery::Group(group.to_string()),
            ("missed", [] | [_]) => StatsQuery::Missed(target(rest.first().copied())?),
            ("ranking" | "leaderboard" | "lb", filters) => ranking(filters)?,
            _ => Err(invalid(NUGU_USAGE))?,
        };
        Ok(query)
    }

    /// Whether only moderators may run the command.
    pub fn requires_moderator(&self) -> bool {
        match self {
            Self::Idol(IdolAdmin::List | IdolAdmin::Images { .. }) => false,
            Self::Idol(_) => true,
            Self::Starboard(command) => command.requires_moderator(),
            Self::Suggest | Self::SuggestEdit { .. } | Self::Stats(_) => false,
        }
    }
}
