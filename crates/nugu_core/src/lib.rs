//! Core data types for the nugu idol bot.
//!
//! This crate provides the records shared by every other nugu crate: idols
//! and their images, moderation suggestions, starboard entries and game
//! results, plus the loose string matching used to compare user input
//! against canonical names.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod args;
mod game;
mod id;
mod idol;
mod matching;
mod starboard;
mod suggestion;

pub use args::{normalize_quotes, split_args};
pub use game::{Difficulty, GameGender, GameResult, GameType};
pub use id::{GameId, IdolId, SuggestionId};
pub use idol::{Gender, Idol, IdolImage, IdolStats};
pub use matching::{alphanumeric, alphanumeric_compare};
pub use starboard::{MirrorPost, StarboardEntry, StarboardSettings};
pub use suggestion::{Suggestion, SuggestionField, SuggestionStatus};
