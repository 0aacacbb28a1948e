//! Starboard: mirrors well-starred messages into a per-guild channel.
//!
//! Every add, remove and delete for a guild runs under that guild's lock so
//! the star count read, the store write and the mirror post, edit or delete
//! happen as one step. A mirror exists exactly while the entry has at least
//! the configured minimum of stars.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod commands;
mod config;
mod locks;
mod render;
mod starboard;

pub use commands::StarboardCommand;
pub use config::StarboardConfig;
pub use locks::GuildLocks;
pub use render::{
    STARBOARD_COLOR, TOP_LINE_LIMIT, TOP_PAGE_SIZE, join_names, mirror_embed, mirror_image,
    starrers_embed, top_line, top_pages, with_commas,
};
pub use starboard::{StarChange, Starboard, TOP_LIMIT};
