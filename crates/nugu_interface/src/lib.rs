//! Collaborator traits for the nugu idol bot.
//!
//! The catalog, suggestion queue, starboard and statistics components only
//! talk to the outside world through the traits in this crate: document
//! stores, a snapshot cache, object storage, an image fetcher and the chat
//! platform itself.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod fetch;
mod object;
mod platform;
mod store;

pub use cache::SnapshotCache;
pub use fetch::{FetchedImage, ImageFetcher};
pub use object::{ObjectMetadata, ObjectStorage};
pub use platform::{
    Attachment, ChannelMessage, ChatPlatform, Embed, EmbedField, OutgoingMessage, UserInfo,
};
pub use store::{GameFilter, GameResultStore, IdolStore, StarboardStore, SuggestionStore};
