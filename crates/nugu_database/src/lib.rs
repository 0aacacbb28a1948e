//! Document stores for the nugu idol bot.
//!
//! [`MemoryStore`] keeps every collection in process memory and is always
//! available. With the `postgres` feature, [`PgStore`] persists the same
//! collections to PostgreSQL through diesel, one JSONB document per record.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod memory;
#[cfg(feature = "postgres")]
mod postgres;
#[cfg(feature = "postgres")]
pub mod schema;

pub use memory::MemoryStore;
#[cfg(feature = "postgres")]
pub use postgres::{PgStore, run_migrations};
