//! Test utilities for nugu_social tests.

pub mod mock_platform;

#[allow(unused_imports)]
pub use mock_platform::{BOT_ID, MockPlatform, NoFetcher};
