//! Test utilities for nugu_idols tests.
//!
//! Mock chat platform and image fetcher plus picture generators.

pub mod mock_platform;

#[allow(unused_imports)]
pub use mock_platform::{MockFetcher, MockPlatform, SentMessage, gradient_png, stripes_png};
