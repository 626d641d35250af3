//! Subject extractor implementations
//!
//! - remove.bg HTTP client (production)
//! - Offline extractors (tests, `--offline` CLI mode)

pub mod mock;
pub mod remove_bg;

pub use self::mock::{FailingExtractor, FixedMaskExtractor};
pub use self::remove_bg::RemoveBgClient;
