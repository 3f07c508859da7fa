//! Static preview builder for stillframe.
//!
//! Converts every component in a source directory into a standalone,
//! script-free HTML preview page.

pub mod assets;
pub mod builder;

pub use assets::AssetPipeline;
pub use builder::{BuildConfig, BuildError, BuildResult, ManifestEntry, StaticBuilder};
