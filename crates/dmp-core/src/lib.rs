//! Core diff, match and patch primitives for dmp-rs.

pub mod bitap;
pub mod delta_codec;
pub mod diff;
pub mod patch;
pub mod patch_text_codec;

pub use delta_codec::DeltaError;
pub use diff::{Diff, Op};
pub use patch::Patch;
pub use patch_text_codec::PatchParseError;

use std::time::Duration;

/// Tunable parameters consumed by the diff, match and patch engines.
///
/// A `Config` is plain read-only data; every engine entry point is a method
/// on it and may be called concurrently on disjoint inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Wall-clock budget for a diff. `None` means unlimited, which also
    /// disables the half-match heuristic so results stay minimal.
    pub diff_timeout: Option<Duration>,
    /// Cost of an empty edit operation in terms of edit scalars, used by the
    /// efficiency cleanup.
    pub diff_edit_cost: usize,
    /// Score above which the match engine reports no match
    /// (0.0 = perfection, 1.0 = very loose).
    pub match_threshold: f64,
    /// How far to search for a match (0 = exact location only). A match this
    /// many bytes from the expected location adds 1.0 to its score.
    pub match_distance: usize,
    /// Ceiling on bitap pattern length; must not exceed the machine word
    /// width. Also drives patch splitting.
    pub match_max_bits: usize,
    /// When deleting a large block of text, how close the contents have to
    /// be to the expected contents (0.0 = perfection, 1.0 = very loose).
    pub patch_delete_threshold: f64,
    /// Chunk size for patch context length.
    pub patch_margin: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            diff_timeout: Some(Duration::from_secs(1)),
            diff_edit_cost: 4,
            match_threshold: 0.5,
            match_distance: 1000,
            match_max_bits: 32,
            patch_delete_threshold: 0.5,
            patch_margin: 4,
        }
    }
}

impl Config {
    /// Create a configuration with the default parameters.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Returns the crate version at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
