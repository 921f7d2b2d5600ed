//! Text primitives.
//!
//! Provides affix measurement, substring search and character-boundary
//! helpers used by the diff, match and patch engines.

mod affix;
mod search;

pub use affix::{common_overlap, common_prefix_length, common_suffix_length};
pub use search::{
    ceil_char_boundary, floor_char_boundary, index_of, index_of_chars, last_index_of,
};
