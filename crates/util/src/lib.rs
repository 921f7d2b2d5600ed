//! dmp-util - Utility primitives for dmp-rs
//!
//! This crate provides the text primitives, percent escaping and test-data
//! generation shared by the dmp-rs crates.

pub mod fuzzer;
pub mod percent;
pub mod strings;

// Re-exports for convenience
pub use fuzzer::Fuzzer;
pub use percent::{decode_query, encode_query, DecodeError};
pub use strings::{
    ceil_char_boundary, common_overlap, common_prefix_length, common_suffix_length,
    floor_char_boundary, index_of, index_of_chars, last_index_of,
};
