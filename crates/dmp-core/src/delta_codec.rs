//! The compact delta codec: `=N`, `-N` and `+text` tokens, tab-separated.
//!
//! Counts are scalar counts, not byte counts, so deltas survive transport
//! between implementations regardless of their internal string encoding.

use dmp_util::percent;
use thiserror::Error;

use crate::diff::{Diff, Op};
use crate::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeltaError {
    #[error("invalid diff operation in delta: {0}")]
    InvalidOperation(char),
    #[error("invalid count in delta: {0:?}")]
    InvalidCount(String),
    #[error("negative count in delta: {0}")]
    NegativeCount(i64),
    #[error("invalid URL escape in delta: {0:?}")]
    InvalidEscape(String),
    #[error("invalid UTF-8 in delta insertion: {0:?}")]
    InvalidUtf8(String),
    #[error("delta length ({delta}) is different from source text length ({source_len})")]
    LengthMismatch { delta: usize, source_len: usize },
}

impl From<percent::DecodeError> for DeltaError {
    fn from(err: percent::DecodeError) -> Self {
        match err {
            percent::DecodeError::InvalidEscape(s) => DeltaError::InvalidEscape(s),
            percent::DecodeError::InvalidUtf8(s) => DeltaError::InvalidUtf8(s),
        }
    }
}

impl Config {
    /// Crush a diff into an encoded string of the operations required to
    /// transform `text1` into `text2`, e.g. `=3\t-2\t+ing`: keep 3 scalars,
    /// delete 2, insert "ing".
    pub fn diff_to_delta(&self, diffs: &[Diff]) -> String {
        let tokens: Vec<String> = diffs
            .iter()
            .map(|d| match d.op {
                Op::Insert => format!("+{}", percent::encode_query(&d.text)),
                Op::Delete => format!("-{}", d.text.chars().count()),
                Op::Equal => format!("={}", d.text.chars().count()),
            })
            .collect();
        tokens.join("\t")
    }

    /// Given the original `text1` and an encoded delta, rebuild the full
    /// diff. The delta must consume `text1` exactly.
    pub fn diff_from_delta(&self, text1: &str, delta: &str) -> Result<Vec<Diff>, DeltaError> {
        let runes: Vec<char> = text1.chars().collect();
        let mut cursor = 0usize;
        let mut diffs = Vec::new();
        for token in delta.split('\t') {
            if token.is_empty() {
                // Blank tokens are ok (from a trailing tab).
                continue;
            }
            // Each token begins with a one-character operation parameter.
            let mut token_chars = token.chars();
            let op = token_chars.next().unwrap_or_default();
            let param = token_chars.as_str();
            match op {
                '+' => {
                    let text = percent::decode_query(param)?;
                    diffs.push(Diff::new(Op::Insert, text));
                }
                '=' | '-' => {
                    let n: i64 = param
                        .parse()
                        .map_err(|_| DeltaError::InvalidCount(param.to_string()))?;
                    if n < 0 {
                        return Err(DeltaError::NegativeCount(n));
                    }
                    let n = n as usize;
                    cursor += n;
                    if cursor > runes.len() {
                        // Out of bounds; the final length check reports it.
                        break;
                    }
                    let text: String = runes[cursor - n..cursor].iter().collect();
                    if op == '=' {
                        diffs.push(Diff::new(Op::Equal, text));
                    } else {
                        diffs.push(Diff::new(Op::Delete, text));
                    }
                }
                other => return Err(DeltaError::InvalidOperation(other)),
            }
        }
        if cursor != runes.len() {
            return Err(DeltaError::LengthMismatch {
                delta: cursor,
                source_len: runes.len(),
            });
        }
        Ok(diffs)
    }
}
