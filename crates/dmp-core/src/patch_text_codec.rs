//! The line-oriented patch wire codec.
//!
//! Emulates GNU diff's format:
//!
//! ```text
//! @@ -382,8 +481,9 @@
//!  context
//! -deleted
//! +inserted
//! ```
//!
//! Header indices are 1-based on the wire and 0-based internally; the
//! `,length` suffix is omitted when the length is 1, and a zero length keeps
//! the 0-based start.

use std::fmt;
use std::sync::OnceLock;

use dmp_util::percent;
use regex::Regex;
use thiserror::Error;

use crate::diff::{Diff, Op};
use crate::patch::Patch;
use crate::Config;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatchParseError {
    #[error("Invalid patch string: {0}")]
    InvalidHeader(String),
    #[error("Invalid patch mode '{mode}' in: {line}")]
    InvalidMode { mode: char, line: String },
    #[error("invalid escape in patch body: {0}")]
    Body(#[from] percent::DecodeError),
}

static PATCH_HEADER: OnceLock<Regex> = OnceLock::new();

fn patch_header() -> &'static Regex {
    PATCH_HEADER.get_or_init(|| {
        Regex::new(r"^@@ -(\d+),?(\d*) \+(\d+),?(\d*) @@$").expect("static pattern compiles")
    })
}

fn coords(start: usize, length: usize) -> String {
    match length {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

impl fmt::Display for Patch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "@@ -{} +{} @@",
            coords(self.start1, self.length1),
            coords(self.start2, self.length2)
        )?;
        // Escape the body of the patch with %xx notation.
        for d in &self.diffs {
            let sign = match d.op {
                Op::Insert => '+',
                Op::Delete => '-',
                Op::Equal => ' ',
            };
            writeln!(f, "{}{}", sign, percent::encode_query(&d.text))?;
        }
        Ok(())
    }
}

impl Config {
    /// Serialize a list of patches to the textual wire format.
    pub fn patch_to_text(&self, patches: &[Patch]) -> String {
        let mut text = String::new();
        for patch in patches {
            text.push_str(&patch.to_string());
        }
        text
    }

    /// Parse the textual wire format into a list of patches.
    pub fn patch_from_text(&self, text: &str) -> Result<Vec<Patch>, PatchParseError> {
        let mut patches = Vec::new();
        if text.is_empty() {
            return Ok(patches);
        }
        let lines: Vec<&str> = text.split('\n').collect();
        let mut pointer = 0;
        while pointer < lines.len() {
            let header_line = lines[pointer];
            let caps = patch_header()
                .captures(header_line)
                .ok_or_else(|| PatchParseError::InvalidHeader(header_line.to_string()))?;
            let mut patch = Patch::default();
            let (start1, length1) = parse_coords(&caps[1], &caps[2])
                .ok_or_else(|| PatchParseError::InvalidHeader(header_line.to_string()))?;
            let (start2, length2) = parse_coords(&caps[3], &caps[4])
                .ok_or_else(|| PatchParseError::InvalidHeader(header_line.to_string()))?;
            patch.start1 = start1;
            patch.length1 = length1;
            patch.start2 = start2;
            patch.length2 = length2;
            pointer += 1;
            while pointer < lines.len() {
                let line = lines[pointer];
                let Some(sign) = line.chars().next() else {
                    pointer += 1;
                    continue;
                };
                let body = &line[sign.len_utf8()..];
                match sign {
                    '@' => break, // Start of the next patch.
                    '-' => patch.diffs.push(Diff::new(Op::Delete, percent::decode_query(body)?)),
                    '+' => patch.diffs.push(Diff::new(Op::Insert, percent::decode_query(body)?)),
                    ' ' => patch.diffs.push(Diff::new(Op::Equal, percent::decode_query(body)?)),
                    other => {
                        return Err(PatchParseError::InvalidMode {
                            mode: other,
                            line: body.to_string(),
                        })
                    }
                }
                pointer += 1;
            }
            patches.push(patch);
        }
        Ok(patches)
    }
}

/// Decode one wire coordinate pair: a 1-based start (0-based when the length
/// is 0) and an optional length defaulting to 1.
fn parse_coords(start: &str, length: &str) -> Option<(usize, usize)> {
    let start: usize = start.parse().ok()?;
    if length.is_empty() {
        Some((start.checked_sub(1)?, 1))
    } else if length == "0" {
        Some((start, 0))
    } else {
        let length: usize = length.parse().ok()?;
        Some((start.checked_sub(1)?, length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patch_display() {
        let patch = Patch {
            start1: 20,
            start2: 21,
            length1: 18,
            length2: 17,
            diffs: vec![
                Diff::new(Op::Equal, "jump"),
                Diff::new(Op::Delete, "s"),
                Diff::new(Op::Insert, "ed"),
                Diff::new(Op::Equal, " over "),
                Diff::new(Op::Delete, "the"),
                Diff::new(Op::Insert, "a"),
                Diff::new(Op::Equal, "\nlaz"),
            ],
        };
        assert_eq!(
            patch.to_string(),
            "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n %0Alaz\n"
        );
    }

    #[test]
    fn test_patch_from_text_round_trips() {
        let config = Config::new();
        for text in [
            "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n %0Alaz\n",
            "@@ -1 +1 @@\n-a\n+b\n",
            "@@ -1,3 +0,0 @@\n-abc\n",
            "@@ -0,0 +1,3 @@\n+abc\n",
        ] {
            let patches = config.patch_from_text(text).expect("valid patch text");
            assert_eq!(patches[0].to_string(), text);
        }
        assert_eq!(config.patch_from_text(""), Ok(Vec::new()));
    }

    #[test]
    fn test_patch_from_text_deletion_only_header() {
        let config = Config::new();
        let patches = config
            .patch_from_text("@@ -1,3 +0,0 @@\n-abc\n")
            .expect("valid patch text");
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].start1, 0);
        assert_eq!(patches[0].length1, 3);
        assert_eq!(patches[0].start2, 0);
        assert_eq!(patches[0].length2, 0);
    }

    #[test]
    fn test_patch_from_text_errors() {
        let config = Config::new();
        assert_eq!(
            config.patch_from_text("@@ _0,0 +0,0 @@\n+abc\n"),
            Err(PatchParseError::InvalidHeader("@@ _0,0 +0,0 @@".to_string()))
        );
        assert!(matches!(
            config.patch_from_text("Bad\nPatch\n"),
            Err(PatchParseError::InvalidHeader(_))
        ));
        assert_eq!(
            config.patch_from_text("@@ -1 +1 @@\n*a\n"),
            Err(PatchParseError::InvalidMode {
                mode: '*',
                line: "a".to_string()
            })
        );
    }

    #[test]
    fn test_patch_body_unescaping() {
        let config = Config::new();
        let patches = config
            .patch_from_text(
                "@@ -1,21 +1,21 @@\n-%601234567890-=%5B%5D%5C;',./\n+~!@#$%25%5E&*()_+%7B%7D%7C:%22%3C%3E?\n",
            )
            .expect("valid patch text");
        assert_eq!(patches.len(), 1);
        assert_eq!(
            patches[0].diffs,
            vec![
                Diff::new(Op::Delete, "`1234567890-=[]\\;',./"),
                Diff::new(Op::Insert, "~!@#$%^&*()_+{}|:\"<>?"),
            ]
        );
    }

    #[test]
    fn test_patch_to_text_multi() {
        let config = Config::new();
        for text in [
            "@@ -21,18 +22,17 @@\n jump\n-s\n+ed\n  over \n-the\n+a\n  laz\n",
            "@@ -1,9 +1,9 @@\n-f\n+F\n oo+fooba\n@@ -7,9 +7,9 @@\n obar\n-,\n+.\n  tes\n",
        ] {
            let patches = config.patch_from_text(text).expect("valid patch text");
            assert_eq!(config.patch_to_text(&patches), text);
        }
    }
}
