//! The match engine: bitap fuzzy localization of a pattern near an expected
//! offset.
//!
//! Bitap works on bytes because its register width is tied to the machine
//! word, and patch positions are byte offsets. Patterns longer than
//! [`Config::match_max_bits`] are a caller error; the patch engine splits
//! its patches to stay under the limit.

use std::collections::HashMap;

use dmp_util::strings::{index_of, last_index_of};

use crate::Config;

impl Config {
    /// Locate the best instance of `pattern` in `text` near `loc`.
    ///
    /// Returns `None` if no match is found under the score threshold.
    pub fn match_main(&self, text: &str, pattern: &str, loc: usize) -> Option<usize> {
        let loc = loc.min(text.len());
        if text == pattern {
            // Shortcut (potentially not guaranteed by the algorithm).
            return Some(0);
        }
        if text.is_empty() {
            // Nothing to match.
            return None;
        }
        if loc + pattern.len() <= text.len()
            && &text.as_bytes()[loc..loc + pattern.len()] == pattern.as_bytes()
        {
            // Perfect match at the perfect spot. (Includes the case of an
            // empty pattern.)
            return Some(loc);
        }
        // Do a fuzzy compare.
        self.match_bitap(text, pattern, loc)
    }

    /// Locate the best instance of `pattern` in `text` near `loc` using the
    /// bitap algorithm.
    ///
    /// Requires `pattern.len() <= self.match_max_bits`.
    pub fn match_bitap(&self, text: &str, pattern: &str, loc: usize) -> Option<usize> {
        assert!(
            pattern.len() <= self.match_max_bits,
            "pattern longer than match_max_bits"
        );
        // Initialise the alphabet.
        let alphabet = self.match_alphabet(pattern);
        // Highest score beyond which we give up.
        let mut score_threshold = self.match_threshold;
        // Is there a nearby exact match? (speedup)
        if let Some(exact) = index_of(text, pattern, loc) {
            score_threshold = self.bitap_score(0, exact, loc, pattern).min(score_threshold);
            // What about in the other direction? (speedup)
            if let Some(exact) = last_index_of(text, pattern, loc + pattern.len()) {
                score_threshold = self.bitap_score(0, exact, loc, pattern).min(score_threshold);
            }
        }
        // Initialise the bit arrays.
        let match_mask: usize = 1 << (pattern.len() - 1);
        let text_bytes = text.as_bytes();
        let mut best_loc: Option<usize> = None;
        let mut bin_max = pattern.len() + text.len();
        let mut last_rd: Vec<usize> = Vec::new();
        for d in 0..pattern.len() {
            // Scan for the best match; each iteration allows for one more
            // error. Binary-search how far from `loc` we can stray at this
            // error level.
            let mut bin_min = 0;
            let mut bin_mid = bin_max;
            while bin_min < bin_mid {
                if self.bitap_score(d, loc + bin_mid, loc, pattern) <= score_threshold {
                    bin_min = bin_mid;
                } else {
                    bin_max = bin_mid;
                }
                bin_mid = (bin_max - bin_min) / 2 + bin_min;
            }
            // Use the result from this iteration as the maximum for the
            // next.
            bin_max = bin_mid;
            let mut start = 1.max(loc as isize - bin_mid as isize + 1) as usize;
            let finish = (loc + bin_mid).min(text.len()) + pattern.len();
            let mut rd = vec![0usize; finish + 2];
            rd[finish + 1] = (1 << d) - 1;
            let mut j = finish;
            while j >= start {
                let char_match = if j - 1 >= text_bytes.len() {
                    // Out of range.
                    0
                } else {
                    alphabet.get(&text_bytes[j - 1]).copied().unwrap_or(0)
                };
                rd[j] = if d == 0 {
                    // First pass: exact match.
                    ((rd[j + 1] << 1) | 1) & char_match
                } else {
                    // Subsequent passes: fuzzy match.
                    (((rd[j + 1] << 1) | 1) & char_match)
                        | (((last_rd[j + 1] | last_rd[j]) << 1) | 1)
                        | last_rd[j + 1]
                };
                if rd[j] & match_mask != 0 {
                    let score = self.bitap_score(d, j - 1, loc, pattern);
                    // This match will almost certainly be better than any
                    // existing match, but check anyway.
                    if score <= score_threshold {
                        score_threshold = score;
                        best_loc = Some(j - 1);
                        if j - 1 > loc {
                            // When passing loc, don't exceed the current
                            // distance from loc.
                            start = 1.max(2 * loc as isize - (j as isize - 1)) as usize;
                        } else {
                            // Already passed loc; downhill from here on in.
                            break;
                        }
                    }
                }
                j -= 1;
            }
            if self.bitap_score(d + 1, loc, loc, pattern) > score_threshold {
                // No hope for a better match at greater error levels.
                break;
            }
            last_rd = rd;
        }
        best_loc
    }

    /// Score a match with `errors` errors ending at `x`; lower is better.
    fn bitap_score(&self, errors: usize, x: usize, loc: usize, pattern: &str) -> f64 {
        let accuracy = errors as f64 / pattern.len() as f64;
        let proximity = loc.abs_diff(x) as f64;
        if self.match_distance == 0 {
            // Dodge a divide-by-zero.
            if proximity == 0.0 {
                return accuracy;
            }
            return 1.0;
        }
        accuracy + proximity / self.match_distance as f64
    }

    /// Build the byte-to-bitmask table for the bitap algorithm.
    pub fn match_alphabet(&self, pattern: &str) -> HashMap<u8, usize> {
        let bytes = pattern.as_bytes();
        let mut alphabet = HashMap::new();
        for (i, &c) in bytes.iter().enumerate() {
            *alphabet.entry(c).or_insert(0) |= 1 << (bytes.len() - i - 1);
        }
        alphabet
    }
}
