//! The diff engine: Myers bisect with acceleration heuristics and the
//! readability cleanup passes.
//!
//! Diffs are computed on scalar (`char`) sequences so multibyte text never
//! splits mid-character; payloads are carried as `String`.

use std::collections::HashMap;
use std::sync::OnceLock;
use std::time::Instant;

use dmp_util::strings::{common_prefix_length, common_suffix_length, index_of_chars};
use regex::Regex;

use crate::Config;

/// The diff operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Delete,
    Insert,
    Equal,
}

/// A single diff operation and its text payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diff {
    pub op: Op,
    pub text: String,
}

impl Diff {
    pub fn new(op: Op, text: impl Into<String>) -> Self {
        Self {
            op,
            text: text.into(),
        }
    }
}

fn chars_to_string(chars: &[char]) -> String {
    chars.iter().collect()
}

impl Config {
    /// Find the differences between two texts.
    ///
    /// With `checklines` set, large inputs are first coarsened to a
    /// line-level diff and the edit runs re-diffed, which is faster but may
    /// be non-minimal.
    pub fn diff_main(&self, text1: &str, text2: &str, checklines: bool) -> Vec<Diff> {
        let chars1: Vec<char> = text1.chars().collect();
        let chars2: Vec<char> = text2.chars().collect();
        self.diff_chars(&chars1, &chars2, checklines)
    }

    /// Find the differences between two scalar sequences.
    pub fn diff_chars(&self, text1: &[char], text2: &[char], checklines: bool) -> Vec<Diff> {
        let deadline = self.diff_timeout.map(|timeout| Instant::now() + timeout);
        self.diff_chars_internal(text1, text2, checklines, deadline)
    }

    fn diff_chars_internal(
        &self,
        text1: &[char],
        text2: &[char],
        checklines: bool,
        deadline: Option<Instant>,
    ) -> Vec<Diff> {
        if text1 == text2 {
            if text1.is_empty() {
                return Vec::new();
            }
            return vec![Diff::new(Op::Equal, chars_to_string(text1))];
        }
        // Trim off the common prefix and suffix (speedup).
        let prefix_len = common_prefix_length(text1, text2);
        let common_prefix = &text1[..prefix_len];
        let text1 = &text1[prefix_len..];
        let text2 = &text2[prefix_len..];
        let suffix_len = common_suffix_length(text1, text2);
        let common_suffix = &text1[text1.len() - suffix_len..];
        let text1 = &text1[..text1.len() - suffix_len];
        let text2 = &text2[..text2.len() - suffix_len];
        // Compute the diff on the middle block.
        let mut diffs = self.diff_compute(text1, text2, checklines, deadline);
        // Restore the prefix and suffix.
        if !common_prefix.is_empty() {
            diffs.insert(0, Diff::new(Op::Equal, chars_to_string(common_prefix)));
        }
        if !common_suffix.is_empty() {
            diffs.push(Diff::new(Op::Equal, chars_to_string(common_suffix)));
        }
        self.diff_cleanup_merge(diffs)
    }

    /// Find the differences between two texts that share no common affix.
    fn diff_compute(
        &self,
        text1: &[char],
        text2: &[char],
        checklines: bool,
        deadline: Option<Instant>,
    ) -> Vec<Diff> {
        if text1.is_empty() {
            // Just add some text (speedup).
            return vec![Diff::new(Op::Insert, chars_to_string(text2))];
        }
        if text2.is_empty() {
            // Just delete some text (speedup).
            return vec![Diff::new(Op::Delete, chars_to_string(text1))];
        }
        let (longtext, shorttext) = if text1.len() > text2.len() {
            (text1, text2)
        } else {
            (text2, text1)
        };
        if let Some(i) = index_of_chars(longtext, shorttext, 0) {
            // Shorter text is inside the longer text (speedup).
            let op = if text1.len() > text2.len() {
                Op::Delete
            } else {
                Op::Insert
            };
            return vec![
                Diff::new(op, chars_to_string(&longtext[..i])),
                Diff::new(Op::Equal, chars_to_string(shorttext)),
                Diff::new(op, chars_to_string(&longtext[i + shorttext.len()..])),
            ];
        }
        if shorttext.len() == 1 {
            // After the substring check the single scalar cannot be an
            // equality.
            return vec![
                Diff::new(Op::Delete, chars_to_string(text1)),
                Diff::new(Op::Insert, chars_to_string(text2)),
            ];
        }
        // Check whether the problem can be split in two.
        if let Some(hm) = self.half_match_chars(text1, text2) {
            let [text1_a, text1_b, text2_a, text2_b, mid_common] = hm;
            let mut diffs = self.diff_chars_internal(&text1_a, &text2_a, checklines, deadline);
            diffs.push(Diff::new(Op::Equal, chars_to_string(&mid_common)));
            diffs.extend(self.diff_chars_internal(&text1_b, &text2_b, checklines, deadline));
            return diffs;
        }
        if checklines && text1.len() > 100 && text2.len() > 100 {
            return self.diff_line_mode(text1, text2, deadline);
        }
        self.diff_bisect_chars(text1, text2, deadline)
    }

    /// Line-level coarsening: diff interned line indices, rehydrate, then
    /// re-diff the edit runs at scalar granularity.
    fn diff_line_mode(
        &self,
        text1: &[char],
        text2: &[char],
        deadline: Option<Instant>,
    ) -> Vec<Diff> {
        let text1 = chars_to_string(text1);
        let text2 = chars_to_string(text2);
        let (chars1, chars2, line_array) = self.diff_lines_to_chars(&text1, &text2);
        let c1: Vec<char> = chars1.chars().collect();
        let c2: Vec<char> = chars2.chars().collect();
        let diffs = self.diff_chars_internal(&c1, &c2, false, deadline);
        let diffs = self.diff_chars_to_lines(diffs, &line_array);
        // Eliminate freak matches such as blank lines.
        let mut diffs = self.diff_cleanup_semantic(diffs);
        // Re-diff any replacement blocks, this time scalar by scalar.
        diffs.push(Diff::new(Op::Equal, ""));
        let mut pointer = 0;
        let mut count_delete = 0;
        let mut count_insert = 0;
        let mut text_delete = String::new();
        let mut text_insert = String::new();
        while pointer < diffs.len() {
            match diffs[pointer].op {
                Op::Insert => {
                    count_insert += 1;
                    text_insert.push_str(&diffs[pointer].text);
                }
                Op::Delete => {
                    count_delete += 1;
                    text_delete.push_str(&diffs[pointer].text);
                }
                Op::Equal => {
                    if count_delete >= 1 && count_insert >= 1 {
                        let start = pointer - count_delete - count_insert;
                        let td: Vec<char> = text_delete.chars().collect();
                        let ti: Vec<char> = text_insert.chars().collect();
                        let sub = self.diff_chars_internal(&td, &ti, false, deadline);
                        let sub_len = sub.len();
                        diffs.splice(start..pointer, sub);
                        pointer = start + sub_len;
                    }
                    count_insert = 0;
                    count_delete = 0;
                    text_delete.clear();
                    text_insert.clear();
                }
            }
            pointer += 1;
        }
        diffs.pop(); // Remove the dummy entry.
        diffs
    }

    /// Find the middle snake of a diff, split the problem in two and return
    /// the recursively constructed diff.
    ///
    /// See Myers 1986: An O(ND) Difference Algorithm and Its Variations.
    pub fn diff_bisect(&self, text1: &str, text2: &str, deadline: Option<Instant>) -> Vec<Diff> {
        let chars1: Vec<char> = text1.chars().collect();
        let chars2: Vec<char> = text2.chars().collect();
        self.diff_bisect_chars(&chars1, &chars2, deadline)
    }

    fn diff_bisect_chars(
        &self,
        runes1: &[char],
        runes2: &[char],
        deadline: Option<Instant>,
    ) -> Vec<Diff> {
        let runes1_len = runes1.len() as isize;
        let runes2_len = runes2.len() as isize;
        let max_d = (runes1_len + runes2_len + 1) / 2;
        let v_offset = max_d;
        // The wavefront seeds index v_offset + 1; reserve the extra slot so
        // those accesses stay in bounds.
        let v_length = (2 * max_d + 2) as usize;
        let mut v1 = vec![-1isize; v_length];
        let mut v2 = vec![-1isize; v_length];
        v1[(v_offset + 1) as usize] = 0;
        v2[(v_offset + 1) as usize] = 0;
        let delta = runes1_len - runes2_len;
        // If the total number of scalars is odd, the front path will collide
        // with the reverse path.
        let front = delta % 2 != 0;
        // Offsets for the start and end of the k loop, pruning diagonals
        // that have run off the grid.
        let mut k1start = 0isize;
        let mut k1end = 0isize;
        let mut k2start = 0isize;
        let mut k2end = 0isize;
        for d in 0..max_d {
            // Bail out if the deadline is reached.
            if d % 16 == 0 {
                if let Some(deadline) = deadline {
                    if Instant::now() > deadline {
                        break;
                    }
                }
            }
            // Walk the front path one step.
            let mut k1 = -d + k1start;
            while k1 <= d - k1end {
                let k1_offset = (v_offset + k1) as usize;
                let mut x1 = if k1 == -d || (k1 != d && v1[k1_offset - 1] < v1[k1_offset + 1]) {
                    v1[k1_offset + 1]
                } else {
                    v1[k1_offset - 1] + 1
                };
                let mut y1 = x1 - k1;
                while x1 < runes1_len
                    && y1 < runes2_len
                    && runes1[x1 as usize] == runes2[y1 as usize]
                {
                    x1 += 1;
                    y1 += 1;
                }
                v1[k1_offset] = x1;
                if x1 > runes1_len {
                    // Ran off the right of the graph.
                    k1end += 2;
                } else if y1 > runes2_len {
                    // Ran off the bottom of the graph.
                    k1start += 2;
                } else if front {
                    let k2_offset = v_offset + delta - k1;
                    if k2_offset >= 0 && (k2_offset as usize) < v_length && v2[k2_offset as usize] != -1 {
                        // Mirror x2 onto the top-left coordinate system.
                        let x2 = runes1_len - v2[k2_offset as usize];
                        if x1 >= x2 {
                            // Overlap detected.
                            return self.diff_bisect_split(
                                runes1,
                                runes2,
                                x1 as usize,
                                y1 as usize,
                                deadline,
                            );
                        }
                    }
                }
                k1 += 2;
            }
            // Walk the reverse path one step.
            let mut k2 = -d + k2start;
            while k2 <= d - k2end {
                let k2_offset = (v_offset + k2) as usize;
                let mut x2 = if k2 == -d || (k2 != d && v2[k2_offset - 1] < v2[k2_offset + 1]) {
                    v2[k2_offset + 1]
                } else {
                    v2[k2_offset - 1] + 1
                };
                let mut y2 = x2 - k2;
                while x2 < runes1_len
                    && y2 < runes2_len
                    && runes1[(runes1_len - x2 - 1) as usize] == runes2[(runes2_len - y2 - 1) as usize]
                {
                    x2 += 1;
                    y2 += 1;
                }
                v2[k2_offset] = x2;
                if x2 > runes1_len {
                    // Ran off the left of the graph.
                    k2end += 2;
                } else if y2 > runes2_len {
                    // Ran off the top of the graph.
                    k2start += 2;
                } else if !front {
                    let k1_offset = v_offset + delta - k2;
                    if k1_offset >= 0 && (k1_offset as usize) < v_length && v1[k1_offset as usize] != -1 {
                        let x1 = v1[k1_offset as usize];
                        let y1 = v_offset + x1 - k1_offset;
                        // Mirror x2 onto the top-left coordinate system.
                        let x2 = runes1_len - x2;
                        if x1 >= x2 {
                            // Overlap detected.
                            return self.diff_bisect_split(
                                runes1,
                                runes2,
                                x1 as usize,
                                y1 as usize,
                                deadline,
                            );
                        }
                    }
                }
                k2 += 2;
            }
        }
        // Hit the deadline, or no commonality at all.
        vec![
            Diff::new(Op::Delete, chars_to_string(runes1)),
            Diff::new(Op::Insert, chars_to_string(runes2)),
        ]
    }

    fn diff_bisect_split(
        &self,
        runes1: &[char],
        runes2: &[char],
        x: usize,
        y: usize,
        deadline: Option<Instant>,
    ) -> Vec<Diff> {
        let mut diffs = self.diff_chars_internal(&runes1[..x], &runes2[..y], false, deadline);
        diffs.extend(self.diff_chars_internal(&runes1[x..], &runes2[y..], false, deadline));
        diffs
    }

    /// Intern the lines of both texts, returning the two index-stream
    /// encodings and the line array (index 0 is the empty sentinel).
    pub fn diff_lines_to_chars(&self, text1: &str, text2: &str) -> (String, String, Vec<String>) {
        let mut line_array: Vec<String> = vec![String::new()];
        let mut line_hash: HashMap<String, usize> = HashMap::new();
        let chars1 = lines_to_indices(text1, &mut line_array, &mut line_hash);
        let chars2 = lines_to_indices(text2, &mut line_array, &mut line_hash);
        (chars1, chars2, line_array)
    }

    /// Rehydrate index-stream diffs back to real lines of text.
    pub fn diff_chars_to_lines(&self, diffs: Vec<Diff>, line_array: &[String]) -> Vec<Diff> {
        diffs
            .into_iter()
            .map(|d| {
                let text: String = d
                    .text
                    .split(',')
                    .filter_map(|index| index.parse::<usize>().ok())
                    .filter_map(|index| line_array.get(index))
                    .map(String::as_str)
                    .collect();
                Diff::new(d.op, text)
            })
            .collect()
    }

    /// Length of the common prefix of two texts, in scalars.
    pub fn diff_common_prefix(&self, text1: &str, text2: &str) -> usize {
        let chars1: Vec<char> = text1.chars().collect();
        let chars2: Vec<char> = text2.chars().collect();
        common_prefix_length(&chars1, &chars2)
    }

    /// Length of the common suffix of two texts, in scalars.
    pub fn diff_common_suffix(&self, text1: &str, text2: &str) -> usize {
        let chars1: Vec<char> = text1.chars().collect();
        let chars2: Vec<char> = text2.chars().collect();
        common_suffix_length(&chars1, &chars2)
    }

    /// Length of the longest suffix of `text1` that is a prefix of `text2`,
    /// in scalars.
    pub fn diff_common_overlap(&self, text1: &str, text2: &str) -> usize {
        let chars1: Vec<char> = text1.chars().collect();
        let chars2: Vec<char> = text2.chars().collect();
        dmp_util::strings::common_overlap(&chars1, &chars2)
    }

    /// Check whether the two texts share a substring at least half the
    /// length of the longer text. Returns
    /// `[prefix1, suffix1, prefix2, suffix2, common]` or `None`.
    ///
    /// This speedup can produce non-minimal diffs.
    pub fn diff_half_match(&self, text1: &str, text2: &str) -> Option<[String; 5]> {
        let chars1: Vec<char> = text1.chars().collect();
        let chars2: Vec<char> = text2.chars().collect();
        self.half_match_chars(&chars1, &chars2)
            .map(|hm| hm.map(|piece| chars_to_string(&piece)))
    }

    fn half_match_chars(&self, text1: &[char], text2: &[char]) -> Option<[Vec<char>; 5]> {
        // Unlimited time means we must not risk a non-optimal diff.
        self.diff_timeout?;
        let (longtext, shorttext) = if text1.len() > text2.len() {
            (text1, text2)
        } else {
            (text2, text1)
        };
        if longtext.len() < 4 || shorttext.len() * 2 < longtext.len() {
            return None; // Pointless.
        }
        // Check whether the second quarter seeds a half-match.
        let hm1 = half_match_i(longtext, shorttext, (longtext.len() + 3) / 4);
        // And again based on the third quarter.
        let hm2 = half_match_i(longtext, shorttext, (longtext.len() + 1) / 2);
        let hm = match (hm1, hm2) {
            (None, None) => return None,
            (Some(hm), None) => hm,
            (None, Some(hm)) => hm,
            // Both matched: select the longest.
            (Some(hm1), Some(hm2)) => {
                if hm1[4].len() > hm2[4].len() {
                    hm1
                } else {
                    hm2
                }
            }
        };
        if text1.len() > text2.len() {
            Some(hm)
        } else {
            let [long_a, long_b, short_a, short_b, common] = hm;
            Some([short_a, short_b, long_a, long_b, common])
        }
    }

    /// Reduce the number of edits by eliminating semantically trivial
    /// equalities.
    pub fn diff_cleanup_semantic(&self, diffs: Vec<Diff>) -> Vec<Diff> {
        let mut diffs = diffs;
        let mut changes = false;
        // Stack of indices where equalities are found.
        let mut equalities: Vec<usize> = Vec::new();
        let mut last_equality = String::new();
        let mut pointer: isize = 0;
        // Number of scalars changed before and after the last equality.
        let mut length_insertions1 = 0usize;
        let mut length_deletions1 = 0usize;
        let mut length_insertions2 = 0usize;
        let mut length_deletions2 = 0usize;
        while (pointer as usize) < diffs.len() {
            let p = pointer as usize;
            if diffs[p].op == Op::Equal {
                equalities.push(p);
                length_insertions1 = length_insertions2;
                length_deletions1 = length_deletions2;
                length_insertions2 = 0;
                length_deletions2 = 0;
                last_equality = diffs[p].text.clone();
            } else {
                if diffs[p].op == Op::Insert {
                    length_insertions2 += diffs[p].text.chars().count();
                } else {
                    length_deletions2 += diffs[p].text.chars().count();
                }
                // Eliminate an equality smaller than or equal to the edits on
                // both sides of it.
                let difference1 = length_insertions1.max(length_deletions1);
                let difference2 = length_insertions2.max(length_deletions2);
                let last_len = last_equality.chars().count();
                if last_len > 0 && last_len <= difference1 && last_len <= difference2 {
                    if let Some(&ins_point) = equalities.last() {
                        // Duplicate record.
                        diffs.insert(ins_point, Diff::new(Op::Delete, last_equality.clone()));
                        // Change the second copy to an insert.
                        diffs[ins_point + 1].op = Op::Insert;
                        // Throw away the equality we just deleted, and the
                        // one before it since it needs reevaluation.
                        equalities.pop();
                        equalities.pop();
                        pointer = equalities.last().map_or(-1, |&q| q as isize);
                        length_insertions1 = 0;
                        length_deletions1 = 0;
                        length_insertions2 = 0;
                        length_deletions2 = 0;
                        last_equality.clear();
                        changes = true;
                    }
                }
            }
            pointer += 1;
        }
        // Normalize the diff.
        if changes {
            diffs = self.diff_cleanup_merge(diffs);
        }
        diffs = self.diff_cleanup_semantic_lossless(diffs);
        // Find overlaps between deletions and insertions, e.g.
        // <del>abcxxx</del><ins>xxxdef</ins> -> <del>abc</del>xxx<ins>def</ins>.
        // Only extract an overlap at least as big as the edit ahead or
        // behind it.
        let mut pointer = 1usize;
        while pointer < diffs.len() {
            if diffs[pointer - 1].op == Op::Delete && diffs[pointer].op == Op::Insert {
                let deletion: Vec<char> = diffs[pointer - 1].text.chars().collect();
                let insertion: Vec<char> = diffs[pointer].text.chars().collect();
                let overlap_length1 = dmp_util::strings::common_overlap(&deletion, &insertion);
                let overlap_length2 = dmp_util::strings::common_overlap(&insertion, &deletion);
                if overlap_length1 >= overlap_length2 {
                    if overlap_length1 as f64 >= deletion.len() as f64 / 2.0
                        || overlap_length1 as f64 >= insertion.len() as f64 / 2.0
                    {
                        // Overlap found; insert an equality and trim the
                        // surrounding edits.
                        diffs.insert(
                            pointer,
                            Diff::new(Op::Equal, chars_to_string(&insertion[..overlap_length1])),
                        );
                        diffs[pointer - 1].text =
                            chars_to_string(&deletion[..deletion.len() - overlap_length1]);
                        diffs[pointer + 1].text = chars_to_string(&insertion[overlap_length1..]);
                        pointer += 1;
                    }
                } else if overlap_length2 as f64 >= deletion.len() as f64 / 2.0
                    || overlap_length2 as f64 >= insertion.len() as f64 / 2.0
                {
                    // Reverse overlap: insert an equality and swap and trim
                    // the surrounding edits.
                    diffs.insert(
                        pointer,
                        Diff::new(Op::Equal, chars_to_string(&deletion[..overlap_length2])),
                    );
                    diffs[pointer - 1] = Diff::new(
                        Op::Insert,
                        chars_to_string(&insertion[..insertion.len() - overlap_length2]),
                    );
                    diffs[pointer + 1] =
                        Diff::new(Op::Delete, chars_to_string(&deletion[overlap_length2..]));
                    pointer += 1;
                }
                pointer += 1;
            }
            pointer += 1;
        }
        diffs
    }

    /// Look for single edits surrounded on both sides by equalities which
    /// can be shifted sideways to align to a word boundary, e.g.
    /// `The c<ins>at c</ins>ame.` -> `The <ins>cat </ins>came.`.
    pub fn diff_cleanup_semantic_lossless(&self, mut diffs: Vec<Diff>) -> Vec<Diff> {
        let mut pointer = 1usize;
        // The first and last element don't need checking.
        while pointer + 1 < diffs.len() {
            if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
                let mut equality1: Vec<char> = diffs[pointer - 1].text.chars().collect();
                let mut edit: Vec<char> = diffs[pointer].text.chars().collect();
                let mut equality2: Vec<char> = diffs[pointer + 1].text.chars().collect();

                // First, shift the edit as far left as possible.
                let common_offset = common_suffix_length(&equality1, &edit);
                if common_offset > 0 {
                    let common: Vec<char> = edit[edit.len() - common_offset..].to_vec();
                    equality1.truncate(equality1.len() - common_offset);
                    edit.truncate(edit.len() - common_offset);
                    let mut shifted = common.clone();
                    shifted.append(&mut edit);
                    edit = shifted;
                    let mut shifted = common;
                    shifted.append(&mut equality2);
                    equality2 = shifted;
                }

                // Second, step scalar by scalar right, looking for the best
                // fit.
                let mut best_equality1 = equality1.clone();
                let mut best_edit = edit.clone();
                let mut best_equality2 = equality2.clone();
                let mut best_score =
                    semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
                while !edit.is_empty() && !equality2.is_empty() && edit[0] == equality2[0] {
                    equality1.push(edit[0]);
                    edit.remove(0);
                    edit.push(equality2[0]);
                    equality2.remove(0);
                    let score =
                        semantic_score(&equality1, &edit) + semantic_score(&edit, &equality2);
                    // >= favors trailing over leading whitespace on the edit.
                    if score >= best_score {
                        best_score = score;
                        best_equality1 = equality1.clone();
                        best_edit = edit.clone();
                        best_equality2 = equality2.clone();
                    }
                }

                if diffs[pointer - 1].text.chars().ne(best_equality1.iter().copied()) {
                    // An improvement; save it back to the diff.
                    if !best_equality1.is_empty() {
                        diffs[pointer - 1].text = chars_to_string(&best_equality1);
                    } else {
                        diffs.remove(pointer - 1);
                        pointer -= 1;
                    }
                    diffs[pointer].text = chars_to_string(&best_edit);
                    if !best_equality2.is_empty() {
                        diffs[pointer + 1].text = chars_to_string(&best_equality2);
                    } else {
                        diffs.remove(pointer + 1);
                        pointer = pointer.saturating_sub(1);
                    }
                }
            }
            pointer += 1;
        }
        diffs
    }

    /// Reduce the number of edits by eliminating operationally trivial
    /// equalities.
    pub fn diff_cleanup_efficiency(&self, mut diffs: Vec<Diff>) -> Vec<Diff> {
        let mut changes = false;
        // Stack of indices where candidate equalities are found; truncating
        // it rewinds history past a split point.
        let mut equalities: Vec<usize> = Vec::new();
        let mut last_equality = String::new();
        let mut pointer: isize = 0;
        // Whether an insertion or deletion precedes/follows the last
        // equality.
        let mut pre_ins = false;
        let mut pre_del = false;
        let mut post_ins = false;
        let mut post_del = false;
        while (pointer as usize) < diffs.len() {
            let p = pointer as usize;
            if diffs[p].op == Op::Equal {
                if diffs[p].text.chars().count() < self.diff_edit_cost && (post_ins || post_del) {
                    // Candidate found.
                    equalities.push(p);
                    pre_ins = post_ins;
                    pre_del = post_del;
                    last_equality = diffs[p].text.clone();
                } else {
                    // Not a candidate, and can never become one.
                    equalities.clear();
                    last_equality.clear();
                }
                post_ins = false;
                post_del = false;
            } else {
                if diffs[p].op == Op::Delete {
                    post_del = true;
                } else {
                    post_ins = true;
                }
                // Five types to be split:
                // <ins>A</ins><del>B</del>XY<ins>C</ins><del>D</del>
                // <ins>A</ins>X<ins>C</ins><del>D</del>
                // <ins>A</ins><del>B</del>X<ins>C</ins>
                // <del>A</del>X<ins>C</ins><del>D</del>
                // <ins>A</ins><del>B</del>X<del>C</del>
                let sum_pres = usize::from(pre_ins)
                    + usize::from(pre_del)
                    + usize::from(post_ins)
                    + usize::from(post_del);
                if !last_equality.is_empty()
                    && ((pre_ins && pre_del && post_ins && post_del)
                        || (last_equality.chars().count() < self.diff_edit_cost / 2
                            && sum_pres == 3))
                {
                    if let Some(&ins_point) = equalities.last() {
                        // Duplicate record.
                        diffs.insert(ins_point, Diff::new(Op::Delete, last_equality.clone()));
                        // Change the second copy to an insert.
                        diffs[ins_point + 1].op = Op::Insert;
                        // Throw away the equality we just deleted.
                        equalities.pop();
                        last_equality.clear();
                        if pre_ins && pre_del {
                            // No changes made which could affect the
                            // previous entry; keep going.
                            post_ins = true;
                            post_del = true;
                            equalities.clear();
                        } else {
                            equalities.pop();
                            pointer = equalities.last().map_or(-1, |&q| q as isize);
                            post_ins = false;
                            post_del = false;
                        }
                        changes = true;
                    }
                }
            }
            pointer += 1;
        }
        if changes {
            diffs = self.diff_cleanup_merge(diffs);
        }
        diffs
    }

    /// Reorder and merge like edit sections, factoring out commonalities.
    /// Any edit section can move as long as it doesn't cross an equality.
    pub fn diff_cleanup_merge(&self, mut diffs: Vec<Diff>) -> Vec<Diff> {
        // Add a dummy entry at the end.
        diffs.push(Diff::new(Op::Equal, ""));
        let mut pointer = 0usize;
        let mut count_delete = 0usize;
        let mut count_insert = 0usize;
        let mut text_delete: Vec<char> = Vec::new();
        let mut text_insert: Vec<char> = Vec::new();
        while pointer < diffs.len() {
            if pointer < diffs.len() - 1 && diffs[pointer].text.is_empty() {
                diffs.remove(pointer);
                continue;
            }
            match diffs[pointer].op {
                Op::Insert => {
                    count_insert += 1;
                    text_insert.extend(diffs[pointer].text.chars());
                    pointer += 1;
                }
                Op::Delete => {
                    count_delete += 1;
                    text_delete.extend(diffs[pointer].text.chars());
                    pointer += 1;
                }
                Op::Equal => {
                    // Upon reaching an equality, check for prior
                    // redundancies.
                    if !text_delete.is_empty() || !text_insert.is_empty() {
                        if !text_delete.is_empty() && !text_insert.is_empty() {
                            // Factor out any common prefix.
                            let common = common_prefix_length(&text_insert, &text_delete);
                            if common != 0 {
                                let prefix = chars_to_string(&text_insert[..common]);
                                let x = pointer - count_delete - count_insert;
                                if x > 0 && diffs[x - 1].op == Op::Equal {
                                    diffs[x - 1].text.push_str(&prefix);
                                } else {
                                    diffs.insert(0, Diff::new(Op::Equal, prefix));
                                    pointer += 1;
                                }
                                text_insert.drain(..common);
                                text_delete.drain(..common);
                            }
                            // Factor out any common suffix.
                            let common = common_suffix_length(&text_insert, &text_delete);
                            if common != 0 {
                                let suffix =
                                    chars_to_string(&text_insert[text_insert.len() - common..]);
                                diffs[pointer].text.insert_str(0, &suffix);
                                text_insert.truncate(text_insert.len() - common);
                                text_delete.truncate(text_delete.len() - common);
                            }
                        }
                        // Replace the accumulated run with the merged
                        // records.
                        let start = pointer - count_delete - count_insert;
                        let mut merged: Vec<Diff> = Vec::with_capacity(2);
                        if !text_delete.is_empty() {
                            merged.push(Diff::new(Op::Delete, chars_to_string(&text_delete)));
                        }
                        if !text_insert.is_empty() {
                            merged.push(Diff::new(Op::Insert, chars_to_string(&text_insert)));
                        }
                        let merged_len = merged.len();
                        diffs.splice(start..pointer, merged);
                        pointer = start + merged_len;
                    }
                    // Merge this equality with the previous one.
                    if pointer != 0 && diffs[pointer - 1].op == Op::Equal {
                        let text = diffs.remove(pointer).text;
                        diffs[pointer - 1].text.push_str(&text);
                    } else {
                        pointer += 1;
                    }
                    count_insert = 0;
                    count_delete = 0;
                    text_delete.clear();
                    text_insert.clear();
                }
            }
        }
        if diffs.last().is_some_and(|d| d.text.is_empty()) {
            diffs.pop(); // Remove the dummy entry.
        }
        // Second pass: look for single edits surrounded on both sides by
        // equalities which can be shifted sideways to eliminate an equality,
        // e.g. A<ins>BA</ins>C -> <ins>AB</ins>AC.
        let mut changes = false;
        let mut pointer = 1usize;
        while pointer + 1 < diffs.len() {
            if diffs[pointer - 1].op == Op::Equal && diffs[pointer + 1].op == Op::Equal {
                let prev = diffs[pointer - 1].text.clone();
                let curr = diffs[pointer].text.clone();
                let next = diffs[pointer + 1].text.clone();
                if curr.ends_with(&prev) {
                    // Shift the edit over the previous equality.
                    diffs[pointer].text = format!("{}{}", prev, &curr[..curr.len() - prev.len()]);
                    diffs[pointer + 1].text = format!("{}{}", prev, next);
                    diffs.remove(pointer - 1);
                    changes = true;
                } else if curr.starts_with(&next) {
                    // Shift the edit over the next equality.
                    diffs[pointer - 1].text.push_str(&next);
                    diffs[pointer].text = format!("{}{}", &curr[next.len()..], next);
                    diffs.remove(pointer + 1);
                    changes = true;
                }
            }
            pointer += 1;
        }
        // If shifts were made, the diff needs reordering and another sweep.
        if changes {
            diffs = self.diff_cleanup_merge(diffs);
        }
        diffs
    }

    /// Translate a byte offset in the pre-image to the equivalent offset in
    /// the post-image. Deleted regions collapse to the deletion point.
    pub fn diff_x_index(&self, diffs: &[Diff], loc: usize) -> usize {
        let mut chars1 = 0usize;
        let mut chars2 = 0usize;
        let mut last_chars1 = 0usize;
        let mut last_chars2 = 0usize;
        let mut overshot: Option<&Diff> = None;
        for d in diffs {
            if d.op != Op::Insert {
                chars1 += d.text.len();
            }
            if d.op != Op::Delete {
                chars2 += d.text.len();
            }
            if chars1 > loc {
                overshot = Some(d);
                break;
            }
            last_chars1 = chars1;
            last_chars2 = chars2;
        }
        if let Some(d) = overshot {
            if d.op == Op::Delete {
                // The location was deleted.
                return last_chars2;
            }
        }
        last_chars2 + (loc - last_chars1)
    }

    /// The source text: all equalities and deletions.
    pub fn diff_text1(&self, diffs: &[Diff]) -> String {
        let mut text = String::new();
        for d in diffs {
            if d.op != Op::Insert {
                text.push_str(&d.text);
            }
        }
        text
    }

    /// The destination text: all equalities and insertions.
    pub fn diff_text2(&self, diffs: &[Diff]) -> String {
        let mut text = String::new();
        for d in diffs {
            if d.op != Op::Delete {
                text.push_str(&d.text);
            }
        }
        text
    }

    /// The Levenshtein distance: the number of inserted, deleted or
    /// substituted scalars.
    pub fn diff_levenshtein(&self, diffs: &[Diff]) -> usize {
        let mut levenshtein = 0;
        let mut insertions = 0;
        let mut deletions = 0;
        for d in diffs {
            match d.op {
                Op::Insert => insertions += d.text.chars().count(),
                Op::Delete => deletions += d.text.chars().count(),
                Op::Equal => {
                    // A deletion and an insertion is one substitution.
                    levenshtein += insertions.max(deletions);
                    insertions = 0;
                    deletions = 0;
                }
            }
        }
        levenshtein + insertions.max(deletions)
    }
}

fn lines_to_indices(
    text: &str,
    line_array: &mut Vec<String>,
    line_hash: &mut HashMap<String, usize>,
) -> String {
    let mut indices: Vec<String> = Vec::new();
    let mut line_start = 0;
    while line_start < text.len() {
        let line_end = match text[line_start..].find('\n') {
            Some(i) => line_start + i + 1,
            None => text.len(),
        };
        let line = &text[line_start..line_end];
        line_start = line_end;
        let index = match line_hash.get(line) {
            Some(&index) => index,
            None => {
                line_array.push(line.to_string());
                line_hash.insert(line.to_string(), line_array.len() - 1);
                line_array.len() - 1
            }
        };
        indices.push(index.to_string());
    }
    indices.join(",")
}

/// Seed a half-match probe at `i` in `longtext`. Returns the prefix and
/// suffix of the long text, the prefix and suffix of the short text and the
/// common middle, or `None` if the best common is under half the long text.
fn half_match_i(longtext: &[char], shorttext: &[char], i: usize) -> Option<[Vec<char>; 5]> {
    // Start with a quarter-length substring at position i as a seed.
    let seed = &longtext[i..i + longtext.len() / 4];
    let mut best_common: Vec<char> = Vec::new();
    let mut best_longtext_a: &[char] = &[];
    let mut best_longtext_b: &[char] = &[];
    let mut best_shorttext_a: &[char] = &[];
    let mut best_shorttext_b: &[char] = &[];
    let mut j_next = index_of_chars(shorttext, seed, 0);
    while let Some(j) = j_next {
        let prefix_length = common_prefix_length(&longtext[i..], &shorttext[j..]);
        let suffix_length = common_suffix_length(&longtext[..i], &shorttext[..j]);
        if best_common.len() < suffix_length + prefix_length {
            best_common = shorttext[j - suffix_length..j + prefix_length].to_vec();
            best_longtext_a = &longtext[..i - suffix_length];
            best_longtext_b = &longtext[i + prefix_length..];
            best_shorttext_a = &shorttext[..j - suffix_length];
            best_shorttext_b = &shorttext[j + prefix_length..];
        }
        j_next = index_of_chars(shorttext, seed, j + 1);
    }
    if best_common.len() * 2 < longtext.len() {
        return None;
    }
    Some([
        best_longtext_a.to_vec(),
        best_longtext_b.to_vec(),
        best_shorttext_a.to_vec(),
        best_shorttext_b.to_vec(),
        best_common,
    ])
}

static BLANK_LINE_END: OnceLock<Regex> = OnceLock::new();

fn blank_line_end() -> &'static Regex {
    BLANK_LINE_END.get_or_init(|| Regex::new(r"\n\r?\n$").expect("static pattern compiles"))
}

/// Score how well the boundary between `one` and `two` falls on logical
/// boundaries, from 6 (best) down to 0 (worst).
fn semantic_score(one: &[char], two: &[char]) -> u32 {
    if one.is_empty() || two.is_empty() {
        // Edges are the best.
        return 6;
    }
    let char1 = one[one.len() - 1];
    let char2 = two[0];
    let non_alnum1 = !char1.is_alphanumeric();
    let non_alnum2 = !char2.is_alphanumeric();
    let whitespace1 = non_alnum1 && char1.is_whitespace();
    let whitespace2 = non_alnum2 && char2.is_whitespace();
    let line_break1 = whitespace1 && (char1 == '\n' || char1 == '\r');
    let line_break2 = whitespace2 && (char2 == '\n' || char2 == '\r');
    let blank_line1 = line_break1 && {
        let tail: String = one[one.len().saturating_sub(3)..].iter().collect();
        blank_line_end().is_match(&tail)
    };
    let blank_line2 = line_break2 && {
        let tail: String = two[two.len().saturating_sub(3)..].iter().collect();
        blank_line_end().is_match(&tail)
    };
    if blank_line1 || blank_line2 {
        // Five points for blank lines.
        5
    } else if line_break1 || line_break2 {
        // Four points for line breaks.
        4
    } else if non_alnum1 && !whitespace1 && whitespace2 {
        // Three points for ends of sentences.
        3
    } else if whitespace1 || whitespace2 {
        // Two points for whitespace.
        2
    } else if non_alnum1 || non_alnum2 {
        // One point for non-alphanumeric.
        1
    } else {
        0
    }
}
