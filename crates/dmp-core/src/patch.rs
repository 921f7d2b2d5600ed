//! The patch engine: context-bearing patches built from a diff, split to the
//! match engine's word budget and applied against drifted text.
//!
//! Patch positions and lengths are byte offsets of the relevant text, for
//! compatibility with the wire format. Whenever a byte offset is cut out of
//! a live string it is snapped to a character boundary first.

use dmp_util::strings::{ceil_char_boundary, floor_char_boundary};

use crate::diff::{Diff, Op};
use crate::Config;

/// A patch: a run of diffs anchored by positions and lengths in the pre- and
/// post-image, wrapped in equality context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Patch {
    pub diffs: Vec<Diff>,
    pub start1: usize,
    pub start2: usize,
    pub length1: usize,
    pub length2: usize,
}

impl Config {
    /// Compute a list of patches to turn `text1` into `text2`.
    pub fn patch_make_from_texts(&self, text1: &str, text2: &str) -> Vec<Patch> {
        let mut diffs = self.diff_main(text1, text2, true);
        if diffs.len() > 2 {
            diffs = self.diff_cleanup_semantic(diffs);
            diffs = self.diff_cleanup_efficiency(diffs);
        }
        self.patch_make_from_text_and_diffs(text1, &diffs)
    }

    /// Compute a list of patches from a diff; the pre-image is recovered
    /// from the diff itself.
    pub fn patch_make_from_diffs(&self, diffs: &[Diff]) -> Vec<Patch> {
        let text1 = self.diff_text1(diffs);
        self.patch_make_from_text_and_diffs(&text1, diffs)
    }

    /// Compute a list of patches to turn `text1` into the post-image of
    /// `diffs`. This is the canonical constructor.
    pub fn patch_make_from_text_and_diffs(&self, text1: &str, diffs: &[Diff]) -> Vec<Patch> {
        let mut patches = Vec::new();
        if diffs.is_empty() {
            return patches;
        }
        let mut patch = Patch::default();
        let mut char_count1 = 0usize;
        let mut char_count2 = 0usize;
        // Start with text1 (prepatch) and apply the diffs until we arrive
        // at text2 (postpatch); the patches get their context from the
        // rolling prepatch text.
        let mut prepatch_text = text1.to_string();
        let mut postpatch_text = text1.to_string();
        for (i, d) in diffs.iter().enumerate() {
            if patch.diffs.is_empty() && d.op != Op::Equal {
                // A new patch starts here.
                patch.start1 = char_count1;
                patch.start2 = char_count2;
            }
            match d.op {
                Op::Insert => {
                    patch.diffs.push(d.clone());
                    patch.length2 += d.text.len();
                    postpatch_text.insert_str(char_count2, &d.text);
                }
                Op::Delete => {
                    patch.length1 += d.text.len();
                    patch.diffs.push(d.clone());
                    postpatch_text.replace_range(char_count2..char_count2 + d.text.len(), "");
                }
                Op::Equal => {
                    if d.text.len() <= 2 * self.patch_margin
                        && !patch.diffs.is_empty()
                        && i != diffs.len() - 1
                    {
                        // Small equality inside a patch.
                        patch.diffs.push(d.clone());
                        patch.length1 += d.text.len();
                        patch.length2 += d.text.len();
                    }
                    if d.text.len() >= 2 * self.patch_margin && !patch.diffs.is_empty() {
                        // Time for a new patch.
                        patch = self.patch_add_context(patch, &prepatch_text);
                        patches.push(patch);
                        patch = Patch::default();
                        // Unlike unidiff, these patch lists have a rolling
                        // context: update the prepatch text and position to
                        // reflect the application of the just-completed
                        // patch.
                        prepatch_text = postpatch_text.clone();
                        char_count1 = char_count2;
                    }
                }
            }
            if d.op != Op::Insert {
                char_count1 += d.text.len();
            }
            if d.op != Op::Delete {
                char_count2 += d.text.len();
            }
        }
        // Pick up the leftover patch if not empty.
        if !patch.diffs.is_empty() {
            patch = self.patch_add_context(patch, &prepatch_text);
            patches.push(patch);
        }
        patches
    }

    /// Deprecated constructor kept for callers of the historical three-value
    /// signature; `text2` is ignored.
    #[deprecated(note = "use patch_make_from_text_and_diffs; text2 is unused")]
    pub fn patch_make_from_text_text_diffs(
        &self,
        text1: &str,
        _text2: &str,
        diffs: &[Diff],
    ) -> Vec<Patch> {
        self.patch_make_from_text_and_diffs(text1, diffs)
    }

    /// Grow the patch's equality context until its pattern is unique in
    /// `text`, without expanding beyond the bitap budget.
    pub fn patch_add_context(&self, mut patch: Patch, text: &str) -> Patch {
        if text.is_empty() {
            return patch;
        }
        let mut pattern = &text[patch.start2..patch.start2 + patch.length1];
        let mut padding = 0;
        // Look for the first and last matches of the pattern; while they
        // disagree, the pattern is ambiguous and needs more context.
        let budget = self.match_max_bits.saturating_sub(2 * self.patch_margin);
        while text.find(pattern) != text.rfind(pattern) && pattern.len() < budget {
            padding += self.patch_margin;
            let max_start = floor_char_boundary(text, patch.start2.saturating_sub(padding));
            let min_end =
                ceil_char_boundary(text, (patch.start2 + patch.length1 + padding).min(text.len()));
            pattern = &text[max_start..min_end];
        }
        // Add one chunk for good luck.
        padding += self.patch_margin;
        // Add the prefix.
        let prefix =
            &text[floor_char_boundary(text, patch.start2.saturating_sub(padding))..patch.start2];
        if !prefix.is_empty() {
            patch.diffs.insert(0, Diff::new(Op::Equal, prefix));
        }
        // Add the suffix.
        let suffix_end =
            ceil_char_boundary(text, (patch.start2 + patch.length1 + padding).min(text.len()));
        let suffix = &text[patch.start2 + patch.length1..suffix_end];
        if !suffix.is_empty() {
            patch.diffs.push(Diff::new(Op::Equal, suffix));
        }
        // Roll back the start points and extend the lengths.
        patch.start1 -= prefix.len();
        patch.start2 -= prefix.len();
        patch.length1 += prefix.len() + suffix.len();
        patch.length2 += prefix.len() + suffix.len();
        patch
    }

    /// Break up any patches longer than the maximum pattern length of the
    /// match engine.
    pub fn patch_split_max(&self, patches: Vec<Patch>) -> Vec<Patch> {
        let patch_size = self.match_max_bits;
        let margin = self.patch_margin;
        let edit_budget = patch_size.saturating_sub(margin);
        let mut result: Vec<Patch> = Vec::new();
        for big in patches {
            if big.length1 <= patch_size {
                result.push(big);
                continue;
            }
            let mut big = big;
            let mut start1 = big.start1;
            let mut start2 = big.start2;
            let mut precontext = String::new();
            while !big.diffs.is_empty() {
                // Create one of several smaller patches.
                let mut patch = Patch {
                    start1: start1 - precontext.len(),
                    start2: start2 - precontext.len(),
                    ..Patch::default()
                };
                let mut empty = true;
                if !precontext.is_empty() {
                    patch.length1 = precontext.len();
                    patch.length2 = precontext.len();
                    patch.diffs.push(Diff::new(Op::Equal, precontext.clone()));
                }
                while !big.diffs.is_empty() && patch.length1 < edit_budget {
                    let diff_type = big.diffs[0].op;
                    if diff_type == Op::Insert {
                        // Insertions are harmless.
                        let d = big.diffs.remove(0);
                        patch.length2 += d.text.len();
                        start2 += d.text.len();
                        patch.diffs.push(d);
                        empty = false;
                    } else if diff_type == Op::Delete
                        && patch.diffs.len() == 1
                        && patch.diffs[0].op == Op::Equal
                        && big.diffs[0].text.len() > 2 * patch_size
                    {
                        // This is a large deletion; let it pass in one
                        // chunk.
                        let d = big.diffs.remove(0);
                        patch.length1 += d.text.len();
                        start1 += d.text.len();
                        empty = false;
                        patch.diffs.push(d);
                    } else {
                        // Deletion or equality; only take as much as fits.
                        let text = &big.diffs[0].text;
                        let mut cut = floor_char_boundary(
                            text,
                            text.len().min(edit_budget - patch.length1),
                        );
                        if cut == 0 {
                            // Never stall on a multibyte scalar at the cut
                            // point.
                            cut = ceil_char_boundary(text, 1);
                        }
                        let piece = text[..cut].to_string();
                        patch.length1 += piece.len();
                        start1 += piece.len();
                        if diff_type == Op::Equal {
                            patch.length2 += piece.len();
                            start2 += piece.len();
                        } else {
                            empty = false;
                        }
                        patch.diffs.push(Diff::new(diff_type, piece.clone()));
                        if piece == big.diffs[0].text {
                            big.diffs.remove(0);
                        } else {
                            big.diffs[0].text.replace_range(..cut, "");
                        }
                    }
                }
                // Compute the head context for the next patch.
                let text2 = self.diff_text2(&patch.diffs);
                let head_start =
                    floor_char_boundary(&text2, text2.len().saturating_sub(margin));
                precontext = text2[head_start..].to_string();
                // Append the end context for this patch.
                let rest1 = self.diff_text1(&big.diffs);
                let postcontext = if rest1.len() > margin {
                    rest1[..ceil_char_boundary(&rest1, margin)].to_string()
                } else {
                    rest1
                };
                if !postcontext.is_empty() {
                    patch.length1 += postcontext.len();
                    patch.length2 += postcontext.len();
                    if patch.diffs.last().is_some_and(|d| d.op == Op::Equal) {
                        if let Some(d) = patch.diffs.last_mut() {
                            d.text.push_str(&postcontext);
                        }
                    } else {
                        patch.diffs.push(Diff::new(Op::Equal, postcontext));
                    }
                }
                if !empty {
                    result.push(patch);
                }
            }
        }
        result
    }

    /// Add padding on the start and end of all patches so edge edits have
    /// context to anchor against. Returns the padding string and mutates the
    /// patches in place.
    pub fn patch_add_padding(&self, patches: &mut Vec<Patch>) -> String {
        let padding_length = self.patch_margin;
        let null_padding: String = (1..=padding_length).map(|x| char::from(x as u8)).collect();
        if patches.is_empty() {
            return null_padding;
        }
        // Bump all the patches forward.
        for patch in patches.iter_mut() {
            patch.start1 += padding_length;
            patch.start2 += padding_length;
        }
        // Add some padding on the start of the first diff.
        let first = &mut patches[0];
        if first.diffs.first().map_or(true, |d| d.op != Op::Equal) {
            first.diffs.insert(0, Diff::new(Op::Equal, null_padding.clone()));
            first.start1 -= padding_length; // Should be 0.
            first.start2 -= padding_length;
            first.length1 += padding_length;
            first.length2 += padding_length;
        } else if padding_length > first.diffs[0].text.len() {
            // Grow the first equality.
            let extra = padding_length - first.diffs[0].text.len();
            first.diffs[0].text =
                format!("{}{}", &null_padding[first.diffs[0].text.len()..], first.diffs[0].text);
            first.start1 -= extra;
            first.start2 -= extra;
            first.length1 += extra;
            first.length2 += extra;
        }
        // Add some padding on the end of the last diff.
        let last_index = patches.len() - 1;
        let last = &mut patches[last_index];
        if last.diffs.last().map_or(true, |d| d.op != Op::Equal) {
            last.diffs.push(Diff::new(Op::Equal, null_padding.clone()));
            last.length1 += padding_length;
            last.length2 += padding_length;
        } else {
            let tail_len = last.diffs.last().map_or(0, |d| d.text.len());
            if padding_length > tail_len {
                // Grow the last equality.
                let extra = padding_length - tail_len;
                if let Some(d) = last.diffs.last_mut() {
                    d.text.push_str(&null_padding[..extra]);
                }
                last.length1 += extra;
                last.length2 += extra;
            }
        }
        null_padding
    }

    /// Merge a set of patches onto `text`. Returns the patched text and a
    /// per-patch vector of application results.
    pub fn patch_apply(&self, patches: &[Patch], text: &str) -> (String, Vec<bool>) {
        if patches.is_empty() {
            return (text.to_string(), Vec::new());
        }
        // Work on a copy so no changes are made to the originals.
        let mut patches_copy = patches.to_vec();
        let null_padding = self.patch_add_padding(&mut patches_copy);
        let mut text = format!("{null_padding}{text}{null_padding}");
        let patches = self.patch_split_max(patches_copy);
        // delta tracks the offset between the expected and actual location
        // of the previous patch. If there are patches expected at positions
        // 10 and 20, but the first was found at 12, delta is 2 and the
        // second patch has an effective expected position of 22.
        let mut delta: isize = 0;
        let mut results = vec![false; patches.len()];
        for (x, patch) in patches.iter().enumerate() {
            let expected_loc = patch.start2 as isize + delta;
            let clamped_loc = expected_loc.max(0) as usize;
            let text1 = self.diff_text1(&patch.diffs);
            let mut start_loc: Option<usize>;
            let mut end_loc: Option<usize> = None;
            if text1.len() > self.match_max_bits {
                // patch_split_max only provides an oversized pattern in the
                // case of a monster delete; locate the two edges
                // independently.
                let head = &text1[..floor_char_boundary(&text1, self.match_max_bits)];
                start_loc = self.match_main(&text, head, clamped_loc);
                if start_loc.is_some() {
                    let tail_start =
                        ceil_char_boundary(&text1, text1.len() - self.match_max_bits);
                    let tail = &text1[tail_start..];
                    let tail_loc = (expected_loc + tail_start as isize).max(0) as usize;
                    end_loc = self.match_main(&text, tail, tail_loc);
                    if end_loc.is_none() || start_loc >= end_loc {
                        // Can't find a valid trailing context. Drop this
                        // patch.
                        start_loc = None;
                    }
                }
            } else {
                start_loc = self.match_main(&text, &text1, clamped_loc);
            }
            match start_loc {
                None => {
                    // No match found. Subtract the delta for this failed
                    // patch from subsequent patches.
                    results[x] = false;
                    delta -= patch.length2 as isize - patch.length1 as isize;
                }
                Some(found_loc) => {
                    results[x] = true;
                    delta = found_loc as isize - expected_loc;
                    let start_loc = floor_char_boundary(&text, found_loc);
                    let window_end = match end_loc {
                        Some(end_loc) => ceil_char_boundary(
                            &text,
                            (end_loc + self.match_max_bits).min(text.len()),
                        ),
                        None => {
                            ceil_char_boundary(&text, (start_loc + text1.len()).min(text.len()))
                        }
                    };
                    let text2 = text[start_loc..window_end].to_string();
                    if text1 == text2 {
                        // Perfect match: just shove the replacement text in.
                        text.replace_range(
                            start_loc..start_loc + text1.len(),
                            &self.diff_text2(&patch.diffs),
                        );
                    } else {
                        // Imperfect match: run a diff to get a framework of
                        // equivalent indices.
                        let diffs = self.diff_main(&text1, &text2, false);
                        let text1_scalars = text1.chars().count().max(1);
                        if text1.len() > self.match_max_bits
                            && self.diff_levenshtein(&diffs) as f64 / text1_scalars as f64
                                > self.patch_delete_threshold
                        {
                            // The end points match, but the content is
                            // unacceptably bad.
                            results[x] = false;
                        } else {
                            let diffs = self.diff_cleanup_semantic_lossless(diffs);
                            let mut index1 = 0usize;
                            for d in &patch.diffs {
                                if d.op != Op::Equal {
                                    let index2 = self.diff_x_index(&diffs, index1);
                                    match d.op {
                                        Op::Insert => {
                                            let at = floor_char_boundary(&text, start_loc + index2);
                                            text.insert_str(at, &d.text);
                                        }
                                        Op::Delete => {
                                            let del_start =
                                                floor_char_boundary(&text, start_loc + index2);
                                            let del_end = floor_char_boundary(
                                                &text,
                                                start_loc
                                                    + self
                                                        .diff_x_index(&diffs, index1 + d.text.len()),
                                            );
                                            text.replace_range(del_start..del_end.max(del_start), "");
                                        }
                                        Op::Equal => {}
                                    }
                                }
                                if d.op != Op::Delete {
                                    index1 += d.text.len();
                                }
                            }
                        }
                    }
                }
            }
        }
        // Strip the padding off.
        let end = text.len().saturating_sub(null_padding.len()).max(null_padding.len());
        let stripped = text[null_padding.len()..end].to_string();
        (stripped, results)
    }
}
