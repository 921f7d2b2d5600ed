/// First byte index of `pattern` in `haystack` at or after `from`.
///
/// A `from` beyond the haystack yields `None`; `from == 0` is a full search.
///
/// # Examples
///
/// ```
/// use dmp_util::strings::index_of;
///
/// assert_eq!(index_of("abcabc", "bc", 0), Some(1));
/// assert_eq!(index_of("abcabc", "bc", 2), Some(4));
/// assert_eq!(index_of("abcabc", "bc", 7), None);
/// ```
pub fn index_of(haystack: &str, pattern: &str, from: usize) -> Option<usize> {
    if from == 0 {
        return haystack.find(pattern);
    }
    if from > haystack.len() {
        return None;
    }
    let from = ceil_char_boundary(haystack, from);
    haystack[from..].find(pattern).map(|i| i + from)
}

/// Last byte index of `pattern` in `haystack` starting at or before `from`.
///
/// `from` names the last position a match may begin at; a `from` beyond the
/// haystack degrades to a full reverse search.
pub fn last_index_of(haystack: &str, pattern: &str, from: usize) -> Option<usize> {
    if from >= haystack.len() {
        return haystack.rfind(pattern);
    }
    // Include the scalar that starts at `from` in the searched window.
    let end = ceil_char_boundary(haystack, from + 1);
    haystack[..end].rfind(pattern)
}

/// First index of `pattern` in `haystack` at or after `from`, on scalar
/// sequences.
pub fn index_of_chars(haystack: &[char], pattern: &[char], from: usize) -> Option<usize> {
    if haystack.len() < pattern.len() {
        return None;
    }
    let last = haystack.len() - pattern.len();
    (from.min(haystack.len())..=last).find(|&i| &haystack[i..i + pattern.len()] == pattern)
}

/// Largest character boundary in `s` that is `<= index`.
pub fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Smallest character boundary in `s` that is `>= index`.
pub fn ceil_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index.min(s.len());
    while !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
