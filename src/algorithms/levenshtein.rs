//! Case-insensitive Levenshtein (edit) distance and percentage similarity
//!
//! Both inputs are lower-cased before comparison. Lengths are measured in
//! `char`s of the lower-cased values, so a percentage can never leave
//! [0, 100].

use crate::error::{DedupError, Result};
use smallvec::SmallVec;

type CharBuf = SmallVec<[char; 64]>;

#[inline]
fn lowered(s: &str) -> CharBuf {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Edit distance over char slices, computed one row of the DP matrix at a
/// time with the shorter slice on the columns.
///
/// Returns `None` as soon as every cell of a row exceeds `bound`, or when
/// the final distance does. Pass `usize::MAX` for an unbounded distance.
fn banded_distance(a: &[char], b: &[char], bound: usize) -> Option<usize> {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };

    // Each extra char of the longer side costs at least one insertion
    if long.len() - short.len() > bound {
        return None;
    }
    if short.is_empty() {
        return Some(long.len());
    }

    let mut costs: SmallVec<[usize; 64]> = (0..=short.len()).collect();

    for (row, &lc) in long.iter().enumerate() {
        let mut diagonal = costs[0];
        costs[0] = row + 1;
        let mut row_best = costs[0];

        for (col, &sc) in short.iter().enumerate() {
            let above = costs[col + 1];
            let cell = if lc == sc {
                diagonal
            } else {
                1 + diagonal.min(above).min(costs[col])
            };
            diagonal = above;
            costs[col + 1] = cell;
            row_best = row_best.min(cell);
        }

        if row_best > bound {
            return None;
        }
    }

    costs.last().copied().filter(|&d| d <= bound)
}

fn unbounded(a: &[char], b: &[char]) -> usize {
    banded_distance(a, b, usize::MAX).unwrap_or_else(|| a.len().max(b.len()))
}

/// Minimum number of single-character insertions, deletions and
/// substitutions turning `a` into `b`, ignoring case.
///
/// # Example
/// ```
/// use fuzzydup::algorithms::levenshtein::edit_distance;
///
/// assert_eq!(edit_distance("Jon", "JOHN"), 1);
/// assert_eq!(edit_distance("kitten", "sitting"), 3);
/// ```
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    unbounded(&lowered(a), &lowered(b))
}

/// Case-insensitive edit distance, or `None` once it is known to exceed
/// `max_distance`.
///
/// Agrees with [`edit_distance`] whenever the distance is within bound.
#[must_use]
pub fn edit_distance_bounded(a: &str, b: &str, max_distance: usize) -> Option<usize> {
    banded_distance(&lowered(a), &lowered(b), max_distance)
}

/// Percentage similarity in [0, 100]:
/// `100 × (max_len − distance) / max_len`.
///
/// Two empty strings are identical and score 100.
///
/// # Example
/// ```
/// use fuzzydup::algorithms::levenshtein::similarity_percentage;
///
/// assert_eq!(similarity_percentage("John", "Jon"), 75.0);
/// assert_eq!(similarity_percentage("", ""), 100.0);
/// ```
#[must_use]
pub fn similarity_percentage(a: &str, b: &str) -> f64 {
    let a_chars = lowered(a);
    let b_chars = lowered(b);
    let max_len = a_chars.len().max(b_chars.len());
    if max_len == 0 {
        return 100.0;
    }
    let dist = unbounded(&a_chars, &b_chars);
    100.0 * (max_len - dist) as f64 / max_len as f64
}

/// [`edit_distance`] over possibly-absent values.
///
/// Fails with [`DedupError::InvalidInput`] if either side is `None`.
pub fn try_edit_distance(a: Option<&str>, b: Option<&str>) -> Result<usize> {
    let (a, b) = require_both(a, b)?;
    Ok(edit_distance(a, b))
}

/// [`similarity_percentage`] over possibly-absent values.
///
/// Fails with [`DedupError::InvalidInput`] if either side is `None`.
pub fn try_similarity_percentage(a: Option<&str>, b: Option<&str>) -> Result<f64> {
    let (a, b) = require_both(a, b)?;
    Ok(similarity_percentage(a, b))
}

fn require_both<'a>(a: Option<&'a str>, b: Option<&'a str>) -> Result<(&'a str, &'a str)> {
    match (a, b) {
        (Some(a), Some(b)) => Ok((a, b)),
        (None, _) => Err(DedupError::InvalidInput("left operand".to_string())),
        (_, None) => Err(DedupError::InvalidInput("right operand".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance_basic() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", "abc"), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("saturday", "sunday"), 3);
        assert_eq!(edit_distance("ab", "ba"), 2);
    }

    #[test]
    fn test_edit_distance_ignores_case() {
        assert_eq!(edit_distance("JOHN", "john"), 0);
        assert_eq!(edit_distance("Jon", "john"), 1);
        assert_eq!(edit_distance("ÉCOLE", "école"), 0);
    }

    #[test]
    fn test_edit_distance_unicode() {
        assert_eq!(edit_distance("café", "cafe"), 1);
        assert_eq!(edit_distance("日本語", "日本"), 1);
    }

    #[test]
    fn test_edit_distance_is_symmetric() {
        let pairs = [("Jon", "John"), ("111-22-3333", "999-88-7777"), ("", "x")];
        for (a, b) in pairs {
            assert_eq!(edit_distance(a, b), edit_distance(b, a));
        }
    }

    #[test]
    fn test_bounded_agrees_within_bound() {
        assert_eq!(edit_distance_bounded("Jon", "John", 2), Some(1));
        assert_eq!(edit_distance_bounded("abc", "abc", 0), Some(0));
        assert_eq!(edit_distance_bounded("", "ab", 2), Some(2));
        assert_eq!(edit_distance_bounded("111-22-3333", "999-88-7777", 2), None);
        assert_eq!(edit_distance_bounded("a", "abcd", 2), None);
        assert_eq!(edit_distance_bounded("kitten", "sitting", 3), Some(3));
        assert_eq!(edit_distance_bounded("kitten", "sitting", 2), None);
    }

    #[test]
    fn test_bounded_matches_unbounded_for_every_bound() {
        let words = ["", "jon", "john", "jonah", "mon", "5551234", "5552134", "kitten", "sitting"];
        for a in words {
            for b in words {
                let full = edit_distance(a, b);
                for bound in 0..=8 {
                    let expected = (full <= bound).then_some(full);
                    assert_eq!(edit_distance_bounded(a, b, bound), expected, "{a:?} {b:?} {bound}");
                }
            }
        }
    }

    #[test]
    fn test_similarity_percentage_identity() {
        for s in ["", "a", "Jon", "111-22-3333", "日本語"] {
            assert_eq!(similarity_percentage(s, s), 100.0);
        }
    }

    #[test]
    fn test_similarity_percentage_values() {
        assert_eq!(similarity_percentage("Jon", "John"), 75.0);
        assert_eq!(similarity_percentage("abc", "xyz"), 0.0);
        assert_eq!(similarity_percentage("abc", ""), 0.0);
        assert!((similarity_percentage("kitten", "sitting") - 400.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_similarity_percentage_symmetric_and_bounded() {
        let pairs = [("Jon", "John"), ("5551234", "5551243"), ("a", "bbbb"), ("", "z")];
        for (a, b) in pairs {
            let ab = similarity_percentage(a, b);
            assert_eq!(ab, similarity_percentage(b, a));
            assert!((0.0..=100.0).contains(&ab));
        }
    }

    #[test]
    fn test_similarity_non_increasing_with_distance() {
        // Same max length (4), growing distance
        let base = "abcd";
        let scores: Vec<f64> = ["abcd", "abcx", "abxx", "axxx", "xxxx"]
            .iter()
            .map(|s| similarity_percentage(base, s))
            .collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_try_variants_reject_missing_values() {
        assert_eq!(try_edit_distance(Some("Jon"), Some("John")), Ok(1));
        assert!(matches!(
            try_edit_distance(None, Some("John")),
            Err(DedupError::InvalidInput(_))
        ));
        assert!(matches!(
            try_similarity_percentage(Some("Jon"), None),
            Err(DedupError::InvalidInput(_))
        ));
        assert_eq!(try_similarity_percentage(Some(""), Some("")), Ok(100.0));
    }
}
