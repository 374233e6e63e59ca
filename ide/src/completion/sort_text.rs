//! Sort-key arithmetic.
//!
//! Editors order entries by comparing `sort_text` as plain strings. Stages only ever
//! derive a new key from an existing one, so that the engine's coarse buckets stay intact:
//!
//! - [`boost`] moves a key ahead of every key that does not start with `!`.
//! - [`refine`] orders keys that share the same base. `\u{1}` sorts below every printable
//!   character, so a refined key stays next to its base and never jumps over a
//!   neighbouring bucket (`"1"` refined can not pass `"10"`).
//! - [`finalize`] makes the keys of a sorted list pairwise distinct.

const BOOST_MARK: char = '!';
const REFINE_SEPARATOR: char = '\u{1}';
const FINAL_SEPARATOR: char = '\u{0}';
const MIN_INDEX_WIDTH: usize = 4;

pub(crate) fn boost(base: &str) -> String {
    format!("{BOOST_MARK}{base}")
}

pub(crate) fn is_boosted(key: &str) -> bool {
    key.starts_with(BOOST_MARK)
}

/// Orders entries with the same `base` by `rank`. Earlier refinements dominate later ones.
pub(crate) fn refine(base: &str, rank: u16) -> String {
    format!("{base}{REFINE_SEPARATOR}{rank:04}")
}

/// Rewrites the keys of an already sorted list so they strictly increase.
pub(crate) fn finalize<'a>(keys: impl ExactSizeIterator<Item = &'a mut String>) {
    let width = index_width(keys.len());
    for (idx, key) in keys.enumerate() {
        key.push(FINAL_SEPARATOR);
        key.push_str(&format!("{idx:0width$}"));
    }
}

fn index_width(len: usize) -> usize {
    let digits = len.saturating_sub(1).max(1).ilog10() as usize + 1;
    digits.max(MIN_INDEX_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refined_keys_stay_inside_their_bucket() {
        let refined = refine("1", 9999);
        assert!(refined.as_str() > "1");
        assert!(refined.as_str() < "10");
        assert!(refine("1", 1) < refine("1", 2));
        assert!(refine(&refine("1", 1), 9) < refine(&refine("1", 2), 0));
    }

    #[test]
    fn boosted_keys_come_first() {
        assert!(boost("9").as_str() < "0");
        assert!(is_boosted(&boost("11")));
    }

    #[test]
    fn finalize_widens_for_long_lists() {
        assert_eq!(index_width(1), 4);
        assert_eq!(index_width(10_000), 4);
        assert_eq!(index_width(10_001), 5);

        let mut keys = vec!["1".to_string(), "1".to_string(), "2".to_string()];
        finalize(keys.iter_mut());
        assert_eq!(keys, ["1\u{0}0000", "1\u{0}0001", "2\u{0}0002"]);
    }
}
