// ============================================================
// Layer 3 — Dictionary & Pepper Partition
// ============================================================
// The model recognises D integer code points. Code point i is
// the Unicode scalar i, so text converts with a plain cast.
//
//   [0, ⌈0.8·D⌉)   message range — allowed in user messages
//   [⌈0.8·D⌉, D)   pepper range  — random filler only
//
// The partition is a pure function of D. Sender and receiver
// both read D from the persisted configuration, so they always
// agree on it without storing the partition anywhere.

use std::collections::BTreeSet;

use crate::domain::error::DictionaryError;

/// First surrogate code point; every index below it is a valid `char`.
pub const MAX_DICTIONARY_LENGTH: usize = 0xD800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dictionary {
    length: usize,
    pepper_start: usize,
}

impl Dictionary {
    pub fn new(length: usize) -> Result<Self, DictionaryError> {
        if length == 0 {
            return Err(DictionaryError::Empty);
        }
        if length > MAX_DICTIONARY_LENGTH {
            return Err(DictionaryError::TooLarge(length));
        }
        // ⌈0.8·D⌉ = ⌈4D / 5⌉, kept in integers so no float rounding creeps in
        let pepper_start = (4 * length).div_ceil(5);
        Ok(Self { length, pepper_start })
    }

    /// Total number of code points, `D`.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Always false: construction rejects `D = 0`.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Index of the first pepper code point.
    pub fn pepper_start(&self) -> usize {
        self.pepper_start
    }

    /// Number of pepper code points, `D - ⌈0.8·D⌉`.
    pub fn pepper_len(&self) -> usize {
        self.length - self.pepper_start
    }

    pub fn contains(&self, ch: char) -> bool {
        (ch as usize) < self.length
    }

    pub fn is_pepper(&self, ch: char) -> bool {
        let code = ch as usize;
        code >= self.pepper_start && code < self.length
    }

    pub fn pepper_set(&self) -> BTreeSet<char> {
        self.pepper_chars().into_iter().collect()
    }

    /// Pepper characters in code-point order, for uniform sampling.
    pub fn pepper_chars(&self) -> Vec<char> {
        (self.pepper_start..self.length)
            .filter_map(|code| char::from_u32(code as u32))
            .collect()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pepper_is_top_fifth() {
        let d = Dictionary::new(200).unwrap();
        assert_eq!(d.pepper_start(), 160);
        assert_eq!(d.pepper_len(), 40);
        assert!(d.is_pepper(char::from_u32(160).unwrap()));
        assert!(d.is_pepper(char::from_u32(199).unwrap()));
        assert!(!d.is_pepper(char::from_u32(159).unwrap()));
        // Beyond the dictionary is neither message nor pepper
        assert!(!d.is_pepper(char::from_u32(200).unwrap()));
        assert!(!d.contains(char::from_u32(200).unwrap()));
    }

    #[test]
    fn test_pepper_size_and_disjointness_for_many_lengths() {
        for length in 1..=500usize {
            let d = Dictionary::new(length).unwrap();
            let start = ((0.8 * length as f64) - 1e-9).ceil() as usize;
            let pepper = d.pepper_set();

            assert_eq!(d.pepper_start(), start, "D={length}");
            assert_eq!(pepper.len(), length - start, "D={length}");
            assert!(pepper.iter().all(|&c| (c as usize) >= start && (c as usize) < length));
        }
    }

    #[test]
    fn test_odd_lengths_round_up() {
        // 0.8 * 7 = 5.6 → pepper starts at 6
        let d = Dictionary::new(7).unwrap();
        assert_eq!(d.pepper_start(), 6);
        assert_eq!(d.pepper_chars(), vec!['\u{6}']);
    }

    #[test]
    fn test_rejects_degenerate_lengths() {
        assert_eq!(Dictionary::new(0), Err(DictionaryError::Empty));
        assert_eq!(
            Dictionary::new(MAX_DICTIONARY_LENGTH + 1),
            Err(DictionaryError::TooLarge(MAX_DICTIONARY_LENGTH + 1)),
        );
        assert!(Dictionary::new(MAX_DICTIONARY_LENGTH).is_ok());
    }
}
