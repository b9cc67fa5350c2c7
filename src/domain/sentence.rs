// ============================================================
// Layer 3 — Sentence Codec
// ============================================================
// Converts between text and the fixed-length integer sequences
// the model consumes, and implements the pepper padding protocol.
//
//   "hi"  ──preprocess(L=6)──►  [ ¥ h ¬ ¨ i ª ]   (pepper anywhere)
//   [ ¥ h ¬ ¨ i ª ]  ──postprocess──►  "hi"
//
// Padding positions are drawn uniformly at every insertion, so
// filler can land before, between or after the real characters.

use rand::Rng;

use crate::domain::dictionary::Dictionary;
use crate::domain::error::SentenceError;

/// Map each character to its code point.
pub fn encode_chars(text: &str) -> Vec<u32> {
    text.chars().map(|c| c as u32).collect()
}

/// Inverse of [`encode_chars`].
pub fn decode_chars(codes: &[u32]) -> Result<String, SentenceError> {
    codes
        .iter()
        .map(|&code| char::from_u32(code).ok_or(SentenceError::InvalidCodePoint(code)))
        .collect()
}

/// Check a message against the length and charset rules without padding it.
pub fn validate(sentence: &str, max_len: usize, dictionary: &Dictionary) -> Result<(), SentenceError> {
    let len = sentence.chars().count();
    if len == 0 || len > max_len {
        return Err(SentenceError::Length { actual: len, max: max_len });
    }

    for (position, ch) in sentence.chars().enumerate() {
        if dictionary.is_pepper(ch) {
            return Err(SentenceError::Charset { ch, position });
        }
        if !dictionary.contains(ch) {
            return Err(SentenceError::OutsideDictionary {
                ch,
                position,
                dictionary_length: dictionary.len(),
            });
        }
    }
    Ok(())
}

/// Pad `sentence` to exactly `max_len` characters with randomly placed
/// pepper characters and return the code points.
pub fn preprocess<R: Rng>(
    sentence:   &str,
    max_len:    usize,
    dictionary: &Dictionary,
    rng:        &mut R,
) -> Result<Vec<u32>, SentenceError> {
    validate(sentence, max_len, dictionary)?;

    let pepper = dictionary.pepper_chars();
    let mut chars: Vec<char> = sentence.chars().collect();

    // Dictionaries shorter than 5 have no pepper, so nothing can pad
    if pepper.is_empty() && chars.len() < max_len {
        return Err(SentenceError::Length { actual: chars.len(), max: max_len });
    }

    while chars.len() < max_len {
        // Index range is inclusive of len so filler can also trail the message
        let at = rng.gen_range(0..=chars.len());
        let filler = pepper[rng.gen_range(0..pepper.len())];
        chars.insert(at, filler);
    }

    Ok(chars.into_iter().map(|c| c as u32).collect())
}

/// Strip every pepper character, keeping the rest in order.
pub fn postprocess(decoded: &str, dictionary: &Dictionary) -> String {
    decoded.chars().filter(|&c| !dictionary.is_pepper(c)).collect()
}
