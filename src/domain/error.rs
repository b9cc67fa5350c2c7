// ============================================================
// Layer 3 — Domain Error Types
// ============================================================
// Typed failures for every layer below the application.
// The application and CLI layers wrap these in anyhow with
// extra context; nothing below them returns anyhow::Error.

use thiserror::Error;

/// The dictionary cannot be built for the requested length.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DictionaryError {
    #[error("dictionary length must be at least 1")]
    Empty,

    /// Code points at or above U+D800 would fall into the surrogate block.
    #[error("dictionary length {0} exceeds the largest supported length 55296")]
    TooLarge(usize),
}

/// Message validation failures raised by the sentence codec.
/// None of these leave anything behind: no model call, no file write.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SentenceError {
    #[error("message length {actual} is outside the allowed range 1..={max}")]
    Length { actual: usize, max: usize },

    #[error("message contains reserved filler character {ch:?} at position {position}")]
    Charset { ch: char, position: usize },

    #[error("message character {ch:?} at position {position} is not in the {dictionary_length}-entry dictionary")]
    OutsideDictionary { ch: char, position: usize, dictionary_length: usize },

    #[error("code point {0} is not a valid character")]
    InvalidCodePoint(u32),
}

/// Image shape problems raised by the normalizer, codec and corruptor.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("image has zero extent ({height}x{width}x{channels})")]
    EmptyImage { height: usize, width: usize, channels: usize },

    #[error("image has {actual} channel(s) but {expected} are required")]
    ChannelMismatch { expected: usize, actual: usize },

    #[error("pixel buffer holds {actual} values, shape {height}x{width}x{channels} needs {expected}")]
    BufferSize { height: usize, width: usize, channels: usize, expected: usize, actual: usize },

    #[error("corruption proportion {0} must be between 0 and 1")]
    InvalidProportion(f64),

    #[error("corruption value has {actual} channel(s) but the image has {expected}")]
    CorruptValue { expected: usize, actual: usize },

    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// Early-stop observer construction failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ObserverError {
    #[error("unknown stop mode '{0}', expected 'min' or 'max'")]
    InvalidMode(String),
}

/// Problems with the persisted model configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid model configuration: {0}")]
    Invalid(String),

    /// The weights on disk were trained for different tensor shapes.
    #[error("configuration mismatch for {parameter}: configuration expects {expected:?}, checkpoint holds {actual:?}")]
    Mismatch { parameter: &'static str, expected: Vec<usize>, actual: Vec<usize> },
}

/// Fatal training failures. The run is aborted; recovery means
/// restarting with `load_existing` against the last good checkpoint.
#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("non-finite loss {value} at epoch {epoch}, step {step}")]
    NonFiniteLoss { epoch: usize, step: usize, value: f64 },

    #[error("metric '{0}' is not reported by the training loop")]
    UnknownMetric(String),

    #[error("checkpoint storage failed: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_mention_the_offending_values() {
        let e = SentenceError::Length { actual: 51, max: 50 };
        assert!(e.to_string().contains("51"));
        assert!(e.to_string().contains("1..=50"));

        let e = SentenceError::Charset { ch: '\u{00A0}', position: 3 };
        assert!(e.to_string().contains("position 3"));

        let e = ObserverError::InvalidMode("avg".into());
        assert!(e.to_string().contains("'avg'"));
    }
}
