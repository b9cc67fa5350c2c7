// ============================================================
// Layer 3 — Model Configuration Record
// ============================================================
// The five values that fix every tensor shape of a trained model.
// Written once when training starts, saved next to the weights
// and read back verbatim for inference or resumption:
//
//   {
//     "imageSize": 100,
//     "greyScale": false,
//     "sentenceLength": 100,
//     "dictionaryLength": 200,
//     "batchSize": 32
//   }
//
// The weights are meaningless without it.

use serde::{Deserialize, Serialize};

use crate::domain::dictionary::Dictionary;
use crate::domain::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ModelConfiguration {
    pub image_size:        usize,
    pub grey_scale:        bool,
    pub sentence_length:   usize,
    pub dictionary_length: usize,
    pub batch_size:        usize,
}

impl ModelConfiguration {
    /// Build a validated configuration. The sentence length always equals
    /// the image side, so it is derived rather than passed in.
    pub fn new(
        image_size:        usize,
        grey_scale:        bool,
        dictionary_length: usize,
        batch_size:        usize,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            image_size,
            grey_scale,
            sentence_length: image_size,
            dictionary_length,
            batch_size,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Checks applied to freshly built and to loaded records alike.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.image_size == 0 {
            return Err(ConfigError::Invalid("imageSize must be positive".into()));
        }
        if self.sentence_length != self.image_size {
            return Err(ConfigError::Invalid(format!(
                "sentenceLength ({}) must equal imageSize ({})",
                self.sentence_length, self.image_size
            )));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::Invalid("batchSize must be positive".into()));
        }
        Dictionary::new(self.dictionary_length)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(())
    }

    pub fn channels(&self) -> usize {
        if self.grey_scale { 1 } else { 3 }
    }

    /// Canonical (height, width, channels).
    pub fn image_shape(&self) -> (usize, usize, usize) {
        (self.image_size, self.image_size, self.channels())
    }

    pub fn dictionary(&self) -> Result<Dictionary, ConfigError> {
        Dictionary::new(self.dictionary_length).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

impl Default for ModelConfiguration {
    fn default() -> Self {
        Self {
            image_size:        100,
            grey_scale:        true,
            sentence_length:   100,
            dictionary_length: 200,
            batch_size:        32,
        }
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_has_exactly_the_five_fields() {
        let cfg = ModelConfiguration::new(64, false, 200, 16).unwrap();
        let value = serde_json::to_value(cfg).unwrap();
        let obj = value.as_object().unwrap();

        let mut keys: Vec<&str> = obj.keys().map(|k| k.as_str()).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            ["batchSize", "dictionaryLength", "greyScale", "imageSize", "sentenceLength"]
        );

        let back: ModelConfiguration = serde_json::from_value(value).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let json = r#"{"imageSize":4,"greyScale":true,"sentenceLength":4,
                       "dictionaryLength":10,"batchSize":2,"extra":1}"#;
        assert!(serde_json::from_str::<ModelConfiguration>(json).is_err());
    }

    #[test]
    fn test_sentence_length_must_match_image_size() {
        let cfg = ModelConfiguration { sentence_length: 99, ..ModelConfiguration::default() };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_channels_follow_grey_scale() {
        assert_eq!(ModelConfiguration::new(8, true, 20, 1).unwrap().image_shape(), (8, 8, 1));
        assert_eq!(ModelConfiguration::new(8, false, 20, 1).unwrap().image_shape(), (8, 8, 3));
    }

    #[test]
    fn test_rejects_zero_sizes() {
        assert!(ModelConfiguration::new(0, true, 20, 1).is_err());
        assert!(ModelConfiguration::new(8, true, 20, 0).is_err());
        assert!(ModelConfiguration::new(8, true, 0, 1).is_err());
    }
}
