// ============================================================
// Layer 3 — Epoch Metrics
// ============================================================
// The numbers the training loop reports after every epoch.
// Observers look metrics up by name so the same early-stop
// observer can watch any of them.
//
//   loss               image_loss + sentence_loss
//   image_loss         mean absolute pixel difference
//   sentence_loss      cross-entropy over the dictionary
//   sentence_accuracy  per-position top-1 accuracy, [0, 1]

pub const METRIC_NAMES: [&str; 4] = ["loss", "image_loss", "sentence_loss", "sentence_accuracy"];

/// One row of metrics for a single training epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    /// The epoch number (starts at 1)
    pub epoch: usize,

    pub loss: f64,

    pub image_loss: f64,

    pub sentence_loss: f64,

    pub sentence_accuracy: f64,
}

impl EpochMetrics {
    pub fn new(
        epoch:             usize,
        image_loss:        f64,
        sentence_loss:     f64,
        sentence_accuracy: f64,
    ) -> Self {
        Self {
            epoch,
            loss: image_loss + sentence_loss,
            image_loss,
            sentence_loss,
            sentence_accuracy,
        }
    }

    pub fn metric(&self, name: &str) -> Option<f64> {
        match name {
            "loss"              => Some(self.loss),
            "image_loss"        => Some(self.image_loss),
            "sentence_loss"     => Some(self.sentence_loss),
            "sentence_accuracy" => Some(self.sentence_accuracy),
            _ => None,
        }
    }
}

pub fn is_known_metric(name: &str) -> bool {
    METRIC_NAMES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        let m = EpochMetrics::new(3, 0.25, 1.5, 0.4);
        assert_eq!(m.metric("loss"), Some(1.75));
        assert_eq!(m.metric("image_loss"), Some(0.25));
        assert_eq!(m.metric("sentence_accuracy"), Some(0.4));
        assert_eq!(m.metric("val_loss"), None);
        assert!(METRIC_NAMES.iter().all(|n| m.metric(n).is_some()));
    }
}
