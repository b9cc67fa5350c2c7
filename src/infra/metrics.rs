// ============================================================
// Layer 6 — Metrics Logger
// ============================================================
// Records training metrics to a CSV file after each epoch.
//
// Output file: <checkpoint base>.metrics.csv
//
//   epoch,loss,image_loss,sentence_loss,sentence_accuracy
//   1,5.412012,0.208733,5.203279,0.006200
//   2,4.981220,0.101944,4.879276,0.021400
//   ...
//
// Rows are appended, so a resumed run continues the same file.
// `best()` reads it back to recover the best value seen so far.

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::domain::epoch_metrics::{EpochMetrics, METRIC_NAMES};

const HEADER: &str = "epoch,loss,image_loss,sentence_loss,sentence_accuracy";

/// Logs epoch metrics to a CSV file for later analysis.
pub struct MetricsLogger {
    csv_path: PathBuf,
}

impl MetricsLogger {
    /// Writes the CSV header if the file doesn't exist yet.
    pub fn new(csv_path: impl Into<PathBuf>) -> Result<Self> {
        let csv_path = csv_path.into();

        if let Some(parent) = csv_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        if !csv_path.exists() {
            let mut f = fs::File::create(&csv_path)
                .with_context(|| format!("Cannot create '{}'", csv_path.display()))?;
            writeln!(f, "{HEADER}")?;
            tracing::debug!("Created metrics CSV: '{}'", csv_path.display());
        }

        Ok(Self { csv_path })
    }

    /// Append one epoch's metrics as a new row in the CSV.
    pub fn log(&self, m: &EpochMetrics) -> Result<()> {
        let mut f = OpenOptions::new()
            .append(true)
            .open(&self.csv_path)?;

        writeln!(
            f,
            "{},{:.6},{:.6},{:.6},{:.6}",
            m.epoch,
            m.loss,
            m.image_loss,
            m.sentence_loss,
            m.sentence_accuracy,
        )?;

        tracing::debug!(
            "Logged epoch {} metrics: loss={:.4}, image_loss={:.4}",
            m.epoch,
            m.loss,
            m.image_loss,
        );

        Ok(())
    }

    /// Smallest (or, with `maximize`, largest) logged value of `metric`.
    /// None when the file has no rows yet or the metric is unknown.
    pub fn best(&self, metric: &str, maximize: bool) -> Result<Option<f64>> {
        read_best(&self.csv_path, metric, maximize)
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

fn read_best(path: &Path, metric: &str, maximize: bool) -> Result<Option<f64>> {
    let Some(column) = METRIC_NAMES.iter().position(|&n| n == metric) else {
        return Ok(None);
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Cannot read '{}'", path.display()))?;

    let best = text
        .lines()
        .skip(1)
        // column 0 is the epoch number
        .filter_map(|line| line.split(',').nth(column + 1))
        .filter_map(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .reduce(|a, b| if maximize { a.max(b) } else { a.min(b) });

    Ok(best)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_then_rows() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().join("run.metrics.csv")).unwrap();
        logger.log(&EpochMetrics::new(1, 0.5, 2.0, 0.1)).unwrap();
        logger.log(&EpochMetrics::new(2, 0.25, 1.0, 0.3)).unwrap();

        let text = fs::read_to_string(logger.csv_path()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "1,2.500000,0.500000,2.000000,0.100000");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csv");
        MetricsLogger::new(&path).unwrap().log(&EpochMetrics::new(1, 0.9, 1.0, 0.0)).unwrap();
        MetricsLogger::new(&path).unwrap().log(&EpochMetrics::new(2, 0.4, 1.0, 0.0)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_best_value_per_metric() {
        let dir = tempfile::tempdir().unwrap();
        let logger = MetricsLogger::new(dir.path().join("m.csv")).unwrap();
        assert_eq!(logger.best("image_loss", false).unwrap(), None);

        for (epoch, image_loss, acc) in [(1, 1.0, 0.1), (2, 0.8, 0.4), (3, 0.9, 0.2)] {
            logger.log(&EpochMetrics::new(epoch, image_loss, 1.0, acc)).unwrap();
        }
        assert_eq!(logger.best("image_loss", false).unwrap(), Some(0.8));
        assert_eq!(logger.best("sentence_accuracy", true).unwrap(), Some(0.4));
        assert_eq!(logger.best("val_loss", false).unwrap(), None);
    }
}
