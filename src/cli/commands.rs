// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the subcommands `train`, `embed`, `extract` and
// `corrupt` with all their flags.

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the encoder/decoder pair on synthetic data
    Train(TrainArgs),

    /// Hide a message in an image using a trained checkpoint
    Embed(EmbedArgs),

    /// Read a hidden message back out of an image
    Extract(ExtractArgs),

    /// Overwrite a share of an image's pixels with one colour
    Corrupt(CorruptArgs),
}

/// All arguments for the `train` command.
#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Base path for the weights, config record and metrics CSV
    #[arg(long, default_value = "weights/best_grey")]
    pub checkpoint: String,

    /// Side length of the square images; also the sentence length
    #[arg(long, default_value_t = 100)]
    pub image_size: usize,

    /// Train on colour (3-channel) images instead of greyscale
    #[arg(long)]
    pub color: bool,

    /// Number of code points the model can recognise;
    /// the top fifth is reserved for padding
    #[arg(long, default_value_t = 200)]
    pub dictionary_length: usize,

    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Optimisation steps (batches) per epoch
    #[arg(long, default_value_t = 100)]
    pub steps_per_epoch: usize,

    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Continue from an existing checkpoint at --checkpoint
    #[arg(long)]
    pub load_existing: bool,

    /// Seed for reproducible synthetic data
    #[arg(long)]
    pub seed: Option<u64>,

    /// Metric whose improvement writes a new checkpoint
    #[arg(long, default_value = "image_loss")]
    pub monitor: String,

    /// Stop early once this metric crosses --stop-threshold
    #[arg(long)]
    pub stop_metric: Option<String>,

    /// "min" stops below the threshold, "max" above it
    #[arg(long, default_value = "min")]
    pub stop_mode: String,

    #[arg(long, default_value_t = 0.0)]
    pub stop_threshold: f64,
}

/// The application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            checkpoint:        a.checkpoint,
            image_size:        a.image_size,
            grey_scale:        !a.color,
            dictionary_length: a.dictionary_length,
            batch_size:        a.batch_size,
            epochs:            a.epochs,
            steps_per_epoch:   a.steps_per_epoch,
            lr:                a.lr,
            load_existing:     a.load_existing,
            seed:              a.seed,
            monitor:           a.monitor,
            stop_metric:       a.stop_metric,
            stop_mode:         a.stop_mode,
            stop_threshold:    a.stop_threshold,
        }
    }
}

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Cover image to hide the message in
    #[arg(long)]
    pub input: String,

    /// Where to write the embedded image
    #[arg(long)]
    pub output: String,

    #[arg(long)]
    pub message: String,

    /// Checkpoint base path written by `train`
    #[arg(long, default_value = "weights/best_grey")]
    pub checkpoint: String,

    /// Seed for the padding placement
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Image that carries a message
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "weights/best_grey")]
    pub checkpoint: String,
}

#[derive(Args, Debug)]
pub struct CorruptArgs {
    #[arg(long)]
    pub input: String,

    #[arg(long)]
    pub output: String,

    /// Share of H·W pixel draws to overwrite, in [0, 1]
    #[arg(long, default_value_t = 0.1)]
    pub proportion: f64,

    /// Replacement colour in [0, 1], one value or one per channel
    #[arg(long, value_delimiter = ',', default_value = "0")]
    pub value: Vec<f32>,

    #[arg(long)]
    pub seed: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn test_train_flags_map_into_config() {
        let cli = Cli::try_parse_from([
            "cryptonet", "train", "--color", "--image-size", "64",
            "--stop-metric", "image_loss", "--stop-threshold", "0.01",
        ])
        .unwrap();
        let Commands::Train(args) = cli.command else { panic!("expected train") };
        let cfg: TrainConfig = args.into();
        assert!(!cfg.grey_scale);
        assert_eq!(cfg.image_size, 64);
        assert_eq!(cfg.stop_metric.as_deref(), Some("image_loss"));
        assert_eq!(cfg.stop_mode, "min");
        assert_eq!(cfg.monitor, "image_loss");
    }

    #[test]
    fn test_corrupt_value_list() {
        let cli = Cli::try_parse_from([
            "cryptonet", "corrupt", "--input", "a.png", "--output", "b.png", "--value", "1,0,0.5",
        ])
        .unwrap();
        let Commands::Corrupt(args) = cli.command else { panic!("expected corrupt") };
        assert_eq!(args.value, vec![1.0, 0.0, 0.5]);
    }
}
