// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// Entry point for all user interaction, parsed with `clap`.
// All work is delegated to Layer 2 (application).
//
//   train    — train a model and keep the best checkpoint
//   embed    — hide a message in an image file
//   extract  — read a message back out of an image file
//   corrupt  — damage an image to probe robustness

pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, CorruptArgs, EmbedArgs, ExtractArgs, TrainArgs};

#[derive(Parser, Debug)]
#[command(
    name = "cryptonet",
    version,
    about = "Hide text in images with a jointly trained encoder/decoder network."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Route to the matching use case. The CLI layer only routes, it never computes.
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Train(args)   => run_train(args),
            Commands::Embed(args)   => run_embed(args),
            Commands::Extract(args) => run_extract(args),
            Commands::Corrupt(args) => run_corrupt(args),
        }
    }
}

fn run_train(args: TrainArgs) -> Result<()> {
    use crate::application::train_use_case::TrainUseCase;

    tracing::info!("Starting training, checkpoint base '{}'", args.checkpoint);
    let checkpoint = args.checkpoint.clone();
    let state = TrainUseCase::new(args.into()).execute()?;

    println!("Training finished ({state:?}). Best checkpoint: {checkpoint}");
    Ok(())
}

fn run_embed(args: EmbedArgs) -> Result<()> {
    use crate::application::embed_use_case::EmbedUseCase;

    let use_case = EmbedUseCase::new(&args.checkpoint)?;
    use_case.embed(&args.input, &args.message, &args.output, args.seed)?;
    println!("Message embedded into {}", args.output);
    Ok(())
}

fn run_extract(args: ExtractArgs) -> Result<()> {
    use crate::application::embed_use_case::EmbedUseCase;

    let use_case = EmbedUseCase::new(&args.checkpoint)?;
    let message = use_case.extract(&args.input)?;
    println!("\nMessage: {message}");
    Ok(())
}

fn run_corrupt(args: CorruptArgs) -> Result<()> {
    use crate::application::corrupt_use_case::CorruptUseCase;

    let use_case = CorruptUseCase::new(args.proportion, args.value, args.seed);
    let count = use_case.execute(&args.input, &args.output)?;
    println!("Overwrote {count} pixel draws, written to {}", args.output);
    Ok(())
}
