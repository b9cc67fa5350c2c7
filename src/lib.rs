#![recursion_limit = "256"]

//! Learned image steganography: a jointly trained encoder/decoder
//! pair hides short text messages inside images.
//!
//! Layers, outermost first:
//!
//! - [`cli`]          argument parsing, routes to use cases
//! - [`application`]  train / embed / extract / corrupt workflows
//! - [`domain`]       dictionary, sentence codec, image buffer, config record
//! - [`data`]         normalizer, raster codec, synthetic batches
//! - [`ml`]           burn model, training loop, inference
//! - [`infra`]        checkpoint and metrics files

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod ml;
pub mod infra;
