//! nastools - housekeeping for a music NAS
//!
//! Splits single-file cue/audio rips into per-track files, files finished
//! albums into an artist-organized library, prints directory trees and
//! fetches downloads with retries.
//!
//! # Architecture
//!
//! - **commands**: CLI command implementations (fix-unsplit-cue, move-completed, dir-tree, download)
//! - **core**: Pipelines and helpers (scanner, splitter, cleanup, driver, artist inference, downloader)
//! - **models**: Data structures (config, pairs, cue sheets, run summaries)
//! - **error**: Error types

pub mod commands;
pub mod core;
pub mod error;
pub mod models;

pub use error::{NasError, Result};
