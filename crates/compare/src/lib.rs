//! `patterncmp-compare`: alignment and error statistics for antenna patterns.
//!
//! Pure engine crate: receives two sampled gain patterns, returns an immutable
//! comparison (statistics, ranking, pixel-aligned grids). No CLI or display
//! dependencies.

pub mod align;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod model;
pub mod rank;
pub mod stats;

pub use config::CompareConfig;
pub use engine::{load_csv_samples, read_samples, run};
pub use error::{CompareError, ErrorKind};
pub use model::{CompareInput, ComparisonResult, SampleRecord, SampleSet, Source};
