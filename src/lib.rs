pub mod acquire;
pub mod config;
pub mod error;
pub mod filter;
pub mod output;
pub mod pipeline;
pub mod ring;

#[cfg(feature = "simulation")]
pub mod simulation;

pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use filter::FirFilter;
pub use pipeline::{FilteredSample, Pipeline};
pub use ring::SampleRing;
