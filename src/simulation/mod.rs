//! Synthetic-signal helpers for exercising the pipeline without hardware.
//! Compiled only with the `simulation` feature; the integration tests enable
//! it through the self dev-dependency.

mod noise;
mod signal;

pub use noise::NoisySource;
pub use signal::{step_trace, tone_trace};
