//! Processing loop: drains the sample ring and feeds the FIR engine.

use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::filter::FirFilter;
use crate::ring::Consumer;

/// One element of the filtered output stream.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FilteredSample {
    /// Position in the consumed stream, starting at 0.
    pub seq: u64,
    /// Raw converter count as it came off the ring.
    pub raw: u16,
    /// FIR output for this sample, in the same count domain.
    pub filtered: f32,
}

/// Consumer-side half of the pipeline.
///
/// Owns the ring consumer and the filter; everything here runs on the
/// caller's thread and needs no synchronization.
pub struct Pipeline {
    rx: Consumer<u16>,
    filter: FirFilter,
    seq: u64,
    underflows: u64,
}

impl Pipeline {
    /// Build the pipeline from a validated configuration and the consumer
    /// half of a ring.
    pub fn new(config: &PipelineConfig, rx: Consumer<u16>) -> Result<Self> {
        let kernel = config.filter.build_kernel(config.acquisition.sample_rate)?;
        Ok(Self::with_filter(rx, FirFilter::new(kernel)?))
    }

    /// Build the pipeline around an already-constructed filter (custom
    /// kernels, tests).
    pub fn with_filter(rx: Consumer<u16>, filter: FirFilter) -> Self {
        Self {
            rx,
            filter,
            seq: 0,
            underflows: 0,
        }
    }

    /// Consume exactly one buffered sample.
    ///
    /// # Errors
    /// `PipelineError::Underflow` when the ring is empty. This is the normal
    /// idle state and is counted, not logged.
    pub fn try_step(&mut self) -> Result<FilteredSample> {
        let raw = match self.rx.get() {
            Ok(raw) => raw,
            Err(e @ PipelineError::Underflow) => {
                self.underflows += 1;
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let filtered = self.filter.update(raw as f32);
        let sample = FilteredSample {
            seq: self.seq,
            raw,
            filtered,
        };
        self.seq += 1;
        Ok(sample)
    }

    /// Drain everything currently buffered, in arrival order.
    pub fn poll(&mut self) -> Vec<FilteredSample> {
        let mut out = Vec::with_capacity(self.rx.len());
        while let Ok(sample) = self.try_step() {
            out.push(sample);
        }
        out
    }

    /// Number of samples waiting in the ring.
    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Total consumed sample count.
    pub fn consumed(&self) -> u64 {
        self.seq
    }

    /// Times the ring was found empty. Expected to grow whenever the
    /// consumer keeps up; not an error signal.
    pub fn underflows(&self) -> u64 {
        self.underflows
    }

    /// Most recent filter output.
    pub fn last_output(&self) -> f32 {
        self.filter.output()
    }
}
