//! Streaming FIR filter engine.
//!
//! Holds a borrowed-by-Arc coefficient kernel and a same-length circular
//! history of the most recent samples. Each `update` produces one output:
//! the causal convolution of the kernel with the history, tap 0 weighting
//! the newest sample and the last tap weighting the oldest.

use std::sync::Arc;

use crate::error::{PipelineError, Result};

pub struct FirFilter {
    /// Coefficient kernel, shared with the caller; never copied or mutated.
    kernel: Arc<[f32]>,
    /// Circular history, same length as the kernel, zeroed at construction
    /// so the cold-start transient needs no special casing.
    history: Box<[f32]>,
    /// Index of the slot the next sample will overwrite (the oldest sample).
    pos: usize,
    /// Most recently computed output.
    out: f32,
}

impl FirFilter {
    /// Bind a kernel and allocate the matching history buffer.
    ///
    /// # Errors
    /// `PipelineError::Config` if the kernel is empty, or
    /// `PipelineError::Allocation` if history storage cannot be obtained.
    pub fn new(kernel: Arc<[f32]>) -> Result<Self> {
        if kernel.is_empty() {
            return Err(PipelineError::Config("FIR kernel must not be empty".into()));
        }

        let mut history = Vec::new();
        history
            .try_reserve_exact(kernel.len())
            .map_err(|e| PipelineError::Allocation(e.to_string()))?;
        history.resize(kernel.len(), 0.0);

        Ok(Self {
            kernel,
            history: history.into_boxed_slice(),
            pos: 0,
            out: 0.0,
        })
    }

    /// Push one sample through the filter and return the new output.
    ///
    /// Never fails for finite input; non-finite samples propagate through
    /// the arithmetic untouched.
    pub fn update(&mut self, sample: f32) -> f32 {
        self.history[self.pos] = sample;

        // Walk the history newest-to-oldest in two contiguous reverse
        // ranges, avoiding modulo arithmetic in the inner loop.
        let n = self.kernel.len();
        let mut acc = 0.0f32;
        let mut tap = 0usize;
        for idx in (0..=self.pos).rev() {
            acc += self.kernel[tap] * self.history[idx];
            tap += 1;
        }
        for idx in ((self.pos + 1)..n).rev() {
            acc += self.kernel[tap] * self.history[idx];
            tap += 1;
        }
        debug_assert_eq!(tap, n);

        self.pos += 1;
        if self.pos == n {
            self.pos = 0;
        }

        self.out = acc;
        acc
    }

    /// Filter an entire buffer of samples in-place.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.update(*sample);
        }
    }

    /// Most recent output (zero before the first `update`).
    pub fn output(&self) -> f32 {
        self.out
    }

    /// Kernel length (number of taps).
    pub fn num_taps(&self) -> usize {
        self.kernel.len()
    }

    /// The bound coefficient kernel.
    pub fn taps(&self) -> &[f32] {
        &self.kernel
    }
}
