//! Stock smoothing kernels.
//!
//! The pipeline does not design filters at runtime; kernels are built once
//! at startup from closed-form expressions and handed to `FirFilter` as
//! shared slices. Both constructors normalize to unit DC gain so a constant
//! input passes through unchanged.

use std::f32::consts::PI;
use std::sync::Arc;

use crate::error::{PipelineError, Result};

/// Boxcar kernel: the plain moving average over the last `num_taps` samples.
pub fn moving_average(num_taps: usize) -> Result<Arc<[f32]>> {
    if num_taps == 0 {
        return Err(PipelineError::Config(
            "moving average needs at least one tap".into(),
        ));
    }

    let weight = 1.0 / num_taps as f32;
    Ok(vec![weight; num_taps].into())
}

/// Hamming-windowed sinc lowpass kernel.
///
/// # Arguments
/// * `num_taps` - Kernel length (rounded up to odd for a symmetric,
///   linear-phase response)
/// * `cutoff_hz` - Lowpass cutoff frequency in Hz
/// * `sample_rate` - Sampling rate in Hz
///
/// # Errors
/// Returns `PipelineError::Config` if the cutoff does not fall strictly
/// between zero and the Nyquist frequency.
pub fn lowpass(num_taps: usize, cutoff_hz: f32, sample_rate: f32) -> Result<Arc<[f32]>> {
    if num_taps == 0 {
        return Err(PipelineError::Config(
            "lowpass kernel needs at least one tap".into(),
        ));
    }
    if cutoff_hz <= 0.0 || cutoff_hz >= sample_rate / 2.0 {
        return Err(PipelineError::Config(format!(
            "lowpass cutoff {} Hz outside (0, {}) at {} Hz sampling",
            cutoff_hz,
            sample_rate / 2.0,
            sample_rate
        )));
    }

    let num_taps = if num_taps.is_multiple_of(2) {
        num_taps + 1
    } else {
        num_taps
    };
    let center = (num_taps / 2) as f32;
    let fc = cutoff_hz / sample_rate;

    let mut taps = Vec::with_capacity(num_taps);
    for i in 0..num_taps {
        let n = i as f32 - center;
        let sinc = if n == 0.0 {
            2.0 * fc
        } else {
            (2.0 * PI * fc * n).sin() / (PI * n)
        };
        let window = 0.54 - 0.46 * (2.0 * PI * i as f32 / (num_taps - 1) as f32).cos();
        taps.push(sinc * window);
    }

    // Normalize to unit DC gain.
    let sum: f32 = taps.iter().sum();
    for tap in taps.iter_mut() {
        *tap /= sum;
    }

    Ok(taps.into())
}
