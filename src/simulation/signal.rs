use std::f32::consts::PI;

/// A level step: `len` samples that jump from `low` to `high` at `step_at`.
/// The classic input for eyeballing smoothing lag and overshoot.
pub fn step_trace(len: usize, low: u16, high: u16, step_at: usize) -> Vec<u16> {
    (0..len)
        .map(|i| if i < step_at { low } else { high })
        .collect()
}

/// A quantized tone riding on a DC offset, in raw counts.
pub fn tone_trace(
    len: usize,
    freq_hz: f32,
    sample_rate_hz: f32,
    offset: f32,
    amplitude: f32,
) -> Vec<u16> {
    (0..len)
        .map(|i| {
            let t = i as f32 / sample_rate_hz;
            let v = offset + amplitude * (2.0 * PI * freq_hz * t).sin();
            v.max(0.0) as u16
        })
        .collect()
}
