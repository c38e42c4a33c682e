//! Acquisition collaborators: anything that can produce one converted raw
//! count per call.
//!
//! The scheduler treats a source's latency as opaque but bounded, exactly as
//! it would a converter's end-of-conversion wait.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hound::WavReader;

use crate::config::SampleRate;
use crate::error::{PipelineError, Result};

/// Blocking "read one converted value" contract.
///
/// `Ok(None)` means the source is exhausted (finite replays); a live sensor
/// never returns it.
pub trait SampleSource: Send {
    fn read(&mut self) -> Result<Option<u16>>;
}

/// Deterministic synthetic sensor: a sine riding on a mid-scale DC offset,
/// quantized to raw counts.
pub struct SineSource {
    freq_hz: f32,
    sample_rate_hz: f32,
    offset: f32,
    amplitude: f32,
    full_scale: u16,
    index: u64,
}

impl SineSource {
    pub fn new(freq_hz: f32, sample_rate: SampleRate, full_scale: u16) -> Self {
        let mid = full_scale as f32 / 2.0;
        Self {
            freq_hz,
            sample_rate_hz: sample_rate.as_hz(),
            offset: mid,
            amplitude: mid * 0.9,
            full_scale,
            index: 0,
        }
    }

    /// Override the DC offset and amplitude, both in raw counts.
    pub fn with_levels(mut self, offset: f32, amplitude: f32) -> Self {
        self.offset = offset;
        self.amplitude = amplitude;
        self
    }
}

impl SampleSource for SineSource {
    fn read(&mut self) -> Result<Option<u16>> {
        let t = self.index as f32 / self.sample_rate_hz;
        self.index += 1;

        let value = self.offset + self.amplitude * (2.0 * std::f32::consts::PI * self.freq_hz * t).sin();
        Ok(Some(value.clamp(0.0, self.full_scale as f32) as u16))
    }
}

/// Replays a mono WAV file as raw counts, one sample per read.
///
/// Lets recorded sensor traces be pushed through the pipeline offline at any
/// tick rate.
#[derive(Debug)]
pub struct WavFileSource {
    samples: Vec<u16>,
    position: usize,
    sample_rate: u32,
}

impl WavFileSource {
    pub fn new<P: AsRef<Path>>(path: P, full_scale: u16) -> Result<Self> {
        let reader = WavReader::open(path.as_ref())
            .map_err(|e| PipelineError::Source(format!("{}: {}", path.as_ref().display(), e)))?;
        let spec = reader.spec();

        if spec.channels != 1 {
            return Err(PipelineError::Source(format!(
                "expected mono WAV file, got {} channels",
                spec.channels
            )));
        }

        let sample_rate = spec.sample_rate;
        let normalized = Self::read_samples(reader, &spec)?;

        // Map [-1, 1] onto the converter's count range.
        let mid = full_scale as f32 / 2.0;
        let samples = normalized
            .into_iter()
            .map(|s| (mid + s * mid).clamp(0.0, full_scale as f32) as u16)
            .collect();

        Ok(Self {
            samples,
            position: 0,
            sample_rate,
        })
    }

    /// Native sample rate of the recording.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total number of samples in the recording.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    fn read_samples(
        mut reader: WavReader<BufReader<File>>,
        spec: &hound::WavSpec,
    ) -> Result<Vec<f32>> {
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>(),
            hound::SampleFormat::Int => {
                let max_val = 2_i32.pow(spec.bits_per_sample as u32 - 1) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / max_val))
                    .collect::<std::result::Result<Vec<_>, _>>()
            }
        };
        samples.map_err(|e| PipelineError::Source(e.to_string()))
    }
}

impl SampleSource for WavFileSource {
    fn read(&mut self) -> Result<Option<u16>> {
        if self.position >= self.samples.len() {
            return Ok(None);
        }

        let sample = self.samples[self.position];
        self.position += 1;
        Ok(Some(sample))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_source_stays_in_range() {
        let mut source = SineSource::new(50.0, SampleRate::from_hz(1000.0), 4095);
        for _ in 0..10_000 {
            let v = source.read().unwrap().unwrap();
            assert!(v <= 4095);
        }
    }

    #[test]
    fn test_sine_source_oscillates_around_offset() {
        let mut source = SineSource::new(10.0, SampleRate::from_hz(1000.0), 4095);
        let mean: f64 = (0..1000)
            .map(|_| source.read().unwrap().unwrap() as f64)
            .sum::<f64>()
            / 1000.0;
        // Whole number of periods, so the mean sits at mid scale.
        assert!((mean - 2047.5).abs() < 10.0, "mean {}", mean);
    }

    #[test]
    fn test_missing_wav_is_source_error() {
        let err = WavFileSource::new("/nonexistent/trace.wav", 4095).unwrap_err();
        assert!(matches!(err, PipelineError::Source(_)));
    }
}
