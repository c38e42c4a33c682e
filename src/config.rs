//! Configuration for the firline acquisition pipeline.
//!
//! All parameters are set once at startup; in particular the filter kernel
//! is fixed for the life of the pipeline (no runtime reconfiguration).

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PipelineError, Result};
use crate::filter::kernels;

/// Sampling rate specification
///
/// Can be specified as either a rate in Hz/kHz or a period in microseconds.
/// Useful when a timer period is known exactly but the rate is a repeating
/// decimal.
///
/// # Parsing formats
/// - `1000` - rate in Hz (no suffix)
/// - `1000hz` or `1000Hz` - rate in Hz (explicit)
/// - `8khz` or `8kHz` - rate in kilohertz
/// - `125us` or `125μs` - period in microseconds
///
/// # Example
/// ```
/// use firline::config::SampleRate;
///
/// // 125 μs period = 8 kHz
/// let rate: SampleRate = "125us".parse().unwrap();
/// assert!((rate.as_hz() - 8000.0).abs() < 0.001);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SampleRate(f32);

impl SampleRate {
    /// Create from rate in Hz
    pub fn from_hz(hz: f32) -> Self {
        Self(hz)
    }

    /// Create from period in microseconds
    pub fn from_interval_us(us: f32) -> Self {
        Self(1_000_000.0 / us)
    }

    /// Get rate in Hz
    pub fn as_hz(&self) -> f32 {
        self.0
    }

    /// Get period in microseconds
    pub fn as_interval_us(&self) -> f32 {
        1_000_000.0 / self.0
    }

    /// Get the period as a `Duration`, for driving a periodic timer.
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.0 as f64)
    }
}

impl Default for SampleRate {
    fn default() -> Self {
        // 1 ms timer tick, the usual general-purpose-timer default
        Self::from_hz(1000.0)
    }
}

impl fmt::Display for SampleRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}hz", self.0)
    }
}

impl FromStr for SampleRate {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();

        // Check for microsecond suffix (us or μs)
        if let Some(num) = s.strip_suffix("us").or_else(|| s.strip_suffix("μs")) {
            let us: f32 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid interval: {}", s))?;
            if us <= 0.0 {
                return Err("interval must be positive".to_string());
            }
            return Ok(Self::from_interval_us(us));
        }

        // Check for kHz suffix (case insensitive)
        if let Some(num) = s
            .strip_suffix("khz")
            .or_else(|| s.strip_suffix("kHz"))
            .or_else(|| s.strip_suffix("KHZ"))
        {
            let khz: f32 = num
                .trim()
                .parse()
                .map_err(|_| format!("invalid rate: {}", s))?;
            if khz <= 0.0 {
                return Err("rate must be positive".to_string());
            }
            return Ok(Self::from_hz(khz * 1000.0));
        }

        // Check for Hz suffix (case insensitive)
        let num = s
            .strip_suffix("hz")
            .or_else(|| s.strip_suffix("Hz"))
            .or_else(|| s.strip_suffix("HZ"))
            .unwrap_or(s);

        let hz: f32 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid rate: {}", s))?;
        if hz <= 0.0 {
            return Err("rate must be positive".to_string());
        }
        Ok(Self::from_hz(hz))
    }
}

/// Smoothing kernel family
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KernelKind {
    /// Boxcar moving average (uniform taps)
    MovingAverage,
    /// Hamming-windowed sinc lowpass
    Lowpass,
}

/// System-wide pipeline configuration
///
/// Use `PipelineConfig::default()` for sensible defaults.
///
/// # Example
/// ```
/// use firline::config::PipelineConfig;
///
/// let mut config = PipelineConfig::default();
/// config.filter.num_taps = 16;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    /// Sample acquisition configuration
    pub acquisition: AcquisitionConfig,
    /// Sample ring configuration
    pub ring: RingConfig,
    /// FIR smoothing configuration
    pub filter: FilterConfig,
    /// Filtered output configuration
    pub output: OutputConfig,
}

impl PipelineConfig {
    /// Validate cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.ring.slots < 2 {
            return Err(PipelineError::Config(format!(
                "ring needs at least 2 slots, got {}",
                self.ring.slots
            )));
        }
        if self.filter.num_taps == 0 {
            return Err(PipelineError::Config("filter needs at least one tap".into()));
        }
        if self.output.rate_hz <= 0.0 {
            return Err(PipelineError::Config(format!(
                "output rate must be positive, got {}",
                self.output.rate_hz
            )));
        }
        // Construct the kernel once to surface design errors at startup.
        self.filter.build_kernel(self.acquisition.sample_rate)?;
        Ok(())
    }
}

/// Sample acquisition configuration
#[derive(Debug, Clone)]
pub struct AcquisitionConfig {
    /// Acquisition rate (timer tick rate)
    pub sample_rate: SampleRate,
    /// Converter resolution in bits; raw counts span `0..2^bits`
    pub resolution_bits: u8,
}

impl AcquisitionConfig {
    /// Largest representable raw count.
    pub fn full_scale(&self) -> u16 {
        ((1u32 << self.resolution_bits) - 1) as u16
    }
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::default(),
            // 12-bit successive-approximation converters are the common case
            resolution_bits: 12,
        }
    }
}

/// Sample ring configuration
#[derive(Debug, Clone)]
pub struct RingConfig {
    /// Backing slot count; usable capacity is one less
    pub slots: usize,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self { slots: 300 }
    }
}

/// FIR smoothing configuration
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Kernel family
    pub kernel: KernelKind,
    /// Kernel length (lowpass rounds up to odd)
    pub num_taps: usize,
    /// Lowpass cutoff in Hz (ignored by the moving average)
    pub cutoff_hz: f32,
}

impl FilterConfig {
    /// Build the configured kernel for the given sampling rate.
    pub fn build_kernel(&self, sample_rate: SampleRate) -> Result<Arc<[f32]>> {
        match self.kernel {
            KernelKind::MovingAverage => kernels::moving_average(self.num_taps),
            KernelKind::Lowpass => {
                kernels::lowpass(self.num_taps, self.cutoff_hz, sample_rate.as_hz())
            }
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            kernel: KernelKind::MovingAverage,
            num_taps: 32,
            cutoff_hz: 50.0,
        }
    }
}

/// Filtered output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Output print rate in Hz (filtered stream is throttled for display)
    pub rate_hz: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { rate_hz: 10.0 }
    }
}
