use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;

use firline::acquire::{Sampler, SampleSource, SineSource, WavFileSource};
use firline::config::{KernelKind, PipelineConfig, SampleRate};
use firline::output::{OutputFormat, create_formatter};
use firline::pipeline::Pipeline;
use firline::ring::SampleRing;

#[derive(Parser, Debug)]
#[command(name = "firline")]
#[command(about = "Live FIR smoothing pipeline for sampled sensor data", long_about = None)]
struct Args {
    /// Sampling rate (e.g., "1khz", "8000hz", "125us")
    #[arg(short = 'r', long, default_value = "1khz")]
    rate: SampleRate,

    /// Sample ring slot count (usable capacity is one less)
    #[arg(long, default_value = "300")]
    ring_slots: usize,

    /// Smoothing kernel: moving-average, lowpass
    #[arg(short = 'k', long, value_enum, default_value = "moving-average")]
    kernel: KernelKind,

    /// Kernel length in taps
    #[arg(short = 't', long, default_value = "32")]
    taps: usize,

    /// Lowpass cutoff in Hz (lowpass kernel only)
    #[arg(long, default_value = "50")]
    cutoff: f32,

    /// Replay a mono WAV trace instead of the synthetic sensor
    #[arg(short = 'w', long)]
    wav: Option<PathBuf>,

    /// Synthetic sensor tone frequency in Hz
    #[arg(long, default_value = "5")]
    sine_freq: f32,

    /// Gaussian sensor noise sigma in raw counts (synthetic sensor only)
    #[cfg(feature = "simulation")]
    #[arg(long)]
    noise: Option<f32>,

    /// Output format: text, csv, json
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Output print rate in Hz
    #[arg(long, default_value = "10")]
    output_rate: f32,

    /// Stop after this many seconds (default: run until the source ends)
    #[arg(short = 'd', long)]
    duration: Option<f32>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn build_config(args: &Args) -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.acquisition.sample_rate = args.rate;
    config.ring.slots = args.ring_slots;
    config.filter.kernel = args.kernel;
    config.filter.num_taps = args.taps;
    config.filter.cutoff_hz = args.cutoff;
    config.output.rate_hz = args.output_rate;
    config
}

fn build_source(args: &Args, config: &PipelineConfig) -> anyhow::Result<Box<dyn SampleSource>> {
    let full_scale = config.acquisition.full_scale();

    let source: Box<dyn SampleSource> = match &args.wav {
        Some(path) => {
            let wav = WavFileSource::new(path, full_scale)?;
            log::info!(
                "Replaying {} ({} samples recorded at {} Hz)",
                path.display(),
                wav.len(),
                wav.sample_rate()
            );
            Box::new(wav)
        }
        None => Box::new(SineSource::new(
            args.sine_freq,
            config.acquisition.sample_rate,
            full_scale,
        )),
    };

    #[cfg(feature = "simulation")]
    if let Some(sigma) = args.noise {
        return Ok(Box::new(firline::simulation::NoisySource::new(
            source, sigma, full_scale, None,
        )));
    }

    Ok(source)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let config = build_config(&args);
    config.validate()?;

    println!("=== firline - live FIR smoothing ===");
    println!("Sample rate: {}", config.acquisition.sample_rate);
    println!(
        "Ring: {} slots ({} usable)",
        config.ring.slots,
        config.ring.slots - 1
    );
    println!(
        "Kernel: {:?}, {} taps",
        config.filter.kernel, config.filter.num_taps
    );
    println!("Output rate: {} Hz", config.output.rate_hz);
    println!();

    let source = build_source(&args, &config)?;
    let (producer, consumer) = SampleRing::with_capacity(config.ring.slots)?;
    let mut pipeline = Pipeline::new(&config, consumer)?;

    println!("Starting acquisition...\n");
    let sampler = Sampler::spawn(source, producer, config.acquisition.sample_rate)?;

    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }

    let output_interval = Duration::from_secs_f32(1.0 / config.output.rate_hz);
    let mut last_output = Instant::now();
    let started = Instant::now();
    let deadline = args.duration.map(|secs| started + Duration::from_secs_f32(secs));

    loop {
        let batch = pipeline.poll();

        // Throttle display to the configured output rate; the full stream
        // is still filtered.
        if let Some(sample) = batch.last()
            && last_output.elapsed() >= output_interval
        {
            println!("{}", formatter.format(sample));
            last_output = Instant::now();
        }

        if let Some(deadline) = deadline
            && Instant::now() >= deadline
        {
            break;
        }

        if sampler.is_finished() && pipeline.pending() == 0 {
            log::info!("Source ended, pipeline drained");
            break;
        }

        if batch.is_empty() {
            thread::sleep(Duration::from_millis(1));
        }
    }

    let stats = sampler.stop();
    let remainder = pipeline.poll();
    if let Some(sample) = remainder.last() {
        println!("{}", formatter.format(sample));
    }

    println!();
    println!(
        "Acquired {} samples, dropped {}, filtered {}",
        stats.acquired,
        stats.dropped,
        pipeline.consumed()
    );

    Ok(())
}
