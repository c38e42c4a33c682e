//! Periodic sample scheduler.
//!
//! Spawns the producer thread: on every timer tick it reads one converted
//! value from the source and offers it to the sample ring. The put is
//! non-blocking by construction, so the source's conversion latency is the
//! only thing on the tick budget. Overflow is counted and reported
//! rate-limited, never treated as a fault.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;

use crate::acquire::source::SampleSource;
use crate::config::SampleRate;
use crate::error::{PipelineError, Result};
use crate::ring::Producer;

/// Minimum spacing between "consumer behind" warnings.
const DROP_WARN_INTERVAL: Duration = Duration::from_secs(1);

/// Counters reported by a sampler thread when it stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct SamplerStats {
    /// Values successfully read from the source.
    pub acquired: u64,
    /// Values rejected by a full ring.
    pub dropped: u64,
}

/// Handle to the running sampler thread.
///
/// Dropping the handle stops the thread; `stop()` additionally returns the
/// acquisition counters.
pub struct Sampler {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<SamplerStats>>,
}

impl Sampler {
    /// Start sampling `source` at `sample_rate` into `producer`.
    pub fn spawn(
        source: Box<dyn SampleSource>,
        producer: Producer<u16>,
        sample_rate: SampleRate,
    ) -> Result<Self> {
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);

        let handle = thread::Builder::new()
            .name("firline-sampler".into())
            .spawn(move || run_sampler(source, producer, sample_rate, stop_flag))
            .map_err(|e| PipelineError::Source(format!("failed to spawn sampler thread: {}", e)))?;

        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Whether the thread has exited (source exhausted or failed).
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|h| h.is_finished())
    }

    /// Stop the thread and collect its counters.
    pub fn stop(mut self) -> SamplerStats {
        self.stop.store(true, Ordering::Relaxed);
        match self.handle.take() {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                log::error!("sampler thread panicked");
                SamplerStats::default()
            }),
            None => SamplerStats::default(),
        }
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_sampler(
    mut source: Box<dyn SampleSource>,
    mut producer: Producer<u16>,
    sample_rate: SampleRate,
    stop: Arc<AtomicBool>,
) -> SamplerStats {
    // Best-effort real-time promotion; acquisition still works without it.
    let rt_handle = audio_thread_priority::promote_current_thread_to_real_time(
        1,
        sample_rate.as_hz().max(1.0) as u32,
    );
    let _rt_handle = match rt_handle {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::warn!("Could not set real-time priority: {}", e);
            None
        }
    };

    let period = sample_rate.period();
    let ticker = crossbeam_channel::tick(period);

    let mut stats = SamplerStats::default();
    let mut dropped_since_warn = 0u64;
    let mut last_warn = Instant::now();

    while !stop.load(Ordering::Relaxed) {
        // Bounded wait so the stop flag is honored even if ticks stall.
        match ticker.recv_timeout(period.max(Duration::from_millis(1)) * 4) {
            Ok(_) => {}
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }

        let value = match source.read() {
            Ok(Some(value)) => value,
            Ok(None) => {
                log::info!("sample source exhausted after {} samples", stats.acquired);
                break;
            }
            Err(e) => {
                log::error!("sample source failed: {}", e);
                break;
            }
        };
        stats.acquired += 1;

        if producer.put(value).is_err() {
            stats.dropped += 1;
            dropped_since_warn += 1;
            if last_warn.elapsed() >= DROP_WARN_INTERVAL {
                log::warn!(
                    "consumer behind: dropped {} samples ({} total)",
                    dropped_since_warn,
                    stats.dropped
                );
                dropped_since_warn = 0;
                last_warn = Instant::now();
            }
        }
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::SampleRing;

    /// Source that yields a fixed count of increasing values.
    struct CountingSource {
        next: u16,
        remaining: usize,
    }

    impl SampleSource for CountingSource {
        fn read(&mut self) -> Result<Option<u16>> {
            if self.remaining == 0 {
                return Ok(None);
            }
            self.remaining -= 1;
            let value = self.next;
            self.next = self.next.wrapping_add(1);
            Ok(Some(value))
        }
    }

    #[test]
    fn test_sampler_delivers_in_order_and_stops_on_exhaustion() {
        let (tx, mut rx) = SampleRing::with_capacity(64).unwrap();
        let source = CountingSource {
            next: 0,
            remaining: 20,
        };

        // Fast tick keeps the test short.
        let sampler = Sampler::spawn(
            Box::new(source),
            tx,
            SampleRate::from_interval_us(200.0),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut received = Vec::new();
        while received.len() < 20 && Instant::now() < deadline {
            match rx.get() {
                Ok(v) => received.push(v),
                Err(_) => thread::sleep(Duration::from_millis(1)),
            }
        }

        let stats = sampler.stop();
        assert_eq!(received, (0..20).collect::<Vec<u16>>());
        assert_eq!(stats.acquired, 20);
        assert_eq!(stats.dropped, 0);
    }

    #[test]
    fn test_sampler_counts_drops_when_ring_full() {
        // Tiny ring, no consumer: everything past the first slot is dropped.
        let (tx, _rx) = SampleRing::with_capacity(2).unwrap();
        let source = CountingSource {
            next: 0,
            remaining: 10,
        };

        let sampler = Sampler::spawn(
            Box::new(source),
            tx,
            SampleRate::from_interval_us(200.0),
        )
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !sampler.is_finished() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        let stats = sampler.stop();
        assert_eq!(stats.acquired, 10);
        assert_eq!(stats.dropped, 9);
    }
}
