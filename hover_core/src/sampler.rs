//! Periodic altitude sampling.
//!
//! `SampleTick::on_tick` is the interrupt body: read one value, push it,
//! bump the sample counter, return. It never blocks and never allocates.
//!
//! `Sampler` plays the timer: it owns a `SampleTick` on a dedicated thread
//! and fires it at a fixed rate, parked between ticks. Dropping the
//! `Sampler` raises the shutdown flag, unparks the thread and joins it.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use hover_traits::AltitudeSensor;
use hover_traits::clock::Clock;

use crate::buffer::SampleProducer;
use crate::error::HoverError;

/// Sampler-side state: the sensor, the buffer's write end and the counter.
pub struct SampleTick<S> {
    sensor: S,
    producer: SampleProducer,
    count: Arc<AtomicU32>,
}

impl<S: AltitudeSensor> SampleTick<S> {
    pub fn new(sensor: S, producer: SampleProducer) -> (Self, SampleCount) {
        let count = Arc::new(AtomicU32::new(0));
        (
            Self {
                sensor,
                producer,
                count: Arc::clone(&count),
            },
            SampleCount { count },
        )
    }

    /// One timer interrupt.
    #[inline]
    pub fn on_tick(&mut self) {
        let sample = self.sensor.read_raw();
        // Overflow drops the oldest sample; the tick does not care which.
        let _ = self.producer.push(sample);
        // Atomic adds wrap on overflow.
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}

/// Read-only view of the number of samples produced so far.
#[derive(Debug, Clone)]
pub struct SampleCount {
    count: Arc<AtomicU32>,
}

impl SampleCount {
    #[inline]
    pub fn get(&self) -> u32 {
        self.count.load(Ordering::Relaxed)
    }
}

pub struct Sampler {
    /// Shutdown flag for immediate response (atomic for lock-free check)
    shutdown: Arc<AtomicBool>,
    /// Join handle for graceful thread cleanup
    join_handle: Option<std::thread::JoinHandle<()>>,
    period: Duration,
}

impl Sampler {
    /// Fire `tick` at `hz` until dropped.
    ///
    /// Deadlines advance by whole periods from the first tick, so pacing does
    /// not drift with the tick's own run time. Ticks that fall behind are
    /// skipped, not replayed.
    pub fn spawn<S, C>(mut tick: SampleTick<S>, hz: u32, clock: C) -> Result<Self, HoverError>
    where
        S: AltitudeSensor + Send + 'static,
        C: Clock + Send + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = Arc::clone(&shutdown);
        let period = Duration::from_micros(crate::util::period_us(hz));

        let join_handle = std::thread::Builder::new()
            .name("hover-sampler".into())
            .spawn(move || {
                let mut deadline = clock.now();
                while !shutdown_clone.load(Ordering::Relaxed) {
                    let now = clock.now();
                    if now < deadline {
                        // Drop unparks us, so a slow rate never delays shutdown.
                        clock.park_until(deadline);
                        continue;
                    }

                    tick.on_tick();

                    deadline += period;
                    let now = clock.now();
                    if deadline < now {
                        let behind = now.saturating_duration_since(deadline);
                        let missed = behind.as_micros() / period.as_micros().max(1);
                        tracing::trace!(missed = missed as u64, "sampler fell behind");
                        deadline = now;
                    }
                }
                tracing::debug!("Sampler thread received shutdown signal");
                tracing::trace!("Sampler thread exiting cleanly");
            })
            .map_err(|e| HoverError::Sampler(e.to_string()))?;

        tracing::debug!(hz, period_us = period.as_micros() as u64, "sampler started");
        Ok(Self {
            shutdown,
            join_handle: Some(join_handle),
            period,
        })
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);

        if let Some(handle) = self.join_handle.take() {
            handle.thread().unpark();
            match handle.join() {
                Ok(()) => {
                    tracing::trace!("Sampler thread joined successfully");
                }
                Err(e) => {
                    tracing::warn!(?e, "Sampler thread panicked during shutdown");
                }
            }
        }
    }
}
