//! Fixed-capacity sample buffer bridging the sampler and the control loop.
//!
//! One `SampleProducer` (sampler tick) and one `SampleConsumer` (control
//! loop) share a bounded lock-free queue. Neither handle is `Clone`, so the
//! single-writer/single-reader discipline is carried by ownership.
//!
//! Overflow is latest-data-wins: a push into a full buffer discards the
//! oldest unread sample. The producer never waits on the consumer.
use std::sync::Arc;

use crossbeam::queue::ArrayQueue;
use hover_traits::Sample;

use crate::error::HoverError;

/// Largest window the control loop may average over.
pub const MAX_CAPACITY: usize = 1024;

/// Allocate a buffer of `capacity` samples and split it into its two ends.
///
/// Fails for `capacity == 0` or `capacity > MAX_CAPACITY`. Storage is
/// allocated here once and never resized.
pub fn init(capacity: usize) -> Result<(SampleProducer, SampleConsumer), HoverError> {
    if capacity == 0 {
        return Err(HoverError::ZeroCapacity);
    }
    if capacity > MAX_CAPACITY {
        return Err(HoverError::CapacityTooLarge {
            requested: capacity,
            max: MAX_CAPACITY,
        });
    }
    let queue = Arc::new(ArrayQueue::new(capacity));
    Ok((
        SampleProducer {
            queue: Arc::clone(&queue),
        },
        SampleConsumer { queue },
    ))
}

/// Write end, owned by the sampler tick.
#[derive(Debug)]
pub struct SampleProducer {
    queue: Arc<ArrayQueue<Sample>>,
}

impl SampleProducer {
    /// Store `sample`, overwriting the oldest unread entry when full.
    ///
    /// Returns the discarded sample, if any. Lock-free and allocation-free.
    #[inline]
    pub fn push(&mut self, sample: Sample) -> Option<Sample> {
        self.queue.force_push(sample)
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }
}

/// Read end, owned by the control loop.
#[derive(Debug)]
pub struct SampleConsumer {
    queue: Arc<ArrayQueue<Sample>>,
}

impl SampleConsumer {
    /// Oldest unread sample, or `None` if the producer has not caught up.
    #[inline]
    pub fn pop(&mut self) -> Option<Sample> {
        self.queue.pop()
    }

    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    /// Unread samples currently held.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
