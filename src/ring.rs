//! Lock-free single-producer/single-consumer sample ring.
//!
//! The acquisition thread is the only producer and the processing loop is the
//! only consumer, so two wrap-around cursors with single-word atomic
//! load/store are sufficient: each cursor has exactly one writer. One slot is
//! kept permanently unusable so that `head == tail` always means empty and
//! `head + 1 == tail` always means full, without a shared occupancy count.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{PipelineError, Result};

pub struct SampleRing<T> {
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
    /// Producer cursor: index of the next slot to write. Written only by the
    /// producer handle, read by both sides.
    head: AtomicUsize,
    /// Consumer cursor: index of the next slot to read. Written only by the
    /// consumer handle, read by both sides.
    tail: AtomicUsize,
}

// SAFETY: slots are only touched through the Producer/Consumer handles, each
// of which exists exactly once. A slot is written strictly before the head
// cursor publishes it (Release) and read strictly after (Acquire), so no slot
// is ever accessed from both threads at once.
unsafe impl<T: Send> Sync for SampleRing<T> {}

impl<T: Copy> SampleRing<T> {
    /// Create a ring with `slots` backing slots and split it into its
    /// producer and consumer handles.
    ///
    /// Usable capacity is `slots - 1`; one slot disambiguates full from
    /// empty. The backing storage is left uninitialized, matching the
    /// contract that no entry is read before it has been written.
    ///
    /// # Errors
    /// Returns `PipelineError::Config` if `slots < 2` (such a ring could
    /// never accept a sample).
    pub fn with_capacity(slots: usize) -> Result<(Producer<T>, Consumer<T>)> {
        if slots < 2 {
            return Err(PipelineError::Config(format!(
                "ring needs at least 2 slots, got {}",
                slots
            )));
        }

        let slots = (0..slots)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let ring = Arc::new(Self {
            slots,
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        });

        Ok((
            Producer {
                ring: Arc::clone(&ring),
            },
            Consumer { ring },
        ))
    }

    /// Usable capacity (one less than the slot count).
    pub fn capacity(&self) -> usize {
        self.slots.len() - 1
    }

    fn advance(&self, index: usize) -> usize {
        let next = index + 1;
        if next == self.slots.len() { 0 } else { next }
    }

    fn occupied(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        if head >= tail {
            head - tail
        } else {
            self.slots.len() - tail + head
        }
    }
}

/// Producer side of the ring. Exactly one exists per ring; safe to move into
/// the acquisition thread.
pub struct Producer<T> {
    ring: Arc<SampleRing<T>>,
}

impl<T: Copy + Send> Producer<T> {
    /// Attempt to enqueue `value`. Non-blocking and bounded-time, so it may
    /// be called from the timing-critical acquisition context.
    ///
    /// # Errors
    /// Returns `PipelineError::Overflow` if the ring is full. The value is
    /// not stored and no existing entry is overwritten; the caller decides
    /// whether to drop, retry, or count the event.
    pub fn put(&mut self, value: T) -> Result<()> {
        let head = self.ring.head.load(Ordering::Relaxed);
        let next = self.ring.advance(head);

        if next == self.ring.tail.load(Ordering::Acquire) {
            return Err(PipelineError::Overflow);
        }

        // SAFETY: `head` is strictly between tail-1 and tail (mod len), so
        // the consumer cannot be reading this slot. We are the only writer.
        unsafe {
            (*self.ring.slots[head].get()).write(value);
        }
        // Publish the slot. The Release store orders the payload write
        // before the cursor advance observed by the consumer.
        self.ring.head.store(next, Ordering::Release);
        Ok(())
    }

    /// Number of unread samples currently buffered.
    pub fn len(&self) -> usize {
        self.ring.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable capacity of the ring.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

/// Consumer side of the ring. Exactly one exists per ring; owned by the
/// processing loop.
pub struct Consumer<T> {
    ring: Arc<SampleRing<T>>,
}

impl<T: Copy + Send> Consumer<T> {
    /// Attempt to dequeue the oldest unread sample.
    ///
    /// # Errors
    /// Returns `PipelineError::Underflow` if the ring is empty. Underflow is
    /// the normal idle state of a consumer that keeps up.
    pub fn get(&mut self) -> Result<T> {
        let tail = self.ring.tail.load(Ordering::Relaxed);

        if tail == self.ring.head.load(Ordering::Acquire) {
            return Err(PipelineError::Underflow);
        }

        // SAFETY: head != tail, so this slot was fully written before the
        // producer's Release store that made it visible. We are the only
        // reader, and the producer will not reuse the slot until our tail
        // store below.
        let value = unsafe { (*self.ring.slots[tail].get()).assume_init_read() };
        self.ring.tail.store(self.ring.advance(tail), Ordering::Release);
        Ok(value)
    }

    /// Discard all unread samples by catching the consumer cursor up to the
    /// producer cursor. This is the only reset that is sound while the
    /// producer is live.
    pub fn clear(&mut self) {
        let head = self.ring.head.load(Ordering::Acquire);
        self.ring.tail.store(head, Ordering::Release);
    }

    /// Number of unread samples currently buffered.
    pub fn len(&self) -> usize {
        self.ring.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Usable capacity of the ring.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_slots_minus_one() {
        let (mut tx, _rx) = SampleRing::<u16>::with_capacity(8).unwrap();
        assert_eq!(tx.capacity(), 7);

        for i in 0..7u16 {
            tx.put(i).unwrap();
        }
        assert!(matches!(tx.put(99), Err(PipelineError::Overflow)));
    }

    #[test]
    fn test_fifo_order() {
        let (mut tx, mut rx) = SampleRing::<u16>::with_capacity(16).unwrap();

        for i in 0..10u16 {
            tx.put(i).unwrap();
        }
        for i in 0..10u16 {
            assert_eq!(rx.get().unwrap(), i);
        }
    }

    #[test]
    fn test_fifo_order_across_wraparound() {
        let (mut tx, mut rx) = SampleRing::<u32>::with_capacity(4).unwrap();

        // Interleave so the cursors lap the slot array several times.
        let mut expected = 0u32;
        for value in 0..100u32 {
            tx.put(value).unwrap();
            if value % 3 == 2 {
                for _ in 0..3 {
                    assert_eq!(rx.get().unwrap(), expected);
                    expected += 1;
                }
            }
        }
    }

    #[test]
    fn test_overflow_preserves_contents() {
        let (mut tx, mut rx) = SampleRing::<u16>::with_capacity(4).unwrap();

        tx.put(1).unwrap();
        tx.put(2).unwrap();
        tx.put(3).unwrap();
        assert!(matches!(tx.put(4), Err(PipelineError::Overflow)));
        assert!(matches!(tx.put(5), Err(PipelineError::Overflow)));

        // The rejected values must be neither stored nor overwrite anything.
        assert_eq!(rx.get().unwrap(), 1);
        assert_eq!(rx.get().unwrap(), 2);
        assert_eq!(rx.get().unwrap(), 3);
        assert!(matches!(rx.get(), Err(PipelineError::Underflow)));
    }

    #[test]
    fn test_empty_after_drain() {
        let (mut tx, mut rx) = SampleRing::<u16>::with_capacity(8).unwrap();

        assert!(matches!(rx.get(), Err(PipelineError::Underflow)));

        tx.put(42).unwrap();
        assert_eq!(rx.get().unwrap(), 42);
        assert!(matches!(rx.get(), Err(PipelineError::Underflow)));
        assert!(matches!(rx.get(), Err(PipelineError::Underflow)));

        tx.put(43).unwrap();
        assert_eq!(rx.get().unwrap(), 43);
    }

    #[test]
    fn test_len_tracks_occupancy() {
        let (mut tx, mut rx) = SampleRing::<u16>::with_capacity(8).unwrap();

        assert_eq!(tx.len(), 0);
        assert!(rx.is_empty());

        tx.put(1).unwrap();
        tx.put(2).unwrap();
        assert_eq!(tx.len(), 2);
        assert_eq!(rx.len(), 2);

        rx.get().unwrap();
        assert_eq!(rx.len(), 1);
    }

    #[test]
    fn test_clear_discards_unread() {
        let (mut tx, mut rx) = SampleRing::<u16>::with_capacity(8).unwrap();

        for i in 0..5u16 {
            tx.put(i).unwrap();
        }
        rx.clear();
        assert!(matches!(rx.get(), Err(PipelineError::Underflow)));

        // The ring is fully usable again after a clear.
        for i in 0..7u16 {
            tx.put(i).unwrap();
        }
        assert_eq!(rx.get().unwrap(), 0);
    }

    #[test]
    fn test_rejects_degenerate_capacity() {
        assert!(SampleRing::<u16>::with_capacity(0).is_err());
        assert!(SampleRing::<u16>::with_capacity(1).is_err());
    }
}
