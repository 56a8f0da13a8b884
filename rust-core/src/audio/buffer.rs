//! Sample transport between threads and block assembly
//!
//! A capture callback pushes arbitrary-sized chunks into a lock-free ring
//! buffer; the analysis thread drains it and cuts exact analyzer blocks.

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Single-producer/single-consumer sample ring buffer
pub struct AudioRingBuffer {
    producer: HeapProducer<f64>,
    consumer: HeapConsumer<f64>,
}

impl AudioRingBuffer {
    /// Create new ring buffer with given capacity
    ///
    /// # Arguments
    /// * `capacity` - Buffer capacity in samples
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::<f64>::new(capacity);
        let (producer, consumer) = rb.split();

        Self { producer, consumer }
    }

    /// Split into producer and consumer ends
    ///
    /// Both ends share one dropped-sample counter.
    pub fn split(self) -> (AudioProducer, AudioConsumer) {
        let dropped = Arc::new(AtomicU64::new(0));
        (
            AudioProducer {
                producer: self.producer,
                dropped: Arc::clone(&dropped),
            },
            AudioConsumer {
                consumer: self.consumer,
                dropped,
            },
        )
    }
}

/// Writing end, owned by the capture side
pub struct AudioProducer {
    producer: HeapProducer<f64>,
    dropped: Arc<AtomicU64>,
}

impl AudioProducer {
    /// Write samples, counting whatever does not fit as dropped
    ///
    /// # Returns
    /// Number of samples actually written
    pub fn write(&mut self, samples: &[f64]) -> usize {
        let written = self.producer.push_slice(samples);
        let lost = samples.len() - written;
        if lost > 0 {
            self.dropped.fetch_add(lost as u64, Ordering::Relaxed);
        }
        written
    }

    /// Get number of free slots
    pub fn free_len(&self) -> usize {
        self.producer.free_len()
    }
}

/// Reading end, owned by the analysis side
pub struct AudioConsumer {
    consumer: HeapConsumer<f64>,
    dropped: Arc<AtomicU64>,
}

impl AudioConsumer {
    /// Read available samples into `buffer`
    ///
    /// # Returns
    /// Number of samples read (0 when empty)
    pub fn read(&mut self, buffer: &mut [f64]) -> usize {
        self.consumer.pop_slice(buffer)
    }

    /// Get number of available samples
    pub fn len(&self) -> usize {
        self.consumer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    /// Total samples the producer could not fit so far
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Shared handle on the dropped-sample counter
    pub(crate) fn dropped_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped)
    }
}

/// Cuts a stream of arbitrary-length chunks into fixed-length blocks
///
/// Holds one block of storage; never allocates after construction.
pub struct BlockAssembler {
    block: Vec<f64>,
    filled: usize,
}

impl BlockAssembler {
    /// Create an assembler for blocks of `block_length` samples
    ///
    /// A zero length yields an assembler that swallows input and emits nothing.
    pub fn new(block_length: usize) -> Self {
        Self {
            block: vec![0.0; block_length],
            filled: 0,
        }
    }

    /// Append samples, calling `on_block` for every block completed
    ///
    /// # Returns
    /// Number of complete blocks emitted
    pub fn push<F>(&mut self, mut samples: &[f64], mut on_block: F) -> usize
    where
        F: FnMut(&[f64]),
    {
        let mut emitted = 0;

        if self.block.is_empty() {
            return emitted;
        }

        while !samples.is_empty() {
            let take = (self.block.len() - self.filled).min(samples.len());
            self.block[self.filled..self.filled + take].copy_from_slice(&samples[..take]);
            self.filled += take;
            samples = &samples[take..];

            if self.filled == self.block.len() {
                on_block(&self.block);
                self.filled = 0;
                emitted += 1;
            }
        }

        emitted
    }

    /// Samples waiting for the next block
    pub fn pending(&self) -> usize {
        self.filled
    }
}
