//! Fixed-capacity circular sample buffer.
//!
//! The capacity is exact rather than rounded to a power of two: the click
//! detector needs an odd-length window (`2 * half + 1`) and the LPC history
//! needs 32 slots. The buffer is allocated once at construction and never
//! reallocates.
//!
//! The buffer tracks how many samples have been written since construction
//! or the last [`RingBuffer::clear`], which gives callers a clean boundary
//! between the "filling" and "full" phases.

#[cfg(not(feature = "std"))]
extern crate alloc;

#[cfg(feature = "std")]
extern crate std as alloc;

use alloc::vec;
use alloc::vec::Vec;

/// Circular buffer of `f32` samples with an exact capacity.
///
/// # Example
///
/// ```rust
/// use phono_core::RingBuffer;
///
/// let mut rb = RingBuffer::new(3);
/// rb.push(1.0);
/// rb.push(2.0);
/// assert!(!rb.is_full());
/// rb.push(3.0);
/// rb.push(4.0); // overwrites 1.0
/// assert!(rb.is_full());
/// assert_eq!(rb.iter().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
/// assert_eq!(rb.recent(0), 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct RingBuffer {
    buffer: Vec<f32>,
    /// Next slot to write.
    head: usize,
    /// Samples written, saturating at capacity.
    filled: usize,
}

impl RingBuffer {
    /// Creates a zero-filled buffer holding exactly `capacity` samples.
    ///
    /// A capacity of zero is bumped to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
            head: 0,
            filled: 0,
        }
    }

    /// Total number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Number of samples written so far, up to the capacity.
    #[inline]
    pub fn len(&self) -> usize {
        self.filled
    }

    /// True until the first push after construction or [`clear`](Self::clear).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.filled == 0
    }

    /// True once every slot holds a pushed sample.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.filled == self.buffer.len()
    }

    /// Writes a sample, overwriting the oldest one when full.
    #[inline]
    pub fn push(&mut self, sample: f32) {
        self.buffer[self.head] = sample;
        self.head += 1;
        if self.head == self.buffer.len() {
            self.head = 0;
        }
        if self.filled < self.buffer.len() {
            self.filled += 1;
        }
    }

    /// The `offset`-th most recent sample (0 = newest).
    ///
    /// Slots never written read as `0.0`. Offsets wrap modulo the capacity.
    #[inline]
    pub fn recent(&self, offset: usize) -> f32 {
        let cap = self.buffer.len();
        let back = offset % cap + 1;
        let idx = if self.head >= back {
            self.head - back
        } else {
            self.head + cap - back
        };
        self.buffer[idx]
    }

    /// Iterates the pushed samples from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let (older, newer) = if self.is_full() {
            let (newer, older) = self.buffer.split_at(self.head);
            (older, newer)
        } else {
            // Never wrapped: pushed samples sit at the front.
            (&self.buffer[..self.filled], &[][..])
        };
        older.iter().chain(newer.iter()).copied()
    }

    /// Copies the whole storage into `dst`, oldest slot first.
    ///
    /// `dst` must be exactly [`capacity`](Self::capacity) long. Before the
    /// buffer is full the leading entries are the zero-filled slots.
    pub fn copy_linearized(&self, dst: &mut [f32]) {
        debug_assert_eq!(dst.len(), self.buffer.len());
        let (newer, older) = self.buffer.split_at(self.head);
        dst[..older.len()].copy_from_slice(older);
        dst[older.len()..].copy_from_slice(newer);
    }

    /// Zeroes the storage and returns to the empty state.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.head = 0;
        self.filled = 0;
    }
}
