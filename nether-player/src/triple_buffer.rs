//! Lock-free triple buffer
//!
//! Hands fixed-size `f32` blocks from the audio thread to a display thread.
//! The writer fills one of three slots and swaps it into the shared "ready"
//! slot once full; the reader swaps its own slot against "ready" to pick up
//! the newest block. Neither side ever waits. A slow reader skips blocks.
//!
//! ```text
//!   writer slot ──publish──▶ ready ◀──read_latest── reader slot
//! ```

use std::cell::UnsafeCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Slot index bits of the ready word
const INDEX_MASK: usize = 0b11;
/// Set by the writer when the ready slot holds a block the reader has not taken
const FRESH: usize = 0b100;

struct Shared {
    slots: [UnsafeCell<Box<[f32]>>; 3],
    ready: AtomicUsize,
}

// SAFETY: each slot is reachable by at most one side at a time. The writer
// only touches the slot it holds, the reader only the slot it holds, and the
// third slot is parked in `ready`. Ownership moves exclusively through
// `ready.swap`, whose AcqRel ordering publishes the slot contents.
unsafe impl Sync for Shared {}

/// Create a connected writer/reader pair holding `len` samples per block
pub fn triple_buffer(len: usize) -> (TripleWriter, TripleReader) {
    let slot = || UnsafeCell::new(vec![0.0f32; len].into_boxed_slice());
    let shared = Arc::new(Shared {
        slots: [slot(), slot(), slot()],
        ready: AtomicUsize::new(1),
    });

    (
        TripleWriter {
            shared: Arc::clone(&shared),
            slot: 0,
            offset: 0,
            len,
        },
        TripleReader {
            shared,
            slot: 2,
            len,
        },
    )
}

/// Producer half, owned by the audio thread
pub struct TripleWriter {
    shared: Arc<Shared>,
    slot: usize,
    offset: usize,
    len: usize,
}

impl TripleWriter {
    /// Samples per block
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append samples, publishing each block as soon as it fills.
    ///
    /// Never blocks and never allocates.
    pub fn append(&mut self, mut samples: &[f32]) {
        if self.len == 0 {
            return;
        }

        while !samples.is_empty() {
            let n = samples.len().min(self.len - self.offset);
            // SAFETY: `self.slot` is owned by the writer until it is swapped
            // into `ready` below.
            let block = unsafe { &mut *self.shared.slots[self.slot].get() };
            block[self.offset..self.offset + n].copy_from_slice(&samples[..n]);
            self.offset += n;
            samples = &samples[n..];

            if self.offset == self.len {
                self.publish();
            }
        }
    }

    fn publish(&mut self) {
        let previous = self
            .shared
            .ready
            .swap(self.slot | FRESH, Ordering::AcqRel);
        self.slot = previous & INDEX_MASK;
        self.offset = 0;
    }
}

/// Consumer half, owned by the display thread
pub struct TripleReader {
    shared: Arc<Shared>,
    slot: usize,
    len: usize,
}

impl TripleReader {
    /// Samples per block
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// A block was published since the last read
    pub fn has_update(&self) -> bool {
        self.shared.ready.load(Ordering::Acquire) & FRESH != 0
    }

    /// Newest complete block, or the previous one again if nothing new was
    /// published. Zeros until the first block completes.
    pub fn read_latest(&mut self) -> &[f32] {
        if self.has_update() {
            let previous = self.shared.ready.swap(self.slot, Ordering::AcqRel);
            self.slot = previous & INDEX_MASK;
        }
        // SAFETY: `self.slot` is owned by the reader until the next swap,
        // which needs `&mut self` and so ends this borrow first.
        unsafe { &**self.shared.slots[self.slot].get() }
    }
}
