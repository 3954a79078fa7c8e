//! LZSS sliding-window matcher for DEFLATE.
//!
//! The matcher exposes a stream interface: the block encoders `put` bytes
//! until [`is_full`](LzssMatcher::is_full) holds, then query the best
//! [`back_reference`](LzssMatcher::back_reference) for the oldest pending
//! byte and consume either one literal or the whole match.
//!
//! # Indexing
//!
//! Three ring buffers advance in lockstep: the look-back window (32 KB),
//! the look-ahead queue (258 bytes), and a chain ring that stores, for each
//! look-back position, the absolute position of the previous occurrence of
//! the 3-byte pattern starting there (0 when none). A hash map from exact
//! 3-byte pattern keys to the latest absolute occurrence provides each
//! chain's head. Absolute positions are 64-bit and never wrap within a
//! stream; entries older than the window are recognized as stale during
//! the chain walk and terminate it.
//!
//! A match may extend past the end of the look-back into the bytes it is
//! itself about to produce (distance < length). The search handles that
//! regime by indexing the look-back cyclically, which is what lets a run
//! like `aaaa...` collapse into a single distance-1 back-reference.

use oxigz_core::ringbuffer::RingBuffer;
use oxigz_core::Result;
use std::collections::HashMap;

/// Sliding-window (look-back) size: 32 KB, fixed by RFC 1951.
pub const LOOK_BACK_SIZE: usize = 1 << 15;

/// Look-ahead queue size: the maximum match length.
pub const LOOK_AHEAD_SIZE: usize = 258;

/// Shortest match worth a back-reference.
pub const MIN_BACK_REFERENCE_LENGTH: usize = 3;

/// Smallest representable distance.
pub const MIN_BACK_REFERENCE_DISTANCE: usize = 1;

/// Chain terminator; absolute positions start at 1 so 0 is never valid.
const END_OF_CHAIN: u64 = 0;

/// A match against the look-back window.
///
/// `length == 0` means no match; otherwise `length >= 3` and
/// `1 <= distance <= look_back.len()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackReference {
    /// How far back the match starts (1 = most recent byte).
    pub distance: usize,
    /// Match length in bytes (0 = no match).
    pub length: usize,
}

impl BackReference {
    /// The "no match" value.
    pub const NONE: BackReference = BackReference {
        distance: 0,
        length: 0,
    };

    /// True when this represents an actual match.
    pub fn is_match(&self) -> bool {
        self.length > 0
    }
}

/// Streaming longest-match searcher over a chained hash index.
#[derive(Debug)]
pub struct LzssMatcher {
    /// Bytes already consumed, available for back-references.
    look_back: RingBuffer<u8>,
    /// Bytes fed but not yet consumed.
    look_ahead: RingBuffer<u8>,
    /// Per-look-back-position absolute position of the previous occurrence
    /// of the 3-byte pattern starting there.
    chain: RingBuffer<u64>,
    /// Latest absolute occurrence of each 3-byte pattern.
    head_by_pattern: HashMap<u32, u64>,
    /// Lazily computed best match for the current look-ahead front.
    cached: BackReference,
    /// Position counter; starts at 1 to reserve 0 as the chain terminator.
    absolute_position: u64,
}

impl LzssMatcher {
    /// Create a matcher with the full DEFLATE window sizes.
    pub fn new() -> Self {
        Self {
            look_back: RingBuffer::new(LOOK_BACK_SIZE),
            look_ahead: RingBuffer::new(LOOK_AHEAD_SIZE),
            chain: RingBuffer::new(LOOK_BACK_SIZE),
            head_by_pattern: HashMap::new(),
            cached: BackReference::NONE,
            absolute_position: 1,
        }
    }

    /// True when no pending bytes remain in the look-ahead.
    pub fn is_empty(&self) -> bool {
        self.look_ahead.is_empty()
    }

    /// True when the look-ahead queue is at capacity and a byte must be
    /// consumed before the next `put`.
    pub fn is_full(&self) -> bool {
        self.look_ahead.is_full()
    }

    /// The byte at the front of the look-ahead.
    pub fn literal(&self) -> Result<u8> {
        self.look_ahead.peek()
    }

    /// Feed one byte into the look-ahead.
    pub fn put(&mut self, byte: u8) {
        debug_assert!(!self.is_full(), "put into a full matcher drops data");
        self.look_ahead.enqueue(byte);
        self.cached = BackReference::NONE;
    }

    /// The best match for the current look-ahead front (lazily computed and
    /// cached until the stream advances).
    pub fn back_reference(&mut self) -> Result<BackReference> {
        if !self.cached.is_match() {
            self.cached = self.find_best_back_reference()?;
        }
        Ok(self.cached)
    }

    /// Iterate the pending look-ahead bytes, oldest first.
    ///
    /// The first `length` of these are the bytes a back-reference of that
    /// length would cover; the dynamic encoder retains them to keep the
    /// literal-vs-back-reference choice open until flush.
    pub fn lookahead_iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.look_ahead.iter()
    }

    /// Consume one literal byte.
    pub fn take_literal(&mut self) -> Result<()> {
        self.take_one()?;
        self.cached = BackReference::NONE;
        Ok(())
    }

    /// Consume the bytes covered by the current best match.
    pub fn take_back_reference(&mut self) -> Result<()> {
        let length = self.back_reference()?.length;
        for _ in 0..length {
            self.take_one()?;
        }
        self.cached = BackReference::NONE;
        Ok(())
    }

    /// Discard all state, as if freshly constructed.
    pub fn reset(&mut self) {
        self.look_back.clear();
        self.look_ahead.clear();
        self.chain.clear();
        self.head_by_pattern.clear();
        self.cached = BackReference::NONE;
        self.absolute_position = 1;
    }

    /// Exact 3-byte pattern key (no lossy hashing, so chain entries are
    /// guaranteed occurrences of the same pattern).
    fn pattern_key(a: u8, b: u8, c: u8) -> u32 {
        (a as u32) << 16 | (b as u32) << 8 | c as u32
    }

    /// Absolute position of look-back index 0.
    fn absolute_start_of_look_back(&self) -> u64 {
        self.absolute_position - 1 - self.look_back.len() as u64
    }

    /// Whether an absolute position still lies inside the window.
    fn is_absolute_in_look_back(&self, absolute: u64) -> bool {
        absolute != END_OF_CHAIN && absolute >= self.absolute_start_of_look_back()
    }

    fn absolute_to_relative(&self, absolute: u64) -> usize {
        (absolute - self.absolute_start_of_look_back()) as usize
    }

    fn relative_to_absolute(&self, relative: usize) -> u64 {
        self.absolute_start_of_look_back() + relative as u64
    }

    /// Move one byte from look-ahead to look-back, maintaining the index.
    fn take_one(&mut self) -> Result<()> {
        self.remove_pattern()?;
        let byte = self.look_ahead.dequeue()?;
        self.look_back.enqueue(byte);
        self.absolute_position += 1;
        self.add_pattern()
    }

    /// Index the 3-byte pattern headed by the byte just moved into the
    /// look-back. The chain gets one entry per consumed byte regardless, so
    /// chain and look-back indices stay aligned.
    fn add_pattern(&mut self) -> Result<()> {
        if self.look_back.is_empty() || self.look_ahead.len() < MIN_BACK_REFERENCE_LENGTH - 1 {
            self.chain.enqueue(END_OF_CHAIN);
            return Ok(());
        }

        let start_relative = self.look_back.len() - 1;
        let key = Self::pattern_key(
            self.look_back.get(start_relative)?,
            self.look_ahead.get(0)?,
            self.look_ahead.get(1)?,
        );

        let previous = self
            .head_by_pattern
            .get(&key)
            .copied()
            .unwrap_or(END_OF_CHAIN);
        self.chain.enqueue(previous);
        self.head_by_pattern
            .insert(key, self.relative_to_absolute(start_relative));
        Ok(())
    }

    /// Drop the pattern headed by the byte about to be evicted from a full
    /// look-back; its hash-map entry is erased only if it still points at
    /// the evicted slot.
    fn remove_pattern(&mut self) -> Result<()> {
        if !self.look_back.is_full() {
            return Ok(());
        }
        self.chain.dequeue()?;

        let key = Self::pattern_key(
            self.look_back.get(0)?,
            self.look_back.get(1)?,
            self.look_back.get(2)?,
        );
        if let Some(&absolute) = self.head_by_pattern.get(&key) {
            if absolute == self.absolute_start_of_look_back() {
                self.head_by_pattern.remove(&key);
            }
        }
        Ok(())
    }

    /// Walk the chain of prior occurrences of the look-ahead's first three
    /// bytes and keep the longest match, ties going to the first entry
    /// encountered (the most recent occurrence, hence the smallest
    /// distance).
    fn find_best_back_reference(&self) -> Result<BackReference> {
        if self.look_ahead.len() < MIN_BACK_REFERENCE_LENGTH {
            return Ok(BackReference::NONE);
        }

        let key = Self::pattern_key(
            self.look_ahead.get(0)?,
            self.look_ahead.get(1)?,
            self.look_ahead.get(2)?,
        );
        let Some(&head) = self.head_by_pattern.get(&key) else {
            return Ok(BackReference::NONE);
        };
        if !self.is_absolute_in_look_back(head) {
            return Ok(BackReference::NONE);
        }

        let mut longest = BackReference {
            distance: self.look_back.len() - self.absolute_to_relative(head),
            length: MIN_BACK_REFERENCE_LENGTH,
        };

        let mut start_absolute = head;
        while self.is_absolute_in_look_back(start_absolute) {
            let start_relative = self.absolute_to_relative(start_absolute);
            let span = self.look_back.len() - start_relative;

            // The key guarantees the first three bytes; extend from there.
            for current in MIN_BACK_REFERENCE_LENGTH..self.look_ahead.len() {
                let current_relative = if span < self.look_ahead.len() {
                    // Overlap regime: the match runs past the window end
                    // into its own output; index cyclically.
                    start_relative + (current % span)
                } else {
                    start_relative + current
                };

                if self.look_back.get(current_relative)? != self.look_ahead.get(current)? {
                    break;
                }
                if longest.length >= current + 1 {
                    continue;
                }
                longest = BackReference {
                    distance: span,
                    length: current + 1,
                };
            }

            if longest.length >= self.look_ahead.len() {
                // Nothing in the chain can beat a full-look-ahead match.
                break;
            }
            start_absolute = self.chain.get(start_relative)?;
        }

        Ok(longest)
    }
}

impl Default for LzssMatcher {
    fn default() -> Self {
        Self::new()
    }
}
