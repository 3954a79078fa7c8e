//! Block-selection driver: the streaming DEFLATE encoder.
//!
//! [`Deflater`] feeds every incoming byte to each block encoder that is
//! still within its per-block byte limit, and lets a CUSUM change-point
//! detector over the byte distribution decide where blocks end. At a
//! boundary it asks every eligible encoder for its exact speculative bit
//! cost, commits the cheapest block, and resets everything for the next
//! one.
//!
//! Because each encoder owns an independent LZSS matcher, racing them
//! requires no coordination: all encoders see the identical byte stream.
//!
//! The default configuration keeps the fixed-Huffman encoder constructed
//! but disabled (byte limit 0): its advantage is confined to blocks far
//! smaller than the detector's warmup region, and skipping its per-step
//! match search saves real work for the few bits it could ever win.

use crate::blocks::{DynamicBlock, FixedBlock, StoredBlock, STORED_BLOCK_CAPACITY};
use crate::cusum::{CusumDetector, CusumParams};
use oxigz_core::bitstream::BitWriter;
use oxigz_core::Result;
use std::io::Write;

/// Per-encoder cap on uncompressed bytes per block.
///
/// `None` removes the encoder from the candidate set entirely; `Some(0)`
/// keeps it constructed but never fed (it can then only win a zero-byte
/// block, which the driver never asks for).
#[derive(Debug, Clone, Copy)]
pub struct BlockLimits {
    /// Stored-block cap; at most [`STORED_BLOCK_CAPACITY`].
    pub stored: Option<u64>,
    /// Fixed-Huffman cap.
    pub fixed: Option<u64>,
    /// Dynamic-Huffman cap; the de-facto maximum block size.
    pub dynamic: Option<u64>,
}

impl Default for BlockLimits {
    fn default() -> Self {
        Self {
            stored: Some(STORED_BLOCK_CAPACITY as u64),
            fixed: Some(0),
            dynamic: Some(1 << 30),
        }
    }
}

impl BlockLimits {
    fn max(&self) -> Option<u64> {
        [self.stored, self.fixed, self.dynamic]
            .into_iter()
            .flatten()
            .max()
    }
}

/// Which encoder won a block; used only for the commit dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Stored,
    Fixed,
    Dynamic,
}

/// Streaming DEFLATE encoder with speculative per-block selection.
///
/// Owns the downstream [`BitWriter`]; [`finish`](Self::finish) commits the
/// final block, pads to a byte boundary, and hands the writer back so the
/// container can append its trailer.
#[derive(Debug)]
pub struct Deflater<W: Write> {
    out: BitWriter<W>,
    stored: StoredBlock,
    fixed: FixedBlock,
    dynamic: DynamicBlock,
    limits: BlockLimits,
    max_limit: u64,
    detector: CusumDetector,
    bytes_in_block: u64,
    /// A boundary fired on the previous byte; commit before the next one.
    boundary_pending: bool,
    blocks_committed: u64,
}

impl<W: Write> Deflater<W> {
    /// Create a driver with the default limits and detector tuning.
    pub fn new(out: BitWriter<W>) -> Self {
        Self::with_limits(out, BlockLimits::default(), CusumParams::default())
    }

    /// Create a driver with explicit per-encoder limits and detector
    /// parameters.
    ///
    /// # Panics
    ///
    /// Panics if every encoder is disabled, or if the stored limit exceeds
    /// the 16-bit LEN field.
    pub fn with_limits(out: BitWriter<W>, limits: BlockLimits, params: CusumParams) -> Self {
        let max_limit = limits
            .max()
            .expect("at least one block encoder must be enabled");
        assert!(
            limits.stored.unwrap_or(0) <= STORED_BLOCK_CAPACITY as u64,
            "stored block limit exceeds the 16-bit LEN field"
        );

        Self {
            out,
            stored: StoredBlock::new(),
            fixed: FixedBlock::new(),
            dynamic: DynamicBlock::new(),
            limits,
            max_limit,
            detector: CusumDetector::new(params),
            bytes_in_block: 0,
            boundary_pending: false,
            blocks_committed: 0,
        }
    }

    /// Number of blocks committed so far.
    pub fn blocks_committed(&self) -> u64 {
        self.blocks_committed
    }

    /// Feed one byte.
    pub fn put(&mut self, byte: u8) -> Result<()> {
        // A boundary detected on the previous byte is applied only now
        // that another byte proves the stream continues; a boundary at end
        // of input merges into the final commit instead.
        if self.boundary_pending {
            self.commit_cheapest(false)?;
            self.start_new_block();
        }

        self.bytes_in_block += 1;
        if self.is_fed(self.limits.stored) {
            self.stored.put(byte)?;
        }
        if self.is_fed(self.limits.fixed) {
            self.fixed.put(byte)?;
        }
        if self.is_fed(self.limits.dynamic) {
            self.dynamic.put(byte)?;
        }

        if self.detector.step(byte) || self.bytes_in_block >= self.max_limit {
            self.boundary_pending = true;
        }
        Ok(())
    }

    /// Feed a whole buffer.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        for &byte in data {
            self.put(byte)?;
        }
        Ok(())
    }

    /// Commit the final block and return the byte-aligned writer.
    pub fn finish(mut self) -> Result<BitWriter<W>> {
        if self.bytes_in_block == 0 && self.limits.stored.is_some() {
            // Empty stream: a stored block is the 5-byte way to say so.
            self.stored.commit(true, &mut self.out)?;
            self.blocks_committed += 1;
        } else {
            self.commit_cheapest(true)?;
        }
        self.out.align_to_byte()?;
        Ok(self.out)
    }

    /// Whether an encoder with this limit still receives bytes: it gets
    /// every byte until the count would exceed the limit.
    fn is_fed(&self, limit: Option<u64>) -> bool {
        limit.is_some_and(|limit| self.bytes_in_block <= limit)
    }

    /// Measure every eligible encoder and commit the cheapest block.
    /// Ties go to the earlier of stored, fixed, dynamic.
    fn commit_cheapest(&mut self, is_last: bool) -> Result<()> {
        let mut best: Option<(u64, BlockKind)> = None;

        if self.is_fed(self.limits.stored) {
            best = Some((self.stored.bits(is_last), BlockKind::Stored));
        }
        if self.is_fed(self.limits.fixed) {
            let bits = self.fixed.bits(is_last)?;
            if best.map_or(true, |(smallest, _)| bits < smallest) {
                best = Some((bits, BlockKind::Fixed));
            }
        }
        if self.is_fed(self.limits.dynamic) {
            let bits = self.dynamic.bits(is_last)?;
            if best.map_or(true, |(smallest, _)| bits < smallest) {
                best = Some((bits, BlockKind::Dynamic));
            }
        }

        // The boundary rule caps bytes_in_block at the largest limit, so
        // that encoder is always eligible.
        let Some((_, kind)) = best else {
            unreachable!("no eligible block encoder at commit");
        };
        match kind {
            BlockKind::Stored => self.stored.commit(is_last, &mut self.out)?,
            BlockKind::Fixed => self.fixed.commit(is_last, &mut self.out)?,
            BlockKind::Dynamic => self.dynamic.commit(is_last, &mut self.out)?,
        }
        self.blocks_committed += 1;
        Ok(())
    }

    fn start_new_block(&mut self) {
        self.stored.reset();
        self.fixed.reset();
        self.dynamic.reset();
        self.detector.reset();
        self.bytes_in_block = 0;
        self.boundary_pending = false;
    }
}
