//! The three DEFLATE block encoders (RFC 1951 §3.2.3-§3.2.7).
//!
//! All three share one contract so the driver can race them against each
//! other on the same input:
//!
//! - `put(byte)` adds a byte to the block's view of the input;
//! - `bits(is_last)` answers the exact bit cost of committing now,
//!   including the 3-bit block header and any code-table metadata;
//! - `commit(is_last, out)` writes the block to the downstream bit writer;
//! - `reset()` returns the encoder to a freshly constructed state.
//!
//! The compressed encoders measure speculatively by encoding into a
//! [`BufferedBitWriter`] that is only replayed downstream on commit. The
//! dynamic encoder goes further: it keeps its whole block as tagged symbols
//! and defers the literal-vs-back-reference decision until flush, when the
//! block-optimal code lengths are finally known.

use crate::huffman::{
    prefix_codes, CodeWrite, PrefixCode, PrefixCodeWithOffset, PrefixCodedBackReference,
    MAX_CODE_LENGTH_CODE_LENGTH, MAX_PREFIX_CODE_LENGTH,
};
use crate::lzss::{LzssMatcher, MIN_BACK_REFERENCE_LENGTH};
use crate::package_merge::package_merge;
use crate::tables::{
    distance_to_symbol, fixed_distance_code, fixed_litlen_codes, length_from_symbol,
    length_to_symbol, Offset, CODE_LENGTH_ORDER, EOB_SYMBOL, NUM_CODE_LENGTH_SYMBOLS,
    NUM_DISTANCE_SYMBOLS, NUM_LL_SYMBOLS,
};
use oxigz_core::bitstream::{BitWrite, BitWriter, BufferedBitWriter};
use oxigz_core::error::{OxigzError, Result};
use std::io::Write;

/// Maximum payload of a stored block: LEN is a 16-bit field.
pub const STORED_BLOCK_CAPACITY: usize = (1 << 16) - 1;

/// Type 0: stored (uncompressed) block.
///
/// Cheapest for incompressible input; the driver also falls back to it for
/// tiny blocks where any code table would dominate.
#[derive(Debug)]
pub struct StoredBlock {
    block: Vec<u8>,
}

impl StoredBlock {
    /// Create an empty stored block.
    pub fn new() -> Self {
        Self {
            block: Vec::with_capacity(STORED_BLOCK_CAPACITY),
        }
    }

    /// Number of bytes buffered so far.
    pub fn len(&self) -> usize {
        self.block.len()
    }

    /// True when no bytes are buffered.
    pub fn is_empty(&self) -> bool {
        self.block.is_empty()
    }

    /// Buffer one byte.
    pub fn put(&mut self, byte: u8) -> Result<()> {
        if self.block.len() == STORED_BLOCK_CAPACITY {
            return Err(OxigzError::block_full(STORED_BLOCK_CAPACITY));
        }
        self.block.push(byte);
        Ok(())
    }

    /// Exact committed size, counting the 3-bit header plus worst-case
    /// padding to the byte boundary (8 bits total), LEN, NLEN, and the
    /// payload.
    pub fn bits(&self, _is_last: bool) -> u64 {
        8 + 2 * 16 + 8 * self.block.len() as u64
    }

    /// Write the block: header, pad, LEN, NLEN (ones' complement), bytes.
    pub fn commit<W: Write>(&mut self, is_last: bool, out: &mut BitWriter<W>) -> Result<()> {
        out.write_bit(is_last)?;
        out.write_bits(0b00, 2)?;
        out.align_to_byte()?;

        let len = self.block.len() as u16;
        out.write_bits(len as u32, 16)?;
        out.write_bits(!len as u32, 16)?;
        out.write_bytes(&self.block)?;
        Ok(())
    }

    /// Discard the buffered bytes.
    pub fn reset(&mut self) {
        self.block.clear();
    }
}

impl Default for StoredBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Type 1: fixed-Huffman block.
///
/// Uses the predefined §3.2.6 codes, so symbol costs are known the moment a
/// byte arrives and the literal-vs-back-reference choice can be made
/// greedily per step.
#[derive(Debug)]
pub struct FixedBlock {
    out: BufferedBitWriter,
    matcher: LzssMatcher,
    finalized: bool,
}

impl FixedBlock {
    /// Create an empty fixed-Huffman block.
    pub fn new() -> Self {
        Self {
            out: BufferedBitWriter::new(),
            matcher: LzssMatcher::new(),
            finalized: false,
        }
    }

    /// Feed one byte; encodes eagerly once the matcher's look-ahead fills.
    pub fn put(&mut self, byte: u8) -> Result<()> {
        debug_assert!(!self.finalized, "put after bits()/commit() without reset");
        self.matcher.put(byte);
        if self.matcher.is_full() {
            self.step()?;
        }
        Ok(())
    }

    /// Encode one literal or one back-reference, whichever is cheaper
    /// under the fixed codes (ties go to the back-reference, which
    /// advances further).
    fn step(&mut self) -> Result<()> {
        let ll_codes = fixed_litlen_codes();
        let backref = self.matcher.back_reference()?;

        if backref.length >= MIN_BACK_REFERENCE_LENGTH {
            let num_literal_bits: u64 = self
                .matcher
                .lookahead_iter()
                .take(backref.length)
                .map(|byte| ll_codes[byte as usize].length as u64)
                .sum();

            let length = length_to_symbol(backref.length as u16);
            let distance = distance_to_symbol(backref.distance as u16);
            let coded = PrefixCodedBackReference {
                length: PrefixCodeWithOffset {
                    code: ll_codes[length.symbol as usize],
                    offset: length.offset,
                },
                distance: PrefixCodeWithOffset {
                    code: fixed_distance_code(distance.symbol),
                    offset: distance.offset,
                },
            };
            let num_backref_bits = (coded.length.code.length
                + coded.length.offset.num_bits
                + coded.distance.code.length
                + coded.distance.offset.num_bits) as u64;

            if num_literal_bits >= num_backref_bits {
                self.out.write_back_reference(coded)?;
                self.matcher.take_back_reference()?;
                return Ok(());
            }
        }

        let byte = self.matcher.literal()?;
        self.out.write_prefix_code(ll_codes[byte as usize])?;
        self.matcher.take_literal()?;
        Ok(())
    }

    /// Drain the matcher and append the end-of-block symbol.
    fn finalize(&mut self) -> Result<()> {
        if self.finalized {
            return Ok(());
        }
        while !self.matcher.is_empty() {
            self.step()?;
        }
        self.out
            .write_prefix_code(fixed_litlen_codes()[EOB_SYMBOL as usize])?;
        self.finalized = true;
        Ok(())
    }

    /// Exact committed size: the 3-bit header plus the encoded body.
    pub fn bits(&mut self, _is_last: bool) -> Result<u64> {
        self.finalize()?;
        Ok(3 + self.out.bit_len())
    }

    /// Write the header directly downstream, then replay the body.
    pub fn commit<W: Write>(&mut self, is_last: bool, out: &mut BitWriter<W>) -> Result<()> {
        self.finalize()?;
        out.write_bit(is_last)?;
        out.write_bits(0b01, 2)?;
        self.out.commit(out)
    }

    /// Discard all accumulated state.
    pub fn reset(&mut self) {
        self.out.reset();
        self.matcher.reset();
        self.finalized = false;
    }
}

impl Default for FixedBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// One slot of the dynamic block's pending-symbol buffer.
#[derive(Debug, Clone, Copy)]
enum BlockItem {
    /// A literal/length symbol, or a distance symbol shifted by
    /// [`NUM_LL_SYMBOLS`].
    Symbol(u16),
    /// Extra bits belonging to the preceding symbol.
    Extra(Offset),
}

fn expect_symbol(item: BlockItem) -> u16 {
    match item {
        BlockItem::Symbol(symbol) => symbol,
        BlockItem::Extra(_) => unreachable!("block buffer layout violated: expected symbol"),
    }
}

fn expect_extra(item: BlockItem) -> Offset {
    match item {
        BlockItem::Extra(offset) => offset,
        BlockItem::Symbol(_) => unreachable!("block buffer layout violated: expected offset"),
    }
}

/// A run-length-encoded entry of the code-length sequence (§3.2.7).
#[derive(Debug, Clone, Copy)]
enum CodeLengthItem {
    /// A plain code length 0-15.
    Length(u8),
    /// Symbol 16 (copy previous), 17, or 18 (zero runs) with its
    /// repeat-count offset.
    Repeat { symbol: u8, offset: Offset },
}

/// Type 2: dynamic-Huffman block.
///
/// Symbols are buffered in tagged form and the code tables are built from
/// the observed frequencies when the block is first measured or committed.
/// A back-reference contributes its length and distance symbols to the
/// counts but also drags the covered bytes along in the buffer, so the
/// flush can still choose to spell them out as literals once the real,
/// block-optimal code lengths are known.
#[derive(Debug)]
pub struct DynamicBlock {
    out: BufferedBitWriter,
    matcher: LzssMatcher,
    count_by_symbol: [u64; NUM_LL_SYMBOLS + NUM_DISTANCE_SYMBOLS],
    block: Vec<BlockItem>,
    /// Set once the block content (header included) has been buffered.
    buffered_is_last: Option<bool>,
}

impl DynamicBlock {
    /// Create an empty dynamic-Huffman block.
    pub fn new() -> Self {
        Self {
            out: BufferedBitWriter::new(),
            matcher: LzssMatcher::new(),
            count_by_symbol: [0; NUM_LL_SYMBOLS + NUM_DISTANCE_SYMBOLS],
            block: Vec::new(),
            buffered_is_last: None,
        }
    }

    /// Feed one byte; consumes from the matcher once its look-ahead fills.
    pub fn put(&mut self, byte: u8) -> Result<()> {
        debug_assert!(
            self.buffered_is_last.is_none(),
            "put after bits()/commit() without reset"
        );
        self.matcher.put(byte);
        if self.matcher.is_full() {
            self.step()?;
        }
        Ok(())
    }

    /// Exact committed size with the given last-block flag.
    pub fn bits(&mut self, is_last: bool) -> Result<u64> {
        self.buffer(is_last)?;
        Ok(self.out.bit_len())
    }

    /// Replay the buffered block downstream.
    pub fn commit<W: Write>(&mut self, is_last: bool, out: &mut BitWriter<W>) -> Result<()> {
        self.buffer(is_last)?;
        let buffered = self.buffered_is_last.unwrap_or(is_last);
        if buffered != is_last {
            return Err(OxigzError::InconsistentLastFlag {
                buffered,
                requested: is_last,
            });
        }
        self.out.commit(out)
    }

    /// Discard all accumulated state.
    pub fn reset(&mut self) {
        self.out.reset();
        self.matcher.reset();
        self.count_by_symbol.fill(0);
        self.block.clear();
        self.buffered_is_last = None;
    }

    fn push_symbol(&mut self, symbol: u16) {
        self.count_by_symbol[symbol as usize] += 1;
        self.block.push(BlockItem::Symbol(symbol));
    }

    /// Consume one literal or one back-reference from the matcher into the
    /// tagged buffer.
    fn step(&mut self) -> Result<()> {
        let backref = self.matcher.back_reference()?;

        if backref.length >= MIN_BACK_REFERENCE_LENGTH {
            let length = length_to_symbol(backref.length as u16);
            let distance = distance_to_symbol(backref.distance as u16);
            self.push_symbol(length.symbol);
            self.block.push(BlockItem::Extra(length.offset));
            self.push_symbol(distance.symbol + NUM_LL_SYMBOLS as u16);
            self.block.push(BlockItem::Extra(distance.offset));

            // The covered bytes ride along uncounted: they only become
            // literals if the flush decides against the back-reference.
            let covered: Vec<u8> = self
                .matcher
                .lookahead_iter()
                .take(backref.length)
                .collect();
            for byte in covered {
                self.block.push(BlockItem::Symbol(byte as u16));
            }
            self.matcher.take_back_reference()?;
        } else {
            let byte = self.matcher.literal()?;
            self.push_symbol(byte as u16);
            self.matcher.take_literal()?;
        }
        Ok(())
    }

    /// Encode the whole block (header, code tables, body) into the
    /// measurement buffer. Idempotent: later calls are no-ops.
    fn buffer(&mut self, is_last: bool) -> Result<()> {
        if self.buffered_is_last.is_some() {
            return Ok(());
        }

        self.out.write_bit(is_last)?;
        self.out.write_bits(0b10, 2)?;

        while !self.matcher.is_empty() {
            self.step()?;
        }
        self.push_symbol(EOB_SYMBOL);

        let ll_lengths = package_merge(
            &self.count_by_symbol[..NUM_LL_SYMBOLS],
            MAX_PREFIX_CODE_LENGTH,
        )?;
        let distance_lengths = package_merge(
            &self.count_by_symbol[NUM_LL_SYMBOLS..],
            MAX_PREFIX_CODE_LENGTH,
        )?;
        let ll_codes = prefix_codes(&ll_lengths);
        let distance_codes = prefix_codes(&distance_lengths);

        Self::write_code_length_metadata(&mut self.out, &ll_codes, &distance_codes)?;
        Self::write_body(&mut self.out, &self.block, &ll_codes, &distance_codes)?;

        self.buffered_is_last = Some(is_last);
        Ok(())
    }

    /// Emit HLIT/HDIST/HCLEN, the code-length code, and the run-length
    /// encoded code-length sequence (§3.2.7).
    fn write_code_length_metadata(
        out: &mut BufferedBitWriter,
        ll_codes: &[PrefixCode],
        distance_codes: &[PrefixCode],
    ) -> Result<()> {
        let num_leading_ll = leading_count(257, NUM_LL_SYMBOLS, trailing_unused(ll_codes));
        let num_leading_distance =
            leading_count(1, NUM_DISTANCE_SYMBOLS, trailing_unused(distance_codes));

        // One sequence: the trimmed literal/length lengths immediately
        // followed by the trimmed distance lengths; runs may span the seam.
        let mut combined: Vec<u8> = Vec::with_capacity(num_leading_ll + num_leading_distance);
        combined.extend(ll_codes[..num_leading_ll].iter().map(|code| code.length));
        combined.extend(
            distance_codes[..num_leading_distance]
                .iter()
                .map(|code| code.length),
        );

        let (items, counts) = run_length_encode(&combined);

        let cl_lengths = package_merge(&counts, MAX_CODE_LENGTH_CODE_LENGTH)?;
        let cl_codes = prefix_codes(&cl_lengths);

        let reordered: Vec<PrefixCode> =
            CODE_LENGTH_ORDER.iter().map(|&index| cl_codes[index]).collect();
        let num_leading_cl = leading_count(4, NUM_CODE_LENGTH_SYMBOLS, trailing_unused(&reordered));

        out.write_bits((num_leading_ll - 257) as u32, 5)?;
        out.write_bits((num_leading_distance - 1) as u32, 5)?;
        out.write_bits((num_leading_cl - 4) as u32, 4)?;
        for code in reordered.iter().take(num_leading_cl) {
            out.write_bits(code.length as u32, 3)?;
        }

        for item in &items {
            match *item {
                CodeLengthItem::Length(length) => {
                    out.write_prefix_code(cl_codes[length as usize])?;
                }
                CodeLengthItem::Repeat { symbol, offset } => {
                    out.write_prefix_code(cl_codes[symbol as usize])?;
                    out.write_offset(offset)?;
                }
            }
        }
        Ok(())
    }

    /// Emit the buffered symbols with the final codes, re-deciding each
    /// back-reference against spelling out its covered literals.
    fn write_body(
        out: &mut BufferedBitWriter,
        block: &[BlockItem],
        ll_codes: &[PrefixCode],
        distance_codes: &[PrefixCode],
    ) -> Result<()> {
        let mut i = 0;
        while i < block.len() {
            let symbol = expect_symbol(block[i]);
            if symbol <= EOB_SYMBOL {
                out.write_prefix_code(ll_codes[symbol as usize])?;
                i += 1;
                continue;
            }

            // A length symbol opens a back-reference group: length offset,
            // shifted distance symbol, distance offset, covered literals.
            let length_offset = expect_extra(block[i + 1]);
            let distance_symbol = expect_symbol(block[i + 2]) - NUM_LL_SYMBOLS as u16;
            let distance_offset = expect_extra(block[i + 3]);
            let length = length_from_symbol(symbol, length_offset.bits) as usize;
            let covered = &block[i + 4..i + 4 + length];

            let num_backref_bits = (ll_codes[symbol as usize].length
                + length_offset.num_bits
                + distance_codes[distance_symbol as usize].length
                + distance_offset.num_bits) as u64;

            let mut num_literal_bits: u64 = 0;
            let mut forced = false;
            for item in covered {
                let code = ll_codes[expect_symbol(*item) as usize];
                if code.length == 0 {
                    // This byte occurs nowhere else as a literal, so the
                    // block's code table cannot spell it out.
                    forced = true;
                    break;
                }
                num_literal_bits += code.length as u64;
            }

            if forced || num_literal_bits >= num_backref_bits {
                out.write_back_reference(PrefixCodedBackReference {
                    length: PrefixCodeWithOffset {
                        code: ll_codes[symbol as usize],
                        offset: length_offset,
                    },
                    distance: PrefixCodeWithOffset {
                        code: distance_codes[distance_symbol as usize],
                        offset: distance_offset,
                    },
                })?;
            } else {
                for item in covered {
                    out.write_prefix_code(ll_codes[expect_symbol(*item) as usize])?;
                }
            }
            i += 4 + length;
        }
        Ok(())
    }
}

impl Default for DynamicBlock {
    fn default() -> Self {
        Self::new()
    }
}

/// Number of trailing symbols with no code.
fn trailing_unused(codes: &[PrefixCode]) -> usize {
    codes.iter().rev().take_while(|code| code.length == 0).count()
}

/// How many leading entries of a code table must be transmitted: everything
/// up to the last used symbol, floored at the alphabet's minimum.
fn leading_count(min: usize, total: usize, trailing: usize) -> usize {
    min.max(total - trailing)
}

/// Run-length encode a code-length sequence with symbols 16/17/18,
/// returning the encoded items and the code-length-symbol frequencies.
fn run_length_encode(lengths: &[u8]) -> (Vec<CodeLengthItem>, [u64; NUM_CODE_LENGTH_SYMBOLS]) {
    let mut items = Vec::new();
    let mut counts = [0u64; NUM_CODE_LENGTH_SYMBOLS];

    let emit_literals = |items: &mut Vec<CodeLengthItem>,
                         counts: &mut [u64; NUM_CODE_LENGTH_SYMBOLS],
                         length: u8,
                         run: usize| {
        for _ in 0..run {
            items.push(CodeLengthItem::Length(length));
        }
        counts[length as usize] += run as u64;
    };

    // Batch a run into `symbol` items of `min..=max` repeats each; the
    // leftover below `min` falls back to plain lengths.
    let emit_batched = |items: &mut Vec<CodeLengthItem>,
                        counts: &mut [u64; NUM_CODE_LENGTH_SYMBOLS],
                        length: u8,
                        mut run: usize,
                        min: usize,
                        max: usize,
                        num_bits: u8,
                        symbol: u8| {
        while run >= min {
            let size = max.min(run);
            run -= size;
            counts[symbol as usize] += 1;
            items.push(CodeLengthItem::Repeat {
                symbol,
                offset: Offset {
                    bits: (size - min) as u16,
                    num_bits,
                },
            });
        }
        for _ in 0..run {
            items.push(CodeLengthItem::Length(length));
        }
        counts[length as usize] += run as u64;
    };

    let mut i = 0;
    while i < lengths.len() {
        let length = lengths[i];
        let mut run = 1;
        while i + run < lengths.len() && lengths[i + run] == length {
            run += 1;
        }
        i += run;

        if length == 0 && run >= 11 {
            emit_batched(&mut items, &mut counts, length, run, 11, 138, 7, 18);
        } else if length == 0 && run >= 3 {
            emit_batched(&mut items, &mut counts, length, run, 3, 10, 3, 17);
        } else {
            // Symbol 16 copies the previous length, so one literal must
            // precede the first repeat.
            emit_literals(&mut items, &mut counts, length, 1);
            if run > 1 {
                emit_batched(&mut items, &mut counts, length, run - 1, 3, 6, 2, 16);
            }
        }
    }

    (items, counts)
}
