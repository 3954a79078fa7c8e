//! Canonical prefix codes for DEFLATE (RFC 1951 §3.2.2).
//!
//! DEFLATE transmits a Huffman code as nothing more than a code length per
//! symbol; both sides then derive identical codewords canonically: codes of
//! the same length are consecutive values in symbol order, and shorter
//! codes lexicographically precede longer ones.
//!
//! This module turns a length table into [`PrefixCode`]s and provides the
//! [`CodeWrite`] extension over the core bit writers for emitting them.
//! Prefix codes go onto the wire most-significant-bit first, the opposite
//! of every other field in the format (§3.1.1).

use crate::tables::Offset;
use oxigz_core::bitstream::BitWrite;
use oxigz_core::Result;

/// Maximum code length for the literal/length and distance alphabets.
pub const MAX_PREFIX_CODE_LENGTH: u8 = 15;

/// Maximum code length for the code-length alphabet of dynamic headers.
pub const MAX_CODE_LENGTH_CODE_LENGTH: u8 = 7;

/// A canonical prefix codeword.
///
/// `bits` is right-justified: a code of length 5 occupies the five low
/// bits. A zero `length` marks a symbol that does not participate in the
/// code and must never be emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefixCode {
    /// The codeword, right-justified.
    pub bits: u16,
    /// Codeword length in bits (0 = unused symbol).
    pub length: u8,
}

/// A prefix code paired with its extra-bits offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrefixCodeWithOffset {
    /// The codeword.
    pub code: PrefixCode,
    /// The extra bits following it.
    pub offset: Offset,
}

/// A back-reference fully resolved to wire form: length side, then
/// distance side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixCodedBackReference {
    /// Length symbol codeword and its extra bits.
    pub length: PrefixCodeWithOffset,
    /// Distance symbol codeword and its extra bits.
    pub distance: PrefixCodeWithOffset,
}

/// Assign canonical codes to a table of per-symbol code lengths.
///
/// Zero-length symbols receive `PrefixCode::default()`. The caller is
/// responsible for the lengths satisfying Kraft-McMillan (which the
/// package-merge construction guarantees).
pub fn prefix_codes(lengths: &[u8]) -> Vec<PrefixCode> {
    let mut codes = vec![PrefixCode::default(); lengths.len()];

    let max_length = lengths.iter().copied().max().unwrap_or(0) as usize;
    if max_length == 0 {
        return codes;
    }

    // Step 1: count the codes of each length (length 0 does not count).
    let mut count_by_length = vec![0u16; max_length + 1];
    for &length in lengths {
        if length > 0 {
            count_by_length[length as usize] += 1;
        }
    }

    // Step 2: the smallest code of each length.
    let mut next_code = vec![0u16; max_length + 1];
    let mut code = 0u16;
    for bits in 1..=max_length {
        code = (code + count_by_length[bits - 1]) << 1;
        next_code[bits] = code;
    }

    // Step 3: hand out consecutive codes in symbol order.
    for (symbol, &length) in lengths.iter().enumerate() {
        if length > 0 {
            codes[symbol] = PrefixCode {
                bits: next_code[length as usize],
                length,
            };
            next_code[length as usize] += 1;
        }
    }

    codes
}

/// DEFLATE code emission over any [`BitWrite`] sink.
///
/// Blanket-implemented so both the unbuffered and the buffered writer can
/// emit codes, offsets, and whole back-references.
pub trait CodeWrite: BitWrite {
    /// Append a prefix code, most-significant bit first.
    fn write_prefix_code(&mut self, code: PrefixCode) -> Result<()> {
        for i in (0..code.length).rev() {
            self.write_bit((code.bits >> i) & 1 != 0)?;
        }
        Ok(())
    }

    /// Append an extra-bits offset, LSB first.
    fn write_offset(&mut self, offset: Offset) -> Result<()> {
        self.write_bits(offset.bits as u32, offset.num_bits)
    }

    /// Append a back-reference: length code, length offset, distance code,
    /// distance offset, in wire order.
    fn write_back_reference(&mut self, back_reference: PrefixCodedBackReference) -> Result<()> {
        self.write_prefix_code(back_reference.length.code)?;
        self.write_offset(back_reference.length.offset)?;
        self.write_prefix_code(back_reference.distance.code)?;
        self.write_offset(back_reference.distance.offset)?;
        Ok(())
    }
}

impl<S: BitWrite + ?Sized> CodeWrite for S {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::fixed_litlen_lengths;
    use oxigz_core::bitstream::BitWriter;

    #[test]
    fn test_simple_canonical_assignment() {
        // Lengths [2, 1, 3, 3] -> canonical codes 10, 0, 110, 111.
        let codes = prefix_codes(&[2, 1, 3, 3]);

        assert_eq!(codes[0], PrefixCode { bits: 0b10, length: 2 });
        assert_eq!(codes[1], PrefixCode { bits: 0b0, length: 1 });
        assert_eq!(codes[2], PrefixCode { bits: 0b110, length: 3 });
        assert_eq!(codes[3], PrefixCode { bits: 0b111, length: 3 });
    }

    #[test]
    fn test_zero_lengths_stay_unused() {
        let codes = prefix_codes(&[0, 2, 0, 2, 2, 2]);

        assert_eq!(codes[0], PrefixCode::default());
        assert_eq!(codes[2], PrefixCode::default());
        assert_eq!(codes[1].length, 2);
        assert_eq!(codes[5].bits, 0b11);
    }

    #[test]
    fn test_all_zero_lengths() {
        let codes = prefix_codes(&[0, 0, 0]);
        assert!(codes.iter().all(|c| c.length == 0));
    }

    #[test]
    fn test_codes_are_prefix_free() {
        let codes = prefix_codes(&[3, 3, 3, 3, 3, 2, 4, 4]);

        let used: Vec<PrefixCode> = codes.into_iter().filter(|c| c.length > 0).collect();
        for a in &used {
            for b in &used {
                if a == b {
                    continue;
                }
                let shorter = a.length.min(b.length);
                let a_prefix = a.bits >> (a.length - shorter);
                let b_prefix = b.bits >> (b.length - shorter);
                assert!(
                    a_prefix != b_prefix,
                    "{:?} and {:?} share a prefix",
                    a,
                    b
                );
            }
        }
    }

    #[test]
    fn test_fixed_litlen_code_values() {
        // RFC 1951 §3.2.6 spells out the fixed code explicitly.
        let codes = prefix_codes(&fixed_litlen_lengths());

        for (i, code) in codes.iter().enumerate().take(144) {
            assert_eq!(code.length, 8);
            assert_eq!(code.bits, 0b00110000 + i as u16);
        }
        for (i, code) in codes.iter().enumerate().take(256).skip(144) {
            assert_eq!(code.length, 9);
            assert_eq!(code.bits, 0b110010000 + (i as u16 - 144));
        }
        for (i, code) in codes.iter().enumerate().take(280).skip(256) {
            assert_eq!(code.length, 7);
            assert_eq!(code.bits, i as u16 - 256);
        }
        for (i, code) in codes.iter().enumerate().take(288).skip(280) {
            assert_eq!(code.length, 8);
            assert_eq!(code.bits, 0b11000000 + (i as u16 - 280));
        }
    }

    #[test]
    fn test_prefix_code_written_msb_first() {
        let mut out = Vec::new();
        {
            let mut writer = BitWriter::new(&mut out);
            // Code 0b110 (length 3) must appear on the wire as 1, 1, 0.
            writer
                .write_prefix_code(PrefixCode { bits: 0b110, length: 3 })
                .unwrap();
            writer.align_to_byte().unwrap();
        }
        // Bits 1,1,0 packed LSB-first: 0b00000011.
        assert_eq!(out, vec![0x03]);
    }

    #[test]
    fn test_offset_written_lsb_first() {
        let mut out = Vec::new();
        {
            let mut writer = BitWriter::new(&mut out);
            writer
                .write_offset(Offset { bits: 0b01, num_bits: 2 })
                .unwrap();
            writer.align_to_byte().unwrap();
        }
        assert_eq!(out, vec![0x01]);
    }
}
