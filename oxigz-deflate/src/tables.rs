//! Length and distance symbol tables for DEFLATE (RFC 1951 §3.2.5).
//!
//! A back-reference is transmitted as a length symbol (257-285) plus extra
//! bits and a distance symbol (0-29) plus extra bits. The range boundaries
//! below are fixed by the RFC and must be bit-for-bit identical across
//! implementations for interoperability.
//!
//! The fixed literal/length code of §3.2.6 also lives here, cached behind a
//! `OnceLock` the first time a fixed-Huffman block needs it.

use crate::huffman::{prefix_codes, PrefixCode};
use std::sync::OnceLock;

/// Size of the literal/length alphabet (0-287).
pub const NUM_LL_SYMBOLS: usize = 288;

/// Size of the distance alphabet (0-29).
pub const NUM_DISTANCE_SYMBOLS: usize = 30;

/// Number of length symbols (257-285).
pub const NUM_LENGTH_SYMBOLS: usize = 29;

/// Size of the code-length alphabet used by dynamic block headers (0-18).
pub const NUM_CODE_LENGTH_SYMBOLS: usize = 19;

/// End-of-block symbol.
pub const EOB_SYMBOL: u16 = 256;

/// Extra bits carried alongside a symbol to pinpoint a value in its range.
///
/// Invariant: `bits < 2^num_bits`, with `num_bits <= 13` (the widest
/// distance range).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    /// The extra-bits payload, right-justified.
    pub bits: u16,
    /// How many extra bits the symbol's range calls for (possibly zero).
    pub num_bits: u8,
}

/// A length or distance symbol together with its extra-bits offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolWithOffset {
    /// The alphabet symbol.
    pub symbol: u16,
    /// Offset of the encoded value within the symbol's range.
    pub offset: Offset,
}

/// Length code base values for codes 257-285.
pub const LENGTH_BASE: [u16; NUM_LENGTH_SYMBOLS] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; NUM_LENGTH_SYMBOLS] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values for codes 0-29.
pub const DISTANCE_BASE: [u16; NUM_DISTANCE_SYMBOLS] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; NUM_DISTANCE_SYMBOLS] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
];

/// Transmission order of code-length code lengths in a dynamic block
/// header (RFC 1951 §3.2.7).
pub const CODE_LENGTH_ORDER: [usize; NUM_CODE_LENGTH_SYMBOLS] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Map a match length (3-258) to its length symbol and offset.
pub fn length_to_symbol(length: u16) -> SymbolWithOffset {
    debug_assert!(
        (3..=258).contains(&length),
        "Length out of range: {}",
        length
    );

    let symbol = match length {
        3..=10 => length - 3 + 257,
        11..=18 => (length - 11) / 2 + 265,
        19..=34 => (length - 19) / 4 + 269,
        35..=66 => (length - 35) / 8 + 273,
        67..=130 => (length - 67) / 16 + 277,
        131..=257 => (length - 131) / 32 + 281,
        _ => 285,
    };

    let index = (symbol - 257) as usize;
    SymbolWithOffset {
        symbol,
        offset: Offset {
            bits: length - LENGTH_BASE[index],
            num_bits: LENGTH_EXTRA_BITS[index],
        },
    }
}

/// Recover the numeric length from a length symbol and its offset payload.
pub fn length_from_symbol(symbol: u16, offset_bits: u16) -> u16 {
    debug_assert!(
        (257..=285).contains(&symbol),
        "Invalid length symbol: {}",
        symbol
    );
    LENGTH_BASE[(symbol - 257) as usize] + offset_bits
}

/// Map a match distance (1-32768) to its distance symbol and offset.
pub fn distance_to_symbol(distance: u16) -> SymbolWithOffset {
    debug_assert!(distance >= 1, "Distance out of range: {}", distance);

    let symbol: u16 = match distance {
        1 => 0,
        2 => 1,
        3 => 2,
        4 => 3,
        5..=6 => 4,
        7..=8 => 5,
        9..=12 => 6,
        13..=16 => 7,
        17..=24 => 8,
        25..=32 => 9,
        33..=48 => 10,
        49..=64 => 11,
        65..=96 => 12,
        97..=128 => 13,
        129..=192 => 14,
        193..=256 => 15,
        257..=384 => 16,
        385..=512 => 17,
        513..=768 => 18,
        769..=1024 => 19,
        1025..=1536 => 20,
        1537..=2048 => 21,
        2049..=3072 => 22,
        3073..=4096 => 23,
        4097..=6144 => 24,
        6145..=8192 => 25,
        8193..=12288 => 26,
        12289..=16384 => 27,
        16385..=24576 => 28,
        _ => 29, // 24577..=32768
    };

    SymbolWithOffset {
        symbol,
        offset: Offset {
            bits: distance - DISTANCE_BASE[symbol as usize],
            num_bits: DISTANCE_EXTRA_BITS[symbol as usize],
        },
    }
}

/// Fixed literal/length code lengths (RFC 1951 §3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; NUM_LL_SYMBOLS] {
    let mut lengths = [0u8; NUM_LL_SYMBOLS];

    for len in lengths.iter_mut().take(144) {
        *len = 8;
    }
    for len in lengths.iter_mut().take(256).skip(144) {
        *len = 9;
    }
    for len in lengths.iter_mut().take(280).skip(256) {
        *len = 7;
    }
    for len in lengths.iter_mut().take(288).skip(280) {
        *len = 8;
    }

    lengths
}

/// The canonical fixed literal/length prefix codes.
///
/// Built once on first use and cached for the process lifetime.
pub fn fixed_litlen_codes() -> &'static [PrefixCode; NUM_LL_SYMBOLS] {
    static CODES: OnceLock<[PrefixCode; NUM_LL_SYMBOLS]> = OnceLock::new();

    CODES.get_or_init(|| {
        let codes = prefix_codes(&fixed_litlen_lengths());
        let mut array = [PrefixCode::default(); NUM_LL_SYMBOLS];
        array.copy_from_slice(&codes);
        array
    })
}

/// The fixed distance code for a distance symbol: five plain bits.
///
/// §3.2.6 represents distances 0-29 by 5-bit codes; as a canonical code of
/// thirty 5-bit entries, each symbol's code value equals the symbol itself.
pub fn fixed_distance_code(symbol: u16) -> PrefixCode {
    debug_assert!((symbol as usize) < NUM_DISTANCE_SYMBOLS);
    PrefixCode {
        bits: symbol,
        length: 5,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_roundtrip() {
        for length in 3..=258u16 {
            let with_offset = length_to_symbol(length);
            assert_eq!(
                length_from_symbol(with_offset.symbol, with_offset.offset.bits),
                length,
                "Roundtrip failed for length {}",
                length
            );
            assert!(with_offset.offset.bits < (1 << with_offset.offset.num_bits.max(1)));
        }
    }

    #[test]
    fn test_distance_covers_full_range() {
        for distance in 1..=32768u32 {
            let with_offset = distance_to_symbol(distance as u16);
            let decoded = DISTANCE_BASE[with_offset.symbol as usize] as u32
                + with_offset.offset.bits as u32;
            assert_eq!(decoded, distance, "Roundtrip failed for distance {}", distance);
        }
    }

    #[test]
    fn test_specific_lengths() {
        assert_eq!(length_to_symbol(3).symbol, 257);
        assert_eq!(length_to_symbol(10).symbol, 264);
        assert_eq!(length_to_symbol(11).symbol, 265);
        assert_eq!(length_to_symbol(12).offset.bits, 1);
        assert_eq!(length_to_symbol(12).offset.num_bits, 1);
        assert_eq!(length_to_symbol(258).symbol, 285);
        assert_eq!(length_to_symbol(258).offset.num_bits, 0);
    }

    #[test]
    fn test_specific_distances() {
        assert_eq!(distance_to_symbol(1).symbol, 0);
        assert_eq!(distance_to_symbol(4).symbol, 3);
        assert_eq!(distance_to_symbol(5).symbol, 4);
        assert_eq!(distance_to_symbol(6).offset.bits, 1);
        let farthest = distance_to_symbol(32768);
        assert_eq!(farthest.symbol, 29);
        assert_eq!(farthest.offset.bits, 8191);
        assert_eq!(farthest.offset.num_bits, 13);
    }

    #[test]
    fn test_fixed_litlen_lengths() {
        let lengths = fixed_litlen_lengths();

        assert_eq!(lengths[0], 8);
        assert_eq!(lengths[143], 8);
        assert_eq!(lengths[144], 9);
        assert_eq!(lengths[255], 9);
        assert_eq!(lengths[256], 7); // End of block
        assert_eq!(lengths[279], 7);
        assert_eq!(lengths[280], 8);
        assert_eq!(lengths[287], 8);
    }

    #[test]
    fn test_fixed_distance_codes() {
        for symbol in 0..NUM_DISTANCE_SYMBOLS as u16 {
            let code = fixed_distance_code(symbol);
            assert_eq!(code.length, 5);
            assert_eq!(code.bits, symbol);
        }
    }
}
