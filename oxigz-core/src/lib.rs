//! # OxiGz Core
//!
//! Core components for the OxiGz streaming gzip encoder.
//!
//! This crate provides the fundamental building blocks the codec layers are
//! assembled from:
//!
//! - [`bitstream`]: LSB-first bit-level output, unbuffered and buffered
//! - [`ringbuffer`]: fixed-capacity FIFO for the LZSS sliding window
//! - [`crc`]: CRC-32 running checksum for the gzip trailer
//! - [`error`]: error types
//!
//! ## Architecture
//!
//! OxiGz is a layered stack; this crate is the bottom layer:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L4: CLI                                                 │
//! │     oxigz binary (stdin → stdout)                       │
//! ├─────────────────────────────────────────────────────────┤
//! │ L3: Container                                           │
//! │     GZIP framing (header, CRC-32, ISIZE)                │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     DEFLATE (LZSS + Huffman), block selection, CUSUM    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: BitStream (this crate)                              │
//! │     BitWriter, RingBuffer, CRC                          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use oxigz_core::bitstream::{BitWrite, BitWriter};
//! use oxigz_core::crc::Crc32;
//!
//! let mut out = Vec::new();
//! let mut writer = BitWriter::new(&mut out);
//! writer.write_bits(0b01, 2).unwrap();
//! writer.flush().unwrap();
//! drop(writer);
//! assert_eq!(out, vec![0x01]);
//!
//! assert_eq!(Crc32::compute(b"123456789"), 0xCBF43926);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod ringbuffer;

// Re-exports for convenience
pub use bitstream::{BitWrite, BitWriter, BufferedBitWriter};
pub use crc::Crc32;
pub use error::{OxigzError, Result};
pub use ringbuffer::RingBuffer;
