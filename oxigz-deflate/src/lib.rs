//! # OxiGz Deflate
//!
//! Streaming DEFLATE encoder (RFC 1951) with speculative block selection.
//!
//! Every incoming byte is fed to up to three block encoders in parallel:
//!
//! - **Stored** (type 0): raw bytes, for incompressible stretches
//! - **Fixed Huffman** (type 1): the predefined §3.2.6 codes
//! - **Dynamic Huffman** (type 2): per-block optimal codes built with the
//!   length-limited package-merge algorithm, plus a run-length-compressed
//!   code-length table
//!
//! Each encoder answers its exact would-be bit cost without writing
//! anything, and the [`Deflater`] driver commits whichever block is
//! cheapest. Block boundaries come from a CUSUM change-point detector over
//! the empirical byte distribution, so code tables stay tuned to one
//! statistical regime of the input.
//!
//! The compressed encoders share one LZSS machinery: a 32 KB sliding
//! window indexed by a chained hash over 3-byte patterns, with match
//! extension that handles the overlapping (run-length) regime.
//!
//! ## Example
//!
//! ```rust
//! use oxigz_core::bitstream::BitWriter;
//! use oxigz_deflate::Deflater;
//!
//! let mut out = Vec::new();
//! let mut deflater = Deflater::new(BitWriter::new(&mut out));
//! deflater.write(b"streams of bytes, bytes of streams").unwrap();
//! let mut writer = deflater.finish().unwrap();
//! writer.flush().unwrap();
//! drop(writer);
//! assert!(!out.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod blocks;
pub mod cusum;
pub mod deflate;
pub mod huffman;
pub mod lzss;
pub mod package_merge;
pub mod tables;

// Re-exports
pub use blocks::{DynamicBlock, FixedBlock, StoredBlock, STORED_BLOCK_CAPACITY};
pub use cusum::{CusumDetector, CusumParams};
pub use deflate::{BlockLimits, Deflater};
pub use huffman::{prefix_codes, CodeWrite, PrefixCode};
pub use lzss::{BackReference, LzssMatcher};
pub use package_merge::package_merge;
