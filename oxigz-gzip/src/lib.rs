//! # OxiGz Gzip
//!
//! GZIP container (RFC 1952) over the OxiGz streaming DEFLATE encoder.
//!
//! A GZIP stream is a fixed 10-byte header, one DEFLATE stream, and an
//! 8-byte trailer holding the CRC-32 and the length (mod 2^32) of the
//! uncompressed data. This crate wires those three pieces together around
//! the block-selecting encoder from `oxigz-deflate`.
//!
//! Compression only: decoding is out of scope for this project.
//!
//! ## Example
//!
//! ```rust
//! use oxigz_gzip::compress;
//!
//! let stream = compress(b"Hello, World! Hello, World!").unwrap();
//! assert_eq!(&stream[..2], &[0x1F, 0x8B]); // gzip magic
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

mod encoder;
mod header;

pub use encoder::{compress, GzipEncoder};
pub use header::{write_header, write_trailer, CM_DEFLATE, GZIP_HEADER, GZIP_MAGIC, OS_UNIX};
