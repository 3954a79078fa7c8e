//! GZIP framing: the fixed header and the CRC/ISIZE trailer.

use oxigz_core::Result;
use std::io::Write;

/// GZIP magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];

/// GZIP compression method: DEFLATE.
pub const CM_DEFLATE: u8 = 0x08;

/// Operating system byte: Unix.
pub const OS_UNIX: u8 = 0x03;

/// The complete 10-byte header this encoder emits: magic, DEFLATE, no
/// flags, zero mtime, no extra flags, Unix.
///
/// All optional RFC 1952 fields (FNAME, FCOMMENT, FHCRC, FEXTRA) stay
/// unset so the output depends on nothing but the input bytes.
pub const GZIP_HEADER: [u8; 10] = [
    GZIP_MAGIC[0],
    GZIP_MAGIC[1],
    CM_DEFLATE,
    0x00, // FLG
    0x00,
    0x00,
    0x00,
    0x00, // MTIME (little endian)
    0x00, // XFL
    OS_UNIX,
];

/// Write the fixed header.
pub fn write_header<W: Write>(writer: &mut W) -> Result<()> {
    writer.write_all(&GZIP_HEADER)?;
    Ok(())
}

/// Write the 8-byte trailer: CRC-32 of the uncompressed data, then its
/// length mod 2^32, both little-endian.
pub fn write_trailer<W: Write>(writer: &mut W, crc: u32, input_size: u32) -> Result<()> {
    writer.write_all(&crc.to_le_bytes())?;
    writer.write_all(&input_size.to_le_bytes())?;
    Ok(())
}
