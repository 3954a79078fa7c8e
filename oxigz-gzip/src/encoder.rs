//! The streaming GZIP encoder.

use crate::header::{write_header, write_trailer};
use oxigz_core::bitstream::BitWriter;
use oxigz_core::crc::Crc32;
use oxigz_core::Result;
use oxigz_deflate::{BlockLimits, CusumParams, Deflater};
use std::io::Write;

/// Single-pass GZIP encoder over any byte sink.
///
/// Construction writes the fixed header; [`write`](Self::write) streams
/// bytes through the block-selecting DEFLATE driver while keeping the
/// running CRC-32 and input length; [`finish`](Self::finish) commits the
/// last block, byte-aligns the bit stream, writes the trailer, and
/// returns the sink.
///
/// # Example
///
/// ```
/// use oxigz_gzip::GzipEncoder;
///
/// let mut encoder = GzipEncoder::new(Vec::new()).unwrap();
/// encoder.write(b"hello hello hello").unwrap();
/// let stream = encoder.finish().unwrap();
/// assert_eq!(&stream[..2], &[0x1F, 0x8B]);
/// ```
#[derive(Debug)]
pub struct GzipEncoder<W: Write> {
    deflater: Deflater<W>,
    crc: Crc32,
    /// Input length, reduced mod 2^32 by the wrapping add (ISIZE field).
    input_size: u32,
}

impl<W: Write> GzipEncoder<W> {
    /// Write the header and set up the default encoder configuration.
    pub fn new(writer: W) -> Result<Self> {
        Self::with_limits(writer, BlockLimits::default(), CusumParams::default())
    }

    /// Write the header and set up an explicitly configured encoder.
    pub fn with_limits(writer: W, limits: BlockLimits, params: CusumParams) -> Result<Self> {
        let mut bit_writer = BitWriter::new(writer);
        write_header(bit_writer.get_mut())?;
        Ok(Self {
            deflater: Deflater::with_limits(bit_writer, limits, params),
            crc: Crc32::new(),
            input_size: 0,
        })
    }

    /// Stream a chunk of input into the encoder.
    pub fn write(&mut self, data: &[u8]) -> Result<()> {
        self.crc.update(data);
        self.input_size = self.input_size.wrapping_add(data.len() as u32);
        self.deflater.write(data)
    }

    /// Number of DEFLATE blocks committed so far.
    pub fn blocks_committed(&self) -> u64 {
        self.deflater.blocks_committed()
    }

    /// Close the stream: final block, byte alignment, CRC-32 and ISIZE.
    pub fn finish(self) -> Result<W> {
        let crc = self.crc.finalize();
        let bit_writer = self.deflater.finish()?;
        let mut writer = bit_writer.into_inner()?;
        write_trailer(&mut writer, crc, self.input_size)?;
        Ok(writer)
    }
}

/// Compress a complete buffer into a fresh GZIP stream.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzipEncoder::new(Vec::new())?;
    encoder.write(data)?;
    encoder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stream_layout() {
        let stream = compress(b"").unwrap();
        // Header (10), empty stored last-block (5), CRC and ISIZE (8).
        assert_eq!(stream.len(), 23);
        assert_eq!(&stream[10..15], &[0x01, 0x00, 0x00, 0xFF, 0xFF]);
        assert_eq!(&stream[15..], &[0u8; 8]);
    }

    #[test]
    fn test_trailer_fields() {
        let stream = compress(b"A").unwrap();
        let trailer = &stream[stream.len() - 8..];
        let crc = u32::from_le_bytes([trailer[0], trailer[1], trailer[2], trailer[3]]);
        let isize_field = u32::from_le_bytes([trailer[4], trailer[5], trailer[6], trailer[7]]);

        assert_eq!(crc, 0xD3D99E8B);
        assert_eq!(isize_field, 1);
    }

    #[test]
    fn test_header_prefix() {
        let stream = compress(b"anything").unwrap();
        assert_eq!(&stream[..10], &crate::header::GZIP_HEADER);
    }
}
