//! Round-trip tests for the raw DEFLATE stream against an independent
//! decoder.

use flate2::read::DeflateDecoder;
use oxigz_core::bitstream::BitWriter;
use oxigz_deflate::Deflater;
use std::io::Read;

fn deflate(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut deflater = Deflater::new(BitWriter::new(&mut out));
        deflater.write(input).unwrap();
        let mut writer = deflater.finish().unwrap();
        writer.flush().unwrap();
    }
    out
}

fn inflate(data: &[u8]) -> Vec<u8> {
    let mut decoded = Vec::new();
    DeflateDecoder::new(data)
        .read_to_end(&mut decoded)
        .expect("produced stream must be valid DEFLATE");
    decoded
}

/// Deterministic xorshift noise, so failures reproduce.
fn noise(len: usize, mut state: u64) -> Vec<u8> {
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 32) as u8
        })
        .collect()
}

#[test]
fn roundtrip_corpus() {
    let corpus: Vec<Vec<u8>> = vec![
        b"".to_vec(),
        b"A".to_vec(),
        b"AB".to_vec(),
        b"abc".to_vec(),
        b"The quick brown fox jumps over the lazy dog".to_vec(),
        b"aaaaaaaaaabbbbbbbbbbccccccccccdddddddddd".to_vec(),
        vec![0u8; 1000],
        (0u16..=255).map(|v| v as u8).collect(),
        b"to be or not to be, that is the question; ".repeat(100),
        noise(1024, 0x9E3779B97F4A7C15),
    ];

    for input in &corpus {
        let compressed = deflate(input);
        assert_eq!(
            inflate(&compressed),
            *input,
            "roundtrip failed for {} input bytes",
            input.len()
        );
    }
}

#[test]
fn roundtrip_long_runs() {
    let input = vec![b'a'; 50_000];
    let compressed = deflate(&input);

    assert!(
        compressed.len() < 200,
        "a 50k run should collapse, got {} bytes",
        compressed.len()
    );
    assert_eq!(inflate(&compressed), input);
}

#[test]
fn roundtrip_regime_shift() {
    let mut input = vec![b'x'; 12_000];
    input.extend(noise(12_000, 0x853C49E6748FEA9B));
    input.extend(b"and back to text again, ".repeat(500));

    let compressed = deflate(&input);
    assert_eq!(inflate(&compressed), input);
}

#[test]
fn roundtrip_window_sized_periodicity() {
    // Period longer than the look-ahead but far shorter than the window.
    let period: Vec<u8> = (0..1021u32).map(|i| (i * 7 % 256) as u8).collect();
    let input: Vec<u8> = period.iter().copied().cycle().take(40_000).collect();

    let compressed = deflate(&input);
    assert!(compressed.len() < input.len() / 4);
    assert_eq!(inflate(&compressed), input);
}
