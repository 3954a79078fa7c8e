//! oxigz - single-pass streaming gzip encoder.
//!
//! Reads arbitrary bytes from stdin and writes an RFC 1952 compliant
//! gzip stream to stdout. No options, no files, no configuration: the
//! output depends on nothing but the input bytes.

use clap::Parser;
use oxigz_core::Result;
use oxigz_gzip::GzipEncoder;
use std::io::{self, BufRead, BufWriter, Write};

/// Compress stdin to stdout in gzip format.
#[derive(Parser)]
#[command(
    name = "oxigz",
    version,
    about = "Single-pass streaming gzip encoder (stdin to stdout)"
)]
struct Cli {}

fn main() {
    let _cli = Cli::parse();

    if let Err(error) = run() {
        eprintln!("oxigz: {}", error);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let mut stdin = io::stdin().lock();
    let stdout = io::stdout().lock();

    let mut encoder = GzipEncoder::new(BufWriter::new(stdout))?;
    loop {
        let chunk = stdin.fill_buf()?;
        if chunk.is_empty() {
            break;
        }
        encoder.write(chunk)?;
        let consumed = chunk.len();
        stdin.consume(consumed);
    }

    let mut writer = encoder.finish()?;
    writer.flush()?;
    Ok(())
}
