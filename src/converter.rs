//! # Converter
//!
//! Reads a UTF-8 resource script and writes it back out as BOM-prefixed UTF-16LE.
//!
//! The order of operations matters:
//! 1. Read and decode the whole source (`read_source`).
//! 2. Only then create/truncate the destination (`write_destination`).
//!
//! So a missing or undecodable source never touches the destination. A failure
//! while writing, however, can leave the destination truncated; we do not clean up.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use log::{debug, info};
use thiserror::Error;
use crate::encoder;
use crate::invariant::{self, assert_invariant};

/// Source read by default, relative to the working directory.
pub const DEFAULT_SOURCE: &str = "DriveSizeStrings_temp.rc";
/// Destination written by default, relative to the working directory.
pub const DEFAULT_DESTINATION: &str = "DriveSizeStrings.rc";

/// One requested conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl Conversion {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self { source: source.into(), destination: destination.into() }
    }
}

impl Default for Conversion {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE, DEFAULT_DESTINATION)
    }
}

/// What a successful conversion produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionReport {
    pub chars: usize,
    pub code_units: usize,
    pub bytes_written: usize,
}

/// Anything that can go wrong while converting a file or a directory of them.
///
/// Callers treat every variant the same way; the split only exists so the
/// message names the step and the file.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },

    #[error("{} is not valid UTF-8: {source}", path.display())]
    Decode { path: PathBuf, source: std::str::Utf8Error },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: std::io::Error },

    #[error("cannot scan {}: {source}", path.display())]
    Scan { path: PathBuf, source: walkdir::Error },

    #[error("{} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    #[error("{} and {} both convert to {}", earlier.display(), path.display(), destination.display())]
    DestinationClash { path: PathBuf, earlier: PathBuf, destination: PathBuf },
}

/// Converts `conversion.source` into `conversion.destination`.
///
/// # Returns
///
/// A [`ConversionReport`] on success, or the first [`ConvertError`] hit.
pub fn convert_file(conversion: &Conversion) -> Result<ConversionReport, ConvertError> {
    let bytes = read_source(&conversion.source)?;
    let text = encoder::decode_utf8(&bytes).map_err(|source| ConvertError::Decode {
        path: conversion.source.clone(),
        source,
    })?;
    debug!("Decoded {} bytes of UTF-8 from {:?}", bytes.len(), conversion.source);

    let encoded = encoder::encode_utf16le_with_bom(text);
    let code_units = text.encode_utf16().count();
    check_encoding(&conversion.source, text, &encoded, code_units);

    write_destination(&conversion.destination, &encoded)?;
    info!(
        "Converted {:?} -> {:?} ({} bytes)",
        conversion.source, conversion.destination, encoded.len()
    );

    Ok(ConversionReport {
        chars: text.chars().count(),
        code_units,
        bytes_written: encoded.len(),
    })
}

fn read_source(path: &Path) -> Result<Vec<u8>, ConvertError> {
    std::fs::read(path).map_err(|source| ConvertError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the BOM and then the payload, mirroring the two-step layout of the
/// format. The handle is dropped (closed) on every path out of this function.
fn write_destination(path: &Path, encoded: &[u8]) -> Result<(), ConvertError> {
    let wrap = |source| ConvertError::Write { path: path.to_path_buf(), source };

    let (bom, payload) = encoded.split_at(encoder::UTF16LE_BOM.len());
    let mut writer = BufWriter::new(File::create(path).map_err(wrap)?);
    writer.write_all(bom).map_err(wrap)?;
    writer.write_all(payload).map_err(wrap)?;
    writer.flush().map_err(wrap)?;
    Ok(())
}

fn check_encoding(source: &Path, text: &str, encoded: &[u8], code_units: usize) {
    assert_invariant(
        encoded.starts_with(&encoder::UTF16LE_BOM),
        invariant::STARTS_WITH_BOM,
        source,
    );
    assert_invariant(
        encoded.len() == encoder::UTF16LE_BOM.len() + 2 * code_units,
        invariant::LENGTH_MATCHES_CODE_UNITS,
        source,
    );
    // Full decode is proportional to file size; resource scripts are small.
    assert_invariant(
        encoder::decode_utf16le_with_bom(encoded).as_deref() == Some(text),
        invariant::ROUND_TRIPS,
        source,
    );
}
