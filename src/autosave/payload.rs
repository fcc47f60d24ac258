//! Compressed autosave payload files.
//!
//! Layout:
//!
//! ```text
//! magic "ASV\0" | version u8 | raw length u64 LE | crc32 u32 LE | gzip stream
//! ```
//!
//! The checksum covers the uncompressed snapshot bytes.

use crate::error::{EditorError, Result};
use crate::types::Timestamp;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Magic bytes for autosave payload files.
const PAYLOAD_MAGIC: &[u8; 4] = b"ASV\0";

/// Current payload format version.
const PAYLOAD_VERSION: u8 = 1;

/// File extension for payload files.
pub const PAYLOAD_EXTENSION: &str = "sav";

/// Path of the payload file for an autosave taken at `stamp`.
pub fn payload_path(dir: &Path, stamp: Timestamp) -> PathBuf {
    dir.join(format!("autosave_{}.{PAYLOAD_EXTENSION}", stamp.as_millis()))
}

/// Compress `snapshot` and write it to `path`.
///
/// The data is written to a temporary file in the same directory and
/// renamed into place, so a crash never leaves a truncated payload behind.
/// The directory is created if it has gone missing.
pub fn write_payload(path: &Path, snapshot: &[u8]) -> Result<()> {
    let dir = path.parent().ok_or_else(|| {
        EditorError::InvalidFormat(format!("payload path {} has no parent", path.display()))
    })?;
    fs::create_dir_all(dir)?;
    let temp = NamedTempFile::new_in(dir)?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        writer.write_all(PAYLOAD_MAGIC)?;
        writer.write_all(&[PAYLOAD_VERSION])?;
        writer.write_all(&(snapshot.len() as u64).to_le_bytes())?;
        writer.write_all(&crc32fast::hash(snapshot).to_le_bytes())?;

        let mut encoder = GzEncoder::new(writer, Compression::default());
        encoder.write_all(snapshot)?;
        let mut writer = encoder.finish()?;
        writer.flush()?;
    }
    temp.as_file().sync_all()?;

    temp.persist(path).map_err(|e| EditorError::Io(e.error))?;
    Ok(())
}

/// Read and verify a payload file, returning the uncompressed snapshot.
pub fn read_payload(path: &Path) -> Result<Vec<u8>> {
    let mut reader = BufReader::new(File::open(path)?);

    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if &magic != PAYLOAD_MAGIC {
        return Err(EditorError::InvalidFormat("Invalid autosave magic".into()));
    }

    let mut version = [0u8; 1];
    reader.read_exact(&mut version)?;
    if version[0] != PAYLOAD_VERSION {
        return Err(EditorError::InvalidFormat(format!(
            "Unsupported autosave version: {}",
            version[0]
        )));
    }

    let mut len_bytes = [0u8; 8];
    reader.read_exact(&mut len_bytes)?;
    let expected_len = u64::from_le_bytes(len_bytes);

    let mut checksum_bytes = [0u8; 4];
    reader.read_exact(&mut checksum_bytes)?;
    let stored_checksum = u32::from_le_bytes(checksum_bytes);

    // One byte past the declared length is enough to detect an overlong body.
    let mut snapshot = Vec::new();
    GzDecoder::new(reader)
        .take(expected_len.saturating_add(1))
        .read_to_end(&mut snapshot)?;

    if snapshot.len() as u64 != expected_len {
        return Err(EditorError::InvalidFormat(format!(
            "Autosave length mismatch: expected {expected_len}, got {}",
            snapshot.len()
        )));
    }

    let computed_checksum = crc32fast::hash(&snapshot);
    if stored_checksum != computed_checksum {
        return Err(EditorError::ChecksumMismatch {
            expected: stored_checksum,
            got: computed_checksum,
        });
    }

    Ok(snapshot)
}
