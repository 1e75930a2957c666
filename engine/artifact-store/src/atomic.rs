//! Write-temp-then-rename file writes
//!
//! Readers either see the previous file or the complete new one, never a
//! partially written file.

use crate::error::{Result, StoreError};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

fn temp_path(path: &Path) -> PathBuf {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("artifact");
    path.with_file_name(format!(".{}.tmp", name))
}

/// Write `bytes` next to `path` and rename it into place
pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = temp_path(path);
    {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        writer.write_all(bytes)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StoreError::Io(e)
    })
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value)?;
    write_bytes(path, &bytes)
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

/// bincode, then gzip
pub fn write_compressed<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    bincode::serialize_into(&mut encoder, value)?;
    let bytes = encoder.finish()?;
    write_bytes(path, &bytes)
}

pub fn read_compressed<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = open(path)?;
    Ok(bincode::deserialize_from(GzDecoder::new(BufReader::new(file)))?)
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::not_found(path.display().to_string()),
        _ => StoreError::Io(e),
    })
}
