//! Raw sonar sample files
//!
//! A sample file is a headerless stream of little-endian `f32` values,
//! four per sample: `x`, `y`, `z`, `amplitude`.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use sonarcloud_core::RawPoint;

use crate::error::{IoError, Result};

/// Bytes occupied by one sample on disk
pub const SAMPLE_BYTES: usize = 16;

/// Decode a byte buffer of little-endian samples
pub fn parse_raw_samples(bytes: &[u8]) -> Result<Vec<RawPoint>> {
    if bytes.len() % SAMPLE_BYTES != 0 {
        return Err(IoError::InvalidFormat {
            format: format!(
                "raw sample stream of {} bytes is not a multiple of {} bytes",
                bytes.len(),
                SAMPLE_BYTES
            ),
        });
    }

    let samples = bytes
        .chunks_exact(SAMPLE_BYTES)
        .map(|chunk| {
            let mut values = [0f32; 4];
            for (value, word) in values.iter_mut().zip(chunk.chunks_exact(4)) {
                *value = f32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            }
            RawPoint::new(values[0], values[1], values[2], values[3])
        })
        .collect();
    Ok(samples)
}

/// Read every sample from a raw sample file
pub fn read_raw_samples<P: AsRef<Path>>(path: P) -> Result<Vec<RawPoint>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let mut bytes = Vec::new();
    BufReader::new(File::open(path)?).read_to_end(&mut bytes)?;
    let samples = parse_raw_samples(&bytes)?;

    debug!("read {} samples from {}", samples.len(), path.display());
    Ok(samples)
}

/// Write samples as a raw sample file
pub fn write_raw_samples<P: AsRef<Path>>(path: P, samples: &[RawPoint]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path.as_ref())?);
    for s in samples {
        for value in [s.x, s.y, s.z, s.amplitude] {
            writer.write_all(&value.to_le_bytes())?;
        }
    }
    writer.flush()?;
    Ok(())
}
