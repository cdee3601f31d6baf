//! OBJ vertex export with region labels
//!
//! Each visible point becomes a `v x y z region` line. The fourth vertex
//! component is not standard OBJ; downstream tools read it as the
//! segmentation label.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;
use sonarcloud_core::Point3f;

use crate::error::{IoError, Result};

/// Write `v x y z region` lines for matching positions and labels
pub fn write_region_vertices<W: Write>(writer: &mut W, positions: &[Point3f], regions: &[i32]) -> Result<()> {
    check_lengths(positions, regions)?;
    for (p, region) in positions.iter().zip(regions) {
        writeln!(writer, "v {} {} {} {}", p.x, p.y, p.z, region)?;
    }
    Ok(())
}

/// Export a segmented point set to an OBJ file
pub fn write_region_obj<P: AsRef<Path>>(path: P, positions: &[Point3f], regions: &[i32]) -> Result<()> {
    let path = path.as_ref();
    check_lengths(positions, regions)?;
    let mut writer = BufWriter::new(File::create(path)?);
    write_region_vertices(&mut writer, positions, regions)?;
    writer.flush()?;

    debug!("wrote {} labeled vertices to {}", positions.len(), path.display());
    Ok(())
}

fn check_lengths(positions: &[Point3f], regions: &[i32]) -> Result<()> {
    if positions.len() != regions.len() {
        return Err(IoError::WriteError {
            message: format!(
                "{} positions but {} region labels",
                positions.len(),
                regions.len()
            ),
        });
    }
    Ok(())
}
