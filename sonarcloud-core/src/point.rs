//! Point types and related functionality

use bytemuck::{Pod, Zeroable};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// RGB color with components in `[0, 1]`
pub type Color = [f32; 3];

/// Region label assigned to points whose component fell below the size threshold
pub const NOISE_REGION: i32 = -1;

/// Region label carried by every point before the first segmentation run
pub const DEFAULT_REGION: i32 = 0;

/// A raw sonar sample as ingested: position plus echo amplitude.
///
/// The layout is four packed `f32`s so a flat `[x, y, z, amplitude, ...]`
/// buffer can be viewed as a slice of samples without copying.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, Pod, Zeroable)]
#[repr(C)]
pub struct RawPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub amplitude: f32,
}

impl RawPoint {
    pub fn new(x: f32, y: f32, z: f32, amplitude: f32) -> Self {
        Self { x, y, z, amplitude }
    }

    /// View a flat `[x, y, z, amplitude, ...]` buffer as samples.
    ///
    /// Fails if the buffer length is not a multiple of four.
    pub fn slice_from_flat(flat: &[f32]) -> Result<&[RawPoint]> {
        bytemuck::try_cast_slice(flat).map_err(|e| {
            Error::InvalidData(format!(
                "flat sample buffer of {} floats is not a sequence of 4-tuples: {}",
                flat.len(),
                e
            ))
        })
    }

    /// Position of the sample
    pub fn position(&self) -> Point3f {
        Point3f::new(self.x, self.y, self.z)
    }
}

impl From<RawPoint> for Point3f {
    fn from(raw: RawPoint) -> Self {
        raw.position()
    }
}
