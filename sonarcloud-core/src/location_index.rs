//! Quantized position → amplitude lookup
//!
//! Positions are rounded to a fixed number of decimal places (zero by
//! default, i.e. unit buckets) and the rounded triple is the key. Halves
//! round to even, so `0.5` lands in bucket `0` and `2.5` in bucket `2`. Several
//! points can land in the same bucket; the last insert wins. This is a
//! convenience for probing the amplitude under a cursor, not a spatial
//! index: it never answers "which point", only "what amplitude was last
//! recorded here".

use std::collections::HashMap;

use crate::point::Point3f;

/// Discretized coordinate triple used as a bucket key
pub type QuantizedKey = [i64; 3];

/// Reverse lookup from quantized position to amplitude
#[derive(Debug, Clone)]
pub struct LocationIndex {
    decimals: u32,
    scale: f64,
    entries: HashMap<QuantizedKey, f32>,
}

impl LocationIndex {
    /// Index with unit buckets
    pub fn new() -> Self {
        Self::with_precision(0)
    }

    /// Index keyed on coordinates rounded to `decimals` decimal places
    pub fn with_precision(decimals: u32) -> Self {
        Self {
            decimals,
            scale: 10f64.powi(decimals as i32),
            entries: HashMap::new(),
        }
    }

    pub fn precision(&self) -> u32 {
        self.decimals
    }

    /// Bucket key of a position
    pub fn key(&self, x: f32, y: f32, z: f32) -> QuantizedKey {
        [
            (x as f64 * self.scale).round_ties_even() as i64,
            (y as f64 * self.scale).round_ties_even() as i64,
            (z as f64 * self.scale).round_ties_even() as i64,
        ]
    }

    pub fn key_of(&self, p: &Point3f) -> QuantizedKey {
        self.key(p.x, p.y, p.z)
    }

    /// Record `amplitude` at the bucket of `p`, replacing any previous value
    pub fn insert(&mut self, p: &Point3f, amplitude: f32) {
        let key = self.key_of(p);
        self.entries.insert(key, amplitude);
    }

    /// Drop the bucket of `p`, returning the value it held
    pub fn remove(&mut self, p: &Point3f) -> Option<f32> {
        let key = self.key_of(p);
        self.entries.remove(&key)
    }

    pub fn remove_key(&mut self, key: &QuantizedKey) -> Option<f32> {
        self.entries.remove(key)
    }

    /// Amplitude recorded at the bucket containing `(x, y, z)`.
    ///
    /// `None` means nothing was recorded there, which is distinct from a
    /// recorded amplitude of `0.0`.
    pub fn amplitude_near(&self, x: f32, y: f32, z: f32) -> Option<f32> {
        self.entries.get(&self.key(x, y, z)).copied()
    }

    pub fn get(&self, key: &QuantizedKey) -> Option<f32> {
        self.entries.get(key).copied()
    }

    pub fn contains_key(&self, key: &QuantizedKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Clear and re-insert every `(position, amplitude)` pair in order
    pub fn rebuild<'a, I>(&mut self, points: I)
    where
        I: IntoIterator<Item = (&'a Point3f, f32)>,
    {
        self.entries.clear();
        for (p, amplitude) in points {
            self.insert(p, amplitude);
        }
    }

    /// Number of occupied buckets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for LocationIndex {
    fn default() -> Self {
        Self::new()
    }
}
