//! Amplitude thresholding, histogram equalization and heat map coloring

use log::debug;
use sonarcloud_core::{validate_threshold, Color, ColorGradient, Point3f, RawPoint, Result};

/// Number of histogram bins used for equalization
pub const HISTOGRAM_BINS: usize = 256;

/// Points that survived thresholding, with their colors
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapOutput {
    pub positions: Vec<Point3f>,
    pub colors: Vec<Color>,
    pub amplitudes: Vec<f32>,
}

impl HeatmapOutput {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Bin of `amplitude` in a histogram spanning `[amp_min, amp_max]`.
///
/// A degenerate range puts everything in bin 0.
#[inline]
fn histogram_bin(amplitude: f32, amp_min: f32, amp_max: f32) -> usize {
    let range = amp_max - amp_min;
    if !(range > 0.0) {
        return 0;
    }
    let bin = (255.0 * (amplitude - amp_min) / range).floor();
    if bin.is_nan() {
        return 0;
    }
    bin.clamp(0.0, (HISTOGRAM_BINS - 1) as f32) as usize
}

/// Histogram-equalize `amplitudes` over `[amp_min, amp_max]`.
///
/// Every output value is in `[0, 1]` and the mapping is monotone
/// non-decreasing in the input amplitude. An empty input yields an empty
/// output; a zero-width range maps every amplitude to `0.0`.
pub fn equalize_histogram(amplitudes: &[f32], amp_min: f32, amp_max: f32) -> Vec<f32> {
    let count = amplitudes.len();
    if count == 0 {
        return Vec::new();
    }
    if !(amp_max > amp_min) {
        return vec![0.0; count];
    }

    let mut hist = [0usize; HISTOGRAM_BINS];
    for &a in amplitudes {
        hist[histogram_bin(a, amp_min, amp_max)] += 1;
    }

    let mut lut = [0.0f32; HISTOGRAM_BINS];
    let mut cumulative = 0usize;
    for (bin, &n) in hist.iter().enumerate() {
        cumulative += n;
        lut[bin] = (cumulative as f32 * 255.0 / count as f32).round() / 255.0;
    }

    amplitudes
        .iter()
        .map(|&a| lut[histogram_bin(a, amp_min, amp_max)])
        .collect()
}

/// Samples with a NaN or infinite component cannot be placed or ranked
#[inline]
fn is_finite_sample(p: &RawPoint) -> bool {
    p.x.is_finite() && p.y.is_finite() && p.z.is_finite() && p.amplitude.is_finite()
}

/// Derive the visible set from raw samples.
///
/// Keeps, in input order, every sample whose amplitude is at least
/// `threshold` times the peak amplitude, equalizes the kept amplitudes and
/// colors them through `gradient`. Samples with a non-finite coordinate or
/// amplitude are skipped and do not count towards the peak.
///
/// # Arguments
/// * `raw` - Ingested samples
/// * `threshold` - Fraction of the peak amplitude, in `[0, 1]`
/// * `gradient` - Maps equalized amplitudes to colors
///
/// # Returns
/// * `Result<HeatmapOutput>` - Surviving positions, colors and raw amplitudes
pub fn derive_visible_set<G>(raw: &[RawPoint], threshold: f32, gradient: &G) -> Result<HeatmapOutput>
where
    G: ColorGradient + ?Sized,
{
    validate_threshold(threshold)?;

    let skipped = raw.iter().filter(|p| !is_finite_sample(p)).count();
    if skipped > 0 {
        debug!("heatmap: skipped {} samples with non-finite values", skipped);
    }

    let Some(amp_max) = raw
        .iter()
        .filter(|p| is_finite_sample(p))
        .map(|p| p.amplitude)
        .reduce(f32::max)
    else {
        return Ok(HeatmapOutput::default());
    };
    let amp_cut = amp_max * threshold;

    let mut output = HeatmapOutput::default();
    let mut amp_min = amp_max;
    for p in raw.iter().filter(|p| is_finite_sample(p) && p.amplitude >= amp_cut) {
        output.positions.push(p.position());
        output.amplitudes.push(p.amplitude);
        amp_min = amp_min.min(p.amplitude);
    }

    debug!(
        "heatmap: {} of {} samples above {:.4} (range {:.4}..{:.4})",
        output.len(),
        raw.len(),
        amp_cut,
        amp_min,
        amp_max
    );

    let equalized = equalize_histogram(&output.amplitudes, amp_min, amp_max);
    output.colors = equalized.iter().map(|&v| gradient.color_at(v)).collect();

    Ok(output)
}
