//! Point cloud session state
//!
//! [`PointCloudState`] owns the raw samples, the visible set, the location
//! index and the bounding metrics, and exposes the operations an interactive
//! frontend drives: ingest, reset, segment, clip, smooth, compact and probe.
//!
//! Every mutating operation validates its inputs and computes its result
//! before touching the state, so a failed call leaves the session exactly as
//! it was.

use log::{debug, info};
use sonarcloud_core::{
    default_smoothing_radius, validate_threshold, BoundingMetrics, Color, ColorGradient, EngineConfig, Error,
    HeatMapGradient, LocationIndex, Point3f, RawPoint, Result, VisibleSet,
};

use crate::compaction::compact;
use crate::filtering::{clip_sonar_noise, flag_points};
use crate::heatmap::derive_visible_set;
use crate::nearest_neighbor::RTreeIndex;
use crate::segmentation::{segment_regions, segment_regions_parallel, SegmentationOutcome};
use crate::smoothing::{PartitionLayout, SmoothingFilter, SmoothingInput, SmoothingParams};

/// Result of a segmentation call on the session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentationSummary {
    pub radius: f32,
    pub size_threshold: usize,
    pub region_count: usize,
    pub discarded: usize,
    /// Visible count after compaction
    pub remaining: usize,
}

/// Mutable state of one point cloud session
#[derive(Debug, Clone)]
pub struct PointCloudState<G = HeatMapGradient> {
    raw: Vec<RawPoint>,
    visible: VisibleSet,
    locations: LocationIndex,
    metrics: BoundingMetrics,
    region_count: usize,
    threshold: f32,
    config: EngineConfig,
    gradient: G,
}

impl PointCloudState<HeatMapGradient> {
    /// Empty session with the default heat map gradient
    pub fn new(config: EngineConfig) -> Self {
        Self::with_gradient(config, HeatMapGradient::default())
    }
}

impl Default for PointCloudState<HeatMapGradient> {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl<G: ColorGradient> PointCloudState<G> {
    /// Empty session coloring amplitudes through `gradient`
    pub fn with_gradient(config: EngineConfig, gradient: G) -> Self {
        Self {
            raw: Vec::new(),
            visible: VisibleSet::new(),
            locations: LocationIndex::with_precision(config.location_precision),
            metrics: BoundingMetrics::default(),
            region_count: 0,
            threshold: config.amplitude_threshold,
            config,
            gradient,
        }
    }

    /// Replace the session with a copy of `raw`, thresholded at `threshold`.
    ///
    /// Returns the visible count.
    pub fn ingest(&mut self, raw: &[RawPoint], threshold: f32) -> Result<usize> {
        let derived = derive_visible_set(raw, threshold, &self.gradient)?;
        self.raw = raw.to_vec();
        self.threshold = threshold;
        self.install(VisibleSet::from_parts(derived.positions, derived.colors, derived.amplitudes));

        info!(
            "ingested {} samples, {} visible at threshold {:.3}",
            self.raw.len(),
            self.visible.len(),
            threshold
        );
        Ok(self.visible.len())
    }

    /// Ingest the first `count` samples of a flat `[x, y, z, amplitude, ...]` buffer
    pub fn ingest_flat(&mut self, flat: &[f32], count: usize, threshold: f32) -> Result<usize> {
        let needed = count.checked_mul(4).filter(|&n| n <= flat.len()).ok_or_else(|| {
            Error::InvalidData(format!(
                "{} samples need {} floats but the buffer holds {}",
                count,
                count.saturating_mul(4),
                flat.len()
            ))
        })?;
        let raw = RawPoint::slice_from_flat(&flat[..needed])?;
        self.ingest(raw, threshold)
    }

    /// Re-derive the visible set from the raw samples, discarding all edits
    pub fn reset(&mut self, threshold: f32) -> Result<usize> {
        let derived = derive_visible_set(&self.raw, threshold, &self.gradient)?;
        self.threshold = threshold;
        self.install(VisibleSet::from_parts(derived.positions, derived.colors, derived.amplitudes));

        info!("reset to {} visible points at threshold {:.3}", self.visible.len(), threshold);
        Ok(self.visible.len())
    }

    /// Reset using the configured amplitude threshold
    pub fn reset_with_config(&mut self) -> Result<usize> {
        let threshold = self.config.amplitude_threshold;
        validate_threshold(threshold)?;
        self.reset(threshold)
    }

    /// Segment the visible set and drop the components at or below
    /// `size_threshold` points.
    pub fn segment(&mut self, radius: f32, size_threshold: usize) -> Result<SegmentationSummary> {
        let index = RTreeIndex::new(&self.visible.positions);
        let outcome = segment_regions(&self.visible.positions, &index, radius, size_threshold)?;
        Ok(self.apply_segmentation(outcome, radius, size_threshold))
    }

    /// [`Self::segment`] with neighbor queries spread over the rayon pool
    pub fn segment_parallel(&mut self, radius: f32, size_threshold: usize) -> Result<SegmentationSummary> {
        let index = RTreeIndex::new(&self.visible.positions);
        let outcome = segment_regions_parallel(&self.visible.positions, &index, radius, size_threshold)?;
        Ok(self.apply_segmentation(outcome, radius, size_threshold))
    }

    /// Segment with radius and size threshold scaled from the configured
    /// percentages of the current bounding box size and visible count
    pub fn segment_with_config(&mut self) -> Result<SegmentationSummary> {
        self.config.validate()?;
        let radius = self.config.segmentation_radius(&self.metrics);
        let size_threshold = self.config.size_threshold(self.visible.len());
        debug!("resolved segmentation radius {:.4}, size threshold {}", radius, size_threshold);

        if self.config.parallel_segmentation {
            self.segment_parallel(radius, size_threshold)
        } else {
            self.segment(radius, size_threshold)
        }
    }

    /// Drop the points outside the configured sonar clip bounds.
    ///
    /// Returns the number of points removed.
    pub fn clear_sonar_noise(&mut self) -> usize {
        let clip = self.config.clip;
        let flagged = clip_sonar_noise(&mut self.visible, &clip);
        self.compact();
        info!("sonar clip removed {} points, {} remain", flagged, self.visible.len());
        flagged
    }

    /// Clear visibility of points rejected by `keep`, then compact.
    ///
    /// Hook for manual clipping tools. Returns the number removed.
    pub fn clip_with<F>(&mut self, keep: F) -> usize
    where
        F: FnMut(&Point3f) -> bool,
    {
        let flagged = flag_points(&mut self.visible, keep);
        self.compact();
        flagged
    }

    /// Remove every point flagged invisible. Returns the retained count.
    pub fn compact(&mut self) -> usize {
        let retained = compact(&mut self.visible, &mut self.locations, &mut self.metrics);
        if retained == 0 {
            self.region_count = 0;
        }
        retained
    }

    /// Run an external smoothing filter and adopt its output as the visible set.
    ///
    /// The location index is rebuilt from the returned points and region
    /// labels are reset. An empty visible set is left untouched.
    pub fn apply_smoothing<F>(&mut self, filter: &F, params: &SmoothingParams) -> Result<usize>
    where
        F: SmoothingFilter + ?Sized,
    {
        if self.visible.is_empty() {
            return Ok(0);
        }
        let layout = PartitionLayout::for_radius(&self.visible.positions, params.radius);
        debug!(
            "smoothing: radius {}, normal radius {}, {} iterations, partition depth {:?} over size {:.4}",
            params.radius, params.normal_radius, params.iterations, layout.depth, layout.size
        );

        let input = SmoothingInput {
            positions: &self.visible.positions,
            colors: &self.visible.colors,
            amplitudes: &self.visible.amplitudes,
        };
        let output = filter.filter(input, params, &layout)?;
        output.validate()?;

        self.install(VisibleSet::from_parts(output.positions, output.colors, output.amplitudes));
        info!("smoothing produced {} points", self.visible.len());
        Ok(self.visible.len())
    }

    /// Amplitude last recorded in the bucket containing `(x, y, z)`
    pub fn amplitude_near(&self, x: f32, y: f32, z: f32) -> Option<f32> {
        self.locations.amplitude_near(x, y, z)
    }

    /// Visible positions and their region labels, for export
    pub fn export_regions(&self) -> (&[Point3f], &[i32]) {
        (&self.visible.positions, &self.visible.regions)
    }

    /// Smoothing radius suggested for the current visible set
    pub fn default_smoothing_radius(&self) -> f32 {
        default_smoothing_radius(&self.metrics, self.visible.len())
    }

    pub fn raw_points(&self) -> &[RawPoint] {
        &self.raw
    }

    pub fn positions(&self) -> &[Point3f] {
        &self.visible.positions
    }

    pub fn colors(&self) -> &[Color] {
        &self.visible.colors
    }

    pub fn amplitudes(&self) -> &[f32] {
        &self.visible.amplitudes
    }

    pub fn regions(&self) -> &[i32] {
        &self.visible.regions
    }

    pub fn visible_set(&self) -> &VisibleSet {
        &self.visible
    }

    pub fn location_index(&self) -> &LocationIndex {
        &self.locations
    }

    pub fn metrics(&self) -> BoundingMetrics {
        self.metrics
    }

    /// Number of region ids in use; labels are `0..region_count`
    pub fn region_count(&self) -> usize {
        self.region_count
    }

    /// Amplitude threshold of the last ingest or reset
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.visible.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    /// Adopt a freshly derived visible set and rebuild everything derived from it
    fn install(&mut self, visible: VisibleSet) {
        visible.debug_check_lengths();
        self.locations.rebuild(visible.positions.iter().zip(visible.amplitudes.iter().copied()));
        self.metrics = visible.metrics();
        self.region_count = usize::from(!visible.is_empty());
        self.visible = visible;
    }

    fn apply_segmentation(
        &mut self,
        outcome: SegmentationOutcome,
        radius: f32,
        size_threshold: usize,
    ) -> SegmentationSummary {
        debug_assert_eq!(outcome.labels.len(), self.visible.len());
        self.visible.regions = outcome.labels;
        self.visible.visible = outcome.visible;
        let remaining = compact(&mut self.visible, &mut self.locations, &mut self.metrics);
        self.region_count = outcome.region_count;

        SegmentationSummary {
            radius,
            size_threshold,
            region_count: outcome.region_count,
            discarded: outcome.discarded,
            remaining,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smoothing::SmoothedPoints;
    use sonarcloud_core::NOISE_REGION;

    fn session() -> PointCloudState {
        PointCloudState::default()
    }

    fn raw(points: &[(f32, f32, f32, f32)]) -> Vec<RawPoint> {
        points.iter().map(|&(x, y, z, a)| RawPoint::new(x, y, z, a)).collect()
    }

    fn two_clusters() -> Vec<RawPoint> {
        raw(&[
            (0.0, 0.0, 0.0, 0.9),
            (0.5, 0.0, 0.0, 0.8),
            (30.0, 0.0, 0.0, 0.7),
            (0.5, 0.5, 0.0, 0.6),
            (30.5, 0.0, 0.0, 0.5),
            (0.0, 0.5, 0.0, 0.4),
        ])
    }

    struct ShiftFilter(f32);

    impl SmoothingFilter for ShiftFilter {
        fn filter(
            &self,
            input: SmoothingInput<'_>,
            _params: &SmoothingParams,
            layout: &PartitionLayout,
        ) -> Result<SmoothedPoints> {
            assert!(layout.depth.is_some());
            Ok(SmoothedPoints {
                positions: input.positions.iter().map(|p| Point3f::new(p.x + self.0, p.y, p.z)).collect(),
                colors: input.colors.to_vec(),
                amplitudes: input.amplitudes.to_vec(),
            })
        }
    }

    struct BrokenFilter;

    struct NanFilter;

    impl SmoothingFilter for NanFilter {
        fn filter(
            &self,
            input: SmoothingInput<'_>,
            _params: &SmoothingParams,
            _layout: &PartitionLayout,
        ) -> Result<SmoothedPoints> {
            let mut positions = input.positions.to_vec();
            positions[0].y = f32::NAN;
            Ok(SmoothedPoints {
                positions,
                colors: input.colors.to_vec(),
                amplitudes: input.amplitudes.to_vec(),
            })
        }
    }

    impl SmoothingFilter for BrokenFilter {
        fn filter(
            &self,
            input: SmoothingInput<'_>,
            _params: &SmoothingParams,
            _layout: &PartitionLayout,
        ) -> Result<SmoothedPoints> {
            Ok(SmoothedPoints {
                positions: input.positions.to_vec(),
                colors: Vec::new(),
                amplitudes: input.amplitudes.to_vec(),
            })
        }
    }

    #[test]
    fn test_ingest_thresholds_and_indexes() {
        let mut state = session();
        let samples = raw(&[
            (0.0, 0.0, 0.0, 0.1),
            (1.0, 0.0, 0.0, 0.9),
            (2.0, 0.0, 0.0, 0.9),
            (3.0, 0.0, 0.0, 0.05),
            (4.0, 0.0, 0.0, 0.95),
        ]);

        assert_eq!(state.ingest(&samples, 0.5).unwrap(), 3);
        assert_eq!(state.raw_points().len(), 5);
        assert_eq!(state.amplitudes(), &[0.9, 0.9, 0.95]);
        assert_eq!(state.amplitude_near(4.2, 0.0, 0.0), Some(0.95));
        assert_eq!(state.amplitude_near(0.0, 0.0, 0.0), None);
        assert_eq!(state.metrics().size, 3.0);
        assert_eq!(state.region_count(), 1);
    }

    #[test]
    fn test_ingest_flat_buffer() {
        let flat = [0.0, 0.0, 0.0, 1.0, 5.0, 5.0, 5.0, 0.2, 9.0, 9.0];
        let mut state = session();

        assert_eq!(state.ingest_flat(&flat, 2, 0.0).unwrap(), 2);
        assert!(state.ingest_flat(&flat, 3, 0.0).is_err());
        assert_eq!(state.raw_points().len(), 2);
    }

    #[test]
    fn test_segment_drops_small_cluster() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();

        let summary = state.segment(0.6, 3).unwrap();

        assert_eq!(summary.region_count, 1);
        assert_eq!(summary.discarded, 2);
        assert_eq!(summary.remaining, 4);
        assert_eq!(state.len(), 4);
        assert!(state.regions().iter().all(|&r| r == 0));
        assert_eq!(state.amplitude_near(30.0, 0.0, 0.0), None);
        // all four survivors round into the origin bucket; the last one wins
        assert_eq!(state.amplitude_near(0.0, 0.0, 0.0), Some(0.4));
        assert_eq!(state.location_index().len(), 1);
        assert_eq!(state.metrics().size, 0.5);
    }

    #[test]
    fn test_failed_segmentation_leaves_state_untouched() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();
        let before = state.visible_set().clone();

        assert!(matches!(state.segment(-1.0, 3), Err(Error::InvalidData(_))));
        assert_eq!(state.positions(), &before.positions[..]);
        assert_eq!(state.regions(), &before.regions[..]);
    }

    #[test]
    fn test_reset_restores_raw_derivation() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();
        state.segment(0.6, 3).unwrap();
        assert_eq!(state.len(), 4);

        assert_eq!(state.reset(0.0).unwrap(), 6);
        assert_eq!(state.amplitude_near(30.0, 0.0, 0.0), Some(0.5));
        assert!(state.regions().iter().all(|&r| r != NOISE_REGION));

        assert_eq!(state.reset(0.8).unwrap(), 2);
        assert!(state.reset(2.0).is_err());
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn test_segment_with_config_scales_parameters() {
        let config = EngineConfig {
            neighbor_radius_percent: 2.0,
            isolation_threshold_percent: 50.0,
            parallel_segmentation: true,
            ..Default::default()
        };
        let mut state = PointCloudState::new(config);
        state.ingest(&two_clusters(), 0.0).unwrap();

        // box size 30.5 -> radius 0.61; threshold floor(0.5 * 6) = 3
        let summary = state.segment_with_config().unwrap();
        assert_eq!(summary.size_threshold, 3);
        assert!((summary.radius - 0.61).abs() < 1e-4);
        assert_eq!(summary.remaining, 4);
    }

    #[test]
    fn test_clear_sonar_noise() {
        let mut state = session();
        state
            .ingest(
                &raw(&[
                    (5.0, 5.0, 30.0, 1.0),
                    (0.0, 0.0, 30.0, 1.0),
                    (5.0, 5.0, 50.0, 1.0),
                    (-5.0, 3.0, 25.0, 1.0),
                ]),
                0.0,
            )
            .unwrap();

        assert_eq!(state.clear_sonar_noise(), 2);
        assert_eq!(state.len(), 2);
        assert_eq!(state.amplitude_near(0.0, 0.0, 30.0), None);
        assert_eq!(state.amplitude_near(-5.0, 3.0, 25.0), Some(1.0));
    }

    #[test]
    fn test_clip_with_predicate() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();

        assert_eq!(state.clip_with(|p| p.x < 10.0), 2);
        assert_eq!(state.len(), 4);
        assert_eq!(state.metrics().size, 0.5);
    }

    #[test]
    fn test_smoothing_replaces_visible_set() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();
        state.segment(0.6, 3).unwrap();

        let params = SmoothingParams { radius: 0.25, ..Default::default() };
        assert_eq!(state.apply_smoothing(&ShiftFilter(100.0), &params).unwrap(), 4);

        assert_eq!(state.amplitude_near(100.0, 0.0, 0.0), Some(0.4));
        assert_eq!(state.amplitude_near(0.0, 0.0, 0.0), None);
        assert_eq!(state.location_index().len(), 1);
    }

    #[test]
    fn test_broken_smoothing_output_is_rejected() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();

        assert!(state.apply_smoothing(&BrokenFilter, &SmoothingParams::default()).is_err());
        assert_eq!(state.len(), 6);
        assert_eq!(state.colors().len(), 6);
    }

    #[test]
    fn test_non_finite_samples_never_reach_segmentation() {
        let mut samples: Vec<RawPoint> = (0..40)
            .map(|i| RawPoint::new((i % 8) as f32 * 0.3, (i / 8) as f32 * 0.3, 0.0, 0.5))
            .collect();
        samples.push(RawPoint::new(f32::NAN, 0.0, 0.0, 0.9));
        samples.push(RawPoint::new(1.0, f32::INFINITY, 0.0, 0.9));

        let mut state = session();
        assert_eq!(state.ingest(&samples, 0.0).unwrap(), 40);
        assert_eq!(state.raw_points().len(), 42);
        assert!(state.positions().iter().all(|p| p.iter().all(|c| c.is_finite())));

        let summary = state.segment(0.5, 2).unwrap();
        assert_eq!(summary.region_count, 1);
        assert_eq!(summary.remaining, 40);
        assert_eq!(state.segment_parallel(0.5, 2).unwrap().remaining, 40);
    }

    #[test]
    fn test_non_finite_smoothing_output_is_rejected() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();
        let before = state.positions().to_vec();

        let result = state.apply_smoothing(&NanFilter, &SmoothingParams::default());
        assert!(matches!(result, Err(Error::InvalidData(_))));
        assert_eq!(state.positions(), &before[..]);
        assert!(state.segment(0.6, 3).is_ok());
    }

    #[test]
    fn test_empty_session_operations() {
        let mut state = session();
        assert_eq!(state.ingest(&[], 0.5).unwrap(), 0);

        let summary = state.segment(1.0, 2).unwrap();
        assert_eq!(summary.remaining, 0);
        assert_eq!(state.compact(), 0);
        assert_eq!(state.apply_smoothing(&ShiftFilter(1.0), &SmoothingParams::default()).unwrap(), 0);
        assert_eq!(state.default_smoothing_radius(), 0.0);
        assert_eq!(state.metrics(), BoundingMetrics::default());
    }

    #[test]
    fn test_export_regions() {
        let mut state = session();
        state.ingest(&two_clusters(), 0.0).unwrap();
        state.segment(0.6, 1).unwrap();

        let (positions, regions) = state.export_regions();
        assert_eq!(positions.len(), 6);
        assert_eq!(regions, &[0, 0, 1, 0, 1, 0]);
        assert_eq!(state.region_count(), 2);
    }
}
