//! Batch run of a sonar session: load, threshold, clip, segment, export.
//!
//! ```text
//! RUST_LOG=info sonar_pipeline scan.bin --clip --output regions.obj
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use sonarcloud_algorithms::PointCloudState;
use sonarcloud_core::EngineConfig;
use sonarcloud_io::{read_raw_samples, write_region_obj};

#[derive(Parser, Debug)]
#[command(name = "sonar_pipeline", about = "Segment a raw sonar scan and export labeled points")]
struct Args {
    /// Raw sample file (little-endian f32 x, y, z, amplitude)
    input: PathBuf,

    /// JSON file with engine settings; missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Amplitude threshold as a fraction of the peak amplitude
    #[arg(long)]
    threshold: Option<f32>,

    /// Neighbor radius as a percentage of the bounding box size
    #[arg(long)]
    radius_percent: Option<f32>,

    /// Largest discarded component as a percentage of the point count
    #[arg(long)]
    isolation_percent: Option<f32>,

    /// Drop points outside the sonar clip bounds before segmenting
    #[arg(long)]
    clip: bool,

    /// Number of segmentation passes
    #[arg(long, default_value_t = 1)]
    passes: u32,

    /// Compute neighbor lists on all cores
    #[arg(long)]
    parallel: bool,

    /// Probe the amplitude at x,y,z after processing
    #[arg(long, value_delimiter = ',', num_args = 3)]
    probe: Option<Vec<f32>>,

    /// Write the surviving points with region labels to this OBJ file
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn load_config(args: &Args) -> anyhow::Result<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.amplitude_threshold = threshold;
    }
    if let Some(percent) = args.radius_percent {
        config.neighbor_radius_percent = percent;
    }
    if let Some(percent) = args.isolation_percent {
        config.isolation_threshold_percent = percent;
    }
    config.parallel_segmentation |= args.parallel;

    config.validate()?;
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let config = load_config(&args)?;

    let samples = read_raw_samples(&args.input)
        .with_context(|| format!("loading samples from {}", args.input.display()))?;

    let threshold = config.amplitude_threshold;
    let mut state = PointCloudState::new(config);
    let visible = state.ingest(&samples, threshold)?;
    println!("Loaded {} samples, {} above threshold {:.2}", samples.len(), visible, threshold);

    if args.clip {
        let removed = state.clear_sonar_noise();
        println!("Clip removed {} points, {} remain", removed, state.len());
    }

    for pass in 1..=args.passes {
        let summary = state.segment_with_config()?;
        println!(
            "Pass {}: radius {:.3}, threshold {} -> {} regions, {} discarded, {} remain",
            pass, summary.radius, summary.size_threshold, summary.region_count, summary.discarded, summary.remaining
        );
    }

    let metrics = state.metrics();
    info!(
        "bounding box size {:.3} centered at ({:.3}, {:.3}, {:.3}); suggested smoothing radius {:.4}",
        metrics.size,
        metrics.center.x,
        metrics.center.y,
        metrics.center.z,
        state.default_smoothing_radius()
    );

    if let Some(probe) = &args.probe {
        match state.amplitude_near(probe[0], probe[1], probe[2]) {
            Some(amplitude) => println!("Amplitude at {:?}: {}", probe, amplitude),
            None => println!("No sample recorded near {:?}", probe),
        }
    }

    if let Some(output) = &args.output {
        let (positions, regions) = state.export_regions();
        write_region_obj(output, positions, regions)
            .with_context(|| format!("writing {}", output.display()))?;
        println!("Wrote {} labeled points to {}", positions.len(), output.display());
    }

    Ok(())
}
