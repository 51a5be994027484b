use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use warped_core::{Location, SimTick};
use warped_testkit::{EventRecord, GenerationMetricsBuilder, JsonlSink};
use warped_world::command::locate_ruins;
use warped_world::sandbox::{ChunkSource, InMemoryWorld};
use warped_world::{BiomeThresholds, ChunkPos, DimensionConfig, HeightBounds, WarpedDimension};

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless driver for the warped dimension", long_about = None)]
struct Args {
    /// Dimension config (TOML). Missing files fall back to defaults.
    #[arg(long, global = true, default_value = warped_world::config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Fail instead of falling back when the config cannot be loaded.
    #[arg(long, global = true)]
    strict_config: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a column, or survey the biome split of an area.
    Classify {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        x: i32,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0)]
        z: i32,
        /// Threshold profile overriding the config (classic or balanced).
        #[arg(long)]
        profile: Option<String>,
        /// Survey a square of this half-extent instead of a single column.
        #[arg(long)]
        survey: Option<i32>,
        #[arg(long, default_value_t = 16)]
        step: i32,
    },
    /// Generate chunks around the origin and write one JSON line per chunk.
    Generate {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Chunk radius around the origin.
        #[arg(long, default_value_t = 2)]
        radius: i32,
        #[arg(long, default_value = "target/warped/chunks.jsonl")]
        out: PathBuf,
        #[arg(long, default_value = "target/warped/metrics.json")]
        metrics: PathBuf,
    },
    /// Find the nearest ruins from a position.
    Locate {
        #[arg(long, default_value_t = 0)]
        seed: u64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        x: f64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 64.0)]
        y: f64,
        #[arg(long, allow_hyphen_values = true, default_value_t = 0.0)]
        z: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = if args.strict_config {
        DimensionConfig::try_load_from_path(&args.config)
            .with_context(|| format!("failed to load {}", args.config.display()))?
    } else {
        DimensionConfig::load_from_path(&args.config)
    };

    match args.command {
        Command::Classify {
            seed,
            x,
            z,
            profile,
            survey,
            step,
        } => classify(config, seed, x, z, profile, survey, step),
        Command::Generate {
            seed,
            radius,
            out,
            metrics,
        } => generate(config, seed, radius, out, metrics),
        Command::Locate { seed, x, y, z } => locate(&config, seed, Location::new(x, y, z)),
    }
}

fn classify(
    mut config: DimensionConfig,
    seed: u64,
    x: i32,
    z: i32,
    profile: Option<String>,
    survey: Option<i32>,
    step: i32,
) -> Result<()> {
    if let Some(name) = profile {
        config.biome_profile = BiomeThresholds::parse(&name)
            .with_context(|| format!("unknown biome profile {name:?}"))?;
    }
    let classifier = config.classifier();

    let Some(extent) = survey else {
        let biome = classifier.classify(x, z, seed);
        println!("{x}, {z}: {}", biome.display_name());
        return Ok(());
    };

    let histogram = classifier.survey(seed, extent, step.max(1));
    println!("{} columns sampled", histogram.total());
    for biome in warped_world::BiomeCategory::ALL {
        println!(
            "  {:<16} {:>6.2}%",
            biome.display_name(),
            histogram.fraction(biome) * 100.0
        );
    }
    Ok(())
}

fn generate(
    config: DimensionConfig,
    seed: u64,
    radius: i32,
    out: PathBuf,
    metrics_path: PathBuf,
) -> Result<()> {
    let started = Instant::now();
    let dimension = WarpedDimension::new(config);
    let generator = dimension.chunk_generator(seed, HeightBounds::OVERWORLD);
    let info = generator.info().clone();
    let mut world = InMemoryWorld::new(info, ChunkSource::warped(generator));
    world.load_area(ChunkPos::new(0, 0), radius);

    let mut sink = JsonlSink::create(&out)?;
    let mut metrics = GenerationMetricsBuilder::new("generate", seed);
    for (index, report) in world.reports().iter().enumerate() {
        sink.write_event(&EventRecord {
            tick: SimTick(index as u64),
            kind: "chunk_generated",
            payload: report,
        })?;
        metrics.record_chunk(
            report.biome.as_str(),
            report.surface_changes,
            report.ruin_chunk,
            report
                .populator_writes
                .iter()
                .map(|(name, count)| (name.as_str(), *count)),
        );
    }
    sink.flush()?;

    let metrics = metrics
        .duration(started.elapsed().as_secs_f64())
        .build();
    metrics
        .write_to_file(&metrics_path)
        .with_context(|| format!("failed to write {}", metrics_path.display()))?;
    info!(
        chunks = metrics.chunks_generated,
        ruins = metrics.ruin_chunks,
        out = %out.display(),
        "Generation finished"
    );
    Ok(())
}

fn locate(config: &DimensionConfig, seed: u64, from: Location) -> Result<()> {
    match locate_ruins(seed, &config.classifier(), &config.ruins, from) {
        Some(found) => {
            println!(
                "Found warped ruins at: {} (distance: {:.1} blocks)",
                found.target, found.distance
            );
            println!("Direction: {}", found.direction());
        }
        None => println!(
            "No warped ruins found within {} blocks.",
            config.ruins.locate_radius
        ),
    }
    Ok(())
}
