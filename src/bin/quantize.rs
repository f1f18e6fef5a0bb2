use clap::{Parser, ValueEnum};
use std::fs;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Instant;
use color_quantize_wasm::config::{DEFAULT_CLUSTERS, DEFAULT_MAX_ITERATIONS, DEFAULT_SAMPLE_SIZE};
use color_quantize_wasm::{quantize, ImageFeatures, QuantizeConfig, Seeding};
use anyhow::Context;
use anyhow::Result;
use image::ImageFormat;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SeedingArg {
    Random,
    PlusPlus,
}

impl From<SeedingArg> for Seeding {
    fn from(arg: SeedingArg) -> Self {
        match arg {
            SeedingArg::Random => Seeding::Random,
            SeedingArg::PlusPlus => Seeding::PlusPlus,
        }
    }
}

/// Reduce an image to a small palette with k-means clustering.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Input image path
    input: PathBuf,

    /// Output image path; the format follows the extension
    output: PathBuf,

    /// Number of colors in the output palette
    #[arg(short = 'k', long, default_value_t = DEFAULT_CLUSTERS)]
    clusters: usize,

    /// Pixels drawn for training (clamped to the pixel count)
    #[arg(short = 'n', long, default_value_t = DEFAULT_SAMPLE_SIZE)]
    samples: usize,

    /// Upper bound on k-means iterations
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Seed for reproducible output
    #[arg(short, long)]
    seed: Option<u64>,

    /// How initial centroids are chosen
    #[arg(long, value_enum, default_value_t = SeedingArg::PlusPlus)]
    seeding: SeedingArg,

    /// Also write the palette and training report as JSON
    #[arg(long)]
    palette_json: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let bytes = fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let format = ImageFormat::from_path(&args.output)
        .with_context(|| format!("unsupported output format: {}", args.output.display()))?;

    let img = image::load_from_memory(&bytes).context("decoding input image")?;
    let features = ImageFeatures::from_image(&img)?;
    let pixels = features.len();
    let samples = if args.samples > pixels {
        log::warn!("sample size {} exceeds {} pixels, using all pixels", args.samples, pixels);
        pixels
    } else {
        args.samples
    };

    let mut config = QuantizeConfig::default()
        .with_clusters(args.clusters)
        .with_sample_size(samples)
        .with_max_iterations(args.max_iterations)
        .with_seeding(args.seeding.into());
    config.seed = args.seed;

    println!("Training model...");
    let started = Instant::now();
    let quantized = quantize(&features, &config).context("quantization failed")?;
    println!(
        "Model trained in {} ms ({} iterations).",
        started.elapsed().as_millis(),
        quantized.report.iterations
    );

    let mut encoded = Vec::new();
    quantized
        .image
        .write_to(&mut Cursor::new(&mut encoded), format)
        .context("encoding output image")?;

    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&args.output, &encoded)?;
    println!("Saved → {}", args.output.display());

    if let Some(path) = &args.palette_json {
        let report = serde_json::json!({
            "palette": quantized.palette_hex(),
            "iterations": quantized.report.iterations,
            "converged": quantized.report.converged,
            "inertia": quantized.report.inertia,
        });
        fs::write(path, serde_json::to_string_pretty(&report)?)?;
        println!("Palette → {}", path.display());
    }

    println!("Original size: {:.2} KB.", bytes.len() as f64 / 1024.0);
    println!("Result size: {:.2} KB.", encoded.len() as f64 / 1024.0);

    Ok(())
}
