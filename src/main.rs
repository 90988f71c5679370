use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};

use retrofilm::{
    config::EffectConfig,
    grade::FilmStock,
    overlay::{find_system_font, Overlay},
    pipeline::FramePipeline,
    video::{Frame, FrameLoader},
};

/// Frames are processed in chunks this large to bound memory while still
/// keeping the worker threads busy.
const BATCH_SIZE: usize = 64;

#[derive(Parser)]
#[command(
    name = "retrofilm",
    version,
    about = "Give video frames the look of a vintage compact camera",
    long_about = "Retrofilm applies a film-stock color grade, grain, chromatic aberration, \
frame jitter, random light leaks, and a burned-in timestamp to a numbered sequence of frames."
)]
struct Cli {
    /// Directory containing numbered input frames (PNG or JPEG)
    #[arg(short, long)]
    input: PathBuf,

    /// Output directory for processed frames
    #[arg(short, long)]
    output: PathBuf,

    /// Film stock to apply (modern_fuji_sim, terracotta_sun_sim,
    /// portra_800_sim, reala_ace_sim, dreamy_negative_sim)
    #[arg(short, long)]
    stock: Option<String>,

    /// Timestamp text; defaults to today's date in camcorder format
    #[arg(short, long)]
    timestamp: Option<String>,

    /// Caption text for the top-right corner
    #[arg(short, long)]
    message: Option<String>,

    /// Directory of light leak images
    #[arg(long)]
    leaks_dir: Option<PathBuf>,

    /// TTF/OTF font for the overlay text
    #[arg(long)]
    font: Option<PathBuf>,

    /// Seed for all randomized passes
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the chromatic aberration pass
    #[arg(long)]
    no_aberration: bool,

    /// Skip the frame jitter pass
    #[arg(long)]
    no_jitter: bool,

    /// Skip the light leak pass
    #[arg(long)]
    no_leaks: bool,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Merge the config file (when given) with explicit CLI overrides
    fn effect_config(&self) -> Result<EffectConfig> {
        let mut config = match &self.config {
            Some(path) => {
                info!("Loading configuration from {:?}", path);
                EffectConfig::from_file(path)?
            }
            None => EffectConfig::default(),
        };

        if let Some(stock) = &self.stock {
            config.stock = FilmStock::from_name_or_default(stock);
        }
        if let Some(timestamp) = &self.timestamp {
            config.timestamp_text = timestamp.clone();
        }
        if let Some(message) = &self.message {
            config.message_text = message.clone();
        }
        if let Some(dir) = &self.leaks_dir {
            config.leaks_dir = Some(dir.clone());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.no_aberration {
            config.enable_aberration = false;
        }
        if self.no_jitter {
            config.enable_jitter = false;
        }
        if self.no_leaks {
            config.enable_leaks = false;
        }

        if config.timestamp_text.is_empty() {
            config.timestamp_text = chrono::Local::now().format("%m-%d-'%y").to_string();
        }

        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    info!("Starting Retrofilm v{}", env!("CARGO_PKG_VERSION"));
    info!("Input: {:?}", cli.input);
    info!("Output: {:?}", cli.output);

    let config = cli.effect_config()?;
    info!("Stock: {}", config.stock);
    info!("Timestamp: {}", config.timestamp_text);

    let frame_paths = FrameLoader::discover(&cli.input)?;
    info!("Found {} frames", frame_paths.len());

    let first = Frame::open(&frame_paths[0])?;
    let (width, height) = first.dimensions();
    info!("Frame dimensions: {}x{}", width, height);

    let font = find_system_font(cli.font.as_deref()).map_err(|e| {
        anyhow::anyhow!("{}", e.user_message())
    })?;
    let overlay = Overlay::build(
        width,
        height,
        &config.timestamp_text,
        &config.message_text,
        &font,
    )?;

    let mut pipeline = FramePipeline::new(&config, overlay, width, height)?;

    std::fs::create_dir_all(&cli.output)?;

    for chunk in frame_paths.chunks(BATCH_SIZE) {
        let frames = chunk
            .iter()
            .map(Frame::open)
            .collect::<Result<Vec<_>, _>>()?;

        let processed = pipeline.process_batch(&frames)?;

        for (path, frame) in chunk.iter().zip(&processed) {
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("frame");
            frame.save_png(cli.output.join(format!("{}.png", stem)))?;
        }
    }

    info!(
        "Done: {} frames written to {:?}",
        pipeline.frames_processed(),
        cli.output
    );
    Ok(())
}
