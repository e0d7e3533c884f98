/**
 * Layered Noise CLI - generate layered noise textures and preview them
 */

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use layered_noise::{BlurStrategy, NoiseSynthesizer, SynthesisConfig, SynthesisReport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Layered procedural noise textures
#[derive(Parser)]
#[command(name = "layered-noise")]
#[command(version)]
#[command(about = "Layered noise texture synthesis", long_about = None)]
struct Cli {
    // None runs DEFAULT_COMMAND
    #[command(subcommand)]
    command: Option<Commands>,
}

#[cfg(feature = "display")]
const DEFAULT_COMMAND: &str = "view";
#[cfg(not(feature = "display"))]
const DEFAULT_COMMAND: &str = "generate";

/// The default subcommand with every option at its default value
#[derive(Parser)]
#[command(name = "layered-noise")]
struct DefaultInvocation {
    #[command(subcommand)]
    command: Commands,
}

fn default_command() -> Commands {
    DefaultInvocation::parse_from(["layered-noise", DEFAULT_COMMAND]).command
}

/// Options shared by every subcommand
#[derive(Args)]
struct SynthesisArgs {
    /// Texture width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Texture height in pixels
    #[arg(long, default_value = "600")]
    height: u32,

    /// Blur radius of each octave, comma separated
    #[arg(short, long, value_delimiter = ',', default_value = "10,20,30")]
    radii: Vec<f32>,

    /// Directory for the octave and combined PNGs
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// File name prefix
    #[arg(long, default_value = "noise")]
    prefix: String,

    /// Do not write any files
    #[arg(long)]
    no_save: bool,

    /// Force direct (spatial) blur even for wide kernels
    #[arg(long)]
    direct_blur: bool,

    /// Show a progress bar
    #[arg(short, long)]
    verbose: bool,
}

impl SynthesisArgs {
    /// Build and validate the pipeline configuration
    fn into_config(self) -> Result<SynthesisConfig> {
        let config = SynthesisConfig {
            width: self.width,
            height: self.height,
            radii: self.radii,
            output_dir: self.output,
            file_prefix: self.prefix,
            persist: !self.no_save,
            blur_strategy: if self.direct_blur {
                BlurStrategy::Direct
            } else {
                BlurStrategy::Auto
            },
            verbose: self.verbose,
        };
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the texture without opening a window
    Generate {
        #[command(flatten)]
        synthesis: SynthesisArgs,
    },

    /// Generate the texture in the background and show it in a window
    #[cfg(feature = "display")]
    View {
        #[command(flatten)]
        synthesis: SynthesisArgs,

        /// Window title
        #[arg(long, default_value = "Layered Noise")]
        title: String,

        /// Borderless, always-on-top window
        #[arg(long)]
        fullscreen: bool,

        /// Frame rate cap
        #[arg(long, default_value = "60")]
        fps: usize,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn print_summary(report: &SynthesisReport) {
    println!();
    println!(
        "Combined {} octaves into a {}×{} texture",
        report.layers.len(),
        report.combined.width(),
        report.combined.height()
    );
    for path in &report.saved {
        println!("Saved: {}", path.display());
    }
    for err in &report.persistence_errors {
        eprintln!("Not saved: {}", err);
    }
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command.unwrap_or_else(default_command) {
        Commands::Generate { synthesis } => {
            let config = synthesis.into_config()?;

            println!("Generating {}×{} layered noise", config.width, config.height);
            println!("Radii: {:?}", config.radii);
            if config.persist {
                println!("Output: {}", config.output_dir.display());
            }

            let report = NoiseSynthesizer::new(config)
                .context("Failed to create synthesizer")?
                .run(&mut ())
                .context("Failed to synthesize texture")?;

            print_summary(&report);
            println!();
            println!("Done!");
        }

        #[cfg(feature = "display")]
        Commands::View {
            synthesis,
            title,
            fullscreen,
            fps,
        } => {
            use layered_noise::{spawn_synthesis, DisplayConfig, DisplayContext};

            let config = synthesis.into_config()?;
            let display = DisplayConfig {
                title,
                fullscreen,
                target_fps: fps,
            };

            let context = DisplayContext::new(&display, config.width, config.height)
                .context("Failed to open window")?;
            let handle = spawn_synthesis(config).context("Failed to start synthesis")?;

            match context.run(handle).context("Preview failed")? {
                Some(report) => print_summary(&report),
                None => println!("Cancelled before synthesis finished"),
            }
        }
    }

    Ok(())
}
