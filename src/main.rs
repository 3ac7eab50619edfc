// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use depth_capture::{MockProfile, SessionBackendType};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depth-capture")]
#[command(about = "Capture RGB + depth frames from a depth-sensing session")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/depth-capture/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the depth capabilities of the configured session
    Capabilities {
        /// Session backend (mock, replay)
        #[arg(short, long)]
        backend: Option<SessionBackendType>,

        /// Device profile emulated by the mock backend (lidar, arcore_depth, none)
        #[arg(short, long)]
        profile: Option<MockProfile>,

        /// Recording directory for the replay backend
        #[arg(short, long)]
        replay: Option<PathBuf>,
    },

    /// Capture one frame and write its encoded buffers
    Capture {
        /// Session backend (mock, replay)
        #[arg(short, long)]
        backend: Option<SessionBackendType>,

        /// Device profile emulated by the mock backend (lidar, arcore_depth, none)
        #[arg(short, long)]
        profile: Option<MockProfile>,

        /// Recording directory for the replay backend
        #[arg(short, long)]
        replay: Option<PathBuf>,

        /// Output directory (default: ~/Pictures/depth-capture)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Record one raw mock frame for the replay backend
    Record {
        /// Directory to write the recording into
        dir: PathBuf,

        /// Device profile to record (lidar, arcore_depth, none)
        #[arg(short, long, default_value = "lidar")]
        profile: MockProfile,
    },

    /// Decode a depth payload and print statistics
    DecodeDepth {
        /// Depth payload file
        file: PathBuf,

        /// Payload encoding (png16, f32_gzip)
        #[arg(short, long)]
        encoding: String,

        /// Depth map width
        #[arg(long)]
        width: u32,

        /// Depth map height
        #[arg(long)]
        height: u32,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depth_capture=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Capabilities {
            backend,
            profile,
            replay,
        } => {
            let overrides = cli::SessionOverrides {
                backend,
                profile,
                replay,
                output: None,
            };
            cli::print_capabilities(cli.config.as_deref(), overrides)
        }
        Commands::Capture {
            backend,
            profile,
            replay,
            output,
        } => {
            let overrides = cli::SessionOverrides {
                backend,
                profile,
                replay,
                output,
            };
            cli::capture(cli.config.as_deref(), overrides)
        }
        Commands::Record { dir, profile } => cli::record(&dir, profile),
        Commands::DecodeDepth {
            file,
            encoding,
            width,
            height,
        } => cli::decode_depth_file(&file, &encoding, width, height),
    }
}
