// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for depth capture
//!
//! This module provides command-line functionality for:
//! - Querying session capabilities
//! - Capturing and saving a frame
//! - Recording raw frames for replay
//! - Inspecting depth payloads

use chrono::Local;
use depth_capture::backends::session::{DepthSession, MockSession, ReplaySession};
use depth_capture::{
    AppError, CaptureResult, Config, DepthCaptureService, MockProfile, SessionBackendType,
    decode_depth,
};
use std::path::{Path, PathBuf};

/// Command-line overrides applied on top of the loaded config
pub struct SessionOverrides {
    pub backend: Option<SessionBackendType>,
    pub profile: Option<MockProfile>,
    pub replay: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

fn load_config(path: Option<&Path>, overrides: SessionOverrides) -> Result<Config, AppError> {
    let mut config = match path {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    if let Some(replay) = overrides.replay {
        // A recording implies the replay backend unless one was named
        config.backend = SessionBackendType::Replay;
        config.replay_dir = Some(replay);
    }
    if let Some(backend) = overrides.backend {
        config.backend = backend;
    }
    if let Some(profile) = overrides.profile {
        config.mock_profile = profile;
    }
    if let Some(output) = overrides.output {
        config.output_dir = Some(output);
    }
    Ok(config)
}

/// Print the capabilities descriptor as JSON
pub fn print_capabilities(
    config_path: Option<&Path>,
    overrides: SessionOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path, overrides)?;
    let service = DepthCaptureService::from_config(&config);

    let rt = tokio::runtime::Runtime::new()?;
    let capabilities = rt.block_on(service.get_capabilities());

    println!("{}", serde_json::to_string_pretty(&capabilities)?);
    Ok(())
}

/// Capture one frame and save its buffers into a timestamped directory
pub fn capture(
    config_path: Option<&Path>,
    overrides: SessionOverrides,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path, overrides)?;
    let service = DepthCaptureService::from_config(&config);

    println!("Backend: {}", config.backend);
    println!("Capturing...");

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        let result = service.capture_frame().await;
        service.shutdown().await;
        result
    });
    let result = result.map_err(|e| format!("{}: {}", e.code, e.message))?;

    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let dir = config
        .resolved_output_dir()
        .join(format!("capture_{}", timestamp));
    let written = save_capture(&result, &dir)?;

    println!(
        "Captured {}x{}, depth: {}",
        result.width,
        result.height,
        result.depth_encoding().unwrap_or("none")
    );
    for path in written {
        println!("  {}", path.display());
    }
    Ok(())
}

/// Write every payload of `result` into `dir`
///
/// Returns the written paths in order.
pub fn save_capture(result: &CaptureResult, dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    let mut write = |name: String, bytes: &[u8]| -> Result<(), AppError> {
        let path = dir.join(name);
        std::fs::write(&path, bytes)?;
        written.push(path);
        Ok(())
    };

    write("rgb.jpg".to_string(), &result.rgb_jpeg)?;
    if let Some(depth) = &result.depth {
        write(format!("depth.{}", depth.extension()), depth.bytes())?;
    }
    if let Some(confidence) = &result.confidence_png {
        write("confidence.png".to_string(), confidence)?;
    }

    // Metadata record without the binary payloads
    let metadata = serde_json::json!({
        "width": result.width,
        "height": result.height,
        "depthEncoding": result.depth_encoding(),
        "intrinsics": result.intrinsics,
    });
    write(
        "capture.json".to_string(),
        serde_json::to_string_pretty(&metadata)?.as_bytes(),
    )?;

    Ok(written)
}

/// Record one raw mock frame into `dir`
pub fn record(dir: &Path, profile: MockProfile) -> Result<(), Box<dyn std::error::Error>> {
    let mut session = MockSession::new(profile);
    session.start()?;
    let frame = session.acquire_frame()?;
    session.stop();

    ReplaySession::record(dir, &frame)?;
    println!("Recorded {} frame: {}", profile_name(profile), dir.display());
    Ok(())
}

fn profile_name(profile: MockProfile) -> &'static str {
    match profile {
        MockProfile::Lidar => "lidar",
        MockProfile::ArcoreDepth => "arcore_depth",
        MockProfile::None => "color-only",
    }
}

/// Decode a depth payload file and print its statistics
pub fn decode_depth_file(
    file: &Path,
    encoding: &str,
    width: u32,
    height: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(file)?;
    let map = decode_depth(encoding, &bytes, width, height)?;

    println!("Depth map: {}x{} ({})", map.width, map.height, encoding);
    println!(
        "Valid samples: {} of {}",
        map.valid_count(),
        map.meters.len()
    );
    match map.range() {
        Some((min, max)) => println!("Range: {:.3} m - {:.3} m", min, max),
        None => println!("Range: no valid samples"),
    }
    Ok(())
}
