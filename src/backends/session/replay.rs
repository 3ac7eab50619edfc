// SPDX-License-Identifier: GPL-3.0-only

//! Replay session for frames recorded to disk
//!
//! A recording is a directory holding `frame.json` plus one raw `.bin` file
//! per plane. The manifest keeps every stride, so buffers replay byte-for-byte
//! as the sensor delivered them.

use super::DepthSession;
use super::types::*;
use crate::constants::DepthType;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Manifest file name inside a recording directory
pub const MANIFEST_FILE: &str = "frame.json";

/// Stored plane geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaneManifest {
    pub file: String,
    pub row_stride: usize,
    pub pixel_stride: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChromaManifest {
    pub u: PlaneManifest,
    pub v: PlaneManifest,
}

/// Unit of recorded depth samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepthUnit {
    Millimeters,
    Meters,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepthManifest {
    pub width: u32,
    pub height: u32,
    pub unit: DepthUnit,
    pub plane: PlaneManifest,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfidenceManifest {
    pub width: u32,
    pub height: u32,
    pub plane: PlaneManifest,
}

/// Contents of `frame.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameManifest {
    pub width: u32,
    pub height: u32,
    pub luma: PlaneManifest,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chroma: Option<ChromaManifest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<DepthManifest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<ConfidenceManifest>,
    pub intrinsics: CameraIntrinsics,
}

impl FrameManifest {
    fn capabilities(&self) -> Capabilities {
        match &self.depth {
            Some(depth) => {
                let depth_type = match depth.unit {
                    DepthUnit::Meters => DepthType::Lidar,
                    DepthUnit::Millimeters => DepthType::ArcoreDepth,
                };
                Capabilities {
                    has_depth: true,
                    depth_type,
                    supports_confidence: self.confidence.is_some(),
                }
            }
            None => Capabilities::none(),
        }
    }
}

/// Session replaying one recorded frame
pub struct ReplaySession {
    dir: PathBuf,
    running: bool,
}

impl ReplaySession {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            running: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_dir(&self) -> SessionResult<()> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(SessionError::NotAvailable(format!(
                "recording directory {} does not exist",
                self.dir.display()
            )))
        }
    }

    fn read_manifest(&self) -> SessionResult<Option<FrameManifest>> {
        let path = self.dir.join(MANIFEST_FILE);
        if !path.is_file() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&path)?;
        let manifest = serde_json::from_str(&text).map_err(|e| {
            SessionError::InvalidFrame(format!("{}: {}", path.display(), e))
        })?;
        Ok(Some(manifest))
    }

    fn read_plane(&self, manifest: &PlaneManifest) -> SessionResult<Plane> {
        let data = std::fs::read(self.dir.join(&manifest.file))?;
        Ok(Plane::new(data, manifest.row_stride, manifest.pixel_stride))
    }

    /// Write `frame` as a recording into `dir`
    pub fn record(dir: &Path, frame: &RawFrame) -> SessionResult<()> {
        std::fs::create_dir_all(dir)?;

        let write_plane = |name: &str, plane: &Plane| -> SessionResult<PlaneManifest> {
            let file = format!("{}.bin", name);
            std::fs::write(dir.join(&file), &plane.data[..])?;
            Ok(PlaneManifest {
                file,
                row_stride: plane.row_stride,
                pixel_stride: plane.pixel_stride,
            })
        };

        let luma = write_plane("luma", &frame.color.luma)?;
        let chroma = match &frame.color.chroma {
            Some(chroma) => Some(ChromaManifest {
                u: write_plane("chroma_u", &chroma.u)?,
                v: write_plane("chroma_v", &chroma.v)?,
            }),
            None => None,
        };
        let depth = match &frame.depth {
            Some(depth) => {
                let unit = match depth.samples {
                    DepthSamples::Millimeters(_) => DepthUnit::Millimeters,
                    DepthSamples::Meters(_) => DepthUnit::Meters,
                };
                Some(DepthManifest {
                    width: depth.width,
                    height: depth.height,
                    unit,
                    plane: write_plane("depth", depth.samples.plane())?,
                })
            }
            None => None,
        };
        let confidence = match &frame.confidence {
            Some(confidence) => Some(ConfidenceManifest {
                width: confidence.width,
                height: confidence.height,
                plane: write_plane("confidence", &confidence.plane)?,
            }),
            None => None,
        };

        let manifest = FrameManifest {
            width: frame.color.width,
            height: frame.color.height,
            luma,
            chroma,
            depth,
            confidence,
            intrinsics: frame.intrinsics,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| SessionError::IoError(e.to_string()))?;
        std::fs::write(dir.join(MANIFEST_FILE), json)?;

        info!(dir = %dir.display(), "Frame recorded");
        Ok(())
    }
}

impl DepthSession for ReplaySession {
    fn backend_type(&self) -> SessionBackendType {
        SessionBackendType::Replay
    }

    fn probe(&self) -> SessionResult<Capabilities> {
        self.ensure_dir()?;
        Ok(self
            .read_manifest()?
            .map(|m| m.capabilities())
            .unwrap_or_else(Capabilities::none))
    }

    fn start(&mut self) -> SessionResult<()> {
        self.ensure_dir()?;
        if !self.running {
            info!(dir = %self.dir.display(), "Starting replay session");
            self.running = true;
        }
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn acquire_frame(&mut self) -> SessionResult<RawFrame> {
        if !self.running {
            return Err(SessionError::NoFrame);
        }
        let Some(manifest) = self.read_manifest()? else {
            warn!(dir = %self.dir.display(), "No recorded frame to replay");
            return Err(SessionError::NoFrame);
        };

        let color = RawColorFrame {
            width: manifest.width,
            height: manifest.height,
            luma: self.read_plane(&manifest.luma)?,
            chroma: match &manifest.chroma {
                Some(chroma) => Some(ChromaPlanes {
                    u: self.read_plane(&chroma.u)?,
                    v: self.read_plane(&chroma.v)?,
                }),
                None => None,
            },
        };

        let depth = match &manifest.depth {
            Some(depth) => {
                let plane = self.read_plane(&depth.plane)?;
                let samples = match depth.unit {
                    DepthUnit::Millimeters => DepthSamples::Millimeters(plane),
                    DepthUnit::Meters => DepthSamples::Meters(plane),
                };
                Some(RawDepthFrame {
                    width: depth.width,
                    height: depth.height,
                    samples,
                })
            }
            None => None,
        };

        let confidence = match &manifest.confidence {
            Some(confidence) => Some(RawConfidenceFrame {
                width: confidence.width,
                height: confidence.height,
                plane: self.read_plane(&confidence.plane)?,
            }),
            None => None,
        };

        debug!(
            width = manifest.width,
            height = manifest.height,
            "Replayed recorded frame"
        );

        Ok(RawFrame {
            color,
            depth,
            confidence,
            intrinsics: manifest.intrinsics,
        })
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::session::{MockProfile, MockSession};

    #[test]
    fn test_missing_directory_is_unavailable() {
        let mut session = ReplaySession::new("/nonexistent/depth-capture-replay");
        assert!(matches!(session.probe(), Err(SessionError::NotAvailable(_))));
        assert!(matches!(session.start(), Err(SessionError::NotAvailable(_))));
    }

    #[test]
    fn test_empty_directory_has_no_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = ReplaySession::new(dir.path());
        assert_eq!(session.probe().unwrap(), Capabilities::none());
        session.start().unwrap();
        assert!(matches!(session.acquire_frame(), Err(SessionError::NoFrame)));
    }

    #[test]
    fn test_record_then_replay() {
        let dir = tempfile::tempdir().unwrap();
        let mut mock = MockSession::new(MockProfile::ArcoreDepth);
        mock.start().unwrap();
        let frame = mock.acquire_frame().unwrap();
        ReplaySession::record(dir.path(), &frame).unwrap();

        let mut replay = ReplaySession::new(dir.path());
        let caps = replay.probe().unwrap();
        assert_eq!(caps.depth_type, DepthType::ArcoreDepth);
        assert!(caps.supports_confidence);

        replay.start().unwrap();
        let replayed = replay.acquire_frame().unwrap();
        assert_eq!(replayed.color.width, frame.color.width);
        assert_eq!(replayed.color.luma.data, frame.color.luma.data);
        assert_eq!(replayed.intrinsics, frame.intrinsics);
        assert!(matches!(
            replayed.depth.unwrap().samples,
            DepthSamples::Millimeters(_)
        ));
    }
}
