//! Configuration for the vision and minimap engine.
//!
//! Loaded from `vision_config.json` with support for an environment variable override.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

use bevy::prelude::Resource;
use serde::Deserialize;
use thiserror::Error;

use crate::projection::MinimapGeometry;
use crate::vision::AssetKind;
use crate::vision_cone::VisionConeTable;

pub const BUILTIN_VISION_CONFIG: &str = include_str!("data/vision_config.json");

/// Root configuration for the vision engine.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub radii: VisionRadiusTable,
    pub minimap: MinimapGeometry,
    pub overlays: OverlayDefaults,
    pub fog_mask: FogMaskConfig,
    pub cones: VisionConeTable,
}

impl VisionConfig {
    pub fn builtin() -> Arc<Self> {
        Arc::new(
            serde_json::from_str(BUILTIN_VISION_CONFIG)
                .expect("builtin vision config should parse"),
        )
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_file(path: &Path) -> Result<Self, VisionConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| VisionConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = VisionConfig::from_json_str(&contents)?;
        Ok(config)
    }
}

/// Default vision radius per asset kind, in world meters.
///
/// Kinds without their own entry (and unrecognised types) use `default`.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisionRadiusTable {
    pub turret: f64,
    pub drone: f64,
    pub rover: f64,
    pub camera: f64,
    pub sensor: f64,
    pub person: f64,
    pub default: f64,
}

impl Default for VisionRadiusTable {
    fn default() -> Self {
        Self {
            turret: 50.0,
            drone: 80.0,
            rover: 40.0,
            camera: 35.0,
            sensor: 30.0,
            person: 20.0,
            default: 25.0,
        }
    }
}

impl VisionRadiusTable {
    pub fn radius_for(&self, kind: AssetKind) -> f64 {
        match kind {
            AssetKind::Turret => self.turret,
            AssetKind::Drone => self.drone,
            AssetKind::Rover => self.rover,
            AssetKind::Camera => self.camera,
            AssetKind::Sensor => self.sensor,
            AssetKind::Person => self.person,
            AssetKind::Unclassified => self.default,
        }
    }
}

/// Initial state of the overlay toggles.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct OverlayDefaults {
    pub fog_enabled: bool,
    pub minimap_enabled: bool,
}

impl Default for OverlayDefaults {
    fn default() -> Self {
        Self {
            fog_enabled: true,
            minimap_enabled: true,
        }
    }
}

/// Resolution of the fog mask raster.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct FogMaskConfig {
    pub columns: u32,
    pub rows: u32,
}

impl Default for FogMaskConfig {
    fn default() -> Self {
        Self {
            columns: 64,
            rows: 64,
        }
    }
}

#[derive(Debug, Error)]
pub enum VisionConfigError {
    #[error("failed to parse vision config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read vision config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Active vision configuration shared with the frame systems.
#[derive(Resource, Debug, Clone)]
pub struct VisionConfigHandle(pub Arc<VisionConfig>);

impl VisionConfigHandle {
    pub fn new(config: Arc<VisionConfig>) -> Self {
        Self(config)
    }
}

/// Where the active configuration came from. `None` means the builtin document.
#[derive(Resource, Debug, Clone)]
pub struct VisionConfigMetadata {
    path: Option<PathBuf>,
}

impl VisionConfigMetadata {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&PathBuf> {
        self.path.as_ref()
    }
}

/// Load the file named by `VISION_CONFIG_PATH`, or the builtin document when
/// the variable is unset or the file cannot be used.
pub fn load_vision_config_from_env() -> (Arc<VisionConfig>, VisionConfigMetadata) {
    if let Some(path) = env::var_os("VISION_CONFIG_PATH").map(PathBuf::from) {
        match VisionConfig::from_file(&path) {
            Ok(config) => {
                tracing::info!(
                    target: "tactical_map::config",
                    path = %path.display(),
                    "vision_config.loaded=file"
                );
                return (Arc::new(config), VisionConfigMetadata::new(Some(path)));
            }
            Err(err) => {
                tracing::warn!(
                    target: "tactical_map::config",
                    path = %path.display(),
                    error = %err,
                    "vision_config.load_failed"
                );
            }
        }
    }

    tracing::info!(target: "tactical_map::config", "vision_config.loaded=builtin");
    (VisionConfig::builtin(), VisionConfigMetadata::new(None))
}
