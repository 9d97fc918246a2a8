//! Direction-aware vision cones for sweeping sensors.
//!
//! Cones are a separate overlay from the fog circles. They share the
//! observer eligibility rules but never contribute to [`crate::is_visible`]
//! or the fog mask.

use bevy::math::DVec2;
use serde::{Deserialize, Serialize};

use crate::entity::{EntityId, EntityStore};
use crate::vision::AssetKind;

/// Cone shape and sweep rate for one asset kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisionConeProfile {
    pub range: f64,
    pub half_angle_deg: f64,
    #[serde(default)]
    pub sweep_deg_per_sec: f64,
}

impl VisionConeProfile {
    pub const fn new(range: f64, half_angle_deg: f64, sweep_deg_per_sec: f64) -> Self {
        Self {
            range,
            half_angle_deg,
            sweep_deg_per_sec,
        }
    }
}

/// Cone profiles keyed by asset kind. Kinds set to `None` have no cone.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct VisionConeTable {
    pub turret: Option<VisionConeProfile>,
    pub drone: Option<VisionConeProfile>,
    pub rover: Option<VisionConeProfile>,
    pub camera: Option<VisionConeProfile>,
    pub sensor: Option<VisionConeProfile>,
    pub person: Option<VisionConeProfile>,
}

impl Default for VisionConeTable {
    fn default() -> Self {
        Self {
            turret: Some(VisionConeProfile::new(70.0, 20.0, 45.0)),
            drone: Some(VisionConeProfile::new(100.0, 45.0, 0.0)),
            rover: None,
            camera: Some(VisionConeProfile::new(60.0, 30.0, 20.0)),
            sensor: Some(VisionConeProfile::new(45.0, 60.0, 90.0)),
            person: None,
        }
    }
}

impl VisionConeTable {
    pub fn profile_for(&self, kind: AssetKind) -> Option<VisionConeProfile> {
        match kind {
            AssetKind::Turret => self.turret,
            AssetKind::Drone => self.drone,
            AssetKind::Rover => self.rover,
            AssetKind::Camera => self.camera,
            AssetKind::Sensor => self.sensor,
            AssetKind::Person => self.person,
            AssetKind::Unclassified => None,
        }
    }
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed offset from `from` to `to` in degrees, within `(-180, 180]`.
pub fn angular_offset(from: f64, to: f64) -> f64 {
    let delta = normalize_degrees(to - from);
    if delta > 180.0 {
        delta - 360.0
    } else {
        delta
    }
}

/// A world-space wedge at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionCone {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
    pub range: f64,
    pub half_angle_deg: f64,
}

impl VisionCone {
    pub fn apex(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Range and edge angles are inclusive; the apex itself is always inside
    /// a cone with non-negative range.
    pub fn contains(&self, point: DVec2) -> bool {
        let delta = point - self.apex();
        let distance = delta.length();
        if distance > self.range {
            return false;
        }
        if distance == 0.0 {
            return true;
        }
        let bearing = delta.y.atan2(delta.x).to_degrees();
        angular_offset(self.heading_deg, bearing).abs() <= self.half_angle_deg
    }
}

/// Build the cones for every eligible observer whose kind has a profile.
///
/// Heading sweeps at the profile's rate from the entity's reported heading
/// (east when absent).
pub fn build_vision_cones(
    store: &EntityStore,
    table: &VisionConeTable,
    elapsed_secs: f64,
) -> Vec<VisionCone> {
    store
        .iter()
        .filter_map(|entity| {
            let position = entity.observer_position()?;
            let profile = table.profile_for(AssetKind::of(entity))?;
            let base = entity.heading_deg.unwrap_or(0.0);
            Some(VisionCone {
                id: entity.id.clone(),
                x: position.x,
                y: position.y,
                heading_deg: normalize_degrees(base + profile.sweep_deg_per_sec * elapsed_secs),
                range: profile.range,
                half_angle_deg: profile.half_angle_deg,
            })
        })
        .collect()
}
