//! Fog of War vision circles.
//!
//! Every friendly, active, positioned entity reveals a disc around itself.
//! The union of those discs is the currently observed area; anything outside
//! is fogged. Circles are rebuilt from the entity store each frame.

use bevy::math::DVec2;
use bevy::prelude::Resource;
use serde::Serialize;

use crate::entity::{EntityId, EntityRecord, EntityStore};
use crate::vision_config::VisionRadiusTable;

/// Asset classes with their own vision defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Turret,
    Drone,
    Rover,
    Camera,
    Sensor,
    Person,
    /// Any other, empty or missing asset type. Uses the table default.
    Unclassified,
}

impl AssetKind {
    /// Classify a feed `asset_type` string, ignoring case.
    pub fn from_asset_type(asset_type: Option<&str>) -> Self {
        let Some(raw) = asset_type else {
            return Self::Unclassified;
        };
        match raw.to_lowercase().as_str() {
            "turret" => Self::Turret,
            "drone" => Self::Drone,
            "rover" => Self::Rover,
            "camera" => Self::Camera,
            "sensor" => Self::Sensor,
            "person" => Self::Person,
            _ => Self::Unclassified,
        }
    }

    pub fn of(entity: &EntityRecord) -> Self {
        Self::from_asset_type(entity.asset_type.as_deref())
    }
}

/// Resolves an observer's effective vision radius.
#[derive(Debug, Clone, Copy, Default)]
pub struct VisionRadiusResolver {
    table: VisionRadiusTable,
}

impl VisionRadiusResolver {
    pub fn new(table: VisionRadiusTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &VisionRadiusTable {
        &self.table
    }

    /// An explicit `vision_range` is returned as-is, including zero and
    /// negative values. Otherwise the asset kind's tabled radius applies.
    pub fn resolve(&self, entity: &EntityRecord) -> f64 {
        match entity.vision_range {
            Some(range) => range,
            None => self.table.radius_for(AssetKind::of(entity)),
        }
    }
}

/// World-space disc revealed by one observer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisionCircle {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub r: f64,
}

impl VisionCircle {
    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Boundary inclusive. Negative radii never contain anything.
    #[inline]
    pub fn contains(&self, point: DVec2) -> bool {
        point.distance(self.center()) <= self.r
    }
}

/// Build the vision circles for the current entity state, in store order.
pub fn build_vision_map(store: &EntityStore, resolver: &VisionRadiusResolver) -> Vec<VisionCircle> {
    store
        .iter()
        .filter_map(|entity| {
            let position = entity.observer_position()?;
            Some(VisionCircle {
                id: entity.id.clone(),
                x: position.x,
                y: position.y,
                r: resolver.resolve(entity),
            })
        })
        .collect()
}

/// True if any circle covers `(px, py)`.
pub fn is_visible(px: f64, py: f64, circles: &[VisionCircle]) -> bool {
    let point = DVec2::new(px, py);
    circles.iter().any(|circle| circle.contains(point))
}

/// Latest vision circles, rebuilt every frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct VisionMap {
    circles: Vec<VisionCircle>,
}

impl VisionMap {
    pub fn new(circles: Vec<VisionCircle>) -> Self {
        Self { circles }
    }

    pub fn circles(&self) -> &[VisionCircle] {
        &self.circles
    }

    pub fn replace(&mut self, circles: Vec<VisionCircle>) {
        self.circles = circles;
    }

    pub fn is_visible(&self, px: f64, py: f64) -> bool {
        is_visible(px, py, &self.circles)
    }

    pub fn len(&self) -> usize {
        self.circles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }
}
