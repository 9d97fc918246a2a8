//! Per-frame systems for the vision and minimap pipeline.
//!
//! Systems run in sequence every frame:
//! 1. `rebuild_vision_map` - Rebuild circles from the entity store
//! 2. `rebuild_vision_cones` - Rebuild the directional cone overlay
//! 3. `rebuild_fog_mask` / `clear_fog_mask` - Fog raster, gated by the fog toggle
//! 4. `update_minimap_frame` / `clear_minimap_frame` - Minimap inputs, gated by the minimap toggle
//! 5. `advance_frame` - Frame counter

use bevy::math::DVec2;
use bevy::prelude::*;
use serde::Serialize;

use crate::{
    entity::{EntityId, EntityStore},
    fog_mask::FogMask,
    overlay::FogToggleState,
    projection::{world_to_minimap, CameraState, MinimapRect, PixelExtent},
    vision::{build_vision_map, VisionMap, VisionRadiusResolver},
    vision_cone::{build_vision_cones, VisionCone},
    vision_config::VisionConfigHandle,
};

/// Frames elapsed since the app started.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameTick(pub u64);

/// Size of the main canvas in pixels.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize(pub PixelExtent);

impl Default for CanvasSize {
    fn default() -> Self {
        Self(PixelExtent::new(1280.0, 720.0))
    }
}

/// Latest directional cones.
#[derive(Resource, Debug, Clone, Default)]
pub struct VisionCones(pub Vec<VisionCone>);

/// Observer marker on the minimap, in panel pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimapMarker {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    /// Vision radius scaled to panel pixels along X.
    pub r: f64,
}

/// Everything the minimap renderer needs for one frame.
#[derive(Resource, Debug, Clone, Default)]
pub struct MinimapFrame {
    /// Screen position of the panel's top-left corner.
    pub origin: Option<DVec2>,
    pub viewport: Option<MinimapRect>,
    pub markers: Vec<MinimapMarker>,
}

impl MinimapFrame {
    pub fn is_active(&self) -> bool {
        self.viewport.is_some()
    }

    pub fn clear(&mut self) {
        self.origin = None;
        self.viewport = None;
        self.markers.clear();
    }
}

/// Step 1: Rebuild vision circles from the current entity state.
pub fn rebuild_vision_map(
    store: Res<EntityStore>,
    config: Res<VisionConfigHandle>,
    tick: Res<FrameTick>,
    mut vision: ResMut<VisionMap>,
) {
    let resolver = VisionRadiusResolver::new(config.0.radii);
    let circles = build_vision_map(&store, &resolver);

    tracing::debug!(
        target: "tactical_map::vision",
        frame = tick.0,
        entity_count = store.len(),
        circle_count = circles.len(),
        "vision.rebuild"
    );

    vision.replace(circles);
}

/// Step 2: Rebuild the cone overlay. Independent of fog.
pub fn rebuild_vision_cones(
    store: Res<EntityStore>,
    config: Res<VisionConfigHandle>,
    time: Res<Time>,
    mut cones: ResMut<VisionCones>,
) {
    cones.0 = build_vision_cones(&store, &config.0.cones, time.elapsed_seconds_f64());
}

/// Step 3: Rasterize the fog mask from the fresh circles.
pub fn rebuild_fog_mask(
    vision: Res<VisionMap>,
    config: Res<VisionConfigHandle>,
    mut mask: ResMut<FogMask>,
) {
    let cfg = config.0.as_ref();
    let _span = tracing::debug_span!(
        target: "tactical_map::vision",
        "rebuild_fog_mask",
        columns = cfg.fog_mask.columns,
        rows = cfg.fog_mask.rows,
    )
    .entered();

    *mask = FogMask::rasterize(
        vision.circles(),
        cfg.minimap.bounds(),
        cfg.fog_mask.columns,
        cfg.fog_mask.rows,
    );

    tracing::debug!(
        target: "tactical_map::vision",
        revealed = mask.visible_count(),
        coverage = mask.coverage(),
        "vision.fog_mask"
    );
}

pub fn clear_fog_mask(mut mask: ResMut<FogMask>) {
    if !mask.is_empty() {
        mask.clear();
    }
}

/// Step 4: Project the camera extent and observers onto the minimap.
pub fn update_minimap_frame(
    camera: Res<CameraState>,
    canvas: Res<CanvasSize>,
    config: Res<VisionConfigHandle>,
    vision: Res<VisionMap>,
    mut frame: ResMut<MinimapFrame>,
) {
    let geometry = config.0.minimap;
    let panel = geometry.panel();
    let bounds = geometry.bounds();
    let pixels_per_meter = panel.width / bounds.span();

    frame.origin = Some(geometry.origin(canvas.0));
    frame.viewport = Some(geometry.viewport_rect(&camera, canvas.0));
    frame.markers = vision
        .circles()
        .iter()
        .map(|circle| {
            let projected = world_to_minimap(circle.center(), panel, bounds);
            MinimapMarker {
                id: circle.id.clone(),
                x: projected.x,
                y: projected.y,
                r: circle.r * pixels_per_meter,
            }
        })
        .collect();

    tracing::debug!(
        target: "tactical_map::minimap",
        camera_x = camera.x,
        camera_y = camera.y,
        zoom = camera.zoom,
        markers = frame.markers.len(),
        "minimap.frame"
    );
}

pub fn clear_minimap_frame(mut frame: ResMut<MinimapFrame>) {
    if frame.is_active() || !frame.markers.is_empty() {
        frame.clear();
    }
}

/// Step 5: Advance the frame counter.
pub fn advance_frame(mut tick: ResMut<FrameTick>) {
    tick.0 += 1;
}

/// Log a one-line summary of the current frame state.
pub fn log_frame_summary(
    tick: Res<FrameTick>,
    vision: Res<VisionMap>,
    toggles: Res<FogToggleState>,
    mask: Res<FogMask>,
) {
    tracing::info!(
        target: "tactical_map::vision",
        frame = tick.0,
        circles = vision.len(),
        fog_enabled = toggles.fog_enabled,
        minimap_enabled = toggles.minimap_enabled,
        coverage = mask.coverage(),
        "vision.frame_summary"
    );
}
