//! Vision and minimap projection engine for the tactical map dashboard.
//!
//! Builds the friendly vision map each frame and maps between world, main
//! viewport and minimap coordinates when [`run_frame`] is invoked.

mod entity;
mod fog_mask;
mod overlay;
pub mod projection;
mod vision;
pub mod vision_cone;
pub mod vision_config;
pub mod vision_systems;

use std::sync::Arc;

use bevy::prelude::*;

pub use entity::{
    Alliance, EntityId, EntityRecord, EntityStatus, EntityStore, FeedError, PositionFields,
};
pub use fog_mask::{cell_center, FogMask, FOGGED, REVEALED};
pub use overlay::FogToggleState;
pub use projection::{
    hit_test, minimap_to_world, viewport_rect, world_to_minimap, CameraState, MapBounds,
    MinimapGeometry, MinimapRect, PixelExtent,
};
pub use vision::{
    build_vision_map, is_visible, AssetKind, VisionCircle, VisionMap, VisionRadiusResolver,
};
pub use vision_cone::{build_vision_cones, VisionCone, VisionConeProfile, VisionConeTable};
pub use vision_config::{
    load_vision_config_from_env, VisionConfig, VisionConfigError, VisionConfigHandle,
    VisionConfigMetadata, VisionRadiusTable,
};
pub use vision_systems::{CanvasSize, FrameTick, MinimapFrame, MinimapMarker, VisionCones};

/// Construct a Bevy [`App`] with configuration resolved from the environment.
pub fn build_headless_app() -> App {
    let (config, metadata) = load_vision_config_from_env();
    let mut app = build_app_with_config(config);
    app.insert_resource(metadata);
    app
}

/// Construct a Bevy [`App`] running the vision pipeline with the given configuration.
pub fn build_app_with_config(config: Arc<VisionConfig>) -> App {
    let mut app = App::new();

    let toggles = FogToggleState::from_defaults(&config.overlays);

    app.insert_resource(VisionConfigHandle::new(config))
        .insert_resource(VisionConfigMetadata::new(None))
        .insert_resource(EntityStore::default())
        .insert_resource(CameraState::default())
        .insert_resource(CanvasSize::default())
        .insert_resource(toggles)
        .insert_resource(VisionMap::default())
        .insert_resource(VisionCones::default())
        .insert_resource(FogMask::default())
        .insert_resource(MinimapFrame::default())
        .insert_resource(FrameTick::default())
        .add_plugins(MinimalPlugins)
        .add_systems(
            Update,
            (
                vision_systems::rebuild_vision_map,
                vision_systems::rebuild_vision_cones,
                vision_systems::rebuild_fog_mask.run_if(overlay::fog_enabled),
                vision_systems::clear_fog_mask.run_if(overlay::fog_disabled),
                vision_systems::update_minimap_frame.run_if(overlay::minimap_enabled),
                vision_systems::clear_minimap_frame.run_if(overlay::minimap_disabled),
                vision_systems::advance_frame,
            )
                .chain(),
        );

    app
}

/// Execute a single frame.
///
/// Each call processes the chained systems configured in [`build_app_with_config`]
/// (circles → cones → fog mask → minimap frame → frame increment). Passes whose
/// toggle is off clear their output instead of computing it.
pub fn run_frame(app: &mut App) {
    app.update();
}
