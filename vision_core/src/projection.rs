//! World ↔ minimap coordinate transforms.
//!
//! The minimap is a fixed-size panel anchored to the bottom-right corner of
//! the canvas. World Y grows upward while panel Y grows downward, so the Y
//! axis is inverted in every transform here. Nothing is clamped: points
//! outside the map bounds project outside the panel.

use bevy::math::DVec2;
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

/// Default minimap panel width in pixels.
pub const MINIMAP_WIDTH: f64 = 200.0;
/// Default minimap panel height in pixels.
pub const MINIMAP_HEIGHT: f64 = 200.0;
/// Gap between the panel and the canvas edges.
pub const MINIMAP_PADDING: f64 = 12.0;
/// Default world bounds, in meters.
pub const MAP_MIN: f64 = -500.0;
pub const MAP_MAX: f64 = 500.0;

/// Width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelExtent {
    pub width: f64,
    pub height: f64,
}

impl PixelExtent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Square world extent `[min, max]` on both axes. `max - min` must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub min: f64,
    pub max: f64,
}

impl MapBounds {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn center(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl Default for MapBounds {
    fn default() -> Self {
        Self::new(MAP_MIN, MAP_MAX)
    }
}

/// Project a world point into panel pixels.
pub fn world_to_minimap(world: DVec2, panel: PixelExtent, bounds: MapBounds) -> DVec2 {
    let span = bounds.span();
    DVec2::new(
        (world.x - bounds.min) / span * panel.width,
        (bounds.max - world.y) / span * panel.height,
    )
}

/// Exact inverse of [`world_to_minimap`].
pub fn minimap_to_world(local: DVec2, panel: PixelExtent, bounds: MapBounds) -> DVec2 {
    let span = bounds.span();
    DVec2::new(
        bounds.min + local.x / panel.width * span,
        bounds.max - local.y / panel.height * span,
    )
}

/// Main camera snapshot: world-space center and zoom factor.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl CameraState {
    pub fn new(x: f64, y: f64, zoom: f64) -> Self {
        Self { x, y, zoom }
    }

    pub fn center(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Half of the visible world extent for a canvas of the given size.
    pub fn half_extent(&self, canvas: PixelExtent) -> DVec2 {
        DVec2::new(
            canvas.width / self.zoom / 2.0,
            canvas.height / self.zoom / 2.0,
        )
    }
}

/// Axis-aligned rectangle in panel pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinimapRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// The main viewport's visible world extent, projected onto the minimap panel.
pub fn viewport_rect(
    camera: &CameraState,
    canvas: PixelExtent,
    panel: PixelExtent,
    bounds: MapBounds,
) -> MinimapRect {
    let half = camera.half_extent(canvas);
    let center = camera.center();
    let top_left = world_to_minimap(
        DVec2::new(center.x - half.x, center.y + half.y),
        panel,
        bounds,
    );
    let bottom_right = world_to_minimap(
        DVec2::new(center.x + half.x, center.y - half.y),
        panel,
        bounds,
    );
    MinimapRect {
        x: top_left.x,
        y: top_left.y,
        w: bottom_right.x - top_left.x,
        h: bottom_right.y - top_left.y,
    }
}

/// Size and placement of the minimap panel plus the world extent it shows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MinimapGeometry {
    pub width: f64,
    pub height: f64,
    pub padding: f64,
    pub map_min: f64,
    pub map_max: f64,
}

impl Default for MinimapGeometry {
    fn default() -> Self {
        Self {
            width: MINIMAP_WIDTH,
            height: MINIMAP_HEIGHT,
            padding: MINIMAP_PADDING,
            map_min: MAP_MIN,
            map_max: MAP_MAX,
        }
    }
}

impl MinimapGeometry {
    pub fn with_bounds(mut self, bounds: MapBounds) -> Self {
        self.map_min = bounds.min;
        self.map_max = bounds.max;
        self
    }

    pub fn panel(&self) -> PixelExtent {
        PixelExtent::new(self.width, self.height)
    }

    pub fn bounds(&self) -> MapBounds {
        MapBounds::new(self.map_min, self.map_max)
    }

    /// Top-left corner of the panel on a canvas of the given size.
    pub fn origin(&self, canvas: PixelExtent) -> DVec2 {
        DVec2::new(
            canvas.width - self.width - self.padding,
            canvas.height - self.height - self.padding,
        )
    }

    /// Edges count as inside.
    pub fn contains(&self, screen: DVec2, canvas: PixelExtent) -> bool {
        let origin = self.origin(canvas);
        screen.x >= origin.x
            && screen.x <= origin.x + self.width
            && screen.y >= origin.y
            && screen.y <= origin.y + self.height
    }

    /// World position under a screen click, or `None` when the click misses the panel.
    pub fn hit_test(&self, screen: DVec2, canvas: PixelExtent) -> Option<DVec2> {
        if !self.contains(screen, canvas) {
            return None;
        }
        let local = screen - self.origin(canvas);
        Some(minimap_to_world(local, self.panel(), self.bounds()))
    }

    /// Screen position of a world point on the minimap panel.
    pub fn world_to_screen(&self, world: DVec2, canvas: PixelExtent) -> DVec2 {
        self.origin(canvas) + world_to_minimap(world, self.panel(), self.bounds())
    }

    pub fn viewport_rect(&self, camera: &CameraState, canvas: PixelExtent) -> MinimapRect {
        viewport_rect(camera, canvas, self.panel(), self.bounds())
    }
}

/// Minimap hit test with the default panel size and padding.
pub fn hit_test(screen: DVec2, canvas: PixelExtent, bounds: MapBounds) -> Option<DVec2> {
    MinimapGeometry::default()
        .with_bounds(bounds)
        .hit_test(screen, canvas)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;
    const PANEL: PixelExtent = PixelExtent::new(200.0, 200.0);
    const CANVAS: PixelExtent = PixelExtent::new(1280.0, 720.0);

    fn assert_close(actual: DVec2, expected: DVec2) {
        assert!(
            (actual - expected).length() < EPS,
            "expected {expected:?}, got {actual:?}"
        );
    }

    #[test]
    fn corners_and_center_map_with_inverted_y() {
        let bounds = MapBounds::new(-500.0, 500.0);
        let cases = [
            ((-500.0, 500.0), (0.0, 0.0)),
            ((500.0, 500.0), (200.0, 0.0)),
            ((-500.0, -500.0), (0.0, 200.0)),
            ((500.0, -500.0), (200.0, 200.0)),
            ((0.0, 0.0), (100.0, 100.0)),
        ];
        for ((wx, wy), (px, py)) in cases {
            assert_close(
                world_to_minimap(DVec2::new(wx, wy), PANEL, bounds),
                DVec2::new(px, py),
            );
        }
    }

    #[test]
    fn asymmetric_bounds_are_honoured() {
        let bounds = MapBounds::new(0.0, 100.0);
        let panel = PixelExtent::new(300.0, 150.0);
        assert_close(
            world_to_minimap(DVec2::new(0.0, 100.0), panel, bounds),
            DVec2::ZERO,
        );
        assert_close(
            world_to_minimap(DVec2::new(50.0, 50.0), panel, bounds),
            DVec2::new(150.0, 75.0),
        );
        assert_close(
            world_to_minimap(DVec2::new(100.0, 0.0), panel, bounds),
            DVec2::new(300.0, 150.0),
        );
    }

    #[test]
    fn out_of_bounds_points_are_not_clamped() {
        let bounds = MapBounds::new(-500.0, 500.0);
        let projected = world_to_minimap(DVec2::new(1000.0, -1000.0), PANEL, bounds);
        assert!(projected.x > PANEL.width);
        assert!(projected.y > PANEL.height);
    }

    #[test]
    fn inverse_recovers_world_point() {
        let bounds = MapBounds::new(-120.0, 380.0);
        for world in [
            DVec2::new(0.0, 0.0),
            DVec2::new(-120.0, 380.0),
            DVec2::new(17.25, -3.5),
            DVec2::new(999.0, -999.0),
        ] {
            let local = world_to_minimap(world, PANEL, bounds);
            let back = minimap_to_world(local, PANEL, bounds);
            assert!((back - world).length() < 1e-6);
        }
    }

    #[test]
    fn viewport_rect_centered_camera() {
        let camera = CameraState::new(0.0, 0.0, 1.0);
        let rect = viewport_rect(&camera, CANVAS, PANEL, MapBounds::default());
        // 1280 x 720 world meters on a 1000 m map at 0.2 px/m.
        assert!((rect.w - 256.0).abs() < EPS);
        assert!((rect.h - 144.0).abs() < EPS);
        assert!((rect.x - (100.0 - 128.0)).abs() < EPS);
        assert!((rect.y - (100.0 - 72.0)).abs() < EPS);
    }

    #[test]
    fn doubling_zoom_halves_rect() {
        let bounds = MapBounds::default();
        let base = viewport_rect(&CameraState::new(10.0, -20.0, 2.0), CANVAS, PANEL, bounds);
        let zoomed = viewport_rect(&CameraState::new(10.0, -20.0, 4.0), CANVAS, PANEL, bounds);
        assert!((zoomed.w - base.w * 0.5).abs() < EPS);
        assert!((zoomed.h - base.h * 0.5).abs() < EPS);

        let wide = viewport_rect(&CameraState::new(10.0, -20.0, 1.0), CANVAS, PANEL, bounds);
        assert!(wide.w > base.w && wide.h > base.h);
    }

    #[test]
    fn panning_translates_without_resizing() {
        let bounds = MapBounds::default();
        let before = viewport_rect(&CameraState::new(0.0, 0.0, 3.0), CANVAS, PANEL, bounds);
        let after = viewport_rect(&CameraState::new(50.0, 25.0, 3.0), CANVAS, PANEL, bounds);
        assert!((after.x - before.x - 10.0).abs() < EPS);
        assert!((after.y - before.y + 5.0).abs() < EPS);
        assert!((after.w - before.w).abs() < EPS);
        assert!((after.h - before.h).abs() < EPS);
    }

    #[test]
    fn rect_stays_positive_at_extreme_zoom() {
        for zoom in [0.01, 0.5, 1.0, 64.0, 1.0e4] {
            let rect = viewport_rect(
                &CameraState::new(0.0, 0.0, zoom),
                CANVAS,
                PANEL,
                MapBounds::default(),
            );
            assert!(rect.w > 0.0 && rect.h > 0.0, "zoom {zoom}");
        }
    }

    #[test]
    fn panel_anchors_bottom_right() {
        let geometry = MinimapGeometry::default();
        assert_close(geometry.origin(CANVAS), DVec2::new(1068.0, 508.0));
    }

    #[test]
    fn hit_test_edges_are_inclusive() {
        let geometry = MinimapGeometry::default();
        let origin = geometry.origin(CANVAS);
        let far = origin + DVec2::new(geometry.width, geometry.height);

        for inside in [origin, far, DVec2::new(origin.x, far.y), DVec2::new(far.x, origin.y)] {
            assert!(geometry.hit_test(inside, CANVAS).is_some(), "{inside:?}");
        }

        let mid = (origin + far) / 2.0;
        for outside in [
            DVec2::new(origin.x - 1.0, mid.y),
            DVec2::new(far.x + 1.0, mid.y),
            DVec2::new(mid.x, origin.y - 1.0),
            DVec2::new(mid.x, far.y + 1.0),
        ] {
            assert!(geometry.hit_test(outside, CANVAS).is_none(), "{outside:?}");
        }
    }

    #[test]
    fn hit_test_round_trips_projection() {
        let geometry = MinimapGeometry::default().with_bounds(MapBounds::new(0.0, 100.0));
        for world in [
            DVec2::new(0.0, 0.0),
            DVec2::new(100.0, 100.0),
            DVec2::new(33.3, 71.2),
        ] {
            let screen = geometry.world_to_screen(world, CANVAS);
            let back = geometry.hit_test(screen, CANVAS).expect("inside panel");
            assert!((back - world).length() < 1e-6);
        }
    }

    #[test]
    fn free_hit_test_uses_default_panel() {
        let screen = DVec2::new(1068.0 + 100.0, 508.0 + 100.0);
        let world = hit_test(screen, CANVAS, MapBounds::default()).unwrap();
        assert_close(world, DVec2::ZERO);
        assert!(hit_test(DVec2::new(10.0, 10.0), CANVAS, MapBounds::default()).is_none());
    }
}
