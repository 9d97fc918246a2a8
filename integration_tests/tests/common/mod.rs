#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Once;

use vision_core::{Alliance, EntityRecord};

static INIT: Once = Once::new();

pub fn ensure_test_config() {
    INIT.call_once(|| {
        let config_path = fixture_path("test_vision_config.json");

        debug_assert!(
            config_path.exists(),
            "missing test vision config at {}",
            config_path.display()
        );

        std::env::set_var("VISION_CONFIG_PATH", &config_path);
    });
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn friendly(id: &str, asset_type: &str, x: f64, y: f64) -> EntityRecord {
    EntityRecord::new(id)
        .with_alliance(Alliance::Friendly)
        .with_asset_type(asset_type)
        .at(x, y)
}
