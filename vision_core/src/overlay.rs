//! Overlay toggles for the fog and minimap passes.
//!
//! The two flags are independent. Each gates its pass through a pair of run
//! conditions: one enabling the compute system, one enabling the clear system.

use bevy::prelude::{Res, Resource};

use crate::vision_config::OverlayDefaults;

/// Independent on/off switches for the fog and minimap passes.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct FogToggleState {
    pub fog_enabled: bool,
    pub minimap_enabled: bool,
}

impl Default for FogToggleState {
    fn default() -> Self {
        Self::from_defaults(&OverlayDefaults::default())
    }
}

impl FogToggleState {
    pub fn new(fog_enabled: bool, minimap_enabled: bool) -> Self {
        Self {
            fog_enabled,
            minimap_enabled,
        }
    }

    pub fn from_defaults(defaults: &OverlayDefaults) -> Self {
        Self::new(defaults.fog_enabled, defaults.minimap_enabled)
    }

    /// Flip the fog flag and return its new value.
    pub fn toggle_fog(&mut self) -> bool {
        self.fog_enabled = !self.fog_enabled;
        self.fog_enabled
    }

    /// Flip the minimap flag and return its new value.
    pub fn toggle_minimap(&mut self) -> bool {
        self.minimap_enabled = !self.minimap_enabled;
        self.minimap_enabled
    }

    pub fn set_fog(&mut self, enabled: bool) {
        self.fog_enabled = enabled;
    }

    pub fn set_minimap(&mut self, enabled: bool) {
        self.minimap_enabled = enabled;
    }
}

/// Run condition for the fog pass.
pub fn fog_enabled(toggles: Res<FogToggleState>) -> bool {
    toggles.fog_enabled
}

/// Run condition for the minimap pass.
pub fn minimap_enabled(toggles: Res<FogToggleState>) -> bool {
    toggles.minimap_enabled
}

/// Run condition for clearing the fog mask while fog is off.
pub fn fog_disabled(toggles: Res<FogToggleState>) -> bool {
    !toggles.fog_enabled
}

/// Run condition for clearing the minimap frame while the minimap is off.
pub fn minimap_disabled(toggles: Res<FogToggleState>) -> bool {
    !toggles.minimap_enabled
}
