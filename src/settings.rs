//! Player preferences and gameplay tuning
//!
//! Persisted in LocalStorage on the web and as `settings.json` natively.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::sim::{LevelConfig, PlayerTuning, SessionTuning, TargetTuning};

/// Gameplay tuning, grouped by subsystem
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: PlayerTuning,
    pub targets: TargetTuning,
    pub level: LevelConfig,
    pub session: SessionTuning,
}

/// Player preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Look ===
    /// Radians per pixel of mouse movement
    pub mouse_sensitivity: f32,
    pub invert_y: bool,

    // === Effects ===
    /// Hit/miss impact decals
    pub decals: bool,
    /// Seconds a decal stays visible
    pub decal_lifetime: f32,

    pub tuning: Tuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.002,
            invert_y: false,
            decals: true,
            decal_lifetime: 0.5,
            tuning: Tuning::default(),
        }
    }
}

impl Settings {
    /// Turn a raw pointer delta (pixels) into a (yaw, pitch) delta in radians.
    /// Moving the mouse up looks up unless `invert_y` is set.
    pub fn look_delta(&self, dx: f32, dy: f32) -> Vec2 {
        let pitch = if self.invert_y { dy } else { -dy };
        Vec2::new(dx, pitch) * self.mouse_sensitivity
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// LocalStorage key
    #[cfg(target_arch = "wasm32")]
    const STORAGE_KEY: &'static str = "aim_parkour_settings";

    /// Settings file (native)
    #[cfg(not(target_arch = "wasm32"))]
    const SETTINGS_FILE: &'static str = "settings.json";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(settings) => {
                        log::info!("Loaded settings from LocalStorage");
                        return settings;
                    }
                    Err(e) => log::warn!("Ignoring stored settings: {}", e),
                }
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = self.to_json() {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Settings saved");
            }
        }
    }

    /// Load settings from the working directory, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::load_from(std::path::Path::new(Self::SETTINGS_FILE))
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        self.save_to(std::path::Path::new(Self::SETTINGS_FILE));
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, path: &std::path::Path) {
        let result = self
            .to_json()
            .map_err(|e| e.to_string())
            .and_then(|json| std::fs::write(path, json).map_err(|e| e.to_string()));
        match result {
            Ok(()) => log::info!("Settings saved to {}", path.display()),
            Err(e) => log::warn!("Failed to save settings: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;

    #[test]
    fn test_defaults_match_consts() {
        let settings = Settings::default();
        assert_eq!(settings.tuning.player.friction, FRICTION);
        assert_eq!(settings.tuning.player.gravity, GRAVITY);
        assert_eq!(settings.tuning.targets.range, TARGET_RANGE);
        assert_eq!(settings.tuning.level.platform_count, PLATFORM_COUNT);
        assert_eq!(settings.tuning.session.round_seconds, ROUND_SECONDS);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "invert_y": true, "tuning": { "player": { "gravity": 12.0 } } }"#;
        let settings = Settings::from_json(json).unwrap();
        assert!(settings.invert_y);
        assert_eq!(settings.tuning.player.gravity, 12.0);
        assert_eq!(settings.tuning.player.friction, FRICTION);
        assert_eq!(settings.mouse_sensitivity, Settings::default().mouse_sensitivity);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_json_keeps_values() {
        let mut settings = Settings::default();
        settings.decals = false;
        settings.tuning.session.static_target_count = 5;
        let back = Settings::from_json(&settings.to_json().unwrap()).unwrap();
        assert!(!back.decals);
        assert_eq!(back.tuning.session.static_target_count, 5);
    }

    #[test]
    fn test_look_delta() {
        let mut settings = Settings::default();
        settings.mouse_sensitivity = 0.01;
        let delta = settings.look_delta(10.0, 5.0);
        assert!((delta.x - 0.1).abs() < 1e-6);
        assert!((delta.y + 0.05).abs() < 1e-6);

        settings.invert_y = true;
        assert!((settings.look_delta(0.0, 5.0).y - 0.05).abs() < 1e-6);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("aim_parkour_no_such_settings.json");
        let _ = std::fs::remove_file(&path);
        let settings = Settings::load_from(&path);
        assert_eq!(settings.decal_lifetime, Settings::default().decal_lifetime);
    }

    #[test]
    fn test_save_then_load_file() {
        let path = std::env::temp_dir().join(format!(
            "aim_parkour_settings_{}.json",
            std::process::id()
        ));
        let mut settings = Settings::default();
        settings.mouse_sensitivity = 0.005;
        settings.save_to(&path);
        let loaded = Settings::load_from(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.mouse_sensitivity, 0.005);
    }
}
