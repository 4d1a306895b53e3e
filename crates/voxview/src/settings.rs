//! Persistence for the toolkit's option structs.

use std::path::Path;

use serde::{Deserialize, Serialize};
use voxview_core::error::Result;
use voxview_render::{CaptureOptions, VolumeRenderOptions};

use crate::utils::ContourOptions;

/// The persisted option set of a viewer session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct ViewerSettings {
    /// Screen capture options.
    #[serde(default)]
    pub capture: CaptureOptions,
    /// Contour builder options.
    #[serde(default)]
    pub contour: ContourOptions,
    /// Volume rendering defaults.
    #[serde(default)]
    pub volume: VolumeRenderOptions,
}

impl ViewerSettings {
    /// Loads settings from a JSON file. Unknown fields are ignored; missing
    /// sections fall back to their defaults.
    ///
    /// # Errors
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Saves settings as pretty-printed JSON.
    ///
    /// # Errors
    /// Fails when the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("voxview_settings_{}_{name}", std::process::id()))
    }

    #[test]
    fn test_round_trip() {
        let path = temp_path("round_trip.json");
        let mut settings = ViewerSettings::default();
        settings.capture.magnification = 4;
        settings.contour.smooth_iterations = 7;
        settings.volume.sample_distance = 0.25;
        settings.save(&path).unwrap();

        let loaded = ViewerSettings::load(&path).unwrap();
        assert_eq!(loaded.capture.magnification, 4);
        assert_eq!(loaded.contour.smooth_iterations, 7);
        assert!((loaded.volume.sample_distance - 0.25).abs() < 1e-6);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let path = temp_path("partial.json");
        std::fs::write(&path, r#"{"capture": {"anti_aliasing": true, "magnification": 2}}"#)
            .unwrap();
        let loaded = ViewerSettings::load(&path).unwrap();
        assert!(loaded.capture.anti_aliasing);
        assert_eq!(loaded.contour.smooth_iterations, 0);
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_load_missing_file_fails() {
        assert!(ViewerSettings::load(&temp_path("does_not_exist.json")).is_err());
    }
}
