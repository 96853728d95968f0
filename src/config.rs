use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::state::AudioSource;

/// Persisted user settings. Loaded once at startup and written back when a
/// control command changes them; the capture/analysis pipeline itself never
/// touches the filesystem.
#[derive(Debug, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default = "default_width")]
    pub window_width: u32,
    #[serde(default = "default_height")]
    pub window_height: u32,
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_palette")]
    pub palette: usize,
    #[serde(default = "default_source")]
    pub source: AudioSource,
    #[serde(default = "default_show_onboarding")]
    pub show_onboarding: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window_width: default_width(),
            window_height: default_height(),
            sensitivity: default_sensitivity(),
            palette: default_palette(),
            source: default_source(),
            show_onboarding: default_show_onboarding(),
        }
    }
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 400 }
fn default_sensitivity() -> f32 { 3.0 }
fn default_palette() -> usize { 4 }
fn default_source() -> AudioSource { AudioSource::Microphone }
fn default_show_onboarding() -> bool { true }

/// Where settings live: explicit path, then `spectro.toml` next to the
/// working directory, then the platform config dir (created on first save).
pub fn resolve_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path);
    }
    let local = PathBuf::from("spectro.toml");
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|dir| dir.join("spectro").join("config.toml"))
}

pub fn load(path: &Path) -> Option<Settings> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            log::warn!("ignoring malformed config {}: {e}", path.display());
            None
        }
    }
}

pub fn store(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let content = toml::to_string_pretty(settings)?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.window_width, 800);
        assert_eq!(settings.window_height, 400);
        assert_eq!(settings.sensitivity, 3.0);
        assert_eq!(settings.palette, 4);
        assert_eq!(settings.source, AudioSource::Microphone);
        assert!(settings.show_onboarding);
    }

    #[test]
    fn partial_file_keeps_remaining_defaults() {
        let settings: Settings =
            toml::from_str("sensitivity = 7.5\nsource = \"speaker\"").unwrap();
        assert_eq!(settings.sensitivity, 7.5);
        assert_eq!(settings.source, AudioSource::Speaker);
        assert_eq!(settings.palette, 4);
    }

    #[test]
    fn settings_round_trip_through_toml() {
        let mut settings = Settings::default();
        settings.palette = 12;
        settings.show_onboarding = false;

        let text = toml::to_string_pretty(&settings).unwrap();
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.palette, 12);
        assert!(!back.show_onboarding);
    }
}
