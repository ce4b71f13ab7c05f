//! Persisted volume settings

use std::fs;
use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Linear volume multipliers in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VolumeSettings {
    pub master: f32,
    pub music: f32,
    pub sfx: f32,
}

impl Default for VolumeSettings {
    fn default() -> Self {
        Self {
            master: 1.0,
            music: 1.0,
            sfx: 1.0,
        }
    }
}

impl VolumeSettings {
    /// Copy with every multiplier clamped to [0, 1]
    pub fn clamped(self) -> Self {
        Self {
            master: clamp01(self.master),
            music: clamp01(self.music),
            sfx: clamp01(self.sfx),
        }
    }
}

pub(crate) fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Volume settings storage errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to access volume settings at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed volume settings: {0}")]
    Format(#[from] serde_json::Error),
}

/// Where volume settings live between runs
pub trait VolumeStore: Send {
    /// `Ok(None)` when nothing was saved yet
    fn load(&self) -> Result<Option<VolumeSettings>, SettingsError>;
    fn save(&mut self, settings: &VolumeSettings) -> Result<(), SettingsError>;
}

/// JSON file on disk
#[derive(Debug, Clone)]
pub struct JsonVolumeStore {
    path: PathBuf,
}

impl JsonVolumeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl VolumeStore for JsonVolumeStore {
    fn load(&self) -> Result<Option<VolumeSettings>, SettingsError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(SettingsError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let settings: VolumeSettings = serde_json::from_str(&raw)?;
        Ok(Some(settings.clamped()))
    }

    fn save(&mut self, settings: &VolumeSettings) -> Result<(), SettingsError> {
        let raw = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, raw).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

/// Keeps settings for the lifetime of the process only
#[derive(Debug, Clone, Default)]
pub struct MemoryVolumeStore {
    saved: Option<VolumeSettings>,
}

impl VolumeStore for MemoryVolumeStore {
    fn load(&self) -> Result<Option<VolumeSettings>, SettingsError> {
        Ok(self.saved)
    }

    fn save(&mut self, settings: &VolumeSettings) -> Result<(), SettingsError> {
        self.saved = Some(*settings);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("volume-{}.json", Uuid::new_v4()))
    }

    #[test]
    fn missing_file_loads_nothing() {
        let store = JsonVolumeStore::new(temp_path());
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn json_store_round_trip() {
        let path = temp_path();
        let mut store = JsonVolumeStore::new(&path);
        let settings = VolumeSettings {
            master: 0.5,
            music: 0.25,
            sfx: 1.0,
        };
        store.save(&settings).unwrap();

        let reopened = JsonVolumeStore::new(&path);
        assert_eq!(reopened.load().unwrap(), Some(settings));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn out_of_range_values_are_clamped_on_load() {
        let path = temp_path();
        fs::write(&path, r#"{"master": 3.0, "music": -1.0}"#).unwrap();
        let loaded = JsonVolumeStore::new(&path).load().unwrap().unwrap();
        assert_eq!(loaded.master, 1.0);
        assert_eq!(loaded.music, 0.0);
        assert_eq!(loaded.sfx, 1.0);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let path = temp_path();
        fs::write(&path, "not json").unwrap();
        let err = JsonVolumeStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::Format(_)));
        let _ = fs::remove_file(path);
    }
}
