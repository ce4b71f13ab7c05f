//! Gameplay tuning, loaded from an optional JSON document

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::{SoundCategory, SoundDefinition};
use crate::game::arsenal::ReplacementPolicy;
use crate::game::camera::LookTuning;
use crate::game::locomotion::MovementTuning;
use crate::game::pickup::PickupTuning;
use crate::game::weapon::WeaponStats;

use super::ConfigError;

/// Weapon handling tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponTuning {
    /// Minimum time between weapon switches (seconds)
    pub switch_cooldown: f32,
    /// How long the Firing state holds after a shot (seconds)
    pub fire_state_duration: f32,
    /// Firing an empty weapon starts a reload
    pub auto_reload: bool,
    pub replacement_policy: ReplacementPolicy,
    /// Weapon kinds known to the session
    pub catalog: Vec<WeaponStats>,
    /// Weapon names the player starts with
    pub loadout: Vec<String>,
    /// Weapon names placed in the world at start
    pub world_spawns: Vec<String>,
}

impl Default for WeaponTuning {
    fn default() -> Self {
        Self {
            switch_cooldown: 0.1,
            fire_state_duration: 0.25,
            auto_reload: true,
            replacement_policy: ReplacementPolicy::default(),
            catalog: vec![
                WeaponStats::rifle(),
                WeaponStats::pistol(),
                WeaponStats::knife(),
            ],
            loadout: vec!["Rifle".to_string(), "Knife".to_string()],
            world_spawns: vec!["Pistol".to_string(), "Rifle".to_string()],
        }
    }
}

/// Sound library and gameplay cue ids
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioTuning {
    pub sounds: Vec<SoundDefinition>,
    pub jump_sound: Option<String>,
    pub pickup_sound: Option<String>,
    /// Track started with the session
    pub music: Option<String>,
}

impl Default for AudioTuning {
    fn default() -> Self {
        let mut music = SoundDefinition::new("theme", SoundCategory::Music);
        music.looped = true;
        let sfx = [
            "rifle_fire",
            "rifle_reload",
            "pistol_fire",
            "pistol_reload",
            "knife_swing",
            "jump",
        ];
        let mut sounds: Vec<SoundDefinition> = sfx
            .iter()
            .map(|id| SoundDefinition::new(id, SoundCategory::Sfx))
            .collect();
        sounds.push(SoundDefinition::new("pickup", SoundCategory::Ui));
        sounds.push(music);

        Self {
            sounds,
            jump_sound: Some("jump".to_string()),
            pickup_sound: Some("pickup".to_string()),
            music: Some("theme".to_string()),
        }
    }
}

/// Everything that shapes how the controller plays
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerTuning {
    pub movement: MovementTuning,
    pub look: LookTuning,
    pub weapons: WeaponTuning,
    pub pickup: PickupTuning,
    pub audio: AudioTuning,
}

impl ControllerTuning {
    /// Read a tuning document. Absent fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::TuningRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(ConfigError::TuningFormat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_all_defaults() {
        let tuning = ControllerTuning::from_json("{}").unwrap();
        assert_eq!(tuning.movement.jump_force, 7.0);
        assert_eq!(tuning.weapons.switch_cooldown, 0.1);
        assert_eq!(tuning.pickup.distance, 3.0);
        assert_eq!(tuning.weapons.replacement_policy, ReplacementPolicy::ReturnToWorld);
    }

    #[test]
    fn partial_document_overrides_fields() {
        let tuning = ControllerTuning::from_json(
            r#"{
                "movement": { "speeds": { "running": 10.0 }, "jump_states": ["idle", "aiming"] },
                "weapons": { "replacement_policy": "destroy", "loadout": [] }
            }"#,
        )
        .unwrap();
        assert_eq!(tuning.movement.speeds.running, 10.0);
        assert_eq!(tuning.movement.speeds.walking, 5.0);
        assert!(tuning.weapons.loadout.is_empty());
        assert_eq!(tuning.weapons.replacement_policy, ReplacementPolicy::Destroy);
    }

    #[test]
    fn malformed_document_is_rejected() {
        let err = ControllerTuning::from_json(r#"{"movement": 3}"#).unwrap_err();
        assert!(matches!(err, ConfigError::TuningFormat(_)));
    }

    #[test]
    fn missing_file_is_reported() {
        let err = ControllerTuning::from_file(Path::new("/nonexistent/tuning.json")).unwrap_err();
        assert!(matches!(err, ConfigError::TuningRead { .. }));
    }
}
