//! State shared by everything in a session, passed down explicitly

use crate::audio::AudioMixer;

use super::catalog::WeaponCatalog;
use super::pickup::WorldWeapons;

/// Owned by the session and lent to each controller tick
pub struct GameContext {
    pub world: WorldWeapons,
    pub audio: AudioMixer,
    pub catalog: WeaponCatalog,
}

impl GameContext {
    pub fn new(world: WorldWeapons, audio: AudioMixer, catalog: WeaponCatalog) -> Self {
        Self {
            world,
            audio,
            catalog,
        }
    }

    /// Play an optional cue; `None` means the cue is not configured
    pub fn play_cue(&mut self, sound: Option<&str>) {
        if let Some(id) = sound {
            self.audio.play_sound(id);
        }
    }
}
