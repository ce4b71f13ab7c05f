//! Audio mixing - sound library, category volumes, music cross-fade
//!
//! Playback itself belongs to the host; the mixer only decides what to play,
//! at which volume, and forwards requests to an [`AudioSink`].

pub mod settings;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use self::settings::{clamp01, VolumeSettings, VolumeStore};

/// Sound categories, one playback channel each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundCategory {
    Music,
    Ui,
    Sfx,
    Voice,
    Ambient,
}

impl Default for SoundCategory {
    fn default() -> Self {
        Self::Sfx
    }
}

/// Mixer buses that take a decibel level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MixerBus {
    Master,
    Music,
    Sfx,
}

impl MixerBus {
    /// Exposed parameter name on the host mixer
    pub fn parameter(self) -> &'static str {
        match self {
            Self::Master => "MasterVolume",
            Self::Music => "MusicVolume",
            Self::Sfx => "SFXVolume",
        }
    }
}

/// A sound the library can play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundDefinition {
    pub id: String,
    /// Asset key understood by the host
    pub clip: String,
    #[serde(default)]
    pub category: SoundCategory,
    #[serde(default = "one")]
    pub volume: f32,
    #[serde(default = "one")]
    pub pitch: f32,
    #[serde(default)]
    pub looped: bool,
    /// 0 = 2D, 1 = fully 3D
    #[serde(default)]
    pub spatial_blend: f32,
    #[serde(default = "one")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

fn one() -> f32 {
    1.0
}

fn default_max_distance() -> f32 {
    500.0
}

impl SoundDefinition {
    pub fn new(id: &str, category: SoundCategory) -> Self {
        Self {
            id: id.to_string(),
            clip: id.to_string(),
            category,
            volume: 1.0,
            pitch: 1.0,
            looped: false,
            spatial_blend: 0.0,
            min_distance: 1.0,
            max_distance: default_max_distance(),
        }
    }
}

/// What the host is asked to play
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub id: String,
    pub clip: String,
    pub volume: f32,
    pub pitch: f32,
    pub looped: bool,
    pub spatial_blend: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// Audio hardware provided by the host
pub trait AudioSink: Send {
    fn set_bus_level(&mut self, bus: MixerBus, decibels: f32);
    /// Play on the category channel, replacing what it was playing
    fn play(&mut self, category: SoundCategory, request: &PlayRequest);
    /// Fire-and-forget positional sound on its own source
    fn play_spatial(&mut self, request: &PlayRequest);
    fn stop(&mut self, category: SoundCategory);
    fn set_channel_volume(&mut self, category: SoundCategory, volume: f32);
    fn is_playing(&self, category: SoundCategory) -> bool;
}

/// Linear volume to decibels, floored at -80 dB
pub fn linear_to_decibel(volume: f32) -> f32 {
    if volume <= 0.0 {
        -80.0
    } else {
        volume.log10() * 20.0
    }
}

/// Sound definitions keyed by id
#[derive(Debug, Default)]
pub struct SoundLibrary {
    sounds: HashMap<String, SoundDefinition>,
}

impl SoundLibrary {
    /// Build from definitions; a duplicate id keeps the first registration
    pub fn new(definitions: impl IntoIterator<Item = SoundDefinition>) -> Self {
        let mut sounds = HashMap::new();
        for sound in definitions {
            if sounds.contains_key(&sound.id) {
                warn!(sound_id = %sound.id, "Duplicate sound id ignored");
                continue;
            }
            sounds.insert(sound.id.clone(), sound);
        }
        Self { sounds }
    }

    pub fn get(&self, id: &str) -> Option<&SoundDefinition> {
        self.sounds.get(id)
    }

    pub fn len(&self) -> usize {
        self.sounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sounds.is_empty()
    }
}

/// Music fade-out in progress, followed by the next track
#[derive(Debug, Clone)]
struct MusicFade {
    start_volume: f32,
    elapsed: f32,
    duration: f32,
    next: String,
}

/// Music fade-out duration (seconds)
pub const MUSIC_FADE_SECS: f32 = 1.0;

/// Owned audio context: library, volumes, and the host sink
pub struct AudioMixer {
    library: SoundLibrary,
    volumes: VolumeSettings,
    store: Box<dyn VolumeStore>,
    sink: Box<dyn AudioSink>,
    playing: HashMap<SoundCategory, String>,
    channel_volume: HashMap<SoundCategory, f32>,
    fade: Option<MusicFade>,
}

impl AudioMixer {
    /// Load persisted volumes (defaults on a missing or unreadable store)
    /// and push them to the host mixer.
    pub fn new(library: SoundLibrary, store: Box<dyn VolumeStore>, sink: Box<dyn AudioSink>) -> Self {
        let volumes = match store.load() {
            Ok(Some(saved)) => saved.clamped(),
            Ok(None) => VolumeSettings::default(),
            Err(e) => {
                warn!(error = %e, "Volume settings unavailable, using defaults");
                VolumeSettings::default()
            }
        };

        let mut mixer = Self {
            library,
            volumes,
            store,
            sink,
            playing: HashMap::new(),
            channel_volume: HashMap::new(),
            fade: None,
        };
        mixer.push_bus_levels();
        mixer
    }

    pub fn volumes(&self) -> VolumeSettings {
        self.volumes
    }

    pub fn library(&self) -> &SoundLibrary {
        &self.library
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Clip id currently assigned to a channel
    pub fn playing(&self, category: SoundCategory) -> Option<&str> {
        self.playing.get(&category).map(String::as_str)
    }

    pub fn set_master_volume(&mut self, volume: f32) {
        self.volumes.master = clamp01(volume);
        self.sink
            .set_bus_level(MixerBus::Master, linear_to_decibel(self.volumes.master));
        self.persist();
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.volumes.music = clamp01(volume);
        self.sink
            .set_bus_level(MixerBus::Music, linear_to_decibel(self.volumes.music));
        self.persist();
    }

    pub fn set_sfx_volume(&mut self, volume: f32) {
        self.volumes.sfx = clamp01(volume);
        self.sink
            .set_bus_level(MixerBus::Sfx, linear_to_decibel(self.volumes.sfx));
        self.persist();
    }

    /// Definition volume scaled by its category and the master volume
    pub fn adjusted_volume(&self, sound: &SoundDefinition) -> f32 {
        let category = match sound.category {
            SoundCategory::Music => self.volumes.music,
            SoundCategory::Ui | SoundCategory::Sfx | SoundCategory::Voice | SoundCategory::Ambient => {
                self.volumes.sfx
            }
        };
        sound.volume * category * self.volumes.master
    }

    /// Play a sound by id. Unknown ids are logged and skipped.
    pub fn play_sound(&mut self, id: &str) -> bool {
        let Some(sound) = self.library.get(id).cloned() else {
            warn!(sound_id = %id, "Sound not found");
            return false;
        };

        let request = self.request_for(&sound);
        if sound.spatial_blend > 0.0 {
            self.sink.play_spatial(&request);
        } else {
            self.start_on_channel(sound.category, request);
        }
        true
    }

    /// Stop every channel currently playing `id`
    pub fn stop_sound(&mut self, id: &str) {
        let channels: Vec<SoundCategory> = self
            .playing
            .iter()
            .filter(|(_, clip)| clip.as_str() == id)
            .map(|(category, _)| *category)
            .collect();
        for category in channels {
            self.stop_category(category);
        }
    }

    pub fn stop_category(&mut self, category: SoundCategory) {
        self.sink.stop(category);
        self.playing.remove(&category);
        if category == SoundCategory::Music {
            self.fade = None;
        }
    }

    /// Switch music. A playing track fades out first.
    pub fn play_music(&mut self, id: &str) -> bool {
        if self.library.get(id).is_none() {
            warn!(sound_id = %id, "Music track not found");
            return false;
        }

        if let Some(fade) = self.fade.as_mut() {
            fade.next = id.to_string();
            return true;
        }

        if self.sink.is_playing(SoundCategory::Music) {
            let start_volume = self
                .channel_volume
                .get(&SoundCategory::Music)
                .copied()
                .unwrap_or(1.0);
            debug!(next = %id, "Fading out current music");
            self.fade = Some(MusicFade {
                start_volume,
                elapsed: 0.0,
                duration: MUSIC_FADE_SECS,
                next: id.to_string(),
            });
        } else {
            self.start_music(id);
        }
        true
    }

    /// Advance timed audio effects by one tick
    pub fn update(&mut self, dt: f32) {
        let Some(fade) = self.fade.as_mut() else {
            return;
        };

        fade.elapsed += dt.max(0.0);
        let progress = (fade.elapsed / fade.duration).min(1.0);
        let volume = fade.start_volume * (1.0 - progress);
        let done = fade.elapsed >= fade.duration;
        let (start_volume, next) = (fade.start_volume, fade.next.clone());

        self.sink.set_channel_volume(SoundCategory::Music, volume);
        if done {
            self.fade = None;
            self.sink.stop(SoundCategory::Music);
            self.sink.set_channel_volume(SoundCategory::Music, start_volume);
            self.playing.remove(&SoundCategory::Music);
            self.start_music(&next);
        }
    }

    fn start_music(&mut self, id: &str) {
        if let Some(sound) = self.library.get(id).cloned() {
            let request = self.request_for(&sound);
            self.start_on_channel(SoundCategory::Music, request);
        }
    }

    fn start_on_channel(&mut self, category: SoundCategory, request: PlayRequest) {
        self.channel_volume.insert(category, request.volume);
        self.playing.insert(category, request.id.clone());
        self.sink.play(category, &request);
    }

    fn request_for(&self, sound: &SoundDefinition) -> PlayRequest {
        PlayRequest {
            id: sound.id.clone(),
            clip: sound.clip.clone(),
            volume: self.adjusted_volume(sound),
            pitch: sound.pitch,
            looped: sound.looped,
            spatial_blend: sound.spatial_blend,
            min_distance: sound.min_distance,
            max_distance: sound.max_distance,
        }
    }

    fn push_bus_levels(&mut self) {
        let v = self.volumes;
        self.sink.set_bus_level(MixerBus::Master, linear_to_decibel(v.master));
        self.sink.set_bus_level(MixerBus::Music, linear_to_decibel(v.music));
        self.sink.set_bus_level(MixerBus::Sfx, linear_to_decibel(v.sfx));
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.volumes) {
            warn!(error = %e, "Failed to persist volume settings");
        }
    }
}
