//! Log-backed presentation sinks for running without an engine

use std::collections::HashSet;

use tracing::{debug, info, trace};

use crate::audio::{AudioSink, MixerBus, PlayRequest, SoundCategory};
use crate::game::presentation::{AmmoStatus, AnimationFrame};
use crate::ports::{AmmoSink, AnimationSink};

/// Logs animation frames that carry triggers
#[derive(Debug, Default)]
pub struct TracingAnimationSink;

impl AnimationSink for TracingAnimationSink {
    fn present(&mut self, frame: &AnimationFrame) {
        if frame.triggers.is_empty() {
            trace!(state = ?frame.state, move_x = frame.move_x, move_y = frame.move_y, "Animation frame");
        } else {
            debug!(state = ?frame.state, triggers = ?frame.triggers, "Animation triggers");
        }
    }
}

/// Logs the HUD ammo readout
#[derive(Debug, Default)]
pub struct TracingAmmoSink;

impl AmmoSink for TracingAmmoSink {
    fn ammo_changed(&mut self, status: Option<&AmmoStatus>) {
        match status {
            Some(s) => info!(
                weapon = %s.weapon,
                ammo = s.ammo,
                max_ammo = s.max_ammo,
                reloading = s.reloading,
                "Ammo"
            ),
            None => info!("No weapon equipped"),
        }
    }
}

/// Audio output that logs requests and tracks which channels are busy
#[derive(Debug, Default)]
pub struct TracingAudioSink {
    busy: HashSet<SoundCategory>,
}

impl AudioSink for TracingAudioSink {
    fn set_bus_level(&mut self, bus: MixerBus, decibels: f32) {
        debug!(parameter = bus.parameter(), decibels, "Mixer bus level");
    }

    fn play(&mut self, category: SoundCategory, request: &PlayRequest) {
        debug!(category = ?category, clip = %request.clip, volume = request.volume, "Play");
        self.busy.insert(category);
    }

    fn play_spatial(&mut self, request: &PlayRequest) {
        debug!(clip = %request.clip, volume = request.volume, "Play at point");
    }

    fn stop(&mut self, category: SoundCategory) {
        self.busy.remove(&category);
    }

    fn set_channel_volume(&mut self, category: SoundCategory, volume: f32) {
        trace!(category = ?category, volume, "Channel volume");
    }

    fn is_playing(&self, category: SoundCategory) -> bool {
        self.busy.contains(&category)
    }
}
