//! Headless player controller core
//!
//! Movement and jumping, weapon slots with fire/reload, world weapon pickup,
//! and the audio mixer, driven one deterministic tick at a time. Engine
//! collaborators are reached through the traits in [`ports`].

pub mod audio;
pub mod bot;
pub mod config;
pub mod game;
pub mod host;
pub mod input;
pub mod math;
pub mod ports;
pub mod util;
