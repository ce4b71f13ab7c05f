//! Stand-ins for engine collaborators, used by the headless session

pub mod body;
pub mod probe;
pub mod sinks;

pub use body::{BodyStats, KinematicBody};
pub use probe::SceneProbe;
pub use sinks::{TracingAmmoSink, TracingAnimationSink, TracingAudioSink};
