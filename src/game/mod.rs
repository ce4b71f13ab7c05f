//! Gameplay simulation modules

pub mod arsenal;
pub mod camera;
pub mod catalog;
pub mod context;
pub mod controller;
pub mod events;
pub mod locomotion;
pub mod pickup;
pub mod presentation;
pub mod scheduler;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod weapon;

pub use context::GameContext;
pub use controller::{PlayerController, Senses, TickReport};
pub use session::{Session, SessionHandle, SessionStats};
