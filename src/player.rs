//! Playback engine: queue, current track, transport and volume.
//!
//! `Machine` owns the state and decides; a `MediaBinding` makes sound;
//! `Player` glues the two together and persists the session.

mod binding;
mod command;
mod error;
mod facade;
mod machine;
mod state;
mod volume;

pub use binding::{DisabledBinding, MediaBinding};
pub use command::{MediaCmd, MediaEvent};
pub use error::PlaybackError;
pub use facade::Player;
pub use machine::{Action, EngineOptions, Machine};
pub use state::{LoadTag, PlayerState};
pub use volume::Volume;
