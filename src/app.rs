//! Terminal UI view state.
//!
//! Cursor position, help overlay and pending key prefixes live here. None of
//! it is playback state and none of it is persisted; keys are translated
//! into player `Action`s for the runtime to dispatch.

mod model;

pub use model::*;
