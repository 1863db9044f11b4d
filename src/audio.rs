//! rodio-backed media binding.
//!
//! Decoding and output run on a dedicated thread that owns the output
//! stream and a single `Sink`. Commands arrive over a channel; position,
//! metadata, end-of-track and failures go back as `MediaEvent`s.

mod player;
mod source;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::AudioError;

#[cfg(test)]
mod tests;
