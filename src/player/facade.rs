//! The single entry point UI surfaces talk to.

use std::time::Duration;

use tracing::debug;

use crate::persist::{Snapshot, SnapshotWriter};

use super::binding::MediaBinding;
use super::command::MediaEvent;
use super::error::PlaybackError;
use super::machine::{Action, Machine};
use super::state::PlayerState;

pub struct Player {
    machine: Machine,
    binding: Box<dyn MediaBinding>,
    writer: Option<SnapshotWriter>,
    persisted_revision: Option<u64>,
    last_snapshot: Option<Snapshot>,
}

impl Player {
    pub fn new(
        machine: Machine,
        binding: Box<dyn MediaBinding>,
        writer: Option<SnapshotWriter>,
    ) -> Self {
        Self {
            machine,
            binding,
            writer,
            persisted_revision: None,
            last_snapshot: None,
        }
    }

    pub fn state(&self) -> &PlayerState {
        self.machine.state()
    }

    /// Set when no audio output exists. UI surfaces should render the
    /// player as disabled but keep showing state.
    pub fn disabled(&self) -> Option<PlaybackError> {
        self.binding
            .unavailable_reason()
            .map(|reason| PlaybackError::OutputUnavailable(reason.to_string()))
    }

    pub fn dispatch(&mut self, action: Action) {
        self.machine.apply(action);
    }

    pub fn handle_event(&mut self, event: MediaEvent) {
        self.machine.fold(event);
    }

    /// Deliver pending commands to the binding and persist the new state if
    /// it changed. Call once per batch of actions and events.
    pub fn commit(&mut self) {
        for cmd in self.machine.take_commands() {
            self.binding.send(cmd);
        }
        // Nothing will ever acknowledge a seek.
        if self.binding.unavailable_reason().is_some() {
            self.machine.settle_seek();
        }
        self.persist();
    }

    fn persist(&mut self) {
        let Some(writer) = &self.writer else {
            return;
        };
        let revision = self.machine.revision();
        if self.persisted_revision == Some(revision) {
            return;
        }
        self.persisted_revision = Some(revision);

        let snapshot = self.machine.snapshot();
        if self.last_snapshot.as_ref() == Some(&snapshot) {
            return;
        }
        writer.submit(snapshot.clone());
        self.last_snapshot = Some(snapshot);
    }

    pub fn shutdown(mut self, fade_out: Duration) {
        debug!(?fade_out, "shutting down player");
        self.commit();
        self.binding.shutdown(fade_out);
        if let Some(writer) = self.writer.take() {
            writer.finish();
        }
    }
}
