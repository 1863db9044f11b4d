//! The message boundary between the state machine and the media binding.
//!
//! Commands flow down, events flow up. Commands are collected in an
//! `Outbox` and delivered in order once per commit; consecutive commands of
//! the same kind collapse into the newest one.

use super::state::LoadTag;

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCmd {
    /// Replace the handle's source. Playback starts only when `autoplay`.
    Load {
        tag: LoadTag,
        url: String,
        start_at: f64,
        autoplay: bool,
    },
    Play,
    Pause,
    Seek { seconds: f64, seq: u64 },
    SetVolume { level: u8, muted: bool },
    /// Drop the current source and go silent.
    Unload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CmdKind {
    Load,
    Transport,
    Seek,
    Volume,
    Unload,
}

impl MediaCmd {
    fn kind(&self) -> CmdKind {
        match self {
            MediaCmd::Load { .. } => CmdKind::Load,
            MediaCmd::Play | MediaCmd::Pause => CmdKind::Transport,
            MediaCmd::Seek { .. } => CmdKind::Seek,
            MediaCmd::SetVolume { .. } => CmdKind::Volume,
            MediaCmd::Unload => CmdKind::Unload,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Playback position report. `seek_seq` is the last seek the binding
    /// had processed when it took the reading.
    TimeAdvanced {
        tag: LoadTag,
        seconds: f64,
        seek_seq: u64,
    },
    MetadataReady { tag: LoadTag, duration: f64 },
    /// The source drained. Stamped like `TimeAdvanced`.
    Ended { tag: LoadTag, seek_seq: u64 },
    SourceError { tag: LoadTag, message: String },
}

impl MediaEvent {
    pub fn tag(&self) -> &LoadTag {
        match self {
            MediaEvent::TimeAdvanced { tag, .. }
            | MediaEvent::MetadataReady { tag, .. }
            | MediaEvent::Ended { tag, .. }
            | MediaEvent::SourceError { tag, .. } => tag,
        }
    }
}

/// Pending commands for the binding.
#[derive(Debug, Default)]
pub struct Outbox {
    cmds: Vec<MediaCmd>,
}

impl Outbox {
    pub fn push(&mut self, cmd: MediaCmd) {
        match self.cmds.last_mut() {
            Some(last) if last.kind() == cmd.kind() => *last = cmd,
            _ => self.cmds.push(cmd),
        }
    }

    pub fn take(&mut self) -> Vec<MediaCmd> {
        std::mem::take(&mut self.cmds)
    }
}
