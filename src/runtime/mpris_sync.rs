use crate::mpris::{MprisHandle, PlaybackStatus};
use crate::player::PlayerState;

pub fn update_mpris(mpris: &MprisHandle, state: &PlayerState) {
    mpris.set_track_metadata(state.current_index(), state.current_track(), state.duration());
    mpris.set_playback(PlaybackStatus::of(state));
    mpris.set_modes(state.is_shuffled(), state.is_repeating());
    mpris.set_volume(state.volume().level(), state.volume().is_muted());
}
