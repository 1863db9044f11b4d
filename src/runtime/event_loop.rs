use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::debug;

use crate::app::{App, Intent};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::player::{Action, MediaEvent, Player, PlayerState};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// Main terminal event loop: folds audio events, applies MPRIS and key
/// input, and redraws. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &mut Player,
    mpris: &MprisHandle,
    events: &mpsc::Receiver<MediaEvent>,
    control_rx: &mpsc::Receiver<ControlCmd>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = events.try_recv() {
            player.handle_event(ev);
        }

        while let Ok(cmd) = control_rx.try_recv() {
            debug!(?cmd, "mpris command");
            match control_action(cmd, player.state()) {
                Some(Intent::Quit) => return Ok(()),
                Some(Intent::Player(action)) => player.dispatch(action),
                None => {}
            }
        }

        // Repeated scrub keys within one frame become a single seek.
        if let Some(delta) = app.take_scrub() {
            player.dispatch(Action::SeekBy(delta));
        }

        player.commit();
        app.sync_cursor(player.state());
        update_mpris(mpris, player.state());

        let disabled = player.disabled();
        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                player.state(),
                disabled.as_ref(),
                &settings.ui,
                &settings.controls,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            loop {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        match app.on_key(key, player.state(), &settings.controls) {
                            Some(Intent::Quit) => return Ok(()),
                            Some(Intent::Player(action)) => player.dispatch(action),
                            None => {}
                        }
                    }
                }
                if !event::poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}

/// Map an MPRIS request onto the player. Play with nothing selected starts
/// the queue from the top.
fn control_action(cmd: ControlCmd, state: &PlayerState) -> Option<Intent> {
    let action = match cmd {
        ControlCmd::Quit => return Some(Intent::Quit),
        ControlCmd::Play | ControlCmd::PlayPause if state.selection().is_none() => {
            let track = state.queue().first()?.clone();
            Action::PlayTrack {
                track,
                context: None,
            }
        }
        ControlCmd::Play => Action::Play,
        ControlCmd::Pause => Action::Pause,
        ControlCmd::PlayPause => Action::TogglePlay,
        ControlCmd::Stop => Action::Stop,
        ControlCmd::Next => Action::Next,
        ControlCmd::Prev => Action::Prev,
        ControlCmd::SetShuffle(on) => Action::SetShuffle(on),
        ControlCmd::SetRepeat(on) => Action::SetRepeat(on),
        ControlCmd::SetVolume(v) => {
            let level = if v.is_finite() { (v * 100.0).round() } else { 0.0 };
            Action::SetVolume(level.clamp(-1.0, 101.0) as i32)
        }
    };
    Some(Intent::Player(action))
}
