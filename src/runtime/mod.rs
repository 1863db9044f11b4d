use std::env;
use std::sync::mpsc;
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;
use crate::logging;
use crate::mpris::ControlCmd;
use crate::player::{
    Action, DisabledBinding, EngineOptions, Machine, MediaBinding, MediaEvent, Player,
};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, settings_warning) = settings::load_settings();

    let arg = env::args().nth(1);
    if arg.as_deref() == Some("--print-config") {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    logging::init(&settings.logging.level, settings.log_path().as_deref());
    if let Some(msg) = settings_warning {
        warn!("{msg}");
    }

    let cli_tracks = startup::tracks_from_arg(arg.as_deref(), &settings)?;
    let (restored, writer) = startup::open_session(&settings);

    let mut machine = Machine::new(EngineOptions {
        shuffle: settings.playback.shuffle,
        repeat: settings.playback.repeat,
        volume: settings.playback.volume,
    });
    if let Some(snapshot) = restored {
        if machine.restore(snapshot) {
            info!(tracks = machine.state().queue().len(), "restored session");
        }
    }
    if let Some(tracks) = cli_tracks {
        machine.apply(Action::SetQueue { tracks, start: 0 });
    }

    let (event_tx, event_rx) = mpsc::channel::<MediaEvent>();
    let binding: Box<dyn MediaBinding> = match AudioPlayer::spawn(&settings.audio, event_tx) {
        Ok(audio) => Box::new(audio),
        Err(e) => {
            warn!(error = %e, "audio output unavailable, running disabled");
            Box::new(DisabledBinding::new(e.to_string()))
        }
    };
    let mut player = Player::new(machine, binding, writer);
    player.commit();

    let mut app = App::new(settings.ui.follow_playback);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);
    mpris_sync::update_mpris(&mpris, player.state());

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &mut player,
        &mpris,
        &event_rx,
        &control_rx,
    );

    player.shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
