//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Clear, Gauge, LineGauge, List, ListItem, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::config::{ControlsSettings, TimeField, UiSettings};
use crate::library::{display_from_fields, format_duration_label};
use crate::player::{PlaybackError, PlayerState};

const CONTROLS: &[(&str, &str)] = &[
    ("j/k", "up/down"),
    ("gg/G", "top/bottom"),
    ("zz", "jump to playing"),
    ("enter", "play selected"),
    ("space/p", "play/pause"),
    ("h/l", "prev/next"),
    ("S", "stop"),
    ("s", "shuffle"),
    ("r", "repeat"),
    ("m", "mute"),
    ("0-9", "volume 0-90%"),
    ("c", "clear selection"),
    ("?", "help"),
    ("q", "quit"),
];

/// Render the controls help text, incorporating the configured steps.
fn controls_lines(controls: &ControlsSettings) -> Vec<String> {
    let mut lines: Vec<String> = CONTROLS
        .iter()
        .map(|(k, v)| format!("{k:>8}  {v}"))
        .collect();
    lines.push(format!("{:>8}  scrub -/+{}s", "H/L", controls.scrub_seconds));
    lines.push(format!("{:>8}  volume -/+{}", "-/+", controls.volume_step));
    lines
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(elapsed: f64, total: f64, ui: &UiSettings) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_duration_label(elapsed)),
            TimeField::Total => {
                if total > 0.0 {
                    parts.push(format_duration_label(total));
                }
            }
            TimeField::Remaining => {
                if total > 0.0 {
                    parts.push(format!("-{}", format_duration_label(total - elapsed)));
                }
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

fn status_text(state: &PlayerState, app: &App) -> String {
    let mut parts: Vec<String> = Vec::new();

    let transport = if state.selection().is_none() {
        "Stopped"
    } else if state.is_seeking() {
        "Seeking"
    } else if state.is_playing() {
        "Playing"
    } else {
        "Paused"
    };
    parts.push(transport.to_string());

    parts.push(format!(
        "Shuffle: {}",
        if state.is_shuffled() { "ON" } else { "OFF" }
    ));
    parts.push(format!(
        "Repeat: {}",
        if state.is_repeating() { "ON" } else { "OFF" }
    ));

    if app.follow_playback {
        parts.push("CURSOR: Follow".to_string());
    } else {
        parts.push("CURSOR: Free-roam".to_string());
    }

    parts.push(format!("Queue: {}", state.queue().len()));
    parts.join(" • ")
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

fn padded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding {
            left: 1,
            right: 0,
            top: 0,
            bottom: 0,
        })
}

/// Render the entire UI into the provided `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    state: &PlayerState,
    disabled: Option<&PlaybackError>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(7),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" echodune ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, chunks[1], app, state, disabled, ui_settings);
    draw_queue(frame, chunks[2], app, state, ui_settings);

    if app.show_help {
        let lines = controls_lines(controls_settings);
        let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX);
        let popup_area = centered_rect_sized(40, height, chunks[2]);
        frame.render_widget(Clear, popup_area);
        let help = Paragraph::new(lines.join("\n")).block(padded(" help (? closes) "));
        frame.render_widget(help, popup_area);
    }

    let footer = Paragraph::new("[?] help | [space] play/pause | [h/l] prev/next | [q] quit")
        .block(padded(" controls "))
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[3]);
}

fn draw_now_playing(
    frame: &mut Frame,
    area: Rect,
    app: &App,
    state: &PlayerState,
    disabled: Option<&PlaybackError>,
    ui: &UiSettings,
) {
    let block = padded(" now playing ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let song = match state.current_track() {
        Some(track) => display_from_fields(
            track,
            &ui.now_playing_track_fields,
            &ui.now_playing_track_separator,
        ),
        None => "Nothing selected".to_string(),
    };
    let song_line = if state.current_track().is_some() && state.current_index().is_none() {
        format!("{song} (not in queue)")
    } else {
        song
    };
    frame.render_widget(Paragraph::new(song_line).bold(), rows[0]);

    let time = now_playing_time_text(state.current_time(), state.duration(), ui)
        .unwrap_or_default();
    let progress = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(state.progress())
        .label(time);
    frame.render_widget(progress, rows[1]);

    let volume = state.volume();
    let volume_label = if volume.is_muted() {
        format!("vol {}% (muted)", volume.level())
    } else {
        format!("vol {}%", volume.level())
    };
    let volume_ratio = if volume.is_muted() {
        0.0
    } else {
        f64::from(volume.level()) / 100.0
    };
    let volume_gauge = LineGauge::default()
        .filled_style(Style::default().fg(Color::Green))
        .ratio(volume_ratio)
        .label(Line::from(volume_label));
    frame.render_widget(volume_gauge, rows[2]);

    frame.render_widget(Paragraph::new(status_text(state, app)), rows[3]);

    let notice = match (disabled, state.error()) {
        (Some(e), _) => Some(format!("{e} (player disabled)")),
        (None, Some(e)) => Some(format!("{e} (press space to retry)")),
        (None, None) => None,
    };
    if let Some(notice) = notice {
        frame.render_widget(Paragraph::new(notice).fg(Color::Red), rows[4]);
    }
}

fn draw_queue(frame: &mut Frame, area: Rect, app: &App, state: &PlayerState, ui: &UiSettings) {
    let queue = state.queue();
    let playing = state.current_index();

    // Only build ListItems for the visible window, centered on the cursor.
    let total = queue.len();
    let list_height = area.height.saturating_sub(2) as usize;
    let sel_pos = app.cursor.min(total.saturating_sub(1));
    let (start, end, selected_pos_in_visible) = if total <= list_height || list_height == 0 {
        (0, total, sel_pos)
    } else {
        let half = list_height / 2;
        let mut start = sel_pos.saturating_sub(half);
        if start + list_height > total {
            start = total - list_height;
        }
        (start, start + list_height, sel_pos - start)
    };

    let visible_items: Vec<ListItem> = queue[start..end]
        .iter()
        .enumerate()
        .map(|(offset, track)| {
            let i = start + offset;
            let text = display_from_fields(track, &ui.queue_fields, &ui.queue_separator);
            let marker = if playing == Some(i) { "♪ " } else { "  " };
            let duration = track.duration_label.as_deref().unwrap_or("");
            let item = ListItem::new(format!("{marker}{text}  {duration}"));
            if playing == Some(i) {
                item.style(Style::default().add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let list = List::new(visible_items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" queue ({total}) ")),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut list_state = ratatui::widgets::ListState::default();
    if total > 0 {
        list_state.select(Some(selected_pos_in_visible));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}
