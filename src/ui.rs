//! UI rendering for the terminal user interface.
//!
//! Everything here is a pure function of the [`App`] state; input handling
//! lives in the runtime's event loop.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Text},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};

use crate::app::App;
use crate::audio::SongInfo;
use crate::config::{ControlsSettings, UiSettings};

const LEFT_PAD: Padding = Padding {
    left: 1,
    right: 0,
    top: 0,
    bottom: 0,
};

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    [
        "[space/p] play/pause".to_string(),
        "[h/l] prev/next song".to_string(),
        format!("[H/L] scrub -/+{scrub_seconds}s"),
        "[0-9] jump to 0-90%".to_string(),
        "[s] stop".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Terminals can't show the cover, so describe it instead.
fn artwork_line(song: &SongInfo) -> String {
    match &song.artwork {
        Some(art) => format!(
            "Artwork: {} ({} KiB)",
            art.kind,
            art.data.len().div_ceil(1024)
        ),
        None => "Artwork: none".to_string(),
    }
}

fn transport_text(playing: bool) -> String {
    let middle = if playing { "Pause" } else { "Play" };
    format!("[<< Prev]   [{middle}]   [Next >>]")
}

/// Visible slice of a list of `total` rows that keeps `selected` centered.
///
/// Returns `(start, end, selected_pos_in_visible)`.
fn visible_window(total: usize, height: usize, selected: usize) -> (usize, usize, usize) {
    let selected = selected.min(total.saturating_sub(1));
    if total <= height || height == 0 {
        return (0, total, selected);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height, selected - start)
}

/// Render the entire UI into `frame`.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(4),
        ])
        .split(frame.area());

    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" encore ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    draw_now_playing(frame, app, chunks[1]);

    let scrub = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().add_modifier(Modifier::BOLD))
        .ratio(app.progress())
        .label(format!("{} / {}", app.elapsed_label(), app.duration_label()));
    frame.render_widget(scrub, chunks[2]);

    let transport = Paragraph::new(transport_text(app.is_playing()))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(transport, chunks[3]);

    draw_playlist(frame, app, chunks[4]);

    let footer = Paragraph::new(controls_text(controls_settings.scrub_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(LEFT_PAD),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(footer, chunks[5]);
}

fn draw_now_playing(frame: &mut Frame, app: &App, area: Rect) {
    let song = app.song();
    let status = match (app.is_loaded(), app.is_playing()) {
        (false, _) => " unavailable ",
        (true, true) => " playing ",
        (true, false) => " paused ",
    };

    let text = Text::from(vec![
        Line::from(song.title.as_str()).bold(),
        Line::from(song.artist.as_str()),
        Line::from(artwork_line(song)).italic(),
    ]);
    let panel = Paragraph::new(text)
        .block(
            Block::bordered()
                .padding(LEFT_PAD)
                .title(" now playing ")
                .title_bottom(status),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn draw_playlist(frame: &mut Frame, app: &App, area: Rect) {
    let tracks = app.playlist().tracks();
    let height = area.height.saturating_sub(2) as usize;
    let (start, end, selected) = visible_window(tracks.len(), height, app.index());

    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .map(|t| ListItem::new(t.id.as_str()))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" playlist "))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Artwork;

    #[test]
    fn controls_text_includes_scrub_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"), "{text}");
        assert!(text.starts_with("[space/p] play/pause"));
        assert!(text.ends_with("[q] quit"));
    }

    #[test]
    fn artwork_line_reports_kind_and_size() {
        let mut song = SongInfo::placeholder();
        assert_eq!(artwork_line(&song), "Artwork: none");

        song.artwork = Some(Artwork {
            data: vec![0; 1500],
            kind: "png",
        });
        assert_eq!(artwork_line(&song), "Artwork: png (2 KiB)");
    }

    #[test]
    fn transport_shows_the_action_the_button_performs() {
        assert!(transport_text(false).contains("[Play]"));
        assert!(transport_text(true).contains("[Pause]"));
    }

    #[test]
    fn visible_window_fits_short_lists() {
        assert_eq!(visible_window(3, 10, 2), (0, 3, 2));
        assert_eq!(visible_window(3, 0, 1), (0, 3, 1));
    }

    #[test]
    fn visible_window_centers_and_clamps() {
        assert_eq!(visible_window(20, 5, 0), (0, 5, 0));
        assert_eq!(visible_window(20, 5, 10), (8, 13, 2));
        assert_eq!(visible_window(20, 5, 19), (15, 20, 4));
    }
}
