// src/ui/widgets/player_panel.rs
//! Now-playing panel widget.

use std::time::Duration;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
};

use crate::audio::RepeatMode;
use crate::catalog::Track;

/// Everything the panel needs, resolved by the app.
pub struct PlayerPanelView<'a> {
    pub track: Option<&'static Track>,
    pub playing: bool,
    pub position: Duration,
    pub duration: Option<Duration>,
    pub volume: f32,
    pub muted: bool,
    pub shuffle: bool,
    pub repeat: RepeatMode,
    pub favorite: bool,
    pub error: Option<String>,
    pub recommendations: &'a [&'static Track],
}

/// Render the player information panel.
pub fn render_player_panel(f: &mut Frame<'_>, area: Rect, view: &PlayerPanelView<'_>) {
    f.render_widget(
        Block::default().borders(Borders::ALL).title("2: Player"),
        area,
    );

    let inner = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(area);

    render_track_info(f, inner[0], view);
    render_controls(f, inner[1], view);
    render_progress(f, inner[2], view);
    render_volume(f, inner[3], view);
}

fn render_track_info(f: &mut Frame<'_>, area: Rect, view: &PlayerPanelView<'_>) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(track) = view.track {
        let heart = if view.favorite { " ♥" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(
                track.title,
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(heart, Style::default().fg(Color::Red)),
        ]));
        lines.push(Line::from(Span::styled(
            track.artist,
            Style::default().fg(Color::Gray),
        )));
        lines.push(Line::from(Span::styled(
            format!("{} ({} · {})", track.album, track.genre, track.year),
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        lines.push(Line::from("No track playing"));
    }

    lines.push(Line::from(vec![
        Span::styled(
            format!(" shuffle:{} ", if view.shuffle { "on" } else { "off" }),
            badge_style(view.shuffle),
        ),
        Span::raw(" "),
        Span::styled(
            format!(" repeat:{} ", view.repeat.label()),
            badge_style(view.repeat != RepeatMode::None),
        ),
    ]));

    if let Some(error) = &view.error {
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(Color::Red),
        )));
    }

    if !view.recommendations.is_empty() {
        lines.push(Line::from(Span::styled(
            "Up next suggestions:",
            Style::default().fg(Color::DarkGray),
        )));
        for rec in view.recommendations {
            lines.push(Line::from(Span::styled(
                format!("  {} · {}", rec.title, rec.artist),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    f.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }), area);
}

fn render_controls(f: &mut Frame<'_>, area: Rect, view: &PlayerPanelView<'_>) {
    let play_pause = if view.playing {
        Span::styled(" ⏸ ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" ⏵ ", Style::default().fg(Color::Yellow))
    };

    let controls = Line::from(vec![
        Span::styled(" ⏮ ", Style::default().fg(Color::Cyan)),
        Span::raw(" "),
        Span::styled(" ⏹ ", Style::default().fg(Color::Red)),
        Span::raw(" "),
        play_pause,
        Span::raw(" "),
        Span::styled(" ⏭ ", Style::default().fg(Color::Cyan)),
    ]);

    f.render_widget(
        Paragraph::new(controls).alignment(Alignment::Center),
        area,
    );
}

fn render_progress(f: &mut Frame<'_>, area: Rect, view: &PlayerPanelView<'_>) {
    let elapsed = view.position.as_secs();
    let total = view.duration.map(|d| d.as_secs()).unwrap_or(0).max(1);
    let ratio = (elapsed as f64 / total as f64).clamp(0.0, 1.0);
    let label = format!(
        "{:02}:{:02} / {:02}:{:02}",
        elapsed / 60,
        elapsed % 60,
        total / 60,
        total % 60
    );

    f.render_widget(
        Gauge::default()
            .gauge_style(
                Style::default()
                    .fg(Color::Magenta)
                    .add_modifier(Modifier::ITALIC),
            )
            .ratio(ratio)
            .label(label),
        area,
    );
}

fn render_volume(f: &mut Frame<'_>, area: Rect, view: &PlayerPanelView<'_>) {
    let label = if view.muted {
        "vol: muted".to_string()
    } else {
        format!("vol: {:3.0}%", view.volume * 100.0)
    };

    f.render_widget(
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Blue))
            .ratio(f64::from(view.volume.clamp(0.0, 1.0)))
            .label(label),
        area,
    );
}

fn badge_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Magenta)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}
