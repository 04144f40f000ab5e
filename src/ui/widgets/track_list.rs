// src/ui/widgets/track_list.rs
//! Catalog track listing widget.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};

use crate::catalog::{self, Track};

/// One listed row, resolved by the app from the current view.
pub struct TrackRow {
    pub track: &'static Track,
    pub is_current: bool,
    pub favorite: bool,
}

/// Render the library listing.
pub fn render_track_list(
    f: &mut Frame<'_>,
    area: Rect,
    title: &str,
    rows: &[TrackRow],
    state: &mut ListState,
) {
    let items: Vec<ListItem> = rows.iter().map(row_item).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, area, state);
}

fn row_item(row: &TrackRow) -> ListItem<'static> {
    let marker = if row.is_current { "▶" } else { " " };
    let heart = if row.favorite { "♥" } else { " " };

    let title_style = if row.is_current {
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    let line = Line::from(vec![
        Span::styled(format!("{marker} "), Style::default().fg(Color::Green)),
        Span::styled(format!("{heart} "), Style::default().fg(Color::Red)),
        Span::styled(row.track.title.to_string(), title_style),
        Span::styled(
            format!("  {}", row.track.artist),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("  [{}]", row.track.genre),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
            format!("  {}", catalog::format_duration(row.track.duration_secs)),
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    ListItem::new(line)
}
