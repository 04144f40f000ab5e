// src/ui/widgets/spectrum.rs
//! Visualizer panel wrapper.

use ratatui::{
    Frame,
    layout::Rect,
    widgets::{Block, Borders},
};

use crate::audio::Visualizer;

/// Render the visualizer strip with its mode in the title.
pub fn render_visualizer(f: &mut Frame<'_>, area: Rect, visualizer: &mut Visualizer) {
    let title = format!("3: Visualizer [{}]", visualizer.mode().label());
    let block = Block::default().borders(Borders::ALL).title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);
    visualizer.draw(f, inner);
}
