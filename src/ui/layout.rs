// src/ui/layout.rs
//! Layout computation for the UI panels.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Visibility state for UI sections.
#[derive(Debug, Clone, Copy)]
pub struct SectionVisibility {
    pub library: bool,
    pub player: bool,
    pub visualizer: bool,
}

impl Default for SectionVisibility {
    fn default() -> Self {
        Self {
            library: true,
            player: true,
            visualizer: true,
        }
    }
}

impl SectionVisibility {
    /// Toggle a section by number (1-3).
    pub fn toggle(&mut self, section: usize) {
        match section {
            1 => self.library = !self.library,
            2 => self.player = !self.player,
            3 => self.visualizer = !self.visualizer,
            _ => {}
        }
    }
}

/// Computed layout areas for rendering.
pub struct ComputedLayout {
    /// Bottom visualizer strip (if visible).
    pub visualizer_area: Option<Rect>,
    /// Column areas within the main area.
    pub columns: Vec<Rect>,
    /// Order of sections in columns.
    pub section_order: Vec<&'static str>,
}

/// Compute the layout based on total area and section visibility.
/// The bottom fifth of the terminal belongs to the visualizer while it
/// is enabled; hiding it gives the main panels the full height.
pub fn compute_layout(area: Rect, visibility: &SectionVisibility) -> ComputedLayout {
    let (main_area, visualizer_area) = if visibility.visualizer {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Percentage(80), Constraint::Percentage(20)])
            .split(area);
        (chunks[0], Some(chunks[1]))
    } else {
        (area, None)
    };

    let mut section_order = Vec::new();
    let mut weights = Vec::new();

    if visibility.library {
        section_order.push("library");
        weights.push(42u16);
    }
    if visibility.player {
        section_order.push("player");
        weights.push(58u16);
    }

    let columns: Vec<Rect> = if !weights.is_empty() {
        let sum: u16 = weights.iter().copied().sum();
        let constraints: Vec<Constraint> = weights
            .into_iter()
            .map(|w| Constraint::Percentage((w as u32 * 100 / sum as u32) as u16))
            .collect();
        Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(main_area)
            .iter()
            .cloned()
            .collect()
    } else {
        vec![main_area]
    };

    ComputedLayout {
        visualizer_area,
        columns,
        section_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visualizer_takes_bottom_fifth() {
        let layout = compute_layout(
            Rect::new(0, 0, 100, 50),
            &SectionVisibility::default(),
        );
        let viz = layout.visualizer_area.unwrap();
        assert_eq!(viz.height, 10);
        assert_eq!(viz.y, 40);
    }

    #[test]
    fn test_hidden_visualizer_frees_height() {
        let mut visibility = SectionVisibility::default();
        visibility.toggle(3);
        let layout = compute_layout(Rect::new(0, 0, 100, 50), &visibility);
        assert!(layout.visualizer_area.is_none());
        assert_eq!(layout.columns[0].height, 50);
    }

    #[test]
    fn test_single_visible_section_gets_full_width() {
        let mut visibility = SectionVisibility::default();
        visibility.toggle(1);
        let layout = compute_layout(Rect::new(0, 0, 100, 50), &visibility);
        assert_eq!(layout.section_order, vec!["player"]);
        assert_eq!(layout.columns.len(), 1);
        assert_eq!(layout.columns[0].width, 100);
    }
}
