// src/ui/widgets/mod.rs
//! Custom widgets for the resona UI.

pub mod player_panel;
pub mod spectrum;
pub mod track_list;

// Re-export widget rendering functions
pub use player_panel::{PlayerPanelView, render_player_panel};
pub use spectrum::render_visualizer;
pub use track_list::{TrackRow, render_track_list};
