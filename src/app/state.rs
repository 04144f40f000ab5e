// src/app/state.rs
//! Application state management.

use std::collections::HashSet;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{Frame, layout::Rect, widgets::ListState};
use tracing::warn;

use crate::{
    audio::{AnalysisGraph, PlaybackController, Visualizer},
    catalog::{self, Track, TrackId},
    config::Config,
    ui::{
        keybindings::{NavigationAction, key_to_action},
        layout::{SectionVisibility, compute_layout},
        widgets::{
            PlayerPanelView, TrackRow, render_player_panel, render_track_list,
            render_visualizer,
        },
    },
};

/// Library ordering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    Artist,
    Duration,
    Year,
}

impl SortKey {
    fn next(self) -> Self {
        match self {
            SortKey::Title => SortKey::Artist,
            SortKey::Artist => SortKey::Duration,
            SortKey::Duration => SortKey::Year,
            SortKey::Year => SortKey::Title,
        }
    }

    fn label(self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Artist => "artist",
            SortKey::Duration => "duration",
            SortKey::Year => "year",
        }
    }
}

/// Main application state. Owns the playback controller, the analysis
/// graph, and the visualizer for the whole session; widgets only borrow
/// them.
pub struct App {
    pub controller: PlaybackController,
    pub graph: AnalysisGraph,
    pub visualizer: Visualizer,

    /// Session-local favorite overlay over the read-only catalog.
    favorites: HashSet<TrackId>,

    /// Current library view (filtered and sorted track ids).
    view: Vec<TrackId>,
    state: ListState,
    selected: usize,
    sort: SortKey,
    /// Index into the catalog genre table; `None` shows everything.
    genre_filter: Option<usize>,
    query: String,
    search_active: bool,

    /// Recommendations for the current track, refreshed on change.
    recommendations: Vec<&'static Track>,
    recommended_for: Option<TrackId>,

    pub visibility: SectionVisibility,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let mut state = ListState::default();
        state.select(Some(0));

        let mut app = Self {
            controller: PlaybackController::new(config.audio.volume),
            graph: AnalysisGraph::new(
                config.visualizer.spectrum_size,
                config.visualizer.waveform_size,
                config.visualizer.smoothing,
            ),
            visualizer: Visualizer::new(config.visualizer.mode),
            favorites: HashSet::new(),
            view: Vec::new(),
            state,
            selected: 0,
            sort: SortKey::Title,
            genre_filter: None,
            query: String::new(),
            search_active: false,
            recommendations: Vec::new(),
            recommended_for: None,
            visibility: SectionVisibility::default(),
        };
        app.rebuild_view();
        Ok(app)
    }

    /// Handle a key event and return true if the app should quit.
    pub fn on_key(&mut self, key: KeyEvent) -> bool {
        if self.search_active {
            self.on_search_key(key);
            return false;
        }

        match key_to_action(&key) {
            NavigationAction::Down => {
                if self.selected + 1 < self.view.len() {
                    self.selected += 1;
                }
            }
            NavigationAction::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            NavigationAction::Enter => {
                if let Some(&id) = self.view.get(self.selected) {
                    self.controller.select(id);
                }
            }
            NavigationAction::TogglePause => {
                self.controller.toggle();
                self.sync_visualizer();
            }
            NavigationAction::Stop => {
                self.controller.stop();
                self.sync_visualizer();
            }
            NavigationAction::NextTrack => self.controller.next(),
            NavigationAction::PreviousTrack => self.controller.previous(),
            NavigationAction::ToggleShuffle => self.controller.toggle_shuffle(),
            NavigationAction::CycleRepeat => self.controller.cycle_repeat(),
            NavigationAction::ToggleMute => self.controller.toggle_mute(),
            NavigationAction::VolumeUp => self.controller.adjust_volume(0.05),
            NavigationAction::VolumeDown => self.controller.adjust_volume(-0.05),
            NavigationAction::SeekForward => self.controller.seek_by(5.0),
            NavigationAction::SeekBackward => self.controller.seek_by(-5.0),
            NavigationAction::CycleVisualizer => self.visualizer.cycle_mode(),
            NavigationAction::ToggleFavorite => {
                if let Some(&id) = self.view.get(self.selected) {
                    if !self.favorites.remove(&id) {
                        self.favorites.insert(id);
                    }
                }
            }
            NavigationAction::CycleSort => {
                self.sort = self.sort.next();
                self.rebuild_view();
            }
            NavigationAction::CycleGenreFilter => {
                self.cycle_genre_filter();
                self.rebuild_view();
            }
            NavigationAction::StartSearch => {
                self.search_active = true;
            }
            NavigationAction::ToggleSection(d) => {
                self.visibility.toggle(d);
            }
            NavigationAction::Quit => {
                self.shutdown();
                return true;
            }
            NavigationAction::None => {}
        }

        self.state.select(Some(self.selected));
        false
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.search_active = false;
                self.query.clear();
                self.rebuild_view();
            }
            KeyCode::Enter => {
                self.search_active = false;
            }
            KeyCode::Backspace => {
                self.query.pop();
                self.rebuild_view();
            }
            KeyCode::Char(c) => {
                self.query.push(c);
                self.rebuild_view();
            }
            _ => {}
        }
    }

    fn cycle_genre_filter(&mut self) {
        let count = catalog::genres().len();
        self.genre_filter = match self.genre_filter {
            None => Some(0),
            Some(ix) if ix + 1 < count => Some(ix + 1),
            Some(_) => None,
        };
    }

    /// Recompute the library view from search, filter, and sort state.
    fn rebuild_view(&mut self) {
        let mut tracks: Vec<&'static Track> = if self.query.is_empty() {
            catalog::tracks().iter().collect()
        } else {
            catalog::search_tracks(&self.query)
        };

        if let Some(ix) = self.genre_filter {
            let genre = catalog::genres()[ix].name;
            tracks.retain(|t| t.genre == genre);
        }

        match self.sort {
            SortKey::Title => tracks.sort_by_key(|t| t.title),
            SortKey::Artist => tracks.sort_by_key(|t| t.artist),
            SortKey::Duration => tracks.sort_by_key(|t| t.duration_secs),
            SortKey::Year => tracks.sort_by_key(|t| t.year),
        }

        self.view = tracks.iter().map(|t| t.id).collect();
        if self.selected >= self.view.len() {
            self.selected = self.view.len().saturating_sub(1);
        }
        self.state.select(Some(self.selected));
    }

    /// Per-tick update: drain playback events, keep the analysis graph
    /// bound, and advance the render loop.
    pub fn on_tick(&mut self) {
        self.controller.poll_events();

        // The graph binds lazily on the first playback attempt and stays
        // bound until shutdown; pausing never tears it down.
        if self.controller.current_track().is_some() && !self.graph.is_attached() {
            if let Err(e) = self.graph.attach(self.controller.source()) {
                warn!(error = %e, "could not attach analysis graph");
            }
        }

        self.refresh_recommendations();
        self.sync_visualizer();
        self.visualizer.tick(&mut self.graph);
    }

    fn sync_visualizer(&mut self) {
        self.visualizer
            .sync(self.controller.is_playing(), self.graph.is_attached());
    }

    fn refresh_recommendations(&mut self) {
        let current = self.controller.current_track();
        let current_id = current.map(|t| t.id);
        if current_id != self.recommended_for {
            self.recommended_for = current_id;
            self.recommendations = catalog::get_recommended_tracks(current, 3);
        }
    }

    /// Forward a terminal resize to the visualizer so the drawable
    /// dimensions track the new layout without restarting the loop.
    pub fn on_resize(&mut self, width: u16, height: u16) {
        let layout = compute_layout(Rect::new(0, 0, width, height), &self.visibility);
        if let Some(area) = layout.visualizer_area {
            self.visualizer.handle_resize(
                area.width.saturating_sub(2),
                area.height.saturating_sub(2),
            );
        }
    }

    /// Draw the application UI.
    pub fn draw(&mut self, f: &mut Frame<'_>) {
        let layout = compute_layout(f.area(), &self.visibility);
        let current_id = self.controller.current_track().map(|t| t.id);

        let mut col_index = 0usize;
        for section in layout.section_order.iter() {
            let Some(&area) = layout.columns.get(col_index) else {
                break;
            };
            match *section {
                "library" => {
                    let rows: Vec<TrackRow> = self
                        .view
                        .iter()
                        .filter_map(|&id| catalog::get_track_by_id(id))
                        .map(|track| TrackRow {
                            track,
                            is_current: Some(track.id) == current_id,
                            favorite: self.favorites.contains(&track.id),
                        })
                        .collect();
                    render_track_list(f, area, &self.library_title(), &rows, &mut self.state);
                }
                "player" => {
                    let view = PlayerPanelView {
                        track: self.controller.current_track(),
                        playing: self.controller.is_playing(),
                        position: self.controller.position(),
                        duration: self.controller.duration(),
                        volume: self.controller.volume(),
                        muted: self.controller.is_muted(),
                        shuffle: self.controller.is_shuffle(),
                        repeat: self.controller.repeat(),
                        favorite: current_id
                            .map(|id| self.favorites.contains(&id))
                            .unwrap_or(false),
                        error: self.controller.error().map(|e| e.to_string()),
                        recommendations: &self.recommendations,
                    };
                    render_player_panel(f, area, &view);
                }
                _ => {}
            }
            col_index += 1;
        }

        if let Some(area) = layout.visualizer_area {
            render_visualizer(f, area, &mut self.visualizer);
        }
    }

    fn library_title(&self) -> String {
        let mut title = format!("1: Library [sort: {}]", self.sort.label());
        if let Some(ix) = self.genre_filter {
            title.push_str(&format!(" [genre: {}]", catalog::genres()[ix].name));
        }
        if self.search_active {
            title.push_str(&format!(" /{}_", self.query));
        } else if !self.query.is_empty() {
            title.push_str(&format!(" /{}", self.query));
        }
        title
    }

    /// Release every audio resource exactly once: cancel the render
    /// loop, detach the analysis graph, and stop the source.
    pub fn shutdown(&mut self) {
        self.visualizer.stop();
        self.graph.detach();
        self.controller.stop();
    }
}
