// src/audio/controller.rs
//! Playback controller: the single authoritative owner of playback
//! state for the whole session.
//!
//! Views read state through accessors and mutate it only through the
//! operations here; none of them instantiate their own audio source.

use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use super::source::{AudioSource, SourceEvent};
use crate::catalog::{self, Track, TrackId};
use crate::error::PlayerError;

/// Track-end behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    None,
    One,
    All,
}

impl RepeatMode {
    /// Cycle order: off, all, one.
    pub fn next(self) -> Self {
        match self {
            RepeatMode::None => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RepeatMode::None => "off",
            RepeatMode::One => "one",
            RepeatMode::All => "all",
        }
    }
}

/// Owns the audio source adapter and the playback queue.
pub struct PlaybackController {
    source: AudioSource,
    queue: Vec<TrackId>,
    current_index: Option<usize>,
    playing: bool,
    position: Duration,
    shuffle: bool,
    repeat: RepeatMode,
    volume: f32,
    muted: bool,
    last_volume: f32,
    error: Option<PlayerError>,
}

impl PlaybackController {
    /// Queue starts in catalog order.
    pub fn new(initial_volume: f32) -> Self {
        let source = AudioSource::new();
        let volume = initial_volume.clamp(0.0, 1.0);
        source.set_volume(volume);
        Self {
            source,
            queue: catalog::tracks().iter().map(|t| t.id).collect(),
            current_index: None,
            playing: false,
            position: Duration::ZERO,
            shuffle: false,
            repeat: RepeatMode::None,
            volume,
            muted: volume == 0.0,
            last_volume: if volume > 0.0 { volume } else { 1.0 },
            error: None,
        }
    }

    /// Load and start the given track, if it is in the queue.
    pub fn select(&mut self, id: TrackId) {
        if let Some(ix) = self.queue.iter().position(|t| *t == id) {
            self.start_track(ix);
        }
    }

    fn start_track(&mut self, ix: usize) {
        let Some(&id) = self.queue.get(ix) else { return };
        let Some(track) = catalog::get_track_by_id(id) else {
            return;
        };
        info!(title = track.title, artist = track.artist, "starting track");
        self.error = None;
        self.current_index = Some(ix);
        self.position = Duration::ZERO;
        self.source.load(track);
        match self.source.play() {
            Ok(()) => self.playing = true,
            Err(e) => {
                self.playing = false;
                self.error = Some(e);
            }
        }
    }

    /// Resume (or start) playback of the current track. Does nothing
    /// when no track is selected.
    pub fn play(&mut self) {
        if self.current_index.is_none() {
            return;
        }
        match self.source.play() {
            Ok(()) => {
                self.error = None;
                self.playing = true;
            }
            Err(e) => {
                self.playing = false;
                self.error = Some(e);
            }
        }
    }

    /// Pause playback. Always succeeds with a loaded track.
    pub fn pause(&mut self) {
        self.source.pause();
        self.playing = false;
    }

    pub fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Halt playback entirely and reset the position.
    pub fn stop(&mut self) {
        self.source.stop();
        self.playing = false;
        self.position = Duration::ZERO;
    }

    pub fn next(&mut self) {
        self.advance(1);
    }

    pub fn previous(&mut self) {
        self.advance(-1);
    }

    fn advance(&mut self, direction: i32) {
        let Some(ix) = self.next_index(direction, &mut rand::rng()) else {
            return;
        };
        self.start_track(ix);
    }

    /// Sequencer policy: wrap in both directions; with shuffle on, draw
    /// a random index that excludes the current one whenever more than
    /// one track is queued.
    fn next_index<R: Rng>(&self, direction: i32, rng: &mut R) -> Option<usize> {
        if self.queue.is_empty() {
            return None;
        }
        let len = self.queue.len();
        Some(match self.current_index {
            None => {
                if direction >= 0 {
                    0
                } else {
                    len - 1
                }
            }
            Some(cur) if self.shuffle => pick_shuffle_index(len, cur, rng),
            Some(cur) => {
                if direction >= 0 {
                    (cur + 1) % len
                } else if cur == 0 {
                    len - 1
                } else {
                    cur - 1
                }
            }
        })
    }

    /// Seek to an absolute position in seconds; the adapter clamps into
    /// the valid range and the optimistic position is visible at once.
    pub fn seek(&mut self, seconds: f64) {
        self.source.seek(seconds);
        self.position = self.source.position();
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.position.as_secs_f64() + delta);
    }

    /// Set volume as a fraction of full scale. Zero implies muted; any
    /// positive value unmutes and becomes the restore point.
    pub fn set_volume(&mut self, fraction: f32) {
        let v = fraction.clamp(0.0, 1.0);
        self.source.set_volume(v);
        self.volume = v;
        if v == 0.0 {
            self.muted = true;
        } else {
            self.muted = false;
            self.last_volume = v;
        }
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    /// Unmuting restores the last non-zero volume.
    pub fn toggle_mute(&mut self) {
        if self.muted {
            let restore = if self.last_volume > 0.0 {
                self.last_volume
            } else {
                1.0
            };
            self.muted = false;
            self.volume = restore;
            self.source.set_volume(restore);
        } else {
            if self.volume > 0.0 {
                self.last_volume = self.volume;
            }
            self.muted = true;
            self.source.set_volume(0.0);
        }
    }

    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;
    }

    pub fn cycle_repeat(&mut self) {
        self.repeat = self.repeat.next();
    }

    /// Drain pending adapter events and apply them.
    pub fn poll_events(&mut self) {
        while let Some(event) = self.source.poll_event() {
            self.apply_event(event);
        }
    }

    /// Apply one adapter event to the authoritative state.
    pub fn apply_event(&mut self, event: SourceEvent) {
        match event {
            SourceEvent::Ready { .. } => {}
            SourceEvent::TimeUpdate { position } => {
                if self.playing {
                    self.position = position;
                }
            }
            SourceEvent::Ended => self.handle_track_end(),
            SourceEvent::Error(e) => {
                warn!(error = %e, "source error");
                if matches!(
                    e,
                    PlayerError::SourceUnplayable(_) | PlayerError::PlaybackRejected(_)
                ) {
                    self.playing = false;
                }
                self.error = Some(e);
            }
        }
    }

    /// Track-end policy: repeat-one replays in place; repeat-all always
    /// advances with wrap; repeat-off advances unless the sequence is
    /// exhausted, in which case playback stops with the position held
    /// at the duration.
    fn handle_track_end(&mut self) {
        match self.repeat {
            RepeatMode::One => {
                self.source.seek(0.0);
                self.position = Duration::ZERO;
                match self.source.play() {
                    Ok(()) => self.playing = true,
                    Err(e) => {
                        self.playing = false;
                        self.error = Some(e);
                    }
                }
            }
            RepeatMode::All => self.advance(1),
            RepeatMode::None => {
                let exhausted = !self.shuffle
                    && self
                        .current_index
                        .is_none_or(|ix| ix + 1 >= self.queue.len());
                if exhausted {
                    self.playing = false;
                    if let Some(total) = self.duration() {
                        self.position = total;
                    }
                } else {
                    self.advance(1);
                }
            }
        }
    }

    pub fn current_track(&self) -> Option<&'static Track> {
        let ix = self.current_index?;
        catalog::get_track_by_id(*self.queue.get(ix)?)
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn position(&self) -> Duration {
        self.position
    }

    pub fn duration(&self) -> Option<Duration> {
        self.source.duration()
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Last surfaced error, kept until the next successful start.
    pub fn error(&self) -> Option<&PlayerError> {
        self.error.as_ref()
    }

    /// The adapter handle, for analysis-graph attachment.
    pub fn source(&self) -> &AudioSource {
        &self.source
    }
}

/// Random draw over `0..len` that excludes `current` whenever the queue
/// holds more than one entry.
fn pick_shuffle_index<R: Rng>(len: usize, current: usize, rng: &mut R) -> usize {
    if len <= 1 {
        return 0;
    }
    let mut ix = rng.random_range(0..len - 1);
    if ix >= current {
        ix += 1;
    }
    ix
}
