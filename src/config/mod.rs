// src/config/mod.rs
//! User settings loaded from `<config_dir>/resona/config.toml`.
//!
//! A missing or malformed file falls back to defaults; configuration can
//! never prevent the player from starting.

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::audio::visualizer::RenderMode;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub audio: AudioConfig,
    pub visualizer: VisualizerConfig,
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Initial volume as a fraction in [0, 1].
    pub volume: f32,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { volume: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizerConfig {
    /// Frequency-domain transform size. Bin count is half of this.
    pub spectrum_size: usize,
    /// Time-domain transform size for the waveform mode.
    pub waveform_size: usize,
    /// Smoothing factor across successive frequency snapshots, in [0, 1).
    pub smoothing: f32,
    /// Render mode at startup.
    pub mode: RenderMode,
}

impl Default for VisualizerConfig {
    fn default() -> Self {
        Self {
            spectrum_size: 256,
            waveform_size: 2048,
            smoothing: 0.8,
            mode: RenderMode::Bars,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Frame pacing of the main loop in milliseconds.
    pub tick_ms: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self { tick_ms: 33 }
    }
}

/// Location of the configuration file, if a config directory exists.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("resona").join("config.toml"))
}

impl Config {
    /// Load settings, falling back to defaults on any failure.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        match fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed config, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Clamp values that arrive out of range from the file.
    pub fn sanitized(mut self) -> Self {
        self.audio.volume = self.audio.volume.clamp(0.0, 1.0);
        self.visualizer.smoothing = self.visualizer.smoothing.clamp(0.0, 0.99);
        if !self.visualizer.spectrum_size.is_power_of_two() {
            self.visualizer.spectrum_size = 256;
        }
        if !self.visualizer.waveform_size.is_power_of_two() {
            self.visualizer.waveform_size = 2048;
        }
        self.ui.tick_ms = self.ui.tick_ms.max(10);
        self
    }
}
