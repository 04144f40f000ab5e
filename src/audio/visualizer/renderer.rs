// src/audio/visualizer/renderer.rs
//! Paint planning for the visualizer modes.
//!
//! Each planner is a pure function of a sample buffer and the drawable
//! pixel dimensions: identical inputs produce identical commands. The
//! stateful trail/echo effect lives in the canvas, not here.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Drawing strategy, selectable independently of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    Bars,
    Waveform,
    Radial,
}

impl RenderMode {
    pub fn next(self) -> Self {
        match self {
            RenderMode::Bars => RenderMode::Waveform,
            RenderMode::Waveform => RenderMode::Radial,
            RenderMode::Radial => RenderMode::Bars,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Bars => "Bars",
            RenderMode::Waveform => "Waveform",
            RenderMode::Radial => "Radial",
        }
    }

    /// Bars and radial consume the frequency snapshot; waveform uses
    /// the larger time-domain window.
    pub fn wants_waveform(self) -> bool {
        matches!(self, RenderMode::Waveform)
    }
}

pub type Rgb = (u8, u8, u8);

/// Drawable pixel-grid dimensions (braille subpixels of the target
/// cell area).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    pub width: u16,
    pub height: u16,
}

/// One primitive for the canvas to rasterize.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintCmd {
    /// Vertical bar rising from the bottom edge.
    Bar {
        x: u16,
        width: u16,
        height: u16,
        color: Rgb,
    },
    /// Straight segment between two pixel positions.
    Line {
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        color: Rgb,
    },
}

/// Bars use at most this fraction of the drawable height.
const BAR_HEIGHT_FACTOR: f32 = 0.8;

/// Waveform stroke (emerald).
const WAVEFORM_COLOR: Rgb = (16, 185, 129);

/// Plan one frame for the given mode.
pub fn plan(mode: RenderMode, buffer: &[f32], dims: Dims) -> Vec<PaintCmd> {
    match mode {
        RenderMode::Bars => plan_bars(buffer, dims),
        RenderMode::Waveform => plan_waveform(buffer, dims),
        RenderMode::Radial => plan_radial(buffer, dims),
    }
}

/// Bar spectrum: the width divided into `buffer.len()` equal columns,
/// bar height proportional to magnitude, hue sweeping the full circle
/// across the buffer and lightness rising with magnitude.
pub fn plan_bars(buffer: &[f32], dims: Dims) -> Vec<PaintCmd> {
    let n = buffer.len();
    if n == 0 || dims.width == 0 || dims.height == 0 {
        return Vec::new();
    }

    let mut cmds = Vec::with_capacity(n);
    for (i, &level) in buffer.iter().enumerate() {
        let level = level.clamp(0.0, 1.0);
        let x0 = (i * dims.width as usize / n) as u16;
        let x1 = ((i + 1) * dims.width as usize / n) as u16;
        let width = x1.saturating_sub(x0).max(1);
        let height = (level * dims.height as f32 * BAR_HEIGHT_FACTOR).round() as u16;
        if height == 0 {
            continue;
        }
        let hue = i as f32 / n as f32 * 360.0;
        let lightness = 50.0 + level * 30.0;
        cmds.push(PaintCmd::Bar {
            x: x0,
            width,
            height,
            color: hsl_to_rgb(hue, 70.0, lightness),
        });
    }
    cmds
}

/// Oscilloscope: a connected polyline with every sample centered on the
/// vertical midline.
pub fn plan_waveform(buffer: &[f32], dims: Dims) -> Vec<PaintCmd> {
    let n = buffer.len();
    if n < 2 || dims.width < 2 || dims.height == 0 {
        return Vec::new();
    }

    let max_y = (dims.height - 1) as f32;
    let sample_y = |x: u16| -> u16 {
        let ix = x as usize * n / dims.width as usize;
        let s = buffer[ix.min(n - 1)].clamp(-1.0, 1.0);
        (((1.0 - s) * max_y / 2.0).round() as u16).min(dims.height - 1)
    };

    let mut cmds = Vec::with_capacity(dims.width as usize - 1);
    let mut prev = sample_y(0);
    for x in 1..dims.width {
        let y = sample_y(x);
        cmds.push(PaintCmd::Line {
            x0: x - 1,
            y0: prev,
            x1: x,
            y1: y,
            color: WAVEFORM_COLOR,
        });
        prev = y;
    }
    cmds
}

/// Radial spectrum: one spoke per sample from a base ring, spoke length
/// proportional to magnitude, the full rotation divided evenly and the
/// hue sweep identical to the bar mode.
pub fn plan_radial(buffer: &[f32], dims: Dims) -> Vec<PaintCmd> {
    let n = buffer.len();
    if n == 0 || dims.width < 2 || dims.height < 2 {
        return Vec::new();
    }

    let cx = dims.width as f32 / 2.0;
    let cy = dims.height as f32 / 2.0;
    let radius = dims.width.min(dims.height) as f32 / 4.0;
    let max_x = (dims.width - 1) as f32;
    let max_y = (dims.height - 1) as f32;

    let mut cmds = Vec::with_capacity(n);
    for (i, &level) in buffer.iter().enumerate() {
        let level = level.clamp(0.0, 1.0);
        let angle = std::f32::consts::TAU * i as f32 / n as f32;
        let (sin, cos) = angle.sin_cos();
        let inner = radius;
        let outer = radius + level * radius;

        let x0 = (cx + cos * inner).clamp(0.0, max_x).round() as u16;
        let y0 = (cy + sin * inner).clamp(0.0, max_y).round() as u16;
        let x1 = (cx + cos * outer).clamp(0.0, max_x).round() as u16;
        let y1 = (cy + sin * outer).clamp(0.0, max_y).round() as u16;

        let hue = i as f32 / n as f32 * 360.0;
        cmds.push(PaintCmd::Line {
            x0,
            y0,
            x1,
            y1,
            color: hsl_to_rgb(hue, 70.0, 60.0),
        });
    }
    cmds
}

/// Placeholder frame while idle: low, dim noise bars over the hue
/// sweep, painted once rather than scheduled.
pub fn plan_idle<R: Rng>(dims: Dims, rng: &mut R) -> Vec<PaintCmd> {
    const IDLE_COLUMNS: usize = 128;
    if dims.width == 0 || dims.height == 0 {
        return Vec::new();
    }

    let mut cmds = Vec::with_capacity(IDLE_COLUMNS);
    for i in 0..IDLE_COLUMNS {
        let x0 = (i * dims.width as usize / IDLE_COLUMNS) as u16;
        let x1 = ((i + 1) * dims.width as usize / IDLE_COLUMNS) as u16;
        let height = (rng.random::<f32>() * dims.height as f32 * 0.1).round() as u16;
        if height == 0 {
            continue;
        }
        let hue = i as f32 / IDLE_COLUMNS as f32 * 360.0;
        cmds.push(PaintCmd::Bar {
            x: x0,
            width: x1.saturating_sub(x0).max(1),
            height,
            color: hsl_to_rgb(hue, 30.0, 20.0),
        });
    }
    cmds
}

/// HSL to RGB with hue in degrees, saturation and lightness in percent.
pub fn hsl_to_rgb(hue: f32, saturation: f32, lightness: f32) -> Rgb {
    let h = hue.rem_euclid(360.0);
    let s = (saturation / 100.0).clamp(0.0, 1.0);
    let l = (lightness / 100.0).clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let x = c * (1.0 - ((h / 60.0).rem_euclid(2.0) - 1.0).abs());
    let m = l - c / 2.0;

    let (r, g, b) = match h as u32 {
        0..60 => (c, x, 0.0),
        60..120 => (x, c, 0.0),
        120..180 => (0.0, c, x),
        180..240 => (0.0, x, c),
        240..300 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };

    (
        ((r + m) * 255.0).round() as u8,
        ((g + m) * 255.0).round() as u8,
        ((b + m) * 255.0).round() as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: Dims = Dims {
        width: 160,
        height: 80,
    };

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 / n as f32).collect()
    }

    #[test]
    fn test_hsl_primaries() {
        assert_eq!(hsl_to_rgb(0.0, 100.0, 50.0), (255, 0, 0));
        assert_eq!(hsl_to_rgb(120.0, 100.0, 50.0), (0, 255, 0));
        assert_eq!(hsl_to_rgb(240.0, 100.0, 50.0), (0, 0, 255));
        assert_eq!(hsl_to_rgb(0.0, 0.0, 100.0), (255, 255, 255));
    }

    #[test]
    fn test_bars_are_deterministic() {
        let buffer = ramp(128);
        let a = plan_bars(&buffer, DIMS);
        let b = plan_bars(&buffer, DIMS);
        assert_eq!(a, b);
    }

    #[test]
    fn test_bars_hue_per_column() {
        let buffer = vec![1.0; 8];
        let cmds = plan_bars(&buffer, DIMS);
        assert_eq!(cmds.len(), 8);
        for (i, cmd) in cmds.iter().enumerate() {
            let PaintCmd::Bar { color, height, .. } = cmd else {
                panic!("expected bars");
            };
            let expected = hsl_to_rgb(i as f32 / 8.0 * 360.0, 70.0, 80.0);
            assert_eq!(*color, expected);
            assert_eq!(*height, (80.0 * 0.8f32).round() as u16);
        }
    }

    #[test]
    fn test_bars_partition_full_width() {
        let buffer = vec![1.0; 128];
        let cmds = plan_bars(&buffer, DIMS);
        let PaintCmd::Bar { x, .. } = &cmds[0] else {
            panic!()
        };
        assert_eq!(*x, 0);
        let PaintCmd::Bar { x, width, .. } = cmds.last().unwrap() else {
            panic!()
        };
        assert_eq!(*x + *width, DIMS.width);
    }

    #[test]
    fn test_silent_buffer_paints_nothing() {
        assert!(plan_bars(&vec![0.0; 128], DIMS).is_empty());
        assert!(plan_bars(&[], DIMS).is_empty());
    }

    #[test]
    fn test_waveform_centers_silence_on_midline() {
        let buffer = vec![0.0; 2048];
        let cmds = plan_waveform(&buffer, DIMS);
        assert_eq!(cmds.len(), DIMS.width as usize - 1);
        for cmd in &cmds {
            let PaintCmd::Line { y0, y1, color, .. } = cmd else {
                panic!("expected lines");
            };
            assert_eq!(*y0, 40);
            assert_eq!(*y1, 40);
            assert_eq!(*color, WAVEFORM_COLOR);
        }
    }

    #[test]
    fn test_waveform_amplitude_maps_to_edges() {
        let mut buffer = vec![1.0f32; 1024];
        buffer.extend(vec![-1.0f32; 1024]);
        let cmds = plan_waveform(&buffer, DIMS);
        let PaintCmd::Line { y0, .. } = &cmds[0] else {
            panic!()
        };
        assert_eq!(*y0, 0);
        let PaintCmd::Line { y1, .. } = cmds.last().unwrap() else {
            panic!()
        };
        assert_eq!(*y1, DIMS.height - 1);
    }

    #[test]
    fn test_radial_spoke_count_and_hue_match_bars() {
        let buffer = ramp(128);
        let cmds = plan_radial(&buffer, DIMS);
        assert_eq!(cmds.len(), 128);

        let PaintCmd::Line { color, .. } = &cmds[32] else {
            panic!()
        };
        assert_eq!(*color, hsl_to_rgb(32.0 / 128.0 * 360.0, 70.0, 60.0));
    }

    #[test]
    fn test_radial_is_deterministic() {
        let buffer = ramp(128);
        assert_eq!(plan_radial(&buffer, DIMS), plan_radial(&buffer, DIMS));
    }

    #[test]
    fn test_radial_silent_spokes_sit_on_base_ring() {
        let buffer = vec![0.0; 4];
        let cmds = plan_radial(&buffer, DIMS);
        for cmd in cmds {
            let PaintCmd::Line { x0, y0, x1, y1, .. } = cmd else {
                panic!()
            };
            assert_eq!((x0, y0), (x1, y1));
        }
    }

    #[test]
    fn test_mode_cycle_covers_all() {
        let mut mode = RenderMode::Bars;
        mode = mode.next();
        assert_eq!(mode, RenderMode::Waveform);
        mode = mode.next();
        assert_eq!(mode, RenderMode::Radial);
        mode = mode.next();
        assert_eq!(mode, RenderMode::Bars);
    }
}
