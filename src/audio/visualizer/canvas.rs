// src/audio/visualizer/canvas.rs
//! Braille pixel canvas with a persistent, decaying trail.
//!
//! Every cell exposes a 2x4 subpixel grid through the braille block, so
//! a `cols x rows` area yields a `2*cols x 4*rows` drawable surface.
//! Painted pixels keep their color and fade a fixed fraction per tick
//! instead of being cleared, which produces the visual echo the
//! spectrum modes rely on.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;

use super::renderer::{Dims, PaintCmd, Rgb};

const BRAILLE_BASE: u32 = 0x2800;

/// Dot bit per (column, row-within-cell) subpixel position.
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40],
    [0x08, 0x10, 0x20, 0x80],
];

/// Fraction of intensity retained per animation tick (the analogue of
/// repainting the background at one-tenth alpha).
pub const TRAIL_RETAIN: f32 = 0.9;

/// Retained fraction for the hard fade under the idle placeholder.
pub const IDLE_RETAIN: f32 = 0.1;

/// Pixels dimmer than this are not rendered.
const MIN_VISIBLE: f32 = 0.06;

pub struct TrailCanvas {
    cols: u16,
    rows: u16,
    px_w: usize,
    px_h: usize,
    intensity: Vec<f32>,
    color: Vec<Rgb>,
}

impl TrailCanvas {
    pub fn new(cols: u16, rows: u16) -> Self {
        let px_w = cols as usize * 2;
        let px_h = rows as usize * 4;
        Self {
            cols,
            rows,
            px_w,
            px_h,
            intensity: vec![0.0; px_w * px_h],
            color: vec![(0, 0, 0); px_w * px_h],
        }
    }

    /// Drawable pixel dimensions.
    pub fn dims(&self) -> Dims {
        Dims {
            width: self.px_w as u16,
            height: self.px_h as u16,
        }
    }

    pub fn cell_size(&self) -> (u16, u16) {
        (self.cols, self.rows)
    }

    /// Adopt a new cell size. The trail does not survive a resize; the
    /// next frames rebuild it.
    pub fn resize(&mut self, cols: u16, rows: u16) {
        if (cols, rows) == (self.cols, self.rows) {
            return;
        }
        *self = Self::new(cols, rows);
    }

    /// Age the trail: every pixel keeps `retain` of its intensity.
    pub fn fade(&mut self, retain: f32) {
        for v in &mut self.intensity {
            *v *= retain;
        }
    }

    /// Rasterize one frame's commands at full intensity.
    pub fn paint(&mut self, cmds: &[PaintCmd]) {
        for cmd in cmds {
            match *cmd {
                PaintCmd::Bar {
                    x,
                    width,
                    height,
                    color,
                } => self.fill_bar(x, width, height, color),
                PaintCmd::Line {
                    x0,
                    y0,
                    x1,
                    y1,
                    color,
                } => self.draw_line(x0, y0, x1, y1, color),
            }
        }
    }

    fn fill_bar(&mut self, x: u16, width: u16, height: u16, color: Rgb) {
        let top = self.px_h.saturating_sub(height as usize);
        for px in x as usize..(x + width) as usize {
            for py in top..self.px_h {
                self.plot(px, py, color);
            }
        }
    }

    fn draw_line(&mut self, x0: u16, y0: u16, x1: u16, y1: u16, color: Rgb) {
        // Bresenham over the subpixel grid.
        let (mut x, mut y) = (x0 as i32, y0 as i32);
        let (x1, y1) = (x1 as i32, y1 as i32);
        let dx = (x1 - x).abs();
        let dy = -(y1 - y).abs();
        let sx = if x < x1 { 1 } else { -1 };
        let sy = if y < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(x as usize, y as usize, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    fn plot(&mut self, px: usize, py: usize, color: Rgb) {
        if px >= self.px_w || py >= self.px_h {
            return;
        }
        let ix = py * self.px_w + px;
        self.intensity[ix] = 1.0;
        self.color[ix] = color;
    }

    /// Blit the canvas into the target area. Each cell shows the dots
    /// of its visible subpixels, colored by its brightest one and
    /// dimmed by that pixel's remaining trail intensity.
    pub fn render(&self, area: Rect, buf: &mut Buffer) {
        let cols = self.cols.min(area.width);
        let rows = self.rows.min(area.height);

        for cy in 0..rows as usize {
            for cx in 0..cols as usize {
                let mut dots = 0u8;
                let mut best = 0.0f32;
                let mut cell_color = (0, 0, 0);

                for sub_x in 0..2usize {
                    for sub_y in 0..4usize {
                        let px = cx * 2 + sub_x;
                        let py = cy * 4 + sub_y;
                        let ix = py * self.px_w + px;
                        let level = self.intensity[ix];
                        if level < MIN_VISIBLE {
                            continue;
                        }
                        dots |= BRAILLE_DOTS[sub_x][sub_y];
                        if level > best {
                            best = level;
                            cell_color = self.color[ix];
                        }
                    }
                }

                if dots == 0 {
                    continue;
                }
                let ch = char::from_u32(BRAILLE_BASE + dots as u32).unwrap_or(' ');
                let (r, g, b) = scale_rgb(cell_color, best);
                let x = area.x + cx as u16;
                let y = area.y + cy as u16;
                buf[(x, y)]
                    .set_char(ch)
                    .set_fg(Color::Rgb(r, g, b));
            }
        }
    }

    /// Brightest remaining trail intensity. Diagnostic accessor.
    pub(crate) fn max_intensity(&self) -> f32 {
        self.intensity.iter().fold(0.0, |a, &b| a.max(b))
    }
}

fn scale_rgb((r, g, b): Rgb, level: f32) -> Rgb {
    let level = level.clamp(0.0, 1.0);
    (
        (r as f32 * level) as u8,
        (g as f32 * level) as u8,
        (b as f32 * level) as u8,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dims_are_braille_subpixels() {
        let canvas = TrailCanvas::new(80, 20);
        let dims = canvas.dims();
        assert_eq!(dims.width, 160);
        assert_eq!(dims.height, 80);
    }

    #[test]
    fn test_fade_decays_toward_invisible() {
        let mut canvas = TrailCanvas::new(4, 2);
        canvas.paint(&[PaintCmd::Bar {
            x: 0,
            width: 2,
            height: 4,
            color: (255, 0, 0),
        }]);
        assert_eq!(canvas.max_intensity(), 1.0);

        canvas.fade(TRAIL_RETAIN);
        let after_one = canvas.max_intensity();
        assert!(after_one < 1.0 && after_one > 0.85);

        for _ in 0..60 {
            canvas.fade(TRAIL_RETAIN);
        }
        assert!(canvas.max_intensity() < MIN_VISIBLE);
    }

    #[test]
    fn test_repaint_restores_full_intensity() {
        let mut canvas = TrailCanvas::new(4, 2);
        let bar = PaintCmd::Bar {
            x: 0,
            width: 1,
            height: 2,
            color: (0, 255, 0),
        };
        canvas.paint(std::slice::from_ref(&bar));
        canvas.fade(TRAIL_RETAIN);
        canvas.paint(std::slice::from_ref(&bar));
        assert_eq!(canvas.max_intensity(), 1.0);
    }

    #[test]
    fn test_resize_resets_trail() {
        let mut canvas = TrailCanvas::new(4, 2);
        canvas.paint(&[PaintCmd::Line {
            x0: 0,
            y0: 0,
            x1: 7,
            y1: 7,
            color: (255, 255, 255),
        }]);
        canvas.resize(8, 4);
        assert_eq!(canvas.max_intensity(), 0.0);
        assert_eq!(canvas.cell_size(), (8, 4));

        // Same size is a no-op that keeps the trail.
        canvas.paint(&[PaintCmd::Bar {
            x: 0,
            width: 1,
            height: 1,
            color: (1, 2, 3),
        }]);
        canvas.resize(8, 4);
        assert_eq!(canvas.max_intensity(), 1.0);
    }

    #[test]
    fn test_out_of_bounds_plot_is_ignored() {
        let mut canvas = TrailCanvas::new(2, 1);
        canvas.paint(&[PaintCmd::Line {
            x0: 0,
            y0: 0,
            x1: 200,
            y1: 3,
            color: (9, 9, 9),
        }]);
        // Nothing panicked and in-bounds pixels landed.
        assert_eq!(canvas.max_intensity(), 1.0);
    }
}
