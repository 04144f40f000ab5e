// src/audio/visualizer/mod.rs
//! Real-time visualizer: a frame-paced loop that pulls analysis
//! snapshots and paints them while playback runs.

mod canvas;
mod renderer;

pub use renderer::{Dims, PaintCmd, RenderMode, hsl_to_rgb, plan};

use ratatui::Frame;
use ratatui::layout::Rect;

use canvas::{IDLE_RETAIN, TRAIL_RETAIN, TrailCanvas};

use super::analysis::AnalysisGraph;

/// Scheduler states. Idle is both initial and terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Drives the analysis-to-paint loop.
///
/// The loop runs cooperatively on the application tick: while
/// `Running`, exactly one tick is scheduled at a time, each pulling one
/// snapshot and painting it before the next is considered. Stopping
/// cancels the pending tick synchronously.
pub struct Visualizer {
    mode: RenderMode,
    state: LoopState,
    canvas: TrailCanvas,
    /// Total number of cancelled ticks, one per Running -> Idle edge.
    cancellations: u32,
    /// Set when the idle placeholder still needs its single paint.
    idle_frame_pending: bool,
}

impl Visualizer {
    pub fn new(mode: RenderMode) -> Self {
        Self {
            mode,
            state: LoopState::Idle,
            canvas: TrailCanvas::new(0, 0),
            cancellations: 0,
            idle_frame_pending: true,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn cycle_mode(&mut self) {
        self.mode = self.mode.next();
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Number of scheduled ticks right now: 0 while idle, 1 while
    /// running. Never more.
    pub fn scheduled_ticks(&self) -> usize {
        match self.state {
            LoopState::Idle => 0,
            LoopState::Running => 1,
        }
    }

    pub fn cancellations(&self) -> u32 {
        self.cancellations
    }

    /// Start the loop. A start without an attached graph stays idle;
    /// visualization is strictly best-effort.
    pub fn start(&mut self, graph_attached: bool) {
        if self.state == LoopState::Idle && graph_attached {
            self.state = LoopState::Running;
            self.idle_frame_pending = false;
        }
    }

    /// Stop the loop, cancelling the pending tick before returning.
    pub fn stop(&mut self) {
        if self.state == LoopState::Running {
            self.state = LoopState::Idle;
            self.cancellations += 1;
            self.idle_frame_pending = true;
        }
    }

    /// Reconcile the loop with the transport state each tick.
    pub fn sync(&mut self, playing: bool, graph_attached: bool) {
        if playing && graph_attached {
            self.start(graph_attached);
        } else {
            self.stop();
        }
    }

    /// One scheduled tick: age the trail, pull the mode's snapshot,
    /// paint it. A starved or unattached graph paints nothing; the
    /// trail keeps fading.
    pub fn tick(&mut self, graph: &mut AnalysisGraph) {
        if self.state != LoopState::Running {
            return;
        }
        self.canvas.fade(TRAIL_RETAIN);
        let dims = self.canvas.dims();
        let cmds = {
            let snapshot = if self.mode.wants_waveform() {
                graph.waveform_snapshot()
            } else {
                graph.frequency_snapshot()
            };
            match snapshot {
                Some(buffer) => plan(self.mode, buffer, dims),
                None => Vec::new(),
            }
        };
        self.canvas.paint(&cmds);
    }

    /// Adopt a new drawable size. Does not restart the loop.
    pub fn handle_resize(&mut self, cols: u16, rows: u16) {
        let reset = self.canvas.cell_size() != (cols, rows);
        self.canvas.resize(cols, rows);
        if reset && self.state == LoopState::Idle {
            // The placeholder was lost with the old canvas.
            self.idle_frame_pending = true;
        }
    }

    /// Paint the single idle placeholder if one is due. Repeated calls
    /// while idle do not repaint.
    pub fn ensure_idle_frame(&mut self) {
        if self.state != LoopState::Idle || !self.idle_frame_pending {
            return;
        }
        self.idle_frame_pending = false;
        self.canvas.fade(IDLE_RETAIN);
        let cmds = renderer::plan_idle(self.canvas.dims(), &mut rand::rng());
        self.canvas.paint(&cmds);
    }

    pub fn idle_frame_pending(&self) -> bool {
        self.idle_frame_pending
    }

    /// Draw into the target area, adopting its size lazily so terminal
    /// resizes never restart the loop.
    pub fn draw(&mut self, f: &mut Frame<'_>, area: Rect) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        self.handle_resize(area.width, area.height);
        self.ensure_idle_frame();
        self.canvas.render(area, f.buffer_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::AudioSource;
    use ringbuf::traits::*;

    fn attached_graph() -> (AudioSource, AnalysisGraph) {
        let source = AudioSource::new();
        let mut graph = AnalysisGraph::new(256, 2048, 0.0);
        graph.attach(&source).unwrap();
        {
            let mut ring = source.samples().lock().unwrap();
            for i in 0..512 {
                let phase = 2.0 * std::f32::consts::PI * 8.0 * i as f32 / 256.0;
                let _ = ring.try_push(phase.sin());
            }
        }
        (source, graph)
    }

    #[test]
    fn test_loop_invariant_ticks_follow_playing() {
        let mut viz = Visualizer::new(RenderMode::Bars);
        assert_eq!(viz.scheduled_ticks(), 0);

        viz.sync(true, true);
        assert_eq!(viz.scheduled_ticks(), 1);

        // Repeated syncs never stack ticks.
        viz.sync(true, true);
        assert_eq!(viz.scheduled_ticks(), 1);

        viz.sync(false, true);
        assert_eq!(viz.scheduled_ticks(), 0);
    }

    #[test]
    fn test_start_without_graph_stays_idle() {
        let mut viz = Visualizer::new(RenderMode::Bars);
        viz.start(false);
        assert_eq!(viz.state(), LoopState::Idle);
        viz.sync(true, false);
        assert_eq!(viz.scheduled_ticks(), 0);
    }

    #[test]
    fn test_pause_cancels_exactly_once() {
        let mut viz = Visualizer::new(RenderMode::Bars);
        viz.start(true);
        viz.stop();
        assert_eq!(viz.cancellations(), 1);

        // A second stop while idle cancels nothing further.
        viz.stop();
        assert_eq!(viz.cancellations(), 1);
    }

    #[test]
    fn test_resize_while_idle_schedules_nothing() {
        let mut viz = Visualizer::new(RenderMode::Bars);
        viz.start(true);
        viz.stop();

        viz.handle_resize(100, 25);
        assert_eq!(viz.scheduled_ticks(), 0);
        assert_eq!(viz.canvas.cell_size(), (100, 25));
    }

    #[test]
    fn test_resize_while_running_does_not_restart() {
        let mut viz = Visualizer::new(RenderMode::Bars);
        viz.start(true);
        viz.handle_resize(100, 25);
        assert_eq!(viz.state(), LoopState::Running);
        assert_eq!(viz.cancellations(), 0);
    }

    #[test]
    fn test_tick_paints_while_running() {
        let (_source, mut graph) = attached_graph();
        let mut viz = Visualizer::new(RenderMode::Bars);
        viz.handle_resize(80, 20);
        viz.start(true);
        viz.tick(&mut graph);
        assert!(viz.canvas.max_intensity() > 0.0);
    }

    #[test]
    fn test_tick_while_idle_is_a_no_op() {
        let (_source, mut graph) = attached_graph();
        let mut viz = Visualizer::new(RenderMode::Bars);
        viz.handle_resize(80, 20);
        viz.tick(&mut graph);
        assert_eq!(viz.canvas.max_intensity(), 0.0);
    }

    #[test]
    fn test_idle_frame_draws_once() {
        let mut viz = Visualizer::new(RenderMode::Bars);
        viz.handle_resize(80, 20);
        assert!(viz.idle_frame_pending());

        viz.ensure_idle_frame();
        assert!(!viz.idle_frame_pending());
        let painted = viz.canvas.max_intensity();

        // No rescheduling: a second call leaves the canvas untouched.
        viz.ensure_idle_frame();
        assert_eq!(viz.canvas.max_intensity(), painted);
    }

    #[test]
    fn test_stop_requests_a_fresh_idle_frame() {
        let mut viz = Visualizer::new(RenderMode::Waveform);
        viz.handle_resize(80, 20);
        viz.start(true);
        assert!(!viz.idle_frame_pending());
        viz.stop();
        assert!(viz.idle_frame_pending());
    }
}
