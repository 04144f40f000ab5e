// src/audio/source.rs
//! Audio source adapter: one playable media handle backed by rodio.
//!
//! A dedicated audio thread owns the `OutputStream` and `Sink` and is
//! driven over a command channel (the sink types do not move between
//! threads). The adapter front keeps optimistic mirrors of position and
//! duration so reads never block on the audio thread, and reports
//! lifecycle changes back over an event channel.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use tracing::warn;

use super::sample_capture::{SampleRing, SampleTap, new_ring};
use crate::catalog::{Track, TrackId};
use crate::error::PlayerError;

/// Cadence at which the audio thread reports position and checks for
/// track end while idle on the command channel.
const PROGRESS_INTERVAL: Duration = Duration::from_millis(200);

static NEXT_SOURCE_ID: AtomicU64 = AtomicU64::new(1);

/// Commands sent to the audio thread.
enum SourceCommand {
    Load(PathBuf),
    Play,
    Pause,
    Seek(Duration),
    SetVolume(f32),
    Stop,
}

/// Lifecycle events emitted by the audio thread. Consumed by the
/// playback controller, never polled from render code.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// Source metadata is known; duration is the best available figure.
    Ready { duration: Duration },
    /// Periodic playback progress.
    TimeUpdate { position: Duration },
    /// The source drained to its end.
    Ended,
    /// A load or playback attempt failed.
    Error(PlayerError),
}

/// One playable source. Exposes transport operations and emits
/// [`SourceEvent`]s; the shared sample ring is the single tap point an
/// analysis graph may attach to.
pub struct AudioSource {
    id: u64,
    cmd_tx: Sender<SourceCommand>,
    event_rx: Receiver<SourceEvent>,
    samples: SampleRing,
    playing: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    position: Arc<Mutex<Duration>>,
    duration: Arc<Mutex<Option<Duration>>>,
    loaded: Option<TrackId>,
}

impl AudioSource {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SourceCommand>();
        let (event_tx, event_rx) = mpsc::channel::<SourceEvent>();

        let samples = new_ring();
        let playing = Arc::new(AtomicBool::new(false));
        let paused = Arc::new(AtomicBool::new(false));
        let position = Arc::new(Mutex::new(Duration::ZERO));
        let duration = Arc::new(Mutex::new(None));

        // The stream and sink are created on the audio thread and never
        // leave it; only channels and shared mirrors cross the boundary.
        {
            let samples = samples.clone();
            let playing = playing.clone();
            let paused = paused.clone();
            let position = position.clone();
            let duration = duration.clone();
            thread::spawn(move || {
                AudioThread {
                    cmd_rx,
                    event_tx,
                    samples,
                    playing,
                    paused,
                    position,
                    duration,
                    output: None,
                    sink: None,
                    loaded: None,
                    volume: 1.0,
                    ended_emitted: false,
                }
                .run()
            });
        }

        Self {
            id: NEXT_SOURCE_ID.fetch_add(1, Ordering::Relaxed),
            cmd_tx,
            event_rx,
            samples,
            playing,
            paused,
            position,
            duration,
            loaded: None,
        }
    }

    /// Unique identity of this adapter instance, used by the analysis
    /// graph to enforce its one-to-one binding.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The sample ring an analysis graph taps. There is exactly one per
    /// adapter.
    pub fn samples(&self) -> &SampleRing {
        &self.samples
    }

    /// Bind a new track. Resets position to zero and seeds the duration
    /// from the catalog; the audio thread refines it once the source is
    /// probed. An unplayable source surfaces as a [`SourceEvent::Error`],
    /// never a crash.
    pub fn load(&mut self, track: &Track) {
        self.loaded = Some(track.id);
        if let Ok(mut pos) = self.position.lock() {
            *pos = Duration::ZERO;
        }
        if let Ok(mut dur) = self.duration.lock() {
            *dur = Some(Duration::from_secs(u64::from(track.duration_secs)));
        }
        let _ = self.cmd_tx.send(SourceCommand::Load(PathBuf::from(track.src)));
    }

    /// Request playback start. Fails immediately when no track is
    /// loaded; environment-level rejections (no output device, decode
    /// failure) arrive asynchronously as error events, and the playing
    /// flag stays false in that case.
    pub fn play(&self) -> Result<(), PlayerError> {
        if self.loaded.is_none() {
            return Err(PlayerError::PlaybackRejected("no track loaded".into()));
        }
        let _ = self.cmd_tx.send(SourceCommand::Play);
        Ok(())
    }

    /// Stop playback without releasing the source. Always succeeds.
    pub fn pause(&self) {
        let _ = self.cmd_tx.send(SourceCommand::Pause);
    }

    /// Seek to an absolute position in seconds. Clamps into
    /// `[0, duration]` when the duration is known, to `>= 0` otherwise.
    /// The position mirror updates immediately, before the audio thread
    /// confirms.
    pub fn seek(&self, seconds: f64) {
        let clamped = match self.duration() {
            Some(d) => seconds.clamp(0.0, d.as_secs_f64()),
            None => seconds.max(0.0),
        };
        let target = Duration::from_secs_f64(clamped);
        if let Ok(mut pos) = self.position.lock() {
            *pos = target;
        }
        let _ = self.cmd_tx.send(SourceCommand::Seek(target));
    }

    /// Set output volume as a fraction, clamped to `[0, 1]`. Mute
    /// bookkeeping lives in the playback controller.
    pub fn set_volume(&self, fraction: f32) {
        let v = fraction.clamp(0.0, 1.0);
        let _ = self.cmd_tx.send(SourceCommand::SetVolume(v));
    }

    /// Halt playback and drop the queued source.
    pub fn stop(&self) {
        let _ = self.cmd_tx.send(SourceCommand::Stop);
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Current playback position (optimistic mirror).
    pub fn position(&self) -> Duration {
        self.position.lock().map(|p| *p).unwrap_or(Duration::ZERO)
    }

    /// Total duration, once known.
    pub fn duration(&self) -> Option<Duration> {
        self.duration.lock().ok().and_then(|d| *d)
    }

    pub fn loaded_track(&self) -> Option<TrackId> {
        self.loaded
    }

    /// Drain one pending lifecycle event, if any.
    pub fn poll_event(&self) -> Option<SourceEvent> {
        self.event_rx.try_recv().ok()
    }
}

impl Default for AudioSource {
    fn default() -> Self {
        Self::new()
    }
}

/// State owned by the audio thread.
struct AudioThread {
    cmd_rx: Receiver<SourceCommand>,
    event_tx: Sender<SourceEvent>,
    samples: SampleRing,
    playing: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
    position: Arc<Mutex<Duration>>,
    duration: Arc<Mutex<Option<Duration>>>,
    output: Option<(OutputStream, OutputStreamHandle)>,
    sink: Option<Sink>,
    loaded: Option<PathBuf>,
    volume: f32,
    ended_emitted: bool,
}

impl AudioThread {
    fn run(mut self) {
        loop {
            match self.cmd_rx.recv_timeout(PROGRESS_INTERVAL) {
                Ok(cmd) => self.handle(cmd),
                Err(RecvTimeoutError::Timeout) => self.report_progress(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        // Owner dropped: release the sink and stream.
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.output = None;
    }

    fn handle(&mut self, cmd: SourceCommand) {
        match cmd {
            SourceCommand::Load(path) => self.load(path),
            SourceCommand::Play => self.play(),
            SourceCommand::Pause => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
                self.paused.store(true, Ordering::SeqCst);
            }
            SourceCommand::Seek(target) => self.seek(target),
            SourceCommand::SetVolume(v) => {
                self.volume = v;
                if let Some(sink) = &self.sink {
                    sink.set_volume(v);
                }
            }
            SourceCommand::Stop => {
                if let Some(sink) = self.sink.take() {
                    sink.stop();
                }
                self.playing.store(false, Ordering::SeqCst);
                self.paused.store(false, Ordering::SeqCst);
                self.set_position(Duration::ZERO);
            }
        }
    }

    fn load(&mut self, path: PathBuf) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.playing.store(false, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
        self.ended_emitted = false;
        if let Ok(mut ring) = self.samples.lock() {
            use ringbuf::traits::*;
            ring.clear();
        }

        // Probe the file so unplayable sources surface before playback.
        match open_source(&path) {
            Ok(decoder) => {
                if let Some(probed) = decoder.total_duration() {
                    if let Ok(mut dur) = self.duration.lock() {
                        *dur = Some(probed);
                    }
                }
                let duration = self
                    .duration
                    .lock()
                    .ok()
                    .and_then(|d| *d)
                    .unwrap_or(Duration::ZERO);
                self.loaded = Some(path);
                let _ = self.event_tx.send(SourceEvent::Ready { duration });
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "source unplayable");
                self.loaded = None;
                let _ = self.event_tx.send(SourceEvent::Error(e));
            }
        }
    }

    fn play(&mut self) {
        let Some(path) = self.loaded.clone() else {
            let _ = self
                .event_tx
                .send(SourceEvent::Error(PlayerError::PlaybackRejected(
                    "no track loaded".into(),
                )));
            return;
        };

        // Resuming a paused sink needs no rebuild.
        if let Some(sink) = &self.sink {
            if !sink.empty() {
                sink.play();
                self.playing.store(true, Ordering::SeqCst);
                self.paused.store(false, Ordering::SeqCst);
                return;
            }
        }

        // Establishing the output stream is the explicit "resume the
        // audio context" step of the play path; it can be rejected by
        // the environment.
        if self.output.is_none() {
            match OutputStream::try_default() {
                Ok(out) => self.output = Some(out),
                Err(e) => {
                    warn!(error = %e, "audio output unavailable");
                    self.playing.store(false, Ordering::SeqCst);
                    let _ = self
                        .event_tx
                        .send(SourceEvent::Error(PlayerError::PlaybackRejected(
                            e.to_string(),
                        )));
                    return;
                }
            }
        }
        let Some((_stream, handle)) = &self.output else {
            return;
        };

        let decoder = match open_source(&path) {
            Ok(d) => d,
            Err(e) => {
                self.playing.store(false, Ordering::SeqCst);
                let _ = self.event_tx.send(SourceEvent::Error(e));
                return;
            }
        };

        let sink = match Sink::try_new(handle) {
            Ok(s) => s,
            Err(e) => {
                self.playing.store(false, Ordering::SeqCst);
                let _ = self
                    .event_tx
                    .send(SourceEvent::Error(PlayerError::PlaybackRejected(
                        e.to_string(),
                    )));
                return;
            }
        };

        let tapped = SampleTap::new(decoder.convert_samples::<f32>(), self.samples.clone());
        sink.append(tapped);
        sink.set_volume(self.volume);

        let resume_at = self.position.lock().map(|p| *p).unwrap_or(Duration::ZERO);
        if !resume_at.is_zero() {
            if let Err(e) = sink.try_seek(resume_at) {
                warn!(error = ?e, "seek on play was not honored");
            }
        }

        sink.play();
        self.sink = Some(sink);
        self.ended_emitted = false;
        self.playing.store(true, Ordering::SeqCst);
        self.paused.store(false, Ordering::SeqCst);
    }

    fn seek(&mut self, target: Duration) {
        self.set_position(target);
        if let Some(sink) = &self.sink {
            if let Err(e) = sink.try_seek(target) {
                warn!(error = ?e, "seek not supported by source");
            }
        }
        // With no sink the mirror holds the target; the next play()
        // resumes from it.
    }

    fn report_progress(&mut self) {
        let (empty, paused, pos) = match &self.sink {
            Some(sink) => (sink.empty(), sink.is_paused(), sink.get_pos()),
            None => return,
        };

        if empty {
            if self.playing.load(Ordering::SeqCst) && !self.ended_emitted {
                self.ended_emitted = true;
                self.playing.store(false, Ordering::SeqCst);
                self.paused.store(false, Ordering::SeqCst);
                if let Some(total) = self.duration.lock().ok().and_then(|d| *d) {
                    self.set_position(total);
                }
                self.sink = None;
                let _ = self.event_tx.send(SourceEvent::Ended);
            }
            return;
        }

        if !paused {
            self.set_position(pos);
            let _ = self.event_tx.send(SourceEvent::TimeUpdate { position: pos });
        }
    }

    fn set_position(&self, pos: Duration) {
        if let Ok(mut mirror) = self.position.lock() {
            *mirror = pos;
        }
    }
}

fn open_source(path: &Path) -> Result<Decoder<BufReader<File>>, PlayerError> {
    let file =
        File::open(path).map_err(|e| PlayerError::SourceUnplayable(format!("{path:?}: {e}")))?;
    Decoder::new(BufReader::new(file))
        .map_err(|e| PlayerError::SourceUnplayable(format!("{path:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{self, TrackId};

    #[test]
    fn test_play_without_load_is_rejected() {
        let source = AudioSource::new();
        let err = source.play().unwrap_err();
        assert!(matches!(err, PlayerError::PlaybackRejected(_)));
        assert!(!source.is_playing());
    }

    #[test]
    fn test_load_seeds_duration_and_resets_position() {
        let mut source = AudioSource::new();
        let track = catalog::get_track_by_id(TrackId(1)).unwrap();
        source.seek(10.0);
        source.load(track);
        assert_eq!(source.position(), Duration::ZERO);
        assert_eq!(source.duration(), Some(Duration::from_secs(222)));
        assert_eq!(source.loaded_track(), Some(TrackId(1)));
    }

    #[test]
    fn test_seek_clamps_to_known_duration() {
        let mut source = AudioSource::new();
        let track = catalog::get_track_by_id(TrackId(1)).unwrap();
        source.load(track);

        source.seek(300.0);
        assert_eq!(source.position(), Duration::from_secs(222));

        source.seek(-5.0);
        assert_eq!(source.position(), Duration::ZERO);

        source.seek(30.0);
        assert_eq!(source.position(), Duration::from_secs(30));
    }

    #[test]
    fn test_seek_without_duration_clamps_to_zero() {
        let source = AudioSource::new();
        source.seek(-3.0);
        assert_eq!(source.position(), Duration::ZERO);
        source.seek(42.0);
        assert_eq!(source.position(), Duration::from_secs(42));
    }

    #[test]
    fn test_unplayable_source_surfaces_error_event() {
        let mut source = AudioSource::new();
        let track = catalog::get_track_by_id(TrackId(3)).unwrap();
        source.load(track);

        // The fixture path does not exist on disk, so the audio thread
        // reports the probe failure.
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        loop {
            if let Some(SourceEvent::Error(e)) = source.poll_event() {
                assert!(matches!(e, PlayerError::SourceUnplayable(_)));
                break;
            }
            assert!(
                std::time::Instant::now() < deadline,
                "no error event arrived"
            );
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!source.is_playing());
    }

    #[test]
    fn test_adapter_ids_are_unique() {
        let a = AudioSource::new();
        let b = AudioSource::new();
        assert_ne!(a.id(), b.id());
    }
}
