// src/error.rs
//! Error types for playback and analysis operations.

/// Errors surfaced by the playback and visualization subsystems.
///
/// Playback errors are recoverable UI states; analysis errors are soft
/// capability gaps that never interrupt audio.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The bound source cannot be opened or decoded. Playback stays stopped.
    #[error("source unplayable: {0}")]
    SourceUnplayable(String),

    /// The environment refused to start playback (no output device, or no
    /// track loaded). Retry is allowed on the next explicit user action.
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    /// Frequency/waveform analysis is unavailable. The player keeps
    /// running; the visualizer idles.
    #[error("analysis unavailable")]
    AnalysisUnavailable,

    /// A second analysis graph was attached to a source that is already
    /// bound. The caller must detach first.
    #[error("analysis graph already bound to another source")]
    GraphAlreadyBound,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = PlayerError::SourceUnplayable("bad.mp3".into());
        assert_eq!(e.to_string(), "source unplayable: bad.mp3");
        assert_eq!(
            PlayerError::GraphAlreadyBound.to_string(),
            "analysis graph already bound to another source"
        );
    }
}
