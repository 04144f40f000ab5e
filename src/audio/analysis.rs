// src/audio/analysis.rs
//! Analysis graph: frequency- and time-domain snapshots of a source.
//!
//! Exactly one graph binds to one audio source. Snapshot buffers are
//! fixed-length and overwritten in place on every pull, so callers must
//! finish with a snapshot before the next tick or copy it out.

use rustfft::{FftPlanner, num_complex::Complex};

use super::sample_capture::SampleRing;
use super::source::AudioSource;
use crate::error::PlayerError;

/// Decibel window mapped onto [0, 1] magnitudes, matching common
/// analyser defaults.
const MIN_DB: f32 = -100.0;
const MAX_DB: f32 = -30.0;

/// Pull-based analysis over the sample ring of one bound source.
pub struct AnalysisGraph {
    /// Frequency transform size; the spectrum has half as many bins.
    spectrum_size: usize,
    /// Time-domain window size, independent of (and larger than) the
    /// spectrum transform.
    waveform_size: usize,
    /// Exponential smoothing across successive frequency snapshots.
    smoothing: f32,
    planner: FftPlanner<f32>,
    /// Bound source: adapter id plus its sample ring.
    bound: Option<(u64, SampleRing)>,
    /// Frequency snapshot, length `spectrum_size / 2`. Overwritten in
    /// place on every pull.
    freq_bins: Vec<f32>,
    /// Waveform snapshot, length `waveform_size`. Overwritten in place.
    waveform: Vec<f32>,
    scratch: Vec<Complex<f32>>,
}

impl AnalysisGraph {
    /// Transform sizes and smoothing are fixed for the lifetime of the
    /// graph; there is no mid-session reconfiguration.
    pub fn new(spectrum_size: usize, waveform_size: usize, smoothing: f32) -> Self {
        Self {
            spectrum_size,
            waveform_size,
            smoothing: smoothing.clamp(0.0, 0.99),
            planner: FftPlanner::new(),
            bound: None,
            freq_bins: vec![0.0; spectrum_size / 2],
            waveform: vec![0.0; waveform_size],
            scratch: vec![Complex::new(0.0, 0.0); spectrum_size],
        }
    }

    /// Bind this graph to a source's sample ring.
    ///
    /// Idempotent per adapter instance: attaching the same source again
    /// is a no-op. Attaching a different source while bound fails with
    /// [`PlayerError::GraphAlreadyBound`]; the caller must detach first.
    pub fn attach(&mut self, source: &AudioSource) -> Result<(), PlayerError> {
        match &self.bound {
            Some((id, _)) if *id == source.id() => Ok(()),
            Some(_) => Err(PlayerError::GraphAlreadyBound),
            None => {
                self.bound = Some((source.id(), source.samples().clone()));
                Ok(())
            }
        }
    }

    /// Release the binding. Safe to call when unbound.
    pub fn detach(&mut self) {
        self.bound = None;
        self.freq_bins.fill(0.0);
        self.waveform.fill(0.0);
    }

    pub fn is_attached(&self) -> bool {
        self.bound.is_some()
    }

    /// Number of frequency bins a snapshot carries.
    pub fn bin_count(&self) -> usize {
        self.spectrum_size / 2
    }

    /// Pull the current frequency-domain snapshot: Hann-windowed FFT of
    /// the most recent `spectrum_size` samples, magnitudes mapped from
    /// a fixed dB window onto [0, 1] and smoothed against the previous
    /// snapshot.
    ///
    /// Returns `None` while unattached or sample-starved; both are soft
    /// capability gaps, never playback errors.
    pub fn frequency_snapshot(&mut self) -> Option<&[f32]> {
        let ring = self.bound.as_ref()?.1.clone();
        let n = self.spectrum_size;

        {
            use ringbuf::traits::*;
            let ring = ring.lock().ok()?;
            let available = ring.occupied_len();
            if available < n {
                return None;
            }
            let start = available - n;
            for (i, &sample) in ring.iter().skip(start).take(n).enumerate() {
                // Hann window to limit spectral leakage.
                let w = 0.5
                    * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / n as f32).cos());
                self.scratch[i] = Complex::new(sample * w, 0.0);
            }
        }

        let fft = self.planner.plan_fft_forward(n);
        fft.process(&mut self.scratch);

        let scale = 1.0 / n as f32;
        let smoothing = self.smoothing;
        for (bin, c) in self.freq_bins.iter_mut().zip(self.scratch.iter()) {
            let magnitude = (c.re * c.re + c.im * c.im).sqrt() * scale;
            let db = 20.0 * magnitude.max(1e-10).log10();
            let level = ((db - MIN_DB) / (MAX_DB - MIN_DB)).clamp(0.0, 1.0);
            *bin = smoothing * *bin + (1.0 - smoothing) * level;
        }

        Some(&self.freq_bins)
    }

    /// Pull the current time-domain snapshot: the most recent
    /// `waveform_size` samples, zero-padded at the front while the ring
    /// is still filling. Returns `None` while unattached or before any
    /// sample arrived.
    pub fn waveform_snapshot(&mut self) -> Option<&[f32]> {
        let ring = self.bound.as_ref()?.1.clone();
        let n = self.waveform_size;

        use ringbuf::traits::*;
        let ring = ring.lock().ok()?;
        let available = ring.occupied_len();
        if available == 0 {
            return None;
        }

        let take = available.min(n);
        let pad = n - take;
        self.waveform[..pad].fill(0.0);
        for (slot, sample) in self.waveform[pad..]
            .iter_mut()
            .zip(ring.iter().skip(available - take).take(take))
        {
            *slot = *sample;
        }

        Some(&self.waveform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ringbuf::traits::*;

    fn fill_sine(source: &AudioSource, cycles_per_window: usize, window: usize, len: usize) {
        let mut ring = source.samples().lock().unwrap();
        for i in 0..len {
            let phase =
                2.0 * std::f32::consts::PI * cycles_per_window as f32 * i as f32 / window as f32;
            if ring.is_full() {
                let _ = ring.try_pop();
            }
            // Low amplitude keeps the mapped levels inside the dB window
            // so the spectral peak stays unambiguous.
            let _ = ring.try_push(0.1 * phase.sin());
        }
    }

    #[test]
    fn test_snapshot_requires_attachment() {
        let mut graph = AnalysisGraph::new(256, 2048, 0.8);
        assert!(graph.frequency_snapshot().is_none());
        assert!(graph.waveform_snapshot().is_none());
    }

    #[test]
    fn test_attach_is_idempotent_per_source() {
        let source = AudioSource::new();
        let mut graph = AnalysisGraph::new(256, 2048, 0.8);
        graph.attach(&source).unwrap();
        graph.attach(&source).unwrap();
        assert!(graph.is_attached());
    }

    #[test]
    fn test_attach_other_source_while_bound_fails() {
        let first = AudioSource::new();
        let second = AudioSource::new();
        let mut graph = AnalysisGraph::new(256, 2048, 0.8);
        graph.attach(&first).unwrap();
        assert_eq!(
            graph.attach(&second).unwrap_err(),
            PlayerError::GraphAlreadyBound
        );

        // After an explicit detach the graph can rebind.
        graph.detach();
        graph.attach(&second).unwrap();
    }

    #[test]
    fn test_frequency_snapshot_needs_enough_samples() {
        let source = AudioSource::new();
        let mut graph = AnalysisGraph::new(256, 2048, 0.8);
        graph.attach(&source).unwrap();
        fill_sine(&source, 8, 256, 100);
        assert!(graph.frequency_snapshot().is_none());
    }

    #[test]
    fn test_sine_peaks_in_expected_bin() {
        let source = AudioSource::new();
        // No smoothing so one snapshot reflects the input directly.
        let mut graph = AnalysisGraph::new(256, 2048, 0.0);
        graph.attach(&source).unwrap();
        fill_sine(&source, 8, 256, 256);

        let bins = graph.frequency_snapshot().unwrap().to_vec();
        assert_eq!(bins.len(), 128);
        let peak = bins
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(peak, 8);
    }

    #[test]
    fn test_snapshot_length_is_fixed() {
        let source = AudioSource::new();
        let mut graph = AnalysisGraph::new(256, 2048, 0.8);
        graph.attach(&source).unwrap();
        fill_sine(&source, 4, 256, 4096);

        let first_len = graph.frequency_snapshot().unwrap().len();
        let second_len = graph.frequency_snapshot().unwrap().len();
        assert_eq!(first_len, 128);
        assert_eq!(second_len, 128);
    }

    #[test]
    fn test_smoothing_blends_successive_snapshots() {
        let source = AudioSource::new();
        let mut smoothed = AnalysisGraph::new(256, 2048, 0.8);
        let mut raw = AnalysisGraph::new(256, 2048, 0.0);
        smoothed.attach(&source).unwrap();
        raw.attach(&source).unwrap();
        fill_sine(&source, 8, 256, 256);

        let direct = raw.frequency_snapshot().unwrap()[8];
        let blended = smoothed.frequency_snapshot().unwrap()[8];
        // First smoothed frame rises from zero by the (1 - smoothing)
        // fraction of the raw level.
        assert_relative_eq!(blended, direct * 0.2, epsilon = 1e-4);
    }

    #[test]
    fn test_waveform_zero_pads_partial_ring() {
        let source = AudioSource::new();
        let mut graph = AnalysisGraph::new(256, 2048, 0.8);
        graph.attach(&source).unwrap();
        {
            let mut ring = source.samples().lock().unwrap();
            for _ in 0..100 {
                let _ = ring.try_push(0.5);
            }
        }
        let wave = graph.waveform_snapshot().unwrap();
        assert_eq!(wave.len(), 2048);
        assert_eq!(wave[0], 0.0);
        assert_eq!(wave[2047], 0.5);
    }
}
