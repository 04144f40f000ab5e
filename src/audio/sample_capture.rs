// src/audio/sample_capture.rs
//! Pass-through source that taps decoded samples for analysis.

use std::sync::{Arc, Mutex};

use ringbuf::{HeapRb, traits::*};
use rodio::Source;

/// Shared ring of recent mono samples. Single writer (the audio thread),
/// read per tick by the analysis graph.
pub type SampleRing = Arc<Mutex<HeapRb<f32>>>;

/// Ring capacity: a little over a third of a second at 44.1 kHz, enough
/// for the largest analysis window.
pub const RING_CAPACITY: usize = 16384;

/// Create an empty sample ring.
pub fn new_ring() -> SampleRing {
    Arc::new(Mutex::new(HeapRb::new(RING_CAPACITY)))
}

/// Wraps a playing source and mirrors its output into a [`SampleRing`],
/// downmixing interleaved channels to one mono sample per frame so the
/// analysis graph sees channel-count-independent data.
pub struct SampleTap<S> {
    inner: S,
    ring: SampleRing,
    channels: u16,
    /// Running sum of the current frame's channel samples.
    frame_acc: f32,
    frame_fill: u16,
}

impl<S> SampleTap<S>
where
    S: Source<Item = f32>,
{
    pub fn new(inner: S, ring: SampleRing) -> Self {
        let channels = inner.channels().max(1);
        Self {
            inner,
            ring,
            channels,
            frame_acc: 0.0,
            frame_fill: 0,
        }
    }

    fn push_mono(&mut self, sample: f32) {
        if let Ok(mut ring) = self.ring.lock() {
            if ring.is_full() {
                let _ = ring.try_pop();
            }
            let _ = ring.try_push(sample);
        }
    }
}

impl<S> Iterator for SampleTap<S>
where
    S: Source<Item = f32>,
{
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let sample = self.inner.next()?;
        self.frame_acc += sample;
        self.frame_fill += 1;
        if self.frame_fill == self.channels {
            let mono = self.frame_acc / self.channels as f32;
            self.frame_acc = 0.0;
            self.frame_fill = 0;
            self.push_mono(mono);
        }
        Some(sample)
    }
}

impl<S> Source for SampleTap<S>
where
    S: Source<Item = f32>,
{
    fn current_frame_len(&self) -> Option<usize> {
        self.inner.current_frame_len()
    }

    fn channels(&self) -> u16 {
        self.inner.channels()
    }

    fn sample_rate(&self) -> u32 {
        self.inner.sample_rate()
    }

    fn total_duration(&self) -> Option<std::time::Duration> {
        self.inner.total_duration()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct TestSource {
        samples: std::vec::IntoIter<f32>,
        channels: u16,
    }

    impl Iterator for TestSource {
        type Item = f32;
        fn next(&mut self) -> Option<f32> {
            self.samples.next()
        }
    }

    impl Source for TestSource {
        fn current_frame_len(&self) -> Option<usize> {
            None
        }
        fn channels(&self) -> u16 {
            self.channels
        }
        fn sample_rate(&self) -> u32 {
            44_100
        }
        fn total_duration(&self) -> Option<std::time::Duration> {
            None
        }
    }

    #[test]
    fn test_stereo_downmix_to_mono() {
        let ring = new_ring();
        let source = TestSource {
            samples: vec![1.0, 0.0, 0.5, 0.5, -1.0, 1.0].into_iter(),
            channels: 2,
        };
        let tap = SampleTap::new(source, ring.clone());
        let passed: Vec<f32> = tap.collect();
        assert_eq!(passed.len(), 6);

        let captured: Vec<f32> = ring.lock().unwrap().iter().copied().collect();
        assert_eq!(captured, vec![0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_mono_passes_through() {
        let ring = new_ring();
        let source = TestSource {
            samples: vec![0.25, -0.25].into_iter(),
            channels: 1,
        };
        let tap = SampleTap::new(source, ring.clone());
        let _: Vec<f32> = tap.collect();
        let captured: Vec<f32> = ring.lock().unwrap().iter().copied().collect();
        assert_eq!(captured, vec![0.25, -0.25]);
    }

    #[test]
    fn test_ring_overwrites_oldest_when_full() {
        let ring = Arc::new(Mutex::new(HeapRb::new(4)));
        let source = TestSource {
            samples: (0..8).map(|i| i as f32).collect::<Vec<_>>().into_iter(),
            channels: 1,
        };
        let tap = SampleTap::new(source, ring.clone());
        let _: Vec<f32> = tap.collect();
        let captured: Vec<f32> = ring.lock().unwrap().iter().copied().collect();
        assert_eq!(captured, vec![4.0, 5.0, 6.0, 7.0]);
    }
}
