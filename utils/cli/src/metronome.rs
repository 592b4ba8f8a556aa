//! Synthetic playback timing data.

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use hexlight_core::{
    playback::{PlaybackEvent, PlaybackPublisher, PITCH_CLASSES},
    CancellationSignal,
};
use rand::Rng;

/// Beats per bar, a new segment starts with every bar.
const BEATS_PER_BAR: u64 = 4;
/// Bars per synthetic track.
const BARS_PER_TRACK: u64 = 16;

/// Publishes beats at a fixed tempo, so the visualizer can be driven without a
/// streaming service.
#[derive(Debug, Clone, Copy)]
pub struct Metronome {
    period: Duration,
}

impl Metronome {
    /// Creates a metronome with the given tempo in beats per minute.
    pub fn new(bpm: u32) -> Self {
        Self {
            period: Duration::from_secs(60) / bpm.max(1),
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Returns the events that start with the given beat.
    pub fn events<R: Rng>(&self, beat: u64, rng: &mut R) -> Vec<PlaybackEvent> {
        let mut events = Vec::with_capacity(3);
        if beat % (BEATS_PER_BAR * BARS_PER_TRACK) == 0 {
            let track = beat / (BEATS_PER_BAR * BARS_PER_TRACK) + 1;
            events.push(PlaybackEvent::TrackChanged {
                title: format!("Metronome track #{track}"),
            });
        }
        if beat % BEATS_PER_BAR == 0 {
            let pitches: [f32; PITCH_CLASSES] = core::array::from_fn(|_| rng.gen());
            events.push(PlaybackEvent::Segment {
                loudness: rng.gen_range(0.3..1.0),
                pitches,
            });
        }
        // The downbeat is the loudest one.
        let loudness = if beat % BEATS_PER_BAR == 0 {
            1.0
        } else {
            rng.gen_range(0.4..0.8)
        };
        events.push(PlaybackEvent::Beat {
            loudness,
            duration: self.period,
        });
        events
    }

    /// Starts publishing events from a background thread.
    pub fn spawn(self, publisher: PlaybackPublisher) -> std::io::Result<MetronomeHandle> {
        let signal = CancellationSignal::new();
        let thread = thread::Builder::new().name("metronome".to_owned()).spawn({
            let signal = signal.clone();
            move || {
                log::info!("Metronome started, beat period is {:?}", self.period);
                let mut rng = rand::thread_rng();
                let mut dropped = 0_u64;
                for beat in 0.. {
                    for event in self.events(beat, &mut rng) {
                        if !publisher.publish(event) {
                            dropped += 1;
                        }
                    }
                    if !signal.sleep(self.period) {
                        break;
                    }
                }
                log::info!("Metronome stopped, {dropped} events were not consumed");
            }
        })?;
        Ok(MetronomeHandle { thread, signal })
    }
}

#[derive(Debug)]
pub struct MetronomeHandle {
    thread: JoinHandle<()>,
    signal: CancellationSignal,
}

impl MetronomeHandle {
    /// Stops the metronome, the thread is woken up in the middle of a beat.
    pub fn stop(self) {
        self.signal.cancel();
        if self.thread.join().is_err() {
            log::error!("Metronome thread has panicked");
        }
    }
}
