//! Playback timing data consumed by the audio reactive visualizer.
//!
//! The streaming service integration publishes events into a [`PlaybackFeed`],
//! the visualizer blocks on the feed and renders each event as it arrives.

use std::{
    sync::{
        mpsc::{self, Receiver, RecvError, SyncSender, TryRecvError, TrySendError},
        Arc, Mutex, PoisonError,
    },
    time::Duration,
};

/// Default capacity of the playback feed.
pub const DEFAULT_FEED_CAPACITY: usize = 64;

/// Number of pitch classes in a segment.
pub const PITCH_CLASSES: usize = 12;

/// A single piece of playback timing data.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// A beat has started.
    Beat {
        /// Beat loudness in `0.0..=1.0`.
        loudness: f32,
        duration: Duration,
    },
    /// A segment with a roughly constant timbre and pitch content has started.
    Segment {
        loudness: f32,
        /// Relative strength of every pitch class, `C` first.
        pitches: [f32; PITCH_CLASSES],
    },
    /// Playback has been paused.
    Paused,
    /// A new track has started.
    TrackChanged { title: String },
}

#[derive(Debug)]
enum FeedMessage {
    Event(PlaybackEvent),
    Interrupt,
}

/// Bounded queue of playback events with an explicit interrupt message.
#[derive(Debug)]
pub struct PlaybackFeed {
    tx: SyncSender<FeedMessage>,
    rx: Mutex<Receiver<FeedMessage>>,
}

/// Cheap handle used by the streaming integration to publish events.
#[derive(Debug, Clone)]
pub struct PlaybackPublisher {
    tx: SyncSender<FeedMessage>,
}

impl PlaybackFeed {
    pub fn new(capacity: usize) -> Arc<Self> {
        let (tx, rx) = mpsc::sync_channel(capacity);
        Arc::new(Self {
            tx,
            rx: Mutex::new(rx),
        })
    }

    pub fn publisher(&self) -> PlaybackPublisher {
        PlaybackPublisher {
            tx: self.tx.clone(),
        }
    }

    /// Blocks until the next event arrives.
    ///
    /// Returns `None` if the feed has been interrupted.
    pub fn next_event(&self) -> Option<PlaybackEvent> {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        match rx.recv() {
            Ok(FeedMessage::Event(event)) => Some(event),
            // The feed owns a sender, so the channel is never disconnected.
            Ok(FeedMessage::Interrupt) | Err(RecvError) => None,
        }
    }

    /// Unblocks the consumer waiting in [`PlaybackFeed::next_event`].
    pub fn interrupt(&self) {
        // A full queue means the consumer is not blocked and will poll its
        // cancellation signal after the next event.
        let _ = self.tx.try_send(FeedMessage::Interrupt);
    }

    /// Discards every queued event and stale interrupt, returns the number of
    /// dropped events.
    pub fn drain(&self) -> usize {
        let rx = self.rx.lock().unwrap_or_else(PoisonError::into_inner);
        let mut dropped = 0;
        loop {
            match rx.try_recv() {
                Ok(FeedMessage::Event(_)) => dropped += 1,
                Ok(FeedMessage::Interrupt) => {}
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break dropped,
            }
        }
    }
}

impl PlaybackPublisher {
    /// Publishes an event without blocking.
    ///
    /// Playback timing data is only useful in real time, so the event is dropped
    /// if nobody is consuming the feed. Returns `false` in that case.
    pub fn publish(&self, event: PlaybackEvent) -> bool {
        match self.tx.try_send(FeedMessage::Event(event)) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => false,
        }
    }
}
