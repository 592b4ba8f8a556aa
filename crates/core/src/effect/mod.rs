//! Effect routines and the contract they share with the scheduler.
//!
//! An effect is a possibly infinite sequence of rendering passes. Between any two
//! device writes a routine polls its [`CancellationSignal`]: [`EffectContext::draw`]
//! and [`EffectContext::pause`] do it on the routine's behalf and return
//! [`Error::Interrupted`] once the signal is cancelled, so routines simply
//! propagate it with `?`.

use std::{
    sync::{
        atomic::{AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

use serde::Serialize;

pub use self::{
    chase::RainbowChase,
    daytime::{sky_color, DayTimeSync},
    flash::FlashAround,
    rainbow::{CycleThroughRainbow, RainbowCycle},
    visualizer::Visualizer,
};
use crate::{
    display::{Display, SharedDisplay},
    signal::CancellationSignal,
    Error, Result,
};

mod chase;
mod daytime;
mod flash;
mod rainbow;
mod visualizer;

/// Out-of-band stop request for routines that block on external I/O and cannot
/// poll their signal promptly.
pub trait StopHook: Send + Sync {
    /// Unblocks the routine, it must return soon after this call.
    fn request_stop(&self);
}

/// A long running unit of work that renders onto the shared display.
pub trait Effect: Send + 'static {
    /// Short effect name used in logs and status reports.
    fn name(&self) -> &'static str;

    /// One-shot synchronous work performed by the scheduler before the routine
    /// thread is spawned, while no other routine is running.
    fn prepare(&mut self, _display: &mut Display) -> Result<()> {
        Ok(())
    }

    /// Renders a single pass of the effect.
    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> Result<()>;

    /// Returns a hook that unblocks the routine if it can block outside of the
    /// context methods.
    fn stop_hook(&self) -> Option<Arc<dyn StopHook>> {
        None
    }
}

/// Options the effect routine is dispatched with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOptions {
    /// Run passes until cancelled instead of a single pass.
    pub repeat: bool,
}

impl RunOptions {
    pub const ONCE: Self = Self { repeat: false };
    pub const REPEAT: Self = Self { repeat: true };
}

/// Lifecycle of a dispatched routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EffectState {
    /// The routine thread has been spawned but has not started rendering yet.
    Dispatched = 0,
    Running = 1,
    /// The signal has been cancelled, the scheduler is waiting for the thread.
    Stopping = 2,
    /// The thread has been joined after a cancellation.
    Stopped = 3,
    /// A single pass routine has finished on its own.
    Completed = 4,
    /// The routine has returned an error.
    Failed = 5,
}

impl EffectState {
    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Dispatched,
            1 => Self::Running,
            2 => Self::Stopping,
            3 => Self::Stopped,
            4 => Self::Completed,
            _ => Self::Failed,
        }
    }

    /// Returns `true` if the routine thread has exited or is about to exit.
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Stopped | Self::Completed | Self::Failed)
    }
}

/// Lifecycle state shared between the routine thread and the scheduler.
#[derive(Debug, Clone)]
pub struct Lifecycle(Arc<AtomicU8>);

impl Default for Lifecycle {
    fn default() -> Self {
        Self(Arc::new(AtomicU8::new(EffectState::Dispatched as u8)))
    }
}

impl Lifecycle {
    pub fn state(&self) -> EffectState {
        EffectState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves the lifecycle from `from` to `to`, returns `false` if the current
    /// state is not `from`.
    pub fn advance(&self, from: EffectState, to: EffectState) -> bool {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Rendering context handed to [`Effect::render_pass`].
pub struct EffectContext<'a> {
    display: &'a SharedDisplay,
    signal: &'a CancellationSignal,
    frames: u64,
}

impl<'a> EffectContext<'a> {
    pub fn new(display: &'a SharedDisplay, signal: &'a CancellationSignal) -> Self {
        Self {
            display,
            signal,
            frames: 0,
        }
    }

    /// Returns [`Error::Interrupted`] if the routine has been told to stop.
    pub fn checkpoint(&self) -> Result<()> {
        if self.signal.should_continue() {
            Ok(())
        } else {
            Err(Error::Interrupted)
        }
    }

    /// Composes a frame with the given closure and writes it to the device.
    ///
    /// The signal is checked while holding the display lock, right before the
    /// frame is composed.
    pub fn draw<F>(&mut self, compose: F) -> Result<()>
    where
        F: FnOnce(&mut Display) -> Result<()>,
    {
        let mut display = self.display.lock();
        self.checkpoint()?;
        compose(&mut display)?;
        display.show()?;
        self.frames += 1;
        Ok(())
    }

    /// Reads the display state without writing a frame.
    pub fn inspect<T, F>(&self, read: F) -> T
    where
        F: FnOnce(&Display) -> T,
    {
        read(&self.display.lock())
    }

    /// Waits between two rendering steps, wakes up early on cancellation.
    pub fn pause(&self, duration: Duration) -> Result<()> {
        if self.signal.sleep(duration) {
            Ok(())
        } else {
            Err(Error::Interrupted)
        }
    }

    /// Number of frames drawn through this context.
    pub const fn frames(&self) -> u64 {
        self.frames
    }
}

/// How a routine run has ended.
#[derive(Debug)]
pub enum Outcome {
    /// All passes have been rendered.
    Completed,
    /// The routine observed its cancellation.
    Interrupted,
    Failed(Error),
}

/// Runs the effect routine until it completes, fails or observes its cancellation.
///
/// An interrupted routine leaves the display blank.
pub fn run(
    effect: &mut dyn Effect,
    options: RunOptions,
    display: &SharedDisplay,
    signal: &CancellationSignal,
) -> Outcome {
    let mut ctx = EffectContext::new(display, signal);
    let result = loop {
        if let Err(err) = effect.render_pass(&mut ctx) {
            break Err(err);
        }
        if !options.repeat {
            break Ok(());
        }
        if let Err(err) = ctx.checkpoint() {
            break Err(err);
        }
    };

    log::debug!(
        "Effect {} has rendered {} frames",
        effect.name(),
        ctx.frames()
    );
    match result {
        Ok(()) => Outcome::Completed,
        Err(Error::Interrupted) => {
            if let Err(err) = display.lock().clear() {
                log::warn!("Unable to blank the display after {}: {err}", effect.name());
            }
            Outcome::Interrupted
        }
        Err(err) => Outcome::Failed(err),
    }
}
