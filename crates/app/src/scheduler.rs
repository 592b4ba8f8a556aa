//! Single slot effect scheduler.

use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    thread::{self, JoinHandle},
};

use hexlight_core::{
    effect::{self, Lifecycle, Outcome},
    CancellationSignal, Display, Effect, EffectState, RunOptions, SharedDisplay, StopHook,
};
use serde::Serialize;

use crate::{HexlightError, HexlightResult};

/// Name and lifecycle state of a dispatched effect routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EffectStatus {
    pub name: &'static str,
    pub state: EffectState,
}

/// Handle of the routine thread occupying the slot.
struct RenderTask {
    name: &'static str,
    thread: JoinHandle<()>,
    signal: CancellationSignal,
    stop_hook: Option<Arc<dyn StopHook>>,
    lifecycle: Lifecycle,
}

impl RenderTask {
    fn spawn(
        mut effect: Box<dyn Effect>,
        options: RunOptions,
        display: SharedDisplay,
    ) -> HexlightResult<Self> {
        let name = effect.name();
        let signal = CancellationSignal::new();
        let stop_hook = effect.stop_hook();
        let lifecycle = Lifecycle::default();

        let thread = thread::Builder::new()
            .name(format!("effect-{name}"))
            .spawn({
                let signal = signal.clone();
                let lifecycle = lifecycle.clone();
                move || {
                    lifecycle.advance(EffectState::Dispatched, EffectState::Running);
                    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                        effect::run(effect.as_mut(), options, &display, &signal)
                    }));
                    match outcome {
                        Ok(Outcome::Completed) => {
                            lifecycle.advance(EffectState::Running, EffectState::Completed);
                            log::info!("Effect {name} has completed");
                        }
                        Ok(Outcome::Interrupted) => {
                            log::debug!("Effect {name} has observed its cancellation");
                        }
                        Ok(Outcome::Failed(err)) => {
                            lifecycle.advance(EffectState::Running, EffectState::Failed);
                            log::error!("Effect {name} has failed: {err}");
                        }
                        Err(_) => {
                            lifecycle.advance(EffectState::Running, EffectState::Failed);
                            log::error!("Effect {name} has panicked");
                        }
                    }
                }
            })
            .map_err(HexlightError::Spawn)?;

        Ok(Self {
            name,
            thread,
            signal,
            stop_hook,
            lifecycle,
        })
    }

    fn status(&self) -> EffectStatus {
        EffectStatus {
            name: self.name,
            state: self.lifecycle.state(),
        }
    }

    /// Cancels the routine and waits until its thread exits.
    fn stop(self) -> EffectStatus {
        // A routine that has already finished keeps its final state.
        if !self
            .lifecycle
            .advance(EffectState::Running, EffectState::Stopping)
        {
            self.lifecycle
                .advance(EffectState::Dispatched, EffectState::Stopping);
        }

        self.signal.cancel();
        if let Some(hook) = &self.stop_hook {
            hook.request_stop();
        }
        if self.thread.join().is_err() {
            log::error!("Effect {} has panicked", self.name);
        }
        self.lifecycle
            .advance(EffectState::Stopping, EffectState::Stopped);

        let status = EffectStatus {
            name: self.name,
            state: self.lifecycle.state(),
        };
        log::info!("Effect {} has been joined in state {:?}", status.name, status.state);
        status
    }
}

/// Keeps at most one effect routine running on the display.
///
/// Every operation that touches the slot holds its lock for the whole
/// stop-join-dispatch sequence, so concurrent requests are serialized and the
/// previous routine has always exited before the next one is started.
pub struct EffectScheduler {
    display: SharedDisplay,
    slot: Mutex<Option<RenderTask>>,
}

impl core::fmt::Debug for EffectScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        // Never blocks, the slot may be locked by the formatting thread itself.
        let current = self
            .slot
            .try_lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(RenderTask::status));
        f.debug_struct("EffectScheduler")
            .field("current", &current)
            .finish_non_exhaustive()
    }
}

impl EffectScheduler {
    pub fn new(display: SharedDisplay) -> Self {
        Self {
            display,
            slot: Mutex::new(None),
        }
    }

    pub fn display(&self) -> &SharedDisplay {
        &self.display
    }

    fn slot(&self) -> MutexGuard<'_, Option<RenderTask>> {
        // The slot is only replaced as a whole, so it is consistent even if a
        // previous holder has panicked.
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stop_current(slot: &mut Option<RenderTask>) -> Option<EffectStatus> {
        slot.take().map(RenderTask::stop)
    }

    /// Replaces the current effect routine with the given one.
    ///
    /// On return the previous routine has exited and the new one has been
    /// dispatched. Returns the final status of the replaced routine.
    pub fn switch<E>(&self, effect: E, options: RunOptions) -> HexlightResult<Option<EffectStatus>>
    where
        E: Effect,
    {
        self.switch_boxed(Box::new(effect), options)
    }

    /// Same as [`EffectScheduler::switch`] for an already boxed effect.
    pub fn switch_boxed(
        &self,
        mut effect: Box<dyn Effect>,
        options: RunOptions,
    ) -> HexlightResult<Option<EffectStatus>> {
        let mut slot = self.slot();
        let previous = Self::stop_current(&mut slot);

        effect.prepare(&mut self.display.lock())?;
        let task = RenderTask::spawn(effect, options, self.display.clone())?;
        log::info!(
            "Dispatched effect {} (repeat: {})",
            task.name,
            options.repeat
        );
        *slot = Some(task);
        Ok(previous)
    }

    /// Stops the current routine if any and leaves the slot empty.
    pub fn stop_all(&self) -> Option<EffectStatus> {
        let status = Self::stop_current(&mut self.slot());
        if status.is_none() {
            log::debug!("No effect to stop");
        }
        status
    }

    /// Returns `true` if no routine occupies the slot.
    pub fn is_idle(&self) -> bool {
        self.slot().is_none()
    }

    /// Returns the status of the routine occupying the slot.
    pub fn current(&self) -> Option<EffectStatus> {
        self.slot().as_ref().map(RenderTask::status)
    }

    /// Stops the current routine and runs the closure against the display
    /// while no routine can be dispatched.
    pub fn exclusive<T, F>(&self, write: F) -> HexlightResult<T>
    where
        F: FnOnce(&mut Display) -> HexlightResult<T>,
    {
        let mut slot = self.slot();
        Self::stop_current(&mut slot);
        let mut display = self.display.lock();
        write(&mut display)
    }
}

impl Drop for EffectScheduler {
    fn drop(&mut self) {
        let slot = self.slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        Self::stop_current(slot);
    }
}
