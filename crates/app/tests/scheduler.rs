use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use hexlight_app::{EffectScheduler, EffectStatus, HexlightError, HexlightResult};
use hexlight_core::{
    color::BLACK,
    effect::{CycleThroughRainbow, EffectContext, RainbowChase},
    test_utils::recording_display,
    Display, Effect, EffectState, Rgb, RunOptions,
};

const TIMEOUT: Duration = Duration::from_secs(5);

fn wait_for(mut condition: impl FnMut() -> bool) {
    let now = Instant::now();
    while !condition() {
        assert!(now.elapsed() < TIMEOUT, "Condition has not been met in time");
        thread::sleep(Duration::from_millis(1));
    }
}

#[derive(Debug, Default)]
struct Tracker {
    active: AtomicUsize,
    max_active: AtomicUsize,
    started: AtomicUsize,
    finished: AtomicUsize,
}

struct ActiveGuard<'a>(&'a Tracker);

impl Tracker {
    fn enter(&self) -> ActiveGuard<'_> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);
        ActiveGuard(self)
    }
}

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.active.fetch_sub(1, Ordering::SeqCst);
        self.0.finished.fetch_add(1, Ordering::SeqCst);
    }
}

/// Paints the display with its own color until cancelled.
struct Probe {
    color: Rgb,
    tracker: Arc<Tracker>,
}

impl Effect for Probe {
    fn name(&self) -> &'static str {
        "probe"
    }

    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> HexlightResult<()> {
        let _guard = self.tracker.enter();
        loop {
            ctx.draw(|display| {
                display.paint_all(self.color);
                Ok(())
            })?;
            ctx.pause(Duration::from_millis(1))?;
        }
    }
}

struct FailingPrepare;

impl Effect for FailingPrepare {
    fn name(&self) -> &'static str {
        "failing_prepare"
    }

    fn prepare(&mut self, _display: &mut Display) -> HexlightResult<()> {
        Err(HexlightError::InvalidLayout("test".to_owned()))
    }

    fn render_pass(&mut self, _ctx: &mut EffectContext<'_>) -> HexlightResult<()> {
        unreachable!("The routine must not be spawned")
    }
}

struct Broken;

impl Effect for Broken {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn render_pass(&mut self, _ctx: &mut EffectContext<'_>) -> HexlightResult<()> {
        Err(HexlightError::Device("disconnected".to_owned()))
    }
}

struct Panicking;

impl Effect for Panicking {
    fn name(&self) -> &'static str {
        "panicking"
    }

    fn render_pass(&mut self, _ctx: &mut EffectContext<'_>) -> HexlightResult<()> {
        panic!("Routine has panicked")
    }
}

/// Panics while holding the display lock.
struct PanickingDraw;

impl Effect for PanickingDraw {
    fn name(&self) -> &'static str {
        "panicking_draw"
    }

    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> HexlightResult<()> {
        ctx.draw(|_display| panic!("Routine has panicked while drawing"))
    }
}

fn is_chase_frame(frame: &[Rgb]) -> bool {
    let dark = frame.iter().filter(|led| **led == BLACK).count();
    dark * RainbowChase::SPACING >= frame.len() * (RainbowChase::SPACING - 1)
}

#[test]
fn test_concurrent_switches_leave_single_routine() {
    let _ = env_logger::try_init();

    let (display, _strip) = recording_display();
    let scheduler = Arc::new(EffectScheduler::new(display));
    let tracker = Arc::new(Tracker::default());

    let handles: Vec<_> = (0..10_u8)
        .map(|i| {
            let scheduler = scheduler.clone();
            let tracker = tracker.clone();
            thread::spawn(move || {
                let probe = Probe {
                    color: Rgb { r: i + 1, g: 0, b: 0 },
                    tracker,
                };
                scheduler.switch(probe, RunOptions::REPEAT).unwrap()
            })
        })
        .collect();
    let replaced: Vec<Option<EffectStatus>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Only the first switch has found the slot empty, every other one has
    // stopped its predecessor.
    assert_eq!(replaced.iter().filter(|status| status.is_none()).count(), 1);
    for status in replaced.into_iter().flatten() {
        assert_eq!(status.state, EffectState::Stopped);
    }

    wait_for(|| tracker.started.load(Ordering::SeqCst) == 10);
    assert_eq!(tracker.finished.load(Ordering::SeqCst), 9);
    assert_eq!(tracker.max_active.load(Ordering::SeqCst), 1);
    assert_eq!(scheduler.current().unwrap().state, EffectState::Running);

    let survivor = scheduler.stop_all().unwrap();
    assert_eq!(survivor.state, EffectState::Stopped);
    assert_eq!(tracker.active.load(Ordering::SeqCst), 0);
    assert_eq!(tracker.finished.load(Ordering::SeqCst), 10);
    assert!(scheduler.is_idle());
}

#[test]
fn test_switch_hands_off_cleanly() {
    let _ = env_logger::try_init();

    let (display, strip) = recording_display();
    let scheduler = EffectScheduler::new(display);

    scheduler
        .switch(
            CycleThroughRainbow::new(Duration::from_millis(1)),
            RunOptions::REPEAT,
        )
        .unwrap();
    wait_for(|| strip.frames_count() > 5);

    let previous = scheduler
        .switch(
            RainbowChase::new(Duration::from_millis(1)),
            RunOptions::REPEAT,
        )
        .unwrap()
        .unwrap();
    assert_eq!(previous.name, "cycle_through_rainbow");
    assert_eq!(previous.state, EffectState::Stopped);
    let handoff = strip.frames_count();

    wait_for(|| strip.frames_count() > handoff + 5);
    scheduler.stop_all();

    let frames = strip.frames();
    assert!(frames[..handoff]
        .iter()
        .any(|frame| frame.iter().all(|led| *led != BLACK)));
    assert!(frames[handoff..].iter().all(|frame| is_chase_frame(frame)));
    assert!(frames.last().unwrap().iter().all(|led| *led == BLACK));
}

#[test]
fn test_stop_all_is_idempotent() {
    let (display, strip) = recording_display();
    let scheduler = EffectScheduler::new(display);

    assert_eq!(scheduler.stop_all(), None);
    assert_eq!(strip.frames_count(), 0);

    scheduler
        .switch(
            RainbowChase::new(Duration::from_millis(1)),
            RunOptions::REPEAT,
        )
        .unwrap();
    assert!(!scheduler.is_idle());

    let status = scheduler.stop_all().unwrap();
    assert_eq!(status.name, "rainbow_chase");
    assert_eq!(status.state, EffectState::Stopped);
    let frames = strip.frames_count();

    assert_eq!(scheduler.stop_all(), None);
    assert!(scheduler.is_idle());
    thread::sleep(Duration::from_millis(10));
    assert_eq!(strip.frames_count(), frames);
}

#[test]
fn test_single_pass_stays_completed() {
    let (display, strip) = recording_display();
    let scheduler = EffectScheduler::new(display);

    scheduler
        .switch(CycleThroughRainbow::new(Duration::ZERO), RunOptions::ONCE)
        .unwrap();
    wait_for(|| scheduler.current().unwrap().state == EffectState::Completed);
    assert_eq!(strip.frames_count(), 256);
    assert!(!scheduler.is_idle());

    let status = scheduler.stop_all().unwrap();
    assert_eq!(status.state, EffectState::Completed);
    assert!(scheduler.is_idle());
    // The completed routine leaves its last frame on the display.
    assert_eq!(strip.frames_count(), 256);
}

#[test]
fn test_exclusive_preempts_running_effect() {
    let (display, strip) = recording_display();
    let scheduler = EffectScheduler::new(display);
    let color = Rgb { r: 7, g: 8, b: 9 };

    scheduler
        .switch(
            RainbowChase::new(Duration::from_millis(1)),
            RunOptions::REPEAT,
        )
        .unwrap();
    scheduler
        .exclusive(|display| display.set_color(color))
        .unwrap();
    assert!(scheduler.is_idle());

    let frames = strip.frames_count();
    thread::sleep(Duration::from_millis(10));
    assert_eq!(strip.frames_count(), frames);
    assert!(strip.last_frame().unwrap().iter().all(|led| *led == color));
}

#[test]
fn test_prepare_failure_leaves_slot_empty() {
    let (display, _strip) = recording_display();
    let scheduler = EffectScheduler::new(display);

    scheduler
        .switch(
            RainbowChase::new(Duration::from_millis(1)),
            RunOptions::REPEAT,
        )
        .unwrap();
    let err = scheduler
        .switch(FailingPrepare, RunOptions::REPEAT)
        .unwrap_err();

    assert!(matches!(err, HexlightError::InvalidLayout(_)));
    assert!(scheduler.is_idle());
}

#[test]
fn test_failed_routine_is_reported() {
    let _ = env_logger::try_init();

    let (display, _strip) = recording_display();
    let scheduler = EffectScheduler::new(display);

    scheduler.switch(Broken, RunOptions::REPEAT).unwrap();
    wait_for(|| scheduler.current().unwrap().state == EffectState::Failed);
    assert_eq!(scheduler.stop_all().unwrap().state, EffectState::Failed);
}

#[test]
fn test_panicked_routine_is_failed() {
    let (display, strip) = recording_display();
    let scheduler = EffectScheduler::new(display);

    scheduler.switch(Panicking, RunOptions::REPEAT).unwrap();
    wait_for(|| scheduler.current().unwrap().state == EffectState::Failed);
    assert_eq!(
        scheduler.current(),
        Some(EffectStatus {
            name: "panicking",
            state: EffectState::Failed
        })
    );
    assert_eq!(scheduler.stop_all().unwrap().state, EffectState::Failed);

    // The scheduler remains usable.
    scheduler
        .exclusive(|display| display.clear())
        .unwrap();
    assert!(strip.last_frame().unwrap().iter().all(|led| *led == BLACK));
}

#[test]
fn test_display_recovers_after_panic_while_drawing() {
    let (display, strip) = recording_display();
    let scheduler = EffectScheduler::new(display);
    let color = Rgb { r: 4, g: 5, b: 6 };

    scheduler.switch(PanickingDraw, RunOptions::REPEAT).unwrap();
    wait_for(|| scheduler.current().unwrap().state == EffectState::Failed);
    let frames = strip.frames_count();

    scheduler
        .exclusive(|display| display.set_color(color))
        .unwrap();
    assert!(scheduler.is_idle());
    assert_eq!(strip.frames_count(), frames + 1);
    assert!(strip.last_frame().unwrap().iter().all(|led| *led == color));
}
