use std::{thread, time::Duration};

use hexlight_app::{
    CredentialsStore, EffectsConfig, HexlightError, LightController, PlugReply, VirtualPlug,
};
use hexlight_core::{
    color::BLACK,
    test_utils::{recording_display, RecordingStrip},
    ColorPalette, ColorTriple, EffectState, Hue, Rgb,
};
use tempfile::TempDir;

fn fast_effects() -> EffectsConfig {
    EffectsConfig {
        cycle_step_ms: 1,
        rainbow_cycle_step_ms: 1,
        chase_step_ms: 1,
        flash_interval_ms: 1,
        day_time_resync_ms: 10,
        ..EffectsConfig::default()
    }
}

fn controller() -> (LightController, RecordingStrip, TempDir) {
    let _ = env_logger::try_init();

    let dir = tempfile::tempdir().unwrap();
    let (display, strip) = recording_display();
    let credentials = CredentialsStore::new(dir.path().join("credentials.txt"));
    let controller = LightController::new(display, credentials, fast_effects());
    (controller, strip, dir)
}

#[test]
fn test_set_color_stops_effect() {
    let (controller, strip, _dir) = controller();

    assert_eq!(controller.chase().unwrap(), "Chasing");
    assert_eq!(controller.status().effect, Some("rainbow_chase"));

    let color: ColorTriple = "1.2.3".parse().unwrap();
    assert_eq!(controller.set_color(color).unwrap(), "Color set to (1, 2, 3)");
    assert_eq!(controller.status().effect, None);

    let colors = controller.hex_colors();
    assert_eq!(colors.len(), 4);
    assert!(colors.values().all(|c| *c == color));
    assert!(strip
        .last_frame()
        .unwrap()
        .iter()
        .all(|led| *led == Rgb { r: 1, g: 2, b: 3 }));
}

#[test]
fn test_set_hex_color_out_of_range() {
    let (controller, _strip, _dir) = controller();
    let color = ColorTriple(Rgb { r: 255, g: 0, b: 0 });

    let err = controller.set_hex_color(10, color).unwrap_err();
    assert!(matches!(err, HexlightError::HexagonOutOfRange { index: 10, .. }));

    controller.set_hex_color(1, color).unwrap();
    let colors = controller.hex_colors();
    assert_eq!(colors[&1], color);
    assert_eq!(colors[&0], ColorTriple(BLACK));
}

#[test]
fn test_brightness_keeps_effect_running() {
    let (controller, _strip, _dir) = controller();

    controller.rainbow_cycle().unwrap();
    assert_eq!(
        controller.set_brightness(0.25).unwrap(),
        "Brightness set to 0.250000"
    );
    assert!((controller.brightness().brightness - 0.25).abs() < f32::EPSILON);
    assert_eq!(controller.status().effect, Some("rainbow_cycle"));

    assert!(matches!(
        controller.set_brightness(-1.0).unwrap_err(),
        HexlightError::InvalidBrightness(_)
    ));
    assert!((controller.brightness().brightness - 0.25).abs() < f32::EPSILON);
}

#[test]
fn test_color_palette_follows_path() {
    let (controller, _strip, _dir) = controller();
    let hue: Hue = "cyan".parse().unwrap();

    controller.flash_around().unwrap();
    let reply = controller.set_color_palette(Some(hue)).unwrap();
    assert_eq!(controller.status().effect, None);

    let palette = ColorPalette::from_hue(hue);
    assert_eq!(reply.color_palette.len(), palette.colors().len());

    let colors = controller.hex_colors();
    for (position, hexagon) in controller.path().path.into_iter().enumerate() {
        assert_eq!(colors[&hexagon], ColorTriple(palette.color_at(position)));
    }
}

#[test]
fn test_random_palette() {
    let (controller, _strip, _dir) = controller();
    let reply = controller.set_color_palette(None).unwrap();
    assert_eq!(reply.color_palette.len(), 5);
}

#[test]
fn test_plug_without_device() {
    let (controller, _strip, _dir) = controller();

    controller.chase().unwrap();
    assert_eq!(controller.plug_state().unwrap(), PlugReply { is_on: false });
    assert_eq!(controller.toggle_power().unwrap(), PlugReply { is_on: false });
    assert_eq!(controller.toggle_power().unwrap(), PlugReply { is_on: false });
    assert_eq!(controller.status().effect, Some("rainbow_chase"));
}

#[test]
fn test_toggle_power_leaves_effect_alone() {
    let (controller, _strip, _dir) = controller();
    let controller = controller.with_plug(VirtualPlug::default());

    controller.cycle_through_rainbow().unwrap();
    assert_eq!(controller.toggle_power().unwrap(), PlugReply { is_on: true });
    assert_eq!(controller.plug_state().unwrap(), PlugReply { is_on: true });

    let status = controller.status();
    assert_eq!(status.effect, Some("cycle_through_rainbow"));
    assert_ne!(status.state, Some(EffectState::Stopped));
}

#[test]
fn test_authenticate_stops_effect() {
    let (controller, _strip, _dir) = controller();

    controller.play_song().unwrap();
    assert_eq!(controller.status().effect, Some("visualizer"));

    controller.authenticate("{'token': 'secret'}").unwrap();
    assert!(controller.scheduler().is_idle());
    assert_eq!(
        controller.credentials().load().unwrap().as_deref(),
        Some(r#"{"token": "secret"}"#)
    );
}

#[test]
fn test_day_time_first_sync_before_reply() {
    let (controller, strip, _dir) = controller();

    assert_eq!(controller.day_time().unwrap(), "Synced to daytime");
    let frame = strip.last_frame().unwrap();
    assert!(frame.iter().all(|led| *led == frame[0] && *led != BLACK));

    thread::sleep(Duration::from_millis(30));
    assert_eq!(controller.status().state, Some(EffectState::Running));
    controller.clear().unwrap();
    assert!(controller.scheduler().is_idle());
}
