use smokeflow::input::{dye_color, DELTA_SCALE};
use smokeflow::{hsl_to_rgb, AmbientSplatter, InputInjector, PointerId, Pointers};

fn assert_rgb(actual: [f32; 3], expected: [f32; 3]) {
    for (a, e) in actual.iter().zip(expected) {
        assert!((a - e).abs() < 1e-5, "Expected {:?}, got {:?}", expected, actual);
    }
}

#[test]
fn test_hsl_primaries() {
    assert_rgb(hsl_to_rgb(0.0, 1.0, 0.5), [1.0, 0.0, 0.0]);
    assert_rgb(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), [0.0, 1.0, 0.0]);
    assert_rgb(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), [0.0, 0.0, 1.0]);
    assert_rgb(hsl_to_rgb(0.3, 0.0, 0.25), [0.25, 0.25, 0.25]);
    assert_rgb(dye_color(0.0), [0.5, 0.0, 0.0]);
}

#[test]
fn test_hue_wraps_within_unit_range() {
    let mut injector = InputInjector::new();
    let mut pointers = Pointers::new();
    for i in 0..150 {
        injector.pointer_moved(&mut pointers, PointerId::Mouse, i as f32, 0.0, true);
        let hue = injector.hue();
        assert!((0.0..=1.0).contains(&hue), "Hue {} out of range", hue);
    }
    assert!(injector.hue() < 0.6, "Hue should have wrapped, got {}", injector.hue());
}

#[test]
fn test_first_contact_creates_pointer_without_delta() {
    let mut injector = InputInjector::new();
    let mut pointers = Pointers::new();
    assert!(pointers.is_empty());

    injector.pointer_moved(&mut pointers, PointerId::Touch(7), 40.0, 30.0, true);
    let pointer = pointers.get(PointerId::Touch(7)).expect("pointer created");
    assert_eq!((pointer.x, pointer.y), (40.0, 30.0));
    assert_eq!((pointer.dx, pointer.dy), (0.0, 0.0));
    assert!(pointer.moved);
    assert_eq!(pointers.len(), 1);
}

#[test]
fn test_move_delta_is_scaled() {
    let mut injector = InputInjector::new();
    let mut pointers = Pointers::new();
    injector.pointer_down(&mut pointers, PointerId::Mouse, 10.0, 10.0);
    injector.pointer_moved(&mut pointers, PointerId::Mouse, 12.0, 13.0, false);

    let pointer = pointers.get(PointerId::Mouse).expect("pointer exists");
    assert!(pointer.down);
    assert!(pointer.moved, "Held pointers splat without hover");
    assert_eq!(pointer.dx, 2.0 * DELTA_SCALE);
    assert_eq!(pointer.dy, 3.0 * DELTA_SCALE);
}

#[test]
fn test_hover_disabled_ignores_released_pointer() {
    let mut injector = InputInjector::new();
    let mut pointers = Pointers::new();
    injector.pointer_moved(&mut pointers, PointerId::Mouse, 5.0, 5.0, false);
    assert!(!pointers.has_pending());

    injector.pointer_down(&mut pointers, PointerId::Mouse, 5.0, 5.0);
    injector.pointer_up(&mut pointers, PointerId::Mouse);
    injector.pointer_moved(&mut pointers, PointerId::Mouse, 6.0, 5.0, false);
    assert!(!pointers.has_pending());
}

#[test]
fn test_pointer_up_unknown_id_is_noop() {
    let mut injector = InputInjector::new();
    let mut pointers = Pointers::new();
    injector.pointer_up(&mut pointers, PointerId::Touch(3));
    assert!(pointers.is_empty(), "Lifting never creates a pointer");

    injector.pointer_down(&mut pointers, PointerId::Mouse, 0.0, 0.0);
    injector.pointer_up(&mut pointers, PointerId::Touch(3));
    assert!(pointers.get(PointerId::Mouse).map_or(false, |p| p.down));
}

#[test]
fn test_ambient_cadence() {
    let mut ambient = AmbientSplatter::with_seed(11);
    let canvas = [320, 240];

    assert!(ambient.poll(0.0, canvas).is_none(), "First poll only arms the timer");
    assert!(ambient.poll(1.0, canvas).is_none());
    assert!(ambient.poll(2.0, canvas).is_some());
    assert!(ambient.poll(2.5, canvas).is_none());
    assert!(ambient.poll(4.0, canvas).is_some());

    assert!(ambient.poll(100.0, canvas).is_some(), "One splat after a long gap");
    assert!(ambient.poll(101.0, canvas).is_none(), "No burst to catch up");
    assert!(ambient.poll(102.0, canvas).is_some());

    ambient.disarm();
    assert!(ambient.poll(200.0, canvas).is_none(), "Disarmed timer re-arms first");
}

#[test]
fn test_ambient_splats_are_faint_and_on_canvas() {
    let mut ambient = AmbientSplatter::with_seed(5);
    let canvas = [320, 240];
    ambient.poll(0.0, canvas);

    for i in 1..=50 {
        let event = ambient
            .poll(2.0 * i as f64, canvas)
            .expect("splat every interval");
        assert!((0.0..=320.0).contains(&event.x) && (0.0..=240.0).contains(&event.y));
        assert!(event.dx.abs() <= 500.0 && event.dy.abs() <= 500.0);
        assert!(event.color.iter().all(|&c| (0.0..=0.05 + 1e-6).contains(&c)));
        assert!(event.color.iter().any(|&c| c > 0.0));
    }
}

#[test]
fn test_seeded_ambient_is_deterministic() {
    let mut a = AmbientSplatter::with_seed(42);
    let mut b = AmbientSplatter::with_seed(42);
    a.poll(0.0, [100, 100]);
    b.poll(0.0, [100, 100]);
    assert_eq!(a.poll(2.0, [100, 100]), b.poll(2.0, [100, 100]));
}
