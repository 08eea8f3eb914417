#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use scrolljack_core::sim::{CallbackLog, SimHost, advance_frame, dispatch};
use scrolljack_core::{
    DeltaMode, InputEvent, ListenerKind, ScrollJackController, ScrollJackOptions, TouchInput,
    TouchPhase, WheelInput,
};

#[derive(Debug, Arbitrary)]
struct Scenario {
    viewport_height: u16,
    region_top: u16,
    region_height: u16,
    offset_height: Option<u16>,
    reduced_motion: bool,
    sensitivity: u8,
    ops: Vec<Op>,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Wheel { delta: f64, mode: u8 },
    Touch { phase: u8, y: f64 },
    Key(u8),
    ScrollTo(u16),
    Resize(u16),
    Frame,
    SetProgress(f64),
    Unlock,
    SetEnabled(bool),
    Destroy,
}

fuzz_target!(|scenario: Scenario| {
    let mut host = SimHost::new(f64::from(scenario.viewport_height))
        .with_region(
            f64::from(scenario.region_top),
            f64::from(scenario.region_height),
        );
    if let Some(h) = scenario.offset_height {
        host = host.with_offset_height(f64::from(h));
    }
    if scenario.reduced_motion {
        host = host.with_reduced_motion();
    }

    let log = CallbackLog::new();
    let options = ScrollJackOptions::new().sensitivity(f64::from(scenario.sensitivity.max(1)) / 32.0);
    let Ok(mut c) = log.attach(options).build(host) else {
        return;
    };

    for op in scenario.ops.iter().take(256) {
        apply(&mut c, op);
        check(&c, &log);
    }
    advance_frame(&mut c);
    check(&c, &log);

    c.destroy();
    let recorded = log.len();
    assert_eq!(c.host().listener_count(), 0, "listeners leaked");
    assert_eq!(c.host().pending_frames(), 0, "frames leaked");
    c.handle_event(&InputEvent::wheel(100.0));
    c.set_progress(0.5);
    c.unlock();
    advance_frame(&mut c);
    assert_eq!(log.len(), recorded, "callback after destroy");
});

fn apply(c: &mut ScrollJackController<SimHost>, op: &Op) {
    match *op {
        Op::Wheel { delta, mode } => {
            dispatch(c, &InputEvent::Wheel(WheelInput {
                delta_y: delta,
                mode: DeltaMode::from_dom(u32::from(mode % 3)),
            }));
        }
        Op::Touch { phase, y } => {
            let phase = match phase % 4 {
                0 => TouchPhase::Start,
                1 => TouchPhase::Move,
                2 => TouchPhase::End,
                _ => TouchPhase::Cancel,
            };
            dispatch(c, &InputEvent::Touch(TouchInput { phase, y }));
        }
        Op::Key(k) => {
            let key = if k % 2 == 0 { "Escape" } else { "ArrowDown" };
            dispatch(c, &InputEvent::key(key));
        }
        Op::ScrollTo(y) => {
            c.host_mut().scroll_y = f64::from(y);
            dispatch(c, &InputEvent::Scroll);
        }
        Op::Resize(h) => {
            c.host_mut().viewport_height = f64::from(h);
            dispatch(c, &InputEvent::Resize);
        }
        Op::Frame => {
            advance_frame(c);
        }
        Op::SetProgress(p) => c.set_progress(p),
        Op::Unlock => c.unlock(),
        Op::SetEnabled(on) => c.set_enabled(on),
        Op::Destroy => c.destroy(),
    }
}

fn check(c: &ScrollJackController<SimHost>, log: &CallbackLog) {
    let p = c.progress();
    assert!((0.0..=1.0).contains(&p), "progress out of range: {p}");
    if c.is_scroll_locked() {
        assert!(c.is_active() && c.is_enabled(), "lock without activation");
        assert!(p < 1.0, "locked at the end");
    }
    if c.is_destroyed() {
        assert_eq!(c.host().listener_count(), 0);
        assert!(!c.is_scroll_locked());
    } else if c.is_enabled() {
        assert_eq!(c.host().listener_count(), ListenerKind::ALL.len());
    }
    for delivered in log.progress() {
        assert!((0.0..=1.0).contains(&delivered));
    }
}
