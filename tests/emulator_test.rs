mod common;

use common::{Call, CollectingNotifier, MemorySurface, RecordingEngine};
use rnes_host::loader::Acquisition;
use rnes_host::{
    Button, Config, DriverError, Emulator, HostKey, KeyScheme, LoadOutcome, Notice, Source, Tick,
    TransportError,
};

type TestEmulator = Emulator<RecordingEngine, MemorySurface, CollectingNotifier, HostKey>;

fn small_config() -> Config {
    Config {
        width: 2,
        height: 2,
        ..Config::default()
    }
}

fn emulator_with(engine: RecordingEngine, surface: MemorySurface) -> TestEmulator {
    let config = small_config();
    Emulator::new(
        engine,
        surface,
        CollectingNotifier::default(),
        config.scheme.key_map(),
        &config,
    )
}

fn emulator() -> TestEmulator {
    emulator_with(RecordingEngine::new(2, 2), MemorySurface::default())
}

fn load_local(emulator: &mut TestEmulator, rom: &[u8]) -> LoadOutcome {
    let token = emulator.request_local(Some("game.nes")).unwrap();
    emulator.complete_load(token, Ok(rom.to_vec()))
}

#[test]
fn test_ticks_before_load_do_nothing() {
    let mut emulator = emulator();

    for _ in 0..3 {
        let tick = emulator.tick();
        assert_eq!(tick, Tick::Idle);
        assert!(tick.reschedule());
    }

    assert!(emulator.engine().calls.is_empty());
    assert!(emulator.surface().images.is_empty());
}

#[test]
fn test_local_file_scenario() {
    let mut emulator = emulator();

    let outcome = load_local(&mut emulator, &[0x4e, 0x45, 0x53, 0x1a]);
    assert!(matches!(outcome, LoadOutcome::Loaded { .. }));
    assert!(emulator.is_loaded());

    assert_eq!(emulator.tick(), Tick::Presented);
    assert_eq!(emulator.tick(), Tick::Presented);

    assert_eq!(
        emulator.engine().calls,
        vec![
            Call::LoadCartridge(vec![0x4e, 0x45, 0x53, 0x1a]),
            Call::Reset,
            Call::AdvanceFrame,
            Call::ReadFrameBuffer,
            Call::AdvanceFrame,
            Call::ReadFrameBuffer,
        ]
    );
    assert_eq!(emulator.surface().images.len(), 2);
    assert_eq!(
        emulator.surface().images[1],
        vec![2, 2, 2, 255, 2, 2, 2, 255, 2, 2, 2, 255, 2, 2, 2, 255]
    );
    assert_eq!(emulator.scheduler().frames(), 2);
}

#[test]
fn test_reset_follows_every_accepted_load() {
    let mut emulator = emulator();

    load_local(&mut emulator, &[1]);
    emulator.tick();
    load_local(&mut emulator, &[2]);
    emulator.tick();

    let calls = &emulator.engine().calls;
    for (idx, call) in calls.iter().enumerate() {
        if let Call::LoadCartridge(_) = call {
            assert_eq!(calls[idx + 1], Call::Reset);
            assert_eq!(calls[idx + 2], Call::AdvanceFrame);
        }
    }
    assert_eq!(emulator.engine().count(&Call::Reset), 2);
}

#[test]
fn test_rejected_load_leaves_session_running() {
    let engine = RecordingEngine::new(2, 2).with_verdicts(&[true, false]);
    let mut emulator = emulator_with(engine, MemorySurface::default());

    load_local(&mut emulator, &[1]);
    emulator.tick();

    let token = emulator.request_local(Some("bad.nes")).unwrap();
    let outcome = emulator.complete_load(token, Ok(vec![2]));

    assert_eq!(
        outcome,
        LoadOutcome::Rejected {
            source: Source::LocalFile {
                name: "bad.nes".to_owned()
            }
        }
    );
    assert_eq!(
        emulator.notifier().notices,
        vec![Notice::UnsupportedCartridge {
            source: Source::LocalFile {
                name: "bad.nes".to_owned()
            }
        }]
    );
    assert_eq!(emulator.engine().count(&Call::Reset), 1);
    assert!(emulator.is_loaded());

    assert_eq!(emulator.tick(), Tick::Presented);
    assert_eq!(emulator.engine().count(&Call::AdvanceFrame), 2);
}

#[test]
fn test_rejected_first_load_stays_idle() {
    let engine = RecordingEngine::new(2, 2).with_verdicts(&[false]);
    let mut emulator = emulator_with(engine, MemorySurface::default());

    load_local(&mut emulator, &[1]);

    assert!(!emulator.is_loaded());
    assert_eq!(emulator.tick(), Tick::Idle);
    assert_eq!(emulator.engine().count(&Call::Reset), 0);
}

#[test]
fn test_dismissed_file_picker() {
    let mut emulator = emulator();

    assert_eq!(emulator.request_local(None), None);
    assert_eq!(emulator.loader().acquisition(), &Acquisition::Idle);
    assert!(emulator.notifier().notices.is_empty());
}

#[test]
fn test_remote_404_scenario() {
    let mut emulator = emulator();

    let request = emulator.request_preset("nestest").unwrap();
    let outcome = emulator.complete_load(request.token, Err(TransportError::Status(404)));

    assert!(matches!(outcome, LoadOutcome::TransportFailed { .. }));
    assert!(emulator
        .engine()
        .calls
        .iter()
        .all(|call| !matches!(call, Call::LoadCartridge(_))));
    assert_eq!(
        emulator.notifier().notices,
        vec![Notice::TransportFailure {
            source: Source::Preset {
                name: "nestest".to_owned(),
                path: "roms/nestest.nes".to_owned()
            },
            error: TransportError::Status(404)
        }]
    );
    assert_eq!(emulator.loader().acquisition(), &Acquisition::Idle);
    assert!(!emulator.is_loaded());
    assert_eq!(emulator.tick(), Tick::Idle);
}

#[test]
fn test_unknown_preset() {
    let mut emulator = emulator();
    assert_eq!(
        emulator.request_preset("missing").unwrap_err(),
        DriverError::UnknownPreset("missing".to_owned())
    );
}

#[test]
fn test_only_latest_fetch_is_committed() {
    let mut emulator = emulator();

    let first = emulator.request_preset("nestest").unwrap().token;
    let second = emulator.request_preset("color-test").unwrap().token;
    assert_eq!(second.value(), first.value() + 1);

    assert_eq!(
        emulator.complete_load(second, Ok(vec![2])),
        LoadOutcome::Loaded {
            source: Source::Preset {
                name: "color-test".to_owned(),
                path: "roms/color_test.nes".to_owned()
            }
        }
    );
    assert_eq!(
        emulator.complete_load(first, Ok(vec![1])),
        LoadOutcome::Stale { token: first }
    );

    assert_eq!(
        emulator.engine().calls,
        vec![Call::LoadCartridge(vec![2]), Call::Reset]
    );
    assert!(emulator.notifier().notices.is_empty());
}

#[test]
fn test_stale_result_arriving_first_is_dropped() {
    let mut emulator = emulator();

    let first = emulator.request_preset_at(0).unwrap().token;
    let second = emulator.request_local(Some("mine.nes")).unwrap();

    assert_eq!(
        emulator.complete_load(first, Ok(vec![1])),
        LoadOutcome::Stale { token: first }
    );
    assert!(!emulator.is_loaded());
    assert_eq!(emulator.tick(), Tick::Idle);

    assert!(matches!(
        emulator.complete_load(second, Ok(vec![2])),
        LoadOutcome::Loaded { .. }
    ));
    assert_eq!(emulator.tick(), Tick::Presented);
}

#[test]
fn test_every_button_down_and_up() {
    let mut emulator = emulator();
    let keys = [
        ("KeyA", Button::A),
        ("KeyS", Button::B),
        ("Space", Button::Select),
        ("Enter", Button::Start),
        ("ArrowUp", Button::Up),
        ("ArrowDown", Button::Down),
        ("ArrowLeft", Button::Left),
        ("ArrowRight", Button::Right),
    ];

    let mut expected = Vec::new();
    for (name, button) in keys {
        assert!(emulator.key_down(&HostKey::code(name), false));
        assert!(emulator.key_up(&HostKey::code(name)));
        expected.push((button.code(), true));
        expected.push((button.code(), false));
    }

    assert_eq!(emulator.engine().button_calls(), expected);
}

#[test]
fn test_keycode_scheme() {
    let config = Config {
        scheme: KeyScheme::KeyCode,
        ..small_config()
    };
    let mut emulator = Emulator::new(
        RecordingEngine::new(2, 2),
        MemorySurface::default(),
        CollectingNotifier::default(),
        config.scheme.key_map(),
        &config,
    );

    assert!(emulator.key_down(&HostKey::KeyCode(13), false));
    assert!(!emulator.key_down(&HostKey::code("Enter"), false));
    assert_eq!(
        emulator.engine().button_calls(),
        vec![(Button::Start.code(), true)]
    );
}

#[test]
fn test_meta_keys_never_reach_the_pad() {
    let mut emulator = emulator();

    for name in ["KeyO", "KeyP"] {
        emulator.key_down(&HostKey::code(name), false);
        emulator.key_up(&HostKey::code(name));
    }

    assert!(emulator.engine().button_calls().is_empty());
    assert_eq!(
        emulator.engine().calls,
        vec![Call::SaveState, Call::RestoreState]
    );
}

#[test]
fn test_holding_save_saves_once() {
    let mut emulator = emulator();
    let save = HostKey::code("KeyO");

    emulator.key_down(&save, false);
    emulator.key_down(&save, true);
    emulator.key_down(&save, true);
    emulator.key_up(&save);

    assert_eq!(emulator.engine().count(&Call::SaveState), 1);
}

#[test]
fn test_frame_size_mismatch_halts() {
    let engine = RecordingEngine::new(2, 2).with_frame_len(11);
    let mut emulator = emulator_with(engine, MemorySurface::default());
    load_local(&mut emulator, &[1]);

    let tick = emulator.tick();
    assert_eq!(tick, Tick::Halted);
    assert!(!tick.reschedule());
    assert_eq!(
        emulator.notifier().notices,
        vec![Notice::Halted(DriverError::FrameSize {
            expected: 12,
            actual: 11
        })]
    );
    assert!(emulator.surface().images.is_empty());

    assert_eq!(emulator.tick(), Tick::Halted);
    assert_eq!(emulator.engine().count(&Call::AdvanceFrame), 1);
    assert_eq!(emulator.notifier().notices.len(), 1);
}

#[test]
fn test_surface_failure_keeps_ticking() {
    let surface = MemorySurface {
        fail: true,
        ..Default::default()
    };
    let mut emulator = emulator_with(RecordingEngine::new(2, 2), surface);
    load_local(&mut emulator, &[1]);

    for _ in 0..2 {
        let tick = emulator.tick();
        assert_eq!(tick, Tick::Dropped);
        assert!(tick.reschedule());
        assert!(tick.needs_delay());
    }
    assert_eq!(emulator.engine().count(&Call::AdvanceFrame), 2);
    assert_eq!(emulator.scheduler().frames(), 2);
    assert!(emulator.notifier().notices.is_empty());
}

#[test]
fn test_only_presented_frames_skip_the_delay() {
    let mut emulator = emulator();
    assert!(emulator.tick().needs_delay());

    load_local(&mut emulator, &[1]);
    let tick = emulator.tick();
    assert_eq!(tick, Tick::Presented);
    assert!(!tick.needs_delay());
}
