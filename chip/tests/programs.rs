use std::{cell::Cell, rc::Rc};

use chip::{
    chip8::ChipSet,
    definitions::{display, keyboard},
    devices::{DisplayCommands, HostCommands, KeyboardCommands},
    resources::Rom,
    run, Fault, FaultKind, Host, Outcome, RunnerConfig,
};

const UNTHROTTLED: RunnerConfig = RunnerConfig {
    hertz: 0,
    max_steps: None,
};

#[derive(Default)]
struct Screen {
    frames: usize,
    pixels: Vec<bool>,
}

impl DisplayCommands for Screen {
    fn display(&mut self, pixels: &[bool]) {
        self.frames += 1;
        self.pixels = pixels.to_vec();
    }
}

impl Screen {
    fn lit(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }
}

/// Holds the given key down from the `from`th poll on.
struct Keypad {
    key: Option<usize>,
    from: usize,
    polls: usize,
}

impl Keypad {
    fn idle() -> Self {
        Self {
            key: None,
            from: 0,
            polls: 0,
        }
    }
}

impl KeyboardCommands for Keypad {
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE] {
        self.polls += 1;
        let mut keys = [false; keyboard::SIZE];
        if let Some(key) = self.key {
            keys[key] = self.polls >= self.from;
        }
        keys
    }
}

/// Stops once it was asked the given amount of times.
struct StopAfter(usize);

impl HostCommands for StopAfter {
    fn should_stop(&mut self) -> bool {
        if self.0 == 0 {
            true
        } else {
            self.0 -= 1;
            false
        }
    }
}

fn chip(program: &[u8]) -> ChipSet {
    ChipSet::new(Rom::new("PROGRAM", program.to_vec()).expect("test programs are small"))
}

#[test]
fn test_counting_loop_until_stopped() {
    let mut chip = chip(&[
        0x60, 0x00, // 0x200: V0 = 0
        0x70, 0x01, // 0x202: V0 += 1
        0x12, 0x02, // 0x204: jump 0x202
    ]);
    let mut screen = Screen::default();

    let res = run(
        &mut chip,
        Host {
            display: &mut screen,
            keyboard: &mut Keypad::idle(),
            host: &mut StopAfter(21),
        },
        UNTHROTTLED,
    );

    assert_eq!(Ok(Outcome::Stopped), res);
    assert_eq!(21, screen.frames);
    // one step sets V0, then ten add and jump pairs
    assert_eq!(10, chip.get_registers()[0]);
}

#[test]
fn test_draw_then_fault() {
    let mut chip = chip(&[
        0x60, 0x08, // 0x200: V0 = 8
        0xF0, 0x29, // 0x202: I = glyph 8
        0xD1, 0x15, // 0x204: draw at (V1, V1)
        0x80, 0x1F, // 0x206: undefined
    ]);
    let mut screen = Screen::default();

    let res = run(
        &mut chip,
        Host {
            display: &mut screen,
            keyboard: &mut Keypad::idle(),
            host: &mut StopAfter(usize::MAX),
        },
        UNTHROTTLED,
    );

    assert_eq!(
        Err(Fault::new(0x206, Some(0x801F), FaultKind::InvalidOpcode)),
        res
    );
    assert_eq!(display::RESOLUTION, screen.pixels.len());
    // 0xF0 0x90 0xF0 0x90 0xF0
    assert_eq!(4 + 2 + 4 + 2 + 4, screen.lit());
    assert_eq!(Some(res.unwrap_err()), chip.fault());
}

#[test]
fn test_timers_run_out_and_beep() {
    let beeps = Rc::new(Cell::new(0));
    let counter = beeps.clone();
    let rom = Rom::new(
        "TIMERS",
        vec![
            0x60, 0x03, // 0x200: V0 = 3
            0xF0, 0x15, // 0x202: delay = V0
            0x61, 0x01, // 0x204: V1 = 1
            0xF1, 0x18, // 0x206: sound = V1
            0xF2, 0x07, // 0x208: V2 = delay
            0x32, 0x00, // 0x20A: skip if V2 == 0
            0x12, 0x08, // 0x20C: jump 0x208
            0x63, 0x05, // 0x20E: V3 = 5
            0xFF, 0xFF, // 0x210: undefined
        ],
    )
    .unwrap();
    let mut chip = ChipSet::with_callback(rom, move || counter.set(counter.get() + 1));

    let res = run(
        &mut chip,
        Host {
            display: &mut Screen::default(),
            keyboard: &mut Keypad::idle(),
            host: &mut StopAfter(usize::MAX),
        },
        UNTHROTTLED,
    );

    assert_eq!(
        Err(Fault::new(0x210, Some(0xFFFF), FaultKind::InvalidOpcode)),
        res
    );
    assert_eq!(5, chip.get_registers()[3]);
    assert_eq!(0, chip.get_delay_timer());
    assert_eq!(0, chip.get_sound_timer());
    assert_eq!(1, beeps.get());
}

#[test]
fn test_key_wait_and_key_skip() {
    let mut chip = chip(&[
        0xF3, 0x0A, // 0x200: V3 = await key
        0xE3, 0x9E, // 0x202: skip if key V3 is held
        0xFF, 0xFF, // 0x204: undefined
        0x64, 0x01, // 0x206: V4 = 1
        0x00, 0x00, // 0x208: machine code routine, unsupported
    ]);
    let mut keypad = Keypad {
        key: Some(0xB),
        from: 5,
        polls: 0,
    };

    let res = run(
        &mut chip,
        Host {
            display: &mut Screen::default(),
            keyboard: &mut keypad,
            host: &mut StopAfter(usize::MAX),
        },
        UNTHROTTLED,
    );

    assert_eq!(
        Err(Fault::new(0x208, Some(0x0000), FaultKind::InvalidOpcode)),
        res
    );
    assert_eq!(0xB, chip.get_registers()[3]);
    assert_eq!(1, chip.get_registers()[4]);
    assert!(chip.get_keyboard()[0xB]);
    // the wait, three idle polls, the resume and three more instructions
    assert_eq!(8, keypad.polls);
}

#[test]
fn test_step_limit() {
    let mut chip = chip(&[0x12, 0x00]);

    let res = run(
        &mut chip,
        Host {
            display: &mut Screen::default(),
            keyboard: &mut Keypad::idle(),
            host: &mut StopAfter(usize::MAX),
        },
        RunnerConfig {
            hertz: 0,
            max_steps: Some(100),
        },
    );

    assert_eq!(Ok(Outcome::StepLimit), res);
}

#[test]
fn test_recursion_overflows() {
    let mut chip = chip(&[0x22, 0x00]);

    let res = run(
        &mut chip,
        Host {
            display: &mut Screen::default(),
            keyboard: &mut Keypad::idle(),
            host: &mut StopAfter(usize::MAX),
        },
        UNTHROTTLED,
    );

    assert_eq!(
        Err(Fault::new(0x200, Some(0x2200), FaultKind::StackOverflow)),
        res
    );
    assert_eq!(Some(63), chip.stack_pointer());
}
