use std::{
    thread,
    time::{Duration, Instant},
};

use crate::{
    chip8::ChipSet,
    definitions::cpu,
    devices::{DisplayCommands, HostCommands, KeyboardCommands},
    opcode::Operation,
    timer::TimerCallback,
    Fault,
};

/// The knobs of the host loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Instructions per second, `0` runs as fast as possible.
    pub hertz: u64,
    /// Stops after this many iterations if set.
    pub max_steps: Option<u64>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            hertz: cpu::HERTZ,
            max_steps: None,
        }
    }
}

impl RunnerConfig {
    /// The time a single iteration is supposed to take.
    pub fn interval(&self) -> Option<Duration> {
        if self.hertz == 0 {
            None
        } else {
            Some(Duration::from_nanos(1_000_000_000 / self.hertz))
        }
    }
}

/// Why the host loop ended without a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The host asked to stop.
    Stopped,
    /// [`RunnerConfig::max_steps`](RunnerConfig::max_steps) iterations were run.
    StepLimit,
}

/// The host devices the runner talks to.
pub struct Host<'a, D, K, H>
where
    D: DisplayCommands,
    K: KeyboardCommands,
    H: HostCommands,
{
    pub display: &'a mut D,
    pub keyboard: &'a mut K,
    pub host: &'a mut H,
}

/// Drives the chip until the host stops it or the chip faults.
///
/// Every iteration checks the stop signal, feeds the keyboard state into the chip,
/// brings the timers up to date, runs a single step and hands the framebuffer to
/// the display. The stop signal is checked even while the chip waits for a key.
pub fn run<S, D, K, H>(
    chip: &mut ChipSet<S>,
    devices: Host<'_, D, K, H>,
    config: RunnerConfig,
) -> Result<Outcome, Fault>
where
    S: TimerCallback,
    D: DisplayCommands,
    K: KeyboardCommands,
    H: HostCommands,
{
    let Host {
        display,
        keyboard,
        host,
    } = devices;
    let interval = config.interval();
    let mut steps = 0u64;

    log::info!("running '{}'", chip.get_name());

    loop {
        if host.should_stop() {
            log::info!("stopped by host after {} steps", steps);
            return Ok(Outcome::Stopped);
        }
        if config.max_steps.map_or(false, |max| steps >= max) {
            return Ok(Outcome::StepLimit);
        }

        let start = Instant::now();

        chip.set_keyboard(&keyboard.get_keyboard());
        chip.update_timers(start);

        let operation = chip.next()?;
        if operation == Operation::Wait {
            log::trace!("waiting for key press");
        }
        display.display(chip.get_display().pixels());

        steps += 1;

        if let Some(interval) = interval {
            let elapsed = start.elapsed();
            if elapsed < interval {
                thread::sleep(interval - elapsed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        definitions::{display, keyboard},
        devices::{MockDisplayCommands, MockHostCommands, MockKeyboardCommands},
        resources::Rom,
        FaultKind,
    };

    const UNTHROTTLED: RunnerConfig = RunnerConfig {
        hertz: 0,
        max_steps: None,
    };

    fn chip(program: &[u8]) -> ChipSet {
        ChipSet::new(Rom::new("TEST", program.to_vec()).unwrap())
    }

    fn idle_keyboard() -> MockKeyboardCommands {
        let mut keyboard = MockKeyboardCommands::new();
        keyboard
            .expect_get_keyboard()
            .returning(|| [false; keyboard::SIZE]);
        keyboard
    }

    #[test]
    fn test_stops_on_host_signal() {
        // 0x200: jump to itself
        let mut chip = chip(&[0x12, 0x00]);

        let mut display = MockDisplayCommands::new();
        display
            .expect_display()
            .times(3)
            .withf(|pixels| pixels.len() == display::RESOLUTION)
            .return_const(());

        let mut host = MockHostCommands::new();
        let mut calls = 0;
        host.expect_should_stop().times(4).returning(move || {
            calls += 1;
            calls > 3
        });

        let mut keyboard = idle_keyboard();
        let res = run(
            &mut chip,
            Host {
                display: &mut display,
                keyboard: &mut keyboard,
                host: &mut host,
            },
            UNTHROTTLED,
        );

        assert_eq!(Ok(Outcome::Stopped), res);
        assert_eq!(0x200, chip.get_program_counter());
    }

    #[test]
    fn test_halts_on_fault() {
        // 0x200: V0 = 1, 0x202: undefined 8XYF
        let mut chip = chip(&[0x60, 0x01, 0x80, 0x1F]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().times(1).return_const(());
        let mut host = MockHostCommands::new();
        host.expect_should_stop().times(2).return_const(false);
        let mut keyboard = idle_keyboard();

        let res = run(
            &mut chip,
            Host {
                display: &mut display,
                keyboard: &mut keyboard,
                host: &mut host,
            },
            UNTHROTTLED,
        );

        assert_eq!(
            Err(Fault::new(0x202, Some(0x801F), FaultKind::InvalidOpcode)),
            res
        );
        // the state is left as it was at the fault
        assert_eq!(0x202, chip.get_program_counter());
        assert_eq!(1, chip.get_registers()[0]);
    }

    #[test]
    fn test_host_can_stop_a_key_wait() {
        // 0x200: wait for a key into V3
        let mut chip = chip(&[0xF3, 0x0A]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().return_const(());
        let mut host = MockHostCommands::new();
        let mut calls = 0;
        host.expect_should_stop().returning(move || {
            calls += 1;
            calls > 10
        });
        let mut keyboard = idle_keyboard();

        let res = run(
            &mut chip,
            Host {
                display: &mut display,
                keyboard: &mut keyboard,
                host: &mut host,
            },
            UNTHROTTLED,
        );

        assert_eq!(Ok(Outcome::Stopped), res);
        assert_eq!(0x200, chip.get_program_counter());
    }

    #[test]
    fn test_key_press_resumes_the_program() {
        // 0x200: wait for a key into V3, 0x202: jump to itself
        let mut chip = chip(&[0xF3, 0x0A, 0x12, 0x02]);

        let mut display = MockDisplayCommands::new();
        display.expect_display().return_const(());
        let mut host = MockHostCommands::new();
        host.expect_should_stop().return_const(false);

        let mut keyboard = MockKeyboardCommands::new();
        let mut calls = 0;
        keyboard.expect_get_keyboard().returning(move || {
            calls += 1;
            let mut keys = [false; keyboard::SIZE];
            // the key goes down on the third iteration
            keys[0x7] = calls >= 3;
            keys
        });

        let res = run(
            &mut chip,
            Host {
                display: &mut display,
                keyboard: &mut keyboard,
                host: &mut host,
            },
            RunnerConfig {
                max_steps: Some(5),
                ..UNTHROTTLED
            },
        );

        assert_eq!(Ok(Outcome::StepLimit), res);
        assert_eq!(0x7, chip.get_registers()[0x3]);
        assert_eq!(0x202, chip.get_program_counter());
    }

    #[test]
    fn test_interval() {
        assert_eq!(None, UNTHROTTLED.interval());
        let config = RunnerConfig {
            hertz: 500,
            max_steps: None,
        };
        assert_eq!(Some(Duration::from_millis(2)), config.interval());
    }
}
