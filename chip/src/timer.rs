//! The delay and sound timers, counting down against the wall clock.
use std::time::{Duration, Instant};

use crate::definitions::timer;

/// Will be called when a timer reaches zero.
pub trait TimerCallback {
    /// Runs the side effect of the timer expiring.
    fn handle(&mut self);
}

/// A timer without any side effect when it expires.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallback;

impl TimerCallback for NoCallback {
    fn handle(&mut self) {}
}

impl<F: FnMut()> TimerCallback for F {
    fn handle(&mut self) {
        self()
    }
}

/// Represents a timer inside of the chip
/// infrastructure, it will count down to
/// zero from what ever number given.
#[derive(Debug)]
pub struct Timer<S: TimerCallback> {
    value: u8,
    callback: S,
}

impl<S: TimerCallback> Timer<S> {
    pub fn with_callback(value: u8, callback: S) -> Self {
        Self { value, callback }
    }

    pub fn set_value(&mut self, value: u8) {
        self.value = value;
    }

    pub fn get_value(&self) -> u8 {
        self.value
    }

    /// Counts down by the given amount of ticks without going below zero,
    /// the callback runs if this moved the timer from non zero to zero.
    pub fn decrement(&mut self, ticks: u64) {
        if self.value == 0 {
            return;
        }
        let ticks = ticks.min(self.value as u64) as u8;
        self.value -= ticks;
        if self.value == 0 {
            self.callback.handle();
        }
    }
}

impl Timer<NoCallback> {
    pub fn new(value: u8) -> Self {
        Self::with_callback(value, NoCallback)
    }
}

/// The delay and sound timer together with the point in time they
/// were last brought up to date.
#[derive(Debug)]
pub struct Timers<S: TimerCallback> {
    /// Delay timer: This timer is intended to be used for timing the events of games. Its value
    /// can be set and read.
    delay: Timer<NoCallback>,
    /// Sound timer: This timer is used for sound effects. When it reaches zero
    /// the callback beeps.
    sound: Timer<S>,
    last_checked: Instant,
}

impl<S: TimerCallback> Timers<S> {
    pub fn new(sound: S) -> Self {
        Self {
            delay: Timer::new(0),
            sound: Timer::with_callback(0, sound),
            last_checked: Instant::now(),
        }
    }

    /// Brings both timers up to date with `now`. Nothing happens
    /// until at least one full tick has elapsed since the last update,
    /// the started tick is carried over to the next update.
    pub fn update(&mut self, now: Instant) {
        let elapsed = now.saturating_duration_since(self.last_checked);
        let ticks = ticks(elapsed);
        if ticks == 0 {
            return;
        }
        self.delay.decrement(ticks);
        self.sound.decrement(ticks);
        self.last_checked = now - partial_tick(elapsed);
    }

    pub fn set_delay(&mut self, value: u8) {
        self.delay.set_value(value);
        self.last_checked = Instant::now();
    }

    pub fn set_sound(&mut self, value: u8) {
        self.sound.set_value(value);
        self.last_checked = Instant::now();
    }

    pub fn delay(&self) -> u8 {
        self.delay.get_value()
    }

    pub fn sound(&self) -> u8 {
        self.sound.get_value()
    }

    pub fn last_checked(&self) -> Instant {
        self.last_checked
    }
}

/// The amount of full timer ticks in the given duration.
fn ticks(elapsed: Duration) -> u64 {
    (elapsed.as_nanos() / timer::INTERVAL.as_nanos()) as u64
}

/// What is left of the duration after the last full tick.
fn partial_tick(elapsed: Duration) -> Duration {
    Duration::from_nanos((elapsed.as_nanos() % timer::INTERVAL.as_nanos()) as u64)
}
