//! The terminal host of the virtual machine, it renders the framebuffer with
//! half blocks, turns key events into keypad state and rings the bell.
use std::{
    cell::Cell,
    io::{self, Stdout, Write},
    rc::Rc,
    time::{Duration, Instant},
};

use anyhow::Context;
use chip::{
    definitions::{display, keyboard},
    devices::{DisplayCommands, HostCommands, KeyMap, KeyboardCommands},
    timer::TimerCallback,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::CrosstermBackend,
    layout::Rect,
    text::Spans,
    widgets::{Block, Borders, Paragraph},
    Terminal,
};

/// Terminals only report presses (and their auto repeat), so a key counts
/// as held for this long after the last report.
const HOLD: Duration = Duration::from_millis(150);

/// Shared between the devices, so any of them can end the run.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Rc<Cell<bool>>);

impl StopSignal {
    pub fn stop(&self) {
        self.0.set(true)
    }
}

impl HostCommands for StopSignal {
    fn should_stop(&mut self) -> bool {
        self.0.get()
    }
}

/// Rings the terminal bell once the sound timer expires.
#[derive(Debug)]
pub struct Beeper {
    mute: bool,
}

impl Beeper {
    pub fn new(mute: bool) -> Self {
        Self { mute }
    }
}

impl TimerCallback for Beeper {
    fn handle(&mut self) {
        if self.mute {
            return;
        }
        let mut stdout = io::stdout();
        if let Err(err) = stdout.write_all(b"\x07").and_then(|_| stdout.flush()) {
            log::warn!("unable to ring the bell: {}", err);
        }
    }
}

/// Leaves the raw mode and the alternate screen when dropped.
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("unable to enable the raw mode")?;
        let guard = TerminalGuard;
        execute!(io::stdout(), EnterAlternateScreen)
            .context("unable to enter the alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        if let Err(err) = terminal::disable_raw_mode() {
            log::error!("unable to restore the terminal: {}", err);
        }
    }
}

/// The display, every distinct frame is drawn into a bordered box.
pub struct Screen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    title: String,
    last: Vec<bool>,
    failure: Option<anyhow::Error>,
    stop: StopSignal,
    // dropped last, so the terminal is restored after tui is done with it
    _guard: TerminalGuard,
}

impl Screen {
    pub fn new(title: &str, stop: StopSignal) -> anyhow::Result<Self> {
        let guard = TerminalGuard::enter()?;
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend).context("unable to set up the terminal")?;
        terminal.hide_cursor().context("unable to hide the cursor")?;
        terminal.clear().context("unable to clear the terminal")?;

        Ok(Self {
            terminal,
            title: format!(" {} ", title),
            last: Vec::with_capacity(display::RESOLUTION),
            failure: None,
            stop,
            _guard: guard,
        })
    }

    /// The error that made the screen stop the run.
    pub fn take_failure(&mut self) -> Option<anyhow::Error> {
        self.failure.take()
    }

    fn draw(&mut self, pixels: &[bool]) -> io::Result<()> {
        let lines: Vec<Spans> = render_rows(pixels).into_iter().map(Spans::from).collect();
        let title = self.title.as_str();
        self.terminal.draw(|f| {
            let area = Rect::new(
                0,
                0,
                display::WIDTH as u16 + 2,
                (display::HEIGHT / 2) as u16 + 2,
            )
            .intersection(f.size());
            let screen =
                Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
            f.render_widget(screen, area);
        })?;
        Ok(())
    }
}

impl DisplayCommands for Screen {
    fn display(&mut self, pixels: &[bool]) {
        if self.failure.is_some() || self.last == pixels {
            return;
        }
        self.last.clear();
        self.last.extend_from_slice(pixels);

        if let Err(err) = self.draw(pixels) {
            log::error!("unable to draw: {}", err);
            self.failure = Some(anyhow::Error::new(err).context("unable to draw the screen"));
            self.stop.stop();
        }
    }
}

impl Drop for Screen {
    fn drop(&mut self) {
        let _ = self.terminal.show_cursor();
    }
}

/// Folds two pixel rows into one line of half blocks.
pub fn render_rows(pixels: &[bool]) -> Vec<String> {
    let rows: Vec<&[bool]> = pixels.chunks(display::WIDTH).collect();
    rows.chunks(2)
        .map(|pair| {
            let top = pair[0];
            let bottom = pair.get(1).copied().unwrap_or(&[]);
            top.iter()
                .enumerate()
                .map(|(x, upper)| {
                    let lower = bottom.get(x).copied().unwrap_or(false);
                    match (*upper, lower) {
                        (true, true) => '█',
                        (true, false) => '▀',
                        (false, true) => '▄',
                        (false, false) => ' ',
                    }
                })
                .collect()
        })
        .collect()
}

/// Remembers until when every keypad symbol counts as held.
#[derive(Debug, Default)]
pub struct KeyLatch {
    until: [Option<Instant>; keyboard::SIZE],
}

impl KeyLatch {
    pub fn press(&mut self, symbol: u8, now: Instant) {
        self.until[symbol as usize % keyboard::SIZE] = Some(now + HOLD);
    }

    pub fn keys(&self, now: Instant) -> [bool; keyboard::SIZE] {
        let mut keys = [false; keyboard::SIZE];
        for (key, until) in keys.iter_mut().zip(self.until.iter()) {
            *key = until.map_or(false, |until| now < until);
        }
        keys
    }
}

/// The keyboard, reads the pending terminal events on every poll.
///
/// `Esc` and `Ctrl+C` end the run.
pub struct Keypad {
    map: KeyMap,
    latch: KeyLatch,
    failure: Option<anyhow::Error>,
    stop: StopSignal,
}

impl Keypad {
    pub fn new(map: KeyMap, stop: StopSignal) -> Self {
        Self {
            map,
            latch: KeyLatch::default(),
            failure: None,
            stop,
        }
    }

    /// The error that made the keypad stop the run.
    pub fn take_failure(&mut self) -> Option<anyhow::Error> {
        self.failure.take()
    }

    fn read_events(&mut self) -> crossterm::Result<()> {
        while event::poll(Duration::from_millis(0))? {
            let key = match event::read()? {
                Event::Key(key) => key,
                _ => continue,
            };
            match key.code {
                KeyCode::Esc => self.stop.stop(),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.stop.stop()
                }
                KeyCode::Char(c) => match self.map.symbol(c) {
                    Some(symbol) => self.latch.press(symbol, Instant::now()),
                    None => log::debug!("key {:?} is not bound", c),
                },
                _ => {}
            }
        }
        Ok(())
    }
}

impl KeyboardCommands for Keypad {
    fn get_keyboard(&mut self) -> [bool; keyboard::SIZE] {
        if self.failure.is_none() {
            if let Err(err) = self.read_events() {
                log::error!("unable to read the terminal events: {}", err);
                self.failure = Some(anyhow::Error::new(err).context("unable to read the keyboard"));
                self.stop.stop();
            }
        }
        self.latch.keys(Instant::now())
    }
}
