//! Runs a chip8 rom inside of the terminal.
//!
//! ```text
//! chip8 [OPTIONS] <ROM>
//! ```
//!
//! The keypad is bound to the left side of a qwerty keyboard by default,
//! `--keymap ascii` binds every symbol to the character `'0' + symbol` instead.
//! `Esc` ends the emulation.
use std::{path::PathBuf, process};

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use chip::{
    chip8::ChipSet, definitions::cpu, devices::KeyMap, resources::Rom, run, Host, RunnerConfig,
};

mod error;
mod terminal;

use error::CliError;
use terminal::{Beeper, Keypad, Screen, StopSignal};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the rom file to run
    rom: PathBuf,

    /// Instructions per second, 0 runs as fast as possible
    #[arg(long, default_value_t = cpu::HERTZ)]
    hertz: u64,

    /// How the keypad is bound to the keyboard
    #[arg(long, value_enum, default_value_t = Layout::Qwerty)]
    keymap: Layout,

    /// Do not ring the terminal bell for the sound timer
    #[arg(long)]
    mute: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Layout {
    Ascii,
    Qwerty,
}

impl Layout {
    fn key_map(self) -> KeyMap {
        match self {
            Layout::Ascii => KeyMap::ascii(),
            Layout::Qwerty => KeyMap::qwerty(),
        }
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // help and version are printed through the same path
            let code = if err.use_stderr() { error::EX_USAGE } else { 0 };
            let _ = err.print();
            process::exit(code);
        }
    };

    if let Err(err) = SimpleLogger::new()
        .with_level(LevelFilter::Warn)
        .env()
        .init()
    {
        eprintln!("unable to set up the logger: {}", err);
    }

    let code = match emulate(&args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("chip8: {}", err);
            err.exit_code()
        }
    };
    process::exit(code);
}

fn emulate(args: &Args) -> Result<(), CliError> {
    let rom = Rom::from_file(&args.rom)?;
    let mut chip = ChipSet::with_callback(rom, Beeper::new(args.mute));

    let stop = StopSignal::default();
    let mut screen = Screen::new(chip.get_name(), stop.clone()).map_err(CliError::Terminal)?;
    let mut keypad = Keypad::new(args.keymap.key_map(), stop.clone());
    let mut host = stop;

    let config = RunnerConfig {
        hertz: args.hertz,
        max_steps: None,
    };
    let res = run(
        &mut chip,
        Host {
            display: &mut screen,
            keyboard: &mut keypad,
            host: &mut host,
        },
        config,
    );

    let failure = screen.take_failure().or_else(|| keypad.take_failure());
    // restores the terminal before anything gets reported
    drop(screen);

    if let Some(err) = failure {
        return Err(CliError::Terminal(err));
    }
    match res {
        Ok(outcome) => {
            log::info!("the run ended with {:?}", outcome);
            Ok(())
        }
        Err(fault) => Err(CliError::Fault {
            fault,
            dump: chip.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["chip8", "pong.ch8"]).unwrap();
        assert_eq!(PathBuf::from("pong.ch8"), args.rom);
        assert_eq!(cpu::HERTZ, args.hertz);
        assert_eq!(Layout::Qwerty, args.keymap);
        assert!(!args.mute);
    }

    #[test]
    fn test_options() {
        let args = Args::try_parse_from([
            "chip8", "--hertz", "1000", "--keymap", "ascii", "--mute", "pong.ch8",
        ])
        .unwrap();
        assert_eq!(1000, args.hertz);
        assert_eq!(Layout::Ascii, args.keymap);
        assert!(args.mute);
        assert_eq!(Some(0xF), args.keymap.key_map().symbol('?'));
    }

    #[test]
    fn test_missing_rom_is_a_usage_error() {
        let err = Args::try_parse_from(["chip8"]).unwrap_err();
        assert!(err.use_stderr());
        assert_eq!(clap::error::ErrorKind::MissingRequiredArgument, err.kind());
    }

    #[test]
    fn test_missing_rom_file() {
        let args = Args::try_parse_from(["chip8", "this-rom-does-not-exist.ch8"]).unwrap();
        let err = emulate(&args).unwrap_err();
        assert!(matches!(err, CliError::Load(chip::LoadError::NotFound(_))));
        assert_eq!(2, err.exit_code());
    }

    #[test]
    fn test_rom_is_a_directory() {
        let dir = std::env::temp_dir();
        let args = Args::try_parse_from([PathBuf::from("chip8"), dir]).unwrap();
        let err = emulate(&args).unwrap_err();
        assert!(matches!(err, CliError::Load(chip::LoadError::Read { .. })));
        assert_eq!(5, err.exit_code());
    }
}
