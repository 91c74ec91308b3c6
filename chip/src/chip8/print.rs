//! The pretty print implementation of the [`ChipSet`](super::ChipSet), used to
//! report the machine state after a fault.
//! This implementation was split up into this file for smaller file sizes and higher
//! cohesion.

use std::fmt::{self, Write};

use once_cell::sync::Lazy;

use super::{ChipSet, ChipState};
use crate::{definitions::memory, timer::TimerCallback};

/// The amount of opcodes shown in a single row of the memory dump,
/// has to be bigger then 0
const HEX_PRINT_STEP: usize = 8;

/// The amount of bytes shown in a single row of the memory dump.
const POINTER_INCREMENT: usize = HEX_PRINT_STEP * memory::opcodes::SIZE;

const INDENT_FILLAMENT: char = '\t';

/// The values that are used when there are at least two rows of zeros.
const FILLER_BASE: &str = "...";

/// Prepares the line that will be used, in the case that there is at least
/// two rows of only zeros.
static ZERO_FILLER: Lazy<String> = Lazy::new(|| {
    let formatted = format!("{:#06X}", 0u16);
    let length = (formatted.len() + 1) * HEX_PRINT_STEP - 1;
    format!("{:^width$}", FILLER_BASE, width = length)
});

/// A single row of opcodes (only in this context)
struct Row<'a> {
    from: usize,
    data: &'a [u8],
}

impl Row<'_> {
    fn only_null(&self) -> bool {
        self.data.iter().all(|byte| *byte == 0)
    }
}

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:#06X} - {:#06X} :",
            self.from,
            self.from + self.data.len() - 1
        )?;
        for opcode in self.data.chunks(memory::opcodes::SIZE) {
            let value = opcode
                .iter()
                .fold(0u16, |acc, byte| (acc << 8) | *byte as u16);
            write!(f, " {:#06X}", value)?;
        }
        Ok(())
    }
}

/// Writes the memory, collapsing runs of rows that only contain zeros.
fn write_memory(f: &mut fmt::Formatter<'_>, data: &[u8]) -> fmt::Result {
    let rows: Vec<Row> = data
        .chunks(POINTER_INCREMENT)
        .enumerate()
        .map(|(i, data)| Row {
            from: i * POINTER_INCREMENT,
            data,
        })
        .collect();

    let mut i = 0;
    while i < rows.len() {
        let run = rows[i..].iter().take_while(|row| row.only_null()).count();
        if run >= 2 {
            let last = &rows[i + run - 1];
            writeln!(
                f,
                "{}{:#06X} - {:#06X} : {}",
                INDENT_FILLAMENT,
                rows[i].from,
                last.from + last.data.len() - 1,
                *ZERO_FILLER
            )?;
            i += run;
        } else {
            writeln!(f, "{}{}", INDENT_FILLAMENT, rows[i])?;
            i += 1;
        }
    }
    Ok(())
}

fn write_registers(f: &mut fmt::Formatter<'_>, registers: &[u8]) -> fmt::Result {
    let mut line = String::with_capacity(registers.len() * 10);
    for (i, register) in registers.iter().enumerate() {
        // a write to a string can not fail
        let _ = write!(line, " V{:X}={:#04X}", i, register);
    }
    writeln!(f, "registers:{}", line)
}

impl<S: TimerCallback> fmt::Display for ChipSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "rom: {}", self.name)?;
        match self.state {
            ChipState::Running => writeln!(f, "state: running")?,
            ChipState::AwaitingKey { register } => {
                writeln!(f, "state: awaiting key into V{:X}", register)?
            }
            ChipState::Faulted(fault) => writeln!(f, "state: {}", fault)?,
        }
        writeln!(
            f,
            "pc: {:#06X} opcode: {:#06X} I: {:#06X}",
            self.program_counter, self.opcode, self.index_register
        )?;
        write_registers(f, &self.registers)?;
        write!(f, "stack:")?;
        for entry in self.stack.iter() {
            write!(f, " {:#06X}", entry)?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "delay timer: {} sound timer: {}",
            self.timers.delay(),
            self.timers.sound()
        )?;
        writeln!(f, "memory:")?;
        write_memory(f, &self.memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Rom;

    #[test]
    fn test_print_collapses_zero_rows() {
        let rom = Rom::new("TEST", vec![0x00, 0xE0, 0x12, 0x00]).unwrap();
        let chip = ChipSet::new(rom);
        let text = format!("{}", chip);

        assert!(text.contains("rom: TEST"));
        assert!(text.contains("state: running"));
        assert!(text.contains("0x0200 - 0x020F : 0x00E0 0x1200 0x0000"));
        assert!(text.contains(&format!("0x0000 - 0x01FF : {}", *ZERO_FILLER)));
        // the font is at the end of the memory
        assert!(text.contains("0x0FF0 - 0x0FFF : 0xF0E0 0x9090 0x90E0 0xF080 0xF080 0xF0F0 0x80F0 0x8080"));
    }

    #[test]
    fn test_print_registers() {
        let rom = Rom::new("TEST", vec![]).unwrap();
        let mut chip = ChipSet::new(rom);
        chip.registers[0xA] = 0x42;
        let text = format!("{}", chip);
        assert!(text.contains("VA=0x42"));
        assert!(text.contains("V0=0x00"));
    }
}
