use std::{convert::TryFrom, ops::Range, time::Instant};

use {
    crate::{
        definitions::{cpu, display, keyboard, memory},
        devices::Keyboard,
        framebuffer::Framebuffer,
        opcode::{self, ChipOpcodes, Opcode, Opcodes, Operation, ProgramCounter, ProgramCounterStep},
        resources::Rom,
        timer::{NoCallback, TimerCallback, Timers},
        Fault, FaultKind, LoadError,
    },
    rand::RngCore,
    tinyvec::ArrayVec,
};

/// The execution state of the engine between two steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipState {
    /// The next step fetches and executes an instruction.
    Running,
    /// A `FX0A` is waiting for a key press, no instruction is fetched until
    /// one arrives.
    AwaitingKey { register: usize },
    /// The engine hit a fault and will not execute anything anymore.
    Faulted(Fault),
}

/// The ChipSet struct represents the current state
/// of the system, it contains all the structures
/// needed for emulating an instant on the
/// Chip8 CPU.
pub struct ChipSet<S: TimerCallback = NoCallback> {
    /// name of the loaded rom
    pub(super) name: String,
    /// all two bytes long and stored big-endian
    pub(super) opcode: Opcode,
    /// - `0x200-0xFAF` - Program ROM and work RAM
    /// - `0xFB0-0xFFF` - Used for the built in `4x5` pixel font set (`0-F`)
    pub(super) memory: Vec<u8>,
    /// `8-bit` data registers named `V0` to `VF`. The `VF` register doubles as a flag for some
    /// instructions. In an addition operation, `VF` is the carry flag, while in subtraction,
    /// it is the "no borrow" flag. In the draw instruction `VF` is set upon pixel collision.
    pub(super) registers: [u8; cpu::register::SIZE],
    /// The index register `I`, it is not bounds checked when modified, only
    /// when memory is accessed through it.
    pub(super) index_register: u16,
    /// The address of the next instruction to be executed.
    pub(super) program_counter: usize,
    /// The stack is only used to store return addresses when subroutines are called.
    /// The amount of entries is the stack pointer plus one, so an empty stack
    /// stands for the pointer `-1`.
    pub(super) stack: ArrayVec<[u16; cpu::stack::SIZE]>,
    /// The delay and sound timer, both count down at 100 hertz until they reach 0.
    pub(super) timers: Timers<S>,
    /// The screen
    pub(super) display: Framebuffer,
    /// The keypad as seen by the program.
    pub(super) keyboard: Keyboard,
    /// This stores the random number generator, used by the chipset.
    /// It is stored into the chipset, so as to enable simple mocking
    /// of the given type.
    pub(super) rng: Box<dyn RngCore + Send>,
    pub(super) state: ChipState,
}

impl ChipSet<NoCallback> {
    /// will create a new chipset object without a sound output
    pub fn new(rom: Rom) -> Self {
        Self::with_callback(rom, NoCallback)
    }
}

impl<S: TimerCallback> ChipSet<S> {
    /// will create a new chipset object, the callback runs every time the
    /// sound timer expires.
    pub fn with_callback(rom: Rom, sound: S) -> Self {
        // initialize all the memory with 0
        let mut ram = vec![0; memory::SIZE];

        // load fonts
        ram[display::fontset::LOCATION..].copy_from_slice(&display::fontset::FONTSET);

        // write the rom data into memory, the rom size was checked on creation
        let data = rom.get_data();
        ram[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + data.len())].copy_from_slice(data);

        log::info!("loaded rom '{}' ({} bytes)", rom.get_name(), data.len());

        Self {
            name: rom.get_name().to_string(),
            opcode: 0,
            memory: ram,
            registers: [0; cpu::register::SIZE],
            index_register: 0,
            program_counter: cpu::PROGRAM_COUNTER,
            stack: ArrayVec::new(),
            timers: Timers::new(sound),
            display: Framebuffer::new(),
            keyboard: Keyboard::new(),
            rng: Box::new(rand::rngs::OsRng),
            state: ChipState::Running,
        }
    }

    /// Will copy the program into the program region, leaving the rest
    /// of the memory untouched.
    pub fn load(&mut self, program: &[u8]) -> Result<(), LoadError> {
        if program.len() > cpu::MAX_PROGRAM_SIZE {
            return Err(LoadError::ProgramTooLarge {
                size: program.len(),
                max: cpu::MAX_PROGRAM_SIZE,
            });
        }
        self.memory[cpu::PROGRAM_COUNTER..(cpu::PROGRAM_COUNTER + program.len())]
            .copy_from_slice(program);
        Ok(())
    }

    /// will get the next opcode from memory
    pub(super) fn set_opcode(&mut self) -> Result<Opcode, Fault> {
        // will build the opcode given from the pointer
        self.opcode = opcode::build_opcode(&self.memory, self.program_counter).map_err(|_| {
            Fault::new(self.program_counter, None, FaultKind::InvalidProgramCounter)
        })?;
        Ok(self.opcode)
    }

    /// will advance the program by a single step
    ///
    /// While a key press is awaited no instruction is fetched and
    /// [`Operation::Wait`](Operation::Wait) is returned. Once the chip
    /// faulted every further call returns the same fault.
    pub fn next(&mut self) -> Result<Operation, Fault> {
        match self.state {
            ChipState::Faulted(fault) => return Err(fault),
            ChipState::AwaitingKey { register } => return Ok(self.resume_key_wait(register)),
            ChipState::Running => {}
        }

        let pc = self.program_counter;
        let res = self.set_opcode().and_then(|opcode| {
            log::trace!("pc {:#06X} opcode {:#06X}", pc, opcode);
            let decoded = Opcodes::try_from(opcode)
                .map_err(|_| Fault::new(pc, Some(opcode), FaultKind::InvalidOpcode))?;
            self.calc(&decoded)
                .map_err(|kind| Fault::new(pc, Some(opcode), kind))
        });

        if let Err(fault) = res {
            log::error!("{}", fault);
            self.state = ChipState::Faulted(fault);
        }
        res
    }

    /// Enters the key wait of `FX0A`, older presses are dropped so only
    /// a press that happens from now on is accepted.
    pub(super) fn await_key(&mut self, register: usize) {
        log::debug!("waiting for a key press into V{:X}", register);
        self.keyboard.clear_press();
        self.state = ChipState::AwaitingKey { register };
    }

    fn resume_key_wait(&mut self, register: usize) -> Operation {
        match self.keyboard.take_press() {
            Some(key) => {
                log::debug!("key {:X} pressed, resuming", key);
                self.registers[register] = key;
                self.step(ProgramCounterStep::Next);
                self.state = ChipState::Running;
                Operation::None
            }
            None => Operation::Wait,
        }
    }

    /// Will bring the delay and sound timer up to date with the given time.
    pub fn update_timers(&mut self, now: Instant) {
        self.timers.update(now);
    }

    /// Will write keyboard data into internal keyboard representation.
    pub fn set_keyboard(&mut self, keys: &[bool; keyboard::SIZE]) {
        self.keyboard.set_mult(keys);
    }

    /// Will get the current state of the keyboard
    pub fn get_keyboard(&self) -> &[bool] {
        self.keyboard.get_keys()
    }

    /// will return the sound timer
    pub fn get_sound_timer(&self) -> u8 {
        self.timers.sound()
    }

    /// will return the delay timer
    pub fn get_delay_timer(&self) -> u8 {
        self.timers.delay()
    }

    /// Will return the current display configuration
    pub fn get_display(&self) -> &Framebuffer {
        &self.display
    }

    pub fn get_registers(&self) -> &[u8] {
        &self.registers
    }

    pub fn get_index_register(&self) -> u16 {
        self.index_register
    }

    pub fn get_program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn get_memory(&self) -> &[u8] {
        &self.memory
    }

    /// The index of the top most stack entry, `None` if the stack is empty.
    pub fn stack_pointer(&self) -> Option<usize> {
        self.stack.len().checked_sub(1)
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ChipState {
        self.state
    }

    /// The fault that stopped the execution, if there was one.
    pub fn fault(&self) -> Option<Fault> {
        match self.state {
            ChipState::Faulted(fault) => Some(fault),
            _ => None,
        }
    }

    /// Will push the current pointer to the stack
    pub(super) fn push_stack(&mut self, pointer: u16) -> Result<(), FaultKind> {
        match self.stack.try_push(pointer) {
            None => Ok(()),
            Some(_) => Err(FaultKind::StackOverflow),
        }
    }

    /// Will pop from the stack
    pub(super) fn pop_stack(&mut self) -> Result<u16, FaultKind> {
        self.stack.pop().ok_or(FaultKind::StackUnderflow)
    }

    /// The memory range `[start, start + len)`, if it lies completely
    /// inside of the memory.
    pub(super) fn memory_range(&self, start: usize, len: usize) -> Result<Range<usize>, FaultKind> {
        let end = start + len;
        if end > self.memory.len() {
            Err(FaultKind::MemoryOutOfBounds {
                address: start.max(self.memory.len()),
            })
        } else {
            Ok(start..end)
        }
    }
}

impl<S: TimerCallback> ProgramCounter for ChipSet<S> {
    fn step(&mut self, step: ProgramCounterStep) {
        self.program_counter = if let ProgramCounterStep::Jump(_) = step {
            step.step()
        } else {
            self.program_counter + step.step()
        }
    }
}
