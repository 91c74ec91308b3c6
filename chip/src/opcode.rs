//! Opcode abstractions, functionality and constants.
use std::convert::{TryFrom, TryInto};

use crate::{definitions::memory, FaultKind, OpcodeError};

/// the base mask used for generating all the other sub masks
pub(crate) const OPCODE_MASK_FFFF: u16 = u16::MAX;

/// the mask for the first twelve bits
pub(crate) const OPCODE_MASK_FFF0: u16 = OPCODE_MASK_FFFF << 4;

/// the mask for the first eight bits
pub(crate) const OPCODE_MASK_FF00: u16 = OPCODE_MASK_FFFF << 8;

/// the mask for the first four bits
pub(crate) const OPCODE_MASK_F000: u16 = OPCODE_MASK_FFFF << 12;

/// the mask for the last four bits
pub(crate) const OPCODE_MASK_000F: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FFF0;

/// the mask for the last eight bits
pub(crate) const OPCODE_MASK_00FF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_FF00;

/// the mask for the last twelve bits
pub(crate) const OPCODE_MASK_0FFF: u16 = OPCODE_MASK_FFFF ^ OPCODE_MASK_F000;

/// the size of a single byte
const BYTE_SIZE: u16 = 0x8;

/// a wrapper type for u16 to make it clear what is meant to be used
pub type Opcode = u16;

/// will build an opcode from data and the given point
/// # Arguments
///
/// - `data` - A slice of u8 data entries used to generate the opcodes
/// - `pointer` - Where in the data the opcode shall be extracted, so `pointer` and `pointer + 1` make
/// the opcode up
///
/// # Example
/// ```rust
/// # use chip::opcode::*;
/// # use chip::OpcodeError;
///  const OPCODES: [Opcode; 2] = [0x00EE, 0x1EDA];
///  const SPLIT_OPCODE: [u8; 4] = [0x00, 0xEE, 0x1E, 0xDA];
///  for (i, val) in OPCODES.iter().enumerate() {
///      let opcode = build_opcode(&SPLIT_OPCODE, i * 2).expect("This will work.");
///      assert_eq!(opcode, *val);
///  }
/// # let pointer = 3;
/// # let err = OpcodeError::MemoryInvalid {pointer, len: SPLIT_OPCODE.len() };
/// # assert_eq!(
/// #    Err(err),
/// #    build_opcode(&SPLIT_OPCODE, pointer)
/// # );
/// ```
pub fn build_opcode(data: &[u8], pointer: usize) -> Result<Opcode, OpcodeError> {
    // controlling that there is no illegal access here
    if pointer + 1 < data.len() {
        Ok(Opcode::from_be_bytes([data[pointer], data[pointer + 1]]))
    } else {
        Err(OpcodeError::MemoryInvalid {
            pointer,
            len: data.len(),
        })
    }
}

/// These are special traits used to filter out information
/// from opcodes
pub trait OpcodeTrait {
    /// this is an opcode extractor that will return the
    /// opcode family `T` shifted down to a single nibble
    fn t(&self) -> u8;

    /// this is an opcode extractor for the opcode type `TNNN`
    /// - `T` is the opcode type
    /// - `NNN` is an address
    fn nnn(&self) -> u16;

    /// this is an opcode extractor for the opcode type `TXNN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `NN` is a constant
    fn xnn(&self) -> (usize, u8);

    /// this is an opcode extractor for the opcode type `TXYN`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    /// - `N` is a opcode subtype or a nibble constant
    fn xyn(&self) -> (usize, usize, u8);

    /// this is an opcode extractor for the opcode type `TXYT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    /// - `Y` is a register index
    fn xy(&self) -> (usize, usize);

    /// this is an opcode extractor for the opcode type `TXTT`
    /// - `T` is the opcode type
    /// - `X` is a register index
    fn x(&self) -> usize;
}

impl OpcodeTrait for Opcode {
    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.t(), 0x1);
    /// ```
    fn t(&self) -> u8 {
        const SHIFT: u16 = 3 * BYTE_SIZE / 2;
        ((self & OPCODE_MASK_F000) >> SHIFT) as u8
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.nnn(), 0xEDA)
    /// ```
    fn nnn(&self) -> u16 {
        self & OPCODE_MASK_0FFF
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    /// const BASE_OPCODE: Opcode = 0x1EDA;
    /// assert_eq!(BASE_OPCODE.xnn(), (0xE, 0xDA));
    /// ```
    fn xnn(&self) -> (usize, u8) {
        let x = self.x();
        let nn = (self & OPCODE_MASK_00FF) as u8;
        (x, nn)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xyn(), (0xE, 0xD, 0xA));
    /// ```
    fn xyn(&self) -> (usize, usize, u8) {
        let (x, y) = self.xy();
        let n = (self & OPCODE_MASK_000F) as u8;
        (x, y, n)
    }

    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.xy(), (0xE, 0xD));
    /// ```
    fn xy(&self) -> (usize, usize) {
        let x = self.x();
        const MASK: u16 = OPCODE_MASK_00FF ^ OPCODE_MASK_000F;
        const NIBBLE: u16 = BYTE_SIZE / 2;
        let y = ((self & MASK) >> NIBBLE) as usize;
        (x, y)
    }

    /// # Example
    /// ```rust
    /// # use chip::opcode::*;
    ///  const BASE_OPCODE: Opcode = 0x1EDA;
    ///  assert_eq!(BASE_OPCODE.x(), 0xE);
    /// ```
    fn x(&self) -> usize {
        ((self & OPCODE_MASK_0FFF & OPCODE_MASK_FF00) >> BYTE_SIZE) as usize
    }
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents the program steps that the chip
/// can take.
pub enum ProgramCounterStep {
    /// Will not change the program counter
    None,
    /// Will move the program counter to the next instruction
    Next,
    /// Will skip the next instruction
    Skip,
    /// Will simply move the program counter to the given location.
    ///
    /// The location is not validated here, an invalid location is
    /// reported on the next fetch.
    Jump(usize),
}

impl ProgramCounterStep {
    /// Will return a Skip if the condition is true.
    ///
    /// # Example
    /// ```rust
    /// # use chip::opcode::ProgramCounterStep;
    /// assert_eq!(ProgramCounterStep::Next, ProgramCounterStep::cond(false));
    /// assert_eq!(ProgramCounterStep::Skip, ProgramCounterStep::cond(true));
    /// ```
    #[inline]
    pub fn cond(cond: bool) -> Self {
        if cond {
            ProgramCounterStep::Skip
        } else {
            ProgramCounterStep::Next
        }
    }

    /// Maps the [`ProgramCounterStep`](ProgramCounterStep) to the corresponding movement distance
    /// or, for jumps, to the target.
    #[inline]
    pub fn step(&self) -> usize {
        match *self {
            ProgramCounterStep::Next => memory::opcodes::SIZE,
            ProgramCounterStep::Skip => 2 * memory::opcodes::SIZE,
            ProgramCounterStep::None => 0,
            ProgramCounterStep::Jump(pointer) => pointer,
        }
    }
}

/// Implements the conversion from an opcode sub selector into
/// the given enum, unknown selectors are rejected.
macro_rules! implTryFromSelector {
    ($type_name:ty : $type_from:ty : $( $key:literal => $val:expr ),+ $(,)? ) => {
        impl TryFrom<$type_from> for $type_name {
            type Error = ();

            fn try_from(value: $type_from) -> Result<Self, Self::Error> {
                match value {
                    $(
                        $key => Ok($val),
                    )+
                    _ => Err(()),
                }
            }
        }
    };
}

/// Operand of the `TNNN` opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Address {
    pub nnn: u16,
}

impl From<Opcode> for Address {
    fn from(value: Opcode) -> Self {
        Self { nnn: value.nnn() }
    }
}

/// Operands of the `TXNN` opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterConst {
    pub x: usize,
    pub nn: u8,
}

impl From<Opcode> for RegisterConst {
    fn from(value: Opcode) -> Self {
        let (x, nn) = value.xnn();
        Self { x, nn }
    }
}

/// Operands of the `TXY0` opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterPair {
    pub x: usize,
    pub y: usize,
}

impl TryFrom<Opcode> for RegisterPair {
    type Error = ();

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        match value.xyn() {
            (x, y, 0) => Ok(Self { x, y }),
            _ => Err(()),
        }
    }
}

/// Operands of the `DXYN` opcode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sprite {
    pub x: usize,
    pub y: usize,
    pub n: usize,
}

impl From<Opcode> for Sprite {
    fn from(value: Opcode) -> Self {
        let (x, y, n) = value.xyn();
        Self { x, y, n: n as usize }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Assign,
    Or,
    And,
    Xor,
    Add,
    Sub,
    ShiftRight,
    SubReverse,
    ShiftLeft,
}

implTryFromSelector!(ArithmeticOp : u8 :
    // 8XY0
    0x0 => ArithmeticOp::Assign,
    // 8XY1
    0x1 => ArithmeticOp::Or,
    // 8XY2
    0x2 => ArithmeticOp::And,
    // 8XY3
    0x3 => ArithmeticOp::Xor,
    // 8XY4
    0x4 => ArithmeticOp::Add,
    // 8XY5
    0x5 => ArithmeticOp::Sub,
    // 8XY6
    0x6 => ArithmeticOp::ShiftRight,
    // 8XY7
    0x7 => ArithmeticOp::SubReverse,
    // 8XYE
    0xE => ArithmeticOp::ShiftLeft,
);

/// Operands of the `8XYT` opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arithmetic {
    pub ops: ArithmeticOp,
    pub x: usize,
    pub y: usize,
}

impl TryFrom<Opcode> for Arithmetic {
    type Error = ();

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let (x, y, n) = value.xyn();
        let ops = n.try_into()?;
        Ok(Self { ops, x, y })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOp {
    Pressed,
    NotPressed,
}

implTryFromSelector!(KeyOp : u8 :
    // EX9E
    0x9E => KeyOp::Pressed,
    // EXA1
    0xA1 => KeyOp::NotPressed,
);

/// Operands of the `EXTT` opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub ops: KeyOp,
    pub x: usize,
}

impl TryFrom<Opcode> for Key {
    type Error = ();

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let (x, nn) = value.xnn();
        let ops = nn.try_into()?;
        Ok(Self { ops, x })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiscOp {
    GetDelayTimer,
    AwaitKeyPress,
    SetDelayTimer,
    SetSoundTimer,
    AddVxToI,
    SetIToSprite,
    StoreBCD,
    StoreV0ToVx,
    FillV0ToVx,
}

implTryFromSelector!(MiscOp : u8 :
    // FX07
    0x07 => MiscOp::GetDelayTimer,
    // FX0A
    0x0A => MiscOp::AwaitKeyPress,
    // FX15
    0x15 => MiscOp::SetDelayTimer,
    // FX18
    0x18 => MiscOp::SetSoundTimer,
    // FX1E
    0x1E => MiscOp::AddVxToI,
    // FX29
    0x29 => MiscOp::SetIToSprite,
    // FX33
    0x33 => MiscOp::StoreBCD,
    // FX55
    0x55 => MiscOp::StoreV0ToVx,
    // FX65
    0x65 => MiscOp::FillV0ToVx,
);

/// Operands of the `FXTT` opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Misc {
    pub ops: MiscOp,
    pub x: usize,
}

impl TryFrom<Opcode> for Misc {
    type Error = ();

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let (x, nn) = value.xnn();
        let ops = nn.try_into()?;
        Ok(Self { ops, x })
    }
}

/// A fully decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcodes {
    /// `00E0`
    Clear,
    /// `00EE`
    Return,
    /// `1NNN`
    Jump(Address),
    /// `2NNN`
    Call(Address),
    /// `3XNN`
    SkipEqual(RegisterConst),
    /// `4XNN`
    SkipNotEqual(RegisterConst),
    /// `5XY0`
    SkipRegistersEqual(RegisterPair),
    /// `6XNN`
    SetConst(RegisterConst),
    /// `7XNN`
    AddConst(RegisterConst),
    /// `8XYT`
    Arithmetic(Arithmetic),
    /// `9XY0`
    SkipRegistersNotEqual(RegisterPair),
    /// `ANNN`
    SetIndex(Address),
    /// `BNNN`
    JumpOffset(Address),
    /// `CXNN`
    Random(RegisterConst),
    /// `DXYN`
    Draw(Sprite),
    /// `EXTT`
    Key(Key),
    /// `FXTT`
    Misc(Misc),
}

impl TryFrom<Opcode> for Opcodes {
    type Error = OpcodeError;

    fn try_from(value: Opcode) -> Result<Self, Self::Error> {
        let invalid = |_| OpcodeError::InvalidOpcode(value);
        let res = match value.t() {
            0x0 => match value {
                0x00E0 => Opcodes::Clear,
                0x00EE => Opcodes::Return,
                // 0NNN machine code routines are not supported
                _ => return Err(OpcodeError::InvalidOpcode(value)),
            },
            0x1 => Opcodes::Jump(value.into()),
            0x2 => Opcodes::Call(value.into()),
            0x3 => Opcodes::SkipEqual(value.into()),
            0x4 => Opcodes::SkipNotEqual(value.into()),
            0x5 => Opcodes::SkipRegistersEqual(value.try_into().map_err(invalid)?),
            0x6 => Opcodes::SetConst(value.into()),
            0x7 => Opcodes::AddConst(value.into()),
            0x8 => Opcodes::Arithmetic(value.try_into().map_err(invalid)?),
            0x9 => Opcodes::SkipRegistersNotEqual(value.try_into().map_err(invalid)?),
            0xA => Opcodes::SetIndex(value.into()),
            0xB => Opcodes::JumpOffset(value.into()),
            0xC => Opcodes::Random(value.into()),
            0xD => Opcodes::Draw(value.into()),
            0xE => Opcodes::Key(value.try_into().map_err(invalid)?),
            _ => Opcodes::Misc(value.try_into().map_err(invalid)?),
        };
        Ok(res)
    }
}

/// Represents a step of the program counter
/// this requires the enum ProgramCounterStep
/// to work.
pub trait ProgramCounter {
    /// will move the program counter forward by a step.
    fn step(&mut self, step: ProgramCounterStep);
}

#[derive(Debug, PartialEq, Clone, Copy)]
/// Represents a command from the interpreter up to the host.
pub enum Operation {
    /// If no action has to be taken.
    None,
    /// If the host shall wait for the next key press
    Wait,
    /// The framebuffer changed
    Draw,
}

/// These are the traits that have to be full filled for a working opcode
/// table.
///
/// This trait requires the implementation of the [`ProgramCounter`](ProgramCounter) trait,
/// as the step is applied after each successfully executed opcode. An opcode that fails
/// leaves the program counter where it was.
pub trait ChipOpcodes: ProgramCounter {
    /// will execute a single decoded opcode and move the program counter
    fn calc(&mut self, opcode: &Opcodes) -> Result<Operation, FaultKind> {
        let mut operation = Operation::None;
        let step_op = |(step, op): (ProgramCounterStep, Operation)| {
            operation = op;
            step
        };

        let step = match opcode {
            Opcodes::Clear => self.clear().map(step_op),
            Opcodes::Return => self.ret(),
            Opcodes::Jump(opcode) => self.jump(opcode),
            Opcodes::Call(opcode) => self.call(opcode),
            Opcodes::SkipEqual(opcode) => self.skip_equal(opcode),
            Opcodes::SkipNotEqual(opcode) => self.skip_not_equal(opcode),
            Opcodes::SkipRegistersEqual(opcode) => self.skip_registers_equal(opcode),
            Opcodes::SetConst(opcode) => self.set_const(opcode),
            Opcodes::AddConst(opcode) => self.add_const(opcode),
            Opcodes::Arithmetic(opcode) => self.arithmetic(opcode),
            Opcodes::SkipRegistersNotEqual(opcode) => self.skip_registers_not_equal(opcode),
            Opcodes::SetIndex(opcode) => self.set_index(opcode),
            Opcodes::JumpOffset(opcode) => self.jump_offset(opcode),
            Opcodes::Random(opcode) => self.random(opcode),
            Opcodes::Draw(opcode) => self.draw(opcode).map(step_op),
            Opcodes::Key(opcode) => self.key(opcode),
            Opcodes::Misc(opcode) => self.misc(opcode).map(step_op),
        }?;

        self.step(step);
        Ok(operation)
    }

    /// - `00E0` - Display  - `disp_clear()`        - Clears the screen.
    fn clear(&mut self) -> Result<(ProgramCounterStep, Operation), FaultKind>;

    /// - `00EE` - Flow     - `return;`             - Returns from a subroutine.
    fn ret(&mut self) -> Result<ProgramCounterStep, FaultKind>;

    /// - `1NNN` - Flow     - `goto NNN;`           - Jumps to address `NNN`.
    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind>;

    /// - `2NNN` - Flow     - `*(0xNNN)()`          - Calls subroutine at `NNN`.
    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind>;

    /// - `3XNN` - Cond     - `if(Vx==NN)`          - Skips the next instruction if `VX` equals `NN`.
    fn skip_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind>;

    /// - `4XNN` - Cond     - `if(Vx!=NN)`          - Skips the next instruction if `VX` doesn't equal `NN`.
    fn skip_not_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind>;

    /// - `5XY0` - Cond     - `if(Vx==Vy)`          - Skips the next instruction if `VX` equals `VY`.
    fn skip_registers_equal(&self, opcode: &RegisterPair)
        -> Result<ProgramCounterStep, FaultKind>;

    /// - `6XNN` - Const    - `Vx = NN`             - Sets `VX` to `NN`.
    fn set_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind>;

    /// - `7XNN` - Const    - `Vx += NN`            - Adds `NN` to `VX`. (Carry flag is not changed)
    fn add_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind>;

    /// A mutiuse opcode base for type `8XYT` (T is a sub opcode)
    ///
    /// - `8XY0` - Assign   - `Vx=Vy`               - Sets `VX` to the value of `VY`.
    /// - `8XY1` - BitOp    - `Vx=Vx|Vy`            - Sets `VX` to `VX` or `VY`.
    /// - `8XY2` - BitOp    - `Vx=Vx&Vy`            - Sets `VX` to `VX` and `VY`.
    /// - `8XY3` - BitOp    - `Vx=Vx^Vy`            - Sets `VX` to `VX` xor `VY`.
    /// - `8XY4` - Math     - `Vx += Vy`            - Adds `VY` to `VX`. `VF` is set to `1` when there's a carry, and to `0` when there isn't.
    /// - `8XY5` - Math     - `Vx -= Vy`            - `VY` is subtracted from `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XY6` - BitOp    - `Vx=Vy>>1`            - Stores the least significant bit of `VY` in `VF` and stores `VY` shifted right by `1` in `VX`.
    /// - `8XY7` - Math     - `Vx=Vy-Vx`            - Sets `VX` to `VY` minus `VX`. `VF` is set to `0` when there's a borrow, and `1` when there isn't.
    /// - `8XYE` - BitOp    - `Vx=Vy<<1`            - Stores the most significant bit of `VY` in `VF` and stores `VY` shifted left by `1` in `VX`.
    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, FaultKind>;

    /// - `9XY0` - Cond     - `if(Vx!=Vy)`          - Skips the next instruction if `VX` doesn't equal `VY`.
    fn skip_registers_not_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, FaultKind>;

    /// - `ANNN` - MEM      - `I = NNN`             - Sets `I` to the address `NNN`.
    fn set_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind>;

    /// - `BNNN` - Flow     - `PC=V0+NNN`           - Jumps to the address `NNN` plus `V0`.
    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind>;

    /// - `CXNN` - Rand     - `Vx=rand()&NN`        - Sets `VX` to a random byte masked with `NN`.
    fn random(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind>;

    /// - `DXYN` - Disp     - `draw(Vx,Vy,N)`       - Draws a sprite at coordinate `(VX, VY)` that has a width of `8` pixels and a height of `N` pixels. Each row of `8` pixels is read as bit-coded starting from memory location `I`; `I` value doesn’t change after the execution of this instruction. `VF` is set to `1` if any screen pixels are flipped from set to unset when the sprite is drawn, and to `0` if that doesn’t happen
    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), FaultKind>;

    /// A multiuse opcode base for type `EXTT` (T is a sub opcode)
    ///
    /// - `EX9E` - KeyOp    - `if(key()==Vx)`       - Skips the next instruction if the key stored in `VX` is pressed.
    /// - `EXA1` - KeyOp    - `if(key()!=Vx)`       - Skips the next instruction if the key stored in `VX` isn't pressed.
    fn key(&self, opcode: &Key) -> Result<ProgramCounterStep, FaultKind>;

    /// A multiuse opcode base for type `FXTT` (T is a sub opcode)
    ///
    /// - `FX07` - Timer    - `Vx = get_delay()`    - Sets `VX` to the value of the delay timer.
    /// - `FX0A` - KeyOp    - `Vx = get_key()`      - A key press is awaited, and then stored in `VX`.
    /// - `FX15` - Timer    - `delay_timer(Vx)`     - Sets the delay timer to `VX`.
    /// - `FX18` - Sound    - `sound_timer(Vx)`     - Sets the sound timer to `VX`.
    /// - `FX1E` - MEM      - `I +=Vx`              - Adds `VX` to `I`. `VF` is not affected.
    /// - `FX29` - MEM      - `I=sprite_addr[Vx]`   - Sets `I` to the location of the sprite for the character in `VX`.
    /// - `FX33` - BCD      - `246 => 2, 4, 6`      - Stores the binary-coded decimal representation of `VX` at `I`, `I+1` and `I+2`.
    /// - `FX55` - MEM      - `reg_dump(Vx,&I)`     - Stores `V0` to `VX` (including `VX`) in memory starting at address `I`. `I` is set to `I + X + 1` afterwards.
    /// - `FX65` - MEM      - `reg_load(Vx,&I)`     - Fills `V0` to `VX` (including `VX`) from memory starting at address `I`. `I` is set to `I + X + 1` afterwards.
    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), FaultKind>;
}

#[cfg(test)]
mod tests {
    use std::convert::TryInto;

    use super::*;

    #[test]
    fn test_tryfrom_opcode_simple() {
        let value: Opcode = 0x00E0;
        let conv = value.try_into();
        assert_eq!(conv, Ok(Opcodes::Clear));
    }

    #[test]
    fn test_tryfrom_opcode_simple_fail() {
        let value: Opcode = 0x00E1;
        let conv: Result<Opcodes, _> = value.try_into();
        assert_eq!(conv, Err(OpcodeError::InvalidOpcode(value)));
    }

    #[test]
    fn test_tryfrom_opcode_multiple() {
        let tests = [
            (0x00E0, Ok(Opcodes::Clear)),
            (0x00EE, Ok(Opcodes::Return)),
            (0x0123, Err(())),
            (0x1919, Ok(Opcodes::Jump(Address { nnn: 0x919 }))),
            (0x2222, Ok(Opcodes::Call(Address { nnn: 0x222 }))),
            (
                0x3123,
                Ok(Opcodes::SkipEqual(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x4123,
                Ok(Opcodes::SkipNotEqual(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x5120,
                Ok(Opcodes::SkipRegistersEqual(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            (0x5121, Err(())),
            (
                0x6123,
                Ok(Opcodes::SetConst(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x7123,
                Ok(Opcodes::AddConst(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0x8124,
                Ok(Opcodes::Arithmetic(Arithmetic {
                    ops: ArithmeticOp::Add,
                    x: 0x1,
                    y: 0x2,
                })),
            ),
            (
                0x812E,
                Ok(Opcodes::Arithmetic(Arithmetic {
                    ops: ArithmeticOp::ShiftLeft,
                    x: 0x1,
                    y: 0x2,
                })),
            ),
            (0x8128, Err(())),
            (0x8ABF, Err(())),
            (
                0x9120,
                Ok(Opcodes::SkipRegistersNotEqual(RegisterPair { x: 0x1, y: 0x2 })),
            ),
            (0x9121, Err(())),
            (0xA222, Ok(Opcodes::SetIndex(Address { nnn: 0x222 }))),
            (0xB222, Ok(Opcodes::JumpOffset(Address { nnn: 0x222 }))),
            (
                0xC123,
                Ok(Opcodes::Random(RegisterConst { x: 0x1, nn: 0x23 })),
            ),
            (
                0xD123,
                Ok(Opcodes::Draw(Sprite {
                    x: 0x1,
                    y: 0x2,
                    n: 0x3,
                })),
            ),
            (
                0xE19E,
                Ok(Opcodes::Key(Key {
                    x: 0x1,
                    ops: KeyOp::Pressed,
                })),
            ),
            (
                0xE1A1,
                Ok(Opcodes::Key(Key {
                    x: 0x1,
                    ops: KeyOp::NotPressed,
                })),
            ),
            (0xE111, Err(())),
            (
                0xF00A,
                Ok(Opcodes::Misc(Misc {
                    x: 0x0,
                    ops: MiscOp::AwaitKeyPress,
                })),
            ),
            (
                0xF733,
                Ok(Opcodes::Misc(Misc {
                    x: 0x7,
                    ops: MiscOp::StoreBCD,
                })),
            ),
            (
                0xF065,
                Ok(Opcodes::Misc(Misc {
                    x: 0x0,
                    ops: MiscOp::FillV0ToVx,
                })),
            ),
            (0xF0AA, Err(())),
        ];
        for (value, res) in tests {
            let conv: Result<Opcodes, _> = value.try_into();
            assert_eq!(conv, res.map_err(|_| OpcodeError::InvalidOpcode(value)));
        }
    }

    #[test]
    fn test_all_misc_selectors_decode() {
        let selectors = [0x07, 0x0A, 0x15, 0x18, 0x1E, 0x29, 0x33, 0x55, 0x65];
        for selector in 0..=u8::MAX {
            let res: Result<MiscOp, _> = selector.try_into();
            assert_eq!(selectors.contains(&selector), res.is_ok(), "{:#X}", selector);
        }
    }
}
