use crate::{
    definitions::{cpu, display},
    opcode::{
        Address, Arithmetic, ArithmeticOp, ChipOpcodes, Key, KeyOp, Misc, MiscOp, Operation,
        ProgramCounterStep, RegisterConst, RegisterPair, Sprite,
    },
    timer::TimerCallback,
    FaultKind,
};

use super::ChipSet;

impl<S: TimerCallback> ChipOpcodes for ChipSet<S> {
    fn clear(&mut self) -> Result<(ProgramCounterStep, Operation), FaultKind> {
        // 00E0
        self.display.clear();
        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn ret(&mut self) -> Result<ProgramCounterStep, FaultKind> {
        // 00EE
        // Return from sub routine => pop from stack
        let pc = self.pop_stack()?;
        log::debug!("return to {:#06X}", pc);
        Ok(ProgramCounterStep::Jump(pc as usize))
    }

    fn jump(&self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind> {
        Ok(ProgramCounterStep::Jump(opcode.nnn as usize))
    }

    fn call(&mut self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind> {
        // 2NNN
        // the address after the call is what the return jumps back to
        let next = self.program_counter + ProgramCounterStep::Next.step();
        self.push_stack(next as u16)?;
        log::debug!("call {:#06X}, depth {}", opcode.nnn, self.stack.len());
        Ok(ProgramCounterStep::Jump(opcode.nnn as usize))
    }

    fn skip_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind> {
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] == opcode.nn))
    }

    fn skip_not_equal(&self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind> {
        Ok(ProgramCounterStep::cond(self.registers[opcode.x] != opcode.nn))
    }

    fn skip_registers_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, FaultKind> {
        Ok(ProgramCounterStep::cond(
            self.registers[opcode.x] == self.registers[opcode.y],
        ))
    }

    fn set_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind> {
        self.registers[opcode.x] = opcode.nn;
        Ok(ProgramCounterStep::Next)
    }

    fn add_const(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind> {
        // let VX overflow, but ignore carry
        self.registers[opcode.x] = self.registers[opcode.x].wrapping_add(opcode.nn);
        Ok(ProgramCounterStep::Next)
    }

    fn arithmetic(&mut self, opcode: &Arithmetic) -> Result<ProgramCounterStep, FaultKind> {
        let Arithmetic { ops, x, y } = *opcode;
        let vx = self.registers[x];
        let vy = self.registers[y];

        // the flag is written after the result, so VF as the target
        // ends up holding the flag
        let (res, flag) = match ops {
            ArithmeticOp::Assign => (vy, None),
            ArithmeticOp::Or => (vx | vy, None),
            ArithmeticOp::And => (vx & vy, None),
            ArithmeticOp::Xor => (vx ^ vy, None),
            ArithmeticOp::Add => {
                let (res, carry) = vx.overflowing_add(vy);
                (res, Some(carry as u8))
            }
            ArithmeticOp::Sub => {
                let (res, borrow) = vx.overflowing_sub(vy);
                (res, Some(!borrow as u8))
            }
            ArithmeticOp::ShiftRight => (vy >> 1, Some(vy & 0x01)),
            ArithmeticOp::SubReverse => {
                let (res, borrow) = vy.overflowing_sub(vx);
                (res, Some(!borrow as u8))
            }
            ArithmeticOp::ShiftLeft => (vy << 1, Some(vy >> 7)),
        };

        self.registers[x] = res;
        if let Some(flag) = flag {
            self.registers[cpu::register::LAST] = flag;
        }
        Ok(ProgramCounterStep::Next)
    }

    fn skip_registers_not_equal(
        &self,
        opcode: &RegisterPair,
    ) -> Result<ProgramCounterStep, FaultKind> {
        Ok(ProgramCounterStep::cond(
            self.registers[opcode.x] != self.registers[opcode.y],
        ))
    }

    fn set_index(&mut self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind> {
        self.index_register = opcode.nnn;
        Ok(ProgramCounterStep::Next)
    }

    fn jump_offset(&self, opcode: &Address) -> Result<ProgramCounterStep, FaultKind> {
        let v0 = self.registers[0] as usize;
        Ok(ProgramCounterStep::Jump(opcode.nnn as usize + v0))
    }

    fn random(&mut self, opcode: &RegisterConst) -> Result<ProgramCounterStep, FaultKind> {
        // using a fill bytes call here, as the trait RngCore does not
        // support random u8.
        let mut rand: [u8; 1] = [0];
        self.rng.fill_bytes(&mut rand);
        self.registers[opcode.x] = opcode.nn & rand[0];
        Ok(ProgramCounterStep::Next)
    }

    fn draw(&mut self, opcode: &Sprite) -> Result<(ProgramCounterStep, Operation), FaultKind> {
        let range = self.memory_range(self.index_register as usize, opcode.n)?;

        let x = self.registers[opcode.x] as usize;
        let y = self.registers[opcode.y] as usize;

        let collision = self.display.draw(x, y, &self.memory[range]);
        self.registers[cpu::register::LAST] = collision as u8;

        Ok((ProgramCounterStep::Next, Operation::Draw))
    }

    fn key(&self, opcode: &Key) -> Result<ProgramCounterStep, FaultKind> {
        let held = self.keyboard.is_held(self.registers[opcode.x]);
        let step = match opcode.ops {
            KeyOp::Pressed => ProgramCounterStep::cond(held),
            KeyOp::NotPressed => ProgramCounterStep::cond(!held),
        };
        Ok(step)
    }

    fn misc(&mut self, opcode: &Misc) -> Result<(ProgramCounterStep, Operation), FaultKind> {
        let Misc { ops, x } = *opcode;
        let index = self.index_register as usize;
        let mut op = Operation::None;
        let mut pcs = ProgramCounterStep::Next;

        match ops {
            MiscOp::GetDelayTimer => {
                self.registers[x] = self.timers.delay();
            }
            MiscOp::AwaitKeyPress => {
                // the counter stays on this instruction until a key arrives
                self.await_key(x);
                op = Operation::Wait;
                pcs = ProgramCounterStep::None;
            }
            MiscOp::SetDelayTimer => {
                self.timers.set_delay(self.registers[x]);
            }
            MiscOp::SetSoundTimer => {
                self.timers.set_sound(self.registers[x]);
            }
            MiscOp::AddVxToI => {
                // VF is not affected and the result is not bounds checked
                self.index_register = self.index_register.wrapping_add(self.registers[x] as u16);
            }
            MiscOp::SetIToSprite => {
                let digit = (self.registers[x] & 0xF) as usize;
                self.index_register =
                    (display::fontset::LOCATION + display::fontset::GLYPH_SIZE * digit) as u16;
            }
            MiscOp::StoreBCD => {
                let range = self.memory_range(index, 3)?;
                let r = self.registers[x];
                // 246u8 => [2, 4, 6]
                self.memory[range].copy_from_slice(&[r / 100, r / 10 % 10, r % 10]);
            }
            MiscOp::StoreV0ToVx => {
                let range = self.memory_range(index, x + 1)?;
                self.memory[range].copy_from_slice(&self.registers[..=x]);
                self.index_register = self.index_register.wrapping_add(x as u16 + 1);
            }
            MiscOp::FillV0ToVx => {
                let range = self.memory_range(index, x + 1)?;
                self.registers[..=x].copy_from_slice(&self.memory[range]);
                self.index_register = self.index_register.wrapping_add(x as u16 + 1);
            }
        }
        Ok((pcs, op))
    }
}
