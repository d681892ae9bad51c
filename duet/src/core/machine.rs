//! Single-instruction execution core shared by every runner.
//!
//! A [`Machine`] executes exactly one instruction per [`Machine::step`] call
//! and reports its [`Status`]. Arithmetic and jumps are fixed here; `snd` and
//! `rcv` are delegated to a [`Channel`] strategy so the paired and sound
//! variants differ only in how they talk to the outside world.

use serde::Serialize;
use thiserror::Error;

use crate::core::instruction::{Instruction, Register};
use crate::core::program::Program;
use crate::core::registers::RegisterBank;

/// Scheduling status of a machine after its latest step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Running,
    /// Blocked on `rcv`; the same instruction is retried on the next step.
    Waiting,
    /// Program counter left the program. Terminal.
    Halted,
}

/// Result of one `step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub status: Status,
    /// Value emitted by `snd`, if the executed instruction was one.
    pub sent: Option<i64>,
}

/// What a channel decided for an `rcv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Receive {
    /// Store the value in the destination register and advance.
    Store(i64),
    /// Leave the register alone and advance.
    Skip,
    /// Stay on this instruction and report `Waiting`.
    Block,
}

/// Strategy for `snd` and `rcv`.
pub trait Channel {
    fn send(&mut self, value: i64);

    /// `current` is the destination register's value before the receive.
    fn receive(&mut self, current: i64) -> Receive;
}

/// Fatal arithmetic fault. The faulting instruction has no effect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArithmeticError {
    #[error("modulo by zero in `{instruction}` at pc {pc}")]
    ModuloByZero { pc: i64, instruction: Instruction },
    #[error("integer overflow in `{instruction}` at pc {pc}")]
    Overflow { pc: i64, instruction: Instruction },
}

enum Flow {
    Advance,
    Jump(i64),
    Block,
}

/// One virtual machine: program counter, registers, and a channel.
#[derive(Debug, Clone)]
pub struct Machine<C> {
    program: Program,
    pc: i64,
    registers: RegisterBank,
    channel: C,
    status: Status,
    sent: u64,
    executed: u64,
}

impl<C: Channel> Machine<C> {
    /// A machine with zeroed registers at pc 0. An empty program starts halted.
    pub fn new(program: Program, channel: C) -> Self {
        let status = if program.is_empty() {
            Status::Halted
        } else {
            Status::Running
        };
        Self {
            program,
            pc: 0,
            registers: RegisterBank::new(),
            channel,
            status,
            sent: 0,
            executed: 0,
        }
    }

    /// A machine with its program id preloaded into register `p`.
    pub fn with_program_id(program: Program, channel: C, id: i64) -> Self {
        let mut machine = Self::new(program, channel);
        machine.registers.set(Register::PROGRAM_ID, id);
        machine
    }

    /// Execute the instruction at the program counter.
    ///
    /// A halted machine is left untouched. A blocked `rcv` keeps the program
    /// counter where it is, so the next call retries the same instruction.
    pub fn step(&mut self) -> Result<Step, ArithmeticError> {
        let Some(&instruction) = self.program.get(self.pc) else {
            self.status = Status::Halted;
            return Ok(Step {
                status: Status::Halted,
                sent: None,
            });
        };

        let mut sent = None;
        let flow = match instruction {
            Instruction::Snd(x) => {
                let value = self.registers.resolve(x);
                self.channel.send(value);
                self.sent += 1;
                sent = Some(value);
                Flow::Advance
            }
            Instruction::Set(r, y) => {
                self.registers.set(r, self.registers.resolve(y));
                Flow::Advance
            }
            Instruction::Add(r, y) => {
                let value = self
                    .registers
                    .get(r)
                    .checked_add(self.registers.resolve(y))
                    .ok_or_else(|| self.overflow(instruction))?;
                self.registers.set(r, value);
                Flow::Advance
            }
            Instruction::Mul(r, y) => {
                let value = self
                    .registers
                    .get(r)
                    .checked_mul(self.registers.resolve(y))
                    .ok_or_else(|| self.overflow(instruction))?;
                self.registers.set(r, value);
                Flow::Advance
            }
            Instruction::Mod(r, y) => {
                let divisor = self.registers.resolve(y);
                if divisor == 0 {
                    return Err(ArithmeticError::ModuloByZero {
                        pc: self.pc,
                        instruction,
                    });
                }
                let value = floor_mod(self.registers.get(r), divisor)
                    .ok_or_else(|| self.overflow(instruction))?;
                self.registers.set(r, value);
                Flow::Advance
            }
            Instruction::Rcv(r) => match self.channel.receive(self.registers.get(r)) {
                Receive::Store(value) => {
                    self.registers.set(r, value);
                    Flow::Advance
                }
                Receive::Skip => Flow::Advance,
                Receive::Block => Flow::Block,
            },
            Instruction::Jgz(x, y) => {
                if self.registers.resolve(x) > 0 {
                    Flow::Jump(self.registers.resolve(y))
                } else {
                    Flow::Advance
                }
            }
        };

        match flow {
            Flow::Advance => self.pc += 1,
            // Saturating: an overflowing jump lands outside the program either way.
            Flow::Jump(offset) => self.pc = self.pc.saturating_add(offset),
            Flow::Block => {
                self.status = Status::Waiting;
                return Ok(Step {
                    status: Status::Waiting,
                    sent: None,
                });
            }
        }
        self.executed += 1;
        self.status = if self.program.contains(self.pc) {
            Status::Running
        } else {
            Status::Halted
        };
        Ok(Step {
            status: self.status,
            sent,
        })
    }

    fn overflow(&self, instruction: Instruction) -> ArithmeticError {
        ArithmeticError::Overflow {
            pc: self.pc,
            instruction,
        }
    }
}

impl<C> Machine<C> {
    pub fn pc(&self) -> i64 {
        self.pc
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn registers(&self) -> &RegisterBank {
        &self.registers
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn channel_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    /// Number of `snd` instructions executed.
    pub fn sent_count(&self) -> u64 {
        self.sent
    }

    /// Instructions executed, excluding blocked `rcv` attempts.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Instruction the next `step` would execute.
    pub fn current_instruction(&self) -> Option<&Instruction> {
        self.program.get(self.pc)
    }
}

/// Remainder with the sign of the divisor (floored division).
///
/// Returns `None` for a zero divisor or `i64::MIN % -1`.
pub fn floor_mod(dividend: i64, divisor: i64) -> Option<i64> {
    let rem = dividend.checked_rem(divisor)?;
    if rem != 0 && (rem < 0) != (divisor < 0) {
        Some(rem + divisor)
    } else {
        Some(rem)
    }
}
