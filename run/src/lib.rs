//! Execute Hack assembly.

mod program;

use thiserror::Error;

pub use crate::program::{Comp, Dest, Input, Instr, Jump, Program};

/// The number of addressable RAM cells.
pub const RAM_SIZE: usize = 32 * 1024;

pub type Result<T> = std::result::Result<T, Error>;

/// An error assembling or executing a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("line {line}: {msg}")]
    Assemble { line: usize, msg: String },

    #[error("address {addr} out of range at pc {pc}")]
    Address { addr: u16, pc: usize },
}

/// The state of the computer after running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// The program counter ran past the last instruction.
    Halted,
    /// The step budget ran out first.
    Exhausted,
}

/// A Hack computer.
#[derive(Debug)]
pub struct Computer {
    rom: Vec<Instr>,
    ram: Vec<i16>,
    a: i16,
    d: i16,
    pc: usize,
    steps: usize,
}

impl Error {
    pub(crate) fn assemble(line: usize, msg: impl Into<String>) -> Self {
        Self::Assemble {
            line,
            msg: msg.into(),
        }
    }
}

impl Comp {
    fn eval(self, d: i16, y: i16) -> i16 {
        match self {
            Self::Zero => 0,
            Self::One => 1,
            Self::MinusOne => -1,
            Self::D => d,
            Self::Y => y,
            Self::NotD => !d,
            Self::NotY => !y,
            Self::NegD => d.wrapping_neg(),
            Self::NegY => y.wrapping_neg(),
            Self::DPlusOne => d.wrapping_add(1),
            Self::YPlusOne => y.wrapping_add(1),
            Self::DMinusOne => d.wrapping_sub(1),
            Self::YMinusOne => y.wrapping_sub(1),
            Self::DPlusY => d.wrapping_add(y),
            Self::DMinusY => d.wrapping_sub(y),
            Self::YMinusD => y.wrapping_sub(d),
            Self::DAndY => d & y,
            Self::DOrY => d | y,
        }
    }
}

impl Jump {
    fn taken(self, value: i16) -> bool {
        match self {
            Self::Never => false,
            Self::Gt => value > 0,
            Self::Eq => value == 0,
            Self::Ge => value >= 0,
            Self::Lt => value < 0,
            Self::Ne => value != 0,
            Self::Le => value <= 0,
            Self::Always => true,
        }
    }
}

impl Computer {
    pub fn new(program: Program) -> Self {
        Self {
            rom: program.instrs,
            ram: vec![0; RAM_SIZE],
            a: 0,
            d: 0,
            pc: 0,
            steps: 0,
        }
    }

    /// Returns the value stored at the given address.
    pub fn ram(&self, addr: u16) -> i16 {
        self.ram.get(usize::from(addr)).copied().unwrap_or(0)
    }

    /// Stores a value at the given address.
    pub fn set_ram(&mut self, addr: u16, value: i16) {
        if let Some(cell) = self.ram.get_mut(usize::from(addr)) {
            *cell = value;
        }
    }

    /// Returns the number of instructions executed so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    fn cell_mut(&mut self) -> Result<&mut i16> {
        let addr = self.a as u16;
        let pc = self.pc;
        self.ram
            .get_mut(usize::from(addr))
            .ok_or(Error::Address { addr, pc })
    }

    fn cell(&self) -> Result<i16> {
        let addr = self.a as u16;
        self.ram
            .get(usize::from(addr))
            .copied()
            .ok_or(Error::Address { addr, pc: self.pc })
    }

    /// Execute a single instruction.
    ///
    /// Returns `false` if the program counter is past the end of the program.
    pub fn step(&mut self) -> Result<bool> {
        let instr = match self.rom.get(self.pc) {
            Some(&instr) => instr,
            None => return Ok(false),
        };
        match instr {
            Instr::Load(value) => {
                self.a = value as i16;
                self.pc += 1;
            }
            Instr::Compute {
                dest,
                input,
                comp,
                jump,
            } => {
                let y = match input {
                    Input::A => self.a,
                    Input::M => self.cell()?,
                };
                let value = comp.eval(self.d, y);
                let target = self.a as u16;
                if dest.m {
                    *self.cell_mut()? = value;
                }
                if dest.a {
                    self.a = value;
                }
                if dest.d {
                    self.d = value;
                }
                if jump.taken(value) {
                    self.pc = usize::from(target);
                } else {
                    self.pc += 1;
                }
            }
        }
        self.steps += 1;
        Ok(true)
    }

    /// Run until the program halts or `max_steps` instructions have executed.
    pub fn run(&mut self, max_steps: usize) -> Result<State> {
        for _ in 0..max_steps {
            if !self.step()? {
                return Ok(State::Halted);
            }
        }
        if self.pc >= self.rom.len() {
            return Ok(State::Halted);
        }
        Ok(State::Exhausted)
    }
}

/// Assemble and run the program, returning the computer in its final state.
pub fn program(asm: &str, max_steps: usize) -> Result<(Computer, State)> {
    let mut computer = Computer::new(Program::assemble(asm)?);
    let state = computer.run(max_steps)?;
    Ok((computer, state))
}
