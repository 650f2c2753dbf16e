//! Typed representation of the target assembly.

use std::fmt;

use dairy::Cow;

/// A predefined register symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    /// The stack pointer.
    Sp,
    /// Base of the `local` segment.
    Lcl,
    /// Base of the `argument` segment.
    Arg,
    /// Base of the `this` segment, also `pointer 0`.
    This,
    /// Base of the `that` segment, also `pointer 1`.
    That,
    /// Scratch register.
    R13,
    /// Scratch register.
    R14,
}

/// The value loaded by an address instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    Number(u16),
    Register(Register),
    Symbol(Cow<'static, str>),
}

/// A single line of assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instr {
    /// `@value`
    At(Operand),
    /// `dest=comp;jump`
    Compute(&'static str),
    /// `(symbol)`
    Label(Cow<'static, str>),
    /// `// text`
    Comment(Cow<'static, str>),
}

/// Shorthand for loading a register address.
pub const fn at(register: Register) -> Instr {
    Instr::At(Operand::Register(register))
}

/// Shorthand for a computation.
pub const fn c(comp: &'static str) -> Instr {
    Instr::Compute(comp)
}

/// Shorthand for loading a number.
pub const fn num(value: u16) -> Instr {
    Instr::At(Operand::Number(value))
}

/// Shorthand for loading a label or variable address.
pub fn sym(symbol: impl Into<Cow<'static, str>>) -> Instr {
    Instr::At(Operand::Symbol(symbol.into()))
}

/// Shorthand for a label declaration.
pub fn label(symbol: impl Into<Cow<'static, str>>) -> Instr {
    Instr::Label(symbol.into())
}

impl Register {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sp => "SP",
            Self::Lcl => "LCL",
            Self::Arg => "ARG",
            Self::This => "THIS",
            Self::That => "THAT",
            Self::R13 => "R13",
            Self::R14 => "R14",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{}", value),
            Self::Register(register) => f.write_str(register.name()),
            Self::Symbol(symbol) => f.write_str(symbol),
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::At(operand) => write!(f, "@{}", operand),
            Self::Compute(comp) => f.write_str(comp),
            Self::Label(symbol) => write!(f, "({})", symbol),
            Self::Comment(text) => write!(f, "// {}", text),
        }
    }
}
