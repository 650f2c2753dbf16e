//! Abstract representation of VM code.

use std::fmt;

/// An arithmetic or logical operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

/// A named region of virtual memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
}

/// A single VM command.
///
/// Names borrow from the input, commands are consumed by the code generator as
/// soon as they are classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'i> {
    /// An operator on the top of the stack.
    Arithmetic(ArithmeticOp),
    /// Push the value of a segment cell onto the stack.
    Push(Segment, u16),
    /// Pop the top of the stack into a segment cell.
    Pop(Segment, u16),
    /// A jump target.
    Label(&'i str),
    /// An unconditional jump.
    Goto(&'i str),
    /// Pop the top of the stack and jump if it is non-zero.
    IfGoto(&'i str),
    /// A function entry point together with its number of locals.
    Function(&'i str, u16),
    /// A call to a function together with its number of arguments.
    Call(&'i str, u16),
    /// Return to the caller.
    Return,
}

impl ArithmeticOp {
    pub fn from_name(name: &str) -> Option<Self> {
        let op = match name {
            "add" => Self::Add,
            "sub" => Self::Sub,
            "neg" => Self::Neg,
            "eq" => Self::Eq,
            "gt" => Self::Gt,
            "lt" => Self::Lt,
            "and" => Self::And,
            "or" => Self::Or,
            "not" => Self::Not,
            _ => return None,
        };
        Some(op)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Neg => "neg",
            Self::Eq => "eq",
            Self::Gt => "gt",
            Self::Lt => "lt",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
        }
    }
}

impl Segment {
    pub fn from_name(name: &str) -> Option<Self> {
        let segment = match name {
            "constant" => Self::Constant,
            "local" => Self::Local,
            "argument" => Self::Argument,
            "this" => Self::This,
            "that" => Self::That,
            "temp" => Self::Temp,
            "pointer" => Self::Pointer,
            "static" => Self::Static,
            _ => return None,
        };
        Some(segment)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Constant => "constant",
            Self::Local => "local",
            Self::Argument => "argument",
            Self::This => "this",
            Self::That => "that",
            Self::Temp => "temp",
            Self::Pointer => "pointer",
            Self::Static => "static",
        }
    }
}

impl fmt::Display for Command<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arithmetic(op) => write!(f, "{}", op.name()),
            Self::Push(segment, index) => write!(f, "push {} {}", segment.name(), index),
            Self::Pop(segment, index) => write!(f, "pop {} {}", segment.name(), index),
            Self::Label(label) => write!(f, "label {}", label),
            Self::Goto(label) => write!(f, "goto {}", label),
            Self::IfGoto(label) => write!(f, "if-goto {}", label),
            Self::Function(name, locals) => write!(f, "function {} {}", name, locals),
            Self::Call(name, args) => write!(f, "call {} {}", name, args),
            Self::Return => write!(f, "return"),
        }
    }
}
