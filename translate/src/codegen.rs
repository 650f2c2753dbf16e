//! Map commands to fixed templates of target instructions.

use crate::asm::{at, c, label, num, sym, Instr, Operand, Register};
use crate::ast::{ArithmeticOp, Command, Segment};
use crate::error::{Error, Result};
use crate::labels::Labels;
use crate::span::Span;

use Register::{Arg, Lcl, Sp, That, This, R13, R14};

/// The first address of the stack.
pub const STACK_BASE: u16 = 256;

/// The first address of the `temp` segment.
const TEMP_BASE: u16 = 5;

/// The number of cells saved by a call: return address plus four bases.
const FRAME_SIZE: u16 = 5;

/// The largest value an address instruction can load.
const MAX_ADDRESS: u16 = 0x7fff;

/// `*SP = D; SP++`
const PUSH_D: &[Instr] = &[at(Sp), c("A=M"), c("M=D"), at(Sp), c("M=M+1")];

/// `SP--; D = *SP`, leaves `A` pointing at the popped cell.
const POP_D: &[Instr] = &[at(Sp), c("AM=M-1"), c("D=M")];

/// `SP--; **R13 = *SP`
const POP_TO_R13: &[Instr] = &[
    at(Sp),
    c("AM=M-1"),
    c("D=M"),
    at(R13),
    c("A=M"),
    c("M=D"),
];

/// `A = SP - 1`
const TOP: &[Instr] = &[at(Sp), c("A=M-1")];

/// Tear down the current frame and jump back to the caller.
///
/// `R13` holds the end of the frame and `R14` the return address, both are
/// read before `ARG` and `LCL` are overwritten.
const RETURN: &[Instr] = &[
    // frame = LCL
    at(Lcl),
    c("D=M"),
    at(R13),
    c("M=D"),
    // ret = *(frame - 5)
    num(FRAME_SIZE),
    c("A=D-A"),
    c("D=M"),
    at(R14),
    c("M=D"),
    // *ARG = pop()
    at(Sp),
    c("AM=M-1"),
    c("D=M"),
    at(Arg),
    c("A=M"),
    c("M=D"),
    // SP = ARG + 1
    at(Arg),
    c("D=M+1"),
    at(Sp),
    c("M=D"),
    // THAT = *(frame - 1)
    at(R13),
    c("D=M"),
    num(1),
    c("A=D-A"),
    c("D=M"),
    at(That),
    c("M=D"),
    // THIS = *(frame - 2)
    at(R13),
    c("D=M"),
    num(2),
    c("A=D-A"),
    c("D=M"),
    at(This),
    c("M=D"),
    // ARG = *(frame - 3)
    at(R13),
    c("D=M"),
    num(3),
    c("A=D-A"),
    c("D=M"),
    at(Arg),
    c("M=D"),
    // LCL = *(frame - 4)
    at(R13),
    c("D=M"),
    num(4),
    c("A=D-A"),
    c("D=M"),
    at(Lcl),
    c("M=D"),
    // goto ret
    at(R14),
    c("A=M"),
    c("0;JMP"),
];

/// Where the base address of an indexed segment comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Base {
    /// The base is stored in a register.
    Register(Register),
    /// The base is a fixed address.
    Fixed(u16),
}

/// How a segment cell is addressed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    /// A literal value, not backed by memory.
    Constant(u16),
    /// Base address plus index, computed at run time.
    Indexed(Base, u16),
    /// A single named cell.
    Direct(Operand),
}

impl Base {
    /// `D = base`
    fn load(self) -> [Instr; 2] {
        match self {
            Self::Register(register) => [at(register), c("D=M")],
            Self::Fixed(address) => [num(address), c("D=A")],
        }
    }
}

/// Generates instructions for the commands of a single translation unit.
#[derive(Debug)]
pub struct Generator<'a> {
    /// The name of the unit, used to namespace `static` cells.
    unit: &'a str,
    /// The label allocator shared by the whole output.
    labels: &'a mut Labels,
}

/// `D = value`, loading the complement when the value doesn't fit in `A`.
fn constant(value: u16) -> [Instr; 2] {
    if value <= MAX_ADDRESS {
        [num(value), c("D=A")]
    } else {
        [num(!value), c("D=!A")]
    }
}

/// Checks that an index or count can be loaded by an address instruction.
fn address(span: Span, value: u16) -> Result<u16> {
    if value > MAX_ADDRESS {
        return Err(Error::numeric("value out of range for a 15-bit address", span));
    }
    Ok(value)
}

impl<'a> Generator<'a> {
    pub fn new(unit: &'a str, labels: &'a mut Labels) -> Self {
        Self { unit, labels }
    }

    /// Resolves a segment and index to a location.
    fn locate(&self, span: Span, segment: Segment, index: u16) -> Result<Location> {
        let indexed = |base| address(span, index).map(|index| Location::Indexed(base, index));
        let location = match segment {
            Segment::Constant => Location::Constant(index),
            Segment::Local => indexed(Base::Register(Lcl))?,
            Segment::Argument => indexed(Base::Register(Arg))?,
            Segment::This => indexed(Base::Register(This))?,
            Segment::That => indexed(Base::Register(That))?,
            Segment::Temp => indexed(Base::Fixed(TEMP_BASE))?,
            Segment::Pointer => match index {
                0 => Location::Direct(Operand::Register(This)),
                1 => Location::Direct(Operand::Register(That)),
                _ => return Err(Error::unsupported("pointer index must be 0 or 1", span)),
            },
            Segment::Static => {
                Location::Direct(Operand::Symbol(format!("{}.{}", self.unit, index).into()))
            }
        };
        Ok(location)
    }

    fn arithmetic(&mut self, op: ArithmeticOp) -> Vec<Instr> {
        let binary = |comp| [POP_D, &[c("A=A-1"), c(comp)]].concat();
        let unary = |comp| [TOP, &[c(comp)]].concat();
        match op {
            ArithmeticOp::Add => binary("M=D+M"),
            ArithmeticOp::Sub => binary("M=M-D"),
            ArithmeticOp::And => binary("M=D&M"),
            ArithmeticOp::Or => binary("M=D|M"),
            ArithmeticOp::Neg => unary("M=-M"),
            ArithmeticOp::Not => unary("M=!M"),
            ArithmeticOp::Eq => self.compare("D;JEQ"),
            ArithmeticOp::Gt => self.compare("D;JGT"),
            ArithmeticOp::Lt => self.compare("D;JLT"),
        }
    }

    /// Replaces the top two cells with -1 if `x - y` satisfies the jump, else 0.
    ///
    /// The subtraction wraps, so operands more than 32767 apart compare as if
    /// their difference had the opposite sign.
    fn compare(&mut self, jump: &'static str) -> Vec<Instr> {
        let labels = self.labels.next_compare();
        let mut instrs = POP_D.to_vec();
        instrs.extend([c("A=A-1"), c("D=M-D"), sym(labels.taken.clone()), c(jump)]);
        instrs.extend_from_slice(TOP);
        instrs.extend([c("M=0"), sym(labels.done.clone()), c("0;JMP"), label(labels.taken)]);
        instrs.extend_from_slice(TOP);
        instrs.extend([c("M=-1"), label(labels.done)]);
        instrs
    }

    fn push(&self, span: Span, segment: Segment, index: u16) -> Result<Vec<Instr>> {
        let mut instrs = Vec::new();
        match self.locate(span, segment, index)? {
            Location::Constant(value) => instrs.extend(constant(value)),
            Location::Indexed(base, index) => {
                instrs.extend(base.load());
                instrs.extend([num(index), c("A=D+A"), c("D=M")]);
            }
            Location::Direct(operand) => instrs.extend([Instr::At(operand), c("D=M")]),
        }
        instrs.extend_from_slice(PUSH_D);
        Ok(instrs)
    }

    fn pop(&self, span: Span, segment: Segment, index: u16) -> Result<Vec<Instr>> {
        let mut instrs = Vec::new();
        match self.locate(span, segment, index)? {
            Location::Constant(_) => {
                return Err(Error::unsupported(
                    "cannot pop into the constant segment",
                    span,
                ))
            }
            Location::Indexed(base, index) => {
                // The address must be saved before SP moves.
                instrs.extend(base.load());
                instrs.extend([num(index), c("D=D+A"), at(R13), c("M=D")]);
                instrs.extend_from_slice(POP_TO_R13);
            }
            Location::Direct(operand) => {
                instrs.extend_from_slice(POP_D);
                instrs.extend([Instr::At(operand), c("M=D")]);
            }
        }
        Ok(instrs)
    }

    fn function(&self, name: &str, locals: u16) -> Vec<Instr> {
        let mut instrs = vec![label(name.to_owned())];
        if locals > 0 {
            instrs.extend([at(Sp), c("A=M")]);
            for _ in 0..locals {
                instrs.extend([c("M=0"), c("A=A+1")]);
            }
            instrs.extend([c("D=A"), at(Sp), c("M=D")]);
        }
        instrs
    }

    fn call(&mut self, function: &str, nargs: u16) -> Vec<Instr> {
        call(self.labels, function, nargs)
    }

    /// Generate the instructions for a single command.
    ///
    /// The span is only used to point errors at the offending command.
    pub fn command(&mut self, span: Span, command: &Command<'_>) -> Result<Vec<Instr>> {
        let instrs = match *command {
            Command::Arithmetic(op) => self.arithmetic(op),
            Command::Push(segment, index) => self.push(span, segment, index)?,
            Command::Pop(segment, index) => self.pop(span, segment, index)?,
            Command::Label(name) => vec![label(name.to_owned())],
            Command::Goto(name) => vec![sym(name.to_owned()), c("0;JMP")],
            Command::IfGoto(name) => {
                let mut instrs = POP_D.to_vec();
                instrs.extend([sym(name.to_owned()), c("D;JNE")]);
                instrs
            }
            Command::Function(name, locals) => self.function(name, locals),
            Command::Call(function, nargs) => self.call(function, address(span, nargs)?),
            Command::Return => RETURN.to_vec(),
        };
        Ok(instrs)
    }
}

/// Save the caller's frame and jump to `function`.
fn call(labels: &mut Labels, function: &str, nargs: u16) -> Vec<Instr> {
    let ret = labels.next_call_return(function);
    let mut instrs = vec![sym(ret.clone()), c("D=A")];
    instrs.extend_from_slice(PUSH_D);
    for register in [Lcl, Arg, This, That] {
        instrs.extend([at(register), c("D=M")]);
        instrs.extend_from_slice(PUSH_D);
    }
    instrs.extend([
        // ARG = SP - 5 - nargs
        at(Sp),
        c("D=M"),
        num(FRAME_SIZE),
        c("D=D-A"),
        num(nargs),
        c("D=D-A"),
        at(Arg),
        c("M=D"),
        // LCL = SP
        at(Sp),
        c("D=M"),
        at(Lcl),
        c("M=D"),
        sym(function.to_owned()),
        c("0;JMP"),
        label(ret),
    ]);
    instrs
}

/// Initialize the stack pointer and call the entry function.
pub fn bootstrap(labels: &mut Labels, entry: &str) -> Vec<Instr> {
    let mut instrs = vec![num(STACK_BASE), c("D=A"), at(Sp), c("M=D")];
    instrs.extend(call(labels, entry, 0));
    instrs
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::error::Kind;

    #[track_caller]
    fn generate(unit: &str, labels: &mut Labels, command: Command<'_>) -> Vec<String> {
        Generator::new(unit, labels)
            .command(Span::new(0, 0), &command)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn push_constant() {
        let asm = generate("Main", &mut Labels::new(), Command::Push(Segment::Constant, 7));
        assert_eq!(asm, ["@7", "D=A", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
    }

    #[test]
    fn push_large_constant_loads_complement() {
        let asm = generate("Main", &mut Labels::new(), Command::Push(Segment::Constant, 40000));
        assert_eq!(asm[..2], ["@25535", "D=!A"]);
        let asm = generate("Main", &mut Labels::new(), Command::Push(Segment::Constant, 32767));
        assert_eq!(asm[..2], ["@32767", "D=A"]);
    }

    #[test]
    fn push_temp_uses_fixed_base() {
        let asm = generate("Main", &mut Labels::new(), Command::Push(Segment::Temp, 3));
        assert_eq!(
            asm,
            ["@5", "D=A", "@3", "A=D+A", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1"]
        );
    }

    #[test]
    fn pop_local_saves_address_before_decrement() {
        let asm = generate("Main", &mut Labels::new(), Command::Pop(Segment::Local, 2));
        assert_eq!(
            asm,
            [
                "@LCL", "D=M", "@2", "D=D+A", "@R13", "M=D", "@SP", "AM=M-1", "D=M", "@R13",
                "A=M", "M=D"
            ]
        );
    }

    #[test]
    fn static_is_namespaced_by_unit() {
        let mut labels = Labels::new();
        let a = generate("Foo", &mut labels, Command::Pop(Segment::Static, 0));
        let b = generate("Bar", &mut labels, Command::Push(Segment::Static, 0));
        assert!(a.contains(&"@Foo.0".to_owned()));
        assert!(b.contains(&"@Bar.0".to_owned()));
    }

    #[test]
    fn pointer_selects_this_or_that() {
        let mut labels = Labels::new();
        let this = generate("Main", &mut labels, Command::Pop(Segment::Pointer, 0));
        let that = generate("Main", &mut labels, Command::Push(Segment::Pointer, 1));
        assert_eq!(this, ["@SP", "AM=M-1", "D=M", "@THIS", "M=D"]);
        assert_eq!(that, ["@THAT", "D=M", "@SP", "A=M", "M=D", "@SP", "M=M+1"]);
    }

    #[test]
    fn arithmetic_touches_only_the_stack() {
        let ops = [
            ArithmeticOp::Add,
            ArithmeticOp::Sub,
            ArithmeticOp::Neg,
            ArithmeticOp::Eq,
            ArithmeticOp::Gt,
            ArithmeticOp::Lt,
            ArithmeticOp::And,
            ArithmeticOp::Or,
            ArithmeticOp::Not,
        ];
        let mut labels = Labels::new();
        for op in ops {
            for line in generate("Main", &mut labels, Command::Arithmetic(op)) {
                if let Some(symbol) = line.strip_prefix('@') {
                    assert!(symbol == "SP" || symbol.starts_with("$compare."), "{}", line);
                }
            }
        }
    }

    #[test]
    fn compare_labels_differ_between_commands() {
        let mut labels = Labels::new();
        let first = generate("Main", &mut labels, Command::Arithmetic(ArithmeticOp::Eq));
        let second = generate("Main", &mut labels, Command::Arithmetic(ArithmeticOp::Eq));
        let decls = |asm: &[String]| -> Vec<String> {
            asm.iter().filter(|l| l.starts_with('(')).cloned().collect()
        };
        assert_eq!(decls(&first), ["($compare.true.0)", "($compare.end.0)"]);
        assert_eq!(decls(&second), ["($compare.true.1)", "($compare.end.1)"]);
    }

    #[test]
    fn function_initializes_locals() {
        let asm = generate("Main", &mut Labels::new(), Command::Function("Main.f", 2));
        assert_eq!(
            asm,
            ["(Main.f)", "@SP", "A=M", "M=0", "A=A+1", "M=0", "A=A+1", "D=A", "@SP", "M=D"]
        );
        let asm = generate("Main", &mut Labels::new(), Command::Function("Main.g", 0));
        assert_eq!(asm, ["(Main.g)"]);
    }

    #[test]
    fn call_ends_with_return_label() {
        let mut labels = Labels::new();
        let first = generate("Main", &mut labels, Command::Call("Main.f", 2));
        let second = generate("Main", &mut labels, Command::Call("Main.f", 2));
        assert_eq!(first.first().unwrap(), "@Main.f$ret.0");
        assert_eq!(first.last().unwrap(), "(Main.f$ret.0)");
        assert_eq!(second.last().unwrap(), "(Main.f$ret.1)");
        let jump = first.iter().position(|l| l == "@Main.f").unwrap();
        assert_eq!(first[jump + 1], "0;JMP");
    }

    #[test]
    fn bootstrap_sets_stack_and_calls_entry() {
        let asm: Vec<_> = bootstrap(&mut Labels::new(), "Sys.init")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(asm[..4], ["@256", "D=A", "@SP", "M=D"]);
        assert_eq!(asm[4], "@Sys.init$ret.0");
        assert_eq!(asm.last().unwrap(), "(Sys.init$ret.0)");
    }

    #[test]
    fn unsupported_segments() {
        let mut labels = Labels::new();
        let mut generator = Generator::new("Main", &mut labels);
        let span = Span::new(0, 14);
        let tests = [
            (Command::Pop(Segment::Constant, 1), "cannot pop into the constant segment"),
            (Command::Push(Segment::Pointer, 2), "pointer index must be 0 or 1"),
            (Command::Pop(Segment::Pointer, 7), "pointer index must be 0 or 1"),
        ];
        for (command, msg) in tests {
            assert_eq!(
                generator.command(span, &command).unwrap_err(),
                Error::new(Kind::UnsupportedSegment, msg, span)
            );
        }
    }

    #[test]
    fn indexes_must_fit_in_an_address() {
        let mut labels = Labels::new();
        let mut generator = Generator::new("Main", &mut labels);
        let span = Span::new(0, 16);
        let tests = [
            Command::Push(Segment::Local, 32768),
            Command::Pop(Segment::That, 40000),
            Command::Push(Segment::Temp, 65535),
            Command::Call("Main.f", 32768),
        ];
        for command in tests {
            assert_eq!(
                generator.command(span, &command).unwrap_err(),
                Error::new(
                    Kind::InvalidNumericArgument,
                    "value out of range for a 15-bit address",
                    span
                )
            );
        }
        assert!(generator.command(span, &Command::Push(Segment::Static, 40000)).is_ok());
        assert!(generator.command(span, &Command::Push(Segment::Local, 32767)).is_ok());
    }
}
