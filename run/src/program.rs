//! Assemble symbolic Hack assembly into executable instructions.

use std::collections::HashMap;

use crate::{Error, Result};

/// The first RAM address handed out to variables.
const VARIABLE_BASE: u16 = 16;

/// The register that `comp` reads besides `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    A,
    M,
}

/// A computation, with `A`/`M` written as `Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comp {
    Zero,
    One,
    MinusOne,
    D,
    Y,
    NotD,
    NotY,
    NegD,
    NegY,
    DPlusOne,
    YPlusOne,
    DMinusOne,
    YMinusOne,
    DPlusY,
    DMinusY,
    YMinusD,
    DAndY,
    DOrY,
}

/// Where the result of a computation is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Dest {
    pub a: bool,
    pub d: bool,
    pub m: bool,
}

/// When a computation jumps to the address in `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Jump {
    Never,
    Gt,
    Eq,
    Ge,
    Lt,
    Ne,
    Le,
    Always,
}

/// A single executable instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
    /// Load a value into `A`.
    Load(u16),
    /// Compute a value, store it, and maybe jump.
    Compute {
        dest: Dest,
        input: Input,
        comp: Comp,
        jump: Jump,
    },
}

/// An assembled program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub instrs: Vec<Instr>,
    /// Every label and variable with its address.
    pub symbols: HashMap<String, u16>,
}

fn predefined() -> HashMap<String, u16> {
    let mut symbols: HashMap<String, u16> = [
        ("SP", 0),
        ("LCL", 1),
        ("ARG", 2),
        ("THIS", 3),
        ("THAT", 4),
        ("SCREEN", 16384),
        ("KBD", 24576),
    ]
    .iter()
    .map(|&(name, addr)| (name.to_owned(), addr))
    .collect();
    for i in 0..16 {
        symbols.insert(format!("R{}", i), i);
    }
    symbols
}

fn is_symbol(s: &str) -> bool {
    let valid = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':');
    !s.is_empty() && !s.starts_with(|c: char| c.is_ascii_digit()) && s.chars().all(valid)
}

fn parse_comp(line: usize, text: &str) -> Result<(Input, Comp)> {
    let input = if text.contains('M') { Input::M } else { Input::A };
    let comp = match text.replace('M', "A").as_str() {
        "0" => Comp::Zero,
        "1" => Comp::One,
        "-1" => Comp::MinusOne,
        "D" => Comp::D,
        "A" => Comp::Y,
        "!D" => Comp::NotD,
        "!A" => Comp::NotY,
        "-D" => Comp::NegD,
        "-A" => Comp::NegY,
        "D+1" | "1+D" => Comp::DPlusOne,
        "A+1" | "1+A" => Comp::YPlusOne,
        "D-1" => Comp::DMinusOne,
        "A-1" => Comp::YMinusOne,
        "D+A" | "A+D" => Comp::DPlusY,
        "D-A" => Comp::DMinusY,
        "A-D" => Comp::YMinusD,
        "D&A" | "A&D" => Comp::DAndY,
        "D|A" | "A|D" => Comp::DOrY,
        _ => return Err(Error::assemble(line, format!("unknown computation `{}`", text))),
    };
    Ok((input, comp))
}

fn parse_dest(line: usize, text: &str) -> Result<Dest> {
    let mut dest = Dest::default();
    for c in text.chars() {
        let flag = match c {
            'A' => &mut dest.a,
            'D' => &mut dest.d,
            'M' => &mut dest.m,
            _ => return Err(Error::assemble(line, format!("unknown destination `{}`", text))),
        };
        *flag = true;
    }
    Ok(dest)
}

fn parse_jump(line: usize, text: &str) -> Result<Jump> {
    let jump = match text {
        "JGT" => Jump::Gt,
        "JEQ" => Jump::Eq,
        "JGE" => Jump::Ge,
        "JLT" => Jump::Lt,
        "JNE" => Jump::Ne,
        "JLE" => Jump::Le,
        "JMP" => Jump::Always,
        _ => return Err(Error::assemble(line, format!("unknown jump `{}`", text))),
    };
    Ok(jump)
}

fn parse_compute(line: usize, text: &str) -> Result<Instr> {
    let (dest, rest) = match text.split_once('=') {
        Some((dest, rest)) => (parse_dest(line, dest)?, rest),
        None => (Dest::default(), text),
    };
    let (comp, jump) = match rest.split_once(';') {
        Some((comp, jump)) => (comp, parse_jump(line, jump)?),
        None => (rest, Jump::Never),
    };
    let (input, comp) = parse_comp(line, comp)?;
    Ok(Instr::Compute {
        dest,
        input,
        comp,
        jump,
    })
}

impl Program {
    /// Assemble the given Hack assembly.
    ///
    /// Labels are resolved in a first pass, any other symbol is a variable
    /// allocated from address 16 in the order it is first used.
    pub fn assemble(asm: &str) -> Result<Self> {
        let lines: Vec<(usize, &str)> = asm
            .lines()
            .enumerate()
            .map(|(i, line)| {
                let code = line.split_once("//").map(|(code, _)| code).unwrap_or(line);
                (i + 1, code.trim())
            })
            .filter(|(_, code)| !code.is_empty())
            .collect();

        let mut symbols = predefined();
        let mut addr = 0u16;
        for &(line, code) in &lines {
            match code.strip_prefix('(').and_then(|s| s.strip_suffix(')')) {
                Some(label) if is_symbol(label) => {
                    if symbols.insert(label.to_owned(), addr).is_some() {
                        return Err(Error::assemble(line, format!("label `{}` already used", label)));
                    }
                }
                Some(_) => return Err(Error::assemble(line, "invalid label")),
                None => addr += 1,
            }
        }

        let mut instrs = Vec::new();
        let mut next_variable = VARIABLE_BASE;
        for (line, code) in lines {
            if code.starts_with('(') {
                continue;
            }
            let instr = match code.strip_prefix('@') {
                Some(value) if value.starts_with(|c: char| c.is_ascii_digit()) => {
                    let value: u16 = value
                        .parse()
                        .ok()
                        .filter(|&v| v <= i16::MAX as u16)
                        .ok_or_else(|| Error::assemble(line, "invalid address value"))?;
                    Instr::Load(value)
                }
                Some(symbol) if is_symbol(symbol) => {
                    let value = *symbols.entry(symbol.to_owned()).or_insert_with(|| {
                        next_variable += 1;
                        next_variable - 1
                    });
                    Instr::Load(value)
                }
                Some(_) => return Err(Error::assemble(line, "invalid symbol")),
                None => parse_compute(line, code)?,
            };
            instrs.push(instr);
        }

        Ok(Self { instrs, symbols })
    }
}
