//! Translate stack-machine VM code into Hack assembly.
//!
//! Each source is classified one line at a time and every command is mapped
//! straight to a fixed sequence of instructions, nothing is buffered or
//! revisited.

pub mod asm;
pub mod ast;
mod codegen;
mod error;
mod labels;
mod lex;
mod parse;
mod span;

use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::asm::Instr;
use crate::codegen::Generator;
use crate::labels::Labels;

pub use crate::codegen::STACK_BASE;
pub use crate::error::{Error, Kind};
pub use crate::parse::{program, Parser};
pub use crate::span::Span;

/// A failure to translate a program.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The source does not exist.
    #[error("source `{}` not found", .0.display())]
    SourceNotFound(PathBuf),

    /// The file stem can't be used to name `static` cells.
    #[error("`{}` can't be used as a unit name, from `{}`", .name, .path.display())]
    UnitName { path: PathBuf, name: String },

    /// The source exists but could not be read.
    #[error("failed to read `{}`", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A command could not be classified or translated.
    #[error("{unit}:{line}:{col}: {error}")]
    Command {
        /// The translation unit the command is in.
        unit: String,
        /// The 1-based line number.
        line: usize,
        /// The 1-based column number.
        col: usize,
        #[source]
        error: Error,
    },

    /// The output could not be written, some of it may have been.
    #[error("failed to write output")]
    Io(#[from] io::Error),
}

/// A single translation unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// The unit name, used to namespace `static` cells.
    pub name: String,
    /// The VM code.
    pub text: String,
}

/// Controls what the translator writes besides the commands themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Write the bootstrap prologue before the first unit.
    pub bootstrap: bool,
    /// The function called by the bootstrap prologue.
    pub entry: String,
    /// Write each command as a comment before its instructions.
    pub annotate: bool,
}

/// Translates one or more units into a single output stream.
#[derive(Debug)]
pub struct Translator<W> {
    out: W,
    options: Options,
    labels: Labels,
    started: bool,
}

////////////////////////////////////////////////////////////////////////////////
// Implementations
////////////////////////////////////////////////////////////////////////////////

/// Whether `name` can prefix a symbol in the target assembly.
fn is_unit_name(name: &str) -> bool {
    let valid = |c: char| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$' | ':');
    !name.is_empty() && !name.starts_with(|c: char| c.is_ascii_digit()) && name.chars().all(valid)
}

impl Source {
    /// Construct a source from a unit name and VM code.
    ///
    /// The name is used as is, it should be a valid assembly symbol.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Read a source from a file, the unit name is the file stem.
    pub fn from_path(path: &Path) -> Result<Self, TranslateError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if !is_unit_name(&name) {
            return Err(TranslateError::UnitName {
                path: path.to_owned(),
                name,
            });
        }
        let text = fs::read_to_string(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => TranslateError::SourceNotFound(path.to_owned()),
            _ => TranslateError::Read {
                path: path.to_owned(),
                source,
            },
        })?;
        Ok(Self { name, text })
    }
}

impl Default for Options {
    fn default() -> Self {
        Self {
            bootstrap: true,
            entry: String::from("Sys.init"),
            annotate: true,
        }
    }
}

impl<W: Write> Translator<W> {
    pub fn new(out: W, options: Options) -> Self {
        Self {
            out,
            options,
            labels: Labels::new(),
            started: false,
        }
    }

    fn write(&mut self, instrs: &[Instr]) -> io::Result<()> {
        for instr in instrs {
            writeln!(self.out, "{}", instr)?;
        }
        Ok(())
    }

    /// Writes the bootstrap prologue if this is the start of the output.
    fn start(&mut self) -> io::Result<()> {
        if self.started {
            return Ok(());
        }
        self.started = true;
        if self.options.bootstrap {
            log::debug!("writing bootstrap calling `{}`", self.options.entry);
            let instrs = codegen::bootstrap(&mut self.labels, &self.options.entry);
            if self.options.annotate {
                self.write(&[Instr::Comment("bootstrap".into())])?;
            }
            self.write(&instrs)?;
        }
        Ok(())
    }

    /// Translate a single unit, appending it to the output.
    pub fn unit(&mut self, source: &Source) -> Result<(), TranslateError> {
        self.start()?;
        log::debug!("translating `{}`", source.name);

        let input = source.text.as_str();
        let mut parser = Parser::new(input);
        let mut count = 0;
        loop {
            let located = |error: Error| {
                let (line, col) = error.span.line_col(input);
                TranslateError::Command {
                    unit: source.name.clone(),
                    line: line + 1,
                    col: col + 1,
                    error,
                }
            };
            let (span, command) = match parser.next_command().map_err(located)? {
                Some(next) => next,
                None => break,
            };
            let instrs = Generator::new(&source.name, &mut self.labels)
                .command(span, &command)
                .map_err(located)?;
            if self.options.annotate {
                self.write(&[Instr::Comment(command.to_string().into())])?;
            }
            self.write(&instrs)?;
            count += 1;
        }

        log::debug!("translated `{}`: {} commands", source.name, count);
        Ok(())
    }

    /// Flush the output and return it.
    pub fn finish(mut self) -> Result<W, TranslateError> {
        self.start()?;
        self.out.flush()?;
        Ok(self.out)
    }
}

/// Translate the sources in order into one program.
pub fn to_asm<'a, I>(sources: I, options: Options) -> Result<String, TranslateError>
where
    I: IntoIterator<Item = &'a Source>,
{
    let mut translator = Translator::new(Vec::new(), options);
    for source in sources {
        translator.unit(source)?;
    }
    let out = translator.finish()?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
