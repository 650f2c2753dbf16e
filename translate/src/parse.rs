//! Classify each line of the input as a command.

mod integer;
mod unpack;

use self::unpack::TryUnpack;
use crate::ast::{ArithmeticOp, Command, Segment};
use crate::error::{Error, Result};
use crate::lex::{Token, Tokens};
use crate::span::Span;

/// Classifies the input one line at a time.
#[derive(Debug, Clone)]
pub struct Parser<'i> {
    /// The original input string.
    input: &'i str,
    /// An iterator over the tokens in the input.
    tokens: Tokens<'i>,
}

impl<'i> Parser<'i> {
    pub fn new(input: &'i str) -> Self {
        let tokens = Tokens::new(input);
        Self { input, tokens }
    }

    /// Consumes the words on the next line, skipping whitespace and comments.
    ///
    /// Returns `None` once the input is exhausted.
    fn eat_line(&mut self) -> Result<Option<Vec<Span>>> {
        let mut words = Vec::new();
        loop {
            match self.tokens.next()? {
                Some((span, Token::Word)) => words.push(span),
                Some((_, Token::Whitespace)) | Some((_, Token::Comment)) => continue,
                Some((_, Token::Newline)) => break Ok(Some(words)),
                None if words.is_empty() => break Ok(None),
                None => break Ok(Some(words)),
            }
        }
    }

    fn eat_args<T>(&self, keyword: Span, args: Vec<Span>) -> Result<T>
    where
        Vec<Span>: TryUnpack<T>,
    {
        args.try_unpack().map_err(|(exp, got)| {
            let msg = format!(
                "expected {} argument{}, found {}",
                exp,
                if exp != 1 { "s" } else { "" },
                got,
            );
            Error::malformed(msg, keyword)
        })
    }

    fn segment(&self, span: Span) -> Result<Segment> {
        Segment::from_name(span.as_str(self.input))
            .ok_or_else(|| Error::malformed("unknown memory segment", span))
    }

    fn integer(&self, span: Span) -> Result<u16> {
        integer::parse(self.input, span)
    }

    /// Classifies a single non-empty line.
    fn classify(&self, keyword: Span, args: Vec<Span>) -> Result<Command<'i>> {
        let name = |span: Span| span.as_str(self.input);
        let command = match name(keyword) {
            "pop" => {
                let (segment, index) = self.eat_args(keyword, args)?;
                Command::Pop(self.segment(segment)?, self.integer(index)?)
            }
            "push" => {
                let (segment, index) = self.eat_args(keyword, args)?;
                Command::Push(self.segment(segment)?, self.integer(index)?)
            }
            "label" => {
                let (label,) = self.eat_args(keyword, args)?;
                Command::Label(name(label))
            }
            "goto" => {
                let (label,) = self.eat_args(keyword, args)?;
                Command::Goto(name(label))
            }
            "if-goto" => {
                let (label,) = self.eat_args(keyword, args)?;
                Command::IfGoto(name(label))
            }
            "function" => {
                let (function, locals) = self.eat_args(keyword, args)?;
                Command::Function(name(function), self.integer(locals)?)
            }
            "call" => {
                let (function, nargs) = self.eat_args(keyword, args)?;
                Command::Call(name(function), self.integer(nargs)?)
            }
            "return" => {
                let () = self.eat_args(keyword, args)?;
                Command::Return
            }
            other => match ArithmeticOp::from_name(other) {
                Some(op) => {
                    let () = self.eat_args(keyword, args)?;
                    Command::Arithmetic(op)
                }
                None => return Err(Error::malformed("unknown command", keyword)),
            },
        };
        Ok(command)
    }

    /// Returns the next command together with the span of the whole command.
    ///
    /// Blank lines and comment lines are skipped, `None` means there are no
    /// more commands.
    pub fn next_command(&mut self) -> Result<Option<(Span, Command<'i>)>> {
        loop {
            let mut words = match self.eat_line()? {
                Some(words) if words.is_empty() => continue,
                Some(words) => words.into_iter(),
                None => break Ok(None),
            };
            if let Some(keyword) = words.next() {
                let args: Vec<_> = words.collect();
                let span = args.iter().fold(keyword, |acc, &s| acc.include(s));
                let command = self.classify(keyword, args)?;
                log::trace!("classified `{}`", command);
                break Ok(Some((span, command)));
            }
        }
    }
}

/// Classify every command in the input.
pub fn program(input: &str) -> Result<Vec<(Span, Command<'_>)>> {
    let mut parser = Parser::new(input);
    let mut commands = Vec::new();
    while let Some(command) = parser.next_command()? {
        commands.push(command);
    }
    Ok(commands)
}
