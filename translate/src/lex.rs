//! Tokenize the input.

use std::ops;
use std::str;

use crate::error::{Error, Result};
use crate::span::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// An LF line ending (0x0A).
    Newline,
    /// A sequence of whitespace that isn't a line ending.
    Whitespace,
    /// A keyword, segment, number, or name, like `push`, `local`, `7`, or
    /// `Main.fibonacci$if_true`.
    Word,
    /// Comment contents including the `//` prefix.
    Comment,
}

/// An iterator over (index, char) in a string.
#[derive(Debug, Clone)]
struct CharIndices<'i> {
    iter: str::CharIndices<'i>,
    len: usize,
}

/// An iterator over input tokens.
#[derive(Debug, Clone)]
pub struct Tokens<'i> {
    /// The input as (index, char) values.
    iter: CharIndices<'i>,
}

////////////////////////////////////////////////////////////////////////////////
// Implementations
////////////////////////////////////////////////////////////////////////////////

fn span(token: Token, span: impl Into<Span>) -> (Span, Token) {
    (span.into(), token)
}

impl<'i> CharIndices<'i> {
    /// Construct a new iterator over indexes and characters of a string.
    fn new(input: &'i str) -> Self {
        Self {
            iter: input.char_indices(),
            len: input.len(),
        }
    }

    /// Returns the next index of the iterator.
    fn peek_index(&self) -> usize {
        self.iter
            .clone()
            .next()
            .map(|(i, _)| i)
            .unwrap_or(self.len)
    }

    /// Returns the next character of the iterator.
    fn peek_char(&self) -> Option<char> {
        self.iter.clone().next().map(|(_, c)| c)
    }
}

impl<'i> ops::Deref for CharIndices<'i> {
    type Target = str::CharIndices<'i>;

    fn deref(&self) -> &Self::Target {
        &self.iter
    }
}

impl<'i> ops::DerefMut for CharIndices<'i> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.iter
    }
}

fn is_whitespace(c: &char) -> bool {
    c.is_whitespace() && *c != '\n'
}

fn is_word(c: &char) -> bool {
    !c.is_whitespace() && *c != '/'
}

impl<'i> Tokens<'i> {
    /// Construct a new iterator over the input tokens.
    pub fn new(input: &'i str) -> Self {
        let iter = CharIndices::new(input);
        Self { iter }
    }

    /// Eats the next character if the predicate is satisfied.
    fn lex_if<P>(&mut self, predicate: P) -> bool
    where
        P: Fn(&char) -> bool,
    {
        match self.iter.peek_char() {
            Some(c) if predicate(&c) => self.iter.next().is_some(),
            _ => false,
        }
    }

    /// Eats the next token, including all characters satisfying the predicate.
    fn lex_token<P>(&mut self, token: Token, i: usize, predicate: P) -> (Span, Token)
    where
        P: Fn(&char) -> bool + Copy,
    {
        while self.lex_if(predicate) {}
        span(token, i..self.iter.peek_index())
    }

    /// Returns the next token in the iterator.
    pub fn next(&mut self) -> Result<Option<(Span, Token)>> {
        let next = match self.iter.next() {
            None => return Ok(None),
            Some(next) => next,
        };
        let token = match next {
            (i, '\n') => span(Token::Newline, i),
            (i, c) if is_whitespace(&c) => self.lex_token(Token::Whitespace, i, is_whitespace),

            (i, '/') if self.iter.peek_char() == Some('/') => {
                self.lex_token(Token::Comment, i, |&c| c != '\n')
            }
            (i, '/') => {
                return Err(Error::malformed(
                    "unexpected character",
                    i..self.iter.peek_index(),
                ))
            }

            (i, _) => self.lex_token(Token::Word, i, is_word),
        };
        Ok(Some(token))
    }
}
