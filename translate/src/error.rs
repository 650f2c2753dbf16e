use std::cmp::max;
use std::path::Path;

use dairy::Cow;
use thiserror::Error;
use unicode_width::UnicodeWidthStr;
use yansi::Paint;

use crate::span::Span;

pub type Result<T> = std::result::Result<T, Error>;

/// The category of a command error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// An unknown keyword or segment, or the wrong number of arguments.
    MalformedCommand,
    /// An argument that should be a non-negative integer isn't one.
    InvalidNumericArgument,
    /// A segment that cannot be used with this operation, like `pop constant`.
    UnsupportedSegment,
}

/// A command error.
///
/// The span specifies what will be underlined in the error message. The
/// message is what will be displayed in the formatted output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{msg}")]
pub struct Error {
    pub kind: Kind,
    pub msg: Cow<'static, str>,
    pub span: Span,
}

fn to_line_col(lines: &[&str], offset: usize) -> (usize, usize) {
    let mut n = 0;
    for (i, line) in lines.iter().enumerate() {
        let len = line.len() + 1;
        if n + len > offset {
            return (i, line[..offset - n].width());
        }
        n += len;
    }
    (lines.len(), lines.last().map(|l| l.width()).unwrap_or(0))
}

impl Error {
    pub(crate) fn new(kind: Kind, msg: impl Into<Cow<'static, str>>, span: impl Into<Span>) -> Self {
        Self {
            kind,
            msg: msg.into(),
            span: span.into(),
        }
    }

    pub(crate) fn malformed(msg: impl Into<Cow<'static, str>>, span: impl Into<Span>) -> Self {
        Self::new(Kind::MalformedCommand, msg, span)
    }

    pub(crate) fn numeric(msg: impl Into<Cow<'static, str>>, span: impl Into<Span>) -> Self {
        Self::new(Kind::InvalidNumericArgument, msg, span)
    }

    pub(crate) fn unsupported(msg: impl Into<Cow<'static, str>>, span: impl Into<Span>) -> Self {
        Self::new(Kind::UnsupportedSegment, msg, span)
    }

    /// Render the error against the input it came from.
    pub fn pretty(&self, input: &str, filename: impl AsRef<Path>) -> String {
        let Self { span, msg, .. } = self;

        let lines: Vec<_> = input.split_terminator('\n').collect();
        let (line, col) = to_line_col(&lines, span.m);
        let code = lines
            .get(line)
            .or_else(|| lines.last())
            .copied()
            .unwrap_or("");
        let width = max(1, input.get(span.range()).map(|s| s.width()).unwrap_or(0));
        let error = format!(
            "{underline:>pad$} {msg}",
            underline = Paint::red("^".repeat(width)).bold(),
            msg = Paint::default(msg).bold(),
            pad = col + width,
        );

        let num = (line + 1).to_string();
        format!(
            "\n\
            {0:pad$} {arrow} {filename}:{line}:{col}\n \
            {0:pad$} {pipe}\n \
            {num:>} {pipe} {code}\n \
            {0:pad$} {pipe} {error}\n",
            "",
            pad = num.width(),
            arrow = Paint::blue("-->").bold(),
            filename = filename.as_ref().display(),
            line = line + 1,
            col = col + 1,
            pipe = Paint::blue("|").bold(),
            num = Paint::blue(num).bold(),
            code = code,
            error = error,
        )
    }
}
