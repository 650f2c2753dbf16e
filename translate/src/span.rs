use std::ops;

/// Represents a location in the original input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// The start index.
    pub m: usize,
    /// The end index.
    pub n: usize,
}

impl Span {
    pub fn new(m: usize, n: usize) -> Self {
        Self { m, n }
    }

    pub fn range(&self) -> ops::Range<usize> {
        self.m..self.n
    }

    /// Returns a span covering both this span and the other one.
    pub fn include(self, other: Span) -> Self {
        Self {
            m: self.m.min(other.m),
            n: self.n.max(other.n),
        }
    }

    pub fn as_str<'i>(&self, input: &'i str) -> &'i str {
        &input[self.range()]
    }

    /// Returns the 0-based line and column of the start of this span.
    pub fn line_col(&self, input: &str) -> (usize, usize) {
        let before = &input[..self.m.min(input.len())];
        let line = before.matches('\n').count();
        let col = match before.rfind('\n') {
            Some(i) => before[i + 1..].chars().count(),
            None => before.chars().count(),
        };
        (line, col)
    }
}

impl From<usize> for Span {
    fn from(m: usize) -> Self {
        Self { m, n: m + 1 }
    }
}

impl From<ops::Range<usize>> for Span {
    fn from(r: ops::Range<usize>) -> Self {
        Self {
            m: r.start,
            n: r.end,
        }
    }
}
