//! Allocate unique labels for generated branches.

/// The pair of labels used by a single comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compare {
    /// Where the comparison jumps to when it holds.
    pub taken: String,
    /// Where both outcomes continue.
    pub done: String,
}

/// Counters for generated labels.
///
/// One allocator is shared by every unit written to the same output so that
/// labels never collide between units.
#[derive(Debug, Default)]
pub struct Labels {
    compare: usize,
    call: usize,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh pair of comparison labels.
    pub fn next_compare(&mut self) -> Compare {
        let n = self.compare;
        self.compare += 1;
        Compare {
            taken: format!("$compare.true.{}", n),
            done: format!("$compare.end.{}", n),
        }
    }

    /// Returns a fresh return address label for a call to `function`.
    ///
    /// The suffix is shared across all functions, not counted per function.
    pub fn next_call_return(&mut self, function: &str) -> String {
        let n = self.call;
        self.call += 1;
        format!("{}$ret.{}", function, n)
    }
}
