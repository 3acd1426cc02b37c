use std::fmt;
use std::fmt::{Debug, Formatter};

/// Location holds the start position of the given element in the data source
#[derive(Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("{line}:{column}")]
pub struct Location {
    /// Line number, starting with 1
    pub line: usize,
    /// Column number, starting with 1
    pub column: usize,
    /// Offset in characters, starting with 0
    pub offset: usize,
}

impl Default for Location {
    /// Default to line 1, column 1
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

impl Location {
    /// Create a new Location
    #[must_use]
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }

    /// Advances the location over the given text
    pub fn advance(&mut self, text: &str) {
        for c in text.chars() {
            self.offset += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}

impl Debug for Location {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "({}:{})", self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_counts_lines_and_columns() {
        let mut loc = Location::default();
        loc.advance("ab\ncd");
        assert_eq!(loc, Location::new(2, 3, 5));
        assert_eq!(loc.to_string(), "2:3");
    }
}
