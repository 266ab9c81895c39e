//! Source locations for rule text
//!
//! Every token and every predicate remembers where it came from so that
//! parse errors and evaluation diagnostics can point back at the rule source.
use serde::{Deserialize, Serialize};
use std::fmt;

/// A position in rule text: byte offset plus 1-based line and column.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct Position {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(offset: usize, line: u32, column: u32) -> Self {
        Self {
            offset,
            line,
            column,
        }
    }

    /// Offset 0, line 1, column 1
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }

    /// Position after consuming `ch`
    pub fn advance(self, ch: char) -> Self {
        if ch == '\n' {
            Self::new(self.offset + 1, self.line + 1, 1)
        } else {
            Self::new(self.offset + ch.len_utf8(), self.line, self.column + 1)
        }
    }

    /// Position after consuming every character of `text`
    pub fn advance_str(self, text: &str) -> Self {
        text.chars().fold(self, Position::advance)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Half-open range of rule text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    pub fn new(start: Position, end: Position) -> Self {
        debug_assert!(start.offset <= end.offset, "span start after end");
        Self { start, end }
    }

    /// Span covering exactly one character at `pos`
    pub fn single(pos: Position) -> Self {
        Self {
            start: pos,
            end: Position::new(pos.offset + 1, pos.line, pos.column + 1),
        }
    }

    /// Smallest span covering both `self` and `other`
    pub fn merge(self, other: Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end.max(other.end);
        Span { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.offset >= self.start.offset && pos.offset < self.end.offset
    }

    /// Text covered by this span, if it lies inside `source`
    pub fn slice<'a>(&self, source: &'a str) -> Option<&'a str> {
        source.get(self.start.offset..self.end.offset)
    }

    /// Placeholder for nodes built outside of parsing
    pub fn dummy() -> Self {
        Self {
            start: Position::start(),
            end: Position::start(),
        }
    }

    pub fn line(&self) -> u32 {
        self.start.line
    }

    pub fn column(&self) -> u32 {
        self.start.column
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.start.line, self.start.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

/// A value paired with the span it was read from
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Self {
        Self { value, span }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned {
            value: f(self.value),
            span: self.span,
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.value.fmt(f)
    }
}

/// Line index over a rule source, used to render diagnostics with context.
#[derive(Debug, Clone)]
pub struct SourceMap {
    source: String,
    line_starts: Vec<usize>,
}

impl SourceMap {
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .char_indices()
                    .filter(|(_, ch)| *ch == '\n')
                    .map(|(offset, _)| offset + 1),
            )
            .collect();
        Self {
            source,
            line_starts,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Text of a 1-based line without its terminator
    pub fn line_text(&self, line: u32) -> Option<&str> {
        let index = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(index)?;
        let end = self
            .line_starts
            .get(index + 1)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        self.source
            .get(start..end)
            .map(|text| text.trim_end_matches('\r'))
    }

    /// Render `message` with the offending line and a caret marker
    pub fn format_error(&self, span: &Span, message: &str) -> String {
        let mut out = format!("error: {}\n  --> {}\n", message, span.start);

        if let Some(line) = self.line_text(span.start.line) {
            let number = span.start.line.to_string();
            let gutter = " ".repeat(number.len());
            let width = if span.start.line == span.end.line {
                span.end.column.saturating_sub(span.start.column).max(1) as usize
            } else {
                1
            };
            let indent = " ".repeat(span.start.column.saturating_sub(1) as usize);

            out.push_str(&format!("{} |\n", gutter));
            out.push_str(&format!("{} | {}\n", number, line));
            out.push_str(&format!("{} | {}{}\n", gutter, indent, "^".repeat(width)));
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_tracks_lines() {
        let pos = Position::start().advance_str("{a :\n b");
        assert_eq!(pos.line, 2);
        assert_eq!(pos.column, 3);
        assert_eq!(pos.offset, 7);
    }

    #[test]
    fn test_span_merge_and_slice() {
        let source = "{ age : age > 1 : 'x' }";
        let a = Span::new(Position::new(2, 1, 3), Position::new(5, 1, 6));
        let b = Span::new(Position::new(8, 1, 9), Position::new(11, 1, 12));
        let merged = a.merge(b);
        assert_eq!(merged.slice(source), Some("age : age"));
        assert_eq!(merged.len(), 9);
        assert!(merged.contains(Position::new(4, 1, 5)));
    }

    #[test]
    fn test_format_error_points_at_column() {
        let map = SourceMap::new("{ a : a > 1 : 'x' }\n{ b : b ~ 2 : 'y' }");
        let span = Span::single(Position::new(28, 2, 9));
        let rendered = map.format_error(&span, "unexpected character '~'");
        assert!(rendered.contains("--> 2:9"));
        assert!(rendered.contains("2 | { b : b ~ 2 : 'y' }"));
        assert!(rendered.ends_with("  |         ^\n"));
    }
}
