//! Source code representation and error management.

use std::{
    cell::{Cell, RefCell},
    fmt,
};

/// Represents the source code of one compilation.
pub struct Source<'a> {
    /// Original source code.
    pub content: &'a str,
    /// Name used to prefix diagnostics (usually a file name).
    pub name: Option<String>,
    /// Accumulated errors.
    pub errors: ErrorReporter,
}

impl<'a> Source<'a> {
    /// Create a new `Source` with the specified `content`.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            name: None,
            errors: ErrorReporter::new(),
        }
    }

    /// Create a new `Source` whose diagnostics are prefixed with `name`.
    pub fn named(content: &'a str, name: impl ToString) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::new(content)
        }
    }

    /// Replaces the sink the diagnostics are written to.
    pub fn with_sink(mut self, sink: Sink) -> Self {
        self.errors.sink = sink;
        self
    }

    /// Reports a diagnostic tagged with the name of this `Source`.
    pub fn report(&self, position: impl Into<Position>, message: impl ToString) {
        self.errors.report(position, message, self.name.as_deref());
    }

    /// Returns `true` if `Source` has no accumulated errors. Returns `false` otherwise.
    pub fn has_no_errors(&self) -> bool {
        self.errors.count() == 0
    }

    /// Number of errors reported since the last reset.
    pub fn error_count(&self) -> usize {
        self.errors.count()
    }
}

impl<'a> From<&'a str> for Source<'a> {
    fn from(content: &'a str) -> Self {
        Source::new(content)
    }
}

/// Where a diagnostic points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// 1-based source line.
    Line(usize),
    /// The input ended before the construct was complete.
    Eof,
}

impl From<usize> for Position {
    fn from(line: usize) -> Self {
        Position::Line(line)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Position::Line(line) => write!(f, "{}", line),
            Position::Eof => write!(f, "EOF"),
        }
    }
}

/// Represents a compile time error.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub position: Position,
    pub message: String,
    pub source_name: Option<String>,
}

impl Diagnostic {
    /// Create a new diagnostic with the specified `position` and `message`.
    pub fn new(position: impl Into<Position>, message: impl ToString) -> Self {
        Self {
            position: position.into(),
            message: message.to_string(),
            source_name: None,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_name {
            Some(name) => write!(f, "{}:{}: {}", name, self.position, self.message),
            None => write!(f, "{}: {}", self.position, self.message),
        }
    }
}

/// Where reported diagnostics are written to, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sink {
    /// Print every diagnostic to standard error as it is reported.
    #[default]
    Stderr,
    /// Only keep diagnostics in memory.
    Silent,
}

/// Manages all the errors.
pub struct ErrorReporter {
    diagnostics: RefCell<Vec<Diagnostic>>,
    count: Cell<usize>,
    sink: Sink,
}

impl ErrorReporter {
    /// Create an empty `ErrorReporter` writing to standard error.
    pub fn new() -> Self {
        Self::with_sink(Sink::default())
    }

    /// Create an empty `ErrorReporter` writing to `sink`.
    pub fn with_sink(sink: Sink) -> Self {
        Self {
            diagnostics: RefCell::new(Vec::new()),
            count: Cell::new(0),
            sink,
        }
    }

    /// Adds a diagnostic to the `ErrorReporter`.
    /// This method uses the interior mutability pattern. This does not require mutability for ergonomics.
    pub fn report(
        &self,
        position: impl Into<Position>,
        message: impl ToString,
        source_name: Option<&str>,
    ) {
        let mut diagnostic = Diagnostic::new(position, message);
        diagnostic.source_name = source_name.map(str::to_string);
        self.add(diagnostic);
    }

    /// Adds an already built diagnostic.
    pub fn add(&self, diagnostic: Diagnostic) {
        if self.sink == Sink::Stderr {
            eprintln!("{}", diagnostic);
        }
        // This should be the only place where self.diagnostics is borrowed mutably.
        self.diagnostics.borrow_mut().push(diagnostic);
        self.count.set(self.count.get() + 1);
    }

    /// Number of diagnostics reported since the last [`Self::reset`].
    pub fn count(&self) -> usize {
        self.count.get()
    }

    /// Zeroes the counter and forgets the stored diagnostics.
    pub fn reset(&self) {
        self.count.set(0);
        self.diagnostics.borrow_mut().clear();
    }

    /// Snapshot of the diagnostics in report order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }
}

impl Default for ErrorReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ErrorReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let diagnostics = self.diagnostics.borrow();
        for diagnostic in diagnostics.iter() {
            writeln!(f, "{}", diagnostic)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn silent(content: &str) -> Source<'_> {
        Source::new(content).with_sink(Sink::Silent)
    }

    #[test]
    fn test_report_and_count() {
        let source = silent("");
        assert!(source.has_no_errors());

        source.report(3, "Illegal character '$'");
        source.report(Position::Eof, "Syntax error: unexpected end of input");

        assert_eq!(source.error_count(), 2);
        assert!(!source.has_no_errors());
        let diagnostics = source.errors.diagnostics();
        assert_eq!(diagnostics[0].position, Position::Line(3));
        assert_eq!(diagnostics[1].position, Position::Eof);
    }

    #[test]
    fn test_reset() {
        let source = silent("");
        source.report(1, "first");
        source.errors.reset();
        assert_eq!(source.error_count(), 0);
        assert!(source.errors.diagnostics().is_empty());

        source.report(2, "second");
        assert_eq!(source.error_count(), 1);
    }

    #[test]
    fn test_rendering() {
        assert_eq!(Diagnostic::new(4, "boom").to_string(), "4: boom");
        assert_eq!(
            Diagnostic::new(Position::Eof, "no more input").to_string(),
            "EOF: no more input"
        );

        let source = Source::named("", "prog.mc").with_sink(Sink::Silent);
        source.report(7, "boom");
        assert_eq!(source.errors.to_string(), "prog.mc:7: boom\n");
    }

    #[test]
    fn test_independent_sources() {
        let first = silent("a");
        let second = silent("b");
        first.report(1, "only in first");
        assert_eq!(first.error_count(), 1);
        assert_eq!(second.error_count(), 0);
    }
}
