//! MiniC compiler front end.
//!
//! ```
//! let (program, errors) = minic::parse_str("int main() { return 0; }");
//! assert_eq!(errors, 0);
//! assert_eq!(program.map(|program| program.decls.len()), Some(1));
//! ```

pub use minic_parser::ast;
pub use minic_parser::flatten::{dump, flatten};
pub use minic_parser::visitor;
pub use minic_source::{Diagnostic, ErrorReporter, Position, Sink, Source};

use minic_parser::ast::Program;
use minic_parser::parser::Parser;

/// Parses the program in `source`. Diagnostics are reported to `source.errors`.
/// Returns `None` after a syntax error.
pub fn parse(source: &Source) -> Option<Program> {
    Parser::new(source).parse_program()
}

/// Parses `text`, writing diagnostics to stderr. Also returns the number of errors reported.
pub fn parse_str(text: &str) -> (Option<Program>, usize) {
    let source = Source::new(text);
    let program = parse(&source);
    (program, source.error_count())
}
