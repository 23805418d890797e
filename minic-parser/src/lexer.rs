use std::{fmt, ops::Range};

use logos::{FilterResult, Logos};
use minic_source::Source;
use thiserror::Error;

/// Errors produced while matching a single token.
#[derive(Debug, Clone, PartialEq, Default, Error)]
pub enum LexError {
    #[default]
    #[error("Illegal character")]
    IllegalCharacter,
    #[error("Unterminated comment")]
    UnterminatedComment,
    #[error("Integer literal out of range")]
    IntegerOutOfRange,
}

#[derive(Debug, Logos, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")] // single line comments
pub enum TokenKind {
    // literals
    #[regex(r"0|[1-9][0-9]*", integer)]
    #[regex(r"0[xX][0-9a-fA-F]+", integer)]
    #[regex(r"0[bB][01]+", integer)]
    #[regex(r"0[0-7]+", integer)]
    IntLit(i64),
    #[regex(r"[0-9]+\.[0-9]*", |lex| lex.slice().parse::<f64>().ok())]
    FloatLit(f64),
    #[token("true", |_| true)]
    #[token("false", |_| false)]
    BoolLit(bool),
    #[regex(r"'([^'\\\n]|\\[^\n])'", |lex| {
        let slice = lex.slice();
        unescape(&slice[1..slice.len() - 1]).chars().next()
    })]
    CharLit(char),
    #[regex(r#""([^"\\]|\\[^\n])*""#, |lex| {
        let slice = lex.slice();
        unescape(&slice[1..slice.len() - 1])
    })]
    StringLit(String),

    // identifiers
    #[regex("[a-zA-Z][a-zA-Z0-9]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // keywords
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("do")]
    Do,
    #[token("while")]
    While,
    #[token("return")]
    Return,
    #[token("break")]
    Break,
    #[token("not")]
    Not,
    #[token("int")]
    Int,
    #[token("char")]
    Char,
    #[token("delete")]
    Delete,
    #[token("void")]
    Void,
    #[token("float")]
    Float,
    #[token("size")]
    Size,
    #[token("bool")]
    Bool,
    #[token("const")]
    Const,
    #[token("new")]
    New,

    // unary operators
    #[token("!")]
    LogicalNot,
    #[token("++")]
    PlusPlus,
    #[token("--")]
    MinusMinus,

    // binary operators
    // - arithmetics
    #[token("+")]
    Plus,
    #[token("-")]
    Minus, // NOTE: can also be unary
    #[token("*")]
    Asterisk,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    // - assignment
    #[token("=")]
    Equals,
    #[token("+=")]
    PlusEquals,
    #[token("-=")]
    MinusEquals,
    #[token("*=")]
    AsteriskEquals,
    #[token("/=")]
    SlashEquals,
    #[token("%=")]
    PercentEquals,
    // - logical
    #[token("&&")]
    LogicalAnd,
    #[token("||")]
    LogicalOr,
    // - equality
    #[token("==")]
    EqualsEquals,
    #[token("!=")]
    NotEquals,
    // - ordering
    #[token(">")]
    GreaterThan,
    #[token(">=")]
    GreaterThanEquals,
    #[token("<")]
    LessThan,
    #[token("<=")]
    LessThanEquals,

    // punctuation
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semi,
    #[token(".")]
    Dot,

    /// Block comments are skipped by their callback, this variant is never emitted.
    #[token("/*", block_comment)]
    BlockComment,

    /// Only generated in parse phase when `lexer.next()` returns `None`.
    Eof,
}

/// Binding power of prefix operators. Higher than every binary operator.
pub const PREFIX_BP: u8 = 16;

impl TokenKind {
    /// Returns the binary binding power or `None` if invalid binop token.
    /// Binding power `0` and `1` is reserved for accepting any expression.
    /// Assignments have the lowest precedence with `(3, 2)`.
    pub fn binop_bp(&self) -> Option<(u8, u8)> {
        match self {
            /* Assignment */
            TokenKind::Equals
            | TokenKind::PlusEquals
            | TokenKind::MinusEquals
            | TokenKind::AsteriskEquals
            | TokenKind::SlashEquals
            | TokenKind::PercentEquals => Some((3, 2)),
            /* Logical */
            TokenKind::LogicalOr => Some((4, 5)),
            TokenKind::LogicalAnd => Some((6, 7)),
            /* Equality */
            TokenKind::EqualsEquals | TokenKind::NotEquals => Some((8, 9)),
            TokenKind::GreaterThan
            | TokenKind::GreaterThanEquals
            | TokenKind::LessThan
            | TokenKind::LessThanEquals => Some((10, 11)),
            /* Additive */
            TokenKind::Plus | TokenKind::Minus => Some((12, 13)),
            /* Multiplicative */
            TokenKind::Asterisk | TokenKind::Slash | TokenKind::Percent => Some((14, 15)),
            _ => None,
        }
    }

    pub fn is_assignment(&self) -> bool {
        matches!(self, TokenKind::Equals) || self.compound_op().is_some()
    }

    /// The binary operator a compound assignment (`+=`, ...) applies.
    pub fn compound_op(&self) -> Option<&'static str> {
        match self {
            TokenKind::PlusEquals => Some("+"),
            TokenKind::MinusEquals => Some("-"),
            TokenKind::AsteriskEquals => Some("*"),
            TokenKind::SlashEquals => Some("/"),
            TokenKind::PercentEquals => Some("%"),
            _ => None,
        }
    }

    /// Returns `true` for the keywords naming a primitive type.
    pub fn is_type(&self) -> bool {
        matches!(
            self,
            TokenKind::Void | TokenKind::Bool | TokenKind::Int | TokenKind::Float | TokenKind::Char
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            TokenKind::IntLit(value) => return write!(f, "{}", value),
            TokenKind::FloatLit(value) => return write!(f, "{:?}", value),
            TokenKind::BoolLit(value) => return write!(f, "{}", value),
            TokenKind::CharLit(value) => return write!(f, "'{}'", value.escape_default()),
            TokenKind::StringLit(value) => return write!(f, "\"{}\"", value.escape_default()),
            TokenKind::Identifier(ident) => ident.as_str(),
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::For => "for",
            TokenKind::Do => "do",
            TokenKind::While => "while",
            TokenKind::Return => "return",
            TokenKind::Break => "break",
            TokenKind::Not => "not",
            TokenKind::Int => "int",
            TokenKind::Char => "char",
            TokenKind::Delete => "delete",
            TokenKind::Void => "void",
            TokenKind::Float => "float",
            TokenKind::Size => "size",
            TokenKind::Bool => "bool",
            TokenKind::Const => "const",
            TokenKind::New => "new",
            TokenKind::LogicalNot => "!",
            TokenKind::PlusPlus => "++",
            TokenKind::MinusMinus => "--",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Asterisk => "*",
            TokenKind::Slash => "/",
            TokenKind::Percent => "%",
            TokenKind::Equals => "=",
            TokenKind::PlusEquals => "+=",
            TokenKind::MinusEquals => "-=",
            TokenKind::AsteriskEquals => "*=",
            TokenKind::SlashEquals => "/=",
            TokenKind::PercentEquals => "%=",
            TokenKind::LogicalAnd => "&&",
            TokenKind::LogicalOr => "||",
            TokenKind::EqualsEquals => "==",
            TokenKind::NotEquals => "!=",
            TokenKind::GreaterThan => ">",
            TokenKind::GreaterThanEquals => ">=",
            TokenKind::LessThan => "<",
            TokenKind::LessThanEquals => "<=",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::OpenBrace => "{",
            TokenKind::CloseBrace => "}",
            TokenKind::OpenBracket => "[",
            TokenKind::CloseBracket => "]",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Dot => ".",
            TokenKind::BlockComment => "/*",
            TokenKind::Eof => "EOF",
        };
        f.write_str(text)
    }
}

/// Converts an integer literal in any of the supported bases.
fn integer(lex: &mut logos::Lexer<TokenKind>) -> Result<i64, LexError> {
    let slice = lex.slice();
    let (digits, radix) = match slice.get(..2) {
        Some("0x") | Some("0X") => (&slice[2..], 16),
        Some("0b") | Some("0B") => (&slice[2..], 2),
        _ if slice.len() > 1 => match slice.strip_prefix('0') {
            Some(octal) => (octal, 8),
            None => (slice, 10),
        },
        _ => (slice, 10),
    };
    i64::from_str_radix(digits, radix).map_err(|_| LexError::IntegerOutOfRange)
}

/// Skips to the end of a block comment.
/// Without a closing `*/` the opener alone is rejected and lexing resumes after it.
fn block_comment(lex: &mut logos::Lexer<TokenKind>) -> FilterResult<(), LexError> {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            FilterResult::Skip
        }
        None => FilterResult::Error(LexError::UnterminatedComment),
    }
}

fn unescape(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('t') => value.push('\t'),
            Some('r') => value.push('\r'),
            Some('0') => value.push('\0'),
            Some(other) => value.push(other),
            None => value.push('\\'),
        }
    }
    value
}

/// A classified lexical unit.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// 1-based line of the first character of the token.
    pub line: usize,
    pub span: Range<usize>,
}

/// Lazy token stream over a [`Source`].
///
/// Lexical errors are reported to the `Source` and the offending input is skipped,
/// so the stream only ever yields valid tokens.
pub struct Lexer<'a> {
    inner: logos::Lexer<'a, TokenKind>,
    source: &'a Source<'a>,
    /// Current line number.
    line: usize,
    /// Byte offset up to which newlines have been counted.
    counted: usize,
}

/// Creates the token stream for `source`.
pub fn tokenize<'a>(source: &'a Source<'a>) -> Lexer<'a> {
    Lexer::new(source)
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a Source<'a>) -> Self {
        Self {
            inner: TokenKind::lexer(source.content),
            source,
            line: 1,
            counted: 0,
        }
    }

    /// Line the lexer has reached so far.
    pub fn line(&self) -> usize {
        self.line
    }

    fn count_lines_to(&mut self, offset: usize) {
        let content = self.source.content;
        self.line += content.as_bytes()[self.counted..offset]
            .iter()
            .filter(|&&b| b == b'\n')
            .count();
        self.counted = offset;
    }

    fn report(&self, line: usize, error: LexError, text: &str) {
        let message = match error {
            LexError::IllegalCharacter => format!("Illegal character '{}'", text),
            LexError::IntegerOutOfRange => format!("Integer literal '{}' out of range", text),
            LexError::UnterminatedComment => error.to_string(),
        };
        self.source.report(line, message);
    }

    /// Continues lexing from byte `offset`.
    fn restart_at(&mut self, offset: usize) {
        let mut inner = TokenKind::lexer(self.source.content);
        inner.bump(offset);
        self.inner = inner;
    }

    /// Handles an error span that may cover a partially matched token. Only its first character
    /// is consumed: it is either a token of its own or illegal. Lexing resumes right after it.
    fn reject_first_char(&mut self, span: Range<usize>, line: usize) -> Option<Token> {
        let c = self.source.content[span.start..].chars().next()?;
        let end = span.start + c.len_utf8();
        if end != span.end {
            self.restart_at(end);
        }
        self.count_lines_to(end);

        match lone_token(c) {
            Some(kind) => Some(Token {
                kind,
                line,
                span: span.start..end,
            }),
            None => {
                self.report(line, LexError::IllegalCharacter, c.encode_utf8(&mut [0; 4]));
                None
            }
        }
    }
}

/// Lexes `c` on its own.
fn lone_token(c: char) -> Option<TokenKind> {
    let mut buffer = [0; 4];
    let text: &str = c.encode_utf8(&mut buffer);
    let mut lexer = TokenKind::lexer(text);
    match lexer.next() {
        Some(Ok(kind)) if lexer.span().end == text.len() => Some(kind),
        _ => None,
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let result = self.inner.next()?;
            let span = self.inner.span();
            self.count_lines_to(span.start);
            let line = self.line;

            match result {
                Ok(kind) => {
                    // newlines inside the token belong to the tokens after it
                    self.count_lines_to(span.end);
                    return Some(Token { kind, line, span });
                }
                Err(LexError::IllegalCharacter) => {
                    if let Some(token) = self.reject_first_char(span, line) {
                        return Some(token);
                    }
                }
                Err(error) => {
                    self.count_lines_to(span.end);
                    let text = self.inner.slice();
                    self.report(line, error, text);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minic_source::Sink;
    use proptest::prelude::*;
    use rstest::rstest;

    fn silent(text: &str) -> Source<'_> {
        Source::new(text).with_sink(Sink::Silent)
    }

    fn kinds(text: &str) -> Vec<TokenKind> {
        let source = silent(text);
        let kinds = tokenize(&source).map(|token| token.kind).collect();
        assert!(source.has_no_errors(), "{}", source.errors);
        kinds
    }

    fn lines(text: &str) -> Vec<usize> {
        let source = silent(text);
        let lines = tokenize(&source).map(|token| token.line).collect();
        lines
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("if iffy while whilst int integer true truth"),
            vec![
                TokenKind::If,
                TokenKind::Identifier("iffy".to_string()),
                TokenKind::While,
                TokenKind::Identifier("whilst".to_string()),
                TokenKind::Int,
                TokenKind::Identifier("integer".to_string()),
                TokenKind::BoolLit(true),
                TokenKind::Identifier("truth".to_string()),
            ]
        );
        // keywords are case sensitive
        assert_eq!(kinds("If"), vec![TokenKind::Identifier("If".to_string())]);
        assert_eq!(kinds("x1y2"), vec![TokenKind::Identifier("x1y2".to_string())]);
    }

    #[test]
    fn test_operators_longest_match() {
        assert_eq!(
            kinds("<= < >= > == = != ! && || ++ + -- - += -= *= /= %="),
            vec![
                TokenKind::LessThanEquals,
                TokenKind::LessThan,
                TokenKind::GreaterThanEquals,
                TokenKind::GreaterThan,
                TokenKind::EqualsEquals,
                TokenKind::Equals,
                TokenKind::NotEquals,
                TokenKind::LogicalNot,
                TokenKind::LogicalAnd,
                TokenKind::LogicalOr,
                TokenKind::PlusPlus,
                TokenKind::Plus,
                TokenKind::MinusMinus,
                TokenKind::Minus,
                TokenKind::PlusEquals,
                TokenKind::MinusEquals,
                TokenKind::AsteriskEquals,
                TokenKind::SlashEquals,
                TokenKind::PercentEquals,
            ]
        );
        assert_eq!(
            kinds("a[i].size"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::OpenBracket,
                TokenKind::Identifier("i".to_string()),
                TokenKind::CloseBracket,
                TokenKind::Dot,
                TokenKind::Size,
            ]
        );
    }

    #[rstest]
    #[case("42", 42)]
    #[case("0", 0)]
    #[case("0x1F", 31)]
    #[case("0XfF", 255)]
    #[case("0b101", 5)]
    #[case("0B11", 3)]
    #[case("017", 15)]
    #[case("00", 0)]
    fn test_integer_bases(#[case] text: &str, #[case] value: i64) {
        assert_eq!(kinds(text), vec![TokenKind::IntLit(value)]);
    }

    #[rstest]
    #[case("3.125", 3.125)]
    #[case("2.5", 2.5)]
    #[case("7.", 7.0)]
    #[case("0.125", 0.125)]
    fn test_float_literals(#[case] text: &str, #[case] value: f64) {
        assert_eq!(kinds(text), vec![TokenKind::FloatLit(value)]);
    }

    #[test]
    fn test_sign_is_not_part_of_literal() {
        assert_eq!(
            kinds("a-2.5"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Minus,
                TokenKind::FloatLit(2.5),
            ]
        );
    }

    #[test]
    fn test_char_and_string_literals() {
        assert_eq!(
            kinds(r#"'a' '\n' '\'' "hello world" "tab\there" "say \"hi\"""#),
            vec![
                TokenKind::CharLit('a'),
                TokenKind::CharLit('\n'),
                TokenKind::CharLit('\''),
                TokenKind::StringLit("hello world".to_string()),
                TokenKind::StringLit("tab\there".to_string()),
                TokenKind::StringLit("say \"hi\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            kinds("a // line comment\n/* block\ncomment */ b"),
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Identifier("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_line_tracking() {
        assert_eq!(lines("a\nb\n\nc"), vec![1, 2, 4]);
        assert_eq!(lines("a /* one\ntwo\n */ b // x\nc"), vec![1, 3, 4]);
        assert_eq!(lines("\"multi\nline\" after"), vec![1, 2]);
        assert_eq!(lines("\r\nx"), vec![2]);
    }

    #[test]
    fn test_illegal_character() {
        let source = silent("int a;\n$ int b;");
        let kinds: Vec<_> = tokenize(&source).map(|token| token.kind).collect();
        assert_eq!(kinds.len(), 6);
        assert_eq!(source.error_count(), 1);
        assert_eq!(
            source.errors.diagnostics()[0].to_string(),
            "2: Illegal character '$'"
        );
    }

    #[test]
    fn test_unclosed_string_rejects_only_the_quote() {
        let source = silent("s = \"abc;\nint x;");
        let tokens: Vec<_> = tokenize(&source)
            .map(|token| (token.kind, token.line))
            .collect();
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Identifier("s".to_string()), 1),
                (TokenKind::Equals, 1),
                (TokenKind::Identifier("abc".to_string()), 1),
                (TokenKind::Semi, 1),
                (TokenKind::Int, 2),
                (TokenKind::Identifier("x".to_string()), 2),
                (TokenKind::Semi, 2),
            ]
        );
        assert_eq!(source.error_count(), 1);
        assert_eq!(
            source.errors.diagnostics()[0].to_string(),
            "1: Illegal character '\"'"
        );
    }

    #[test]
    fn test_partial_match_keeps_valid_prefix() {
        assert_eq!(kinds("09"), vec![TokenKind::IntLit(0), TokenKind::IntLit(9)]);

        let source = silent("'ab' c");
        let kinds: Vec<_> = tokenize(&source).map(|token| token.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("ab".to_string()),
                TokenKind::Identifier("c".to_string()),
            ]
        );
        assert_eq!(source.error_count(), 2);
    }

    #[test]
    fn test_unterminated_comment() {
        let source = silent("a\n/* never closed\nb");
        let kinds: Vec<_> = tokenize(&source).map(|token| token.kind).collect();
        assert_eq!(source.error_count(), 1);
        assert_eq!(
            source.errors.diagnostics()[0].to_string(),
            "2: Unterminated comment"
        );
        // lexing resumes right after the opener
        assert_eq!(
            kinds,
            vec![
                TokenKind::Identifier("a".to_string()),
                TokenKind::Identifier("never".to_string()),
                TokenKind::Identifier("closed".to_string()),
                TokenKind::Identifier("b".to_string()),
            ]
        );
    }

    #[test]
    fn test_errors_accumulate() {
        let source = silent("int x = 1 @ 2;\nfloat y; /* oops");
        let tokens: Vec<_> = tokenize(&source).collect();
        assert_eq!(source.error_count(), 2);
        assert_eq!(
            tokens.last().map(|token| &token.kind),
            Some(&TokenKind::Identifier("oops".to_string()))
        );
        assert_eq!(tokens.len(), 10);
    }

    #[test]
    fn test_integer_out_of_range() {
        let source = silent("99999999999999999999 1");
        let kinds: Vec<_> = tokenize(&source).map(|token| token.kind).collect();
        assert_eq!(kinds, vec![TokenKind::IntLit(1)]);
        assert_eq!(source.error_count(), 1);
    }

    #[test]
    fn test_binop_bp_ordering() {
        let bp = |kind: TokenKind| kind.binop_bp().map(|(l, _)| l);
        assert!(bp(TokenKind::Equals) < bp(TokenKind::LogicalOr));
        assert!(bp(TokenKind::LogicalOr) < bp(TokenKind::LogicalAnd));
        assert!(bp(TokenKind::LogicalAnd) < bp(TokenKind::EqualsEquals));
        assert!(bp(TokenKind::EqualsEquals) < bp(TokenKind::LessThan));
        assert!(bp(TokenKind::LessThan) < bp(TokenKind::Plus));
        assert!(bp(TokenKind::Plus) < bp(TokenKind::Percent));
        assert!(bp(TokenKind::Percent) < Some(PREFIX_BP));
        assert_eq!(TokenKind::PlusPlus.binop_bp(), None);
    }

    proptest! {
        #[test]
        fn prop_token_lines_count_preceding_newlines(
            words in prop::collection::vec(("[a-z][a-z0-9]{0,5}", 0usize..3, any::<bool>()), 1..20)
        ) {
            let mut text = String::new();
            let mut expected = Vec::new();
            let mut line = 1;
            for (word, newlines, comment) in &words {
                expected.push(line);
                text.push_str(word);
                text.push(' ');
                if *comment {
                    text.push_str("/* c\n */ // x\n");
                    line += 2;
                }
                for _ in 0..*newlines {
                    text.push('\n');
                    line += 1;
                }
            }

            let source = silent(&text);
            let lines: Vec<usize> = tokenize(&source).map(|token| token.line).collect();
            prop_assert_eq!(lines, expected);
            prop_assert!(source.has_no_errors());
        }
    }
}
