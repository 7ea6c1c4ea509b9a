use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::fmt;

/// Half-open range of char offsets into the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    RuntimeError,
}

#[derive(Debug, Clone)]
pub struct LoxError {
    pub kind: ErrorKind,
    pub span: Span,
    pub line: usize,
    pub message: String,
    /// Lexeme the error points at; `None` for end of input or lexical errors.
    pub at: Option<String>,
    pub help: Option<String>,
}

impl LoxError {
    pub fn new(kind: ErrorKind, span: Span, line: usize, message: String) -> Self {
        Self {
            kind,
            span,
            line,
            message,
            at: None,
            help: None,
        }
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    pub fn at_lexeme(mut self, lexeme: &str) -> Self {
        self.at = Some(lexeme.to_string());
        self
    }

    pub fn lex_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::LexError, span, line, message)
    }

    pub fn parse_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::ParseError, span, line, message)
    }

    pub fn parse_error_with_help(span: Span, line: usize, message: String, help: String) -> Self {
        Self::parse_error(span, line, message).with_help(help)
    }

    pub fn runtime_error(span: Span, line: usize, message: String) -> Self {
        Self::new(ErrorKind::RuntimeError, span, line, message)
    }

    pub fn runtime_error_with_help(span: Span, line: usize, message: String, help: String) -> Self {
        Self::runtime_error(span, line, message).with_help(help)
    }

    /// Where the error sits, in the classic `at 'x'` / `at end` form.
    pub fn location(&self) -> String {
        match (&self.kind, &self.at) {
            (ErrorKind::ParseError, Some(lexeme)) => format!(" at '{}'", lexeme),
            (ErrorKind::ParseError, None) => " at end".to_string(),
            _ => String::new(),
        }
    }

    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");

        let color = match self.kind {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::RuntimeError => Color::Magenta,
        };

        let kind_str = match self.kind {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::RuntimeError => "Runtime Error",
        };

        let mut report_builder = Report::build(ReportKind::Error, filename, self.span.start)
            .with_message(format!(
                "{}{}: {}",
                kind_str.fg(color),
                self.location(),
                self.message
            ))
            .with_label(
                Label::new((filename, self.span.start..self.span.end))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        // A failed write to stderr has nowhere better to go.
        let _ = report_builder
            .finish()
            .eprint((filename, Source::from(source)));
    }
}

impl fmt::Display for LoxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[line {}] Error{}: {}", self.line, self.location(), self.message)
    }
}

impl std::error::Error for LoxError {}

/// Sink for lexical and syntax diagnostics. Reporting never aborts the caller.
pub trait Reporter {
    fn report(&mut self, error: LoxError);
}

/// Collects every reported diagnostic in order.
#[derive(Debug, Default)]
pub struct Diagnostics {
    errors: Vec<LoxError>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn errors(&self) -> &[LoxError] {
        &self.errors
    }

    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }

    pub fn report_all(&self, source: &str, filename: Option<&str>) {
        for error in &self.errors {
            error.report(source, filename);
        }
    }
}

impl Reporter for Diagnostics {
    fn report(&mut self, error: LoxError) {
        log::debug!("diagnostic: {}", error);
        self.errors.push(error);
    }
}
