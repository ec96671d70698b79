use ariadne::{Color, Config, Fmt, Label, Report, ReportKind, Source};
use std::fmt;
use std::io;
use std::ops::Range;
use std::path::PathBuf;
use thiserror::Error;

/// Half-open range of character offsets into the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    fn clamped(self, len: usize) -> Range<usize> {
        let start = self.start.min(len);
        let end = self.end.clamp(start, len);
        start..end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    RuntimeError,
}

impl ErrorKind {
    fn color(self) -> Color {
        match self {
            ErrorKind::LexError => Color::Red,
            ErrorKind::RuntimeError => Color::Magenta,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::RuntimeError => "Runtime Error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticLabel {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
}

/// A source-anchored report. The interpreter core never produces these; the
/// driver builds one when a program ends without a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub labels: Vec<DiagnosticLabel>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            labels: Vec::new(),
            help: None,
        }
    }

    pub fn with_label(mut self, kind: ErrorKind, span: Span, message: String) -> Self {
        self.labels.push(DiagnosticLabel {
            kind,
            span,
            message,
        });
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    fn build<'a>(
        &self,
        source: &str,
        filename: &'a str,
        colored: bool,
    ) -> Report<'a, (&'a str, Range<usize>)> {
        let len = source.chars().count();
        let color = self.kind.color();
        let heading = if colored {
            format!("{}: {}", self.kind.as_str().fg(color), self.message)
        } else {
            format!("{}: {}", self.kind.as_str(), self.message)
        };

        let mut builder = Report::build(ReportKind::Error, filename, self.span.start.min(len))
            .with_config(Config::default().with_color(colored))
            .with_message(heading);

        for label in &self.labels {
            builder = builder.with_label(
                Label::new((filename, label.span.clamped(len)))
                    .with_message(&label.message)
                    .with_color(label.kind.color()),
            );
        }

        if let Some(ref help_text) = self.help {
            builder = builder.with_help(help_text);
        }

        builder.finish()
    }

    /// Prints the report to stderr.
    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<input>");
        if let Err(error) = self
            .build(source, filename, true)
            .eprint((filename, Source::from(source)))
        {
            eprintln!("{}: {}", self.message, error);
        }
    }

    /// Renders the report without color.
    pub fn render(&self, source: &str, filename: Option<&str>) -> String {
        let filename = filename.unwrap_or("<input>");
        let mut buffer = Vec::new();
        if self
            .build(source, filename, false)
            .write((filename, Source::from(source)), &mut buffer)
            .is_err()
        {
            return self.message.clone();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Failures surfaced by the file driver.
#[derive(Debug, Error)]
pub enum CmmError {
    #[error("source file '{}' not found", .path.display())]
    NotFound { path: PathBuf },
    #[error("{} is not a regular file", .path.display())]
    NotRegularFile { path: PathBuf },
    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("'{}' produced no value", .path.display())]
    NoValue {
        path: PathBuf,
        text: String,
        diagnostic: Diagnostic,
    },
}

impl CmmError {
    /// Process exit status for this failure.
    pub fn code(&self) -> i32 {
        match self {
            CmmError::NoValue { .. } => 1,
            CmmError::NotFound { .. } => 2,
            CmmError::NotRegularFile { .. } => 3,
            CmmError::Read { .. } => 4,
            CmmError::Write { .. } => 5,
        }
    }

    pub fn report(&self) {
        match self {
            CmmError::NoValue {
                path,
                text,
                diagnostic,
            } => diagnostic.report(text, path.to_str()),
            other => eprintln!("{}: {}", "error".fg(Color::Red), other),
        }
    }
}
