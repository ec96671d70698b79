use crate::ast::Program;
use crate::error::{CmmError, Diagnostic, ErrorKind, Span};
use crate::evaluator::Evaluator;
use crate::lexer::{Lexer, TokenKind};
use crate::parser;
use crate::value::Value;
use std::fs::{self, File};
use std::io::{self, ErrorKind as IoErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Number of `exampleN.cmm` files a batch run visits by default.
pub const DEFAULT_BATCH_COUNT: usize = 6;

/// Lex, parse and evaluate `source` in a fresh environment.
pub fn run(source: &str) -> Option<Value> {
    let program = parser::parse(source);
    debug!(statements = program.statements.len(), %program, "parsed program");
    Evaluator::new().evaluate_program(&program)
}

/// Interprets `code` and writes the final value's rendering to `out`, without
/// a trailing newline. Returns the number of bytes written. `path` names the
/// source in diagnostics and in write errors.
pub fn interpret_source<W: Write>(
    code: &str,
    path: &Path,
    out: &mut W,
) -> Result<usize, CmmError> {
    let program = parser::parse(code);
    debug!(path = %path.display(), statements = program.statements.len(), %program, "parsed program");

    let rendered = Evaluator::new()
        .evaluate_program(&program)
        .and_then(|value| value.render());

    let Some(rendered) = rendered else {
        return Err(CmmError::NoValue {
            path: path.to_path_buf(),
            text: code.to_string(),
            diagnostic: no_value_diagnostic(code, &program),
        });
    };

    out.write_all(rendered.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|source| CmmError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(rendered.len())
}

/// Reads `src`, evaluates it and writes the result to `dst`.
///
/// The destination is created (or truncated) before evaluation, so it exists
/// but stays empty when the program yields nothing. Nothing is evaluated if
/// either file cannot be opened.
pub fn interpret(src: &Path, dst: &Path) -> Result<usize, CmmError> {
    let code = read_source(src)?;

    let mut destination = File::create(dst).map_err(|source| CmmError::Write {
        path: dst.to_path_buf(),
        source,
    })?;

    let written = interpret_source(&code, src, &mut destination).map_err(|error| match error {
        CmmError::Write { source, .. } => CmmError::Write {
            path: dst.to_path_buf(),
            source,
        },
        other => other,
    })?;
    info!(src = %src.display(), dst = %dst.display(), bytes = written, "interpreted");
    Ok(written)
}

/// Reads a whole source file, rejecting anything that is not a regular file.
pub fn read_source(src: &Path) -> Result<String, CmmError> {
    let metadata = fs::metadata(src).map_err(|source| match source.kind() {
        IoErrorKind::NotFound => CmmError::NotFound {
            path: src.to_path_buf(),
        },
        _ => CmmError::Read {
            path: src.to_path_buf(),
            source,
        },
    })?;

    if !metadata.is_file() {
        return Err(CmmError::NotRegularFile {
            path: src.to_path_buf(),
        });
    }

    fs::read_to_string(src).map_err(|source| CmmError::Read {
        path: src.to_path_buf(),
        source,
    })
}

/// Interprets `code` and prints the value to stdout.
pub fn interpret_to_stdout(code: &str, path: &Path) -> Result<usize, CmmError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    interpret_source(code, path, &mut handle)
}

/// Outcome of one example in a batch run.
#[derive(Debug)]
pub struct BatchEntry {
    pub source: PathBuf,
    pub output: PathBuf,
    pub result: Result<usize, CmmError>,
}

/// Runs `dir/example{n}.cmm` into `dir/output{n}.txt` for `n` in `1..=count`.
/// A failing example is logged and the batch moves on.
pub fn run_batch(dir: &Path, count: usize) -> Vec<BatchEntry> {
    (1..=count)
        .map(|n| {
            let source = dir.join(format!("example{n}.cmm"));
            let output = dir.join(format!("output{n}.txt"));
            let result = interpret(&source, &output);
            if let Err(ref error) = result {
                warn!(source = %source.display(), %error, "example failed");
            }
            BatchEntry {
                source,
                output,
                result,
            }
        })
        .collect()
}

fn no_value_diagnostic(code: &str, program: &Program) -> Diagnostic {
    let span = program
        .statements
        .last()
        .map(|statement| statement.span())
        .unwrap_or_else(|| Span::new(0, code.chars().count()));

    let mut diagnostic = Diagnostic::new(
        ErrorKind::RuntimeError,
        span,
        "program produced no value".to_string(),
    );

    diagnostic = match program.statements.last() {
        Some(statement) => diagnostic.with_label(
            ErrorKind::RuntimeError,
            span,
            format!(
                "statement starting at `{}` evaluates to nothing",
                statement.token().literal.escape_default()
            ),
        ),
        None => diagnostic,
    };

    for token in Lexer::new(code).filter(|token| token.is(TokenKind::Illegal)) {
        diagnostic = diagnostic.with_label(
            ErrorKind::LexError,
            token.span,
            format!("unrecognized character `{}`", token.literal.escape_default()),
        );
    }

    diagnostic.with_help(
        "end the program with `print <expression>`; unknown names, division by zero and \
         malformed expressions all evaluate to nothing"
            .to_string(),
    )
}
