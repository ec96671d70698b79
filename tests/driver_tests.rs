// File driver tests: real files under a per-test temporary directory.

use cmm::error::{CmmError, ErrorKind};
use cmm::runner::{interpret, interpret_source, read_source, run_batch, DEFAULT_BATCH_COUNT};
use std::fs;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Temporary directory removed on drop.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new() -> Self {
        let dir = std::env::temp_dir().join(format!("cmm-test-{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        Self { dir }
    }

    fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.join(name);
        fs::write(&path, contents).expect("write scratch file");
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read output")
}

#[test]
fn interpret_writes_value_without_newline() {
    let scratch = Scratch::new();
    let src = scratch.write("program.cmm", "x = 2\ny = 3\nprint x + y * 4\n");
    let dst = scratch.path("out.txt");

    let written = interpret(&src, &dst).expect("interpret");

    assert_eq!(written, 2);
    assert_eq!(read(&dst), "14");
}

#[test]
fn interpret_truncates_existing_output() {
    let scratch = Scratch::new();
    let src = scratch.write("program.cmm", "print 7 % 3\n");
    let dst = scratch.write("out.txt", "previous contents that are longer");

    interpret(&src, &dst).expect("interpret");
    assert_eq!(read(&dst), "1");
}

#[test]
fn missing_source_is_not_found_and_creates_no_output() {
    let scratch = Scratch::new();
    let dst = scratch.path("out.txt");

    let error = interpret(&scratch.path("absent.cmm"), &dst).unwrap_err();

    assert!(matches!(error, CmmError::NotFound { .. }));
    assert_eq!(error.code(), 2);
    assert!(!dst.exists());
}

#[test]
fn directory_source_is_not_a_regular_file() {
    let scratch = Scratch::new();
    let nested = scratch.path("nested");
    fs::create_dir(&nested).expect("create nested dir");

    let error = interpret(&nested, &scratch.path("out.txt")).unwrap_err();

    assert!(matches!(error, CmmError::NotRegularFile { .. }));
    assert!(error.to_string().ends_with("is not a regular file"));
    assert_eq!(error.code(), 3);
}

#[test]
fn invalid_utf8_source_is_a_read_error() {
    let scratch = Scratch::new();
    let src = scratch.path("bad.cmm");
    fs::write(&src, [0x70, 0xff, 0x0a]).expect("write scratch file");
    let dst = scratch.path("out.txt");

    let error = interpret(&src, &dst).unwrap_err();

    assert!(matches!(error, CmmError::Read { .. }));
    assert!(error.to_string().starts_with("failed to read"));
    assert_eq!(error.code(), 4);
    assert!(!dst.exists());
}

#[test]
fn unwritable_destination_is_a_write_error() {
    let scratch = Scratch::new();
    let src = scratch.write("program.cmm", "print 1\n");
    let dst = scratch.path("missing-dir").join("out.txt");

    let error = interpret(&src, &dst).unwrap_err();

    assert!(matches!(error, CmmError::Write { .. }));
    assert_eq!(error.code(), 5);
}

#[test]
fn program_without_value_leaves_empty_output() {
    let scratch = Scratch::new();
    let src = scratch.write("program.cmm", "x = 1\n");
    let dst = scratch.path("out.txt");

    let error = interpret(&src, &dst).unwrap_err();

    match &error {
        CmmError::NoValue {
            text, diagnostic, ..
        } => {
            assert_eq!(text, "x = 1\n");
            assert_eq!(diagnostic.kind, ErrorKind::RuntimeError);
            assert_eq!(diagnostic.span, cmm::Span::new(0, 1));
        }
        other => panic!("expected NoValue, got {:?}", other),
    }
    assert_eq!(error.code(), 1);
    assert_eq!(read(&dst), "");
}

#[test]
fn no_value_diagnostic_labels_illegal_characters() {
    let mut out = Vec::new();
    let code = "x = 1 $\ny = x ?\n";
    let error = interpret_source(code, Path::new("bad.cmm"), &mut out).unwrap_err();

    let CmmError::NoValue { diagnostic, .. } = error else {
        panic!("expected NoValue");
    };

    let illegal: Vec<(usize, usize)> = diagnostic
        .labels
        .iter()
        .filter(|label| label.kind == ErrorKind::LexError)
        .map(|label| (label.span.start, label.span.end))
        .collect();
    assert_eq!(illegal, vec![(6, 7), (14, 15)]);
    assert!(diagnostic.help.is_some());

    let report = diagnostic.render(code, Some("bad.cmm"));
    assert!(report.contains("program produced no value"));
    assert!(report.contains("bad.cmm"));
    assert!(out.is_empty());
}

#[test]
fn empty_program_diagnostic_renders() {
    let mut out = Vec::new();
    let error = interpret_source("", Path::new("empty.cmm"), &mut out).unwrap_err();

    let CmmError::NoValue { diagnostic, .. } = error else {
        panic!("expected NoValue");
    };
    assert!(diagnostic.labels.is_empty());
    assert!(diagnostic.render("", None).contains("program produced no value"));
}

#[test]
fn interpret_source_writes_to_any_writer() {
    let mut out = Vec::new();
    let written = interpret_source(
        "x = 0\nwhile (x < 5) { x = x + 1 }\nprint x\n",
        Path::new("<memory>"),
        &mut out,
    )
    .expect("interpret");

    assert_eq!(written, 1);
    assert_eq!(out, b"5");
}

#[test]
fn read_source_returns_file_contents() {
    let scratch = Scratch::new();
    let src = scratch.write("program.cmm", "print 1\n");
    assert_eq!(read_source(&src).expect("read"), "print 1\n");
}

#[test]
fn batch_runs_each_example_and_continues_past_failures() {
    let scratch = Scratch::new();
    scratch.write("example1.cmm", "print (2 + 3) * 4\n");
    scratch.write("example2.cmm", "x = 1\n");
    scratch.write("example3.cmm", "print 1 && 1 || 0\n");

    let entries = run_batch(&scratch.dir, 4);

    assert_eq!(entries.len(), 4);
    assert!(matches!(entries[0].result, Ok(2)));
    assert!(matches!(entries[1].result, Err(CmmError::NoValue { .. })));
    assert!(matches!(entries[2].result, Ok(1)));
    assert!(matches!(entries[3].result, Err(CmmError::NotFound { .. })));

    assert_eq!(read(&scratch.path("output1.txt")), "20");
    assert_eq!(read(&scratch.path("output3.txt")), "1");
    assert_eq!(entries[3].output, scratch.path("output4.txt"));
    assert!(!entries[3].output.exists());
}

#[test]
fn default_batch_visits_six_examples() {
    let scratch = Scratch::new();
    let entries = run_batch(&scratch.dir, DEFAULT_BATCH_COUNT);

    let names: Vec<String> = entries
        .iter()
        .filter_map(|entry| entry.source.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "example1.cmm",
            "example2.cmm",
            "example3.cmm",
            "example4.cmm",
            "example5.cmm",
            "example6.cmm",
        ]
    );
}

#[test]
fn bundled_demos_produce_reference_outputs() {
    let scratch = Scratch::new();
    let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos");
    for n in 1..=DEFAULT_BATCH_COUNT {
        let name = format!("example{n}.cmm");
        fs::copy(demos.join(&name), scratch.path(&name)).expect("copy demo");
    }

    let entries = run_batch(&scratch.dir, DEFAULT_BATCH_COUNT);
    let outputs: Vec<String> = entries
        .iter()
        .map(|entry| {
            assert!(entry.result.is_ok(), "{:?} failed", entry.source);
            read(&entry.output)
        })
        .collect();

    assert_eq!(outputs, vec!["14", "20", "5", "1", "1", "1"]);
}
