use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use cmm::error::CmmError;
use cmm::runner::{self, DEFAULT_BATCH_COUNT};
use std::path::{Path, PathBuf};
use std::process;
use tracing::Level;

fn main() {
    let matches = Command::new("cmm")
        .about("Interpreter for the cmm language")
        .arg(
            Arg::new("file")
                .help("The source file to interpret")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required_unless_present("batch")
                .index(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the final value to this file instead of stdout")
                .value_name("PATH")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("batch")
                .long("batch")
                .help("Interpret exampleN.cmm into outputN.txt inside DIR")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf))
                .conflicts_with_all(["file", "output"]),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .help("Number of examples visited by --batch")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .requires("batch"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count),
        )
        .get_matches();

    init_logging(matches.get_count("verbose"));

    let code = if let Some(dir) = matches.get_one::<PathBuf>("batch") {
        run_batch(dir, &matches)
    } else if let Some(file) = matches.get_one::<PathBuf>("file") {
        match run_file(file, matches.get_one::<PathBuf>("output")) {
            Ok(()) => 0,
            Err(error) => {
                error.report();
                error.code()
            }
        }
    } else {
        0
    };

    process::exit(code);
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run_file(path: &Path, output: Option<&PathBuf>) -> Result<(), CmmError> {
    match output {
        Some(output) => runner::interpret(path, output).map(|_| ()),
        None => {
            let code = runner::read_source(path)?;
            runner::interpret_to_stdout(&code, path)?;
            println!();
            Ok(())
        }
    }
}

fn run_batch(dir: &Path, matches: &ArgMatches) -> i32 {
    let count = matches
        .get_one::<usize>("count")
        .copied()
        .unwrap_or(DEFAULT_BATCH_COUNT);

    let mut status = 0;
    for entry in runner::run_batch(dir, count) {
        match entry.result {
            Ok(bytes) => println!(
                "{} -> {} ({} bytes)",
                entry.source.display(),
                entry.output.display(),
                bytes
            ),
            Err(error) => {
                error.report();
                status = error.code();
            }
        }
    }
    status
}
