use clap::Parser;
use java_class_parser::classpath::Classpath;
use java_disassembler::error::Error;
use java_disassembler::provider::{ClassPathProvider, TypeProvider};
use java_disassembler::{Disassembler, OutputFormat};
use log::{info, warn, LevelFilter};
use std::io::{stdout, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Disassembles a class found on a classpath into java-like source
#[derive(Debug, Parser)]
struct CliArgs {
    /// The classpath used to find classes, seperated like java's
    classpath: Classpath,
    /// The binary name of the class, like `java.util.ArrayList`
    class: String,
    /// Write plain text instead of html
    #[arg(long)]
    plain: bool,
    /// Write to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Log more, can be repeated
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) -> Result<(), log::SetLoggerError> {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!("[{}] {}: {}", record.level(), record.target(), message))
        })
        .level(level)
        .chain(std::io::stderr())
        .apply()
}

fn run(args: CliArgs) -> Result<(), Error> {
    let format = if args.plain {
        OutputFormat::Plain
    } else {
        OutputFormat::Html
    };
    info!("searching classpath {}", args.classpath);
    let disassembler = Disassembler::with_format(ClassPathProvider::new(args.classpath), format);
    let class = disassembler.provider().lookup(&args.class)?;
    if let Some(source_file) = class.source_file() {
        info!("{} was compiled from {}", class.name(), source_file);
    }
    let disassembly = disassembler.disassemble_class(&class);
    for diagnostic in disassembly.diagnostics() {
        warn!("{}", diagnostic);
    }
    info!("rendered {} members of {}", disassembly.members().count(), args.class);

    let written = match args.output {
        Some(path) => std::fs::write(path, disassembly.text()),
        None => writeln!(stdout().lock(), "{}", disassembly.text()),
    };
    written.map_err(Error::from)
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    if let Err(error) = init_logging(args.verbose) {
        eprintln!("could not start logging: {}", error);
    }
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}
