//! The `mcc` command-line interface.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use mcc_drv::{Config, Session};
use mcc_ir::OptLevel;

/// Mini-C compiler targeting x86-64 System V assembly.
#[derive(Parser, Debug)]
#[command(name = "mcc")]
#[command(version)]
#[command(about = "Compile Mini-C source to x86-64 assembly", long_about = None)]
struct Cli {
    /// Input source file.
    input: PathBuf,

    /// Output assembly file.
    output: PathBuf,

    /// Optimization level (0-3).
    #[arg(short = 'O', value_name = "LEVEL", default_value_t = 2,
          value_parser = clap::value_parser!(u8).range(0..=3))]
    opt: u8,

    /// Suppress the phase-by-phase diagnostic output.
    #[arg(short, long)]
    quiet: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    SimpleLogger::new().with_level(level).init()?;

    let opt_level = match cli.opt {
        0 => OptLevel::None,
        1 => OptLevel::O1,
        2 => OptLevel::O2,
        _ => OptLevel::O3,
    };

    let session = Session::new(Config {
        input: cli.input,
        output: cli.output,
        opt_level,
        quiet: cli.quiet,
    });
    session.compile()?;
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        process::exit(1);
    }
}
