//! RV32 guest memory CLI.
//!
//! This binary loads a program image into a fresh address space and shows what landed where.
//! It performs:
//! 1. **ELF load:** Reads `.text`/`.data`, sizes the space with the layout planner and loads both.
//! 2. **Raw load:** Places a flat binary at a load address in a space of configured geometry.
//! 3. **Inspection:** Prints a bounded hex dump (`dump`) or a word view (`words`).

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use rv32mem_core::common::LoaderError;
use rv32mem_core::config::{Config, ConfigError};
use rv32mem_core::diag::TracingSink;
use rv32mem_core::inspect::{dump, word_rows};
use rv32mem_core::loader::{
    MemoryLayout, ProgramImage, ProgramLoadReport, load_binary, load_program, read_elf,
};
use rv32mem_core::{AddressSpace, MemoryError};

#[derive(Parser, Debug)]
#[command(
    name = "rv32mem",
    author,
    version,
    about = "Load an RV32 program image and inspect guest memory",
    long_about = "Load an RV32 ELF executable or raw binary into a fresh address space and print its contents.\n\nDiagnostics go to stderr; set RUST_LOG=info to see every load.\n\nExamples:\n  rv32mem dump --elf program.elf\n  rv32mem dump --bin boot.bin --base 0x80000000 --size 65536 --max-lines 8\n  rv32mem words --elf program.elf --start 0x10000 --count 8"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a hex dump of a range of the loaded address space.
    Dump {
        #[command(flatten)]
        source: Source,

        /// First address to dump (defaults to the base of the space).
        #[arg(long, value_parser = parse_addr)]
        start: Option<u32>,

        /// Exclusive end address (defaults to the end of the space).
        #[arg(long, value_parser = parse_end)]
        end: Option<u64>,

        /// Maximum number of lines to print (defaults to the config value).
        #[arg(long)]
        max_lines: Option<usize>,
    },

    /// Print consecutive words of the loaded address space.
    Words {
        #[command(flatten)]
        source: Source,

        /// Address of the first word (defaults to the entry point).
        #[arg(long, value_parser = parse_addr)]
        start: Option<u32>,

        /// Number of words to print.
        #[arg(long, default_value_t = 16)]
        count: usize,
    },
}

/// Program image and address space geometry.
#[derive(Args, Debug)]
struct Source {
    #[command(flatten)]
    input: Input,

    /// Load address of a raw binary (defaults to the base of the space).
    #[arg(long, value_parser = parse_addr, requires = "bin")]
    load_addr: Option<u32>,

    /// Base virtual address of the space for a raw binary.
    #[arg(long, value_parser = parse_addr, requires = "bin")]
    base: Option<u32>,

    /// Size of the space in bytes for a raw binary.
    #[arg(long, requires = "bin")]
    size: Option<usize>,

    /// JSON configuration file.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false)]
struct Input {
    /// RV32 ELF executable.
    #[arg(long)]
    elf: Option<PathBuf>,

    /// Raw binary image.
    #[arg(long)]
    bin: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Loader(#[from] LoaderError),
    #[error(transparent)]
    Memory(#[from] MemoryError),
    #[error("one of --elf or --bin is required")]
    NoInput,
}

/// A loaded address space and how it got that way.
struct Session {
    space: AddressSpace,
    report: ProgramLoadReport,
    config: Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(?cli, "parsed arguments");

    let result = match cli.command {
        Commands::Dump {
            source,
            start,
            end,
            max_lines,
        } => cmd_dump(&source, start, end, max_lines),
        Commands::Words {
            source,
            start,
            count,
        } => cmd_words(&source, start, count),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Loads the source and prints the dump. Returns `false` if a section failed to load.
fn cmd_dump(
    source: &Source,
    start: Option<u32>,
    end: Option<u64>,
    max_lines: Option<usize>,
) -> Result<bool, CliError> {
    let session = open(source)?;
    let space = &session.space;
    let start = start.unwrap_or(space.base_vaddr());
    let end = end.unwrap_or(space.end_vaddr());
    let max_lines = max_lines.unwrap_or(session.config.inspector.max_lines);

    print_reports(&session);
    print!("{}", dump(space, start, end, max_lines)?);
    Ok(session.report.first_error().is_none())
}

/// Loads the source and prints the word view. Returns `false` if a section failed to load.
fn cmd_words(source: &Source, start: Option<u32>, count: usize) -> Result<bool, CliError> {
    let session = open(source)?;
    let start = start.unwrap_or(session.report.entry.val());

    print_reports(&session);
    for row in word_rows(&session.space, start, count) {
        println!("{row}");
    }
    Ok(session.report.first_error().is_none())
}

/// Reads the image, builds the address space and loads the image into it.
fn open(source: &Source) -> Result<Session, CliError> {
    let config = match &source.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let sink = Arc::new(TracingSink);

    let (mut space, image) = match (&source.input.elf, &source.input.bin) {
        (Some(path), _) => {
            let image = read_elf(path)?;
            let layout = MemoryLayout::for_image(&image, config.memory.stack_size)?;
            println!(
                "[*] {}: base {:#010x}, {} bytes, initial sp {:#010x}",
                path.display(),
                layout.base.val(),
                layout.size,
                layout.initial_sp()
            );
            (layout.create_space(sink)?, image)
        }
        (None, Some(path)) => {
            let mut memory = config.memory.clone();
            if let Some(base) = source.base {
                memory.base_vaddr = base;
            }
            if let Some(size) = source.size {
                memory.size = size;
            }
            let load_addr = source.load_addr.unwrap_or(memory.base_vaddr);
            let image = ProgramImage::from_raw(load_binary(path)?, load_addr);
            println!(
                "[*] {}: base {:#010x}, {} bytes",
                path.display(),
                memory.base_vaddr,
                memory.size
            );
            (memory.build(sink)?, image)
        }
        (None, None) => return Err(CliError::NoInput),
    };

    let report = load_program(&mut space, &image);
    Ok(Session {
        space,
        report,
        config,
    })
}

fn print_reports(session: &Session) {
    let sections = [(".data", &session.report.data), (".text", &session.report.text)];
    for (name, result) in sections {
        match result {
            Some(Ok(report)) => println!("    {name}: {report}"),
            Some(Err(e)) => println!("    {name}: failed: {e}"),
            None => {}
        }
    }
    println!("    entry: {}", session.report.entry);
    println!();
}

/// Parses a decimal or `0x`-prefixed hexadecimal address.
fn parse_addr(s: &str) -> Result<u32, String> {
    let addr = parse_end(s)?;
    u32::try_from(addr).map_err(|_| format!("address '{s}' exceeds 32 bits"))
}

/// Parses an exclusive end address, which may be 2^32.
fn parse_end(s: &str) -> Result<u64, String> {
    let s = s.replace('_', "");
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    match parsed {
        Ok(addr) if addr <= 1 << 32 => Ok(addr),
        Ok(_) => Err(format!("address '{s}' is past the 32-bit range")),
        Err(e) => Err(format!("invalid address '{s}': {e}")),
    }
}
