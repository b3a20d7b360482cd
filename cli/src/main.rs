use std::io::Write;

use clap::{Parser, ValueEnum};
use ebpf_asm::{AsmError, Assembled, Assembler, AssemblerOptions, Program, Register};
use ebpf_asm_core::samples;
use miette::{Diagnostic, Result};
use thiserror::Error;
use tracing::info;

/// ebpf-asm - Assemble eBPF programs from instruction graphs
#[derive(Parser, Debug)]
#[command(name = "ebpf-asm")]
#[command(about = "Assemble a bundled eBPF sample program", long_about = None)]
struct Args {
    /// Program to assemble
    #[arg(long, value_enum, default_value_t = Sample::MapLookup)]
    sample: Sample,

    /// Output format
    #[arg(long, value_enum, default_value_t = Format::Hex)]
    format: Format,

    /// Map key looked up by the map-lookup sample
    #[arg(long, default_value_t = 0)]
    key: i32,

    /// Bytes copied by the skb-load sample
    #[arg(long, default_value_t = 16)]
    length: i32,

    /// Array name for the c-array format
    #[arg(long, default_value = "prog")]
    name: String,

    /// Fail if the program has more instructions than this
    #[arg(long)]
    max_instructions: Option<usize>,

    /// Accept branches whose false continuation is shorter than their offset
    #[arg(long)]
    no_verify: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Sample {
    MapLookup,
    SkbLoad,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Format {
    /// One instruction word per line
    Hex,
    /// One C macro per line
    Macros,
    /// A `struct bpf_insn` initializer
    CArray,
    /// Raw little-endian bytes, as the kernel loader reads them
    Bytes,
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error("failed to assemble {sample:?}")]
    #[diagnostic(
        code(ebpf_asm::assemble),
        help("set RUST_LOG=debug to trace each assembly phase")
    )]
    Assemble {
        sample: Sample,
        #[source]
        source: AsmError,
    },

    #[error("failed to write output")]
    #[diagnostic(code(ebpf_asm::io))]
    Io(#[from] std::io::Error),
}

fn assemble(args: &Args) -> Result<Assembled, AsmError> {
    let mut program = Program::new();
    let root = match args.sample {
        Sample::MapLookup => samples::map_lookup(&mut program, Register::R1, args.key)?,
        Sample::SkbLoad => samples::skb_load(&mut program, args.length)?,
    };

    let defaults = AssemblerOptions::default();
    let options = AssemblerOptions {
        max_instructions: args.max_instructions.unwrap_or(defaults.max_instructions),
        verify_false_branch_sizes: !args.no_verify,
    };
    Assembler::new(options).assemble(&mut program, root, &mut ())
}

fn write_output(assembled: &Assembled, args: &Args) -> std::io::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match args.format {
        Format::Hex => {
            for (index, word) in assembled.words.iter().enumerate() {
                writeln!(out, "{:4}: {:016x}", index, word)?;
            }
        }
        Format::Macros => {
            for line in &assembled.listing {
                writeln!(out, "{}", line)?;
            }
        }
        Format::CArray => write!(out, "{}", assembled.c_array(&args.name))?,
        Format::Bytes => out.write_all(&assembled.to_bytes())?,
    }
    out.flush()
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to WARN if not set
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_default();

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let assembled = assemble(&args).map_err(|source| CliError::Assemble {
        sample: args.sample,
        source,
    })?;
    info!(
        sample = ?args.sample,
        instructions = assembled.instruction_count,
        "assembled sample"
    );

    write_output(&assembled, &args).map_err(CliError::from)?;
    Ok(())
}
