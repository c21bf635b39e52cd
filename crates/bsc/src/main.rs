//! BSC - BrighterScript compiler front end
//!
//! Usage: bsc [OPTIONS] <FILES>...

use anyhow::Result;
use bsc_compiler::common::Severity;
use bsc_compiler::frontend::FrontendConfig;
use bsc_compiler::driver::{Program, ProgramConfig};
use clap::Parser as ClapParser;
use std::path::PathBuf;
use std::process;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(ClapParser, Debug)]
#[command(name = "bsc")]
#[command(author = "BSC Team")]
#[command(version = "0.1.0")]
#[command(about = "Parse and validate BrighterScript source files", long_about = None)]
struct Args {
    /// Source files (.bs, .brs, .d.bs)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Dump tokens (for debugging)
    #[arg(long)]
    dump_tokens: bool,

    /// Dump AST (for debugging)
    #[arg(long)]
    dump_ast: bool,

    /// Dump symbol tables after validation
    #[arg(long)]
    dump_symbols: bool,

    /// Verbose output (debug logging unless RUST_LOG says otherwise)
    #[arg(short, long)]
    verbose: bool,

    /// Drop diagnostics with this code (repeatable)
    #[arg(long = "ignore-code", value_name = "CODE")]
    ignore_codes: Vec<u32>,

    /// Report diagnostics with this code as warnings (repeatable)
    #[arg(long = "warn-code", value_name = "CODE")]
    warn_codes: Vec<u32>,

    /// Exit with failure on warnings too
    #[arg(long)]
    warnings_as_errors: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Respects RUST_LOG; --verbose only changes the default
    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .init();

    let failed = run(&args)?;
    if failed {
        process::exit(1);
    }
    Ok(())
}

/// Returns whether the run should fail
fn run(args: &Args) -> Result<bool> {
    let config = ProgramConfig {
        frontend: FrontendConfig {
            dump_tokens: args.dump_tokens,
            dump_ast: args.dump_ast,
            dump_symbols: args.dump_symbols,
        },
        ignore_codes: args.ignore_codes.clone(),
        warning_codes: args.warn_codes.clone(),
    };
    let mut program = Program::new(config);

    let mut parse_failures = 0;
    for path in &args.files {
        debug!("loading {}", path.display());
        if let Err(e) = program.load_file(path) {
            // Syntax errors were already rendered; I/O errors were not
            if matches!(e, bsc_compiler::CompileError::Io(_)) {
                eprintln!("error: {}: {}", path.display(), e);
            }
            parse_failures += 1;
        }
    }

    program.validate();
    let diagnostics = program.diagnostics();
    program.report(&diagnostics);

    let errors = diagnostics.iter().filter(|d| d.severity == Severity::Error).count();
    let warnings = diagnostics.iter().filter(|d| d.severity == Severity::Warning).count();
    info!(
        files = program.files().len(),
        errors,
        warnings,
        parse_failures,
        "validation finished"
    );

    if args.verbose {
        eprintln!(
            "Validated {} file(s): {} error(s), {} warning(s)",
            program.files().len(),
            errors + parse_failures,
            warnings
        );
    }

    Ok(parse_failures > 0 || errors > 0 || (args.warnings_as_errors && warnings > 0))
}
