use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use minic2py::{compile_with, Options};

/// Translate a C-subset source file into Python 3.
#[derive(Parser, Debug)]
#[command(name = "minic2py", version, about)]
struct Args {
    /// C source file to translate.
    input: PathBuf,

    /// Output path (defaults to the input path with a `.py` extension).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Spaces per indentation level.
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Function that gets an `if __name__ == "__main__":` call.
    #[arg(long, default_value = "main")]
    entry: String,

    /// Emit `//` for `/` (integer division).
    #[arg(long)]
    floor_division: bool,

    /// Do not emit the generated-file header.
    #[arg(long)]
    no_header: bool,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let src = match fs::read_to_string(&args.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read input file {}: {e}", args.input.display());
            process::exit(2);
        }
    };

    let options = Options {
        indent_width: args.indent,
        entry_point: args.entry.clone(),
        floor_division: args.floor_division,
        emit_header: !args.no_header,
    };
    debug!(?options, input = %args.input.display(), "compiling");

    let python = match compile_with(&src, &options) {
        Ok(code) => code,
        Err(e) => {
            error!(code = e.code(), "compile failed");
            eprintln!("Compilation error: {e}");
            process::exit(1);
        }
    };

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("py"));
    if output == args.input {
        eprintln!("Refusing to overwrite input file {}", output.display());
        process::exit(2);
    }
    if let Err(e) = fs::write(&output, python) {
        eprintln!("Failed to write output file {}: {e}", output.display());
        process::exit(2);
    }

    println!(
        "Successfully compiled {} to {}",
        args.input.display(),
        output.display()
    );
}

/// 日志写到 stderr；`RUST_LOG` 优先，其次由 `-v` 决定级别。
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("minic2py={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
