//! CLI tool to run pipeline (.pipe) files against employee data.
//!
//! Usage:
//!   stream-run <pipeline.pipe> <input.data>
//!   stream-run <pipeline.pipe> <input.data> -o <output.data>
//!
//! If no output file is specified, writes to stdout.

use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use clap::Parser;
use streams_rs::{PipelineError, execute_pipeline};

/// Run a pipeline file against employee input data.
#[derive(Parser)]
#[command(name = "stream-run", version)]
struct Args {
    /// Pipeline definition file (.pipe)
    pipeline: PathBuf,

    /// Input data file (one `name age salary status` record per line)
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), PipelineError> {
    let pipeline_text = fs::read_to_string(&args.pipeline)?;
    let input_text = fs::read_to_string(&args.input)?;

    let (output, input_count, output_count) = execute_pipeline(&input_text, &pipeline_text)?;

    if let Some(out_path) = &args.output {
        if let Some(parent) = out_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(out_path, &output)?;
        eprintln!(
            "Processed {} -> {} records, output: {}",
            input_count,
            output_count,
            out_path.display()
        );
    } else {
        let mut stdout = io::stdout();
        stdout.write_all(output.as_bytes())?;
        if !output.is_empty() && !output.ends_with('\n') {
            writeln!(stdout)?;
        }
        eprintln!("Processed {} -> {} records", input_count, output_count);
    }

    Ok(())
}
