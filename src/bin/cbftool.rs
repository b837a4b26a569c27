use clap::Parser;
use conicbench::io::{derive_output_path, process_file, Backend, Frontend, ProblemWriter};
use conicbench::transforms::{Transform, TransformParams};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Converts conic optimization problems between file formats"
)]
struct Cli {
    /// Format of the input files
    #[arg(short = 'i', long = "input-format", default_value = "cbf")]
    input_format: String,

    /// Format of the output files
    #[arg(short = 'o', long = "output-format", default_value = "cbf")]
    output_format: String,

    /// Transformation applied between reading and writing
    #[arg(short = 't', long = "transform", default_value = "none")]
    transform: String,

    /// Directory receiving the output files
    #[arg(long = "opath")]
    opath: Option<PathBuf>,

    /// Postfix appended to output file names
    #[arg(long = "pfix", default_value = "")]
    pfix: String,

    /// Print progress while processing
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Input files to convert
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let frontend = Frontend::from_name(&cli.input_format).ok_or_else(|| {
        format!(
            "unknown input format '{}', expected one of: {}",
            cli.input_format,
            Frontend::NAMES.join(", ")
        )
    })?;
    let backend = Backend::from_name(&cli.output_format).ok_or_else(|| {
        format!(
            "unknown output format '{}', expected one of: {}",
            cli.output_format,
            Backend::NAMES.join(", ")
        )
    })?;
    let transform = Transform::from_name(&cli.transform).ok_or_else(|| {
        format!(
            "unknown transformation '{}', expected one of: {}",
            cli.transform,
            Transform::NAMES.join(", ")
        )
    })?;

    let params = TransformParams::default();

    // remaining files are still processed when one of them fails
    let mut failures = 0usize;
    for file in &cli.files {
        let output = derive_output_path(file, cli.opath.as_deref(), &cli.pfix, backend.extension());
        if let Err(err) = process_file(
            frontend,
            backend,
            transform,
            &params,
            file,
            &output,
            cli.verbose,
        ) {
            eprintln!("Failed to process {}: {err}", file.display());
            failures += 1;
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} files failed", cli.files.len()).into());
    }
    Ok(())
}
