//! File format support: the CBF interchange format, solver specific
//! output formats, and the processing pipeline tying readers, writers
//! and transformations together.

mod cbf;
#[cfg(feature = "serde")]
mod json;
mod mps;
mod sdpa;

pub use cbf::{read_cbf, write_cbf, CbfReader, CbfWriter, CBF_VERSION};
pub use mps::{MpsCplexWriter, MpsMosekWriter};
pub use sdpa::{write_sdpa, SdpaWriter};

use crate::problem::{DataError, ProblemData};
use crate::transforms::{ProblemTransform, Transform, TransformParams};
use enum_dispatch::enum_dispatch;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type returned by file reading and writing operations.
#[derive(Error, Debug)]
pub enum FileError {
    /// Underlying stream or filesystem failure
    #[error("IO failure: {0}")]
    Io(#[from] std::io::Error),
    /// Input text that does not parse, with its 1-based line number
    #[error("parse failure at line {line}: {message}")]
    Parse { line: usize, message: String },
    /// Structurally invalid model
    #[error("invalid problem data: {0}")]
    Data(#[from] DataError),
    /// The model uses features the requested format can not express
    #[error("{0}")]
    Unsupported(String),
}

impl FileError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        FileError::Parse {
            line,
            message: message.into(),
        }
    }
}

// -------------------------------------
// Format registries
// -------------------------------------

/// A named file format reader producing problem data.
#[enum_dispatch]
pub trait ProblemReader {
    /// The name this format is registered under.
    fn name(&self) -> &'static str;

    /// Reads and validates a problem from the file at `path`.
    fn read_file(&self, path: &Path) -> Result<ProblemData<f64>, FileError>;
}

/// A named file format writer consuming problem data.
#[enum_dispatch]
pub trait ProblemWriter {
    /// The name this format is registered under.
    fn name(&self) -> &'static str;

    /// Customary file extension of the format.
    fn extension(&self) -> &'static str;

    /// Writes the problem to the file at `path`.
    fn write_file(&self, path: &Path, data: &ProblemData<f64>) -> Result<(), FileError>;
}

/// Registry of the available input formats.
#[enum_dispatch(ProblemReader)]
#[derive(Debug, Clone, Copy)]
pub enum Frontend {
    Cbf(CbfReader),
}

impl Frontend {
    pub const NAMES: &'static [&'static str] = &["cbf"];

    /// Looks an input format up by its registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cbf" => Some(CbfReader.into()),
            _ => None,
        }
    }
}

/// Registry of the available output formats.
#[enum_dispatch(ProblemWriter)]
#[derive(Debug, Clone, Copy)]
pub enum Backend {
    Cbf(CbfWriter),
    MpsMosek(MpsMosekWriter),
    MpsCplex(MpsCplexWriter),
    Sdpa(SdpaWriter),
}

impl Backend {
    pub const NAMES: &'static [&'static str] = &["cbf", "mps-mosek", "mps-cplex", "sdpa"];

    /// Looks an output format up by its registry name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cbf" => Some(CbfWriter.into()),
            "mps-mosek" => Some(MpsMosekWriter.into()),
            "mps-cplex" => Some(MpsCplexWriter.into()),
            "sdpa" => Some(SdpaWriter.into()),
            _ => None,
        }
    }
}

// -------------------------------------
// Processing pipeline
// -------------------------------------

/// Builds the output file name for a converted input file: the input's
/// directory is replaced by `opath` (or dropped, placing the output in
/// the working directory), a trailing `.gz` and the old extension are
/// stripped, and `postfix` plus the format extension are appended.
pub fn derive_output_path(
    input: &Path,
    opath: Option<&Path>,
    postfix: &str,
    extension: &str,
) -> PathBuf {
    let name = match input.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => String::new(),
    };
    let name = name.strip_suffix(".gz").unwrap_or(&name);
    let stem = match name.rfind('.') {
        Some(pos) => &name[..pos],
        None => name,
    };

    let file = format!("{}{}.{}", stem, postfix, extension);
    match opath {
        Some(dir) => dir.join(file),
        None => PathBuf::from(file),
    }
}

/// Runs the read, cleanup, transform, write pipeline for one file,
/// stopping at the first failing stage.  Progress lines are printed when
/// `verbose` is set.
pub fn process_file(
    frontend: Frontend,
    backend: Backend,
    transform: Transform,
    params: &TransformParams,
    input: &Path,
    output: &Path,
    verbose: bool,
) -> Result<(), FileError> {
    if verbose {
        println!("Reading {}", input.display());
    }
    let mut data = frontend.read_file(input)?;

    params.prepare(&mut data);
    transform.apply(&mut data, params);

    if verbose {
        println!("Writing {}", output.display());
    }
    backend.write_file(output, &data)
}

pub(crate) fn open_reader(path: &Path) -> Result<BufReader<File>, FileError> {
    Ok(BufReader::new(File::open(path)?))
}

pub(crate) fn open_writer(path: &Path) -> Result<BufWriter<File>, FileError> {
    Ok(BufWriter::new(File::create(path)?))
}

// -------------
// testing
// -------------
