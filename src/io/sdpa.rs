//! Writer for the sparse SDPA format.
//!
//! The format holds a semidefinite program with free scalar variables
//! only, so everything but the objective, the semidefinite constraint
//! blocks and the integrality markers is rejected up front.

use super::{open_writer, FileError, ProblemWriter};
use crate::floats::FloatT;
use crate::problem::{Cone, ObjSense, ProblemData};
use itertools::izip;
use std::io::Write;
use std::path::Path;

/// Writes a problem in the sparse SDPA format.  Entries of the
/// semidefinite constraints change side relative to the conic form, so
/// constant terms are negated on output.
pub fn write_sdpa<T: FloatT>(mut writer: impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    if data.mapnum() >= 1 {
        return Err(FileError::Unsupported(
            "scalar map constraints are not supported in the selected output file format".into(),
        ));
    }
    if data.var.cones.iter().any(|&cone| cone != Cone::Free) {
        return Err(FileError::Unsupported(
            "non-free scalar variables are not supported in the selected output file format"
                .into(),
        ));
    }
    if data.objsense == ObjSense::Maximize {
        return Err(FileError::Unsupported(
            "maximization problems are not supported in the selected output file format".into(),
        ));
    }
    if data.objb != T::zero() {
        return Err(FileError::Unsupported(
            "a non-zero constant in the objective function is not supported in the selected \
             output file format"
                .into(),
        ));
    }
    if data.psdvarnum() >= 1 {
        return Err(FileError::Unsupported(
            "positive semidefinite variables are not supported in the selected output file format"
                .into(),
        ));
    }

    let w = &mut writer;

    writeln!(w, "{}", data.varnum())?;

    writeln!(w, "{}", data.psdmapnum())?;
    for dim in &data.psdcon_dims {
        write!(w, "{dim} ")?;
    }
    writeln!(w)?;

    if data.varnum() >= 1 {
        let mut c = vec![T::zero(); data.varnum()];
        for (&j, &v) in std::iter::zip(&data.obja.subi, &data.obja.val) {
            c[j] = v;
        }
        for v in &c {
            write!(w, "{v} ")?;
        }
        writeln!(w)?;
    }

    let d = &data.d;
    for (&i, &k, &l, &v) in izip!(&d.subi, &d.subk, &d.subl, &d.val) {
        writeln!(w, "0 {} {} {} {}", i + 1, k + 1, l + 1, -v)?;
    }

    let h = &data.h;
    for (&i, &j, &k, &l, &v) in izip!(&h.subi, &h.subj, &h.subk, &h.subl, &h.val) {
        writeln!(w, "{} {} {} {} {}", j + 1, i + 1, k + 1, l + 1, v)?;
    }

    if !data.int_vars.is_empty() {
        writeln!(w, "*INTEGER*")?;
        for subj in &data.int_vars {
            writeln!(w, "*{subj}")?;
        }
    }

    Ok(())
}

/// Sparse SDPA format writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdpaWriter;

impl ProblemWriter for SdpaWriter {
    fn name(&self) -> &'static str {
        "sdpa"
    }
    fn extension(&self) -> &'static str {
        "dat-s"
    }
    fn write_file(&self, path: &Path, data: &ProblemData<f64>) -> Result<(), FileError> {
        let mut writer = open_writer(path)?;
        write_sdpa(&mut writer, data)?;
        Ok(writer.flush()?)
    }
}

// -------------
// testing
// -------------
