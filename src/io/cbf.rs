use super::{open_reader, open_writer, FileError, ProblemReader, ProblemWriter};
use crate::floats::{AsFloatT, FloatT};
use crate::problem::{
    Cone, ConeStack, MatCoords, ObjSense, ProblemData, PsdCoords, SymCoords, VecCoords,
};
use std::io::{BufRead, Write};
use std::path::Path;
use std::str::FromStr;

/// Version of the conic benchmark format produced on write and the
/// highest version accepted on read.
pub const CBF_VERSION: u32 = 1;

// -------------------------------------
// Reading
// -------------------------------------

// Line source that skips commentary lines and tracks the 1-based line
// number for error reporting.
struct LineSource<R> {
    reader: R,
    line: String,
    number: usize,
}

impl<R: BufRead> LineSource<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            number: 0,
        }
    }

    // advances to the next non-commentary line, false at end of input
    fn advance(&mut self) -> Result<bool, FileError> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(false);
            }
            self.number += 1;
            if !self.line.starts_with('#') {
                return Ok(true);
            }
        }
    }

    // sections may not be cut short by the end of input
    fn expect_line(&mut self) -> Result<(), FileError> {
        if self.advance()? {
            Ok(())
        } else {
            Err(FileError::parse(self.number, "unexpected end of file"))
        }
    }
}

fn parse_field<'a, F: FromStr>(
    fields: &mut impl Iterator<Item = &'a str>,
    line: usize,
) -> Result<F, FileError> {
    let field = fields
        .next()
        .ok_or_else(|| FileError::parse(line, "missing field"))?;
    field
        .parse()
        .map_err(|_| FileError::parse(line, format!("malformed field '{field}'")))
}

fn check_index(index: usize, bound: usize, line: usize) -> Result<(), FileError> {
    if index < bound {
        Ok(())
    } else {
        Err(FileError::parse(line, "coordinate out of range"))
    }
}

/// Reads a problem in the conic benchmark format, delivering a validated
/// model or the first failure with its line number.  Lines starting with
/// `#` are commentary and blank lines between sections are ignored.
pub fn read_cbf<T: FloatT, R: BufRead>(reader: R) -> Result<ProblemData<T>, FileError> {
    let mut src = LineSource::new(reader);
    let mut data = ProblemData::<T>::new();
    let mut version: Option<u32> = None;
    let mut objsense_seen = false;

    while src.advance()? {
        let keyword = match src.line.split_whitespace().next() {
            Some(keyword) => keyword.to_owned(),
            None => continue,
        };

        if version.is_none() {
            if keyword == "VER" {
                version = Some(read_version(&mut src)?);
                continue;
            }
            return Err(FileError::parse(src.number, "first keyword must be VER"));
        }

        match keyword.as_str() {
            "OBJSENSE" => {
                data.objsense = read_objsense(&mut src)?;
                objsense_seen = true;
            }
            "CON" => data.con = read_cone_stack(&mut src)?,
            "VAR" => data.var = read_cone_stack(&mut src)?,
            "INT" => data.int_vars = read_int_vars(&mut src, data.varnum())?,
            "PSDCON" => data.psdcon_dims = read_psd_dims(&mut src)?,
            "PSDVAR" => data.psdvar_dims = read_psd_dims(&mut src)?,
            "OBJFCOORD" => data.objf = read_sym_coords(&mut src, &data.psdvar_dims)?,
            "OBJACOORD" => data.obja = read_vec_coords(&mut src, data.varnum())?,
            "OBJBCOORD" => {
                src.expect_line()?;
                let objb: f64 = parse_field(&mut src.line.split_whitespace(), src.number)?;
                data.objb = objb.as_T();
            }
            "FCOORD" => data.f = read_psd_coords(&mut src, data.mapnum(), &data.psdvar_dims)?,
            "ACOORD" => data.a = read_mat_coords(&mut src, data.mapnum(), data.varnum())?,
            "BCOORD" => data.b = read_vec_coords(&mut src, data.mapnum())?,
            "HCOORD" => data.h = read_psd_coords_crossed(&mut src, &data.psdcon_dims, data.varnum())?,
            "DCOORD" => data.d = read_sym_coords(&mut src, &data.psdcon_dims)?,
            _ => {
                return Err(FileError::parse(
                    src.number,
                    format!("keyword {keyword} not recognized"),
                ));
            }
        }
    }

    if !objsense_seen {
        return Err(FileError::parse(src.number, "keyword OBJSENSE is missing"));
    }

    data.validate()?;
    Ok(data)
}

fn read_version<R: BufRead>(src: &mut LineSource<R>) -> Result<u32, FileError> {
    src.expect_line()?;
    let version = parse_field(&mut src.line.split_whitespace(), src.number)?;
    if version > CBF_VERSION {
        return Err(FileError::parse(
            src.number,
            "file format version not supported",
        ));
    }
    Ok(version)
}

fn read_objsense<R: BufRead>(src: &mut LineSource<R>) -> Result<ObjSense, FileError> {
    src.expect_line()?;
    match src.line.split_whitespace().next() {
        Some("MIN") => Ok(ObjSense::Minimize),
        Some("MAX") => Ok(ObjSense::Maximize),
        _ => Err(FileError::parse(src.number, "objective sense must be MIN or MAX")),
    }
}

fn read_cone_stack<R: BufRead>(src: &mut LineSource<R>) -> Result<ConeStack, FileError> {
    src.expect_line()?;
    let mut fields = src.line.split_whitespace();
    let total: usize = parse_field(&mut fields, src.number)?;
    let blocks: usize = parse_field(&mut fields, src.number)?;

    let mut stack = ConeStack::new();
    for _ in 0..blocks {
        src.expect_line()?;
        let mut fields = src.line.split_whitespace();
        let name = fields
            .next()
            .ok_or_else(|| FileError::parse(src.number, "missing cone keyword"))?;
        let cone = Cone::from_cbf_name(name)
            .ok_or_else(|| FileError::parse(src.number, format!("unknown cone keyword {name}")))?;
        let dim: usize = parse_field(&mut fields, src.number)?;
        stack.push(cone, dim);
    }

    if stack.total_dim() != total {
        return Err(FileError::parse(
            src.number,
            "cone dimensions do not add up to the declared total",
        ));
    }
    Ok(stack)
}

fn read_int_vars<R: BufRead>(
    src: &mut LineSource<R>,
    varnum: usize,
) -> Result<Vec<usize>, FileError> {
    src.expect_line()?;
    let count: usize = parse_field(&mut src.line.split_whitespace(), src.number)?;

    let mut int_vars = Vec::with_capacity(count);
    for _ in 0..count {
        src.expect_line()?;
        let subj: usize = parse_field(&mut src.line.split_whitespace(), src.number)?;
        check_index(subj, varnum, src.number)?;
        int_vars.push(subj);
    }
    Ok(int_vars)
}

fn read_psd_dims<R: BufRead>(src: &mut LineSource<R>) -> Result<Vec<usize>, FileError> {
    src.expect_line()?;
    let count: usize = parse_field(&mut src.line.split_whitespace(), src.number)?;

    let mut dims = Vec::with_capacity(count);
    for _ in 0..count {
        src.expect_line()?;
        dims.push(parse_field(&mut src.line.split_whitespace(), src.number)?);
    }
    Ok(dims)
}

fn read_entry_count<R: BufRead>(src: &mut LineSource<R>) -> Result<usize, FileError> {
    src.expect_line()?;
    parse_field(&mut src.line.split_whitespace(), src.number)
}

fn read_vec_coords<T: FloatT, R: BufRead>(
    src: &mut LineSource<R>,
    bound: usize,
) -> Result<VecCoords<T>, FileError> {
    let count = read_entry_count(src)?;
    let mut coords = VecCoords::default();
    for _ in 0..count {
        src.expect_line()?;
        let mut fields = src.line.split_whitespace();
        let subi: usize = parse_field(&mut fields, src.number)?;
        let val: f64 = parse_field(&mut fields, src.number)?;
        check_index(subi, bound, src.number)?;
        coords.push(subi, val.as_T());
    }
    Ok(coords)
}

fn read_mat_coords<T: FloatT, R: BufRead>(
    src: &mut LineSource<R>,
    rows: usize,
    cols: usize,
) -> Result<MatCoords<T>, FileError> {
    let count = read_entry_count(src)?;
    let mut coords = MatCoords::default();
    for _ in 0..count {
        src.expect_line()?;
        let mut fields = src.line.split_whitespace();
        let subi: usize = parse_field(&mut fields, src.number)?;
        let subj: usize = parse_field(&mut fields, src.number)?;
        let val: f64 = parse_field(&mut fields, src.number)?;
        check_index(subi, rows, src.number)?;
        check_index(subj, cols, src.number)?;
        coords.push(subi, subj, val.as_T());
    }
    Ok(coords)
}

fn read_sym_coords<T: FloatT, R: BufRead>(
    src: &mut LineSource<R>,
    dims: &[usize],
) -> Result<SymCoords<T>, FileError> {
    let count = read_entry_count(src)?;
    let mut coords = SymCoords::default();
    for _ in 0..count {
        src.expect_line()?;
        let mut fields = src.line.split_whitespace();
        let subi: usize = parse_field(&mut fields, src.number)?;
        let subk: usize = parse_field(&mut fields, src.number)?;
        let subl: usize = parse_field(&mut fields, src.number)?;
        let val: f64 = parse_field(&mut fields, src.number)?;
        check_index(subi, dims.len(), src.number)?;
        check_index(subk, dims[subi], src.number)?;
        check_index(subl, dims[subi], src.number)?;
        coords.push(subi, subk, subl, val.as_T());
    }
    Ok(coords)
}

// map rows paired with PSD variable blocks
fn read_psd_coords<T: FloatT, R: BufRead>(
    src: &mut LineSource<R>,
    rows: usize,
    dims: &[usize],
) -> Result<PsdCoords<T>, FileError> {
    let count = read_entry_count(src)?;
    let mut coords = PsdCoords::default();
    for _ in 0..count {
        src.expect_line()?;
        let mut fields = src.line.split_whitespace();
        let subi: usize = parse_field(&mut fields, src.number)?;
        let subj: usize = parse_field(&mut fields, src.number)?;
        let subk: usize = parse_field(&mut fields, src.number)?;
        let subl: usize = parse_field(&mut fields, src.number)?;
        let val: f64 = parse_field(&mut fields, src.number)?;
        check_index(subi, rows, src.number)?;
        check_index(subj, dims.len(), src.number)?;
        check_index(subk, dims[subj], src.number)?;
        check_index(subl, dims[subj], src.number)?;
        coords.push(subi, subj, subk, subl, val.as_T());
    }
    Ok(coords)
}

// PSD map rows paired with scalar variables
fn read_psd_coords_crossed<T: FloatT, R: BufRead>(
    src: &mut LineSource<R>,
    dims: &[usize],
    varnum: usize,
) -> Result<PsdCoords<T>, FileError> {
    let count = read_entry_count(src)?;
    let mut coords = PsdCoords::default();
    for _ in 0..count {
        src.expect_line()?;
        let mut fields = src.line.split_whitespace();
        let subi: usize = parse_field(&mut fields, src.number)?;
        let subj: usize = parse_field(&mut fields, src.number)?;
        let subk: usize = parse_field(&mut fields, src.number)?;
        let subl: usize = parse_field(&mut fields, src.number)?;
        let val: f64 = parse_field(&mut fields, src.number)?;
        check_index(subi, dims.len(), src.number)?;
        check_index(subj, varnum, src.number)?;
        check_index(subk, dims[subi], src.number)?;
        check_index(subl, dims[subi], src.number)?;
        coords.push(subi, subj, subk, subl, val.as_T());
    }
    Ok(coords)
}

// -------------------------------------
// Writing
// -------------------------------------

fn cone_keyword(cone: Cone) -> Result<&'static str, FileError> {
    cone.cbf_name()
        .ok_or_else(|| FileError::Unsupported(format!("cone kind {cone:?} has no CBF keyword")))
}

/// Writes a problem in the conic benchmark format.  Sections without
/// content are left out and every written section is followed by a blank
/// separator line.
pub fn write_cbf<T: FloatT>(mut writer: impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    let w = &mut writer;

    writeln!(w, "VER\n{CBF_VERSION}\n")?;

    let objsense = match data.objsense {
        ObjSense::Minimize => "MIN",
        ObjSense::Maximize => "MAX",
    };
    writeln!(w, "OBJSENSE\n{objsense}\n")?;

    if data.psdvarnum() >= 1 {
        writeln!(w, "PSDVAR\n{}", data.psdvarnum())?;
        for dim in &data.psdvar_dims {
            writeln!(w, "{dim}")?;
        }
        writeln!(w)?;
    }

    if data.varnum() >= 1 || !data.var.is_empty() {
        writeln!(w, "VAR\n{} {}", data.varnum(), data.var.len())?;
        for (cone, dim) in data.var.iter() {
            writeln!(w, "{} {}", cone_keyword(cone)?, dim)?;
        }
        writeln!(w)?;
    }

    if !data.int_vars.is_empty() {
        writeln!(w, "INT\n{}", data.int_vars.len())?;
        for subj in &data.int_vars {
            writeln!(w, "{subj}")?;
        }
        writeln!(w)?;
    }

    if data.mapnum() >= 1 || !data.con.is_empty() {
        writeln!(w, "CON\n{} {}", data.mapnum(), data.con.len())?;
        for (cone, dim) in data.con.iter() {
            writeln!(w, "{} {}", cone_keyword(cone)?, dim)?;
        }
        writeln!(w)?;
    }

    if data.psdmapnum() >= 1 {
        writeln!(w, "PSDCON\n{}", data.psdmapnum())?;
        for dim in &data.psdcon_dims {
            writeln!(w, "{dim}")?;
        }
        writeln!(w)?;
    }

    if !data.objf.is_empty() {
        writeln!(w, "OBJFCOORD\n{}", data.objf.len())?;
        let objf = &data.objf;
        for (&j, &k, &l, &v) in itertools::izip!(&objf.subi, &objf.subk, &objf.subl, &objf.val) {
            writeln!(w, "{j} {k} {l} {v}")?;
        }
        writeln!(w)?;
    }

    if !data.obja.is_empty() {
        writeln!(w, "OBJACOORD\n{}", data.obja.len())?;
        for (&j, &v) in std::iter::zip(&data.obja.subi, &data.obja.val) {
            writeln!(w, "{j} {v}")?;
        }
        writeln!(w)?;
    }

    if data.objb != T::zero() {
        writeln!(w, "OBJBCOORD\n{}\n", data.objb)?;
    }

    if !data.f.is_empty() {
        writeln!(w, "FCOORD\n{}", data.f.len())?;
        let f = &data.f;
        for (&i, &j, &k, &l, &v) in itertools::izip!(&f.subi, &f.subj, &f.subk, &f.subl, &f.val) {
            writeln!(w, "{i} {j} {k} {l} {v}")?;
        }
        writeln!(w)?;
    }

    if !data.a.is_empty() {
        writeln!(w, "ACOORD\n{}", data.a.len())?;
        let a = &data.a;
        for (&i, &j, &v) in itertools::izip!(&a.subi, &a.subj, &a.val) {
            writeln!(w, "{i} {j} {v}")?;
        }
        writeln!(w)?;
    }

    if !data.b.is_empty() {
        writeln!(w, "BCOORD\n{}", data.b.len())?;
        for (&i, &v) in std::iter::zip(&data.b.subi, &data.b.val) {
            writeln!(w, "{i} {v}")?;
        }
        writeln!(w)?;
    }

    if !data.h.is_empty() {
        writeln!(w, "HCOORD\n{}", data.h.len())?;
        let h = &data.h;
        for (&i, &j, &k, &l, &v) in itertools::izip!(&h.subi, &h.subj, &h.subk, &h.subl, &h.val) {
            writeln!(w, "{i} {j} {k} {l} {v}")?;
        }
        writeln!(w)?;
    }

    if !data.d.is_empty() {
        writeln!(w, "DCOORD\n{}", data.d.len())?;
        let d = &data.d;
        for (&i, &k, &l, &v) in itertools::izip!(&d.subi, &d.subk, &d.subl, &d.val) {
            writeln!(w, "{i} {k} {l} {v}")?;
        }
        writeln!(w)?;
    }

    Ok(())
}

// -------------------------------------
// Registry entries
// -------------------------------------

/// Conic benchmark format reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct CbfReader;

impl ProblemReader for CbfReader {
    fn name(&self) -> &'static str {
        "cbf"
    }
    fn read_file(&self, path: &Path) -> Result<ProblemData<f64>, FileError> {
        read_cbf(open_reader(path)?)
    }
}

/// Conic benchmark format writer.
#[derive(Debug, Clone, Copy, Default)]
pub struct CbfWriter;

impl ProblemWriter for CbfWriter {
    fn name(&self) -> &'static str {
        "cbf"
    }
    fn extension(&self) -> &'static str {
        "cbf"
    }
    fn write_file(&self, path: &Path, data: &ProblemData<f64>) -> Result<(), FileError> {
        let mut writer = open_writer(path)?;
        write_cbf(&mut writer, data)?;
        Ok(writer.flush()?)
    }
}

// -------------
// testing
// -------------

#[cfg(test)]
mod tests {
    use super::*;

    fn read_str(text: &str) -> Result<ProblemData<f64>, FileError> {
        read_cbf::<f64, _>(text.as_bytes())
    }

    #[test]
    fn minimal_problem() {
        let text = "\
# introductory commentary
VER
1

OBJSENSE
MIN

VAR
2 1
F 2

CON
1 1
L+ 1

OBJACOORD
2
0 1
1 2

ACOORD
2
0 0 1
0 1 1

BCOORD
1
0 -3
";
        let data = read_str(text).unwrap();
        assert_eq!(data.objsense, ObjSense::Minimize);
        assert_eq!(data.var.cones, vec![Cone::Free]);
        assert_eq!(data.con.cones, vec![Cone::Nonnegative]);
        assert_eq!(data.obja.val, vec![1.0, 2.0]);
        assert_eq!(data.a.subj, vec![0, 1]);
        assert_eq!(data.b.val, vec![-3.0]);
    }

    #[test]
    fn commentary_allowed_inside_sections() {
        let text = "\
VER
# version number follows
1

OBJSENSE
MAX
";
        let data = read_str(text).unwrap();
        assert_eq!(data.objsense, ObjSense::Maximize);
    }

    #[test]
    fn version_must_come_first() {
        let err = read_str("OBJSENSE\nMIN\n").unwrap_err();
        assert!(matches!(err, FileError::Parse { line: 1, .. }));
    }

    #[test]
    fn future_versions_are_rejected() {
        let err = read_str("VER\n2\n\nOBJSENSE\nMIN\n").unwrap_err();
        assert!(matches!(err, FileError::Parse { line: 2, .. }));
    }

    #[test]
    fn objsense_is_mandatory() {
        let err = read_str("VER\n1\n").unwrap_err();
        assert!(matches!(err, FileError::Parse { .. }));
    }

    #[test]
    fn stack_dimensions_must_add_up() {
        let text = "VER\n1\n\nOBJSENSE\nMIN\n\nVAR\n3 1\nF 2\n";
        let err = read_str(text).unwrap_err();
        assert!(matches!(err, FileError::Parse { line: 9, .. }));
    }

    #[test]
    fn out_of_range_coordinates_are_rejected() {
        let text = "VER\n1\n\nOBJSENSE\nMIN\n\nVAR\n1 1\nF 1\n\nOBJACOORD\n1\n3 1.0\n";
        let err = read_str(text).unwrap_err();
        assert!(matches!(err, FileError::Parse { line: 13, .. }));
    }

    #[test]
    fn empty_model_round_trip() {
        let mut out = Vec::new();
        write_cbf(&mut out, &ProblemData::<f64>::new()).unwrap();
        assert_eq!(
            String::from_utf8(out.clone()).unwrap(),
            "VER\n1\n\nOBJSENSE\nMIN\n\n"
        );
        let back = read_cbf::<f64, _>(&out[..]).unwrap();
        assert_eq!(back, ProblemData::<f64>::new());
    }

    #[test]
    fn writer_emits_sections_in_fixed_order() {
        let mut data = ProblemData::<f64>::new();
        data.objsense = ObjSense::Maximize;
        data.var.push(Cone::Free, 1);
        data.con.push(Cone::Quadratic, 3);
        data.int_vars.push(0);
        data.psdvar_dims.push(2);
        data.objb = 1.25;
        data.obja.push(0, -2.0);
        data.a.push(1, 0, 0.5);

        let mut out = Vec::new();
        write_cbf(&mut out, &data).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "VER\n1\n\n\
             OBJSENSE\nMAX\n\n\
             PSDVAR\n1\n2\n\n\
             VAR\n1 1\nF 1\n\n\
             INT\n1\n0\n\n\
             CON\n3 1\nQ 3\n\n\
             OBJACOORD\n1\n0 -2\n\n\
             OBJBCOORD\n1.25\n\n\
             ACOORD\n1\n1 0 0.5\n\n"
        );
    }

    #[test]
    fn exponential_cones_can_not_be_written() {
        let mut data = ProblemData::<f64>::new();
        data.var.push(Cone::PrimalExp, 3);
        let err = write_cbf(&mut Vec::new(), &data).unwrap_err();
        assert!(matches!(err, FileError::Unsupported(_)));
    }
}
