//! MPS writers for linear and second order conic problems.
//!
//! Two dialects of the format are produced from the same core sections.
//! The MOSEK dialect appends CSECTION blocks listing the members of each
//! second order cone, whereas the CPLEX dialect encodes the same cones as
//! quadratic constraint rows with QCMATRIX coefficient blocks.  Affine
//! maps in second order cones are rewritten as equalities against fresh
//! slack variables named `xg<row>`.

use super::{open_writer, FileError, ProblemWriter};
use crate::floats::FloatT;
use crate::problem::{bucket_sort, Cone, ObjSense, ProblemData};
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MpsDialect {
    Mosek,
    Cplex,
}

fn unsupported_cone(cone: Cone) -> FileError {
    FileError::Unsupported(format!(
        "cone kind {cone:?} cannot be expressed in the MPS format"
    ))
}

fn row_kind(cone: Cone) -> Result<&'static str, FileError> {
    match cone {
        Cone::Free => Ok("N"),
        Cone::Nonnegative => Ok("G"),
        Cone::Nonpositive => Ok("L"),
        Cone::Zero | Cone::Quadratic | Cone::RotatedQuadratic => Ok("E"),
        Cone::PrimalExp | Cone::DualExp => Err(unsupported_cone(cone)),
    }
}

fn write_mps<T: FloatT>(
    mut writer: impl Write,
    data: &ProblemData<T>,
    dialect: MpsDialect,
) -> Result<(), FileError> {
    if data.psdmapnum() >= 1 || data.psdvarnum() >= 1 {
        return Err(FileError::Unsupported(
            "positive semidefinite domains are not supported in the selected output file format"
                .into(),
        ));
    }
    data.validate()?;

    let w = &mut writer;

    writeln!(w, "{:<14}{}", "NAME", "UNKNOWN")?;

    let sense = match data.objsense {
        ObjSense::Minimize => "MIN",
        ObjSense::Maximize => "MAX",
    };
    writeln!(w, "OBJSENSE\n    {sense}")?;

    write_rows(w, data)?;
    if dialect == MpsDialect::Cplex {
        write_qcmatrix_rows(w, data)?;
    }
    write_columns(w, data)?;
    write_rhs(w, data)?;
    write_bounds(w, data)?;
    match dialect {
        MpsDialect::Mosek => write_csection(w, data)?,
        MpsDialect::Cplex => write_qcmatrix(w, data)?,
    }
    writeln!(w, "ENDATA")?;

    Ok(())
}

fn write_rows<T: FloatT>(w: &mut impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    writeln!(w, "ROWS")?;
    writeln!(w, " N  obj")?;

    let mut row = 0;
    for (cone, dim) in data.con.iter() {
        let kind = row_kind(cone)?;
        for _ in 0..dim {
            writeln!(w, " {kind}  g{row}")?;
            row += 1;
        }
    }
    Ok(())
}

// extra constraint rows backing the QCMATRIX blocks of the CPLEX dialect
fn write_qcmatrix_rows<T: FloatT>(
    w: &mut impl Write,
    data: &ProblemData<T>,
) -> Result<(), FileError> {
    for (block, &cone) in data.var.cones.iter().enumerate() {
        if matches!(cone, Cone::Quadratic | Cone::RotatedQuadratic) {
            writeln!(w, " L  xK{block}")?;
        }
    }
    for (block, &cone) in data.con.cones.iter().enumerate() {
        if matches!(cone, Cone::Quadratic | Cone::RotatedQuadratic) {
            writeln!(w, " L  xgK{block}")?;
        }
    }
    Ok(())
}

// INTORG/INTEND marker bookkeeping for the COLUMNS section
struct IntegerMarks {
    ints: Vec<usize>,
    cursor: usize,
    counter: usize,
    open: bool,
}

impl IntegerMarks {
    fn new(int_vars: &[usize], varnum: usize) -> Self {
        let mut perm: Vec<usize> = (0..int_vars.len()).collect();
        if !int_vars.is_empty() {
            bucket_sort(varnum - 1, int_vars, &mut perm);
        }
        let ints = perm.iter().map(|&p| int_vars[p]).collect();
        Self {
            ints,
            cursor: 0,
            counter: 0,
            open: false,
        }
    }

    fn toggle(&mut self, w: &mut impl Write, kind: &str) -> Result<(), FileError> {
        writeln!(w, "    MARK{:04}  {:<24} {}", self.counter, "'MARKER'", kind)?;
        self.open = !self.open;
        self.counter = (self.counter + 1) % 10000;
        Ok(())
    }

    fn control(&mut self, w: &mut impl Write, column: usize) -> Result<(), FileError> {
        if self.ints.is_empty() {
            return Ok(());
        }
        while self.cursor < self.ints.len() - 1 && self.ints[self.cursor] < column {
            self.cursor += 1;
        }
        if !self.open && self.ints[self.cursor] == column {
            self.toggle(w, "'INTORG'")?;
        }
        if self.open && self.ints[self.cursor] != column {
            self.toggle(w, "'INTEND'")?;
        }
        Ok(())
    }

    fn finish(&mut self, w: &mut impl Write) -> Result<(), FileError> {
        if self.open {
            self.toggle(w, "'INTEND'")?;
        }
        Ok(())
    }
}

fn write_columns<T: FloatT>(w: &mut impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    let a = &data.a;
    let mut aidx: Vec<usize> = (0..a.len()).collect();
    if !a.is_empty() {
        bucket_sort(data.mapnum() - 1, &a.subi, &mut aidx);
        bucket_sort(data.varnum() - 1, &a.subj, &mut aidx);
    }

    let obja = &data.obja;
    let mut objaidx: Vec<usize> = (0..obja.len()).collect();
    if !obja.is_empty() {
        bucket_sort(data.varnum() - 1, &obja.subi, &mut objaidx);
    }

    let mut marks = IntegerMarks::new(&data.int_vars, data.varnum());

    writeln!(w, "COLUMNS")?;

    let mut entry = 0;
    let mut objentry = 0;
    for j in 0..data.varnum() {
        marks.control(w, j)?;

        // columns without constraint coefficients carry an explicit
        // objective entry so that every variable is declared
        let has_acoords = entry < aidx.len() && a.subj[aidx[entry]] == j;

        if objentry < objaidx.len() && obja.subi[objaidx[objentry]] == j {
            while objentry < objaidx.len() && obja.subi[objaidx[objentry]] == j {
                writeln!(w, "    x{:<8} {:<9} {}", j, "obj", obja.val[objaidx[objentry]])?;
                objentry += 1;
            }
        } else if !has_acoords {
            writeln!(w, "    x{:<8} {:<9} {}", j, "obj", T::zero())?;
        }

        while entry < aidx.len() && a.subj[aidx[entry]] == j {
            let e = aidx[entry];
            writeln!(w, "    x{:<8} g{:<8} {}", a.subj[e], a.subi[e], a.val[e])?;
            entry += 1;
        }
    }
    marks.finish(w)?;

    // slack variables putting affine maps in second order cones
    let mut row = 0;
    for (cone, dim) in data.con.iter() {
        match cone {
            Cone::Quadratic | Cone::RotatedQuadratic => {
                for _ in 0..dim {
                    writeln!(w, "    xg{:<7} g{:<8} {}", row, row, -T::one())?;
                    row += 1;
                }
            }
            _ => row += dim,
        }
    }
    Ok(())
}

fn write_rhs<T: FloatT>(w: &mut impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    if data.objb == T::zero() && data.b.is_empty() {
        return Ok(());
    }
    writeln!(w, "RHS")?;
    if data.objb != T::zero() {
        writeln!(w, "    {:<9} {:<9} {}", "BVEC", "obj", -data.objb)?;
    }
    for (&i, &v) in std::iter::zip(&data.b.subi, &data.b.val) {
        writeln!(w, "    {:<9} g{:<8} {}", "BVEC", i, -v)?;
    }
    Ok(())
}

fn write_bounds<T: FloatT>(w: &mut impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    writeln!(w, "BOUNDS")?;

    let mut var = 0;
    for (cone, dim) in data.var.iter() {
        let (skip, free_kind, valued_kind) = match cone {
            Cone::Free => (0, Some("FR"), None),
            // lower bound of zero is the format default
            Cone::Nonnegative => (0, Some("PL"), None),
            Cone::Nonpositive => (0, Some("MI"), Some("UP")),
            Cone::Zero => (0, None, Some("FX")),
            Cone::Quadratic => {
                writeln!(w, " PL {:<9} x{:<8}", "DOMAIN", var)?;
                (1, Some("FR"), None)
            }
            Cone::RotatedQuadratic => {
                writeln!(w, " PL {:<9} x{:<8}", "DOMAIN", var)?;
                writeln!(w, " PL {:<9} x{:<8}", "DOMAIN", var + 1)?;
                (2, Some("FR"), None)
            }
            Cone::PrimalExp | Cone::DualExp => return Err(unsupported_cone(cone)),
        };

        var += skip;
        for _ in skip..dim {
            if let Some(kind) = free_kind {
                writeln!(w, " {} {:<9} x{:<8}", kind, "DOMAIN", var)?;
            }
            if let Some(kind) = valued_kind {
                writeln!(w, " {} {:<9} x{:<8} {}", kind, "DOMAIN", var, T::zero())?;
            }
            var += 1;
        }
    }

    // slack variables inherit the bound pattern of their cone
    let mut row = 0;
    for (cone, dim) in data.con.iter() {
        let skip = match cone {
            Cone::Quadratic => {
                writeln!(w, " PL {:<9} xg{:<7}", "DOMAIN", row)?;
                1
            }
            Cone::RotatedQuadratic => {
                writeln!(w, " PL {:<9} xg{:<7}", "DOMAIN", row)?;
                writeln!(w, " PL {:<9} xg{:<7}", "DOMAIN", row + 1)?;
                2
            }
            _ => {
                row += dim;
                continue;
            }
        };
        row += skip;
        for _ in skip..dim {
            writeln!(w, " FR {:<9} xg{:<7}", "DOMAIN", row)?;
            row += 1;
        }
    }
    Ok(())
}

fn write_csection<T: FloatT>(w: &mut impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    let mut var = 0;
    for (block, (cone, dim)) in data.var.iter().enumerate() {
        let domain = match cone {
            Cone::Quadratic => "QUAD",
            Cone::RotatedQuadratic => "RQUAD",
            _ => {
                var += dim;
                continue;
            }
        };
        writeln!(w, "{:<13} xK{:<7} {:<14} {}", "CSECTION", block, T::zero(), domain)?;
        for _ in 0..dim {
            writeln!(w, "    x{var}")?;
            var += 1;
        }
    }

    let mut row = 0;
    for (block, (cone, dim)) in data.con.iter().enumerate() {
        let domain = match cone {
            Cone::Quadratic => "QUAD",
            Cone::RotatedQuadratic => "RQUAD",
            _ => {
                row += dim;
                continue;
            }
        };
        writeln!(w, "{:<13} xgK{:<6} {:<14} {}", "CSECTION", block, T::zero(), domain)?;
        for _ in 0..dim {
            writeln!(w, "    xg{row}")?;
            row += 1;
        }
    }
    Ok(())
}

fn write_qcmatrix<T: FloatT>(w: &mut impl Write, data: &ProblemData<T>) -> Result<(), FileError> {
    let mut var = 0;
    for (block, (cone, dim)) in data.var.iter().enumerate() {
        match cone {
            Cone::Quadratic => {
                writeln!(w, "{:<10} xK{block}", "QCMATRIX")?;
                writeln!(w, "    x{:<8} x{:<8} {}", var, var, -T::one())?;
                writeln!(w, "    x{:<8} x{:<8} {}", var + 1, var + 1, T::one())?;
            }
            Cone::RotatedQuadratic => {
                writeln!(w, "{:<10} xK{block}", "QCMATRIX")?;
                writeln!(w, "    x{:<8} x{:<8} {}", var, var + 1, -T::one())?;
                writeln!(w, "    x{:<8} x{:<8} {}", var + 1, var, -T::one())?;
            }
            _ => {
                var += dim;
                continue;
            }
        }
        var += 2;
        for _ in 2..dim {
            writeln!(w, "    x{:<8} x{:<8} {}", var, var, T::one())?;
            var += 1;
        }
    }

    let mut row = 0;
    for (block, (cone, dim)) in data.con.iter().enumerate() {
        match cone {
            Cone::Quadratic => {
                writeln!(w, "{:<10} xgK{block}", "QCMATRIX")?;
                writeln!(w, "    xg{:<7} xg{:<7} {}", row, row, -T::one())?;
                writeln!(w, "    xg{:<7} xg{:<7} {}", row + 1, row + 1, T::one())?;
            }
            Cone::RotatedQuadratic => {
                writeln!(w, "{:<10} xgK{block}", "QCMATRIX")?;
                writeln!(w, "    xg{:<7} xg{:<7} {}", row, row + 1, -T::one())?;
                writeln!(w, "    xg{:<7} xg{:<7} {}", row + 1, row, -T::one())?;
            }
            _ => {
                row += dim;
                continue;
            }
        }
        row += 2;
        for _ in 2..dim {
            writeln!(w, "    xg{:<7} xg{:<7} {}", row, row, T::one())?;
            row += 1;
        }
    }
    Ok(())
}

// -------------------------------------
// Registry entries
// -------------------------------------

/// MPS writer in the MOSEK dialect, listing second order cones in
/// CSECTION blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MpsMosekWriter;

impl ProblemWriter for MpsMosekWriter {
    fn name(&self) -> &'static str {
        "mps-mosek"
    }
    fn extension(&self) -> &'static str {
        "mps"
    }
    fn write_file(&self, path: &Path, data: &ProblemData<f64>) -> Result<(), FileError> {
        let mut writer = open_writer(path)?;
        write_mps(&mut writer, data, MpsDialect::Mosek)?;
        Ok(writer.flush()?)
    }
}

/// MPS writer in the CPLEX dialect, encoding second order cones as
/// quadratic constraints with QCMATRIX blocks.
#[derive(Debug, Clone, Copy, Default)]
pub struct MpsCplexWriter;

impl ProblemWriter for MpsCplexWriter {
    fn name(&self) -> &'static str {
        "mps-cplex"
    }
    fn extension(&self) -> &'static str {
        "mps"
    }
    fn write_file(&self, path: &Path, data: &ProblemData<f64>) -> Result<(), FileError> {
        let mut writer = open_writer(path)?;
        write_mps(&mut writer, data, MpsDialect::Cplex)?;
        Ok(writer.flush()?)
    }
}

// -------------
// testing
// -------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemBuilder;

    fn write_str(data: &ProblemData<f64>, dialect: MpsDialect) -> String {
        let mut out = Vec::new();
        write_mps(&mut out, data, dialect).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn linear_example() -> ProblemData<f64> {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_var(Cone::Free, 2);
        builder.add_con(Cone::Nonnegative, 1);
        builder.add_obja(0, 1.0);
        builder.add_obja(1, 2.0);
        builder.add_a(0, 0, 1.0);
        builder.add_a(0, 1, 1.0);
        builder.add_b(0, -3.0);
        builder.finish()
    }

    #[test]
    fn linear_problem_matches_reference_output() {
        let text = write_str(&linear_example(), MpsDialect::Mosek);
        let expected = [
            "NAME          UNKNOWN",
            "OBJSENSE",
            "    MIN",
            "ROWS",
            " N  obj",
            " G  g0",
            "COLUMNS",
            "    x0        obj       1",
            "    x0        g0        1",
            "    x1        obj       2",
            "    x1        g0        1",
            "RHS",
            "    BVEC      g0        3",
            "BOUNDS",
            " FR DOMAIN    x0       ",
            " FR DOMAIN    x1       ",
            "ENDATA",
            "",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn integer_markers_wrap_integer_columns() {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_var(Cone::Free, 3);
        builder.add_int_var(2);
        builder.add_int_var(0);
        builder.add_obja(1, 5.0);
        let text = write_str(&builder.finish(), MpsDialect::Mosek);

        let lines: Vec<&str> = text.lines().collect();
        let start = lines.iter().position(|l| *l == "COLUMNS").unwrap();
        assert_eq!(
            &lines[start..start + 7],
            &[
                "COLUMNS",
                "    MARK0000  'MARKER'                 'INTORG'",
                "    x0        obj       0",
                "    MARK0001  'MARKER'                 'INTEND'",
                "    x1        obj       5",
                "    MARK0002  'MARKER'                 'INTORG'",
                "    x2        obj       0",
            ]
        );
        assert!(lines[start + 7].ends_with("'INTEND'"));
        assert!(lines[start + 7].starts_with("    MARK0003"));
    }

    #[test]
    fn conic_blocks_in_the_mosek_dialect() {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_var(Cone::Quadratic, 3);
        builder.add_con(Cone::RotatedQuadratic, 3);
        builder.add_a(0, 0, 1.0);
        builder.add_a(1, 1, 1.0);
        builder.add_a(2, 2, 1.0);
        let text = write_str(&builder.finish(), MpsDialect::Mosek);

        // rows of the conic map become equalities against slack variables
        assert!(text.contains(" E  g0\n E  g1\n E  g2\n"));
        assert!(text.contains("    xg0       g0        -1\n"));
        assert!(text.contains("    xg2       g2        -1\n"));

        // first cone members are nonnegative, the rest unbounded
        assert!(text.contains(" PL DOMAIN    x0       \n FR DOMAIN    x1       \n"));
        assert!(text.contains(" PL DOMAIN    xg0      \n PL DOMAIN    xg1      \n FR DOMAIN    xg2      \n"));

        let csection = "CSECTION      xK0       0              QUAD\n    x0\n    x1\n    x2\n";
        assert!(text.contains(csection));
        let map_csection = "CSECTION      xgK0      0              RQUAD\n    xg0\n    xg1\n    xg2\n";
        assert!(text.contains(map_csection));
    }

    #[test]
    fn conic_blocks_in_the_cplex_dialect() {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_var(Cone::Free, 1);
        builder.add_var(Cone::Quadratic, 3);
        builder.add_con(Cone::RotatedQuadratic, 3);
        builder.add_a(0, 0, 1.0);
        builder.add_a(1, 1, 1.0);
        builder.add_a(2, 2, 1.0);
        let text = write_str(&builder.finish(), MpsDialect::Cplex);

        assert!(text.contains(" L  xK1\n"));
        assert!(text.contains(" L  xgK0\n"));
        assert!(!text.contains("CSECTION"));

        let quad = [
            "QCMATRIX   xK1",
            "    x1        x1        -1",
            "    x2        x2        1",
            "    x3        x3        1",
            "",
        ]
        .join("\n");
        assert!(text.contains(&quad));

        let rquad = [
            "QCMATRIX   xgK0",
            "    xg0       xg1       -1",
            "    xg1       xg0       -1",
            "    xg2       xg2       1",
            "",
        ]
        .join("\n");
        assert!(text.contains(&rquad));
    }

    #[test]
    fn semidefinite_content_is_rejected() {
        let mut data = ProblemData::<f64>::new();
        data.psdvar_dims.push(2);
        let err = write_mps(&mut Vec::new(), &data, MpsDialect::Mosek).unwrap_err();
        assert!(matches!(err, FileError::Unsupported(_)));
    }

    #[test]
    fn exponential_cones_are_rejected() {
        let mut data = ProblemData::<f64>::new();
        data.con.push(Cone::PrimalExp, 3);
        let err = write_mps(&mut Vec::new(), &data, MpsDialect::Cplex).unwrap_err();
        assert!(matches!(err, FileError::Unsupported(_)));
    }
}
