use super::cones::{Cone, ObjSense};
use super::data::ProblemData;
use crate::floats::FloatT;
use std::iter::zip;

/// Incremental, append only construction of a [`ProblemData`].
///
/// Scalar cone blocks are coalesced as they arrive: a linear block is
/// merged into the preceding block when the kinds match, while product
/// cone blocks always open a new block.  Coefficient entries may be added
/// in any order and refer to rows and variables by their running index.
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder<T: FloatT = f64> {
    data: ProblemData<T>,
}

impl<T: FloatT> ProblemBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the finished model.
    pub fn finish(self) -> ProblemData<T> {
        self.data
    }

    /// Scalar constraint rows added so far.
    pub fn mapnum(&self) -> usize {
        self.data.mapnum()
    }

    /// Scalar variables added so far.
    pub fn varnum(&self) -> usize {
        self.data.varnum()
    }

    pub fn set_objsense(&mut self, objsense: ObjSense) {
        self.data.objsense = objsense;
    }

    pub fn set_objb(&mut self, objb: T) {
        self.data.objb = objb;
    }

    /// Appends `dim` constraint rows in the given cone.
    pub fn add_con(&mut self, cone: Cone, dim: usize) {
        Self::add_to_stack(&mut self.data.con, cone, dim);
    }

    /// Appends `dim` variables in the given cone.
    pub fn add_var(&mut self, cone: Cone, dim: usize) {
        Self::add_to_stack(&mut self.data.var, cone, dim);
    }

    fn add_to_stack(stack: &mut super::cones::ConeStack, cone: Cone, dim: usize) {
        match stack.cones.last() {
            Some(&last) if last == cone && cone.is_linear() => {
                *stack.dims.last_mut().unwrap() += dim;
            }
            _ => stack.push(cone, dim),
        }
    }

    pub fn add_int_var(&mut self, subj: usize) {
        self.data.int_vars.push(subj);
    }

    pub fn add_psdcon(&mut self, dim: usize) {
        self.data.psdcon_dims.push(dim);
    }

    pub fn add_psdvar(&mut self, dim: usize) {
        self.data.psdvar_dims.push(dim);
    }

    pub fn add_objf(&mut self, subj: usize, subk: usize, subl: usize, val: T) {
        self.data.objf.push(subj, subk, subl, val);
    }

    pub fn add_obja(&mut self, subj: usize, val: T) {
        self.data.obja.push(subj, val);
    }

    pub fn add_f(&mut self, subi: usize, subj: usize, subk: usize, subl: usize, val: T) {
        self.data.f.push(subi, subj, subk, subl, val);
    }

    pub fn add_a(&mut self, subi: usize, subj: usize, val: T) {
        self.data.a.push(subi, subj, val);
    }

    pub fn add_b(&mut self, subi: usize, val: T) {
        self.data.b.push(subi, val);
    }

    pub fn add_h(&mut self, subi: usize, subj: usize, subk: usize, subl: usize, val: T) {
        self.data.h.push(subi, subj, subk, subl, val);
    }

    pub fn add_d(&mut self, subi: usize, subk: usize, subl: usize, val: T) {
        self.data.d.push(subi, subk, subl, val);
    }

    /// Adds the constraint `x[subj] >= lower` as a fresh nonnegative row.
    pub fn var_lower_bound(&mut self, subj: usize, lower: T) {
        self.add_bound_row(Cone::Nonnegative, subj, lower);
    }

    /// Adds the constraint `x[subj] <= upper` as a fresh nonpositive row.
    pub fn var_upper_bound(&mut self, subj: usize, upper: T) {
        self.add_bound_row(Cone::Nonpositive, subj, upper);
    }

    /// Adds the constraint `x[subj] == value` as a fresh equality row.
    pub fn var_fix(&mut self, subj: usize, value: T) {
        self.add_bound_row(Cone::Zero, subj, value);
    }

    // one row with a unit coefficient, shifted so the bound sits in the
    // constant term: x[subj] - bound ∈ cone
    fn add_bound_row(&mut self, cone: Cone, subj: usize, bound: T) {
        self.add_con(cone, 1);
        let row = self.mapnum() - 1;
        if bound != T::zero() {
            self.add_b(row, -bound);
        }
        self.add_a(row, subj, T::one());
    }

    /// Appends every structural block and coefficient entry of `other`.
    /// Cone blocks pass through the usual coalescing, coordinate indices
    /// are taken as given and the objective constant of `other` is
    /// ignored.
    pub fn append(&mut self, other: &ProblemData<T>) {
        for (cone, dim) in other.con.iter() {
            self.add_con(cone, dim);
        }
        for (cone, dim) in other.var.iter() {
            self.add_var(cone, dim);
        }
        for &subj in &other.int_vars {
            self.add_int_var(subj);
        }
        for &dim in &other.psdcon_dims {
            self.add_psdcon(dim);
        }
        for &dim in &other.psdvar_dims {
            self.add_psdvar(dim);
        }

        let objf = &other.objf;
        for (&j, &k, &l, &v) in itertools::izip!(&objf.subi, &objf.subk, &objf.subl, &objf.val) {
            self.add_objf(j, k, l, v);
        }
        for (&j, &v) in zip(&other.obja.subi, &other.obja.val) {
            self.add_obja(j, v);
        }

        let f = &other.f;
        for (&i, &j, &k, &l, &v) in itertools::izip!(&f.subi, &f.subj, &f.subk, &f.subl, &f.val) {
            self.add_f(i, j, k, l, v);
        }
        for ((&i, &j), &v) in zip(zip(&other.a.subi, &other.a.subj), &other.a.val) {
            self.add_a(i, j, v);
        }
        for (&i, &v) in zip(&other.b.subi, &other.b.val) {
            self.add_b(i, v);
        }

        let h = &other.h;
        for (&i, &j, &k, &l, &v) in itertools::izip!(&h.subi, &h.subj, &h.subk, &h.subl, &h.val) {
            self.add_h(i, j, k, l, v);
        }
        let d = &other.d;
        for (&i, &k, &l, &v) in itertools::izip!(&d.subi, &d.subk, &d.subl, &d.val) {
            self.add_d(i, k, l, v);
        }
    }
}

/// Resumes building on top of an existing model.
impl<T: FloatT> From<ProblemData<T>> for ProblemBuilder<T> {
    fn from(data: ProblemData<T>) -> Self {
        Self { data }
    }
}

// -------------
// testing
// -------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_blocks_coalesce() {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_con(Cone::Nonnegative, 2);
        builder.add_con(Cone::Nonnegative, 3);
        builder.add_con(Cone::Zero, 1);
        builder.add_con(Cone::Nonnegative, 1);

        let data = builder.finish();
        assert_eq!(
            data.con.cones,
            vec![Cone::Nonnegative, Cone::Zero, Cone::Nonnegative]
        );
        assert_eq!(data.con.dims, vec![5, 1, 1]);
        assert_eq!(data.mapnum(), 7);
    }

    #[test]
    fn product_cones_never_coalesce() {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_var(Cone::Quadratic, 3);
        builder.add_var(Cone::Quadratic, 3);
        builder.add_var(Cone::RotatedQuadratic, 4);

        let data = builder.finish();
        assert_eq!(
            data.var.cones,
            vec![
                Cone::Quadratic,
                Cone::Quadratic,
                Cone::RotatedQuadratic
            ]
        );
        assert_eq!(data.var.dims, vec![3, 3, 4]);
    }

    #[test]
    fn variable_bounds_expand_to_rows() {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_var(Cone::Free, 3);
        builder.var_lower_bound(0, 1.5);
        builder.var_upper_bound(1, 4.0);
        builder.var_fix(2, 0.0);

        let data = builder.finish();
        assert_eq!(
            data.con.cones,
            vec![Cone::Nonnegative, Cone::Nonpositive, Cone::Zero]
        );
        assert_eq!(data.con.dims, vec![1, 1, 1]);

        assert_eq!(data.a.subi, vec![0, 1, 2]);
        assert_eq!(data.a.subj, vec![0, 1, 2]);
        assert_eq!(data.a.val, vec![1.0, 1.0, 1.0]);

        // zero valued bounds add no constant entry
        assert_eq!(data.b.subi, vec![0, 1]);
        assert_eq!(data.b.val, vec![-1.5, -4.0]);

        assert!(data.validate().is_ok());
    }

    #[test]
    fn append_copies_structure_and_coefficients() {
        let mut builder = ProblemBuilder::<f64>::new();
        builder.add_con(Cone::Nonnegative, 1);
        builder.add_var(Cone::Free, 2);
        builder.add_a(0, 0, 1.0);
        builder.set_objb(7.0);

        let mut other = ProblemData::<f64>::new();
        other.con.push(Cone::Nonnegative, 2);
        other.var.push(Cone::Free, 1);
        other.int_vars.push(0);
        other.a.push(0, 0, 2.0);
        other.objb = 99.0;

        builder.append(&other);
        let data = builder.finish();

        // the nonnegative seam merges, the copied entries keep their indices
        assert_eq!(data.con.cones, vec![Cone::Nonnegative]);
        assert_eq!(data.con.dims, vec![3]);
        assert_eq!(data.var.dims, vec![3]);
        assert_eq!(data.a.subi, vec![0, 0]);
        assert_eq!(data.a.val, vec![1.0, 2.0]);
        assert_eq!(data.int_vars, vec![0]);
        assert_eq!(data.objb, 7.0);
    }

    #[test]
    fn resume_from_existing_model() {
        let mut data = ProblemData::<f64>::new();
        data.var.push(Cone::Free, 1);

        let mut builder = ProblemBuilder::from(data);
        builder.add_var(Cone::Free, 2);
        let data = builder.finish();
        assert_eq!(data.var.dims, vec![3]);
    }
}
