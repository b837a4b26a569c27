use super::{ProblemTransform, TransformParams};
use crate::floats::FloatT;
use crate::problem::{Cone, ConeStack, ObjSense, ProblemData};
use std::mem::swap;

// Accumulated sign flips, applied to the coefficient lists in one pass at
// the end.  Swapping two lists swaps their pending flips as well.
#[derive(Debug, Default, Clone, Copy)]
struct FlipSigns {
    obja: bool,
    objf: bool,
    a: bool,
    f: bool,
    h: bool,
    b: bool,
    d: bool,
}

impl<T: FloatT> ProblemData<T> {
    /// Replaces the model with its conic dual.
    ///
    /// Constraint rows trade places with variables (and PSD constraint
    /// blocks with PSD variable blocks), the objective coefficient lists
    /// trade places with the constant coefficient lists, and the free and
    /// equality kinds swap roles in both cone stacks.  Integer variable
    /// markers are dropped, so the result is the dual of the continuous
    /// relaxation.  Applying the transformation twice returns the model
    /// to its original form apart from those markers.
    pub fn dualize(&mut self) {
        let mut flip = FlipSigns::default();

        self.flip_objsense(&mut flip);
        self.swap_obja_b(&mut flip);
        self.swap_objf_d(&mut flip);
        self.swap_f_h(&mut flip);
        self.transpose_a();
        self.int_vars.clear();
        self.swap_map_var(&mut flip);
        self.swap_psdmap_psdvar(&mut flip);
        self.flip_signs(flip);
    }

    fn flip_objsense(&mut self, flip: &mut FlipSigns) {
        if self.objsense == ObjSense::Maximize {
            self.objsense = ObjSense::Minimize;

            // flip the objective ahead of dualization
            flip.obja = !flip.obja;
            flip.objf = !flip.objf;

            // and the new objective after dualization
            flip.b = !flip.b;
            flip.d = !flip.d;
        } else {
            self.objsense = ObjSense::Maximize;
        }
    }

    fn swap_obja_b(&mut self, flip: &mut FlipSigns) {
        swap(&mut self.obja, &mut self.b);
        swap(&mut flip.obja, &mut flip.b);

        // dualization flips signs
        flip.obja = !flip.obja;
        flip.b = !flip.b;
    }

    fn swap_objf_d(&mut self, flip: &mut FlipSigns) {
        swap(&mut self.objf, &mut self.d);
        swap(&mut flip.objf, &mut flip.d);

        // dualization flips signs
        flip.objf = !flip.objf;
        flip.d = !flip.d;
    }

    // the outer row of one list is the block index of the other, so the
    // leading coordinate columns cross over
    fn swap_f_h(&mut self, flip: &mut FlipSigns) {
        swap(&mut self.f, &mut self.h);
        swap(&mut self.f.subi, &mut self.f.subj);
        swap(&mut self.h.subi, &mut self.h.subj);
        swap(&mut flip.f, &mut flip.h);
    }

    fn transpose_a(&mut self) {
        swap(&mut self.a.subi, &mut self.a.subj);
    }

    fn swap_map_var(&mut self, flip: &mut FlipSigns) {
        swap(&mut self.con, &mut self.var);
        dualize_linear_kinds(&mut self.con);
        dualize_linear_kinds(&mut self.var);

        // maps can not belong to negative domains
        flip.a = !flip.a;
        flip.f = !flip.f;
        flip.b = !flip.b;
    }

    fn swap_psdmap_psdvar(&mut self, flip: &mut FlipSigns) {
        swap(&mut self.psdcon_dims, &mut self.psdvar_dims);

        // psdmaps can not belong to negative domains
        flip.h = !flip.h;
        flip.d = !flip.d;
    }

    fn flip_signs(&mut self, flip: FlipSigns) {
        if flip.obja {
            negate(&mut self.obja.val);
        }
        if flip.objf {
            negate(&mut self.objf.val);
        }
        if flip.b {
            negate(&mut self.b.val);
        }
        if flip.d {
            negate(&mut self.d.val);
        }
        if flip.a {
            negate(&mut self.a.val);
        }
        if flip.f {
            negate(&mut self.f.val);
        }
        if flip.h {
            negate(&mut self.h.val);
        }
    }
}

// the dual of a free row is an equality on the multiplier and vice versa
fn dualize_linear_kinds(stack: &mut ConeStack) {
    for cone in stack.cones.iter_mut() {
        *cone = match *cone {
            Cone::Free => Cone::Zero,
            Cone::Zero => Cone::Free,
            other => other,
        };
    }
}

fn negate<T: FloatT>(vals: &mut [T]) {
    for v in vals.iter_mut() {
        *v = -*v;
    }
}

/// Conic dualization.
#[derive(Debug, Clone, Copy, Default)]
pub struct DualTransform;

impl ProblemTransform for DualTransform {
    fn name(&self) -> &'static str {
        "dual"
    }
    fn apply(&self, data: &mut ProblemData<f64>, _params: &TransformParams) {
        data.dualize();
    }
}

// -------------
// testing
// -------------

#[cfg(test)]
mod tests {
    use super::*;

    // min 1.0*x0 + 2.0*x1  s.t.  2.0*x0 + 3.0*x1 - 3.0 >= 0,  x free
    fn small_lp() -> ProblemData<f64> {
        let mut data = ProblemData::<f64>::new();
        data.objsense = ObjSense::Minimize;
        data.var.push(Cone::Free, 2);
        data.con.push(Cone::Nonnegative, 1);
        data.obja.push(0, 1.0);
        data.obja.push(1, 2.0);
        data.a.push(0, 0, 2.0);
        data.a.push(0, 1, 3.0);
        data.b.push(0, -3.0);
        data
    }

    #[test]
    fn dual_of_minimization_lp() {
        let mut data = small_lp();
        data.dualize();

        assert_eq!(data.objsense, ObjSense::Maximize);

        // rows and variables traded places, free relabeled to equality
        assert_eq!(data.con.cones, vec![Cone::Zero]);
        assert_eq!(data.con.dims, vec![2]);
        assert_eq!(data.var.cones, vec![Cone::Nonnegative]);
        assert_eq!(data.var.dims, vec![1]);

        // objective comes from the negated constants
        assert_eq!(data.obja.subi, vec![0]);
        assert_eq!(data.obja.val, vec![3.0]);

        // constants come from the old objective
        assert_eq!(data.b.subi, vec![0, 1]);
        assert_eq!(data.b.val, vec![1.0, 2.0]);

        // matrix transposed and negated
        assert_eq!(data.a.subi, vec![0, 1]);
        assert_eq!(data.a.subj, vec![0, 0]);
        assert_eq!(data.a.val, vec![-2.0, -3.0]);

        assert!(data.validate().is_ok());
    }

    #[test]
    fn dual_is_an_involution() {
        let mut data = ProblemData::<f64>::new();
        data.objsense = ObjSense::Maximize;
        data.var.push(Cone::Free, 2);
        data.var.push(Cone::Quadratic, 3);
        data.con.push(Cone::Zero, 1);
        data.con.push(Cone::Nonnegative, 2);
        data.psdvar_dims.push(2);
        data.psdcon_dims.push(3);
        data.objb = 5.0;
        data.obja.push(1, 1.5);
        data.objf.push(0, 1, 0, -2.0);
        data.a.push(2, 4, 2.5);
        data.a.push(0, 0, -1.0);
        data.b.push(1, 4.0);
        data.f.push(1, 0, 1, 1, 3.0);
        data.h.push(0, 3, 2, 1, -0.5);
        data.d.push(0, 0, 0, 9.0);

        let original = data.clone();
        data.dualize();
        assert_ne!(data, original);
        assert!(data.validate().is_ok());
        data.dualize();
        assert_eq!(data, original);
    }

    #[test]
    fn integer_markers_are_dropped() {
        let mut data = small_lp();
        data.int_vars.push(1);

        data.dualize();
        assert!(data.int_vars.is_empty());
        data.dualize();
        assert!(data.int_vars.is_empty());
    }

    #[test]
    fn product_cones_keep_their_kind() {
        let mut data = ProblemData::<f64>::new();
        data.con.push(Cone::Quadratic, 3);
        data.con.push(Cone::Free, 1);
        data.var.push(Cone::RotatedQuadratic, 4);
        data.var.push(Cone::Zero, 2);

        data.dualize();
        assert_eq!(data.con.cones, vec![Cone::RotatedQuadratic, Cone::Free]);
        assert_eq!(data.var.cones, vec![Cone::Quadratic, Cone::Zero]);
    }
}
