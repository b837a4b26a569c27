use conicbench::io::{read_cbf, write_cbf, CbfReader, CbfWriter, ProblemReader, ProblemWriter};
use conicbench::problem::{Cone, ObjSense, ProblemBuilder, ProblemData};

fn example_lp() -> ProblemData<f64> {
    // minimize x0 + 2 x1 subject to x0 + x1 >= 3
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

fn rich_model() -> ProblemData<f64> {
    let mut data = ProblemData::<f64>::new();
    data.objsense = ObjSense::Maximize;
    data.var.push(Cone::Free, 2);
    data.var.push(Cone::Quadratic, 3);
    data.con.push(Cone::Zero, 1);
    data.con.push(Cone::Quadratic, 3);
    data.int_vars = vec![0, 3];
    data.psdvar_dims = vec![2];
    data.psdcon_dims = vec![3];
    data.objf.push(0, 1, 0, 2.0);
    data.obja.push(0, -1.0);
    data.objb = 1.5;
    data.f.push(0, 0, 0, 0, 1.0);
    data.a.push(3, 1, 2.5);
    data.b.push(1, 0.5);
    data.h.push(0, 4, 2, 1, -1.0);
    data.d.push(0, 2, 2, 4.0);
    data
}

#[test]
fn round_trip_is_bit_exact() {
    let data = example_lp();

    let mut text = Vec::new();
    write_cbf(&mut text, &data).unwrap();
    let back = read_cbf::<f64, _>(&text[..]).unwrap();
    assert_eq!(data, back);

    // a second pass reproduces the file byte for byte
    let mut text2 = Vec::new();
    write_cbf(&mut text2, &back).unwrap();
    assert_eq!(text, text2);
}

#[test]
fn rich_model_survives_a_round_trip() {
    let data = rich_model();
    data.validate().unwrap();

    let mut text = Vec::new();
    write_cbf(&mut text, &data).unwrap();
    let back = read_cbf::<f64, _>(&text[..]).unwrap();
    assert_eq!(data, back);
}

#[test]
fn empty_model_survives_a_round_trip() {
    let mut text = Vec::new();
    write_cbf(&mut text, &ProblemData::<f64>::new()).unwrap();
    let back = read_cbf::<f64, _>(&text[..]).unwrap();
    assert_eq!(back, ProblemData::<f64>::new());
}

#[test]
fn round_trip_through_the_registry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.cbf");

    CbfWriter.write_file(&path, &example_lp()).unwrap();
    let back = CbfReader.read_file(&path).unwrap();
    assert_eq!(back, example_lp());
}

#[test]
fn block_structure_is_preserved_verbatim() {
    // adjacent blocks of the same cone are kept apart, unlike in the builder
    let mut data = ProblemData::<f64>::new();
    data.con.push(Cone::Nonnegative, 1);
    data.con.push(Cone::Nonnegative, 2);

    let mut text = Vec::new();
    write_cbf(&mut text, &data).unwrap();
    let back = read_cbf::<f64, _>(&text[..]).unwrap();
    assert_eq!(back.con.cones, vec![Cone::Nonnegative, Cone::Nonnegative]);
    assert_eq!(back.con.dims, vec![1, 2]);
}

#[test]
fn commentary_and_number_formats_are_tolerated() {
    let text = "\
# problem: tiny portfolio rebalancing instance
VER
1

# maximize expected return
OBJSENSE
MAX

VAR
3 2
F 1
L+ 2

OBJACOORD
2
0 2.5e-1
2 -1e0

CON
1 1
L= 1

ACOORD
1
# spread across all assets
0 0 1.0
";
    let data = read_cbf::<f64, _>(text.as_bytes()).unwrap();
    assert_eq!(data.objsense, ObjSense::Maximize);
    assert_eq!(data.varnum(), 3);
    assert_eq!(data.obja.val, vec![0.25, -1.0]);
    assert_eq!(data.con.cones, vec![Cone::Zero]);
}

#[test]
fn extreme_values_round_trip_exactly() {
    let mut data = ProblemData::<f64>::new();
    data.var.push(Cone::Free, 3);
    data.obja.push(0, f64::MIN_POSITIVE);
    data.obja.push(1, -0.1);
    data.obja.push(2, 1.0 / 3.0);

    let mut text = Vec::new();
    write_cbf(&mut text, &data).unwrap();
    let back = read_cbf::<f64, _>(&text[..]).unwrap();
    assert_eq!(data.obja.val, back.obja.val);
}
