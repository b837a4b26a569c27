#[cfg(feature = "serde")]
#[test]
fn test_json_io() {
    use conicbench::problem::{Cone, ObjSense, ProblemBuilder, ProblemData};
    use std::io::{Seek, SeekFrom};

    let mut builder = ProblemBuilder::<f64>::new();
    builder.set_objsense(ObjSense::Maximize);
    builder.add_var(Cone::Free, 1);
    builder.add_var(Cone::RotatedQuadratic, 3);
    builder.add_con(Cone::Nonpositive, 2);
    builder.add_int_var(0);
    builder.add_obja(0, 1.0);
    builder.add_a(0, 0, 1.0);
    builder.add_a(1, 2, -2.0);
    builder.add_b(0, 4.0);
    let data = builder.finish();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    data.save_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let read_back = ProblemData::<f64>::load_from_file(&mut file).unwrap();
    assert_eq!(data, read_back);
}
