use super::FileError;
use crate::floats::FloatT;
use crate::problem::ProblemData;

use serde::{de::DeserializeOwned, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

impl<T> ProblemData<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Writes the problem to an open file as JSON.
    pub fn save_to_file(&self, file: &mut File) -> Result<(), FileError> {
        let json = serde_json::to_string(self).map_err(io::Error::from)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Reads a problem written by [`ProblemData::save_to_file`] and
    /// validates it.
    pub fn load_from_file(file: &mut File) -> Result<Self, FileError> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let data: Self = serde_json::from_str(&buffer).map_err(io::Error::from)?;
        data.validate()?;
        Ok(data)
    }
}

#[test]
fn test_json_io() {
    use crate::problem::{Cone, ProblemBuilder};
    use std::io::{Seek, SeekFrom};

    let mut builder = ProblemBuilder::<f64>::new();
    builder.add_var(Cone::Free, 2);
    builder.add_con(Cone::Nonnegative, 1);
    builder.add_obja(0, 1.0);
    builder.add_obja(1, 2.0);
    builder.add_a(0, 0, 1.0);
    builder.add_a(0, 1, 1.0);
    builder.add_b(0, -3.0);
    let data = builder.finish();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    data.save_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let read_back = ProblemData::<f64>::load_from_file(&mut file).unwrap();
    assert_eq!(data, read_back);
}

#[test]
fn test_json_load_rejects_invalid_data() {
    use std::io::{Seek, SeekFrom};

    let mut data = ProblemData::<f64>::new();
    data.var.push(crate::problem::Cone::Free, 1);
    data.a.push(0, 5, 1.0);

    let mut file = tempfile::tempfile().unwrap();
    data.save_to_file(&mut file).unwrap();

    file.seek(SeekFrom::Start(0)).unwrap();
    let err = ProblemData::<f64>::load_from_file(&mut file).unwrap_err();
    assert!(matches!(err, FileError::Data(_)));
}
