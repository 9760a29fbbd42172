use crate::{Matrix, Vector};

use serde::ser::SerializeStruct;
use serde::Deserialize;

impl serde::Serialize for Vector {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.as_slice())
    }
}

impl<'de> serde::Deserialize<'de> for Vector {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        Vec::<f64>::deserialize(deserializer).map(Vector::from)
    }
}

impl serde::Serialize for Matrix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("Matrix", 3)?;
        state.serialize_field("rows", &self.rows())?;
        state.serialize_field("cols", &self.cols())?;
        state.serialize_field("data", self.as_slice())?;
        state.end()
    }
}

impl<'de> serde::Deserialize<'de> for Matrix {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct MatrixData {
            rows: usize,
            cols: usize,
            data: Vec<f64>,
        }

        let MatrixData { rows, cols, data } = MatrixData::deserialize(deserializer)?;

        Matrix::from_row_packed(&data, rows, cols).map_err(serde::de::Error::custom)
    }
}
