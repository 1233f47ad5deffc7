//! JSON state I/O for named tensors (the `Parameter`-shaped persistence the
//! tensor engine needs independent of the CSR binary format): a tensor's
//! shape and row-major data, tagged with an optional name, round-tripped
//! through `serde_json`. Separate from `crate::csr::io`, which persists the
//! graph's compiled topology as a byte-exact binary layout instead.

use crate::shape::Shape;
use crate::tensor::{Tensor, TensorResult};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Serializable snapshot of one `Tensor<f32>`: shape plus row-major data,
/// no gradient and no autograd record (a leaf on load).
#[derive(Serialize, Deserialize)]
pub struct TensorState {
    pub name: Option<String>,
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<f32>,
}

impl TensorState {
    pub fn from_tensor(name: impl Into<String>, t: &Tensor<f32>) -> Self {
        TensorState {
            name: Some(name.into()),
            rows: t.rows(),
            cols: t.cols(),
            data: t.to_vec(),
        }
    }

    pub fn into_tensor(self) -> TensorResult<Tensor<f32>> {
        Tensor::leaf(self.data, Shape::new(self.rows, self.cols))
    }
}

/// Save a state dict (a named list of tensor snapshots) to a JSON file.
pub fn save_state_dict(path: impl AsRef<Path>, states: &[TensorState]) -> std::io::Result<()> {
    let f = File::create(path)?;
    let w = BufWriter::new(f);
    serde_json::to_writer(w, states).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Load a state dict back from a JSON file.
pub fn load_state_dict(path: impl AsRef<Path>) -> std::io::Result<Vec<TensorState>> {
    let f = File::open(path)?;
    let r = BufReader::new(f);
    serde_json::from_reader(r).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tensor_state_round_trips_through_json_bytes() {
        let t = Tensor::<f32>::leaf(vec![1.0, 2.0, 3.0, 4.0], Shape::new(2, 2)).unwrap();
        let state = TensorState::from_tensor("w", &t);
        let json = serde_json::to_vec(&state).unwrap();
        let back: TensorState = serde_json::from_slice(&json).unwrap();
        let restored = back.into_tensor().unwrap();
        assert_eq!(restored.shape(), Shape::new(2, 2));
        assert_eq!(restored.to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn save_load_round_trip_through_a_real_file() {
        let t1 = Tensor::<f32>::leaf(vec![5.0, 6.0], Shape::new(1, 2)).unwrap();
        let t2 = Tensor::<f32>::leaf(vec![7.0], Shape::new(1, 1)).unwrap();
        let states = vec![TensorState::from_tensor("a", &t1), TensorState::from_tensor("b", &t2)];

        let mut path = std::env::temp_dir();
        path.push(format!("forge_core_state_{}.json", std::process::id()));
        save_state_dict(&path, &states).unwrap();
        let loaded = load_state_dict(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name.as_deref(), Some("a"));
        assert_eq!(loaded[0].data, vec![5.0, 6.0]);
        assert_eq!(loaded[1].data, vec![7.0]);
    }
}
