use std::{fs, io};

use serde::{Deserialize, Serialize};

use crate::math::Matrix;
use crate::models::Network;

#[derive(Serialize, Deserialize)]
struct NetworkState {
    names: Vec<String>,
    weights: Vec<(usize, usize, Vec<f32>)>,
}

fn collect_state(net: &mut dyn Network) -> NetworkState {
    let mut names = Vec::new();
    let mut weights = Vec::new();
    for (name, layer) in net.layers_mut() {
        names.push(name.to_string());
        for p in layer.parameters_mut() {
            weights.push((p.rows, p.cols, p.data.clone()));
        }
    }
    NetworkState { names, weights }
}

/// Persist a network's parameters to disk.
///
/// Layer names are stored alongside the raw matrices so a load into a
/// mismatched architecture fails instead of silently scrambling weights.
pub fn save_network(path: &str, net: &mut dyn Network) -> Result<(), io::Error> {
    let state = collect_state(net);
    let bin = bincode::serialize(&state).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    if let Some(parent) = std::path::Path::new(path).parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, bin)?;
    crate::info!("Saved network weights to {}", path);
    Ok(())
}

/// Load parameters saved by [`save_network`] into a network of the same
/// architecture.
pub fn load_network(path: &str, net: &mut dyn Network) -> Result<(), io::Error> {
    let bin = fs::read(path)?;
    let state: NetworkState =
        bincode::deserialize(&bin).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;

    let mut params = Vec::new();
    let mut names = Vec::new();
    for (name, layer) in net.layers_mut() {
        names.push(name.to_string());
        params.extend(layer.parameters_mut());
    }
    if names != state.names || params.len() != state.weights.len() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "saved weights do not match this network architecture",
        ));
    }
    for (p, (rows, cols, data)) in params.into_iter().zip(state.weights.into_iter()) {
        if p.rows != rows || p.cols != cols {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "saved weight matrix has a different shape",
            ));
        }
        *p = Matrix::from_vec(rows, cols, data);
    }
    crate::info!("Loaded network weights from {}", path);
    Ok(())
}
