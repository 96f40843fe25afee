use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::synthetic::KNOWN_BACKENDS;

const DEFAULT_QUBIT_COUNT: u32 = 27;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QubitGroup {
    Core,
    Ancillary,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QubitNode {
    pub id: u32,
    pub group: QubitGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QubitLink {
    pub source: u32,
    pub target: u32,
    /// Coupling strength in `[0.8, 1.0)`.
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectivityGraph {
    pub nodes: Vec<QubitNode>,
    pub links: Vec<QubitLink>,
}

pub fn qubit_count_for(backend: &str) -> u32 {
    KNOWN_BACKENDS
        .iter()
        .find(|(name, _)| *name == backend)
        .map(|(_, qubits)| *qubits)
        .unwrap_or(DEFAULT_QUBIT_COUNT)
}

/// Demo coupling map for `backend`.
///
/// The generator is seeded from the backend name so a backend always renders
/// the same topology.
pub fn mock_connectivity(backend: &str) -> ConnectivityGraph {
    let seed: u64 = backend.chars().map(u64::from).sum();
    let mut rng = StdRng::seed_from_u64(seed);
    let qubits = qubit_count_for(backend);

    let nodes = (0..qubits)
        .map(|id| QubitNode {
            id,
            group: if rng.gen_bool(0.2) {
                QubitGroup::Ancillary
            } else {
                QubitGroup::Core
            },
        })
        .collect();

    let mut links = Vec::new();
    let mut seen = HashSet::new();
    let attempts = (qubits * 3 + 1) / 2;
    for _ in 0..attempts {
        let source = rng.gen_range(0..qubits);
        let target = rng.gen_range(0..qubits);
        if source == target {
            continue;
        }
        if seen.insert((source.min(target), source.max(target))) {
            links.push(QubitLink {
                source,
                target,
                value: rng.gen_range(0.8..1.0),
            });
        }
    }

    ConnectivityGraph { nodes, links }
}
