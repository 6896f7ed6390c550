// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

#![allow(dead_code)]

// Shared deterministic benchmark fixtures (no RNG).

use arcroute::model::{ArcRecord, GraphSnapshot, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub layers: usize,
    pub nodes_per_layer: usize,
    pub fanout: usize,
    /// Arcs pointing one layer back, which gives the solver cycles to rule out.
    pub back_arcs_per_node: usize,
}

impl Params {
    pub const fn new(
        layers: usize,
        nodes_per_layer: usize,
        fanout: usize,
        back_arcs_per_node: usize,
    ) -> Self {
        Self { layers, nodes_per_layer, fanout, back_arcs_per_node }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Small,
    Medium,
    MediumCyclic,
}

impl Case {
    pub const ALL: [Case; 3] = [Self::Small, Self::Medium, Self::MediumCyclic];

    pub fn id(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::MediumCyclic => "medium_cyclic",
        }
    }

    pub fn params(self) -> Params {
        match self {
            Self::Small => Params::new(3, 3, 2, 0),
            Self::Medium => Params::new(5, 4, 2, 0),
            Self::MediumCyclic => Params::new(5, 4, 2, 1),
        }
    }
}

pub fn node(name: &str) -> NodeId {
    NodeId::new(name).expect("valid node id")
}

fn layer_node(layer: usize, idx: usize) -> NodeId {
    node(&format!("l{layer:02}_n{idx:03}"))
}

fn weight(layer: usize, idx: usize, k: usize) -> f64 {
    ((layer * 5 + idx * 7 + k * 3) % 9 + 1) as f64
}

/// Layered graph from `S` through `params.layers` layers to `T`.
///
/// Forward arcs fan out to the next layer; back arcs (if any) point to the previous one.
pub fn layered(params: Params) -> Vec<ArcRecord> {
    assert!(params.layers >= 1, "layers must be >= 1");
    assert!(params.nodes_per_layer >= 1, "nodes_per_layer must be >= 1");

    let fanout = params.fanout.clamp(1, params.nodes_per_layer);
    let mut records = Vec::new();

    for idx in 0..params.nodes_per_layer {
        records.push(ArcRecord::arc(node("S"), layer_node(0, idx), weight(0, idx, 0)));
    }
    for layer in 0..params.layers {
        for idx in 0..params.nodes_per_layer {
            let from = layer_node(layer, idx);
            if layer + 1 == params.layers {
                records.push(ArcRecord::arc(from.clone(), node("T"), weight(layer, idx, 1)));
            } else {
                for k in 0..fanout {
                    let to = layer_node(layer + 1, (idx + k) % params.nodes_per_layer);
                    records.push(ArcRecord::arc(from.clone(), to, weight(layer + 1, idx, k)));
                }
            }
            if layer > 0 {
                for k in 0..params.back_arcs_per_node {
                    let to = layer_node(layer - 1, (idx + k + 1) % params.nodes_per_layer);
                    records.push(ArcRecord::arc(from.clone(), to, weight(layer, idx, k + 2)));
                }
            }
        }
    }
    records
}

pub fn snapshot(case: Case) -> GraphSnapshot {
    GraphSnapshot::from_records(&layered(case.params())).expect("snapshot")
}
