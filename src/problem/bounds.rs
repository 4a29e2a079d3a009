use serde::{Deserialize, Serialize};

use crate::problem::arcs::ArcFamily;
use crate::problem::circle::Vertex;

/// How vertex bounds are turned into per-arc capacity requirements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DemandModel {
    /// Additive bounds, every pair of vertices may exchange flow.
    #[default]
    MultiBound,
    /// A single aggregate demand source, bounds collapse to pointwise maxima.
    SingleSourceDemand,
}

/// Right-hand sides of the arc constraints together with the range of capacity levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub b: Vec<i64>,
    pub b_min: i64,
    pub b_max: i64,
}

impl Bounds {
    pub fn calculate(vertices: &[Vertex], arcs: &ArcFamily, model: DemandModel) -> Self {
        let b = match model {
            DemandModel::MultiBound => calculate_b(vertices, arcs),
            DemandModel::SingleSourceDemand => calculate_r(&simplify_vertices(vertices), arcs),
        };
        let b_min = calculate_b_min(vertices);
        let b_max = b.iter().copied().max().unwrap_or(0);
        Self { b, b_min, b_max }
    }

    /// Zero capacity on every edge satisfies all constraints, nothing to optimize.
    pub fn is_degenerate(&self) -> bool {
        self.b_min > self.b_max
    }

    /// Number of decomposition levels, `b_max - b_min + 1` (or zero when degenerate).
    pub fn num_levels(&self) -> usize {
        if self.is_degenerate() {
            0
        } else {
            (self.b_max - self.b_min + 1) as usize
        }
    }
}

/// Worst-case imbalance each arc can produce, under both the supply and the demand framing.
pub fn calculate_b(vertices: &[Vertex], arcs: &ArcFamily) -> Vec<i64> {
    let total_low: i64 = vertices.iter().map(|v| v.low).sum();
    let total_high: i64 = vertices.iter().map(|v| v.high).sum();
    arcs.iter()
        .map(|arc| {
            let s_low: i64 = arc.nodes.iter().map(|&v| vertices[v].low).sum();
            let s_high: i64 = arc.nodes.iter().map(|&v| vertices[v].high).sum();
            let left = s_high.min(s_low - total_low);
            let right = (-s_low).min(total_high - s_high);
            left.max(right)
        })
        .collect()
}

/// Collapses each vertex to the largest amount it can exchange with a single other vertex.
///
/// Other vertices are the ones at a different position, so an identical copy of a vertex
/// still counts as a partner.
pub fn simplify_vertices(vertices: &[Vertex]) -> Vec<i64> {
    vertices
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let others = vertices
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .map(|(_, v)| v);
            let (other_low, other_high) = others.fold((0, 0), |(low, high), v| {
                (low.max(-v.low), high.max(v.high))
            });
            (-node.low).min(other_high).max(node.high.min(other_low))
        })
        .collect()
}

pub fn calculate_r(simplified: &[i64], arcs: &ArcFamily) -> Vec<i64> {
    arcs.iter()
        .map(|arc| {
            arc.nodes
                .iter()
                .map(|&v| simplified[v])
                .max()
                .unwrap_or(0)
        })
        .collect()
}

/// Minimum total flow the cycle has to carry.
pub fn calculate_b_min(vertices: &[Vertex]) -> i64 {
    let low: i64 = vertices.iter().map(|v| v.low.max(0)).sum();
    let high: i64 = vertices.iter().map(|v| (-v.high).max(0)).sum();
    low.max(high).max(1)
}
