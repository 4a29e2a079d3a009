use std::fmt::{Debug, Formatter};

use thiserror::Error;

use crate::problem::{Cost, EdgeId, NodeId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InstanceError {
    #[error("a circle needs at least 2 vertices (found {0})")]
    TooFewVertices(usize),
    #[error("vertex {node} has low >= high ({low} >= {high})")]
    EmptyRange { node: NodeId, low: i64, high: i64 },
    #[error("{vertices} vertices but {edge_costs} edge costs")]
    LengthMismatch { vertices: usize, edge_costs: usize },
    #[error("edge {edge} has non-positive cost {cost}")]
    NonPositiveCost { edge: EdgeId, cost: Cost },
    #[error("unsupported document version {0}")]
    UnsupportedVersion(u32),
}

/// Allowed range of the net flow imbalance at a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Vertex {
    pub low: i64,
    pub high: i64,
}

impl Vertex {
    pub fn new(low: i64, high: i64) -> Self {
        Self { low, high }
    }
}

/// A cycle network: edge `i` connects vertex `i` with vertex `(i + 1) mod n`.
///
/// Instances are validated on construction and immutable afterwards, so every solver can
/// rely on `n >= 2`, `low < high` for every vertex and strictly positive edge costs.
#[derive(Clone, PartialEq, Eq)]
pub struct CircleInstance {
    vertices: Vec<Vertex>,
    edge_costs: Vec<Cost>,
}

impl CircleInstance {
    pub fn new(vertices: Vec<Vertex>, edge_costs: Vec<Cost>) -> Result<Self, InstanceError> {
        if vertices.len() != edge_costs.len() {
            return Err(InstanceError::LengthMismatch {
                vertices: vertices.len(),
                edge_costs: edge_costs.len(),
            });
        }
        if vertices.len() < 2 {
            return Err(InstanceError::TooFewVertices(vertices.len()));
        }
        if let Some((node, v)) = vertices.iter().enumerate().find(|(_, v)| v.low >= v.high) {
            return Err(InstanceError::EmptyRange {
                node,
                low: v.low,
                high: v.high,
            });
        }
        if let Some((edge, cost)) = edge_costs.iter().enumerate().find(|(_, c)| **c <= 0) {
            return Err(InstanceError::NonPositiveCost { edge, cost: *cost });
        }
        Ok(Self {
            vertices,
            edge_costs,
        })
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn edge_costs(&self) -> &[Cost] {
        &self.edge_costs
    }

    pub fn edge_cost_sum(&self) -> Cost {
        self.edge_costs.iter().sum()
    }

    /// Cost of a capacity vector, `sum capacities[i] * edge_costs[i]`.
    pub fn capacity_cost(&self, capacities: &[f64]) -> f64 {
        debug_assert_eq!(capacities.len(), self.edge_costs.len());
        capacities
            .iter()
            .zip(self.edge_costs.iter())
            .map(|(u, c)| u * *c as f64)
            .sum()
    }
}

impl Debug for CircleInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "circle with {} vertices:", self.len())?;
        for (i, (v, c)) in self.vertices.iter().zip(self.edge_costs.iter()).enumerate() {
            writeln!(f, "  {} [{}, {}] --({})--> {}", i, v.low, v.high, c, (i + 1) % self.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn circle(bounds: &[(i64, i64)], costs: &[Cost]) -> CircleInstance {
        CircleInstance::new(
            bounds.iter().map(|&(low, high)| Vertex::new(low, high)).collect(),
            costs.to_vec(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_single_vertex() {
        let res = CircleInstance::new(vec![Vertex::new(-1, 1)], vec![1]);
        assert_eq!(Err(InstanceError::TooFewVertices(1)), res);
    }

    #[test]
    fn rejects_empty_circle() {
        let res = CircleInstance::new(vec![], vec![]);
        assert_eq!(Err(InstanceError::TooFewVertices(0)), res);
    }

    #[test]
    fn rejects_equal_bounds() {
        let res = CircleInstance::new(vec![Vertex::new(-1, 1), Vertex::new(0, 0)], vec![1, 1]);
        assert_eq!(
            Err(InstanceError::EmptyRange {
                node: 1,
                low: 0,
                high: 0
            }),
            res
        );
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let res = CircleInstance::new(vec![Vertex::new(-1, 1), Vertex::new(-1, 1)], vec![1]);
        assert_eq!(
            Err(InstanceError::LengthMismatch {
                vertices: 2,
                edge_costs: 1
            }),
            res
        );
    }

    #[test]
    fn rejects_zero_cost() {
        let res = CircleInstance::new(vec![Vertex::new(-1, 1), Vertex::new(-1, 1)], vec![1, 0]);
        assert_eq!(Err(InstanceError::NonPositiveCost { edge: 1, cost: 0 }), res);
    }

    #[test]
    fn capacity_cost_is_scalar_product() {
        let instance = circle(&[(-1, 1), (0, 2), (-3, 0)], &[2, 3, 5]);
        assert_eq!(2.0 * 1.0 + 3.0 * 0.0 + 5.0 * 2.0, instance.capacity_cost(&[1.0, 0.0, 2.0]));
        assert_eq!(10, instance.edge_cost_sum());
    }
}
