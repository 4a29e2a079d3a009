use std::ops::Index;

use crate::problem::{EdgeId, NodeId};

/// A run of consecutive nodes on the cycle together with the two edges leaving it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arc {
    pub nodes: Vec<NodeId>,
    pub left_edge: EdgeId,
    pub right_edge: EdgeId,
}

impl Arc {
    fn consecutive(n: usize, start: NodeId, len: usize) -> Self {
        debug_assert!(len >= 1 && len < n);
        let nodes: Vec<NodeId> = (0..len).map(|j| (start + j) % n).collect();
        Self {
            left_edge: (start + n - 1) % n,
            right_edge: nodes[len - 1],
            nodes,
        }
    }

    pub fn label(&self) -> String {
        format!("S({}, {})", self.left_edge, self.right_edge)
    }
}

/// Every consecutive run of length `1..n` on a cycle with `n` nodes, `n * (n - 1)` arcs.
///
/// The order is fixed (outer loop over the start node, inner loop over the length); bound
/// vectors and constraint rows are parallel arrays indexed by position in this family.
#[derive(Clone, Debug)]
pub struct ArcFamily {
    arcs: Vec<Arc>,
}

impl ArcFamily {
    pub fn generate(n: usize) -> Self {
        let mut arcs = Vec::with_capacity(n * n.saturating_sub(1));
        for start in 0..n {
            for len in 1..n {
                arcs.push(Arc::consecutive(n, start, len));
            }
        }
        Self { arcs }
    }

    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc> {
        self.arcs.iter()
    }

    /// Boundary edge pairs, in family order.
    pub fn boundary_edges(&self) -> impl Iterator<Item = (EdgeId, EdgeId)> + '_ {
        self.arcs.iter().map(|arc| (arc.left_edge, arc.right_edge))
    }
}

impl Index<usize> for ArcFamily {
    type Output = Arc;

    fn index(&self, index: usize) -> &Self::Output {
        &self.arcs[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_has_n_times_n_minus_one_arcs() {
        for n in 2..8 {
            assert_eq!(n * (n - 1), ArcFamily::generate(n).len());
        }
    }

    #[test]
    fn arcs_are_ordered_by_start_then_length() {
        let family = ArcFamily::generate(3);
        let nodes: Vec<Vec<usize>> = family.iter().map(|arc| arc.nodes.clone()).collect();
        assert_eq!(
            vec![
                vec![0],
                vec![0, 1],
                vec![1],
                vec![1, 2],
                vec![2],
                vec![2, 0]
            ],
            nodes
        );
    }

    #[test]
    fn boundary_edges_surround_the_run() {
        let family = ArcFamily::generate(3);
        assert_eq!(
            vec![(2, 0), (2, 1), (0, 1), (0, 2), (1, 2), (1, 0)],
            family.boundary_edges().collect::<Vec<_>>()
        );
        assert_eq!("S(2, 1)", family[1].label());
    }

    #[test]
    fn labels_are_unique() {
        let family = ArcFamily::generate(6);
        let mut labels: Vec<String> = family.iter().map(|arc| arc.label()).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(family.len(), labels.len());
    }

    #[test]
    fn boundary_edges_never_coincide() {
        let family = ArcFamily::generate(5);
        assert!(family.iter().all(|arc| arc.left_edge != arc.right_edge));
    }
}
