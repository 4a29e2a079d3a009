use crate::problem::arcs::ArcFamily;
use crate::problem::bounds::{Bounds, DemandModel};
use crate::problem::circle::CircleInstance;

pub mod arcs;
pub mod bounds;
pub mod circle;

pub type NodeId = usize;
pub type EdgeId = usize;
pub type Cost = i64;

/// An instance together with everything derived from it that both solvers read.
///
/// The arc family and the bounds are computed once and only ever borrowed, so the exact
/// solver and the decomposition can work on the same prepared instance concurrently.
#[derive(Debug)]
pub struct PreparedInstance<'a> {
    pub instance: &'a CircleInstance,
    pub arcs: ArcFamily,
    pub bounds: Bounds,
}

impl<'a> PreparedInstance<'a> {
    pub fn new(instance: &'a CircleInstance, model: DemandModel) -> Self {
        let arcs = ArcFamily::generate(instance.len());
        let bounds = Bounds::calculate(instance.vertices(), &arcs, model);
        Self {
            instance,
            arcs,
            bounds,
        }
    }

    pub fn num_edges(&self) -> usize {
        self.instance.len()
    }
}
