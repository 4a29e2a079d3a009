use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::problem::circle::{CircleInstance, InstanceError, Vertex};
use crate::problem::{Cost, PreparedInstance};
use crate::solver::comparison::Comparison;
use crate::solver::exact::build_program;
use crate::solver::{SolutionRecord, SolveConfig, SolverResult};
use crate::utils::Tolerance;

pub const CURRENT_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexDocument {
    pub low: i64,
    pub high: i64,
}

/// On-disk form of a circle. Documents without a version are read as version 1.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    pub vertices: Vec<VertexDocument>,
    pub edge_costs: Vec<Cost>,
}

impl From<&CircleInstance> for InstanceDocument {
    fn from(instance: &CircleInstance) -> Self {
        Self {
            version: Some(CURRENT_VERSION),
            vertices: instance
                .vertices()
                .iter()
                .map(|v| VertexDocument {
                    low: v.low,
                    high: v.high,
                })
                .collect(),
            edge_costs: instance.edge_costs().to_vec(),
        }
    }
}

impl TryFrom<InstanceDocument> for CircleInstance {
    type Error = InstanceError;

    fn try_from(doc: InstanceDocument) -> Result<Self, Self::Error> {
        match doc.version {
            None | Some(CURRENT_VERSION) => {}
            Some(other) => return Err(InstanceError::UnsupportedVersion(other)),
        }
        CircleInstance::new(
            doc.vertices
                .iter()
                .map(|v| Vertex::new(v.low, v.high))
                .collect(),
            doc.edge_costs,
        )
    }
}

/// Which optional parts of a solve end up in the solution document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OutputOptions {
    /// Drop capacity vectors and keep values only.
    pub only_results: bool,
    pub show_constraints: bool,
    pub show_steps: bool,
    pub add_declaration: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordDocument {
    pub value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacities: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duals: Option<BTreeMap<String, f64>>,
}

impl RecordDocument {
    fn new(record: &SolutionRecord, options: &OutputOptions) -> Self {
        Self {
            value: record.value,
            capacities: (!options.only_results).then(|| record.capacities.clone()),
            duals: record.duals.as_ref().map(|duals| {
                duals
                    .iter()
                    .filter(|(_, y)| **y > f64::tol())
                    .map(|(label, y)| (label.clone(), *y))
                    .collect()
            }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepDocument {
    pub max_flow: i64,
    #[serde(flatten)]
    pub record: RecordDocument,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramDocument {
    pub target: String,
    pub constraints: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SolutionDocument {
    pub optimal: RecordDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<ProgramDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iterative: Option<RecordDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<StepDocument>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<InstanceDocument>,
}

impl SolutionDocument {
    pub fn new(
        instance: &CircleInstance,
        result: &SolverResult,
        config: &SolveConfig,
        options: &OutputOptions,
    ) -> Self {
        let program = options.show_constraints.then(|| {
            let prepared = PreparedInstance::new(instance, config.demand_model);
            let rhs: Vec<f64> = prepared.bounds.b.iter().map(|b| *b as f64).collect();
            let lp = build_program(&prepared, &rhs, config.domain());
            ProgramDocument {
                target: lp.render_objective(),
                constraints: (0..lp.constraints().len())
                    .map(|row| lp.render_constraint(row))
                    .collect(),
            }
        });

        let iterative = result.iterative.as_ref();
        Self {
            optimal: RecordDocument::new(&result.optimal, options),
            program,
            iterative: iterative.map(|it| RecordDocument {
                duals: None,
                ..RecordDocument::new(&it.record, options)
            }),
            steps: iterative.filter(|_| options.show_steps).map(|it| {
                it.levels
                    .iter()
                    .map(|level| StepDocument {
                        max_flow: level.max_flow,
                        record: RecordDocument::new(&level.record, options),
                    })
                    .collect()
            }),
            comparison: result.comparison.clone(),
            declaration: options
                .add_declaration
                .then(|| InstanceDocument::from(instance)),
        }
    }
}
