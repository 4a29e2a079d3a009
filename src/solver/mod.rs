use std::collections::BTreeMap;

use log::info;
use serde::{Deserialize, Serialize};
use took::{Timer, Took};

use crate::lp::{Backend, Domain, LinearProgramSolver, SolverFailure};
use crate::problem::bounds::DemandModel;
use crate::problem::circle::CircleInstance;
use crate::problem::PreparedInstance;
use crate::solver::comparison::{compare, Comparison};
use crate::solver::iterative::IterativeResult;
use crate::utils::logging::{format_log_comparison, format_log_method_record_timed};

pub mod comparison;
pub mod exact;
pub mod iterative;

/// Capacities for every edge, their cost and (for continuous solves) the arc duals.
#[derive(Clone, Debug, PartialEq)]
pub struct SolutionRecord {
    pub value: f64,
    pub capacities: Vec<f64>,
    pub duals: Option<BTreeMap<String, f64>>,
}

impl SolutionRecord {
    /// The value is recomputed from the capacities instead of taken from the solver.
    pub fn new(
        instance: &CircleInstance,
        capacities: Vec<f64>,
        duals: Option<BTreeMap<String, f64>>,
    ) -> Self {
        Self {
            value: instance.capacity_cost(&capacities),
            capacities,
            duals,
        }
    }

    pub fn zero(num_edges: usize) -> Self {
        Self {
            value: 0.0,
            capacities: vec![0.0; num_edges],
            duals: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SolveConfig {
    pub demand_model: DemandModel,
    /// Solve the continuous relaxation and report arc duals.
    pub duals: bool,
    pub compare_iterative: bool,
    pub backend: Backend,
    pub time_limit_in_seconds: Option<f64>,
}

impl Default for SolveConfig {
    fn default() -> Self {
        Self {
            demand_model: DemandModel::MultiBound,
            duals: false,
            compare_iterative: false,
            backend: Backend::Microlp,
            time_limit_in_seconds: None,
        }
    }
}

impl SolveConfig {
    pub fn domain(&self) -> Domain {
        if self.duals {
            Domain::Continuous
        } else {
            Domain::Integer
        }
    }
}

pub struct SolverResult {
    pub optimal: SolutionRecord,
    pub iterative: Option<IterativeResult>,
    pub comparison: Option<Comparison>,
    pub time: Took,
}

/// Solves one instance exactly and, if configured, with the level decomposition.
///
/// Both solves only read the prepared instance, so with the `parallel` feature they run
/// side by side. A failure of either one fails the whole call.
pub fn solve(
    instance: &CircleInstance,
    config: &SolveConfig,
    solver: &dyn LinearProgramSolver,
) -> Result<SolverResult, SolverFailure> {
    let timer = Timer::new();
    let prepared = PreparedInstance::new(instance, config.demand_model);
    info!(
        "{} arcs, b_min {}, b_max {}{}",
        prepared.arcs.len(),
        prepared.bounds.b_min,
        prepared.bounds.b_max,
        if prepared.bounds.is_degenerate() {
            " (degenerate)"
        } else {
            ""
        }
    );

    let (optimal, iterative) = if config.compare_iterative {
        let run_exact = || {
            let timer = Timer::new();
            exact::solve_exact(&prepared, config, solver).map(|it| (it, timer.took()))
        };
        let run_iterative = || {
            let timer = Timer::new();
            iterative::solve_iterative(&prepared, config, solver).map(|it| (it, timer.took()))
        };
        #[cfg(feature = "parallel")]
        let (optimal, iterative) = rayon::join(run_exact, run_iterative);
        #[cfg(not(feature = "parallel"))]
        let (optimal, iterative) = (run_exact(), run_iterative());

        let (optimal, took) = optimal?;
        info!("{}", format_log_method_record_timed("exact", &optimal, took));
        let (iterative, took) = iterative?;
        info!(
            "{}",
            format_log_method_record_timed("iterative", &iterative.record, took)
        );
        (optimal, Some(iterative))
    } else {
        let optimal = exact::solve_exact(&prepared, config, solver)?;
        info!(
            "{}",
            format_log_method_record_timed("exact", &optimal, timer.took())
        );
        (optimal, None)
    };

    let comparison = iterative
        .as_ref()
        .map(|it| compare(instance, &optimal.capacities, &it.record.capacities));
    if let Some(comparison) = &comparison {
        info!("{}", format_log_comparison(comparison));
    }

    Ok(SolverResult {
        optimal,
        iterative,
        comparison,
        time: timer.took(),
    })
}
