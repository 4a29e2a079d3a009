//! Backend-neutral linear programs and the solvers that can handle them.
//!
//! A [`LinearProgram`] only knows nonnegative variables (integer or continuous), named
//! `>=`/`<=` rows and a linear objective to minimize. Backends translate it into their own
//! model object, so the circle solvers never touch a solver library directly.

use std::sync::mpsc;
use std::sync::mpsc::RecvTimeoutError;
use std::thread;
use std::time::Duration;

use clap::ValueEnum;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "use-grb")]
pub mod gurobi;
pub mod micro;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SolverFailure {
    #[error("linear program is infeasible")]
    Infeasible,
    #[error("linear program is unbounded")]
    Unbounded,
    #[error("no solution within the time limit of {0:?}")]
    Timeout(Duration),
    #[error("solver backend failed: {0}")]
    Backend(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    Integer,
    Continuous,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Relation {
    GreaterEqual,
    LessEqual,
}

impl Relation {
    fn symbol(&self) -> &'static str {
        match self {
            Self::GreaterEqual => ">=",
            Self::LessEqual => "<=",
        }
    }

    /// Factor that turns a row with this relation into a `>=` row.
    fn sign(&self) -> f64 {
        match self {
            Self::GreaterEqual => 1.0,
            Self::LessEqual => -1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(usize);

impl VarId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Clone, Debug)]
pub struct Variable {
    pub name: String,
    pub cost: f64,
    pub domain: Domain,
}

#[derive(Clone, Debug)]
pub struct Constraint {
    pub name: String,
    pub terms: Vec<(VarId, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

#[derive(Clone, Debug, Default)]
pub struct LinearProgram {
    name: String,
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
}

impl LinearProgram {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: vec![],
            constraints: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a nonnegative variable without objective contribution.
    pub fn add_variable(&mut self, name: impl Into<String>, domain: Domain) -> VarId {
        self.variables.push(Variable {
            name: name.into(),
            cost: 0.0,
            domain,
        });
        VarId(self.variables.len() - 1)
    }

    /// Replaces the objective (always minimized).
    pub fn set_objective(&mut self, terms: impl IntoIterator<Item = (VarId, f64)>) {
        self.variables.iter_mut().for_each(|var| var.cost = 0.0);
        for (var, coeff) in terms {
            self.variables[var.0].cost += coeff;
        }
    }

    /// Adds a row and returns its index; repeated variables in `terms` are merged.
    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        terms: impl IntoIterator<Item = (VarId, f64)>,
        relation: Relation,
        rhs: f64,
    ) -> usize {
        let mut merged: Vec<(VarId, f64)> = vec![];
        for (var, coeff) in terms {
            debug_assert!(var.0 < self.variables.len());
            match merged.iter_mut().find(|(v, _)| *v == var) {
                Some((_, c)) => *c += coeff,
                None => merged.push((var, coeff)),
            }
        }
        self.constraints.push(Constraint {
            name: name.into(),
            terms: merged,
            relation,
            rhs,
        });
        self.constraints.len() - 1
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values.iter())
            .map(|(var, x)| var.cost * x)
            .sum()
    }

    /// The LP dual of the continuous relaxation, written as a minimization.
    ///
    /// Every row is first normalized to `a x >= b` (sign `s`), its dual variable `y >= 0`
    /// then belongs to the dual row `sum_j a_ji y_j <= c_i` of primal variable `i`, and the
    /// dual objective is `min -b^T y`. The dual value of the primal row is `s * y`.
    pub fn dual(&self) -> (LinearProgram, Vec<f64>) {
        let mut dual = LinearProgram::new(format!("{}-dual", self.name));
        let signs: Vec<f64> = self.constraints.iter().map(|c| c.relation.sign()).collect();
        let ys: Vec<VarId> = self
            .constraints
            .iter()
            .map(|c| dual.add_variable(format!("y_{}", c.name), Domain::Continuous))
            .collect();
        dual.set_objective(
            self.constraints
                .iter()
                .zip(ys.iter())
                .zip(signs.iter())
                .map(|((c, y), s)| (*y, -s * c.rhs)),
        );

        let mut columns: Vec<Vec<(VarId, f64)>> = vec![vec![]; self.variables.len()];
        for ((c, y), s) in self.constraints.iter().zip(ys.iter()).zip(signs.iter()) {
            for (var, coeff) in &c.terms {
                columns[var.0].push((*y, s * coeff));
            }
        }
        for (var, column) in self.variables.iter().zip(columns.into_iter()) {
            if !column.is_empty() {
                dual.add_constraint(format!("d_{}", var.name), column, Relation::LessEqual, var.cost);
            }
        }
        (dual, signs)
    }

    pub fn render_objective(&self) -> String {
        format!(
            "minimize {}",
            self.variables
                .iter()
                .filter(|var| var.cost != 0.0)
                .map(|var| format!("{}{}", format_coeff(var.cost), var.name))
                .join(" + ")
        )
    }

    pub fn render_constraint(&self, row: usize) -> String {
        let c = &self.constraints[row];
        let lhs = c
            .terms
            .iter()
            .map(|(var, coeff)| format!("{}{}", format_coeff(*coeff), self.variables[var.0].name))
            .join(" + ");
        format!("{}: {} {} {}", c.name, lhs, c.relation.symbol(), c.rhs)
    }
}

fn format_coeff(coeff: f64) -> String {
    if coeff == 1.0 {
        String::new()
    } else {
        format!("{}*", coeff)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LpSolution {
    pub objective: f64,
    pub values: Vec<f64>,
    /// One value per constraint, in insertion order, when requested.
    pub duals: Option<Vec<f64>>,
}

pub trait LinearProgramSolver: Send + Sync {
    fn name(&self) -> &'static str;

    fn solve(&self, program: &LinearProgram, want_duals: bool)
        -> Result<LpSolution, SolverFailure>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Backend {
    #[default]
    Microlp,
    Gurobi,
}

#[cfg(not(feature = "use-grb"))]
pub fn create_solver(
    backend: Backend,
    time_limit: Option<Duration>,
) -> anyhow::Result<Box<dyn LinearProgramSolver>> {
    match backend {
        Backend::Microlp => Ok(Box::new(micro::MicroLpSolver::new(time_limit))),
        Backend::Gurobi => Err(anyhow::Error::msg(
            "this executable was build without gurobi support -- recompile with 'use-grb' to enable.",
        )),
    }
}

#[cfg(feature = "use-grb")]
pub fn create_solver(
    backend: Backend,
    time_limit: Option<Duration>,
) -> anyhow::Result<Box<dyn LinearProgramSolver>> {
    match backend {
        Backend::Microlp => Ok(Box::new(micro::MicroLpSolver::new(time_limit))),
        Backend::Gurobi => Ok(Box::new(gurobi::GurobiSolver::new(time_limit))),
    }
}

/// Runs `job` on its own thread and stops waiting for it after `limit`.
///
/// The thread is not cancelled on timeout; it finishes in the background and its result is
/// dropped.
pub(crate) fn run_with_time_limit<T, F>(limit: Option<Duration>, job: F) -> Result<T, SolverFailure>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SolverFailure> + Send + 'static,
{
    let Some(limit) = limit else {
        return job();
    };
    let (tx, rx) = mpsc::channel();
    thread::Builder::new()
        .name("lp-solve".to_string())
        .spawn(move || {
            // the receiver is gone after a timeout
            let _ = tx.send(job());
        })
        .map_err(|e| SolverFailure::Backend(e.to_string()))?;
    match rx.recv_timeout(limit) {
        Ok(res) => res,
        Err(RecvTimeoutError::Timeout) => Err(SolverFailure::Timeout(limit)),
        Err(RecvTimeoutError::Disconnected) => Err(SolverFailure::Backend(
            "solver thread terminated without a result".to_string(),
        )),
    }
}
