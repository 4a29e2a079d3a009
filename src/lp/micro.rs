use std::time::Duration;

use log::trace;
use microlp::{ComparisonOp, OptimizationDirection, Problem};

use crate::lp::{
    run_with_time_limit, Domain, LinearProgram, LinearProgramSolver, LpSolution, Relation,
    SolverFailure,
};

/// Pure Rust backend on top of `microlp` (dual simplex with branch and bound for integers).
///
/// `microlp` does not report dual values, so when duals are requested the dual of the
/// continuous program is solved as a second problem.
#[derive(Clone, Debug, Default)]
pub struct MicroLpSolver {
    time_limit: Option<Duration>,
}

impl MicroLpSolver {
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self { time_limit }
    }
}

impl LinearProgramSolver for MicroLpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(
        &self,
        program: &LinearProgram,
        want_duals: bool,
    ) -> Result<LpSolution, SolverFailure> {
        let program = program.clone();
        run_with_time_limit(self.time_limit, move || solve_program(&program, want_duals))
    }
}

fn solve_program(program: &LinearProgram, want_duals: bool) -> Result<LpSolution, SolverFailure> {
    trace!(
        "microlp: solving '{}' ({} vars, {} rows)",
        program.name(),
        program.variables().len(),
        program.constraints().len()
    );
    let values = solve_primal(program)?;
    let objective = program.objective_value(&values);

    let duals = if want_duals {
        let (dual, signs) = program.dual();
        let ys = solve_primal(&dual).map_err(|failure| match failure {
            // a feasible bounded primal always has a feasible bounded dual
            SolverFailure::Infeasible | SolverFailure::Unbounded => {
                SolverFailure::Backend(format!("dual of '{}' is {}", program.name(), failure))
            }
            other => other,
        })?;
        trace!(
            "microlp: primal objective {}, dual objective {}",
            objective,
            -dual.objective_value(&ys)
        );
        Some(ys.iter().zip(signs.iter()).map(|(y, s)| y * s).collect())
    } else {
        None
    };

    Ok(LpSolution {
        objective,
        values,
        duals,
    })
}

fn solve_primal(program: &LinearProgram) -> Result<Vec<f64>, SolverFailure> {
    let mut problem = Problem::new(OptimizationDirection::Minimize);
    let vars: Vec<microlp::Variable> = program
        .variables()
        .iter()
        .map(|var| match var.domain {
            Domain::Integer => problem.add_integer_var(var.cost, (0, i32::MAX)),
            Domain::Continuous => problem.add_var(var.cost, (0.0, f64::INFINITY)),
        })
        .collect();

    for constraint in program.constraints() {
        let op = match constraint.relation {
            Relation::GreaterEqual => ComparisonOp::Ge,
            Relation::LessEqual => ComparisonOp::Le,
        };
        problem.add_constraint(
            constraint
                .terms
                .iter()
                .map(|(var, coeff)| (vars[var.index()], *coeff)),
            op,
            constraint.rhs,
        );
    }

    let solution = problem.solve().map_err(|e| match e {
        microlp::Error::Infeasible => SolverFailure::Infeasible,
        microlp::Error::Unbounded => SolverFailure::Unbounded,
        other => SolverFailure::Backend(other.to_string()),
    })?;

    Ok(program
        .variables()
        .iter()
        .zip(vars.iter())
        .map(|(var, x)| match var.domain {
            Domain::Integer => solution[*x].round(),
            Domain::Continuous => solution[*x],
        })
        .collect())
}
