use std::time::Duration;

use grb::expr::LinExpr;
use log::trace;

use crate::lp::{Domain, LinearProgram, LinearProgramSolver, LpSolution, Relation, SolverFailure};

impl From<grb::Error> for SolverFailure {
    fn from(e: grb::Error) -> Self {
        SolverFailure::Backend(e.to_string())
    }
}

/// Gurobi backend; duals are read from the `Pi` attribute of the continuous model.
#[derive(Clone, Debug, Default)]
pub struct GurobiSolver {
    time_limit: Option<Duration>,
}

impl GurobiSolver {
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self { time_limit }
    }
}

impl LinearProgramSolver for GurobiSolver {
    fn name(&self) -> &'static str {
        "gurobi"
    }

    fn solve(
        &self,
        program: &LinearProgram,
        want_duals: bool,
    ) -> Result<LpSolution, SolverFailure> {
        // generate environment first so we can disable all output
        let mut env = grb::Env::empty()?;
        env.set(grb::parameter::IntParam::OutputFlag, 0)?;
        let env = env.start()?;

        let mut model = grb::Model::with_env(program.name(), &env)?;
        model.set_param(grb::parameter::IntParam::Threads, 1)?;
        if let Some(limit) = self.time_limit {
            model.set_param(grb::parameter::DoubleParam::TimeLimit, limit.as_secs_f64())?;
        }

        let mut vars = Vec::with_capacity(program.variables().len());
        for var in program.variables() {
            let v = match var.domain {
                Domain::Integer => {
                    grb::add_intvar!(model, name: var.name.as_str(), obj: var.cost)?
                }
                Domain::Continuous => {
                    grb::add_ctsvar!(model, name: var.name.as_str(), obj: var.cost)?
                }
            };
            vars.push(v);
        }

        let mut constrs = Vec::with_capacity(program.constraints().len());
        for constraint in program.constraints() {
            let mut expr = LinExpr::new();
            for (var, coeff) in &constraint.terms {
                expr.add_term(*coeff, vars[var.index()]);
            }
            let rhs = constraint.rhs;
            let c = match constraint.relation {
                Relation::GreaterEqual => {
                    model.add_constr(constraint.name.as_str(), grb::c!(expr >= rhs))?
                }
                Relation::LessEqual => {
                    model.add_constr(constraint.name.as_str(), grb::c!(expr <= rhs))?
                }
            };
            constrs.push(c);
        }

        model.set_attr(grb::attr::ModelSense, grb::ModelSense::Minimize)?;
        model.optimize()?;

        let status = model.status()?;
        trace!("gurobi: '{}' finished with {:?}", program.name(), status);
        match status {
            grb::Status::Optimal => {}
            grb::Status::Infeasible => return Err(SolverFailure::Infeasible),
            grb::Status::Unbounded | grb::Status::InfOrUnbd => {
                return Err(SolverFailure::Unbounded)
            }
            grb::Status::TimeLimit => {
                return Err(SolverFailure::Timeout(self.time_limit.unwrap_or_default()))
            }
            other => {
                return Err(SolverFailure::Backend(format!(
                    "no optimal solution (Status: {:?})",
                    other
                )))
            }
        }

        let mut values = Vec::with_capacity(vars.len());
        for (var, v) in program.variables().iter().zip(vars.iter()) {
            let x = model.get_obj_attr(grb::attr::X, v)?;
            values.push(match var.domain {
                Domain::Integer => x.round(),
                Domain::Continuous => x,
            });
        }

        let duals = if want_duals {
            let mut duals = Vec::with_capacity(constrs.len());
            for c in &constrs {
                duals.push(model.get_obj_attr(grb::attr::Pi, c)?);
            }
            Some(duals)
        } else {
            None
        };

        Ok(LpSolution {
            objective: program.objective_value(&values),
            values,
            duals,
        })
    }
}
