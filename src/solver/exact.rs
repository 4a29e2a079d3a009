use log::{debug, info};

use crate::lp::{Domain, LinearProgram, LinearProgramSolver, Relation, SolverFailure, VarId};
use crate::problem::PreparedInstance;
use crate::solver::{SolutionRecord, SolveConfig};

/// One capacity variable per edge and one covering row per arc:
/// `u[left(S)] + u[right(S)] >= rhs[S]`, minimizing `sum u[i] * c[i]`.
pub fn build_program(prepared: &PreparedInstance, rhs: &[f64], domain: Domain) -> LinearProgram {
    debug_assert_eq!(rhs.len(), prepared.arcs.len());
    let mut lp = LinearProgram::new("circle");
    let capacities: Vec<VarId> = (0..prepared.num_edges())
        .map(|i| lp.add_variable(format!("u_{}", i), domain))
        .collect();
    lp.set_objective(
        capacities
            .iter()
            .zip(prepared.instance.edge_costs())
            .map(|(u, c)| (*u, *c as f64)),
    );
    for (arc, b) in prepared.arcs.iter().zip(rhs.iter()) {
        lp.add_constraint(
            arc.label(),
            [
                (capacities[arc.left_edge], 1.0),
                (capacities[arc.right_edge], 1.0),
            ],
            Relation::GreaterEqual,
            *b,
        );
    }
    lp
}

/// Solves the covering program for an arbitrary right-hand side.
///
/// Negative entries in `rhs` are allowed; nonnegative capacities satisfy them trivially.
pub fn solve_lp(
    prepared: &PreparedInstance,
    rhs: &[f64],
    domain: Domain,
    want_duals: bool,
    solver: &dyn LinearProgramSolver,
) -> Result<SolutionRecord, SolverFailure> {
    let program = build_program(prepared, rhs, domain);
    let solution = solver.solve(&program, want_duals)?;
    let duals = solution.duals.map(|duals| {
        prepared
            .arcs
            .iter()
            .zip(duals.into_iter())
            .map(|(arc, y)| (arc.label(), y))
            .collect()
    });
    Ok(SolutionRecord::new(prepared.instance, solution.values, duals))
}

pub fn solve_exact(
    prepared: &PreparedInstance,
    config: &SolveConfig,
    solver: &dyn LinearProgramSolver,
) -> Result<SolutionRecord, SolverFailure> {
    let bounds = &prepared.bounds;
    if bounds.is_degenerate() {
        info!(
            "b_min {} > b_max {}, zero capacities are optimal",
            bounds.b_min, bounds.b_max
        );
        return Ok(SolutionRecord::zero(prepared.num_edges()));
    }

    let rhs: Vec<f64> = bounds.b.iter().map(|b| *b as f64).collect();
    let record = solve_lp(prepared, &rhs, config.domain(), config.duals, solver)?;
    debug!("exact solution via {}: value {}", solver.name(), record.value);

    #[cfg(feature = "search_assertions")]
    crate::utils::validator::validate_capacities(
        prepared,
        &rhs,
        &record.capacities,
        Some(record.value),
    )
    .assert_valid();

    Ok(record)
}

#[cfg(test)]
mod tests {
    use crate::lp::micro::MicroLpSolver;
    use crate::problem::bounds::DemandModel;
    use crate::problem::circle::tests::circle;
    use crate::utils::assert_capacities_eq;
    use crate::utils::validator::validate_capacities;

    use super::*;

    fn config(duals: bool) -> SolveConfig {
        SolveConfig {
            duals,
            ..SolveConfig::default()
        }
    }

    #[test]
    fn program_has_one_row_per_arc() {
        let instance = circle(&[(-1, 1), (-1, 1), (-1, 1)], &[1, 2, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        let lp = build_program(&prepared, &[1.0; 6], Domain::Integer);
        assert_eq!(3, lp.variables().len());
        assert_eq!(6, lp.constraints().len());
        assert_eq!("S(2, 0): u_2 + u_0 >= 1", lp.render_constraint(0));
        assert_eq!("minimize u_0 + 2*u_1 + 3*u_2", lp.render_objective());
    }

    #[test]
    fn symmetric_circle_gets_equal_fractional_capacities() -> anyhow::Result<()> {
        let instance = circle(&[(-1, 1), (-1, 1), (-1, 1)], &[1, 1, 1]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        let record = solve_exact(&prepared, &config(true), &MicroLpSolver::default())?;
        assert_capacities_eq(&[0.5, 0.5, 0.5], &record.capacities);
        assert!((record.value - 1.5).abs() < 1e-6);

        // strong duality: sum b_S * y_S equals the optimum
        let duals = record.duals.unwrap();
        assert_eq!(6, duals.len());
        assert!(duals.values().all(|y| *y >= -1e-9));
        let dual_value: f64 = duals.values().sum();
        assert!((dual_value - 1.5).abs() < 1e-6);
        Ok(())
    }

    #[test]
    fn symmetric_circle_integer_optimum() -> anyhow::Result<()> {
        let instance = circle(&[(-1, 1), (-1, 1), (-1, 1)], &[1, 1, 1]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        let record = solve_exact(&prepared, &config(false), &MicroLpSolver::default())?;
        assert_eq!(2.0, record.value);
        assert!(record.duals.is_none());
        assert!(validate_capacities(&prepared, &[1.0; 6], &record.capacities, Some(2.0)).is_valid());
        Ok(())
    }

    #[test]
    fn cheaper_edge_carries_the_flow() -> anyhow::Result<()> {
        let instance = circle(&[(0, 2), (-2, 0)], &[1, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        assert_eq!(vec![2, 2], prepared.bounds.b);
        let record = solve_exact(&prepared, &config(false), &MicroLpSolver::default())?;
        assert_eq!(vec![2.0, 0.0], record.capacities);
        assert_eq!(2.0, record.value);
        Ok(())
    }

    #[test]
    fn degenerate_instance_skips_the_solver() -> anyhow::Result<()> {
        struct Unreachable;
        impl LinearProgramSolver for Unreachable {
            fn name(&self) -> &'static str {
                "unreachable"
            }
            fn solve(
                &self,
                _: &LinearProgram,
                _: bool,
            ) -> Result<crate::lp::LpSolution, SolverFailure> {
                panic!("degenerate instances must not reach the solver")
            }
        }

        let instance = circle(&[(0, 1), (0, 1), (0, 1)], &[4, 5, 6]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        let record = solve_exact(&prepared, &config(false), &Unreachable)?;
        assert_eq!(vec![0.0; 3], record.capacities);
        assert_eq!(0.0, record.value);
        Ok(())
    }
}
