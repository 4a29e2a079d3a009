use log::debug;

use crate::lp::{LinearProgramSolver, SolverFailure};
use crate::problem::PreparedInstance;
use crate::solver::exact::solve_lp;
use crate::solver::{SolutionRecord, SolveConfig};

/// The extension problem solved for one capacity level.
#[derive(Clone, Debug, PartialEq)]
pub struct LevelRecord {
    pub max_flow: i64,
    pub record: SolutionRecord,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IterativeResult {
    pub record: SolutionRecord,
    pub levels: Vec<LevelRecord>,
}

/// Arc bounds capped at a maximum flow of `level`.
pub fn capped_bounds(b: &[i64], level: i64) -> Vec<f64> {
    b.iter().map(|b| (*b).min(level) as f64).collect()
}

/// Right-hand side of the extension problem: the capped bounds minus what `accumulated`
/// already provides on the two boundary edges. Entries may be negative.
pub fn extension_rhs(prepared: &PreparedInstance, level: i64, accumulated: &[f64]) -> Vec<f64> {
    capped_bounds(&prepared.bounds.b, level)
        .into_iter()
        .zip(prepared.arcs.boundary_edges())
        .map(|(b, (left, right))| b - accumulated[left] - accumulated[right])
        .collect()
}

/// Builds capacities level by level, from `b_min` up to `b_max`.
///
/// Level `k` only asks for the capacity needed on top of levels `b_min..k`, so the levels
/// have to be processed in increasing order. The result is feasible for the full bounds
/// but not necessarily optimal.
pub fn solve_iterative(
    prepared: &PreparedInstance,
    config: &SolveConfig,
    solver: &dyn LinearProgramSolver,
) -> Result<IterativeResult, SolverFailure> {
    let bounds = &prepared.bounds;
    let mut accumulated = vec![0.0; prepared.num_edges()];
    let mut levels = Vec::with_capacity(bounds.num_levels());

    for level in bounds.b_min..=bounds.b_max {
        let rhs = extension_rhs(prepared, level, &accumulated);
        let record = solve_lp(prepared, &rhs, config.domain(), config.duals, solver)?;
        accumulated
            .iter_mut()
            .zip(record.capacities.iter())
            .for_each(|(u, e)| *u += e);
        debug!(
            "level {}/{}: extension value {}, accumulated {:?}",
            level, bounds.b_max, record.value, accumulated
        );

        #[cfg(feature = "search_assertions")]
        crate::utils::validator::validate_capacities(
            prepared,
            &capped_bounds(&bounds.b, level),
            &accumulated,
            None,
        )
        .assert_valid();

        levels.push(LevelRecord {
            max_flow: level,
            record,
        });
    }

    Ok(IterativeResult {
        record: SolutionRecord::new(prepared.instance, accumulated, None),
        levels,
    })
}

#[cfg(test)]
mod tests {
    use rand::Rng;

    use crate::generator::{create_circle, GeneratorConfig};
    use crate::lp::micro::MicroLpSolver;
    use crate::problem::bounds::DemandModel;
    use crate::problem::circle::tests::circle;
    use crate::solver::exact::solve_exact;
    use crate::utils::create_seeded_rng;
    use crate::utils::validator::validate_capacities;

    use super::*;

    #[test]
    fn capping_limits_every_bound() {
        assert_eq!(vec![1.0, 2.0, 2.0, 0.0], capped_bounds(&[1, 2, 5, 0], 2));
    }

    #[test]
    fn extension_subtracts_boundary_capacity() {
        let instance = circle(&[(0, 2), (-2, 0)], &[1, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        // arcs: [0] -> (1, 0), [1] -> (0, 1)
        assert_eq!(vec![0.5, 0.5], extension_rhs(&prepared, 2, &[1.0, 0.5]));
        assert_eq!(vec![-0.5, -0.5], extension_rhs(&prepared, 1, &[1.0, 0.5]));
    }

    #[test]
    fn one_level_per_unit_of_flow() -> anyhow::Result<()> {
        let instance = circle(&[(0, 2), (-2, 0)], &[1, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        let res = solve_iterative(&prepared, &SolveConfig::default(), &MicroLpSolver::default())?;

        assert_eq!(vec![1, 2], res.levels.iter().map(|l| l.max_flow).collect::<Vec<_>>());
        for level in &res.levels {
            assert_eq!(vec![1.0, 0.0], level.record.capacities);
            assert_eq!(1.0, level.record.value);
        }
        assert_eq!(vec![2.0, 0.0], res.record.capacities);
        assert_eq!(2.0, res.record.value);
        Ok(())
    }

    #[test]
    fn degenerate_instance_has_no_levels() -> anyhow::Result<()> {
        let instance = circle(&[(0, 1), (0, 3)], &[1, 1]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        assert!(prepared.bounds.is_degenerate());
        let res = solve_iterative(&prepared, &SolveConfig::default(), &MicroLpSolver::default())?;
        assert!(res.levels.is_empty());
        assert_eq!(vec![0.0, 0.0], res.record.capacities);
        Ok(())
    }

    #[test]
    fn accumulated_capacities_cover_every_capped_level() -> anyhow::Result<()> {
        let solver = MicroLpSolver::default();
        for demand_model in [DemandModel::MultiBound, DemandModel::SingleSourceDemand] {
            let mut rng = create_seeded_rng(4711);
            let config = SolveConfig {
                demand_model,
                ..SolveConfig::default()
            };
            for _ in 0..10 {
                let size = rng.gen_range(3..6);
                let instance = create_circle(&GeneratorConfig::with_size(size), &mut rng)?;
                let prepared = PreparedInstance::new(&instance, demand_model);
                let res = solve_iterative(&prepared, &config, &solver)?;

                let mut accumulated = vec![0.0; size];
                for level in &res.levels {
                    accumulated
                        .iter_mut()
                        .zip(level.record.capacities.iter())
                        .for_each(|(u, e)| *u += e);
                    let rhs = capped_bounds(&prepared.bounds.b, level.max_flow);
                    let check = validate_capacities(&prepared, &rhs, &accumulated, None);
                    assert!(
                        check.is_valid(),
                        "{:?} level {}: {:?}",
                        demand_model,
                        level.max_flow,
                        check
                    );
                }

                let full: Vec<f64> = prepared.bounds.b.iter().map(|b| *b as f64).collect();
                let check = validate_capacities(
                    &prepared,
                    &full,
                    &res.record.capacities,
                    Some(res.record.value),
                );
                assert!(check.is_valid(), "{:?}: {:?}", demand_model, check);

                let exact = solve_exact(&prepared, &config, &solver)?;
                assert!(exact.value <= res.record.value + 1e-6);
            }
        }
        Ok(())
    }
}
