use std::path::PathBuf;
use std::sync::Mutex;

use log::{debug, warn};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::generator::{create_circle, GeneratorConfig, GeneratorError};
use crate::io::documents::InstanceDocument;
use crate::lp::{LinearProgramSolver, SolverFailure};
use crate::problem::circle::CircleInstance;
use crate::solver::comparison::Factor;
use crate::solver::{solve, SolveConfig};
use crate::utils::{
    create_child_rng, DefaultSearchTracker, Random, SearchProgressIterationTracker, Tolerance,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SearchConfig {
    pub tries: usize,
    /// Write the report to an automatically named file in this directory.
    pub output_dir: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tries: 100,
            output_dir: None,
        }
    }
}

/// Summary of a batch of random instances, worst decomposition first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub results: Vec<Factor>,
    pub worst_value: Factor,
    pub worst_declaration: Option<InstanceDocument>,
    /// Mean and population standard deviation of the finite factors.
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub deformed: Vec<InstanceDocument>,
    pub unbounded: usize,
    pub failures: usize,
}

#[derive(Clone)]
pub enum TrialOutcome {
    Compared {
        instance: CircleInstance,
        factor: Factor,
    },
    Failed(SolverFailure),
}

/// Factors below one mean the decomposition beat the optimum, which only happens when a
/// solve went wrong.
pub fn is_deformed(factor: &Factor) -> bool {
    match factor {
        Factor::Unbounded => true,
        Factor::Ratio(r) => *r < 1.0 - f64::tol(),
    }
}

fn run_trial(
    trial: usize,
    generator: &GeneratorConfig,
    config: &SolveConfig,
    solver: &dyn LinearProgramSolver,
    rng: &mut Random,
) -> Result<TrialOutcome, GeneratorError> {
    let instance = create_circle(generator, rng)?;
    let comparison = solve(&instance, config, solver).and_then(|res| {
        res.comparison
            .ok_or_else(|| SolverFailure::Backend("decomposition was not run".to_string()))
    });
    let outcome = match comparison {
        Ok(comparison) => TrialOutcome::Compared {
            instance,
            factor: comparison.factor,
        },
        Err(failure) => {
            warn!("trial {} skipped: {}", trial, failure);
            TrialOutcome::Failed(failure)
        }
    };
    Ok(outcome)
}

/// Progress display state shared by all trials of a search.
struct SearchProgress<T> {
    tracker: T,
    worst: Factor,
}

impl<T: SearchProgressIterationTracker> SearchProgress<T> {
    fn new(tracker: T) -> Self {
        Self {
            tracker,
            worst: Factor::Ratio(1.0),
        }
    }

    fn record(&mut self, outcome: &Result<TrialOutcome, GeneratorError>) {
        if let Ok(TrialOutcome::Compared { factor, .. }) = outcome {
            if *factor > self.worst {
                self.worst = *factor;
            }
            self.tracker.update(Some(&self.worst), Some(factor));
        }
        self.tracker.inc();
    }
}

/// Generates `tries` random circles and compares exact and decomposed capacities on each.
///
/// Every trial gets its own generator derived from `rng`, so the report only depends on
/// the seed and not on how trials are scheduled.
pub fn run_search(
    search: &SearchConfig,
    generator: &GeneratorConfig,
    config: &SolveConfig,
    solver: &dyn LinearProgramSolver,
    rng: &mut Random,
) -> Result<SearchReport, GeneratorError> {
    let config = SolveConfig {
        compare_iterative: true,
        ..config.clone()
    };
    let rngs = (0..search.tries)
        .map(|_| create_child_rng(rng))
        .collect::<Vec<Random>>();
    let progress = Mutex::new(SearchProgress::new(DefaultSearchTracker::new(
        search.tries as u64,
    )));

    let outcomes: Result<Vec<TrialOutcome>, GeneratorError> = {
        #[cfg(feature = "parallel")]
        let iter = rngs.into_par_iter();
        #[cfg(not(feature = "parallel"))]
        let iter = rngs.into_iter();

        iter.enumerate()
            .map(|(trial, mut rng)| {
                let outcome = run_trial(trial, generator, &config, solver, &mut rng);
                if let Ok(mut progress) = progress.lock() {
                    progress.record(&outcome);
                }
                outcome
            })
            .collect()
    };

    Ok(summarize(outcomes?))
}

/// Folds trial outcomes (in trial order) into a report.
pub fn summarize(outcomes: Vec<TrialOutcome>) -> SearchReport {
    let mut report = SearchReport {
        results: Vec::with_capacity(outcomes.len()),
        worst_value: Factor::Ratio(1.0),
        worst_declaration: None,
        mean: None,
        std: None,
        deformed: Vec::new(),
        unbounded: 0,
        failures: 0,
    };
    let (mut count, mut sum, mut sum_sq) = (0usize, 0.0, 0.0);

    for outcome in outcomes {
        let (instance, factor) = match outcome {
            TrialOutcome::Compared { instance, factor } => (instance, factor),
            TrialOutcome::Failed(_) => {
                report.failures += 1;
                continue;
            }
        };
        report.results.push(factor);
        match factor.finite() {
            Some(r) => {
                count += 1;
                sum += r;
                sum_sq += r * r;
            }
            None => report.unbounded += 1,
        }
        if factor > report.worst_value {
            debug!("new worst factor {}", factor);
            report.worst_value = factor;
            report.worst_declaration = Some(InstanceDocument::from(&instance));
        }
        if is_deformed(&factor) {
            report.deformed.push(InstanceDocument::from(&instance));
        }
    }

    if count > 0 {
        let mean = sum / count as f64;
        report.mean = Some(mean);
        report.std = Some((sum_sq / count as f64 - mean * mean).max(0.0).sqrt());
    }
    report
}
