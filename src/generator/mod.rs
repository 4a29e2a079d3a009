use rand::seq::SliceRandom;
use rand_distr::{Distribution, Normal, NormalError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::problem::circle::{CircleInstance, InstanceError, Vertex};
use crate::problem::Cost;
use crate::utils::Random;

/// Rejection sampling gives up after this many draws for a single value.
const MAX_DRAWS: usize = 10_000;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("invalid distribution: {0}")]
    Distribution(#[from] NormalError),
    #[error("no valid {what} after {draws} draws, check the means and deviations")]
    Exhausted { what: &'static str, draws: usize },
    #[error(transparent)]
    Instance(#[from] InstanceError),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct GeneratorConfig {
    pub size: usize,
    /// Mean distance of `low` and `high` from zero.
    pub b_mean: f64,
    pub b_dev: f64,
    pub c_mean: f64,
    pub c_dev: f64,
    /// Draw bounds from `{-1, 0, 1}` instead of the normal distribution.
    pub binary: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            size: 5,
            b_mean: 3.0,
            b_dev: 1.0,
            c_mean: 5.0,
            c_dev: 1.0,
            binary: false,
        }
    }
}

impl GeneratorConfig {
    pub fn with_size(size: usize) -> Self {
        Self {
            size,
            ..Self::default()
        }
    }
}

/// Draws a random circle. Bounds are `round(N(m, d))` and `round(N(-m, d))` sorted into
/// `low`/`high`, costs are `round(N(c, s))`. Draws producing `low == high` or a
/// non-positive cost are repeated.
pub fn create_circle(
    config: &GeneratorConfig,
    rng: &mut Random,
) -> Result<CircleInstance, GeneratorError> {
    let costs = Normal::new(config.c_mean, config.c_dev)?;
    let vertices = if config.binary {
        (0..config.size)
            .map(|_| create_binary_vertex(rng))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let positive = Normal::new(config.b_mean, config.b_dev)?;
        let negative = Normal::new(-config.b_mean, config.b_dev)?;
        (0..config.size)
            .map(|_| {
                draw("vertex", rng, |rng| {
                    let a = positive.sample(rng).round() as i64;
                    let b = negative.sample(rng).round() as i64;
                    (a != b).then(|| Vertex::new(a.min(b), a.max(b)))
                })
            })
            .collect::<Result<Vec<_>, _>>()?
    };
    let edge_costs = (0..config.size)
        .map(|_| {
            draw("edge cost", rng, |rng| {
                let c = costs.sample(rng).round() as Cost;
                (c > 0).then_some(c)
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CircleInstance::new(vertices, edge_costs)?)
}

fn create_binary_vertex(rng: &mut Random) -> Result<Vertex, GeneratorError> {
    const VALUES: [i64; 3] = [-1, 0, 1];
    draw("vertex", rng, |rng| {
        let a = *VALUES.choose(rng)?;
        let b = *VALUES.choose(rng)?;
        (a != b).then(|| Vertex::new(a.min(b), a.max(b)))
    })
}

fn draw<T>(
    what: &'static str,
    rng: &mut Random,
    mut sample: impl FnMut(&mut Random) -> Option<T>,
) -> Result<T, GeneratorError> {
    (0..MAX_DRAWS)
        .find_map(|_| sample(rng))
        .ok_or(GeneratorError::Exhausted {
            what,
            draws: MAX_DRAWS,
        })
}

#[cfg(test)]
mod tests {
    use crate::utils::create_seeded_rng;

    use super::*;

    #[test]
    fn generated_circles_have_requested_size() -> anyhow::Result<()> {
        let mut rng = create_seeded_rng(1);
        for size in 2..8 {
            let instance = create_circle(&GeneratorConfig::with_size(size), &mut rng)?;
            assert_eq!(size, instance.len());
            assert_eq!(size, instance.edge_costs().len());
        }
        Ok(())
    }

    #[test]
    fn bounds_straddle_zero_for_large_means() -> anyhow::Result<()> {
        let mut rng = create_seeded_rng(2);
        let config = GeneratorConfig {
            size: 20,
            b_mean: 50.0,
            ..GeneratorConfig::default()
        };
        let instance = create_circle(&config, &mut rng)?;
        assert!(instance.vertices().iter().all(|v| v.low < 0 && v.high > 0));
        Ok(())
    }

    #[test]
    fn costs_are_resampled_until_positive() -> anyhow::Result<()> {
        let mut rng = create_seeded_rng(3);
        let config = GeneratorConfig {
            size: 30,
            c_mean: 0.0,
            c_dev: 2.0,
            ..GeneratorConfig::default()
        };
        let instance = create_circle(&config, &mut rng)?;
        assert!(instance.edge_costs().iter().all(|c| *c > 0));
        Ok(())
    }

    #[test]
    fn binary_bounds_come_from_unit_set() -> anyhow::Result<()> {
        let mut rng = create_seeded_rng(4);
        let config = GeneratorConfig {
            size: 50,
            binary: true,
            ..GeneratorConfig::default()
        };
        let instance = create_circle(&config, &mut rng)?;
        for v in instance.vertices() {
            assert!([(-1, 0), (-1, 1), (0, 1)].contains(&(v.low, v.high)));
        }
        Ok(())
    }

    #[test]
    fn impossible_costs_are_reported() {
        let mut rng = create_seeded_rng(5);
        let config = GeneratorConfig {
            c_mean: -3.0,
            c_dev: 0.0,
            ..GeneratorConfig::default()
        };
        assert!(matches!(
            create_circle(&config, &mut rng),
            Err(GeneratorError::Exhausted {
                what: "edge cost",
                ..
            })
        ));
    }

    #[test]
    fn same_seed_same_circle() -> anyhow::Result<()> {
        let config = GeneratorConfig::with_size(6);
        let a = create_circle(&config, &mut create_seeded_rng(99))?;
        let b = create_circle(&config, &mut create_seeded_rng(99))?;
        assert_eq!(a, b);
        Ok(())
    }

    #[test]
    fn too_small_circles_are_rejected() {
        let mut rng = create_seeded_rng(6);
        assert!(matches!(
            create_circle(&GeneratorConfig::with_size(1), &mut rng),
            Err(GeneratorError::Instance(InstanceError::TooFewVertices(1)))
        ));
    }
}
