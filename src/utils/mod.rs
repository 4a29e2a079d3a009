#[cfg(feature = "progressbar")]
use std::io::Stdout;
use std::time::Duration;

use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

use crate::solver::comparison::Factor;

pub mod logging;
pub mod validator;

pub trait Tolerance {
    fn tol() -> Self;
}

impl Tolerance for f64 {
    fn tol() -> Self {
        0.001
    }
}

pub type Random = Pcg64Mcg;

pub fn create_seeded_rng(seed: i128) -> Random {
    let mut rng = Pcg64Mcg::from_seed(seed.to_le_bytes());
    // discard the first three
    rng.next_u64();
    rng.next_u64();
    rng.next_u64();
    rng
}

/// Derives an independent generator, e.g. one per batch trial.
pub fn create_child_rng(rng: &mut Random) -> Random {
    Random::new(((rng.next_u64() as u128) << 64) + rng.next_u64() as u128)
}

pub enum TimeLimit {
    Seconds(f64),
    None,
}

impl TimeLimit {
    pub fn from_seconds(seconds: Option<f64>) -> Self {
        match seconds {
            Some(seconds) if seconds > 0.0 => Self::Seconds(seconds),
            _ => Self::None,
        }
    }

    pub fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Seconds(seconds) => Some(Duration::from_secs_f64(*seconds)),
            Self::None => None,
        }
    }
}

pub trait SearchProgressIterationTracker {
    fn update(&mut self, worst: Option<&Factor>, current: Option<&Factor>);
    fn inc(&mut self);
}

pub struct DisabledSearchTracker {}

impl DisabledSearchTracker {
    pub fn new(_total: u64) -> Self {
        Self {}
    }
}

impl SearchProgressIterationTracker for DisabledSearchTracker {
    fn update(&mut self, _: Option<&Factor>, _: Option<&Factor>) {}
    fn inc(&mut self) {}
}

#[cfg(feature = "progressbar")]
pub struct PBRSearchTracker {
    progressbar: pbr::ProgressBar<Stdout>,
}

#[cfg(feature = "progressbar")]
impl PBRSearchTracker {
    pub fn new(total: u64) -> Self {
        Self {
            progressbar: pbr::ProgressBar::new(total),
        }
    }
}

#[cfg(feature = "progressbar")]
impl Drop for PBRSearchTracker {
    fn drop(&mut self) {
        self.progressbar.finish_println("");
    }
}

#[cfg(feature = "progressbar")]
impl SearchProgressIterationTracker for PBRSearchTracker {
    fn update(&mut self, worst: Option<&Factor>, current: Option<&Factor>) {
        self.progressbar.message(
            format!(
                "worst {} | current {} | ",
                worst
                    .map(|it| it.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                current
                    .map(|it| it.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            )
            .as_str(),
        );
    }

    fn inc(&mut self) {
        self.progressbar.inc();
    }
}

#[cfg(feature = "progressbar")]
pub type DefaultSearchTracker = PBRSearchTracker;

#[cfg(not(feature = "progressbar"))]
pub type DefaultSearchTracker = DisabledSearchTracker;

#[cfg(test)]
pub fn assert_capacities_eq(expect: &[f64], actual: &[f64]) {
    assert_eq!(
        expect.len(),
        actual.len(),
        "sizes of the capacity vecs differ (expect: {}, actual: {})",
        expect.len(),
        actual.len()
    );
    for (idx, (x, y)) in expect.iter().zip(actual.iter()).enumerate() {
        assert!(
            (x - y).abs() < f64::tol(),
            "capacities differ at edge {} ({} != {})\n expect: {:?}\n actual: {:?}",
            idx,
            x,
            y,
            expect,
            actual
        );
    }
}
