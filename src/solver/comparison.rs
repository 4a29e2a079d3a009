use std::cmp::Ordering;
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::problem::circle::CircleInstance;
use crate::problem::Cost;
use crate::utils::Tolerance;

const UNBOUNDED_MARKER: &str = "inf";

/// Cost of the decomposition relative to the exact optimum.
///
/// `Unbounded` marks a zero-cost optimum paired with a non-zero decomposition. It is kept
/// apart from every finite ratio and written as `"inf"` in documents.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Factor {
    Ratio(f64),
    Unbounded,
}

impl Factor {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }

    pub fn finite(&self) -> Option<f64> {
        match self {
            Self::Ratio(r) => Some(*r),
            Self::Unbounded => None,
        }
    }
}

impl PartialOrd for Factor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Ratio(a), Self::Ratio(b)) => a.partial_cmp(b),
            (Self::Unbounded, Self::Unbounded) => Some(Ordering::Equal),
            (Self::Unbounded, _) => Some(Ordering::Greater),
            (_, Self::Unbounded) => Some(Ordering::Less),
        }
    }
}

impl Display for Factor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ratio(r) => write!(f, "{:.4}", r),
            Self::Unbounded => write!(f, "{}", UNBOUNDED_MARKER),
        }
    }
}

impl Serialize for Factor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Ratio(r) => serializer.serialize_f64(*r),
            Self::Unbounded => serializer.serialize_str(UNBOUNDED_MARKER),
        }
    }
}

impl<'de> Deserialize<'de> for Factor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Ratio(f64),
            Marker(String),
        }
        match Repr::deserialize(deserializer)? {
            Repr::Ratio(r) => Ok(Self::Ratio(r)),
            Repr::Marker(m) if m == UNBOUNDED_MARKER => Ok(Self::Unbounded),
            Repr::Marker(m) => Err(serde::de::Error::custom(format!(
                "expected a number or \"{}\", found \"{}\"",
                UNBOUNDED_MARKER, m
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub edge_cost_sum: Cost,
    pub difference: f64,
    pub factor: Factor,
}

pub fn compare(instance: &CircleInstance, exact: &[f64], iterative: &[f64]) -> Comparison {
    let value = instance.capacity_cost(exact);
    let value_it = instance.capacity_cost(iterative);

    let factor = if value.abs() < f64::tol() {
        if value_it.abs() < f64::tol() {
            Factor::Ratio(1.0)
        } else {
            Factor::Unbounded
        }
    } else {
        Factor::Ratio(value_it / value)
    };

    Comparison {
        edge_cost_sum: instance.edge_cost_sum(),
        difference: value_it - value,
        factor,
    }
}
