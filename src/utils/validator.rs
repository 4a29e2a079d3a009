use crate::problem::PreparedInstance;
use crate::utils::Tolerance;

#[derive(Debug, PartialEq)]
pub enum Violation {
    WrongLength { expected: usize, actual: usize },
    NegativeCapacity { edge: usize, value: f64 },
    ArcBound { arc: String, required: f64, provided: f64 },
}

#[derive(Debug, PartialEq)]
pub enum ValidatorResult {
    Valid(f64),
    ConstraintViolation(Violation),
    ObjectiveMismatch(f64),
}

impl ValidatorResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    pub fn assert_valid(&self) {
        match self {
            Self::Valid(_) => {}
            Self::ConstraintViolation(violation) => {
                panic!("{:?}", violation)
            }
            Self::ObjectiveMismatch(value) => {
                panic!("ObjectiveMismatch({})", value)
            }
        }
    }
}

/// Checks `capacities[left(S)] + capacities[right(S)] >= rhs[S]` for every arc and,
/// if given, that `value` matches the capacity cost.
pub fn validate_capacities(
    prepared: &PreparedInstance,
    rhs: &[f64],
    capacities: &[f64],
    value: Option<f64>,
) -> ValidatorResult {
    use ValidatorResult::*;
    use Violation::*;

    if capacities.len() != prepared.num_edges() {
        return ConstraintViolation(WrongLength {
            expected: prepared.num_edges(),
            actual: capacities.len(),
        });
    }
    if let Some((edge, value)) = capacities
        .iter()
        .enumerate()
        .find(|(_, u)| **u < -f64::tol())
    {
        return ConstraintViolation(NegativeCapacity {
            edge,
            value: *value,
        });
    }

    for (arc, required) in prepared.arcs.iter().zip(rhs.iter()) {
        let provided = capacities[arc.left_edge] + capacities[arc.right_edge];
        if provided < required - f64::tol() {
            return ConstraintViolation(ArcBound {
                arc: arc.label(),
                required: *required,
                provided,
            });
        }
    }

    let cost = prepared.instance.capacity_cost(capacities);
    match value {
        Some(value) if (value - cost).abs() > f64::tol() => ObjectiveMismatch(cost),
        _ => Valid(cost),
    }
}

#[cfg(test)]
mod tests {
    use crate::problem::bounds::DemandModel;
    use crate::problem::circle::tests::circle;

    use super::ValidatorResult::*;
    use super::Violation::*;
    use super::*;

    #[test]
    fn covering_capacities_are_valid() {
        let instance = circle(&[(-1, 1), (-1, 1), (-1, 1)], &[1, 2, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        let result = validate_capacities(&prepared, &[1.0; 6], &[1.0, 0.0, 1.0], Some(4.0));
        assert_eq!(Valid(4.0), result);
        result.assert_valid();
    }

    #[test]
    fn uncovered_arc_is_reported_by_label() {
        let instance = circle(&[(-1, 1), (-1, 1), (-1, 1)], &[1, 2, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        // S(0, 1) only sees edges 0 and 1
        let result = validate_capacities(&prepared, &[1.0; 6], &[0.0, 0.0, 1.0], None);
        assert_eq!(
            ConstraintViolation(ArcBound {
                arc: "S(0, 1)".to_string(),
                required: 1.0,
                provided: 0.0
            }),
            result
        );
    }

    #[test]
    fn shape_and_sign_are_checked_first() {
        let instance = circle(&[(0, 2), (-2, 0)], &[1, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        assert_eq!(
            ConstraintViolation(WrongLength {
                expected: 2,
                actual: 3
            }),
            validate_capacities(&prepared, &[2.0; 2], &[2.0, 0.0, 0.0], None)
        );
        assert_eq!(
            ConstraintViolation(NegativeCapacity {
                edge: 1,
                value: -1.0
            }),
            validate_capacities(&prepared, &[2.0; 2], &[3.0, -1.0], None)
        );
    }

    #[test]
    fn wrong_value_is_a_mismatch() {
        let instance = circle(&[(0, 2), (-2, 0)], &[1, 3]);
        let prepared = PreparedInstance::new(&instance, DemandModel::MultiBound);
        assert_eq!(
            ObjectiveMismatch(2.0),
            validate_capacities(&prepared, &[2.0; 2], &[2.0, 0.0], Some(3.0))
        );
    }

    #[test]
    #[should_panic]
    fn assert_valid_panics_on_violation() {
        ValidatorResult::ObjectiveMismatch(1.0).assert_valid();
    }
}
