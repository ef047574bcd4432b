/// Integer path cost.
///
/// All cost arithmetic is integer so that searches give bit-identical results on every machine.
pub type Cost = u32;

/// Sentinel for "not reached yet" or "cannot be reached".
///
/// None of the checked helpers in this module ever produce this value, so a finite cost can always
/// be told apart from an unreachable one.
pub const INFINITE_COST: Cost = Cost::MAX;

/// Largest finite cost.
pub const MAX_FINITE_COST: Cost = INFINITE_COST - 1;

// 46341 / 32768 approximates sqrt(2) to within 2e-6. Edge costs and the diagonal-distance
// estimate must both scale through `multiply_by_sqrt_two` or the estimate stops being a lower bound.
const SQRT_TWO_NUMERATOR: u64 = 46341;
const SQRT_TWO_DENOMINATOR: u64 = 32768;

/// Scales an orthogonal step cost to the cost of the equivalent diagonal step, rounding down.
///
/// The result is monotonic in `cost`.
///
/// Returns `None` if the result would not be a finite cost.
pub fn multiply_by_sqrt_two(cost: Cost) -> Option<Cost> {
    finite(cost as u64 * SQRT_TWO_NUMERATOR / SQRT_TWO_DENOMINATOR)
}

/// Adds two costs, returning `None` instead of overflowing into [`INFINITE_COST`].
pub fn add_cost(lhs: Cost, rhs: Cost) -> Option<Cost> {
    lhs.checked_add(rhs).filter(|&sum| sum != INFINITE_COST)
}

/// Applies a heuristic weight, given as a percentage, to an estimate.
///
/// The result saturates at [`MAX_FINITE_COST`]. Estimates only order the open list, so saturation
/// costs some precision but never correctness of the reported path costs.
pub fn scale_by_percentage(estimate: Cost, percentage: u32) -> Cost {
    let scaled = estimate as u64 * percentage as u64 / 100;
    scaled.min(MAX_FINITE_COST as u64) as Cost
}

fn finite(value: u64) -> Option<Cost> {
    Cost::try_from(value).ok().filter(|&cost| cost != INFINITE_COST)
}

#[test]
fn sqrt_two_scaling_is_monotonic() {
    assert_eq!(multiply_by_sqrt_two(0), Some(0));
    assert_eq!(multiply_by_sqrt_two(24), Some(33));
    assert_eq!(multiply_by_sqrt_two(100), Some(141));
    assert_eq!(multiply_by_sqrt_two(1000), Some(1414));
    assert_eq!(multiply_by_sqrt_two(MAX_FINITE_COST), None);

    let mut previous = 0;
    for cost in 0..10_000 {
        let scaled = multiply_by_sqrt_two(cost).unwrap();
        assert!(scaled >= previous);
        assert!((scaled as f64 - cost as f64 * std::f64::consts::SQRT_2).abs() < 1.0);
        previous = scaled;
    }
}

#[test]
fn checked_arithmetic_never_yields_infinity() {
    assert_eq!(add_cost(1, 2), Some(3));
    assert_eq!(add_cost(MAX_FINITE_COST, 0), Some(MAX_FINITE_COST));
    assert_eq!(add_cost(MAX_FINITE_COST, 1), None);
    assert_eq!(add_cost(INFINITE_COST, 1), None);

    assert_eq!(scale_by_percentage(100, 125), 125);
    assert_eq!(scale_by_percentage(3, 150), 4);
    assert_eq!(scale_by_percentage(MAX_FINITE_COST, 200), MAX_FINITE_COST);
}
