//! Logistic population growth with an initial lag phase. All functions are
//! pure; time is expressed in minutes and density as OD600.

use growbench_schemas::numeric::RawNumeric;
use std::f64::consts::LN_2;

/// Floor for the carrying capacity when the harvest target is low.
pub const DEFAULT_CARRYING_CAPACITY: f64 = 4.0;

/// Carrying capacity for a given harvest target: `max(4.0, target * 1.2)`.
/// Keeps K strictly above the harvest target by a margin while giving a sane
/// floor for low-density targets. An unparsable target counts as 0.
pub fn carrying_capacity(target_harvest_od: &RawNumeric) -> f64 {
    let harvest_od = target_harvest_od.parse_or(0.0);
    DEFAULT_CARRYING_CAPACITY.max(harvest_od * 1.2)
}

/// OD600 after `elapsed_minutes`: flat at `start_od` through the lag phase,
/// then the standard logistic solution, clamped to `k` to guard against
/// numeric overshoot for extreme inputs.
pub fn current_od(
    elapsed_minutes: f64,
    start_od: f64,
    doubling_time: f64,
    lag_time: f64,
    k: f64,
) -> f64 {
    if elapsed_minutes <= lag_time {
        return start_od;
    }
    let growth_time = elapsed_minutes - lag_time;
    let mu = LN_2 / doubling_time;
    let od = (k * start_od) / (start_od + (k - start_od) * (-mu * growth_time).exp());
    od.min(k)
}

/// Inverts the logistic solution: minutes (lag included) until the culture
/// reaches `target_od`. Returns `None` when the inversion is undefined, i.e.
/// when either logarithm argument would be non-positive (`target_od >= k` or
/// `start_od >= k`). Callers treat `target_od <= start_od` as "no growth
/// phase" before calling.
pub fn time_to_reach_od(
    start_od: f64,
    target_od: f64,
    doubling_time: f64,
    lag_time: f64,
    k: f64,
) -> Option<f64> {
    let mu = LN_2 / doubling_time;
    let numerator = k / target_od - 1.0;
    let denominator = k / start_od - 1.0;
    if numerator <= 0.0 || denominator <= 0.0 {
        return None;
    }
    let growth_minutes = -(1.0 / mu) * (numerator / denominator).ln();
    Some(lag_time + growth_minutes)
}

/// Minutes until the culture reaches 95% of carrying capacity, used to
/// annotate the stationary-phase boundary on charts. On numeric failure
/// (e.g. `start_od >= k`) falls back to `harvest_time * 1.2`; only a chart
/// annotation depends on this, so the fallback is silent.
pub fn stationary_phase_start(
    start_od: f64,
    doubling_time: f64,
    lag_time: f64,
    k: f64,
    harvest_time: f64,
) -> f64 {
    let mu = LN_2 / doubling_time;
    let term_95 = 1.0 / 0.95 - 1.0;
    let term_start = k / start_od - 1.0;
    if term_start > 0.0 {
        let time_to_saturation = -(1.0 / mu) * (term_95 / term_start).ln();
        lag_time + time_to_saturation.max(0.0)
    } else {
        harvest_time * 1.2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn capacity_has_a_floor_and_a_margin() {
        assert_eq!(carrying_capacity(&"0.8".into()), 4.0);
        assert_eq!(carrying_capacity(&"5.0".into()), 6.0);
        assert_eq!(carrying_capacity(&"10".into()), 12.0);
        assert_eq!(carrying_capacity(&"".into()), 4.0, "unparsable counts as 0");
    }

    #[test]
    fn od_is_flat_through_the_lag_phase() {
        for t in [0.0, 5.0, 19.9, 20.0] {
            assert_eq!(current_od(t, 0.1, 20.0, 20.0, 4.0), 0.1);
        }
        assert!(current_od(20.1, 0.1, 20.0, 20.0, 4.0) > 0.1);
    }

    #[test]
    fn od_is_monotonic_and_bounded_by_k() {
        let k = 4.0;
        let mut last = 0.0;
        for i in 0..200 {
            let t = i as f64 * 10.0;
            let od = current_od(t, 0.1, 20.0, 20.0, k);
            assert!(od >= last, "logistic growth must be non-decreasing");
            assert!(od <= k, "OD must never exceed carrying capacity");
            last = od;
        }
        // Far out on the curve the culture saturates at K.
        assert!(close(current_od(1e6, 0.1, 20.0, 20.0, k), k, 1e-9));
    }

    #[test]
    fn inversion_is_consistent_with_forward_model() {
        let (start, doubling, lag, k) = (0.1, 20.0, 20.0, 4.0);
        for target in [0.2, 0.8, 2.0, 3.9] {
            let t = time_to_reach_od(start, target, doubling, lag, k)
                .expect("target strictly between start and K must invert");
            let od = current_od(t, start, doubling, lag, k);
            assert!(
                close(od, target, 1e-9),
                "round trip for target {} gave {}",
                target,
                od
            );
        }
    }

    #[test]
    fn inversion_rejects_unreachable_targets() {
        assert_eq!(time_to_reach_od(0.1, 4.0, 20.0, 20.0, 4.0), None);
        assert_eq!(time_to_reach_od(0.1, 5.0, 20.0, 20.0, 4.0), None);
        assert_eq!(time_to_reach_od(4.0, 2.0, 20.0, 20.0, 4.0), None);
    }

    #[test]
    fn harvest_time_matches_reference_scenario() {
        // inoculum 2.5 -> 500 mL at start 0.1, harvest 0.8, doubling 20,
        // lag 20: 20 + (-20/ln2) * ln((4/0.8 - 1)/(4/0.1 - 1))
        let t = time_to_reach_od(0.1, 0.8, 20.0, 20.0, 4.0).unwrap();
        let expected = 20.0 + (-20.0 / LN_2) * (4.0f64 / 39.0).ln();
        assert!(close(t, expected, 1e-9));
        assert!(t > 0.0 && t.is_finite());
        assert!(t < 180.0, "expected well under a few hours, got {}", t);
    }

    #[test]
    fn stationary_start_is_past_harvest_and_falls_back() {
        let harvest = time_to_reach_od(0.1, 0.8, 20.0, 20.0, 4.0).unwrap();
        let stationary = stationary_phase_start(0.1, 20.0, 20.0, 4.0, harvest);
        assert!(stationary > harvest);

        // start_od at or above K cannot invert; fall back to 1.2x harvest.
        let fallback = stationary_phase_start(4.0, 20.0, 20.0, 4.0, 100.0);
        assert_eq!(fallback, 120.0);
    }
}
