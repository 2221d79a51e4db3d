//! Dilution arithmetic for the two pipetting modes. Inputs are validated
//! (finite, positive) by the calculator before they reach this module.

use crate::error::CalcError;
use serde::{Deserialize, Serialize};

/// Volumes in mL plus the infeasibility, if any. Volumes are still reported
/// alongside an `InoculumExceedsTarget` error so the UI can show how far out
/// of range the request is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DilutionOutcome {
    pub inoculum_volume: f64,
    pub media_volume: f64,
    pub error: Option<CalcError>,
}

/// `total_volume` mode: C1*V1 = C2*V2 solved for V1, media fills the rest.
/// Infeasible when the required inoculum exceeds the whole target volume.
pub fn solve_total_volume(
    inoculum_od: f64,
    target_volume: f64,
    target_start_od: f64,
) -> DilutionOutcome {
    let inoculum_volume = (target_start_od * target_volume) / inoculum_od;
    let media_volume = target_volume - inoculum_volume;
    let error = (inoculum_volume > target_volume).then_some(CalcError::InoculumExceedsTarget);
    DilutionOutcome {
        inoculum_volume,
        media_volume,
        error,
    }
}

/// `fixed_media` mode: inoculum added on top of a fixed media volume,
/// C1*V1 = C2*(Vm+V1) solved for V1. Requires the inoculum to be denser than
/// the target start OD.
pub fn solve_fixed_media(
    inoculum_od: f64,
    media_volume: f64,
    target_start_od: f64,
) -> DilutionOutcome {
    if inoculum_od <= target_start_od {
        return DilutionOutcome {
            inoculum_volume: 0.0,
            media_volume: 0.0,
            error: Some(CalcError::InoculumOdTooLow),
        };
    }
    let inoculum_volume = (target_start_od * media_volume) / (inoculum_od - target_start_od);
    DilutionOutcome {
        inoculum_volume,
        media_volume,
        error: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn total_volume_reference_scenario() {
        // 2.5 OD inoculum into 500 mL at start OD 0.1 -> 20 mL + 480 mL.
        let out = solve_total_volume(2.5, 500.0, 0.1);
        assert!((out.inoculum_volume - 20.0).abs() < TOL);
        assert!((out.media_volume - 480.0).abs() < TOL);
        assert_eq!(out.error, None);
    }

    #[test]
    fn total_volume_conserves_volume_and_mass() {
        for (c1, v2, c2) in [(2.5, 500.0, 0.1), (1.2, 50.0, 0.05), (8.0, 1000.0, 0.4)] {
            let out = solve_total_volume(c1, v2, c2);
            assert!(
                (out.inoculum_volume + out.media_volume - v2).abs() < TOL,
                "volumes must sum to the target"
            );
            assert!(
                (c1 * out.inoculum_volume - c2 * v2).abs() < TOL,
                "OD mass balance must hold"
            );
        }
    }

    #[test]
    fn total_volume_flags_impossible_dilution() {
        // Inoculum thinner than the target start OD needs more than V2.
        let out = solve_total_volume(0.05, 500.0, 0.1);
        assert_eq!(out.error, Some(CalcError::InoculumExceedsTarget));
        assert!(out.inoculum_volume > 500.0, "volumes still reported");
    }

    #[test]
    fn fixed_media_mass_balance() {
        let out = solve_fixed_media(2.5, 500.0, 0.1);
        assert_eq!(out.error, None);
        assert_eq!(out.media_volume, 500.0);
        let mixed = out.media_volume + out.inoculum_volume;
        assert!(
            (2.5 * out.inoculum_volume - 0.1 * mixed).abs() < TOL,
            "C1*V1 == C2*(Vm+V1)"
        );
    }

    #[test]
    fn fixed_media_rejects_thin_inoculum() {
        let out = solve_fixed_media(0.05, 500.0, 0.1);
        assert_eq!(out.error, Some(CalcError::InoculumOdTooLow));
        assert_eq!(out.inoculum_volume, 0.0);
        assert_eq!(out.media_volume, 0.0);

        // Equal densities are just as impossible.
        let out = solve_fixed_media(0.1, 500.0, 0.1);
        assert_eq!(out.error, Some(CalcError::InoculumOdTooLow));
    }
}
