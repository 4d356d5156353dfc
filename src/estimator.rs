//! Allometric biomass and carbon storage model.
//!
//! ```text
//! D  = C * 7 / 22
//! WS = 0.05466 * (D² H)^0.945
//! WB = 0.01579 * (D² H)^0.9124
//! WL = 0.0678  * (D² H)^0.5806
//! WT = WS + WB + WL
//! below = 0.48 WT,  total = WT + below
//! CO2e = total * 0.4715 * 44/12
//! ```
//!
//! The coefficients are field calibration constants and are reproduced
//! exactly; they are not meant to be tuned.

use crate::error::DomainError;
use crate::models::{CarbonBreakdown, MeasurementInput};

/// Coefficient and exponent of a single power-law biomass component.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PowerTerm {
    pub coefficient: f64,
    pub exponent: f64,
}

impl PowerTerm {
    fn apply(&self, base: f64) -> f64 {
        self.coefficient * base.powf(self.exponent)
    }
}

/// Calibrated constants of the allometric model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllometricModel {
    pub stem: PowerTerm,
    pub branch: PowerTerm,
    pub leaf: PowerTerm,
    /// Root biomass as a fraction of above-ground biomass.
    pub root_ratio: f64,
    /// Carbon mass fraction of dry biomass.
    pub carbon_fraction: f64,
}

/// The calibrated model every estimate uses.
pub const MODEL: AllometricModel = AllometricModel {
    stem: PowerTerm {
        coefficient: 0.05466,
        exponent: 0.945,
    },
    branch: PowerTerm {
        coefficient: 0.01579,
        exponent: 0.9124,
    },
    leaf: PowerTerm {
        coefficient: 0.0678,
        exponent: 0.5806,
    },
    root_ratio: 0.48,
    carbon_fraction: 0.4715,
};

/// Molar mass ratio CO2 / C.
pub const CO2_PER_CARBON: f64 = 44.0 / 12.0;

impl Default for AllometricModel {
    fn default() -> Self {
        MODEL
    }
}

/// Diameter from circumference, using 22/7 for pi.
pub fn diameter_from_circumference(circumference: f64) -> f64 {
    circumference * 7.0 / 22.0
}

impl AllometricModel {
    /// Estimate the biomass breakdown of one tree.
    ///
    /// Fails with [`DomainError`] when an input is not finite or when
    /// `diameter² * height` is negative, since the fractional exponents have no
    /// real value there. A negative circumference with a non-negative height
    /// still yields a valid base and is computed as-is, reporting a negative
    /// diameter.
    pub fn estimate(&self, circumference: f64, height: f64) -> Result<CarbonBreakdown, DomainError> {
        let diameter = diameter_from_circumference(circumference);
        let base = diameter.powi(2) * height;

        if !circumference.is_finite() || !height.is_finite() || !base.is_finite() || base < 0.0 {
            return Err(DomainError {
                circumference,
                height,
                base,
            });
        }

        let stem = self.stem.apply(base);
        let branch = self.branch.apply(base);
        let leaf = self.leaf.apply(base);
        let above_ground = stem + branch + leaf;

        let below_ground = above_ground * self.root_ratio;
        let total = above_ground + below_ground;
        let carbon_storage = total * self.carbon_fraction * CO2_PER_CARBON;

        Ok(CarbonBreakdown {
            diameter,
            above_ground_stem_biomass: stem,
            above_ground_branch_biomass: branch,
            above_ground_leaf_biomass: leaf,
            above_ground_total_biomass: above_ground,
            below_ground_biomass: below_ground,
            total_biomass: total,
            carbon_storage,
        })
    }
}

/// Estimate one tree with the calibrated [`MODEL`].
pub fn estimate(circumference: f64, height: f64) -> Result<CarbonBreakdown, DomainError> {
    MODEL.estimate(circumference, height)
}

/// [`estimate`] for an already-assembled measurement.
pub fn estimate_input(input: MeasurementInput) -> Result<CarbonBreakdown, DomainError> {
    estimate(input.circumference, input.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel_eq(a: f64, b: f64) -> bool {
        if a == b {
            return true;
        }
        ((a - b) / b).abs() < 1e-9
    }

    #[test]
    fn diameter_uses_22_over_7() {
        assert_eq!(diameter_from_circumference(22.0), 7.0);
        assert_eq!(diameter_from_circumference(50.0), 50.0 * 7.0 / 22.0);
    }

    #[test]
    fn reproduces_fixed_formula_for_reference_tree() {
        let b = estimate(50.0, 10.0).unwrap();
        let d: f64 = 50.0 * 7.0 / 22.0;
        let base = d * d * 10.0;

        assert_eq!(b.diameter, d);
        assert!(rel_eq(b.above_ground_stem_biomass, 0.05466 * base.powf(0.945)));
        assert!(rel_eq(b.above_ground_branch_biomass, 0.01579 * base.powf(0.9124)));
        assert!(rel_eq(b.above_ground_leaf_biomass, 0.0678 * base.powf(0.5806)));
        assert!(rel_eq(
            b.carbon_storage,
            b.total_biomass * 0.4715 * (44.0 / 12.0)
        ));
    }

    #[test]
    fn zero_base_gives_all_zero_outputs() {
        for (c, h) in [(0.0, 10.0), (50.0, 0.0), (0.0, 0.0)] {
            let b = estimate(c, h).unwrap();
            assert_eq!(b.above_ground_total_biomass, 0.0);
            assert_eq!(b.below_ground_biomass, 0.0);
            assert_eq!(b.total_biomass, 0.0);
            assert_eq!(b.carbon_storage, 0.0);
        }
    }

    #[test]
    fn negative_height_is_a_domain_error() {
        let err = estimate(50.0, -1.0).unwrap_err();
        assert_eq!(err.height, -1.0);
        assert!(err.base < 0.0);
    }

    #[test]
    fn negative_height_with_zero_circumference_is_zero() {
        let b = estimate(0.0, -5.0).unwrap();
        assert_eq!(b.carbon_storage, 0.0);
    }

    #[test]
    fn non_finite_inputs_are_domain_errors() {
        assert!(estimate(f64::NAN, 10.0).is_err());
        assert!(estimate(10.0, f64::INFINITY).is_err());
        assert!(estimate(f64::NEG_INFINITY, 10.0).is_err());
    }

    #[test]
    fn negative_circumference_mirrors_positive_biomass() {
        let neg = estimate(-50.0, 10.0).unwrap();
        let pos = estimate(50.0, 10.0).unwrap();
        assert_eq!(neg.diameter, -pos.diameter);
        assert_eq!(neg.carbon_storage, pos.carbon_storage);
    }

    #[test]
    fn default_model_is_the_calibrated_one() {
        assert_eq!(AllometricModel::default(), MODEL);
        assert_eq!(
            estimate_input(MeasurementInput {
                circumference: 80.0,
                height: 12.0
            }),
            estimate(80.0, 12.0)
        );
    }
}
