use serde::{Deserialize, Serialize};

/// Field measurements of a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasurementInput {
    /// Trunk girth in centimeters.
    pub circumference: f64,
    /// Tree height in meters.
    pub height: f64,
}

/// The output of one estimator invocation.
///
/// All biomass values are in kilograms, `carbon_storage` in kilograms of
/// CO2-equivalent. For non-negative inputs every field is non-negative,
/// `above_ground_total_biomass` is the sum of the three above-ground
/// components, and `total_biomass` is the above-ground total plus
/// `below_ground_biomass`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CarbonBreakdown {
    pub diameter: f64,
    /// WS
    pub above_ground_stem_biomass: f64,
    /// WB
    pub above_ground_branch_biomass: f64,
    /// WL
    pub above_ground_leaf_biomass: f64,
    /// WT
    pub above_ground_total_biomass: f64,
    pub below_ground_biomass: f64,
    pub total_biomass: f64,
    pub carbon_storage: f64,
}

/// Names of the derived columns appended to an exported batch, in the order
/// they are computed.
pub const DERIVED_COLUMNS: [&str; 7] = [
    "Carbon_Storage",
    "WS",
    "WB",
    "WL",
    "WT",
    "Below_Ground_Biomass",
    "Total_Biomass",
];

impl CarbonBreakdown {
    /// Values matching [`DERIVED_COLUMNS`] position for position.
    pub fn derived_values(&self) -> [f64; 7] {
        [
            self.carbon_storage,
            self.above_ground_stem_biomass,
            self.above_ground_branch_biomass,
            self.above_ground_leaf_biomass,
            self.above_ground_total_biomass,
            self.below_ground_biomass,
            self.total_biomass,
        ]
    }
}
