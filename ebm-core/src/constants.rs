//! Physical constants
//!
//! All components read their physical constants from a single [`PhysicalConstants`]
//! table so that every calculation in a run uses the same value of $\sigma$.

use crate::errors::{ensure_positive, EBMResult};
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Stefan-Boltzmann constant ($\text{W / m}^2\text{ K}^4$).
pub const STEFAN_BOLTZMANN: FloatValue = 5.670374419e-8;

/// Heat needed to warm one cubic metre of water by one kelvin ($\text{J / K m}^3$).
pub const WATER_VOLUMETRIC_HEAT_CAPACITY: FloatValue = 4.0e6;

/// Seconds in a 365 day year.
pub const SECONDS_PER_YEAR: FloatValue = 3600.0 * 24.0 * 365.0;

/// Table of physical constants shared by all components.
///
/// # Default Values
///
/// - `stefan_boltzmann`: 5.670374419e-8 W / m^2 K^4
/// - `water_volumetric_heat_capacity`: 4.0e6 J / K m^3
/// - `seconds_per_year`: 31 536 000 s
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicalConstants {
    /// Stefan-Boltzmann constant ($\text{W / m}^2\text{ K}^4$).
    pub stefan_boltzmann: FloatValue,

    /// Volumetric heat capacity of water ($\text{J / K m}^3$).
    pub water_volumetric_heat_capacity: FloatValue,

    /// Length of a model year in seconds.
    pub seconds_per_year: FloatValue,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            stefan_boltzmann: STEFAN_BOLTZMANN,
            water_volumetric_heat_capacity: WATER_VOLUMETRIC_HEAT_CAPACITY,
            seconds_per_year: SECONDS_PER_YEAR,
        }
    }
}

impl PhysicalConstants {
    pub fn validate(&self) -> EBMResult<()> {
        ensure_positive("Stefan-Boltzmann constant", self.stefan_boltzmann)?;
        ensure_positive(
            "water volumetric heat capacity",
            self.water_volumetric_heat_capacity,
        )?;
        ensure_positive("seconds per year", self.seconds_per_year)?;
        Ok(())
    }

    /// Heat capacity of a water column of the given depth ($\text{J / K m}^2$).
    pub fn heat_capacity_of_water_column(&self, water_depth: FloatValue) -> EBMResult<FloatValue> {
        let depth = ensure_positive("water depth", water_depth)?;
        Ok(depth * self.water_volumetric_heat_capacity)
    }
}
