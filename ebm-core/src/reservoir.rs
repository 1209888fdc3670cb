use crate::constants::PhysicalConstants;
use crate::errors::{ensure_non_negative, ensure_positive, EBMResult};
use crate::timeseries::FloatValue;

/// Heat stored in a column of finite heat capacity.
///
/// The stored heat and the temperature are tied by
/// $$ H = C T $$
/// where $C$ is the heat capacity per unit area ($\text{J / K m}^2$).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatReservoir {
    heat_capacity: FloatValue,
    heat_content: FloatValue,
}

impl HeatReservoir {
    pub fn new(heat_capacity: FloatValue, temperature: FloatValue) -> EBMResult<Self> {
        let heat_capacity = ensure_positive("heat capacity", heat_capacity)?;
        let temperature = ensure_non_negative("temperature", temperature)?;
        Ok(Self {
            heat_capacity,
            heat_content: heat_capacity * temperature,
        })
    }

    /// Reservoir formed by a column of water `water_depth` metres deep.
    pub fn water_column(
        constants: &PhysicalConstants,
        water_depth: FloatValue,
        temperature: FloatValue,
    ) -> EBMResult<Self> {
        Self::new(
            constants.heat_capacity_of_water_column(water_depth)?,
            temperature,
        )
    }

    /// unit: J / K m^2
    pub fn heat_capacity(&self) -> FloatValue {
        self.heat_capacity
    }

    /// unit: J / m^2
    pub fn heat_content(&self) -> FloatValue {
        self.heat_content
    }

    /// unit: K
    pub fn temperature(&self) -> FloatValue {
        self.heat_content / self.heat_capacity
    }

    /// Add `energy` (J / m^2, negative to remove heat) and return the new temperature.
    pub fn add_energy(&mut self, energy: FloatValue) -> FloatValue {
        self.heat_content += energy;
        self.temperature()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heat_content_matches_temperature() {
        let reservoir = HeatReservoir::new(4.0e9, 250.0).unwrap();
        assert_eq!(reservoir.heat_content(), 1.0e12);
        assert_eq!(reservoir.temperature(), 250.0);
    }

    #[test]
    fn test_add_energy() {
        let mut reservoir =
            HeatReservoir::water_column(&PhysicalConstants::default(), 1000.0, 0.0).unwrap();
        let temperature = reservoir.add_energy(4.0e9);
        assert!((temperature - 1.0).abs() < 1e-12);

        let temperature = reservoir.add_energy(-2.0e9);
        assert!((temperature - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_reservoir() {
        assert!(HeatReservoir::new(0.0, 10.0).is_err());
        assert!(HeatReservoir::new(1.0, -10.0).is_err());
        assert!(HeatReservoir::water_column(&PhysicalConstants::default(), -1.0, 0.0).is_err());
    }
}
