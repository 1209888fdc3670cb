//! Named scenarios
//!
//! Textbook cases built on top of the components. None of these re-derive the
//! physics; the layered atmosphere solver is the single source of layer temperatures.

use ebm_components::components::{nuclear_winter, solve_layers, LayerStack};
use ebm_core::constants::PhysicalConstants;
use ebm_core::errors::EBMResult;
use ebm_core::radiation::{Geometry, RadiationLaws};
use ebm_core::timeseries::FloatValue;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Planet {
    pub name: &'static str,
    /// unit: W / m^2
    pub solar_constant: FloatValue,
    pub albedo: FloatValue,
}

pub const VENUS: Planet = Planet {
    name: "Venus",
    solar_constant: 2600.0,
    albedo: 0.7,
};

pub const EARTH: Planet = Planet {
    name: "Earth",
    solar_constant: 1350.0,
    albedo: 0.3,
};

pub const MARS: Planet = Planet {
    name: "Mars",
    solar_constant: 600.0,
    albedo: 0.15,
};

pub const PLANETS: [Planet; 3] = [VENUS, EARTH, MARS];

impl Planet {
    /// Equilibrium temperature without an atmosphere (K)
    pub fn bare_temperature(&self, constants: &PhysicalConstants) -> EBMResult<FloatValue> {
        RadiationLaws::from_constants(constants).equilibrium_temperature(
            self.solar_constant,
            self.albedo,
            1.0,
        )
    }

    pub fn layers(&self, n_layers: i64, constants: &PhysicalConstants) -> EBMResult<LayerStack> {
        solve_layers(
            self.solar_constant,
            self.albedo,
            n_layers,
            1.0,
            constants.stefan_boltzmann,
        )
    }
}

/// Surface temperatures of the Moon facing the Sun and in darkness
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonTemperatures {
    pub noon: FloatValue,
    pub night: FloatValue,
}

/// The Moon has no heat storage to speak of, so each point of the surface is in
/// instantaneous equilibrium with the flux falling on it.
pub fn moon(constants: &PhysicalConstants) -> EBMResult<MoonTemperatures> {
    let laws = RadiationLaws::from_constants(constants);
    let albedo = 0.33;
    let temperature_under = |solar_constant| -> EBMResult<FloatValue> {
        laws.temperature_from_flux(laws.absorbed_flux(solar_constant, albedo, Geometry::Slab)?, 1.0)
    };

    Ok(MoonTemperatures {
        noon: temperature_under(1350.0)?,
        night: temperature_under(0.0)?,
    })
}

/// Two layer atmosphere over the Earth
#[derive(Debug, Clone, PartialEq)]
pub struct GreenhouseComparison {
    pub stack: LayerStack,
    /// Middle layer temperature relative to the skin
    pub middle_ratio: FloatValue,
    /// Ground temperature relative to the skin
    pub ground_ratio: FloatValue,
}

pub fn stronger_greenhouse(constants: &PhysicalConstants) -> EBMResult<GreenhouseComparison> {
    let stack = EARTH.layers(2, constants)?;
    let skin = stack.skin_temperature();
    let middle_ratio = stack.intermediate_temperatures()[0] / skin;
    let ground_ratio = stack.greenhouse_ratio();

    Ok(GreenhouseComparison {
        stack,
        middle_ratio,
        ground_ratio,
    })
}

/// Atmosphere and ground temperatures when dust absorbs all sunlight aloft
pub fn earth_nuclear_winter(constants: &PhysicalConstants) -> EBMResult<(FloatValue, FloatValue)> {
    nuclear_winter(
        EARTH.solar_constant,
        EARTH.albedo,
        constants.stefan_boltzmann,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_planet_ordering() {
        let constants = PhysicalConstants::default();
        let temperatures: Vec<FloatValue> = PLANETS
            .iter()
            .map(|planet| planet.bare_temperature(&constants).unwrap())
            .collect();

        // Venus reflects so much sunlight that it would be colder than the Earth
        assert!(temperatures[2] < temperatures[0]);
        assert!(temperatures[0] < temperatures[1]);
    }

    #[test]
    fn test_bare_temperature_matches_layers() {
        let constants = PhysicalConstants::default();
        let stack = EARTH.layers(0, &constants).unwrap();
        assert_eq!(
            stack.ground_temperature(),
            EARTH.bare_temperature(&constants).unwrap()
        );
    }

    #[test]
    fn test_stronger_greenhouse_has_one_middle_layer() {
        let comparison = stronger_greenhouse(&PhysicalConstants::default()).unwrap();
        assert_eq!(comparison.stack.intermediate_temperatures().len(), 1);
        assert!(comparison.ground_ratio > comparison.middle_ratio);
        assert!(comparison.middle_ratio > 1.0);
    }
}
