//! Layered atmosphere equilibrium
//!
//! Radiative equilibrium of a planet covered by $N$ idealised atmospheric layers.
//! Each layer is transparent to sunlight, absorbs all infrared flux from below and
//! re-emits it both upwards and downwards.
//!
//! The topmost ("skin") layer balances the absorbed solar flux:
//! $$ \sigma T_0^4 = \frac{L (1 - \alpha)}{4} $$
//! Each layer below emits twice the flux of the layer above it
//! $$ \sigma T_i^4 = 2 \sigma T_{i-1}^4 $$
//! and the ground absorbs sunlight plus the downward emission of the lowest layer
//! $$ \sigma T_g^4 = \frac{L (1 - \alpha)}{4} + \sigma T_{N-2}^4 $$

use ebm_core::constants::PhysicalConstants;
use ebm_core::errors::{EBMError, EBMResult};
use ebm_core::radiation::{validate_albedo, Geometry, RadiationLaws};
use ebm_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// Parameters for the layered atmosphere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayeredAtmosphereParameters {
    /// Incoming stellar flux at the top of the atmosphere
    /// unit: W / m^2
    pub solar_constant: FloatValue,
    /// Planetary albedo, in [0, 1)
    pub albedo: FloatValue,
    /// Emissivity of the skin layer, in (0, 1]
    pub emissivity: FloatValue,
    /// Number of atmospheric layers (including the skin layer).
    ///
    /// Signed so that configuration files with a negative count are rejected
    /// with a domain error rather than a parse failure.
    pub n_layers: i64,
}

impl Default for LayeredAtmosphereParameters {
    fn default() -> Self {
        Self {
            solar_constant: 1350.0,
            albedo: 0.3,
            emissivity: 1.0,
            n_layers: 1,
        }
    }
}

impl LayeredAtmosphereParameters {
    pub fn validate(&self) -> EBMResult<()> {
        validate_albedo(self.albedo)?;
        layer_count(self.n_layers)?;
        Ok(())
    }
}

/// Convert a signed layer count into a usable one
pub fn layer_count(n_layers: i64) -> EBMResult<usize> {
    usize::try_from(n_layers).map_err(|_| {
        EBMError::domain("layer count", n_layers as FloatValue, "must not be negative")
    })
}

/// Equilibrium temperatures of each layer, ordered from space to the ground.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerStack {
    n_layers: usize,
    /// unit: K
    skin_temperature: FloatValue,
    /// Layers between the skin and the ground, index 0 nearest space.
    /// unit: K
    intermediate_temperatures: Vec<FloatValue>,
    /// unit: K
    ground_temperature: FloatValue,
}

impl LayerStack {
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    pub fn skin_temperature(&self) -> FloatValue {
        self.skin_temperature
    }

    pub fn intermediate_temperatures(&self) -> &[FloatValue] {
        &self.intermediate_temperatures
    }

    pub fn ground_temperature(&self) -> FloatValue {
        self.ground_temperature
    }

    /// Every distinct temperature from the skin down to the ground.
    ///
    /// Without an atmosphere the ground is the emitting surface, so only one value
    /// is returned.
    pub fn profile(&self) -> Vec<FloatValue> {
        if self.n_layers == 0 {
            return vec![self.ground_temperature];
        }
        let mut profile = Vec::with_capacity(self.n_layers + 1);
        profile.push(self.skin_temperature);
        profile.extend_from_slice(&self.intermediate_temperatures);
        profile.push(self.ground_temperature);
        profile
    }

    /// Amplification of the ground temperature relative to the skin
    pub fn greenhouse_ratio(&self) -> FloatValue {
        self.ground_temperature / self.skin_temperature
    }
}

/// Solve the equilibrium temperatures of an `n_layers` deep atmosphere.
///
/// Interior layers and the ground are treated as black bodies; `emissivity` only
/// applies to the skin layer.
pub fn solve_layers(
    solar_constant: FloatValue,
    albedo: FloatValue,
    n_layers: i64,
    emissivity: FloatValue,
    sigma: FloatValue,
) -> EBMResult<LayerStack> {
    let n_layers = layer_count(n_layers)?;
    let laws = RadiationLaws::from_constants(&PhysicalConstants {
        stefan_boltzmann: sigma,
        ..Default::default()
    });

    let heat_in = laws.absorbed_flux(solar_constant, albedo, Geometry::SphereAverage)?;
    let skin_temperature = laws.temperature_from_flux(heat_in, emissivity)?;

    if n_layers == 0 {
        return Ok(LayerStack {
            n_layers,
            skin_temperature,
            intermediate_temperatures: vec![],
            ground_temperature: skin_temperature,
        });
    }

    let mut intermediate_temperatures = Vec::with_capacity(n_layers - 1);
    let mut temperature_above = skin_temperature;
    for i in 0..n_layers - 1 {
        let heat_from_above = laws.flux_from_temperature(temperature_above, 1.0)?;
        let temperature = laws.temperature_from_flux(2.0 * heat_from_above, 1.0)?;
        log::debug!("Layer {}: {:.3} K", i + 1, temperature);
        intermediate_temperatures.push(temperature);
        temperature_above = temperature;
    }

    let ground_temperature = laws.temperature_from_flux(
        heat_in + laws.flux_from_temperature(temperature_above, 1.0)?,
        1.0,
    )?;
    log::debug!("Ground: {:.3} K", ground_temperature);

    Ok(LayerStack {
        n_layers,
        skin_temperature,
        intermediate_temperatures,
        ground_temperature,
    })
}

/// Equilibrium of a single layer that absorbs all incoming sunlight.
///
/// Returns `(atmosphere, ground)` temperatures. The layer radiates half of the
/// absorbed flux to space and half to the ground, which re-emits it back; the
/// ground therefore equilibrates at the atmospheric temperature.
pub fn nuclear_winter(
    solar_constant: FloatValue,
    albedo: FloatValue,
    sigma: FloatValue,
) -> EBMResult<(FloatValue, FloatValue)> {
    let laws = RadiationLaws::from_constants(&PhysicalConstants {
        stefan_boltzmann: sigma,
        ..Default::default()
    });
    let heat_in = laws.absorbed_flux(solar_constant, albedo, Geometry::SphereAverage)?;
    let atmosphere = laws.temperature_from_flux(heat_in / 2.0, 1.0)?;
    Ok((atmosphere, atmosphere))
}

/// Radiative equilibrium of a planet with a layered atmosphere
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayeredAtmosphere {
    parameters: LayeredAtmosphereParameters,
    constants: PhysicalConstants,
}

impl LayeredAtmosphere {
    pub fn from_parameters(
        parameters: LayeredAtmosphereParameters,
        constants: PhysicalConstants,
    ) -> Self {
        Self {
            parameters,
            constants,
        }
    }

    pub fn parameters(&self) -> &LayeredAtmosphereParameters {
        &self.parameters
    }

    pub fn solve(&self) -> EBMResult<LayerStack> {
        self.constants.validate()?;
        let p = &self.parameters;
        solve_layers(
            p.solar_constant,
            p.albedo,
            p.n_layers,
            p.emissivity,
            self.constants.stefan_boltzmann,
        )
    }

    pub fn nuclear_winter(&self) -> EBMResult<(FloatValue, FloatValue)> {
        nuclear_winter(
            self.parameters.solar_constant,
            self.parameters.albedo,
            self.constants.stefan_boltzmann,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ebm_core::constants::STEFAN_BOLTZMANN;
    use ebm_core::radiation::{absorbed_flux, temperature_from_flux};

    fn earth(n_layers: i64) -> LayerStack {
        solve_layers(1350.0, 0.3, n_layers, 1.0, STEFAN_BOLTZMANN).unwrap()
    }

    #[test]
    fn test_no_atmosphere() {
        let stack = earth(0);
        let expected = temperature_from_flux(
            absorbed_flux(1350.0, 0.3, Geometry::SphereAverage).unwrap(),
            1.0,
            STEFAN_BOLTZMANN,
        )
        .unwrap();

        assert_eq!(stack.ground_temperature(), expected);
        assert_eq!(stack.skin_temperature(), expected);
        assert!(stack.intermediate_temperatures().is_empty());
        assert_eq!(stack.profile(), vec![expected]);
    }

    #[test]
    fn test_single_layer_greenhouse() {
        let stack = earth(1);

        assert!(stack.intermediate_temperatures().is_empty());
        assert!(
            (stack.skin_temperature() - 255.0).abs() < 1.0,
            "T_skin = {}",
            stack.skin_temperature()
        );
        assert!(
            (stack.ground_temperature() - 302.0).abs() < 1.0,
            "T_ground = {}",
            stack.ground_temperature()
        );
        assert_relative_eq!(stack.greenhouse_ratio(), 2.0_f64.powf(0.25), max_relative = 1e-10);
    }

    #[test]
    fn test_two_layers_match_closed_form() {
        let stack = earth(2);
        let skin = stack.skin_temperature();

        assert_eq!(stack.intermediate_temperatures().len(), 1);
        assert_relative_eq!(
            stack.intermediate_temperatures()[0],
            skin * 2.0_f64.powf(0.25),
            max_relative = 1e-10
        );
        assert_relative_eq!(
            stack.ground_temperature(),
            skin * 3.0_f64.powf(0.25),
            max_relative = 1e-10
        );
    }

    #[test]
    fn test_temperature_increases_towards_ground() {
        for n_layers in 2..8 {
            let stack = earth(n_layers);
            let profile = stack.profile();

            assert_eq!(profile.len(), n_layers as usize + 1);
            assert_eq!(stack.intermediate_temperatures().len(), n_layers as usize - 1);
            for pair in profile.windows(2) {
                assert!(
                    pair[1] > pair[0],
                    "{} layers: profile {:?} is not increasing",
                    n_layers,
                    profile
                );
            }
        }
    }

    #[test]
    fn test_negative_layer_count() {
        let err = solve_layers(1350.0, 0.3, -1, 1.0, STEFAN_BOLTZMANN).unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_invalid_albedo() {
        for albedo in [1.0, -0.1] {
            let err = solve_layers(1350.0, albedo, 1, 1.0, STEFAN_BOLTZMANN).unwrap_err();
            assert!(err.is_domain_error());
        }
    }

    #[test]
    fn test_nuclear_winter() {
        let (atmosphere, ground) = nuclear_winter(1350.0, 0.3, STEFAN_BOLTZMANN).unwrap();
        let skin = earth(0).skin_temperature();

        assert_eq!(atmosphere, ground);
        assert_relative_eq!(atmosphere, skin / 2.0_f64.powf(0.25), max_relative = 1e-10);
    }

    #[test]
    fn test_component_uses_injected_sigma() {
        let parameters = LayeredAtmosphereParameters::default();
        let default = LayeredAtmosphere::from_parameters(
            parameters.clone(),
            PhysicalConstants::default(),
        )
        .solve()
        .unwrap();
        let coarse = LayeredAtmosphere::from_parameters(
            parameters,
            PhysicalConstants {
                stefan_boltzmann: 5.67e-8,
                ..Default::default()
            },
        )
        .solve()
        .unwrap();

        assert_ne!(default.ground_temperature(), coarse.ground_temperature());
        assert!((default.ground_temperature() - coarse.ground_temperature()).abs() < 0.01);
    }

    #[test]
    fn test_parameters_validate() {
        let parameters = LayeredAtmosphereParameters {
            n_layers: -1,
            ..Default::default()
        };
        assert!(parameters.validate().is_err());
        assert!(LayeredAtmosphereParameters::default().validate().is_ok());
    }

    #[test]
    fn test_partial_deserialization() {
        let json = r#"{"n_layers": 3}"#;
        let parameters: LayeredAtmosphereParameters =
            serde_json::from_str(json).expect("Partial deserialization failed");

        assert_eq!(parameters.n_layers, 3);
        assert_eq!(parameters.solar_constant, 1350.0);
        assert_eq!(parameters.albedo, 0.3);
    }
}
