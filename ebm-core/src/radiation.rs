//! Radiation laws
//!
//! Conversions between emitted flux and temperature using the Stefan-Boltzmann law,
//! and the insolation absorbed by a planet of a given albedo.
//!
//! $$ F = \epsilon \sigma T^4 $$
//!
//! Every function validates its inputs and returns a [`EBMError::Domain`] rather than
//! producing `NaN` for physically meaningless arguments (e.g. the fourth root of a
//! negative flux).
//!
//! [`EBMError::Domain`]: crate::errors::EBMError::Domain

use crate::constants::PhysicalConstants;
use crate::errors::{ensure_non_negative, ensure_positive, EBMError, EBMResult};
use crate::timeseries::FloatValue;
use serde::{Deserialize, Serialize};

/// How incoming stellar flux is spread over the absorbing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Geometry {
    /// A sphere lit from one side: the intercepted disc ($\pi r^2$) is averaged over
    /// the whole surface ($4 \pi r^2$).
    #[default]
    SphereAverage,
    /// A flat surface facing the star, receiving the full flux.
    Slab,
}

impl Geometry {
    fn dilution(&self) -> FloatValue {
        match self {
            Geometry::SphereAverage => 4.0,
            Geometry::Slab => 1.0,
        }
    }
}

/// Fails unless the emissivity lies in $(0, 1]$.
pub fn validate_emissivity(emissivity: FloatValue) -> EBMResult<FloatValue> {
    if emissivity.is_finite() && emissivity > 0.0 && emissivity <= 1.0 {
        Ok(emissivity)
    } else {
        Err(EBMError::domain("emissivity", emissivity, "must lie in (0, 1]"))
    }
}

/// Fails unless the albedo lies in $[0, 1)$.
pub fn validate_albedo(albedo: FloatValue) -> EBMResult<FloatValue> {
    if albedo.is_finite() && (0.0..1.0).contains(&albedo) {
        Ok(albedo)
    } else {
        Err(EBMError::domain("albedo", albedo, "must lie in [0, 1)"))
    }
}

/// Flux ($\text{W / m}^2$) emitted by a body at temperature `temperature` (K).
pub fn flux_from_temperature(
    temperature: FloatValue,
    emissivity: FloatValue,
    sigma: FloatValue,
) -> EBMResult<FloatValue> {
    let temperature = ensure_non_negative("temperature", temperature)?;
    let emissivity = validate_emissivity(emissivity)?;
    let sigma = ensure_positive("Stefan-Boltzmann constant", sigma)?;

    Ok(sigma * emissivity * temperature.powi(4))
}

/// Temperature (K) at which a body emits `flux` ($\text{W / m}^2$).
pub fn temperature_from_flux(
    flux: FloatValue,
    emissivity: FloatValue,
    sigma: FloatValue,
) -> EBMResult<FloatValue> {
    let flux = ensure_non_negative("flux", flux)?;
    let emissivity = validate_emissivity(emissivity)?;
    let sigma = ensure_positive("Stefan-Boltzmann constant", sigma)?;

    Ok((flux / (emissivity * sigma)).powf(0.25))
}

/// Stellar flux ($\text{W / m}^2$) absorbed by a surface of the given albedo.
///
/// $$ F_{in} = \frac{L (1 - \alpha)}{4} $$ for [`Geometry::SphereAverage`], and
/// $L (1 - \alpha)$ for [`Geometry::Slab`].
pub fn absorbed_flux(
    solar_constant: FloatValue,
    albedo: FloatValue,
    geometry: Geometry,
) -> EBMResult<FloatValue> {
    let solar_constant = ensure_non_negative("solar constant", solar_constant)?;
    let albedo = validate_albedo(albedo)?;

    Ok(solar_constant * (1.0 - albedo) / geometry.dilution())
}

/// Bare equilibrium temperature (K) of a sphere without an atmosphere.
///
/// $$ T = \left( \frac{L (1 - \alpha)}{4 \epsilon \sigma} \right)^{1/4} $$
pub fn equilibrium_temperature(
    solar_constant: FloatValue,
    albedo: FloatValue,
    emissivity: FloatValue,
    sigma: FloatValue,
) -> EBMResult<FloatValue> {
    let flux = absorbed_flux(solar_constant, albedo, Geometry::SphereAverage)?;
    temperature_from_flux(flux, emissivity, sigma)
}

/// Radiation laws bound to a single value of the Stefan-Boltzmann constant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiationLaws {
    sigma: FloatValue,
}

impl Default for RadiationLaws {
    fn default() -> Self {
        Self::from_constants(&PhysicalConstants::default())
    }
}

impl RadiationLaws {
    pub fn from_constants(constants: &PhysicalConstants) -> Self {
        Self {
            sigma: constants.stefan_boltzmann,
        }
    }

    pub fn sigma(&self) -> FloatValue {
        self.sigma
    }

    pub fn flux_from_temperature(
        &self,
        temperature: FloatValue,
        emissivity: FloatValue,
    ) -> EBMResult<FloatValue> {
        flux_from_temperature(temperature, emissivity, self.sigma)
    }

    pub fn temperature_from_flux(
        &self,
        flux: FloatValue,
        emissivity: FloatValue,
    ) -> EBMResult<FloatValue> {
        temperature_from_flux(flux, emissivity, self.sigma)
    }

    pub fn absorbed_flux(
        &self,
        solar_constant: FloatValue,
        albedo: FloatValue,
        geometry: Geometry,
    ) -> EBMResult<FloatValue> {
        absorbed_flux(solar_constant, albedo, geometry)
    }

    pub fn equilibrium_temperature(
        &self,
        solar_constant: FloatValue,
        albedo: FloatValue,
        emissivity: FloatValue,
    ) -> EBMResult<FloatValue> {
        equilibrium_temperature(solar_constant, albedo, emissivity, self.sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STEFAN_BOLTZMANN;
    use approx::assert_relative_eq;

    #[test]
    fn test_flux_at_zero_kelvin() {
        let flux = flux_from_temperature(0.0, 1.0, STEFAN_BOLTZMANN).unwrap();
        assert_eq!(flux, 0.0);
    }

    #[test]
    fn test_flux_scales_with_emissivity() {
        let black = flux_from_temperature(288.0, 1.0, STEFAN_BOLTZMANN).unwrap();
        let grey = flux_from_temperature(288.0, 0.5, STEFAN_BOLTZMANN).unwrap();
        assert_relative_eq!(grey, 0.5 * black, max_relative = 1e-12);
        // ~390 W/m^2 for a 288 K black body
        assert!((black - 390.1).abs() < 0.5, "flux = {}", black);
    }

    #[test]
    fn test_round_trip() {
        for flux in [0.0, 1e-6, 1.0, 236.25, 1350.0, 1e6] {
            let temperature = temperature_from_flux(flux, 1.0, STEFAN_BOLTZMANN).unwrap();
            let back = flux_from_temperature(temperature, 1.0, STEFAN_BOLTZMANN).unwrap();
            assert_relative_eq!(back, flux, max_relative = 1e-10, epsilon = 1e-15);
        }
    }

    #[test]
    fn test_negative_flux_is_rejected() {
        let err = temperature_from_flux(-1.0, 1.0, STEFAN_BOLTZMANN).unwrap_err();
        assert!(err.is_domain_error());
    }

    #[test]
    fn test_negative_temperature_is_rejected() {
        assert!(flux_from_temperature(-1.0, 1.0, STEFAN_BOLTZMANN).is_err());
        assert!(flux_from_temperature(FloatValue::NAN, 1.0, STEFAN_BOLTZMANN).is_err());
    }

    #[test]
    fn test_invalid_emissivity_and_sigma() {
        assert!(temperature_from_flux(1.0, 0.0, STEFAN_BOLTZMANN).is_err());
        assert!(temperature_from_flux(1.0, 1.1, STEFAN_BOLTZMANN).is_err());
        assert!(temperature_from_flux(1.0, 1.0, 0.0).is_err());
        assert!(flux_from_temperature(1.0, 1.0, -5.67e-8).is_err());
    }

    #[test]
    fn test_absorbed_flux_geometry() {
        let sphere = absorbed_flux(1350.0, 0.3, Geometry::SphereAverage).unwrap();
        let slab = absorbed_flux(1350.0, 0.3, Geometry::Slab).unwrap();
        assert_relative_eq!(sphere, 236.25, max_relative = 1e-12);
        assert_relative_eq!(slab, 4.0 * sphere, max_relative = 1e-12);
    }

    #[test]
    fn test_absorbed_flux_rejects_bad_albedo() {
        for albedo in [1.0, -0.1, 1.5, FloatValue::NAN] {
            let err = absorbed_flux(1350.0, albedo, Geometry::SphereAverage).unwrap_err();
            assert!(err.is_domain_error(), "albedo {} should be rejected", albedo);
        }
        assert!(absorbed_flux(-1.0, 0.3, Geometry::SphereAverage).is_err());
    }

    #[test]
    fn test_moon_at_night_is_zero_kelvin() {
        let flux = absorbed_flux(0.0, 0.33, Geometry::Slab).unwrap();
        let temperature = temperature_from_flux(flux, 1.0, STEFAN_BOLTZMANN).unwrap();
        assert_eq!(temperature, 0.0);
    }

    #[test]
    fn test_earth_equilibrium_temperature() {
        let laws = RadiationLaws::default();
        let temperature = laws.equilibrium_temperature(1350.0, 0.3, 1.0).unwrap();
        assert!((temperature - 254.1).abs() < 0.5, "T = {}", temperature);

        let via_flux = laws
            .temperature_from_flux(
                laws.absorbed_flux(1350.0, 0.3, Geometry::SphereAverage)
                    .unwrap(),
                1.0,
            )
            .unwrap();
        assert_relative_eq!(temperature, via_flux, max_relative = 1e-12);
    }
}
