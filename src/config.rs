//! Model configuration
//!
//! A single TOML document configures every component. Each section is optional and
//! any field left out takes its default value:
//!
//! ```toml
//! [constants]
//! stefan_boltzmann = 5.670374419e-8
//!
//! [layered_atmosphere]
//! n_layers = 2
//!
//! [naked_planet]
//! resolution = 1.0
//! n_steps = 500
//! integrator = "RungeKutta4"
//!
//! [ice_albedo]
//! stop_on_convergence = true
//! ```

use ebm_components::components::{
    IceAlbedoFeedback, IceAlbedoFeedbackParameters, LayeredAtmosphere,
    LayeredAtmosphereParameters, NakedPlanet, NakedPlanetParameters,
};
use ebm_core::constants::PhysicalConstants;
use ebm_core::errors::{EBMError, EBMResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    pub constants: PhysicalConstants,
    pub layered_atmosphere: LayeredAtmosphereParameters,
    pub naked_planet: NakedPlanetParameters,
    pub ice_albedo: IceAlbedoFeedbackParameters,
}

impl ModelConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> EBMResult<Self> {
        let config: Self = toml::from_str(content).map_err(|e| EBMError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> EBMResult<Self> {
        let path = path.as_ref();
        log::debug!("Reading model configuration from {}", path.display());
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn to_toml_string(&self) -> EBMResult<String> {
        toml::to_string(self).map_err(|e| EBMError::Config(e.to_string()))
    }

    pub fn validate(&self) -> EBMResult<()> {
        self.constants.validate()?;
        self.layered_atmosphere.validate()?;
        self.naked_planet.validate()?;
        self.ice_albedo.validate()?;
        Ok(())
    }

    pub fn layered_atmosphere(&self) -> LayeredAtmosphere {
        LayeredAtmosphere::from_parameters(self.layered_atmosphere.clone(), self.constants)
    }

    pub fn naked_planet(&self) -> NakedPlanet {
        NakedPlanet::from_parameters(self.naked_planet.clone(), self.constants)
    }

    pub fn ice_albedo_feedback(&self) -> IceAlbedoFeedback {
        IceAlbedoFeedback::from_parameters(self.ice_albedo.clone())
    }
}
