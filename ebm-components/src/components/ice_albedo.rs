//! Ice-albedo feedback
//!
//! Iterates between an albedo implied by the planetary temperature and the
//! temperature implied by that albedo:
//!
//! $$ \alpha_k = f(T_k), \qquad T_{k+1} = g(\alpha_k) $$
//!
//! The relations $f$ and $g$ are supplied by an [`EmpiricalRelationProvider`]. Two
//! providers are included:
//!
//! - [`IceAlbedoRelations`]: linear fits to a six point table of mean temperature,
//!   ice-line latitude and planetary albedo.
//! - [`RadiativeRelations`]: albedo from the fitted table, temperature from the
//!   radiative equilibrium for a given solar constant.
//!
//! # Convergence
//!
//! By default the loop runs a fixed number of iterations and the convergence
//! threshold is ignored. Setting `stop_on_convergence` ends the loop as soon as
//! successive albedos differ by less than the threshold.

use ebm_core::constants::PhysicalConstants;
use ebm_core::errors::{ensure_non_negative, ensure_positive, EBMError, EBMResult};
use ebm_core::radiation::{validate_albedo, RadiationLaws};
use ebm_core::timeseries::FloatValue;
use ndarray::{Array1, ArrayView1};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Reference mean planetary temperatures (K)
pub const REFERENCE_TEMPERATURE: [FloatValue; 6] = [265.0, 255.0, 245.0, 235.0, 225.0, 215.0];
/// Latitude of the ice edge at each reference temperature (degrees)
pub const REFERENCE_ICE_LATITUDE: [FloatValue; 6] = [75.0, 60.0, 45.0, 30.0, 15.0, 0.0];
/// Planetary albedo at each reference temperature
pub const REFERENCE_ALBEDO: [FloatValue; 6] = [0.15, 0.25, 0.35, 0.45, 0.55, 0.65];

/// Source of the temperature/albedo relations used by the feedback loop.
pub trait EmpiricalRelationProvider {
    fn albedo_from_temperature(&self, temperature: FloatValue) -> EBMResult<FloatValue>;
    fn temperature_from_albedo(&self, albedo: FloatValue) -> EBMResult<FloatValue>;
}

/// $y = a x + b$, optionally clamped to a closed range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRelation {
    pub slope: FloatValue,
    pub intercept: FloatValue,
    pub bounds: Option<(FloatValue, FloatValue)>,
}

impl LinearRelation {
    pub fn new(slope: FloatValue, intercept: FloatValue) -> Self {
        Self {
            slope,
            intercept,
            bounds: None,
        }
    }

    pub fn with_bounds(self, lower: FloatValue, upper: FloatValue) -> Self {
        Self {
            bounds: Some((lower.min(upper), lower.max(upper))),
            ..self
        }
    }

    /// Ordinary least squares fit of `y` against `x`.
    pub fn fit(x: ArrayView1<FloatValue>, y: ArrayView1<FloatValue>) -> EBMResult<Self> {
        if x.len() != y.len() {
            return Err(EBMError::Config(format!(
                "cannot fit {} x values against {} y values",
                x.len(),
                y.len()
            )));
        }
        let (x_mean, y_mean) = match (x.mean(), y.mean()) {
            (Some(x_mean), Some(y_mean)) => (x_mean, y_mean),
            _ => return Err(EBMError::Config("cannot fit an empty sample".to_string())),
        };

        let dx = x.mapv(|v| v - x_mean);
        let dy = y.mapv(|v| v - y_mean);
        let variance = ensure_positive("sample variance", dx.dot(&dx))?;
        let slope = dx.dot(&dy) / variance;

        Ok(Self::new(slope, y_mean - slope * x_mean))
    }

    pub fn evaluate(&self, x: FloatValue) -> FloatValue {
        let y = self.slope * x + self.intercept;
        match self.bounds {
            Some((lower, upper)) => y.clamp(lower, upper),
            None => y,
        }
    }
}

/// Relations fitted to the reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IceAlbedoRelations {
    pub albedo: LinearRelation,
    pub temperature: LinearRelation,
    pub ice_latitude: LinearRelation,
}

impl IceAlbedoRelations {
    pub fn reference() -> EBMResult<Self> {
        let temperature = ArrayView1::from(&REFERENCE_TEMPERATURE[..]);
        let albedo = ArrayView1::from(&REFERENCE_ALBEDO[..]);
        let ice_latitude = ArrayView1::from(&REFERENCE_ICE_LATITUDE[..]);

        Ok(Self {
            albedo: LinearRelation::fit(temperature, albedo)?,
            temperature: LinearRelation::fit(albedo, temperature)?,
            ice_latitude: LinearRelation::fit(temperature, ice_latitude)?.with_bounds(0.0, 90.0),
        })
    }

    /// Latitude (degrees) poleward of which the planet is ice covered
    pub fn ice_latitude(&self, temperature: FloatValue) -> FloatValue {
        self.ice_latitude.evaluate(temperature)
    }
}

impl EmpiricalRelationProvider for IceAlbedoRelations {
    fn albedo_from_temperature(&self, temperature: FloatValue) -> EBMResult<FloatValue> {
        Ok(self.albedo.evaluate(temperature))
    }

    fn temperature_from_albedo(&self, albedo: FloatValue) -> EBMResult<FloatValue> {
        Ok(self.temperature.evaluate(albedo))
    }
}

/// Albedo from the reference table, temperature from radiative equilibrium.
///
/// The fitted albedo is clamped to the range covered by the table (ice free to
/// fully glaciated).
#[derive(Debug, Clone, PartialEq)]
pub struct RadiativeRelations {
    solar_constant: FloatValue,
    emissivity: FloatValue,
    laws: RadiationLaws,
    albedo: LinearRelation,
}

impl RadiativeRelations {
    pub fn new(
        solar_constant: FloatValue,
        emissivity: FloatValue,
        constants: &PhysicalConstants,
    ) -> EBMResult<Self> {
        let albedo = IceAlbedoRelations::reference()?
            .albedo
            .with_bounds(REFERENCE_ALBEDO[0], REFERENCE_ALBEDO[5]);
        Ok(Self {
            solar_constant,
            emissivity,
            laws: RadiationLaws::from_constants(constants),
            albedo,
        })
    }

    pub fn solar_constant(&self) -> FloatValue {
        self.solar_constant
    }
}

impl EmpiricalRelationProvider for RadiativeRelations {
    fn albedo_from_temperature(&self, temperature: FloatValue) -> EBMResult<FloatValue> {
        Ok(self.albedo.evaluate(temperature))
    }

    fn temperature_from_albedo(&self, albedo: FloatValue) -> EBMResult<FloatValue> {
        self.laws
            .equilibrium_temperature(self.solar_constant, albedo, self.emissivity)
    }
}

/// Upper limit on the number of solar constants visited by a sweep
pub const MAX_SWEEP_LENGTH: usize = 1_000_000;

/// Parameters for the ice-albedo feedback loop and its solar constant sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IceAlbedoFeedbackParameters {
    /// Albedo the iteration starts from
    pub initial_albedo: FloatValue,
    pub n_iterations: usize,
    /// Only consulted when `stop_on_convergence` is set
    pub convergence_threshold: FloatValue,
    pub stop_on_convergence: bool,
    /// unit: W / m^2
    pub solar_constant_start: FloatValue,
    /// Last solar constant of the sweep (inclusive)
    /// unit: W / m^2
    pub solar_constant_end: FloatValue,
    /// Spacing between swept solar constants
    /// unit: W / m^2
    pub solar_constant_step: FloatValue,
}

impl Default for IceAlbedoFeedbackParameters {
    fn default() -> Self {
        Self {
            initial_albedo: 0.15,
            n_iterations: 100,
            convergence_threshold: 0.01,
            stop_on_convergence: false,
            solar_constant_start: 1600.0,
            solar_constant_end: 1200.0,
            solar_constant_step: 10.0,
        }
    }
}

impl IceAlbedoFeedbackParameters {
    pub fn validate(&self) -> EBMResult<()> {
        validate_albedo(self.initial_albedo)?;
        ensure_non_negative("solar constant start", self.solar_constant_start)?;
        ensure_non_negative("solar constant end", self.solar_constant_end)?;
        ensure_positive("solar constant step", self.solar_constant_step)?;
        if self.stop_on_convergence {
            ensure_positive("convergence threshold", self.convergence_threshold)?;
        }
        Ok(())
    }
}

/// Temperatures and albedos visited by the feedback loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackTrajectory {
    /// unit: K
    pub temperatures: Vec<FloatValue>,
    pub albedos: Vec<FloatValue>,
    /// Iteration at which successive albedos fell within the threshold, when
    /// early stopping is enabled
    pub converged_at: Option<usize>,
}

impl FeedbackTrajectory {
    pub fn final_temperature(&self) -> Option<FloatValue> {
        self.temperatures.last().copied()
    }

    pub fn final_albedo(&self) -> Option<FloatValue> {
        self.albedos.last().copied()
    }
}

/// Trajectory for one solar constant of a sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub solar_constant: FloatValue,
    pub trajectory: FeedbackTrajectory,
}

/// Iterative ice-albedo feedback model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IceAlbedoFeedback {
    parameters: IceAlbedoFeedbackParameters,
}

impl IceAlbedoFeedback {
    pub fn from_parameters(parameters: IceAlbedoFeedbackParameters) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &IceAlbedoFeedbackParameters {
        &self.parameters
    }

    /// Run the feedback loop from the configured initial albedo.
    ///
    /// Without early stopping both sequences hold `n_iterations + 1` values.
    pub fn iterate<R>(&self, relations: &R) -> EBMResult<FeedbackTrajectory>
    where
        R: EmpiricalRelationProvider + ?Sized,
    {
        let p = &self.parameters;
        p.validate()?;

        let mut albedos = Vec::with_capacity(p.n_iterations + 1);
        let mut temperatures = Vec::with_capacity(p.n_iterations + 1);
        let mut converged_at = None;

        albedos.push(p.initial_albedo);
        let mut temperature = relations.temperature_from_albedo(p.initial_albedo)?;
        temperatures.push(temperature);

        for i in 1..=p.n_iterations {
            let previous_albedo = albedos[albedos.len() - 1];
            let albedo = relations.albedo_from_temperature(temperature)?;
            temperature = relations.temperature_from_albedo(albedo)?;
            log::debug!("Iteration {}: albedo {:.4}, {:.3} K", i, albedo, temperature);

            albedos.push(albedo);
            temperatures.push(temperature);

            if p.stop_on_convergence && (albedo - previous_albedo).abs() < p.convergence_threshold {
                converged_at = Some(i);
                break;
            }
        }

        if p.stop_on_convergence && converged_at.is_none() {
            log::warn!(
                "Albedo did not converge to within {} after {} iterations",
                p.convergence_threshold,
                p.n_iterations
            );
        }

        Ok(FeedbackTrajectory {
            temperatures,
            albedos,
            converged_at,
        })
    }

    /// Solar constants visited by the sweep, from start to end inclusive
    pub fn solar_constants(&self) -> EBMResult<Array1<FloatValue>> {
        let p = &self.parameters;
        p.validate()?;
        let step = p.solar_constant_step;
        let span = p.solar_constant_end - p.solar_constant_start;
        let direction = span.signum();
        // Tolerate rounding in the span so the end point is included
        let intervals = (span.abs() / step + 1e-9).floor();
        if !intervals.is_finite() || intervals >= MAX_SWEEP_LENGTH as FloatValue {
            return Err(EBMError::domain(
                "solar constant step",
                step,
                "too small for the swept range",
            ));
        }
        let n = (intervals as usize).checked_add(1).ok_or_else(|| {
            EBMError::domain(
                "solar constant step",
                step,
                "too small for the swept range",
            )
        })?;

        Ok(Array1::from_shape_fn(n, |i| {
            p.solar_constant_start + direction * step * i as FloatValue
        }))
    }

    /// Run the feedback loop once per swept solar constant.
    ///
    /// `relations_for` builds the relations used at each solar constant. Each run is
    /// independent, so the sweep is evaluated in parallel; results are returned in
    /// sweep order.
    pub fn sweep<R, F>(&self, relations_for: F) -> EBMResult<Vec<SweepResult>>
    where
        R: EmpiricalRelationProvider,
        F: Fn(FloatValue) -> EBMResult<R> + Sync + Send,
    {
        let solar_constants = self.solar_constants()?.to_vec();

        let results = solar_constants
            .into_par_iter()
            .map(|solar_constant| -> EBMResult<SweepResult> {
                let relations = relations_for(solar_constant)?;
                Ok(SweepResult {
                    solar_constant,
                    trajectory: self.iterate(&relations)?,
                })
            })
            .collect::<EBMResult<Vec<_>>>()?;

        log::info!("Swept {} solar constants", results.len());
        Ok(results)
    }
}
