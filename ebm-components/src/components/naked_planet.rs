//! Naked planet model
//!
//! Time evolution of the temperature of a planet without an atmosphere whose surface
//! is a water column of finite heat capacity.
//!
//! $$ C \frac{dT}{dt} = \frac{L (1 - \alpha)}{4} - \epsilon \sigma T^4 $$
//!
//! where $C$ is the heat capacity of the water column ($\text{J / K m}^2$).
//!
//! # Integration
//!
//! The default integrator is an explicit forward Euler step on the heat content,
//! without adaptive step control. It is only stable while the step is short relative
//! to the relaxation time $C / (4 \epsilon \sigma T^3)$ (see
//! [`NakedPlanet::relaxation_time`]). A run that becomes unstable and drives the
//! temperature negative fails with a domain error.
//!
//! A classical fourth-order Runge-Kutta integrator is also available, sampled on the
//! same time axis.

use ebm_core::constants::PhysicalConstants;
use ebm_core::errors::{ensure_non_negative, ensure_positive, EBMError, EBMResult};
use ebm_core::radiation::{validate_albedo, validate_emissivity, Geometry, RadiationLaws};
use ebm_core::reservoir::HeatReservoir;
use ebm_core::timeseries::{FloatValue, Time, TimeSeries, TimeSeriesPoint};
use ode_solvers::{Rk4, System, Vector1};
use serde::{Deserialize, Serialize};

type ModelState = Vector1<FloatValue>;

/// Numerical scheme used to advance the temperature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Integrator {
    #[default]
    ForwardEuler,
    RungeKutta4,
}

/// Parameters for the naked planet model
///
/// # Default Values
///
/// A 1000 m deep ocean on an Earth-like planet, stepped every 5 years for 125 steps
/// from an initial temperature of 0 K.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NakedPlanetParameters {
    /// Length of a step
    /// unit: yr
    pub resolution: FloatValue,
    /// Number of steps to take
    pub n_steps: usize,
    /// Depth of the water column storing heat
    /// unit: m
    pub water_depth: FloatValue,
    /// unit: W / m^2
    pub solar_constant: FloatValue,
    pub albedo: FloatValue,
    pub emissivity: FloatValue,
    /// Temperature at the start of the run
    /// unit: K
    pub initial_temperature: FloatValue,
    pub integrator: Integrator,
}

impl Default for NakedPlanetParameters {
    fn default() -> Self {
        Self {
            resolution: 5.0,
            n_steps: 125,
            water_depth: 1000.0,
            solar_constant: 1350.0,
            albedo: 0.3,
            emissivity: 1.0,
            initial_temperature: 0.0,
            integrator: Integrator::ForwardEuler,
        }
    }
}

impl NakedPlanetParameters {
    pub fn validate(&self) -> EBMResult<()> {
        ensure_positive("resolution", self.resolution)?;
        ensure_positive("water depth", self.water_depth)?;
        ensure_non_negative("solar constant", self.solar_constant)?;
        ensure_non_negative("initial temperature", self.initial_temperature)?;
        validate_albedo(self.albedo)?;
        validate_emissivity(self.emissivity)?;
        Ok(())
    }
}

// Right hand side of the energy balance, with time measured in steps
struct EnergyBalance {
    heat_in: FloatValue,
    emissivity: FloatValue,
    sigma: FloatValue,
    heat_capacity: FloatValue,
    seconds_per_step: FloatValue,
}

impl System<Time, ModelState> for EnergyBalance {
    fn system(&self, _step: Time, y: &ModelState, dy: &mut ModelState) {
        let heat_out = self.sigma * self.emissivity * y[0].powi(4);
        dy[0] = (self.heat_in - heat_out) * self.seconds_per_step / self.heat_capacity;
    }
}

/// Naked planet energy balance model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NakedPlanet {
    parameters: NakedPlanetParameters,
    constants: PhysicalConstants,
}

impl NakedPlanet {
    pub fn new() -> Self {
        Self::from_parameters(NakedPlanetParameters::default(), PhysicalConstants::default())
    }

    pub fn from_parameters(parameters: NakedPlanetParameters, constants: PhysicalConstants) -> Self {
        Self {
            parameters,
            constants,
        }
    }

    pub fn parameters(&self) -> &NakedPlanetParameters {
        &self.parameters
    }

    fn laws(&self) -> RadiationLaws {
        RadiationLaws::from_constants(&self.constants)
    }

    /// Absorbed stellar flux averaged over the sphere (W / m^2)
    pub fn heat_in(&self) -> EBMResult<FloatValue> {
        self.laws().absorbed_flux(
            self.parameters.solar_constant,
            self.parameters.albedo,
            Geometry::SphereAverage,
        )
    }

    /// unit: J / K m^2
    pub fn heat_capacity(&self) -> EBMResult<FloatValue> {
        self.constants
            .heat_capacity_of_water_column(self.parameters.water_depth)
    }

    /// Temperature at which emission balances the absorbed flux (K)
    pub fn equilibrium_temperature(&self) -> EBMResult<FloatValue> {
        self.laws()
            .temperature_from_flux(self.heat_in()?, self.parameters.emissivity)
    }

    /// E-folding time of a small perturbation around equilibrium (years)
    ///
    /// $$ \tau = \frac{C}{4 \epsilon \sigma T_{eq}^3} $$
    ///
    /// Infinite when the planet receives no flux.
    pub fn relaxation_time(&self) -> EBMResult<FloatValue> {
        let t_eq = self.equilibrium_temperature()?;
        let feedback =
            4.0 * self.parameters.emissivity * self.constants.stefan_boltzmann * t_eq.powi(3);
        Ok(self.heat_capacity()? / feedback / self.constants.seconds_per_year)
    }

    /// Run the model for the configured number of steps.
    ///
    /// Always returns `n_steps + 1` samples, starting with the initial condition at
    /// time zero.
    pub fn run(&self) -> EBMResult<TimeSeries> {
        self.parameters.validate()?;
        self.constants.validate()?;

        let relaxation_time = self.relaxation_time()?;
        if self.parameters.integrator == Integrator::ForwardEuler
            && self.parameters.resolution > 2.0 * relaxation_time
        {
            log::warn!(
                "Resolution of {} yr exceeds twice the relaxation time ({:.2} yr); forward Euler is unstable",
                self.parameters.resolution,
                relaxation_time
            );
        }

        let series = match self.parameters.integrator {
            Integrator::ForwardEuler => self.run_forward_euler()?,
            Integrator::RungeKutta4 => self.run_runge_kutta()?,
        };

        if let Some(last) = series.latest() {
            log::info!(
                "Naked planet reached {:.3} K after {} yr",
                last.temperature,
                last.time
            );
        }
        Ok(series)
    }

    fn initial_point(&self) -> EBMResult<TimeSeriesPoint> {
        let temperature = self.parameters.initial_temperature;
        Ok(TimeSeriesPoint {
            time: 0.0,
            temperature,
            outgoing_flux: self
                .laws()
                .flux_from_temperature(temperature, self.parameters.emissivity)?,
        })
    }

    fn run_forward_euler(&self) -> EBMResult<TimeSeries> {
        let p = &self.parameters;
        let laws = self.laws();
        let heat_in = self.heat_in()?;
        let seconds_per_step = p.resolution * self.constants.seconds_per_year;

        let mut reservoir =
            HeatReservoir::water_column(&self.constants, p.water_depth, p.initial_temperature)?;
        let initial = self.initial_point()?;
        let mut heat_out = initial.outgoing_flux;

        let mut series = TimeSeries::with_capacity(p.n_steps + 1);
        series.push(initial)?;

        for step in 1..=p.n_steps {
            let temperature = reservoir.add_energy((heat_in - heat_out) * seconds_per_step);
            log::debug!("New temp.: {:.3} K", temperature);

            heat_out = laws.flux_from_temperature(temperature, p.emissivity)?;
            series.push(TimeSeriesPoint {
                time: p.resolution * step as Time,
                temperature,
                outgoing_flux: heat_out,
            })?;
        }

        Ok(series)
    }

    fn run_runge_kutta(&self) -> EBMResult<TimeSeries> {
        let p = &self.parameters;
        let laws = self.laws();
        let initial = self.initial_point()?;

        let mut series = TimeSeries::with_capacity(p.n_steps + 1);
        if p.n_steps == 0 {
            series.push(initial)?;
            return Ok(series);
        }

        let system = EnergyBalance {
            heat_in: self.heat_in()?,
            emissivity: p.emissivity,
            sigma: self.constants.stefan_boltzmann,
            heat_capacity: self.heat_capacity()?,
            seconds_per_step: p.resolution * self.constants.seconds_per_year,
        };

        let mut solver = Rk4::new(
            system,
            0.0,
            ModelState::new(p.initial_temperature),
            p.n_steps as Time,
            1.0,
        );
        solver
            .integrate()
            .map_err(|e| EBMError::Integration(format!("{:?}", e)))?;

        let (steps, states) = solver.results().get();
        for (step, state) in steps.iter().zip(states.iter()).take(p.n_steps + 1) {
            let temperature = state[0];
            log::debug!("New temp.: {:.3} K", temperature);
            series.push(TimeSeriesPoint {
                time: p.resolution * step.round(),
                temperature,
                outgoing_flux: laws.flux_from_temperature(temperature, p.emissivity)?,
            })?;
        }

        if series.len() != p.n_steps + 1 {
            return Err(EBMError::Integration(format!(
                "expected {} samples, solver produced {}",
                p.n_steps + 1,
                series.len()
            )));
        }
        Ok(series)
    }
}

impl Default for NakedPlanet {
    fn default() -> Self {
        Self::new()
    }
}
