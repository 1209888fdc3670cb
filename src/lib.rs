//! Radiative energy balance models
//!
//! Equilibrium temperatures of a planet and its atmosphere from the absorbed
//! stellar flux, and the approach to equilibrium of a planet with a finite heat
//! reservoir.
//!
//! The physics lives in two workspace crates, re-exported here:
//!
//! - [`physics`]: physical constants, radiation laws, errors and time series
//! - [`components`]: layered atmosphere, naked planet and ice-albedo feedback
//!
//! [`config::ModelConfig`] reads the parameters of every component from a TOML
//! document.

pub use ebm_components::components;
pub use ebm_core as physics;

pub mod config;
pub mod scenarios;
