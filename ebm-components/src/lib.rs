//! Energy balance model components
//!
//! - `layered_atmosphere`: radiative equilibrium through $N$ atmospheric layers
//! - `naked_planet`: temperature evolution of a planet with a finite heat reservoir
//! - `ice_albedo`: iterative ice-albedo feedback and solar constant sweeps
//!
//! Every component takes its physical constants from an injected
//! [`PhysicalConstants`](ebm_core::constants::PhysicalConstants) table.

pub mod components;
