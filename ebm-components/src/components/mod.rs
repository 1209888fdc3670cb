pub mod ice_albedo;
pub mod layered_atmosphere;
pub mod naked_planet;

pub use ice_albedo::{
    EmpiricalRelationProvider, FeedbackTrajectory, IceAlbedoFeedback,
    IceAlbedoFeedbackParameters, IceAlbedoRelations, LinearRelation, RadiativeRelations,
    SweepResult, MAX_SWEEP_LENGTH,
};
pub use layered_atmosphere::{
    nuclear_winter, solve_layers, LayerStack, LayeredAtmosphere, LayeredAtmosphereParameters,
};
pub use naked_planet::{Integrator, NakedPlanet, NakedPlanetParameters};
