pub mod constants;
pub mod radiation;
pub mod reservoir;
pub mod timeseries;

pub mod errors;
