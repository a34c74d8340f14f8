pub mod simulation_service;

pub use simulation_service::{MonteCarloService, ServiceError, SimulationReport};
