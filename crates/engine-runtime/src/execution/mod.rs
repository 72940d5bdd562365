pub mod factory;
pub mod orchestrator;
pub mod service;
