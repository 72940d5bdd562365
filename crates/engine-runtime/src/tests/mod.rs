mod orchestrator;
mod service;
