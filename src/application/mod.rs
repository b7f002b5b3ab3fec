// Application layer - Use cases over the repository and data source seams
pub mod data_source;
pub mod lap_service;
pub mod series_service;
pub mod telemetry_repository;
