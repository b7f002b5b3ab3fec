// Domain layer - pure value types and the series alignment core
pub mod canonical_path;
pub mod event;
pub mod file;
pub mod laps;
pub mod result;
pub mod series;
pub mod telemetry;
pub mod time;
