// Telemetry data layer for the solar car: uniform series, events and remote stores
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;

pub use domain::canonical_path::CanonicalPath;
pub use domain::event::EventWindow;
pub use domain::result::FetchResult;
pub use domain::series::{AlignMethod, AlignOptions, GranularityPolicy, UniformSeries};
pub use error::DataError;
