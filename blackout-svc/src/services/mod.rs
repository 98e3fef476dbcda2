//! Resolution services over the structural store

pub mod address_resolver;
pub mod blackout_matcher;
pub mod building_locator;
pub mod estimator;
pub mod neighbor_discovery;
pub mod orchestrator;
pub mod weather;

pub use address_resolver::{AddressQuery, AddressResolver};
pub use blackout_matcher::BlackoutMatcher;
pub use building_locator::BuildingLocator;
pub use estimator::{
    AbstainingEstimator, DurationEstimator, EstimatorError, HttpEstimator, Prediction,
    PredictionInput,
};
pub use neighbor_discovery::NeighborDiscovery;
pub use orchestrator::{ResolutionOrchestrator, ResolutionResult, ResolveError, ResolvedBlackout};
pub use weather::{SqliteWeatherStore, WeatherEnricher};
