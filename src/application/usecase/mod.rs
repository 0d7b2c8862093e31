pub mod forecast_usecase;

// Re-export public API
pub use forecast_usecase::{cache_key, ForecastOrchestrator, ForecastUseCase, OrchestratorSettings};
