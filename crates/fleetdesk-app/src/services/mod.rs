//! Application services

mod analytics;
mod dashboard;
mod optimizer;
mod prediction;

#[cfg(test)]
pub(crate) mod test_support;

pub use analytics::AnalyticsService;
pub use dashboard::{DashboardService, Notification};
pub use optimizer::{
    OptimizationOutcome, OptimizationSummary, OptimizerService, RouteSuggestion,
    DEFAULT_MAX_PER_VEHICLE,
};
pub use prediction::{FittedPredictor, PredictedDelivery, PredictionService};
