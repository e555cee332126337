//! Application service layer for fleetdesk
//!
//! Use cases wired over the domain repository traits: dashboard metrics,
//! analytics and CSV export, fleet route optimization, delivery-time
//! prediction, plus configuration loading.

pub mod config;
pub mod services;

pub use config::AppConfig;
pub use services::{
    AnalyticsService, DashboardService, FittedPredictor, Notification, OptimizationOutcome,
    OptimizationSummary, OptimizerService, PredictedDelivery, PredictionService, RouteSuggestion,
    DEFAULT_MAX_PER_VEHICLE,
};

use std::sync::Arc;

use fleetdesk_domain::repository::{
    DeliveryRepository, ReportingRepository, StoreRepository, VehicleRepository,
};

/// Shared repository handles, as the services consume them
pub type DynDeliveryRepo = Arc<dyn DeliveryRepository>;
pub type DynStoreRepo = Arc<dyn StoreRepository>;
pub type DynVehicleRepo = Arc<dyn VehicleRepository>;
pub type DynReportingRepo = Arc<dyn ReportingRepository>;
