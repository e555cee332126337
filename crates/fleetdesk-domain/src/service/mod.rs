//! Domain services

pub mod capacity_checker;
pub mod delivery_predictor;
pub mod route_planner;

pub use capacity_checker::{check_capacity, CapacityCheck};
pub use delivery_predictor::{DeliveryTimeModel, PredictionInput, TrainingSample};
pub use route_planner::{plan_routes, RouteAssignment, RoutePlan};
