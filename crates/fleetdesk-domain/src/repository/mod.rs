//! Repository trait definitions for the persistence layer

use chrono::{NaiveDate, NaiveTime};
use fleetdesk_types::Error;
use serde::{Deserialize, Serialize};

use crate::model::{
    ActiveRoute, Delivery, DeliveryStatus, NewDelivery, PendingDelivery, Store, Vehicle,
    VehicleLoad,
};

/// Repository for delivery records
pub trait DeliveryRepository {
    /// Insert a new delivery record
    fn insert(&self, delivery: &NewDelivery) -> Result<(), Error>;

    /// Find a delivery by its order id
    fn find_by_order(&self, order_id: &str) -> Result<Option<Delivery>, Error>;

    /// Open routes: in transit, or picked up but not yet delivered
    fn find_active(&self) -> Result<Vec<ActiveRoute>, Error>;

    /// Deliveries with no pickup or drop recorded, ordered today or later
    fn find_pending_today(&self) -> Result<Vec<PendingDelivery>, Error>;

    /// Most recent deliveries, newest first
    fn find_recent(&self, limit: i64) -> Result<Vec<Delivery>, Error>;

    /// Most recently completed deliveries, newest first
    fn recent_completed(&self, limit: i64) -> Result<Vec<Delivery>, Error>;

    /// All deliveries currently assigned to a vehicle, newest first
    fn find_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Delivery>, Error>;

    /// Set the lifecycle status; returns affected row count
    fn update_status(&self, order_id: &str, status: DeliveryStatus) -> Result<u64, Error>;

    /// Reassign the delivery to a vehicle
    fn assign_vehicle(&self, order_id: &str, vehicle_id: &str) -> Result<u64, Error>;

    /// Reassign the delivery to a driver
    fn assign_driver(&self, order_id: &str, driver: &str) -> Result<u64, Error>;

    /// Update pickup time and delivery duration
    fn update_times(
        &self,
        order_id: &str,
        pickup_time: Option<NaiveTime>,
        delivery_minutes: Option<f64>,
    ) -> Result<u64, Error>;

    /// Delete one delivery record
    fn delete(&self, order_id: &str) -> Result<u64, Error>;

    /// Delete a vehicle's route for a given day (all its deliveries)
    fn delete_route(&self, vehicle_id: &str, order_date: NaiveDate) -> Result<u64, Error>;
}

/// Repository for stores
pub trait StoreRepository {
    /// All stores with coordinates
    fn find_all(&self) -> Result<Vec<Store>, Error>;
}

/// Repository for vehicles
pub trait VehicleRepository {
    /// All vehicles
    fn find_all(&self) -> Result<Vec<Vehicle>, Error>;

    /// Vehicles with spare capacity, least-loaded first
    fn find_available(&self) -> Result<Vec<VehicleLoad>, Error>;
}

/// Count of deliveries per status string
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Dashboard headline counts
#[derive(Clone, Debug, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct OverviewCounts {
    pub active: i64,
    pub delivered_today: i64,
    pub pending: i64,
    pub vehicles_in_transit: i64,
}

/// Aggregate delivery performance over the whole log
#[derive(Clone, Debug, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct PerformanceStats {
    pub avg_delivery_minutes: Option<f64>,
    pub fastest_minutes: Option<f64>,
    pub slowest_minutes: Option<f64>,
    /// Average pickup time as minutes past midnight
    pub avg_pickup_minute: Option<f64>,
    pub delivered: i64,
    pub total: i64,
}

impl PerformanceStats {
    /// Delivered / total, as a percentage
    pub fn completion_rate(&self) -> Option<f64> {
        (self.total > 0).then(|| self.delivered as f64 / self.total as f64 * 100.0)
    }
}

/// Delivered count for one day
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyCount {
    pub day: NaiveDate,
    pub count: i64,
}

/// Per-vehicle delivery statistics
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct VehicleStats {
    pub vehicle_id: String,
    pub deliveries: i64,
    pub avg_minutes: Option<f64>,
}

/// Best-historical-vehicle row for a set of stores
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct VehicleAverage {
    pub vehicle_id: String,
    pub avg_minutes: f64,
    pub deliveries: i64,
}

/// A completed delivery row used to train the time predictor
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrainingRow {
    pub order_id: String,
    pub store_id: String,
    pub vehicle_id: Option<String>,
    pub order_date: NaiveDate,
    pub order_time: Option<NaiveTime>,
    pub pickup_time: Option<NaiveTime>,
    pub delivery_minutes: f64,
}

/// Null-timestamp diagnostics over the delivery log
#[derive(Clone, Debug, Default, Serialize, Deserialize, sqlx::FromRow)]
pub struct NullTimeCounts {
    pub null_pickup: i64,
    pub null_delivery: i64,
}

/// Read-only aggregate queries backing dashboards, analytics, and the
/// optimizer's suggestion heuristics
pub trait ReportingRepository {
    /// Delivery counts grouped by status
    fn status_counts(&self) -> Result<Vec<StatusCount>, Error>;

    /// Headline dashboard counts
    fn overview_counts(&self) -> Result<OverviewCounts, Error>;

    /// Aggregate performance statistics
    fn performance_stats(&self) -> Result<PerformanceStats, Error>;

    /// Delivered-per-day counts over the trailing window
    fn daily_delivered(&self, days: i64) -> Result<Vec<DailyCount>, Error>;

    /// Delivery statistics per vehicle
    fn vehicle_stats(&self) -> Result<Vec<VehicleStats>, Error>;

    /// Historically best vehicle for the given stores (lowest average
    /// delivery minutes over at least three deliveries)
    fn best_vehicle_for_stores(&self, store_ids: &[String])
        -> Result<Option<VehicleAverage>, Error>;

    /// Average minutes between order and pickup for the given stores
    fn store_prep_average(&self, store_ids: &[String]) -> Result<Option<f64>, Error>;

    /// Average delivery minutes for the given stores
    fn store_delivery_average(&self, store_ids: &[String]) -> Result<Option<f64>, Error>;

    /// Bounded, newest-first rows for the analytics report table
    fn report_rows(&self, limit: i64) -> Result<Vec<Delivery>, Error>;

    /// Completed deliveries with plausible durations, for model training
    fn training_rows(&self, limit: i64) -> Result<Vec<TrainingRow>, Error>;

    /// Null pickup/drop timestamp counts
    fn null_time_counts(&self) -> Result<NullTimeCounts, Error>;
}
