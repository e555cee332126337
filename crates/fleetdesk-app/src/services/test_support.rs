//! Shared in-memory repository fake for service tests

use std::sync::Mutex;

use chrono::{NaiveDate, NaiveTime};
use fleetdesk_domain::model::{
    ActiveRoute, Delivery, DeliveryStatus, NewDelivery, PendingDelivery, Store, Vehicle,
    VehicleLoad,
};
use fleetdesk_domain::repository::{
    DailyCount, DeliveryRepository, NullTimeCounts, OverviewCounts, PerformanceStats,
    ReportingRepository, StatusCount, StoreRepository, TrainingRow, VehicleAverage,
    VehicleRepository, VehicleStats,
};
use fleetdesk_types::Error;

type Result<T> = std::result::Result<T, Error>;

/// Configurable fake implementing every repository trait
#[derive(Default)]
pub struct FakeRepo {
    pub pending: Vec<PendingDelivery>,
    pub available: Vec<VehicleLoad>,
    pub completed: Vec<Delivery>,
    pub report: Vec<Delivery>,
    pub training: Vec<TrainingRow>,
    pub stores: Vec<Store>,
    pub vehicles: Vec<Vehicle>,
    pub overview: OverviewCounts,
    pub performance: PerformanceStats,
    pub best_vehicle: Option<VehicleAverage>,
    pub prep_avg: Option<f64>,
    pub delivery_avg: Option<f64>,
    /// `(order_id, vehicle_id)` pairs seen by `assign_vehicle`
    pub assigned: Mutex<Vec<(String, String)>>,
    /// When set, `assign_vehicle` fails for these order ids
    pub failing_orders: Vec<String>,
}

impl DeliveryRepository for FakeRepo {
    fn insert(&self, _delivery: &NewDelivery) -> Result<()> {
        Ok(())
    }

    fn find_by_order(&self, _order_id: &str) -> Result<Option<Delivery>> {
        Ok(None)
    }

    fn find_active(&self) -> Result<Vec<ActiveRoute>> {
        Ok(Vec::new())
    }

    fn find_pending_today(&self) -> Result<Vec<PendingDelivery>> {
        Ok(self.pending.clone())
    }

    fn find_recent(&self, limit: i64) -> Result<Vec<Delivery>> {
        Ok(self.report.iter().take(limit as usize).cloned().collect())
    }

    fn recent_completed(&self, limit: i64) -> Result<Vec<Delivery>> {
        Ok(self.completed.iter().take(limit as usize).cloned().collect())
    }

    fn find_for_vehicle(&self, _vehicle_id: &str) -> Result<Vec<Delivery>> {
        Ok(Vec::new())
    }

    fn update_status(&self, _order_id: &str, _status: DeliveryStatus) -> Result<u64> {
        Ok(1)
    }

    fn assign_vehicle(&self, order_id: &str, vehicle_id: &str) -> Result<u64> {
        if self.failing_orders.iter().any(|o| o == order_id) {
            return Err(Error::NotFound(order_id.to_string()));
        }
        self.assigned
            .lock()
            .unwrap()
            .push((order_id.to_string(), vehicle_id.to_string()));
        Ok(1)
    }

    fn assign_driver(&self, _order_id: &str, _driver: &str) -> Result<u64> {
        Ok(1)
    }

    fn update_times(
        &self,
        _order_id: &str,
        _pickup_time: Option<NaiveTime>,
        _delivery_minutes: Option<f64>,
    ) -> Result<u64> {
        Ok(1)
    }

    fn delete(&self, _order_id: &str) -> Result<u64> {
        Ok(1)
    }

    fn delete_route(&self, _vehicle_id: &str, _order_date: NaiveDate) -> Result<u64> {
        Ok(1)
    }
}

impl StoreRepository for FakeRepo {
    fn find_all(&self) -> Result<Vec<Store>> {
        Ok(self.stores.clone())
    }
}

impl VehicleRepository for FakeRepo {
    fn find_all(&self) -> Result<Vec<Vehicle>> {
        Ok(self.vehicles.clone())
    }

    fn find_available(&self) -> Result<Vec<VehicleLoad>> {
        Ok(self.available.clone())
    }
}

impl ReportingRepository for FakeRepo {
    fn status_counts(&self) -> Result<Vec<StatusCount>> {
        Ok(Vec::new())
    }

    fn overview_counts(&self) -> Result<OverviewCounts> {
        Ok(self.overview.clone())
    }

    fn performance_stats(&self) -> Result<PerformanceStats> {
        Ok(self.performance.clone())
    }

    fn daily_delivered(&self, _days: i64) -> Result<Vec<DailyCount>> {
        Ok(Vec::new())
    }

    fn vehicle_stats(&self) -> Result<Vec<VehicleStats>> {
        Ok(Vec::new())
    }

    fn best_vehicle_for_stores(&self, _store_ids: &[String]) -> Result<Option<VehicleAverage>> {
        Ok(self.best_vehicle.clone())
    }

    fn store_prep_average(&self, _store_ids: &[String]) -> Result<Option<f64>> {
        Ok(self.prep_avg)
    }

    fn store_delivery_average(&self, _store_ids: &[String]) -> Result<Option<f64>> {
        Ok(self.delivery_avg)
    }

    fn report_rows(&self, limit: i64) -> Result<Vec<Delivery>> {
        Ok(self.report.iter().take(limit as usize).cloned().collect())
    }

    fn training_rows(&self, limit: i64) -> Result<Vec<TrainingRow>> {
        Ok(self.training.iter().take(limit as usize).cloned().collect())
    }

    fn null_time_counts(&self) -> Result<NullTimeCounts> {
        Ok(NullTimeCounts::default())
    }
}

/// A completed delivery row
pub fn completed_delivery(order: &str) -> Delivery {
    Delivery {
        order_id: order.to_string(),
        store_id: "s1".to_string(),
        vehicle_id: Some("v1".to_string()),
        driver: None,
        order_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        order_time: NaiveTime::from_hms_opt(9, 15, 0),
        pickup_time: NaiveTime::from_hms_opt(9, 45, 0),
        delivery_minutes: Some(55.0),
        status: DeliveryStatus::Delivered,
        dest_lat: None,
        dest_lon: None,
    }
}

/// A pending delivery for planner-facing tests
pub fn pending_delivery(order: &str, store: &str) -> PendingDelivery {
    PendingDelivery {
        order_id: order.to_string(),
        store_id: store.to_string(),
        order_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        order_time: NaiveTime::from_hms_opt(10, 0, 0),
        vehicle_id: None,
    }
}

/// An available vehicle
pub fn vehicle_load(id: &str, load: i64, capacity: i64) -> VehicleLoad {
    VehicleLoad {
        vehicle_id: id.to_string(),
        current_load: load,
        capacity,
    }
}
