//! Postgres implementations of the domain repository traits
//!
//! Each repository is a thin wrapper around the shared [`Db`] handle; every
//! method is one parameterized query blocked on the handle's runtime. Errors
//! pass through to the caller untouched - no retries here.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use fleetdesk_types::Error;

use fleetdesk_domain::model::{
    ActiveRoute, Delivery, DeliveryStatus, NewDelivery, PendingDelivery, Store, Vehicle,
    VehicleLoad,
};
use fleetdesk_domain::repository::{
    DailyCount, DeliveryRepository, NullTimeCounts, OverviewCounts, PerformanceStats,
    ReportingRepository, StatusCount, StoreRepository, TrainingRow, VehicleAverage,
    VehicleRepository, VehicleStats,
};

use crate::connection::Db;

const DELIVERY_COLUMNS: &str = "order_id, store_id, vehicle_id, driver, order_date, order_time, \
     pickup_time, delivery_minutes, status, dest_lat, dest_lon";

/// Delivery-log access
#[derive(Clone)]
pub struct PgDeliveryRepository {
    db: Arc<Db>,
}

impl PgDeliveryRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

impl DeliveryRepository for PgDeliveryRepository {
    fn insert(&self, delivery: &NewDelivery) -> Result<(), Error> {
        self.db.block_on(
            sqlx::query(
                "INSERT INTO delivery_log \
                 (order_id, store_id, vehicle_id, driver, order_date, order_time, status, \
                  dest_lat, dest_lon) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(&delivery.order_id)
            .bind(&delivery.store_id)
            .bind(&delivery.vehicle_id)
            .bind(&delivery.driver)
            .bind(delivery.order_date)
            .bind(delivery.order_time)
            .bind(delivery.status.as_str())
            .bind(delivery.dest_lat)
            .bind(delivery.dest_lon)
            .execute(self.db.pool()),
        )?;
        Ok(())
    }

    fn find_by_order(&self, order_id: &str) -> Result<Option<Delivery>, Error> {
        let sql = format!("SELECT {DELIVERY_COLUMNS} FROM delivery_log WHERE order_id = $1");
        Ok(self.db.block_on(
            sqlx::query_as::<_, Delivery>(&sql)
                .bind(order_id)
                .fetch_optional(self.db.pool()),
        )?)
    }

    fn find_active(&self) -> Result<Vec<ActiveRoute>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, ActiveRoute>(
                "SELECT dl.order_id, dl.store_id, dl.vehicle_id, dl.order_date, \
                        dl.pickup_time, dl.delivery_minutes, \
                        v.model AS vehicle_model, v.year AS vehicle_year \
                 FROM delivery_log dl \
                 LEFT JOIN vehicles v ON dl.vehicle_id = v.vehicle_id \
                 WHERE dl.status = 'In Transit' \
                    OR (dl.pickup_time IS NOT NULL AND dl.delivery_minutes IS NULL) \
                 ORDER BY dl.order_date DESC, dl.order_id",
            )
            .fetch_all(self.db.pool()),
        )?)
    }

    fn find_pending_today(&self) -> Result<Vec<PendingDelivery>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, PendingDelivery>(
                "SELECT order_id, store_id, order_date, order_time, vehicle_id \
                 FROM delivery_log \
                 WHERE pickup_time IS NULL \
                   AND delivery_minutes IS NULL \
                   AND order_date >= CURRENT_DATE \
                 ORDER BY order_time NULLS LAST, order_id",
            )
            .fetch_all(self.db.pool()),
        )?)
    }

    fn find_recent(&self, limit: i64) -> Result<Vec<Delivery>, Error> {
        let sql = format!(
            "SELECT {DELIVERY_COLUMNS} FROM delivery_log \
             ORDER BY order_date DESC, order_time DESC NULLS LAST LIMIT $1"
        );
        Ok(self.db.block_on(
            sqlx::query_as::<_, Delivery>(&sql)
                .bind(limit)
                .fetch_all(self.db.pool()),
        )?)
    }

    fn recent_completed(&self, limit: i64) -> Result<Vec<Delivery>, Error> {
        let sql = format!(
            "SELECT {DELIVERY_COLUMNS} FROM delivery_log \
             WHERE status = 'Delivered' \
             ORDER BY order_date DESC, pickup_time DESC NULLS LAST LIMIT $1"
        );
        Ok(self.db.block_on(
            sqlx::query_as::<_, Delivery>(&sql)
                .bind(limit)
                .fetch_all(self.db.pool()),
        )?)
    }

    fn find_for_vehicle(&self, vehicle_id: &str) -> Result<Vec<Delivery>, Error> {
        let sql = format!(
            "SELECT {DELIVERY_COLUMNS} FROM delivery_log \
             WHERE vehicle_id = $1 ORDER BY order_date DESC, order_id"
        );
        Ok(self.db.block_on(
            sqlx::query_as::<_, Delivery>(&sql)
                .bind(vehicle_id)
                .fetch_all(self.db.pool()),
        )?)
    }

    fn update_status(&self, order_id: &str, status: DeliveryStatus) -> Result<u64, Error> {
        let result = self.db.block_on(
            sqlx::query("UPDATE delivery_log SET status = $2 WHERE order_id = $1")
                .bind(order_id)
                .bind(status.as_str())
                .execute(self.db.pool()),
        )?;
        Ok(result.rows_affected())
    }

    fn assign_vehicle(&self, order_id: &str, vehicle_id: &str) -> Result<u64, Error> {
        let result = self.db.block_on(
            sqlx::query("UPDATE delivery_log SET vehicle_id = $2 WHERE order_id = $1")
                .bind(order_id)
                .bind(vehicle_id)
                .execute(self.db.pool()),
        )?;
        Ok(result.rows_affected())
    }

    fn assign_driver(&self, order_id: &str, driver: &str) -> Result<u64, Error> {
        let result = self.db.block_on(
            sqlx::query("UPDATE delivery_log SET driver = $2 WHERE order_id = $1")
                .bind(order_id)
                .bind(driver)
                .execute(self.db.pool()),
        )?;
        Ok(result.rows_affected())
    }

    fn update_times(
        &self,
        order_id: &str,
        pickup_time: Option<NaiveTime>,
        delivery_minutes: Option<f64>,
    ) -> Result<u64, Error> {
        let result = self.db.block_on(
            sqlx::query(
                "UPDATE delivery_log SET pickup_time = $2, delivery_minutes = $3 \
                 WHERE order_id = $1",
            )
            .bind(order_id)
            .bind(pickup_time)
            .bind(delivery_minutes)
            .execute(self.db.pool()),
        )?;
        Ok(result.rows_affected())
    }

    fn delete(&self, order_id: &str) -> Result<u64, Error> {
        let result = self.db.block_on(
            sqlx::query("DELETE FROM delivery_log WHERE order_id = $1")
                .bind(order_id)
                .execute(self.db.pool()),
        )?;
        Ok(result.rows_affected())
    }

    fn delete_route(&self, vehicle_id: &str, order_date: NaiveDate) -> Result<u64, Error> {
        let result = self.db.block_on(
            sqlx::query("DELETE FROM delivery_log WHERE vehicle_id = $1 AND order_date = $2")
                .bind(vehicle_id)
                .bind(order_date)
                .execute(self.db.pool()),
        )?;
        Ok(result.rows_affected())
    }
}

/// Store lookups
#[derive(Clone)]
pub struct PgStoreRepository {
    db: Arc<Db>,
}

impl PgStoreRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

impl StoreRepository for PgStoreRepository {
    fn find_all(&self) -> Result<Vec<Store>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, Store>(
                "SELECT store_id, name, address, lat, lon FROM stores ORDER BY store_id",
            )
            .fetch_all(self.db.pool()),
        )?)
    }
}

/// Vehicle lookups
#[derive(Clone)]
pub struct PgVehicleRepository {
    db: Arc<Db>,
}

impl PgVehicleRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

impl VehicleRepository for PgVehicleRepository {
    fn find_all(&self) -> Result<Vec<Vehicle>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, Vehicle>(
                "SELECT vehicle_id, model, year, miles, area, status, capacity \
                 FROM vehicles ORDER BY vehicle_id",
            )
            .fetch_all(self.db.pool()),
        )?)
    }

    fn find_available(&self) -> Result<Vec<VehicleLoad>, Error> {
        // Load = deliveries picked up but not yet dropped off.
        Ok(self.db.block_on(
            sqlx::query_as::<_, VehicleLoad>(
                "SELECT v.vehicle_id, \
                        COUNT(dl.order_id) AS current_load, \
                        v.capacity::BIGINT AS capacity \
                 FROM vehicles v \
                 LEFT JOIN delivery_log dl \
                        ON dl.vehicle_id = v.vehicle_id \
                       AND dl.pickup_time IS NOT NULL \
                       AND dl.delivery_minutes IS NULL \
                 WHERE COALESCE(v.status, 'idle') IN ('idle', 'available', 'active') \
                 GROUP BY v.vehicle_id, v.capacity \
                 HAVING COUNT(dl.order_id) < v.capacity \
                 ORDER BY current_load ASC, v.vehicle_id",
            )
            .fetch_all(self.db.pool()),
        )?)
    }
}

/// Aggregate queries for dashboards, analytics, and suggestions
#[derive(Clone)]
pub struct PgReportingRepository {
    db: Arc<Db>,
}

impl PgReportingRepository {
    pub fn new(db: Arc<Db>) -> Self {
        Self { db }
    }
}

impl ReportingRepository for PgReportingRepository {
    fn status_counts(&self) -> Result<Vec<StatusCount>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, StatusCount>(
                "SELECT status, COUNT(*) AS count FROM delivery_log \
                 GROUP BY status ORDER BY count DESC",
            )
            .fetch_all(self.db.pool()),
        )?)
    }

    fn overview_counts(&self) -> Result<OverviewCounts, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, OverviewCounts>(
                "SELECT \
                   (SELECT COUNT(*) FROM delivery_log WHERE status = 'In Transit') AS active, \
                   (SELECT COUNT(*) FROM delivery_log \
                     WHERE status = 'Delivered' AND order_date = CURRENT_DATE) AS delivered_today, \
                   (SELECT COUNT(*) FROM delivery_log \
                     WHERE status IN ('Pending', 'Ordered')) AS pending, \
                   (SELECT COUNT(DISTINCT vehicle_id) FROM delivery_log \
                     WHERE status = 'In Transit') AS vehicles_in_transit",
            )
            .fetch_one(self.db.pool()),
        )?)
    }

    fn performance_stats(&self) -> Result<PerformanceStats, Error> {
        // Duration outliers (below 20 or above 400 minutes) are data-entry
        // noise in the source log and are excluded from the average.
        Ok(self.db.block_on(
            sqlx::query_as::<_, PerformanceStats>(
                "SELECT \
                   AVG(delivery_minutes) FILTER \
                     (WHERE delivery_minutes BETWEEN 20 AND 400) AS avg_delivery_minutes, \
                   MIN(delivery_minutes) FILTER \
                     (WHERE delivery_minutes > 0) AS fastest_minutes, \
                   MAX(delivery_minutes) AS slowest_minutes, \
                   (AVG(EXTRACT(EPOCH FROM pickup_time)) / 60.0)::DOUBLE PRECISION \
                     AS avg_pickup_minute, \
                   COUNT(*) FILTER (WHERE status = 'Delivered') AS delivered, \
                   COUNT(*) AS total \
                 FROM delivery_log",
            )
            .fetch_one(self.db.pool()),
        )?)
    }

    fn daily_delivered(&self, days: i64) -> Result<Vec<DailyCount>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, DailyCount>(
                "SELECT order_date AS day, COUNT(*) AS count \
                 FROM delivery_log \
                 WHERE status = 'Delivered' AND order_date >= CURRENT_DATE - $1::INT \
                 GROUP BY order_date ORDER BY order_date",
            )
            .bind(days)
            .fetch_all(self.db.pool()),
        )?)
    }

    fn vehicle_stats(&self) -> Result<Vec<VehicleStats>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, VehicleStats>(
                "SELECT vehicle_id, COUNT(*) AS deliveries, \
                        AVG(delivery_minutes) FILTER \
                          (WHERE delivery_minutes BETWEEN 20 AND 400) AS avg_minutes \
                 FROM delivery_log \
                 WHERE vehicle_id IS NOT NULL \
                 GROUP BY vehicle_id ORDER BY deliveries DESC",
            )
            .fetch_all(self.db.pool()),
        )?)
    }

    fn best_vehicle_for_stores(
        &self,
        store_ids: &[String],
    ) -> Result<Option<VehicleAverage>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, VehicleAverage>(
                "SELECT vehicle_id, \
                        AVG(delivery_minutes) AS avg_minutes, \
                        COUNT(*) AS deliveries \
                 FROM delivery_log \
                 WHERE store_id = ANY($1) \
                   AND vehicle_id IS NOT NULL \
                   AND delivery_minutes BETWEEN 20 AND 400 \
                 GROUP BY vehicle_id \
                 HAVING COUNT(*) >= 3 \
                 ORDER BY AVG(delivery_minutes) ASC \
                 LIMIT 1",
            )
            .bind(store_ids)
            .fetch_optional(self.db.pool()),
        )?)
    }

    fn store_prep_average(&self, store_ids: &[String]) -> Result<Option<f64>, Error> {
        Ok(self.db.block_on(
            sqlx::query_scalar::<_, Option<f64>>(
                "SELECT (AVG(EXTRACT(EPOCH FROM (pickup_time - order_time))) / 60.0)\
                 ::DOUBLE PRECISION \
                 FROM delivery_log \
                 WHERE store_id = ANY($1) \
                   AND pickup_time IS NOT NULL \
                   AND order_time IS NOT NULL \
                   AND pickup_time > order_time",
            )
            .bind(store_ids)
            .fetch_one(self.db.pool()),
        )?)
    }

    fn store_delivery_average(&self, store_ids: &[String]) -> Result<Option<f64>, Error> {
        Ok(self.db.block_on(
            sqlx::query_scalar::<_, Option<f64>>(
                "SELECT AVG(delivery_minutes) \
                 FROM delivery_log \
                 WHERE store_id = ANY($1) AND delivery_minutes BETWEEN 20 AND 400",
            )
            .bind(store_ids)
            .fetch_one(self.db.pool()),
        )?)
    }

    fn report_rows(&self, limit: i64) -> Result<Vec<Delivery>, Error> {
        let sql = format!(
            "SELECT {DELIVERY_COLUMNS} FROM delivery_log \
             ORDER BY order_date DESC, order_time DESC NULLS LAST LIMIT $1"
        );
        Ok(self.db.block_on(
            sqlx::query_as::<_, Delivery>(&sql)
                .bind(limit)
                .fetch_all(self.db.pool()),
        )?)
    }

    fn training_rows(&self, limit: i64) -> Result<Vec<TrainingRow>, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, TrainingRow>(
                "SELECT order_id, store_id, vehicle_id, order_date, order_time, \
                        pickup_time, delivery_minutes \
                 FROM delivery_log \
                 WHERE delivery_minutes BETWEEN 20 AND 400 \
                 ORDER BY order_date DESC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(self.db.pool()),
        )?)
    }

    fn null_time_counts(&self) -> Result<NullTimeCounts, Error> {
        Ok(self.db.block_on(
            sqlx::query_as::<_, NullTimeCounts>(
                "SELECT COUNT(*) FILTER (WHERE pickup_time IS NULL) AS null_pickup, \
                        COUNT(*) FILTER (WHERE delivery_minutes IS NULL) AS null_delivery \
                 FROM delivery_log",
            )
            .fetch_one(self.db.pool()),
        )?)
    }
}
