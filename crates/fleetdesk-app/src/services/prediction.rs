//! Delivery-time prediction over the live log
//!
//! Pulls completed deliveries, derives per-store and per-vehicle averages,
//! fits the domain regression model, and scores the open backlog with it.

use std::collections::HashMap;

use chrono::{Datelike, Timelike};
use serde::{Deserialize, Serialize};

use fleetdesk_domain::model::PendingDelivery;
use fleetdesk_domain::repository::{DeliveryRepository, ReportingRepository, TrainingRow};
use fleetdesk_domain::service::{DeliveryTimeModel, PredictionInput, TrainingSample};
use fleetdesk_types::Result;

use crate::{DynDeliveryRepo, DynReportingRepo};

/// Fallbacks for rows with no usable history
const DEFAULT_HOUR: f64 = 12.0;
const DEFAULT_PREP_MINUTES: f64 = 15.0;
const DEFAULT_AVG_MINUTES: f64 = 147.0;

/// A fitted model plus the averages needed to score new rows
pub struct FittedPredictor {
    model: DeliveryTimeModel,
    store_avg: HashMap<String, f64>,
    vehicle_avg: HashMap<String, f64>,
    global_avg: f64,
    pub mae: f64,
}

impl FittedPredictor {
    pub fn sample_count(&self) -> usize {
        self.model.sample_count()
    }

    fn input_for(&self, pending: &PendingDelivery) -> PredictionInput {
        let order_hour = pending
            .order_time
            .map_or(DEFAULT_HOUR, |t| t.hour() as f64);
        let day_of_week = pending.order_date.weekday().num_days_from_monday() as f64;
        let store_avg = self
            .store_avg
            .get(&pending.store_id)
            .copied()
            .unwrap_or(self.global_avg);
        let vehicle_avg = pending
            .vehicle_id
            .as_ref()
            .and_then(|v| self.vehicle_avg.get(v))
            .copied()
            .unwrap_or(self.global_avg);

        PredictionInput {
            order_hour,
            day_of_week,
            prep_minutes: DEFAULT_PREP_MINUTES,
            store_avg_minutes: store_avg,
            vehicle_avg_minutes: vehicle_avg,
        }
    }

    pub fn predict(&self, pending: &PendingDelivery) -> f64 {
        self.model.predict(&self.input_for(pending))
    }
}

/// One scored open delivery
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PredictedDelivery {
    pub order_id: String,
    pub store_id: String,
    pub vehicle_id: Option<String>,
    pub predicted_minutes: f64,
}

/// Train-and-score use cases
pub struct PredictionService {
    reporting: DynReportingRepo,
    deliveries: DynDeliveryRepo,
}

impl PredictionService {
    pub fn new(reporting: DynReportingRepo, deliveries: DynDeliveryRepo) -> Self {
        Self {
            reporting,
            deliveries,
        }
    }

    /// Fit a model on the most recent completed deliveries
    pub fn train(&self, history_limit: i64) -> Result<FittedPredictor> {
        let rows = self.reporting.training_rows(history_limit)?;

        let store_avg = group_average(&rows, |r| Some(r.store_id.clone()));
        let vehicle_avg = group_average(&rows, |r| r.vehicle_id.clone());
        let global_avg = if rows.is_empty() {
            DEFAULT_AVG_MINUTES
        } else {
            rows.iter().map(|r| r.delivery_minutes).sum::<f64>() / rows.len() as f64
        };

        let samples: Vec<TrainingSample> = rows
            .iter()
            .map(|row| {
                let order_hour = row.order_time.map_or(DEFAULT_HOUR, |t| t.hour() as f64);
                let prep_minutes = match (row.order_time, row.pickup_time) {
                    (Some(order), Some(pickup)) if pickup > order => {
                        (pickup - order).num_seconds() as f64 / 60.0
                    }
                    _ => DEFAULT_PREP_MINUTES,
                };
                TrainingSample {
                    order_hour,
                    day_of_week: row.order_date.weekday().num_days_from_monday() as f64,
                    prep_minutes,
                    store_avg_minutes: store_avg
                        .get(&row.store_id)
                        .copied()
                        .unwrap_or(global_avg),
                    vehicle_avg_minutes: row
                        .vehicle_id
                        .as_ref()
                        .and_then(|v| vehicle_avg.get(v))
                        .copied()
                        .unwrap_or(global_avg),
                    actual_minutes: row.delivery_minutes,
                }
            })
            .collect();

        let model = DeliveryTimeModel::fit(&samples)?;
        let mae = model.mean_absolute_error(&samples);
        tracing::info!(samples = samples.len(), mae, "fitted delivery-time model");

        Ok(FittedPredictor {
            model,
            store_avg,
            vehicle_avg,
            global_avg,
            mae,
        })
    }

    /// Score the open backlog with a fitted model
    pub fn predict_pending(&self, predictor: &FittedPredictor) -> Result<Vec<PredictedDelivery>> {
        let pending = self.deliveries.find_pending_today()?;
        Ok(pending
            .into_iter()
            .map(|p| {
                let predicted_minutes = predictor.predict(&p);
                PredictedDelivery {
                    order_id: p.order_id,
                    store_id: p.store_id,
                    vehicle_id: p.vehicle_id,
                    predicted_minutes,
                }
            })
            .collect())
    }
}

fn group_average(
    rows: &[TrainingRow],
    key: impl Fn(&TrainingRow) -> Option<String>,
) -> HashMap<String, f64> {
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for row in rows {
        if let Some(k) = key(row) {
            let entry = sums.entry(k).or_insert((0.0, 0));
            entry.0 += row.delivery_minutes;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(k, (sum, n))| (k, sum / n as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use chrono::{NaiveDate, NaiveTime};
    use fleetdesk_types::Error;

    use crate::services::test_support::{pending_delivery, FakeRepo};

    /// Rows where the duration is the store average plus a small hour
    /// effect; enough spread for a stable fit.
    fn training_rows() -> Vec<TrainingRow> {
        let mut rows = Vec::new();
        for day in 1..=28 {
            for (store, base) in [("s1", 60.0), ("s2", 120.0)] {
                let hour = 6 + (day % 12) as u32;
                rows.push(TrainingRow {
                    order_id: format!("{store}-{day}"),
                    store_id: store.to_string(),
                    vehicle_id: Some(format!("v{}", day % 3)),
                    order_date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
                    order_time: NaiveTime::from_hms_opt(hour, 0, 0),
                    pickup_time: NaiveTime::from_hms_opt(hour, 20, 0),
                    delivery_minutes: base + hour as f64,
                });
            }
        }
        rows
    }

    #[test]
    fn trains_and_scores_the_backlog() {
        let repo = Arc::new(FakeRepo {
            training: training_rows(),
            pending: vec![pending_delivery("p1", "s1"), pending_delivery("p2", "s2")],
            ..Default::default()
        });
        let service = PredictionService::new(repo.clone(), repo);

        let predictor = service.train(500).unwrap();
        assert!(predictor.mae < 10.0, "mae too high: {}", predictor.mae);

        let predictions = service.predict_pending(&predictor).unwrap();
        assert_eq!(predictions.len(), 2);
        // The slow store should predict slower than the fast one.
        let by_store = |s: &str| {
            predictions
                .iter()
                .find(|p| p.store_id == s)
                .unwrap()
                .predicted_minutes
        };
        assert!(by_store("s2") > by_store("s1"));
    }

    #[test]
    fn empty_history_is_insufficient_data() {
        let repo = Arc::new(FakeRepo::default());
        let service = PredictionService::new(repo.clone(), repo);
        assert!(matches!(
            service.train(500),
            Err(Error::InsufficientData(_))
        ));
    }
}
