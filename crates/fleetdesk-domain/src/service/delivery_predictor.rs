//! Delivery-time prediction
//!
//! Ordinary least squares over hand-picked features of the delivery log:
//! time-of-day and day-of-week effects (with rush-hour indicator terms),
//! store preparation time, and historical store/vehicle averages. Fitted by
//! solving the normal equations; a small ridge term keeps the system
//! solvable when features are collinear.

use fleetdesk_types::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of model terms, intercept included
pub const FEATURE_COUNT: usize = 12;

const RIDGE: f64 = 1e-6;

/// One completed delivery, feature-ready
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Hour of day the order was placed (0-23)
    pub order_hour: f64,
    /// Day of week, 0 = Monday
    pub day_of_week: f64,
    /// Minutes from order to pickup
    pub prep_minutes: f64,
    /// Historical average delivery minutes for the store
    pub store_avg_minutes: f64,
    /// Historical average delivery minutes for the vehicle
    pub vehicle_avg_minutes: f64,
    /// Observed delivery minutes (the target)
    pub actual_minutes: f64,
}

/// Feature-ready inputs for a prediction
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PredictionInput {
    pub order_hour: f64,
    pub day_of_week: f64,
    pub prep_minutes: f64,
    pub store_avg_minutes: f64,
    pub vehicle_avg_minutes: f64,
}

fn feature_vector(
    hour: f64,
    day_of_week: f64,
    prep: f64,
    store_avg: f64,
    vehicle_avg: f64,
) -> [f64; FEATURE_COUNT] {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    [
        1.0, // intercept
        hour,
        day_of_week,
        flag((7.0..=9.0).contains(&hour)),   // morning rush
        flag((11.0..=14.0).contains(&hour)), // lunch rush
        flag((17.0..=20.0).contains(&hour)), // dinner rush
        flag(hour >= 22.0 || hour <= 5.0),   // late night
        flag(day_of_week >= 5.0),            // weekend
        hour * hour,
        prep,
        store_avg,
        vehicle_avg,
    ]
}

impl TrainingSample {
    fn features(&self) -> [f64; FEATURE_COUNT] {
        feature_vector(
            self.order_hour,
            self.day_of_week,
            self.prep_minutes,
            self.store_avg_minutes,
            self.vehicle_avg_minutes,
        )
    }
}

impl PredictionInput {
    fn features(&self) -> [f64; FEATURE_COUNT] {
        feature_vector(
            self.order_hour,
            self.day_of_week,
            self.prep_minutes,
            self.store_avg_minutes,
            self.vehicle_avg_minutes,
        )
    }
}

/// A fitted delivery-time model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliveryTimeModel {
    weights: [f64; FEATURE_COUNT],
    samples: usize,
}

impl DeliveryTimeModel {
    /// Fit the model on completed deliveries.
    ///
    /// Needs at least `FEATURE_COUNT` samples; returns
    /// [`Error::InsufficientData`] otherwise.
    pub fn fit(samples: &[TrainingSample]) -> Result<Self> {
        if samples.len() < FEATURE_COUNT {
            return Err(Error::InsufficientData(format!(
                "need at least {FEATURE_COUNT} completed deliveries, got {}",
                samples.len()
            )));
        }

        // Normal equations: (XᵀX + λI) w = Xᵀy
        let mut xtx = [[0.0; FEATURE_COUNT]; FEATURE_COUNT];
        let mut xty = [0.0; FEATURE_COUNT];
        for sample in samples {
            let x = sample.features();
            for i in 0..FEATURE_COUNT {
                xty[i] += x[i] * sample.actual_minutes;
                for j in 0..FEATURE_COUNT {
                    xtx[i][j] += x[i] * x[j];
                }
            }
        }
        for (i, row) in xtx.iter_mut().enumerate() {
            row[i] += RIDGE;
        }

        let weights = solve(xtx, xty)?;
        Ok(Self {
            weights,
            samples: samples.len(),
        })
    }

    /// Predicted delivery minutes, floored at zero
    pub fn predict(&self, input: &PredictionInput) -> f64 {
        let x = input.features();
        let estimate: f64 = x
            .iter()
            .zip(self.weights.iter())
            .map(|(xi, wi)| xi * wi)
            .sum();
        estimate.max(0.0)
    }

    /// Mean absolute error over a sample set
    pub fn mean_absolute_error(&self, samples: &[TrainingSample]) -> f64 {
        if samples.is_empty() {
            return 0.0;
        }
        let total: f64 = samples
            .iter()
            .map(|s| {
                let input = PredictionInput {
                    order_hour: s.order_hour,
                    day_of_week: s.day_of_week,
                    prep_minutes: s.prep_minutes,
                    store_avg_minutes: s.store_avg_minutes,
                    vehicle_avg_minutes: s.vehicle_avg_minutes,
                };
                (self.predict(&input) - s.actual_minutes).abs()
            })
            .sum();
        total / samples.len() as f64
    }

    /// How many samples the model was fitted on
    pub fn sample_count(&self) -> usize {
        self.samples
    }
}

/// Gaussian elimination with partial pivoting
fn solve(
    mut a: [[f64; FEATURE_COUNT]; FEATURE_COUNT],
    mut b: [f64; FEATURE_COUNT],
) -> Result<[f64; FEATURE_COUNT]> {
    let n = FEATURE_COUNT;

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        if a[pivot_row][col].abs() < 1e-12 {
            return Err(Error::InsufficientData(
                "training data does not determine the model".to_string(),
            ));
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in (col + 1)..n {
            let factor = a[row][col] / a[col][col];
            for k in col..n {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut x = [0.0; FEATURE_COUNT];
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in (row + 1)..n {
            acc -= a[row][k] * x[k];
        }
        x[row] = acc / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Synthetic log following a known linear rule. The prep/store/vehicle
    /// columns vary via modular patterns so no feature is a linear
    /// combination of the others and the fit is unique.
    fn synthetic_samples() -> Vec<TrainingSample> {
        let mut samples = Vec::new();
        for day in 0u32..7 {
            for hour in (0u32..24).step_by(2) {
                let prep = 10.0 + ((day * 5 + hour * 3) % 11) as f64;
                let store_avg = 100.0 + ((day * 31 + hour * 17) % 23) as f64 * 2.0;
                let vehicle_avg = 90.0 + ((day * 13 + hour * 7) % 19) as f64 * 3.0;
                let actual = 20.0 + 2.0 * prep + 0.4 * store_avg + 0.1 * vehicle_avg;
                samples.push(TrainingSample {
                    order_hour: hour as f64,
                    day_of_week: day as f64,
                    prep_minutes: prep,
                    store_avg_minutes: store_avg,
                    vehicle_avg_minutes: vehicle_avg,
                    actual_minutes: actual,
                });
            }
        }
        samples
    }

    #[test]
    fn recovers_a_linear_relationship() {
        let samples = synthetic_samples();
        let model = DeliveryTimeModel::fit(&samples).unwrap();
        assert!(model.mean_absolute_error(&samples) < 1.0);

        let prediction = model.predict(&PredictionInput {
            order_hour: 13.0,
            day_of_week: 2.0,
            prep_minutes: 15.0,
            store_avg_minutes: 130.0,
            vehicle_avg_minutes: 110.0,
        });
        let expected = 20.0 + 2.0 * 15.0 + 0.4 * 130.0 + 0.1 * 110.0;
        assert!((prediction - expected).abs() < 5.0);
    }

    #[test]
    fn refuses_tiny_training_sets() {
        let samples = vec![
            TrainingSample {
                order_hour: 9.0,
                day_of_week: 1.0,
                prep_minutes: 10.0,
                store_avg_minutes: 120.0,
                vehicle_avg_minutes: 100.0,
                actual_minutes: 140.0,
            };
            FEATURE_COUNT - 1
        ];
        assert!(matches!(
            DeliveryTimeModel::fit(&samples),
            Err(Error::InsufficientData(_))
        ));
    }

    #[test]
    fn predictions_are_never_negative() {
        let samples = synthetic_samples();
        let model = DeliveryTimeModel::fit(&samples).unwrap();
        let prediction = model.predict(&PredictionInput {
            order_hour: 3.0,
            day_of_week: 0.0,
            prep_minutes: -5000.0,
            store_avg_minutes: 0.0,
            vehicle_avg_minutes: 0.0,
        });
        assert!(prediction >= 0.0);
    }
}
