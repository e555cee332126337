//! Vehicle and fleet-load records

use serde::{Deserialize, Serialize};

/// A fleet vehicle
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Vehicle {
    pub vehicle_id: String,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub miles: Option<f64>,
    pub area: Option<String>,
    pub status: Option<String>,
    /// Maximum number of concurrently assigned deliveries
    pub capacity: i32,
}

impl Vehicle {
    /// "Model (Year)" label for combo boxes and tables
    pub fn label(&self) -> String {
        match (&self.model, self.year) {
            (Some(model), Some(year)) => format!("{model} ({year})"),
            (Some(model), None) => model.clone(),
            _ => self.vehicle_id.clone(),
        }
    }
}

/// A vehicle with its current open-delivery load, as returned by the
/// availability query
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct VehicleLoad {
    pub vehicle_id: String,
    pub current_load: i64,
    pub capacity: i64,
}

impl VehicleLoad {
    /// Remaining deliveries this vehicle can take, bounded by both its own
    /// capacity and the per-run ceiling
    pub fn headroom(&self, max_per_vehicle: i64) -> i64 {
        (self.capacity.min(max_per_vehicle) - self.current_load).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headroom_respects_both_limits() {
        let load = VehicleLoad {
            vehicle_id: "v1".into(),
            current_load: 4,
            capacity: 12,
        };
        assert_eq!(load.headroom(10), 6);
        assert_eq!(load.headroom(20), 8);
    }

    #[test]
    fn headroom_never_negative() {
        let load = VehicleLoad {
            vehicle_id: "v1".into(),
            current_load: 9,
            capacity: 10,
        };
        assert_eq!(load.headroom(5), 0);
    }
}
