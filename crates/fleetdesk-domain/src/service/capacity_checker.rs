//! Capacity checking over route assignments
//!
//! Verifies a planned (or persisted) assignment view against the fleet's
//! declared capacities: a vehicle's open load plus its newly assigned
//! deliveries must not exceed its capacity.

use serde::{Deserialize, Serialize};

use crate::model::VehicleLoad;
use crate::service::route_planner::RoutePlan;

/// Capacity verdict for one vehicle appearing in a plan
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapacityCheck {
    pub vehicle_id: String,
    /// Open deliveries before the plan
    pub current_load: i64,
    /// Deliveries the plan adds
    pub planned: i64,
    /// Declared capacity, when the vehicle is known to the fleet
    pub capacity: Option<i64>,
    pub is_over_capacity: bool,
    /// How far over the limit, when over
    pub excess: Option<i64>,
}

/// Check each vehicle used by `plan` against the fleet's capacities.
///
/// Vehicles the plan references but the fleet list does not contain are
/// reported with no capacity and never flagged; the caller decides whether
/// an unknown vehicle is itself an error.
pub fn check_capacity(plan: &RoutePlan, fleet: &[VehicleLoad]) -> Vec<CapacityCheck> {
    plan.load_per_vehicle()
        .into_iter()
        .map(|(vehicle_id, planned)| {
            let known = fleet.iter().find(|v| v.vehicle_id == vehicle_id);
            let current_load = known.map_or(0, |v| v.current_load);
            let (is_over, excess, capacity) = match known {
                Some(v) => {
                    let total = v.current_load + planned;
                    let over = total - v.capacity;
                    (over > 0, (over > 0).then_some(over), Some(v.capacity))
                }
                None => (false, None, None),
            };
            CapacityCheck {
                vehicle_id: vehicle_id.to_string(),
                current_load,
                planned,
                capacity,
                is_over_capacity: is_over,
                excess,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::route_planner::RouteAssignment;

    fn plan_with(vehicle_id: &str, orders: usize) -> RoutePlan {
        RoutePlan {
            assignments: vec![RouteAssignment {
                vehicle_id: vehicle_id.to_string(),
                store_id: "s1".to_string(),
                order_ids: (0..orders).map(|i| format!("o{i}")).collect(),
            }],
            unassigned: Vec::new(),
        }
    }

    fn fleet_vehicle(id: &str, load: i64, capacity: i64) -> VehicleLoad {
        VehicleLoad {
            vehicle_id: id.to_string(),
            current_load: load,
            capacity,
        }
    }

    #[test]
    fn within_capacity_is_clean() {
        let checks = check_capacity(&plan_with("v1", 3), &[fleet_vehicle("v1", 2, 10)]);
        assert_eq!(checks.len(), 1);
        assert!(!checks[0].is_over_capacity);
        assert_eq!(checks[0].excess, None);
        assert_eq!(checks[0].capacity, Some(10));
    }

    #[test]
    fn over_capacity_is_flagged_with_excess() {
        let checks = check_capacity(&plan_with("v1", 6), &[fleet_vehicle("v1", 7, 10)]);
        assert!(checks[0].is_over_capacity);
        assert_eq!(checks[0].excess, Some(3));
    }

    #[test]
    fn exact_capacity_is_not_over() {
        let checks = check_capacity(&plan_with("v1", 5), &[fleet_vehicle("v1", 5, 10)]);
        assert!(!checks[0].is_over_capacity);
    }

    #[test]
    fn unknown_vehicle_has_no_verdict() {
        let checks = check_capacity(&plan_with("ghost", 4), &[fleet_vehicle("v1", 0, 10)]);
        assert_eq!(checks[0].capacity, None);
        assert!(!checks[0].is_over_capacity);
    }

    #[test]
    fn planner_output_passes_the_checker() {
        use crate::model::PendingDelivery;
        use crate::service::route_planner::plan_routes;

        let pending: Vec<PendingDelivery> = (0..12)
            .map(|i| PendingDelivery {
                order_id: format!("o{i}"),
                store_id: format!("s{}", i % 3),
                order_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                order_time: None,
                vehicle_id: None,
            })
            .collect();
        let fleet = [
            fleet_vehicle("v1", 1, 6),
            fleet_vehicle("v2", 0, 4),
            fleet_vehicle("v3", 2, 8),
        ];

        let plan = plan_routes(&pending, &fleet, 10);
        let checks = check_capacity(&plan, &fleet);
        assert!(checks.iter().all(|c| !c.is_over_capacity));
    }
}
