//! Greedy route planning
//!
//! Clusters pending deliveries by store and packs the clusters onto the
//! available fleet:
//! 1. clusters are handled largest first, so big groups get first pick;
//! 2. each cluster goes whole onto the least-loaded vehicle that can take
//!    all of it (cluster integrity);
//! 3. a cluster too large for any single vehicle is split across the
//!    vehicles with the most remaining headroom;
//! 4. deliveries left over once the fleet is full are reported unassigned.
//!
//! Ties between equally loaded vehicles go to the earlier entry in the
//! input slice; the availability query returns vehicles least-loaded first,
//! which makes plans deterministic for a given snapshot.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{PendingDelivery, VehicleLoad};

/// Clustering deliveries cuts repeat travel; the estimate mirrors an
/// average saving of 15 minutes per assigned delivery.
pub const MINUTES_SAVED_PER_DELIVERY: f64 = 15.0;

/// One vehicle taking one store's deliveries (or a split share of them)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub vehicle_id: String,
    pub store_id: String,
    pub order_ids: Vec<String>,
}

impl RouteAssignment {
    pub fn delivery_count(&self) -> usize {
        self.order_ids.len()
    }
}

/// The planner's output
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoutePlan {
    pub assignments: Vec<RouteAssignment>,
    /// Orders that no vehicle had headroom for
    pub unassigned: Vec<String>,
}

impl RoutePlan {
    pub fn total_assigned(&self) -> usize {
        self.assignments.iter().map(RouteAssignment::delivery_count).sum()
    }

    pub fn vehicles_used(&self) -> usize {
        let mut ids: Vec<&str> =
            self.assignments.iter().map(|a| a.vehicle_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    pub fn estimated_minutes_saved(&self) -> f64 {
        self.total_assigned() as f64 * MINUTES_SAVED_PER_DELIVERY
    }

    /// Newly planned deliveries per vehicle
    pub fn load_per_vehicle(&self) -> BTreeMap<&str, i64> {
        let mut loads: BTreeMap<&str, i64> = BTreeMap::new();
        for assignment in &self.assignments {
            *loads.entry(assignment.vehicle_id.as_str()).or_default() +=
                assignment.delivery_count() as i64;
        }
        loads
    }
}

/// Plan routes for the pending deliveries over the available fleet.
///
/// `max_per_vehicle` caps each vehicle's total load for this run in
/// addition to the vehicle's own declared capacity. The returned plan never
/// pushes a vehicle past either limit.
pub fn plan_routes(
    pending: &[PendingDelivery],
    vehicles: &[VehicleLoad],
    max_per_vehicle: i64,
) -> RoutePlan {
    let mut plan = RoutePlan::default();
    if pending.is_empty() || vehicles.is_empty() {
        plan.unassigned = pending.iter().map(|d| d.order_id.clone()).collect();
        return plan;
    }

    // Group by store; BTreeMap keeps the store order stable across runs.
    let mut clusters: BTreeMap<&str, Vec<&PendingDelivery>> = BTreeMap::new();
    for delivery in pending {
        clusters.entry(delivery.store_id.as_str()).or_default().push(delivery);
    }

    let mut sorted_clusters: Vec<(&str, Vec<&PendingDelivery>)> = clusters.into_iter().collect();
    sorted_clusters.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.0.cmp(b.0)));

    let mut loads: BTreeMap<&str, i64> = vehicles
        .iter()
        .map(|v| (v.vehicle_id.as_str(), v.current_load))
        .collect();

    for (store_id, cluster) in sorted_clusters {
        let cluster_size = cluster.len() as i64;

        // Least-loaded vehicle that can take the whole cluster.
        let mut best: Option<(&VehicleLoad, i64)> = None;
        for vehicle in vehicles {
            let load = loads[vehicle.vehicle_id.as_str()];
            let cap = vehicle.capacity.min(max_per_vehicle);
            if load + cluster_size <= cap && best.map_or(true, |(_, l)| load < l) {
                best = Some((vehicle, load));
            }
        }

        match best {
            Some((vehicle, _)) => {
                *loads.get_mut(vehicle.vehicle_id.as_str()).unwrap() += cluster_size;
                plan.assignments.push(RouteAssignment {
                    vehicle_id: vehicle.vehicle_id.clone(),
                    store_id: store_id.to_string(),
                    order_ids: cluster.iter().map(|d| d.order_id.clone()).collect(),
                });
            }
            None => {
                split_cluster(store_id, &cluster, vehicles, max_per_vehicle, &mut loads, &mut plan);
            }
        }
    }

    plan
}

/// Spread an oversized cluster over whichever vehicles still have headroom
fn split_cluster<'a>(
    store_id: &str,
    cluster: &[&PendingDelivery],
    vehicles: &'a [VehicleLoad],
    max_per_vehicle: i64,
    loads: &mut BTreeMap<&'a str, i64>,
    plan: &mut RoutePlan,
) {
    let mut remaining: Vec<&PendingDelivery> = cluster.to_vec();

    while !remaining.is_empty() {
        // Vehicle with the most remaining headroom takes the next chunk.
        let mut best: Option<(&VehicleLoad, i64)> = None;
        for vehicle in vehicles {
            let load = loads[vehicle.vehicle_id.as_str()];
            let headroom = (vehicle.capacity.min(max_per_vehicle) - load).max(0);
            if headroom > 0 && best.map_or(true, |(_, h)| headroom > h) {
                best = Some((vehicle, headroom));
            }
        }

        let Some((vehicle, headroom)) = best else {
            plan.unassigned
                .extend(remaining.iter().map(|d| d.order_id.clone()));
            return;
        };

        let take = (headroom as usize).min(remaining.len());
        let chunk: Vec<&PendingDelivery> = remaining.drain(..take).collect();
        *loads.get_mut(vehicle.vehicle_id.as_str()).unwrap() += chunk.len() as i64;
        plan.assignments.push(RouteAssignment {
            vehicle_id: vehicle.vehicle_id.clone(),
            store_id: store_id.to_string(),
            order_ids: chunk.iter().map(|d| d.order_id.clone()).collect(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delivery(order: &str, store: &str) -> PendingDelivery {
        PendingDelivery {
            order_id: order.to_string(),
            store_id: store.to_string(),
            order_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            order_time: None,
            vehicle_id: None,
        }
    }

    fn vehicle(id: &str, load: i64, capacity: i64) -> VehicleLoad {
        VehicleLoad {
            vehicle_id: id.to_string(),
            current_load: load,
            capacity,
        }
    }

    #[test]
    fn empty_inputs_yield_empty_plan() {
        let plan = plan_routes(&[], &[vehicle("v1", 0, 10)], 10);
        assert!(plan.assignments.is_empty());
        assert!(plan.unassigned.is_empty());

        let pending = [delivery("o1", "s1")];
        let plan = plan_routes(&pending, &[], 10);
        assert!(plan.assignments.is_empty());
        assert_eq!(plan.unassigned, vec!["o1".to_string()]);
    }

    #[test]
    fn cluster_stays_on_one_vehicle_when_it_fits() {
        let pending = [
            delivery("o1", "s1"),
            delivery("o2", "s1"),
            delivery("o3", "s1"),
        ];
        let vehicles = [vehicle("v1", 0, 10), vehicle("v2", 0, 10)];
        let plan = plan_routes(&pending, &vehicles, 10);

        assert_eq!(plan.assignments.len(), 1);
        assert_eq!(plan.assignments[0].vehicle_id, "v1");
        assert_eq!(plan.assignments[0].delivery_count(), 3);
        assert!(plan.unassigned.is_empty());
    }

    #[test]
    fn least_loaded_vehicle_wins() {
        let pending = [delivery("o1", "s1"), delivery("o2", "s1")];
        let vehicles = [vehicle("v1", 5, 10), vehicle("v2", 1, 10)];
        let plan = plan_routes(&pending, &vehicles, 10);

        assert_eq!(plan.assignments[0].vehicle_id, "v2");
    }

    #[test]
    fn largest_cluster_is_packed_first() {
        let pending = [
            delivery("a1", "small"),
            delivery("b1", "big"),
            delivery("b2", "big"),
            delivery("b3", "big"),
        ];
        // Only v1 can hold the big cluster; handling "small" first would
        // strand part of "big".
        let vehicles = [vehicle("v1", 0, 3), vehicle("v2", 0, 1)];
        let plan = plan_routes(&pending, &vehicles, 10);

        let big = plan.assignments.iter().find(|a| a.store_id == "big").unwrap();
        assert_eq!(big.vehicle_id, "v1");
        assert_eq!(big.delivery_count(), 3);
        let small = plan.assignments.iter().find(|a| a.store_id == "small").unwrap();
        assert_eq!(small.vehicle_id, "v2");
        assert!(plan.unassigned.is_empty());
    }

    #[test]
    fn oversized_cluster_is_split_across_headroom() {
        let pending: Vec<PendingDelivery> = (0..7)
            .map(|i| delivery(&format!("o{i}"), "s1"))
            .collect();
        let vehicles = [vehicle("v1", 0, 4), vehicle("v2", 0, 4)];
        let plan = plan_routes(&pending, &vehicles, 10);

        assert_eq!(plan.total_assigned(), 7);
        assert!(plan.unassigned.is_empty());
        assert_eq!(plan.vehicles_used(), 2);
        for (_, load) in plan.load_per_vehicle() {
            assert!(load <= 4);
        }
    }

    #[test]
    fn leftover_deliveries_are_reported_unassigned() {
        let pending: Vec<PendingDelivery> = (0..5)
            .map(|i| delivery(&format!("o{i}"), "s1"))
            .collect();
        let vehicles = [vehicle("v1", 2, 4)];
        let plan = plan_routes(&pending, &vehicles, 10);

        assert_eq!(plan.total_assigned(), 2);
        assert_eq!(plan.unassigned.len(), 3);
    }

    #[test]
    fn run_ceiling_caps_below_vehicle_capacity() {
        let pending: Vec<PendingDelivery> = (0..6)
            .map(|i| delivery(&format!("o{i}"), "s1"))
            .collect();
        let vehicles = [vehicle("v1", 0, 20)];
        let plan = plan_routes(&pending, &vehicles, 4);

        assert_eq!(plan.total_assigned(), 4);
        assert_eq!(plan.unassigned.len(), 2);
    }

    #[test]
    fn plan_never_exceeds_capacity() {
        // A messier fixture: uneven clusters, partially loaded fleet.
        let mut pending = Vec::new();
        for (store, n) in [("s1", 9), ("s2", 4), ("s3", 6), ("s4", 1)] {
            for i in 0..n {
                pending.push(delivery(&format!("{store}-o{i}"), store));
            }
        }
        let vehicles = [
            vehicle("v1", 3, 8),
            vehicle("v2", 0, 5),
            vehicle("v3", 6, 10),
        ];
        let plan = plan_routes(&pending, &vehicles, 7);

        for vehicle in &vehicles {
            let planned = plan
                .load_per_vehicle()
                .get(vehicle.vehicle_id.as_str())
                .copied()
                .unwrap_or(0);
            let total = vehicle.current_load + planned;
            assert!(
                total <= vehicle.capacity.min(7),
                "{} over capacity: {total}",
                vehicle.vehicle_id
            );
        }
        assert_eq!(plan.total_assigned() + plan.unassigned.len(), pending.len());
    }

    #[test]
    fn savings_estimate_scales_with_assignments() {
        let pending = [delivery("o1", "s1"), delivery("o2", "s2")];
        let vehicles = [vehicle("v1", 0, 10)];
        let plan = plan_routes(&pending, &vehicles, 10);
        assert_eq!(plan.estimated_minutes_saved(), 30.0);
    }
}
