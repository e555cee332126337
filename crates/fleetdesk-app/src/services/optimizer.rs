//! Fleet route optimization
//!
//! Orchestrates the domain route planner over the repositories: fetch the
//! pending work and the available fleet, plan, optionally persist the
//! assignments, and summarize. Also provides the single-route suggestion
//! heuristics used by the New Routes form.

use serde::{Deserialize, Serialize};

use fleetdesk_domain::repository::{
    DeliveryRepository, ReportingRepository, VehicleAverage, VehicleRepository,
};
use fleetdesk_domain::service::{check_capacity, plan_routes, RoutePlan};
use fleetdesk_types::Result;

use crate::{DynDeliveryRepo, DynReportingRepo, DynVehicleRepo};

/// Per-vehicle ceiling for one optimization run
pub const DEFAULT_MAX_PER_VEHICLE: i64 = 10;

/// Current optimization potential, before running anything
#[derive(Clone, Debug, Serialize)]
pub struct OptimizationSummary {
    pub pending_deliveries: usize,
    pub unique_stores: usize,
    pub vehicles_available: usize,
    pub potential: &'static str,
}

/// What a fleet optimization run did
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptimizationOutcome {
    pub plan: RoutePlan,
    /// Rows actually updated (zero on a dry run)
    pub updated: u64,
    pub applied: bool,
    pub message: String,
}

impl OptimizationOutcome {
    fn empty(message: impl Into<String>) -> Self {
        Self {
            plan: RoutePlan::default(),
            updated: 0,
            applied: false,
            message: message.into(),
        }
    }
}

/// Suggestion for the New Routes form
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RouteSuggestion {
    /// Historically best vehicle for the selected stores, if any has enough
    /// history
    pub vehicle: Option<VehicleAverage>,
    pub prep_minutes: i64,
    pub delivery_minutes: i64,
}

impl RouteSuggestion {
    pub fn total_minutes(&self) -> i64 {
        self.prep_minutes + self.delivery_minutes
    }
}

/// Route optimization use cases
pub struct OptimizerService {
    deliveries: DynDeliveryRepo,
    vehicles: DynVehicleRepo,
    reporting: DynReportingRepo,
}

impl OptimizerService {
    pub fn new(
        deliveries: DynDeliveryRepo,
        vehicles: DynVehicleRepo,
        reporting: DynReportingRepo,
    ) -> Self {
        Self {
            deliveries,
            vehicles,
            reporting,
        }
    }

    /// Counts feeding the "optimize fleet?" confirmation
    pub fn summary(&self) -> Result<OptimizationSummary> {
        let pending = self.deliveries.find_pending_today()?;
        let vehicles = self.vehicles.find_available()?;

        let mut stores: Vec<&str> = pending.iter().map(|d| d.store_id.as_str()).collect();
        stores.sort_unstable();
        stores.dedup();

        let potential = match pending.len() {
            0 => "None",
            n if n > 20 => "High",
            n if n > 10 => "Medium",
            _ => "Low",
        };

        Ok(OptimizationSummary {
            pending_deliveries: pending.len(),
            unique_stores: stores.len(),
            vehicles_available: vehicles.len(),
            potential,
        })
    }

    /// Plan routes for every pending delivery and, when `apply` is set,
    /// persist the vehicle assignments.
    ///
    /// A failed row update is logged and skipped; the rest of the plan still
    /// goes through.
    pub fn optimize_fleet(&self, max_per_vehicle: i64, apply: bool) -> Result<OptimizationOutcome> {
        let pending = self.deliveries.find_pending_today()?;
        if pending.is_empty() {
            return Ok(OptimizationOutcome::empty("No pending deliveries to optimize"));
        }

        let fleet = self.vehicles.find_available()?;
        if fleet.is_empty() {
            return Ok(OptimizationOutcome::empty(
                "No available vehicles for route optimization",
            ));
        }

        let plan = plan_routes(&pending, &fleet, max_per_vehicle);
        for check in check_capacity(&plan, &fleet) {
            if check.is_over_capacity {
                tracing::warn!(
                    vehicle = %check.vehicle_id,
                    excess = check.excess.unwrap_or_default(),
                    "planned load exceeds capacity"
                );
            }
        }

        let mut updated = 0u64;
        if apply {
            for assignment in &plan.assignments {
                for order_id in &assignment.order_ids {
                    match self.deliveries.assign_vehicle(order_id, &assignment.vehicle_id) {
                        Ok(n) => updated += n,
                        Err(e) => {
                            tracing::error!(order = %order_id, error = %e, "failed to update delivery");
                        }
                    }
                }
            }
            tracing::info!(updated, "persisted optimized routes");
        }

        let message = format!(
            "Optimized {} deliveries across {} vehicles (est. {:.0} min saved)",
            plan.total_assigned(),
            plan.vehicles_used(),
            plan.estimated_minutes_saved()
        );

        Ok(OptimizationOutcome {
            plan,
            updated,
            applied: apply,
            message,
        })
    }

    /// Historical suggestion for a hand-picked set of stores
    pub fn suggest_for_stores(&self, store_ids: &[String]) -> Result<RouteSuggestion> {
        let vehicle = self.reporting.best_vehicle_for_stores(store_ids)?;

        // Defaults mirror the historical medians when a store has no usable
        // history: 30 min prep, 45 min delivery.
        let prep_minutes = self
            .reporting
            .store_prep_average(store_ids)?
            .map(|avg| (avg.round() as i64).clamp(5, 120))
            .unwrap_or(30);
        let delivery_minutes = self
            .reporting
            .store_delivery_average(store_ids)?
            .map(|avg| avg.round() as i64)
            .unwrap_or(45);

        Ok(RouteSuggestion {
            vehicle,
            prep_minutes,
            delivery_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::services::test_support::{pending_delivery, vehicle_load, FakeRepo};

    fn service(repo: Arc<FakeRepo>) -> OptimizerService {
        OptimizerService::new(repo.clone(), repo.clone(), repo)
    }

    #[test]
    fn summary_counts_distinct_stores() {
        let repo = Arc::new(FakeRepo {
            pending: vec![
                pending_delivery("o1", "s1"),
                pending_delivery("o2", "s1"),
                pending_delivery("o3", "s2"),
            ],
            available: vec![vehicle_load("v1", 0, 10)],
            ..Default::default()
        });

        let summary = service(repo).summary().unwrap();
        assert_eq!(summary.pending_deliveries, 3);
        assert_eq!(summary.unique_stores, 2);
        assert_eq!(summary.vehicles_available, 1);
        assert_eq!(summary.potential, "Low");
    }

    #[test]
    fn summary_grades_potential_by_backlog() {
        let repo = Arc::new(FakeRepo {
            pending: (0..25)
                .map(|i| pending_delivery(&format!("o{i}"), "s1"))
                .collect(),
            ..Default::default()
        });
        assert_eq!(service(repo).summary().unwrap().potential, "High");
    }

    #[test]
    fn dry_run_plans_but_does_not_write() {
        let repo = Arc::new(FakeRepo {
            pending: vec![pending_delivery("o1", "s1"), pending_delivery("o2", "s2")],
            available: vec![vehicle_load("v1", 0, 10)],
            ..Default::default()
        });

        let outcome = service(repo.clone()).optimize_fleet(10, false).unwrap();
        assert_eq!(outcome.plan.total_assigned(), 2);
        assert_eq!(outcome.updated, 0);
        assert!(!outcome.applied);
        assert!(repo.assigned.lock().unwrap().is_empty());
    }

    #[test]
    fn apply_persists_each_assignment() {
        let repo = Arc::new(FakeRepo {
            pending: vec![
                pending_delivery("o1", "s1"),
                pending_delivery("o2", "s1"),
                pending_delivery("o3", "s2"),
            ],
            available: vec![vehicle_load("v1", 0, 10), vehicle_load("v2", 0, 10)],
            ..Default::default()
        });

        let outcome = service(repo.clone()).optimize_fleet(10, true).unwrap();
        assert_eq!(outcome.updated, 3);
        assert!(outcome.applied);

        let assigned = repo.assigned.lock().unwrap();
        assert_eq!(assigned.len(), 3);
        // Cluster integrity: both s1 orders go to the same vehicle.
        let v_for = |order: &str| {
            assigned
                .iter()
                .find(|(o, _)| o == order)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(v_for("o1"), v_for("o2"));
    }

    #[test]
    fn failed_rows_are_skipped_not_fatal() {
        let repo = Arc::new(FakeRepo {
            pending: vec![pending_delivery("o1", "s1"), pending_delivery("o2", "s1")],
            available: vec![vehicle_load("v1", 0, 10)],
            failing_orders: vec!["o1".to_string()],
            ..Default::default()
        });

        let outcome = service(repo.clone()).optimize_fleet(10, true).unwrap();
        assert_eq!(outcome.updated, 1);
        assert_eq!(repo.assigned.lock().unwrap().len(), 1);
    }

    #[test]
    fn empty_backlog_short_circuits() {
        let repo = Arc::new(FakeRepo::default());
        let outcome = service(repo).optimize_fleet(10, true).unwrap();
        assert_eq!(outcome.plan.total_assigned(), 0);
        assert!(outcome.message.contains("No pending deliveries"));
    }

    #[test]
    fn no_fleet_short_circuits() {
        let repo = Arc::new(FakeRepo {
            pending: vec![pending_delivery("o1", "s1")],
            ..Default::default()
        });
        let outcome = service(repo).optimize_fleet(10, true).unwrap();
        assert!(outcome.message.contains("No available vehicles"));
    }

    #[test]
    fn suggestion_clamps_prep_and_defaults() {
        let repo = Arc::new(FakeRepo {
            prep_avg: Some(300.0),
            delivery_avg: None,
            ..Default::default()
        });
        let suggestion = service(repo)
            .suggest_for_stores(&["s1".to_string()])
            .unwrap();
        assert_eq!(suggestion.prep_minutes, 120);
        assert_eq!(suggestion.delivery_minutes, 45);
        assert_eq!(suggestion.total_minutes(), 165);
    }
}
