//! Overview dashboard data

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use fleetdesk_domain::repository::{DeliveryRepository, OverviewCounts, ReportingRepository};
use fleetdesk_types::Result;

use crate::{DynDeliveryRepo, DynReportingRepo};

/// A recent-completion notification line
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Notification {
    pub order_id: String,
    pub order_date: NaiveDate,
    pub message: String,
}

/// Read service behind the Overview panel
pub struct DashboardService {
    reporting: DynReportingRepo,
    deliveries: DynDeliveryRepo,
}

impl DashboardService {
    pub fn new(reporting: DynReportingRepo, deliveries: DynDeliveryRepo) -> Self {
        Self {
            reporting,
            deliveries,
        }
    }

    /// Headline metric cards
    pub fn metrics(&self) -> Result<OverviewCounts> {
        self.reporting.overview_counts()
    }

    /// Latest completed deliveries as notification lines
    pub fn notifications(&self, limit: i64) -> Result<Vec<Notification>> {
        let completed = self.deliveries.recent_completed(limit)?;
        Ok(completed
            .into_iter()
            .map(|d| Notification {
                message: format!("Delivery completed for order {}", d.order_id),
                order_id: d.order_id,
                order_date: d.order_date,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::services::test_support::{completed_delivery, FakeRepo};

    #[test]
    fn metrics_pass_through() {
        let repos = Arc::new(FakeRepo {
            overview: OverviewCounts {
                active: 7,
                delivered_today: 3,
                pending: 12,
                vehicles_in_transit: 4,
            },
            ..Default::default()
        });
        let service = DashboardService::new(repos.clone(), repos);
        let metrics = service.metrics().unwrap();
        assert_eq!(metrics.active, 7);
        assert_eq!(metrics.pending, 12);
    }

    #[test]
    fn notifications_carry_the_order_id() {
        let repos = Arc::new(FakeRepo {
            completed: vec![completed_delivery("A-100"), completed_delivery("A-101")],
            ..Default::default()
        });
        let service = DashboardService::new(repos.clone(), repos);

        let notes = service.notifications(5).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].message, "Delivery completed for order A-100");
    }

    #[test]
    fn notifications_respect_the_limit() {
        let repos = Arc::new(FakeRepo {
            completed: (0..10)
                .map(|i| completed_delivery(&format!("A-{i}")))
                .collect(),
            ..Default::default()
        });
        let service = DashboardService::new(repos.clone(), repos);
        assert_eq!(service.notifications(4).unwrap().len(), 4);
    }
}
