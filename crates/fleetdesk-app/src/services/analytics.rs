//! Analytics reports and CSV export

use std::path::Path;

use fleetdesk_domain::model::Delivery;
use fleetdesk_domain::repository::{
    DailyCount, PerformanceStats, ReportingRepository, VehicleStats,
};
use fleetdesk_types::{Error, Result};

use crate::DynReportingRepo;

/// Read service behind the Analytics panel
pub struct AnalyticsService {
    reporting: DynReportingRepo,
}

impl AnalyticsService {
    pub fn new(reporting: DynReportingRepo) -> Self {
        Self { reporting }
    }

    pub fn performance(&self) -> Result<PerformanceStats> {
        self.reporting.performance_stats()
    }

    pub fn vehicle_stats(&self) -> Result<Vec<VehicleStats>> {
        self.reporting.vehicle_stats()
    }

    /// Delivered-per-day counts over the trailing window
    pub fn daily_volume(&self, days: i64) -> Result<Vec<DailyCount>> {
        self.reporting.daily_delivered(days)
    }

    pub fn report_rows(&self, limit: i64) -> Result<Vec<Delivery>> {
        self.reporting.report_rows(limit)
    }

    /// Write report rows to a CSV file; returns the row count
    pub fn export_csv(&self, path: &Path, rows: &[Delivery]) -> Result<usize> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| Error::Export(format!("{}: {e}", path.display())))?;

        writer
            .write_record([
                "order_id",
                "store_id",
                "vehicle_id",
                "driver",
                "order_date",
                "order_time",
                "pickup_time",
                "delivery_minutes",
                "status",
            ])
            .map_err(|e| Error::Export(e.to_string()))?;

        for row in rows {
            writer
                .write_record([
                    row.order_id.as_str(),
                    row.store_id.as_str(),
                    row.vehicle_id.as_deref().unwrap_or(""),
                    row.driver.as_deref().unwrap_or(""),
                    &row.order_date.to_string(),
                    &row.order_time.map(|t| t.to_string()).unwrap_or_default(),
                    &row.pickup_time.map(|t| t.to_string()).unwrap_or_default(),
                    &row.delivery_minutes
                        .map(|m| format!("{m:.1}"))
                        .unwrap_or_default(),
                    row.status.as_str(),
                ])
                .map_err(|e| Error::Export(e.to_string()))?;
        }

        writer.flush()?;
        tracing::info!(rows = rows.len(), path = %path.display(), "exported report");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::services::test_support::{completed_delivery, FakeRepo};

    #[test]
    fn export_writes_header_and_rows() {
        let repo = Arc::new(FakeRepo::default());
        let service = AnalyticsService::new(repo);
        let rows = vec![completed_delivery("A-1"), completed_delivery("A-2")];

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let written = service.export_csv(&path, &rows).unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("order_id,store_id"));
        assert!(lines[1].starts_with("A-1,s1,v1"));
        assert!(lines[1].contains("Delivered"));
    }

    #[test]
    fn export_to_bad_path_is_an_export_error() {
        let repo = Arc::new(FakeRepo::default());
        let service = AnalyticsService::new(repo);
        let result = service.export_csv(Path::new("/nonexistent-dir/report.csv"), &[]);
        assert!(matches!(result, Err(Error::Export(_))));
    }
}
