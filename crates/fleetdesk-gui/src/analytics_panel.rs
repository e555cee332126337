//! Analytics panel: performance metrics, daily volume, report table with
//! CSV export, and delivery-time predictions

use eframe::egui::{self, RichText, ScrollArea};
use egui_extras::{Column, TableBuilder};

use fleetdesk_app::{FittedPredictor, PredictedDelivery};
use fleetdesk_domain::model::Delivery;
use fleetdesk_domain::repository::{DailyCount, PerformanceStats, VehicleStats};

use crate::app::Services;
use crate::theme;

const REPORT_LIMIT: i64 = 200;
const TIMELINE_DAYS: i64 = 14;
const TRAINING_HISTORY: i64 = 500;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum SortKey {
    #[default]
    Date,
    Store,
    Vehicle,
    Minutes,
}

pub struct AnalyticsPanel {
    loaded: bool,
    performance: PerformanceStats,
    vehicles: Vec<VehicleStats>,
    daily: Vec<DailyCount>,
    rows: Vec<Delivery>,
    sort: SortKey,
    sort_descending: bool,
    predictor: Option<FittedPredictor>,
    predictions: Vec<PredictedDelivery>,
    error: Option<String>,
    status: Option<String>,
}

impl AnalyticsPanel {
    pub fn new() -> Self {
        Self {
            loaded: false,
            performance: PerformanceStats::default(),
            vehicles: Vec::new(),
            daily: Vec::new(),
            rows: Vec::new(),
            sort: SortKey::default(),
            sort_descending: true,
            predictor: None,
            predictions: Vec::new(),
            error: None,
            status: None,
        }
    }

    fn refresh(&mut self, services: &Services) {
        self.error = None;
        match services.analytics.performance() {
            Ok(performance) => self.performance = performance,
            Err(e) => self.error = Some(format!("Failed to load performance: {e}")),
        }
        match services.analytics.vehicle_stats() {
            Ok(vehicles) => self.vehicles = vehicles,
            Err(e) => self.error = Some(format!("Failed to load vehicle stats: {e}")),
        }
        match services.analytics.daily_volume(TIMELINE_DAYS) {
            Ok(daily) => self.daily = daily,
            Err(e) => self.error = Some(format!("Failed to load timeline: {e}")),
        }
        match services.analytics.report_rows(REPORT_LIMIT) {
            Ok(rows) => self.rows = rows,
            Err(e) => self.error = Some(format!("Failed to load report: {e}")),
        }
        self.apply_sort();
        self.loaded = true;
    }

    fn apply_sort(&mut self) {
        let descending = self.sort_descending;
        match self.sort {
            SortKey::Date => self
                .rows
                .sort_by(|a, b| (a.order_date, a.order_time).cmp(&(b.order_date, b.order_time))),
            SortKey::Store => self.rows.sort_by(|a, b| a.store_id.cmp(&b.store_id)),
            SortKey::Vehicle => self.rows.sort_by(|a, b| a.vehicle_id.cmp(&b.vehicle_id)),
            SortKey::Minutes => self.rows.sort_by(|a, b| {
                a.delivery_minutes
                    .unwrap_or(f64::NAN)
                    .total_cmp(&b.delivery_minutes.unwrap_or(f64::NAN))
            }),
        }
        if descending {
            self.rows.reverse();
        }
    }

    fn toggle_sort(&mut self, key: SortKey) {
        if self.sort == key {
            self.sort_descending = !self.sort_descending;
        } else {
            self.sort = key;
            self.sort_descending = true;
        }
        self.apply_sort();
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        if !self.loaded {
            self.refresh(services);
        }

        ui.horizontal(|ui| {
            ui.heading("Analytics");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh(services);
                    self.status = None;
                }
                if ui.button("Export CSV").clicked() {
                    self.export_csv(services);
                }
            });
        });
        ui.separator();

        self.metrics_ui(ui);
        ui.add_space(12.0);
        self.timeline_ui(ui);
        ui.add_space(12.0);
        self.prediction_ui(ui, services);
        ui.add_space(12.0);

        ui.label(RichText::new("Delivery report").strong());
        ui.add_space(4.0);
        self.report_table_ui(ui);

        theme::error_line(ui, &self.error);
        theme::status_line(ui, &self.status);
    }

    fn metrics_ui(&mut self, ui: &mut egui::Ui) {
        let fmt_minutes = |m: Option<f64>| {
            m.map(|m| format!("{m:.0} min"))
                .unwrap_or_else(|| "—".to_string())
        };

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            theme::metric_card(
                ui,
                "Avg delivery",
                &fmt_minutes(self.performance.avg_delivery_minutes),
                theme::PRIMARY,
            );
            theme::metric_card(
                ui,
                "Fastest",
                &fmt_minutes(self.performance.fastest_minutes),
                theme::SUCCESS,
            );
            theme::metric_card(
                ui,
                "Slowest",
                &fmt_minutes(self.performance.slowest_minutes),
                theme::WARNING,
            );
            theme::metric_card(
                ui,
                "Completion",
                &self
                    .performance
                    .completion_rate()
                    .map(|r| format!("{r:.0}%"))
                    .unwrap_or_else(|| "—".to_string()),
                theme::INFO,
            );
            theme::metric_card(
                ui,
                "Fleet tracked",
                &self.vehicles.len().to_string(),
                theme::MUTED,
            );
        });
    }

    /// Delivered-per-day bar strip over the trailing window
    fn timeline_ui(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new(format!("Deliveries, last {TIMELINE_DAYS} days")).strong());
        if self.daily.is_empty() {
            ui.label(RichText::new("No completed deliveries in the window").color(theme::MUTED));
            return;
        }

        let max = self.daily.iter().map(|d| d.count).max().unwrap_or(1).max(1);
        let bar_width = 28.0;
        let max_height = 64.0;

        ui.horizontal(|ui| {
            for day in &self.daily {
                let height = (day.count as f32 / max as f32) * max_height;
                ui.vertical(|ui| {
                    ui.add_space(max_height - height);
                    let (rect, response) = ui.allocate_exact_size(
                        egui::vec2(bar_width, height.max(2.0)),
                        egui::Sense::hover(),
                    );
                    ui.painter().rect_filled(rect, 2.0, theme::PRIMARY);
                    response.on_hover_text(format!("{}: {}", day.day, day.count));
                    ui.label(RichText::new(day.day.format("%d").to_string()).small());
                });
            }
        });
    }

    fn prediction_ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        ui.label(RichText::new("Delivery-time prediction").strong());
        ui.horizontal(|ui| {
            if ui.button("Train model").clicked() {
                match services.prediction.train(TRAINING_HISTORY) {
                    Ok(predictor) => {
                        match services.prediction.predict_pending(&predictor) {
                            Ok(predictions) => self.predictions = predictions,
                            Err(e) => self.error = Some(format!("Prediction failed: {e}")),
                        }
                        self.predictor = Some(predictor);
                        self.status = None;
                    }
                    Err(e) => self.error = Some(format!("Training failed: {e}")),
                }
            }
            if let Some(predictor) = &self.predictor {
                ui.label(format!(
                    "{} samples, MAE {:.1} min",
                    predictor.sample_count(),
                    predictor.mae
                ));
            } else {
                ui.label(RichText::new("Model not trained yet").color(theme::MUTED));
            }
        });

        if !self.predictions.is_empty() {
            ScrollArea::vertical().max_height(120.0).show(ui, |ui| {
                for prediction in &self.predictions {
                    let minutes = prediction.predicted_minutes.round() as i64;
                    ui.label(format!(
                        "{} (store {}): ~{}h {:02}min",
                        prediction.order_id,
                        prediction.store_id,
                        minutes / 60,
                        minutes % 60
                    ));
                }
            });
        }
    }

    fn report_table_ui(&mut self, ui: &mut egui::Ui) {
        let mut clicked_sort = None;

        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto().at_least(110.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(95.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Order");
                });
                header.col(|ui| {
                    if ui.button("Store").clicked() {
                        clicked_sort = Some(SortKey::Store);
                    }
                });
                header.col(|ui| {
                    if ui.button("Vehicle").clicked() {
                        clicked_sort = Some(SortKey::Vehicle);
                    }
                });
                header.col(|ui| {
                    if ui.button("Date").clicked() {
                        clicked_sort = Some(SortKey::Date);
                    }
                });
                header.col(|ui| {
                    if ui.button("Minutes").clicked() {
                        clicked_sort = Some(SortKey::Minutes);
                    }
                });
                header.col(|ui| {
                    ui.strong("Status");
                });
            })
            .body(|body| {
                body.rows(20.0, self.rows.len(), |mut row| {
                    let delivery = &self.rows[row.index()];
                    row.col(|ui| {
                        ui.label(&delivery.order_id);
                    });
                    row.col(|ui| {
                        ui.label(&delivery.store_id);
                    });
                    row.col(|ui| {
                        ui.label(delivery.vehicle_id.as_deref().unwrap_or("-"));
                    });
                    row.col(|ui| {
                        ui.label(delivery.order_date.to_string());
                    });
                    row.col(|ui| {
                        ui.label(
                            delivery
                                .delivery_minutes
                                .map(|m| format!("{m:.0}"))
                                .unwrap_or_else(|| "-".to_string()),
                        );
                    });
                    row.col(|ui| {
                        ui.colored_label(
                            theme::status_color(delivery.status),
                            delivery.status.as_str(),
                        );
                    });
                });
            });

        if let Some(key) = clicked_sort {
            self.toggle_sort(key);
        }
    }

    fn export_csv(&mut self, services: &Services) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("delivery_report.csv")
            .save_file()
        else {
            return;
        };

        match services.analytics.export_csv(&path, &self.rows) {
            Ok(count) => {
                self.status = Some(format!("Exported {count} rows to {}", path.display()));
            }
            Err(e) => self.error = Some(format!("Export failed: {e}")),
        }
    }
}
