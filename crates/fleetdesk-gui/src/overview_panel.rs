//! Overview panel: headline metrics and recent-delivery notifications

use eframe::egui::{self, RichText, ScrollArea};

use fleetdesk_app::Notification;
use fleetdesk_domain::model::User;
use fleetdesk_domain::repository::OverviewCounts;

use crate::app::Services;
use crate::theme;

const NOTIFICATION_LIMIT: i64 = 50;

pub struct OverviewPanel {
    loaded: bool,
    metrics: OverviewCounts,
    notifications: Vec<Notification>,
    error: Option<String>,
}

impl OverviewPanel {
    pub fn new() -> Self {
        Self {
            loaded: false,
            metrics: OverviewCounts::default(),
            notifications: Vec::new(),
            error: None,
        }
    }

    fn refresh(&mut self, services: &Services) {
        self.error = None;
        match services.dashboard.metrics() {
            Ok(metrics) => self.metrics = metrics,
            Err(e) => self.error = Some(format!("Failed to load metrics: {e}")),
        }
        match services.dashboard.notifications(NOTIFICATION_LIMIT) {
            Ok(notifications) => self.notifications = notifications,
            Err(e) => self.error = Some(format!("Failed to load notifications: {e}")),
        }
        self.loaded = true;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, services: &Services, user: &User) {
        if !self.loaded {
            self.refresh(services);
        }

        ui.horizontal(|ui| {
            ui.heading(format!("Welcome back, {}", user.full_name));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh(services);
                }
            });
        });
        ui.separator();

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            theme::metric_card(
                ui,
                "Active deliveries",
                &self.metrics.active.to_string(),
                theme::INFO,
            );
            theme::metric_card(
                ui,
                "Delivered today",
                &self.metrics.delivered_today.to_string(),
                theme::SUCCESS,
            );
            theme::metric_card(
                ui,
                "Pending",
                &self.metrics.pending.to_string(),
                theme::WARNING,
            );
            theme::metric_card(
                ui,
                "Vehicles in transit",
                &self.metrics.vehicles_in_transit.to_string(),
                theme::PRIMARY,
            );
        });

        ui.add_space(16.0);
        ui.label(RichText::new("Recent notifications").strong());
        ui.add_space(4.0);

        if self.notifications.is_empty() {
            ui.label(RichText::new("No completed deliveries yet").color(theme::MUTED));
        } else {
            ScrollArea::vertical().show(ui, |ui| {
                for notification in &self.notifications {
                    ui.horizontal(|ui| {
                        ui.colored_label(theme::SUCCESS, "✔");
                        ui.label(&notification.message);
                        ui.label(
                            RichText::new(notification.order_date.to_string())
                                .small()
                                .color(theme::MUTED),
                        );
                    });
                }
            });
        }

        theme::error_line(ui, &self.error);
    }
}
