//! Active routes: live table of in-flight deliveries with a details pane

use eframe::egui::{self, RichText, ScrollArea};
use egui_extras::{Column, TableBuilder};

use fleetdesk_domain::model::{ActiveRoute, DeliveryStatus, Punctuality};
use fleetdesk_domain::repository::DeliveryRepository;

use crate::app::Services;
use crate::theme;

#[derive(Clone, Copy, PartialEq, Eq, Default)]
enum RouteFilter {
    #[default]
    All,
    OnTime,
    Delayed,
}

impl RouteFilter {
    fn label(&self) -> &'static str {
        match self {
            RouteFilter::All => "All",
            RouteFilter::OnTime => "On time",
            RouteFilter::Delayed => "Delayed",
        }
    }

    fn matches(&self, route: &ActiveRoute) -> bool {
        match self {
            RouteFilter::All => true,
            RouteFilter::OnTime => route.punctuality() == Punctuality::OnTime,
            RouteFilter::Delayed => route.punctuality() != Punctuality::OnTime,
        }
    }
}

pub struct ActiveRoutesPanel {
    loaded: bool,
    routes: Vec<ActiveRoute>,
    selected: Option<String>,
    filter: RouteFilter,
    issue_text: String,
    error: Option<String>,
    status: Option<String>,
}

impl ActiveRoutesPanel {
    pub fn new() -> Self {
        Self {
            loaded: false,
            routes: Vec::new(),
            selected: None,
            filter: RouteFilter::default(),
            issue_text: String::new(),
            error: None,
            status: None,
        }
    }

    fn refresh(&mut self, services: &Services) {
        self.error = None;
        match services.deliveries.find_active() {
            Ok(routes) => {
                if let Some(selected) = &self.selected {
                    if !routes.iter().any(|r| &r.order_id == selected) {
                        self.selected = None;
                    }
                }
                self.routes = routes;
            }
            Err(e) => self.error = Some(format!("Failed to load routes: {e}")),
        }
        self.loaded = true;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        if !self.loaded {
            self.refresh(services);
        }

        ui.horizontal(|ui| {
            ui.heading("Active Routes");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh(services);
                    self.status = None;
                }
            });
        });
        ui.separator();

        let total = self.routes.len();
        let on_time = self
            .routes
            .iter()
            .filter(|r| r.punctuality() == Punctuality::OnTime)
            .count();

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            theme::metric_card(ui, "Active routes", &total.to_string(), theme::INFO);
            theme::metric_card(ui, "On time", &on_time.to_string(), theme::SUCCESS);
            theme::metric_card(ui, "Delayed", &(total - on_time).to_string(), theme::WARNING);
        });

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Filter:");
            for filter in [RouteFilter::All, RouteFilter::OnTime, RouteFilter::Delayed] {
                if ui
                    .selectable_label(self.filter == filter, filter.label())
                    .clicked()
                {
                    self.filter = filter;
                }
            }
        });
        ui.add_space(4.0);

        let filtered: Vec<ActiveRoute> = self
            .routes
            .iter()
            .filter(|r| self.filter.matches(r))
            .cloned()
            .collect();

        egui::SidePanel::right("route_details")
            .resizable(true)
            .default_width(280.0)
            .show_inside(ui, |ui| {
                self.details_ui(ui, services);
            });

        if filtered.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new("No active routes").color(theme::MUTED));
            });
        } else {
            self.table_ui(ui, &filtered);
        }

        theme::error_line(ui, &self.error);
        theme::status_line(ui, &self.status);
    }

    fn table_ui(&mut self, ui: &mut egui::Ui, routes: &[ActiveRoute]) {
        TableBuilder::new(ui)
            .striped(true)
            .sense(egui::Sense::click())
            .column(Column::auto().at_least(110.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(120.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in ["Order", "Vehicle", "Vehicle type", "Date", "Status"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                for route in routes {
                    let selected = self.selected.as_deref() == Some(route.order_id.as_str());
                    body.row(22.0, |mut row| {
                        row.set_selected(selected);
                        row.col(|ui| {
                            ui.label(&route.order_id);
                        });
                        row.col(|ui| {
                            ui.label(route.vehicle_id.as_deref().unwrap_or("N/A"));
                        });
                        row.col(|ui| {
                            let label = match (&route.vehicle_model, route.vehicle_year) {
                                (Some(model), Some(year)) => format!("{model} ({year})"),
                                (Some(model), None) => model.clone(),
                                _ => "-".to_string(),
                            };
                            ui.label(label);
                        });
                        row.col(|ui| {
                            ui.label(route.order_date.to_string());
                        });
                        row.col(|ui| {
                            let punctuality = route.punctuality();
                            ui.colored_label(
                                theme::punctuality_color(punctuality),
                                punctuality.label(),
                            );
                        });
                        if row.response().clicked() {
                            self.selected = Some(route.order_id.clone());
                            self.status = None;
                        }
                    });
                }
            });
    }

    fn details_ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        ui.strong("Route details");
        ui.separator();

        let Some(order_id) = self.selected.clone() else {
            ui.label(RichText::new("Select a route to see details").color(theme::MUTED));
            return;
        };
        let Some(route) = self.routes.iter().find(|r| r.order_id == order_id).cloned() else {
            return;
        };

        ScrollArea::vertical().show(ui, |ui| {
            ui.label(format!("Order: {}", route.order_id));
            ui.label(format!("Store: {}", route.store_id));
            ui.label(format!(
                "Vehicle: {}",
                route.vehicle_id.as_deref().unwrap_or("unassigned")
            ));
            ui.label(format!("Ordered: {}", route.order_date));
            ui.label(format!(
                "Pickup: {}",
                route
                    .pickup_time
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "not yet".to_string())
            ));

            ui.add_space(8.0);
            if ui.button("Mark complete").clicked() {
                match services
                    .deliveries
                    .update_status(&route.order_id, DeliveryStatus::Delivered)
                {
                    Ok(_) => {
                        self.status = Some(format!("Order {} marked delivered", route.order_id));
                        self.refresh(services);
                    }
                    Err(e) => self.error = Some(format!("Update failed: {e}")),
                }
            }

            ui.add_space(12.0);
            ui.label("Report an issue:");
            ui.text_edit_multiline(&mut self.issue_text);
            if ui.button("Submit issue").clicked() {
                if self.issue_text.trim().is_empty() {
                    self.error = Some("Describe the issue before submitting".to_string());
                } else {
                    tracing::warn!(
                        order = %route.order_id,
                        issue = %self.issue_text.trim(),
                        "route issue reported"
                    );
                    self.status = Some(format!("Issue reported for order {}", route.order_id));
                    self.issue_text.clear();
                }
            }
        });
    }
}
