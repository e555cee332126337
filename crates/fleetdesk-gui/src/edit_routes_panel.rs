//! Edit routes: reassign, restatus, and delete delivery records
//!
//! Admin/manager only; the tab is hidden for drivers.

use eframe::egui::{self, RichText};
use egui_extras::{Column, TableBuilder};

use fleetdesk_domain::model::{Delivery, DeliveryStatus, Vehicle};
use fleetdesk_domain::repository::{DeliveryRepository, VehicleRepository};

use crate::app::Services;
use crate::theme;

const EDIT_LIMIT: i64 = 100;

pub struct EditRoutesPanel {
    loaded: bool,
    deliveries: Vec<Delivery>,
    vehicles: Vec<Vehicle>,
    selected: Option<String>,
    reassign_vehicle: Option<usize>,
    reassign_driver: String,
    new_status: DeliveryStatus,
    pickup_input: String,
    minutes_input: String,
    confirm_delete: bool,
    confirm_delete_route: bool,
    error: Option<String>,
    status: Option<String>,
}

impl EditRoutesPanel {
    pub fn new() -> Self {
        Self {
            loaded: false,
            deliveries: Vec::new(),
            vehicles: Vec::new(),
            selected: None,
            reassign_vehicle: None,
            reassign_driver: String::new(),
            new_status: DeliveryStatus::Ordered,
            pickup_input: String::new(),
            minutes_input: String::new(),
            confirm_delete: false,
            confirm_delete_route: false,
            error: None,
            status: None,
        }
    }

    fn refresh(&mut self, services: &Services) {
        self.error = None;
        match services.deliveries.find_recent(EDIT_LIMIT) {
            Ok(deliveries) => {
                if let Some(selected) = &self.selected {
                    if !deliveries.iter().any(|d| &d.order_id == selected) {
                        self.selected = None;
                    }
                }
                self.deliveries = deliveries;
            }
            Err(e) => self.error = Some(format!("Failed to load deliveries: {e}")),
        }
        match services.vehicles.find_all() {
            Ok(vehicles) => self.vehicles = vehicles,
            Err(e) => self.error = Some(format!("Failed to load vehicles: {e}")),
        }
        self.loaded = true;
    }

    fn selected_delivery(&self) -> Option<&Delivery> {
        let selected = self.selected.as_deref()?;
        self.deliveries.iter().find(|d| d.order_id == selected)
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        if !self.loaded {
            self.refresh(services);
        }

        ui.horizontal(|ui| {
            ui.heading("Edit Routes");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh(services);
                    self.status = None;
                }
            });
        });
        ui.separator();

        egui::SidePanel::right("edit_actions")
            .resizable(true)
            .default_width(300.0)
            .show_inside(ui, |ui| {
                self.actions_ui(ui, services);
            });

        if self.deliveries.is_empty() {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.label(RichText::new("No delivery records").color(theme::MUTED));
            });
        } else {
            self.table_ui(ui);
        }

        theme::error_line(ui, &self.error);
        theme::status_line(ui, &self.status);
    }

    fn table_ui(&mut self, ui: &mut egui::Ui) {
        TableBuilder::new(ui)
            .striped(true)
            .sense(egui::Sense::click())
            .column(Column::auto().at_least(110.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(80.0))
            .column(Column::auto().at_least(90.0))
            .column(Column::auto().at_least(95.0))
            .column(Column::remainder())
            .header(20.0, |mut header| {
                for title in ["Order", "Store", "Vehicle", "Driver", "Date", "Status"] {
                    header.col(|ui| {
                        ui.strong(title);
                    });
                }
            })
            .body(|mut body| {
                let mut clicked = None;
                for delivery in &self.deliveries {
                    let selected = self.selected.as_deref() == Some(delivery.order_id.as_str());
                    body.row(22.0, |mut row| {
                        row.set_selected(selected);
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
                            ui.label(delivery.driver.as_deref().unwrap_or("-"));
                        });
                        row.col(|ui| {
                            ui.label(delivery.order_date.to_string());
                        });
                        row.col(|ui| {
                            ui.colored_label(
                                theme::status_color(delivery.status),
                                delivery.status.as_str(),
                            );
                        });
                        if row.response().clicked() {
                            clicked = Some(delivery.order_id.clone());
                        }
                    });
                }
                if let Some(order_id) = clicked {
                    self.selected = Some(order_id);
                    self.confirm_delete = false;
                    self.confirm_delete_route = false;
                    self.status = None;
                }
            });
    }

    fn actions_ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        ui.strong("Actions");
        ui.separator();

        let Some(delivery) = self.selected_delivery().cloned() else {
            ui.label(RichText::new("Select a delivery to edit").color(theme::MUTED));
            return;
        };

        ui.label(format!("Order: {}", delivery.order_id));
        ui.label(format!("Current status: {}", delivery.status));
        ui.add_space(8.0);

        // Reassign vehicle
        let vehicle_text = self
            .reassign_vehicle
            .and_then(|i| self.vehicles.get(i))
            .map(Vehicle::label)
            .unwrap_or_else(|| "Select".to_string());
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("New vehicle")
                .selected_text(vehicle_text)
                .show_ui(ui, |ui| {
                    for (i, vehicle) in self.vehicles.iter().enumerate() {
                        ui.selectable_value(&mut self.reassign_vehicle, Some(i), vehicle.label());
                    }
                });
        });
        if ui.button("Reassign vehicle").clicked() {
            let picked = self
                .reassign_vehicle
                .and_then(|i| self.vehicles.get(i))
                .map(|v| v.vehicle_id.clone());
            match picked {
                Some(vehicle_id) => {
                    self.run_update(
                        services,
                        services
                            .deliveries
                            .assign_vehicle(&delivery.order_id, &vehicle_id),
                        format!("Vehicle set to {vehicle_id}"),
                    );
                }
                None => self.error = Some("Pick a vehicle first".to_string()),
            }
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("New driver:");
            ui.text_edit_singleline(&mut self.reassign_driver);
        });
        if ui.button("Reassign driver").clicked() {
            let driver = self.reassign_driver.trim().to_string();
            if driver.is_empty() {
                self.error = Some("Enter a driver name first".to_string());
            } else {
                self.run_update(
                    services,
                    services.deliveries.assign_driver(&delivery.order_id, &driver),
                    format!("Driver set to {driver}"),
                );
            }
        }

        ui.add_space(8.0);
        egui::ComboBox::from_label("New status")
            .selected_text(self.new_status.as_str())
            .show_ui(ui, |ui| {
                for status in DeliveryStatus::all() {
                    ui.selectable_value(&mut self.new_status, status, status.as_str());
                }
            });
        if ui.button("Update status").clicked() {
            let new_status = self.new_status;
            if delivery.status == new_status {
                self.error = Some("Delivery already has that status".to_string());
            } else if !delivery.status.can_transition_to(new_status) {
                self.error = Some(format!(
                    "Cannot move a delivery backwards ({} → {})",
                    delivery.status, new_status
                ));
            } else {
                self.run_update(
                    services,
                    services.deliveries.update_status(&delivery.order_id, new_status),
                    format!("Status set to {new_status}"),
                );
            }
        }

        ui.add_space(8.0);
        ui.horizontal(|ui| {
            ui.label("Pickup (HH:MM):");
            ui.text_edit_singleline(&mut self.pickup_input);
        });
        ui.horizontal(|ui| {
            ui.label("Delivery minutes:");
            ui.text_edit_singleline(&mut self.minutes_input);
        });
        if ui.button("Update times").clicked() {
            self.update_times(services, &delivery.order_id);
        }

        ui.add_space(16.0);
        if !self.confirm_delete {
            if ui.button(RichText::new("Delete delivery").color(theme::ERROR)).clicked() {
                self.confirm_delete = true;
            }
        } else {
            ui.colored_label(theme::ERROR, "Delete this delivery record?");
            ui.horizontal(|ui| {
                if ui.button("Yes, delete").clicked() {
                    self.run_update(
                        services,
                        services.deliveries.delete(&delivery.order_id),
                        format!("Deleted order {}", delivery.order_id),
                    );
                    self.selected = None;
                    self.confirm_delete = false;
                }
                if ui.button("Cancel").clicked() {
                    self.confirm_delete = false;
                }
            });
        }

        if let Some(vehicle_id) = delivery.vehicle_id.clone() {
            ui.add_space(8.0);
            if !self.confirm_delete_route {
                if ui
                    .button(RichText::new("Delete whole route").color(theme::ERROR))
                    .on_hover_text(format!(
                        "Every delivery for {vehicle_id} on {}",
                        delivery.order_date
                    ))
                    .clicked()
                {
                    self.confirm_delete_route = true;
                }
            } else {
                ui.colored_label(
                    theme::ERROR,
                    format!(
                        "Delete all deliveries for {vehicle_id} on {}?",
                        delivery.order_date
                    ),
                );
                ui.horizontal(|ui| {
                    if ui.button("Yes, delete route").clicked() {
                        self.run_update(
                            services,
                            services
                                .deliveries
                                .delete_route(&vehicle_id, delivery.order_date),
                            format!("Deleted route for {vehicle_id}"),
                        );
                        self.selected = None;
                        self.confirm_delete_route = false;
                    }
                    if ui.button("Cancel").clicked() {
                        self.confirm_delete_route = false;
                    }
                });
            }
        }
    }

    /// Parse the time inputs and push them to the record. Empty fields
    /// clear the corresponding column.
    fn update_times(&mut self, services: &Services, order_id: &str) {
        let pickup_input = self.pickup_input.trim().to_string();
        let pickup = if pickup_input.is_empty() {
            None
        } else {
            match chrono::NaiveTime::parse_from_str(&pickup_input, "%H:%M") {
                Ok(time) => Some(time),
                Err(_) => {
                    self.error = Some("Pickup time must be HH:MM".to_string());
                    return;
                }
            }
        };

        let minutes_input = self.minutes_input.trim().to_string();
        let minutes = if minutes_input.is_empty() {
            None
        } else {
            match minutes_input.parse::<f64>() {
                Ok(minutes) if minutes >= 0.0 => Some(minutes),
                _ => {
                    self.error = Some("Delivery minutes must be a non-negative number".to_string());
                    return;
                }
            }
        };

        self.run_update(
            services,
            services.deliveries.update_times(order_id, pickup, minutes),
            "Times updated".to_string(),
        );
    }

    fn run_update(
        &mut self,
        services: &Services,
        result: std::result::Result<u64, fleetdesk_types::Error>,
        success: String,
    ) {
        match result {
            Ok(affected) if affected > 0 => {
                self.status = Some(success);
                self.error = None;
                self.refresh(services);
            }
            Ok(_) => {
                self.error = Some("No rows were updated".to_string());
            }
            Err(e) => self.error = Some(format!("Update failed: {e}")),
        }
    }
}
