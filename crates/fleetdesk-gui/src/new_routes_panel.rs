//! New routes: create delivery records and run the optimizer

use chrono::Local;
use eframe::egui::{self, RichText, ScrollArea};
use uuid::Uuid;

use fleetdesk_app::{OptimizationSummary, RouteSuggestion, DEFAULT_MAX_PER_VEHICLE};
use fleetdesk_domain::model::{DeliveryStatus, NewDelivery, Store, Vehicle};
use fleetdesk_domain::repository::{DeliveryRepository, StoreRepository, VehicleRepository};

use crate::app::Services;
use crate::theme;

pub struct NewRoutesPanel {
    loaded: bool,
    vehicles: Vec<Vehicle>,
    stores: Vec<Store>,
    selected_vehicle: Option<usize>,
    selected_stores: Vec<bool>,
    driver: String,
    suggestion: Option<RouteSuggestion>,
    fleet_summary: Option<OptimizationSummary>,
    error: Option<String>,
    status: Option<String>,
}

impl NewRoutesPanel {
    pub fn new() -> Self {
        Self {
            loaded: false,
            vehicles: Vec::new(),
            stores: Vec::new(),
            selected_vehicle: None,
            selected_stores: Vec::new(),
            driver: String::new(),
            suggestion: None,
            fleet_summary: None,
            error: None,
            status: None,
        }
    }

    fn refresh(&mut self, services: &Services) {
        self.error = None;
        match services.vehicles.find_all() {
            Ok(vehicles) => self.vehicles = vehicles,
            Err(e) => self.error = Some(format!("Failed to load vehicles: {e}")),
        }
        match services.stores.find_all() {
            Ok(stores) => {
                self.selected_stores = vec![false; stores.len()];
                self.stores = stores;
            }
            Err(e) => self.error = Some(format!("Failed to load stores: {e}")),
        }
        self.loaded = true;
    }

    fn selected_store_ids(&self) -> Vec<String> {
        self.stores
            .iter()
            .zip(&self.selected_stores)
            .filter(|(_, selected)| **selected)
            .map(|(store, _)| store.store_id.clone())
            .collect()
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        if !self.loaded {
            self.refresh(services);
        }

        ui.horizontal(|ui| {
            ui.heading("New Routes");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh(services);
                    self.status = None;
                }
            });
        });
        ui.separator();

        ui.add_space(8.0);
        ui.columns(2, |columns| {
            self.form_ui(&mut columns[0]);
            self.summary_ui(&mut columns[1]);
        });

        ui.add_space(12.0);
        ui.horizontal(|ui| {
            if ui.button("Create route").clicked() {
                self.create_route(services);
            }
            if ui.button("Optimize").clicked() {
                self.optimize(services);
            }
        });

        if let Some(summary) = self.fleet_summary.clone() {
            self.fleet_confirm_ui(ui, services, summary);
        }

        theme::error_line(ui, &self.error);
        theme::status_line(ui, &self.status);
    }

    fn form_ui(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Route details").strong());
        ui.add_space(4.0);

        let vehicle_text = self
            .selected_vehicle
            .and_then(|i| self.vehicles.get(i))
            .map(Vehicle::label)
            .unwrap_or_else(|| "Select a vehicle".to_string());
        egui::ComboBox::from_label("Vehicle")
            .selected_text(vehicle_text)
            .show_ui(ui, |ui| {
                for (i, vehicle) in self.vehicles.iter().enumerate() {
                    ui.selectable_value(&mut self.selected_vehicle, Some(i), vehicle.label());
                }
            });

        ui.add_space(4.0);
        ui.horizontal(|ui| {
            ui.label("Driver:");
            ui.text_edit_singleline(&mut self.driver);
        });

        ui.add_space(8.0);
        ui.label("Stores:");
        ScrollArea::vertical().max_height(180.0).show(ui, |ui| {
            for (i, store) in self.stores.iter().enumerate() {
                if let Some(selected) = self.selected_stores.get_mut(i) {
                    ui.checkbox(selected, store.display_name());
                }
            }
        });
    }

    fn summary_ui(&mut self, ui: &mut egui::Ui) {
        ui.label(RichText::new("Summary").strong());
        ui.add_space(4.0);

        let store_count = self.selected_stores.iter().filter(|s| **s).count();
        ui.label(format!("Selected stores: {store_count}"));
        ui.label(format!("Order date: {}", Local::now().date_naive()));

        match &self.suggestion {
            Some(suggestion) => {
                ui.add_space(8.0);
                ui.label(RichText::new("Suggestion").color(theme::INFO));
                match &suggestion.vehicle {
                    Some(vehicle) => {
                        ui.label(format!(
                            "Best vehicle: {} (avg {:.0} min over {} deliveries)",
                            vehicle.vehicle_id, vehicle.avg_minutes, vehicle.deliveries
                        ));
                    }
                    None => {
                        ui.label("Best vehicle: not enough history");
                    }
                }
                ui.label(format!("Est. prep: {} min", suggestion.prep_minutes));
                ui.label(format!("Est. delivery: {} min", suggestion.delivery_minutes));
                ui.label(format!(
                    "Total: {}h {:02}min",
                    suggestion.total_minutes() / 60,
                    suggestion.total_minutes() % 60
                ));
            }
            None => {
                ui.label(
                    RichText::new("Select stores and press Optimize for a suggestion")
                        .small()
                        .color(theme::MUTED),
                );
            }
        }
    }

    /// One delivery row per selected store, status Ordered
    fn create_route(&mut self, services: &Services) {
        let store_ids = self.selected_store_ids();
        if store_ids.is_empty() {
            self.error = Some("Select at least one store".to_string());
            return;
        }
        let vehicle_id = self
            .selected_vehicle
            .and_then(|i| self.vehicles.get(i))
            .map(|v| v.vehicle_id.clone());

        let now = Local::now();
        let mut created = 0;
        for store_id in &store_ids {
            let store = self.stores.iter().find(|s| &s.store_id == store_id);
            let delivery = NewDelivery {
                order_id: format!("FD-{}", Uuid::new_v4().simple()),
                store_id: store_id.clone(),
                vehicle_id: vehicle_id.clone(),
                driver: (!self.driver.trim().is_empty()).then(|| self.driver.trim().to_string()),
                order_date: now.date_naive(),
                order_time: Some(now.time()),
                status: DeliveryStatus::Ordered,
                dest_lat: store.map(|s| s.lat),
                dest_lon: store.map(|s| s.lon),
            };
            match services.deliveries.insert(&delivery) {
                Ok(()) => created += 1,
                Err(e) => {
                    self.error = Some(format!("Insert failed: {e}"));
                    return;
                }
            }
        }

        self.error = None;
        self.status = Some(format!("Created {created} delivery record(s)"));
        self.selected_stores = vec![false; self.stores.len()];
        self.suggestion = None;
    }

    /// With stores selected: suggest for the form. Otherwise: offer a
    /// fleet-wide optimization.
    fn optimize(&mut self, services: &Services) {
        let store_ids = self.selected_store_ids();
        if store_ids.is_empty() {
            match services.optimizer.summary() {
                Ok(summary) => self.fleet_summary = Some(summary),
                Err(e) => self.error = Some(format!("Optimization failed: {e}")),
            }
            return;
        }

        match services.optimizer.suggest_for_stores(&store_ids) {
            Ok(suggestion) => {
                // Apply the suggested vehicle to the form when it is known.
                if let Some(best) = &suggestion.vehicle {
                    self.selected_vehicle = self
                        .vehicles
                        .iter()
                        .position(|v| v.vehicle_id == best.vehicle_id);
                }
                self.suggestion = Some(suggestion);
                self.error = None;
            }
            Err(e) => self.error = Some(format!("Optimization failed: {e}")),
        }
    }

    fn fleet_confirm_ui(
        &mut self,
        ui: &mut egui::Ui,
        services: &Services,
        summary: OptimizationSummary,
    ) {
        ui.add_space(8.0);
        ui.group(|ui| {
            ui.label(RichText::new("Fleet-wide optimization").strong());
            ui.label(format!(
                "{} pending deliveries across {} stores, {} vehicles available ({} potential)",
                summary.pending_deliveries,
                summary.unique_stores,
                summary.vehicles_available,
                summary.potential
            ));
            ui.horizontal(|ui| {
                if ui.button("Run optimization").clicked() {
                    match services
                        .optimizer
                        .optimize_fleet(DEFAULT_MAX_PER_VEHICLE, true)
                    {
                        Ok(outcome) => {
                            self.status = Some(outcome.message);
                            self.error = None;
                        }
                        Err(e) => self.error = Some(format!("Optimization failed: {e}")),
                    }
                    self.fleet_summary = None;
                }
                if ui.button("Cancel").clicked() {
                    self.fleet_summary = None;
                }
            });
        });
    }
}
