//! Map panel: store and delivery coordinates plotted on a plain canvas
//!
//! No tile widget - coordinates are projected straight onto the panel rect,
//! which is plenty for eyeballing clusters and route spread.

use eframe::egui::{self, Pos2, Rect, RichText, Sense, Stroke, Vec2};

use fleetdesk_domain::model::{Delivery, DeliveryStatus, Store};
use fleetdesk_domain::repository::{DeliveryRepository, StoreRepository};

use crate::app::Services;
use crate::theme;

const MAP_SAMPLE: i64 = 200;

pub struct MapPanel {
    loaded: bool,
    stores: Vec<Store>,
    deliveries: Vec<Delivery>,
    show_stores: bool,
    show_deliveries: bool,
    show_routes: bool,
    error: Option<String>,
}

impl MapPanel {
    pub fn new() -> Self {
        Self {
            loaded: false,
            stores: Vec::new(),
            deliveries: Vec::new(),
            show_stores: true,
            show_deliveries: true,
            show_routes: false,
            error: None,
        }
    }

    fn refresh(&mut self, services: &Services) {
        self.error = None;
        match services.stores.find_all() {
            Ok(stores) => self.stores = stores,
            Err(e) => self.error = Some(format!("Failed to load stores: {e}")),
        }
        match services.deliveries.find_recent(MAP_SAMPLE) {
            Ok(deliveries) => {
                self.deliveries = deliveries
                    .into_iter()
                    .filter(|d| d.dest_lat.is_some() && d.dest_lon.is_some())
                    .collect();
            }
            Err(e) => self.error = Some(format!("Failed to load deliveries: {e}")),
        }
        self.loaded = true;
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, services: &Services) {
        if !self.loaded {
            self.refresh(services);
        }

        ui.horizontal(|ui| {
            ui.heading("Route Map");
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Refresh").clicked() {
                    self.refresh(services);
                }
                ui.checkbox(&mut self.show_routes, "Show routes");
                ui.checkbox(&mut self.show_deliveries, "Show deliveries");
                ui.checkbox(&mut self.show_stores, "Show stores");
            });
        });
        ui.separator();

        let points = self.point_count();
        if points == 0 {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.label(RichText::new("No coordinates to plot").color(theme::MUTED));
            });
            theme::error_line(ui, &self.error);
            return;
        }

        let size = ui.available_size() - Vec2::new(0.0, 24.0);
        let (response, painter) = ui.allocate_painter(size, Sense::hover());
        let rect = response.rect.shrink(24.0);

        let Some(bounds) = self.bounds() else {
            return;
        };

        if self.show_routes {
            for delivery in &self.deliveries {
                if delivery.status == DeliveryStatus::Delivered {
                    continue;
                }
                let (Some(lat), Some(lon)) = (delivery.dest_lat, delivery.dest_lon) else {
                    continue;
                };
                let Some(store) = self.stores.iter().find(|s| s.store_id == delivery.store_id)
                else {
                    continue;
                };
                painter.line_segment(
                    [
                        project(store.lat, store.lon, bounds, rect),
                        project(lat, lon, bounds, rect),
                    ],
                    Stroke::new(1.0, theme::MUTED),
                );
            }
        }

        if self.show_deliveries {
            for delivery in &self.deliveries {
                let (Some(lat), Some(lon)) = (delivery.dest_lat, delivery.dest_lon) else {
                    continue;
                };
                painter.circle_filled(
                    project(lat, lon, bounds, rect),
                    3.0,
                    theme::status_color(delivery.status),
                );
            }
        }

        if self.show_stores {
            for store in &self.stores {
                let pos = project(store.lat, store.lon, bounds, rect);
                painter.circle_filled(pos, 5.0, theme::PRIMARY);
                painter.circle_stroke(pos, 5.0, Stroke::new(1.0, egui::Color32::WHITE));
            }
        }

        ui.horizontal(|ui| {
            ui.colored_label(theme::PRIMARY, "● store");
            ui.colored_label(theme::INFO, "● in transit");
            ui.colored_label(theme::SUCCESS, "● delivered");
            ui.colored_label(theme::WARNING, "● pending");
            ui.label(
                RichText::new(format!("{points} points"))
                    .small()
                    .color(theme::MUTED),
            );
        });

        theme::error_line(ui, &self.error);
    }

    fn point_count(&self) -> usize {
        let stores = if self.show_stores { self.stores.len() } else { 0 };
        let deliveries = if self.show_deliveries {
            self.deliveries.len()
        } else {
            0
        };
        stores + deliveries
    }

    /// Lat/lon bounding box over everything plottable
    fn bounds(&self) -> Option<GeoBounds> {
        let mut points: Vec<(f64, f64)> =
            self.stores.iter().map(|s| (s.lat, s.lon)).collect();
        points.extend(
            self.deliveries
                .iter()
                .filter_map(|d| Some((d.dest_lat?, d.dest_lon?))),
        );

        let (&(lat, lon), rest) = points.split_first()?;
        let mut bounds = GeoBounds::point(lat, lon);
        for &(lat, lon) in rest {
            bounds.extend(lat, lon);
        }
        Some(bounds)
    }
}

#[derive(Clone, Copy)]
struct GeoBounds {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl GeoBounds {
    fn point(lat: f64, lon: f64) -> Self {
        Self {
            min_lat: lat,
            max_lat: lat,
            min_lon: lon,
            max_lon: lon,
        }
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.max_lat = self.max_lat.max(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lon = self.max_lon.max(lon);
    }

    fn lat_span(&self) -> f64 {
        (self.max_lat - self.min_lat).max(1e-6)
    }

    fn lon_span(&self) -> f64 {
        (self.max_lon - self.min_lon).max(1e-6)
    }
}

/// Project a coordinate into the panel rect (north up)
fn project(lat: f64, lon: f64, bounds: GeoBounds, rect: Rect) -> Pos2 {
    let x = rect.left() as f64
        + (lon - bounds.min_lon) / bounds.lon_span() * rect.width() as f64;
    let y = rect.bottom() as f64
        - (lat - bounds.min_lat) / bounds.lat_span() * rect.height() as f64;
    Pos2::new(x as f32, y as f32)
}
