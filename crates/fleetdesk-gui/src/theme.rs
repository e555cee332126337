//! Shared palette and small widgets

use eframe::egui::{Color32, RichText, Ui};
use fleetdesk_domain::model::{DeliveryStatus, Punctuality};

pub const PRIMARY: Color32 = Color32::from_rgb(0x25, 0x63, 0xeb);
pub const SUCCESS: Color32 = Color32::from_rgb(0x10, 0xb9, 0x81);
pub const WARNING: Color32 = Color32::from_rgb(0xf5, 0x9e, 0x0b);
pub const ERROR: Color32 = Color32::from_rgb(0xef, 0x44, 0x44);
pub const INFO: Color32 = Color32::from_rgb(0x3b, 0x82, 0xf6);
pub const MUTED: Color32 = Color32::from_rgb(0x64, 0x74, 0x8b);

pub fn status_color(status: DeliveryStatus) -> Color32 {
    match status {
        DeliveryStatus::Ordered => MUTED,
        DeliveryStatus::Pending => WARNING,
        DeliveryStatus::InTransit => INFO,
        DeliveryStatus::Delivered => SUCCESS,
    }
}

pub fn punctuality_color(punctuality: Punctuality) -> Color32 {
    match punctuality {
        Punctuality::OnTime => SUCCESS,
        Punctuality::Delayed => WARNING,
        Punctuality::Critical => ERROR,
    }
}

/// A metric card: big value over a small caption
pub fn metric_card(ui: &mut Ui, label: &str, value: &str, color: Color32) {
    ui.group(|ui| {
        ui.set_min_width(150.0);
        ui.vertical(|ui| {
            ui.label(RichText::new(value).size(28.0).strong().color(color));
            ui.label(RichText::new(label).small().color(MUTED));
        });
    });
}

/// In-panel error line
pub fn error_line(ui: &mut Ui, error: &Option<String>) {
    if let Some(message) = error {
        ui.add_space(4.0);
        ui.colored_label(ERROR, message.as_str());
    }
}

/// In-panel status/confirmation line
pub fn status_line(ui: &mut Ui, status: &Option<String>) {
    if let Some(message) = status {
        ui.add_space(4.0);
        ui.colored_label(SUCCESS, message.as_str());
    }
}
