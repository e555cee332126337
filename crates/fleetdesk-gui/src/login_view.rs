//! Login screen

use eframe::egui::{self, Key, RichText, TextEdit};

use fleetdesk_app::AppConfig;
use fleetdesk_db::UserStore;
use fleetdesk_domain::model::User;

use crate::theme;

/// Username/password form shown before the main window
pub struct LoginView {
    username: String,
    password: String,
    error: Option<String>,
}

impl LoginView {
    pub fn new() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            error: None,
        }
    }

    /// Render the form; returns the authenticated user on success
    pub fn ui(&mut self, ui: &mut egui::Ui, config: &AppConfig) -> Option<User> {
        let mut authenticated = None;

        ui.vertical_centered(|ui| {
            ui.add_space(80.0);
            ui.label(RichText::new("🚚").size(56.0));
            ui.label(RichText::new("Fleetdesk").size(30.0).strong());
            ui.label(RichText::new("Transportation Management Portal").color(theme::MUTED));
            ui.add_space(32.0);

            let field_width = 280.0;

            ui.scope(|ui| {
                ui.set_max_width(field_width);

                ui.label("Username");
                ui.add(TextEdit::singleline(&mut self.username).desired_width(field_width));
                ui.add_space(8.0);

                ui.label("Password");
                ui.add(
                    TextEdit::singleline(&mut self.password)
                        .password(true)
                        .desired_width(field_width),
                );
                ui.add_space(16.0);

                let submitted = ui.input(|i| i.key_pressed(Key::Enter));
                let clicked = ui
                    .add_sized([field_width, 32.0], egui::Button::new("LOGIN"))
                    .clicked();

                if clicked || submitted {
                    authenticated = self.try_login(config);
                }
            });

            theme::error_line(ui, &self.error);
        });

        authenticated
    }

    fn try_login(&mut self, config: &AppConfig) -> Option<User> {
        let username = self.username.trim().to_string();
        let password = self.password.trim().to_string();

        if username.is_empty() || password.is_empty() {
            self.error = Some("Please enter both username and password".to_string());
            return None;
        }

        let store = match config.users_path().and_then(UserStore::load) {
            Ok(store) => store,
            Err(e) => {
                self.error = Some(format!("Could not read user roster: {e}"));
                return None;
            }
        };

        match store.authenticate(&username, &password) {
            Ok(user) => {
                tracing::info!(user = %user.username, role = %user.role, "login");
                self.error = None;
                Some(user)
            }
            Err(_) => {
                self.error = Some("Invalid username or password".to_string());
                self.password.clear();
                None
            }
        }
    }
}
