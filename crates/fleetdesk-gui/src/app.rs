//! Main application structure with login state and tab navigation

use std::sync::Arc;

use eframe::egui::{self, RichText};

use fleetdesk_app::{
    AnalyticsService, AppConfig, DashboardService, OptimizerService, PredictionService,
};
use fleetdesk_db::{
    Db, PgDeliveryRepository, PgReportingRepository, PgStoreRepository, PgVehicleRepository,
    TokenChain,
};
use fleetdesk_domain::model::User;
use fleetdesk_types::{Result, Role};

use crate::active_routes_panel::ActiveRoutesPanel;
use crate::analytics_panel::AnalyticsPanel;
use crate::edit_routes_panel::EditRoutesPanel;
use crate::login_view::LoginView;
use crate::map_panel::MapPanel;
use crate::new_routes_panel::NewRoutesPanel;
use crate::overview_panel::OverviewPanel;
use crate::theme;

/// Connected repositories and the services over them
pub struct Services {
    db: Arc<Db>,
    pub deliveries: fleetdesk_app::DynDeliveryRepo,
    pub stores: fleetdesk_app::DynStoreRepo,
    pub vehicles: fleetdesk_app::DynVehicleRepo,
    pub dashboard: DashboardService,
    pub analytics: AnalyticsService,
    pub optimizer: OptimizerService,
    pub prediction: PredictionService,
}

impl Services {
    /// Connect to the database and wire the service layer.
    ///
    /// Blocks until the first connection is established or fails; bad
    /// credentials surface here.
    pub fn connect(config: &AppConfig) -> Result<Self> {
        let tokens = TokenChain::standard(config.token_command.as_deref())?;
        let db = Arc::new(Db::connect(&config.db, &tokens)?);

        let deliveries: fleetdesk_app::DynDeliveryRepo =
            Arc::new(PgDeliveryRepository::new(db.clone()));
        let stores: fleetdesk_app::DynStoreRepo = Arc::new(PgStoreRepository::new(db.clone()));
        let vehicles: fleetdesk_app::DynVehicleRepo =
            Arc::new(PgVehicleRepository::new(db.clone()));
        let reporting: fleetdesk_app::DynReportingRepo =
            Arc::new(PgReportingRepository::new(db.clone()));

        Ok(Self {
            db,
            dashboard: DashboardService::new(reporting.clone(), deliveries.clone()),
            analytics: AnalyticsService::new(reporting.clone()),
            optimizer: OptimizerService::new(
                deliveries.clone(),
                vehicles.clone(),
                reporting.clone(),
            ),
            prediction: PredictionService::new(reporting, deliveries.clone()),
            deliveries,
            stores,
            vehicles,
        })
    }

    pub fn is_connected(&self) -> bool {
        !self.db.is_closed()
    }
}

/// Application tab selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Overview,
    Analytics,
    ActiveRoutes,
    NewRoutes,
    EditRoutes,
    Map,
}

impl Tab {
    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Analytics => "Analytics",
            Tab::ActiveRoutes => "Active Routes",
            Tab::NewRoutes => "New Routes",
            Tab::EditRoutes => "Edit Routes",
            Tab::Map => "Map",
        }
    }

    pub fn all() -> [Tab; 6] {
        [
            Tab::Overview,
            Tab::Analytics,
            Tab::ActiveRoutes,
            Tab::NewRoutes,
            Tab::EditRoutes,
            Tab::Map,
        ]
    }

    /// Role gating happens here, in the application layer
    pub fn available_to(&self, role: Role) -> bool {
        match self {
            Tab::Overview | Tab::ActiveRoutes | Tab::Map => true,
            Tab::Analytics | Tab::NewRoutes => role.can_manage_routes(),
            Tab::EditRoutes => role.can_edit_records(),
        }
    }
}

/// State for one logged-in user
struct Session {
    user: User,
    services: Option<Services>,
    connect_error: Option<String>,
    current_tab: Tab,
    overview: OverviewPanel,
    analytics: AnalyticsPanel,
    active_routes: ActiveRoutesPanel,
    new_routes: NewRoutesPanel,
    edit_routes: EditRoutesPanel,
    map: MapPanel,
}

impl Session {
    fn start(config: &AppConfig, user: User) -> Self {
        let (services, connect_error) = match Services::connect(config) {
            Ok(services) => (Some(services), None),
            Err(e) => (None, Some(e.to_string())),
        };

        Self {
            user,
            services,
            connect_error,
            current_tab: Tab::default(),
            overview: OverviewPanel::new(),
            analytics: AnalyticsPanel::new(),
            active_routes: ActiveRoutesPanel::new(),
            new_routes: NewRoutesPanel::new(),
            edit_routes: EditRoutesPanel::new(),
            map: MapPanel::new(),
        }
    }
}

/// Main application state
pub struct FleetdeskApp {
    config: AppConfig,
    login: LoginView,
    session: Option<Session>,
}

impl FleetdeskApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let mut style = (*cc.egui_ctx.style()).clone();
        style.interaction.tooltip_delay = 0.5;
        style.animation_time = 0.1;
        cc.egui_ctx.set_style(style);

        let config = AppConfig::load().unwrap_or_default();

        Self {
            config,
            login: LoginView::new(),
            session: None,
        }
    }

    fn render_header(&self, ui: &mut egui::Ui) -> bool {
        let mut logout = false;
        let Some(session) = &self.session else {
            return false;
        };

        ui.horizontal(|ui| {
            ui.label(RichText::new("Fleetdesk").heading().color(theme::PRIMARY));
            ui.add_space(16.0);

            let connected = session
                .services
                .as_ref()
                .map(Services::is_connected)
                .unwrap_or(false);
            if connected {
                ui.colored_label(theme::SUCCESS, "● Database connected");
            } else {
                ui.colored_label(theme::ERROR, "● Database disconnected");
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Logout").clicked() {
                    logout = true;
                }
                ui.add_space(8.0);
                ui.label(format!(
                    "{} ({})",
                    session.user.full_name, session.user.role
                ));
            });
        });
        logout
    }

    fn render_tab_bar(ui: &mut egui::Ui, session: &mut Session) {
        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;

            for tab in Tab::all() {
                if !tab.available_to(session.user.role) {
                    continue;
                }
                let selected = session.current_tab == tab;
                if ui.selectable_label(selected, tab.label()).clicked() {
                    session.current_tab = tab;
                }
                ui.add_space(8.0);
            }
        });
    }

    fn render_main(ui: &mut egui::Ui, session: &mut Session, config: &AppConfig) {
        let Some(services) = &session.services else {
            ui.vertical_centered(|ui| {
                ui.add_space(60.0);
                ui.colored_label(theme::ERROR, "Database connection error");
                if let Some(error) = &session.connect_error {
                    ui.label(RichText::new(error.as_str()).small().color(theme::MUTED));
                }
                ui.add_space(12.0);
                if ui.button("Retry connection").clicked() {
                    match Services::connect(config) {
                        Ok(services) => {
                            session.services = Some(services);
                            session.connect_error = None;
                        }
                        Err(e) => session.connect_error = Some(e.to_string()),
                    }
                }
            });
            return;
        };

        match session.current_tab {
            Tab::Overview => session.overview.ui(ui, services, &session.user),
            Tab::Analytics => session.analytics.ui(ui, services),
            Tab::ActiveRoutes => session.active_routes.ui(ui, services),
            Tab::NewRoutes => session.new_routes.ui(ui, services),
            Tab::EditRoutes => session.edit_routes.ui(ui, services),
            Tab::Map => session.map.ui(ui, services),
        }
    }
}

impl eframe::App for FleetdeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Login screen until a user authenticates.
        if self.session.is_none() {
            let mut authenticated = None;
            egui::CentralPanel::default().show(ctx, |ui| {
                authenticated = self.login.ui(ui, &self.config);
            });
            if let Some(user) = authenticated {
                self.session = Some(Session::start(&self.config, user));
                self.login = LoginView::new();
            }
            return;
        }

        let mut logout = false;
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            logout = self.render_header(ui);
            ui.add_space(4.0);
            if let Some(session) = &mut self.session {
                Self::render_tab_bar(ui, session);
            }
            ui.add_space(4.0);
        });

        if logout {
            self.session = None;
            return;
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(session) = &mut self.session {
                Self::render_main(ui, session, &self.config);
            }
        });
    }
}
