//! Command handlers

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};

use fleetdesk_app::{AppConfig, OptimizerService, PredictionService};
use fleetdesk_db::{
    introspect, Db, PgDeliveryRepository, PgReportingRepository, PgVehicleRepository,
    SqlRepository, TokenChain,
};
use fleetdesk_domain::repository::{DeliveryRepository, ReportingRepository};
use fleetdesk_types::Result;

use crate::cli::{Cli, Commands};
use crate::output;

/// Everything a connected command needs
struct Context {
    sql: SqlRepository,
    deliveries: Arc<PgDeliveryRepository>,
    vehicles: Arc<PgVehicleRepository>,
    reporting: Arc<PgReportingRepository>,
}

impl Context {
    fn connect(config: &AppConfig) -> Result<Self> {
        let tokens = TokenChain::standard(config.token_command.as_deref())?;
        let db = Arc::new(Db::connect(&config.db, &tokens)?);
        Ok(Self {
            sql: SqlRepository::new(db.clone()),
            deliveries: Arc::new(PgDeliveryRepository::new(db.clone())),
            vehicles: Arc::new(PgVehicleRepository::new(db.clone())),
            reporting: Arc::new(PgReportingRepository::new(db)),
        })
    }
}

pub fn execute(cli: Cli) -> Result<()> {
    let config = AppConfig::load()?;
    let format = cli.format;

    match cli.command {
        Commands::Config => {
            println!("{config}");
            Ok(())
        }

        Commands::Status => {
            let ctx = Context::connect(&config)?;
            let counts = ctx.reporting.status_counts()?;
            let nulls = ctx.reporting.null_time_counts()?;
            let recent = ctx.deliveries.find_recent(5)?;
            output::print_status(format, &counts, &nulls, &recent)
        }

        Commands::Schema { table } => {
            let ctx = Context::connect(&config)?;
            match table {
                Some(table) => {
                    let columns = introspect::table_columns(&ctx.sql, &table)?;
                    output::print_columns(format, &table, &columns)
                }
                None => {
                    let tables = introspect::list_tables(&ctx.sql)?;
                    output::print_tables(format, &tables)
                }
            }
        }

        Commands::Recent { limit } => {
            let ctx = Context::connect(&config)?;
            let rows = ctx.deliveries.find_recent(limit)?;
            output::print_deliveries(format, &rows)
        }

        Commands::Optimize {
            max_per_vehicle,
            apply,
        } => {
            let ctx = Context::connect(&config)?;
            let optimizer = OptimizerService::new(
                ctx.deliveries.clone(),
                ctx.vehicles.clone(),
                ctx.reporting.clone(),
            );

            let summary = optimizer.summary()?;
            output::print_summary(format, &summary)?;
            if summary.pending_deliveries == 0 {
                return Ok(());
            }

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.set_message(if apply {
                "Optimizing and updating routes..."
            } else {
                "Planning routes (dry run)..."
            });
            spinner.enable_steady_tick(std::time::Duration::from_millis(100));

            let outcome = optimizer.optimize_fleet(max_per_vehicle, apply);
            spinner.finish_and_clear();

            output::print_outcome(format, &outcome?)
        }

        Commands::Predict { limit, history } => {
            let ctx = Context::connect(&config)?;
            let prediction =
                PredictionService::new(ctx.reporting.clone(), ctx.deliveries.clone());

            let predictor = prediction.train(history)?;
            let mut predictions = prediction.predict_pending(&predictor)?;
            predictions.truncate(limit);
            output::print_predictions(format, &predictor, &predictions)
        }
    }
}
