//! Output formatting module

use fleetdesk_app::{FittedPredictor, OptimizationOutcome, OptimizationSummary, PredictedDelivery};
use fleetdesk_db::introspect::ColumnInfo;
use fleetdesk_domain::model::Delivery;
use fleetdesk_domain::repository::{NullTimeCounts, StatusCount};
use fleetdesk_types::{OutputFormat, Result};

pub fn print_status(
    format: OutputFormat,
    counts: &[StatusCount],
    nulls: &NullTimeCounts,
    recent: &[Delivery],
) -> Result<()> {
    if format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(&serde_json::json!({
            "status_counts": counts,
            "null_times": nulls,
            "recent": recent,
        }))?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nDelivery Log Status");
    println!("===================");
    for count in counts {
        println!("{:<12} {:>6}", count.status, count.count);
    }
    println!();
    println!("Null pickup times:   {}", nulls.null_pickup);
    println!("Null delivery times: {}", nulls.null_delivery);

    if !recent.is_empty() {
        println!("\nRecent orders:");
        for row in recent {
            println!(
                "  {}  {}  {:<10} {}",
                row.order_date,
                row.order_id,
                row.status,
                row.vehicle_id.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(())
}

pub fn print_tables(format: OutputFormat, tables: &[String]) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(tables)?);
        return Ok(());
    }

    println!("\nTables ({})", tables.len());
    println!("==========");
    for table in tables {
        println!("  {table}");
    }
    Ok(())
}

pub fn print_columns(format: OutputFormat, table: &str, columns: &[ColumnInfo]) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(columns)?);
        return Ok(());
    }

    println!("\nTable: {table}");
    println!("{}", "=".repeat(table.len() + 7));
    for column in columns {
        println!(
            "  {:<24} {:<20} {}",
            column.name,
            column.data_type,
            if column.nullable { "NULL" } else { "NOT NULL" }
        );
    }
    Ok(())
}

pub fn print_deliveries(format: OutputFormat, rows: &[Delivery]) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }

    println!(
        "\n{:<14} {:<10} {:<10} {:<12} {:<11} {:>8}",
        "Order", "Store", "Vehicle", "Status", "Date", "Minutes"
    );
    println!("{}", "-".repeat(70));
    for row in rows {
        println!(
            "{:<14} {:<10} {:<10} {:<12} {:<11} {:>8}",
            row.order_id,
            row.store_id,
            row.vehicle_id.as_deref().unwrap_or("-"),
            row.status.as_str(),
            row.order_date.to_string(),
            row.delivery_minutes
                .map(|m| format!("{m:.0}"))
                .unwrap_or_else(|| "-".to_string()),
        );
    }
    Ok(())
}

pub fn print_summary(format: OutputFormat, summary: &OptimizationSummary) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!("\nOptimization Potential");
    println!("======================");
    println!("Pending deliveries: {}", summary.pending_deliveries);
    println!("Unique stores:      {}", summary.unique_stores);
    println!("Vehicles available: {}", summary.vehicles_available);
    println!("Potential:          {}", summary.potential);
    Ok(())
}

pub fn print_outcome(format: OutputFormat, outcome: &OptimizationOutcome) -> Result<()> {
    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("\n{}", outcome.message);
    if outcome.applied {
        println!("Updated rows: {}", outcome.updated);
    } else {
        println!("Dry run - re-run with --apply to persist.");
    }

    if !outcome.plan.assignments.is_empty() {
        println!("\nAssignments:");
        for (i, assignment) in outcome.plan.assignments.iter().enumerate() {
            println!(
                "  {}. Vehicle {}: {} deliveries from store {}",
                i + 1,
                assignment.vehicle_id,
                assignment.delivery_count(),
                assignment.store_id
            );
        }
    }
    if !outcome.plan.unassigned.is_empty() {
        println!(
            "\nUnassigned ({} - no vehicle capacity):",
            outcome.plan.unassigned.len()
        );
        for order in &outcome.plan.unassigned {
            println!("  {order}");
        }
    }
    Ok(())
}

pub fn print_predictions(
    format: OutputFormat,
    predictor: &FittedPredictor,
    predictions: &[PredictedDelivery],
) -> Result<()> {
    if format == OutputFormat::Json {
        let content = serde_json::to_string_pretty(&serde_json::json!({
            "samples": predictor.sample_count(),
            "mae_minutes": predictor.mae,
            "predictions": predictions,
        }))?;
        println!("{}", content);
        return Ok(());
    }

    println!("\nDelivery-Time Predictions");
    println!("=========================");
    println!(
        "Model: {} samples, MAE {:.1} min",
        predictor.sample_count(),
        predictor.mae
    );

    if predictions.is_empty() {
        println!("\nNo pending deliveries to score.");
        return Ok(());
    }

    println!();
    for prediction in predictions {
        let minutes = prediction.predicted_minutes.round() as i64;
        println!(
            "  {:<14} store {:<8} vehicle {:<8} ~{}h {:02}min",
            prediction.order_id,
            prediction.store_id,
            prediction.vehicle_id.as_deref().unwrap_or("-"),
            minutes / 60,
            minutes % 60,
        );
    }
    Ok(())
}
