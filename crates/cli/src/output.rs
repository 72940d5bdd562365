use crate::error::CliError;
use engine_runtime::execution::service::ConnectionCheck;
use model::{
    core::entity::Entity,
    execution::{report::EntityReport, summary::MigrationSummary},
};
use std::fmt::Write;

fn entity_line(report: &EntityReport) -> String {
    match (&report.result, &report.error) {
        (Some(r), None) => format!(
            "{:<18} {} migrated, {} errors",
            report.entity, r.success_count, r.error_count
        ),
        (Some(r), Some(err)) => format!(
            "{:<18} {} migrated, {} errors ({err})",
            report.entity, r.success_count, r.error_count
        ),
        (None, err) => format!(
            "{:<18} FAILED: {}",
            report.entity,
            err.as_deref().unwrap_or("unknown error")
        ),
    }
}

pub fn render_summary(summary: &MigrationSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Migration run {}", summary.run_id);
    let _ = writeln!(out, "-----------------------------");
    for report in summary.entities.values() {
        let _ = writeln!(out, "{}", entity_line(report));
    }
    let totals = summary.totals();
    let _ = writeln!(out, "-----------------------------");
    let _ = writeln!(
        out,
        "{:<18} {} migrated, {} errors in {} ms",
        "total",
        totals.success_count,
        totals.error_count,
        summary.duration_ms()
    );
    if summary.success {
        let _ = writeln!(out, "All entities migrated");
    } else {
        let _ = writeln!(out, "Failed entities:");
        for failed in &summary.failed {
            let _ = writeln!(out, "  {}: {}", failed.entity, failed.error);
        }
    }
    out
}

pub fn print_summary(summary: &MigrationSummary, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print!("{}", render_summary(summary));
    }
    Ok(())
}

pub fn print_entity_report(report: &EntityReport, json: bool) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", entity_line(report));
    }
    Ok(())
}

pub fn print_connection_check(check: &ConnectionCheck, json: bool) -> Result<(), CliError> {
    let status = |r: &Result<(), String>| match r {
        Ok(()) => "ok".to_string(),
        Err(e) => e.clone(),
    };
    if json {
        let value = serde_json::json!({
            "source": status(&check.source),
            "target": status(&check.target),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{:<8} {}", "source", status(&check.source));
        println!("{:<8} {}", "target", status(&check.target));
    }
    Ok(())
}

pub fn print_entities() {
    for entity in Entity::ALL {
        let after = entity
            .depends_on()
            .iter()
            .map(Entity::as_str)
            .collect::<Vec<_>>()
            .join(", ");
        if after.is_empty() {
            println!("{:<18} (legacy name: {})", entity, entity.legacy_name());
        } else {
            println!(
                "{:<18} (legacy name: {}, runs after: {after})",
                entity,
                entity.legacy_name()
            );
        }
    }
}
