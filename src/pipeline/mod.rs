// Warehouse build pipeline: load, transform, gate, export

pub mod export;
pub mod loader;
pub mod quality;
pub mod stages;

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::pipeline::quality::QualityGate;
use crate::pipeline::stages::StageRunner;
use crate::warehouse::Warehouse;

/// Mart models whose row counts are reported at the end of a build.
const SUMMARY_MODELS: [&str; 6] = [
    "dim_customer",
    "dim_product",
    "dim_review",
    "dim_time",
    "fact_order_items",
    "fact_orders",
];

pub struct BuildOptions {
    pub raw_dir: PathBuf,
    pub db_path: PathBuf,
    pub export_dir: PathBuf,
    pub sql_dir: PathBuf,
    pub allow_quality_failures: bool,
}

pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub model_rows: Vec<(String, i64)>,
}

/// Runs one complete warehouse build: completeness gates, raw load, ordered
/// transformation stages, quality gate, export, summary. The warehouse
/// handle is acquired once here and released on every exit path when it goes
/// out of scope.
pub fn run_build(options: &BuildOptions, config: &PipelineConfig) -> Result<RunSummary> {
    let started_at = Utc::now();

    // Both completeness gates run before the warehouse file is created or
    // touched, so a failed gate leaves no partial raw layer behind.
    loader::ensure_required_files(&options.raw_dir, &config.sources)?;
    let stage_list = stages::sql_stages(&options.sql_dir, &config.stages)?;

    let warehouse = Warehouse::create(&options.db_path)?;
    warehouse.ensure_schemas()?;

    loader::load_raw_tables(&warehouse, &options.raw_dir, &config.sources)?;
    StageRunner::new(stage_list).run(&warehouse)?;
    QualityGate::new(options.allow_quality_failures).enforce(&warehouse)?;
    export::export_objects(&warehouse, &options.export_dir, &config.export_objects)?;

    let summary = run_summary(&warehouse, started_at)?;
    for (model, rows) in &summary.model_rows {
        info!(model = %model, rows = *rows, "built model");
    }
    info!(
        duration_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
        "warehouse build complete"
    );
    Ok(summary)
}

fn run_summary(warehouse: &Warehouse, started_at: DateTime<Utc>) -> Result<RunSummary> {
    let mut model_rows = Vec::with_capacity(SUMMARY_MODELS.len());
    for model in SUMMARY_MODELS {
        let rows = warehouse.count(&format!("mart.{model}"))?;
        model_rows.push((model.to_string(), rows));
    }
    Ok(RunSummary {
        started_at,
        finished_at: Utc::now(),
        model_rows,
    })
}
