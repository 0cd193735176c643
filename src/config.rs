use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, WarehouseError};

/// A raw extract file and the raw-layer table it loads into.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceFile {
    pub file_name: String,
    pub table_name: String,
}

/// A transformation stage file, executed in `position` order.
#[derive(Debug, Clone, Deserialize)]
pub struct StageFile {
    pub position: u32,
    pub name: String,
    pub file_name: String,
}

/// The pipeline registry: which extracts feed the raw layer, which stage
/// files build the warehouse, which mart objects get exported, and which
/// objects the validator requires. Passed into each component as data so new
/// sources/reports can be added without touching control flow.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_version")]
    pub version: u32,
    pub sources: Vec<SourceFile>,
    pub stages: Vec<StageFile>,
    pub export_objects: Vec<String>,
    pub required_objects: Vec<String>,
}

fn default_version() -> u32 {
    1
}

impl PipelineConfig {
    /// Loads a registry override from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            WarehouseError::Config(format!(
                "Failed to read pipeline config '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: PipelineConfig = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for PipelineConfig {
    /// The built-in Olist registry.
    fn default() -> Self {
        let source = |file_name: &str, table_name: &str| SourceFile {
            file_name: file_name.to_string(),
            table_name: table_name.to_string(),
        };
        let stage = |position: u32, name: &str, file_name: &str| StageFile {
            position,
            name: name.to_string(),
            file_name: file_name.to_string(),
        };
        Self {
            version: 1,
            sources: vec![
                source("olist_customers_dataset.csv", "customers"),
                source("olist_geolocation_dataset.csv", "geolocation"),
                source("olist_order_items_dataset.csv", "order_items"),
                source("olist_order_payments_dataset.csv", "order_payments"),
                source("olist_order_reviews_dataset.csv", "order_reviews"),
                source("olist_orders_dataset.csv", "orders"),
                source("olist_products_dataset.csv", "products"),
                source("olist_sellers_dataset.csv", "sellers"),
                source(
                    "product_category_name_translation.csv",
                    "product_category_name_translation",
                ),
            ],
            stages: vec![
                stage(10, "staging", "10_staging.sql"),
                stage(20, "dimensions", "20_dimensions.sql"),
                stage(30, "facts", "30_facts.sql"),
                stage(40, "dashboard_views", "40_dashboard_views.sql"),
                stage(50, "quality_checks", "50_quality_checks.sql"),
            ],
            export_objects: vec![
                "mart.dim_customer".to_string(),
                "mart.dim_product".to_string(),
                "mart.dim_review".to_string(),
                "mart.dim_seller".to_string(),
                "mart.dim_time".to_string(),
                "mart.fact_orders".to_string(),
                "mart.fact_order_items".to_string(),
                "mart.vw_exec_summary_monthly".to_string(),
                "mart.vw_exec_payment_mix".to_string(),
                "mart.vw_exec_category_performance".to_string(),
                "mart.vw_ops_state_bottlenecks".to_string(),
                "mart.vw_ops_monthly_logistics".to_string(),
                "mart.vw_csat_delay_impact".to_string(),
                "mart.vw_csat_state_payment_driver".to_string(),
                "mart.vw_review_distribution".to_string(),
                "mart.vw_state_geo_centroid".to_string(),
                "mart.vw_csat_kpis".to_string(),
                "mart.data_quality_checks".to_string(),
            ],
            required_objects: vec![
                "mart.dim_customer".to_string(),
                "mart.dim_product".to_string(),
                "mart.dim_time".to_string(),
                "mart.dim_review".to_string(),
                "mart.dim_seller".to_string(),
                "mart.fact_orders".to_string(),
                "mart.fact_order_items".to_string(),
                "mart.vw_exec_summary_monthly".to_string(),
                "mart.vw_ops_state_bottlenecks".to_string(),
                "mart.vw_csat_delay_impact".to_string(),
                "mart.data_quality_checks".to_string(),
            ],
        }
    }
}
