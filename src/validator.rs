use std::path::Path;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::error::{Result, WarehouseError};
use crate::pipeline::quality::{self, CheckFailure};
use crate::warehouse::Warehouse;

/// Aggregated outcome of a validation pass over a built warehouse.
#[derive(Debug)]
pub struct ValidationReport {
    pub missing_objects: Vec<String>,
    pub failing_checks: Vec<CheckFailure>,
    /// fact_orders rows whose purchase_date_key did not resolve to dim_time.
    /// None when fact_orders itself was missing.
    pub unresolved_purchase_keys: Option<i64>,
}

impl ValidationReport {
    pub fn is_sound(&self) -> bool {
        self.missing_objects.is_empty()
            && self.failing_checks.is_empty()
            && self.unresolved_purchase_keys == Some(0)
    }

    /// Converts an unsound report into the aggregated validation error.
    pub fn ensure_sound(&self) -> Result<()> {
        if self.is_sound() {
            return Ok(());
        }
        let mut problems = Vec::new();
        for object in &self.missing_objects {
            problems.push(format!("missing object: {object}"));
        }
        for failure in &self.failing_checks {
            problems.push(format!(
                "failing check: {} = {}",
                failure.check_name,
                failure.observed()
            ));
        }
        match self.unresolved_purchase_keys {
            Some(0) => {}
            Some(count) => problems.push(format!(
                "fact_orders has {count} row(s) with unresolved purchase_date_key"
            )),
            None => problems.push("spot check skipped: mart.fact_orders unavailable".to_string()),
        }
        Err(WarehouseError::ValidationFailed(problems.join("; ")))
    }
}

/// Re-opens a built warehouse and asserts it is structurally and
/// semantically sound. Read-only and safe to run any number of times; every
/// required object is probed even after earlier ones fail so the report is
/// complete in one pass.
pub fn validate_warehouse(db_path: &Path, config: &PipelineConfig) -> Result<ValidationReport> {
    let warehouse = Warehouse::open_existing(db_path)?;

    let mut missing_objects = Vec::new();
    for object in &config.required_objects {
        if warehouse.is_queryable(object) {
            info!(object = %object, "object exists and is queryable");
        } else {
            warn!(object = %object, "required object missing or unqueryable");
            missing_objects.push(object.clone());
        }
    }

    // Same failure query the build-time quality gate runs.
    let failing_checks = if warehouse.is_queryable("mart.data_quality_checks") {
        quality::failing_checks(&warehouse)?
    } else {
        Vec::new()
    };
    for failure in &failing_checks {
        warn!(check = %failure.check_name, observed = %failure.observed(), "quality check failed");
    }

    // Semantic spot check beyond existence: every fact row must resolve its
    // time dimension key.
    let unresolved_purchase_keys = if warehouse.is_queryable("mart.fact_orders") {
        let count: i64 = warehouse.connection().query_row(
            "SELECT COUNT(*) FROM mart.fact_orders WHERE purchase_date_key IS NULL",
            [],
            |row| row.get(0),
        )?;
        info!(count, "null purchase_date_key count");
        Some(count)
    } else {
        None
    };

    Ok(ValidationReport {
        missing_objects,
        failing_checks,
        unresolved_purchase_keys,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sound_report_passes() {
        let report = ValidationReport {
            missing_objects: vec![],
            failing_checks: vec![],
            unresolved_purchase_keys: Some(0),
        };
        assert!(report.is_sound());
        report.ensure_sound().unwrap();
    }

    #[test]
    fn unresolved_keys_fail_even_with_all_objects_present() {
        let report = ValidationReport {
            missing_objects: vec![],
            failing_checks: vec![],
            unresolved_purchase_keys: Some(3),
        };
        let err = report.ensure_sound().unwrap_err();
        assert!(err.to_string().contains("3 row(s)"));
    }

    #[test]
    fn report_aggregates_every_problem() {
        let report = ValidationReport {
            missing_objects: vec!["mart.dim_time".to_string()],
            failing_checks: vec![CheckFailure {
                check_name: "fact_orders_nonempty".to_string(),
                observed_value: Some("0".to_string()),
            }],
            unresolved_purchase_keys: None,
        };
        let message = report.ensure_sound().unwrap_err().to_string();
        assert!(message.contains("missing object: mart.dim_time"));
        assert!(message.contains("failing check: fact_orders_nonempty = 0"));
        assert!(message.contains("spot check skipped"));
    }

    #[test]
    fn validating_a_missing_warehouse_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.duckdb");
        let result = validate_warehouse(&missing, &PipelineConfig::default());
        assert!(matches!(result, Err(WarehouseError::WarehouseNotFound(_))));
    }
}
