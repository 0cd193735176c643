use tracing::{info, warn};

use crate::error::{Result, WarehouseError};
use crate::warehouse::Warehouse;

/// One failed assertion from the quality-check relation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckFailure {
    pub check_name: String,
    pub observed_value: Option<String>,
}

impl CheckFailure {
    pub fn observed(&self) -> &str {
        self.observed_value.as_deref().unwrap_or("null")
    }
}

/// Reads the failing rows of `mart.data_quality_checks`, sorted by check
/// name for deterministic reporting.
pub fn failing_checks(warehouse: &Warehouse) -> Result<Vec<CheckFailure>> {
    let mut stmt = warehouse.connection().prepare(
        "SELECT check_name, observed_value
         FROM mart.data_quality_checks
         WHERE passed = FALSE
         ORDER BY check_name",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(CheckFailure {
            check_name: row.get(0)?,
            observed_value: row.get(1)?,
        })
    })?;
    let failures = rows.collect::<duckdb::Result<Vec<_>>>()?;
    Ok(failures)
}

/// Decides whether a built warehouse is trustworthy enough to export. Reads
/// only; never mutates data.
pub struct QualityGate {
    allow_failures: bool,
}

impl QualityGate {
    pub fn new(allow_failures: bool) -> Self {
        Self { allow_failures }
    }

    /// Evaluates the gate. With failures present the run aborts unless the
    /// explicit override was supplied, in which case every failure is logged
    /// as a warning and the run continues to export.
    pub fn enforce(&self, warehouse: &Warehouse) -> Result<()> {
        let failures = failing_checks(warehouse)?;

        if failures.is_empty() {
            info!("all quality checks passed");
            return Ok(());
        }

        for failure in &failures {
            warn!(
                check = %failure.check_name,
                observed = %failure.observed(),
                "quality check failed"
            );
        }

        if self.allow_failures {
            warn!(
                failed = failures.len(),
                "quality failures overridden; continuing to export untrusted build"
            );
            Ok(())
        } else {
            Err(WarehouseError::QualityGateFailed { failures })
        }
    }
}
