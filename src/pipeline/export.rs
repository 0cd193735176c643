use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{Result, WarehouseError};
use crate::warehouse::{quote_path, Warehouse};

/// Materializes each registered mart object as a parquet file and a
/// header-plus-comma-delimited csv file, named after the object's short
/// name. A pure read of the mart layer; a listed object that does not exist
/// is a hard error, never a skip.
pub fn export_objects(warehouse: &Warehouse, export_dir: &Path, objects: &[String]) -> Result<()> {
    fs::create_dir_all(export_dir)?;

    for object in objects {
        if !warehouse.is_queryable(object) {
            return Err(WarehouseError::MissingExportObject(object.clone()));
        }

        let short_name = object.rsplit('.').next().unwrap_or(object);
        let parquet_path = export_dir.join(format!("{short_name}.parquet"));
        let csv_path = export_dir.join(format!("{short_name}.csv"));

        warehouse.execute_batch(&format!(
            "COPY (SELECT * FROM {object}) TO '{}' (FORMAT PARQUET);",
            quote_path(&parquet_path),
        ))?;
        warehouse.execute_batch(&format!(
            "COPY (SELECT * FROM {object}) TO '{}' (HEADER, DELIMITER ',');",
            quote_path(&csv_path),
        ))?;

        info!(object = %object, artifact = %short_name, "exported parquet + csv");
    }
    Ok(())
}
