use std::path::Path;

use tracing::info;

use crate::config::SourceFile;
use crate::error::{Result, WarehouseError};
use crate::warehouse::{quote_path, Warehouse};

/// Verifies every expected extract file is present before any load happens.
/// All missing files are reported in one error so a caller can fix the input
/// directory in a single pass.
pub fn ensure_required_files(raw_dir: &Path, sources: &[SourceFile]) -> Result<()> {
    let missing: Vec<String> = sources
        .iter()
        .filter(|source| !raw_dir.join(&source.file_name).exists())
        .map(|source| source.file_name.clone())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(WarehouseError::MissingInputs {
            raw_dir: raw_dir.to_path_buf(),
            missing,
        })
    }
}

/// Loads each extract into its raw-layer table, replacing any previous run's
/// table. Every declared column is kept as text; the CSV sniffer reads the
/// whole file so a column whose values vary late in the file cannot be
/// silently mistyped.
pub fn load_raw_tables(warehouse: &Warehouse, raw_dir: &Path, sources: &[SourceFile]) -> Result<()> {
    for source in sources {
        let file_path = raw_dir.join(&source.file_name);
        let quoted_file = quote_path(&file_path);
        warehouse.execute_batch(&format!(
            "CREATE OR REPLACE TABLE raw.{table} AS
             SELECT *
             FROM read_csv_auto(
                 '{quoted_file}',
                 header = true,
                 all_varchar = true,
                 sample_size = -1
             );",
            table = source.table_name,
        ))?;
        info!(table = %source.table_name, file = %source.file_name, "loaded raw table");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn sources(names: &[(&str, &str)]) -> Vec<SourceFile> {
        names
            .iter()
            .map(|(file_name, table_name)| SourceFile {
                file_name: file_name.to_string(),
                table_name: table_name.to_string(),
            })
            .collect()
    }

    #[test]
    fn missing_files_are_aggregated_into_one_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("present.csv"), "a,b\n1,2\n").unwrap();

        let result = ensure_required_files(
            dir.path(),
            &sources(&[
                ("present.csv", "present"),
                ("gone.csv", "gone"),
                ("also_gone.csv", "also_gone"),
            ]),
        );

        match result {
            Err(WarehouseError::MissingInputs { missing, .. }) => {
                assert_eq!(missing, vec!["gone.csv", "also_gone.csv"]);
            }
            other => panic!("expected MissingInputs, got {other:?}"),
        }
    }

    #[test]
    fn load_is_reentrant_and_keeps_columns_as_text() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("orders.csv"), "order_id,amount\no1,10\no2,x\n").unwrap();

        let wh = Warehouse::open_in_memory().unwrap();
        wh.ensure_schemas().unwrap();
        let srcs = sources(&[("orders.csv", "orders")]);

        load_raw_tables(&wh, dir.path(), &srcs).unwrap();
        load_raw_tables(&wh, dir.path(), &srcs).unwrap();
        assert_eq!(wh.count("raw.orders").unwrap(), 2);

        // `amount` holds both "10" and "x" and must survive as text.
        let amount: String = wh
            .connection()
            .query_row(
                "SELECT amount FROM raw.orders WHERE order_id = 'o2'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(amount, "x");
    }
}
