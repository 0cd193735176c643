use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::StageFile;
use crate::error::{Result, WarehouseError};
use crate::warehouse::Warehouse;

/// A self-contained transformation unit. The runner depends only on this
/// interface and never on the content of any unit.
pub trait TransformStage {
    fn name(&self) -> &str;
    fn position(&self) -> u32;
    fn apply(&self, warehouse: &Warehouse) -> Result<()>;
}

/// A transformation unit backed by a SQL file executed as one batch.
pub struct SqlFileStage {
    position: u32,
    name: String,
    path: PathBuf,
}

impl SqlFileStage {
    pub fn new(position: u32, name: impl Into<String>, path: PathBuf) -> Self {
        Self {
            position,
            name: name.into(),
            path,
        }
    }
}

impl TransformStage for SqlFileStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> u32 {
        self.position
    }

    fn apply(&self, warehouse: &Warehouse) -> Result<()> {
        let sql = fs::read_to_string(&self.path)?;
        warehouse
            .execute_batch(&sql)
            .map_err(|source| WarehouseError::StageFailed {
                name: self.name.clone(),
                source,
            })
    }
}

/// Resolves the registry's stage files against a SQL directory. Every file
/// must exist before any stage executes; the first missing file fails the
/// whole run up front.
pub fn sql_stages(sql_dir: &Path, stages: &[StageFile]) -> Result<Vec<Box<dyn TransformStage>>> {
    let mut resolved: Vec<Box<dyn TransformStage>> = Vec::with_capacity(stages.len());
    for stage in stages {
        let path = sql_dir.join(&stage.file_name);
        if !path.exists() {
            return Err(WarehouseError::MissingStageFile(path));
        }
        resolved.push(Box::new(SqlFileStage::new(
            stage.position,
            stage.name.clone(),
            path,
        )));
    }
    Ok(resolved)
}

/// Executes stages strictly in position order against the live warehouse
/// state. Ordering is the correctness mechanism: staging before dimensions
/// before facts before views before quality checks. The first failing stage
/// aborts the run; the partially-built warehouse is left in place for
/// inspection but is never exported.
pub struct StageRunner {
    stages: Vec<Box<dyn TransformStage>>,
}

impl StageRunner {
    pub fn new(mut stages: Vec<Box<dyn TransformStage>>) -> Self {
        stages.sort_by_key(|stage| stage.position());
        Self { stages }
    }

    pub fn run(&self, warehouse: &Warehouse) -> Result<()> {
        for stage in &self.stages {
            stage.apply(warehouse)?;
            info!(stage = %stage.name(), position = stage.position(), "executed stage");
        }
        Ok(())
    }
}
