pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod validator;
pub mod warehouse;

pub use config::PipelineConfig;
pub use error::{Result, WarehouseError};
pub use pipeline::{run_build, BuildOptions};
pub use validator::validate_warehouse;
pub use warehouse::Warehouse;
