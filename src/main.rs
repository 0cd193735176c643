use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::error;

use olist_warehouse::config::PipelineConfig;
use olist_warehouse::pipeline::{run_build, BuildOptions};
use olist_warehouse::validator::validate_warehouse;

#[derive(Parser)]
#[command(name = "olist_warehouse")]
#[command(about = "Build and validate the Olist analytical warehouse")]
#[command(version = "0.1.0")]
struct Cli {
    /// Optional TOML override for the pipeline registry
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the warehouse from raw extracts and export mart artifacts
    Build {
        /// Directory containing the Olist CSV extract files
        #[arg(long, default_value = "data/raw")]
        raw_dir: PathBuf,
        /// Output DuckDB warehouse file path
        #[arg(long, default_value = "data/warehouse/olist.duckdb")]
        db_path: PathBuf,
        /// Output directory for exported artifacts (parquet + csv)
        #[arg(long, default_value = "data/exports")]
        export_dir: PathBuf,
        /// Directory containing the SQL transformation stage files
        #[arg(long, default_value = "sql")]
        sql_dir: PathBuf,
        /// Do not fail the run even if quality checks fail
        #[arg(long)]
        allow_quality_failures: bool,
    },
    /// Validate an already-built warehouse
    Validate {
        /// DuckDB warehouse file created by a build run
        #[arg(long, default_value = "data/warehouse/olist.duckdb")]
        db_path: PathBuf,
    },
}

fn load_config(path: Option<&PathBuf>) -> olist_warehouse::Result<PipelineConfig> {
    match path {
        Some(path) => PipelineConfig::load(path),
        None => Ok(PipelineConfig::default()),
    }
}

fn main() -> ExitCode {
    olist_warehouse::logging::init_logging();

    let cli = Cli::parse();
    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            error!("failed to load pipeline config: {e}");
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let result = match cli.command {
        Commands::Build {
            raw_dir,
            db_path,
            export_dir,
            sql_dir,
            allow_quality_failures,
        } => {
            let options = BuildOptions {
                raw_dir,
                db_path,
                export_dir,
                sql_dir,
                allow_quality_failures,
            };
            run_build(&options, &config).map(|summary| {
                println!("warehouse build complete; model row counts:");
                for (model, rows) in &summary.model_rows {
                    println!(" - {model}: {rows}");
                }
            })
        }
        Commands::Validate { db_path } => validate_warehouse(&db_path, &config)
            .and_then(|report| report.ensure_sound())
            .map(|()| println!("warehouse validation successful")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
