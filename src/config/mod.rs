pub mod toml_config;

pub use toml_config::AdapterConfig;

#[cfg(feature = "cli")]
use crate::domain::model::EngineKind;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "angora-fuzzbench")]
#[command(about = "Build and run adapters for Angora-based fuzzers in FuzzBench")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Show what would be executed without touching the filesystem
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Build every instrumentation variant of the benchmark
    Build {
        #[arg(short, long, value_enum, default_value_t)]
        engine: EngineKind,
    },
    /// Launch the fuzzer against previously built variants
    Fuzz {
        #[arg(short, long, value_enum, default_value_t)]
        engine: EngineKind,

        #[arg(long)]
        input_corpus: PathBuf,

        #[arg(long)]
        output_corpus: PathBuf,

        /// Unsuffixed fuzz target path; variant binaries are looked up next to it
        #[arg(long)]
        target_binary: PathBuf,
    },
    /// Print fuzzer statistics as JSON
    Stats {
        #[arg(short, long, value_enum, default_value_t)]
        engine: EngineKind,

        #[arg(long)]
        output_corpus: PathBuf,

        #[arg(long)]
        fuzzer_log: Option<PathBuf>,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    pub fn engine(&self) -> EngineKind {
        match &self.command {
            Command::Build { engine } | Command::Fuzz { engine, .. } | Command::Stats { engine, .. } => {
                *engine
            }
        }
    }

    /// 載入配置檔；未指定時使用內建預設值
    pub fn load_adapter_config(&self) -> crate::utils::error::Result<AdapterConfig> {
        match &self.config {
            Some(path) => AdapterConfig::from_file(path),
            None => Ok(AdapterConfig::default()),
        }
    }
}
