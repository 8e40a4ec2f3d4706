pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::engines::{create_engine, AngoraEngine, SnapshotEngine};
pub use config::AdapterConfig;
pub use crate::core::{build_env::BuildEnv, context::AdapterContext, executor::ProcessExecutor};
pub use domain::model::{EngineKind, Variant};
pub use domain::ports::{Executor, FuzzerEngine};
pub use utils::error::{AdapterError, Result};
