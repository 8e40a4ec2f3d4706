pub mod abilists;
pub mod build_env;
pub mod builder;
pub mod context;
pub mod executor;
pub mod restore;
pub mod runner;
pub mod stats;

pub use crate::domain::model::{BenchStats, Invocation, PlannedBuild, Variant};
pub use crate::domain::ports::{Executor, FuzzerEngine};
pub use crate::utils::error::Result;
