use crate::config::AdapterConfig;
use crate::core::abilists::AbilistTable;
use crate::core::build_env::BuildEnv;
use crate::domain::ports::Executor;
use crate::utils::error::Result;
use std::path::PathBuf;

/// Everything an engine needs: configuration, the inherited environment and
/// the way child processes get run.
pub struct AdapterContext<E: Executor> {
    pub config: AdapterConfig,
    pub env: BuildEnv,
    pub executor: E,
    pub abilists: AbilistTable,
}

impl<E: Executor> AdapterContext<E> {
    pub fn new(config: AdapterConfig, env: BuildEnv, executor: E) -> Self {
        let abilists = AbilistTable::from_config(&config);
        Self {
            config,
            env,
            executor,
            abilists,
        }
    }

    pub fn out_dir(&self) -> Result<PathBuf> {
        self.env.require_path("OUT")
    }

    pub fn fuzz_target(&self) -> Result<&str> {
        self.env.require("FUZZ_TARGET")
    }

    pub fn benchmark(&self) -> Result<&str> {
        self.env.require("BENCHMARK")
    }

    /// `$OUT/$FUZZ_TARGET`，也就是建置腳本的產出位置
    pub fn target_path(&self) -> Result<PathBuf> {
        Ok(self.out_dir()?.join(self.fuzz_target()?))
    }
}
