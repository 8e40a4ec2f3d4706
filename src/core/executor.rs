use crate::domain::model::Invocation;
use crate::domain::ports::Executor;
use crate::utils::error::{AdapterError, Result};
use async_trait::async_trait;
use std::time::Instant;
use tokio::process::Command;

/// Spawns real child processes with inherited stdio.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn run(&self, invocation: &Invocation) -> Result<()> {
        let mut cmd = Command::new(&invocation.program);
        // 子行程只看得到 invocation 指定的環境
        cmd.args(&invocation.args)
            .env_clear()
            .envs(&invocation.env);
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }

        tracing::info!("▶️ Running: {}", invocation);
        let started = Instant::now();

        let status = cmd.status().await.map_err(|source| AdapterError::SpawnError {
            program: invocation.program.clone(),
            source,
        })?;

        tracing::debug!(
            "{} finished in {:?} with {}",
            invocation.program,
            started.elapsed(),
            status
        );

        if status.success() {
            Ok(())
        } else {
            Err(AdapterError::CommandFailedError {
                program: invocation.program.clone(),
                status: status.to_string(),
            })
        }
    }
}
