use crate::domain::model::{Invocation, PlannedBuild, Variant};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Runs external programs: the benchmark build script and the fuzzer itself.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Blocks until the child exits; a non-zero status is an error.
    async fn run(&self, invocation: &Invocation) -> Result<()>;
}

#[async_trait]
pub trait FuzzerEngine: Send + Sync {
    fn name(&self) -> &'static str;

    /// 依建置順序排列
    fn variants(&self) -> &'static [Variant];

    async fn build(&self) -> Result<()>;

    async fn fuzz(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
    ) -> Result<()>;

    fn get_stats(&self, output_corpus: &Path, fuzzer_log: Option<&Path>) -> Result<String>;

    fn plan_build(&self) -> Result<Vec<PlannedBuild>>;

    fn plan_fuzz(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
    ) -> Result<Invocation>;
}
