use crate::app::engines::angora::AngoraEngine;
use crate::core::context::AdapterContext;
use crate::domain::model::{Invocation, PlannedBuild, Variant};
use crate::domain::ports::{Executor, FuzzerEngine};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// Built on top of the Angora variants.
pub const SNAPSHOT_ONLY_VARIANTS: &[Variant] = &[
    Variant::SnapshotPlacement,
    Variant::DfsanSnapshot,
    Variant::XraySnapshot,
];

pub const SNAPSHOT_VARIANTS: &[Variant] = &[
    Variant::AngoraFast,
    Variant::AngoraTrack,
    Variant::SnapshotPlacement,
    Variant::DfsanSnapshot,
    Variant::XraySnapshot,
];

/// Angora 加上 snapshot 執行的版本，重用 Angora 的建置與統計
pub struct SnapshotEngine<E: Executor> {
    angora: AngoraEngine<E>,
}

impl<E: Executor> SnapshotEngine<E> {
    pub fn new(ctx: AdapterContext<E>) -> Self {
        Self {
            angora: AngoraEngine::new(ctx),
        }
    }
}

#[async_trait]
impl<E: Executor> FuzzerEngine for SnapshotEngine<E> {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn variants(&self) -> &'static [Variant] {
        SNAPSHOT_VARIANTS
    }

    async fn build(&self) -> Result<()> {
        self.angora.build().await?;

        let builder = self.angora.builder();
        builder.remove_placeholder()?;

        for variant in SNAPSHOT_ONLY_VARIANTS {
            builder.build_variant(*variant).await?;
        }

        builder.write_placeholder()
    }

    async fn fuzz(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
    ) -> Result<()> {
        self.angora
            .runner()
            .fuzz(input_corpus, output_corpus, target_binary, SNAPSHOT_VARIANTS)
            .await
    }

    fn get_stats(&self, output_corpus: &Path, fuzzer_log: Option<&Path>) -> Result<String> {
        self.angora.get_stats(output_corpus, fuzzer_log)
    }

    fn plan_build(&self) -> Result<Vec<PlannedBuild>> {
        self.angora.plan_variants(SNAPSHOT_VARIANTS)
    }

    fn plan_fuzz(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
    ) -> Result<Invocation> {
        self.angora
            .plan_fuzz_with(input_corpus, output_corpus, target_binary, SNAPSHOT_VARIANTS)
    }
}
