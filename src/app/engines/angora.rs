use crate::core::builder::VariantBuilder;
use crate::core::context::AdapterContext;
use crate::core::runner::FuzzRunner;
use crate::core::stats;
use crate::domain::model::{Invocation, PlannedBuild, Variant};
use crate::domain::ports::{Executor, FuzzerEngine};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::path::Path;

pub const ANGORA_VARIANTS: &[Variant] = &[Variant::AngoraFast, Variant::AngoraTrack];

pub struct AngoraEngine<E: Executor> {
    ctx: AdapterContext<E>,
}

impl<E: Executor> AngoraEngine<E> {
    pub fn new(ctx: AdapterContext<E>) -> Self {
        Self { ctx }
    }

    pub fn builder(&self) -> VariantBuilder<'_, E> {
        VariantBuilder::new(&self.ctx)
    }

    pub fn runner(&self) -> FuzzRunner<'_, E> {
        FuzzRunner::new(&self.ctx)
    }

    pub(crate) fn plan_variants(&self, variants: &[Variant]) -> Result<Vec<PlannedBuild>> {
        let builder = self.builder();
        variants.iter().map(|variant| builder.plan(*variant)).collect()
    }

    pub(crate) fn plan_fuzz_with(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
        variants: &[Variant],
    ) -> Result<Invocation> {
        let runner = self.runner();
        let binaries = runner.variant_paths(target_binary, variants)?;
        runner.fuzzer_invocation(input_corpus, output_corpus, &binaries)
    }
}

#[async_trait]
impl<E: Executor> FuzzerEngine for AngoraEngine<E> {
    fn name(&self) -> &'static str {
        "angora"
    }

    fn variants(&self) -> &'static [Variant] {
        ANGORA_VARIANTS
    }

    async fn build(&self) -> Result<()> {
        let builder = self.builder();
        builder.check_prerequisites()?;

        for variant in ANGORA_VARIANTS {
            builder.build_variant(*variant).await?;
        }

        tracing::info!("Building placeholder");
        builder.write_placeholder()
    }

    async fn fuzz(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
    ) -> Result<()> {
        self.runner()
            .fuzz(input_corpus, output_corpus, target_binary, ANGORA_VARIANTS)
            .await
    }

    fn get_stats(&self, output_corpus: &Path, fuzzer_log: Option<&Path>) -> Result<String> {
        stats::get_stats(output_corpus, fuzzer_log)
    }

    fn plan_build(&self) -> Result<Vec<PlannedBuild>> {
        self.plan_variants(ANGORA_VARIANTS)
    }

    fn plan_fuzz(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
    ) -> Result<Invocation> {
        self.plan_fuzz_with(input_corpus, output_corpus, target_binary, ANGORA_VARIANTS)
    }
}
