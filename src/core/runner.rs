use crate::core::build_env::BuildEnv;
use crate::core::context::AdapterContext;
use crate::domain::model::{Invocation, Variant};
use crate::domain::ports::Executor;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{require_dir, require_file};
use std::fs;
use std::path::{Path, PathBuf};

pub const EMPTY_SEED_NAME: &str = "empty";
pub const INPUT_PLACEHOLDER: &str = "@@";

/// Variant binaries found next to the target binary, in variant order.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantBinaries {
    binaries: Vec<(Variant, PathBuf)>,
}

impl VariantBinaries {
    pub fn get(&self, variant: Variant) -> Option<&Path> {
        self.binaries
            .iter()
            .find(|(v, _)| *v == variant)
            .map(|(_, path)| path.as_path())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Variant, &Path)> {
        self.binaries.iter().map(|(v, path)| (*v, path.as_path()))
    }
}

/// Prepares the corpus directories and launches the external fuzzer.
pub struct FuzzRunner<'a, E: Executor> {
    ctx: &'a AdapterContext<E>,
}

impl<'a, E: Executor> FuzzRunner<'a, E> {
    pub fn new(ctx: &'a AdapterContext<E>) -> Self {
        Self { ctx }
    }

    /// Paths of `variants` without checking that they exist.
    pub fn variant_paths(&self, target_binary: &Path, variants: &[Variant]) -> Result<VariantBinaries> {
        let binaries_dir = target_binary.parent().unwrap_or_else(|| Path::new(""));
        let fuzz_target = self.ctx.fuzz_target()?;

        Ok(VariantBinaries {
            binaries: variants
                .iter()
                .map(|variant| (*variant, binaries_dir.join(variant.binary_name(fuzz_target))))
                .collect(),
        })
    }

    pub fn locate_variants(&self, target_binary: &Path, variants: &[Variant]) -> Result<VariantBinaries> {
        let binaries = self.variant_paths(target_binary, variants)?;
        for (_, path) in binaries.iter() {
            require_file(path)?;
        }
        Ok(binaries)
    }

    /// Angora 至少需要一個種子檔
    pub fn ensure_seed(&self, input_corpus: &Path) -> Result<()> {
        require_dir(input_corpus)?;

        if fs::read_dir(input_corpus)?.next().is_none() {
            tracing::warn!(
                "Using empty file as seed, no seeds provided in: {}",
                input_corpus.display()
            );
            fs::File::create(input_corpus.join(EMPTY_SEED_NAME))?;
        }
        Ok(())
    }

    /// The harness creates the output directory, but the fuzzer refuses to
    /// start if it exists.
    pub fn remove_output_dir(&self, output_corpus: &Path) -> Result<()> {
        fs::remove_dir(output_corpus)?;
        Ok(())
    }

    pub fn runtime_env(&self) -> Result<BuildEnv> {
        let prefix = self.ctx.out_dir()?.join(&self.ctx.config.fuzzer.prefix_dir);
        let mut env = self.ctx.env.clone();

        env.append_path("PATH", &prefix.join("bin").display().to_string());
        env.set("LD_LIBRARY_PATH", prefix.join("lib").display().to_string());
        env.set("ANGORA_DISABLE_CPU_BINDING", "true");
        env.set("FUZZBENCH_SKIP_WRAPPER", "1");
        env.set("RUST_BACKTRACE", "1");
        env.set("RUST_LOG", self.ctx.config.fuzzer.log_level.as_str());

        Ok(env)
    }

    pub fn fuzzer_invocation(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        binaries: &VariantBinaries,
    ) -> Result<Invocation> {
        let fuzzer = &self.ctx.config.fuzzer;
        let fuzz_target = self.ctx.fuzz_target()?;
        let primary = binaries
            .get(Variant::AngoraFast)
            .ok_or_else(|| AdapterError::MissingFileError {
                path: PathBuf::from(Variant::AngoraFast.binary_name(fuzz_target)),
            })?;

        let mut invocation = Invocation::new(fuzzer.executable.clone(), self.runtime_env()?.into_vars())
            .arg(format!("--memory_limit={}", fuzzer.memory_limit))
            .arg(format!("--input={}", input_corpus.display()))
            .arg(format!("--output={}", output_corpus.display()))
            .arg(format!("--mode={}", fuzzer.mode));

        for (variant, path) in binaries.iter() {
            if let Some(flag) = variant.fuzzer_flag() {
                invocation = invocation.arg(format!("{}={}", flag, path.display()));
            }
        }

        Ok(invocation.args([
            "--".to_string(),
            primary.display().to_string(),
            INPUT_PLACEHOLDER.to_string(),
        ]))
    }

    pub async fn fuzz(
        &self,
        input_corpus: &Path,
        output_corpus: &Path,
        target_binary: &Path,
        variants: &[Variant],
    ) -> Result<()> {
        let binaries = self.locate_variants(target_binary, variants)?;
        self.ensure_seed(input_corpus)?;
        self.remove_output_dir(output_corpus)?;

        let invocation = self.fuzzer_invocation(input_corpus, output_corpus, &binaries)?;
        tracing::info!("🚀 Starting {}", self.ctx.config.fuzzer.executable);
        self.ctx.executor.run(&invocation).await
    }
}
