use crate::core::build_env::BuildEnv;
use crate::core::context::AdapterContext;
use crate::core::restore::with_restored;
use crate::domain::model::{Invocation, PlannedBuild, Variant};
use crate::domain::ports::Executor;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::require_dir;
use std::fs;
use std::path::PathBuf;

pub const PLACEHOLDER_CONTENT: &str = "Just a placeholder to make FuzzBench happy\n";

/// Builds one benchmark binary per instrumentation variant.
pub struct VariantBuilder<'a, E: Executor> {
    ctx: &'a AdapterContext<E>,
}

impl<'a, E: Executor> VariantBuilder<'a, E> {
    pub fn new(ctx: &'a AdapterContext<E>) -> Self {
        Self { ctx }
    }

    /// 工具鏈映像檔必須提供 abilists 與 LLVM 專案目錄
    pub fn check_prerequisites(&self) -> Result<()> {
        require_dir(&self.ctx.config.paths.extra_abilists_dir)?;
        require_dir(&self.ctx.config.paths.llvm_project_dir)?;
        Ok(())
    }

    /// Compiler environment for `variant`, derived from the inherited one.
    pub fn variant_env(&self, variant: Variant) -> Result<BuildEnv> {
        let mut env = self.ctx.env.clone();

        env.set("CC", variant.cc());
        env.set("CXX", variant.cxx());
        for (key, value) in variant.extra_env() {
            env.set(*key, *value);
        }

        if variant == Variant::AngoraTrack {
            env.set(
                "ANGORA_TAINT_RULE_LIST",
                self.ctx.config.paths.rule_list.display().to_string(),
            );
        }

        if variant.uses_blacklist_flags() {
            let flags = self.ctx.abilists.blacklist_args(self.ctx.benchmark()?);
            // build.sh 不使用 LDFLAGS，只能透過 CFLAGS 與 CXXFLAGS 傳入
            env.append_flags("CFLAGS", &flags);
            env.append_flags("CXXFLAGS", &flags);
        }

        let fuzzer_lib = self.ctx.config.paths.llvm_project_dir.join(variant.fuzzer_lib());
        env.set("FUZZER_LIB", fuzzer_lib.display().to_string());

        Ok(env)
    }

    /// The build script call for an already prepared environment.
    pub fn build_invocation(&self, mut env: BuildEnv) -> Result<Invocation> {
        let fuzzer_lib = env.require("FUZZER_LIB")?.to_string();
        env.set("LIB_FUZZING_ENGINE", fuzzer_lib);

        let src = env.require_path("SRC")?;
        let script = self.ctx.config.build_script(&src);

        Ok(Invocation::new("/bin/bash", env.into_vars())
            .arg("-ex")
            .arg(script.display().to_string())
            .current_dir(src))
    }

    /// Runs the benchmark's build script with `env`.
    pub async fn build_benchmark(&self, env: BuildEnv) -> Result<()> {
        let fuzzer_lib = PathBuf::from(env.require("FUZZER_LIB")?);
        if let Some(link) = self.ctx.config.fuzzing_engine_link() {
            // 讓使用 -lFuzzingEngine 的 OSS-Fuzz 專案也能連結
            if fuzzer_lib.is_file() {
                fs::copy(&fuzzer_lib, link)?;
            }
        }

        tracing::info!(
            "Building benchmark {} with {}",
            self.ctx.env.get("BENCHMARK").unwrap_or("<unknown>"),
            fuzzer_lib.display()
        );

        let invocation = self.build_invocation(env)?;
        self.ctx.executor.run(&invocation).await
    }

    /// Builds `variant` and moves the result to its suffixed name.
    pub async fn build_variant(&self, variant: Variant) -> Result<PathBuf> {
        tracing::info!("🔨 Building with {} instrumentation", variant);

        if variant == Variant::AngoraTrack {
            self.ctx
                .abilists
                .write_rule_list(self.ctx.benchmark()?, &self.ctx.config.paths.rule_list)?;
        }

        let env = self.variant_env(variant)?;
        let src = self.ctx.env.require_path("SRC")?;
        let work = self.ctx.env.require_path("WORK")?;

        // 同一份原始碼要建置多次，所以每次都還原 SRC 與 WORK
        with_restored(&[src.as_path(), work.as_path()], || self.build_benchmark(env)).await?;

        let produced = self.ctx.target_path()?;
        let artifact = self.artifact_path(variant)?;
        if !produced.is_file() {
            return Err(AdapterError::MissingFileError { path: produced });
        }
        fs::rename(&produced, &artifact)?;

        tracing::info!("✅ {} binary: {}", variant, artifact.display());
        Ok(artifact)
    }

    pub fn artifact_path(&self, variant: Variant) -> Result<PathBuf> {
        Ok(self
            .ctx
            .out_dir()?
            .join(variant.binary_name(self.ctx.fuzz_target()?)))
    }

    pub fn plan(&self, variant: Variant) -> Result<PlannedBuild> {
        let env = self.variant_env(variant)?;
        let invocation = self.build_invocation(env.clone())?;
        Ok(PlannedBuild {
            variant,
            overrides: env.diff(&self.ctx.env),
            invocation,
            artifact: self.artifact_path(variant)?,
        })
    }

    /// The harness expects a file at `$OUT/$FUZZ_TARGET`.
    pub fn write_placeholder(&self) -> Result<()> {
        let path = self.ctx.target_path()?;
        fs::write(&path, PLACEHOLDER_CONTENT)?;
        tracing::debug!("Wrote placeholder {}", path.display());
        Ok(())
    }

    pub fn remove_placeholder(&self) -> Result<()> {
        let path = self.ctx.target_path()?;
        fs::remove_file(&path)?;
        tracing::debug!("Removed placeholder {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdapterConfig;
    use crate::core::executor::ProcessExecutor;

    fn context(benchmark: &str) -> AdapterContext<ProcessExecutor> {
        let env = BuildEnv::from_vars([
            ("SRC", "/src"),
            ("WORK", "/work"),
            ("OUT", "/out"),
            ("BENCHMARK", benchmark),
            ("FUZZ_TARGET", "fuzz_target"),
            ("CFLAGS", "-O1"),
        ]);
        AdapterContext::new(AdapterConfig::default(), env, ProcessExecutor::new())
    }

    #[test]
    fn test_fast_variant_env() {
        let ctx = context("libpng-1.2.56");
        let env = VariantBuilder::new(&ctx).variant_env(Variant::AngoraFast).unwrap();

        assert_eq!(env.get("CC"), Some("angora-clang"));
        assert_eq!(env.get("CXX"), Some("angora-clang++"));
        assert_eq!(env.get("USE_FAST"), Some("true"));
        assert_eq!(env.get("ANGORA_DISABLE_SANITIZERS"), Some("true"));
        assert_eq!(env.get("USE_TRACK"), None);
        assert_eq!(
            env.get("FUZZER_LIB"),
            Some("/llvm-project/libStandaloneFuzzTargetAngoraFast.a")
        );
        assert_eq!(env.get("CFLAGS"), Some("-O1"));
    }

    #[test]
    fn test_track_variant_env() {
        let ctx = context("libpng-1.2.56");
        let env = VariantBuilder::new(&ctx).variant_env(Variant::AngoraTrack).unwrap();

        assert_eq!(env.get("USE_TRACK"), Some("true"));
        assert_eq!(env.get("USE_FAST"), None);
        assert_eq!(env.get("ANGORA_DISABLE_SANITIZERS"), None);
        assert_eq!(
            env.get("ANGORA_TAINT_RULE_LIST"),
            Some("/tmp/angora_track_abilist.txt")
        );
    }

    #[test]
    fn test_blacklist_variants_extend_cflags() {
        let ctx = context("libxslt_xpath");
        let builder = VariantBuilder::new(&ctx);

        for variant in [Variant::SnapshotPlacement, Variant::DfsanSnapshot] {
            let env = builder.variant_env(variant).unwrap();
            assert_eq!(
                env.get("CFLAGS"),
                Some("-O1 -fsanitize-blacklist=/extra_abilists/libgcrypt_abilist.txt")
            );
            assert_eq!(
                env.get("CXXFLAGS"),
                Some("-fsanitize-blacklist=/extra_abilists/libgcrypt_abilist.txt")
            );
        }

        let env = builder.variant_env(Variant::XraySnapshot).unwrap();
        assert_eq!(env.get("CC"), Some("clang_xray_snapshot"));
        assert_eq!(env.get("CFLAGS"), Some("-O1"));
        assert_eq!(env.get("CXXFLAGS"), None);
    }

    #[test]
    fn test_build_invocation() {
        let ctx = context("libpng-1.2.56");
        let builder = VariantBuilder::new(&ctx);
        let env = builder.variant_env(Variant::DfsanSnapshot).unwrap();
        let invocation = builder.build_invocation(env).unwrap();

        assert_eq!(invocation.program, "/bin/bash");
        assert_eq!(invocation.args, vec!["-ex", "/src/build.sh"]);
        assert_eq!(invocation.current_dir, Some(PathBuf::from("/src")));
        assert_eq!(
            invocation.env.get("LIB_FUZZING_ENGINE").map(String::as_str),
            Some("/llvm-project/libStandaloneFuzzTargetDFSanSnapshot.a")
        );
    }

    #[test]
    fn test_plan_reports_only_overrides() {
        let ctx = context("systemd_fuzz-varlink");
        let plan = VariantBuilder::new(&ctx).plan(Variant::XraySnapshot).unwrap();

        assert_eq!(plan.artifact, PathBuf::from("/out/fuzz_target_xray_snapshot"));
        assert!(plan.overrides.contains_key("CC"));
        assert!(plan.overrides.contains_key("FUZZER_LIB"));
        assert!(!plan.overrides.contains_key("SRC"));
    }

    #[test]
    fn test_missing_benchmark_env() {
        let env = BuildEnv::from_vars([("SRC", "/src"), ("OUT", "/out")]);
        let ctx = AdapterContext::new(AdapterConfig::default(), env, ProcessExecutor::new());
        let result = VariantBuilder::new(&ctx).variant_env(Variant::SnapshotPlacement);

        assert!(matches!(result, Err(AdapterError::MissingEnvError { name }) if name == "BENCHMARK"));
    }
}
