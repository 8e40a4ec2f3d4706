use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_EXTRA_ABILISTS_DIR: &str = "/extra_abilists";
pub const DEFAULT_LLVM_PROJECT_DIR: &str = "/llvm-project";
pub const DEFAULT_RULE_LIST: &str = "/tmp/angora_track_abilist.txt";
pub const DEFAULT_FUZZING_ENGINE_LINK: &str = "/usr/lib/libFuzzingEngine.a";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub paths: PathsConfig,
    pub fuzzer: FuzzerConfig,
    /// Benchmark name -> allow/deny-list files, merged over the built-in table.
    pub abilists: BTreeMap<String, Vec<PathBuf>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub extra_abilists_dir: PathBuf,
    pub llvm_project_dir: PathBuf,
    pub rule_list: PathBuf,
    /// 預設為 `$SRC/build.sh`
    pub build_script: Option<PathBuf>,
    /// 空字串代表不建立 libFuzzingEngine.a 連結
    pub fuzzing_engine_link: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            extra_abilists_dir: PathBuf::from(DEFAULT_EXTRA_ABILISTS_DIR),
            llvm_project_dir: PathBuf::from(DEFAULT_LLVM_PROJECT_DIR),
            rule_list: PathBuf::from(DEFAULT_RULE_LIST),
            build_script: None,
            fuzzing_engine_link: PathBuf::from(DEFAULT_FUZZING_ENGINE_LINK),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzerConfig {
    pub executable: String,
    pub memory_limit: u64,
    pub mode: String,
    /// Relative to `$OUT`; holds the fuzzer's `bin/` and `lib/`.
    pub prefix_dir: PathBuf,
    pub log_level: String,
}

impl Default for FuzzerConfig {
    fn default() -> Self {
        Self {
            executable: "fuzzer".to_string(),
            memory_limit: 2048,
            mode: "llvm".to_string(),
            prefix_dir: PathBuf::from("fuzzer_prefix"),
            log_level: "warn".to_string(),
        }
    }
}

impl AdapterConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdapterError::ConfigParseError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SRC})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdapterError::ConfigParseError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn fuzzing_engine_link(&self) -> Option<&Path> {
        let link = self.paths.fuzzing_engine_link.as_path();
        if link.as_os_str().is_empty() {
            None
        } else {
            Some(link)
        }
    }

    pub fn build_script(&self, src: &Path) -> PathBuf {
        self.paths
            .build_script
            .clone()
            .unwrap_or_else(|| src.join("build.sh"))
    }
}

impl Validate for AdapterConfig {
    fn validate(&self) -> Result<()> {
        validate_path("paths.extra_abilists_dir", &self.paths.extra_abilists_dir)?;
        validate_path("paths.llvm_project_dir", &self.paths.llvm_project_dir)?;
        validate_path("paths.rule_list", &self.paths.rule_list)?;
        if let Some(script) = &self.paths.build_script {
            validate_path("paths.build_script", script)?;
        }

        validate_non_empty_string("fuzzer.executable", &self.fuzzer.executable)?;
        validate_non_empty_string("fuzzer.mode", &self.fuzzer.mode)?;
        validate_positive_number("fuzzer.memory_limit", self.fuzzer.memory_limit, 1)?;
        validate_path("fuzzer.prefix_dir", &self.fuzzer.prefix_dir)?;

        for (benchmark, lists) in &self.abilists {
            validate_non_empty_string("abilists", benchmark)?;
            for list in lists {
                validate_path(&format!("abilists.{}", benchmark), list)?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AdapterConfig::from_toml_str("").unwrap();

        assert_eq!(config.paths.extra_abilists_dir, PathBuf::from("/extra_abilists"));
        assert_eq!(config.paths.llvm_project_dir, PathBuf::from("/llvm-project"));
        assert_eq!(config.fuzzer.executable, "fuzzer");
        assert_eq!(config.fuzzer.memory_limit, 2048);
        assert_eq!(config.fuzzer.mode, "llvm");
        assert!(config.abilists.is_empty());
        assert_eq!(
            config.fuzzing_engine_link(),
            Some(Path::new("/usr/lib/libFuzzingEngine.a"))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_overrides() {
        let toml_content = r#"
[paths]
llvm_project_dir = "/opt/llvm"
build_script = "/src/custom_build.sh"
fuzzing_engine_link = ""

[fuzzer]
memory_limit = 4096

[abilists]
"libpng-1.2.56" = ["libz_abilist.txt", "/abs/extra.txt"]
"#;

        let config = AdapterConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.paths.llvm_project_dir, PathBuf::from("/opt/llvm"));
        assert_eq!(
            config.build_script(Path::new("/src")),
            PathBuf::from("/src/custom_build.sh")
        );
        assert_eq!(config.fuzzing_engine_link(), None);
        assert_eq!(config.fuzzer.memory_limit, 4096);
        assert_eq!(config.fuzzer.mode, "llvm");
        assert_eq!(config.abilists["libpng-1.2.56"].len(), 2);
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("ANGORA_FUZZBENCH_TEST_LLVM", "/from/env");

        let toml_content = r#"
[paths]
llvm_project_dir = "${ANGORA_FUZZBENCH_TEST_LLVM}"
"#;

        let config = AdapterConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.paths.llvm_project_dir, PathBuf::from("/from/env"));

        std::env::remove_var("ANGORA_FUZZBENCH_TEST_LLVM");
    }

    #[test]
    fn test_config_validation() {
        let config = AdapterConfig::from_toml_str("[fuzzer]\nmemory_limit = 0\n").unwrap();
        assert!(config.validate().is_err());

        let config = AdapterConfig::from_toml_str("[fuzzer]\nexecutable = \" \"\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml() {
        let result = AdapterConfig::from_toml_str("[fuzzer\nmemory_limit = 1");
        assert!(matches!(result, Err(AdapterError::ConfigParseError { .. })));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[fuzzer]\nexecutable = \"angora_fuzzer\"\n")
            .unwrap();

        let config = AdapterConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.fuzzer.executable, "angora_fuzzer");
    }
}
