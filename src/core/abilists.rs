use crate::config::AdapterConfig;
use crate::utils::error::Result;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Benchmarks that link libraries the taint tracker must not instrument.
pub const DEFAULT_ABILISTS: &[(&str, &[&str])] = &[
    ("libpng-1.2.56", &["libz_abilist.txt"]),
    ("libhtp_fuzz_htp", &["libz_abilist.txt"]),
    ("libxslt_xpath", &["libgcrypt_abilist.txt"]),
    ("systemd_fuzz-link-parser", &["libmount_abilist.txt"]),
    ("systemd_fuzz-varlink", &["libmount_abilist.txt"]),
];

pub const BLACKLIST_FLAG: &str = "-fsanitize-blacklist=";

/// Benchmark -> allow/deny-list files, resolved against the abilists directory.
#[derive(Debug, Clone)]
pub struct AbilistTable {
    entries: BTreeMap<String, Vec<PathBuf>>,
}

impl AbilistTable {
    pub fn from_config(config: &AdapterConfig) -> Self {
        let dir = &config.paths.extra_abilists_dir;
        let mut entries: BTreeMap<String, Vec<PathBuf>> = DEFAULT_ABILISTS
            .iter()
            .map(|(benchmark, files)| {
                (
                    benchmark.to_string(),
                    files.iter().map(|file| dir.join(file)).collect(),
                )
            })
            .collect();

        // 配置檔中的項目覆蓋內建表格
        for (benchmark, files) in &config.abilists {
            entries.insert(
                benchmark.clone(),
                files.iter().map(|file| dir.join(file)).collect(),
            );
        }

        Self { entries }
    }

    pub fn lists_for(&self, benchmark: &str) -> &[PathBuf] {
        self.entries
            .get(benchmark)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn blacklist_args(&self, benchmark: &str) -> Vec<String> {
        self.lists_for(benchmark)
            .iter()
            .map(|path| format!("{}{}", BLACKLIST_FLAG, path.display()))
            .collect()
    }

    /// Concatenates every list of `benchmark` into `dest`, each one preceded
    /// by a `# <path>` header line.
    pub fn write_rule_list(&self, benchmark: &str, dest: &Path) -> Result<()> {
        let mut rule_list = fs::File::create(dest)?;
        for list in self.lists_for(benchmark) {
            let content = fs::read_to_string(list)?;
            writeln!(rule_list, "# {}", list.display())?;
            rule_list.write_all(content.as_bytes())?;
            writeln!(rule_list)?;
        }
        rule_list.flush()?;

        tracing::debug!(
            "Wrote taint rule list for {} to {}",
            benchmark,
            dest.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_in(dir: &Path) -> AbilistTable {
        let mut config = AdapterConfig::default();
        config.paths.extra_abilists_dir = dir.to_path_buf();
        AbilistTable::from_config(&config)
    }

    #[test]
    fn test_blacklist_args_for_every_mapped_benchmark() {
        let table = table_in(Path::new("/extra_abilists"));

        for (benchmark, files) in DEFAULT_ABILISTS {
            let args = table.blacklist_args(benchmark);
            assert_eq!(args.len(), files.len());
            for (arg, file) in args.iter().zip(files.iter()) {
                assert_eq!(
                    arg,
                    &format!("-fsanitize-blacklist=/extra_abilists/{}", file)
                );
            }
        }
    }

    #[test]
    fn test_blacklist_args_for_unmapped_benchmark() {
        let table = table_in(Path::new("/extra_abilists"));
        assert!(table.blacklist_args("freetype2-2017").is_empty());
        assert!(table.blacklist_args("").is_empty());
    }

    #[test]
    fn test_config_overrides_and_extends_table() {
        let mut config = AdapterConfig::default();
        config.abilists.insert(
            "libpng-1.2.56".to_string(),
            vec![PathBuf::from("a.txt"), PathBuf::from("/abs/b.txt")],
        );
        config
            .abilists
            .insert("bloaty_fuzz_target".to_string(), vec![PathBuf::from("c.txt")]);
        let table = AbilistTable::from_config(&config);

        assert_eq!(
            table.blacklist_args("libpng-1.2.56"),
            vec![
                "-fsanitize-blacklist=/extra_abilists/a.txt".to_string(),
                "-fsanitize-blacklist=/abs/b.txt".to_string(),
            ]
        );
        assert_eq!(table.blacklist_args("bloaty_fuzz_target").len(), 1);
        assert_eq!(table.blacklist_args("libxslt_xpath").len(), 1);
    }

    #[test]
    fn test_write_rule_list() {
        let temp_dir = TempDir::new().unwrap();
        let lists_dir = temp_dir.path();
        fs::write(lists_dir.join("libz_abilist.txt"), "fun:deflate=uninstrumented\n").unwrap();
        let table = table_in(lists_dir);

        let dest = temp_dir.path().join("rules.txt");
        table.write_rule_list("libpng-1.2.56", &dest).unwrap();

        let content = fs::read_to_string(&dest).unwrap();
        let expected = format!(
            "# {}\nfun:deflate=uninstrumented\n\n",
            lists_dir.join("libz_abilist.txt").display()
        );
        assert_eq!(content, expected);
    }

    #[test]
    fn test_write_rule_list_for_unmapped_benchmark_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let table = table_in(temp_dir.path());

        let dest = temp_dir.path().join("rules.txt");
        table.write_rule_list("zlib_zlib_uncompress_fuzzer", &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "");
    }
}
