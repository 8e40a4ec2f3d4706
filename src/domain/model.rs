use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// 編譯器工具鏈產生的插樁版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    AngoraFast,
    AngoraTrack,
    SnapshotPlacement,
    DfsanSnapshot,
    XraySnapshot,
}

impl Variant {
    pub fn cc(&self) -> &'static str {
        match self {
            Variant::AngoraFast | Variant::AngoraTrack => "angora-clang",
            Variant::SnapshotPlacement => "clang_snapshot_placement",
            Variant::DfsanSnapshot => "clang_dfsan_snapshot",
            Variant::XraySnapshot => "clang_xray_snapshot",
        }
    }

    pub fn cxx(&self) -> &'static str {
        match self {
            Variant::AngoraFast | Variant::AngoraTrack => "angora-clang++",
            Variant::SnapshotPlacement => "clang_snapshot_placement++",
            Variant::DfsanSnapshot => "clang_dfsan_snapshot++",
            Variant::XraySnapshot => "clang_xray_snapshot++",
        }
    }

    /// Standalone fuzz target driver archive, relative to the LLVM project directory.
    pub fn fuzzer_lib(&self) -> &'static str {
        match self {
            Variant::AngoraFast => "libStandaloneFuzzTargetAngoraFast.a",
            Variant::AngoraTrack => "libStandaloneFuzzTargetAngoraTrack.a",
            Variant::SnapshotPlacement => "libStandaloneFuzzTargetSnapshotPlacement.a",
            Variant::DfsanSnapshot => "libStandaloneFuzzTargetDFSanSnapshot.a",
            Variant::XraySnapshot => "libStandaloneFuzzTargetXRaySnapshot.a",
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Variant::AngoraFast => "_angora_fast",
            Variant::AngoraTrack => "_angora_track",
            Variant::SnapshotPlacement => "_snapshot_placement",
            Variant::DfsanSnapshot => "_dfsan_snapshot",
            Variant::XraySnapshot => "_xray_snapshot",
        }
    }

    /// 傳給 fuzzer 的參數名稱；fast 版本是主要目標，放在 `--` 之後
    pub fn fuzzer_flag(&self) -> Option<&'static str> {
        match self {
            Variant::AngoraFast => None,
            Variant::AngoraTrack => Some("--track"),
            Variant::SnapshotPlacement => Some("--snapshot-placement"),
            Variant::DfsanSnapshot => Some("--dfsan-snapshot"),
            Variant::XraySnapshot => Some("--xray-snapshot"),
        }
    }

    /// Whether the allow/deny lists of the benchmark go into CFLAGS/CXXFLAGS.
    pub fn uses_blacklist_flags(&self) -> bool {
        matches!(self, Variant::SnapshotPlacement | Variant::DfsanSnapshot)
    }

    pub fn extra_env(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            Variant::AngoraFast => &[("USE_FAST", "true"), ("ANGORA_DISABLE_SANITIZERS", "true")],
            Variant::AngoraTrack => &[("USE_TRACK", "true")],
            _ => &[],
        }
    }

    pub fn binary_name(&self, fuzz_target: &str) -> String {
        format!("{}{}", fuzz_target, self.suffix())
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Variant::AngoraFast => "Angora fast",
            Variant::AngoraTrack => "Angora track",
            Variant::SnapshotPlacement => "SnapshotPlacement",
            Variant::DfsanSnapshot => "DFSanSnapshot",
            Variant::XraySnapshot => "XRaySnapshot",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum EngineKind {
    #[default]
    Angora,
    #[cfg_attr(feature = "cli", value(alias("snappy_no_exit")))]
    Snapshot,
}

/// 一次外部程式呼叫：程式、參數與完整的子行程環境
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new(program: impl Into<String>, env: BTreeMap<String, String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env,
            current_dir: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// `--dry-run` 時顯示的單一版本建置計畫
#[derive(Debug, Clone)]
pub struct PlannedBuild {
    pub variant: Variant,
    /// Variables that differ from the inherited environment.
    pub overrides: BTreeMap<String, String>,
    pub invocation: Invocation,
    pub artifact: PathBuf,
}

/// Statistics republished to the benchmarking harness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchStats {
    pub execs_per_sec: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_names() {
        assert_eq!(Variant::AngoraFast.binary_name("xml"), "xml_angora_fast");
        assert_eq!(Variant::DfsanSnapshot.binary_name("xml"), "xml_dfsan_snapshot");
    }

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new("fuzzer", BTreeMap::new())
            .arg("--mode=llvm")
            .args(["--", "/out/target_angora_fast", "@@"]);
        assert_eq!(
            invocation.to_string(),
            "fuzzer --mode=llvm -- /out/target_angora_fast @@"
        );
    }
}
