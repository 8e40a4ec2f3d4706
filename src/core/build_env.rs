use crate::utils::error::{AdapterError, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// An owned copy of a process environment that can be edited before it is
/// handed to a child process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildEnv {
    vars: BTreeMap<String, String>,
}

impl BuildEnv {
    /// 複製目前行程的環境變數
    pub fn from_process() -> Self {
        Self::from_os_vars(std::env::vars_os())
    }

    /// Non UTF-8 variables cannot be passed on to children and are dropped
    /// with a warning.
    pub fn from_os_vars<I>(vars: I) -> Self
    where
        I: IntoIterator<Item = (OsString, OsString)>,
    {
        let mut env = Self::default();
        for (key, value) in vars {
            match (key.into_string(), value.into_string()) {
                (Ok(key), Ok(value)) => env.set(key, value),
                (key, _) => {
                    let name = match key {
                        Ok(key) => key,
                        Err(key) => key.to_string_lossy().into_owned(),
                    };
                    tracing::warn!("⚠️ Skipping non UTF-8 environment variable {}", name);
                }
            }
        }
        env
    }

    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(key.into(), value.into());
    }

    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key).ok_or_else(|| AdapterError::MissingEnvError {
            name: key.to_string(),
        })
    }

    pub fn require_path(&self, key: &str) -> Result<PathBuf> {
        self.require(key).map(PathBuf::from)
    }

    /// Appends `flags` to a space separated variable such as `CFLAGS`.
    pub fn append_flags(&mut self, key: &str, flags: &[String]) {
        let mut all_flags: Vec<String> = match self.get(key) {
            Some(value) if !value.is_empty() => value.split(' ').map(str::to_string).collect(),
            _ => Vec::new(),
        };
        all_flags.extend(flags.iter().cloned());
        self.set(key, all_flags.join(" "));
    }

    /// Appends a directory to a `:` separated search path.
    pub fn append_path(&mut self, key: &str, dir: &str) {
        let value = match self.get(key) {
            Some(existing) => format!("{}:{}", existing, dir),
            None => format!(":{}", dir),
        };
        self.set(key, value);
    }

    /// 與另一個環境比較，回傳新增或變更的變數
    pub fn diff(&self, base: &BuildEnv) -> BTreeMap<String, String> {
        self.vars
            .iter()
            .filter(|(key, value)| base.vars.get(*key) != Some(*value))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    pub fn into_vars(self) -> BTreeMap<String, String> {
        self.vars
    }
}
