// Judge configuration: config/judge.json plus environment overrides
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_CONFIG_PATH: &str = "config/judge.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JudgeConfig {
    /// Java compiler used for submissions
    #[serde(default = "default_javac")]
    pub javac_path: String,
    /// JVM launcher used for introspection and execution
    #[serde(default = "default_java")]
    pub java_path: String,
    #[serde(default = "default_jvm_args")]
    pub jvm_args: Vec<String>,
    #[serde(default = "default_compile_timeout_ms")]
    pub compile_timeout_ms: u64,
    /// Base deadline for one test case; strategies scale it
    #[serde(default = "default_test_timeout_ms")]
    pub test_timeout_ms: u64,
    #[serde(default = "default_max_source_chars")]
    pub max_source_chars: usize,
    #[serde(default = "default_max_parallel_tests")]
    pub max_parallel_tests: usize,
    /// Parent directory for per-compilation workspaces (system temp dir if unset)
    #[serde(default)]
    pub work_dir: Option<PathBuf>,
}

fn default_javac() -> String {
    "javac".to_string()
}

fn default_java() -> String {
    "java".to_string()
}

fn default_jvm_args() -> Vec<String> {
    vec![
        "-Xmx256m".to_string(),
        "-Xss8m".to_string(),
        "-XX:+UseSerialGC".to_string(),
        "-XX:TieredStopAtLevel=1".to_string(),
    ]
}

fn default_compile_timeout_ms() -> u64 {
    15_000
}

fn default_test_timeout_ms() -> u64 {
    2_000
}

fn default_max_source_chars() -> usize {
    50_000
}

fn default_max_parallel_tests() -> usize {
    1
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            javac_path: default_javac(),
            java_path: default_java(),
            jvm_args: default_jvm_args(),
            compile_timeout_ms: default_compile_timeout_ms(),
            test_timeout_ms: default_test_timeout_ms(),
            max_source_chars: default_max_source_chars(),
            max_parallel_tests: default_max_parallel_tests(),
            work_dir: None,
        }
    }
}

impl JudgeConfig {
    /// Load configuration from a JSON file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Judge config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config: JudgeConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validated()
    }

    /// Load config/judge.json when present, defaults otherwise, then apply
    /// environment overrides
    pub fn load_default() -> Result<Self> {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        let config = if path.exists() {
            Self::load(path)?
        } else {
            Self::default()
        };
        config.with_env_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `ARBITER_*` overrides read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(javac) = lookup("ARBITER_JAVAC") {
            self.javac_path = javac;
        }
        if let Some(java) = lookup("ARBITER_JAVA") {
            self.java_path = java;
        }
        if let Some(timeout) = lookup("ARBITER_TEST_TIMEOUT_MS") {
            self.test_timeout_ms = timeout
                .parse()
                .with_context(|| format!("Invalid ARBITER_TEST_TIMEOUT_MS: {}", timeout))?;
        }
        if let Some(parallel) = lookup("ARBITER_MAX_PARALLEL_TESTS") {
            self.max_parallel_tests = parallel
                .parse()
                .with_context(|| format!("Invalid ARBITER_MAX_PARALLEL_TESTS: {}", parallel))?;
        }
        if let Some(dir) = lookup("ARBITER_WORK_DIR") {
            self.work_dir = Some(PathBuf::from(dir));
        }
        self.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.test_timeout_ms == 0 {
            bail!("test_timeout_ms must be greater than zero");
        }
        if self.compile_timeout_ms == 0 {
            bail!("compile_timeout_ms must be greater than zero");
        }
        if self.max_parallel_tests == 0 {
            bail!("max_parallel_tests must be at least 1");
        }
        Ok(self)
    }

    pub fn test_timeout(&self) -> Duration {
        Duration::from_millis(self.test_timeout_ms)
    }

    pub fn compile_timeout(&self) -> Duration {
        Duration::from_millis(self.compile_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: JudgeConfig = serde_json::from_str(r#"{"test_timeout_ms": 3000}"#).unwrap();
        assert_eq!(config.test_timeout_ms, 3000);
        assert_eq!(config.max_source_chars, 50_000);
        assert_eq!(config.javac_path, "javac");
        assert_eq!(config.max_parallel_tests, 1);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("ARBITER_JAVA", "/opt/jdk/bin/java"),
            ("ARBITER_TEST_TIMEOUT_MS", "500"),
            ("ARBITER_MAX_PARALLEL_TESTS", "4"),
        ]
        .into_iter()
        .collect();

        let config = JudgeConfig::default()
            .with_env_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.java_path, "/opt/jdk/bin/java");
        assert_eq!(config.test_timeout(), Duration::from_millis(500));
        assert_eq!(config.max_parallel_tests, 4);
        assert_eq!(config.javac_path, "javac");
    }

    #[test]
    fn test_invalid_override_is_rejected() {
        let result = JudgeConfig::default().with_env_overrides(|key| {
            (key == "ARBITER_MAX_PARALLEL_TESTS").then(|| "0".to_string())
        });
        assert!(result.is_err());

        let result = JudgeConfig::default().with_env_overrides(|key| {
            (key == "ARBITER_TEST_TIMEOUT_MS").then(|| "soon".to_string())
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        assert!(JudgeConfig::load(Path::new("does/not/exist.json")).is_err());
    }
}
