//! Command handlers - extracted from main.rs for testability
//!
//! Each handler module contains:
//! - The execution logic for a CLI command
//! - Pure helper functions
//! - Tests

pub mod health;
pub mod prompt;
pub mod run;

pub use health::execute_health;
pub use prompt::execute_prompt;
pub use run::{build_bench_config, execute_run, resolve_tests};

use crate::commands::TargetArgs;
use crate::error::CliResult;
use inferbench::BenchConfig;

/// Configuration file, if any, with endpoint flags applied on top.
pub fn load_target_config(target: &TargetArgs) -> CliResult<BenchConfig> {
    let mut config = match &target.config {
        Some(path) => BenchConfig::from_yaml_file(path)?,
        None => BenchConfig::default(),
    };
    if let Some(url) = &target.url {
        config.target.base_url.clone_from(url);
    }
    if let Some(model) = &target.model {
        config.target.model.clone_from(model);
    }
    if let Some(timeout) = target.timeout {
        config.http.timeout_secs = timeout;
    }
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.yaml");
        std::fs::write(
            &path,
            "target:\n  base_url: http://file:8000\n  model: from-file\nhttp:\n  timeout_secs: 30\n",
        )
        .unwrap();

        let target = TargetArgs {
            url: None,
            model: Some("from-flag".to_string()),
            config: Some(path),
            timeout: Some(5),
        };
        let config = load_target_config(&target).unwrap();
        assert_eq!(config.target.base_url, "http://file:8000");
        assert_eq!(config.target.model, "from-flag");
        assert_eq!(config.http.timeout_secs, 5);
    }

    #[test]
    fn test_defaults_without_file() {
        let config = load_target_config(&TargetArgs::default()).unwrap();
        assert_eq!(config.target.base_url, "http://localhost:8000");
    }

    #[test]
    fn test_missing_file_is_error() {
        let target = TargetArgs {
            config: Some("/definitely/not/here.yaml".into()),
            ..TargetArgs::default()
        };
        assert!(load_target_config(&target).is_err());
    }
}
