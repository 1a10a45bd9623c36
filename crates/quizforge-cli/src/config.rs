//! CLI configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizforge_core::SubscriptionTier;

/// Environment variable that overrides the configured default tier.
pub const TIER_ENV: &str = "QUIZFORGE_TIER";

/// Top-level quizforge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizforgeConfig {
    /// Tier assumed for authors when `--tier` is not given.
    #[serde(default = "default_tier")]
    pub default_tier: SubscriptionTier,
    /// Max concurrent gradings.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Output directory for grading reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_tier() -> SubscriptionTier {
    SubscriptionTier::Free
}
fn default_parallelism() -> usize {
    4
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./quizforge-results")
}

impl Default for QuizforgeConfig {
    fn default() -> Self {
        Self {
            default_tier: default_tier(),
            parallelism: default_parallelism(),
            output_dir: default_output_dir(),
        }
    }
}

impl QuizforgeConfig {
    /// The tier to act as: an explicit flag wins over the configured default.
    pub fn resolve_tier(&self, flag: Option<&str>) -> Result<SubscriptionTier> {
        match flag {
            Some(raw) => raw.parse().map_err(|e: String| anyhow::anyhow!("{}", e)),
            None => Ok(self.default_tier),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order:
/// 1. `quizforge.toml` in the current directory
/// 2. `~/.config/quizforge/config.toml`
///
/// `QUIZFORGE_TIER` overrides `default_tier`.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizforgeConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("quizforge.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<QuizforgeConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => QuizforgeConfig::default(),
    };

    if let Ok(raw) = std::env::var(TIER_ENV) {
        config.default_tier = raw
            .parse()
            .map_err(|e: String| anyhow::anyhow!("{TIER_ENV}: {e}"))?;
    }

    config.output_dir = PathBuf::from(resolve_env_vars(&config.output_dir.to_string_lossy()));

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("quizforge"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZFORGE_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZFORGE_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZFORGE_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("no_close_${brace"), "no_close_${brace");
        std::env::remove_var("_QUIZFORGE_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = QuizforgeConfig::default();
        assert_eq!(config.default_tier, SubscriptionTier::Free);
        assert_eq!(config.parallelism, 4);
    }

    #[test]
    fn parse_config_file() {
        let toml_str = r#"
default_tier = "pro"
parallelism = 8
output_dir = "results"
"#;
        let config: QuizforgeConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_tier, SubscriptionTier::Pro);
        assert_eq!(config.parallelism, 8);
        assert_eq!(config.output_dir, PathBuf::from("results"));
    }

    #[test]
    fn explicit_tier_flag_wins() {
        let config = QuizforgeConfig::default();
        assert_eq!(
            config.resolve_tier(Some("Premium")).unwrap(),
            SubscriptionTier::Premium
        );
        assert_eq!(config.resolve_tier(None).unwrap(), SubscriptionTier::Free);
        assert!(config.resolve_tier(Some("gold")).is_err());
    }

    #[test]
    fn missing_explicit_config_fails() {
        assert!(load_config_from(Some(Path::new("/nonexistent/quizforge.toml"))).is_err());
    }
}
