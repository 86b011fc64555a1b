use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use estimator_core::generation::client::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use estimator_core::generation::GeneratorConfig;

#[derive(Debug, Serialize, Deserialize)]
pub struct EstimatorConfig {
    pub database: DatabaseSection,
    pub user: Option<UserSection>,
    #[serde(default)]
    pub ai: AiSection,
    #[serde(default)]
    pub files: FilesSection,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseSection {
    pub path: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserSection {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AiSection {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_seconds: u64,
}

impl Default for AiSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Where attached files are served from.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct FilesSection {
    /// Prefix joined onto relative storage paths to form fetchable URLs
    pub base_url: Option<String>,
}

impl AiSection {
    /// Build a generator config, reading the key from `api_key_env`.
    pub fn generator_config(&self) -> anyhow::Result<GeneratorConfig> {
        let api_key = std::env::var(&self.api_key_env).unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "API key not configured\nHint: Set {} to your API key.",
                self.api_key_env
            ));
        }
        Ok(GeneratorConfig {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key,
            timeout: Duration::from_secs(self.timeout_seconds),
        })
    }
}

impl EstimatorConfig {
    pub fn new(database_path: PathBuf, user: UserSection) -> Self {
        Self {
            database: DatabaseSection {
                path: database_path.to_string_lossy().to_string(),
            },
            user: Some(user),
            ai: AiSection::default(),
            files: FilesSection::default(),
        }
    }
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_config_dir()?.join("config.toml"))
}

pub fn default_database_path() -> anyhow::Result<PathBuf> {
    Ok(xdg_data_dir()?.join("estimator.db"))
}

pub fn read_config(path: &Path) -> anyhow::Result<EstimatorConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config {}: {}", path.display(), e))?;
    toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Failed to parse config {}: {}", path.display(), e))
}

pub fn write_config(path: &Path, config: &EstimatorConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            anyhow::anyhow!(
                "Failed to create config directory {}: {}",
                parent.display(),
                e
            )
        })?;
    }
    let contents =
        toml::to_string_pretty(config).map_err(|e| anyhow::anyhow!("TOML error: {}", e))?;
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write config {}: {}", path.display(), e))?;
    Ok(())
}

pub fn xdg_config_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_CONFIG_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("estimator"));
        }
    }
    Ok(home_dir()?.join(".config").join("estimator"))
}

pub fn xdg_data_dir() -> anyhow::Result<PathBuf> {
    if let Ok(value) = std::env::var("XDG_DATA_HOME") {
        if !value.trim().is_empty() {
            return Ok(PathBuf::from(value).join("estimator"));
        }
    }
    Ok(home_dir()?.join(".local").join("share").join("estimator"))
}

fn home_dir() -> anyhow::Result<PathBuf> {
    let home = std::env::var("HOME")
        .map_err(|_| anyhow::anyhow!("HOME is not set; cannot resolve default paths"))?;
    Ok(PathBuf::from(home))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_section_defaults_when_missing() {
        let config: EstimatorConfig = toml::from_str(
            r#"
[database]
path = "/tmp/estimator.db"
"#,
        )
        .expect("parse should succeed");
        assert!(config.user.is_none());
        assert_eq!(config.ai.model, DEFAULT_MODEL);
        assert_eq!(config.ai.api_key_env, "OPENAI_API_KEY");
        assert_eq!(config.ai.timeout_seconds, DEFAULT_TIMEOUT_SECS);
        assert!(config.files.base_url.is_none());
    }

    #[test]
    fn test_partial_ai_section_keeps_other_defaults() {
        let config: EstimatorConfig = toml::from_str(
            r#"
[database]
path = "/tmp/estimator.db"

[ai]
model = "gpt-4o-mini"
"#,
        )
        .expect("parse should succeed");
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_files_section_base_url() {
        let config: EstimatorConfig = toml::from_str(
            r#"
[database]
path = "/tmp/estimator.db"

[files]
base_url = "https://files.example.com/project-files"
"#,
        )
        .expect("parse should succeed");
        assert_eq!(
            config.files.base_url.as_deref(),
            Some("https://files.example.com/project-files")
        );
    }

    #[test]
    fn test_config_round_trip() {
        let user = UserSection {
            id: Uuid::new_v4(),
            email: "pm@example.com".to_string(),
        };
        let config = EstimatorConfig::new(PathBuf::from("/tmp/e.db"), user.clone());
        let text = toml::to_string_pretty(&config).expect("serialize should succeed");
        let parsed: EstimatorConfig = toml::from_str(&text).expect("parse should succeed");
        assert_eq!(parsed.database.path, "/tmp/e.db");
        assert_eq!(parsed.user.map(|u| u.id), Some(user.id));
    }
}
