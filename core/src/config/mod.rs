use crate::agent::{DEFAULT_MAX_TOKENS, MAX_TOOL_ROUNDS};
use crate::providers::DEFAULT_MODEL;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const TYMORA_DIR: &str = ".tymora";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub max_tokens: u32,
    pub max_tool_rounds: usize,
    pub character: Option<String>,
    #[serde(skip)]
    pub workspace_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_tool_rounds: MAX_TOOL_ROUNDS,
            character: None,
            workspace_dir: get_tymora_dir(),
        }
    }
}

impl Config {
    pub fn load_or_init() -> Result<Self> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn party_path(&self) -> PathBuf {
        self.workspace_dir.join("party.toml")
    }

    pub fn history_path(&self) -> PathBuf {
        self.workspace_dir.join("history.txt")
    }
}

pub fn get_tymora_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(TYMORA_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_tymora_dir().join("config.toml")
}

pub fn ensure_tymora_dir() -> Result<PathBuf> {
    let tymora_dir = get_tymora_dir();

    if !tymora_dir.exists() {
        std::fs::create_dir_all(&tymora_dir).with_context(|| {
            format!(
                "Failed to create tymora directory at {}",
                tymora_dir.display()
            )
        })?;
    }

    Ok(tymora_dir)
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found. Run 'tymora onboard' to set up your configuration."
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

    config.workspace_dir = get_tymora_dir();

    Ok(config)
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_tymora_dir()?;

    let config_path = get_config_path();
    let content =
        toml::to_string_pretty(config).with_context(|| "Failed to serialize config to TOML")?;

    std::fs::write(&config_path, content)
        .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

    Ok(())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}
