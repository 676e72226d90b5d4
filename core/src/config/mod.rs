use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const REBO_DIR: &str = ".rebo";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub max_urls: usize,
    pub fetch_timeout_secs: u64,
    pub min_content_chars: usize,
    pub brave_api_key: Option<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_urls: 8,
            fetch_timeout_secs: 12,
            min_content_chars: 50,
            brave_api_key: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MemoryBackend {
    #[default]
    Json,
    Memory,
    Supabase,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MemoryConfig {
    pub backend: MemoryBackend,
    /// File for the json backend. Relative paths resolve against the
    /// workspace directory.
    pub path: PathBuf,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
    pub table: String,
    pub default_category: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            backend: MemoryBackend::Json,
            path: PathBuf::from("facts.json"),
            supabase_url: None,
            supabase_key: None,
            table: "memory".to_string(),
            default_category: "general".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    pub coinmarketcap_api_key: Option<String>,
    pub vs_currency: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            coinmarketcap_api_key: None,
            vs_currency: "usd".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunnerKind {
    #[default]
    Piston,
    Local,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CodeConfig {
    pub runner: RunnerKind,
    pub piston_url: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            runner: RunnerKind::Piston,
            piston_url: "https://emkc.org/api/v2/piston".to_string(),
            language: "python".to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClockConfig {
    pub utc_offset_hours: i32,
    pub zone_label: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: -4,
            zone_label: "Eastern Time".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: Option<String>,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub search: SearchConfig,
    pub memory: MemoryConfig,
    pub market: MarketConfig,
    pub code: CodeConfig,
    pub clock: ClockConfig,
    #[serde(skip)]
    pub workspace_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            provider: None,
            api_key: String::new(),
            base_url: None,
            model: "gpt-3.5-turbo".to_string(),
            temperature: 1.0,
            search: SearchConfig::default(),
            memory: MemoryConfig::default(),
            market: MarketConfig::default(),
            code: CodeConfig::default(),
            clock: ClockConfig::default(),
            workspace_dir: get_rebo_dir().join("workspace"),
        }
    }
}

pub fn get_rebo_dir() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(REBO_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_rebo_dir().join("config.toml")
}

pub fn ensure_rebo_dir() -> Result<PathBuf> {
    let rebo_dir = get_rebo_dir();

    if !rebo_dir.exists() {
        std::fs::create_dir_all(&rebo_dir).with_context(|| {
            format!("Failed to create rebo directory at {}", rebo_dir.display())
        })?;
    }

    Ok(rebo_dir)
}

impl Config {
    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.workspace_dir = get_rebo_dir().join("workspace");
        Ok(config)
    }

    pub fn memory_path(&self) -> PathBuf {
        if self.memory.path.is_absolute() {
            self.memory.path.clone()
        } else {
            self.workspace_dir.join(&self.memory.path)
        }
    }
}

pub fn load_config() -> Result<Config> {
    let config_path = get_config_path();

    let content = std::fs::read_to_string(&config_path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::anyhow!(
                "Config file not found. Run 'rebo onboard' to set up your configuration."
            )
        } else {
            anyhow::anyhow!("Failed to read config from {}: {}", config_path.display(), e)
        }
    })?;

    Config::from_toml(&content)
        .with_context(|| format!("Failed to parse config from {}", config_path.display()))
}

pub fn save_config(config: &Config) -> Result<()> {
    ensure_rebo_dir()?;

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

/// First non-empty value among the environment variables, then the
/// configured value.
pub fn resolve_secret(env_vars: &[&str], configured: Option<&str>) -> Option<String> {
    env_vars
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .or_else(|| {
            configured
                .filter(|value| !value.trim().is_empty())
                .map(str::to_string)
        })
}
