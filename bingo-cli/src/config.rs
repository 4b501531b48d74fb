use anyhow::Context;
use bingo_core::GameConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.json";
const DATABASE_FILE: &str = "bingo.db";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    /// Channel new games are announced in when `--channel` is not given.
    pub default_channel: String,
    pub verbose: bool,
    pub game: GameConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            default_channel: "general".to_string(),
            verbose: false,
            game: GameConfig::default(),
        }
    }
}

pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("chat-bingo")
}

impl CliConfig {
    /// Read `config_path`, falling back to defaults when the file is absent.
    /// The data directory always comes from the command line.
    pub async fn load(data_dir: &Path, config_path: &Path) -> anyhow::Result<Self> {
        let mut config = if tokio::fs::try_exists(config_path).await? {
            let content = tokio::fs::read_to_string(config_path)
                .await
                .with_context(|| format!("Failed to read {}", config_path.display()))?;
            serde_json::from_str::<CliConfig>(&content)
                .with_context(|| format!("Invalid config file {}", config_path.display()))?
        } else {
            CliConfig::default()
        };

        config.data_dir = data_dir.to_path_buf();
        config.game.validate()?;
        Ok(config)
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
