use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::board::ColumnDeletePolicy;
use crate::error::ConfigError;

const MAX_AUTOSAVE_DELAY_MS: u64 = 600_000;

/// 应用配置，从 TOML 加载，所有字段都有默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 数据目录，缺省为 ~/.local/share/corkboard/
    pub data_dir: Option<PathBuf>,
    /// 最后一次改动后多久自动保存，0 表示关闭
    pub autosave_delay_ms: u64,
    pub on_column_delete: ColumnDeletePolicy,
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            autosave_delay_ms: 1500,
            on_column_delete: ColumnDeletePolicy::ToPool,
            log_filter: "info".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 文件不存在时使用默认配置
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_filter.trim().is_empty() {
            return Err(ConfigError::Validation("log_filter 不能为空".into()));
        }
        if self.autosave_delay_ms > MAX_AUTOSAVE_DELAY_MS {
            return Err(ConfigError::Validation(format!(
                "autosave_delay_ms 不能超过 {MAX_AUTOSAVE_DELAY_MS}"
            )));
        }
        Ok(())
    }

    pub fn autosave_delay(&self) -> Option<Duration> {
        (self.autosave_delay_ms > 0).then(|| Duration::from_millis(self.autosave_delay_ms))
    }
}

/// 配置文件路径 (~/.config/corkboard/config.toml)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("corkboard").join("config.toml"))
}
