// ==========================================
// 车队管理后台核心 - 配置管理器
// ==========================================
// 职责: 配置加载、快照、覆写管理
// 存储: JSON 文件（可选）+ 环境变量覆写
// ==========================================

use crate::config::config_reader::ConfigReader;
use crate::config::dashboard_config::DashboardConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// 配置环境变量名
pub mod config_env {
    /// 配置文件路径
    pub const CONFIG_PATH: &str = "FLEET_DASHBOARD_CONFIG";
    /// 搜索防抖（毫秒）
    pub const SEARCH_DEBOUNCE_MS: &str = "FLEET_DASHBOARD_SEARCH_DEBOUNCE_MS";
    /// 预览行数上限
    pub const PREVIEW_LIMIT: &str = "FLEET_DASHBOARD_PREVIEW_LIMIT";
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置值非法 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("配置写入失败: {0}")]
    WriteError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: Option<PathBuf>,
    config: DashboardConfig,
}

impl ConfigManager {
    /// 从指定路径加载配置
    ///
    /// # 说明
    /// - 文件不存在时使用默认值（首次启动）
    /// - 文件存在但格式错误时返回错误，不静默吞掉
    /// - 加载后应用环境变量覆写并校验
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let config = if path.exists() {
            let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            serde_json::from_str::<DashboardConfig>(&raw).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            debug!(path = %path.display(), "配置文件不存在，使用默认配置");
            DashboardConfig::default()
        };

        let mut manager = Self {
            path: Some(path),
            config,
        };
        manager.apply_env_overrides();
        manager.config.validate()?;

        info!(path = ?manager.path, "配置加载完成");
        Ok(manager)
    }

    /// 从默认路径加载配置
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::new(get_default_config_path())
    }

    /// 从内存配置创建（不关联文件，不读取环境变量）
    pub fn from_config(config: DashboardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { path: None, config })
    }

    /// 当前配置
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// 配置文件路径（内存配置返回 None）
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// 修改配置（校验失败时保持原配置不变）
    pub fn update<F>(&mut self, f: F) -> Result<(), ConfigError>
    where
        F: FnOnce(&mut DashboardConfig),
    {
        let mut next = self.config.clone();
        f(&mut next);
        next.validate()?;
        self.config = next;
        Ok(())
    }

    /// 写回配置文件
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| ConfigError::WriteError("内存配置没有关联文件".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let json = serde_json::to_string_pretty(&self.config)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        info!(path = %path.display(), "配置已保存");
        Ok(())
    }

    /// 获取配置快照（JSON格式）
    pub fn get_config_snapshot(&self) -> Result<String, ConfigError> {
        serde_json::to_string(&self.config).map_err(|e| ConfigError::Other(e.into()))
    }

    /// 从配置快照恢复配置
    pub fn restore_config_from_snapshot(&mut self, snapshot_json: &str) -> Result<(), ConfigError> {
        let config: DashboardConfig =
            serde_json::from_str(snapshot_json).map_err(|e| ConfigError::ParseError {
                path: "<snapshot>".to_string(),
                message: e.to_string(),
            })?;
        config.validate()?;
        self.config = config;
        Ok(())
    }

    /// 应用环境变量覆写（非法值忽略并告警）
    fn apply_env_overrides(&mut self) {
        if let Some(ms) = read_env_number::<u64>(config_env::SEARCH_DEBOUNCE_MS) {
            self.config.table.search_debounce_ms = ms;
        }
        if let Some(limit) = read_env_number::<usize>(config_env::PREVIEW_LIMIT) {
            self.config.import.preview_limit = limit;
        }
    }
}

fn read_env_number<N: std::str::FromStr>(key: &str) -> Option<N> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<N>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "环境变量格式错误，已忽略");
            None
        }
    }
}

/// 获取默认配置文件路径
///
/// 优先级: 环境变量 FLEET_DASHBOARD_CONFIG > 用户配置目录 > 当前目录
pub fn get_default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(config_env::CONFIG_PATH) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }

    match dirs::config_dir() {
        Some(dir) => dir.join("fleet-dashboard").join("config.json"),
        None => PathBuf::from("./fleet-dashboard.json"),
    }
}

impl ConfigReader for ConfigManager {
    fn page_size_options(&self) -> Vec<usize> {
        self.config.page_size_options()
    }

    fn default_page_size(&self) -> usize {
        self.config.default_page_size()
    }

    fn search_debounce(&self) -> Duration {
        self.config.search_debounce()
    }

    fn preview_limit(&self) -> usize {
        self.config.preview_limit()
    }

    fn accepted_extensions(&self) -> Vec<String> {
        self.config.accepted_extensions()
    }

    fn max_file_bytes(&self) -> u64 {
        self.config.max_file_bytes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::new(dir.path().join("absent.json")).unwrap();
        assert_eq!(manager.config().table.page_size_options, vec![10, 20, 50, 100]);
    }

    #[test]
    fn test_load_and_save_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut manager = ConfigManager::new(&path).unwrap();
        manager
            .update(|c| {
                c.table.page_size_options = vec![25, 50];
                c.table.default_page_size = 25;
            })
            .unwrap();
        manager.save().unwrap();

        let reloaded = ConfigManager::new(&path).unwrap();
        assert_eq!(reloaded.default_page_size(), 25);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = ConfigManager::new(&path);
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_invalid_update_keeps_previous_config() {
        let mut manager = ConfigManager::from_config(DashboardConfig::default()).unwrap();
        let result = manager.update(|c| c.import.preview_limit = 0);
        assert!(result.is_err());
        assert_eq!(manager.preview_limit(), 50);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut manager = ConfigManager::from_config(DashboardConfig::default()).unwrap();
        let snapshot = manager.get_config_snapshot().unwrap();
        manager.update(|c| c.table.search_debounce_ms = 500).unwrap();

        manager.restore_config_from_snapshot(&snapshot).unwrap();
        assert_eq!(manager.search_debounce(), Duration::from_millis(180));
    }
}
