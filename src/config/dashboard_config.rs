// ==========================================
// 车队管理后台核心 - 配置结构
// ==========================================
// 职责: 配置项定义、默认值、合法性校验
// ==========================================

use crate::config::config_manager::ConfigError;
use crate::config::config_reader::ConfigReader;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 数据表配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// 可选的每页行数
    pub page_size_options: Vec<usize>,

    /// 默认每页行数
    pub default_page_size: usize,

    /// 搜索防抖（毫秒）
    pub search_debounce_ms: u64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            page_size_options: vec![10, 20, 50, 100],
            default_page_size: 10,
            search_debounce_ms: 180,
        }
    }
}

/// 导入向导配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// 预览步骤最多显示的行数
    pub preview_limit: usize,

    /// 可接受的文件扩展名
    pub accepted_extensions: Vec<String>,

    /// 文件大小上限（字节）
    pub max_file_bytes: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            preview_limit: 50,
            accepted_extensions: vec!["csv".to_string(), "xlsx".to_string(), "xls".to_string()],
            max_file_bytes: 10 * 1024 * 1024,
        }
    }
}

/// 完整配置
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub table: TableSettings,
    pub import: ImportSettings,
}

impl DashboardConfig {
    /// 校验配置合法性
    ///
    /// # 规则
    /// - page_size_options 非空且每项 > 0
    /// - default_page_size 必须属于 page_size_options
    /// - preview_limit > 0
    /// - accepted_extensions 非空
    pub fn validate(&self) -> Result<(), ConfigError> {
        let table = &self.table;
        if table.page_size_options.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "table.page_size_options".to_string(),
                message: "不能为空".to_string(),
            });
        }
        if table.page_size_options.iter().any(|&size| size == 0) {
            return Err(ConfigError::InvalidValue {
                key: "table.page_size_options".to_string(),
                message: "每页行数必须大于 0".to_string(),
            });
        }
        if !table.page_size_options.contains(&table.default_page_size) {
            return Err(ConfigError::InvalidValue {
                key: "table.default_page_size".to_string(),
                message: format!(
                    "{} 不在可选项 {:?} 中",
                    table.default_page_size, table.page_size_options
                ),
            });
        }
        if self.import.preview_limit == 0 {
            return Err(ConfigError::InvalidValue {
                key: "import.preview_limit".to_string(),
                message: "必须大于 0".to_string(),
            });
        }
        if self.import.accepted_extensions.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "import.accepted_extensions".to_string(),
                message: "不能为空".to_string(),
            });
        }
        Ok(())
    }
}

impl ConfigReader for DashboardConfig {
    fn page_size_options(&self) -> Vec<usize> {
        self.table.page_size_options.clone()
    }

    fn default_page_size(&self) -> usize {
        self.table.default_page_size
    }

    fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.table.search_debounce_ms)
    }

    fn preview_limit(&self) -> usize {
        self.import.preview_limit
    }

    fn accepted_extensions(&self) -> Vec<String> {
        self.import
            .accepted_extensions
            .iter()
            .map(|ext| ext.trim().trim_start_matches('.').to_lowercase())
            .collect()
    }

    fn max_file_bytes(&self) -> u64 {
        self.import.max_file_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = DashboardConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search_debounce(), Duration::from_millis(180));
        assert_eq!(config.preview_limit(), 50);
    }

    #[test]
    fn test_default_page_size_must_be_an_option() {
        let mut config = DashboardConfig::default();
        config.table.default_page_size = 15;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("table.default_page_size"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DashboardConfig =
            serde_json::from_str(r#"{"table": {"search_debounce_ms": 300}}"#).unwrap();
        assert_eq!(config.table.search_debounce_ms, 300);
        assert_eq!(config.table.default_page_size, 10);
        assert_eq!(config.import, ImportSettings::default());
    }

    #[test]
    fn test_extensions_are_normalized() {
        let mut config = DashboardConfig::default();
        config.import.accepted_extensions = vec![".CSV".to_string(), " xlsx ".to_string()];
        assert_eq!(config.accepted_extensions(), vec!["csv", "xlsx"]);
    }
}
