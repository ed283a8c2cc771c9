// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use fleet_dashboard::config::ConfigReader;
use std::time::Duration;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub page_size_options: Vec<usize>,
    pub default_page_size: usize,
    pub search_debounce_ms: u64,
    pub preview_limit: usize,
    pub accepted_extensions: Vec<String>,
    pub max_file_bytes: u64,
}

impl MockConfig {
    /// 创建默认配置
    pub fn default() -> Self {
        Self {
            page_size_options: vec![10, 20, 50, 100],
            default_page_size: 10,
            search_debounce_ms: 180,
            preview_limit: 50,
            accepted_extensions: vec!["csv".to_string(), "xlsx".to_string(), "xls".to_string()],
            max_file_bytes: 10 * 1024 * 1024,
        }
    }

    /// 小分页配置（便于构造多页数据）
    pub fn small_pages() -> Self {
        let mut config = Self::default();
        config.page_size_options = vec![2, 5];
        config.default_page_size = 2;
        config
    }

    /// 小预览配置
    pub fn with_preview_limit(limit: usize) -> Self {
        let mut config = Self::default();
        config.preview_limit = limit;
        config
    }
}

impl ConfigReader for MockConfig {
    fn page_size_options(&self) -> Vec<usize> {
        self.page_size_options.clone()
    }

    fn default_page_size(&self) -> usize {
        self.default_page_size
    }

    fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    fn preview_limit(&self) -> usize {
        self.preview_limit
    }

    fn accepted_extensions(&self) -> Vec<String> {
        self.accepted_extensions.clone()
    }

    fn max_file_bytes(&self) -> u64 {
        self.max_file_bytes
    }
}
