// ==========================================
// 车队管理后台核心 - 配置层
// ==========================================
// 职责: 数据表/导入向导的可调参数（分页、防抖、预览上限、文件限制）
// 存储: JSON 文件 + 环境变量覆写，缺省时使用内置默认值
// ==========================================

pub mod config_manager;
pub mod config_reader;
pub mod dashboard_config;

// 重导出核心配置类型
pub use config_manager::{config_env, ConfigError, ConfigManager};
pub use config_reader::ConfigReader;
pub use dashboard_config::{DashboardConfig, ImportSettings, TableSettings};
