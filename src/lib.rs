// ==========================================
// 车队管理后台核心 - 核心库
// ==========================================
// 定位: 无界面的通用数据表 + 表格导入管道
// 使用方: 车辆、人员、员工、预订等资源页
// 说明: 核心不访问网络，持久化全部回调给资源页
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 数据表层 - 搜索/筛选/排序/分页/选择
pub mod table;

// 导入层 - 文件解析与列映射向导
pub mod import;

// 乐观更新
pub mod optimistic;

// 资源页层 - 业务资源绑定
pub mod resource;

// 配置层
pub mod config;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 数据表
pub use table::{
    ColumnDescriptor, DataTable, FilterDescriptor, FilterOption, FilterSelection, RowAction,
    SearchDescriptor, SortDirection, SortValue, TableError, TableView,
};

// 导入
pub use import::{
    FieldDescriptor, ImportError, ImportStep, ImportWizard, MappedRecord, SkipReason,
    UploadedFile,
};

// 乐观更新
pub use optimistic::with_optimistic_update;

// 资源
pub use resource::{Resource, ResourcePage, ResourceService};

// 配置
pub use config::{ConfigManager, ConfigReader, DashboardConfig};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "车队管理后台";
