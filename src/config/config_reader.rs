// ==========================================
// 车队管理后台核心 - 配置读取接口
// ==========================================
// 职责: 定义数据表与导入向导所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use std::time::Duration;

// ==========================================
// ConfigReader Trait
// ==========================================
// 用途: 组件构造时读取可调参数
// 实现者: DashboardConfig（内存）, ConfigManager（文件 + 环境变量）
pub trait ConfigReader: Send + Sync {
    // ===== 数据表配置 =====

    /// 可选的每页行数
    ///
    /// # 默认值
    /// - [10, 20, 50, 100]
    fn page_size_options(&self) -> Vec<usize>;

    /// 默认每页行数（必须属于 page_size_options）
    ///
    /// # 默认值
    /// - 10
    fn default_page_size(&self) -> usize;

    /// 搜索输入防抖时长
    ///
    /// # 默认值
    /// - 180ms
    fn search_debounce(&self) -> Duration;

    // ===== 导入配置 =====

    /// 预览步骤最多显示的行数
    ///
    /// # 默认值
    /// - 50
    fn preview_limit(&self) -> usize;

    /// 可接受的文件扩展名（小写，不含点）
    ///
    /// # 默认值
    /// - ["csv", "xlsx", "xls"]
    fn accepted_extensions(&self) -> Vec<String>;

    /// 上传文件大小上限（字节）
    ///
    /// # 默认值
    /// - 10 MiB
    fn max_file_bytes(&self) -> u64;
}
