// ==========================================
// 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 默认只输出本库 info 级别日志，依赖库仅 warn 以上
// 宿主应用已有 subscriber 时改用 init_json 或直接跳过初始化
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 默认过滤规则
const DEFAULT_FILTER: &str = "warn,fleet_dashboard=info";

/// 测试过滤规则（导入向导和表格的 debug 事件）
const TEST_FILTER: &str = "warn,fleet_dashboard=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// 初始化日志系统（文本格式）
///
/// # 环境变量
/// - RUST_LOG: 覆盖默认过滤规则
///   例如: RUST_LOG=fleet_dashboard::import::wizard=debug 查看映射与转换过程，
///   RUST_LOG=fleet_dashboard::optimistic=trace 查看乐观更新的回滚
///
/// # 示例
/// ```no_run
/// use fleet_dashboard::logging;
/// use fleet_dashboard::resource::{build_import_wizard, Bus};
/// use fleet_dashboard::DashboardConfig;
///
/// logging::init();
/// let config = DashboardConfig::default();
/// let _wizard = build_import_wizard::<Bus>(&config);
/// ```
pub fn init() {
    fmt()
        .with_env_filter(env_filter())
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化 JSON 格式日志
///
/// 每个事件带当前 span（如 `parse{file=..}`），便于宿主按导入文件聚合；
/// 返回 false 表示已有全局 subscriber，本次调用无效果
pub fn init_json() -> bool {
    fmt()
        .json()
        .with_env_filter(env_filter())
        .with_current_span(true)
        .try_init()
        .is_ok()
}

/// 初始化测试环境的日志系统（输出由测试框架捕获，可重复调用）
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(TEST_FILTER))
        .with_test_writer()
        .try_init();
}
