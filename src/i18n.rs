// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库，文案位于 locales/{zh-CN,en}.yml
// 键按调用方分组: table.* (数据表)、import.* (导入向导)、resource.* (资源页)
// 缺失的键原样返回，测试中逐一校验
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

/// 支持的语言
pub const SUPPORTED_LOCALES: &[&str] = &["zh-CN", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（不支持的语言回退到 zh-CN）
pub fn set_locale(locale: &str) {
    if SUPPORTED_LOCALES.contains(&locale) {
        rust_i18n::set_locale(locale);
    } else {
        tracing::warn!(locale, "不支持的语言，使用 zh-CN");
        rust_i18n::set_locale("zh-CN");
    }
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use fleet_dashboard::i18n;
/// // 数据表无匹配行时的空状态文案
/// let empty = i18n::t("table.no_results");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数，占位符格式为 `%{name}`）
///
/// # 示例
/// ```no_run
/// use fleet_dashboard::i18n;
/// use fleet_dashboard::ImportError;
///
/// let err = ImportError::UnknownHeader("immatriculation".into());
/// // 等价于 i18n::t_with_args("import.unknown_header", &[("header", "immatriculation")])
/// let notice = err.user_message();
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 翻译消息（单个 `%{count}` 参数，如删除确认、导入成功提示）
pub fn t_count(key: &str, count: usize) -> String {
    t_with_args(key, &[("count", &count.to_string())])
}
