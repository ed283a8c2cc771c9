// ==========================================
// 车队管理后台核心 - 导入管道 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 阶段: 文件解析 → 列映射 → 清洗/转换 → 去重 → 预览
// ==========================================

use crate::import::error::ImportResult;
use crate::import::file_parser::ParsedSheet;
use chrono::NaiveDate;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 将上传文件的字节内容解析为表头 + 原始行
    ///
    /// # 参数
    /// - bytes: 完整文件内容
    ///
    /// # 返回
    /// - Ok(ParsedSheet): 规范化后的表头与非空行
    /// - Err: 编码错误、格式错误
    fn parse_bytes(&self, bytes: &[u8]) -> ImportResult<ParsedSheet>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗接口
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 清洗文本字段（TRIM，可选 UPPER）
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// 标准化 NULL 值（空字符串/空白 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 解析日期
    ///
    /// # 支持格式
    /// - YYYYMMDD
    /// - YYYY-MM-DD
    /// - DD/MM/YYYY
    fn parse_date(&self, value: &str) -> Option<NaiveDate>;

    /// 解析布尔标记（1/0、Y/N、yes/no、true/false、是/否、oui/non）
    fn parse_flag(&self, value: &str) -> Option<bool>;

    /// 解析数值（允许千分位逗号与小数逗号）
    fn parse_number(&self, value: &str) -> Option<f64>;
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 同一文件内的唯一键冲突检测
// 实现者: ConflictHandler
pub trait ConflictHandler: Send + Sync {
    /// 检测重复键
    ///
    /// # 参数
    /// - keys: (行号, 唯一键) 列表，按文件顺序
    ///
    /// # 返回
    /// - Vec<(usize, String)>: 重复记录（不包括第一次出现）
    fn detect_duplicates(&self, keys: &[(usize, String)]) -> Vec<(usize, String)>;
}
