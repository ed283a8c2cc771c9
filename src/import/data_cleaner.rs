// ==========================================
// 车队管理后台核心 - 数据清洗器实现
// ==========================================
// 职责: TRIM / UPPER / NULL 标准化 / 日期、数值、标记解析
// 说明: 导入文件来源多样（手工 Excel、系统导出 CSV），
//       日期与数值格式需兼容多种写法
// ==========================================

use crate::import::import_trait::DataCleaner as DataCleanerTrait;
use chrono::NaiveDate;

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        // Excel 日期单元格可能带时间部分
        let date_part = value.split([' ', 'T']).next().unwrap_or(value);

        NaiveDate::parse_from_str(date_part, "%Y%m%d")
            .or_else(|_| NaiveDate::parse_from_str(date_part, "%Y-%m-%d"))
            .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
            .ok()
    }

    fn parse_flag(&self, value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "1" | "y" | "yes" | "true" | "是" | "oui" => Some(true),
            "0" | "n" | "no" | "false" | "否" | "non" => Some(false),
            _ => None,
        }
    }

    fn parse_number(&self, value: &str) -> Option<f64> {
        let compact: String = value.trim().chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            return None;
        }
        if let Ok(n) = compact.parse::<f64>() {
            return Some(n).filter(|n| n.is_finite());
        }
        // 1,234.5 → 千分位；12,5 → 小数逗号
        let normalized = if compact.contains('.') {
            compact.replace(',', "")
        } else {
            compact.replace(',', ".")
        };
        normalized.parse::<f64>().ok().filter(|n| n.is_finite())
    }
}

impl DataCleaner {
    /// 清洗编码类字段（车牌、证件号等: TRIM + UPPER，空 → None）
    pub fn clean_code(&self, value: Option<String>) -> Option<String> {
        self.normalize_null(value.map(|v| self.clean_text(&v, true)))
    }

    /// 清洗电话号码（去除空格与分隔符，保留前导 +）
    pub fn clean_phone(&self, value: &str) -> String {
        let trimmed = value.trim();
        let mut cleaned = String::with_capacity(trimmed.len());
        for (idx, c) in trimmed.chars().enumerate() {
            if c.is_ascii_digit() || (idx == 0 && c == '+') {
                cleaned.push(c);
            }
        }
        cleaned
    }
}
