// ==========================================
// 车队管理后台核心 - 字段映射器实现
// ==========================================
// 职责: 文件列 → 目标字段映射（自动猜测 + 手工修正）
//       原始行按映射投影为 MappedRecord，供调用方转换
// 匹配规则: 小写、下划线/连字符转空格、合并空白后，
//           表头包含任一候选串即视为匹配；按表头顺序，先到先得
// ==========================================

use crate::import::data_cleaner::DataCleaner;
use crate::import::error::{ImportError, ImportResult};
use crate::import::file_parser::RawRow;
use crate::import::import_trait::DataCleaner as _;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// FieldDescriptor - 目标字段
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    pub key: String,
    pub label: String,
    pub hint: Option<String>,
    pub required: bool,
    /// 额外的匹配别名（参与自动猜测）
    pub aliases: Vec<String>,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            hint: None,
            required: false,
            aliases: Vec::new(),
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// 标准化列名（用于模糊匹配）
pub fn normalize_label(value: &str) -> String {
    value
        .to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

// ==========================================
// ColumnMapping - 字段 → 表头
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    /// 按字段顺序: (字段 key, 映射的表头；None 表示忽略)
    entries: Vec<(String, Option<String>)>,
}

impl ColumnMapping {
    /// 所有字段均未映射
    pub fn empty(fields: &[FieldDescriptor]) -> Self {
        Self {
            entries: fields.iter().map(|f| (f.key.clone(), None)).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, header)| header.as_deref())
    }

    /// 修改映射（字段不存在时返回 false）
    pub fn set(&mut self, key: &str, header: Option<String>) -> bool {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => {
                entry.1 = header;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries
            .iter()
            .map(|(k, header)| (k.as_str(), header.as_deref()))
    }

    pub fn mapped_count(&self) -> usize {
        self.entries.iter().filter(|(_, h)| h.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 未映射的必填字段（返回字段标签）
    pub fn unmapped_required(&self, fields: &[FieldDescriptor]) -> Vec<String> {
        fields
            .iter()
            .filter(|f| f.required && self.get(&f.key).is_none())
            .map(|f| f.label.clone())
            .collect()
    }
}

// ==========================================
// MappedRecord - 投影后的记录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappedRecord {
    pub row_number: usize,
    values: BTreeMap<String, String>,
}

impl MappedRecord {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            values: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    /// 取值（去除首尾空白，空值视为缺失）
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// 必填取值
    pub fn require(&self, key: &str) -> Result<&str, SkipReason> {
        self.get(key).ok_or_else(|| SkipReason::missing(key))
    }

    pub fn parse_number(&self, key: &str) -> Result<Option<f64>, SkipReason> {
        self.parse_with(key, "数值", |v| DataCleaner.parse_number(v))
    }

    pub fn parse_int(&self, key: &str) -> Result<Option<i64>, SkipReason> {
        self.parse_with(key, "整数", |v| {
            DataCleaner
                .parse_number(v)
                .filter(|n| n.fract() == 0.0 && n.abs() < i64::MAX as f64)
                .map(|n| n as i64)
        })
    }

    pub fn parse_date(&self, key: &str) -> Result<Option<NaiveDate>, SkipReason> {
        self.parse_with(key, "日期", |v| DataCleaner.parse_date(v))
    }

    pub fn parse_flag(&self, key: &str) -> Result<Option<bool>, SkipReason> {
        self.parse_with(key, "是/否", |v| DataCleaner.parse_flag(v))
    }

    fn parse_with<V>(
        &self,
        key: &str,
        expected: &str,
        parse: impl Fn(&str) -> Option<V>,
    ) -> Result<Option<V>, SkipReason> {
        match self.get(key) {
            None => Ok(None),
            Some(raw) => parse(raw).map(Some).ok_or_else(|| {
                SkipReason::invalid(key, format!("无法解析为{}: {}", expected, raw))
            }),
        }
    }

    /// 所有映射单元格均为空
    pub fn is_blank(&self) -> bool {
        self.values.values().all(|v| v.trim().is_empty())
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}

// ==========================================
// SkipReason - 转换失败原因
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipReason {
    pub field: Option<String>,
    pub message: String,
}

impl SkipReason {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            field: None,
            message: message.into(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            message: format!("缺少字段 {}", field),
        }
    }

    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: Some(field.to_string()),
            message: message.into(),
        }
    }

    pub fn duplicate(field: &str, value: &str) -> Self {
        Self {
            field: Some(field.to_string()),
            message: format!("重复值: {}", value),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "[{}] {}", field, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

// ==========================================
// FieldMapper - 映射计算
// ==========================================
pub struct FieldMapper;

impl FieldMapper {
    /// 自动猜测映射
    ///
    /// # 参数
    /// - fields: 目标字段
    /// - sample_headers: 示例表头，与 fields 按位置对应（可短于 fields）
    /// - headers: 文件实际表头
    ///
    /// # 返回
    /// - 每个字段映射到第一个匹配的表头，未匹配为 None
    pub fn auto_guess(
        &self,
        fields: &[FieldDescriptor],
        sample_headers: &[String],
        headers: &[String],
    ) -> ColumnMapping {
        let normalized_headers: Vec<String> = headers.iter().map(|h| normalize_label(h)).collect();

        let entries = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let candidates = Self::candidates(field, sample_headers.get(idx));
                let matched = normalized_headers
                    .iter()
                    .position(|header| candidates.iter().any(|c| header.contains(c.as_str())))
                    .map(|pos| headers[pos].clone());
                (field.key.clone(), matched)
            })
            .collect();

        ColumnMapping { entries }
    }

    /// 候选串: 标签、key、别名、对应位置的示例表头（标准化，去空）
    fn candidates(field: &FieldDescriptor, sample: Option<&String>) -> Vec<String> {
        std::iter::once(&field.label)
            .chain(std::iter::once(&field.key))
            .chain(field.aliases.iter())
            .chain(sample)
            .map(|c| normalize_label(c))
            .filter(|c| !c.is_empty())
            .collect()
    }

    /// 校验映射中的表头均存在于文件中
    pub fn validate(&self, mapping: &ColumnMapping, headers: &[String]) -> ImportResult<()> {
        for (_, header) in mapping.iter() {
            if let Some(header) = header {
                if !headers.iter().any(|h| h == header) {
                    return Err(ImportError::UnknownHeader(header.to_string()));
                }
            }
        }
        Ok(())
    }

    /// 按映射投影原始行（未映射字段不出现在记录中）
    pub fn project(
        &self,
        mapping: &ColumnMapping,
        headers: &[String],
        row: &RawRow,
    ) -> MappedRecord {
        let mut record = MappedRecord::new(row.row_number);
        for (key, header) in mapping.iter() {
            let Some(header) = header else { continue };
            if let Some(pos) = headers.iter().position(|h| h == header) {
                let value = row.values.get(pos).cloned().unwrap_or_default();
                record.insert(key, value);
            }
        }
        record
    }
}
