// ==========================================
// 车队管理后台核心 - 数据表描述符
// ==========================================
// 职责: 列/筛选/搜索描述符定义（由调用方提供，数据表只读使用）
// 说明: 所有字段访问均通过调用方提供的访问器函数完成，
//       数据表本身不假设行的任何字段
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// 单元格渲染函数
pub type CellFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// 排序键函数
pub type SortKeyFn<T> = Box<dyn Fn(&T) -> SortValue + Send + Sync>;

/// 字段访问器（筛选/搜索）
pub type AccessorFn<T> = Box<dyn Fn(&T) -> String + Send + Sync>;

/// 行 ID 函数（行, 位置）
pub type RowIdFn<T> = Box<dyn Fn(&T, usize) -> String + Send + Sync>;

/// 行操作渲染函数
pub type RowActionsFn<T> = Box<dyn Fn(&T) -> Vec<RowAction> + Send + Sync>;

/// 下拉控件无法表示空值，"全部" 使用该哨兵值
pub const ALL_SENTINEL: &str = "__all__";

// ==========================================
// SortValue - 排序键
// ==========================================
// 排序规则: 空值 < 数值 < 日期 < 文本
// 数值按全序比较（NaN 排在最后），文本不区分大小写
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortValue {
    Empty,
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl SortValue {
    fn rank(&self) -> u8 {
        match self {
            SortValue::Empty => 0,
            SortValue::Number(_) => 1,
            SortValue::Date(_) => 2,
            SortValue::Text(_) => 3,
        }
    }

    /// 文本排序键（空白文本视为空值）
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.trim().is_empty() {
            SortValue::Empty
        } else {
            SortValue::Text(value)
        }
    }
}

impl From<Option<f64>> for SortValue {
    fn from(value: Option<f64>) -> Self {
        value.map(SortValue::Number).unwrap_or(SortValue::Empty)
    }
}

impl From<Option<NaiveDate>> for SortValue {
    fn from(value: Option<NaiveDate>) -> Self {
        value.map(SortValue::Date).unwrap_or(SortValue::Empty)
    }
}

impl Eq for SortValue {}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.total_cmp(b),
            (SortValue::Date(a), SortValue::Date(b)) => a.cmp(b),
            (SortValue::Text(a), SortValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

// ==========================================
// ColumnDescriptor - 列描述符
// ==========================================
enum SortSource<T> {
    Disabled,
    CellText,
    Key(SortKeyFn<T>),
}

pub struct ColumnDescriptor<T> {
    pub id: String,
    pub header: String,
    cell: CellFn<T>,
    sort: SortSource<T>,
    hideable: bool,
}

impl<T> ColumnDescriptor<T> {
    /// 创建列（默认不可排序、可隐藏）
    pub fn new<F>(id: impl Into<String>, header: impl Into<String>, cell: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            header: header.into(),
            cell: Box::new(cell),
            sort: SortSource::Disabled,
            hideable: true,
        }
    }

    /// 按单元格文本排序
    pub fn sortable(mut self) -> Self {
        self.sort = SortSource::CellText;
        self
    }

    /// 按类型化排序键排序
    pub fn sort_by<F>(mut self, key: F) -> Self
    where
        F: Fn(&T) -> SortValue + Send + Sync + 'static,
    {
        self.sort = SortSource::Key(Box::new(key));
        self
    }

    /// 固定列（不可隐藏）
    pub fn fixed(mut self) -> Self {
        self.hideable = false;
        self
    }

    pub fn render(&self, row: &T) -> String {
        (self.cell)(row)
    }

    pub fn is_sortable(&self) -> bool {
        !matches!(self.sort, SortSource::Disabled)
    }

    pub fn is_hideable(&self) -> bool {
        self.hideable
    }

    /// 排序键（不可排序的列返回 None）
    pub fn sort_value(&self, row: &T) -> Option<SortValue> {
        match &self.sort {
            SortSource::Disabled => None,
            SortSource::CellText => Some(SortValue::text(self.render(row))),
            SortSource::Key(key) => Some(key(row)),
        }
    }
}

// ==========================================
// FilterDescriptor - 筛选描述符
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOption {
    pub label: String,
    pub value: String,
}

impl FilterOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// 筛选选择（All 对应 "不过滤"）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterSelection {
    #[default]
    All,
    Value(String),
}

impl FilterSelection {
    /// 由值构造（空字符串视为 All）
    pub fn value(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            FilterSelection::All
        } else {
            FilterSelection::Value(value)
        }
    }

    /// 由下拉控件值构造（哨兵值与空字符串均为 All）
    pub fn from_control_value(raw: &str) -> Self {
        if raw == ALL_SENTINEL {
            FilterSelection::All
        } else {
            Self::value(raw)
        }
    }

    /// 转换为下拉控件值
    pub fn to_control_value(&self) -> &str {
        match self {
            FilterSelection::All => ALL_SENTINEL,
            FilterSelection::Value(v) => v,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, FilterSelection::All)
    }

    /// 判断访问器结果是否命中当前选择
    pub fn matches(&self, accessor_value: &str) -> bool {
        match self {
            FilterSelection::All => true,
            FilterSelection::Value(v) => v == accessor_value,
        }
    }
}

pub struct FilterDescriptor<T> {
    pub id: String,
    pub label: String,
    pub options: Vec<FilterOption>,
    accessor: AccessorFn<T>,
    pub default_value: FilterSelection,
}

impl<T> FilterDescriptor<T> {
    /// 创建筛选器
    ///
    /// 访问器应返回 options 中的某个 value 或空字符串，
    /// 不匹配的返回值只会导致对应选项计数为 0，不做校验
    pub fn new<F>(
        id: impl Into<String>,
        label: impl Into<String>,
        options: Vec<FilterOption>,
        accessor: F,
    ) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            label: label.into(),
            options,
            accessor: Box::new(accessor),
            default_value: FilterSelection::All,
        }
    }

    pub fn with_default(mut self, default_value: FilterSelection) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn access(&self, row: &T) -> String {
        (self.accessor)(row)
    }
}

// ==========================================
// SearchDescriptor - 搜索描述符
// ==========================================
// 匹配规则: 各字段字符串不区分大小写的子串匹配，字段间为 OR
pub struct SearchDescriptor<T> {
    pub placeholder: String,
    fields: Vec<AccessorFn<T>>,
}

impl<T> SearchDescriptor<T> {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            fields: Vec::new(),
        }
    }

    /// 追加一个可搜索字段
    pub fn field<F>(mut self, accessor: F) -> Self
    where
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        self.fields.push(Box::new(accessor));
        self
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// 判断行是否匹配（needle 需已转小写；空 needle 匹配所有行）
    pub fn matches(&self, row: &T, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.fields
            .iter()
            .any(|field| field(row).to_lowercase().contains(needle))
    }
}

// ==========================================
// RowAction - 行操作
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAction {
    pub id: String,
    pub label: String,
    /// 危险操作（前端以警示色展示）
    pub destructive: bool,
}

impl RowAction {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            destructive: false,
        }
    }

    pub fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}
