// ==========================================
// 车队管理后台核心 - 数据表视图模型
// ==========================================
// 前端直接据此绘制，不再做任何计算
// ==========================================

use crate::table::descriptor::{FilterSelection, RowAction};
use crate::table::pagination::PageInfo;
use crate::table::query::SortDirection;
use crate::table::selection::HeaderCheckState;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnHeaderView {
    pub id: String,
    pub header: String,
    pub sortable: bool,
    pub sort: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: String,
    pub cells: Vec<String>,
    pub actions: Vec<RowAction>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetOptionView {
    pub label: String,
    pub value: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetView {
    pub filter_id: String,
    pub label: String,
    pub selection: FilterSelection,
    pub all_count: usize,
    pub options: Vec<FacetOptionView>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchView {
    pub placeholder: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolbarView {
    pub add_label: Option<String>,
    pub import_label: Option<String>,
    pub can_delete_selected: bool,
    pub page_size_options: Vec<usize>,
}

/// 批量删除确认对话框
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeleteConfirmation {
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub columns: Vec<ColumnHeaderView>,
    pub rows: Vec<RowView>,
    /// 筛选后的总行数
    pub filtered_rows: usize,
    /// 原始快照行数
    pub source_rows: usize,
    pub page: PageInfo,
    pub facets: Vec<FacetView>,
    pub search: Option<SearchView>,
    pub toolbar: ToolbarView,
    pub selected_count: usize,
    pub header_check: HeaderCheckState,
    /// 筛选结果为空时显示的提示行
    pub empty_message: Option<String>,
    pub pending_delete: Option<DeleteConfirmation>,
}
