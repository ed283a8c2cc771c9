// ==========================================
// 车队管理后台核心 - 通用数据表
// ==========================================
// 职责: 行选择、搜索（防抖）、筛选与分面计数、排序、分页、
//       批量删除确认、行操作与详情抽屉
// 说明: 与行的业务含义无关，只通过描述符中的访问器读取字段；
//       不做任何 I/O，新增/导入/删除的持久化全部回调给调用方
// ==========================================

use crate::config::ConfigReader;
use crate::i18n;
use crate::table::debounce::SearchDebouncer;
use crate::table::descriptor::{
    ColumnDescriptor, FilterDescriptor, FilterSelection, RowAction, RowActionsFn, RowIdFn,
    SearchDescriptor,
};
use crate::table::error::{TableError, TableResult};
use crate::table::pagination::{PageInfo, PaginationState};
use crate::table::query::{sort_indices, RowQuery, SortDirection, SortState};
use crate::table::selection::{HeaderCheckState, SelectionSet};
use crate::table::view::{
    ColumnHeaderView, DeleteConfirmation, FacetOptionView, FacetView, RowView, SearchView,
    TableView, ToolbarView,
};
use std::collections::{HashMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// 批量删除回调（仅在用户确认后调用）
pub type DeleteHandler<T> = Box<dyn FnMut(&[T]) -> anyhow::Result<()> + Send>;

/// 工具栏按钮（新增/导入），纯委托
struct ToolbarTrigger {
    label: String,
    callback: Box<dyn FnMut() + Send>,
}

// ==========================================
// DataTable - 通用数据表
// ==========================================
pub struct DataTable<T> {
    // 本地快照
    rows: Vec<T>,
    ids: Vec<String>,

    // 调用方描述符
    columns: Vec<ColumnDescriptor<T>>,
    row_id: Option<RowIdFn<T>>,
    search: Option<SearchDescriptor<T>>,
    filters: Vec<FilterDescriptor<T>>,
    row_actions: Option<RowActionsFn<T>>,

    // 交互状态
    debouncer: SearchDebouncer,
    selections: HashMap<String, FilterSelection>,
    sort: Option<SortState>,
    pagination: PaginationState,
    page_size_options: Vec<usize>,
    selection: SelectionSet,
    hidden_columns: HashSet<String>,
    detail_id: Option<String>,
    pending_delete: bool,

    // 回调
    add: Option<ToolbarTrigger>,
    import: Option<ToolbarTrigger>,
    on_delete_selected: Option<DeleteHandler<T>>,
}

impl<T: Clone> DataTable<T> {
    /// 创建数据表
    ///
    /// # 参数
    /// - columns: 列描述符
    /// - config: 分页与防抖配置
    pub fn new(columns: Vec<ColumnDescriptor<T>>, config: &dyn ConfigReader) -> Self {
        Self {
            rows: Vec::new(),
            ids: Vec::new(),
            columns,
            row_id: None,
            search: None,
            filters: Vec::new(),
            row_actions: None,
            debouncer: SearchDebouncer::new(config.search_debounce()),
            selections: HashMap::new(),
            sort: None,
            pagination: PaginationState::new(config.default_page_size()),
            page_size_options: config.page_size_options(),
            selection: SelectionSet::new(),
            hidden_columns: HashSet::new(),
            detail_id: None,
            pending_delete: false,
            add: None,
            import: None,
            on_delete_selected: None,
        }
    }

    // ==========================================
    // 构造选项
    // ==========================================

    /// 行 ID 函数
    ///
    /// 调用方应始终提供稳定 ID；未提供时退化为位置下标，
    /// 数据重排后已选 ID 可能指向其他行
    pub fn with_row_id<F>(mut self, row_id: F) -> Self
    where
        F: Fn(&T, usize) -> String + Send + Sync + 'static,
    {
        self.row_id = Some(Box::new(row_id));
        self.ids = self.compute_ids();
        self
    }

    pub fn with_search(mut self, search: SearchDescriptor<T>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn with_filters(mut self, filters: Vec<FilterDescriptor<T>>) -> Self {
        self.selections = filters
            .iter()
            .map(|f| (f.id.clone(), f.default_value.clone()))
            .collect();
        self.filters = filters;
        self
    }

    pub fn with_row_actions<F>(mut self, actions: F) -> Self
    where
        F: Fn(&T) -> Vec<RowAction> + Send + Sync + 'static,
    {
        self.row_actions = Some(Box::new(actions));
        self
    }

    pub fn with_add<F>(mut self, label: impl Into<String>, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.add = Some(ToolbarTrigger {
            label: label.into(),
            callback: Box::new(callback),
        });
        self
    }

    pub fn with_import<F>(mut self, label: impl Into<String>, callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        self.import = Some(ToolbarTrigger {
            label: label.into(),
            callback: Box::new(callback),
        });
        self
    }

    pub fn with_delete_selected<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&[T]) -> anyhow::Result<()> + Send + 'static,
    {
        self.on_delete_selected = Some(Box::new(handler));
        self
    }

    /// 覆盖每页行数可选项（当前每页行数不在其中时取第一项）
    pub fn with_page_size_options(mut self, options: Vec<usize>) -> TableResult<Self> {
        if options.is_empty() || options.contains(&0) {
            return Err(TableError::InvalidPageSizeOptions(format!("{:?}", options)));
        }
        if !options.contains(&self.pagination.page_size) {
            self.pagination = PaginationState::new(options[0]);
        }
        self.page_size_options = options;
        Ok(self)
    }

    // ==========================================
    // 数据快照
    // ==========================================

    /// 替换行快照（外部数据每次更新时调用）
    ///
    /// - 已不存在的选中 ID 被剔除
    /// - 详情抽屉对应的行消失时自动关闭
    /// - 页码收敛到合法范围
    pub fn set_data(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.ids = self.compute_ids();

        let present: HashSet<&str> = self.ids.iter().map(String::as_str).collect();
        let dropped = self.selection.retain_present(&present);
        if let Some(id) = &self.detail_id {
            if !present.contains(id.as_str()) {
                debug!(row_id = %id, "详情行已不存在，关闭抽屉");
                self.detail_id = None;
            }
        }

        let filtered = self.filtered_indices().len();
        self.pagination.clamp(filtered);

        if self.row_id.is_none() {
            debug!("未提供行 ID 函数，使用位置下标作为行 ID");
        }
        debug!(
            rows = self.rows.len(),
            filtered,
            dropped_selection = dropped,
            "数据快照已替换"
        );
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn row_ids(&self) -> &[String] {
        &self.ids
    }

    pub fn row_by_id(&self, id: &str) -> Option<&T> {
        self.ids
            .iter()
            .position(|candidate| candidate == id)
            .map(|pos| &self.rows[pos])
    }

    fn compute_ids(&self) -> Vec<String> {
        self.rows
            .iter()
            .enumerate()
            .map(|(idx, row)| match &self.row_id {
                Some(row_id) => row_id(row, idx),
                None => idx.to_string(),
            })
            .collect()
    }

    /// 搜索 + 筛选 + 排序后的行下标
    fn filtered_indices(&self) -> Vec<usize> {
        let query = RowQuery::new(
            self.search.as_ref(),
            self.debouncer.applied(),
            &self.filters,
            &self.selections,
        );
        let mut indices = query.filter_indices(&self.rows);

        if let Some(sort) = &self.sort {
            if let Some(column) = self.columns.iter().find(|c| c.id == sort.column_id) {
                sort_indices(&self.rows, &mut indices, column, sort.direction);
            }
        }
        indices
    }

    /// 筛选后的行（按当前排序）
    pub fn filtered_rows(&self) -> Vec<&T> {
        self.filtered_indices()
            .into_iter()
            .map(|idx| &self.rows[idx])
            .collect()
    }

    // ==========================================
    // 搜索
    // ==========================================

    /// 输入搜索文本（输入框值立即更新，筛选在防抖后生效）
    pub fn set_search_input(&mut self, text: impl Into<String>, now: Instant) {
        self.debouncer.push(text, now);
    }

    /// 驱动防抖计时，返回搜索值是否生效并发生变化
    pub fn poll_search(&mut self, now: Instant) -> bool {
        let changed = self.debouncer.poll(now);
        if changed {
            self.on_search_applied();
        }
        changed
    }

    /// 立即应用搜索文本
    pub fn flush_search(&mut self) -> bool {
        let changed = self.debouncer.flush();
        if changed {
            self.on_search_applied();
        }
        changed
    }

    fn on_search_applied(&mut self) {
        self.pagination.reset();
        debug!(search = %self.debouncer.applied(), "搜索条件已生效");
    }

    /// 下一次需要调用 poll_search 的时间点
    pub fn search_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn search_input(&self) -> &str {
        self.debouncer.input()
    }

    pub fn applied_search(&self) -> &str {
        self.debouncer.applied()
    }

    // ==========================================
    // 筛选
    // ==========================================

    /// 设置筛选器选择（页码归零）
    pub fn set_filter(&mut self, filter_id: &str, selection: FilterSelection) -> TableResult<()> {
        if !self.filters.iter().any(|f| f.id == filter_id) {
            return Err(TableError::UnknownFilter(filter_id.to_string()));
        }
        debug!(filter_id, selection = ?selection, "筛选条件变更");
        self.selections.insert(filter_id.to_string(), selection);
        self.pagination.reset();
        Ok(())
    }

    /// 以下拉控件值设置筛选器（哨兵值表示全部）
    pub fn set_filter_control_value(&mut self, filter_id: &str, raw: &str) -> TableResult<()> {
        self.set_filter(filter_id, FilterSelection::from_control_value(raw))
    }

    pub fn filter_selection(&self, filter_id: &str) -> Option<&FilterSelection> {
        self.selections.get(filter_id)
    }

    /// 清空所有筛选器（回到 "全部"）
    pub fn clear_filters(&mut self) {
        for selection in self.selections.values_mut() {
            *selection = FilterSelection::All;
        }
        self.pagination.reset();
    }

    // ==========================================
    // 排序
    // ==========================================

    /// 点击列头: 无 → 升序 → 降序 → 无
    pub fn toggle_sort(&mut self, column_id: &str) -> TableResult<Option<SortState>> {
        let column = self
            .columns
            .iter()
            .find(|c| c.id == column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))?;
        if !column.is_sortable() {
            return Err(TableError::ColumnNotSortable(column_id.to_string()));
        }

        let next = match &self.sort {
            Some(current) if current.column_id == column_id => match current.direction {
                SortDirection::Ascending => Some(SortDirection::Descending),
                SortDirection::Descending => None,
            },
            _ => Some(SortDirection::Ascending),
        };

        self.sort = next.map(|direction| SortState {
            column_id: column_id.to_string(),
            direction,
        });
        Ok(self.sort.clone())
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    // ==========================================
    // 分页
    // ==========================================

    pub fn pagination(&self) -> PaginationState {
        self.pagination
    }

    pub fn page_info(&self) -> PageInfo {
        self.pagination.info(self.filtered_indices().len())
    }

    /// 跳转页码（超出范围时收敛到最后一页）
    pub fn set_page(&mut self, page_index: usize) {
        self.pagination.page_index = page_index;
        self.pagination.clamp(self.filtered_indices().len());
    }

    pub fn next_page(&mut self) {
        self.set_page(self.pagination.page_index + 1);
    }

    pub fn previous_page(&mut self) {
        self.set_page(self.pagination.page_index.saturating_sub(1));
    }

    /// 修改每页行数（页码归零）
    pub fn set_page_size(&mut self, page_size: usize) -> TableResult<()> {
        if !self.page_size_options.contains(&page_size) {
            return Err(TableError::InvalidPageSize {
                size: page_size,
                options: self.page_size_options.clone(),
            });
        }
        self.pagination = PaginationState::new(page_size);
        Ok(())
    }

    fn current_page_ids(&self) -> Vec<&str> {
        let indices = self.filtered_indices();
        let range = self.pagination.slice_range(indices.len());
        indices[range]
            .iter()
            .map(|&idx| self.ids[idx].as_str())
            .collect()
    }

    // ==========================================
    // 选择
    // ==========================================

    /// 切换单行选中状态（不存在的 ID 忽略），返回切换后是否选中
    pub fn toggle_row(&mut self, id: &str) -> bool {
        if !self.ids.iter().any(|candidate| candidate == id) {
            debug!(row_id = %id, "忽略不存在的行 ID");
            return false;
        }
        self.selection.toggle(id)
    }

    /// 表头复选框: 当前页全选时取消，否则全选当前页
    pub fn toggle_page_selection(&mut self) {
        let page_ids: Vec<String> = self
            .current_page_ids()
            .into_iter()
            .map(str::to_string)
            .collect();
        let all_selected =
            !page_ids.is_empty() && page_ids.iter().all(|id| self.selection.contains(id));

        for id in page_ids {
            if all_selected {
                self.selection.deselect(&id);
            } else {
                self.selection.select(id);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.contains(id) && self.ids.iter().any(|candidate| candidate == id)
    }

    /// 已选中且仍存在的行 ID（按快照顺序）
    pub fn selected_ids(&self) -> Vec<String> {
        self.ids
            .iter()
            .filter(|id| self.selection.contains(id))
            .cloned()
            .collect()
    }

    /// 已选中且仍存在的行（按快照顺序）
    pub fn selected_rows(&self) -> Vec<T> {
        self.ids
            .iter()
            .zip(&self.rows)
            .filter(|(id, _)| self.selection.contains(id))
            .map(|(_, row)| row.clone())
            .collect()
    }

    pub fn header_check_state(&self) -> HeaderCheckState {
        self.selection.check_state(self.current_page_ids())
    }

    // ==========================================
    // 详情抽屉
    // ==========================================

    /// 打开行详情（ID 不存在时返回 None 且不打开）
    pub fn open_detail(&mut self, id: &str) -> Option<&T> {
        let pos = self.ids.iter().position(|candidate| candidate == id)?;
        self.detail_id = Some(id.to_string());
        Some(&self.rows[pos])
    }

    /// 当前详情行（每次从最新快照解析）
    pub fn detail(&self) -> Option<&T> {
        self.detail_id.as_deref().and_then(|id| self.row_by_id(id))
    }

    pub fn close_detail(&mut self) {
        self.detail_id = None;
    }

    // ==========================================
    // 列显示
    // ==========================================

    /// 切换列显示，返回切换后是否可见
    pub fn toggle_column_visibility(&mut self, column_id: &str) -> TableResult<bool> {
        let column = self
            .columns
            .iter()
            .find(|c| c.id == column_id)
            .ok_or_else(|| TableError::UnknownColumn(column_id.to_string()))?;
        if !column.is_hideable() {
            return Err(TableError::ColumnNotHideable(column_id.to_string()));
        }

        if self.hidden_columns.remove(column_id) {
            Ok(true)
        } else {
            self.hidden_columns.insert(column_id.to_string());
            Ok(false)
        }
    }

    // ==========================================
    // 工具栏
    // ==========================================

    /// 点击 "新增"，返回是否配置了回调
    pub fn trigger_add(&mut self) -> bool {
        match self.add.as_mut() {
            Some(trigger) => {
                (trigger.callback)();
                true
            }
            None => false,
        }
    }

    /// 点击 "导入"，返回是否配置了回调
    pub fn trigger_import(&mut self) -> bool {
        match self.import.as_mut() {
            Some(trigger) => {
                (trigger.callback)();
                true
            }
            None => false,
        }
    }

    // ==========================================
    // 批量删除
    // ==========================================

    /// 打开批量删除确认对话框
    pub fn request_bulk_delete(&mut self) -> TableResult<DeleteConfirmation> {
        let count = self.selected_ids().len();
        if count == 0 {
            return Err(TableError::EmptySelection);
        }
        self.pending_delete = true;
        Ok(delete_confirmation(count))
    }

    pub fn cancel_bulk_delete(&mut self) {
        self.pending_delete = false;
    }

    /// 确认批量删除
    ///
    /// 以完整行对象调用删除回调；无论回调成功与否，选择都会被清空。
    /// 返回被删除的行，由调用方完成持久化与快照更新
    pub fn confirm_bulk_delete(&mut self) -> TableResult<Vec<T>> {
        if !self.pending_delete {
            return Err(TableError::NoPendingConfirmation);
        }
        self.pending_delete = false;

        let rows = self.selected_rows();
        self.selection.clear();
        if rows.is_empty() {
            return Err(TableError::EmptySelection);
        }

        info!(count = rows.len(), "确认批量删除");
        if let Some(handler) = self.on_delete_selected.as_mut() {
            if let Err(e) = handler(&rows) {
                warn!(error = %e, "批量删除回调失败");
                return Err(TableError::DeleteHandlerFailed(e.to_string()));
            }
        }
        Ok(rows)
    }

    // ==========================================
    // 视图
    // ==========================================

    /// 生成当前视图模型
    pub fn view(&self) -> TableView {
        let query = RowQuery::new(
            self.search.as_ref(),
            self.debouncer.applied(),
            &self.filters,
            &self.selections,
        );
        let indices = self.filtered_indices();
        let page = self.pagination.info(indices.len());
        let range = self.pagination.slice_range(indices.len());

        let visible: Vec<&ColumnDescriptor<T>> = self
            .columns
            .iter()
            .filter(|c| !self.hidden_columns.contains(&c.id))
            .collect();

        let columns = visible
            .iter()
            .map(|c| ColumnHeaderView {
                id: c.id.clone(),
                header: c.header.clone(),
                sortable: c.is_sortable(),
                sort: self
                    .sort
                    .as_ref()
                    .filter(|s| s.column_id == c.id)
                    .map(|s| s.direction),
            })
            .collect();

        let rows: Vec<RowView> = indices[range]
            .iter()
            .map(|&idx| {
                let row = &self.rows[idx];
                RowView {
                    id: self.ids[idx].clone(),
                    cells: visible.iter().map(|c| c.render(row)).collect(),
                    actions: self
                        .row_actions
                        .as_ref()
                        .map(|actions| actions(row))
                        .unwrap_or_default(),
                    selected: self.selection.contains(&self.ids[idx]),
                }
            })
            .collect();

        let facets = self
            .filters
            .iter()
            .zip(query.facet_counts(&self.rows))
            .map(|(filter, counts)| FacetView {
                filter_id: filter.id.clone(),
                label: filter.label.clone(),
                selection: self
                    .selections
                    .get(&filter.id)
                    .cloned()
                    .unwrap_or_default(),
                all_count: counts.all,
                options: filter
                    .options
                    .iter()
                    .zip(counts.options)
                    .map(|(opt, count)| FacetOptionView {
                        label: opt.label.clone(),
                        value: opt.value.clone(),
                        count,
                    })
                    .collect(),
            })
            .collect();

        let selected_count = self.selected_ids().len();
        let empty_message = if indices.is_empty() {
            Some(i18n::t("table.no_results"))
        } else {
            None
        };

        TableView {
            columns,
            header_check: self
                .selection
                .check_state(rows.iter().map(|r| r.id.as_str())),
            rows,
            filtered_rows: indices.len(),
            source_rows: self.rows.len(),
            page,
            facets,
            search: self.search.as_ref().map(|s| SearchView {
                placeholder: s.placeholder.clone(),
                value: self.debouncer.input().to_string(),
            }),
            toolbar: ToolbarView {
                add_label: self.add.as_ref().map(|t| t.label.clone()),
                import_label: self.import.as_ref().map(|t| t.label.clone()),
                can_delete_selected: selected_count > 0,
                page_size_options: self.page_size_options.clone(),
            },
            selected_count,
            empty_message,
            pending_delete: self
                .pending_delete
                .then(|| delete_confirmation(selected_count)),
        }
    }
}

fn delete_confirmation(count: usize) -> DeleteConfirmation {
    DeleteConfirmation {
        count,
        message: i18n::t_count("table.confirm_delete", count),
    }
}
