// ==========================================
// 车队管理后台核心 - 数据表模块
// ==========================================
// 无界面的通用数据表: 描述符 + 交互状态 + 视图模型
// ==========================================

pub mod data_table;
pub mod debounce;
pub mod descriptor;
pub mod error;
pub mod pagination;
pub mod query;
pub mod selection;
pub mod view;

pub use data_table::{DataTable, DeleteHandler};
pub use debounce::SearchDebouncer;
pub use descriptor::{
    ColumnDescriptor, FilterDescriptor, FilterOption, FilterSelection, RowAction,
    SearchDescriptor, SortValue, ALL_SENTINEL,
};
pub use error::{TableError, TableResult};
pub use pagination::{PageInfo, PaginationState};
pub use query::{FacetCounts, RowQuery, SortDirection, SortState};
pub use selection::{HeaderCheckState, SelectionSet};
pub use view::{
    ColumnHeaderView, DeleteConfirmation, FacetOptionView, FacetView, RowView, SearchView,
    TableView, ToolbarView,
};
