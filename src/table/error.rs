// ==========================================
// 车队管理后台核心 - 数据表错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 数据表不做 I/O，错误仅来自调用方传入的非法参数
//       或调用方回调自身的失败
// ==========================================

use thiserror::Error;

/// 数据表错误类型
#[derive(Error, Debug)]
pub enum TableError {
    #[error("未知的列: {0}")]
    UnknownColumn(String),

    #[error("列不支持排序: {0}")]
    ColumnNotSortable(String),

    #[error("列不允许隐藏: {0}")]
    ColumnNotHideable(String),

    #[error("未知的筛选器: {0}")]
    UnknownFilter(String),

    #[error("每页行数 {size} 不在可选项 {options:?} 中")]
    InvalidPageSize { size: usize, options: Vec<usize> },

    #[error("每页行数可选项非法: {0}")]
    InvalidPageSizeOptions(String),

    #[error("未选中任何行")]
    EmptySelection,

    #[error("没有待确认的批量删除")]
    NoPendingConfirmation,

    #[error("批量删除回调失败: {0}")]
    DeleteHandlerFailed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type TableResult<T> = Result<T, TableError>;
