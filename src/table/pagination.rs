// ==========================================
// 车队管理后台核心 - 分页状态
// ==========================================
// 不变量: 搜索或筛选变化后 page_index 归零（由 DataTable 保证）
// ==========================================

use serde::{Deserialize, Serialize};
use std::ops::Range;

/// 分页状态（page_index 从 0 开始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    pub page_index: usize,
    pub page_size: usize,
}

/// 分页元数据（基于筛选后的行数计算）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    pub page_index: usize,
    pub page_size: usize,
    pub page_count: usize,
    pub total_rows: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationState {
    pub fn new(page_size: usize) -> Self {
        Self {
            page_index: 0,
            page_size: page_size.max(1),
        }
    }

    pub fn reset(&mut self) {
        self.page_index = 0;
    }

    /// 总页数（空集合也算 1 页）
    pub fn page_count(&self, total_rows: usize) -> usize {
        total_rows.div_ceil(self.page_size).max(1)
    }

    /// 将页码收敛到合法范围
    pub fn clamp(&mut self, total_rows: usize) {
        let last = self.page_count(total_rows) - 1;
        if self.page_index > last {
            self.page_index = last;
        }
    }

    /// 当前页在筛选结果中的切片范围
    pub fn slice_range(&self, total_rows: usize) -> Range<usize> {
        let start = (self.page_index * self.page_size).min(total_rows);
        let end = (start + self.page_size).min(total_rows);
        start..end
    }

    pub fn info(&self, total_rows: usize) -> PageInfo {
        let page_count = self.page_count(total_rows);
        PageInfo {
            page_index: self.page_index,
            page_size: self.page_size,
            page_count,
            total_rows,
            has_previous: self.page_index > 0,
            has_next: self.page_index + 1 < page_count,
        }
    }
}
