// ==========================================
// 车队管理后台核心 - 搜索/筛选/排序/分面计数
// ==========================================
// 纯函数，不持有状态；DataTable 每次生成视图时调用
// 分面规则: 某个筛选器的计数只受搜索和 "其他" 筛选器约束，
//           不受自身当前选择影响
// ==========================================

use crate::table::descriptor::{
    ColumnDescriptor, FilterDescriptor, FilterSelection, SearchDescriptor,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// 排序状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column_id: String,
    pub direction: SortDirection,
}

/// 单个筛选器的分面计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetCounts {
    pub filter_id: String,
    /// 选择 "全部" 时的行数
    pub all: usize,
    /// 与 options 顺序一致的计数
    pub options: Vec<usize>,
}

/// 查询条件（搜索 + 筛选）
pub struct RowQuery<'a, T> {
    pub search: Option<&'a SearchDescriptor<T>>,
    /// 已转小写并去除首尾空白的搜索词
    pub needle: String,
    pub filters: &'a [FilterDescriptor<T>],
    pub selections: &'a HashMap<String, FilterSelection>,
}

impl<'a, T> RowQuery<'a, T> {
    pub fn new(
        search: Option<&'a SearchDescriptor<T>>,
        search_text: &str,
        filters: &'a [FilterDescriptor<T>],
        selections: &'a HashMap<String, FilterSelection>,
    ) -> Self {
        Self {
            search,
            needle: search_text.trim().to_lowercase(),
            filters,
            selections,
        }
    }

    fn selection(&self, filter_id: &str) -> Option<&FilterSelection> {
        self.selections.get(filter_id).filter(|s| !s.is_all())
    }

    pub fn matches_search(&self, row: &T) -> bool {
        match self.search {
            Some(search) => search.matches(row, &self.needle),
            None => true,
        }
    }

    /// 判断行是否满足全部筛选器（可跳过其中一个）
    pub fn matches_filters(&self, row: &T, skip: Option<&str>) -> bool {
        self.filters.iter().all(|filter| {
            if skip == Some(filter.id.as_str()) {
                return true;
            }
            match self.selection(&filter.id) {
                Some(selection) => selection.matches(&filter.access(row)),
                None => true,
            }
        })
    }

    pub fn matches(&self, row: &T) -> bool {
        self.matches_search(row) && self.matches_filters(row, None)
    }

    /// 满足条件的行下标（保持原顺序）
    pub fn filter_indices(&self, rows: &[T]) -> Vec<usize> {
        rows.iter()
            .enumerate()
            .filter(|(_, row)| self.matches(row))
            .map(|(idx, _)| idx)
            .collect()
    }

    /// 计算每个筛选器的分面计数
    pub fn facet_counts(&self, rows: &[T]) -> Vec<FacetCounts> {
        let searched: Vec<&T> = rows.iter().filter(|row| self.matches_search(row)).collect();

        self.filters
            .iter()
            .map(|filter| {
                let mut all = 0;
                let mut per_value: HashMap<String, usize> = HashMap::new();
                for row in searched
                    .iter()
                    .filter(|row| self.matches_filters(row, Some(&filter.id)))
                {
                    all += 1;
                    *per_value.entry(filter.access(row)).or_insert(0) += 1;
                }

                FacetCounts {
                    filter_id: filter.id.clone(),
                    all,
                    options: filter
                        .options
                        .iter()
                        .map(|opt| per_value.get(&opt.value).copied().unwrap_or(0))
                        .collect(),
                }
            })
            .collect()
    }
}

/// 按列排序下标（稳定排序）
pub fn sort_indices<T>(
    rows: &[T],
    indices: &mut [usize],
    column: &ColumnDescriptor<T>,
    direction: SortDirection,
) {
    if !column.is_sortable() {
        return;
    }
    let mut keyed: Vec<(usize, _)> = indices
        .iter()
        .map(|&idx| (idx, column.sort_value(&rows[idx])))
        .collect();

    keyed.sort_by(|a, b| {
        let ord = a.1.cmp(&b.1);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });

    for (slot, (idx, _)) in indices.iter_mut().zip(keyed) {
        *slot = idx;
    }
}
