// ==========================================
// 车队管理后台核心 - 行选择集合
// ==========================================
// 生命周期: 组件实例内有效，不持久化
// 不变量: 不在当前快照中的 ID 视为未选中，从不报错
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// 表头复选框状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderCheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

#[derive(Debug, Clone, Default)]
pub struct SelectionSet {
    ids: HashSet<String>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn select(&mut self, id: impl Into<String>) {
        self.ids.insert(id.into());
    }

    pub fn deselect(&mut self, id: &str) {
        self.ids.remove(id);
    }

    /// 切换选中状态，返回切换后是否选中
    pub fn toggle(&mut self, id: &str) -> bool {
        if self.ids.remove(id) {
            false
        } else {
            self.ids.insert(id.to_string());
            true
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 剔除已不存在的 ID，返回剔除数量
    pub fn retain_present(&mut self, present: &HashSet<&str>) -> usize {
        let before = self.ids.len();
        self.ids.retain(|id| present.contains(id.as_str()));
        before - self.ids.len()
    }

    /// 一组 ID（通常为当前页）的勾选状态
    pub fn check_state<'a, I>(&self, ids: I) -> HeaderCheckState
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut total = 0;
        let mut selected = 0;
        for id in ids {
            total += 1;
            if self.contains(id) {
                selected += 1;
            }
        }
        match (total, selected) {
            (0, _) | (_, 0) => HeaderCheckState::Unchecked,
            (t, s) if t == s => HeaderCheckState::Checked,
            _ => HeaderCheckState::Indeterminate,
        }
    }
}
