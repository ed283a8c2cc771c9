// ==========================================
// 车队管理后台核心 - 搜索防抖
// ==========================================
// 输入框的值同步更新；用于筛选的值在静默期结束后才生效
// 时间由调用方传入，便于在事件循环和测试中驱动
// ==========================================

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct SearchDebouncer {
    delay: Duration,
    input: String,
    applied: String,
    pending_since: Option<Instant>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            input: String::new(),
            applied: String::new(),
            pending_since: None,
        }
    }

    /// 输入框当前值
    pub fn input(&self) -> &str {
        &self.input
    }

    /// 已生效的搜索值
    pub fn applied(&self) -> &str {
        &self.applied
    }

    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// 记录一次输入（重新开始计时）
    pub fn push(&mut self, text: impl Into<String>, now: Instant) {
        self.input = text.into();
        self.pending_since = Some(now);
    }

    /// 下一次需要调用 poll 的时间点（无待生效输入时为 None）
    pub fn deadline(&self) -> Option<Instant> {
        self.pending_since.map(|since| since + self.delay)
    }

    /// 静默期已过则生效，返回生效值是否发生变化
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(deadline) if now >= deadline => self.flush(),
            _ => false,
        }
    }

    /// 立即生效（如按下回车），返回生效值是否发生变化
    pub fn flush(&mut self) -> bool {
        self.pending_since = None;
        if self.applied == self.input {
            return false;
        }
        self.applied = self.input.clone();
        true
    }
}
