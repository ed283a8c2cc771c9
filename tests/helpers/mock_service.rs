// ==========================================
// Mock 资源服务 - 用于集成测试
// ==========================================
// 内存存储 + 可注入失败，记录每次调用
// ==========================================

use anyhow::anyhow;
use async_trait::async_trait;
use fleet_dashboard::resource::{Resource, ResourceService};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub struct MockService<T> {
    pub rows: Mutex<Vec<T>>,
    pub calls: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl<T: Resource> MockService<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Mutex::new(rows),
            calls: Mutex::new(Vec::new()),
            fail: AtomicBool::new(false),
        }
    }

    /// 之后的调用全部失败
    pub fn fail_next_calls(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stored(&self) -> Vec<T> {
        self.rows.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(anyhow!("service unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl<T: Resource> ResourceService<T> for MockService<T> {
    async fn list(&self) -> anyhow::Result<Vec<T>> {
        self.record("list")?;
        Ok(self.stored())
    }

    async fn create(&self, item: T) -> anyhow::Result<T> {
        self.record("create")?;
        self.rows.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn update(&self, item: T) -> anyhow::Result<T> {
        self.record("update")?;
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id() == item.id()) {
            Some(slot) => {
                *slot = item.clone();
                Ok(item)
            }
            None => Err(anyhow!("not found: {}", item.id())),
        }
    }

    async fn delete_many(&self, ids: Vec<String>) -> anyhow::Result<()> {
        self.record("delete_many")?;
        self.rows
            .lock()
            .unwrap()
            .retain(|r| !ids.iter().any(|id| id == r.id()));
        Ok(())
    }

    async fn import_many(&self, items: Vec<T>) -> anyhow::Result<usize> {
        self.record("import_many")?;
        let count = items.len();
        self.rows.lock().unwrap().extend(items);
        Ok(count)
    }
}
