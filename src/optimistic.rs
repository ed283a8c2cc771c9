// ==========================================
// 车队管理后台核心 - 乐观更新
// ==========================================
// 流程: 快照当前状态 → 立即应用变更 → 等待远端操作
//       → 失败时恢复快照
// 注意: 等待期间不持有锁，读者可看到乐观状态
// ==========================================

use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, warn};

pub(crate) fn lock<S>(state: &Mutex<S>) -> MutexGuard<'_, S> {
    // 持锁线程 panic 后数据仍可用（只做整体替换）
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 执行乐观更新
///
/// # 参数
/// - state: 共享状态
/// - apply: 乐观变更（立即生效）
/// - operation: 远端操作
///
/// # 返回
/// - Ok(R): 操作成功，乐观变更保留
/// - Err: 操作失败，状态已恢复为变更前快照
pub async fn with_optimistic_update<S, R, F, Fut>(
    state: &Mutex<S>,
    apply: F,
    operation: Fut,
) -> anyhow::Result<R>
where
    S: Clone,
    F: FnOnce(&mut S),
    Fut: Future<Output = anyhow::Result<R>>,
{
    let snapshot = {
        let mut guard = lock(state);
        let snapshot = (*guard).clone();
        apply(&mut *guard);
        snapshot
    };
    debug!("乐观变更已应用");

    match operation.await {
        Ok(result) => Ok(result),
        Err(err) => {
            warn!(error = %err, "远端操作失败，回滚乐观变更");
            *lock(state) = snapshot;
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[tokio::test]
    async fn test_success_keeps_change() {
        let state = Mutex::new(vec![1, 2, 3]);
        let result =
            with_optimistic_update(&state, |rows| rows.push(4), async { Ok("saved") }).await;

        assert_eq!(result.unwrap(), "saved");
        assert_eq!(*state.lock().unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_failure_restores_snapshot() {
        let state = Mutex::new(vec![1, 2, 3]);
        let result: anyhow::Result<()> =
            with_optimistic_update(&state, |rows| rows.retain(|r| *r != 2), async {
                Err(anyhow!("network down"))
            })
            .await;

        assert!(result.is_err());
        assert_eq!(*state.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_change_visible_while_pending() {
        let state = Mutex::new(0);
        let result = with_optimistic_update(&state, |n| *n = 42, async {
            // 等待期间状态已是乐观值
            assert_eq!(*state.lock().unwrap(), 42);
            Ok(())
        })
        .await;

        assert!(result.is_ok());
    }
}
