// ==========================================
// 车队管理后台核心 - 资源服务 Trait
// ==========================================
// 用途: 资源页的远端持久化接口（REST 客户端由应用层实现）
// 说明: 核心组件不直接访问网络，全部经由此接口回调
// ==========================================

use async_trait::async_trait;

#[async_trait]
pub trait ResourceService<T>: Send + Sync
where
    T: Send + 'static,
{
    /// 查询全部记录
    async fn list(&self) -> anyhow::Result<Vec<T>>;

    /// 新增记录
    ///
    /// # 返回
    /// - Ok(T): 服务端保存后的记录（可能带服务端生成的字段）
    async fn create(&self, item: T) -> anyhow::Result<T>;

    /// 更新记录
    async fn update(&self, item: T) -> anyhow::Result<T>;

    /// 按 ID 批量删除
    async fn delete_many(&self, ids: Vec<String>) -> anyhow::Result<()>;

    /// 批量导入
    ///
    /// # 返回
    /// - Ok(usize): 服务端实际写入的记录数
    async fn import_many(&self, items: Vec<T>) -> anyhow::Result<usize>;
}
