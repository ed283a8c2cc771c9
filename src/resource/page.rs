// ==========================================
// 车队管理后台核心 - 资源页控制器
// ==========================================
// 职责: 持有行存储、数据表与导入向导；
//       新增/编辑/删除/导入均为乐观更新，失败回滚并推送提示
// 说明: 行存储是唯一的写入点，每次变更后整体推送到数据表
// ==========================================

use crate::config::ConfigReader;
use crate::i18n;
use crate::import::{ConfirmedImport, ImportResult, ImportStep, ImportWizard, UploadedFile};
use crate::optimistic::{lock, with_optimistic_update};
use crate::resource::error::{ResourceError, ResourceResult};
use crate::resource::service::ResourceService;
use crate::resource::{build_import_wizard, build_table, Resource};
use crate::table::DataTable;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tracing::{info, instrument, warn};

// ==========================================
// 提示与意图
// ==========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// 轻提示（toast）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// 工具栏按钮触发的页面意图（由界面层打开对应表单/对话框）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageIntent {
    OpenAddForm,
    OpenImport,
}

// ==========================================
// ResourcePage - 资源页
// ==========================================
pub struct ResourcePage<T, S>
where
    T: Resource,
    S: ResourceService<T>,
{
    service: Arc<S>,
    store: Arc<Mutex<Vec<T>>>,
    table: DataTable<T>,
    wizard: ImportWizard<T>,
    notices: VecDeque<Notice>,
    intents: Arc<Mutex<VecDeque<PageIntent>>>,
}

impl<T, S> ResourcePage<T, S>
where
    T: Resource,
    S: ResourceService<T> + 'static,
{
    pub fn new(service: Arc<S>, config: &dyn ConfigReader) -> Self {
        let intents: Arc<Mutex<VecDeque<PageIntent>>> = Arc::new(Mutex::new(VecDeque::new()));

        let add_intents = intents.clone();
        let import_intents = intents.clone();
        let table = build_table::<T>(config)
            .with_add(i18n::t("resource.add_label"), move || {
                lock(&add_intents).push_back(PageIntent::OpenAddForm);
            })
            .with_import(i18n::t("resource.import_label"), move || {
                lock(&import_intents).push_back(PageIntent::OpenImport);
            });

        Self {
            service,
            store: Arc::new(Mutex::new(Vec::new())),
            table,
            wizard: build_import_wizard::<T>(config),
            notices: VecDeque::new(),
            intents,
        }
    }

    // ==========================================
    // 访问器
    // ==========================================

    pub fn table(&self) -> &DataTable<T> {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut DataTable<T> {
        &mut self.table
    }

    pub fn wizard(&self) -> &ImportWizard<T> {
        &self.wizard
    }

    pub fn wizard_mut(&mut self) -> &mut ImportWizard<T> {
        &mut self.wizard
    }

    /// 行存储快照
    pub fn rows(&self) -> Vec<T> {
        lock(&self.store).clone()
    }

    /// 取出待处理的提示
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// 取出待处理的页面意图
    pub fn take_intents(&self) -> Vec<PageIntent> {
        lock(&self.intents).drain(..).collect()
    }

    fn sync_table(&mut self) {
        let rows = lock(&self.store).clone();
        self.table.set_data(rows);
    }

    fn notify_error(&mut self, key: &str, err: &anyhow::Error) -> ResourceError {
        self.notices
            .push_back(Notice::error(i18n::t_with_args(key, &[("reason", &err.to_string())])));
        ResourceError::Service(err.to_string())
    }

    // ==========================================
    // 数据加载
    // ==========================================

    /// 从远端重新加载全部记录
    #[instrument(skip(self), fields(resource = T::RESOURCE_ID))]
    pub async fn reload(&mut self) -> ResourceResult<usize> {
        match self.service.list().await {
            Ok(rows) => {
                let count = rows.len();
                *lock(&self.store) = rows;
                self.sync_table();
                info!(count, "记录已加载");
                Ok(count)
            }
            Err(err) => {
                warn!(error = %err, "加载失败");
                Err(self.notify_error("resource.load_failed", &err))
            }
        }
    }

    // ==========================================
    // 新增 / 编辑
    // ==========================================

    /// 新增记录（先插入本地，服务端返回后替换为服务端版本）
    #[instrument(skip(self, item), fields(resource = T::RESOURCE_ID, id = item.id()))]
    pub async fn add(&mut self, item: T) -> ResourceResult<T> {
        let service = self.service.clone();
        let optimistic = item.clone();
        let result = with_optimistic_update(
            &self.store,
            |rows| rows.push(optimistic),
            service.create(item.clone()),
        )
        .await;

        match result {
            Ok(created) => {
                {
                    let mut rows = lock(&self.store);
                    if let Some(slot) = rows.iter_mut().find(|r| r.id() == item.id()) {
                        *slot = created.clone();
                    }
                }
                self.sync_table();
                self.notices
                    .push_back(Notice::success(i18n::t("resource.created")));
                Ok(created)
            }
            Err(err) => {
                self.sync_table();
                Err(self.notify_error("resource.save_failed", &err))
            }
        }
    }

    /// 编辑记录
    #[instrument(skip(self, item), fields(resource = T::RESOURCE_ID, id = item.id()))]
    pub async fn edit(&mut self, item: T) -> ResourceResult<T> {
        if !lock(&self.store).iter().any(|r| r.id() == item.id()) {
            return Err(ResourceError::NotFound(item.id().to_string()));
        }

        let service = self.service.clone();
        let optimistic = item.clone();
        let result = with_optimistic_update(
            &self.store,
            |rows| {
                if let Some(slot) = rows.iter_mut().find(|r| r.id() == optimistic.id()) {
                    *slot = optimistic;
                }
            },
            service.update(item.clone()),
        )
        .await;

        match result {
            Ok(updated) => {
                {
                    let mut rows = lock(&self.store);
                    if let Some(slot) = rows.iter_mut().find(|r| r.id() == item.id()) {
                        *slot = updated.clone();
                    }
                }
                self.sync_table();
                self.notices
                    .push_back(Notice::success(i18n::t("resource.updated")));
                Ok(updated)
            }
            Err(err) => {
                self.sync_table();
                Err(self.notify_error("resource.save_failed", &err))
            }
        }
    }

    // ==========================================
    // 删除
    // ==========================================

    /// 确认批量删除（数据表已清空选择，远端失败时回滚行存储）
    pub async fn delete_selected(&mut self) -> ResourceResult<usize> {
        let rows = self.table.confirm_bulk_delete()?;
        let ids: Vec<String> = rows.iter().map(|r| r.id().to_string()).collect();
        self.delete_ids(ids).await
    }

    /// 删除单行（行操作）
    pub async fn delete_row(&mut self, id: &str) -> ResourceResult<usize> {
        if self.table.row_by_id(id).is_none() {
            return Err(ResourceError::NotFound(id.to_string()));
        }
        self.delete_ids(vec![id.to_string()]).await
    }

    #[instrument(skip(self, ids), fields(resource = T::RESOURCE_ID, count = ids.len()))]
    async fn delete_ids(&mut self, ids: Vec<String>) -> ResourceResult<usize> {
        let count = ids.len();
        let service = self.service.clone();
        let removed = ids.clone();
        let result = with_optimistic_update(
            &self.store,
            |rows| rows.retain(|r| !removed.iter().any(|id| id == r.id())),
            service.delete_many(ids),
        )
        .await;
        self.sync_table();

        match result {
            Ok(()) => {
                info!(count, "记录已删除");
                self.notices
                    .push_back(Notice::success(i18n::t_count("table.deleted", count)));
                Ok(count)
            }
            Err(err) => Err(self.notify_error("resource.delete_failed", &err)),
        }
    }

    // ==========================================
    // 导入
    // ==========================================

    pub fn open_import(&mut self) {
        self.wizard.open();
    }

    pub fn close_import(&mut self) {
        self.wizard.close();
    }

    /// 上传文件；解析失败时推送提示并停留在上传步骤
    pub async fn upload(&mut self, file: UploadedFile) -> ImportResult<ImportStep> {
        let result = self.wizard.upload(file).await;
        if let Err(err) = &result {
            self.notices.push_back(Notice::error(err.user_message()));
        }
        result
    }

    /// 确认导入并写入远端
    #[instrument(skip(self), fields(resource = T::RESOURCE_ID))]
    pub async fn confirm_import(&mut self) -> ResourceResult<usize> {
        let ConfirmedImport { rows, report } = match self.wizard.confirm() {
            Ok(confirmed) => confirmed,
            Err(err) => {
                self.notices.push_back(Notice::error(err.user_message()));
                return Err(err.into());
            }
        };

        let service = self.service.clone();
        let optimistic = rows.clone();
        let result = with_optimistic_update(
            &self.store,
            |store| store.extend(optimistic),
            service.import_many(rows),
        )
        .await;
        self.sync_table();

        match result {
            Ok(written) => {
                info!(written, skipped = report.skipped.len(), "导入完成");
                self.notices
                    .push_back(Notice::success(i18n::t_count("import.success", written)));
                Ok(written)
            }
            Err(err) => Err(self.notify_error("resource.import_failed", &err)),
        }
    }
}
