// ==========================================
// 车队管理后台核心 - 资源页层
// ==========================================
// 职责: 各业务资源（车辆、人员、员工、预订）的表格描述符、
//       导入字段与行转换，以及页面控制器
// ==========================================

pub mod bus;
pub mod error;
pub mod page;
pub mod person;
pub mod reservation;
pub mod service;
pub mod staff;

pub use bus::{Bus, BusStatus, BusType};
pub use error::{ResourceError, ResourceResult};
pub use page::{Notice, NoticeLevel, PageIntent, ResourcePage};
pub use person::{Person, PersonRole};
pub use reservation::{Reservation, ReservationStatus};
pub use service::ResourceService;
pub use staff::{StaffMember, StaffRole};

use crate::config::ConfigReader;
use crate::i18n;
use crate::import::{FieldDescriptor, ImportWizard, MappedRecord, SkipReason};
use crate::table::{ColumnDescriptor, DataTable, FilterDescriptor, RowAction, SearchDescriptor};

/// 行操作 ID
pub const ACTION_EDIT: &str = "edit";
pub const ACTION_DELETE: &str = "delete";

// ==========================================
// Resource Trait
// ==========================================
// 用途: 资源类型的表格/导入元数据
// 实现者: Bus, Person, StaffMember, Reservation
pub trait Resource: Clone + Send + Sync + 'static {
    /// 资源标识（日志字段）
    const RESOURCE_ID: &'static str;

    /// 稳定的行 ID
    fn id(&self) -> &str;

    fn columns() -> Vec<ColumnDescriptor<Self>>;

    fn filters() -> Vec<FilterDescriptor<Self>> {
        Vec::new()
    }

    fn search() -> Option<SearchDescriptor<Self>> {
        None
    }

    /// 行操作（默认: 编辑 + 删除）
    fn row_actions(&self) -> Vec<RowAction> {
        vec![
            RowAction::new(ACTION_EDIT, i18n::t("resource.action_edit")),
            RowAction::new(ACTION_DELETE, i18n::t("resource.action_delete")).destructive(),
        ]
    }

    fn import_fields() -> Vec<FieldDescriptor>;

    /// 示例表头（与 import_fields 按位置对应）
    fn sample_headers() -> Vec<String> {
        Vec::new()
    }

    /// 导入行转换
    fn from_import(record: &MappedRecord) -> Result<Self, SkipReason>;

    /// 导入唯一键字段（None 表示不去重）
    fn import_key_field() -> Option<&'static str> {
        None
    }

    fn import_key(&self) -> String {
        String::new()
    }
}

/// 按资源元数据构建数据表（稳定行 ID、搜索、筛选、行操作）
pub fn build_table<R: Resource>(config: &dyn ConfigReader) -> DataTable<R> {
    let mut table = DataTable::new(R::columns(), config)
        .with_row_id(|row: &R, _| row.id().to_string())
        .with_filters(R::filters())
        .with_row_actions(|row: &R| row.row_actions());
    if let Some(search) = R::search() {
        table = table.with_search(search);
    }
    table
}

/// 按资源元数据构建导入向导
pub fn build_import_wizard<R: Resource>(config: &dyn ConfigReader) -> ImportWizard<R> {
    let wizard = ImportWizard::new(R::import_fields(), config, R::from_import)
        .with_sample_headers(R::sample_headers());
    match R::import_key_field() {
        Some(field) => wizard.with_unique_key(field, |row: &R| row.import_key()),
        None => wizard,
    }
}

/// 导入记录的新 ID
pub(crate) fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
