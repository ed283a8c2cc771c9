// ==========================================
// 车队管理后台核心 - 员工资源
// ==========================================

use crate::import::{DataCleaner, DataCleanerImpl, FieldDescriptor, MappedRecord, SkipReason};
use crate::resource::{new_record_id, Resource};
use crate::table::{
    ColumnDescriptor, FilterDescriptor, FilterOption, SearchDescriptor, SortValue,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Driver,     // 司机
    Mechanic,   // 机修
    Dispatcher, // 调度
    Manager,    // 管理
}

impl StaffRole {
    pub const ALL: [StaffRole; 4] = [
        StaffRole::Driver,
        StaffRole::Mechanic,
        StaffRole::Dispatcher,
        StaffRole::Manager,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            StaffRole::Driver => "driver",
            StaffRole::Mechanic => "mechanic",
            StaffRole::Dispatcher => "dispatcher",
            StaffRole::Manager => "manager",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StaffRole::Driver => "司机",
            StaffRole::Mechanic => "机修",
            StaffRole::Dispatcher => "调度",
            StaffRole::Manager => "管理",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "driver" | "chauffeur" | "司机" => Some(StaffRole::Driver),
            "mechanic" | "mécanicien" | "机修" => Some(StaffRole::Mechanic),
            "dispatcher" | "régulateur" | "调度" => Some(StaffRole::Dispatcher),
            "manager" | "responsable" | "管理" => Some(StaffRole::Manager),
            _ => None,
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StaffRole::Driver => write!(f, "DRIVER"),
            StaffRole::Mechanic => write!(f, "MECHANIC"),
            StaffRole::Dispatcher => write!(f, "DISPATCHER"),
            StaffRole::Manager => write!(f, "MANAGER"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub full_name: String,
    pub role: StaffRole,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub license_expiry: Option<NaiveDate>,
    pub active: bool,
}

impl StaffMember {
    /// 驾照是否在指定日期前过期
    pub fn license_expires_before(&self, date: NaiveDate) -> bool {
        self.license_expiry.map(|d| d < date).unwrap_or(false)
    }
}

impl Resource for StaffMember {
    const RESOURCE_ID: &'static str = "staff";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            ColumnDescriptor::new("full_name", "姓名", |s: &StaffMember| s.full_name.clone())
                .sortable()
                .fixed(),
            ColumnDescriptor::new("role", "岗位", |s: &StaffMember| s.role.label().to_string()),
            ColumnDescriptor::new("phone", "电话", |s: &StaffMember| {
                s.phone.clone().unwrap_or_default()
            }),
            ColumnDescriptor::new("license_number", "驾照号", |s: &StaffMember| {
                s.license_number.clone().unwrap_or_default()
            }),
            ColumnDescriptor::new("license_expiry", "驾照到期", |s: &StaffMember| {
                s.license_expiry.map(|d| d.to_string()).unwrap_or_default()
            })
            .sort_by(|s| SortValue::from(s.license_expiry)),
            ColumnDescriptor::new("active", "在职", |s: &StaffMember| {
                String::from(if s.active { "是" } else { "否" })
            }),
        ]
    }

    fn filters() -> Vec<FilterDescriptor<Self>> {
        vec![
            FilterDescriptor::new(
                "role",
                "岗位",
                StaffRole::ALL
                    .iter()
                    .map(|r| FilterOption::new(r.label(), r.code()))
                    .collect(),
                |s: &StaffMember| s.role.code().to_string(),
            ),
            FilterDescriptor::new(
                "active",
                "在职状态",
                vec![
                    FilterOption::new("在职", "active"),
                    FilterOption::new("离职", "inactive"),
                ],
                |s: &StaffMember| {
                    String::from(if s.active { "active" } else { "inactive" })
                },
            ),
        ]
    }

    fn search() -> Option<SearchDescriptor<Self>> {
        Some(
            SearchDescriptor::new("搜索姓名、电话或驾照号")
                .field(|s: &StaffMember| s.full_name.clone())
                .field(|s: &StaffMember| s.phone.clone().unwrap_or_default())
                .field(|s: &StaffMember| s.license_number.clone().unwrap_or_default()),
        )
    }

    fn import_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("full_name", "姓名").required().alias("nom complet"),
            FieldDescriptor::new("role", "岗位").required().alias("poste"),
            FieldDescriptor::new("email", "邮箱").alias("mail"),
            FieldDescriptor::new("phone", "电话").alias("téléphone"),
            FieldDescriptor::new("license_number", "驾照号").alias("permis"),
            FieldDescriptor::new("license_expiry", "驾照到期")
                .hint("YYYY-MM-DD")
                .alias("expiration"),
            FieldDescriptor::new("active", "在职").hint("是/否").alias("actif"),
        ]
    }

    fn sample_headers() -> Vec<String> {
        ["name", "role", "email", "phone", "license", "license expiry", "active"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn from_import(record: &MappedRecord) -> Result<Self, SkipReason> {
        let cleaner = DataCleanerImpl;

        let raw_role = record.require("role")?;
        let role = StaffRole::parse(raw_role)
            .ok_or_else(|| SkipReason::invalid("role", format!("未知岗位: {}", raw_role)))?;

        let license_number = cleaner.clean_code(record.get("license_number").map(str::to_string));
        if role == StaffRole::Driver && license_number.is_none() {
            return Err(SkipReason::invalid("license_number", "司机必须填写驾照号"));
        }

        Ok(StaffMember {
            id: new_record_id(),
            full_name: cleaner.clean_text(record.require("full_name")?, false),
            role,
            email: record.get("email").map(|e| e.to_lowercase()),
            phone: record
                .get("phone")
                .map(|p| cleaner.clean_phone(p))
                .filter(|p| !p.is_empty()),
            license_number,
            license_expiry: record.parse_date("license_expiry")?,
            active: record.parse_flag("active")?.unwrap_or(true),
        })
    }

    fn import_key_field() -> Option<&'static str> {
        Some("license_number")
    }

    fn import_key(&self) -> String {
        self.license_number.clone().unwrap_or_default()
    }
}
