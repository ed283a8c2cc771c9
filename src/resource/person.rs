// ==========================================
// 车队管理后台核心 - 人员资源（乘客/联系人）
// ==========================================

use crate::import::{DataCleaner, DataCleanerImpl, FieldDescriptor, MappedRecord, SkipReason};
use crate::resource::{new_record_id, Resource};
use crate::table::{ColumnDescriptor, FilterDescriptor, FilterOption, SearchDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PersonRole {
    Passenger, // 乘客
    Contact,   // 客户联系人
    Guide,     // 导游
}

impl PersonRole {
    pub const ALL: [PersonRole; 3] = [
        PersonRole::Passenger,
        PersonRole::Contact,
        PersonRole::Guide,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            PersonRole::Passenger => "passenger",
            PersonRole::Contact => "contact",
            PersonRole::Guide => "guide",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PersonRole::Passenger => "乘客",
            PersonRole::Contact => "联系人",
            PersonRole::Guide => "导游",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "passenger" | "passager" | "乘客" => Some(PersonRole::Passenger),
            "contact" | "client" | "联系人" => Some(PersonRole::Contact),
            "guide" | "accompagnateur" | "导游" => Some(PersonRole::Guide),
            _ => None,
        }
    }
}

impl fmt::Display for PersonRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonRole::Passenger => write!(f, "PASSENGER"),
            PersonRole::Contact => write!(f, "CONTACT"),
            PersonRole::Guide => write!(f, "GUIDE"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: PersonRole,
    pub company: Option<String>,
}

impl Person {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl Resource for Person {
    const RESOURCE_ID: &'static str = "people";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            ColumnDescriptor::new("name", "姓名", |p: &Person| p.full_name())
                .sortable()
                .fixed(),
            ColumnDescriptor::new("email", "邮箱", |p: &Person| p.email.clone().unwrap_or_default()),
            ColumnDescriptor::new("phone", "电话", |p: &Person| p.phone.clone().unwrap_or_default()),
            ColumnDescriptor::new("role", "身份", |p: &Person| p.role.label().to_string()),
            ColumnDescriptor::new("company", "单位", |p: &Person| {
                p.company.clone().unwrap_or_default()
            })
            .sortable(),
        ]
    }

    fn filters() -> Vec<FilterDescriptor<Self>> {
        vec![FilterDescriptor::new(
            "role",
            "身份",
            PersonRole::ALL
                .iter()
                .map(|r| FilterOption::new(r.label(), r.code()))
                .collect(),
            |p: &Person| p.role.code().to_string(),
        )]
    }

    fn search() -> Option<SearchDescriptor<Self>> {
        Some(
            SearchDescriptor::new("搜索姓名、邮箱或电话")
                .field(|p: &Person| p.full_name())
                .field(|p: &Person| p.email.clone().unwrap_or_default())
                .field(|p: &Person| p.phone.clone().unwrap_or_default()),
        )
    }

    fn import_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("first_name", "名").required().alias("prénom").alias("given name"),
            FieldDescriptor::new("last_name", "姓").required().alias("surname").alias("family name"),
            FieldDescriptor::new("email", "邮箱").alias("mail"),
            FieldDescriptor::new("phone", "电话").alias("téléphone").alias("tel"),
            FieldDescriptor::new("role", "身份")
                .hint("passenger / contact / guide")
                .alias("role"),
            FieldDescriptor::new("company", "单位").alias("société"),
        ]
    }

    fn sample_headers() -> Vec<String> {
        ["first name", "last name", "email", "phone", "role", "company"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn from_import(record: &MappedRecord) -> Result<Self, SkipReason> {
        let cleaner = DataCleanerImpl;

        let email = record.get("email").map(|e| e.to_lowercase());
        if let Some(e) = &email {
            if !e.contains('@') {
                return Err(SkipReason::invalid("email", format!("邮箱格式错误: {}", e)));
            }
        }

        let role = match record.get("role") {
            None => PersonRole::Passenger,
            Some(raw) => PersonRole::parse(raw)
                .ok_or_else(|| SkipReason::invalid("role", format!("未知身份: {}", raw)))?,
        };

        Ok(Person {
            id: new_record_id(),
            first_name: cleaner.clean_text(record.require("first_name")?, false),
            last_name: cleaner.clean_text(record.require("last_name")?, false),
            email,
            phone: record
                .get("phone")
                .map(|p| cleaner.clean_phone(p))
                .filter(|p| !p.is_empty()),
            role,
            company: cleaner.normalize_null(record.get("company").map(str::to_string)),
        })
    }

    fn import_key_field() -> Option<&'static str> {
        Some("email")
    }

    fn import_key(&self) -> String {
        self.email.clone().unwrap_or_default()
    }
}
