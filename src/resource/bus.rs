// ==========================================
// 车队管理后台核心 - 车辆资源
// ==========================================

use crate::import::{DataCleaner, DataCleanerImpl, FieldDescriptor, MappedRecord, SkipReason};
use crate::resource::{new_record_id, Resource};
use crate::table::{
    ColumnDescriptor, FilterDescriptor, FilterOption, SearchDescriptor, SortValue,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 车型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusType {
    Standard,    // 标准大巴
    Minibus,     // 中巴
    Coach,       // 旅游客车
    DoubleDecker, // 双层巴士
}

impl BusType {
    pub const ALL: [BusType; 4] = [
        BusType::Standard,
        BusType::Minibus,
        BusType::Coach,
        BusType::DoubleDecker,
    ];

    /// 筛选值
    pub fn code(&self) -> &'static str {
        match self {
            BusType::Standard => "standard",
            BusType::Minibus => "minibus",
            BusType::Coach => "coach",
            BusType::DoubleDecker => "double_decker",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BusType::Standard => "标准大巴",
            BusType::Minibus => "中巴",
            BusType::Coach => "旅游客车",
            BusType::DoubleDecker => "双层巴士",
        }
    }

    /// 解析导入文件中的车型写法
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "standard" | "bus" | "autobus" | "标准大巴" | "大巴" => Some(BusType::Standard),
            "minibus" | "mini_bus" | "中巴" => Some(BusType::Minibus),
            "coach" | "autocar" | "旅游客车" => Some(BusType::Coach),
            "double_decker" | "impériale" | "双层巴士" => Some(BusType::DoubleDecker),
            _ => None,
        }
    }
}

impl fmt::Display for BusType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusType::Standard => write!(f, "STANDARD"),
            BusType::Minibus => write!(f, "MINIBUS"),
            BusType::Coach => write!(f, "COACH"),
            BusType::DoubleDecker => write!(f, "DOUBLE_DECKER"),
        }
    }
}

// ==========================================
// 车辆状态
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BusStatus {
    Active,      // 运营中
    Maintenance, // 维修中
    Retired,     // 已退役
}

impl BusStatus {
    pub const ALL: [BusStatus; 3] = [BusStatus::Active, BusStatus::Maintenance, BusStatus::Retired];

    pub fn code(&self) -> &'static str {
        match self {
            BusStatus::Active => "active",
            BusStatus::Maintenance => "maintenance",
            BusStatus::Retired => "retired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BusStatus::Active => "运营中",
            BusStatus::Maintenance => "维修中",
            BusStatus::Retired => "已退役",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "active" | "actif" | "in service" | "运营中" => Some(BusStatus::Active),
            "maintenance" | "repair" | "en maintenance" | "维修中" => Some(BusStatus::Maintenance),
            "retired" | "inactive" | "retiré" | "已退役" => Some(BusStatus::Retired),
            _ => None,
        }
    }
}

impl fmt::Display for BusStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusStatus::Active => write!(f, "ACTIVE"),
            BusStatus::Maintenance => write!(f, "MAINTENANCE"),
            BusStatus::Retired => write!(f, "RETIRED"),
        }
    }
}

// ==========================================
// 车辆
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bus {
    pub id: String,
    pub plate: String,
    pub model: String,
    pub bus_type: BusType,
    pub seats: u32,
    pub status: BusStatus,
    pub driver_name: Option<String>,
    pub last_service: Option<NaiveDate>,
}

impl Resource for Bus {
    const RESOURCE_ID: &'static str = "buses";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            ColumnDescriptor::new("plate", "车牌", |b: &Bus| b.plate.clone())
                .sortable()
                .fixed(),
            ColumnDescriptor::new("model", "型号", |b: &Bus| b.model.clone()).sortable(),
            ColumnDescriptor::new("bus_type", "车型", |b: &Bus| b.bus_type.label().to_string()),
            ColumnDescriptor::new("seats", "座位数", |b: &Bus| b.seats.to_string())
                .sort_by(|b| SortValue::Number(b.seats as f64)),
            ColumnDescriptor::new("status", "状态", |b: &Bus| b.status.label().to_string()),
            ColumnDescriptor::new("driver_name", "司机", |b: &Bus| {
                b.driver_name.clone().unwrap_or_default()
            })
            .sortable(),
            ColumnDescriptor::new("last_service", "上次保养", |b: &Bus| {
                b.last_service.map(|d| d.to_string()).unwrap_or_default()
            })
            .sort_by(|b| SortValue::from(b.last_service)),
        ]
    }

    fn filters() -> Vec<FilterDescriptor<Self>> {
        vec![
            FilterDescriptor::new(
                "bus_type",
                "车型",
                BusType::ALL
                    .iter()
                    .map(|t| FilterOption::new(t.label(), t.code()))
                    .collect(),
                |b: &Bus| b.bus_type.code().to_string(),
            ),
            FilterDescriptor::new(
                "status",
                "状态",
                BusStatus::ALL
                    .iter()
                    .map(|s| FilterOption::new(s.label(), s.code()))
                    .collect(),
                |b: &Bus| b.status.code().to_string(),
            ),
        ]
    }

    fn search() -> Option<SearchDescriptor<Self>> {
        Some(
            SearchDescriptor::new("搜索车牌、型号或司机")
                .field(|b: &Bus| b.plate.clone())
                .field(|b: &Bus| b.model.clone())
                .field(|b: &Bus| b.driver_name.clone().unwrap_or_default()),
        )
    }

    fn import_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("plate", "车牌")
                .required()
                .alias("immatriculation")
                .alias("registration"),
            FieldDescriptor::new("model", "型号").alias("modèle"),
            FieldDescriptor::new("bus_type", "车型")
                .hint("standard / minibus / coach / double_decker")
                .alias("type"),
            FieldDescriptor::new("seats", "座位数")
                .required()
                .alias("places")
                .alias("capacity"),
            FieldDescriptor::new("status", "状态").alias("statut"),
            FieldDescriptor::new("driver_name", "司机").alias("chauffeur"),
            FieldDescriptor::new("last_service", "上次保养")
                .hint("YYYY-MM-DD")
                .alias("service"),
        ]
    }

    fn sample_headers() -> Vec<String> {
        ["plate", "model", "type", "seats", "status", "driver", "last service"]
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    fn from_import(record: &MappedRecord) -> Result<Self, SkipReason> {
        let cleaner = DataCleanerImpl;

        let plate = cleaner
            .clean_code(Some(record.require("plate")?.to_string()))
            .ok_or_else(|| SkipReason::missing("plate"))?;

        let bus_type = match record.get("bus_type") {
            None => BusType::Standard,
            Some(raw) => BusType::parse(raw)
                .ok_or_else(|| SkipReason::invalid("bus_type", format!("未知车型: {}", raw)))?,
        };

        let seats = record
            .parse_int("seats")?
            .ok_or_else(|| SkipReason::missing("seats"))?;
        if seats <= 0 || seats > u32::MAX as i64 {
            return Err(SkipReason::invalid("seats", format!("座位数必须大于 0: {}", seats)));
        }

        let status = match record.get("status") {
            None => BusStatus::Active,
            Some(raw) => BusStatus::parse(raw)
                .ok_or_else(|| SkipReason::invalid("status", format!("未知状态: {}", raw)))?,
        };

        Ok(Bus {
            id: new_record_id(),
            plate,
            model: cleaner.clean_text(record.get("model").unwrap_or(""), false),
            bus_type,
            seats: seats as u32,
            status,
            driver_name: cleaner.normalize_null(record.get("driver_name").map(str::to_string)),
            last_service: record.parse_date("last_service")?,
        })
    }

    fn import_key_field() -> Option<&'static str> {
        Some("plate")
    }

    fn import_key(&self) -> String {
        self.plate.clone()
    }
}
