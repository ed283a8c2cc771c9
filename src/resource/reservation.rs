// ==========================================
// 车队管理后台核心 - 预订资源
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
pub enum ReservationStatus {
    Pending,   // 待确认
    Confirmed, // 已确认
    Completed, // 已完成
    Cancelled, // 已取消
}

impl ReservationStatus {
    pub const ALL: [ReservationStatus; 4] = [
        ReservationStatus::Pending,
        ReservationStatus::Confirmed,
        ReservationStatus::Completed,
        ReservationStatus::Cancelled,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Completed => "completed",
            ReservationStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReservationStatus::Pending => "待确认",
            ReservationStatus::Confirmed => "已确认",
            ReservationStatus::Completed => "已完成",
            ReservationStatus::Cancelled => "已取消",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pending" | "en attente" | "待确认" => Some(ReservationStatus::Pending),
            "confirmed" | "confirmée" | "已确认" => Some(ReservationStatus::Confirmed),
            "completed" | "done" | "terminée" | "已完成" => Some(ReservationStatus::Completed),
            "cancelled" | "canceled" | "annulée" | "已取消" => Some(ReservationStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReservationStatus::Pending => write!(f, "PENDING"),
            ReservationStatus::Confirmed => write!(f, "CONFIRMED"),
            ReservationStatus::Completed => write!(f, "COMPLETED"),
            ReservationStatus::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    pub reference: String,
    pub customer_name: String,
    pub bus_plate: Option<String>,
    pub pickup: String,
    pub destination: String,
    pub departure: NaiveDate,
    pub passengers: u32,
    pub status: ReservationStatus,
    pub price: Option<f64>,
}

impl Resource for Reservation {
    const RESOURCE_ID: &'static str = "reservations";

    fn id(&self) -> &str {
        &self.id
    }

    fn columns() -> Vec<ColumnDescriptor<Self>> {
        vec![
            ColumnDescriptor::new("reference", "预订号", |r: &Reservation| r.reference.clone())
                .sortable()
                .fixed(),
            ColumnDescriptor::new("customer_name", "客户", |r: &Reservation| {
                r.customer_name.clone()
            })
            .sortable(),
            ColumnDescriptor::new("route", "行程", |r: &Reservation| {
                format!("{} → {}", r.pickup, r.destination)
            }),
            ColumnDescriptor::new("departure", "出发日期", |r: &Reservation| {
                r.departure.to_string()
            })
            .sort_by(|r| SortValue::Date(r.departure)),
            ColumnDescriptor::new("passengers", "人数", |r: &Reservation| {
                r.passengers.to_string()
            })
            .sort_by(|r| SortValue::Number(r.passengers as f64)),
            ColumnDescriptor::new("bus_plate", "车辆", |r: &Reservation| {
                r.bus_plate.clone().unwrap_or_default()
            }),
            ColumnDescriptor::new("status", "状态", |r: &Reservation| {
                r.status.label().to_string()
            }),
            ColumnDescriptor::new("price", "金额", |r: &Reservation| {
                r.price.map(|p| format!("{:.2}", p)).unwrap_or_default()
            })
            .sort_by(|r| SortValue::from(r.price)),
        ]
    }

    fn filters() -> Vec<FilterDescriptor<Self>> {
        vec![FilterDescriptor::new(
            "status",
            "状态",
            ReservationStatus::ALL
                .iter()
                .map(|s| FilterOption::new(s.label(), s.code()))
                .collect(),
            |r: &Reservation| r.status.code().to_string(),
        )]
    }

    fn search() -> Option<SearchDescriptor<Self>> {
        Some(
            SearchDescriptor::new("搜索预订号、客户或目的地")
                .field(|r: &Reservation| r.reference.clone())
                .field(|r: &Reservation| r.customer_name.clone())
                .field(|r: &Reservation| r.destination.clone()),
        )
    }

    fn import_fields() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("reference", "预订号").required().alias("référence"),
            FieldDescriptor::new("customer_name", "客户").required().alias("client"),
            FieldDescriptor::new("pickup", "出发地").required().alias("départ"),
            FieldDescriptor::new("destination", "目的地").required(),
            FieldDescriptor::new("departure", "出发日期")
                .required()
                .hint("YYYY-MM-DD")
                .alias("date"),
            FieldDescriptor::new("passengers", "人数").alias("passagers").alias("pax"),
            FieldDescriptor::new("bus_plate", "车辆").alias("immatriculation"),
            FieldDescriptor::new("status", "状态").alias("statut"),
            FieldDescriptor::new("price", "金额").alias("prix").alias("amount"),
        ]
    }

    fn sample_headers() -> Vec<String> {
        [
            "reference",
            "customer",
            "pickup",
            "destination",
            "departure date",
            "passengers",
            "bus",
            "status",
            "price",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    fn from_import(record: &MappedRecord) -> Result<Self, SkipReason> {
        let cleaner = DataCleanerImpl;

        let departure = record
            .parse_date("departure")?
            .ok_or_else(|| SkipReason::missing("departure"))?;

        let passengers = record.parse_int("passengers")?.unwrap_or(1);
        if passengers <= 0 || passengers > u32::MAX as i64 {
            return Err(SkipReason::invalid(
                "passengers",
                format!("人数必须大于 0: {}", passengers),
            ));
        }

        let status = match record.get("status") {
            None => ReservationStatus::Pending,
            Some(raw) => ReservationStatus::parse(raw)
                .ok_or_else(|| SkipReason::invalid("status", format!("未知状态: {}", raw)))?,
        };

        let price = record.parse_number("price")?;
        if let Some(p) = price {
            if p < 0.0 {
                return Err(SkipReason::invalid("price", format!("金额不能为负: {}", p)));
            }
        }

        Ok(Reservation {
            id: new_record_id(),
            reference: cleaner.clean_text(record.require("reference")?, true),
            customer_name: cleaner.clean_text(record.require("customer_name")?, false),
            bus_plate: cleaner.clean_code(record.get("bus_plate").map(str::to_string)),
            pickup: cleaner.clean_text(record.require("pickup")?, false),
            destination: cleaner.clean_text(record.require("destination")?, false),
            departure,
            passengers: passengers as u32,
            status,
            price,
        })
    }

    fn import_key_field() -> Option<&'static str> {
        Some("reference")
    }

    fn import_key(&self) -> String {
        self.reference.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(values: &[(&str, &str)]) -> MappedRecord {
        let mut record = MappedRecord::new(2);
        for (k, v) in values {
            record.insert(*k, *v);
        }
        record
    }

    fn base() -> Vec<(&'static str, &'static str)> {
        vec![
            ("reference", "r-001"),
            ("customer_name", "École Jules Ferry"),
            ("pickup", "Lyon"),
            ("destination", "Annecy"),
            ("departure", "15/06/2025"),
        ]
    }

    #[test]
    fn test_from_import_defaults() {
        let reservation = Reservation::from_import(&record(&base())).unwrap();
        assert_eq!(reservation.reference, "R-001");
        assert_eq!(reservation.passengers, 1);
        assert_eq!(reservation.status, ReservationStatus::Pending);
        assert_eq!(
            reservation.departure,
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_from_import_rejects_negative_price() {
        let mut values = base();
        values.push(("price", "-10"));
        let err = Reservation::from_import(&record(&values)).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("price"));
    }

    #[test]
    fn test_from_import_requires_departure() {
        let values: Vec<_> = base().into_iter().filter(|(k, _)| *k != "departure").collect();
        let err = Reservation::from_import(&record(&values)).unwrap_err();
        assert_eq!(err.field.as_deref(), Some("departure"));
    }
}
