use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use strum::{Display, EnumString};

use super::identifier::EntityId;

/// Approval status of a recorded payment. Only `Approved` payments count
/// toward the advance paid against a quotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Unknown,
}

/// A partial payment recorded against a quotation before settlement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: Option<EntityId>,
    pub quotation_id: Option<EntityId>,
    pub amount: Decimal,
    pub status: PaymentStatus,
    pub paid_on: Option<DateTime<Utc>>,
    pub method: Option<String>,
}

impl Payment {
    pub fn approved(amount: Decimal) -> Self {
        Self {
            id: None,
            quotation_id: None,
            amount,
            status: PaymentStatus::Approved,
            paid_on: None,
            method: None,
        }
    }
}
