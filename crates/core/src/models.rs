//! View models for the prescription and medication resources.
//!
//! These mirror the backend's JSON (camelCase keys, SCREAMING_SNAKE_CASE enums) and are
//! transient copies: the backend owns the records.

use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().replace(['-', ' '], "_").to_ascii_uppercase();
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| CoreError::$err(s.to_owned()))
            }
        }
    };
}

wire_enum! {
    /// Lifecycle state of a prescription.
    PrescriptionStatus, UnknownStatus {
        Pending => "PENDING",
        InProgress => "IN_PROGRESS",
        Active => "ACTIVE",
        OnHold => "ON_HOLD",
        Completed => "COMPLETED",
        Dispensed => "DISPENSED",
        Cancelled => "CANCELLED",
        Expired => "EXPIRED",
    }
}

impl PrescriptionStatus {
    /// Statuses that no longer need pharmacy work.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Dispensed | Self::Cancelled | Self::Expired
        )
    }
}

wire_enum! {
    /// Fulfilment priority, ordered from least to most pressing.
    Priority, UnknownPriority {
        Low => "LOW",
        Normal => "NORMAL",
        High => "HIGH",
        Urgent => "URGENT",
        Critical => "CRITICAL",
    }
}

wire_enum! {
    PaymentMethod, UnknownPaymentMethod {
        Cash => "CASH",
        CreditCard => "CREDIT_CARD",
        DebitCard => "DEBIT_CARD",
        Insurance => "INSURANCE",
        MobilePayment => "MOBILE_PAYMENT",
    }
}

impl Default for PaymentMethod {
    fn default() -> Self {
        Self::Cash
    }
}

/// One medication line on a prescription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedMedication {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub medication_id: Option<u64>,
    #[serde(alias = "medicationName")]
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    pub quantity: i64,
    #[serde(default)]
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub id: u64,
    #[serde(default)]
    pub prescription_number: Option<String>,
    #[serde(default)]
    pub patient_id: Option<String>,
    #[serde(default)]
    pub patient_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    pub status: PrescriptionStatus,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub prescribed_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub medications: Vec<PrescribedMedication>,
}

/// Catalogue entry for a stocked medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Medication {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub brand_names: Vec<String>,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub stock_level: Option<i64>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub requires_prescription: bool,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

impl Medication {
    pub fn is_low_stock(&self, threshold: i64) -> bool {
        self.stock_level.is_some_and(|level| level <= threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: u64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Postal address; every part is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}
