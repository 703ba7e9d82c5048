//! Pharmacy fulfilment queue: entries, filtering and counts.

use crate::error::CoreError;
use crate::models::{PrescriptionStatus, Priority};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueMedication {
    pub name: String,
    pub quantity: u32,
    #[serde(default = "in_stock_default")]
    pub in_stock: bool,
}

fn in_stock_default() -> bool {
    true
}

/// A prescription waiting at, or being worked on by, the pharmacy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntry {
    pub id: u64,
    pub prescription_number: String,
    pub patient_name: String,
    pub patient_id: String,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub medications: Vec<QueueMedication>,
    pub priority: Priority,
    pub status: PrescriptionStatus,
    pub prescribed_date: NaiveDateTime,
    #[serde(default)]
    pub queue_position: Option<u32>,
    /// Minutes.
    #[serde(default, rename = "estimatedTime")]
    pub estimated_minutes: Option<u32>,
    #[serde(default)]
    pub processing_by: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl QueueEntry {
    pub fn total_items(&self) -> usize {
        self.medications.len()
    }

    pub fn has_stock_shortage(&self) -> bool {
        self.medications.iter().any(|m| !m.in_stock)
    }

    fn matches_search(&self, needle: &str) -> bool {
        [
            &self.prescription_number,
            &self.patient_name,
            &self.patient_id,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }
}

/// Either every value or exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection<T> {
    #[default]
    All,
    Only(T),
}

impl<T: PartialEq> Selection<T> {
    pub fn admits(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(wanted) => wanted == value,
        }
    }
}

impl<T: fmt::Display> fmt::Display for Selection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Only(value) => value.fmt(f),
        }
    }
}

impl<T: FromStr<Err = CoreError>> FromStr for Selection<T> {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueFilter {
    pub status: Selection<PrescriptionStatus>,
    pub priority: Selection<Priority>,
    pub search: Option<String>,
}

impl Default for QueueFilter {
    /// Pending work of any priority.
    fn default() -> Self {
        Self {
            status: Selection::Only(PrescriptionStatus::Pending),
            priority: Selection::All,
            search: None,
        }
    }
}

impl QueueFilter {
    pub fn admits(&self, entry: &QueueEntry) -> bool {
        if !self.status.admits(&entry.status) || !self.priority.admits(&entry.priority) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => entry.matches_search(&term.to_lowercase()),
            _ => true,
        }
    }

    /// Matching entries in their original order.
    pub fn apply(&self, entries: &[QueueEntry]) -> Vec<QueueEntry> {
        entries
            .iter()
            .filter(|entry| self.admits(entry))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatistics {
    pub pending: usize,
    pub in_progress: usize,
    pub completed: usize,
    /// Open entries at urgent priority or above.
    pub urgent: usize,
}

impl QueueStatistics {
    pub fn from_entries(entries: &[QueueEntry]) -> Self {
        entries.iter().fold(Self::default(), |mut stats, entry| {
            match entry.status {
                PrescriptionStatus::Pending => stats.pending += 1,
                PrescriptionStatus::InProgress => stats.in_progress += 1,
                PrescriptionStatus::Completed | PrescriptionStatus::Dispensed => {
                    stats.completed += 1
                }
                _ => {}
            }
            if entry.priority >= Priority::Urgent && !entry.status.is_closed() {
                stats.urgent += 1;
            }
            stats
        })
    }
}
