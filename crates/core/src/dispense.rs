//! Pharmacy dispensing record.
//!
//! A [`DispenseForm`] is filled in at the counter against a [`Prescription`]. Validation is a
//! single batch pass over every line item plus the record-level checks, and a request for the
//! backend can only be built from a form that passes it.

use crate::models::{PaymentMethod, PrescribedMedication, Prescription};
use chrono::{DateTime, NaiveDate, Utc};
use hms_types::{NonEmptyText, Quantity};
use serde::Serialize;
use std::collections::BTreeMap;

/// Counter-side state for one prescribed medication.
#[derive(Debug, Clone, PartialEq)]
pub struct DispenseLine {
    pub medication: PrescribedMedication,
    pub dispensed_quantity: i64,
    pub batch_number: String,
    pub expiry_date: Option<NaiveDate>,
    pub substituted: bool,
    pub substitute_reason: String,
    pub price: f64,
}

impl DispenseLine {
    fn from_prescribed(medication: &PrescribedMedication) -> Self {
        Self {
            dispensed_quantity: medication.quantity,
            medication: medication.clone(),
            batch_number: String::new(),
            expiry_date: None,
            substituted: false,
            substitute_reason: String::new(),
            price: 0.0,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.price * self.dispensed_quantity as f64
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DispenseForm {
    pub lines: Vec<DispenseLine>,
    pub patient_counseling: bool,
    pub counseling_notes: String,
    pub patient_signature: bool,
    pub pharmacist_notes: String,
    pub payment_method: PaymentMethod,
    pub payment_received: bool,
    pub insurance_claim: bool,
    pub insurance_details: String,
}

/// Field errors keyed `medication_{index}_{field}`, `patientSignature` or `payment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} dispensing field(s) need attention", .0.len())]
pub struct DispenseErrors(BTreeMap<String, String>);

impl DispenseErrors {
    fn insert(&mut self, key: impl Into<String>, message: &str) {
        self.0.insert(key.into(), message.to_owned());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }
}

fn line_key(index: usize, field: &str) -> String {
    format!("medication_{index}_{field}")
}

impl DispenseForm {
    /// Starts a form with each line defaulting to the prescribed quantity and payment in cash.
    pub fn from_prescription(prescription: &Prescription) -> Self {
        Self {
            lines: prescription
                .medications
                .iter()
                .map(DispenseLine::from_prescribed)
                .collect(),
            patient_counseling: false,
            counseling_notes: String::new(),
            patient_signature: false,
            pharmacist_notes: String::new(),
            payment_method: PaymentMethod::default(),
            payment_received: false,
            insurance_claim: false,
            insurance_details: String::new(),
        }
    }

    pub fn validate(&self) -> Result<(), DispenseErrors> {
        let mut errors = DispenseErrors::default();

        for (i, line) in self.lines.iter().enumerate() {
            if line.batch_number.trim().is_empty() {
                errors.insert(line_key(i, "batchNumber"), "Batch number required");
            }
            if line.expiry_date.is_none() {
                errors.insert(line_key(i, "expiryDate"), "Expiry date required");
            }
            if !Quantity::is_valid(line.dispensed_quantity) {
                errors.insert(line_key(i, "quantity"), "Invalid quantity");
            }
            if line.substituted && line.substitute_reason.trim().is_empty() {
                errors.insert(
                    line_key(i, "substituteReason"),
                    "Reason required for substitution",
                );
            }
        }

        if !self.patient_signature {
            errors.insert("patientSignature", "Patient signature required");
        }
        if !self.payment_received && !self.insurance_claim {
            errors.insert(
                "payment",
                "Payment confirmation or insurance claim required",
            );
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn total_amount(&self) -> f64 {
        self.lines.iter().map(DispenseLine::line_total).sum()
    }

    /// Builds the backend payload. Any validation failure yields no request at all.
    ///
    /// # Arguments
    ///
    /// * `prescription_id` - The prescription being filled.
    /// * `dispensed_by` - User id of the pharmacist.
    /// * `dispensed_at` - Timestamp recorded on the dispensing.
    ///
    /// # Errors
    ///
    /// Returns every failing field keyed as [`validate`](Self::validate) keys them.
    pub fn into_request(
        self,
        prescription_id: u64,
        dispensed_by: u64,
        dispensed_at: DateTime<Utc>,
    ) -> Result<DispenseRequest, DispenseErrors> {
        self.validate()?;
        let total_amount = self.total_amount();

        let mut errors = DispenseErrors::default();
        let mut medications = Vec::with_capacity(self.lines.len());
        for (i, line) in self.lines.into_iter().enumerate() {
            let batch_number = NonEmptyText::new(&line.batch_number).map_err(|_| {
                errors.insert(line_key(i, "batchNumber"), "Batch number required")
            });
            let quantity = Quantity::new(line.dispensed_quantity)
                .map_err(|_| errors.insert(line_key(i, "quantity"), "Invalid quantity"));
            let expiry_date = line
                .expiry_date
                .ok_or_else(|| errors.insert(line_key(i, "expiryDate"), "Expiry date required"));
            if let (Ok(batch_number), Ok(dispensed_quantity), Ok(expiry_date)) =
                (batch_number, quantity, expiry_date)
            {
                medications.push(DispensedMedication {
                    medication_id: line.medication.medication_id.or(line.medication.id),
                    name: line.medication.name,
                    prescribed_quantity: line.medication.quantity,
                    dispensed_quantity,
                    batch_number,
                    expiry_date,
                    substituted: line.substituted,
                    substitute_reason: line
                        .substituted
                        .then(|| NonEmptyText::new(&line.substitute_reason).ok())
                        .flatten(),
                    price: line.price,
                });
            }
        }
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(DispenseRequest {
            prescription_id,
            dispensed_by,
            dispensed_at,
            medications,
            total_amount,
            patient_counseling: self.patient_counseling,
            counseling_notes: self.counseling_notes,
            pharmacist_notes: self.pharmacist_notes,
            payment_method: self.payment_method,
            payment_received: self.payment_received,
            insurance_claim: self.insurance_claim,
            insurance_details: self.insurance_details,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispensedMedication {
    pub medication_id: Option<u64>,
    pub name: String,
    pub prescribed_quantity: i64,
    pub dispensed_quantity: Quantity,
    pub batch_number: NonEmptyText,
    pub expiry_date: NaiveDate,
    pub substituted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub substitute_reason: Option<NonEmptyText>,
    pub price: f64,
}

/// Body of `POST /prescriptions/{id}/dispense`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispenseRequest {
    pub prescription_id: u64,
    pub dispensed_by: u64,
    pub dispensed_at: DateTime<Utc>,
    pub medications: Vec<DispensedMedication>,
    pub total_amount: f64,
    pub patient_counseling: bool,
    pub counseling_notes: String,
    pub pharmacist_notes: String,
    pub payment_method: PaymentMethod,
    pub payment_received: bool,
    pub insurance_claim: bool,
    pub insurance_details: String,
}
