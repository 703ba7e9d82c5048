use crate::client::{ApiClient, Query};
use crate::error::ClientResult;
use chrono::Utc;
use hms_core::dispense::DispenseRequest;
use hms_core::models::{Prescription, PrescriptionStatus};
use hms_core::queue::QueueEntry;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct PrescriptionService {
    api: ApiClient,
}

impl PrescriptionService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, params: Query<'_>) -> ClientResult<Vec<Prescription>> {
        self.api.get_query("/prescriptions", params).await
    }

    pub async fn get(&self, id: u64) -> ClientResult<Prescription> {
        self.api.get(&format!("/prescriptions/{id}")).await
    }

    pub async fn create(&self, prescription: &Value) -> ClientResult<Prescription> {
        self.api.post("/prescriptions", prescription).await
    }

    pub async fn update(&self, id: u64, prescription: &Value) -> ClientResult<Prescription> {
        self.api.put(&format!("/prescriptions/{id}"), prescription).await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<Value> {
        self.api.delete(&format!("/prescriptions/{id}")).await
    }

    pub async fn by_patient(&self, patient_id: &str, params: Query<'_>) -> ClientResult<Vec<Prescription>> {
        self.api
            .get_query(&format!("/prescriptions/patient/{patient_id}"), params)
            .await
    }

    pub async fn by_doctor(&self, doctor_id: &str, params: Query<'_>) -> ClientResult<Vec<Prescription>> {
        self.api
            .get_query(&format!("/prescriptions/doctor/{doctor_id}"), params)
            .await
    }

    pub async fn check_interactions(&self, medication_ids: &[u64]) -> ClientResult<Value> {
        self.api
            .post(
                "/prescriptions/check-interactions",
                &json!({ "medicationIds": medication_ids }),
            )
            .await
    }

    /// Submits a validated dispensing record to `/prescriptions/{id}/dispense`.
    ///
    /// # Arguments
    ///
    /// * `request` - Built by `DispenseForm::into_request`, so every line already carries a
    ///   batch number, a positive quantity and an expiry date.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` for transport failures and non-2xx answers; a 422 carries the
    /// server's per-field messages in `ApiError::validation_errors`.
    pub async fn dispense(&self, request: &DispenseRequest) -> ClientResult<Value> {
        tracing::info!(
            "dispensing prescription {} ({} items)",
            request.prescription_id,
            request.medications.len()
        );
        self.api
            .post(
                &format!("/prescriptions/{}/dispense", request.prescription_id),
                request,
            )
            .await
    }

    /// `extra` fields are merged into the body next to `status`.
    pub async fn update_status(
        &self,
        id: u64,
        status: PrescriptionStatus,
        extra: Map<String, Value>,
    ) -> ClientResult<Prescription> {
        let mut body = extra;
        body.insert("status".into(), Value::String(status.as_str().into()));
        self.api
            .patch(&format!("/prescriptions/{id}/status"), &body)
            .await
    }

    pub async fn statistics(&self, params: Query<'_>) -> ClientResult<Value> {
        self.api.get_query("/prescriptions/statistics", params).await
    }

    /// The pharmacy work queue, unfiltered unless `params` narrows it server-side.
    pub async fn pharmacy_queue(&self, params: Query<'_>) -> ClientResult<Vec<QueueEntry>> {
        self.api.get_query("/prescriptions/queue", params).await
    }

    /// Downloads the spreadsheet export as `prescriptions_{millis}.xlsx`.
    ///
    /// # Errors
    ///
    /// `ClientError::Api` when the request fails, `ClientError::Download` when the file cannot
    /// be written.
    pub async fn export(&self, params: Query<'_>) -> ClientResult<PathBuf> {
        let filename = format!("prescriptions_{}.xlsx", Utc::now().timestamp_millis());
        self.api
            .download("/prescriptions/export", params, &filename)
            .await
    }

    pub async fn print(&self, id: u64) -> ClientResult<PathBuf> {
        self.api
            .download(
                &format!("/prescriptions/{id}/print"),
                &[],
                &format!("prescription_{id}.pdf"),
            )
            .await
    }
}
