use crate::client::{ApiClient, Query};
use crate::error::ClientResult;
use hms_core::models::Medication;
use serde_json::Value;

/// Stock level at or below which a medication counts as low.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

#[derive(Debug, Clone)]
pub struct MedicationService {
    api: ApiClient,
}

impl MedicationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, params: Query<'_>) -> ClientResult<Vec<Medication>> {
        self.api.get_query("/medications", params).await
    }

    /// Catalogue search by name, sent as `?q=`.
    pub async fn search(&self, query: &str) -> ClientResult<Vec<Medication>> {
        self.api
            .get_query("/medications/search", &[("q", query.to_owned())])
            .await
    }

    pub async fn get(&self, id: u64) -> ClientResult<Medication> {
        self.api.get(&format!("/medications/{id}")).await
    }

    pub async fn create(&self, medication: &Value) -> ClientResult<Medication> {
        self.api.post("/medications", medication).await
    }

    pub async fn update(&self, id: u64, medication: &Value) -> ClientResult<Medication> {
        self.api.put(&format!("/medications/{id}"), medication).await
    }

    pub async fn delete(&self, id: u64) -> ClientResult<Value> {
        self.api.delete(&format!("/medications/{id}")).await
    }

    pub async fn stock(&self, id: u64) -> ClientResult<Value> {
        self.api.get(&format!("/medications/{id}/stock")).await
    }

    pub async fn update_stock(&self, id: u64, stock: &Value) -> ClientResult<Value> {
        self.api.put(&format!("/medications/{id}/stock"), stock).await
    }

    /// Medications with stock at or below `threshold`.
    ///
    /// # Arguments
    ///
    /// * `threshold` - Stock level to compare against; [`DEFAULT_LOW_STOCK_THRESHOLD`] when `None`.
    pub async fn low_stock(&self, threshold: Option<u32>) -> ClientResult<Vec<Medication>> {
        let threshold = threshold.unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD);
        self.api
            .get_query("/medications/low-stock", &[("threshold", threshold.to_string())])
            .await
    }

    pub async fn expired(&self) -> ClientResult<Vec<Medication>> {
        self.api.get("/medications/expired").await
    }

    pub async fn interactions(&self, medication_id: u64) -> ClientResult<Value> {
        self.api
            .get(&format!("/medications/{medication_id}/interactions"))
            .await
    }

    pub async fn categories(&self) -> ClientResult<Vec<String>> {
        self.api.get("/medications/categories").await
    }
}
