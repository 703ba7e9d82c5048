use crate::client::ApiClient;
use crate::error::ClientResult;
use hms_core::Role;
use serde_json::Value;

/// Default look-back windows used by the dashboard charts.
pub const DEFAULT_REVENUE_PERIOD: &str = "30d";
pub const DEFAULT_FLOW_PERIOD: &str = "7d";
pub const DEFAULT_DEPARTMENT_PERIOD: &str = "30d";

/// Read-only dashboard aggregates. Every endpoint wraps its payload in `data`.
#[derive(Debug, Clone)]
pub struct DashboardService {
    api: ApiClient,
}

impl DashboardService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn stats(&self) -> ClientResult<Value> {
        self.api.get_enveloped("/dashboard/stats").await
    }

    pub async fn for_role(&self, role: Role) -> ClientResult<Value> {
        self.api
            .get_enveloped(&format!("/dashboard/{}", role.as_str().to_lowercase()))
            .await
    }

    pub async fn admin(&self) -> ClientResult<Value> {
        self.api.get_enveloped("/dashboard/admin").await
    }

    pub async fn pharmacist(&self) -> ClientResult<Value> {
        self.api.get_enveloped("/pharmacist/dashboard").await
    }

    pub async fn activities(&self, limit: Option<u32>) -> ClientResult<Value> {
        match limit {
            Some(limit) => {
                self.api
                    .get_enveloped(&format!("/dashboard/activities?limit={limit}"))
                    .await
            }
            None => self.api.get_enveloped("/dashboard/activities").await,
        }
    }

    pub async fn revenue_analytics(&self, period: Option<&str>) -> ClientResult<Value> {
        let period = period.unwrap_or(DEFAULT_REVENUE_PERIOD);
        self.api
            .get_enveloped(&format!("/dashboard/revenue-analytics?period={period}"))
            .await
    }

    pub async fn patient_flow(&self, period: Option<&str>) -> ClientResult<Value> {
        let period = period.unwrap_or(DEFAULT_FLOW_PERIOD);
        self.api
            .get_enveloped(&format!("/dashboard/patient-flow?period={period}"))
            .await
    }

    pub async fn department_performance(&self, period: Option<&str>) -> ClientResult<Value> {
        let period = period.unwrap_or(DEFAULT_DEPARTMENT_PERIOD);
        self.api
            .get_enveloped(&format!("/dashboard/department-performance?period={period}"))
            .await
    }
}
