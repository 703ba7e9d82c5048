use crate::client::ApiClient;
use crate::error::ClientResult;
use serde_json::Value;
use std::path::PathBuf;

/// The report families the backend can generate on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Patients,
    Appointments,
    Financial,
    Department(u64),
    DoctorPerformance(u64),
    Inventory,
    Custom,
}

impl ReportKind {
    pub fn path(self) -> String {
        match self {
            ReportKind::Patients => "/reports/patients".into(),
            ReportKind::Appointments => "/reports/appointments".into(),
            ReportKind::Financial => "/reports/financial".into(),
            ReportKind::Department(id) => format!("/reports/departments/{id}"),
            ReportKind::DoctorPerformance(id) => format!("/reports/doctors/{id}/performance"),
            ReportKind::Inventory => "/reports/inventory".into(),
            ReportKind::Custom => "/reports/custom".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReportService {
    api: ApiClient,
}

impl ReportService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn available(&self) -> ClientResult<Value> {
        self.api.get("/reports").await
    }

    pub async fn generate(&self, kind: ReportKind, params: &Value) -> ClientResult<Value> {
        self.api.post(&kind.path(), params).await
    }

    /// Saves the report as `report_{id}.{format}`; `format` defaults to `pdf`.
    pub async fn export(&self, report_id: &str, format: Option<&str>) -> ClientResult<PathBuf> {
        let format = format.unwrap_or("pdf");
        self.api
            .download(
                &format!("/reports/{report_id}/export"),
                &[("format", format.to_owned())],
                &format!("report_{report_id}.{format}"),
            )
            .await
    }

    pub async fn get(&self, report_id: &str) -> ClientResult<Value> {
        self.api.get(&format!("/reports/{report_id}")).await
    }

    pub async fn saved(&self) -> ClientResult<Value> {
        self.api.get("/reports/saved").await
    }

    pub async fn schedule(&self, schedule: &Value) -> ClientResult<Value> {
        self.api.post("/reports/schedule", schedule).await
    }

    pub async fn scheduled(&self) -> ClientResult<Value> {
        self.api.get("/reports/scheduled").await
    }

    pub async fn delete(&self, report_id: &str) -> ClientResult<Value> {
        self.api.delete(&format!("/reports/{report_id}")).await
    }
}
