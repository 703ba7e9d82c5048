//! Typed wrappers over the backend's resource endpoints.
//!
//! Each service is a thin handle over a shared [`ApiClient`]; cloning one is cheap.

mod auth;
mod dashboard;
mod files;
mod medications;
mod notifications;
mod prescriptions;
mod reports;
mod settings;

pub use auth::{AuthService, AuthUser, Credentials, SessionInfo, SESSION_MAX_AGE_HOURS};
pub use dashboard::DashboardService;
pub use files::{FileService, FileUpload, UploadOptions, DOCUMENT_EXTENSIONS, DOCUMENT_MEDIA_TYPES};
pub use medications::{MedicationService, DEFAULT_LOW_STOCK_THRESHOLD};
pub use notifications::NotificationService;
pub use prescriptions::PrescriptionService;
pub use reports::{ReportKind, ReportService};
pub use settings::SettingsService;

use crate::client::ApiClient;

impl ApiClient {
    pub fn auth(&self) -> AuthService {
        AuthService::new(self.clone())
    }

    pub fn prescriptions(&self) -> PrescriptionService {
        PrescriptionService::new(self.clone())
    }

    pub fn medications(&self) -> MedicationService {
        MedicationService::new(self.clone())
    }

    pub fn notifications(&self) -> NotificationService {
        NotificationService::new(self.clone())
    }

    pub fn reports(&self) -> ReportService {
        ReportService::new(self.clone())
    }

    pub fn settings(&self) -> SettingsService {
        SettingsService::new(self.clone())
    }

    pub fn files(&self) -> FileService {
        FileService::new(self.clone())
    }

    pub fn dashboard(&self) -> DashboardService {
        DashboardService::new(self.clone())
    }
}
