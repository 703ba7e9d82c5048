use crate::client::{ApiClient, Query};
use crate::error::ClientResult;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct SettingsService {
    api: ApiClient,
}

impl SettingsService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn all(&self) -> ClientResult<Value> {
        self.api.get("/settings").await
    }

    pub async fn system(&self) -> ClientResult<Value> {
        self.api.get("/settings/system").await
    }

    pub async fn update_system(&self, settings: &Value) -> ClientResult<Value> {
        self.api.put("/settings/system", settings).await
    }

    pub async fn notification_settings(&self, user_id: u64) -> ClientResult<Value> {
        self.api
            .get(&format!("/settings/notifications/{user_id}"))
            .await
    }

    pub async fn update_notification_settings(&self, user_id: u64, settings: &Value) -> ClientResult<Value> {
        self.api
            .put(&format!("/settings/notifications/{user_id}"), settings)
            .await
    }

    pub async fn backup_settings(&self) -> ClientResult<Value> {
        self.api.get("/settings/backup").await
    }

    pub async fn update_backup_settings(&self, settings: &Value) -> ClientResult<Value> {
        self.api.put("/settings/backup", settings).await
    }

    pub async fn backups(&self) -> ClientResult<Value> {
        self.api.get("/settings/backup/list").await
    }

    pub async fn create_backup(&self) -> ClientResult<Value> {
        self.api.post_empty("/settings/backup/create").await
    }

    pub async fn restore_backup(&self, backup_id: &str) -> ClientResult<Value> {
        tracing::warn!("restoring backup {backup_id}");
        self.api
            .post_empty(&format!("/settings/backup/restore/{backup_id}"))
            .await
    }

    pub async fn audit_logs(&self, params: Query<'_>) -> ClientResult<Value> {
        self.api.get_query("/settings/audit-logs", params).await
    }

    pub async fn export_audit_logs(&self, params: Query<'_>) -> ClientResult<PathBuf> {
        let filename = format!("audit_logs_{}.xlsx", Utc::now().timestamp_millis());
        self.api
            .download("/settings/audit-logs/export", params, &filename)
            .await
    }

    pub async fn security_settings(&self, user_id: u64) -> ClientResult<Value> {
        self.api.get(&format!("/settings/security/{user_id}")).await
    }

    pub async fn update_security_settings(&self, user_id: u64, settings: &Value) -> ClientResult<Value> {
        self.api
            .put(&format!("/settings/security/{user_id}"), settings)
            .await
    }

    pub async fn active_sessions(&self, user_id: u64) -> ClientResult<Value> {
        self.api.get(&format!("/settings/sessions/{user_id}")).await
    }

    pub async fn terminate_session(&self, session_id: &str) -> ClientResult<Value> {
        self.api
            .delete(&format!("/settings/sessions/{session_id}"))
            .await
    }

    pub async fn terminate_all_sessions(&self, user_id: u64) -> ClientResult<Value> {
        self.api
            .delete(&format!("/settings/sessions/all/{user_id}"))
            .await
    }

    pub async fn login_history(&self, user_id: u64) -> ClientResult<Value> {
        self.api
            .get(&format!("/settings/login-history/{user_id}"))
            .await
    }

    pub async fn enable_two_factor(&self, user_id: u64) -> ClientResult<Value> {
        self.api
            .post_empty(&format!("/settings/2fa/enable/{user_id}"))
            .await
    }

    pub async fn verify_two_factor(&self, user_id: u64, code: &str) -> ClientResult<Value> {
        self.api
            .post(&format!("/settings/2fa/verify/{user_id}"), &json!({ "code": code }))
            .await
    }

    pub async fn disable_two_factor(&self, user_id: u64) -> ClientResult<Value> {
        self.api
            .post_empty(&format!("/settings/2fa/disable/{user_id}"))
            .await
    }
}
