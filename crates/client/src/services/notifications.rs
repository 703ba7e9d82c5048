use crate::client::{ApiClient, Query};
use crate::error::ClientResult;
use hms_core::models::Notification;
use serde_json::{json, Value};

#[derive(Debug, Clone)]
pub struct NotificationService {
    api: ApiClient,
}

impl NotificationService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list(&self, params: Query<'_>) -> ClientResult<Vec<Notification>> {
        self.api.get_query("/notifications", params).await
    }

    pub async fn unread(&self) -> ClientResult<Vec<Notification>> {
        self.api.get("/notifications/unread").await
    }

    /// Accepts either a bare number or `{ "count": n }`.
    pub async fn unread_count(&self) -> ClientResult<u64> {
        let body: Value = self.api.get("/notifications/unread/count").await?;
        Ok(body
            .as_u64()
            .or_else(|| body.get("count").and_then(Value::as_u64))
            .unwrap_or(0))
    }

    pub async fn mark_read(&self, notification_id: u64) -> ClientResult<Value> {
        self.api
            .patch_empty(&format!("/notifications/{notification_id}/read"))
            .await
    }

    pub async fn mark_all_read(&self) -> ClientResult<Value> {
        self.api.patch_empty("/notifications/read-all").await
    }

    pub async fn delete(&self, notification_id: u64) -> ClientResult<Value> {
        self.api
            .delete(&format!("/notifications/{notification_id}"))
            .await
    }

    pub async fn delete_all(&self) -> ClientResult<Value> {
        self.api.delete("/notifications/all").await
    }

    pub async fn send(&self, notification: &Value) -> ClientResult<Value> {
        self.api.post("/notifications/send", notification).await
    }

    pub async fn send_bulk(&self, bulk: &Value) -> ClientResult<Value> {
        self.api.post("/notifications/send-bulk", bulk).await
    }

    pub async fn settings(&self) -> ClientResult<Value> {
        self.api.get("/notifications/settings").await
    }

    pub async fn update_settings(&self, settings: &Value) -> ClientResult<Value> {
        self.api.put("/notifications/settings", settings).await
    }

    pub async fn register_device(&self, device_token: &str, device_type: &str) -> ClientResult<Value> {
        self.api
            .post(
                "/notifications/devices",
                &json!({ "token": device_token, "type": device_type }),
            )
            .await
    }

    pub async fn unregister_device(&self, device_token: &str) -> ClientResult<Value> {
        self.api
            .delete_with_body("/notifications/devices", &json!({ "token": device_token }))
            .await
    }
}
