//! Login, logout and the stored user.
//!
//! A successful login leaves three things in the [`Session`](crate::Session): the bearer
//! token, the user profile and the login time. Sessions older than [`SESSION_MAX_AGE_HOURS`]
//! count as inactive even while the token is still held.

use crate::client::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::session::AUTH_TOKEN;
use chrono::{DateTime, Duration, Utc};
use hms_core::Role;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// How long after login a session stays active.
pub const SESSION_MAX_AGE_HOURS: i64 = 8;

/// A login attempt. `identifier` is an email address or a username.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            password: password.into(),
        }
    }

    /// The login body. The backend looks the user up by either field, so both carry the
    /// identifier.
    fn payload(&self) -> ClientResult<Value> {
        let identifier = self.identifier.trim();
        if identifier.is_empty() {
            return Err(ClientError::Auth("Email or username is required".into()));
        }
        if self.password.trim().is_empty() {
            return Err(ClientError::Auth("Password is required".into()));
        }
        Ok(json!({
            "email": identifier,
            "username": identifier,
            "password": self.password,
        }))
    }
}

/// The signed-in user as the backend describes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<u64>,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

impl AuthUser {
    /// The role, when the backend sent one this client knows.
    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(|r| r.parse().ok())
    }

    pub fn display_name(&self) -> String {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => format!("{first} {last}"),
            (Some(name), None) | (None, Some(name)) => name.to_owned(),
            (None, None) => self.username.clone().unwrap_or_else(|| self.email.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    user: Option<Value>,
}

/// What is known about the current login.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionInfo {
    pub login_time: DateTime<Utc>,
    /// Whole minutes since login.
    pub duration_minutes: i64,
    pub user: AuthUser,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct AuthService {
    api: ApiClient,
}

impl AuthService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Signs in and stores the token, the user and the login time.
    ///
    /// # Arguments
    /// * `credentials` - Email or username plus password
    ///
    /// # Errors
    /// Returns [`ClientError::Auth`] when either credential is blank, or when the response
    /// lacks a token or a user object. Server rejections surface as [`ClientError::Api`].
    /// Nothing is stored on failure.
    pub async fn login(&self, credentials: &Credentials) -> ClientResult<AuthUser> {
        self.login_at(credentials, Utc::now()).await
    }

    /// [`login`](Self::login) with an explicit login time.
    pub async fn login_at(&self, credentials: &Credentials, now: DateTime<Utc>) -> ClientResult<AuthUser> {
        let payload = credentials.payload()?;
        let response: TokenResponse = self.api.post("/auth/login", &payload).await?;
        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Auth("No token in response".into()))?;
        let user = response
            .user
            .and_then(|u| serde_json::from_value::<AuthUser>(u).ok())
            .ok_or_else(|| ClientError::Auth("Invalid user data received".into()))?;

        let session = self.api.session();
        session.set_auth_token(&token, now)?;
        session.set_user(&user)?;
        tracing::info!("signed in as {}", user.email);
        Ok(user)
    }

    /// Tells the backend, then forgets the credentials whatever it answered.
    pub async fn logout(&self) -> ClientResult<()> {
        if let Err(e) = self.api.post_empty::<Value>("/auth/logout").await {
            tracing::warn!("logout request failed: {e}");
        }
        self.api.session().clear_session()
    }

    /// Swaps the stored token for a fresh one. Any failure clears the session.
    ///
    /// # Errors
    /// The transport error, or [`ClientError::Auth`] when the response carries no token.
    pub async fn refresh_token(&self) -> ClientResult<String> {
        let result = match self.api.post_empty::<TokenResponse>("/auth/refresh-token").await {
            Ok(TokenResponse { token: Some(token), .. }) if !token.is_empty() => {
                self.api.session().set_item(AUTH_TOKEN, &token).map(|()| token)
            }
            Ok(_) => Err(ClientError::Auth("Failed to refresh token".into())),
            Err(e) => Err(e),
        };
        if result.is_err() {
            self.api.session().clear_session()?;
        }
        result
    }

    /// Asks the backend whether the stored token is still good. A rejection clears the session.
    pub async fn verify_token(&self) -> ClientResult<Value> {
        let result = self.api.get("/auth/verify").await;
        if result.is_err() {
            self.api.session().clear_session()?;
        }
        result
    }

    /// Fetches the profile and replaces the stored user with it.
    pub async fn current_user(&self) -> ClientResult<AuthUser> {
        let user: AuthUser = self.api.get("/auth/profile").await?;
        self.api.session().set_user(&user)?;
        Ok(user)
    }

    pub async fn update_profile(&self, changes: &Value) -> ClientResult<AuthUser> {
        let user: AuthUser = self.api.put("/auth/profile", changes).await?;
        self.api.session().set_user(&user)?;
        Ok(user)
    }

    pub async fn register(&self, user: &Value) -> ClientResult<Value> {
        self.api.post("/auth/register", user).await
    }

    pub async fn change_password(&self, current: &str, new: &str) -> ClientResult<Value> {
        self.api
            .post(
                "/auth/change-password",
                &json!({ "currentPassword": current, "newPassword": new }),
            )
            .await
    }

    pub async fn forgot_password(&self, email: &str) -> ClientResult<Value> {
        self.api
            .post("/auth/forgot-password", &json!({ "email": email }))
            .await
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> ClientResult<Value> {
        self.api
            .post(
                "/auth/reset-password",
                &json!({ "token": token, "password": password }),
            )
            .await
    }

    pub async fn verify_email(&self, token: &str) -> ClientResult<Value> {
        self.api
            .post("/auth/verify-email", &json!({ "token": token }))
            .await
    }

    /// Both a token and a usable user are stored.
    pub fn is_authenticated(&self) -> ClientResult<bool> {
        Ok(self.api.session().auth_token()?.is_some() && self.stored_user()?.is_some())
    }

    /// The user saved at login. A stored user that does not parse clears the session.
    pub fn stored_user(&self) -> ClientResult<Option<AuthUser>> {
        let session = self.api.session();
        let Some(raw) = session.user::<Value>()? else {
            return Ok(None);
        };
        match serde_json::from_value::<AuthUser>(raw) {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                tracing::warn!("stored user is invalid, clearing session: {e}");
                session.clear_session()?;
                Ok(None)
            }
        }
    }

    pub fn has_role(&self, role: Role) -> ClientResult<bool> {
        self.has_any_role(&[role])
    }

    pub fn has_any_role(&self, roles: &[Role]) -> ClientResult<bool> {
        Ok(self
            .stored_user()?
            .and_then(|u| u.role())
            .is_some_and(|role| roles.contains(&role)))
    }

    /// Login age and activity as of `now`; `None` without a login time and user.
    pub fn session_info_at(&self, now: DateTime<Utc>) -> ClientResult<Option<SessionInfo>> {
        let Some(login_time) = self.api.session().login_time()? else {
            return Ok(None);
        };
        let Some(user) = self.stored_user()? else {
            return Ok(None);
        };
        let age = now.signed_duration_since(login_time);
        Ok(Some(SessionInfo {
            login_time,
            duration_minutes: age.num_minutes(),
            user,
            is_active: age < Duration::hours(SESSION_MAX_AGE_HOURS),
        }))
    }

    pub fn session_info(&self) -> ClientResult<Option<SessionInfo>> {
        self.session_info_at(Utc::now())
    }

    /// True when there is no active login as of `now`.
    pub fn is_session_expired_at(&self, now: DateTime<Utc>) -> ClientResult<bool> {
        Ok(!self.session_info_at(now)?.is_some_and(|info| info.is_active))
    }
}
