use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Failure categories derived from the HTTP status and payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    Network,
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Server,
    Timeout,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Network => "NETWORK",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Authentication => "AUTHENTICATION",
            ErrorKind::Authorization => "AUTHORIZATION",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Server => "SERVER",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";
pub const INVALID_CREDENTIALS: &str = "Invalid credentials. Please try again.";
pub const VALIDATION_FAILED: &str = "Validation failed. Please check your input.";
pub const ACCESS_DENIED: &str = "Access denied. You don't have permission to perform this action.";
pub const NOT_FOUND: &str = "Resource not found.";
pub const TOO_MANY_REQUESTS: &str = "Too many requests. Please try again later.";
pub const MAINTENANCE: &str = "System under maintenance.";
pub const SERVER_ERROR: &str = "Server error. Please try again later.";
pub const UNEXPECTED: &str = "An unexpected error occurred";
pub const NETWORK_ERROR: &str = "Network error. Please check your connection.";
pub const TIMEOUT: &str = "Request timeout. Please try again.";

/// Follow-up the caller must perform after a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideEffect {
    None,
    /// Drop stored credentials and send the user to `/login`.
    ExpireSession,
    /// Send the user to `/maintenance`.
    Maintenance,
}

/// A failed API call with the message to show the user.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    pub message: String,
    /// Server-supplied validation details (`errors` in the body).
    pub details: Option<Value>,
}

fn server_message(body: Option<&Value>, allow_error_field: bool) -> Option<String> {
    let body = body?;
    let pick = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
    };
    pick("message").or_else(|| if allow_error_field { pick("error") } else { None })
}

impl ApiError {
    pub fn new(kind: ErrorKind, status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            kind,
            status,
            message: message.into(),
            details: None,
        }
    }

    pub fn network() -> Self {
        Self::new(ErrorKind::Network, None, NETWORK_ERROR)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, None, TIMEOUT)
    }

    /// Maps a non-success response onto the error taxonomy.
    ///
    /// `auth_endpoint` marks the login family of paths, where a 401 means bad credentials rather
    /// than an expired session.
    pub fn from_status(status: u16, body: Option<&Value>, auth_endpoint: bool) -> (Self, SideEffect) {
        let with_default = |kind, default: &str| {
            Self::new(
                kind,
                Some(status),
                server_message(body, false).unwrap_or_else(|| default.to_owned()),
            )
        };

        match status {
            401 if !auth_endpoint => (
                Self::new(ErrorKind::Authentication, Some(status), SESSION_EXPIRED),
                SideEffect::ExpireSession,
            ),
            401 => (
                Self::new(
                    ErrorKind::Authentication,
                    Some(status),
                    server_message(body, true).unwrap_or_else(|| INVALID_CREDENTIALS.to_owned()),
                ),
                SideEffect::None,
            ),
            400 | 422 => {
                let mut err = with_default(ErrorKind::Validation, VALIDATION_FAILED);
                err.details = body.and_then(|b| b.get("errors")).cloned();
                (err, SideEffect::None)
            }
            403 => (with_default(ErrorKind::Authorization, ACCESS_DENIED), SideEffect::None),
            404 => (with_default(ErrorKind::NotFound, NOT_FOUND), SideEffect::None),
            429 => (with_default(ErrorKind::Unknown, TOO_MANY_REQUESTS), SideEffect::None),
            503 => (
                Self::new(ErrorKind::Server, Some(status), MAINTENANCE),
                SideEffect::Maintenance,
            ),
            s if s >= 500 => (with_default(ErrorKind::Server, SERVER_ERROR), SideEffect::None),
            _ => (
                Self::new(
                    ErrorKind::Unknown,
                    Some(status),
                    server_message(body, true).unwrap_or_else(|| UNEXPECTED.to_owned()),
                ),
                SideEffect::None,
            ),
        }
    }

    /// Field messages from the validation details, ready for a form's error map.
    ///
    /// Accepts either an array of `{field | path, message}` objects or an object of
    /// `field -> message` (or `field -> [messages]`, first one wins).
    pub fn validation_errors(&self) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        match &self.details {
            Some(Value::Array(items)) => {
                for item in items {
                    let field = item
                        .get("field")
                        .or_else(|| item.get("path"))
                        .and_then(Value::as_str);
                    let message = item.get("message").and_then(Value::as_str);
                    if let (Some(field), Some(message)) = (field, message) {
                        out.insert(field.to_owned(), message.to_owned());
                    }
                }
            }
            Some(Value::Object(map)) => {
                for (field, value) in map {
                    let message = match value {
                        Value::String(s) => Some(s.clone()),
                        Value::Array(list) => list.first().and_then(Value::as_str).map(str::to_owned),
                        _ => None,
                    };
                    if let Some(message) = message {
                        out.insert(field.clone(), message);
                    }
                }
            }
            _ => {}
        }
        out
    }

    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("session store I/O failed: {0}")]
    StoreIo(#[source] std::io::Error),
    #[error("session store contents are not valid JSON: {0}")]
    StoreFormat(#[source] serde_json::Error),
    #[error("failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("failed to save download: {0}")]
    Download(#[source] std::io::Error),
    #[error("file rejected: {0}")]
    InvalidUpload(String),
    #[error("authentication failed: {0}")]
    Auth(String),
}

impl ClientError {
    /// The API error behind this failure, if it came from the server or the network.
    pub fn api(&self) -> Option<&ApiError> {
        match self {
            ClientError::Api(err) => Some(err),
            _ => None,
        }
    }
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_401_outside_auth_expires_session() {
        let body = json!({"message": "jwt expired"});
        let (err, effect) = ApiError::from_status(401, Some(&body), false);
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert_eq!(err.message, SESSION_EXPIRED);
        assert_eq!(effect, SideEffect::ExpireSession);
    }

    #[test]
    fn test_401_on_auth_endpoint_uses_server_message() {
        let body = json!({"error": "Bad password"});
        let (err, effect) = ApiError::from_status(401, Some(&body), true);
        assert_eq!(err.message, "Bad password");
        assert_eq!(effect, SideEffect::None);

        let (err, _) = ApiError::from_status(401, None, true);
        assert_eq!(err.message, INVALID_CREDENTIALS);
    }

    #[test]
    fn test_status_defaults() {
        let cases = [
            (403, ErrorKind::Authorization, ACCESS_DENIED),
            (404, ErrorKind::NotFound, NOT_FOUND),
            (422, ErrorKind::Validation, VALIDATION_FAILED),
            (400, ErrorKind::Validation, VALIDATION_FAILED),
            (429, ErrorKind::Unknown, TOO_MANY_REQUESTS),
            (500, ErrorKind::Server, SERVER_ERROR),
            (502, ErrorKind::Server, SERVER_ERROR),
            (418, ErrorKind::Unknown, UNEXPECTED),
        ];
        for (status, kind, message) in cases {
            let (err, effect) = ApiError::from_status(status, None, false);
            assert_eq!(err.kind, kind, "{status}");
            assert_eq!(err.message, message, "{status}");
            assert_eq!(err.status, Some(status));
            assert_eq!(effect, SideEffect::None);
        }
    }

    #[test]
    fn test_server_message_overrides_default() {
        let body = json!({"message": "Prescription 9 not found"});
        let (err, _) = ApiError::from_status(404, Some(&body), false);
        assert_eq!(err.message, "Prescription 9 not found");
    }

    #[test]
    fn test_503_requests_maintenance() {
        let body = json!({"message": "down for upgrade"});
        let (err, effect) = ApiError::from_status(503, Some(&body), false);
        assert_eq!(err.kind, ErrorKind::Server);
        assert_eq!(err.message, MAINTENANCE);
        assert_eq!(effect, SideEffect::Maintenance);
    }

    #[test]
    fn test_validation_errors_from_array_and_object() {
        let body = json!({"errors": [
            {"field": "email", "message": "Email taken"},
            {"path": "phone", "message": "Bad phone"},
            {"message": "orphan"}
        ]});
        let (err, _) = ApiError::from_status(422, Some(&body), false);
        let fields = err.validation_errors();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields["email"], "Email taken");
        assert_eq!(fields["phone"], "Bad phone");

        let body = json!({"errors": {"name": ["Too short", "Other"], "dose": "Required"}});
        let (err, _) = ApiError::from_status(400, Some(&body), false);
        let fields = err.validation_errors();
        assert_eq!(fields["name"], "Too short");
        assert_eq!(fields["dose"], "Required");
    }

    #[test]
    fn test_kind_display_matches_wire_name() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(
            serde_json::to_value(ErrorKind::Authentication).unwrap(),
            json!("AUTHENTICATION")
        );
    }
}
