#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown role: {0}")]
    UnknownRole(String),
    #[error("unknown prescription status: {0}")]
    UnknownStatus(String),
    #[error("unknown priority: {0}")]
    UnknownPriority(String),
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
