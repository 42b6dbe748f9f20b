use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaystackApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Gateway could not be reached: {0}")]
    Unavailable(String),
    #[error("Gateway rejected the request. Error {status}. {message}")]
    Rejected { status: u16, message: String },
    #[error("Gateway has no record of the requested resource: {0}")]
    NotFound(String),
    #[error("Could not deserialize gateway response: {0}")]
    JsonError(String),
    #[error("Gateway reported an application error: {0}")]
    ApiError(String),
}
