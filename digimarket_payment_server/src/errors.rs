use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use digimarket_payment_engine::{traits::GatewayError, ReconcilerError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Payload deserialization error")]
    CouldNotDeserializePayload,
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("Invalid server configuration. {0}")]
    ConfigurationError(String),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Authentication Error. {0}")]
    AuthenticationError(#[from] AuthError),
    #[error("Could not serialize access token. {0}")]
    CouldNotSerializeAccessToken(String),
    #[error(transparent)]
    PaymentError(#[from] ReconcilerError),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CouldNotDeserializePayload => StatusCode::BAD_REQUEST,
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::AuthenticationError(e) => match e {
                AuthError::MissingToken => StatusCode::UNAUTHORIZED,
                AuthError::ValidationError(_) => StatusCode::UNAUTHORIZED,
                AuthError::InvalidWebhookSignature => StatusCode::UNAUTHORIZED,
                AuthError::PoorlyFormattedToken(_) => StatusCode::BAD_REQUEST,
            },
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigurationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CouldNotSerializeAccessToken(_) => StatusCode::BAD_REQUEST,
            Self::PaymentError(e) => match e {
                ReconcilerError::UnknownReference(_) => StatusCode::NOT_FOUND,
                ReconcilerError::OrderNotFound(_) => StatusCode::NOT_FOUND,
                ReconcilerError::PaymentNotFound(_) => StatusCode::NOT_FOUND,
                ReconcilerError::NotOrderOwner => StatusCode::FORBIDDEN,
                ReconcilerError::NotPaymentOwner => StatusCode::FORBIDDEN,
                ReconcilerError::OrderNotPayable(_) => StatusCode::BAD_REQUEST,
                ReconcilerError::OrderNotCancellable(_) => StatusCode::BAD_REQUEST,
                ReconcilerError::RefundWindowExpired { .. } => StatusCode::BAD_REQUEST,
                ReconcilerError::RefundNotAllowed(_) => StatusCode::BAD_REQUEST,
                ReconcilerError::Gateway(GatewayError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
                ReconcilerError::Gateway(_) => StatusCode::BAD_GATEWAY,
                ReconcilerError::Ledger(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("No access token was provided.")]
    MissingToken,
    #[error("Access token is invalid. {0}")]
    ValidationError(String),
    #[error("The webhook signature is missing or does not match the payload.")]
    InvalidWebhookSignature,
    #[error("Access token is not in the correct format. {0}")]
    PoorlyFormattedToken(String),
}
