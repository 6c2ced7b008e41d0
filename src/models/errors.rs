use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use super::{ErrorBody, MessType};

/// Service-level errors, one per failure a menu request can end in
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Invalid mess type. Valid options: {}", MessType::valid_options())]
    InvalidMessType { mess_type: String },

    #[error("No menu found for {mess_type}")]
    MenuNotFound { mess_type: MessType },

    #[error("Repository error: {source}")]
    Repository {
        #[from]
        source: RepositoryError,
    },
}

/// Repository-level errors for data access operations
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{message}")]
    AwsSdk { message: String },

    #[error("Malformed document in {collection}: {message}")]
    MalformedDocument { collection: String, message: String },
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidMessType { .. } => StatusCode::BAD_REQUEST,
            ServiceError::MenuNotFound { .. } => StatusCode::NOT_FOUND,
            ServiceError::Repository { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Label used for the `outcome` dimension of menu request metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            ServiceError::InvalidMessType { .. } => "invalid",
            ServiceError::MenuNotFound { .. } => "not_found",
            ServiceError::Repository { .. } => "error",
        }
    }

    pub fn to_body(&self) -> ErrorBody {
        let status = self.status_code().as_u16();
        match self {
            ServiceError::Repository { source } => ErrorBody {
                status,
                message: "Internal Server Error".to_string(),
                error: Some(source.to_string()),
            },
            other => ErrorBody {
                status,
                message: other.to_string(),
                error: None,
            },
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;
