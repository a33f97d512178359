use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub(crate) const INVALID_POST_TYPE_MESSAGE: &str =
    "Please provide query parameter type=popular or type=latest";
pub(crate) const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid post type")]
    InvalidPostType,
    #[error("Upstream authentication failed: {0}")]
    UpstreamAuth(String),
    #[error("Reqwest error: {0}")]
    HTTPClient(#[from] reqwest::Error),
    #[error("Upstream returned {status} for {path}")]
    UpstreamStatus {
        status: reqwest::StatusCode,
        path: String,
    },
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("Internal server error")]
    #[cfg_attr(not(test), allow(dead_code))]
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Error::InvalidPostType => {
                tracing::debug!("{:?}", self);
                (StatusCode::BAD_REQUEST, INVALID_POST_TYPE_MESSAGE)
            }
            Error::UpstreamAuth(_)
            | Error::HTTPClient(_)
            | Error::UpstreamStatus { .. }
            | Error::Deserialize(_)
            | Error::Internal => {
                tracing::error!("{:?}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR_MESSAGE,
                )
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
