/// Default trailing window, in days, requested from the statistics endpoint.
pub const DEFAULT_STATS_WINDOW_DAYS: u32 = 30;

/// Common error type for calls to the analysis service.
///
/// Variants carry rendered messages rather than the underlying transport error
/// so that results can be cloned into GUI messages.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn network(err: impl std::fmt::Display) -> Self {
        ApiError::Network(err.to_string())
    }

    pub fn invalid_response(err: impl std::fmt::Display) -> Self {
        ApiError::InvalidResponse(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
