use shared::wire::ApiErrorBody;
use thiserror::Error;

pub const GENERIC_NETWORK_ERROR: &str = "A network error occurred. Please try again.";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request rejected ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// Builds a `Status` error, pulling the message out of the response body
    /// when the server sent one.
    pub fn rejected(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ApiErrorBody>(body)
            .ok()
            .and_then(|body| body.message())
            .unwrap_or_else(|| format!("Request failed with status {}", status));
        StoreError::Status { status, message }
    }

    /// Message suitable for showing to the user.
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Status { message, .. } => message.clone(),
            StoreError::Network(_) | StoreError::Decode(_) => GENERIC_NETWORK_ERROR.to_string(),
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_joins_errors_array() {
        let err = StoreError::rejected(422, r#"{"errors":["Too short","Mismatch"]}"#);
        assert_eq!(err.user_message(), "Too short, Mismatch");
    }

    #[test]
    fn test_rejected_uses_error_string() {
        let err = StoreError::rejected(401, r#"{"error":"Invalid password"}"#);
        match err {
            StoreError::Status { status, ref message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid password");
            }
            _ => panic!("expected status error"),
        }
    }

    #[test]
    fn test_rejected_without_body_falls_back_to_status() {
        let err = StoreError::rejected(500, "<html>oops</html>");
        assert_eq!(err.user_message(), "Request failed with status 500");
    }

    #[test]
    fn test_network_errors_are_generic_for_users() {
        let err = StoreError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), GENERIC_NETWORK_ERROR);
    }
}
