use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// Connection, timeout or body read failure.
    Network,
    /// Non-2xx status.
    Status(u16),
    /// Body did not match the expected shape.
    Decode,
}

#[derive(Debug, Clone)]
pub struct ApiError {
    pub endpoint: &'static str,
    pub kind: ApiErrorKind,
    pub detail: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ApiErrorKind::Network => {
                write!(f, "{} request failed: {}", self.endpoint, self.detail)
            }
            ApiErrorKind::Status(status) => write!(
                f,
                "{} request failed (HTTP {status}): {}",
                self.endpoint, self.detail
            ),
            ApiErrorKind::Decode => {
                write!(f, "{} response is malformed: {}", self.endpoint, self.detail)
            }
        }
    }
}

impl std::error::Error for ApiError {}

/// Text shown to the user for a failed fetch.
pub fn user_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ApiError>() {
        Some(api) => api.to_string(),
        None => format!("{err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_render_status_and_detail() {
        let err = ApiError {
            endpoint: "forecast",
            kind: ApiErrorKind::Status(404),
            detail: "No market data for ticker".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "forecast request failed (HTTP 404): No market data for ticker"
        );
    }

    #[test]
    fn user_message_keeps_context_chain_for_other_errors() {
        let err = anyhow::anyhow!("boom").context("loading dashboard");
        assert_eq!(user_message(&err), "loading dashboard: boom");
    }
}
